mod config;
mod database;
mod event_flow;
mod session;
