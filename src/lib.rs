pub mod action;
pub mod api;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod flows;
pub mod gate;
pub mod models;
pub mod route;
pub mod secret;
pub mod session;
pub mod tui;
pub mod utils;
