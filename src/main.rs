use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use whareiq::{
  api::{ApiClient, HttpTransport},
  app::App,
  cli::Cli,
  config::{Config, Endpoints},
  route::Route,
  session::{SessionCache, SessionStore, SupabaseAuth},
  utils::{get_data_dir, initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<()> {
  initialize_logging()?;

  initialize_panic_handler()?;

  let args = Cli::parse();
  let config = Config::new()?;
  let endpoints = Endpoints::resolve(&args, &config.service, |var| std::env::var(var).ok())?;
  log::info!("Using service {} and identity provider {}", endpoints.api_url, endpoints.auth_url);

  let cache = SessionCache::in_dir(&get_data_dir());
  if args.sign_out {
    cache.store(None)?;
  }

  let provider = Arc::new(SupabaseAuth::new(&endpoints.auth_url, endpoints.anon_key.clone())?);
  let session = Arc::new(SessionStore::new(provider).with_cache(cache));
  session.load();
  let api = Arc::new(ApiClient::new(&endpoints.api_url, Arc::new(HttpTransport::new()), session.clone())?);

  let mut app = App::new(config, session, api, Route::default()).tick_rate(args.tick_rate).frame_rate(args.frame_rate);
  app.run().await?;

  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  if let Err(e) = tokio_main().await {
    eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
    Err(e)
  } else {
    Ok(())
  }
}
