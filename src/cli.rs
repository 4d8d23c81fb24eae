use clap::Parser;

use crate::utils::version;

#[derive(Parser, Debug, Default)]
#[command(author, version = version(), about)]
pub struct Cli {
  #[arg(short, long, value_name = "FLOAT", help = "Tick rate, i.e. number of ticks per second", default_value_t = 1.0)]
  pub tick_rate: f64,

  #[arg(
    short('r'),
    long,
    value_name = "FLOAT",
    help = "Frame rate, i.e. number of frames per second",
    default_value_t = 4.0
  )]
  pub frame_rate: f64,

  // Service endpoints; unset flags fall back to the environment, then the config file
  #[arg(long = "api-url", value_name = "URL", help = "Base URL of the WhareIQ service")]
  pub api_url: Option<String>,

  #[arg(long = "auth-url", value_name = "URL", help = "Base URL of the Supabase project used for sign-in")]
  pub auth_url: Option<String>,

  #[arg(long = "anon-key", value_name = "KEY", help = "Supabase anon (public) key")]
  pub anon_key: Option<String>,

  #[arg(long = "sign-out", help = "Forget the cached session before starting")]
  pub sign_out: bool,
}
