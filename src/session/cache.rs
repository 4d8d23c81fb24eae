use std::{
  fs,
  io::Write,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Result, WrapErr};
use tracing::warn;

use super::Session;

const SESSION_FILE: &str = "session.json";

/// On-disk copy of the provider session so a restart does not sign the user
/// out. Holds bearer tokens, so the file is created owner-readable only.
#[derive(Debug, Clone)]
pub struct SessionCache {
  path: PathBuf,
}

impl SessionCache {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn in_dir(dir: &Path) -> Self {
    Self::new(dir.join(SESSION_FILE))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// A missing or unreadable cache means "no session".
  pub fn load(&self) -> Option<Session> {
    let contents = match fs::read_to_string(&self.path) {
      Ok(contents) => contents,
      Err(_) => return None,
    };

    match serde_json::from_str::<Session>(&contents) {
      Ok(session) if session.has_token() => Some(session),
      Ok(_) => {
        warn!("Ignoring cached session without an access token");
        None
      },
      Err(e) => {
        warn!("Ignoring corrupt session cache {}: {e}", self.path.display());
        None
      },
    }
  }

  pub fn store(&self, session: Option<&Session>) -> Result<()> {
    let Some(session) = session else {
      if self.path.exists() {
        fs::remove_file(&self.path).wrap_err_with(|| format!("removing {}", self.path.display()))?;
      }
      return Ok(());
    };

    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(session)?;
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
      use std::os::unix::fs::OpenOptionsExt;
      options.mode(0o600);
    }
    let mut file = options.open(&self.path).wrap_err_with(|| format!("writing {}", self.path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
  }
}
