use std::{
  collections::HashMap,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{eyre, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use derive_deref::{Deref, DerefMut};
use serde::{de::Deserializer, Deserialize};

use crate::{action::Action, api, cli::Cli, route::Route, secret::Secret};

const CONFIG: &str = include_str!("../.config/config.json5");

pub const API_URL_ENV: &str = "WHAREIQ_API_URL";
pub const AUTH_URL_ENV: &str = "SUPABASE_URL";
pub const ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub _data_dir: PathBuf,
  #[serde(default)]
  pub _config_dir: PathBuf,
}

/// `service` section of the config file.
#[derive(Clone, Debug, Deserialize, Default, PartialEq, Eq)]
pub struct ServiceConfig {
  #[serde(default)]
  pub api_url: Option<String>,
  #[serde(default)]
  pub auth_url: Option<String>,
  #[serde(default)]
  pub anon_key: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
  #[serde(default, flatten)]
  pub config: AppConfig,
  #[serde(default)]
  pub service: ServiceConfig,
  #[serde(default)]
  pub keybindings: KeyBindings,
}

impl Config {
  pub fn new() -> Result<Self, config::ConfigError> {
    Self::load(&crate::utils::get_config_dir(), &crate::utils::get_data_dir())
  }

  /// Defaults merged with whatever user config files `config_dir` holds.
  pub fn load(config_dir: &Path, data_dir: &Path) -> Result<Self, config::ConfigError> {
    let default_config: Config = json5::from_str(CONFIG).map_err(|e| config::ConfigError::Message(e.to_string()))?;
    let mut builder = config::Config::builder()
      .set_default("_data_dir", data_dir.to_string_lossy().as_ref())?
      .set_default("_config_dir", config_dir.to_string_lossy().as_ref())?;

    let config_files = [
      ("config.json5", config::FileFormat::Json5),
      ("config.json", config::FileFormat::Json),
      ("config.yaml", config::FileFormat::Yaml),
      ("config.toml", config::FileFormat::Toml),
      ("config.ini", config::FileFormat::Ini),
    ];
    let mut found_config = false;
    for (file, format) in &config_files {
      builder = builder.add_source(config::File::from(config_dir.join(file)).format(*format).required(false));
      if config_dir.join(file).exists() {
        found_config = true
      }
    }
    if !found_config {
      log::info!("No user configuration in {}, using defaults", config_dir.display());
    }

    let mut cfg: Self = builder.build()?.try_deserialize()?;

    for (route, default_bindings) in default_config.keybindings.iter() {
      let user_bindings = cfg.keybindings.entry(*route).or_default();
      for (key, cmd) in default_bindings.iter() {
        user_bindings.entry(key.clone()).or_insert_with(|| cmd.clone());
      }
    }

    let service = &mut cfg.service;
    service.api_url = service.api_url.take().or(default_config.service.api_url);
    service.auth_url = service.auth_url.take().or(default_config.service.auth_url);
    service.anon_key = service.anon_key.take().or(default_config.service.anon_key);

    Ok(cfg)
  }
}

/// Where the two remote services live, after every override is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
  pub api_url: String,
  pub auth_url: String,
  pub anon_key: Secret,
}

impl Endpoints {
  /// CLI flag, then environment, then config file, then the built-in default.
  pub fn resolve(cli: &Cli, service: &ServiceConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let pick = |flag: &Option<String>, var: &str, configured: &Option<String>| {
      flag
        .clone()
        .or_else(|| env(var))
        .or_else(|| configured.clone())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    };

    let api_url = pick(&cli.api_url, API_URL_ENV, &service.api_url).unwrap_or_else(|| api::DEFAULT_API_URL.to_string());
    api::validate_base_url(&api_url)?;

    let auth_url = pick(&cli.auth_url, AUTH_URL_ENV, &service.auth_url).ok_or_else(|| {
      eyre!(
        "No Supabase URL configured. Pass --auth-url, set {AUTH_URL_ENV}, or add service.auth_url to the config file"
      )
    })?;
    api::validate_base_url(&auth_url)?;

    let anon_key = pick(&cli.anon_key, ANON_KEY_ENV, &service.anon_key).ok_or_else(|| {
      eyre!(
        "No Supabase anon key configured. Pass --anon-key, set {ANON_KEY_ENV}, \
         or add service.anon_key to the config file"
      )
    })?;

    Ok(Self { api_url, auth_url, anon_key: Secret::new(anon_key) })
  }
}

#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct KeyBindings(pub HashMap<Route, HashMap<Vec<KeyEvent>, Action>>);

impl KeyBindings {
  /// Shortest key sequence bound to `action` on `route`, written for display.
  pub fn key_for(&self, route: Route, action: &Action) -> Option<String> {
    self
      .get(&route)?
      .iter()
      .filter(|(_, bound)| *bound == action)
      .map(|(keys, _)| keys.iter().map(key_event_to_string).collect::<Vec<_>>().join(" "))
      .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
  }
}

impl<'de> Deserialize<'de> for KeyBindings {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let parsed_map = HashMap::<Route, HashMap<String, Action>>::deserialize(deserializer)?;

    let mut keybindings = HashMap::new();
    for (route, inner_map) in parsed_map {
      let mut converted = HashMap::new();
      for (key_str, cmd) in inner_map {
        let sequence = parse_key_sequence(&key_str).map_err(serde::de::Error::custom)?;
        converted.insert(sequence, cmd);
      }
      keybindings.insert(route, converted);
    }

    Ok(KeyBindings(keybindings))
  }
}

fn parse_key_event(raw: &str) -> Result<KeyEvent, String> {
  let raw_lower = raw.to_ascii_lowercase();
  let (remaining, modifiers) = extract_modifiers(&raw_lower);
  parse_key_code_with_modifiers(remaining, modifiers)
}

fn extract_modifiers(raw: &str) -> (&str, KeyModifiers) {
  let mut modifiers = KeyModifiers::empty();
  let mut current = raw;

  loop {
    match current {
      rest if rest.starts_with("ctrl-") => {
        modifiers.insert(KeyModifiers::CONTROL);
        current = &rest[5..];
      },
      rest if rest.starts_with("alt-") => {
        modifiers.insert(KeyModifiers::ALT);
        current = &rest[4..];
      },
      rest if rest.starts_with("shift-") => {
        modifiers.insert(KeyModifiers::SHIFT);
        current = &rest[6..];
      },
      _ => break,
    };
  }

  (current, modifiers)
}

fn parse_key_code_with_modifiers(raw: &str, mut modifiers: KeyModifiers) -> Result<KeyEvent, String> {
  let c = match raw {
    "esc" => KeyCode::Esc,
    "enter" => KeyCode::Enter,
    "left" => KeyCode::Left,
    "right" => KeyCode::Right,
    "up" => KeyCode::Up,
    "down" => KeyCode::Down,
    "home" => KeyCode::Home,
    "end" => KeyCode::End,
    "pageup" => KeyCode::PageUp,
    "pagedown" => KeyCode::PageDown,
    "backtab" => {
      modifiers.insert(KeyModifiers::SHIFT);
      KeyCode::BackTab
    },
    "backspace" => KeyCode::Backspace,
    "delete" => KeyCode::Delete,
    "insert" => KeyCode::Insert,
    "f1" => KeyCode::F(1),
    "f2" => KeyCode::F(2),
    "f3" => KeyCode::F(3),
    "f4" => KeyCode::F(4),
    "f5" => KeyCode::F(5),
    "f6" => KeyCode::F(6),
    "f7" => KeyCode::F(7),
    "f8" => KeyCode::F(8),
    "f9" => KeyCode::F(9),
    "f10" => KeyCode::F(10),
    "f11" => KeyCode::F(11),
    "f12" => KeyCode::F(12),
    "space" => KeyCode::Char(' '),
    "hyphen" | "minus" => KeyCode::Char('-'),
    "tab" => KeyCode::Tab,
    c if c.len() == 1 => {
      let mut c = c.chars().next().ok_or_else(|| format!("Unable to parse {raw}"))?;
      if modifiers.contains(KeyModifiers::SHIFT) {
        c = c.to_ascii_uppercase();
      }
      KeyCode::Char(c)
    },
    _ => return Err(format!("Unable to parse {raw}")),
  };
  Ok(KeyEvent::new(c, modifiers))
}

/// Inverse of the `"<ctrl-c>"` notation; pages label their key hints with it.
pub fn key_event_to_string(key_event: &KeyEvent) -> String {
  let char;
  let key_code = match key_event.code {
    KeyCode::Backspace => "backspace",
    KeyCode::Enter => "enter",
    KeyCode::Left => "left",
    KeyCode::Right => "right",
    KeyCode::Up => "up",
    KeyCode::Down => "down",
    KeyCode::Home => "home",
    KeyCode::End => "end",
    KeyCode::PageUp => "pageup",
    KeyCode::PageDown => "pagedown",
    KeyCode::Tab => "tab",
    KeyCode::BackTab => "backtab",
    KeyCode::Delete => "delete",
    KeyCode::Insert => "insert",
    KeyCode::F(c) => {
      char = format!("f({c})");
      &char
    },
    KeyCode::Char(' ') => "space",
    KeyCode::Char(c) => {
      char = c.to_string();
      &char
    },
    KeyCode::Esc => "esc",
    _ => "",
  };

  let mut modifiers = Vec::with_capacity(3);

  if key_event.modifiers.intersects(KeyModifiers::CONTROL) {
    modifiers.push("ctrl");
  }

  if key_event.modifiers.intersects(KeyModifiers::SHIFT) {
    modifiers.push("shift");
  }

  if key_event.modifiers.intersects(KeyModifiers::ALT) {
    modifiers.push("alt");
  }

  let mut key = modifiers.join("-");

  if !key.is_empty() {
    key.push('-');
  }
  key.push_str(key_code);

  key
}

pub fn parse_key_sequence(raw: &str) -> Result<Vec<KeyEvent>, String> {
  if raw.chars().filter(|c| *c == '>').count() != raw.chars().filter(|c| *c == '<').count() {
    return Err(format!("Unable to parse `{}`", raw));
  }
  let raw = if !raw.contains("><") {
    let raw = raw.strip_prefix('<').unwrap_or(raw);
    let raw = raw.strip_suffix('>').unwrap_or(raw);
    raw
  } else {
    raw
  };
  let sequences = raw
    .split("><")
    .map(|seq| {
      if let Some(s) = seq.strip_prefix('<') {
        s
      } else if let Some(s) = seq.strip_suffix('>') {
        s
      } else {
        seq
      }
    })
    .collect::<Vec<_>>();

  sequences.into_iter().map(parse_key_event).collect()
}
