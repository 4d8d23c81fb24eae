use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
  prelude::*,
  widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use whareiq_theme as theme;

use super::{centered, route_hints, Component};
use crate::{action::Action, config::Config, route::Route};

pub const PRODUCT_NAME: &str = "WhareIQ";
pub const TAGLINE: &str = "Ask your PostgreSQL database questions in plain English, safely.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Health {
  Checking,
  Up(String),
  Down(String),
}

pub struct Landing {
  command_tx: Option<UnboundedSender<Action>>,
  config: Config,
  health: Health,
}

impl Default for Landing {
  fn default() -> Self {
    Self::new()
  }
}

impl Landing {
  pub fn new() -> Self {
    Self { command_tx: None, config: Config::default(), health: Health::Checking }
  }

  fn health_line(&self) -> Line<'static> {
    match &self.health {
      Health::Checking => Line::styled("Checking service...", theme::muted()),
      Health::Up(service) => Line::styled(format!("● {service} is up"), theme::success()),
      Health::Down(reason) => Line::styled(format!("● Service unavailable: {reason}"), theme::error()),
    }
  }
}

fn describe(body: &Value) -> String {
  let service = body.get("service").and_then(Value::as_str).unwrap_or(PRODUCT_NAME);
  match body.get("status").and_then(Value::as_str) {
    Some("ok") | None => service.to_string(),
    Some(status) => format!("{service} ({status})"),
  }
}

impl Component for Landing {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn register_config_handler(&mut self, config: Config) -> Result<()> {
    self.config = config;
    Ok(())
  }

  fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::CheckHealth => self.health = Health::Checking,
      Action::HealthChecked(_, Ok(body)) => self.health = Health::Up(describe(&body)),
      Action::HealthChecked(_, Err(e)) => self.health = Health::Down(e.to_string()),
      _ => {},
    }
    Ok(None)
  }

  fn init(&mut self, _area: Rect) -> Result<()> {
    if let Some(tx) = &self.command_tx {
      tx.send(Action::CheckHealth)?;
    }
    Ok(())
  }

  fn handle_events(&mut self, event: Option<crate::tui::Event>) -> Result<Option<Action>> {
    if let Some(crate::tui::Event::Key(key)) = event {
      self.handle_key_events(key)
    } else {
      Ok(None)
    }
  }

  fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    match key.code {
      KeyCode::Enter => Ok(Some(Action::Navigate(Route::SignIn))),
      _ => Ok(None),
    }
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let card = centered(area, 64, 11);
    let block = Block::default()
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(theme::border(true))
      .title(Span::styled(format!(" {PRODUCT_NAME} "), theme::title()))
      .style(theme::bg_primary());

    let text = vec![
      Line::default(),
      Line::styled(PRODUCT_NAME, theme::title()),
      Line::default(),
      Line::styled(TAGLINE, theme::bg_primary()),
      Line::default(),
      route_hints(&self.config, Route::Landing, &[], &[
        (Action::Navigate(Route::SignIn), "Log in"),
        (Action::Navigate(Route::SignUp), "Sign up"),
        (Action::CheckHealth, "Recheck"),
        (Action::Quit, "Quit"),
      ]),
      Line::default(),
      self.health_line(),
    ];

    f.render_widget(Paragraph::new(text).block(block).alignment(Alignment::Center).wrap(Wrap { trim: true }), card);
    Ok(())
  }
}
