use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
  prelude::*,
  widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedSender;
use tui_textarea::TextArea;
use whareiq_theme as theme;

use super::{centered, field_text, route_hints, style_field, text_field, Component};
use crate::{
  action::Action,
  config::Config,
  flows::{ConnectionField, ConnectionFlow, ConnectionState},
  models::ConnectionResult,
  route::Route,
};

pub struct ConnectPage {
  command_tx: Option<UnboundedSender<Action>>,
  config: Config,
  flow: ConnectionFlow,
  fields: Vec<(ConnectionField, TextArea<'static>)>,
  focus: ConnectionField,
}

impl Default for ConnectPage {
  fn default() -> Self {
    Self::new()
  }
}

impl ConnectPage {
  pub fn new() -> Self {
    let fields = ConnectionField::iter()
      .map(|field| {
        let (placeholder, masked) = match field {
          ConnectionField::Host => ("localhost", false),
          ConnectionField::Port => ("5432", false),
          ConnectionField::DbName => ("sales", false),
          ConnectionField::Username => ("postgres", false),
          ConnectionField::Password => ("", true),
        };
        (field, text_field(&field.to_string(), placeholder, masked))
      })
      .collect();
    let mut page = Self {
      command_tx: None,
      config: Config::default(),
      flow: ConnectionFlow::new(),
      fields,
      focus: ConnectionField::Host,
    };
    page.restyle();
    page
  }

  pub fn flow(&self) -> &ConnectionFlow {
    &self.flow
  }

  fn restyle(&mut self) {
    for (field, area) in self.fields.iter_mut() {
      style_field(area, &field.to_string(), *field == self.focus, self.flow.field_error(*field));
    }
  }

  fn focused_area(&mut self) -> Option<&mut TextArea<'static>> {
    let focus = self.focus;
    self.fields.iter_mut().find(|(field, _)| *field == focus).map(|(_, area)| area)
  }

  fn move_focus(&mut self, forward: bool) {
    self.focus = if forward { self.focus.next() } else { self.focus.previous() };
    self.restyle();
  }

  fn edit(&mut self, key: KeyEvent) {
    if self.flow.is_submitting() {
      return;
    }
    let focus = self.focus;
    let Some(area) = self.focused_area() else {
      return;
    };
    if area.input(key) {
      let value = field_text(area);
      self.flow.set_field(focus, value);
      self.restyle();
    }
  }

  fn submit(&mut self) -> Option<Action> {
    let request = self.flow.begin_submit();
    self.restyle();
    request.map(Action::SubmitConnection)
  }

  fn status_line(&self) -> Line<'static> {
    match self.flow.state() {
      ConnectionState::Submitting => Line::styled("Connecting...", theme::muted()),
      ConnectionState::EditingWithError(reason) => Line::styled(reason.clone(), theme::error()),
      ConnectionState::NavigatedAway => Line::styled("Connected", theme::success()),
      ConnectionState::Editing => Line::default(),
    }
  }
}

impl Component for ConnectPage {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn register_config_handler(&mut self, config: Config) -> Result<()> {
    self.config = config;
    Ok(())
  }

  fn update(&mut self, action: Action) -> Result<Option<Action>> {
    if let Action::ConnectionResolved(_, result) = action {
      let outcome = self.flow.resolve(result);
      self.restyle();
      if let Some(ConnectionResult::Connected(ack)) = outcome {
        log::info!("Database connected: {ack}");
        return Ok(Some(Action::Navigate(Route::Query)));
      }
    }
    Ok(None)
  }

  fn init(&mut self, _area: Rect) -> Result<()> {
    Ok(())
  }

  fn handle_events(&mut self, event: Option<crate::tui::Event>) -> Result<Option<Action>> {
    match event {
      Some(crate::tui::Event::Key(key)) => self.handle_key_events(key),
      Some(crate::tui::Event::Paste(text)) if !self.flow.is_submitting() => {
        let focus = self.focus;
        if let Some(area) = self.focused_area() {
          area.insert_str(text.trim());
          let value = field_text(area);
          self.flow.set_field(focus, value);
          self.restyle();
        }
        Ok(None)
      },
      _ => Ok(None),
    }
  }

  fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    match key.code {
      KeyCode::Tab | KeyCode::Down => self.move_focus(true),
      KeyCode::BackTab | KeyCode::Up => self.move_focus(false),
      KeyCode::Enter if self.focus == ConnectionField::Password => return Ok(self.submit()),
      KeyCode::Enter => self.move_focus(true),
      _ => self.edit(key),
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let card = centered(area, 60, 22);
    let block = Block::default()
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(theme::border(true))
      .title(Span::styled(" Connect your database ", theme::title()))
      .style(theme::bg_primary());
    let inner = block.inner(card);
    f.render_widget(block, card);

    let mut constraints = vec![Constraint::Length(3); self.fields.len()];
    constraints.extend([Constraint::Length(2), Constraint::Length(1)]);
    let rows = Layout::vertical(constraints).margin(1).split(inner);

    for (i, (_, field)) in self.fields.iter().enumerate() {
      f.render_widget(field, rows[i]);
    }
    let n = self.fields.len();
    f.render_widget(Paragraph::new(self.status_line()).wrap(Wrap { trim: true }), rows[n]);

    let submit_label = if self.flow.is_submitting() { "Connecting..." } else { "Connect" };
    let hints = route_hints(&self.config, Route::ConnectDb, &[("Tab", "Next"), ("Enter", submit_label)], &[
      (Action::Navigate(Route::Query), "Ask"),
      (Action::SignOut, "Sign out"),
    ]);
    f.render_widget(Paragraph::new(hints), rows[n + 1]);
    Ok(())
  }
}
