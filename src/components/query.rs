use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
  prelude::*,
  widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use tokio::sync::mpsc::UnboundedSender;
use tui_textarea::TextArea;
use whareiq_theme as theme;

use super::{field_text, route_hints, style_field, text_field, Component};
use crate::{
  action::Action,
  config::Config,
  flows::{query::BUSY_LABEL, QueryFlow},
  route::Route,
};

pub struct QueryPage {
  command_tx: Option<UnboundedSender<Action>>,
  config: Config,
  flow: QueryFlow,
  question: TextArea<'static>,
  scroll: u16,
}

impl Default for QueryPage {
  fn default() -> Self {
    Self::new()
  }
}

impl QueryPage {
  pub fn new() -> Self {
    let mut question = text_field("Ask WhareIQ", "Ask a question about your data...", false);
    style_field(&mut question, "Ask WhareIQ", true, None);
    Self { command_tx: None, config: Config::default(), flow: QueryFlow::new(), question, scroll: 0 }
  }

  pub fn flow(&self) -> &QueryFlow {
    &self.flow
  }

  fn ask(&mut self) -> Option<Action> {
    let request = self.flow.begin_ask(&field_text(&self.question))?;
    self.scroll = 0;
    Some(Action::SubmitQuestion(request))
  }

  fn answer_text(&self) -> Text<'static> {
    if let Some(error) = self.flow.error() {
      return Text::styled(error.to_string(), theme::error());
    }
    match self.flow.answer() {
      Some(answer) => Text::styled(answer.render(), theme::json()),
      None => Text::styled("Answers appear here.", theme::muted()),
    }
  }
}

impl Component for QueryPage {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn register_config_handler(&mut self, config: Config) -> Result<()> {
    self.config = config;
    Ok(())
  }

  fn update(&mut self, action: Action) -> Result<Option<Action>> {
    if let Action::QueryResolved(_, result) = action {
      self.flow.resolve(result);
    }
    Ok(None)
  }

  fn init(&mut self, _area: Rect) -> Result<()> {
    Ok(())
  }

  fn handle_events(&mut self, event: Option<crate::tui::Event>) -> Result<Option<Action>> {
    match event {
      Some(crate::tui::Event::Key(key)) => self.handle_key_events(key),
      Some(crate::tui::Event::Paste(text)) => {
        self.question.insert_str(text.replace(['\r', '\n'], " "));
        Ok(None)
      },
      _ => Ok(None),
    }
  }

  fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    match key.code {
      KeyCode::Enter => return Ok(self.ask()),
      KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
      KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
      _ => {
        self.question.input(key);
      },
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let [question, status, answer, hints] =
      Layout::vertical([Constraint::Length(3), Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
        .margin(1)
        .areas(area);

    f.render_widget(&self.question, question);

    let status_line = if self.flow.is_pending() {
      Line::from(Span::styled(format!(" {BUSY_LABEL} "), theme::button(false)))
    } else {
      Line::from(Span::styled(" Ask ", theme::button(true)))
    };
    f.render_widget(Paragraph::new(status_line), status);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(theme::border(false))
      .title(Span::styled(" Answer ", theme::title()));
    f.render_widget(
      Paragraph::new(self.answer_text()).block(block).wrap(Wrap { trim: false }).scroll((self.scroll, 0)),
      answer,
    );

    f.render_widget(
      Paragraph::new(route_hints(&self.config, Route::Query, &[("Enter", "Ask"), ("PgUp/PgDn", "Scroll")], &[
        (Action::Navigate(Route::ConnectDb), "Database"),
        (Action::SignOut, "Sign out"),
      ])),
      hints,
    );
    Ok(())
  }
}
