use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
  prelude::*,
  widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use tokio::sync::mpsc::UnboundedSender;
use tui_textarea::TextArea;
use whareiq_theme as theme;

use super::{centered, field_text, route_hints, style_field, text_field, Component};
use crate::{
  action::Action,
  config::Config,
  models::{AuthMode, Credentials},
  route::Route,
  secret::Secret,
  session::AuthOutcome,
};

pub const CONFIRMATION_SENT: &str = "Check your email to confirm your account";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Email,
  Password,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Notice {
  None,
  Error(String),
  Info(String),
}

/// Sign-in and sign-up share one form; only the title and the provider call
/// differ.
pub struct AuthForm {
  command_tx: Option<UnboundedSender<Action>>,
  config: Config,
  mode: AuthMode,
  email: TextArea<'static>,
  password: TextArea<'static>,
  focus: Field,
  pending: bool,
  notice: Notice,
}

impl AuthForm {
  pub fn new(mode: AuthMode) -> Self {
    let mut form = Self {
      command_tx: None,
      config: Config::default(),
      mode,
      email: text_field("Email", "you@example.com", false),
      password: text_field("Password", "", true),
      focus: Field::Email,
      pending: false,
      notice: Notice::None,
    };
    form.restyle();
    form
  }

  pub fn mode(&self) -> AuthMode {
    self.mode
  }

  pub fn is_pending(&self) -> bool {
    self.pending
  }

  fn title(&self) -> &'static str {
    match self.mode {
      AuthMode::SignIn => "Sign in to WhareIQ",
      AuthMode::SignUp => "Create your WhareIQ account",
    }
  }

  fn restyle(&mut self) {
    style_field(&mut self.email, "Email", self.focus == Field::Email, None);
    style_field(&mut self.password, "Password", self.focus == Field::Password, None);
  }

  fn submit(&mut self) -> Option<Action> {
    if self.pending {
      return None;
    }
    let email = field_text(&self.email).trim().to_string();
    let password = field_text(&self.password);
    if email.is_empty() || password.is_empty() {
      self.notice = Notice::Error("Email and password are required".to_string());
      return None;
    }

    self.pending = true;
    self.notice = Notice::None;
    Some(Action::SubmitCredentials(self.mode, Credentials { email, password: Secret::new(password) }))
  }

  fn notice_line(&self) -> Line<'static> {
    if self.pending {
      return Line::styled("Contacting identity provider...", theme::muted());
    }
    match &self.notice {
      Notice::None => Line::default(),
      Notice::Error(message) => Line::styled(message.clone(), theme::error()),
      Notice::Info(message) => Line::styled(message.clone(), theme::success()),
    }
  }
}

impl Component for AuthForm {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn register_config_handler(&mut self, config: Config) -> Result<()> {
    self.config = config;
    Ok(())
  }

  fn update(&mut self, action: Action) -> Result<Option<Action>> {
    if let Action::AuthResolved(_, result) = action {
      self.pending = false;
      match result {
        // The auth gate moves a signed-in user on
        Ok(AuthOutcome::SignedIn) => self.notice = Notice::None,
        Ok(AuthOutcome::ConfirmationSent) => self.notice = Notice::Info(CONFIRMATION_SENT.to_string()),
        Err(e) => self.notice = Notice::Error(e.to_string()),
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
      Some(crate::tui::Event::Paste(text)) if !self.pending => {
        match self.focus {
          Field::Email => self.email.insert_str(text.trim()),
          Field::Password => self.password.insert_str(text.trim()),
        };
        Ok(None)
      },
      _ => Ok(None),
    }
  }

  fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    match key.code {
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.focus = if self.focus == Field::Email { Field::Password } else { Field::Email };
        self.restyle();
        Ok(None)
      },
      KeyCode::Enter if self.focus == Field::Email => {
        self.focus = Field::Password;
        self.restyle();
        Ok(None)
      },
      KeyCode::Enter => Ok(self.submit()),
      _ if self.pending => Ok(None),
      _ => {
        match self.focus {
          Field::Email => self.email.input(key),
          Field::Password => self.password.input(key),
        };
        Ok(None)
      },
    }
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let card = centered(area, 56, 14);
    let block = Block::default()
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(theme::border(true))
      .title(Span::styled(format!(" {} ", self.title()), theme::title()))
      .style(theme::bg_primary());
    let inner = block.inner(card);
    f.render_widget(block, card);

    let [email, password, notice, hints] =
      Layout::vertical([Constraint::Length(3), Constraint::Length(3), Constraint::Length(3), Constraint::Length(1)])
        .margin(1)
        .areas(inner);
    f.render_widget(&self.email, email);
    f.render_widget(&self.password, password);
    f.render_widget(Paragraph::new(self.notice_line()).wrap(Wrap { trim: true }), notice);

    let (route, switch) = match self.mode {
      AuthMode::SignIn => (Route::SignIn, (Action::Navigate(Route::SignUp), "Sign up")),
      AuthMode::SignUp => (Route::SignUp, (Action::Navigate(Route::SignIn), "Log in")),
    };
    let line = route_hints(&self.config, route, &[("Tab", "Next"), ("Enter", "Submit")], &[
      switch,
      (Action::Navigate(Route::Landing), "Back"),
    ]);
    f.render_widget(Paragraph::new(line), hints);
    Ok(())
  }
}
