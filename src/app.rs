use std::{future::Future, sync::Arc};

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
  layout::{Constraint, Layout, Rect},
  text::{Line, Span},
  widgets::{Block, Paragraph},
  Frame,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use whareiq_theme as theme;

use crate::{
  action::Action,
  api::ApiClient,
  components::{page_for, Component},
  config::Config,
  flows::FlowTicket,
  gate::{AuthGate, GateDecision},
  models::{AuthMode, AuthState},
  route::Route,
  session::{ListenerId, Session, SessionStore},
  tui,
};

pub struct App {
  pub config: Config,
  pub tick_rate: f64,
  pub frame_rate: f64,
  pub route: Route,
  pub should_quit: bool,
  pub should_suspend: bool,
  pub last_tick_key_events: Vec<KeyEvent>,
  page: Option<Box<dyn Component>>,
  gate: AuthGate,
  session: Arc<SessionStore>,
  api: Arc<ApiClient>,
  epoch: FlowTicket,
  user: Option<String>,
  /// Set by a successful connect-database call for the page it navigates to.
  connected: bool,
  last_error: Option<String>,
  listener: Option<ListenerId>,
  action_tx: UnboundedSender<Action>,
  action_rx: UnboundedReceiver<Action>,
}

impl App {
  pub fn new(config: Config, session: Arc<SessionStore>, api: Arc<ApiClient>, route: Route) -> Self {
    let (action_tx, action_rx) = mpsc::unbounded_channel();
    Self {
      config,
      tick_rate: 1.0,
      frame_rate: 4.0,
      route,
      should_quit: false,
      should_suspend: false,
      last_tick_key_events: Vec::new(),
      page: None,
      gate: AuthGate::new(),
      session,
      api,
      epoch: FlowTicket::default(),
      user: None,
      connected: false,
      last_error: None,
      listener: None,
      action_tx,
      action_rx,
    }
  }

  pub fn tick_rate(mut self, tick_rate: f64) -> Self {
    self.tick_rate = tick_rate;
    self
  }

  pub fn frame_rate(mut self, frame_rate: f64) -> Self {
    self.frame_rate = frame_rate;
    self
  }

  pub fn action_sender(&self) -> UnboundedSender<Action> {
    self.action_tx.clone()
  }

  pub fn epoch(&self) -> FlowTicket {
    self.epoch
  }

  pub fn auth_state(&self) -> AuthState {
    AuthState::derive(self.user.is_some(), self.connected)
  }

  /// Subscribe to session transitions and start the first session read.
  /// Until that read lands the gate holds and nothing is drawn.
  pub fn start(&mut self) {
    let tx = self.action_tx.clone();
    self.listener = Some(self.session.on_change(move |session| {
      let _ = tx.send(Action::SessionChanged(session.cloned()));
    }));

    let session = self.session.clone();
    let tx = self.action_tx.clone();
    tokio::spawn(async move {
      let read = session.get_session().await;
      if let Some(reason) = read.transient_error {
        log::warn!("Starting with a cached session: {reason}");
      }
      let _ = tx.send(Action::SessionChanged(read.session));
    });
  }

  pub async fn run(&mut self) -> Result<()> {
    let mut tui = tui::Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate);
    tui.enter()?;
    self.start();

    loop {
      if let Some(e) = tui.next().await {
        self.handle_event(e)?;
      }

      while let Ok(action) = self.action_rx.try_recv() {
        match action {
          Action::Render => {
            tui.draw(|f| self.render(f))?;
          },
          Action::Resize(w, h) => {
            tui.resize(Rect::new(0, 0, w, h))?;
            tui.draw(|f| self.render(f))?;
          },
          action => self.update(action)?,
        }
      }

      if self.should_suspend {
        tui.suspend()?;
        self.action_tx.send(Action::Resume)?;
        tui = tui::Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate);
        tui.enter()?;
      } else if self.should_quit {
        tui.stop()?;
        break;
      }
    }
    tui.exit()?;
    Ok(())
  }

  /// Translate a terminal event into actions: route keybindings first, then
  /// the visible page for keys nothing else claimed.
  pub fn handle_event(&mut self, e: tui::Event) -> Result<()> {
    let action_tx = self.action_tx.clone();
    match e {
      tui::Event::Quit => action_tx.send(Action::Quit)?,
      tui::Event::Tick => action_tx.send(Action::Tick)?,
      tui::Event::Render => action_tx.send(Action::Render)?,
      tui::Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
      tui::Event::Key(key) => {
        if let Some(action) = self.lookup_keybinding(key) {
          log::debug!("Got action: {action:?}");
          action_tx.send(action)?;
          return Ok(());
        }
      },
      _ => {},
    }

    if let Some(page) = self.page.as_mut() {
      if let Some(action) = page.handle_events(Some(e))? {
        action_tx.send(action)?;
      }
    }
    Ok(())
  }

  fn lookup_keybinding(&mut self, key: KeyEvent) -> Option<Action> {
    let keymap = self.config.keybindings.get(&self.route)?;
    if let Some(action) = keymap.get(&vec![key]) {
      self.last_tick_key_events.clear();
      return Some(action.clone());
    }

    // Multi-key combinations
    self.last_tick_key_events.push(key);
    let action = keymap.get(&self.last_tick_key_events).cloned();
    if action.is_some() {
      self.last_tick_key_events.clear();
    }
    action
  }

  /// Apply one action. Everything except drawing happens here.
  pub fn update(&mut self, action: Action) -> Result<()> {
    if !matches!(action, Action::Tick | Action::Render) {
      log::debug!("{action:?}");
    }

    if let Some(ticket) = action.ticket() {
      if ticket != self.epoch {
        log::debug!("Dropping {action} from {ticket:?}, now at {:?}", self.epoch);
        return Ok(());
      }
    }

    match &action {
      Action::Tick => self.last_tick_key_events.clear(),
      Action::Quit => self.should_quit = true,
      Action::Suspend => self.should_suspend = true,
      Action::Resume => self.should_suspend = false,
      Action::Error(message) => self.last_error = Some(message.clone()),
      Action::Navigate(route) => self.navigate(*route)?,
      Action::SessionChanged(session) => self.session_changed(session.as_ref())?,
      Action::SignOut => {
        let session = self.session.clone();
        tokio::spawn(async move { session.sign_out().await });
      },
      Action::SubmitCredentials(mode, credentials) => {
        let (mode, credentials, session) = (*mode, credentials.clone(), self.session.clone());
        self.spawn_call(Action::AuthResolved, async move {
          match mode {
            AuthMode::SignIn => session.sign_in(&credentials).await,
            AuthMode::SignUp => session.sign_up(&credentials).await,
          }
        });
      },
      Action::SubmitConnection(request) => {
        let (request, api) = (request.clone(), self.api.clone());
        self.spawn_call(Action::ConnectionResolved, async move { api.connect_database(&request).await });
      },
      Action::SubmitQuestion(request) => {
        let (request, api) = (request.clone(), self.api.clone());
        self.spawn_call(Action::QueryResolved, async move { api.query(&request).await });
      },
      Action::CheckHealth => {
        let api = self.api.clone();
        self.spawn_call(Action::HealthChecked, async move { api.health().await });
      },
      Action::ConnectionResolved(_, Ok(_)) => self.connected = true,
      _ => {},
    }

    if let Some(page) = self.page.as_mut() {
      if let Some(next) = page.update(action)? {
        self.action_tx.send(next)?;
      }
    }
    Ok(())
  }

  /// Run `call` off the loop; its result comes back tagged with the current
  /// flow epoch.
  fn spawn_call<T, F>(&self, wrap: fn(FlowTicket, T) -> Action, call: F)
  where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
  {
    let ticket = self.epoch;
    let tx = self.action_tx.clone();
    tokio::spawn(async move {
      let result = call.await;
      let _ = tx.send(wrap(ticket, result));
    });
  }

  fn navigate(&mut self, route: Route) -> Result<()> {
    log::info!("Navigating {} -> {route}", self.route);
    let connected = self.connected && route == Route::Query;
    self.route = route;
    self.epoch = self.epoch.next();
    self.page = None;
    self.connected = connected;
    self.last_error = None;
    self.last_tick_key_events.clear();
    self.apply_gate()
  }

  fn session_changed(&mut self, session: Option<&Session>) -> Result<()> {
    self.user = session.map(|s| s.display_name().to_string());
    if session.is_none() {
      self.connected = false;
    }
    self.gate.observe(session);
    self.apply_gate()
  }

  fn apply_gate(&mut self) -> Result<()> {
    match self.gate.evaluate(self.route) {
      GateDecision::Hold => {},
      GateDecision::Redirect(target) => {
        self.page = None;
        self.action_tx.send(Action::Navigate(target))?;
      },
      GateDecision::Render if self.page.is_none() => {
        let mut page = page_for(self.route);
        page.register_action_handler(self.action_tx.clone())?;
        page.register_config_handler(self.config.clone())?;
        page.init(Rect::default())?;
        self.page = Some(page);
      },
      GateDecision::Render => {},
    }
    Ok(())
  }

  /// Draw the visible page and the status bar. Nothing at all while the
  /// gate is undecided.
  pub fn render(&mut self, f: &mut Frame<'_>) {
    let Some(page) = self.page.as_mut() else {
      return;
    };

    let [body, status] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(f.area());
    f.render_widget(Block::default().style(theme::bg_primary()), body);
    if let Err(e) = page.draw(f, body) {
      let _ = self.action_tx.send(Action::Error(format!("Failed to draw: {e:?}")));
    }

    let mut spans = vec![Span::styled(format!(" WhareIQ · {} ", self.route), theme::status_bar())];
    if let Some(user) = &self.user {
      spans.push(Span::styled(format!("· {user} "), theme::status_bar()));
    }
    if let Some(error) = &self.last_error {
      spans.push(Span::styled(format!(" {error}"), theme::error()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(theme::status_bar()), status);
  }

  /// Process queued actions until none arrive for `idle`. Drawing actions
  /// are skipped.
  pub async fn settle(&mut self, idle: std::time::Duration) -> Result<()> {
    while let Ok(Some(action)) = tokio::time::timeout(idle, self.action_rx.recv()).await {
      match action {
        Action::Render | Action::Resize(..) => {},
        action => self.update(action)?,
      }
    }
    Ok(())
  }

  pub fn has_page(&self) -> bool {
    self.page.is_some()
  }
}

impl Drop for App {
  fn drop(&mut self) {
    if let Some(id) = self.listener.take() {
      self.session.remove_listener(id);
    }
  }
}
