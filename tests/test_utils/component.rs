use std::sync::Arc;

use color_eyre::Result;
use ratatui::{backend::TestBackend, layout::Rect, Terminal};
use tempfile::TempDir;
use tokio::sync::mpsc::{self, UnboundedSender};
use whareiq::{
    action::Action,
    api::ApiClient,
    app::App,
    components::Component,
    config::Config,
    models::Credentials,
    route::Route,
    secret::Secret,
    session::{SessionCache, SessionStore},
    tui::Event,
};

use super::{FakeIdentityProvider, FakeTransport, TEST_TERMINAL_HEIGHT, TEST_TERMINAL_WIDTH};

pub struct ComponentTestHarness<C: Component> {
    pub component: C,
    pub terminal: Terminal<TestBackend>,
    pub action_tx: UnboundedSender<Action>,
    pub action_rx: tokio::sync::mpsc::UnboundedReceiver<Action>,
}

impl<C: Component> ComponentTestHarness<C> {
    pub fn new(mut component: C) -> Result<Self> {
        let backend = TestBackend::new(TEST_TERMINAL_WIDTH, TEST_TERMINAL_HEIGHT);
        let terminal = Terminal::new(backend)?;
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        component.register_action_handler(action_tx.clone())?;

        let area = Rect::new(0, 0, TEST_TERMINAL_WIDTH, TEST_TERMINAL_HEIGHT);
        component.init(area)?;

        Ok(Self { component, terminal, action_tx, action_rx })
    }

    pub fn with_config(mut self, config: Config) -> Result<Self> {
        self.component.register_config_handler(config)?;
        Ok(self)
    }

    pub fn render(&mut self) -> Result<Vec<String>> {
        self.terminal.draw(|f| {
            self.component.draw(f, f.area()).unwrap();
        })?;
        Ok(buffer_lines(&self.terminal))
    }

    /// Feed events; returns every action the component emitted.
    pub fn send_events(&mut self, events: Vec<Event>) -> Result<Vec<Action>> {
        let mut actions = Vec::new();
        for event in events {
            if let Some(action) = self.component.handle_events(Some(event))? {
                actions.push(action);
            }
        }
        Ok(actions)
    }

    pub fn update(&mut self, action: Action) -> Result<Option<Action>> {
        self.component.update(action)
    }

    pub fn collect_actions(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(action) = self.action_rx.try_recv() {
            actions.push(action);
        }
        actions
    }
}

pub fn buffer_lines(terminal: &Terminal<TestBackend>) -> Vec<String> {
    let buffer = terminal.backend().buffer();
    let mut lines = Vec::new();

    for y in 0..buffer.area.height {
        let mut line = String::new();
        for x in 0..buffer.area.width {
            line.push_str(buffer[(x, y)].symbol());
        }
        lines.push(line.trim_end().to_string());
    }

    lines
}

/// Everything an [`App`] needs, wired to fakes.
pub struct TestEnvironment {
    pub config: Config,
    pub transport: Arc<FakeTransport>,
    pub provider: Arc<FakeIdentityProvider>,
    pub session: Arc<SessionStore>,
    pub api: Arc<ApiClient>,
    pub data_dir: TempDir,
    _config_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let config_dir = tempfile::tempdir()?;
        let data_dir = tempfile::tempdir()?;
        let config = Config::load(config_dir.path(), data_dir.path())?;

        let transport = FakeTransport::new();
        let provider = FakeIdentityProvider::new();
        let session =
            Arc::new(SessionStore::new(provider.clone()).with_cache(SessionCache::in_dir(data_dir.path())));
        let api = Arc::new(ApiClient::new("http://127.0.0.1:8000", transport.clone(), session.clone())?);

        Ok(Self { config, transport, provider, session, api, data_dir, _config_dir: config_dir })
    }

    pub async fn signed_in() -> Result<Self> {
        let env = Self::new()?;
        env.session
            .sign_in(&Credentials { email: "alice@example.com".to_string(), password: Secret::new("pw") })
            .await?;
        Ok(env)
    }

    pub fn app(&self, route: Route) -> App {
        App::new(self.config.clone(), self.session.clone(), self.api.clone(), route)
    }
}
