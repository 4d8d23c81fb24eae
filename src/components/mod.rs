pub mod auth_form;
pub mod connect;
pub mod landing;
pub mod query;

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
  layout::{Constraint, Flex, Layout, Rect},
  text::{Line, Span},
  Frame,
};
use tokio::sync::mpsc::UnboundedSender;
use tui_textarea::TextArea;
use whareiq_theme as theme;

use crate::{action::Action, config::Config, models::AuthMode, route::Route, tui};

pub use self::{auth_form::AuthForm, connect::ConnectPage, landing::Landing, query::QueryPage};

pub trait Component {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()>;
  fn register_config_handler(&mut self, config: Config) -> Result<()>;
  fn update(&mut self, action: Action) -> Result<Option<Action>>;
  fn handle_events(&mut self, event: Option<tui::Event>) -> Result<Option<Action>>;
  fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>>;
  fn init(&mut self, area: Rect) -> Result<()>;
  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()>;
}

/// Fresh page for `route`. Pages never outlive a navigation.
pub fn page_for(route: Route) -> Box<dyn Component> {
  match route {
    Route::Landing => Box::new(Landing::new()),
    Route::SignIn => Box::new(AuthForm::new(AuthMode::SignIn)),
    Route::SignUp => Box::new(AuthForm::new(AuthMode::SignUp)),
    Route::ConnectDb => Box::new(ConnectPage::new()),
    Route::Query => Box::new(QueryPage::new()),
  }
}

/// Fixed-size box in the middle of `area`, clamped to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height.min(area.height))]).flex(Flex::Center).areas(area);
  let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))]).flex(Flex::Center).areas(row);
  cell
}

/// Page-local hints followed by the route keybindings that are actually bound.
pub(crate) fn route_hints(
  config: &Config,
  route: Route,
  local: &[(&str, &str)],
  bound: &[(Action, &str)],
) -> Line<'static> {
  let mut hints: Vec<(String, &str)> = local.iter().map(|(key, label)| (key.to_string(), *label)).collect();
  hints.extend(bound.iter().filter_map(|(action, label)| Some((config.keybindings.key_for(route, action)?, *label))));
  key_hints(&hints)
}

/// `key action · key action` footer line.
pub(crate) fn key_hints<K: AsRef<str>>(hints: &[(K, &str)]) -> Line<'static> {
  let mut spans = Vec::with_capacity(hints.len() * 3);
  for (i, (key, label)) in hints.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled("  ", theme::muted()));
    }
    spans.push(Span::styled(key.as_ref().to_string(), theme::key_hint()));
    spans.push(Span::styled(format!(" {label}"), theme::muted()));
  }
  Line::from(spans)
}

/// Single-line text field.
pub(crate) fn text_field(title: &str, placeholder: &str, masked: bool) -> TextArea<'static> {
  let mut field = TextArea::default();
  field.set_placeholder_text(placeholder);
  field.set_cursor_line_style(ratatui::style::Style::default());
  if masked {
    field.set_mask_char('•');
  }
  style_field(&mut field, title, false, None);
  field
}

/// Restyle a field for focus and an optional error shown in its title.
pub(crate) fn style_field(field: &mut TextArea<'static>, title: &str, focused: bool, error: Option<&str>) {
  use ratatui::widgets::{Block, Borders};

  let title = match error {
    Some(error) => {
      Line::from(vec![
        Span::styled(format!(" {title} "), theme::title()),
        Span::styled(format!("{error} "), theme::error()),
      ])
    },
    None => Line::from(Span::styled(format!(" {title} "), theme::title())),
  };
  let border = if error.is_some() { theme::error() } else { theme::border(focused) };
  field.set_block(Block::default().borders(Borders::ALL).border_style(border).title(title));
  field.set_style(theme::input());
  field.set_cursor_style(if focused { theme::cursor() } else { ratatui::style::Style::default() });
}

/// Contents of a single-line field.
pub(crate) fn field_text(field: &TextArea<'_>) -> String {
  field.lines().join("")
}
