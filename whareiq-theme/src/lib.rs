//! One Dark palette shared by every WhareIQ page.
//!
//! Kept in its own crate so tweaking a color does not rebuild the client.

use once_cell::sync::Lazy;
use ratatui::style::{Color, Modifier, Style};

// Color constants
pub const ACCENT_BLUE: Color = Color::Rgb(97, 175, 239);
pub const ACCENT_CYAN: Color = Color::Rgb(86, 182, 194);
pub const ACCENT_GREEN: Color = Color::Rgb(152, 195, 121);
pub const ACCENT_ORANGE: Color = Color::Rgb(209, 154, 102);
pub const BG_PRIMARY: Color = Color::Rgb(40, 44, 52);
pub const BG_SECONDARY: Color = Color::Rgb(33, 37, 43);
pub const BG_SELECTION: Color = Color::Rgb(62, 68, 81);
pub const BG_TERTIARY: Color = Color::Rgb(44, 49, 58);
pub const BORDER_FOCUSED: Color = Color::Rgb(97, 175, 239);
pub const BORDER_NORMAL: Color = Color::Rgb(92, 99, 112);
pub const ERROR: Color = Color::Rgb(224, 108, 117);
pub const FG_PRIMARY: Color = Color::Rgb(171, 178, 191);
pub const FG_SECONDARY: Color = Color::Rgb(92, 99, 112);
pub const INFO: Color = Color::Rgb(97, 175, 239);
pub const SUCCESS: Color = Color::Rgb(152, 195, 121);
pub const WARNING: Color = Color::Rgb(229, 192, 123);

pub const STYLE_BG_PRIMARY: Style = Style::new().bg(BG_PRIMARY).fg(FG_PRIMARY);
pub const STYLE_STATUS_BAR: Style = Style::new().bg(BG_SECONDARY).fg(FG_PRIMARY);
pub const STYLE_INPUT: Style = Style::new().bg(BG_TERTIARY).fg(FG_PRIMARY);
pub const STYLE_BORDER_NORMAL: Style = Style::new().fg(BORDER_NORMAL);
pub const STYLE_BORDER_FOCUSED: Style = Style::new().fg(BORDER_FOCUSED);
pub const STYLE_MUTED: Style = Style::new().fg(FG_SECONDARY);
pub const STYLE_INFO: Style = Style::new().fg(INFO);

// Styles with modifiers are cached
static STYLE_TITLE: Lazy<Style> = Lazy::new(|| Style::new().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD));

static STYLE_SUCCESS: Lazy<Style> = Lazy::new(|| Style::new().fg(SUCCESS).add_modifier(Modifier::BOLD));

static STYLE_WARNING: Lazy<Style> = Lazy::new(|| Style::new().fg(WARNING).add_modifier(Modifier::BOLD));

static STYLE_ERROR: Lazy<Style> = Lazy::new(|| Style::new().fg(ERROR).add_modifier(Modifier::BOLD));

static STYLE_BUTTON_ACTIVE: Lazy<Style> =
  Lazy::new(|| Style::new().bg(ACCENT_BLUE).fg(BG_PRIMARY).add_modifier(Modifier::BOLD));

static STYLE_BUTTON_DISABLED: Lazy<Style> =
  Lazy::new(|| Style::new().bg(BG_SELECTION).fg(FG_SECONDARY).add_modifier(Modifier::DIM));

static STYLE_KEY_HINT: Lazy<Style> = Lazy::new(|| Style::new().fg(ACCENT_ORANGE).add_modifier(Modifier::BOLD));

static STYLE_CURSOR: Lazy<Style> = Lazy::new(|| Style::new().add_modifier(Modifier::REVERSED));

static STYLE_JSON: Lazy<Style> = Lazy::new(|| Style::new().bg(BG_SECONDARY).fg(ACCENT_CYAN));

/// Main application background
#[inline]
pub fn bg_primary() -> Style {
  STYLE_BG_PRIMARY
}

/// Status line at the bottom of every page
#[inline]
pub fn status_bar() -> Style {
  STYLE_STATUS_BAR
}

/// Input field styling
#[inline]
pub fn input() -> Style {
  STYLE_INPUT
}

/// Border styling based on focus state
#[inline]
pub fn border(focused: bool) -> Style {
  if focused {
    STYLE_BORDER_FOCUSED
  } else {
    STYLE_BORDER_NORMAL
  }
}

#[inline]
pub fn title() -> Style {
  *STYLE_TITLE
}

#[inline]
pub fn success() -> Style {
  *STYLE_SUCCESS
}

#[inline]
pub fn warning() -> Style {
  *STYLE_WARNING
}

#[inline]
pub fn error() -> Style {
  *STYLE_ERROR
}

#[inline]
pub fn info() -> Style {
  STYLE_INFO
}

#[inline]
pub fn muted() -> Style {
  STYLE_MUTED
}

/// Submit button; greyed out while a request is in flight
#[inline]
pub fn button(enabled: bool) -> Style {
  if enabled {
    *STYLE_BUTTON_ACTIVE
  } else {
    *STYLE_BUTTON_DISABLED
  }
}

#[inline]
pub fn key_hint() -> Style {
  *STYLE_KEY_HINT
}

/// Text cursor inside the focused field
#[inline]
pub fn cursor() -> Style {
  *STYLE_CURSOR
}

/// Raw JSON answers from the service
#[inline]
pub fn json() -> Style {
  *STYLE_JSON
}
