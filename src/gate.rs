use tracing::debug;

use crate::{route::Route, session::Session};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
  /// The session store has not answered yet.
  #[default]
  Loading,
  Unauthenticated,
  Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
  /// Draw nothing yet.
  Hold,
  Render,
  Redirect(Route),
}

/// Navigation guard in front of every page.
#[derive(Debug, Default)]
pub struct AuthGate {
  state: GateState,
  /// Redirect issued for a source route that has not been left yet.
  pending: Option<(Route, Route)>,
}

impl AuthGate {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> GateState {
    self.state
  }

  /// Feed the latest session from the store.
  pub fn observe(&mut self, session: Option<&Session>) {
    let next = if session.is_some() { GateState::Authenticated } else { GateState::Unauthenticated };
    if next != self.state {
      debug!("Auth gate {:?} -> {next:?}", self.state);
      self.state = next;
      self.pending = None;
    }
  }

  /// Decide what to do with a navigation to `route`.
  pub fn evaluate(&mut self, route: Route) -> GateDecision {
    let target = match self.state {
      GateState::Loading => return GateDecision::Hold,
      GateState::Unauthenticated if route.is_protected() => Some(Route::public_home()),
      GateState::Authenticated if !route.is_protected() => Some(Route::authenticated_home()),
      _ => None,
    };

    match target {
      None => {
        self.pending = None;
        GateDecision::Render
      },
      Some(_) if self.pending.is_some_and(|(source, _)| source == route) => GateDecision::Hold,
      Some(target) => {
        debug!("Redirecting {route} -> {target}");
        self.pending = Some((route, target));
        GateDecision::Redirect(target)
      },
    }
  }
}
