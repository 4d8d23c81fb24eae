use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Every full-screen page the client can show. Lowercase aliases accept
/// config sources that fold key case.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Route {
  #[default]
  #[serde(alias = "landing")]
  Landing,
  #[serde(alias = "signin")]
  SignIn,
  #[serde(alias = "signup")]
  SignUp,
  #[serde(alias = "connectdb")]
  ConnectDb,
  #[serde(alias = "query")]
  Query,
}

impl Route {
  /// Protected pages require a session before anything on them renders.
  pub fn is_protected(&self) -> bool {
    matches!(self, Self::ConnectDb | Self::Query)
  }

  /// First page shown to an authenticated user arriving from a public page.
  pub fn authenticated_home() -> Self {
    Self::ConnectDb
  }

  /// Where unauthenticated visitors are sent.
  pub fn public_home() -> Self {
    Self::Landing
  }
}
