//! Session identity passed explicitly into every flow operation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of one browser login session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a session currently is in the login lifecycle.
///
/// `Anonymous -> PendingLogin -> Authenticated -> Anonymous`. A failed callback
/// takes `PendingLogin` straight back to `Anonymous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    PendingLogin,
    Authenticated,
}
