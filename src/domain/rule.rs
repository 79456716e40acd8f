//! Reserved rule traits of authenticable features

use serde::{Deserialize, Serialize};
use std::fmt;

/// The particular rules of authentication, reserved as trait keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    /// Access the administrative panel.
    #[serde(rename = "<admin>")]
    Admin,
    /// Unlock a locked account.
    #[serde(rename = "<unlock>")]
    Unlock,
}

impl Rule {
    pub const ALL: [Rule; 2] = [Rule::Admin, Rule::Unlock];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Admin => "<admin>",
            Rule::Unlock => "<unlock>",
        }
    }

    /// Whether the given trait key is one of the reserved rules.
    pub fn is_rule(key: &str) -> bool {
        Rule::ALL.iter().any(|r| r.as_str() == key)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
