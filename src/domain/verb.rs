//! Verbs and the HTTP method mapping

use serde::{Deserialize, Serialize};
use std::fmt;

/// The available verbs of feature traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Create,
    Read,
    Update,
    Delete,
}

impl Verb {
    /// All verbs, in declaration order.
    pub const ALL: [Verb; 4] = [Verb::Create, Verb::Read, Verb::Update, Verb::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Read => "read",
            Verb::Update => "update",
            Verb::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP methods an endpoint can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Head,
    Options,
    Connect,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Maps the invocation method onto the verb it stands for.
    pub fn verb(&self) -> Verb {
        match self {
            Method::Post => Verb::Create,
            Method::Get | Method::Head | Method::Options | Method::Connect => Verb::Read,
            Method::Put | Method::Patch => Verb::Update,
            Method::Delete => Verb::Delete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_verb_mapping() {
        assert_eq!(Method::Post.verb(), Verb::Create);
        assert_eq!(Method::Get.verb(), Verb::Read);
        assert_eq!(Method::Head.verb(), Verb::Read);
        assert_eq!(Method::Options.verb(), Verb::Read);
        assert_eq!(Method::Connect.verb(), Verb::Read);
        assert_eq!(Method::Put.verb(), Verb::Update);
        assert_eq!(Method::Patch.verb(), Verb::Update);
        assert_eq!(Method::Delete.verb(), Verb::Delete);
    }

    #[test]
    fn test_verb_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Verb::Create).unwrap(), "\"create\"");
        let v: Verb = serde_json::from_str("\"delete\"").unwrap();
        assert_eq!(v, Verb::Delete);
    }

    #[test]
    fn test_all_covers_every_verb() {
        assert_eq!(Verb::ALL.len(), 4);
    }
}
