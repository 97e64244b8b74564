//! Record identifiers
//!
//! Attachment records are keyed three ways in practice: an integer
//! primary key, a 128-bit token, or an arbitrary string key. The
//! partitioning scheme treats each shape differently, so the storage
//! layer needs to know which one it is holding.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identifier of an attachment record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Integer primary key
    Id(i64),
    /// 128-bit token
    Token(Uuid),
    /// Arbitrary string key
    Key(String),
}

impl Identifier {
    /// Storage form of the identifier: decimal digits for integer keys,
    /// 32 lowercase hex characters for tokens, the raw string for keys.
    pub fn storage_form(&self) -> String {
        match self {
            Self::Id(n) => n.to_string(),
            Self::Token(token) => token.simple().to_string(),
            Self::Key(key) => key.clone(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_form())
    }
}

impl From<i64> for Identifier {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<Uuid> for Identifier {
    fn from(token: Uuid) -> Self {
        Self::Token(token)
    }
}

impl From<String> for Identifier {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<&str> for Identifier {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_storage_form() {
        assert_eq!(Identifier::Id(42).storage_form(), "42");
    }

    #[test]
    fn test_token_storage_form_is_32_hex() {
        let token = Uuid::new_v4();
        let form = Identifier::Token(token).storage_form();

        assert_eq!(form.len(), 32);
        assert!(form.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!form.contains('-'));
    }

    #[test]
    fn test_key_storage_form() {
        let id = Identifier::from("user-avatar");
        assert_eq!(id.storage_form(), "user-avatar");
    }

    #[test]
    fn test_display_matches_storage_form() {
        let id = Identifier::Id(7);
        assert_eq!(id.to_string(), id.storage_form());
    }
}
