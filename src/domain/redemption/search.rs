//! Keyword search over redemption codes.
//!
//! A keyword that parses as an integer may name a code by id or be the start
//! of its name; anything else only matches name prefixes.

use super::Redemption;

/// Parsed admin search keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchKeyword {
    /// Numeric token: `id = n OR name LIKE 'token%'`.
    IdOrNamePrefix { id: i64, prefix: String },

    /// Non-numeric token: `name LIKE 'token%'`.
    NamePrefix(String),
}

impl SearchKeyword {
    /// Classifies a raw keyword.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(id) => SearchKeyword::IdOrNamePrefix {
                id,
                prefix: raw.to_string(),
            },
            Err(_) => SearchKeyword::NamePrefix(raw.to_string()),
        }
    }

    /// The literal name prefix to match.
    pub fn prefix(&self) -> &str {
        match self {
            SearchKeyword::IdOrNamePrefix { prefix, .. } => prefix,
            SearchKeyword::NamePrefix(prefix) => prefix,
        }
    }

    /// The id to match, for numeric keywords.
    pub fn id(&self) -> Option<i64> {
        match self {
            SearchKeyword::IdOrNamePrefix { id, .. } => Some(*id),
            SearchKeyword::NamePrefix(_) => None,
        }
    }

    /// Evaluates the keyword against a record in memory.
    pub fn matches(&self, redemption: &Redemption) -> bool {
        self.id() == Some(redemption.id.as_i64()) || redemption.name.starts_with(self.prefix())
    }

    /// Returns the prefix as a SQL `LIKE` pattern with `\` as escape character.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.prefix().len() + 1);
        for c in self.prefix().chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}
