//! Ids of stored variables: `namespace:path`.
//!
//! Both halves use the character set `[A-Za-z0-9_.$]`; the first character
//! may not be a digit or `.`. The literal `null` is not a valid path.

use std::fmt;

/// Whether `c` may appear in a namespace or path.
#[inline]
pub fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$')
}

/// Whether `c` may start a namespace or path.
#[inline]
pub fn is_id_start(c: char) -> bool {
    is_id_char(c) && !c.is_ascii_digit() && c != '.'
}

/// Why a string is not a valid variable id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariableIdError {
    Empty,
    InvalidStart(char),
    InvalidChar(char),
    NullPath,
}

impl fmt::Display for VariableIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty variable id"),
            Self::InvalidStart(c) => write!(f, "variable id cannot start with '{c}'"),
            Self::InvalidChar(c) => write!(f, "invalid character '{c}' in variable id"),
            Self::NullPath => f.write_str("'null' is not a valid variable path"),
        }
    }
}

impl std::error::Error for VariableIdError {}

/// A validated `namespace:path` variable id.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId {
    namespace: String,
    path: String,
}

impl VariableId {
    /// Build an id from parts already known to be valid.
    ///
    /// Use [`VariableId::try_new`] or [`VariableId::parse`] for user input.
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        let id = VariableId {
            namespace: namespace.into(),
            path: path.into(),
        };
        debug_assert!(validate_part(&id.namespace).is_ok());
        debug_assert!(validate_part(&id.path).is_ok());
        id
    }

    /// Build an id from parts, validating both.
    pub fn try_new(namespace: &str, path: &str) -> Result<Self, VariableIdError> {
        validate_part(namespace)?;
        validate_part(path)?;
        if path == "null" {
            return Err(VariableIdError::NullPath);
        }
        Ok(VariableId {
            namespace: namespace.to_owned(),
            path: path.to_owned(),
        })
    }

    /// Parse `namespace:path` or a bare `path` in `default_namespace`.
    pub fn parse(text: &str, default_namespace: &str) -> Result<Self, VariableIdError> {
        match text.split_once(':') {
            Some((namespace, path)) => Self::try_new(namespace, path),
            None => Self::try_new(default_namespace, text),
        }
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn validate_part(part: &str) -> Result<(), VariableIdError> {
    let mut chars = part.chars();
    let first = chars.next().ok_or(VariableIdError::Empty)?;
    if !is_id_start(first) {
        return Err(VariableIdError::InvalidStart(first));
    }
    match chars.find(|c| !is_id_char(*c)) {
        Some(c) => Err(VariableIdError::InvalidChar(c)),
        None => Ok(()),
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl fmt::Debug for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariableId({self})")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_with_and_without_namespace() {
        let id = VariableId::parse("score.total", "global").unwrap();
        assert_eq!(id.namespace(), "global");
        assert_eq!(id.path(), "score.total");
        assert_eq!(id.to_string(), "global:score.total");

        let id = VariableId::parse("game:$tmp_1", "global").unwrap();
        assert_eq!(id, VariableId::new("game", "$tmp_1"));
    }

    #[test]
    fn test_invalid_ids() {
        assert_eq!(VariableId::parse("", "global"), Err(VariableIdError::Empty));
        assert_eq!(
            VariableId::parse("1abc", "global"),
            Err(VariableIdError::InvalidStart('1'))
        );
        assert_eq!(
            VariableId::parse(".abc", "global"),
            Err(VariableIdError::InvalidStart('.'))
        );
        assert_eq!(
            VariableId::parse("a-b", "global"),
            Err(VariableIdError::InvalidChar('-'))
        );
        assert_eq!(
            VariableId::parse("global:null", "global"),
            Err(VariableIdError::NullPath)
        );
        assert_eq!(
            VariableId::parse("a:b:c", "global"),
            Err(VariableIdError::InvalidChar(':'))
        );
    }
}
