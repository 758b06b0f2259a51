use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// What the caller asked for. Carried with the record for audit, but only
/// used to pick an [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

/// Persistence operation exposed by the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Upsert,
    Delete,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Create, Action::Update, Action::Delete];

    pub fn operation(self) -> Operation {
        match self {
            Action::Create => Operation::Insert,
            Action::Update => Operation::Upsert,
            Action::Delete => Operation::Delete,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            _ => Err(ValidationError::InvalidAction),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Operation {
    /// HTTP verb the vault serves this operation under.
    pub fn http_method(self) -> &'static str {
        match self {
            Operation::Insert => "POST",
            Operation::Upsert => "PUT",
            Operation::Delete => "DELETE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("CREATE".parse::<Action>().unwrap(), Action::Create);
        assert_eq!("  Update ".parse::<Action>().unwrap(), Action::Update);
        assert_eq!("delete".parse::<Action>().unwrap(), Action::Delete);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!("upsert".parse::<Action>(), Err(ValidationError::InvalidAction));
        assert_eq!("".parse::<Action>(), Err(ValidationError::InvalidAction));
    }

    #[test]
    fn test_dispatch_table() {
        let verbs: Vec<_> = Action::ALL
            .iter()
            .map(|action| action.operation().http_method())
            .collect();

        assert_eq!(verbs, ["POST", "PUT", "DELETE"]);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Action::Update).unwrap(), "\"update\"");
        assert_eq!(
            serde_json::from_str::<Action>("\"delete\"").unwrap(),
            Action::Delete
        );
    }
}
