use std::fmt;

use serde::{Deserialize, Serialize};

/// Which part of the option data a warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningScope {
    /// A `zones` entry
    Zone,
    /// A `providers` entry
    Provider,
    /// The option tree as a whole
    Options,
}

impl fmt::Display for WarningScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Zone => "zone",
            Self::Provider => "provider",
            Self::Options => "options",
        })
    }
}

/// Non-fatal problem found while validating option data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Section of the option data
    pub scope: WarningScope,
    /// Entry name or index, when known
    pub entry: Option<String>,
    /// Field name, when the warning is field-specific
    pub field: Option<String>,
    /// Human-readable description
    pub message: String,
}

impl ValidationWarning {
    /// Warning about an entry as a whole
    pub fn entry<E: Into<String>, M: Into<String>>(
        scope: WarningScope,
        entry: E,
        message: M,
    ) -> Self {
        Self {
            scope,
            entry: Some(entry.into()),
            field: None,
            message: message.into(),
        }
    }

    /// Warning about a single field of an entry
    pub fn field<E: Into<String>, F: Into<String>, M: Into<String>>(
        scope: WarningScope,
        entry: E,
        field: F,
        message: M,
    ) -> Self {
        Self {
            scope,
            entry: Some(entry.into()),
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Warning about the option tree
    pub fn options<M: Into<String>>(message: M) -> Self {
        Self {
            scope: WarningScope::Options,
            entry: None,
            field: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scope)?;
        if let Some(entry) = &self.entry {
            write!(f, " '{entry}'")?;
        }
        if let Some(field) = &self.field {
            write!(f, " field '{field}'")?;
        }
        write!(f, ": {}", self.message)
    }
}
