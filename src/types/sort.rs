use serde::{Deserialize, Serialize};

/// Sort request as it appears in configuration: a bare column name or an object
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum SortColumnSpec {
    Name(String),
    Column {
        column: String,
        #[serde(default)]
        descending: bool,
    },
}

impl SortColumnSpec {
    pub fn column(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Column { column, .. } => column,
        }
    }

    pub fn descending(&self) -> bool {
        match self {
            Self::Name(_) => false,
            Self::Column { descending, .. } => *descending,
        }
    }
}

/// One entry of the active sort stack, as reported to callers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SortedColumn {
    pub column: String,
    pub descending: bool,
}
