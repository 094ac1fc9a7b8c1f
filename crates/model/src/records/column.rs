use serde::{Deserialize, Serialize};

/// Name and declared type of a result column, as announced by the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    pub name: String,
    pub type_name: String,
}

impl ColumnType {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        ColumnType {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}
