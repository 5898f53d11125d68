use serde::{Deserialize, Serialize};

/// One node of the schema tree.
///
/// The variant set is closed: a scalar column, a nested single entity, or a
/// nested collection of entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Property {
    /// Copy one row field into the entity under `name`
    Column {
        name: String,
        /// Source field in the row; defaults to `name` when omitted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column: Option<String>,
        #[serde(default)]
        is_id: bool,
    },
    /// At most one nested entity per parent
    One {
        name: String,
        properties: Vec<Property>,
    },
    /// Ordered, deduplicated collection of nested entities per parent
    Many {
        name: String,
        properties: Vec<Property>,
    },
}

impl Property {
    /// A plain column reading `source` into `name`.
    pub fn column(name: impl Into<String>, source: impl Into<String>) -> Self {
        Property::Column {
            name: name.into(),
            column: Some(source.into()),
            is_id: false,
        }
    }

    /// An identity column reading `source` into `name`.
    pub fn id(name: impl Into<String>, source: impl Into<String>) -> Self {
        Property::Column {
            name: name.into(),
            column: Some(source.into()),
            is_id: true,
        }
    }

    pub fn one(name: impl Into<String>, properties: Vec<Property>) -> Self {
        Property::One {
            name: name.into(),
            properties,
        }
    }

    pub fn many(name: impl Into<String>, properties: Vec<Property>) -> Self {
        Property::Many {
            name: name.into(),
            properties,
        }
    }

    /// Output key of this property
    pub fn name(&self) -> &str {
        match self {
            Property::Column { name, .. } | Property::One { name, .. } | Property::Many { name, .. } => {
                name
            }
        }
    }

    /// Row field read by a column, falling back to its output name
    pub fn source(&self) -> Option<&str> {
        match self {
            Property::Column { name, column, .. } => Some(column.as_deref().unwrap_or(name)),
            _ => None,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Property::Column { is_id: true, .. })
    }
}
