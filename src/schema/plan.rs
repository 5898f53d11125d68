//! Schema validation and compilation into per-scope hydration plans
//!
//! A [`Schema`] is checked once, up front, and compiled into a tree of
//! [`ScopePlan`]s so the engine never has to rediscover identity columns or
//! re-validate names while folding rows.

use crate::error::{HydrateError, SchemaError};
use crate::schema::property::Property;
use crate::types::HydrateConfig;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

/// How one slot of an entity is filled from a row
#[derive(Debug, Clone)]
pub(crate) enum SlotRule {
    /// Copy a row field
    Column {
        name: String,
        source: String,
        is_identity: bool,
    },
    /// Populate a single nested entity
    One { name: String, scope: ScopePlan },
    /// Resolve into a nested collection
    Many { name: String, scope: ScopePlan },
}

impl SlotRule {
    pub(crate) fn name(&self) -> &str {
        match self {
            SlotRule::Column { name, .. } | SlotRule::One { name, .. } | SlotRule::Many { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Root,
    One,
    Many,
}

/// Pre-computed plan for one nesting scope
#[derive(Debug, Clone)]
pub(crate) struct ScopePlan {
    /// Scope path, e.g. "root.tracks"
    pub path: String,

    /// Slot rules in declaration order
    pub slots: Vec<SlotRule>,

    /// Slot positions of the identity columns, in declaration order
    pub identity: Vec<usize>,
}

impl ScopePlan {
    /// Source field names of the identity columns
    pub(crate) fn identity_sources(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.identity.iter().filter_map(move |&slot| match &self.slots[slot] {
            SlotRule::Column { source, .. } => Some((slot, source.as_str())),
            _ => None,
        })
    }

    /// Append every source field read by this scope and its nested scopes,
    /// paired with the path of the scope that first reads it
    fn collect_sources(&self, seen: &mut HashSet<String>, out: &mut Vec<RequiredField>) {
        for rule in &self.slots {
            match rule {
                SlotRule::Column { source, .. } => {
                    if seen.insert(source.clone()) {
                        out.push(RequiredField {
                            scope: self.path.clone(),
                            source: source.clone(),
                        });
                    }
                }
                SlotRule::One { scope, .. } | SlotRule::Many { scope, .. } => scope.collect_sources(seen, out),
            }
        }
    }

    fn count_scopes(&self) -> usize {
        1 + self
            .slots
            .iter()
            .map(|rule| match rule {
                SlotRule::One { scope, .. } | SlotRule::Many { scope, .. } => scope.count_scopes(),
                SlotRule::Column { .. } => 0,
            })
            .sum::<usize>()
    }
}

/// A row field the schema reads somewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequiredField {
    pub scope: String,
    pub source: String,
}

/// A validated schema ready for hydration
#[derive(Debug, Clone)]
pub struct Schema {
    properties: Vec<Property>,
    root: ScopePlan,
    required: Vec<RequiredField>,
    config: HydrateConfig,
}

/// On-disk form of a schema: its properties plus optional configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDocument {
    pub properties: Vec<Property>,
    #[serde(default)]
    pub config: HydrateConfig,
}

impl SchemaDocument {
    pub fn from_json(json: &str) -> Result<Self, HydrateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate and compile the document
    pub fn into_schema(self) -> Result<Schema, SchemaError> {
        Schema::with_config(self.properties, self.config)
    }
}

impl Schema {
    /// Validate `properties` with the default configuration
    pub fn new(properties: Vec<Property>) -> Result<Self, SchemaError> {
        Self::with_config(properties, HydrateConfig::default())
    }

    /// Validate `properties` and compile them into a hydration plan
    ///
    /// # Errors
    /// Any [`SchemaError`]: a root or nested-many scope without identity
    /// columns, empty or duplicate names, or nesting beyond `max_depth`.
    pub fn with_config(properties: Vec<Property>, config: HydrateConfig) -> Result<Self, SchemaError> {
        let root = Self::analyze_scope(&properties, "root".to_string(), ScopeKind::Root, &config, 0)?;

        let mut required = Vec::new();
        root.collect_sources(&mut HashSet::new(), &mut required);

        debug!(
            scopes = root.count_scopes(),
            root_identity = root.identity.len(),
            fields = required.len(),
            "compiled hydration schema"
        );

        Ok(Schema {
            properties,
            root,
            required,
            config,
        })
    }

    /// Load a schema document (`{"properties": [...], "config": {...}}`)
    pub fn from_json(json: &str) -> Result<Self, HydrateError> {
        Ok(SchemaDocument::from_json(json)?.into_schema()?)
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn config(&self) -> &HydrateConfig {
        &self.config
    }

    /// Output names of the root identity columns
    #[cfg(test)]
    pub(crate) fn root_identity(&self) -> Vec<&str> {
        self.root.identity.iter().map(|&slot| self.root.slots[slot].name()).collect()
    }

    pub(crate) fn root(&self) -> &ScopePlan {
        &self.root
    }

    /// Every distinct row field the schema reads, in declaration order
    pub(crate) fn required_fields(&self) -> &[RequiredField] {
        &self.required
    }

    /// Recursively validate one scope and build its plan
    fn analyze_scope(
        properties: &[Property],
        path: String,
        kind: ScopeKind,
        config: &HydrateConfig,
        depth: usize,
    ) -> Result<ScopePlan, SchemaError> {
        if depth > config.max_depth {
            return Err(SchemaError::TooDeep {
                scope: path,
                max_depth: config.max_depth,
            });
        }

        let mut seen = HashSet::new();
        let mut slots = Vec::with_capacity(properties.len());
        let mut identity = Vec::new();

        for property in properties {
            let name = property.name();
            if name.is_empty() {
                return Err(SchemaError::EmptyName { scope: path });
            }
            if !seen.insert(name) {
                return Err(SchemaError::DuplicateName {
                    scope: path,
                    name: name.to_string(),
                });
            }

            let rule = match property {
                Property::Column { is_id, .. } => {
                    let source = property.source().unwrap_or(name);
                    if source.is_empty() {
                        return Err(SchemaError::EmptyColumn {
                            scope: path,
                            name: name.to_string(),
                        });
                    }
                    if *is_id {
                        identity.push(slots.len());
                    }
                    SlotRule::Column {
                        name: name.to_string(),
                        source: source.to_string(),
                        is_identity: *is_id,
                    }
                }
                Property::One { properties, .. } => {
                    let nested_path = format!("{}{}{}", path, config.scope_separator, name);
                    SlotRule::One {
                        name: name.to_string(),
                        scope: Self::analyze_scope(properties, nested_path, ScopeKind::One, config, depth + 1)?,
                    }
                }
                Property::Many { properties, .. } => {
                    let nested_path = format!("{}{}{}", path, config.scope_separator, name);
                    SlotRule::Many {
                        name: name.to_string(),
                        scope: Self::analyze_scope(properties, nested_path, ScopeKind::Many, config, depth + 1)?,
                    }
                }
            };
            slots.push(rule);
        }

        // Nested-one scopes are never deduplicated, so they may go without.
        if identity.is_empty() && kind != ScopeKind::One {
            return Err(SchemaError::MissingIdentity { scope: path });
        }

        Ok(ScopePlan { path, slots, identity })
    }
}
