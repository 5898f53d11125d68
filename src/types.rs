use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

/// A hydrated, nested output record.
///
/// Keys follow schema declaration order. Values are scalars passed through
/// from the input rows, nested entities (objects), collections of nested
/// entities (arrays), or `null` for an absent nested-one.
pub type Entity = Map<String, Value>;

/// Read access to one flat input row.
pub trait RowSource {
    /// Look up a field by its source name. `None` means the field is not
    /// present at all, which is distinct from a present `null`.
    fn field(&self, name: &str) -> Option<&Value>;

    /// Whether the row is shaped like a record at all.
    fn is_record(&self) -> bool {
        true
    }
}

impl RowSource for Map<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl RowSource for HashMap<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl RowSource for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl RowSource for Value {
    fn field(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(name))
    }

    fn is_record(&self) -> bool {
        self.is_object()
    }
}

impl<R: RowSource + ?Sized> RowSource for &R {
    fn field(&self, name: &str) -> Option<&Value> {
        (**self).field(name)
    }

    fn is_record(&self) -> bool {
        (**self).is_record()
    }
}

/// Hashable form of an identity tuple.
///
/// Equality is `serde_json::Value` equality, and hashing agrees with it:
/// `0.0` and `-0.0` hash alike, and objects hash independently of key order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IdentityKey(Vec<Value>);

// Value never holds NaN, so its equality is a total equivalence.
impl Eq for IdentityKey {}

impl Hash for IdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for value in &self.0 {
            hash_value(value, state);
        }
    }
}

impl IdentityKey {
    pub(crate) fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        IdentityKey(values.into_iter().cloned().collect())
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Null => 0u8.hash(state),
        Value::Bool(b) => {
            1u8.hash(state);
            b.hash(state);
        }
        Value::Number(n) => {
            2u8.hash(state);
            if let Some(u) = n.as_u64() {
                0u8.hash(state);
                u.hash(state);
            } else if let Some(i) = n.as_i64() {
                1u8.hash(state);
                i.hash(state);
            } else if let Some(f) = n.as_f64() {
                2u8.hash(state);
                // -0.0 == 0.0
                let f = if f == 0.0 { 0.0 } else { f };
                f.to_bits().hash(state);
            }
        }
        Value::String(s) => {
            3u8.hash(state);
            s.hash(state);
        }
        Value::Array(items) => {
            4u8.hash(state);
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Object(map) => {
            5u8.hash(state);
            map.len().hash(state);
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            for (key, item) in entries {
                key.hash(state);
                hash_value(item, state);
            }
        }
    }
}

/// What a nested-many field does when a row carries a null identity for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullCollectionPolicy {
    /// Leave the collection exactly as earlier rows left it.
    #[default]
    KeepExisting,
    /// Replace the field with `null`. A later row with a valid identity
    /// starts a fresh collection.
    Clear,
}

/// Configuration for schema compilation and hydration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrateConfig {
    /// Maximum nesting depth of the schema (0 = root columns only)
    pub max_depth: usize,

    /// Behaviour of nested-many fields on rows with a null identity
    pub null_collection: NullCollectionPolicy,

    /// Separator used when naming nested scopes in errors and logs
    pub scope_separator: String,
}

impl Default for HydrateConfig {
    fn default() -> Self {
        HydrateConfig {
            max_depth: 10,
            null_collection: NullCollectionPolicy::KeepExisting,
            scope_separator: String::from("."),
        }
    }
}
