//! Working records built up while rows are folded
//!
//! Records store their fields positionally, one slot per schema property, and
//! are only turned into keyed [`Entity`] maps once hydration finishes.

use crate::schema::plan::{ScopePlan, SlotRule};
use crate::types::{Entity, IdentityKey};
use serde_json::Value;
use std::collections::HashMap;

/// Contents of one entity field
#[derive(Debug, Clone, Default)]
pub(crate) enum Slot {
    /// Not written yet
    #[default]
    Vacant,
    Value(Value),
    One(Box<Record>),
    Many(RecordList),
    /// Explicitly absent nested entity or cleared collection
    Null,
}

/// An entity under construction
#[derive(Debug, Clone)]
pub(crate) struct Record {
    slots: Vec<Slot>,
}

impl Record {
    pub(crate) fn new(width: usize) -> Self {
        Record {
            slots: vec![Slot::Vacant; width],
        }
    }

    #[cfg(test)]
    pub(crate) fn slot(&self, index: usize) -> &Slot {
        &self.slots[index]
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Slot {
        &mut self.slots[index]
    }

    pub(crate) fn set(&mut self, index: usize, value: Value) {
        self.slots[index] = Slot::Value(value);
    }

    /// Convert into an output entity, keys in declaration order
    pub(crate) fn into_entity(self, scope: &ScopePlan) -> Entity {
        let mut entity = Entity::new();

        for (slot, rule) in self.slots.into_iter().zip(scope.slots.iter()) {
            let value = match (slot, rule) {
                (Slot::Vacant, _) => continue,
                (Slot::Value(value), _) => value,
                (Slot::Null, _) => Value::Null,
                (Slot::One(record), SlotRule::One { scope, .. }) => Value::Object(record.into_entity(scope)),
                (Slot::Many(list), SlotRule::Many { scope, .. }) => {
                    Value::Array(list.into_entities(scope).into_iter().map(Value::Object).collect())
                }
                // Slots are only ever filled according to their own rule.
                (Slot::One(_), _) | (Slot::Many(_), _) => continue,
            };
            entity.insert(rule.name().to_string(), value);
        }

        entity
    }
}

/// Ordered collection of records with a keyed identity index
///
/// `records` keeps first-seen order; `index` maps each identity tuple to its
/// position. Records are only ever appended, so positions never go stale.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordList {
    records: Vec<Record>,
    index: HashMap<IdentityKey, usize>,
}

impl RecordList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Return the record stored under `key`, appending one built by `seed`
    /// if there is none yet.
    pub(crate) fn find_or_insert_with<F>(&mut self, key: IdentityKey, seed: F) -> &mut Record
    where
        F: FnOnce() -> Record,
    {
        let position = match self.index.get(&key) {
            Some(&position) => position,
            None => {
                let position = self.records.len();
                self.records.push(seed());
                self.index.insert(key, position);
                position
            }
        };
        &mut self.records[position]
    }

    pub(crate) fn into_entities(self, scope: &ScopePlan) -> Vec<Entity> {
        self.records
            .into_iter()
            .map(|record| record.into_entity(scope))
            .collect()
    }
}
