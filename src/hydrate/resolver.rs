//! Identity resolution: find-or-create an entity within one scope

use crate::error::HydrateError;
use crate::hydrate::record::{Record, RecordList};
use crate::schema::plan::ScopePlan;
use crate::types::{IdentityKey, RowSource};
use serde_json::Value;

/// Read the identity tuple of `scope` from `row`.
///
/// Returns `Ok(None)` when any identity value is null. A missing identity
/// field is an error even if another identity value is null.
pub(crate) fn identity_values<'r, R>(
    scope: &ScopePlan,
    row: &'r R,
    row_index: usize,
) -> Result<Option<Vec<(usize, &'r Value)>>, HydrateError>
where
    R: RowSource + ?Sized,
{
    let mut values = Vec::with_capacity(scope.identity.len());
    for (slot, source) in scope.identity_sources() {
        let value = row.field(source).ok_or_else(|| HydrateError::MissingField {
            row: row_index,
            scope: scope.path.clone(),
            field: source.to_string(),
        })?;
        values.push((slot, value));
    }

    if values.iter().any(|(_, value)| value.is_null()) {
        return Ok(None);
    }
    Ok(Some(values))
}

/// Resolve the entity of `scope` that `row` belongs to.
///
/// An existing entity with the same identity tuple is returned in place. An
/// unseen tuple appends a new entity seeded with just its identity columns.
/// A null identity value yields `Ok(None)` and leaves `list` untouched.
pub(crate) fn resolve_entity<'a, R>(
    scope: &ScopePlan,
    row: &R,
    row_index: usize,
    list: &'a mut RecordList,
) -> Result<Option<&'a mut Record>, HydrateError>
where
    R: RowSource + ?Sized,
{
    let Some(values) = identity_values(scope, row, row_index)? else {
        return Ok(None);
    };

    let key = IdentityKey::from_values(values.iter().map(|(_, value)| *value));
    let record = list.find_or_insert_with(key, || {
        let mut record = Record::new(scope.slots.len());
        for (slot, value) in &values {
            record.set(*slot, (*value).clone());
        }
        record
    });

    Ok(Some(record))
}
