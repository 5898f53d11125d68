//! The hydration fold
//!
//! Rows are folded strictly in input order. Each row resolves its root entity
//! by identity, then walks the schema plan writing columns and recursing into
//! nested scopes.

use crate::error::HydrateError;
use crate::hydrate::record::{Record, RecordList, Slot};
use crate::hydrate::resolver::{identity_values, resolve_entity};
use crate::schema::plan::{ScopePlan, SlotRule};
use crate::schema::Schema;
use crate::types::{Entity, NullCollectionPolicy, RowSource};
use serde_json::Value;
use tracing::{debug, trace};

/// Incremental hydrator: push rows one at a time, then [`finish`](Hydrator::finish).
///
/// If [`push`](Hydrator::push) returns an error the partially folded state is
/// unspecified and the hydrator should be discarded.
pub struct Hydrator<'s> {
    schema: &'s Schema,
    roots: RecordList,
    rows_seen: usize,
    rows_dropped: usize,
}

impl<'s> Hydrator<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Hydrator {
            schema,
            roots: RecordList::new(),
            rows_seen: 0,
            rows_dropped: 0,
        }
    }

    /// Fold one row into the result
    ///
    /// Every field the schema reads must be present in the row, even in
    /// scopes this row leaves untouched because of a null identity.
    pub fn push<R>(&mut self, row: &R) -> Result<(), HydrateError>
    where
        R: RowSource + ?Sized,
    {
        let row_index = self.rows_seen;
        self.rows_seen += 1;

        if !row.is_record() {
            return Err(HydrateError::NotAnObject { row: row_index });
        }

        let schema = self.schema;
        for required in schema.required_fields() {
            if row.field(&required.source).is_none() {
                return Err(HydrateError::MissingField {
                    row: row_index,
                    scope: required.scope.clone(),
                    field: required.source.clone(),
                });
            }
        }

        let root = schema.root();

        let Some(record) = resolve_entity(root, row, row_index, &mut self.roots)? else {
            self.rows_dropped += 1;
            debug!(row = row_index, "dropping row with null root identity");
            return Ok(());
        };

        let walk = RowWalk {
            row,
            row_index,
            policy: schema.config().null_collection,
        };
        walk.fill(root, record, true)
    }

    /// Fold every row of `rows`, stopping at the first error
    pub fn extend<I>(&mut self, rows: I) -> Result<(), HydrateError>
    where
        I: IntoIterator,
        I::Item: RowSource,
    {
        for row in rows {
            self.push(&row)?;
        }
        Ok(())
    }

    /// Number of rows pushed so far, including dropped ones
    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Number of distinct root entities so far
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Consume the hydrator and return root entities in first-seen order
    pub fn finish(self) -> Vec<Entity> {
        debug!(
            rows = self.rows_seen,
            dropped = self.rows_dropped,
            entities = self.roots.len(),
            "hydration finished"
        );
        self.roots.into_entities(self.schema.root())
    }
}

/// Hydrate `rows` into nested entities according to `schema`
///
/// # Errors
/// [`HydrateError::MissingField`] when a row lacks a field the schema reads,
/// [`HydrateError::NotAnObject`] when a row is not a record.
pub fn hydrate<I>(rows: I, schema: &Schema) -> Result<Vec<Entity>, HydrateError>
where
    I: IntoIterator,
    I::Item: RowSource,
{
    let mut hydrator = Hydrator::new(schema);
    hydrator.extend(rows)?;
    Ok(hydrator.finish())
}

/// Per-row state threaded through the recursive walk
struct RowWalk<'r, R: ?Sized> {
    row: &'r R,
    row_index: usize,
    policy: NullCollectionPolicy,
}

impl<'r, R> RowWalk<'r, R>
where
    R: RowSource + ?Sized,
{
    /// Write every slot of `scope` into `record`.
    ///
    /// Identity columns are skipped when the resolver already seeded them.
    fn fill(&self, scope: &ScopePlan, record: &mut Record, skip_identity: bool) -> Result<(), HydrateError> {
        for (index, rule) in scope.slots.iter().enumerate() {
            match rule {
                SlotRule::Column {
                    source, is_identity, ..
                } => {
                    if *is_identity && skip_identity {
                        continue;
                    }
                    let value = self.column(scope, source)?;
                    record.set(index, value.clone());
                }
                SlotRule::One { scope: nested, .. } => {
                    self.fill_one(nested, record.slot_mut(index))?;
                }
                SlotRule::Many { scope: nested, .. } => {
                    self.fill_many(nested, record.slot_mut(index))?;
                }
            }
        }
        Ok(())
    }

    fn fill_one(&self, scope: &ScopePlan, slot: &mut Slot) -> Result<(), HydrateError> {
        if identity_values(scope, self.row, self.row_index)?.is_none() {
            trace!(row = self.row_index, scope = %scope.path, "null identity, clearing nested entity");
            *slot = Slot::Null;
            return Ok(());
        }

        if !matches!(slot, Slot::One(_)) {
            *slot = Slot::One(Box::new(Record::new(scope.slots.len())));
        }
        if let Slot::One(record) = slot {
            self.fill(scope, record, false)?;
        }
        Ok(())
    }

    fn fill_many(&self, scope: &ScopePlan, slot: &mut Slot) -> Result<(), HydrateError> {
        if self.policy == NullCollectionPolicy::Clear
            && identity_values(scope, self.row, self.row_index)?.is_none()
        {
            trace!(row = self.row_index, scope = %scope.path, "null identity, clearing collection");
            *slot = Slot::Null;
            return Ok(());
        }

        if !matches!(slot, Slot::Many(_)) {
            *slot = Slot::Many(RecordList::new());
        }
        if let Slot::Many(list) = slot {
            match resolve_entity(scope, self.row, self.row_index, list)? {
                Some(record) => self.fill(scope, record, true)?,
                None => {
                    trace!(row = self.row_index, scope = %scope.path, "null identity, collection left as is");
                }
            }
        }
        Ok(())
    }

    fn column(&self, scope: &ScopePlan, source: &str) -> Result<&'r Value, HydrateError> {
        self.row.field(source).ok_or_else(|| HydrateError::MissingField {
            row: self.row_index,
            scope: scope.path.clone(),
            field: source.to_string(),
        })
    }
}
