//! # nesthydrate - Nested Entities from Flat Rows
//!
//! Turns the flat, duplicated rows of a relational join back into nested,
//! deduplicated entities, following a schema that says which columns belong to
//! which entity and how entities nest.
//!
//! ## Modules
//!
//! - **schema**: Describe entities as columns, nested-one and nested-many properties
//! - **hydrate**: Fold rows through a schema into ordered nested entities
//!
//! ## Quick Start
//!
//! ```rust
//! use nesthydrate::{hydrate, Property, Schema};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let rows = vec![
//!     json!({"id": 1, "name": "Album 1", "track_id": 1, "track_title": "Track 1"}),
//!     json!({"id": 1, "name": "Album 1", "track_id": 2, "track_title": "Track 2"}),
//! ];
//!
//! let schema = Schema::new(vec![
//!     Property::id("id", "id"),
//!     Property::column("name", "name"),
//!     Property::many("tracks", vec![
//!         Property::id("id", "track_id"),
//!         Property::column("title", "track_title"),
//!     ]),
//! ])?;
//!
//! let albums = hydrate(&rows, &schema)?;
//!
//! assert_eq!(albums.len(), 1);
//! assert_eq!(albums[0]["tracks"], json!([
//!     {"id": 1, "title": "Track 1"},
//!     {"id": 2, "title": "Track 2"},
//! ]));
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::BufRead;

pub mod error;
pub mod hydrate;
pub mod schema;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HydrateError, SchemaError};
pub use hydrate::{hydrate, ArrayWriter, Hydrator, LinesWriter};
pub use schema::{Property, Schema, SchemaDocument};
pub use types::{Entity, HydrateConfig, NullCollectionPolicy, RowSource};

/// Hydrate a stream of newline-delimited JSON rows
pub fn hydrate_json<R: BufRead>(reader: R, schema: &Schema) -> Result<Vec<Entity>> {
    let mut hydrator = Hydrator::new(schema);

    for line in reader.lines() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }
        let row: Value = serde_json::from_str(&line).context("Failed to parse JSON")?;

        hydrator.push(&row)?;
    }

    Ok(hydrator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hydrate_ndjson() {
        let input = concat!(
            r#"{"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 1, "track_title": "Track 1"}"#,
            "\n",
            r#"{"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 2, "track_title": "Track 2"}"#,
            "\n\n",
            r#"{"id": 2, "name": "Album 2", "artist_id": 1, "artist_name": "Artist 1", "track_id": 3, "track_title": "Track 3"}"#,
            "\n",
        );
        let schema = Schema::new(vec![
            Property::id("id", "id"),
            Property::column("name", "name"),
            Property::one(
                "artist",
                vec![Property::id("id", "artist_id"), Property::column("name", "artist_name")],
            ),
            Property::many(
                "tracks",
                vec![Property::id("id", "track_id"), Property::column("title", "track_title")],
            ),
        ])
        .unwrap();

        let entities = hydrate_json(input.as_bytes(), &schema).unwrap();

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0]["artist"], entities[1]["artist"]);
        assert_eq!(entities[1]["tracks"], serde_json::json!([{"id": 3, "title": "Track 3"}]));
    }

    #[test]
    fn test_hydrate_ndjson_surfaces_row_errors() {
        let schema = Schema::new(vec![Property::id("id", "id"), Property::column("name", "name")]).unwrap();
        let input = "{\"id\": 1, \"name\": \"a\"}\n{\"id\": 2}\n";

        let err = hydrate_json(input.as_bytes(), &schema).unwrap_err();
        let err = err.downcast::<HydrateError>().unwrap();
        assert!(matches!(err, HydrateError::MissingField { row: 1, .. }));
    }
}
