/// Albums example - rebuild albums, artists and tracks from joined rows
use nesthydrate::{hydrate, Property, Schema};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    println!("=== Album Hydration ===\n");

    // Step 1: Rows as a join of albums, artists and tracks would return them
    let rows = vec![
        json!({"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 1, "track_title": "Track 1"}),
        json!({"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 2, "track_title": "Track 2"}),
        json!({"id": 2, "name": "Album 2", "artist_id": 1, "artist_name": "Artist 1", "track_id": 3, "track_title": "Track 3"}),
    ];

    println!("Input rows:");
    for row in &rows {
        println!("  {}", serde_json::to_string(row)?);
    }

    // Step 2: Describe which columns belong to which entity
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
    ])?;

    // Step 3: Hydrate
    let albums = hydrate(&rows, &schema)?;

    println!("\nHydrated {} albums:\n", albums.len());
    println!("{}", serde_json::to_string_pretty(&albums)?);

    println!("\nSame thing from the command line:");
    println!("  nest-hydrate --schema demos/album.schema.json demos/album_rows.json");

    Ok(())
}
