use crate::types::Entity;
use anyhow::{Context, Result};
use std::io::Write;

/// Writes a whole hydration result as one JSON array
pub struct ArrayWriter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> ArrayWriter<W> {
    pub fn new(writer: W) -> Self {
        ArrayWriter { writer, pretty: true }
    }

    pub fn compact(writer: W) -> Self {
        ArrayWriter { writer, pretty: false }
    }

    pub fn write_entities(&mut self, entities: &[Entity]) -> Result<()> {
        let written = if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, entities)
        } else {
            serde_json::to_writer(&mut self.writer, entities)
        };
        written.context("Failed to serialize entities")?;

        writeln!(self.writer).context("Failed to write entities")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }
}

/// Writes one entity per line (JSON Lines)
pub struct LinesWriter<W: Write> {
    writer: W,
}

impl<W: Write> LinesWriter<W> {
    pub fn new(writer: W) -> Self {
        LinesWriter { writer }
    }

    pub fn write_entities(&mut self, entities: &[Entity]) -> Result<()> {
        for entity in entities {
            let json = serde_json::to_string(entity).context("Failed to serialize entity")?;
            writeln!(self.writer, "{}", json).context("Failed to write entity")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<Entity> {
        vec![
            serde_json::from_value(json!({"id": 1, "tracks": [{"id": 1}]})).unwrap(),
            serde_json::from_value(json!({"id": 2, "tracks": []})).unwrap(),
        ]
    }

    #[test]
    fn test_lines_writer() {
        let mut buffer = Vec::new();
        let mut writer = LinesWriter::new(&mut buffer);
        writer.write_entities(&sample()).unwrap();
        writer.flush().unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines, vec![r#"{"id":1,"tracks":[{"id":1}]}"#, r#"{"id":2,"tracks":[]}"#]);
    }

    #[test]
    fn test_compact_array_writer() {
        let mut buffer = Vec::new();
        ArrayWriter::compact(&mut buffer).write_entities(&sample()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output, "[{\"id\":1,\"tracks\":[{\"id\":1}]},{\"id\":2,\"tracks\":[]}]\n");
    }

    #[test]
    fn test_pretty_array_writer_round_trips() {
        let mut buffer = Vec::new();
        ArrayWriter::new(&mut buffer).write_entities(&sample()).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed, json!([{"id": 1, "tracks": [{"id": 1}]}, {"id": 2, "tracks": []}]));
    }
}
