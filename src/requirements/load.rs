use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use super::model::Entity;

pub fn load_entities(path: &Path) -> Result<Vec<Entity>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read requirements from {}", path.display()))?;
    parse_entities(&raw)
        .with_context(|| format!("failed to parse requirements from {}", path.display()))
}

pub(super) fn parse_entities(raw: &str) -> Result<Vec<Entity>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON")?;

    let list = match parsed {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("requirements") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => return Err(anyhow!("\"requirements\" must be an array")),
        },
        Value::Null => Vec::new(),
        _ => return Err(anyhow!("expected an array of requirements")),
    };

    let mut entities = Vec::with_capacity(list.len());
    for (index, value) in list.into_iter().enumerate() {
        let entity = Entity::deserialize(value)
            .with_context(|| format!("invalid requirement at position {index}"))?;
        entities.push(entity);
    }

    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::UNKNOWN_SOURCE;

    #[test]
    fn parses_listing_shape() {
        let raw = r#"[
            {
                "id": 7,
                "req_id": "REQ-007",
                "title": "Login",
                "priority": "High",
                "source_document_filename": "srs.docx",
                "tags": [{"id": 1, "name": "UI"}, {"id": 2, "name": "Security"}]
            }
        ]"#;

        let entities = parse_entities(raw).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].id, "7");
        assert_eq!(entities[0].display_id(), "REQ-007");
        assert_eq!(entities[0].source_document(), "srs.docx");
        assert_eq!(entities[0].tags.len(), 2);
        assert_eq!(entities[0].tags[1].name, "Security");
    }

    #[test]
    fn missing_tags_and_source_fall_back() {
        let raw = r#"{"requirements": [
            {"id": "a", "title": "No tags"},
            {"id": "b", "title": "Null tags", "tags": null, "source_document_filename": null},
            {"id": "c", "title": "Blank source", "sourceDocument": "   "}
        ]}"#;

        let entities = parse_entities(raw).unwrap();
        assert_eq!(entities.len(), 3);
        for entity in &entities {
            assert!(entity.tags.is_empty());
            assert_eq!(entity.source_document(), UNKNOWN_SOURCE);
        }
        assert_eq!(entities[0].display_id(), "a");
    }

    #[test]
    fn empty_inputs_are_not_errors() {
        assert!(parse_entities("[]").unwrap().is_empty());
        assert!(parse_entities("null").unwrap().is_empty());
        assert!(parse_entities("{}").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse_entities("not json").is_err());
        assert!(parse_entities("42").is_err());
        assert!(parse_entities(r#"[{"id": true, "title": "x"}]"#).is_err());
        assert!(parse_entities(r#"{"requirements": "nope"}"#).is_err());
    }
}
