use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const UNKNOWN_SOURCE: &str = "unknown-source";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TagRef {
    pub name: String,
}

/// One requirement as served by the requirements listing.
#[derive(Clone, Debug, Deserialize)]
pub struct Entity {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub req_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub requirement_type: Option<String>,
    #[serde(
        default,
        rename = "source_document_filename",
        alias = "sourceDocument",
        alias = "source_document"
    )]
    pub source_document: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<TagRef>,
}

impl Entity {
    pub fn source_document(&self) -> &str {
        self.source_document
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_SOURCE)
    }

    pub fn display_id(&self) -> &str {
        self.req_id.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
impl Entity {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            req_id: None,
            title: title.into(),
            description: None,
            status: None,
            priority: None,
            requirement_type: None,
            source_document: None,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, names: &[&str]) -> Self {
        self.tags = names
            .iter()
            .map(|name| TagRef {
                name: (*name).to_owned(),
            })
            .collect();
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source_document = Some(source.to_owned());
        self
    }
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "requirement id must be a string or number, got {other}"
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
