//! The parsed input of one generation run.
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::path_de;

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    components: RawComponents,
    #[serde(default)]
    paths: IndexMap<String, IndexMap<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawComponents {
    #[serde(default)]
    schemas: IndexMap<String, Value>,
}

/// Schema and path maps, both in document order.
#[derive(Debug, Default, Clone)]
pub struct SchemaDocument {
    pub schemas: IndexMap<String, Value>,
    /// path template → verb → operation node
    pub paths: IndexMap<String, IndexMap<String, Value>>,
}

impl SchemaDocument {
    pub fn from_json_str(src: &str) -> Result<Self> {
        let raw: RawDocument = path_de::from_str_with_path("API document", src)?;
        Ok(raw.into())
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawDocument = path_de::from_value_with_path("API document", value)?;
        Ok(raw.into())
    }

    pub fn operation(&self, path: &str, verb: &str) -> Option<&Value> {
        self.paths.get(path)?.get(&verb.to_ascii_lowercase())
    }
}

impl From<RawDocument> for SchemaDocument {
    fn from(raw: RawDocument) -> Self {
        Self {
            schemas: raw.components.schemas,
            paths: raw.paths,
        }
    }
}
