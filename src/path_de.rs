use serde::de::DeserializeOwned;

use crate::error::{GeneratorError, Result};

fn parse_error<E: std::fmt::Display>(what: &str, err: serde_path_to_error::Error<E>) -> GeneratorError {
    let path = err.path().to_string();
    GeneratorError::Parse {
        what: what.to_string(),
        message: format!("at path {path} → {}", err.into_inner()),
    }
}

/// Deserialize JSON text with the failing path in the error message.
pub fn from_str_with_path<T: DeserializeOwned>(what: &str, src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize(de).map_err(|err| parse_error(what, err))
}

/// Same, starting from an already parsed value (e.g. after a jq filter).
pub fn from_value_with_path<T: DeserializeOwned>(what: &str, value: serde_json::Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|err| parse_error(what, err))
}

pub fn from_toml_with_path<T: DeserializeOwned>(what: &str, src: &str) -> Result<T> {
    let de = toml::Deserializer::new(src);
    serde_path_to_error::deserialize(de).map_err(|err| parse_error(what, err))
}
