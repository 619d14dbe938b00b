//! Generator settings, loadable from a TOML file and overridable per flag.
use std::path::Path;

use serde::Deserialize;

use crate::error::{GeneratorError, Result};

/// Which signals make an emitted field `Option<_>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OptionalityRule {
    /// only `nullable: true`; the `required` list is ignored
    #[default]
    Nullable,
    /// only absence from the owning schema's `required` list
    Required,
    /// either of the above
    NullableOrNotRequired,
}

impl OptionalityRule {
    pub fn is_optional(self, nullable: bool, required: bool) -> bool {
        match self {
            OptionalityRule::Nullable => nullable,
            OptionalityRule::Required => !required,
            OptionalityRule::NullableOrNotRequired => nullable || !required,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub optionality: OptionalityRule,
    /// schema extension key holding the resource-operation markers
    pub operations_marker: String,
    /// suffix for unions synthesized from a record property
    pub union_suffix: String,
    /// module path the service text imports its types from
    pub types_module: String,
    /// module path of the runtime `ApiClient` boundary
    pub client_module: String,
    pub types_module_doc: Option<String>,
    pub services_module_doc: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            optionality: OptionalityRule::default(),
            operations_marker: "x-stripeOperations".to_string(),
            union_suffix: "DU".to_string(),
            types_module: "crate::types".to_string(),
            client_module: "crate::client".to_string(),
            types_module_doc: None,
            services_module_doc: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let config: Self = crate::path_de::from_toml_with_path("configuration", src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path).map_err(|source| GeneratorError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    fn validate(&self) -> Result<()> {
        if self.operations_marker.trim().is_empty() {
            return Err(GeneratorError::Config("`operations_marker` must not be empty".into()));
        }
        if !self.union_suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(GeneratorError::Config(format!(
                "`union_suffix` must be alphanumeric, got `{}`",
                self.union_suffix
            )));
        }
        Ok(())
    }
}
