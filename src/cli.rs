//! CLI: API document → (types | services | all)
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use schema_bindgen::{GeneratorConfig, OptionalityRule, SchemaDocument};
use tracing::{debug, warn};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate Rust type declarations and per-resource services from an OpenAPI-style JSON document
#[derive(Parser, Debug)]
#[command(name = "schema-bindgen", version)]
pub struct CommandLineInterface {
    /// more logging (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// emit the type declarations module
    Types(SingleOut),
    /// emit the services module
    Services(SingleOut),
    /// emit both modules; nothing is written unless both succeed
    All(AllOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// the API document (JSON)
    #[arg(long, short)]
    input: PathBuf,

    /// jq filter applied to the document first; must yield exactly one value
    #[arg(long)]
    jq_expr: Option<String>,

    /// generator settings (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// which signals make a field optional (overrides the config file)
    #[arg(long, value_enum)]
    optionality: Option<OptionalityRule>,

    /// schema extension key listing resource operations (overrides the config file)
    #[arg(long)]
    operations_marker: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct SingleOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .rs file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct AllOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// directory receiving `types.rs` and `services.rs` (stdout if omitted)
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_config(&self) -> Result<GeneratorConfig> {
        let mut config = match self.config.as_ref() {
            Some(path) => GeneratorConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => GeneratorConfig::default(),
        };
        if let Some(rule) = self.optionality {
            config.optionality = rule;
        }
        if let Some(marker) = self.operations_marker.as_ref() {
            config.operations_marker = marker.clone();
        }
        Ok(config)
    }

    fn load_document(&self) -> Result<SchemaDocument> {
        let source_path_str = self.input.display().to_string();
        let source = std::fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read source file {source_path_str}"))?;
        let document = match self.jq_expr.as_ref() {
            None => SchemaDocument::from_json_str(&source),
            Some(jq_expr) => {
                let value: serde_json::Value =
                    schema_bindgen::path_de::from_str_with_path("API document", &source)
                        .with_context(|| format!("failed to parse {source_path_str}"))?;
                let value = schema_bindgen::jq_exec::apply_filter(jq_expr, &value)
                    .with_context(|| format!("failed to apply jq expression to {source_path_str}"))?;
                SchemaDocument::from_value(value)
            }
        };
        let document = document.with_context(|| format!("failed to load {source_path_str}"))?;
        debug!(
            schemas = document.schemas.len(),
            paths = document.paths.len(),
            "document loaded"
        );
        Ok(document)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Types(target) => {
                let config = target.input_settings.load_config()?;
                let doc = target.input_settings.load_document()?;
                let src = schema_bindgen::generate_types(&doc, &config)?;
                write_output(target.out.as_deref(), &src)
            }
            Command::Services(target) => {
                let config = target.input_settings.load_config()?;
                let doc = target.input_settings.load_document()?;
                let src = schema_bindgen::generate_services(&doc, &config)?;
                write_output(target.out.as_deref(), &src)
            }
            Command::All(target) => {
                let config = target.input_settings.load_config()?;
                let doc = target.input_settings.load_document()?;
                let sources = schema_bindgen::generate(&doc, &config)?;
                match target.out_dir.as_ref() {
                    Some(dir) => write_module_set(
                        dir,
                        &[("types.rs", sources.types.as_str()), ("services.rs", sources.services.as_str())],
                    ),
                    None => {
                        print!("{}", sources.types);
                        println!();
                        print!("{}", sources.services);
                        Ok(())
                    }
                }
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, src: &str) -> Result<()> {
    let Some(out) = out else {
        print!("{src}");
        return Ok(());
    };
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
    debug!(path = %out.display(), bytes = src.len(), "wrote output");
    Ok(())
}

/// Write every file of `modules` into `dir`, or none of them. Each file is
/// staged as `.{name}.partial` and only renamed into place once all staging
/// writes succeeded.
fn write_module_set(dir: &Path, modules: &[(&str, &str)]) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(modules.len());
    for (name, src) in modules {
        let partial = dir.join(format!(".{name}.partial"));
        if let Err(err) = std::fs::write(&partial, src) {
            discard_staged(staged.iter().map(|(partial, _)| partial.as_path()));
            return Err(err).with_context(|| {
                format!("failed to stage {}; no output was written to {}", partial.display(), dir.display())
            });
        }
        staged.push((partial, dir.join(name)));
    }
    for (index, (partial, target)) in staged.iter().enumerate() {
        if let Err(err) = std::fs::rename(partial, target) {
            discard_staged(staged[index..].iter().map(|(partial, _)| partial.as_path()));
            let written: Vec<String> = staged[..index].iter().map(|(_, t)| t.display().to_string()).collect();
            return Err(err).with_context(|| {
                format!(
                    "failed to move {} into place (already written: [{}])",
                    target.display(),
                    written.join(", ")
                )
            });
        }
        debug!(path = %target.display(), "wrote output");
    }
    Ok(())
}

fn discard_staged<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        if let Err(err) = std::fs::remove_file(path) {
            warn!(path = %path.display(), %err, "could not remove staged output");
        }
    }
}
