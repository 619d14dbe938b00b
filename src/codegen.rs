//! Rendering of resolved models as Rust source text.
//!
//! Two-phase: the builders hand over complete, ordered declaration lists and
//! rendering decides group-opening vs continuation purely by position.
pub mod services;
pub mod types;

use std::collections::HashMap;

use crate::ir::{NamedType, TypeKind};

pub const GENERATED_MARKER: &str = "// @generated by schema-bindgen. Do not edit.";

const INDENT: &str = "    ";

/// Position of a declaration within its output group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupPosition {
    /// first declaration; carries the module prelude
    Opening,
    Continuation,
}

impl GroupPosition {
    pub fn of(index: usize) -> Self {
        if index == 0 {
            GroupPosition::Opening
        } else {
            GroupPosition::Continuation
        }
    }
}

/// Line-oriented text builder.
#[derive(Debug, Default)]
pub struct Codegen {
    out: String,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// `///` block; every embedded line continues the comment at `depth`.
    pub fn doc_comment(&mut self, depth: usize, text: &str) {
        for line in text.trim().lines() {
            let line = line.trim_end();
            if line.is_empty() {
                self.line(depth, "///");
            } else {
                self.line(depth, format!("/// {line}"));
            }
        }
    }

    /// `//!` block for the top of a generated module.
    pub fn module_doc(&mut self, text: &str) {
        for line in text.trim().lines() {
            let line = line.trim_end();
            if line.is_empty() {
                self.line(0, "//!");
            } else {
                self.line(0, format!("//! {line}"));
            }
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

/// Declared kind of every named type, looked up by name at render time.
#[derive(Debug, Default)]
pub struct TypeTable<'a> {
    kinds: HashMap<&'a str, TypeKind>,
}

impl<'a> TypeTable<'a> {
    pub fn new(types: &'a [NamedType]) -> Self {
        Self {
            kinds: types.iter().map(|t| (t.name(), t.kind())).collect(),
        }
    }

    pub fn kind(&self, name: &str) -> Option<TypeKind> {
        self.kinds.get(name).copied()
    }

    /// Direct references to records and unions go through `Box` so that
    /// recursive declarations have a finite size.
    pub fn needs_box(&self, name: &str) -> bool {
        matches!(self.kind(name), Some(TypeKind::Record | TypeKind::Union))
    }
}

/// Rust string literal for arbitrary wire text.
pub fn quoted(text: &str) -> String {
    format!("{text:?}")
}
