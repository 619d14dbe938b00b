//! Enumerated literal sets: explicit `enum` lists, or literals recovered from
//! description sentences like "Can be `a`, `b`, or `c`.".
use once_cell::sync::Lazy;
use regex::Regex;

use crate::property::PropertyDescriptor;

/// Strict sentence: backtick literals separated by commas, closed by
/// "or `x`." or "or null.".
static ENUM_SENTENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:can be|one of|either)\s+((?:`[^`]*`,?\s+)+)or\s+(?:`([^`]*)`|null)\.")
        .expect("enum sentence pattern")
});

/// Loose check: looks like the start of such a sentence.
static ENUM_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:can be|one of|either)\s+`").expect("enum hint pattern"));

static BACKTICKED: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").expect("backtick pattern"));

pub fn from_explicit(node: &PropertyDescriptor) -> Option<&[String]> {
    node.enum_literals.as_deref()
}

/// Literals enumerated by the first matching sentence, in order, deduplicated.
pub fn from_description(text: &str) -> Option<Vec<String>> {
    let caps = ENUM_SENTENCE.captures(text)?;
    let mut literals: Vec<String> = Vec::new();
    let listed = BACKTICKED
        .captures_iter(&caps[1])
        .map(|c| c[1].to_string());
    let last = caps.get(2).map(|m| m.as_str().to_string());
    for literal in listed.chain(last) {
        if !literals.contains(&literal) {
            literals.push(literal);
        }
    }
    Some(literals)
}

/// Text that reads like an enumeration without matching the strict sentence.
pub fn looks_enumerated(text: &str) -> bool {
    ENUM_HINT.is_match(text)
}

/// Explicit list first; the description is consulted only when there is none.
pub fn resolve(node: &PropertyDescriptor) -> Option<Vec<String>> {
    if let Some(literals) = from_explicit(node) {
        return Some(literals.to_vec());
    }
    node.description.as_deref().and_then(from_description)
}
