//! Identifier normalization: casing, punctuation stripping, keyword escaping.
//!
//! Every input string has a defined output; nothing here fails.

/// Characters that split words. They are dropped and the next character is
/// capitalized.
const SEPARATORS: [char; 4] = ['_', '.', ' ', '-'];

/// Prefix for names whose first character is a digit.
pub const DIGIT_MARKER: &str = "Num";

/// Stand-in for names that clean down to nothing (e.g. the `""` enum literal).
const EMPTY_NAME: &str = "Empty";

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that `r#` cannot wrap.
const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    UpperCamel,
    LowerCamel,
    Snake,
}

impl Case {
    pub fn apply(self, s: &str) -> String {
        match self {
            Case::UpperCamel => to_upper_camel(s),
            Case::LowerCamel => to_lower_camel(s),
            Case::Snake => to_snake(s),
        }
    }
}

/// A generated identifier plus the wire literal it stands for, when the two
/// differ and the literal has to be carried through to serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapedName {
    pub ident: String,
    pub literal: Option<String>,
}

impl EscapedName {
    /// The identifier without any `r#` marker.
    pub fn bare(&self) -> &str {
        self.ident.strip_prefix("r#").unwrap_or(&self.ident)
    }
}

pub fn to_upper_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = true;
    for c in s.chars() {
        if SEPARATORS.contains(&c) {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

pub fn to_lower_camel(s: &str) -> String {
    let upper = to_upper_camel(s);
    let mut chars = upper.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => upper,
    }
}

/// snake_case for Rust members; splits on separators and on case boundaries
/// (`URLPath` → `url_path`).
pub fn to_snake(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if SEPARATORS.contains(&c) {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    while out.ends_with('_') && out.len() > 1 {
        out.pop();
    }
    out
}

pub fn is_reserved(ident: &str) -> bool {
    KEYWORDS.contains(&ident)
}

/// Turn an arbitrary wire string into an identifier in the given case.
///
/// - punctuation other than the word separators is stripped
/// - a leading digit gets the [`DIGIT_MARKER`] prefix before casing
/// - keywords become raw identifiers (`r#type`), or get a trailing `_` when
///   `r#` cannot be used
/// - `literal` records the original string whenever the bare identifier
///   differs from it
pub fn escape_identifier(raw: &str, case: Case) -> EscapedName {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || SEPARATORS.contains(c))
        .collect();
    if cleaned.chars().all(|c| SEPARATORS.contains(&c)) {
        cleaned = EMPTY_NAME.to_string();
    }
    // separators vanish during casing, so the first kept character decides
    let leading = cleaned.trim_start_matches(SEPARATORS);
    if leading.starts_with(|c: char| c.is_ascii_digit()) {
        cleaned = format!("{DIGIT_MARKER}_{leading}");
    }

    let mut bare = case.apply(&cleaned);
    let ident = if NON_RAW_KEYWORDS.contains(&bare.as_str()) {
        bare.push('_');
        bare.clone()
    } else if is_reserved(&bare) {
        format!("r#{bare}")
    } else {
        bare.clone()
    };

    EscapedName {
        ident,
        literal: (bare != raw).then(|| raw.to_string()),
    }
}

/// Normalized type name for a schema or synthesized declaration.
pub fn type_name(raw: &str) -> String {
    escape_identifier(raw, Case::UpperCamel).ident
}
