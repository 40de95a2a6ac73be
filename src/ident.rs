//! Identifier sanitizer: arbitrary JSON keys → valid C++ identifiers.
//!
//! Keys are split into words on every non-alphanumeric character (`_`
//! included), then on case and letter/digit transitions inside each run, so
//! `HTTPStatus`, `http_status` and `http-status` all land on the same words.
//! Words are lowercased before re-casing, which keeps the output independent of
//! the input's original letter casing.
use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Identifier returned when a key holds no letter or digit at all.
pub const FALLBACK_IDENT: &str = "_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    /// `user_name`
    Snake,
    /// `userName`
    LowerCamel,
    /// `UserName`, used for type names.
    UpperCamel,
}

// ------------------------------ Reserved --------------------------------- //

static CPP_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
        "case", "catch", "char", "char16_t", "char32_t", "class", "compl", "const", "constexpr",
        "const_cast", "continue", "decltype", "default", "delete", "do", "double", "dynamic_cast",
        "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
        "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
        "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
        "reinterpret_cast", "return", "short", "signed", "sizeof", "static", "static_assert",
        "static_cast", "struct", "switch", "template", "this", "thread_local", "throw", "true",
        "try", "typedef", "typeid", "typename", "union", "unsigned", "using", "virtual", "void",
        "volatile", "wchar_t", "while", "xor", "xor_eq",
    ]
    .into_iter()
    .collect()
});

/// Case-insensitive check against the C++ keyword table.
pub fn is_reserved(ident: &str) -> bool {
    CPP_KEYWORDS.contains(ident.to_lowercase().as_str())
}

// ------------------------------ Sanitize --------------------------------- //

/// Map `key` to an identifier in the requested casing. Total: never fails, may
/// degrade to [`FALLBACK_IDENT`].
pub fn sanitize(key: &str, casing: Casing) -> String {
    let words = split_words(key);
    if words.is_empty() {
        return FALLBACK_IDENT.to_string();
    }

    let mut out = match casing {
        Casing::Snake => words.join("_"),
        Casing::LowerCamel => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
            .collect(),
        Casing::UpperCamel => words.iter().map(|w| capitalize(w)).collect(),
    };

    if out.chars().next().is_some_and(char::is_numeric) {
        out.insert(0, '_');
    }
    if is_reserved(&out) {
        out.push('_');
    }
    out
}

/// Lowercased words of `key`, in order.
fn split_words(key: &str) -> Vec<String> {
    let mut words = Vec::new();
    for run in key.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = run.chars().collect();
        let mut start = 0;
        for i in 1..chars.len() {
            let (prev, cur) = (chars[i - 1], chars[i]);
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && cur.is_uppercase())
                // end of an acronym: `HTTPStatus` splits before `S`
                || (prev.is_uppercase() && cur.is_uppercase() && next.is_some_and(char::is_lowercase))
                || prev.is_numeric() != cur.is_numeric();
            if boundary {
                words.push(lower(&chars[start..i]));
                start = i;
            }
        }
        if start < chars.len() {
            words.push(lower(&chars[start..]));
        }
    }
    words
}

fn lower(chars: &[char]) -> String {
    chars.iter().collect::<String>().to_lowercase()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ------------------------------- Tests ------------------------------------ //
