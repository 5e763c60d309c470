//! Object identities, request contexts and their string forms

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Per-request key/value context. Order is irrelevant.
pub type Context = HashMap<String, String>;

/// Ordered sequence of strings
pub type StringSeq = Vec<String>;

/// Address of an object within the RPC runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    /// Object name
    pub name: String,
    /// Object category (may be empty)
    pub category: String,
}

impl Identity {
    /// Create an identity
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&identity_to_string(self))
    }
}

/// Errors parsing a stringified identity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityParseError {
    /// More than one unescaped `/`
    #[error("unescaped '/' in identity `{0}`")]
    ExtraSlash(String),

    /// Malformed escape sequence
    #[error("invalid escape sequence in identity `{0}`")]
    BadEscape(String),
}

impl IdentityParseError {
    /// The text that failed to parse
    pub fn input(&self) -> &str {
        match self {
            IdentityParseError::ExtraSlash(s) | IdentityParseError::BadEscape(s) => s,
        }
    }
}

/// Render an identity as `category/name`, or just `name` when the category
/// is empty. Both parts are escaped so the result parses back unchanged.
pub fn identity_to_string(ident: &Identity) -> String {
    if ident.category.is_empty() {
        escape(&ident.name)
    } else {
        format!("{}/{}", escape(&ident.category), escape(&ident.name))
    }
}

/// Parse the output of [`identity_to_string`].
pub fn string_to_identity(s: &str) -> Result<Identity, IdentityParseError> {
    let slash = match find_unescaped_slash(s, 0) {
        Some(pos) => pos,
        None => {
            let name = unescape(s).ok_or_else(|| IdentityParseError::BadEscape(s.to_string()))?;
            return Ok(Identity::new(name, ""));
        }
    };

    if find_unescaped_slash(s, slash + 1).is_some() {
        return Err(IdentityParseError::ExtraSlash(s.to_string()));
    }

    let category = unescape(&s[..slash]);
    let name = unescape(&s[slash + 1..]);
    match (category, name) {
        (Some(category), Some(name)) => Ok(Identity { name, category }),
        _ => Err(IdentityParseError::BadEscape(s.to_string())),
    }
}

fn find_unescaped_slash(s: &str, from: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'/' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '/' => out.push_str("\\/"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            c @ ('\\' | '\'' | '"' | '/') => out.push(c),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value)?);
            }
            _ => return None,
        }
    }
    Some(out)
}
