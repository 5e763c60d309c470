//! Identifier escaping and scoped-name conversion

/// Host reserved words, sorted for binary search
const RESERVED_WORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Prefix that escapes a reserved word
pub const ESCAPE_PREFIX: char = '_';

/// Native scope separator
pub const SCOPE_SEPARATOR: &str = "::";

/// Host namespace separator
pub const HOST_SEPARATOR: &str = ".";

/// Is `ident` a host reserved word
pub fn is_reserved(ident: &str) -> bool {
    RESERVED_WORDS.binary_search(&ident).is_ok()
}

/// Escape a reserved identifier.
///
/// A scoped identifier (`::A::B`) has each component escaped separately;
/// separators and other components are left untouched.
pub fn fix_identifier(ident: &str) -> String {
    if !ident.starts_with(SCOPE_SEPARATOR) {
        return escape_component(ident);
    }
    ident
        .split(SCOPE_SEPARATOR)
        .map(escape_component)
        .collect::<Vec<_>>()
        .join(SCOPE_SEPARATOR)
}

/// Convert a native scoped name to a dotted host name, e.g.
/// `::Rpc::ObjectNotExistException` to `Rpc.ObjectNotExistException`
pub fn scope_to_host_name(scoped: &str) -> String {
    let fixed = fix_identifier(scoped);
    let relative = fixed.strip_prefix(SCOPE_SEPARATOR).unwrap_or(&fixed);
    relative.replace(SCOPE_SEPARATOR, HOST_SEPARATOR)
}

/// Convert a dotted host name back to a native scoped name, removing the
/// escape from reserved components
pub fn host_name_to_scope(name: &str) -> String {
    let mut scoped = String::with_capacity(name.len() + SCOPE_SEPARATOR.len());
    for component in name.split(HOST_SEPARATOR) {
        scoped.push_str(SCOPE_SEPARATOR);
        scoped.push_str(unescape_component(component));
    }
    scoped
}

/// Last component of a scoped name
pub fn unscoped_name(scoped: &str) -> &str {
    scoped.rsplit(SCOPE_SEPARATOR).next().unwrap_or(scoped)
}

fn escape_component(ident: &str) -> String {
    if is_reserved(ident) {
        format!("{}{}", ESCAPE_PREFIX, ident)
    } else {
        ident.to_string()
    }
}

fn unescape_component(ident: &str) -> &str {
    match ident.strip_prefix(ESCAPE_PREFIX) {
        Some(word) if is_reserved(word) => word,
        _ => ident,
    }
}
