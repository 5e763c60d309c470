//! Scalar and collection converters
//!
//! Every converter either produces a complete value or fails without leaving
//! a partial one behind: host containers under construction are owned by a
//! [`Handle`] and released on the error path, and native collections are
//! only returned once every element converted.

use tether_rpc::{Context, StringSeq};

use crate::error::{value_error, HostResult, RaisedExt};
use crate::handle::Handle;
use crate::lock::HostToken;

/// Build a host list of strings
pub fn strings_to_host<'h>(py: HostToken<'h>, seq: &[String]) -> HostResult<'h, Handle<'h>> {
    let host = py.host();
    let list = Handle::wrap(py, host.new_list())?;
    for s in seq {
        let item = Handle::new_str(py, s)?;
        host.list_append(list.as_raw(), item.as_raw()).adopt_err(py)?;
    }
    Ok(list)
}

/// Read a host list of strings.
///
/// Fails with `TypeError` if `list` is not a list and `ValueError` if any
/// element is not a string.
pub fn host_to_strings<'h>(py: HostToken<'h>, list: &Handle<'h>) -> HostResult<'h, StringSeq> {
    let host = py.host();
    let len = host.list_len(list.as_raw()).adopt_err(py)?;
    let mut seq = Vec::with_capacity(len);
    for index in 0..len {
        let item = host.list_get(list.as_raw(), index).adopt_err(py)?;
        if !host.is_str(item) {
            return Err(value_error(py, "string sequence element must be a string"));
        }
        seq.push(host.str_value(item).adopt_err(py)?);
    }
    Ok(seq)
}

/// Read a host mapping of strings into a [`Context`].
///
/// The first non-string key or value fails the whole conversion with a
/// `ValueError` naming which of the two it was.
pub fn dict_to_context<'h>(py: HostToken<'h>, dict: &Handle<'h>) -> HostResult<'h, Context> {
    let host = py.host();
    let items = host.dict_items(dict.as_raw()).adopt_err(py)?;
    let mut pairs = Vec::with_capacity(items.len());
    for (key, value) in items {
        if !host.is_str(key) {
            return Err(value_error(py, "context key must be a string"));
        }
        if !host.is_str(value) {
            return Err(value_error(py, "context value must be a string"));
        }
        let key = host.str_value(key).adopt_err(py)?;
        let value = host.str_value(value).adopt_err(py)?;
        pairs.push((key, value));
    }
    Ok(collect_context(pairs))
}

/// Build a host mapping from a [`Context`]
pub fn context_to_dict<'h>(py: HostToken<'h>, ctx: &Context) -> HostResult<'h, Handle<'h>> {
    let host = py.host();
    let dict = Handle::wrap(py, host.new_dict())?;
    for (key, value) in ctx {
        let key = Handle::new_str(py, key)?;
        let value = Handle::new_str(py, value)?;
        host.dict_set_item(dict.as_raw(), key.as_raw(), value.as_raw())
            .adopt_err(py)?;
    }
    Ok(dict)
}

/// Insert pairs; for a repeated key the first occurrence wins
pub(crate) fn collect_context<I>(pairs: I) -> Context
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut ctx = Context::new();
    for (key, value) in pairs {
        ctx.entry(key).or_insert(value);
    }
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_wins() {
        let ctx = collect_context(vec![
            ("k".to_string(), "first".to_string()),
            ("other".to_string(), "x".to_string()),
            ("k".to_string(), "second".to_string()),
        ]);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx["k"], "first");
    }

    #[test]
    fn test_empty_pairs() {
        assert!(collect_context(Vec::new()).is_empty());
    }
}
