//! Storage path construction.
//!
//! Every key a [`Plex`](crate::Plex) writes lands at `@{namespace}/{key}`.

/// Marker that opens every storage path.
pub const NAMESPACE_SIGIL: char = '@';

/// Separator between the namespace and the logical key.
pub const PATH_SEPARATOR: char = '/';

/// Trailing character that turns a delete into a prefix delete.
pub const WILDCARD: char = '%';

/// Build the storage path `@{namespace}/{key}`.
#[must_use]
pub fn storage_path(namespace: &str, key: &str) -> String {
    let capacity = namespace.len().saturating_add(key.len()).saturating_add(2);
    let mut buf = String::with_capacity(capacity);
    buf.push(NAMESPACE_SIGIL);
    buf.push_str(namespace);
    buf.push(PATH_SEPARATOR);
    buf.push_str(key);
    buf
}

/// The `@{namespace}/` prefix shared by all paths of one namespace.
#[must_use]
pub fn namespace_prefix(namespace: &str) -> String {
    storage_path(namespace, "")
}

/// Recover the logical key from a storage path, if it belongs to `namespace`.
#[must_use]
pub fn logical_key<'a>(namespace: &str, path: &'a str) -> Option<&'a str> {
    path.strip_prefix(NAMESPACE_SIGIL)?
        .strip_prefix(namespace)?
        .strip_prefix(PATH_SEPARATOR)
}

/// If `path` ends with the wildcard marker, the prefix it stands for.
#[must_use]
pub fn wildcard_prefix(path: &str) -> Option<&str> {
    path.strip_suffix(WILDCARD)
}
