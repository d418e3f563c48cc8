//! Namespaces and their derivation from a host origin.
//!
//! A namespace is either given explicitly or derived from the origin the
//! store runs under: the hostname labels are reversed, so
//! `https://app.example.com` becomes `com.example.app`.
//!
//! The origin comes from a [`HostContext`] handed in by the caller rather
//! than from global state, which keeps derivation testable without a
//! browsing environment.

use std::fmt;

use url::Url;

use crate::error::{StorageError, StorageResult};

/// Source of the current network origin.
pub trait HostContext {
    /// The origin the store is running under, if there is one.
    fn origin(&self) -> Option<&Url>;
}

/// A host context pinned to one origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticOrigin(Url);

impl StaticOrigin {
    /// Wrap an already-parsed origin.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    /// Parse an origin from text.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidOrigin`] if `origin` is not a URL.
    pub fn parse(origin: &str) -> StorageResult<Self> {
        Url::parse(origin)
            .map(Self)
            .map_err(|e| StorageError::InvalidOrigin(format!("'{origin}': {e}")))
    }
}

impl HostContext for StaticOrigin {
    fn origin(&self) -> Option<&Url> {
        Some(&self.0)
    }
}

/// A host context with no origin (worker threads, CLIs, tests).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Detached;

impl HostContext for Detached {
    fn origin(&self) -> Option<&Url> {
        None
    }
}

/// The logical database every key of a store is scoped under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// Use `name` verbatim as the namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidNamespace`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> StorageResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StorageError::InvalidNamespace(
                "namespace must not be empty".into(),
            ));
        }
        Ok(Self(name))
    }

    /// Reverse the dot-separated labels of `hostname`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingHostContext`] if `hostname` is empty.
    pub fn from_hostname(hostname: &str) -> StorageResult<Self> {
        if hostname.is_empty() {
            return Err(StorageError::MissingHostContext);
        }
        let reversed: Vec<&str> = hostname.split('.').rev().collect();
        Ok(Self(reversed.join(".")))
    }

    /// Derive the namespace from the hostname of `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingHostContext`] if the URL has no host.
    pub fn from_origin(origin: &Url) -> StorageResult<Self> {
        let host = origin.host_str().ok_or(StorageError::MissingHostContext)?;
        Self::from_hostname(host)
    }

    /// Pick the explicit namespace if one is given, else derive one from `host`.
    ///
    /// An empty explicit name counts as "not given".
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingHostContext`] when no explicit name is
    /// given and `host` has no origin with a hostname.
    pub fn resolve(explicit: Option<&str>, host: &dyn HostContext) -> StorageResult<Self> {
        match explicit {
            Some(name) if !name.is_empty() => Self::new(name),
            _ => {
                let origin = host.origin().ok_or(StorageError::MissingHostContext)?;
                Self::from_origin(origin)
            },
        }
    }

    /// The namespace as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hostname_reverses_labels() {
        let ns = Namespace::from_hostname("app.example.com").unwrap();
        assert_eq!(ns.as_str(), "com.example.app");
    }

    #[test]
    fn test_from_hostname_single_label() {
        let ns = Namespace::from_hostname("localhost").unwrap();
        assert_eq!(ns.as_str(), "localhost");
    }

    #[test]
    fn test_from_origin_ignores_scheme_port_and_path() {
        let url = Url::parse("https://app.example.com:8443/some/page?q=1").unwrap();
        let ns = Namespace::from_origin(&url).unwrap();
        assert_eq!(ns.as_str(), "com.example.app");
    }

    #[test]
    fn test_from_origin_without_host_fails() {
        let url = Url::parse("data:text/plain,hello").unwrap();
        assert!(matches!(
            Namespace::from_origin(&url),
            Err(StorageError::MissingHostContext)
        ));
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let host = StaticOrigin::parse("https://app.example.com").unwrap();
        let ns = Namespace::resolve(Some("my-db"), &host).unwrap();
        assert_eq!(ns.as_str(), "my-db");
    }

    #[test]
    fn test_resolve_derives_from_host() {
        let host = StaticOrigin::parse("https://app.example.com").unwrap();
        let ns = Namespace::resolve(None, &host).unwrap();
        assert_eq!(ns.as_str(), "com.example.app");
    }

    #[test]
    fn test_resolve_empty_explicit_falls_back_to_host() {
        let host = StaticOrigin::parse("https://a.b").unwrap();
        let ns = Namespace::resolve(Some(""), &host).unwrap();
        assert_eq!(ns.as_str(), "b.a");
    }

    #[test]
    fn test_resolve_detached_requires_explicit() {
        assert!(matches!(
            Namespace::resolve(None, &Detached),
            Err(StorageError::MissingHostContext)
        ));
        assert!(Namespace::resolve(Some("ns"), &Detached).is_ok());
    }

    #[test]
    fn test_parse_malformed_origin_keeps_reason() {
        let err = StaticOrigin::parse("not a url").unwrap_err();
        let StorageError::InvalidOrigin(message) = err else {
            panic!("expected InvalidOrigin, got {err:?}");
        };
        assert!(message.contains("not a url"));
        assert!(message.contains("relative URL without a base"));
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(matches!(
            Namespace::new(""),
            Err(StorageError::InvalidNamespace(_))
        ));
    }
}
