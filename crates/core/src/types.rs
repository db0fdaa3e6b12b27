//! Core types for the persistent log
//!
//! This module defines the fundamental types used throughout the system:
//! - [`ResourceName`]: Validated, path-like name of a log resource
//! - [`SyncDirection`]: Which way a durable sync moves data

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Suffix reserved for in-flight temp files of durable stores
pub const RESERVED_SUFFIX: &str = ".keepsake-tmp";

/// Name of a log resource
///
/// ResourceName is the path-like identifier of an append-only byte sequence.
/// It's used in:
/// - Storage media to locate files (disk) or table entries (virtual fs)
/// - Mount routing: the first segment is the mount prefix
/// - Backing stores as the persisted key
///
/// A valid name is non-empty, relative and `/`-separated. It has no empty,
/// `.` or `..` segments, no NUL bytes, and no segment ending in
/// [`RESERVED_SUFFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceName(String);

impl ResourceName {
    /// Parse and validate a resource name
    ///
    /// # Examples
    ///
    /// ```
    /// use keepsake_core::types::ResourceName;
    ///
    /// let name = ResourceName::new("files/count.txt").unwrap();
    /// assert_eq!(name.mount_prefix(), "files");
    /// assert!(ResourceName::new("../etc/passwd").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate(&name)?;
        Ok(ResourceName(name))
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First path segment, used to route the resource to a mount
    ///
    /// # Examples
    ///
    /// ```
    /// use keepsake_core::types::ResourceName;
    ///
    /// assert_eq!(ResourceName::new("count.txt").unwrap().mount_prefix(), "count.txt");
    /// assert_eq!(ResourceName::new("a/b/c").unwrap().mount_prefix(), "a");
    /// ```
    pub fn mount_prefix(&self) -> &str {
        self.segments().next().unwrap_or(&self.0)
    }

    /// Iterate over the `/`-separated segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Check whether this name lives under `prefix`
    ///
    /// `prefix` is matched on segment boundaries, so `files` covers
    /// `files/count.txt` but not `filesystem.txt`.
    pub fn is_under(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return true;
        }
        self.0 == prefix
            || (self.0.starts_with(prefix) && self.0.as_bytes().get(prefix.len()) == Some(&b'/'))
    }
}

fn validate(name: &str) -> Result<()> {
    let invalid = |reason: &'static str| Error::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.contains('\0') {
        return Err(invalid("name contains a NUL byte"));
    }
    if name.starts_with('/') || name.contains('\\') {
        return Err(invalid("name must be a relative, '/'-separated path"));
    }
    for segment in name.split('/') {
        match segment {
            "" => return Err(invalid("name has an empty segment")),
            "." | ".." => return Err(invalid("name has a relative segment")),
            s if s.ends_with(RESERVED_SUFFIX) => {
                return Err(invalid("name uses the reserved temp-file suffix"))
            }
            _ => {}
        }
    }
    Ok(())
}

impl std::fmt::Display for ResourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResourceName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        ResourceName::new(value)
    }
}

impl TryFrom<&str> for ResourceName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        ResourceName::new(value)
    }
}

impl From<ResourceName> for String {
    fn from(value: ResourceName) -> Self {
        value.0
    }
}

/// Direction of a durable sync
///
/// Mirrors the two halves of a write-back cache: pushing buffered writes out
/// to the backing store, or repopulating the cache from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncDirection {
    /// Cache → backing store
    Persist,
    /// Backing store → cache (initial sync after mount)
    Load,
}

impl std::fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncDirection::Persist => f.write_str("persist"),
            SyncDirection::Load => f.write_str("load"),
        }
    }
}
