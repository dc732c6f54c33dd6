// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Session-scoped preview references.
//!
//! Compressed uploads are parked in a [`PreviewStore`] and addressed through
//! `mem:` URLs. A reference stays resolvable until it is revoked or the
//! store is dropped; nothing here survives the session.

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

use super::compress::CompressedImage;

/// Displayable reference to a stored preview, rendered as `mem:<uuid>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PreviewUrl(Uuid);

impl PreviewUrl {
    /// Parse a reference previously produced by [`PreviewStore::insert`].
    ///
    /// Returns `None` for anything that is not a `mem:` URL with a UUID
    /// path, including URLs from other schemes.
    pub fn parse(input: &str) -> Option<Self> {
        let parsed = url::Url::parse(input).ok()?;
        if parsed.scheme() != "mem" {
            return None;
        }
        Uuid::parse_str(parsed.path()).ok().map(Self)
    }
}

impl fmt::Display for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mem:{}", self.0)
    }
}

impl From<PreviewUrl> for String {
    fn from(url: PreviewUrl) -> Self {
        url.to_string()
    }
}

/// In-memory registry of compressed previews for one session.
#[derive(Default)]
pub struct PreviewStore {
    entries: HashMap<Uuid, CompressedImage>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a compressed image and hand out its reference.
    pub fn insert(&mut self, image: CompressedImage) -> PreviewUrl {
        let key = Uuid::new_v4();
        self.entries.insert(key, image);
        PreviewUrl(key)
    }

    /// Resolve a reference to the stored image, if it is still live.
    pub fn resolve(&self, url: &PreviewUrl) -> Option<&CompressedImage> {
        self.entries.get(&url.0)
    }

    /// Drop a stored preview. Returns whether the reference was live.
    pub fn revoke(&mut self, url: &PreviewUrl) -> bool {
        self.entries.remove(&url.0).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{PreviewStore, PreviewUrl};
    use crate::ingest::compress::CompressedImage;

    fn image() -> CompressedImage {
        CompressedImage {
            bytes: vec![0xff, 0xd8, 0xff],
            width: 2,
            height: 2,
            digest: "00".repeat(32),
        }
    }

    #[test]
    fn insert_then_resolve_round_trips() {
        let mut store = PreviewStore::new();

        let url = store.insert(image());

        let resolved = store.resolve(&url).expect("reference is live");
        assert_eq!(resolved.width, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn revoke_invalidates_the_reference() {
        let mut store = PreviewStore::new();
        let url = store.insert(image());

        assert!(store.revoke(&url));
        assert!(store.resolve(&url).is_none());
        assert!(!store.revoke(&url), "second revoke is a no-op");
    }

    #[test]
    fn display_and_parse_round_trip() {
        let mut store = PreviewStore::new();
        let url = store.insert(image());

        let rendered = url.to_string();

        assert!(rendered.starts_with("mem:"));
        assert_eq!(PreviewUrl::parse(&rendered), Some(url));
    }

    #[test]
    fn parse_rejects_foreign_schemes_and_garbage() {
        assert!(PreviewUrl::parse("https://example.com/a.jpg").is_none());
        assert!(PreviewUrl::parse("mem:not-a-uuid").is_none());
        assert!(PreviewUrl::parse("not a url").is_none());
    }
}
