//! Key Cache
//!
//! Interns finished keys into dense [`KeyId`] handles, so that everything
//! derived from a key (compiled shaders, pipelines) can be stored in flat
//! arrays indexed by id.
//!
//! Lookups go through a 64-bit xxh3 digest of the key bytes; colliding keys
//! are disambiguated by a byte comparison.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::key::EncodedKey;

/// Handle to a key stored in a [`KeyCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(pub(crate) u32);

impl KeyId {
    /// Raw index into the cache storage.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default)]
pub struct KeyCache {
    keys: Vec<EncodedKey<'static>>,
    lookup: FxHashMap<u64, SmallVec<[KeyId; 1]>>,
}

impl KeyCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn find(&self, key: &EncodedKey<'_>) -> Option<KeyId> {
        self.find_hashed(key.content_hash(), key)
    }

    /// Return the id of `key`, copying it into the cache on first sight.
    pub fn find_or_insert(&mut self, key: &EncodedKey<'_>) -> KeyId {
        let hash = key.content_hash();
        if let Some(id) = self.find_hashed(hash, key) {
            return id;
        }

        let id = KeyId(self.keys.len() as u32);
        self.keys.push(key.clone().into_owned());
        self.lookup.entry(hash).or_default().push(id);

        log::debug!(
            "KeyCache: new key {} ({}B{})",
            id.0,
            key.size_in_bytes(),
            if key.is_error_key() { ", error" } else { "" }
        );
        id
    }

    #[must_use]
    pub fn get(&self, id: KeyId) -> Option<&EncodedKey<'static>> {
        self.keys.get(id.index())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeyId, &EncodedKey<'static>)> {
        self.keys
            .iter()
            .enumerate()
            .map(|(i, k)| (KeyId(i as u32), k))
    }

    fn find_hashed(&self, hash: u64, key: &EncodedKey<'_>) -> Option<KeyId> {
        self.lookup.get(&hash).and_then(|ids| {
            ids.iter()
                .copied()
                .find(|id| self.keys[id.index()].as_bytes() == key.as_bytes())
        })
    }
}
