//! Encoded Keys
//!
//! An [`EncodedKey`] is an immutable view over a finished block stream.
//! Keys are compared byte-for-byte, which makes them cheap, exact cache keys
//! for compiled shaders.
//!
//! A key either borrows the buffer of the [`KeyBuilder`] that produced it
//! (the builder stays locked for as long as the key is alive) or owns its
//! bytes outright, e.g. after [`EncodedKey::into_owned`] or when it was
//! reconstructed from storage with [`EncodedKey::from_bytes`].
//!
//! [`KeyBuilder`]: crate::KeyBuilder

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use graphkey_core::{BuiltInSnippetId, SnippetRegistry};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use xxhash_rust::xxh3::xxh3_64;

use crate::block::{SchemaValidator, walk_blocks};
use crate::errors::DecodeError;
use crate::shader_info::ShaderGraphInfo;

/// Snippet id byte followed by block size byte.
pub const BLOCK_HEADER_SIZE: usize = 2;
/// Offset of the size byte within a block header.
pub const BLOCK_SIZE_OFFSET: usize = 1;
/// A block's size is stored in one byte.
pub const MAX_BLOCK_SIZE: usize = u8::MAX as usize;

/// The canonical contents of a key produced by an invalid builder.
pub const ERROR_KEY_BYTES: [u8; BLOCK_HEADER_SIZE] =
    [BuiltInSnippetId::Error as u8, BLOCK_HEADER_SIZE as u8];

#[derive(Clone)]
pub struct EncodedKey<'a> {
    data: Cow<'a, [u8]>,
    builder_view: bool,
}

impl<'a> EncodedKey<'a> {
    /// View over a builder's buffer; only [`KeyBuilder::lock_as_key`] creates these.
    ///
    /// [`KeyBuilder::lock_as_key`]: crate::KeyBuilder::lock_as_key
    pub(crate) fn from_builder(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
            builder_view: true,
        }
    }

    /// Borrow raw key bytes that did not come from a builder.
    #[must_use]
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
            builder_view: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte at `offset`.
    ///
    /// # Panics
    /// If `offset` is past the end of the key.
    #[inline]
    #[must_use]
    pub fn byte(&self, offset: usize) -> u8 {
        self.data[offset]
    }

    /// `true` if this key is exactly the error marker block.
    #[must_use]
    pub fn is_error_key(&self) -> bool {
        *self.data == ERROR_KEY_BYTES
    }

    /// `true` while this key borrows the buffer of a locked builder.
    #[inline]
    #[must_use]
    pub fn is_builder_view(&self) -> bool {
        self.builder_view
    }

    /// Detach from the producing builder by copying the bytes if needed.
    #[must_use]
    pub fn into_owned(self) -> EncodedKey<'static> {
        EncodedKey {
            data: Cow::Owned(self.data.into_owned()),
            builder_view: false,
        }
    }

    /// Stable 64-bit digest of the key bytes, suitable for persistence.
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        xxh3_64(&self.data)
    }

    /// Decode every top-level block into `info`.
    ///
    /// Nodes are appended in storage order (parent before children) and
    /// linked to their parents. `info.writes_color` is set unless the whole
    /// key is one [`BuiltInSnippetId::DepthStencilOnlyDraw`] block.
    ///
    /// A malformed key leaves `info` exactly as it was.
    pub fn to_shader_graph(
        &self,
        registry: &dyn SnippetRegistry,
        info: &mut ShaderGraphInfo,
    ) -> Result<(), DecodeError> {
        info.append_key(&self.data, registry)
    }

    /// Check the whole stream against `registry`, including each block's
    /// payload length. Returns the number of blocks.
    pub fn validate(&self, registry: &dyn SnippetRegistry) -> Result<usize, DecodeError> {
        let mut validator = SchemaValidator::default();
        walk_blocks(&self.data, registry, &mut validator)?;
        Ok(validator.blocks)
    }
}

impl EncodedKey<'static> {
    /// Take ownership of raw key bytes, e.g. loaded from a disk cache.
    #[must_use]
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Cow::Owned(data.into()),
            builder_view: false,
        }
    }

    /// The key every invalid builder locks to.
    #[must_use]
    pub fn error_key() -> Self {
        Self::from_slice(&ERROR_KEY_BYTES)
    }
}

impl PartialEq for EncodedKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for EncodedKey<'_> {}

impl Hash for EncodedKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

impl fmt::Debug for EncodedKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedKey")
            .field("bytes", &&*self.data)
            .field("builder_view", &self.builder_view)
            .finish()
    }
}

impl Serialize for EncodedKey<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.data)
    }
}

impl<'de> Deserialize<'de> for EncodedKey<'static> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<u8>::deserialize(deserializer).map(Self::from_bytes)
    }
}
