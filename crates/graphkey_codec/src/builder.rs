//! Key Builder
//!
//! Assembles a block stream one `begin_block` / `add_bytes` / `end_block` at
//! a time and finalizes it into an [`EncodedKey`].
//!
//! # Validity
//!
//! Structural mistakes (unknown snippet id, unbalanced blocks, oversized
//! blocks and, with strict schema checking, payload/schema mismatches) do
//! not surface as errors at the call site. Instead the builder switches to
//! a sticky invalid state, drops everything built so far and ignores every
//! further structural call. Locking an invalid builder yields the canonical
//! error key ([`ERROR_KEY_BYTES`]), so graph-construction code can be written
//! without per-call checks and still hand a recognizable marker downstream.
//! The reason is kept until [`KeyBuilder::reset`].
//!
//! # Locking
//!
//! [`KeyBuilder::lock_as_key`] returns a key that borrows the builder's
//! buffer. The builder cannot be touched again until that key is dropped:
//!
//! ```rust,compile_fail
//! use graphkey_codec::KeyBuilder;
//! use graphkey_core::ShaderCodeDictionary;
//!
//! let dict = ShaderCodeDictionary::new();
//! let mut builder = KeyBuilder::new(&dict);
//! let key = builder.lock_as_key();
//! builder.reset();
//! drop(key);
//! ```

use std::fmt;

use graphkey_core::{
    KeyBuilderSettings, MAX_BLOCK_DEPTH, MAX_SNIPPET_ID, PayloadField, SnippetId, SnippetRegistry,
};
use smallvec::SmallVec;

use crate::errors::KeyError;
use crate::key::{
    BLOCK_HEADER_SIZE, BLOCK_SIZE_OFFSET, ERROR_KEY_BYTES, EncodedKey, MAX_BLOCK_SIZE,
};

/// An open block.
#[derive(Debug, Clone, Copy)]
struct StackFrame<'r> {
    snippet_id: SnippetId,
    header_offset: usize,
    payload: &'r [PayloadField],
    cur_payload_field: usize,
    num_children: usize,
    children_begun: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BuildStatus {
    Valid,
    Invalid(KeyError),
}

/// Reusable block stream assembler.
///
/// ```rust
/// use graphkey_codec::KeyBuilder;
/// use graphkey_core::{BuiltInSnippetId, ShaderCodeDictionary};
///
/// let dict = ShaderCodeDictionary::new();
/// let mut builder = KeyBuilder::new(&dict);
///
/// builder.begin_block(BuiltInSnippetId::LinearGradientShader.id());
/// builder.add_byte(1);
/// builder.end_block();
///
/// let key = builder.lock_as_key();
/// assert_eq!(key.as_bytes(), &[3, 3, 1]);
/// ```
pub struct KeyBuilder<'r> {
    registry: &'r dyn SnippetRegistry,
    settings: KeyBuilderSettings,
    data: Vec<u8>,
    stack: SmallVec<[StackFrame<'r>; 8]>,
    status: BuildStatus,
}

impl<'r> KeyBuilder<'r> {
    #[must_use]
    pub fn new(registry: &'r dyn SnippetRegistry) -> Self {
        Self::with_settings(registry, KeyBuilderSettings::default())
    }

    /// `settings.max_block_depth` is capped at [`MAX_BLOCK_DEPTH`], the
    /// deepest nesting a key can be decoded with.
    #[must_use]
    pub fn with_settings(
        registry: &'r dyn SnippetRegistry,
        mut settings: KeyBuilderSettings,
    ) -> Self {
        settings.max_block_depth = settings.max_block_depth.min(MAX_BLOCK_DEPTH);
        Self {
            registry,
            settings,
            data: Vec::new(),
            stack: SmallVec::new(),
            status: BuildStatus::Valid,
        }
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &'r dyn SnippetRegistry {
        self.registry
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &KeyBuilderSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == BuildStatus::Valid
    }

    /// Why the builder went invalid, if it did.
    #[must_use]
    pub fn invalid_reason(&self) -> Option<&KeyError> {
        match &self.status {
            BuildStatus::Valid => None,
            BuildStatus::Invalid(reason) => Some(reason),
        }
    }

    /// Bytes written so far.
    #[inline]
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        self.data.len()
    }

    /// Number of currently open blocks.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Open a block for `snippet_id`.
    ///
    /// Writes the header with a zero size placeholder; [`end_block`] patches
    /// in the real size.
    ///
    /// [`end_block`]: Self::end_block
    pub fn begin_block(&mut self, snippet_id: SnippetId) {
        if !self.is_valid() {
            return;
        }

        let registry = self.registry;
        // Ids are stored in a single header byte.
        let max = registry.max_snippet_id().min(MAX_SNIPPET_ID);
        let Some(entry) = (snippet_id <= max)
            .then(|| registry.entry(snippet_id))
            .flatten()
        else {
            self.invalidate(KeyError::UnknownSnippet {
                id: snippet_id,
                max,
            });
            return;
        };

        if self.stack.len() >= self.settings.max_block_depth {
            self.invalidate(KeyError::NestingTooDeep {
                depth: self.settings.max_block_depth,
            });
            return;
        }

        if self.settings.strict_schema_checking
            && let Some(parent) = self.stack.last()
        {
            // Children come before any of the parent's own data.
            if parent.cur_payload_field != 0 {
                let parent = parent.snippet_id;
                self.invalidate(KeyError::ChildAfterPayload { parent });
                return;
            }
            if parent.children_begun >= parent.num_children {
                let (snippet, expected) = (parent.snippet_id, parent.num_children);
                self.invalidate(KeyError::ChildCountMismatch {
                    snippet,
                    expected,
                    got: expected + 1,
                });
                return;
            }
        }

        if let Some(parent) = self.stack.last_mut() {
            parent.children_begun += 1;
        }

        self.stack.push(StackFrame {
            snippet_id,
            header_offset: self.data.len(),
            payload: &entry.payload,
            cur_payload_field: 0,
            num_children: entry.num_children,
            children_begun: 0,
        });

        self.data.reserve(BLOCK_HEADER_SIZE);
        self.data.push(snippet_id as u8);
        self.data.push(0);
    }

    /// Close the innermost open block and patch its size byte.
    pub fn end_block(&mut self) {
        if !self.is_valid() {
            return;
        }

        let Some(frame) = self.stack.last().copied() else {
            self.invalidate(KeyError::MissingBeginBlock);
            return;
        };

        if self.settings.strict_schema_checking {
            if frame.cur_payload_field != frame.payload.len() {
                self.invalidate(KeyError::IncompletePayload {
                    snippet: frame.snippet_id,
                    supplied: frame.cur_payload_field,
                    expected: frame.payload.len(),
                });
                return;
            }
            if frame.children_begun != frame.num_children {
                self.invalidate(KeyError::ChildCountMismatch {
                    snippet: frame.snippet_id,
                    expected: frame.num_children,
                    got: frame.children_begun,
                });
                return;
            }
        }

        debug_assert_eq!(self.data[frame.header_offset], frame.snippet_id as u8);
        debug_assert_eq!(self.data[frame.header_offset + BLOCK_SIZE_OFFSET], 0);

        let block_size = self.data.len() - frame.header_offset;
        if block_size > MAX_BLOCK_SIZE {
            self.invalidate(KeyError::BlockTooLarge { size: block_size });
            return;
        }

        self.data[frame.header_offset + BLOCK_SIZE_OFFSET] = block_size as u8;
        self.stack.pop();
    }

    /// Append one whole payload field to the innermost open block.
    ///
    /// Splitting a field across several calls is not supported.
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        if !self.is_valid() {
            return;
        }

        let strict = self.settings.strict_schema_checking;
        let Some(frame) = self.stack.last_mut() else {
            self.invalidate(KeyError::MissingBeginBlock);
            return;
        };

        if strict {
            let expected = frame
                .payload
                .get(frame.cur_payload_field)
                .map(PayloadField::size_in_bytes);
            if expected != Some(bytes.len()) {
                let snippet = frame.snippet_id;
                self.invalidate(KeyError::UnexpectedPayload {
                    snippet,
                    expected,
                    got: bytes.len(),
                });
                return;
            }
        }
        frame.cur_payload_field += 1;

        self.data.extend_from_slice(bytes);
    }

    #[inline]
    pub fn add_byte(&mut self, byte: u8) {
        self.add_bytes(&[byte]);
    }

    /// Invalidate the builder explicitly. Calling it again has no effect.
    pub fn make_invalid(&mut self) {
        if self.is_valid() {
            self.invalidate(KeyError::Forced);
        }
    }

    /// Finalize everything written so far into a key.
    ///
    /// Open blocks invalidate the builder first. An invalid builder locks to
    /// the error key. The buffer is not cleared; call [`reset`] once the key
    /// has been dropped to start the next key.
    ///
    /// [`reset`]: Self::reset
    pub fn lock_as_key(&mut self) -> EncodedKey<'_> {
        if self.is_valid() && !self.stack.is_empty() {
            self.invalidate(KeyError::MismatchedBlocks {
                open: self.stack.len(),
            });
        }

        if !self.is_valid() {
            self.data.clear();
            self.data.extend_from_slice(&ERROR_KEY_BYTES);
        }
        self.stack.clear();

        log::debug!(
            "Locked key ({}B{})",
            self.data.len(),
            if self.is_valid() { "" } else { ", error" }
        );

        EncodedKey::from_builder(&self.data)
    }

    /// Return to the empty state: no bytes, no open blocks, valid.
    pub fn reset(&mut self) {
        self.data.clear();
        self.stack.clear();
        self.status = BuildStatus::Valid;
    }

    fn invalidate(&mut self, reason: KeyError) {
        log::warn!("Invalidating key builder: {reason}");
        self.stack.clear();
        self.data.clear();
        self.status = BuildStatus::Invalid(reason);
    }
}

impl fmt::Debug for KeyBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBuilder")
            .field("settings", &self.settings)
            .field("data", &self.data)
            .field("stack", &self.stack)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphkey_core::{BuiltInSnippetId, ShaderCodeDictionary};

    fn dict() -> ShaderCodeDictionary {
        ShaderCodeDictionary::new()
    }

    const LINEAR: SnippetId = BuiltInSnippetId::LinearGradientShader.id();
    const LOCAL: SnippetId = BuiltInSnippetId::LocalMatrixShader.id();
    const BLEND: SnippetId = BuiltInSnippetId::BlendShader.id();
    const SOLID: SnippetId = BuiltInSnippetId::SolidColorShader.id();

    #[test]
    fn test_size_patched_on_end() {
        let dict = dict();
        let mut b = KeyBuilder::new(&dict);
        b.begin_block(LOCAL);
        assert_eq!(b.depth(), 1);
        b.begin_block(LINEAR);
        b.add_byte(4);
        b.end_block();
        b.end_block();

        assert_eq!(b.depth(), 0);
        assert!(b.is_valid());
        assert_eq!(b.lock_as_key().as_bytes(), &[LOCAL as u8, 5, LINEAR as u8, 3, 4]);
    }

    #[test]
    fn test_unknown_snippet_is_sticky() {
        let dict = dict();
        let mut b = KeyBuilder::new(&dict);
        b.begin_block(SOLID);
        b.end_block();
        b.begin_block(999);

        assert!(!b.is_valid());
        assert_eq!(
            b.invalid_reason(),
            Some(&KeyError::UnknownSnippet {
                id: 999,
                max: dict.max_snippet_id()
            })
        );
        assert_eq!(b.size_in_bytes(), 0);

        b.begin_block(SOLID);
        b.end_block();
        assert_eq!(b.size_in_bytes(), 0);
        assert!(b.lock_as_key().is_error_key());
    }

    #[test]
    fn test_end_without_begin() {
        let dict = dict();
        let mut b = KeyBuilder::new(&dict);
        b.end_block();
        assert_eq!(b.invalid_reason(), Some(&KeyError::MissingBeginBlock));
    }

    #[test]
    fn test_add_bytes_without_block() {
        let dict = dict();
        let mut b = KeyBuilder::new(&dict);
        b.add_byte(1);
        assert_eq!(b.invalid_reason(), Some(&KeyError::MissingBeginBlock));
    }

    #[test]
    fn test_lock_with_open_blocks() {
        let dict = dict();
        let mut b = KeyBuilder::new(&dict);
        b.begin_block(LOCAL);
        b.begin_block(SOLID);
        b.end_block();

        assert!(b.lock_as_key().is_error_key());
        assert_eq!(b.invalid_reason(), Some(&KeyError::MismatchedBlocks { open: 1 }));
        assert_eq!(b.depth(), 0);
    }

    #[test]
    fn test_strict_rejects_wrong_field_width() {
        let dict = dict();
        let mut b = KeyBuilder::new(&dict);
        b.begin_block(LINEAR);
        b.add_bytes(&[1, 2]);

        assert_eq!(
            b.invalid_reason(),
            Some(&KeyError::UnexpectedPayload {
                snippet: LINEAR,
                expected: Some(1),
                got: 2
            })
        );
    }

    #[test]
    fn test_strict_rejects_extra_field() {
        let dict = dict();
        let mut b = KeyBuilder::new(&dict);
        b.begin_block(SOLID);
        b.add_byte(1);

        assert_eq!(
            b.invalid_reason(),
            Some(&KeyError::UnexpectedPayload {
                snippet: SOLID,
                expected: None,
                got: 1
            })
        );
    }

    #[test]
    fn test_strict_rejects_incomplete_payload() {
        let dict = dict();
        let mut b = KeyBuilder::new(&dict);
        b.begin_block(LINEAR);
        b.end_block();

        assert_eq!(
            b.invalid_reason(),
            Some(&KeyError::IncompletePayload {
                snippet: LINEAR,
                supplied: 0,
                expected: 1
            })
        );
    }

    #[test]
    fn test_strict_rejects_child_after_payload() {
        let dict = dict();
        let mut b = KeyBuilder::new(&dict);
        b.begin_block(BLEND);
        b.begin_block(SOLID);
        b.end_block();
        b.add_byte(3);
        b.begin_block(SOLID);

        assert_eq!(
            b.invalid_reason(),
            Some(&KeyError::ChildAfterPayload { parent: BLEND })
        );
    }

    #[test]
    fn test_strict_checks_child_count() {
        let dict = dict();
        let mut b = KeyBuilder::new(&dict);
        b.begin_block(BLEND);
        b.begin_block(SOLID);
        b.end_block();
        b.add_byte(3);
        b.end_block();

        assert_eq!(
            b.invalid_reason(),
            Some(&KeyError::ChildCountMismatch {
                snippet: BLEND,
                expected: 2,
                got: 1
            })
        );

        b.reset();
        b.begin_block(LOCAL);
        b.begin_block(SOLID);
        b.end_block();
        b.begin_block(SOLID);
        assert_eq!(
            b.invalid_reason(),
            Some(&KeyError::ChildCountMismatch {
                snippet: LOCAL,
                expected: 1,
                got: 2
            })
        );
    }

    #[test]
    fn test_unchecked_trusts_caller() {
        let dict = dict();
        let mut b = KeyBuilder::with_settings(&dict, KeyBuilderSettings::unchecked());
        b.begin_block(SOLID);
        b.add_bytes(&[1, 2, 3]);
        b.end_block();

        assert!(b.is_valid());
        assert_eq!(b.lock_as_key().as_bytes(), &[SOLID as u8, 5, 1, 2, 3]);
    }

    #[test]
    fn test_nesting_limit() {
        let dict = dict();
        let settings = KeyBuilderSettings {
            max_block_depth: 2,
            ..KeyBuilderSettings::default()
        };
        let mut b = KeyBuilder::with_settings(&dict, settings);
        b.begin_block(LOCAL);
        b.begin_block(LOCAL);
        assert!(b.is_valid());
        b.begin_block(SOLID);
        assert_eq!(b.invalid_reason(), Some(&KeyError::NestingTooDeep { depth: 2 }));
    }

    /// Registry that hands out entries for ids past what a header byte holds.
    struct Wide(Vec<graphkey_core::SnippetEntry>);

    impl SnippetRegistry for Wide {
        fn max_snippet_id(&self) -> SnippetId {
            self.0.len() as SnippetId - 1
        }

        fn entry(&self, id: SnippetId) -> Option<&graphkey_core::SnippetEntry> {
            self.0.get(id as usize)
        }
    }

    #[test]
    fn test_ids_past_header_byte_rejected() {
        let wide = Wide(
            (0..300)
                .map(|i| graphkey_core::SnippetEntry::new(format!("Leaf{i}"), 0, Vec::new()))
                .collect(),
        );
        let mut b = KeyBuilder::new(&wide);
        b.begin_block(255);
        b.end_block();
        assert!(b.is_valid());
        assert_eq!(b.lock_as_key().as_bytes(), &[255, 2]);

        b.reset();
        b.begin_block(256);
        b.end_block();
        assert_eq!(
            b.invalid_reason(),
            Some(&KeyError::UnknownSnippet {
                id: 256,
                max: MAX_SNIPPET_ID
            })
        );
        assert_eq!(b.size_in_bytes(), 0);
    }

    #[test]
    fn test_depth_setting_capped_at_decode_limit() {
        let dict = dict();
        let settings = KeyBuilderSettings {
            max_block_depth: MAX_BLOCK_DEPTH + 8,
            ..KeyBuilderSettings::default()
        };
        let mut b = KeyBuilder::with_settings(&dict, settings);
        assert_eq!(b.settings().max_block_depth, MAX_BLOCK_DEPTH);

        for _ in 0..MAX_BLOCK_DEPTH {
            b.begin_block(LOCAL);
        }
        assert!(b.is_valid());
        b.begin_block(SOLID);
        assert_eq!(
            b.invalid_reason(),
            Some(&KeyError::NestingTooDeep {
                depth: MAX_BLOCK_DEPTH
            })
        );
    }

    #[test]
    fn test_make_invalid_then_reset() {
        let dict = dict();
        let mut b = KeyBuilder::new(&dict);
        b.begin_block(SOLID);
        b.make_invalid();
        b.make_invalid();
        assert_eq!(b.invalid_reason(), Some(&KeyError::Forced));
        assert_eq!(b.lock_as_key().as_bytes(), &ERROR_KEY_BYTES);

        b.reset();
        assert!(b.is_valid());
        assert_eq!(b.size_in_bytes(), 0);
        assert!(b.lock_as_key().is_empty());
    }

    #[test]
    fn test_lock_does_not_clear_buffer() {
        let dict = dict();
        let mut b = KeyBuilder::new(&dict);
        b.begin_block(SOLID);
        b.end_block();

        let first = b.lock_as_key().into_owned();
        let second = b.lock_as_key();
        assert!(second.is_builder_view());
        assert_eq!(first, second);
    }
}
