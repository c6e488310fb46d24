//! Error Types
//!
//! This module defines the error types used by the key codec.
//!
//! # Overview
//!
//! Two families:
//!
//! - [`KeyError`] records *why* a builder became invalid. It never crosses
//!   the `begin_block` / `add_bytes` / `end_block` boundary; callers observe
//!   it through [`KeyBuilder::invalid_reason`] or, implicitly, through the
//!   error marker carried by the locked key.
//! - [`DecodeError`] reports a malformed byte stream found while walking a
//!   key (only possible for keys reconstructed from outside bytes).
//!
//! # Usage
//!
//! ```rust,ignore
//! use graphkey::{DecodeError, EncodedKey};
//!
//! let key = EncodedKey::from_bytes(bytes_from_disk);
//! match key.validate(&dict) {
//!     Ok(blocks) => log::debug!("restored key with {blocks} blocks"),
//!     Err(DecodeError::UnknownSnippet { id, .. }) => log::warn!("stale snippet id {id}"),
//!     Err(e) => return Err(e),
//! }
//! ```
//!
//! [`KeyBuilder::invalid_reason`]: crate::KeyBuilder::invalid_reason

use graphkey_core::SnippetId;
use thiserror::Error;

/// Reason a [`KeyBuilder`](crate::KeyBuilder) switched to its invalid state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    // ========================================================================
    // Block Structure
    // ========================================================================
    /// `begin_block` named an id the registry does not resolve, or one that
    /// does not fit in a header byte.
    #[error("Unknown code snippet id {id} (max {max})")]
    UnknownSnippet { id: SnippetId, max: SnippetId },

    /// `end_block` or `add_bytes` was called with no block open.
    #[error("Missing call to begin_block")]
    MissingBeginBlock,

    /// Blocks were still open when the key was locked.
    #[error("Mismatched begin_block/end_block ({open} still open)")]
    MismatchedBlocks { open: usize },

    /// A closed block exceeded what its one-byte size field can hold.
    #[error("Block is too large: {size} bytes")]
    BlockTooLarge { size: usize },

    /// More blocks were open at once than the configured depth allows.
    #[error("Block nesting exceeds {depth}")]
    NestingTooDeep { depth: usize },

    // ========================================================================
    // Schema Checking
    // ========================================================================
    /// An `add_bytes` call did not match the next field of the schema.
    #[error("Snippet {snippet} expected field width {expected:?}, got {got} bytes")]
    UnexpectedPayload {
        snippet: SnippetId,
        /// `None` when every field of the schema has already been written.
        expected: Option<usize>,
        got: usize,
    },

    /// A block was closed before all of its payload fields were written.
    #[error("Snippet {snippet} closed after {supplied} of {expected} payload fields")]
    IncompletePayload {
        snippet: SnippetId,
        supplied: usize,
        expected: usize,
    },

    /// A block opened more or fewer children than its schema declares.
    #[error("Snippet {snippet} expects {expected} children, got {got}")]
    ChildCountMismatch {
        snippet: SnippetId,
        expected: usize,
        got: usize,
    },

    /// A child was opened after its parent had started writing its payload.
    #[error("Child block opened after snippet {parent} started its payload")]
    ChildAfterPayload { parent: SnippetId },

    // ========================================================================
    // Explicit
    // ========================================================================
    /// The caller invoked `make_invalid`.
    #[error("Builder was explicitly invalidated")]
    Forced,
}

/// A key's byte stream does not describe a well-formed block tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    // ========================================================================
    // Framing
    // ========================================================================
    /// Fewer than two bytes remain where a block header should start.
    #[error("Key truncated: block header at offset {offset} needs 2 bytes, {available} available")]
    Truncated { offset: usize, available: usize },

    /// The size byte is smaller than the header itself.
    #[error("Block at offset {offset} has invalid size {size}")]
    BadBlockSize { offset: usize, size: usize },

    /// The block extends past the end of its parent (or of the key).
    #[error("Block at offset {offset} ({size}B) overruns its parent ending at {end}")]
    BlockOverrun { offset: usize, size: usize, end: usize },

    /// The declared children do not fit inside the block.
    #[error("Children of block at offset {offset} overrun its {size}B extent")]
    ChildOverrun { offset: usize, size: usize },

    /// Blocks are nested deeper than any builder can produce.
    #[error("Block nesting exceeds {depth} at offset {offset}")]
    NestingTooDeep { offset: usize, depth: usize },

    // ========================================================================
    // Registry Lookup
    // ========================================================================
    /// The header names an id the registry does not resolve.
    #[error("Unknown code snippet id {id} at offset {offset}")]
    UnknownSnippet { id: SnippetId, offset: usize },

    /// The bytes left after the children differ from the schema's payload size.
    #[error("Block at offset {offset}: payload is {actual}B, schema expects {expected}B")]
    PayloadMismatch {
        offset: usize,
        expected: usize,
        actual: usize,
    },
}
