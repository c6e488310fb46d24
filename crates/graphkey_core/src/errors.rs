//! Error Types
//!
//! # Overview
//!
//! [`RegistryError`] covers the ways registering a user-defined snippet in a
//! [`ShaderCodeDictionary`](crate::ShaderCodeDictionary) can fail.
//!
//! # Usage
//!
//! Registration returns [`Result<T>`], an alias for
//! `std::result::Result<T, RegistryError>`.
//!
//! ```rust,ignore
//! use graphkey_core::{PayloadField, ShaderCodeDictionary};
//!
//! let id = dict.add_user_defined_snippet("Tint", 1, vec![PayloadField::bytes("rgb", 3)])?;
//! ```

use thiserror::Error;

use crate::registry::SnippetId;

/// Failure raised while populating a snippet registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    // ========================================================================
    // Id Space
    // ========================================================================
    /// Every id that fits in a block header is taken.
    #[error("Snippet id space exhausted (max id {max})")]
    TooManySnippets { max: SnippetId },

    /// A snippet with this name is already registered.
    #[error("Snippet name already registered: {0}")]
    DuplicateName(String),

    // ========================================================================
    // Schema
    // ========================================================================
    /// The payload alone would not fit in a single block.
    #[error("Payload of snippet '{name}' is too large: {bytes} bytes")]
    PayloadTooLarge { name: String, bytes: usize },
}

/// Alias for `Result<T, RegistryError>`.
pub type Result<T> = std::result::Result<T, RegistryError>;
