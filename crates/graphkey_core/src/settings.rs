//! Key Builder Settings
//!
//! Runtime options for the key builder. Schema checking is a regular option
//! rather than a debug-only code path, so release and debug builds produce
//! the same keys for the same calls.
//!
//! ```rust,ignore
//! use graphkey::{KeyBuilder, KeyBuilderSettings};
//!
//! let settings = KeyBuilderSettings {
//!     strict_schema_checking: false,
//!     ..Default::default()
//! };
//! let mut builder = KeyBuilder::with_settings(&dict, settings);
//! ```

/// Deepest block nesting accepted by the builder and by decoding.
pub const MAX_BLOCK_DEPTH: usize = 32;

/// Global configuration for a key builder.
///
/// | Field                    | Default           |
/// |--------------------------|-------------------|
/// | `strict_schema_checking` | `true`            |
/// | `max_block_depth`        | [`MAX_BLOCK_DEPTH`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBuilderSettings {
    /// Check every payload write against the registry schema, require each
    /// block's payload to be complete when it closes and forbid opening a
    /// child after the parent has started its payload.
    pub strict_schema_checking: bool,
    /// Maximum number of simultaneously open blocks. Capped at
    /// [`MAX_BLOCK_DEPTH`] by the builder.
    pub max_block_depth: usize,
}

impl Default for KeyBuilderSettings {
    fn default() -> Self {
        Self {
            strict_schema_checking: true,
            max_block_depth: MAX_BLOCK_DEPTH,
        }
    }
}

impl KeyBuilderSettings {
    /// Settings that trust the caller to follow the schema.
    #[must_use]
    pub fn unchecked() -> Self {
        Self {
            strict_schema_checking: false,
            ..Self::default()
        }
    }
}
