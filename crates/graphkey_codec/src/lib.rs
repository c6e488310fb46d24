//! GraphKey codec.
//!
//! Flattens a tree of shader snippets into a dense byte stream that doubles
//! as a cache key and as a build plan:
//!
//! - [`KeyBuilder`]: stack-disciplined assembler validated against a
//!   [`SnippetRegistry`](graphkey_core::SnippetRegistry)
//! - [`EncodedKey`]: immutable, byte-comparable result
//! - [`ShaderGraphInfo`]: the decoded, linked node list for code generation
//! - [`KeyCache`]: interns keys to dense ids
//!
//! # Block Format
//!
//! | Offset | Size | Field        |
//! |--------|------|--------------|
//! | 0      | 1    | snippet id   |
//! | 1      | 1    | block size (header included, 2..=255) |
//! | 2..    | var  | child blocks |
//! | ...    | var  | own payload  |

mod block;
pub mod builder;
pub mod cache;
mod dump;
pub mod errors;
pub mod key;
pub mod shader_info;

pub use builder::KeyBuilder;
pub use cache::{KeyCache, KeyId};
pub use errors::{DecodeError, KeyError};
pub use key::{
    BLOCK_HEADER_SIZE, BLOCK_SIZE_OFFSET, ERROR_KEY_BYTES, EncodedKey, MAX_BLOCK_SIZE,
};
pub use shader_info::{ShaderGraphInfo, ShaderGraphNode};
