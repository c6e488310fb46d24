//! GraphKey core types.
//!
//! Everything the key codec consumes from the outside world:
//!
//! - [`SnippetRegistry`]: the schema lookup (child count, payload fields, name)
//! - [`ShaderCodeDictionary`]: the stock registry with the built-in snippets
//! - [`KeyBuilderSettings`]: builder configuration

pub mod builtin;
pub mod dictionary;
pub mod errors;
pub mod registry;
pub mod settings;

pub use builtin::BuiltInSnippetId;
pub use dictionary::{MAX_PAYLOAD_SIZE, ShaderCodeDictionary};
pub use errors::RegistryError;
pub use registry::{
    MAX_SNIPPET_ID, PayloadField, PayloadType, SnippetEntry, SnippetId, SnippetRegistry,
};
pub use settings::{KeyBuilderSettings, MAX_BLOCK_DEPTH};
