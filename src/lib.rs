//! GraphKey
//!
//! Compact binary keys for shader graphs. A graph of shader snippets is
//! flattened into a byte stream that can be compared for exact equality,
//! stored as a cache key, and decoded back into a linked description for
//! code generation.
//!
//! ```rust
//! use graphkey::prelude::*;
//!
//! let dict = ShaderCodeDictionary::new();
//! let mut builder = KeyBuilder::new(&dict);
//!
//! builder.begin_block(BuiltInSnippetId::BlendShader.id());
//! builder.begin_block(BuiltInSnippetId::SolidColorShader.id());
//! builder.end_block();
//! builder.begin_block(BuiltInSnippetId::SolidColorShader.id());
//! builder.end_block();
//! builder.add_byte(3);
//! builder.end_block();
//!
//! let key = builder.lock_as_key();
//! let mut info = ShaderGraphInfo::new();
//! key.to_shader_graph(&dict, &mut info).unwrap();
//!
//! assert_eq!(info.len(), 3);
//! assert!(info.writes_color);
//! ```

pub use graphkey_codec::{
    DecodeError, EncodedKey, ERROR_KEY_BYTES, KeyBuilder, KeyCache, KeyError, KeyId,
    MAX_BLOCK_SIZE, ShaderGraphInfo, ShaderGraphNode,
};
pub use graphkey_core::{
    BuiltInSnippetId, KeyBuilderSettings, MAX_BLOCK_DEPTH, PayloadField, PayloadType,
    RegistryError, ShaderCodeDictionary, SnippetEntry, SnippetId, SnippetRegistry,
};

pub mod prelude {
    pub use crate::{
        BuiltInSnippetId, EncodedKey, KeyBuilder, KeyBuilderSettings, KeyCache, PayloadField,
        ShaderCodeDictionary, ShaderGraphInfo, SnippetRegistry,
    };
}
