//! Shader Code Dictionary
//!
//! The stock [`SnippetRegistry`] implementation. Built-in snippets occupy
//! the reserved ids `0..=BuiltInSnippetId::LAST`; user-defined snippets are
//! appended after them in registration order.

use rustc_hash::FxHashMap;
use std::borrow::Cow;

use crate::builtin::BuiltInSnippetId;
use crate::errors::{RegistryError, Result};
use crate::registry::{MAX_SNIPPET_ID, PayloadField, SnippetEntry, SnippetId, SnippetRegistry};

/// Bytes available to a block's payload once its header is accounted for.
pub const MAX_PAYLOAD_SIZE: usize = 255 - 2;

#[derive(Debug, Clone)]
pub struct ShaderCodeDictionary {
    entries: Vec<SnippetEntry>,
    by_name: FxHashMap<Cow<'static, str>, SnippetId>,
}

impl Default for ShaderCodeDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderCodeDictionary {
    /// Create a dictionary holding only the built-in snippets.
    #[must_use]
    pub fn new() -> Self {
        let mut dict = Self {
            entries: Vec::with_capacity(BuiltInSnippetId::ALL.len()),
            by_name: FxHashMap::default(),
        };
        for id in BuiltInSnippetId::ALL {
            let entry = id.entry();
            dict.by_name.insert(entry.name.clone(), id.id());
            dict.entries.push(entry);
        }
        dict
    }

    /// Register a new snippet and return its id.
    pub fn add_user_defined_snippet(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        num_children: usize,
        payload: Vec<PayloadField>,
    ) -> Result<SnippetId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name.into_owned()));
        }

        let next = self.entries.len() as SnippetId;
        if next > MAX_SNIPPET_ID {
            return Err(RegistryError::TooManySnippets { max: MAX_SNIPPET_ID });
        }

        let entry = SnippetEntry::new(name.clone(), num_children, payload);
        let bytes = entry.payload_size();
        if bytes > MAX_PAYLOAD_SIZE {
            return Err(RegistryError::PayloadTooLarge {
                name: name.into_owned(),
                bytes,
            });
        }

        log::debug!("Registered snippet '{name}' as id {next} ({num_children} children, {bytes}B payload)");

        self.by_name.insert(name, next);
        self.entries.push(entry);
        Ok(next)
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<SnippetId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SnippetId, &SnippetEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i as SnippetId, e))
    }
}

impl SnippetRegistry for ShaderCodeDictionary {
    fn max_snippet_id(&self) -> SnippetId {
        self.entries.len().saturating_sub(1) as SnippetId
    }

    fn entry(&self, id: SnippetId) -> Option<&SnippetEntry> {
        self.entries.get(id as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let dict = ShaderCodeDictionary::new();
        assert_eq!(dict.len(), BuiltInSnippetId::ALL.len());
        assert_eq!(dict.max_snippet_id(), BuiltInSnippetId::LAST.id());
        assert_eq!(
            dict.find_by_name("BlendShader"),
            Some(BuiltInSnippetId::BlendShader.id())
        );
        assert_eq!(dict.child_count(BuiltInSnippetId::BlendShader.id()), Some(2));
    }

    #[test]
    fn test_user_defined_ids_follow_builtins() {
        let mut dict = ShaderCodeDictionary::new();
        let a = dict
            .add_user_defined_snippet("A", 0, vec![PayloadField::bytes("x", 3)])
            .unwrap();
        let b = dict.add_user_defined_snippet("B", 1, Vec::new()).unwrap();

        assert_eq!(a, BuiltInSnippetId::LAST.id() + 1);
        assert_eq!(b, a + 1);
        assert_eq!(dict.max_snippet_id(), b);
        assert_eq!(dict.display_name(a), Some("A"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut dict = ShaderCodeDictionary::new();
        let err = dict
            .add_user_defined_snippet("SolidColor", 0, Vec::new())
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("SolidColor".to_string()));
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let mut dict = ShaderCodeDictionary::new();
        assert!(dict
            .add_user_defined_snippet("Fits", 0, vec![PayloadField::bytes("d", 253)])
            .is_ok());
        assert!(matches!(
            dict.add_user_defined_snippet("Big", 0, vec![PayloadField::bytes("d", 254)]),
            Err(RegistryError::PayloadTooLarge { bytes: 254, .. })
        ));
    }

    #[test]
    fn test_id_space_exhaustion() {
        let mut dict = ShaderCodeDictionary::new();
        let mut last = 0;
        for i in dict.len()..=MAX_SNIPPET_ID as usize {
            last = dict
                .add_user_defined_snippet(format!("S{i}"), 0, Vec::new())
                .unwrap();
        }
        assert_eq!(last, MAX_SNIPPET_ID);
        assert_eq!(
            dict.add_user_defined_snippet("Overflow", 0, Vec::new()),
            Err(RegistryError::TooManySnippets { max: MAX_SNIPPET_ID })
        );
    }
}
