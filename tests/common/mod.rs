//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use graphkey::{PayloadField, ShaderCodeDictionary, SnippetId};

/// Dictionary extended with a few user-defined snippets.
pub struct Fixture {
    pub dict: ShaderCodeDictionary,
    /// No children, one 3-byte `color` field.
    pub leaf: SnippetId,
    /// One child, no payload.
    pub parent: SnippetId,
    /// Two children, one 1-byte `op` field.
    pub pair: SnippetId,
    /// No children, 253 payload bytes: a 255-byte block.
    pub max_leaf: SnippetId,
    /// No children, 252 payload bytes: a 254-byte block.
    pub big_leaf: SnippetId,
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fixture() -> Fixture {
    init_logger();

    let mut dict = ShaderCodeDictionary::new();
    let leaf = dict
        .add_user_defined_snippet("Leaf", 0, vec![PayloadField::bytes("color", 3)])
        .unwrap();
    let parent = dict.add_user_defined_snippet("Parent", 1, Vec::new()).unwrap();
    let pair = dict
        .add_user_defined_snippet("Pair", 2, vec![PayloadField::bytes("op", 1)])
        .unwrap();
    let max_leaf = dict
        .add_user_defined_snippet("MaxLeaf", 0, vec![PayloadField::bytes("data", 253)])
        .unwrap();
    let big_leaf = dict
        .add_user_defined_snippet("BigLeaf", 0, vec![PayloadField::bytes("data", 252)])
        .unwrap();

    Fixture {
        dict,
        leaf,
        parent,
        pair,
        max_leaf,
        big_leaf,
    }
}
