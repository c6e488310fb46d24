//! Shader Graph Descriptor
//!
//! [`ShaderGraphInfo`] is the decoded, linked form of a key that the code
//! generator walks to assemble shader source. Nodes are stored in the same
//! preorder as their blocks (parent first, then its children in order) and
//! reference each other by index.

use graphkey_core::{BuiltInSnippetId, SnippetEntry, SnippetId, SnippetRegistry};
use serde::Serialize;
use smallvec::SmallVec;

use crate::block::{BlockHeader, BlockVisitor, walk_blocks};
use crate::builder::KeyBuilder;
use crate::errors::DecodeError;

/// One decoded block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShaderGraphNode {
    pub snippet_id: SnippetId,
    /// Index of the parent node, `None` for top-level blocks.
    pub parent: Option<usize>,
    /// Child node indices in block order.
    pub children: SmallVec<[usize; 2]>,
    /// Encoded size of the whole block, header included.
    pub block_size: usize,
    /// The block's own payload bytes (children excluded).
    pub payload: SmallVec<[u8; 16]>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShaderGraphInfo {
    pub nodes: Vec<ShaderGraphNode>,
    /// Whether the last decoded key produces color output: `false` only
    /// for a key made of a single depth/stencil-only block.
    pub writes_color: bool,
}

impl ShaderGraphInfo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.writes_color = false;
    }

    /// Indices of the top-level nodes in key order.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| i)
    }

    #[must_use]
    pub fn node(&self, index: usize) -> Option<&ShaderGraphNode> {
        self.nodes.get(index)
    }

    /// Replay the graph into `builder`.
    ///
    /// Payloads are split along the registry's field schema, so re-encoding
    /// a decoded key reproduces the original bytes.
    pub fn encode_into(&self, builder: &mut KeyBuilder<'_>) {
        for root in self.roots() {
            self.encode_node(root, builder);
        }
    }

    fn encode_node(&self, index: usize, builder: &mut KeyBuilder<'_>) {
        let node = &self.nodes[index];
        builder.begin_block(node.snippet_id);

        for &child in &node.children {
            self.encode_node(child, builder);
        }

        let schema = builder
            .registry()
            .payload_schema(node.snippet_id)
            .unwrap_or_default();
        let mut rest = node.payload.as_slice();
        for field in schema {
            let (head, tail) = rest.split_at(field.size_in_bytes().min(rest.len()));
            builder.add_bytes(head);
            rest = tail;
        }
        if !rest.is_empty() {
            builder.add_bytes(rest);
        }

        builder.end_block();
    }

    /// Append the blocks of `data`. On error nothing is left behind.
    pub(crate) fn append_key(
        &mut self,
        data: &[u8],
        registry: &dyn SnippetRegistry,
    ) -> Result<(), DecodeError> {
        let start = self.nodes.len();
        let mut decoder = GraphDecoder {
            info: self,
            open: SmallVec::new(),
        };
        if let Err(e) = walk_blocks(data, registry, &mut decoder) {
            self.nodes.truncate(start);
            return Err(e);
        }

        let added = &self.nodes[start..];
        self.writes_color = !(added.len() == 1
            && added[0].snippet_id == BuiltInSnippetId::DepthStencilOnlyDraw.id());
        Ok(())
    }
}

/// Visitor that appends decoded blocks to a [`ShaderGraphInfo`].
pub(crate) struct GraphDecoder<'a> {
    info: &'a mut ShaderGraphInfo,
    open: SmallVec<[usize; 8]>,
}

impl<'r> BlockVisitor<'r> for GraphDecoder<'_> {
    fn enter(&mut self, header: &BlockHeader, _entry: &'r SnippetEntry, _depth: usize) {
        let index = self.info.nodes.len();
        let parent = self.open.last().copied();
        if let Some(p) = parent {
            self.info.nodes[p].children.push(index);
        }

        self.info.nodes.push(ShaderGraphNode {
            snippet_id: header.snippet_id,
            parent,
            children: SmallVec::new(),
            block_size: header.size,
            payload: SmallVec::new(),
        });
        self.open.push(index);
    }

    fn leave(
        &mut self,
        _header: &BlockHeader,
        _entry: &'r SnippetEntry,
        payload: &[u8],
        _depth: usize,
    ) -> Result<(), DecodeError> {
        if let Some(index) = self.open.pop() {
            self.info.nodes[index].payload = SmallVec::from_slice(payload);
        }
        Ok(())
    }
}
