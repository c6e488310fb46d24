//! Block walker shared by decoding, validation and dumping.
//!
//! A block is laid out as
//!
//! ```text
//! [snippet id][block size][child blocks...][own payload...]
//! ```
//!
//! The walk is a recursive descent: children start right after the header,
//! each recursive call returns the size of the block it consumed, and
//! whatever is left of the block after its children is its own payload.

use graphkey_core::{MAX_BLOCK_DEPTH, SnippetEntry, SnippetId, SnippetRegistry};

use crate::errors::DecodeError;
use crate::key::BLOCK_HEADER_SIZE;

/// Decoded block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockHeader {
    pub offset: usize,
    pub snippet_id: SnippetId,
    pub size: usize,
}

/// Callbacks driven by [`walk_blocks`].
pub(crate) trait BlockVisitor<'r> {
    /// Called before any of the block's children.
    fn enter(&mut self, header: &BlockHeader, entry: &'r SnippetEntry, depth: usize);

    /// Called right before child `index` of the current block is walked.
    fn child(&mut self, _index: usize, _depth: usize) {}

    /// Called after the children with the block's own payload bytes.
    fn leave(
        &mut self,
        header: &BlockHeader,
        entry: &'r SnippetEntry,
        payload: &[u8],
        depth: usize,
    ) -> Result<(), DecodeError>;
}

/// Walk every top-level block of `data` in storage order.
pub(crate) fn walk_blocks<'r, V: BlockVisitor<'r>>(
    data: &[u8],
    registry: &'r dyn SnippetRegistry,
    visitor: &mut V,
) -> Result<(), DecodeError> {
    let mut offset = 0;
    while offset < data.len() {
        offset += walk_block(data, data.len(), registry, offset, 0, visitor)?;
    }
    Ok(())
}

fn read_header(data: &[u8], offset: usize, end: usize) -> Result<BlockHeader, DecodeError> {
    if offset + BLOCK_HEADER_SIZE > end {
        return Err(DecodeError::Truncated {
            offset,
            available: end - offset,
        });
    }

    let size = data[offset + 1] as usize;
    if size < BLOCK_HEADER_SIZE {
        return Err(DecodeError::BadBlockSize { offset, size });
    }
    if offset + size > end {
        return Err(DecodeError::BlockOverrun { offset, size, end });
    }

    Ok(BlockHeader {
        offset,
        snippet_id: SnippetId::from(data[offset]),
        size,
    })
}

fn walk_block<'r, V: BlockVisitor<'r>>(
    data: &[u8],
    end: usize,
    registry: &'r dyn SnippetRegistry,
    offset: usize,
    depth: usize,
    visitor: &mut V,
) -> Result<usize, DecodeError> {
    if depth >= MAX_BLOCK_DEPTH {
        return Err(DecodeError::NestingTooDeep {
            offset,
            depth: MAX_BLOCK_DEPTH,
        });
    }

    let header = read_header(data, offset, end)?;
    let entry = registry
        .entry(header.snippet_id)
        .ok_or(DecodeError::UnknownSnippet {
            id: header.snippet_id,
            offset,
        })?;

    visitor.enter(&header, entry, depth);

    let block_end = offset + header.size;
    let mut child_offset = offset + BLOCK_HEADER_SIZE;
    for index in 0..entry.num_children {
        if child_offset >= block_end {
            return Err(DecodeError::ChildOverrun {
                offset,
                size: header.size,
            });
        }
        visitor.child(index, depth);
        child_offset += walk_block(data, block_end, registry, child_offset, depth + 1, visitor)?;
    }

    visitor.leave(&header, entry, &data[child_offset..block_end], depth)?;

    Ok(header.size)
}

/// Visitor that checks every payload against its schema and counts blocks.
#[derive(Debug, Default)]
pub(crate) struct SchemaValidator {
    pub blocks: usize,
}

impl<'r> BlockVisitor<'r> for SchemaValidator {
    fn enter(&mut self, _header: &BlockHeader, _entry: &'r SnippetEntry, _depth: usize) {
        self.blocks += 1;
    }

    fn leave(
        &mut self,
        header: &BlockHeader,
        entry: &'r SnippetEntry,
        payload: &[u8],
        _depth: usize,
    ) -> Result<(), DecodeError> {
        let expected = entry.payload_size();
        if payload.len() == expected {
            Ok(())
        } else {
            Err(DecodeError::PayloadMismatch {
                offset: header.offset,
                expected,
                actual: payload.len(),
            })
        }
    }
}
