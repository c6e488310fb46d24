//! Snippet Registry
//!
//! The registry is the external schema source every key is validated
//! against. For each snippet id it answers three questions:
//!
//! - how many child blocks the snippet's block contains,
//! - which data fields make up its own payload (in order),
//! - what the snippet is called (for dumps and diagnostics).
//!
//! The codec only ever reads from a registry. Implementations are expected
//! to be long-lived and shared by many builders.

use std::borrow::Cow;

use serde::Serialize;

/// Numeric snippet identifier as seen by callers.
///
/// Encoded into a single header byte, so registered ids never exceed
/// [`MAX_SNIPPET_ID`].
pub type SnippetId = u32;

/// Largest id that can be represented in a block header.
pub const MAX_SNIPPET_ID: SnippetId = u8::MAX as SnippetId;

/// Storage type of a payload field.
///
/// Only single bytes are supported by the current block format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PayloadType {
    Byte,
}

impl PayloadType {
    /// Encoded width of one element of this type.
    #[inline]
    #[must_use]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Byte => 1,
        }
    }
}

/// One named field of a snippet's data payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PayloadField {
    pub name: Cow<'static, str>,
    pub ty: PayloadType,
    /// Number of `ty` elements; a field is always written in one piece.
    pub count: u32,
}

impl PayloadField {
    #[must_use]
    pub fn bytes(name: impl Into<Cow<'static, str>>, count: u32) -> Self {
        Self {
            name: name.into(),
            ty: PayloadType::Byte,
            count,
        }
    }

    /// Total encoded width of the field.
    #[inline]
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        self.ty.size_in_bytes() * self.count as usize
    }
}

/// Schema for one snippet id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetEntry {
    pub name: Cow<'static, str>,
    pub num_children: usize,
    pub payload: Vec<PayloadField>,
}

impl SnippetEntry {
    #[must_use]
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        num_children: usize,
        payload: Vec<PayloadField>,
    ) -> Self {
        Self {
            name: name.into(),
            num_children,
            payload,
        }
    }

    /// Sum of all payload field widths.
    #[must_use]
    pub fn payload_size(&self) -> usize {
        self.payload.iter().map(PayloadField::size_in_bytes).sum()
    }
}

/// Read-only lookup from snippet id to schema.
pub trait SnippetRegistry {
    /// Highest id that `entry` may resolve.
    fn max_snippet_id(&self) -> SnippetId;

    fn entry(&self, id: SnippetId) -> Option<&SnippetEntry>;

    fn child_count(&self, id: SnippetId) -> Option<usize> {
        self.entry(id).map(|e| e.num_children)
    }

    fn payload_schema(&self, id: SnippetId) -> Option<&[PayloadField]> {
        self.entry(id).map(|e| e.payload.as_slice())
    }

    fn display_name(&self, id: SnippetId) -> Option<&str> {
        self.entry(id).map(|e| e.name.as_ref())
    }
}
