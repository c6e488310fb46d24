//! Reserved snippet ids.
//!
//! These ids are stable across runs and are always registered by
//! [`ShaderCodeDictionary::new`](crate::ShaderCodeDictionary::new).
//! User-defined snippets are assigned ids after [`BuiltInSnippetId::LAST`].

use crate::registry::{PayloadField, SnippetEntry, SnippetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BuiltInSnippetId {
    /// Marker block emitted in place of an invalid key.
    Error = 0,
    /// Draw that touches only depth/stencil; keys made solely of it write no color.
    DepthStencilOnlyDraw,

    SolidColorShader,
    LinearGradientShader,
    RadialGradientShader,
    SweepGradientShader,
    ConicalGradientShader,
    ImageShader,
    LocalMatrixShader,
    BlendShader,

    FixedFunctionBlender,
    ShaderBasedBlender,
}

impl BuiltInSnippetId {
    pub const LAST: Self = Self::ShaderBasedBlender;

    pub const ALL: [Self; 12] = [
        Self::Error,
        Self::DepthStencilOnlyDraw,
        Self::SolidColorShader,
        Self::LinearGradientShader,
        Self::RadialGradientShader,
        Self::SweepGradientShader,
        Self::ConicalGradientShader,
        Self::ImageShader,
        Self::LocalMatrixShader,
        Self::BlendShader,
        Self::FixedFunctionBlender,
        Self::ShaderBasedBlender,
    ];

    #[inline]
    #[must_use]
    pub const fn id(self) -> SnippetId {
        self as SnippetId
    }

    #[must_use]
    pub fn from_id(id: SnippetId) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::DepthStencilOnlyDraw => "DepthStencilOnlyDraw",
            Self::SolidColorShader => "SolidColor",
            Self::LinearGradientShader => "LinearGradient",
            Self::RadialGradientShader => "RadialGradient",
            Self::SweepGradientShader => "SweepGradient",
            Self::ConicalGradientShader => "ConicalGradient",
            Self::ImageShader => "Image",
            Self::LocalMatrixShader => "LocalMatrix",
            Self::BlendShader => "BlendShader",
            Self::FixedFunctionBlender => "FixedFunctionBlender",
            Self::ShaderBasedBlender => "ShaderBasedBlender",
        }
    }

    /// Schema registered for this snippet.
    #[must_use]
    pub fn entry(self) -> SnippetEntry {
        let (children, payload) = match self {
            Self::Error | Self::DepthStencilOnlyDraw | Self::SolidColorShader => (0, Vec::new()),
            Self::LinearGradientShader
            | Self::RadialGradientShader
            | Self::SweepGradientShader
            | Self::ConicalGradientShader => (0, vec![PayloadField::bytes("tileMode", 1)]),
            Self::ImageShader => (0, vec![PayloadField::bytes("tileModes", 2)]),
            Self::LocalMatrixShader => (1, Vec::new()),
            Self::BlendShader => (2, vec![PayloadField::bytes("blendMode", 1)]),
            Self::FixedFunctionBlender | Self::ShaderBasedBlender => {
                (0, vec![PayloadField::bytes("blendMode", 1)])
            }
        };
        SnippetEntry::new(self.name(), children, payload)
    }
}

impl From<BuiltInSnippetId> for SnippetId {
    #[inline]
    fn from(id: BuiltInSnippetId) -> Self {
        id.id()
    }
}
