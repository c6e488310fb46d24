//! Human-readable key dumps.

use std::fmt;

use graphkey_core::{SnippetEntry, SnippetRegistry};

use crate::block::{BlockHeader, BlockVisitor, walk_blocks};
use crate::errors::DecodeError;
use crate::key::EncodedKey;

const INDENT: &str = "    ";

struct Dumper {
    out: String,
}

impl Dumper {
    fn line(&mut self, depth: usize, args: fmt::Arguments<'_>) {
        self.out.push_str(&INDENT.repeat(depth));
        self.out.push_str(&fmt::format(args));
        self.out.push('\n');
    }
}

impl<'r> BlockVisitor<'r> for Dumper {
    fn enter(&mut self, header: &BlockHeader, entry: &'r SnippetEntry, depth: usize) {
        self.line(depth, format_args!("{} block ({}B)", entry.name, header.size));
    }

    fn child(&mut self, index: usize, depth: usize) {
        self.line(depth, format_args!("child {index}:"));
    }

    fn leave(
        &mut self,
        header: &BlockHeader,
        entry: &'r SnippetEntry,
        payload: &[u8],
        depth: usize,
    ) -> Result<(), DecodeError> {
        if payload.len() != entry.payload_size() {
            return Err(DecodeError::PayloadMismatch {
                offset: header.offset,
                expected: entry.payload_size(),
                actual: payload.len(),
            });
        }

        let mut rest = payload;
        for field in &entry.payload {
            let (values, tail) = rest.split_at(field.size_in_bytes());
            let values = values
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            self.line(depth, format_args!("{}[{}]: {values}", field.name, field.count));
            rest = tail;
        }
        Ok(())
    }
}

impl EncodedKey<'_> {
    /// Render the key as an indented block tree.
    ///
    /// ```text
    /// EncodedKey (8B):
    /// BlendShader block (8B)
    /// child 0:
    ///     SolidColor block (2B)
    /// child 1:
    ///     LinearGradient block (3B)
    ///     tileMode[1]: 0
    /// blendMode[1]: 3
    /// ```
    pub fn dump(&self, registry: &dyn SnippetRegistry) -> Result<String, DecodeError> {
        let mut dumper = Dumper {
            out: format!("EncodedKey ({}B):\n", self.size_in_bytes()),
        };
        walk_blocks(self.as_bytes(), registry, &mut dumper)?;
        Ok(dumper.out)
    }

    /// Emit [`dump`](Self::dump) through the `log` facade at debug level.
    pub fn log_dump(&self, registry: &dyn SnippetRegistry) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        match self.dump(registry) {
            Ok(text) => log::debug!("{text}"),
            Err(e) => log::debug!("EncodedKey ({}B): undecodable: {e}", self.size_in_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphkey_core::{BuiltInSnippetId, ShaderCodeDictionary};

    #[test]
    fn test_dump_nested() {
        let dict = ShaderCodeDictionary::new();
        let blend = BuiltInSnippetId::BlendShader as u8;
        let solid = BuiltInSnippetId::SolidColorShader as u8;
        let linear = BuiltInSnippetId::LinearGradientShader as u8;
        let bytes = [blend, 8, solid, 2, linear, 3, 0, 3];
        let key = EncodedKey::from_slice(&bytes);

        let expected = "\
EncodedKey (8B):
BlendShader block (8B)
child 0:
    SolidColor block (2B)
child 1:
    LinearGradient block (3B)
    tileMode[1]: 0
blendMode[1]: 3
";
        assert_eq!(key.dump(&dict).unwrap(), expected);
    }

    #[test]
    fn test_dump_indents_each_level() {
        let dict = ShaderCodeDictionary::new();
        let local = BuiltInSnippetId::LocalMatrixShader as u8;
        let solid = BuiltInSnippetId::SolidColorShader as u8;
        let bytes = [local, 6, local, 4, solid, 2];
        let key = EncodedKey::from_slice(&bytes);

        let lines: Vec<_> = key.dump(&dict).unwrap().lines().map(str::to_owned).collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3], "    LocalMatrix block (4B)");
        assert_eq!(lines[5], "        SolidColor block (2B)");
    }

    #[test]
    fn test_dump_multi_byte_field() {
        let dict = ShaderCodeDictionary::new();
        let image = BuiltInSnippetId::ImageShader as u8;
        let bytes = [image, 4, 1, 2];
        let key = EncodedKey::from_slice(&bytes);
        assert!(key.dump(&dict).unwrap().ends_with("tileModes[2]: 1, 2\n"));
    }

    #[test]
    fn test_dump_rejects_payload_mismatch() {
        let dict = ShaderCodeDictionary::new();
        let image = BuiltInSnippetId::ImageShader as u8;
        let bytes = [image, 3, 1];
        let key = EncodedKey::from_slice(&bytes);
        assert!(matches!(
            key.dump(&dict),
            Err(DecodeError::PayloadMismatch { expected: 2, actual: 1, .. })
        ));
    }
}
