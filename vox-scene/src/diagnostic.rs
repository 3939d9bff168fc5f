use std::fmt;
use std::io;

use crate::chunk::ChunkTag;
use crate::coord::CellPoint;

/// A non-fatal problem found while decoding.
///
/// Diagnostics never stop decoding; they are collected in [`DecodeReport::diagnostics`].
#[derive(Clone, Debug, Eq, Hash, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Diagnostic {
    /// The header's version number is not [`VERSION`](crate::VERSION).
    #[error("file version is {found}, expected {expected}")]
    VersionMismatch {
        #[allow(missing_docs)]
        found: i32,
        #[allow(missing_docs)]
        expected: i32,
    },

    /// A chunk with an unrecognized tag was skipped. Its children were still decoded.
    #[error("unknown chunk {tag}")]
    UnknownChunk {
        #[allow(missing_docs)]
        tag: ChunkTag,
    },

    /// A voxel position lies outside of its frame, and the voxel was discarded.
    #[error("voxel at {position:?} is outside of frame {frame}")]
    VoxelOutOfBounds {
        /// Index of the frame into [`VoxModel::frames`](crate::VoxModel::frames).
        frame: usize,
        /// Position after coordinate convention conversion.
        position: CellPoint,
    },

    /// More than one transform, group, or shape node has this id.
    #[error("scene node ID {0} is used more than once")]
    DuplicateId(i32),

    /// More than one group lists this node id as a child.
    #[error("scene node ID {0} is the child of more than one group")]
    DuplicateChildId(i32),

    /// A transform node other than the root is not the child of any group.
    #[error("transform node ID {0} is not the child of any group")]
    OrphanTransform(i32),
}

/// Non-fatal results of decoding, returned alongside the [`VoxModel`](crate::VoxModel).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct DecodeReport {
    /// Problems found, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,

    /// One entry per chunk, in file order.
    /// Empty unless [`DecodeOptions::write_diagnostic_log`] was set.
    ///
    /// [`DecodeOptions::write_diagnostic_log`]: crate::DecodeOptions::write_diagnostic_log
    pub chunk_log: Vec<ChunkLogEntry>,
}

impl DecodeReport {
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    /// Writes [`Self::chunk_log`] as text, one blank-line-separated block per chunk.
    pub fn write_chunk_log(&self, mut writer: impl io::Write) -> io::Result<()> {
        for entry in &self.chunk_log {
            writeln!(writer, "{entry}")?;
        }
        Ok(())
    }
}

/// Description of one chunk, as recorded when
/// [`DecodeOptions::write_diagnostic_log`](crate::DecodeOptions::write_diagnostic_log) is set.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct ChunkLogEntry {
    /// Position of this chunk among all chunks in the file, counting from 1.
    pub ordinal: usize,
    #[allow(missing_docs)]
    pub tag: ChunkTag,
    #[allow(missing_docs)]
    pub content_size: usize,
    #[allow(missing_docs)]
    pub children_size: usize,
    /// Human-readable description of the chunk's decoded content.
    pub detail: Vec<String>,
}

impl fmt::Display for ChunkLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            ordinal,
            tag,
            content_size,
            children_size,
            detail,
        } = self;
        writeln!(
            f,
            "chunk {ordinal} {tag}: {content_size} content bytes, {children_size} children bytes"
        )?;
        for line in detail {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}
