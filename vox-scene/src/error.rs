use crate::chunk::ChunkTag;
use crate::dict::Dict;

/// Fatal error from [`decode()`](crate::decode()).
///
/// No partial model is produced when this occurs.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
#[error("failed to decode .vox data at byte offset {offset}")]
pub struct DecodeError {
    /// Offset, from the start of the input, of the data the error is about.
    pub offset: usize,

    #[source]
    pub(crate) kind: DecodeErrorKind,
}

impl DecodeError {
    pub(crate) fn new(offset: usize, kind: DecodeErrorKind) -> Self {
        Self { offset, kind }
    }

    /// Specific reason why decoding failed.
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }
}

/// Specific reason why decoding failed.
/// Always contained within a [`DecodeError`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// A read needed more bytes than remain in the file or in the enclosing chunk.
    #[error("unexpected end of data: needed {needed} bytes but {remaining} remain")]
    UnexpectedEnd {
        /// Number of bytes the read required.
        needed: usize,
        /// Number of bytes that were available.
        remaining: usize,
    },

    /// A length or count prefix was negative.
    #[error("{what} has negative length {length}")]
    NegativeLength {
        /// What the prefix was the length of.
        what: &'static str,
        /// The value read.
        length: i32,
    },

    /// A chunk header declares more content and children bytes than its parent has left.
    #[error("chunk {tag} declares {declared} bytes but only {remaining} remain")]
    ChunkOverrun {
        /// Tag of the offending chunk.
        tag: ChunkTag,
        /// Sum of the declared content and children sizes.
        declared: u64,
        /// Bytes left in the enclosing region after the chunk header.
        remaining: usize,
    },

    /// Chunks are nested more deeply than the decoder is willing to recurse.
    #[error("chunks are nested more than {limit} levels deep")]
    ChunkNestingTooDeep {
        /// The nesting limit.
        limit: usize,
    },

    /// A `SIZE` chunk declares a dimension outside of `1..=256`.
    #[error("model size {size:?} is outside the allowed range of 1 to 256")]
    FrameSizeInvalid {
        /// The dimensions as stored in the file.
        size: [i32; 3],
    },

    /// An `XYZI` chunk was found with no preceding `SIZE` chunk.
    #[error("voxel data appears before any model size")]
    VoxelsBeforeSize,

    /// A `PACK` chunk declares more models than the decoder will allocate.
    #[error("file declares {count} models, more than the limit of {limit}")]
    TooManyModels {
        /// The count read.
        count: usize,
        /// The limit.
        limit: usize,
    },

    /// The frames which contain voxels have more cells in total than the decoder will
    /// allocate.
    #[error("frames with voxel data exceed the limit of {limit} cells in total")]
    TotalVolumeTooLarge {
        /// The limit.
        limit: usize,
    },
}

/// Errors that may occur while interpreting the scene graph of a decoded [`VoxModel`].
///
/// [`VoxModel`]: crate::VoxModel
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum SceneError {
    /// A node refers to a child id which no node has.
    #[error("file refers to scene node with ID {0} but does not define it")]
    MissingSceneNode(i32),

    /// Following child references leads back to a node already being visited.
    #[error("scene graph contains cycle (involving node with ID {0})")]
    SceneGraphCycle(i32),

    /// The scene graph is nested more deeply than [`SceneGraph::instances()`] will walk.
    ///
    /// [`SceneGraph::instances()`]: crate::SceneGraph::instances
    #[error("scene graph is too complex")]
    SceneGraphRecursion,

    /// A node attribute could not be parsed.
    #[error("attribute “{attribute}” of scene node with ID {node_id} is invalid")]
    SceneAttributeParse {
        /// Id of the node whose attribute is invalid.
        node_id: i32,
        /// Key of the attribute.
        attribute: &'static str,
    },

    /// A shape node refers to a model (frame) index which does not exist.
    #[error("file refers to model with ID {0} but does not define it")]
    MissingModel(i32),

    /// Accumulating the transforms down to the given transform node overflowed `i32`.
    #[error("position/transform too large at scene node with ID {0}")]
    TransformOverflow(i32),
}

pub(crate) fn warn_extra_attributes(
    thing: core::fmt::Arguments<'_>,
    attributes: &Dict,
    expected_attributes: &[&'static str],
) {
    let unexpected = Vec::from_iter(
        attributes
            .keys()
            .filter(|key| !expected_attributes.contains(key)),
    );
    if !unexpected.is_empty() {
        log::info!("{thing} contains unknown attributes {unexpected:?}");
    }
}
