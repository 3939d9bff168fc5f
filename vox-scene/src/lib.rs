//! Decoding of MagicaVoxel [`.vox`][vox] files into a flat, in-memory scene model.
//!
//! The entry point is [`decode()`], which accepts the complete file contents and a set of
//! [`DecodeOptions`], and produces a [`VoxModel`] along with a [`DecodeReport`] of non-fatal
//! findings. Input which does not start with the `.vox` magic number is not an error, but
//! is reported as [`DecodeOutcome::NotVox`].
//!
//! The scene graph is kept as it is stored in the file: flat lists of nodes which refer to each
//! other by integer id. [`VoxModel::scene_graph()`] builds an index over those lists and can
//! flatten the graph into positioned [`SceneInstance`]s.
//!
//! ## Package features
//!
//! This package defines the following feature flags:
//!
//! * `"serde"`: `Serialize` and `Deserialize` for [`DecodeOptions`] and [`Color`].
//! * `"arbitrary"`: `arbitrary::Arbitrary` for [`DecodeOptions`], for fuzzing.
//!
//! [vox]: https://github.com/ephtracy/voxel-model/blob/master/MagicaVoxel-file-format-vox.txt

// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

mod chunk;
mod coord;
mod cursor;
mod decode;
mod diagnostic;
mod dict;
mod error;
mod frame;
mod model;
mod palette;
mod scene;
mod validate;


pub use chunk::ChunkTag;
pub use coord::{Cell, CellPoint, CellVector, CoordinateConvention, FrameSize};
pub use decode::{DecodeOptions, DecodeOutcome, MAGIC, VERSION, decode};
pub use diagnostic::{ChunkLogEntry, DecodeReport, Diagnostic};
pub use dict::Dict;
pub use error::{DecodeError, DecodeErrorKind, SceneError};
pub use frame::{EMPTY, VoxelFrame};
pub use model::VoxModel;
pub use palette::{Color, DEFAULT_PALETTE};
pub use scene::{
    GroupNode, Layer, Material, MaterialKind, Node, NodeRef, RendererSetting, Rotation,
    SceneGraph, SceneInstance, ShapeModel, ShapeNode, Transform, TransformNode,
};
