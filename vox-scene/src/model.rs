use std::collections::BTreeSet;

use crate::frame::VoxelFrame;
use crate::palette::{Color, DEFAULT_PALETTE};
use crate::scene::{
    GroupNode, Layer, Material, NodeRef, RendererSetting, SceneGraph, ShapeNode, TransformNode,
};

/// Everything decoded from a `.vox` file.
///
/// All lists are in the order their chunks appeared in the file.
/// Scene nodes refer to each other by id; use [`VoxModel::scene_graph()`] to follow those
/// references.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct VoxModel {
    /// Format version number from the file header.
    pub version: i32,

    /// Models, or animation frames of models, indexed by [`ShapeModel::model_id`].
    ///
    /// [`ShapeModel::model_id`]: crate::ShapeModel::model_id
    pub frames: Vec<VoxelFrame>,

    /// Colors for each palette index. Index 0 conventionally means no voxel.
    ///
    /// This is [`DEFAULT_PALETTE`] if the file has no `RGBA` chunk.
    pub palette: [Color; 256],

    #[allow(missing_docs)]
    pub transform_nodes: Vec<TransformNode>,
    #[allow(missing_docs)]
    pub group_nodes: Vec<GroupNode>,
    #[allow(missing_docs)]
    pub shape_nodes: Vec<ShapeNode>,

    /// Every entry of [`Self::transform_nodes`], [`Self::group_nodes`], and
    /// [`Self::shape_nodes`], in the order their chunks appeared in the file.
    /// [`SceneGraph`] uses this to decide which of several nodes with the same id wins.
    pub node_order: Vec<NodeRef>,

    #[allow(missing_docs)]
    pub layers: Vec<Layer>,
    #[allow(missing_docs)]
    pub materials: Vec<Material>,
    #[allow(missing_docs)]
    pub renderer_settings: Vec<RendererSetting>,

    /// Contents of the `IMAP` chunk, if present: the order in which the editor displays
    /// palette entries. This is not applied to [`Self::palette`] or to voxel data.
    pub color_index_map: Option<Box<[u8; 256]>>,

    /// Every nonzero palette index that appears in voxel data, including voxels which were
    /// discarded for being out of bounds.
    pub used_color_indices: BTreeSet<u8>,
}

impl VoxModel {
    pub(crate) fn new(version: i32) -> Self {
        Self {
            version,
            frames: Vec::new(),
            palette: DEFAULT_PALETTE,
            transform_nodes: Vec::new(),
            group_nodes: Vec::new(),
            shape_nodes: Vec::new(),
            node_order: Vec::new(),
            layers: Vec::new(),
            materials: Vec::new(),
            renderer_settings: Vec::new(),
            color_index_map: None,
            used_color_indices: BTreeSet::new(),
        }
    }

    /// Builds an index of the scene nodes by id.
    pub fn scene_graph(&self) -> SceneGraph<'_> {
        SceneGraph::new(self)
    }

    /// Returns the first layer with the given id.
    pub fn layer(&self, id: i32) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Returns the first material with the given id, which is a palette index.
    pub fn material(&self, id: i32) -> Option<&Material> {
        self.materials.iter().find(|material| material.id == id)
    }

    /// Total number of non-empty cells in all frames.
    pub fn voxel_count(&self) -> usize {
        self.frames.iter().map(VoxelFrame::voxel_count).sum()
    }
}
