use std::fmt;
use std::iter;

use crate::coord::CoordinateConvention;
use crate::cursor::Cursor;
use crate::decode::DecodeOptions;
use crate::diagnostic::{ChunkLogEntry, DecodeReport, Diagnostic};
use crate::dict::Dict;
use crate::error::{DecodeError, DecodeErrorKind};
use crate::frame::{EMPTY, VoxelFrame};
use crate::model::VoxModel;
use crate::palette::read_rgba_chunk;
use crate::scene::{
    GroupNode, Layer, Material, NodeRef, RendererSetting, ShapeNode, TransformNode,
};
use crate::validate;

// -------------------------------------------------------------------------------------------------

/// The four-byte identifier at the start of every chunk.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct ChunkTag(pub [u8; 4]);

#[allow(missing_docs)]
impl ChunkTag {
    pub const MAIN: Self = Self(*b"MAIN");
    pub const SIZE: Self = Self(*b"SIZE");
    pub const XYZI: Self = Self(*b"XYZI");
    pub const RGBA: Self = Self(*b"RGBA");
    pub const PACK: Self = Self(*b"PACK");
    pub const TRANSFORM: Self = Self(*b"nTRN");
    pub const GROUP: Self = Self(*b"nGRP");
    pub const SHAPE: Self = Self(*b"nSHP");
    pub const LAYER: Self = Self(*b"LAYR");
    pub const MATERIAL: Self = Self(*b"MATL");
    pub const RENDERER_SETTING: Self = Self(*b"rOBJ");
    pub const INDEX_MAP: Self = Self(*b"IMAP");
    /// Old-style material chunk. Recognized, but its content is not decoded.
    pub const OLD_MATERIAL: Self = Self(*b"MATT");
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.escape_ascii())
    }
}

impl fmt::Debug for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkTag(b\"{self}\")")
    }
}

// -------------------------------------------------------------------------------------------------

/// Chunks nested deeper than this are rejected.
const MAX_NESTING: usize = 256;

/// Largest model count a `PACK` chunk may declare.
const MAX_PACK_MODELS: usize = 1 << 16;

/// Largest total number of cells allocated for frames which contain voxels:
/// sixteen frames of the maximum size.
const MAX_TOTAL_CELLS: usize = 1 << 28;

/// State of one [`decode()`](crate::decode()) call, threaded through the chunk recursion.
pub(crate) struct DecodeContext<'o> {
    options: &'o DecodeOptions,
    convention: CoordinateConvention,
    model: VoxModel,
    report: DecodeReport,
    /// Number of chunk headers read so far.
    chunk_count: usize,
    /// Index of the frame the next `SIZE` chunk applies to.
    /// `XYZI` chunks apply to the frame before this one.
    next_frame: usize,
    palette_seen: bool,
    /// Element count of the most recent `XYZI` or `PACK` chunk, for the chunk log.
    last_count: usize,
    /// Number of cells which may still be allocated for frame storage.
    cell_budget: usize,
}

impl<'o> DecodeContext<'o> {
    pub fn new(options: &'o DecodeOptions, version: i32) -> Self {
        let mut report = DecodeReport::default();
        if version != crate::VERSION {
            report.push(Diagnostic::VersionMismatch {
                found: version,
                expected: crate::VERSION,
            });
        }
        Self {
            options,
            convention: options.coordinate_convention(),
            model: VoxModel::new(version),
            report,
            chunk_count: 0,
            next_frame: 0,
            palette_seen: false,
            last_count: 0,
            cell_budget: MAX_TOTAL_CELLS,
        }
    }

    /// Reads chunks until `region` is exhausted, recursing into each chunk's children.
    pub fn read_chunks(&mut self, mut region: Cursor<'_>, depth: usize) -> Result<(), DecodeError> {
        if depth >= MAX_NESTING && !region.is_empty() {
            return Err(region.error(DecodeErrorKind::ChunkNestingTooDeep { limit: MAX_NESTING }));
        }

        while !region.is_empty() {
            let header_offset = region.offset();
            let tag = region.read_tag()?;
            let content_size = region.read_len("chunk content")?;
            let children_size = region.read_len("chunk children")?;

            let declared = content_size as u64 + children_size as u64;
            if declared > region.remaining() as u64 {
                return Err(DecodeError::new(
                    header_offset,
                    DecodeErrorKind::ChunkOverrun {
                        tag,
                        declared,
                        remaining: region.remaining(),
                    },
                ));
            }
            let mut content = region.split_off(content_size)?;
            let children = region.split_off(children_size)?;
            self.chunk_count += 1;

            self.read_content(tag, &mut content)?;
            if !content.is_empty() {
                let offset = content.offset();
                let discarded = content.skip_rest();
                log::trace!("ignoring {discarded} bytes at end of {tag} chunk at offset {offset}");
            }

            if self.options.write_diagnostic_log {
                let entry = ChunkLogEntry {
                    ordinal: self.chunk_count,
                    tag,
                    content_size,
                    children_size,
                    detail: self.describe_latest(tag),
                };
                log::debug!("{entry}");
                self.report.chunk_log.push(entry);
            }

            self.read_chunks(children, depth + 1)?;
        }
        Ok(())
    }

    fn read_content(&mut self, tag: ChunkTag, content: &mut Cursor<'_>) -> Result<(), DecodeError> {
        match tag {
            ChunkTag::MAIN => {}
            ChunkTag::SIZE => self.read_size(content)?,
            ChunkTag::XYZI => self.read_voxels(content)?,
            ChunkTag::RGBA => {
                self.model.palette = read_rgba_chunk(content, self.options.palette_offset)?;
                self.palette_seen = true;
            }
            ChunkTag::PACK => {
                let start = content.offset();
                let count = content.read_len("model count")?;
                if count > MAX_PACK_MODELS {
                    return Err(DecodeError::new(
                        start,
                        DecodeErrorKind::TooManyModels {
                            count,
                            limit: MAX_PACK_MODELS,
                        },
                    ));
                }
                self.model
                    .frames
                    .extend(iter::repeat_with(VoxelFrame::default).take(count));
                self.last_count = count;
            }
            ChunkTag::TRANSFORM => {
                let node = TransformNode::read(content)?;
                self.model
                    .node_order
                    .push(NodeRef::Transform(self.model.transform_nodes.len()));
                self.model.transform_nodes.push(node);
            }
            ChunkTag::GROUP => {
                let node = GroupNode::read(content)?;
                self.model
                    .node_order
                    .push(NodeRef::Group(self.model.group_nodes.len()));
                self.model.group_nodes.push(node);
            }
            ChunkTag::SHAPE => {
                let node = ShapeNode::read(content)?;
                self.model
                    .node_order
                    .push(NodeRef::Shape(self.model.shape_nodes.len()));
                self.model.shape_nodes.push(node);
            }
            ChunkTag::LAYER => {
                let layer = Layer::read(content)?;
                self.model.layers.push(layer);
            }
            ChunkTag::MATERIAL => {
                let material = Material::read(content)?;
                self.model.materials.push(material);
            }
            ChunkTag::RENDERER_SETTING => {
                let setting = RendererSetting::read(content)?;
                self.model.renderer_settings.push(setting);
            }
            ChunkTag::INDEX_MAP => {
                self.model.color_index_map = Some(Box::new(content.read_array()?));
            }
            ChunkTag::OLD_MATERIAL => {
                content.skip_rest();
            }
            _ => {
                self.report.push(Diagnostic::UnknownChunk { tag });
                content.skip_rest();
            }
        }
        Ok(())
    }

    fn read_size(&mut self, content: &mut Cursor<'_>) -> Result<(), DecodeError> {
        let start = content.offset();
        let stored = [content.read_i32()?, content.read_i32()?, content.read_i32()?];
        let size = self.convention.frame_size(stored).ok_or_else(|| {
            DecodeError::new(start, DecodeErrorKind::FrameSizeInvalid { size: stored })
        })?;

        let frame = VoxelFrame::new(size);
        match self.model.frames.get_mut(self.next_frame) {
            Some(existing) => *existing = frame,
            None => self.model.frames.push(frame),
        }
        self.next_frame += 1;
        Ok(())
    }

    fn read_voxels(&mut self, content: &mut Cursor<'_>) -> Result<(), DecodeError> {
        let frame_index = self
            .next_frame
            .checked_sub(1)
            .ok_or_else(|| content.error(DecodeErrorKind::VoxelsBeforeSize))?;
        let count = content.read_len("voxel list")?;
        let convention = self.convention;
        let frame = &mut self.model.frames[frame_index];
        let size = frame.size();

        if count > 0 && !frame.has_storage() {
            self.cell_budget = self.cell_budget.checked_sub(frame.volume()).ok_or_else(|| {
                content.error(DecodeErrorKind::TotalVolumeTooLarge {
                    limit: MAX_TOTAL_CELLS,
                })
            })?;
            frame.allocate();
        }

        for _ in 0..count {
            let [x, y, z, value] = content.read_array()?;
            if value != EMPTY {
                self.model.used_color_indices.insert(value);
            }
            let position = convention.cell(size, [x, y, z]);
            if !frame.set(position, value) {
                self.report.push(Diagnostic::VoxelOutOfBounds {
                    frame: frame_index,
                    position,
                });
            }
        }
        self.last_count = count;
        Ok(())
    }

    /// Describes the record most recently decoded from a chunk with the given tag.
    fn describe_latest(&self, tag: ChunkTag) -> Vec<String> {
        let model = &self.model;
        let mut lines = Vec::new();
        match tag {
            ChunkTag::SIZE => {
                if let Some(frame) = self.next_frame.checked_sub(1).and_then(|i| model.frames.get(i)) {
                    let size = frame.size();
                    lines.push(format!("size {} {} {}", size.width, size.height, size.depth));
                }
            }
            ChunkTag::XYZI => lines.push(format!("{} voxels", self.last_count)),
            ChunkTag::PACK => lines.push(format!("{} models", self.last_count)),
            ChunkTag::RGBA => lines.push("palette".to_owned()),
            ChunkTag::TRANSFORM => {
                if let Some(node) = model.transform_nodes.last() {
                    lines.push(format!("transform node {}", node.id));
                    lines.push(format!("child {}", node.child_id));
                    lines.push(format!("reserved {}", node.reserved_id));
                    lines.push(format!("layer {}", node.layer_id));
                    describe_attributes(&mut lines, "attribute", &node.attributes);
                    for (i, frame) in node.frame_attributes.iter().enumerate() {
                        describe_attributes(&mut lines, &format!("frame {i} attribute"), frame);
                    }
                }
            }
            ChunkTag::GROUP => {
                if let Some(node) = model.group_nodes.last() {
                    lines.push(format!("group node {}", node.id));
                    lines.extend(node.child_ids.iter().map(|child| format!("child {child}")));
                    describe_attributes(&mut lines, "attribute", &node.attributes);
                }
            }
            ChunkTag::SHAPE => {
                if let Some(node) = model.shape_nodes.last() {
                    lines.push(format!("shape node {}", node.id));
                    describe_attributes(&mut lines, "attribute", &node.attributes);
                    for shape_model in &node.models {
                        lines.push(format!("model {}", shape_model.model_id));
                        describe_attributes(&mut lines, "model attribute", &shape_model.attributes);
                    }
                }
            }
            ChunkTag::LAYER => {
                if let Some(layer) = model.layers.last() {
                    lines.push(format!("layer {}", layer.id));
                    lines.push(format!("unknown {}", layer.unknown));
                    describe_attributes(&mut lines, "attribute", &layer.attributes);
                }
            }
            ChunkTag::MATERIAL => {
                if let Some(material) = model.materials.last() {
                    lines.push(format!("material {}", material.id));
                    describe_attributes(&mut lines, "property", &material.properties);
                }
            }
            ChunkTag::RENDERER_SETTING => {
                if let Some(setting) = model.renderer_settings.last() {
                    describe_attributes(&mut lines, "attribute", &setting.attributes);
                }
            }
            ChunkTag::INDEX_MAP => {
                if let Some(map) = &model.color_index_map {
                    lines.push(format!("index map {}", itertools::join(map.iter(), " ")));
                }
            }
            ChunkTag::MAIN | ChunkTag::OLD_MATERIAL => {}
            _ => lines.push("unknown chunk, skipped".to_owned()),
        }
        lines
    }

    /// Runs the requested post-decoding steps and returns the results.
    pub fn finish(mut self) -> (VoxModel, DecodeReport) {
        if self.options.run_integrity_checks {
            for diagnostic in validate::check(&self.model) {
                self.report.push(diagnostic);
            }
        }

        let model = self.model;
        log::info!(
            "decoded {chunks} chunks: {frames} models, {voxels} voxels, {nodes} scene nodes, \
                {palette} palette, {diagnostics} diagnostics",
            chunks = self.chunk_count,
            frames = model.frames.len(),
            voxels = model.voxel_count(),
            nodes = model.transform_nodes.len() + model.group_nodes.len() + model.shape_nodes.len(),
            palette = if self.palette_seen { "explicit" } else { "default" },
            diagnostics = self.report.diagnostics.len(),
        );
        (model, self.report)
    }
}

fn describe_attributes(lines: &mut Vec<String>, label: &str, attributes: &Dict) {
    lines.extend(
        attributes
            .iter()
            .map(|(key, value)| format!("{label} {key} = {value}")),
    );
}
