//! Scene graph records, and interpretation of the graph they form.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::ops::Mul;

use euclid::vec3;

use crate::coord::{CellPoint, CellVector};
use crate::cursor::Cursor;
use crate::dict::Dict;
use crate::error::{DecodeError, SceneError, warn_extra_attributes};
use crate::model::VoxModel;

#[cfg(test)]
mod tests;

// -------------------------------------------------------------------------------------------------
// Records as stored in the file

/// Contents of an `nTRN` chunk: positions a single child node.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct TransformNode {
    /// Id of this node. The root of the scene is the transform node with id 0.
    pub id: i32,
    #[allow(missing_docs)]
    pub attributes: Dict,
    /// Id of the node this node positions.
    pub child_id: i32,
    /// Reserved; expected to be −1.
    pub reserved_id: i32,
    /// Id of the [`Layer`] this node belongs to.
    pub layer_id: i32,
    /// One attribute dictionary per animation frame, holding `_t` translation and `_r` rotation.
    pub frame_attributes: Vec<Dict>,
}

/// Contents of an `nGRP` chunk: an unordered collection of child nodes.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct GroupNode {
    #[allow(missing_docs)]
    pub id: i32,
    #[allow(missing_docs)]
    pub attributes: Dict,
    #[allow(missing_docs)]
    pub child_ids: Vec<i32>,
}

/// Contents of an `nSHP` chunk: places one or more models.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct ShapeNode {
    #[allow(missing_docs)]
    pub id: i32,
    #[allow(missing_docs)]
    pub attributes: Dict,
    #[allow(missing_docs)]
    pub models: Vec<ShapeModel>,
}

/// Reference from a [`ShapeNode`] to a model, by index into [`VoxModel::frames`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct ShapeModel {
    #[allow(missing_docs)]
    pub model_id: i32,
    /// Reserved.
    pub attributes: Dict,
}

/// Contents of a `LAYR` chunk.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct Layer {
    #[allow(missing_docs)]
    pub id: i32,
    #[allow(missing_docs)]
    pub attributes: Dict,
    /// Trailing integer of unknown meaning, kept as read.
    pub unknown: i32,
}

/// Contents of a `MATL` chunk: rendering properties for one palette index.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct Material {
    /// Palette index this material applies to.
    pub id: i32,
    #[allow(missing_docs)]
    pub properties: Dict,
}

/// Contents of an `rOBJ` chunk: renderer settings, not otherwise interpreted.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct RendererSetting {
    #[allow(missing_docs)]
    pub attributes: Dict,
}

impl TransformNode {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: cursor.read_i32()?,
            attributes: Dict::read(cursor)?,
            child_id: cursor.read_i32()?,
            reserved_id: cursor.read_i32()?,
            layer_id: cursor.read_i32()?,
            frame_attributes: cursor.read_list("transform frame list", Dict::read)?,
        })
    }

    /// Value of the `_name` attribute.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("_name")
    }

    /// Whether the `_hidden` attribute is `1`.
    pub fn is_hidden(&self) -> bool {
        is_hidden(&self.attributes)
    }

    /// Parses the `_t` and `_r` attributes of the given animation frame.
    ///
    /// Missing attributes, and a missing frame, are treated as the identity transform.
    pub fn frame_transform(&self, frame_index: usize) -> Result<Transform, SceneError> {
        let Some(frame) = self.frame_attributes.get(frame_index) else {
            return Ok(Transform::IDENTITY);
        };
        let parse_error = |attribute| SceneError::SceneAttributeParse {
            node_id: self.id,
            attribute,
        };

        let translation = match frame.get("_t") {
            Some(t_string) => {
                let components = t_string
                    .split_whitespace()
                    .map(str::parse::<i32>)
                    .collect::<Result<Vec<i32>, _>>()
                    .map_err(|_| parse_error("_t"))?;
                let [x, y, z] = <[i32; 3]>::try_from(components).map_err(|_| parse_error("_t"))?;
                vec3(x, y, z)
            }
            None => CellVector::zero(),
        };

        let rotation = match frame.get("_r") {
            Some(r_string) => r_string
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(Rotation::from_byte)
                .ok_or_else(|| parse_error("_r"))?,
            None => Rotation::IDENTITY,
        };

        Ok(Transform {
            rotation,
            translation,
        })
    }
}

impl GroupNode {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: cursor.read_i32()?,
            attributes: Dict::read(cursor)?,
            child_ids: cursor.read_list("group child list", Cursor::read_i32)?,
        })
    }

    /// Value of the `_name` attribute.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("_name")
    }

    /// Whether the `_hidden` attribute is `1`.
    pub fn is_hidden(&self) -> bool {
        is_hidden(&self.attributes)
    }
}

impl ShapeNode {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: cursor.read_i32()?,
            attributes: Dict::read(cursor)?,
            models: cursor.read_list("shape model list", |cursor| {
                Ok(ShapeModel {
                    model_id: cursor.read_i32()?,
                    attributes: Dict::read(cursor)?,
                })
            })?,
        })
    }

    /// Value of the `_name` attribute.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("_name")
    }

    /// Whether the `_hidden` attribute is `1`.
    pub fn is_hidden(&self) -> bool {
        is_hidden(&self.attributes)
    }
}

impl Layer {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: cursor.read_i32()?,
            attributes: Dict::read(cursor)?,
            unknown: cursor.read_i32()?,
        })
    }

    /// Value of the `_name` attribute.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("_name")
    }

    /// Whether the `_hidden` attribute is `1`.
    pub fn is_hidden(&self) -> bool {
        is_hidden(&self.attributes)
    }
}

fn is_hidden(attributes: &Dict) -> bool {
    attributes.get("_hidden") == Some("1")
}

impl Material {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: cursor.read_i32()?,
            properties: Dict::read(cursor)?,
        })
    }

    /// The `_type` property.
    pub fn kind(&self) -> Option<MaterialKind> {
        self.properties.get("_type").map(MaterialKind::from_property)
    }

    fn number(&self, key: &str) -> Option<f32> {
        self.properties.get(key)?.trim().parse().ok()
    }

    /// The `_weight` property.
    pub fn weight(&self) -> Option<f32> {
        self.number("_weight")
    }
    /// The `_rough` property.
    pub fn roughness(&self) -> Option<f32> {
        self.number("_rough")
    }
    /// One minus [`Self::roughness()`].
    pub fn smoothness(&self) -> Option<f32> {
        self.roughness().map(|rough| 1.0 - rough)
    }
    /// The `_spec` property.
    pub fn specular(&self) -> Option<f32> {
        self.number("_spec")
    }
    /// The `_ior` property: index of refraction.
    pub fn ior(&self) -> Option<f32> {
        self.number("_ior")
    }
    /// The `_att` property.
    pub fn attenuation(&self) -> Option<f32> {
        self.number("_att")
    }
    /// The `_flux` property.
    pub fn flux(&self) -> Option<f32> {
        self.number("_flux")
    }
    /// The `_emit` property.
    pub fn emission(&self) -> Option<f32> {
        self.number("_emit")
    }
    /// The `_metal` property.
    pub fn metalness(&self) -> Option<f32> {
        self.number("_metal")
    }
    /// The `_alpha` property.
    pub fn alpha(&self) -> Option<f32> {
        self.number("_alpha")
    }
}

/// Value of the `_type` property of a [`Material`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
#[allow(missing_docs)]
pub enum MaterialKind {
    Diffuse,
    Metal,
    Glass,
    Emit,
    Blend,
    Media,
    Cloud,
    /// A type not listed above, kept verbatim.
    Other(String),
}

impl MaterialKind {
    fn from_property(value: &str) -> Self {
        match value {
            "_diffuse" => Self::Diffuse,
            "_metal" => Self::Metal,
            "_glass" => Self::Glass,
            "_emit" => Self::Emit,
            "_blend" => Self::Blend,
            "_media" => Self::Media,
            "_cloud" => Self::Cloud,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl RendererSetting {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            attributes: Dict::read(cursor)?,
        })
    }
}

// -------------------------------------------------------------------------------------------------
// Transforms

/// A rotation or reflection which maps each axis to an axis, as stored in the `_r` attribute.
///
/// Represented as a row-major matrix with exactly one nonzero entry, ±1, in each row and column.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Rotation {
    rows: [[i8; 3]; 3],
}

impl Rotation {
    #[allow(missing_docs)]
    pub const IDENTITY: Self = Self {
        rows: [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
    };

    /// Decodes the packed byte form.
    ///
    /// Bits 0–1 give the column of the nonzero entry of the first row, bits 2–3 that of the
    /// second row, and the third row takes the remaining column. Bits 4, 5, and 6 are set if
    /// the first, second, or third row's entry is negative.
    ///
    /// Returns [`None`] if the two columns given are equal or out of range.
    pub fn from_byte(byte: u8) -> Option<Self> {
        let first = usize::from(byte & 0b11);
        let second = usize::from((byte >> 2) & 0b11);
        if first == 3 || second == 3 || first == second {
            return None;
        }
        let third = 3 - first - second;

        let mut rows = [[0; 3]; 3];
        for (row, (column, sign_bit)) in [(first, 4), (second, 5), (third, 6)].into_iter().enumerate()
        {
            rows[row][column] = if byte & (1 << sign_bit) == 0 { 1 } else { -1 };
        }
        Some(Self { rows })
    }

    /// Returns the packed byte form, as accepted by [`Self::from_byte()`].
    pub fn to_byte(self) -> u8 {
        // Each row holds exactly one nonzero entry, so exactly one column of each row
        // contributes bits.
        let mut byte = 0;
        for (row, entries) in self.rows.iter().enumerate() {
            for (column, &entry) in (0u8..).zip(entries) {
                if entry == 0 {
                    continue;
                }
                if row < 2 {
                    byte |= column << (row * 2);
                }
                if entry < 0 {
                    byte |= 1 << (row + 4);
                }
            }
        }
        byte
    }

    /// Row-major matrix form.
    pub fn rows(self) -> [[i8; 3]; 3] {
        self.rows
    }

    /// Applies this rotation to a vector.
    ///
    /// Returns [`None`] on arithmetic overflow, which can only happen when negating
    /// [`i32::MIN`].
    pub fn checked_transform_vector(self, vector: CellVector) -> Option<CellVector> {
        let component = |[a, b, c]: [i8; 3]| {
            i32::from(a)
                .checked_mul(vector.x)?
                .checked_add(i32::from(b).checked_mul(vector.y)?)?
                .checked_add(i32::from(c).checked_mul(vector.z)?)
        };
        let [x, y, z] = self.rows;
        Some(vec3(component(x)?, component(y)?, component(z)?))
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Rotation {
    type Output = Self;

    /// Composes two rotations; `self * rhs` applies `rhs` first.
    fn mul(self, rhs: Self) -> Self {
        let mut rows = [[0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = (0..3).map(|k| self.rows[i][k] * rhs.rows[k][j]).sum();
            }
        }
        Self { rows }
    }
}

/// A rigid transformation made of a [`Rotation`] followed by a translation.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct Transform {
    /// Rotation, applied first.
    pub rotation: Rotation,
    /// Translation, applied after the rotation.
    pub translation: CellVector,
}

impl Transform {
    #[allow(missing_docs)]
    pub const IDENTITY: Self = Self {
        rotation: Rotation::IDENTITY,
        translation: CellVector::new(0, 0, 0),
    };

    /// Applies this transform to a point.
    ///
    /// Returns [`None`] on arithmetic overflow.
    pub fn checked_transform_point(self, point: CellPoint) -> Option<CellPoint> {
        let rotated = self.rotation.checked_transform_vector(point.to_vector())?;
        Some(checked_add(rotated, self.translation)?.to_point())
    }

    /// Composes two transforms; `parent.checked_mul(child)` applies `child` first.
    ///
    /// Returns [`None`] on arithmetic overflow.
    pub fn checked_mul(self, child: Self) -> Option<Self> {
        let rotated = self.rotation.checked_transform_vector(child.translation)?;
        Some(Self {
            rotation: self.rotation * child.rotation,
            translation: checked_add(rotated, self.translation)?,
        })
    }
}

fn checked_add(a: CellVector, b: CellVector) -> Option<CellVector> {
    Some(vec3(
        a.x.checked_add(b.x)?,
        a.y.checked_add(b.y)?,
        a.z.checked_add(b.z)?,
    ))
}

// -------------------------------------------------------------------------------------------------
// Graph

/// Location of a scene node within the node lists of a [`VoxModel`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_enums)]
pub enum NodeRef {
    /// Index into [`VoxModel::transform_nodes`].
    Transform(usize),
    /// Index into [`VoxModel::group_nodes`].
    Group(usize),
    /// Index into [`VoxModel::shape_nodes`].
    Shape(usize),
}

/// A scene node borrowed from a [`VoxModel`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[expect(clippy::exhaustive_enums)]
#[allow(missing_docs)]
pub enum Node<'m> {
    Transform(&'m TransformNode),
    Group(&'m GroupNode),
    Shape(&'m ShapeNode),
}

/// Index from scene node id to node, built by [`VoxModel::scene_graph()`].
///
/// If more than one node has the same id, the first one in the file wins.
#[derive(Clone, Debug)]
pub struct SceneGraph<'m> {
    model: &'m VoxModel,
    index: HashMap<i32, NodeRef>,
}

/// One model placed in the scene, as produced by [`SceneGraph::instances()`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct SceneInstance {
    /// Id of the [`ShapeNode`] which placed the model.
    pub shape_id: i32,
    /// Index into [`VoxModel::frames`].
    pub model_id: i32,
    /// Transform from model coordinates to scene coordinates, accumulated from every
    /// transform node above the shape.
    pub transform: Transform,
    /// Layer id of the nearest transform node above the shape.
    pub layer_id: i32,
}

impl<'m> SceneGraph<'m> {
    pub(crate) fn new(model: &'m VoxModel) -> Self {
        let mut index = HashMap::new();
        let refs = model.node_order.iter().filter_map(|&node_ref| {
            let id = match node_ref {
                NodeRef::Transform(i) => model.transform_nodes.get(i)?.id,
                NodeRef::Group(i) => model.group_nodes.get(i)?.id,
                NodeRef::Shape(i) => model.shape_nodes.get(i)?.id,
            };
            Some((id, node_ref))
        });
        for (id, node_ref) in refs {
            match index.entry(id) {
                Entry::Vacant(e) => {
                    e.insert(node_ref);
                }
                Entry::Occupied(e) => {
                    log::debug!(
                        "scene node ID {id} is used more than once; ignoring {node_ref:?} in favor of {existing:?}",
                        existing = e.get()
                    );
                }
            }
        }
        Self { model, index }
    }

    /// Number of distinct node ids.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the model has no scene nodes.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns where the node with the given id is stored.
    pub fn node_ref(&self, id: i32) -> Option<NodeRef> {
        self.index.get(&id).copied()
    }

    /// Returns the node with the given id.
    pub fn get(&self, id: i32) -> Option<Node<'m>> {
        let model = self.model;
        Some(match self.node_ref(id)? {
            NodeRef::Transform(i) => Node::Transform(model.transform_nodes.get(i)?),
            NodeRef::Group(i) => Node::Group(model.group_nodes.get(i)?),
            NodeRef::Shape(i) => Node::Shape(model.shape_nodes.get(i)?),
        })
    }

    /// Walks the graph from the root node, id 0, and returns every model placement it finds,
    /// in depth-first order.
    ///
    /// Only the first animation frame of each transform node is used.
    /// A model with no scene nodes at all has no instances.
    pub fn instances(&self) -> Result<Vec<SceneInstance>, SceneError> {
        let mut output = Vec::new();
        if !self.is_empty() {
            self.walk(0, Transform::IDENTITY, -1, None, &mut output)?;
        }
        Ok(output)
    }

    fn walk(
        &self,
        id: i32,
        parent_transform: Transform,
        layer_id: i32,
        parent_node_list: Option<&ParentList<'_>>,
        output: &mut Vec<SceneInstance>,
    ) -> Result<(), SceneError> {
        let parent_node_list = Some(&ParentList::cycle_and_depth_check(parent_node_list, id)?);

        match self.get(id).ok_or(SceneError::MissingSceneNode(id))? {
            Node::Transform(node) => {
                warn_extra_attributes(
                    format_args!("transform node #{id}"),
                    &node.attributes,
                    &["_name", "_hidden"],
                );
                if let Some(frame) = node.frame_attributes.first() {
                    warn_extra_attributes(
                        format_args!("first frame of transform node #{id}"),
                        frame,
                        &["_t", "_r", "_f"],
                    );
                }
                let transform = parent_transform
                    .checked_mul(node.frame_transform(0)?)
                    .ok_or(SceneError::TransformOverflow(id))?;
                self.walk(
                    node.child_id,
                    transform,
                    node.layer_id,
                    parent_node_list,
                    output,
                )?;
            }
            Node::Group(node) => {
                warn_extra_attributes(
                    format_args!("group node #{id}"),
                    &node.attributes,
                    &["_name", "_hidden"],
                );
                for &child in &node.child_ids {
                    self.walk(child, parent_transform, layer_id, parent_node_list, output)?;
                }
            }
            Node::Shape(node) => {
                warn_extra_attributes(
                    format_args!("shape node #{id}"),
                    &node.attributes,
                    &["_name", "_hidden"],
                );
                for (sm_index, shape_model) in node.models.iter().enumerate() {
                    warn_extra_attributes(
                        format_args!("shape model #{sm_index} in node #{id}"),
                        &shape_model.attributes,
                        &["_f"],
                    );
                    let model_id = shape_model.model_id;
                    let exists = usize::try_from(model_id)
                        .is_ok_and(|index| index < self.model.frames.len());
                    if !exists {
                        return Err(SceneError::MissingModel(model_id));
                    }
                    output.push(SceneInstance {
                        shape_id: node.id,
                        model_id,
                        transform: parent_transform,
                        layer_id,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Used for cycle detection when walking the scene graph.
struct ParentList<'a> {
    id: i32,
    parent: Option<&'a ParentList<'a>>,
}

impl<'a> ParentList<'a> {
    const MAX_DEPTH: u32 = 100;

    fn cycle_and_depth_check(list: Option<&'a Self>, id: i32) -> Result<Self, SceneError> {
        if let Some(list) = list {
            list.check_inner(id, Self::MAX_DEPTH)?;
        }
        Ok(ParentList { id, parent: list })
    }

    fn check_inner(&self, id: i32, max_depth: u32) -> Result<(), SceneError> {
        if self.id == id {
            Err(SceneError::SceneGraphCycle(id))
        } else if let Some(parent) = self.parent {
            parent.check_inner(
                id,
                max_depth
                    .checked_sub(1)
                    .ok_or(SceneError::SceneGraphRecursion)?,
            )
        } else {
            Ok(())
        }
    }
}
