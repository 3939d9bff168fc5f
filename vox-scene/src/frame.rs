use euclid::point3;

use crate::coord::{CellPoint, FrameSize};

/// Palette index meaning “no voxel here”.
pub const EMPTY: u8 = 0;

/// A dense 3D grid of palette indices: one model, or one animation frame of a model.
///
/// Frames declared by a `PACK` chunk but never given a `SIZE` have zero size and contain
/// nothing.
///
/// Cell storage is not allocated until the first non-empty cell is stored, so a frame which
/// never receives voxels costs no more than its size.
/// Cells are stored in Z-major order: linearly adjacent elements have adjacent Z coordinates.
#[derive(Clone, Debug, Default)]
pub struct VoxelFrame {
    size: FrameSize,
    /// Invariant: either empty or of length equal to the volume of `size`.
    cells: Box<[u8]>,
}

impl VoxelFrame {
    /// Constructs an empty frame of the given size, without allocating storage for its cells.
    pub(crate) fn new(size: FrameSize) -> Self {
        Self {
            size,
            cells: Box::default(),
        }
    }

    /// The size of this frame, after any coordinate convention conversion.
    pub fn size(&self) -> FrameSize {
        self.size
    }

    /// Whether this frame was given a size by a `SIZE` chunk.
    pub fn is_sized(&self) -> bool {
        !self.size.is_empty()
    }

    /// Number of cells in this frame.
    pub(crate) fn volume(&self) -> usize {
        self.size.to_usize().volume()
    }

    /// Whether storage for the cells has been allocated.
    pub(crate) fn has_storage(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Allocates storage for every cell, if not already done.
    pub(crate) fn allocate(&mut self) {
        if !self.has_storage() {
            self.cells = vec![EMPTY; self.volume()].into_boxed_slice();
        }
    }

    fn index(&self, cell: CellPoint) -> Option<usize> {
        let x = usize::try_from(cell.x).ok()?;
        let y = usize::try_from(cell.y).ok()?;
        let z = usize::try_from(cell.z).ok()?;
        let size = self.size.to_usize();
        if x < size.width && y < size.height && z < size.depth {
            Some((x * size.height + y) * size.depth + z)
        } else {
            None
        }
    }

    /// Returns the palette index at `cell`, or [`None`] if it is out of bounds.
    pub fn get(&self, cell: CellPoint) -> Option<u8> {
        let i = self.index(cell)?;
        Some(self.cells.get(i).copied().unwrap_or(EMPTY))
    }

    /// Returns the palette index at the given coordinates, or [`EMPTY`] if they are
    /// out of bounds.
    pub fn get_safe(&self, x: i32, y: i32, z: i32) -> u8 {
        self.get(point3(x, y, z)).unwrap_or(EMPTY)
    }

    /// Stores a palette index. Returns false and has no effect if `cell` is out of bounds.
    pub(crate) fn set(&mut self, cell: CellPoint, value: u8) -> bool {
        let Some(i) = self.index(cell) else {
            return false;
        };
        if value == EMPTY && !self.has_storage() {
            return true;
        }
        self.allocate();
        if let Some(stored) = self.cells.get_mut(i) {
            *stored = value;
        }
        true
    }

    /// Iterates over all non-empty cells and their palette indices.
    pub fn voxels(&self) -> impl Iterator<Item = (CellPoint, u8)> + '_ {
        let size = self.size.to_i32();
        (0..size.width)
            .flat_map(move |x| (0..size.height).map(move |y| (x, y)))
            .flat_map(move |(x, y)| (0..size.depth).map(move |z| point3(x, y, z)))
            .zip(self.cells.iter().copied())
            .filter(|&(_, value)| value != EMPTY)
    }

    /// Counts the non-empty cells.
    pub fn voxel_count(&self) -> usize {
        self.cells.iter().filter(|&&value| value != EMPTY).count()
    }
}

/// Frames are equal if they have the same size and contents, whether or not storage has
/// been allocated.
impl PartialEq for VoxelFrame {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.voxels().eq(other.voxels())
    }
}

impl Eq for VoxelFrame {}
