use euclid::{Point3D, Size3D, Vector3D, point3, size3};

// -------------------------------------------------------------------------------------------------

/// Unit of measure for [`euclid`] types addressing the cells of a [`VoxelFrame`].
///
/// [`VoxelFrame`]: crate::VoxelFrame
#[derive(Debug)]
#[allow(clippy::exhaustive_enums)]
pub enum Cell {}

/// Width, height, and depth of a [`VoxelFrame`](crate::VoxelFrame).
pub type FrameSize = Size3D<u16, Cell>;

/// Position of a cell within a [`VoxelFrame`](crate::VoxelFrame).
///
/// Signed, so that positions computed from file data may be out of bounds rather than
/// overflowing.
pub type CellPoint = Point3D<i32, Cell>;

/// Translation in units of cells, as used by scene transforms.
pub type CellVector = Vector3D<i32, Cell>;

/// Largest size of any axis of a model.
pub(crate) const MAX_DIMENSION: u16 = 256;

/// Which coordinate system decoded frames are stored in.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum CoordinateConvention {
    /// Coordinates exactly as stored in the file: right-handed, Z up.
    #[default]
    Native,

    /// Y up, as used by engines such as Unity.
    ///
    /// Frame height and depth are exchanged. A stored voxel `(x, y, z)` is placed at
    /// `(width - 1 - x, z, depth - 1 - y)`.
    YUp,
}

impl CoordinateConvention {
    /// Converts a model size as stored in a `SIZE` chunk to the size of the frame.
    ///
    /// Returns [`None`] if any dimension is outside of `1..=256`.
    pub(crate) fn frame_size(self, [x, y, z]: [i32; 3]) -> Option<FrameSize> {
        let dimension = |value: i32| {
            u16::try_from(value)
                .ok()
                .filter(|&d| (1..=MAX_DIMENSION).contains(&d))
        };
        let (x, y, z) = (dimension(x)?, dimension(y)?, dimension(z)?);
        Some(match self {
            Self::Native => size3(x, y, z),
            Self::YUp => size3(x, z, y),
        })
    }

    /// Converts a voxel position as stored in an `XYZI` chunk to a position in the frame,
    /// whose size has already been converted by [`Self::frame_size()`].
    ///
    /// The result is not necessarily within the bounds of the frame.
    pub(crate) fn cell(self, frame_size: FrameSize, [x, y, z]: [u8; 3]) -> CellPoint {
        let (x, y, z) = (i32::from(x), i32::from(y), i32::from(z));
        match self {
            Self::Native => point3(x, y, z),
            Self::YUp => point3(
                i32::from(frame_size.width) - 1 - x,
                z,
                i32::from(frame_size.depth) - 1 - y,
            ),
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn frame_size_native() {
        assert_eq!(
            CoordinateConvention::Native.frame_size([2, 3, 4]),
            Some(size3(2, 3, 4))
        );
    }

    #[test]
    fn frame_size_y_up_swaps_height_and_depth() {
        assert_eq!(
            CoordinateConvention::YUp.frame_size([2, 3, 4]),
            Some(size3(2, 4, 3))
        );
    }

    #[test]
    fn frame_size_range() {
        let c = CoordinateConvention::Native;
        assert_eq!(c.frame_size([256, 1, 256]), Some(size3(256, 1, 256)));
        assert_eq!(c.frame_size([0, 1, 1]), None);
        assert_eq!(c.frame_size([1, 257, 1]), None);
        assert_eq!(c.frame_size([1, 1, -1]), None);
        assert_eq!(c.frame_size([1, 1, i32::MAX]), None);
    }

    #[test]
    fn cell_transform() {
        let size = CoordinateConvention::YUp.frame_size([100, 200, 250]).unwrap();
        assert_eq!(size, size3(100, 250, 200));

        assert_eq!(
            CoordinateConvention::YUp.cell(size, [10, 20, 30]),
            point3(89, 30, 179)
        );
        assert_eq!(
            CoordinateConvention::Native.cell(size, [10, 20, 30]),
            point3(10, 20, 30)
        );
    }

    /// Every stored position within the model lands within the converted frame.
    #[test]
    fn cell_transform_stays_in_bounds() {
        let convention = CoordinateConvention::YUp;
        let size = convention.frame_size([2, 3, 4]).unwrap();
        for x in 0..2 {
            for y in 0..3 {
                for z in 0..4 {
                    let cell = convention.cell(size, [x, y, z]);
                    assert!(
                        (0..i32::from(size.width)).contains(&cell.x)
                            && (0..i32::from(size.height)).contains(&cell.y)
                            && (0..i32::from(size.depth)).contains(&cell.z),
                        "{:?} -> {cell:?}",
                        [x, y, z]
                    );
                }
            }
        }
    }
}
