use crate::chunk::DecodeContext;
use crate::coord::CoordinateConvention;
use crate::cursor::Cursor;
use crate::diagnostic::DecodeReport;
use crate::error::DecodeError;
use crate::model::VoxModel;

/// The first four bytes of every `.vox` file.
pub const MAGIC: [u8; 4] = *b"VOX ";

/// The format version this decoder is written against.
/// Files with other versions are still decoded, with a
/// [`Diagnostic::VersionMismatch`](crate::Diagnostic::VersionMismatch).
pub const VERSION: i32 = 150;

/// Options for [`decode()`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[expect(clippy::exhaustive_structs)]
pub struct DecodeOptions {
    /// Record a [`ChunkLogEntry`](crate::ChunkLogEntry) for every chunk in
    /// [`DecodeReport::chunk_log`].
    pub write_diagnostic_log: bool,

    /// Check the scene graph for duplicate and orphaned ids after decoding.
    pub run_integrity_checks: bool,

    /// Store frames in [`CoordinateConvention::YUp`] rather than as they are in the file.
    pub alternate_coordinate_convention: bool,

    /// Place the colors of an `RGBA` chunk at palette indices 0 to 254 rather than 1 to 255.
    pub palette_offset: bool,
}

impl DecodeOptions {
    /// The coordinate convention selected by [`Self::alternate_coordinate_convention`].
    pub fn coordinate_convention(self) -> CoordinateConvention {
        if self.alternate_coordinate_convention {
            CoordinateConvention::YUp
        } else {
            CoordinateConvention::Native
        }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            write_diagnostic_log: false,
            run_integrity_checks: false,
            alternate_coordinate_convention: false,
            palette_offset: true,
        }
    }
}

/// Successful result of [`decode()`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum DecodeOutcome {
    /// The input was a `.vox` file.
    Decoded {
        #[allow(missing_docs)]
        model: VoxModel,
        #[allow(missing_docs)]
        report: DecodeReport,
    },
    /// The input does not start with [`MAGIC`], so it is not a `.vox` file.
    NotVox,
}

impl DecodeOutcome {
    /// Returns the model, discarding the report, or [`None`] if the input was not a `.vox` file.
    pub fn into_model(self) -> Option<VoxModel> {
        match self {
            Self::Decoded { model, .. } => Some(model),
            Self::NotVox => None,
        }
    }
}

/// Decodes the complete contents of a `.vox` file.
///
/// Returns [`DecodeOutcome::NotVox`] if `bytes` does not start with [`MAGIC`], and an error if
/// the data is truncated or otherwise structurally invalid. Problems which do not prevent
/// decoding are returned in the [`DecodeReport`].
pub fn decode(bytes: &[u8], options: &DecodeOptions) -> Result<DecodeOutcome, DecodeError> {
    let mut cursor = Cursor::new(bytes);
    if cursor.read_array::<4>().ok() != Some(MAGIC) {
        log::debug!("input does not start with the .vox magic number");
        return Ok(DecodeOutcome::NotVox);
    }
    let version = cursor.read_i32()?;

    let mut context = DecodeContext::new(options, version);
    context.read_chunks(cursor, 0)?;
    let (model, report) = context.finish();
    Ok(DecodeOutcome::Decoded { model, report })
}
