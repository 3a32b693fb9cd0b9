use std::fmt;

use crate::volume::Plane;

/// Errors produced by the volume view engine.
///
/// A degenerate intensity range (min == max) is deliberately absent from
/// this list: a constant slice always normalizes to an all-zero image
/// instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerError {
    /// Voxel data that cannot form a volume (an empty axis, or input that
    /// is not a rank-3 array after ingestion).
    InvalidVolume { reason: String },
    /// A slice index outside `[0, len)` for the given plane's axis.
    IndexOutOfRange {
        plane: Plane,
        index: usize,
        len: usize,
    },
    /// A frame that does not reduce to a 2-D grayscale or HxWx3 color
    /// image.
    UnsupportedFrameShape { shape: Vec<usize> },
    /// A batch load where every slice was skipped.
    NoValidSlices { skipped: usize },
    /// A batch load aborted by its progress observer.
    Cancelled { loaded: usize, total: usize },
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::InvalidVolume { reason } => {
                write!(f, "invalid volume: {reason}")
            }
            ViewerError::IndexOutOfRange { plane, index, len } => {
                write!(
                    f,
                    "{plane} index {index} out of range (valid: 0..{len})"
                )
            }
            ViewerError::UnsupportedFrameShape { shape } => {
                write!(f, "unsupported frame shape {shape:?}")
            }
            ViewerError::NoValidSlices { skipped } => {
                write!(f, "no valid slices could be loaded ({skipped} skipped)")
            }
            ViewerError::Cancelled { loaded, total } => {
                write!(f, "load cancelled after {loaded} of {total} slices")
            }
        }
    }
}

impl std::error::Error for ViewerError {}
