use std::fmt;

use ndarray::{Array, Array2, Array3, ArrayD, Axis, Dimension};

use crate::error::ViewerError;

/// DICOM rescale pair, applied as `slope * value + intercept` before
/// normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub slope: f32,
    pub intercept: f32,
}

impl Rescale {
    #[inline]
    pub fn apply(&self, value: f32) -> f32 {
        value * self.slope + self.intercept
    }
}

/// One decoded slice as handed over by an external decoder.
#[derive(Debug, Clone)]
pub struct RawSlice {
    pub pixels: Array2<f32>,
    pub rescale: Option<Rescale>,
}

/// Observer for long-running multi-file loads. `report` is called after
/// each slice is processed; `is_cancelled` is polled before each one.
pub trait ProgressSink {
    fn report(&mut self, current: usize, total: usize);

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Progress sink that discards everything and never cancels.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _current: usize, _total: usize) {}
}

/// Result of stacking a slice sequence into a volume.
#[derive(Debug)]
pub struct StackedVolume {
    pub volume: Array3<u8>,
    /// Slices dropped along the way (decode failures, shape mismatches).
    pub skipped: usize,
}

/// Min-max stretch to the full 8-bit range. A constant (or empty) input
/// maps to all zeros instead of failing; a degenerate range is never an
/// error.
fn stretch<D: Dimension>(values: &Array<f32, D>) -> Array<u8, D> {
    let min = values.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    if max > min {
        values.mapv(|v| ((v - min) * 255.0 / (max - min)) as u8)
    } else {
        Array::zeros(values.raw_dim())
    }
}

/// Normalize a single decoded slice to 8 bits: rescale slope/intercept
/// first when present, then a min-max stretch over this slice alone.
pub fn normalize_slice(raw: &RawSlice) -> Array2<u8> {
    match raw.rescale {
        Some(rescale) => stretch(&raw.pixels.mapv(|v| rescale.apply(v))),
        None => stretch(&raw.pixels),
    }
}

/// Min-max normalize one grayscale frame (playback and tiling path; no
/// rescale pre-step).
pub fn normalize_frame(pixels: &Array2<f32>) -> Array2<u8> {
    stretch(pixels)
}

/// Stack a sequence of decoded slices into a volume, slice index = axis 0.
///
/// Each slice is normalized independently of its neighbors. Slices that
/// failed to decode, or whose shape differs from the first accepted slice,
/// are logged and skipped; the skip count is reported back. Zero usable
/// slices is a fatal [`ViewerError::NoValidSlices`]. Cancellation is
/// checked before every slice and aborts with [`ViewerError::Cancelled`],
/// leaving the caller's previous volume untouched.
pub fn stack_slices<I, E>(
    slices: I,
    progress: &mut dyn ProgressSink,
) -> Result<StackedVolume, ViewerError>
where
    I: ExactSizeIterator<Item = Result<RawSlice, E>>,
    E: fmt::Display,
{
    let total = slices.len();
    let mut accepted: Vec<Array2<u8>> = Vec::new();
    let mut shape: Option<(usize, usize)> = None;
    let mut skipped = 0usize;

    for (i, item) in slices.enumerate() {
        if progress.is_cancelled() {
            return Err(ViewerError::Cancelled {
                loaded: accepted.len(),
                total,
            });
        }
        match item {
            Ok(raw) => {
                let dim = raw.pixels.dim();
                match shape {
                    _ if dim.0 == 0 || dim.1 == 0 => {
                        log::warn!("skipping slice {i}: empty pixel data");
                        skipped += 1;
                    }
                    Some(first) if first != dim => {
                        log::warn!(
                            "skipping slice {i}: shape {dim:?} differs from first slice {first:?}"
                        );
                        skipped += 1;
                    }
                    _ => {
                        shape = Some(dim);
                        accepted.push(normalize_slice(&raw));
                    }
                }
            }
            Err(e) => {
                log::warn!("skipping slice {i}: {e}");
                skipped += 1;
            }
        }
        progress.report(i + 1, total);
    }

    if accepted.is_empty() {
        return Err(ViewerError::NoValidSlices { skipped });
    }
    let (h, w) = accepted[0].dim();
    let mut volume = Array3::zeros((accepted.len(), h, w));
    for (i, slice) in accepted.iter().enumerate() {
        volume.index_axis_mut(Axis(0), i).assign(slice);
    }
    Ok(StackedVolume { volume, skipped })
}

/// Ingest a decoded NIfTI volume: permute the native `(x, y, z)` axes into
/// `(axial, sagittal, coronal)` order via `(2, 0, 1)`, then one min-max
/// stretch over the whole volume.
///
/// Unlike the slice-stack path there is no per-slice renormalization, so
/// the two ingestion paths do not produce comparable absolute intensities.
pub fn from_nifti(volume: Array3<f32>) -> Result<Array3<u8>, ViewerError> {
    let (x, y, z) = volume.dim();
    if x == 0 || y == 0 || z == 0 {
        return Err(ViewerError::InvalidVolume {
            reason: format!("empty axis in NIfTI shape ({x}, {y}, {z})"),
        });
    }
    let reordered = volume.permuted_axes([2, 0, 1]);
    Ok(stretch(&reordered))
}

/// Reduce one frame to a 2-D grayscale array.
///
/// An HxWx3 color frame collapses through the standard luma weights
/// (0.2989 R + 0.5870 G + 0.1140 B); singleton axes are squeezed away
/// otherwise. Anything that does not end up 2-D is
/// [`ViewerError::UnsupportedFrameShape`].
pub fn frame_to_grayscale(frame: &ArrayD<f32>) -> Result<Array2<f32>, ViewerError> {
    if frame.ndim() == 3 && frame.shape()[2] == 3 {
        let (h, w) = (frame.shape()[0], frame.shape()[1]);
        return Ok(Array2::from_shape_fn((h, w), |(r, c)| {
            0.2989 * frame[[r, c, 0]] + 0.5870 * frame[[r, c, 1]] + 0.1140 * frame[[r, c, 2]]
        }));
    }
    let squeezed: Vec<usize> = frame.shape().iter().copied().filter(|&d| d != 1).collect();
    match squeezed[..] {
        [h, w] => {
            let data: Vec<f32> = frame.iter().copied().collect();
            Array2::from_shape_vec((h, w), data).map_err(|_| ViewerError::UnsupportedFrameShape {
                shape: frame.shape().to_vec(),
            })
        }
        _ => Err(ViewerError::UnsupportedFrameShape {
            shape: frame.shape().to_vec(),
        }),
    }
}
