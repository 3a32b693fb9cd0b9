//! Engine for a multi-planar medical image viewer: volume + slice-index
//! state, orthogonal slice extraction with fixed anatomical orientation
//! conventions, and real-time brightness/contrast remapping, plus the
//! ingestion paths that turn decoded DICOM slice stacks or NIfTI volumes
//! into displayable 8-bit data.
//!
//! The engine is UI-free and single-threaded: a GUI shell owns a
//! [`VolumeStore`] and re-invokes extraction and adjustment on every
//! slider, click, or load event.

pub mod dataset;
pub mod error;
pub mod frames;
pub mod ingest;
pub mod intensity;
pub mod slice;
pub mod volume;

pub use error::ViewerError;
pub use intensity::{adjust, DisplayParams};
pub use slice::{extract, extract_all, PlanarSlice};
pub use volume::{Plane, SliceIndices, VolumeStore};
