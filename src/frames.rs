use ndarray::{Array2, ArrayD};

use crate::error::ViewerError;
use crate::ingest::{frame_to_grayscale, normalize_frame};

/// Cursor over a multi-frame stack for timer-driven playback. Each tick
/// is one atomic call; the player never blocks or overlaps ticks.
pub struct FramePlayer {
    frames: Vec<ArrayD<f32>>,
    cursor: usize,
}

impl FramePlayer {
    pub fn new(frames: Vec<ArrayD<f32>>) -> Self {
        Self { frames, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index of the frame the next tick will produce.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Produce the next display frame.
    ///
    /// `None` once the cursor has passed the frame count — a stop signal
    /// for the driving timer, not an error. A frame that does not reduce
    /// to grayscale yields `Some(Err(..))`; the caller logs it and keeps
    /// ticking.
    pub fn tick(&mut self) -> Option<Result<Array2<u8>, ViewerError>> {
        let frame = self.frames.get(self.cursor)?;
        self.cursor += 1;
        match frame_to_grayscale(frame) {
            Ok(gray) => Some(Ok(normalize_frame(&gray))),
            Err(e) => {
                log::warn!("skipping frame {}: {e}", self.cursor - 1);
                Some(Err(e))
            }
        }
    }
}

/// Normalized thumbnails for the tile view.
#[derive(Debug)]
pub struct TileSet {
    pub tiles: Vec<Array2<u8>>,
    pub skipped: usize,
}

/// Normalize every frame of a stack for tiled display, skipping frames
/// with unsupported shapes.
pub fn tiles(frames: &[ArrayD<f32>]) -> TileSet {
    let mut tiles = Vec::with_capacity(frames.len());
    let mut skipped = 0usize;
    for (i, frame) in frames.iter().enumerate() {
        match frame_to_grayscale(frame) {
            Ok(gray) => tiles.push(normalize_frame(&gray)),
            Err(e) => {
                log::warn!("skipping tile {i}: {e}");
                skipped += 1;
            }
        }
    }
    TileSet { tiles, skipped }
}
