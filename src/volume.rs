use std::fmt;
use std::ops::RangeInclusive;

use ndarray::Array3;

use crate::error::ViewerError;

/// One of the three canonical anatomical planes. Each plane slices the
/// volume along one axis: axial = 0, sagittal = 1, coronal = 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    Axial,
    Sagittal,
    Coronal,
}

impl Plane {
    pub const ALL: [Plane; 3] = [Plane::Axial, Plane::Sagittal, Plane::Coronal];

    /// The volume axis this plane is indexed along.
    #[inline]
    pub fn axis(self) -> usize {
        match self {
            Plane::Axial => 0,
            Plane::Sagittal => 1,
            Plane::Coronal => 2,
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Plane::Axial => "axial",
            Plane::Sagittal => "sagittal",
            Plane::Coronal => "coronal",
        };
        f.write_str(name)
    }
}

/// The current slice index along each axis. Always within the bounds of
/// the volume it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceIndices {
    pub axial: usize,
    pub sagittal: usize,
    pub coronal: usize,
}

impl SliceIndices {
    #[inline]
    pub fn get(&self, plane: Plane) -> usize {
        match plane {
            Plane::Axial => self.axial,
            Plane::Sagittal => self.sagittal,
            Plane::Coronal => self.coronal,
        }
    }

    #[inline]
    fn set(&mut self, plane: Plane, value: usize) {
        match plane {
            Plane::Axial => self.axial = value,
            Plane::Sagittal => self.sagittal = value,
            Plane::Coronal => self.coronal = value,
        }
    }
}

/// Owns the loaded voxel volume together with the slice-index triple and
/// the per-plane crosshairs.
///
/// The voxel data itself is never mutated; loading a new volume means
/// constructing a new store, which also resets the indices to the axis
/// midpoints and clears all crosshairs.
#[derive(Debug)]
pub struct VolumeStore {
    volume: Array3<u8>,
    indices: SliceIndices,
    crosshairs: [Option<(usize, usize)>; 3],
}

impl VolumeStore {
    /// Wrap a normalized 8-bit volume. Fails if any axis is empty.
    pub fn new(volume: Array3<u8>) -> Result<Self, ViewerError> {
        let (d0, d1, d2) = volume.dim();
        if d0 == 0 || d1 == 0 || d2 == 0 {
            return Err(ViewerError::InvalidVolume {
                reason: format!("empty axis in shape ({d0}, {d1}, {d2})"),
            });
        }
        Ok(Self {
            indices: SliceIndices {
                axial: d0 / 2,
                sagittal: d1 / 2,
                coronal: d2 / 2,
            },
            crosshairs: [None; 3],
            volume,
        })
    }

    #[inline]
    pub fn volume(&self) -> &Array3<u8> {
        &self.volume
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        self.volume.dim()
    }

    #[inline]
    fn extent(&self, plane: Plane) -> usize {
        self.volume.shape()[plane.axis()]
    }

    /// Valid index range for a plane, for slider setup and caller-side
    /// clamping.
    pub fn bounds(&self, plane: Plane) -> RangeInclusive<usize> {
        0..=self.extent(plane) - 1
    }

    #[inline]
    pub fn index(&self, plane: Plane) -> usize {
        self.indices.get(plane)
    }

    #[inline]
    pub fn indices(&self) -> SliceIndices {
        self.indices
    }

    /// Update one slice index. Out-of-range values are rejected and the
    /// prior index is left unchanged.
    pub fn set_index(&mut self, plane: Plane, value: usize) -> Result<(), ViewerError> {
        let len = self.extent(plane);
        if value >= len {
            return Err(ViewerError::IndexOutOfRange {
                plane,
                index: value,
                len,
            });
        }
        self.indices.set(plane, value);
        Ok(())
    }

    fn set_if_in_bounds(&mut self, plane: Plane, value: usize) {
        if value < self.extent(plane) {
            self.indices.set(plane, value);
        }
    }

    /// Handle a click at displayed pixel `(x, y)` on the given plane:
    /// the other two indices follow the click coordinates, and the clicked
    /// plane records `(x, y)` as its crosshair.
    ///
    /// A coordinate outside the target axis's bounds is ignored for that
    /// axis only. Note that the crosshair is recorded on the clicked plane
    /// itself and the other two planes are left untouched; this mirrors the
    /// behavior the sliders and redraw loop were built around.
    pub fn click(&mut self, plane: Plane, x: usize, y: usize) {
        match plane {
            Plane::Axial => {
                self.set_if_in_bounds(Plane::Sagittal, y);
                self.set_if_in_bounds(Plane::Coronal, x);
            }
            Plane::Sagittal => {
                self.set_if_in_bounds(Plane::Axial, y);
                self.set_if_in_bounds(Plane::Coronal, x);
            }
            Plane::Coronal => {
                self.set_if_in_bounds(Plane::Sagittal, x);
                self.set_if_in_bounds(Plane::Axial, y);
            }
        }
        self.crosshairs[plane.axis()] = Some((x, y));
    }

    /// The recorded crosshair for a plane, if any click has landed there
    /// since the volume was loaded.
    #[inline]
    pub fn crosshair(&self, plane: Plane) -> Option<(usize, usize)> {
        self.crosshairs[plane.axis()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn store(d0: usize, d1: usize, d2: usize) -> VolumeStore {
        VolumeStore::new(Array3::zeros((d0, d1, d2))).unwrap()
    }

    #[test]
    fn rejects_empty_axis() {
        for shape in [(0, 4, 4), (4, 0, 4), (4, 4, 0), (0, 0, 0)] {
            let err = VolumeStore::new(Array3::zeros(shape)).unwrap_err();
            assert!(matches!(err, ViewerError::InvalidVolume { .. }));
        }
    }

    #[test]
    fn indices_start_at_midpoints() {
        let s = store(5, 8, 13);
        assert_eq!(
            s.indices(),
            SliceIndices {
                axial: 2,
                sagittal: 4,
                coronal: 6
            }
        );
        // Single-slice axes land on index 0.
        let s = store(1, 1, 1);
        assert_eq!(s.indices().axial, 0);
        assert_eq!(s.bounds(Plane::Axial), 0..=0);
    }

    #[test]
    fn set_index_validates_and_preserves_prior_value() {
        let mut s = store(4, 4, 4);
        s.set_index(Plane::Sagittal, 3).unwrap();
        assert_eq!(s.index(Plane::Sagittal), 3);

        let err = s.set_index(Plane::Sagittal, 4).unwrap_err();
        assert_eq!(
            err,
            ViewerError::IndexOutOfRange {
                plane: Plane::Sagittal,
                index: 4,
                len: 4
            }
        );
        assert_eq!(s.index(Plane::Sagittal), 3);
    }

    #[test]
    fn click_maps_coordinates_per_plane() {
        let mut s = store(6, 7, 8);

        s.click(Plane::Axial, 3, 5);
        assert_eq!(s.index(Plane::Sagittal), 5);
        assert_eq!(s.index(Plane::Coronal), 3);

        s.click(Plane::Sagittal, 2, 4);
        assert_eq!(s.index(Plane::Axial), 4);
        assert_eq!(s.index(Plane::Coronal), 2);

        s.click(Plane::Coronal, 6, 1);
        assert_eq!(s.index(Plane::Sagittal), 6);
        assert_eq!(s.index(Plane::Axial), 1);
    }

    #[test]
    fn click_ignores_out_of_bounds_axes_independently() {
        let mut s = store(4, 4, 4);
        // y is valid for sagittal, x is too large for coronal: only the
        // sagittal index moves.
        s.click(Plane::Axial, 9, 1);
        assert_eq!(s.index(Plane::Sagittal), 1);
        assert_eq!(s.index(Plane::Coronal), 2);
    }

    #[test]
    fn click_records_crosshair_only_on_clicked_plane() {
        let mut s = store(4, 4, 4);
        assert_eq!(s.crosshair(Plane::Axial), None);

        s.click(Plane::Axial, 1, 2);
        assert_eq!(s.crosshair(Plane::Axial), Some((1, 2)));
        assert_eq!(s.crosshair(Plane::Sagittal), None);
        assert_eq!(s.crosshair(Plane::Coronal), None);

        s.click(Plane::Coronal, 3, 0);
        assert_eq!(s.crosshair(Plane::Coronal), Some((3, 0)));
        assert_eq!(s.crosshair(Plane::Axial), Some((1, 2)));
    }
}
