use ndarray::{s, Array2, Array3};

use crate::volume::{Plane, VolumeStore};

/// A 2-D view extracted from the volume, tagged with the plane and the
/// source index it was taken at (for titling).
#[derive(Debug, Clone)]
pub struct PlanarSlice {
    pub plane: Plane,
    pub index: usize,
    pub pixels: Array2<u8>,
}

/// Extract the displayed 2-D image for a plane at the given index.
///
/// The per-plane orientation convention is fixed: the axial slab is taken
/// as-is (row 0 at the top), the sagittal slab is rotated 180° (both axes
/// reversed), and the coronal slab is flipped vertically. These transforms
/// keep anatomical left/right and up/down consistent across the three
/// views, so they must stay in sync with the click mapping in
/// [`VolumeStore::click`].
///
/// A stale `index` past the end of the axis (possible mid volume swap)
/// clamps silently to the last valid slice. The volume must be non-empty
/// on every axis, which [`VolumeStore`] guarantees.
pub fn extract(volume: &Array3<u8>, plane: Plane, index: usize) -> PlanarSlice {
    let len = volume.shape()[plane.axis()];
    let index = index.min(len.saturating_sub(1));
    let pixels = match plane {
        Plane::Axial => volume.slice(s![index, .., ..]).to_owned(),
        Plane::Sagittal => volume
            .slice(s![.., index, ..])
            .slice(s![..;-1, ..;-1])
            .to_owned(),
        Plane::Coronal => volume.slice(s![.., .., index]).slice(s![..;-1, ..]).to_owned(),
    };
    PlanarSlice {
        plane,
        index,
        pixels,
    }
}

/// Extract all three planes at the store's current indices, in
/// axial/sagittal/coronal order.
pub fn extract_all(store: &VolumeStore) -> [PlanarSlice; 3] {
    Plane::ALL.map(|plane| extract(store.volume(), plane, store.index(plane)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// 4x4x4 test volume where voxel (a, r, c) = a*16 + r*4 + c.
    fn graded() -> Array3<u8> {
        Array3::from_shape_fn((4, 4, 4), |(a, r, c)| (a * 16 + r * 4 + c) as u8)
    }

    #[test]
    fn axial_is_raw_slab() {
        let vol = graded();
        let slice = extract(&vol, Plane::Axial, 2);
        assert_eq!(slice.index, 2);
        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(slice.pixels[(r, c)], (32 + r * 4 + c) as u8);
            }
        }
    }

    #[test]
    fn sagittal_is_rotated_180() {
        let vol = graded();
        let slice = extract(&vol, Plane::Sagittal, 1);
        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(slice.pixels[(r, c)], vol[(3 - r, 1, 3 - c)]);
            }
        }
    }

    #[test]
    fn coronal_is_flipped_vertically() {
        let vol = graded();
        let slice = extract(&vol, Plane::Coronal, 0);
        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(slice.pixels[(r, c)], vol[(3 - r, c, 0)]);
            }
        }
    }

    #[test]
    fn display_transforms_are_involutions() {
        let vol = graded();

        let sagittal = extract(&vol, Plane::Sagittal, 2);
        let undone = sagittal.pixels.slice(s![..;-1, ..;-1]).to_owned();
        assert_eq!(undone, vol.slice(s![.., 2, ..]).to_owned());

        let coronal = extract(&vol, Plane::Coronal, 3);
        let undone = coronal.pixels.slice(s![..;-1, ..]).to_owned();
        assert_eq!(undone, vol.slice(s![.., .., 3]).to_owned());
    }

    #[test]
    fn stale_index_clamps_to_last_slice() {
        let vol = graded();
        for plane in Plane::ALL {
            let slice = extract(&vol, plane, 99);
            assert_eq!(slice.index, 3);
        }
    }

    #[test]
    fn non_cubic_shapes_keep_slab_dimensions() {
        let vol = Array3::<u8>::zeros((2, 5, 7));
        assert_eq!(extract(&vol, Plane::Axial, 0).pixels.dim(), (5, 7));
        assert_eq!(extract(&vol, Plane::Sagittal, 0).pixels.dim(), (2, 7));
        assert_eq!(extract(&vol, Plane::Coronal, 0).pixels.dim(), (2, 5));
    }
}
