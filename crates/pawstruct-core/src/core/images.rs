use super::cell::Cell;
use super::models::atoms::AtomSet;
use nalgebra::Point3;

/// Number of periodic images in a single shell, including the original cell.
pub const IMAGE_COUNT: usize = 27;

/// Block index of the zero translation `(0, 0, 0)` in the fixed enumeration order.
pub const PRIMARY_IMAGE: usize = 13;

/// Lattice shift of image block `block`, enumerated with `i` outermost and `k` innermost.
#[inline]
pub const fn image_shift(block: usize) -> [i8; 3] {
    [
        (block / 9) as i8 - 1,
        ((block / 3) % 3) as i8 - 1,
        (block % 3) as i8 - 1,
    ]
}

/// The 27 periodic images of an [`AtomSet`], stored block by block.
///
/// Position `j` belongs to image block `j / n` and is a copy of source atom `j % n`, where `n`
/// is the number of source atoms. Block [`PRIMARY_IMAGE`] is the untranslated input.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicImageSet {
    positions: Vec<Point3<f64>>,
    source_len: usize,
}

impl PeriodicImageSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// The zero-translation block, identical to the replicated input.
    pub fn primary(&self) -> &[Point3<f64>] {
        let start = PRIMARY_IMAGE * self.source_len;
        &self.positions[start..start + self.source_len]
    }

    #[inline]
    pub fn source_index(&self, image: usize) -> usize {
        image % self.source_len
    }

    #[inline]
    pub fn shift(&self, image: usize) -> [i8; 3] {
        image_shift(image / self.source_len)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point3<f64>> {
        self.positions.iter()
    }

    pub fn to_flat(&self) -> Vec<f64> {
        self.positions
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect()
    }
}

/// Translates `atoms` by every shift in `{-1, 0, 1}³` of the cell's lattice vectors.
///
/// Positions are taken as given, without folding into the primary cell. Cell degeneracy is
/// not checked.
pub fn replicate(atoms: &AtomSet, cell: &Cell) -> PeriodicImageSet {
    let mut positions = Vec::with_capacity(IMAGE_COUNT * atoms.len());
    for block in 0..IMAGE_COUNT {
        let translation = cell.translation(image_shift(block));
        positions.extend(atoms.iter().map(|p| p + translation));
    }
    PeriodicImageSet {
        positions,
        source_len: atoms.len(),
    }
}

impl Cell {
    pub fn replicate(&self, atoms: &AtomSet) -> PeriodicImageSet {
        replicate(atoms, self)
    }
}
