use crate::core::error::InputError;
use nalgebra::Point3;

/// An ordered set of atomic positions. Order is preserved in every center-indexed output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtomSet {
    positions: Vec<Point3<f64>>,
}

impl AtomSet {
    pub fn new(positions: Vec<Point3<f64>>) -> Self {
        Self { positions }
    }

    /// Parses a flat `[x, y, z, x, y, z, ...]` array.
    pub fn from_flat(values: &[f64]) -> Result<Self, InputError> {
        if values.len() % 3 != 0 {
            return Err(InputError::CoordinateLength { len: values.len() });
        }
        let positions = values
            .chunks_exact(3)
            .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
            .collect();
        Ok(Self { positions })
    }

    pub fn to_flat(&self) -> Vec<f64> {
        self.positions
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point3<f64>> {
        self.positions.iter()
    }
}

impl From<Vec<Point3<f64>>> for AtomSet {
    fn from(positions: Vec<Point3<f64>>) -> Self {
        Self::new(positions)
    }
}

impl FromIterator<Point3<f64>> for AtomSet {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AtomSet {
    type Item = &'a Point3<f64>;
    type IntoIter = std::slice::Iter<'a, Point3<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
