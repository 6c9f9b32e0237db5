use super::error::InputError;
use super::models::atoms::AtomSet;
use nalgebra::{Matrix3, Point3, Vector3};
use std::fmt;
use std::str::FromStr;

/// Which boundary description a [`Cell`] carries. Always chosen by the caller, never inferred
/// from the number of values supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryMode {
    Triclinic,
    Cubic,
}

impl BoundaryMode {
    /// Number of flat values a cell description of this mode consists of.
    pub const fn value_count(self) -> usize {
        match self {
            BoundaryMode::Triclinic => 9,
            BoundaryMode::Cubic => 1,
        }
    }
}

impl fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryMode::Triclinic => write!(f, "triclinic"),
            BoundaryMode::Cubic => write!(f, "cubic"),
        }
    }
}

impl FromStr for BoundaryMode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "triclinic" => Ok(BoundaryMode::Triclinic),
            "cubic" => Ok(BoundaryMode::Cubic),
            _ => Err(InputError::UnknownBoundaryMode(s.to_string())),
        }
    }
}

/// Periodic unit cell.
///
/// `Triclinic` stores the three lattice vectors as matrix rows (`a`, `b`, `c`), matching the
/// row-major flat layout `[ax, ay, az, bx, by, bz, cx, cy, cz]`. `Cubic` stores a single lattice
/// constant shared by all three axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Triclinic(Matrix3<f64>),
    Cubic(f64),
}

impl Cell {
    pub fn triclinic(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> Self {
        Cell::Triclinic(Matrix3::from_rows(&[
            a.transpose(),
            b.transpose(),
            c.transpose(),
        ]))
    }

    pub fn cubic(lattice_constant: f64) -> Self {
        Cell::Cubic(lattice_constant)
    }

    pub fn from_flat(mode: BoundaryMode, values: &[f64]) -> Result<Self, InputError> {
        let expected = mode.value_count();
        if values.len() != expected {
            return Err(InputError::CellLength {
                mode,
                expected,
                found: values.len(),
            });
        }
        Ok(match mode {
            BoundaryMode::Triclinic => Cell::Triclinic(Matrix3::from_row_slice(values)),
            BoundaryMode::Cubic => Cell::Cubic(values[0]),
        })
    }

    pub fn mode(&self) -> BoundaryMode {
        match self {
            Cell::Triclinic(_) => BoundaryMode::Triclinic,
            Cell::Cubic(_) => BoundaryMode::Cubic,
        }
    }

    pub fn lattice_vectors(&self) -> [Vector3<f64>; 3] {
        match self {
            Cell::Triclinic(m) => [
                m.row(0).transpose(),
                m.row(1).transpose(),
                m.row(2).transpose(),
            ],
            Cell::Cubic(a) => [Vector3::x() * *a, Vector3::y() * *a, Vector3::z() * *a],
        }
    }

    /// Translation `i·a + j·b + k·c` for an integer lattice shift.
    #[inline]
    pub fn translation(&self, shift: [i8; 3]) -> Vector3<f64> {
        let [i, j, k] = shift.map(f64::from);
        match self {
            Cell::Triclinic(m) => m.transpose() * Vector3::new(i, j, k),
            Cell::Cubic(a) => Vector3::new(a * i, a * j, a * k),
        }
    }

    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.lattice_vectors();
        a.dot(&b.cross(&c)).abs()
    }

    /// Half of the smallest perpendicular width of the cell.
    ///
    /// A single shell of images finds every neighbor within this radius. Longer cutoffs
    /// silently miss neighbors that live two or more cells away. Returns zero for a
    /// degenerate cell.
    pub fn minimum_image_radius(&self) -> f64 {
        let volume = self.volume();
        if volume == 0.0 {
            return 0.0;
        }
        let [a, b, c] = self.lattice_vectors();
        [b.cross(&c), c.cross(&a), a.cross(&b)]
            .iter()
            .map(|face| volume / face.norm())
            .fold(f64::INFINITY, f64::min)
            / 2.0
    }

    /// Folds every position into the primary cell, fractional coordinates in `[0, 1)`.
    ///
    /// Replication never folds on its own; this is for callers whose coordinates have drifted
    /// several cells away from the origin.
    pub fn wrap(&self, atoms: &AtomSet) -> Result<AtomSet, InputError> {
        let basis = match self {
            Cell::Triclinic(m) => m.transpose(),
            Cell::Cubic(a) => Matrix3::from_diagonal_element(*a),
        };
        let inverse = basis.try_inverse().ok_or(InputError::DegenerateCell)?;

        Ok(atoms
            .iter()
            .map(|p| {
                let fractional = (inverse * p.coords).map(fold_unit);
                Point3::from(basis * fractional)
            })
            .collect())
    }
}

#[inline]
fn fold_unit(x: f64) -> f64 {
    let folded = x - x.floor();
    // Tiny negative inputs round up to exactly 1.0.
    if folded >= 1.0 { 0.0 } else { folded }
}
