use super::cell::BoundaryMode;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum InputError {
    #[error("Coordinate array of length {len} cannot be split into xyz triples")]
    CoordinateLength { len: usize },

    #[error("{mode} cell requires {expected} values, got {found}")]
    CellLength {
        mode: BoundaryMode,
        expected: usize,
        found: usize,
    },

    #[error("Cell lattice vectors are linearly dependent")]
    DegenerateCell,

    #[error("Unknown boundary mode '{0}'. Expected 'triclinic' or 'cubic'")]
    UnknownBoundaryMode(String),
}
