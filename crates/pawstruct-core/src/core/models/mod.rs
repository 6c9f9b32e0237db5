//! Typed views over the flat coordinate arrays handed in by callers.
//!
//! Callers describe atoms as flat `[x0, y0, z0, x1, y1, z1, ...]` sequences. [`atoms::AtomSet`]
//! validates that layout once, so every collector downstream can work on `Point3` values
//! without re-checking shapes.

pub mod atoms;
