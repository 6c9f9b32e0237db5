//! # Core Module
//!
//! Fundamental building blocks shared by every collector.
//!
//! - **Input models** ([`models`]) - Flat coordinate arrays parsed into typed positions
//! - **Periodic boundaries** ([`cell`]) - Lattice descriptions, folding and image radius
//! - **Periodic images** ([`images`]) - The fixed-order 27-image shell of an atom set
//! - **Geometry** ([`geometry`]) - Distance vectors, norms and vertex angles
//! - **Errors** ([`error`]) - Malformed-input reporting

pub mod cell;
pub mod error;
pub mod geometry;
pub mod images;
pub mod models;
