//! # PAW Structure Core Library
//!
//! Periodic-boundary neighbor search and geometric criteria for post-processing atomic
//! snapshots of molecular simulations: distances for radial distribution functions,
//! triplet angles for angular distribution functions, and hydrogen-bond counting.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`AtomSet`, `Cell`), periodic image
//!   replication, and the elementary geometry kernel.
//!
//! - **[`engine`]: The Logic Core.** Validated cutoff criteria, progress and cancellation
//!   reporting, and the per-snapshot collectors (`radial`, `angular`, `hbonds`, `neighbors`).
//!
//! - **[`workflows`]: The Public API.** Multi-snapshot drivers that run a collector over a
//!   sequence of frames and pool or summarize the results.
//!
//! All collectors brute-force a single shell of 27 periodic images. Cutoffs are expected to
//! stay below half the shortest perpendicular width of the cell.

pub mod core;
pub mod engine;
pub mod workflows;
