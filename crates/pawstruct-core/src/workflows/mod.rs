//! # Workflows Module
//!
//! High-level entry points that run the engine collectors over a sequence of snapshots.
//! A trajectory reader produces one [`series::FrameSelection`] per snapshot. The workflow
//! pools the raw distances or angles, or summarizes per-frame hydrogen-bond counts, for a
//! histogram or statistics stage downstream.

pub mod series;
