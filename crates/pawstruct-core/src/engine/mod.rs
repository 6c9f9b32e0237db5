//! # Engine Module
//!
//! The per-snapshot analysis layer. It turns validated inputs from [`crate::core`] into flat
//! numeric results.
//!
//! - [`config`] holds the immutable cutoff criteria and the TOML preset loader.
//! - [`progress`] reports progress through an optional callback and carries a cooperative
//!   cancellation flag that is checked between centers.
//! - [`tasks`] contains the collectors themselves: radial distances, triplet angles,
//!   hydrogen-bond counting and per-center neighbor lists.
//!
//! Every task is a pure function of its inputs. With the `parallel` feature the loop over
//! centers is distributed with Rayon, and results are gathered in center order, so the output
//! does not depend on the thread count.

pub mod config;
pub mod error;
pub mod progress;
pub mod tasks;
