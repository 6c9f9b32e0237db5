//! Collectors evaluated on a single snapshot.
//!
//! Each task replicates the partner set into its 27 periodic images and filters every
//! center's candidates against an immutable criterion. Centers are independent, so
//! with the `parallel` feature they are distributed across Rayon workers. Results are gathered
//! back in center order.

pub mod angular;
pub mod coordination;
pub mod hbonds;
pub mod ion_shells;
pub mod neighbors;
pub mod radial;

use crate::core::cell::Cell;
use tracing::warn;

fn warn_if_beyond_minimum_image(cell: &Cell, cutoff: f64) {
    let radius = cell.minimum_image_radius();
    if cutoff >= radius {
        warn!(
            cutoff,
            minimum_image_radius = radius,
            "Cutoff reaches past the minimum-image radius; neighbors beyond the first image shell are missed."
        );
    }
}
