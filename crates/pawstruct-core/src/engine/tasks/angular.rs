use crate::core::cell::Cell;
use crate::core::geometry::{angle_at_vertex, distance};
use crate::core::images::replicate;
use crate::core::models::atoms::AtomSet;
use crate::engine::config::NeighborCriterion;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use itertools::Itertools;
use nalgebra::Point3;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Triplet angles `neighbor_m – center – neighbor_n` in degrees for every unordered pair of
/// accepted neighbor images around each center.
///
/// A center with `k` accepted neighbors contributes exactly `k(k-1)/2` angles. The full
/// neighbor shell of a center is gathered before pairing.
#[instrument(skip_all, name = "angular_task")]
pub fn run(
    centers: &AtomSet,
    neighbors: &AtomSet,
    cell: &Cell,
    criterion: &NeighborCriterion,
    reporter: &ProgressReporter,
) -> Result<Vec<f64>, EngineError> {
    info!(
        centers = centers.len(),
        neighbors = neighbors.len(),
        cutoff = criterion.cutoff(),
        "Collecting triplet angles."
    );
    super::warn_if_beyond_minimum_image(cell, criterion.cutoff());

    let images = replicate(neighbors, cell);
    reporter.report(Progress::TaskStart {
        total_steps: centers.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = centers.positions().iter();

    #[cfg(feature = "parallel")]
    let iterator = centers.positions().par_iter();

    let per_center = iterator
        .map(|center| -> Result<Vec<f64>, EngineError> {
            reporter.check_cancelled()?;
            let shell: Vec<&Point3<f64>> = images
                .iter()
                .filter(|image| criterion.accepts(distance(center, image)))
                .collect();
            let angles = shell
                .into_iter()
                .tuple_combinations()
                .map(|(m, n)| angle_at_vertex(m, center, n))
                .collect();
            reporter.report(Progress::TaskIncrement);
            Ok(angles)
        })
        .collect::<Result<Vec<_>, _>>()?;

    reporter.report(Progress::TaskFinish);

    let angles: Vec<f64> = per_center.into_iter().flatten().collect();
    info!(angles = angles.len(), "Triplet angle collection complete.");
    Ok(angles)
}
