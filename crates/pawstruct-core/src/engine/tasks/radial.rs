use crate::core::cell::Cell;
use crate::core::geometry::distance;
use crate::core::images::replicate;
use crate::core::models::atoms::AtomSet;
use crate::engine::config::NeighborCriterion;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Distances from every center to every periodic neighbor image inside the criterion window.
///
/// Output is center-major, then in image order. Downstream consumers only histogram it.
#[instrument(skip_all, name = "radial_task")]
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
        "Collecting radial distances."
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
            let accepted = images
                .iter()
                .map(|image| distance(center, image))
                .filter(|&d| criterion.accepts(d))
                .collect();
            reporter.report(Progress::TaskIncrement);
            Ok(accepted)
        })
        .collect::<Result<Vec<_>, _>>()?;

    reporter.report(Progress::TaskFinish);

    let distances: Vec<f64> = per_center.into_iter().flatten().collect();
    info!(accepted = distances.len(), "Radial distance collection complete.");
    Ok(distances)
}
