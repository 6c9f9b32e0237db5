use crate::core::cell::{BoundaryMode, Cell};
use crate::core::error::InputError;
use crate::core::models::atoms::AtomSet;
use crate::engine::config::{HbondCriterion, NeighborCriterion};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::coordination::{self, IrregularComplexes};
use crate::engine::tasks::{angular, hbonds, radial};
use tracing::{info, instrument};

/// The atoms selected from one snapshot, together with that snapshot's cell.
///
/// For hydrogen-bond series `centers` holds the heavy atoms and `neighbors` the hydrogens.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSelection {
    pub centers: AtomSet,
    pub neighbors: AtomSet,
    pub cell: Cell,
}

impl FrameSelection {
    pub fn new(centers: AtomSet, neighbors: AtomSet, cell: Cell) -> Self {
        Self {
            centers,
            neighbors,
            cell,
        }
    }

    pub fn from_flat(
        centers: &[f64],
        neighbors: &[f64],
        mode: BoundaryMode,
        cell: &[f64],
    ) -> Result<Self, InputError> {
        Ok(Self {
            centers: AtomSet::from_flat(centers)?,
            neighbors: AtomSet::from_flat(neighbors)?,
            cell: Cell::from_flat(mode, cell)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HbondFrameSummary {
    pub count: u64,
    /// Bonds per heavy atom in the frame, zero when the frame has no heavy atoms.
    pub per_heavy_atom: f64,
}

fn run_frames<T, F>(
    phase: &'static str,
    frames: &[FrameSelection],
    reporter: &ProgressReporter,
    mut per_frame: F,
) -> Result<Vec<T>, EngineError>
where
    F: FnMut(&FrameSelection, &ProgressReporter) -> Result<T, EngineError>,
{
    reporter.report(Progress::PhaseStart { name: phase });
    reporter.report(Progress::TaskStart {
        total_steps: frames.len() as u64,
    });

    let inner = reporter.silent();
    let mut results = Vec::with_capacity(frames.len());
    for frame in frames {
        reporter.check_cancelled()?;
        results.push(per_frame(frame, &inner)?);
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(results)
}

/// Radial distances of every frame, pooled in frame order.
#[instrument(skip_all, name = "radial_series")]
pub fn radial(
    frames: &[FrameSelection],
    criterion: &NeighborCriterion,
    reporter: &ProgressReporter,
) -> Result<Vec<f64>, EngineError> {
    info!(frames = frames.len(), "Starting radial distance series.");
    let per_frame = run_frames("Radial distances", frames, reporter, |frame, inner| {
        radial::run(
            &frame.centers,
            &frame.neighbors,
            &frame.cell,
            criterion,
            inner,
        )
    })?;
    Ok(per_frame.into_iter().flatten().collect())
}

/// Triplet angles of every frame, pooled in frame order.
#[instrument(skip_all, name = "angular_series")]
pub fn angular(
    frames: &[FrameSelection],
    criterion: &NeighborCriterion,
    reporter: &ProgressReporter,
) -> Result<Vec<f64>, EngineError> {
    info!(frames = frames.len(), "Starting triplet angle series.");
    let per_frame = run_frames("Triplet angles", frames, reporter, |frame, inner| {
        angular::run(
            &frame.centers,
            &frame.neighbors,
            &frame.cell,
            criterion,
            inner,
        )
    })?;
    Ok(per_frame.into_iter().flatten().collect())
}

/// Hydrogen-bond count of every frame.
#[instrument(skip_all, name = "hbond_series")]
pub fn hbonds(
    frames: &[FrameSelection],
    criterion: &HbondCriterion,
    reporter: &ProgressReporter,
) -> Result<Vec<HbondFrameSummary>, EngineError> {
    info!(frames = frames.len(), "Starting hydrogen bond series.");
    run_frames("Hydrogen bonds", frames, reporter, |frame, inner| {
        let count = hbonds::run(
            &frame.centers,
            &frame.neighbors,
            &frame.cell,
            criterion,
            inner,
        )?;
        let per_heavy_atom = if frame.centers.is_empty() {
            0.0
        } else {
            count as f64 / frame.centers.len() as f64
        };
        Ok(HbondFrameSummary {
            count,
            per_heavy_atom,
        })
    })
}

/// Irregular complexes of every frame, with `expected_partners` partners per regular center.
#[instrument(skip_all, name = "coordination_series")]
pub fn coordination(
    frames: &[FrameSelection],
    criterion: &NeighborCriterion,
    expected_partners: usize,
    reporter: &ProgressReporter,
) -> Result<Vec<IrregularComplexes>, EngineError> {
    info!(frames = frames.len(), "Starting coordination series.");
    run_frames("Coordination", frames, reporter, |frame, inner| {
        coordination::run(
            &frame.centers,
            &frame.neighbors,
            &frame.cell,
            criterion,
            expected_partners,
            inner,
        )
    })
}
