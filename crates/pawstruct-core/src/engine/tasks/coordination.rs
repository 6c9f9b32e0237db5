use crate::core::cell::Cell;
use crate::core::models::atoms::AtomSet;
use crate::engine::config::NeighborCriterion;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use itertools::Itertools;
use tracing::{info, instrument};

use super::neighbors;

/// Centers that deviate from the regular molecular structure, together with their partners.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IrregularComplexes {
    /// Sorted center indices.
    pub centers: Vec<usize>,
    /// Sorted, deduplicated partner indices bound to any flagged center.
    pub partners: Vec<usize>,
}

impl IrregularComplexes {
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }
}

/// Flags centers whose number of accepted partner images differs from `coordination`, and
/// every pair of centers that shares a partner atom.
///
/// For water, centers are oxygens, partners are hydrogens and `coordination` is 2. Every
/// accepted image counts toward the coordination number, so two images of one hydrogen inside
/// the cutoff count twice.
#[instrument(skip_all, name = "coordination_task")]
pub fn run(
    centers: &AtomSet,
    partners: &AtomSet,
    cell: &Cell,
    criterion: &NeighborCriterion,
    coordination: usize,
    reporter: &ProgressReporter,
) -> Result<IrregularComplexes, EngineError> {
    let lists = neighbors::run(centers, partners, cell, criterion, reporter)?;
    let bound: Vec<Vec<usize>> = lists
        .iter()
        .map(|list| list.indices().sorted().dedup().collect())
        .collect();

    let mut flagged: Vec<bool> = lists.iter().map(|l| l.len() != coordination).collect();
    for (i, j) in (0..bound.len()).tuple_combinations() {
        if shares_partner(&bound[i], &bound[j]) {
            flagged[i] = true;
            flagged[j] = true;
        }
    }

    let flagged_centers: Vec<usize> = flagged.iter().positions(|&f| f).collect();
    let flagged_partners = flagged_centers
        .iter()
        .flat_map(|&c| bound[c].iter().copied())
        .sorted()
        .dedup()
        .collect();

    info!(
        irregular_centers = flagged_centers.len(),
        "Coordination analysis complete."
    );
    Ok(IrregularComplexes {
        centers: flagged_centers,
        partners: flagged_partners,
    })
}

/// Both slices are sorted.
fn shares_partner(a: &[usize], b: &[usize]) -> bool {
    a.iter().any(|x| b.binary_search(x).is_ok())
}
