use crate::core::cell::Cell;
use crate::core::models::atoms::AtomSet;
use crate::engine::config::NeighborCriterion;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use itertools::Itertools;
use tracing::{info, instrument};

use super::neighbors;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IonComplex {
    /// Sorted indices into the first-shell candidate set.
    pub first_shell: Vec<usize>,
    /// Sorted indices into the second-shell candidate set.
    pub second_shell: Vec<usize>,
}

/// Builds the two-shell complex around a set of ions.
///
/// The first shell holds every first-shell candidate with an image inside `first` of any ion.
/// The second shell holds every second-shell candidate with an image inside `second` of a
/// first-shell atom, where first-shell atoms are taken at their input positions.
#[instrument(skip_all, name = "ion_shell_task")]
pub fn run(
    ions: &AtomSet,
    first_candidates: &AtomSet,
    second_candidates: &AtomSet,
    cell: &Cell,
    first: &NeighborCriterion,
    second: &NeighborCriterion,
    reporter: &ProgressReporter,
) -> Result<IonComplex, EngineError> {
    let first_lists = neighbors::run(ions, first_candidates, cell, first, reporter)?;
    let first_shell: Vec<usize> = first_lists
        .iter()
        .flat_map(|list| list.indices())
        .sorted()
        .dedup()
        .collect();

    let shell_atoms: AtomSet = first_shell
        .iter()
        .map(|&i| first_candidates.positions()[i])
        .collect();
    let second_lists = neighbors::run(&shell_atoms, second_candidates, cell, second, reporter)?;
    let second_shell: Vec<usize> = second_lists
        .iter()
        .flat_map(|list| list.indices())
        .sorted()
        .dedup()
        .collect();

    info!(
        ions = ions.len(),
        first_shell = first_shell.len(),
        second_shell = second_shell.len(),
        "Ion complex assembled."
    );
    Ok(IonComplex {
        first_shell,
        second_shell,
    })
}
