use crate::core::cell::Cell;
use crate::core::geometry::{angle_at_vertex, distance};
use crate::core::images::{PeriodicImageSet, replicate};
use crate::core::models::atoms::AtomSet;
use crate::engine::config::HbondCriterion;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::Point3;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Counts hydrogen bonds in one snapshot.
///
/// Every heavy atom acts as a donor center. Acceptors are taken from the periodic images of
/// the heavy set and hydrogens from the periodic images of the hydrogen set. A triple is
/// counted when it satisfies [`HbondCriterion`] and the hydrogen belongs to the donor, which
/// means it is strictly closer to the donor than to the acceptor. Exact ties go to the heavy
/// atom with the lower index, and between two images of the same atom to the donor whose
/// acceptor sits at a positive lattice shift. Each physical bond is therefore counted once,
/// although both of its heavy atoms appear as centers.
#[instrument(skip_all, name = "hbond_task")]
pub fn run(
    heavy: &AtomSet,
    hydrogens: &AtomSet,
    cell: &Cell,
    criterion: &HbondCriterion,
    reporter: &ProgressReporter,
) -> Result<u64, EngineError> {
    info!(
        heavy_atoms = heavy.len(),
        hydrogens = hydrogens.len(),
        heavy_cutoff = criterion.heavy_cutoff(),
        hydrogen_cutoff = criterion.hydrogen_cutoff(),
        angle_threshold = criterion.angle_threshold(),
        "Counting hydrogen bonds."
    );
    super::warn_if_beyond_minimum_image(
        cell,
        criterion.heavy_cutoff().max(criterion.hydrogen_cutoff()),
    );

    let heavy_images = replicate(heavy, cell);
    let hydrogen_images = replicate(hydrogens, cell);
    reporter.report(Progress::TaskStart {
        total_steps: heavy.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = heavy.positions().iter().enumerate();

    #[cfg(feature = "parallel")]
    let iterator = heavy.positions().par_iter().enumerate();

    let per_donor = iterator
        .map(|(donor_index, donor)| -> Result<u64, EngineError> {
            reporter.check_cancelled()?;
            let count = count_for_donor(
                donor_index,
                donor,
                &heavy_images,
                &hydrogen_images,
                criterion,
            );
            reporter.report(Progress::TaskIncrement);
            Ok(count)
        })
        .collect::<Result<Vec<_>, _>>()?;

    reporter.report(Progress::TaskFinish);

    let total: u64 = per_donor.iter().sum();
    info!(hydrogen_bonds = total, "Hydrogen bond counting complete.");
    Ok(total)
}

fn count_for_donor(
    donor_index: usize,
    donor: &Point3<f64>,
    heavy_images: &PeriodicImageSet,
    hydrogen_images: &PeriodicImageSet,
    criterion: &HbondCriterion,
) -> u64 {
    let mut count = 0;
    for (image_index, acceptor) in heavy_images.iter().enumerate() {
        if !criterion.accepts_heavy_pair(distance(donor, acceptor)) {
            continue;
        }
        let acceptor_index = heavy_images.source_index(image_index);
        let acceptor_shift = heavy_images.shift(image_index);

        for hydrogen in hydrogen_images.iter() {
            let donor_h = distance(donor, hydrogen);
            if !criterion.accepts_hydrogen(donor_h) {
                continue;
            }
            let acceptor_h = distance(acceptor, hydrogen);
            if !criterion.accepts_hydrogen(acceptor_h) {
                continue;
            }
            if !hydrogen_belongs_to_donor(
                donor_h,
                acceptor_h,
                donor_index,
                acceptor_index,
                acceptor_shift,
            ) {
                continue;
            }
            if angle_at_vertex(donor, hydrogen, acceptor) > criterion.angle_threshold() {
                count += 1;
            }
        }
    }
    count
}

#[inline]
fn hydrogen_belongs_to_donor(
    donor_h: f64,
    acceptor_h: f64,
    donor_index: usize,
    acceptor_index: usize,
    acceptor_shift: [i8; 3],
) -> bool {
    donor_h < acceptor_h
        || (donor_h == acceptor_h && (donor_index, [0; 3]) < (acceptor_index, acceptor_shift))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::HbondCriterionBuilder;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    fn water_criterion() -> HbondCriterion {
        HbondCriterionBuilder::new()
            .heavy_cutoff(3.5)
            .hydrogen_cutoff(2.5)
            .angle_threshold(150.0)
            .build()
            .unwrap()
    }

    fn count(heavy: &[f64], hydrogens: &[f64], cell: &Cell) -> u64 {
        count_with(&water_criterion(), heavy, hydrogens, cell)
    }

    fn count_with(
        criterion: &HbondCriterion,
        heavy: &[f64],
        hydrogens: &[f64],
        cell: &Cell,
    ) -> u64 {
        run(
            &AtomSet::from_flat(heavy).unwrap(),
            &AtomSet::from_flat(hydrogens).unwrap(),
            cell,
            criterion,
            &ProgressReporter::new(),
        )
        .unwrap()
    }

    #[test]
    fn linear_donor_hydrogen_acceptor_counts_as_one_bond() {
        let n = count(
            &[5.0, 5.0, 5.0, 7.76, 5.0, 5.0],
            &[5.96, 5.0, 5.0],
            &Cell::cubic(10.0),
        );
        assert_eq!(n, 1);
    }

    #[test]
    fn acceptor_beyond_heavy_cutoff_is_not_counted() {
        // Wide hydrogen cutoff, so only the heavy-atom distance can reject the triple.
        let criterion = HbondCriterionBuilder::new()
            .heavy_cutoff(3.5)
            .hydrogen_cutoff(3.0)
            .angle_threshold(150.0)
            .build()
            .unwrap();
        let hydrogens = [5.96, 5.0, 5.0];
        let cell = Cell::cubic(10.0);

        let inside = count_with(&criterion, &[5.0, 5.0, 5.0, 8.4, 5.0, 5.0], &hydrogens, &cell);
        let beyond = count_with(&criterion, &[5.0, 5.0, 5.0, 8.6, 5.0, 5.0], &hydrogens, &cell);
        assert_eq!(inside, 1);
        assert_eq!(beyond, 0);
    }

    #[test]
    fn bent_arrangement_below_angle_threshold_is_not_counted() {
        let angle = 120.0f64.to_radians();
        let hx = 5.96;
        let acceptor_x = hx - 1.8 * angle.cos();
        let acceptor_y = 5.0 + 1.8 * angle.sin();
        let n = count(
            &[5.0, 5.0, 5.0, acceptor_x, acceptor_y, 5.0],
            &[hx, 5.0, 5.0],
            &Cell::cubic(10.0),
        );
        assert_eq!(n, 0);
    }

    #[test]
    fn slightly_bent_arrangement_above_threshold_is_counted() {
        let angle = 165.0f64.to_radians();
        let hx = 5.96;
        let acceptor_x = hx - 1.8 * angle.cos();
        let acceptor_y = 5.0 + 1.8 * angle.sin();
        let n = count(
            &[5.0, 5.0, 5.0, acceptor_x, acceptor_y, 5.0],
            &[hx, 5.0, 5.0],
            &Cell::cubic(10.0),
        );
        assert_eq!(n, 1);
    }

    #[test]
    fn hydrogen_too_far_from_acceptor_is_not_counted() {
        let n = count(
            &[5.0, 5.0, 5.0, 8.4, 5.0, 5.0],
            &[5.8, 5.0, 5.0],
            &Cell::cubic(10.0),
        );
        assert_eq!(n, 0);
    }

    #[test]
    fn bond_across_periodic_boundary_is_counted_once() {
        let n = count(
            &[9.5, 5.0, 5.0, 2.26, 5.0, 5.0],
            &[0.46, 5.0, 5.0],
            &Cell::cubic(10.0),
        );
        assert_eq!(n, 1);
    }

    #[test]
    fn triclinic_and_equivalent_cubic_cells_agree() {
        let heavy = [9.5, 5.0, 5.0, 2.26, 5.0, 5.0, 5.0, 1.0, 5.0];
        let hydrogens = [0.46, 5.0, 5.0, 5.0, 1.96, 5.0];
        let triclinic = Cell::triclinic(
            nalgebra::Vector3::new(10.0, 0.0, 0.0),
            nalgebra::Vector3::new(0.0, 10.0, 0.0),
            nalgebra::Vector3::new(0.0, 0.0, 10.0),
        );
        assert_eq!(
            count(&heavy, &hydrogens, &triclinic),
            count(&heavy, &hydrogens, &Cell::cubic(10.0))
        );
    }

    #[test]
    fn hydrogen_at_exact_midpoint_is_assigned_to_one_donor() {
        let n = count(
            &[5.0, 5.0, 5.0, 7.0, 5.0, 5.0],
            &[6.0, 5.0, 5.0],
            &Cell::cubic(10.0),
        );
        assert_eq!(n, 1);
    }

    #[test]
    fn water_dimer_with_two_hydrogens_per_oxygen_counts_single_bond() {
        // Only the first hydrogen lies on the O···O axis.
        let heavy = [5.0, 5.0, 5.0, 7.9, 5.0, 5.0];
        let hydrogens = [
            5.96, 5.0, 5.0,
            4.76, 5.93, 5.0,
            8.14, 5.93, 5.0,
            8.14, 4.53, 5.8,
        ];
        assert_eq!(count(&heavy, &hydrogens, &Cell::cubic(20.0)), 1);
    }

    #[test]
    fn empty_hydrogen_set_counts_nothing() {
        assert_eq!(
            count(&[5.0, 5.0, 5.0, 7.76, 5.0, 5.0], &[], &Cell::cubic(10.0)),
            0
        );
    }

    #[test]
    fn ownership_prefers_closer_heavy_atom_then_lower_index() {
        let primary = [0, 0, 0];
        assert!(hydrogen_belongs_to_donor(0.96, 1.8, 5, 2, primary));
        assert!(!hydrogen_belongs_to_donor(1.8, 0.96, 2, 5, primary));
        assert!(hydrogen_belongs_to_donor(1.2, 1.2, 2, 5, [-1, 0, 0]));
        assert!(!hydrogen_belongs_to_donor(1.2, 1.2, 5, 2, [1, 0, 0]));
    }

    #[test]
    fn ownership_between_images_of_one_atom_follows_lattice_shift() {
        assert!(hydrogen_belongs_to_donor(1.5, 1.5, 3, 3, [1, 0, 0]));
        assert!(!hydrogen_belongs_to_donor(1.5, 1.5, 3, 3, [-1, 0, 0]));
        assert!(hydrogen_belongs_to_donor(1.5, 1.5, 3, 3, [0, 0, 1]));
        assert!(!hydrogen_belongs_to_donor(1.5, 1.5, 3, 3, [0, 0, -1]));
        assert!(!hydrogen_belongs_to_donor(1.5, 1.5, 3, 3, [0, 0, 0]));
    }

    #[test]
    fn bond_to_own_periodic_image_at_midpoint_is_counted_once() {
        let n = count(&[0.0, 1.0, 1.0], &[1.5, 1.0, 1.0], &Cell::cubic(3.0));
        assert_eq!(n, 1);
    }

    #[test]
    fn cancelled_reporter_aborts_without_result() {
        let reporter = ProgressReporter::new().with_cancel_flag(Arc::new(AtomicBool::new(true)));
        let atoms = AtomSet::from_flat(&[5.0, 5.0, 5.0]).unwrap();
        let result = run(
            &atoms,
            &atoms,
            &Cell::cubic(10.0),
            &water_criterion(),
            &reporter,
        );
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }
}
