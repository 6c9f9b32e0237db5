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

/// One accepted periodic neighbor image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the source atom in the neighbor set.
    pub index: usize,
    /// Lattice shift of the image the neighbor was found in.
    pub shift: [i8; 3],
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeighborList {
    pub center: usize,
    pub neighbors: Vec<Neighbor>,
}

impl NeighborList {
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Source indices of the neighbors, in image order. An index appears more than once when
    /// several images of the same atom fall inside the window.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.neighbors.iter().map(|n| n.index)
    }
}

/// Neighbor lists for every center, using the same acceptance window as the radial collector.
#[instrument(skip_all, name = "neighbor_task")]
pub fn run(
    centers: &AtomSet,
    neighbors: &AtomSet,
    cell: &Cell,
    criterion: &NeighborCriterion,
    reporter: &ProgressReporter,
) -> Result<Vec<NeighborList>, EngineError> {
    info!(
        centers = centers.len(),
        neighbors = neighbors.len(),
        cutoff = criterion.cutoff(),
        "Building neighbor lists."
    );
    super::warn_if_beyond_minimum_image(cell, criterion.cutoff());

    let images = replicate(neighbors, cell);
    reporter.report(Progress::TaskStart {
        total_steps: centers.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = centers.positions().iter().enumerate();

    #[cfg(feature = "parallel")]
    let iterator = centers.positions().par_iter().enumerate();

    let lists = iterator
        .map(|(center_index, center)| -> Result<NeighborList, EngineError> {
            reporter.check_cancelled()?;
            let found = images
                .iter()
                .enumerate()
                .filter_map(|(j, image)| {
                    let d = distance(center, image);
                    criterion.accepts(d).then(|| Neighbor {
                        index: images.source_index(j),
                        shift: images.shift(j),
                        distance: d,
                    })
                })
                .collect();
            reporter.report(Progress::TaskIncrement);
            Ok(NeighborList {
                center: center_index,
                neighbors: found,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    reporter.report(Progress::TaskFinish);
    info!(
        pairs = lists.iter().map(NeighborList::len).sum::<usize>(),
        "Neighbor lists complete."
    );
    Ok(lists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tasks::radial;

    fn criterion(cutoff: f64) -> NeighborCriterion {
        NeighborCriterion::new(cutoff).unwrap()
    }

    #[test]
    fn neighbor_records_source_index_shift_and_distance() {
        let centers = AtomSet::from_flat(&[0.5, 5.0, 5.0]).unwrap();
        let neighbors = AtomSet::from_flat(&[5.0, 5.0, 5.0, 9.5, 5.0, 5.0]).unwrap();
        let lists = run(
            &centers,
            &neighbors,
            &Cell::cubic(10.0),
            &criterion(2.0),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].center, 0);
        assert_eq!(lists[0].len(), 1);
        let neighbor = lists[0].neighbors[0];
        assert_eq!(neighbor.index, 1);
        assert_eq!(neighbor.shift, [-1, 0, 0]);
        assert!((neighbor.distance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn every_center_gets_a_list_even_when_empty() {
        let centers = AtomSet::from_flat(&[1.0, 1.0, 1.0, 5.0, 5.0, 5.0]).unwrap();
        let neighbors = AtomSet::from_flat(&[1.5, 1.0, 1.0]).unwrap();
        let lists = run(
            &centers,
            &neighbors,
            &Cell::cubic(10.0),
            &criterion(1.0),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].indices().collect::<Vec<_>>(), vec![0]);
        assert!(lists[1].is_empty());
        assert_eq!(lists[1].center, 1);
    }

    #[test]
    fn distances_match_radial_collector() {
        let centers = AtomSet::from_flat(&[0.2, 0.3, 0.1, 2.0, 2.5, 1.0, 3.7, 3.9, 3.8]).unwrap();
        let neighbors =
            AtomSet::from_flat(&[0.9, 0.1, 3.8, 2.6, 2.0, 1.4, 3.1, 0.2, 0.4, 1.0, 3.5, 2.2])
                .unwrap();
        let cell = Cell::cubic(4.0);
        let criterion = criterion(1.9);
        let reporter = ProgressReporter::new();

        let from_lists: Vec<f64> = run(&centers, &neighbors, &cell, &criterion, &reporter)
            .unwrap()
            .into_iter()
            .flat_map(|list| list.neighbors.into_iter().map(|n| n.distance))
            .collect();
        let from_radial = radial::run(&centers, &neighbors, &cell, &criterion, &reporter).unwrap();

        assert!(!from_radial.is_empty());
        assert_eq!(from_lists, from_radial);
    }
}
