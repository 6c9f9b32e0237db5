use numpy::{PyArray1, PyReadonlyArrayDyn};
use pawstruct::core::cell::{BoundaryMode, Cell};
use pawstruct::core::error::InputError;
use pawstruct::core::images::replicate;
use pawstruct::core::models::atoms::AtomSet;
use pawstruct::engine::config::{ConfigError, HbondCriterionBuilder, NeighborCriterion};
use pawstruct::engine::error::EngineError;
use pawstruct::engine::progress::ProgressReporter;
use pawstruct::engine::tasks::{
    angular, coordination, hbonds as hbond_task, ion_shells, neighbors as neighbor_task,
    radial as radial_task,
};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

mod logging;

type NeighborEntry = (usize, (i8, i8, i8), f64);

fn input_err(e: InputError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn config_err(e: ConfigError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn engine_err(e: EngineError) -> PyErr {
    match e {
        EngineError::Input(_) | EngineError::Config(_) => PyValueError::new_err(e.to_string()),
        EngineError::Cancelled => PyRuntimeError::new_err(e.to_string()),
    }
}

fn flat_values(array: &PyReadonlyArrayDyn<'_, f64>) -> PyResult<Vec<f64>> {
    let view = array.as_array();
    if view.ndim() != 1 {
        return Err(PyValueError::new_err("Number of dimensions must be 1"));
    }
    Ok(view.iter().copied().collect())
}

fn atoms(array: &PyReadonlyArrayDyn<'_, f64>) -> PyResult<AtomSet> {
    AtomSet::from_flat(&flat_values(array)?).map_err(input_err)
}

fn parse_cell(array: &PyReadonlyArrayDyn<'_, f64>, boundary: &str) -> PyResult<Cell> {
    let mode: BoundaryMode = boundary.parse().map_err(input_err)?;
    Cell::from_flat(mode, &flat_values(array)?).map_err(input_err)
}

fn neighbor_criterion(cut: f64, self_exclusion: f64) -> PyResult<NeighborCriterion> {
    NeighborCriterion::new(cut)
        .and_then(|c| c.with_self_exclusion(self_exclusion))
        .map_err(config_err)
}

/// Distances between every atom of `array1` and every periodic image of `array2` that lie in
/// `(self_exclusion, cut)`.
#[pyfunction]
#[pyo3(signature = (array1, array2, cut, cell, boundary="triclinic", self_exclusion=0.01))]
fn radial<'py>(
    py: Python<'py>,
    array1: PyReadonlyArrayDyn<'py, f64>,
    array2: PyReadonlyArrayDyn<'py, f64>,
    cut: f64,
    cell: PyReadonlyArrayDyn<'py, f64>,
    boundary: &str,
    self_exclusion: f64,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let centers = atoms(&array1)?;
    let neighbors = atoms(&array2)?;
    let cell = parse_cell(&cell, boundary)?;
    let criterion = neighbor_criterion(cut, self_exclusion)?;

    let distances = py
        .allow_threads(|| {
            radial_task::run(&centers, &neighbors, &cell, &criterion, &ProgressReporter::new())
        })
        .map_err(engine_err)?;
    Ok(PyArray1::from_vec(py, distances))
}

/// Angles in degrees between every pair of neighbors found around each atom of `array1`.
#[pyfunction]
#[pyo3(signature = (array1, array2, cut, cell, boundary="triclinic", self_exclusion=0.01))]
fn angle<'py>(
    py: Python<'py>,
    array1: PyReadonlyArrayDyn<'py, f64>,
    array2: PyReadonlyArrayDyn<'py, f64>,
    cut: f64,
    cell: PyReadonlyArrayDyn<'py, f64>,
    boundary: &str,
    self_exclusion: f64,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let centers = atoms(&array1)?;
    let neighbors = atoms(&array2)?;
    let cell = parse_cell(&cell, boundary)?;
    let criterion = neighbor_criterion(cut, self_exclusion)?;

    let angles = py
        .allow_threads(|| {
            angular::run(&centers, &neighbors, &cell, &criterion, &ProgressReporter::new())
        })
        .map_err(engine_err)?;
    Ok(PyArray1::from_vec(py, angles))
}

/// Number of hydrogen bonds between heavy atoms `array1` mediated by hydrogens `array2`.
#[pyfunction]
#[pyo3(signature = (array1, array2, cut1, cut2, angle, cell, boundary="triclinic", self_exclusion=0.01))]
#[allow(clippy::too_many_arguments)]
fn hbonds<'py>(
    py: Python<'py>,
    array1: PyReadonlyArrayDyn<'py, f64>,
    array2: PyReadonlyArrayDyn<'py, f64>,
    cut1: f64,
    cut2: f64,
    angle: f64,
    cell: PyReadonlyArrayDyn<'py, f64>,
    boundary: &str,
    self_exclusion: f64,
) -> PyResult<u64> {
    let heavy = atoms(&array1)?;
    let hydrogens = atoms(&array2)?;
    let cell = parse_cell(&cell, boundary)?;
    let criterion = HbondCriterionBuilder::new()
        .heavy_cutoff(cut1)
        .hydrogen_cutoff(cut2)
        .angle_threshold(angle)
        .self_exclusion(self_exclusion)
        .build()
        .map_err(config_err)?;

    py.allow_threads(|| {
        hbond_task::run(&heavy, &hydrogens, &cell, &criterion, &ProgressReporter::new())
    })
    .map_err(engine_err)
}

/// All 27 periodic images of `pos` as a flat array, image-major with the primary image at
/// block 13.
#[pyfunction]
#[pyo3(signature = (pos, cell, boundary="triclinic"))]
fn pbc_apply3x3<'py>(
    py: Python<'py>,
    pos: PyReadonlyArrayDyn<'py, f64>,
    cell: PyReadonlyArrayDyn<'py, f64>,
    boundary: &str,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let atoms = atoms(&pos)?;
    let cell = parse_cell(&cell, boundary)?;
    let flat = py.allow_threads(|| replicate(&atoms, &cell).to_flat());
    Ok(PyArray1::from_vec(py, flat))
}

/// Per-center neighbor lists of `(index, (i, j, k), distance)` entries.
#[pyfunction]
#[pyo3(signature = (array1, array2, cut, cell, boundary="triclinic", self_exclusion=0.01))]
fn neighbors<'py>(
    py: Python<'py>,
    array1: PyReadonlyArrayDyn<'py, f64>,
    array2: PyReadonlyArrayDyn<'py, f64>,
    cut: f64,
    cell: PyReadonlyArrayDyn<'py, f64>,
    boundary: &str,
    self_exclusion: f64,
) -> PyResult<Vec<Vec<NeighborEntry>>> {
    let centers = atoms(&array1)?;
    let others = atoms(&array2)?;
    let cell = parse_cell(&cell, boundary)?;
    let criterion = neighbor_criterion(cut, self_exclusion)?;

    let lists = py
        .allow_threads(|| {
            neighbor_task::run(&centers, &others, &cell, &criterion, &ProgressReporter::new())
        })
        .map_err(engine_err)?;
    Ok(lists
        .into_iter()
        .map(|list| {
            list.neighbors
                .into_iter()
                .map(|n| (n.index, (n.shift[0], n.shift[1], n.shift[2]), n.distance))
                .collect()
        })
        .collect())
}

/// Centers of `array1` whose number of `array2` neighbors differs from `coordination`, or that
/// share a neighbor with another center. Returns `(centers, partners)` index lists.
#[pyfunction]
#[pyo3(signature = (array1, array2, cut, cell, coordination=2, boundary="triclinic", self_exclusion=0.01))]
#[allow(clippy::too_many_arguments)]
fn water_complexes<'py>(
    py: Python<'py>,
    array1: PyReadonlyArrayDyn<'py, f64>,
    array2: PyReadonlyArrayDyn<'py, f64>,
    cut: f64,
    cell: PyReadonlyArrayDyn<'py, f64>,
    coordination: usize,
    boundary: &str,
    self_exclusion: f64,
) -> PyResult<(Vec<usize>, Vec<usize>)> {
    let centers = atoms(&array1)?;
    let partners = atoms(&array2)?;
    let cell = parse_cell(&cell, boundary)?;
    let criterion = neighbor_criterion(cut, self_exclusion)?;

    let complexes = py
        .allow_threads(|| {
            coordination::run(
                &centers,
                &partners,
                &cell,
                &criterion,
                coordination,
                &ProgressReporter::new(),
            )
        })
        .map_err(engine_err)?;
    Ok((complexes.centers, complexes.partners))
}

/// Two-shell complex around the ions in `array1`: `array2` atoms within `cut1` of an ion, then
/// `array3` atoms within `cut2` of those. Returns `(first_shell, second_shell)` index lists.
#[pyfunction]
#[pyo3(signature = (array1, array2, array3, cut1, cut2, cell, boundary="triclinic", self_exclusion=0.01))]
#[allow(clippy::too_many_arguments)]
fn ion_complex<'py>(
    py: Python<'py>,
    array1: PyReadonlyArrayDyn<'py, f64>,
    array2: PyReadonlyArrayDyn<'py, f64>,
    array3: PyReadonlyArrayDyn<'py, f64>,
    cut1: f64,
    cut2: f64,
    cell: PyReadonlyArrayDyn<'py, f64>,
    boundary: &str,
    self_exclusion: f64,
) -> PyResult<(Vec<usize>, Vec<usize>)> {
    let ions = atoms(&array1)?;
    let first_candidates = atoms(&array2)?;
    let second_candidates = atoms(&array3)?;
    let cell = parse_cell(&cell, boundary)?;
    let first = neighbor_criterion(cut1, self_exclusion)?;
    let second = neighbor_criterion(cut2, self_exclusion)?;

    let complex = py
        .allow_threads(|| {
            ion_shells::run(
                &ions,
                &first_candidates,
                &second_candidates,
                &cell,
                &first,
                &second,
                &ProgressReporter::new(),
            )
        })
        .map_err(engine_err)?;
    Ok((complex.first_shell, complex.second_shell))
}

/// Routes library log events to stderr. 0 = warnings, 1 = info, 2 = debug, 3 or more = trace.
#[pyfunction]
#[pyo3(signature = (verbosity=0, quiet=false))]
fn setup_logging(verbosity: u8, quiet: bool) -> PyResult<()> {
    logging::setup_logging(verbosity, quiet).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

#[pymodule]
fn paw_structure(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(radial, m)?)?;
    m.add_function(wrap_pyfunction!(angle, m)?)?;
    m.add_function(wrap_pyfunction!(hbonds, m)?)?;
    m.add_function(wrap_pyfunction!(pbc_apply3x3, m)?)?;
    m.add_function(wrap_pyfunction!(neighbors, m)?)?;
    m.add_function(wrap_pyfunction!(water_complexes, m)?)?;
    m.add_function(wrap_pyfunction!(ion_complex, m)?)?;
    m.add_function(wrap_pyfunction!(setup_logging, m)?)?;
    Ok(())
}
