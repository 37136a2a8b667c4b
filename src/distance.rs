// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Distance field drivers: seed validation, the one-sided (unsigned)
//! march, and the two-phase signed march built on connected components
//! and dilation bands.

use crate::core::{
    frozen, linear_size, validate_grid_size, vertex_neighbor_offsets, Grid, UNFROZEN,
};
use crate::error::{EikonalError, Result};
use crate::marching::{band_from_indices, initial_band_from_seeds, march};
use crate::regions::{bounding_box, connected_components, dilation_bands, hyper_volume};
use crate::solver::{
    Algorithm, EikonalSolver, HighOrderUniformSpeedSolver, HighOrderVaryingSpeedSolver,
    SpeedField, UniformSpeedSolver, VaryingSpeedSolver,
};

/// Computes one-sided distances (arrival times) from the seed cells.
///
/// Seed distances must be finite and non-negative. The returned buffer
/// holds a finite distance for every grid cell, with the seed cells kept
/// at exactly their given values.
///
/// # Errors
/// All precondition failures (grid size, spacing, speed, seed set) are
/// reported before the distance buffer is allocated. `IncompleteMarch` is
/// returned if unsolvable local updates leave cells unreached.
pub fn unsigned_distance<const N: usize>(
    grid_size: [usize; N],
    grid_spacing: [f64; N],
    speed: SpeedField<'_>,
    seed_indices: &[[i32; N]],
    seed_distances: &[f64],
    algorithm: Algorithm,
) -> Result<Vec<f64>> {
    validate_grid_size(grid_size)?;
    match (algorithm, speed) {
        (Algorithm::FirstOrder, SpeedField::Uniform(s)) => {
            let solver = UniformSpeedSolver::new(grid_spacing, s)?;
            unsigned_distance_with(grid_size, seed_indices, seed_distances, &solver)
        }
        (Algorithm::HighOrder, SpeedField::Uniform(s)) => {
            let solver = HighOrderUniformSpeedSolver::new(grid_spacing, s)?;
            unsigned_distance_with(grid_size, seed_indices, seed_distances, &solver)
        }
        (Algorithm::FirstOrder, SpeedField::Varying(buffer)) => {
            let solver = VaryingSpeedSolver::new(grid_spacing, grid_size, buffer)?;
            unsigned_distance_with(grid_size, seed_indices, seed_distances, &solver)
        }
        (Algorithm::HighOrder, SpeedField::Varying(buffer)) => {
            let solver = HighOrderVaryingSpeedSolver::new(grid_spacing, grid_size, buffer)?;
            unsigned_distance_with(grid_size, seed_indices, seed_distances, &solver)
        }
    }
}

/// One-sided distances with a caller-supplied solver.
///
/// The solver carries spacing and speed; this entry point only validates
/// the grid size and the seed set.
pub fn unsigned_distance_with<const N: usize, E: EikonalSolver<N>>(
    grid_size: [usize; N],
    seed_indices: &[[i32; N]],
    seed_distances: &[f64],
    solver: &E,
) -> Result<Vec<f64>> {
    validate_grid_size(grid_size)?;
    let mut buffer = install_seeds(
        seed_indices,
        seed_distances,
        1.0,
        unsigned_seed_distance,
        grid_size,
    )?;
    {
        let mut distance = Grid::new(grid_size, &mut buffer)?;
        let mut narrow_band = initial_band_from_seeds(seed_indices, &distance, solver)?;
        march(solver, &mut narrow_band, &mut distance)?;
    }
    ensure_all_frozen(&buffer)?;
    Ok(buffer)
}

/// Computes signed distances from seed cells carrying signed values.
///
/// Seed distances must be finite; their sign encodes which side of the
/// implicit interface a seed lies on. Each vertex-connected component of
/// the seed set must enclose at least one cell, otherwise the inside of
/// that component is undefined (`OpenComponent`). Cells enclosed by a
/// component come back negative, cells outside come back positive, and
/// seeds keep exactly their given values.
///
/// Requires N >= 2.
pub fn signed_distance<const N: usize>(
    grid_size: [usize; N],
    grid_spacing: [f64; N],
    speed: SpeedField<'_>,
    seed_indices: &[[i32; N]],
    seed_distances: &[f64],
    algorithm: Algorithm,
) -> Result<Vec<f64>> {
    validate_grid_size(grid_size)?;
    match (algorithm, speed) {
        (Algorithm::FirstOrder, SpeedField::Uniform(s)) => {
            let solver = UniformSpeedSolver::new(grid_spacing, s)?;
            signed_distance_with(grid_size, seed_indices, seed_distances, &solver)
        }
        (Algorithm::HighOrder, SpeedField::Uniform(s)) => {
            let solver = HighOrderUniformSpeedSolver::new(grid_spacing, s)?;
            signed_distance_with(grid_size, seed_indices, seed_distances, &solver)
        }
        (Algorithm::FirstOrder, SpeedField::Varying(buffer)) => {
            let solver = VaryingSpeedSolver::new(grid_spacing, grid_size, buffer)?;
            signed_distance_with(grid_size, seed_indices, seed_distances, &solver)
        }
        (Algorithm::HighOrder, SpeedField::Varying(buffer)) => {
            let solver = HighOrderVaryingSpeedSolver::new(grid_spacing, grid_size, buffer)?;
            signed_distance_with(grid_size, seed_indices, seed_distances, &solver)
        }
    }
}

/// Signed distances with a caller-supplied solver.
///
/// Seeds are installed negated so that the first march, seeded from the
/// inner dilation bands, fills the enclosed regions growing upward from
/// the negated values. Negating every frozen cell then gives the interior
/// its negative sign and restores the seeds, and the second march fills
/// the outside from the outer bands.
pub fn signed_distance_with<const N: usize, E: EikonalSolver<N>>(
    grid_size: [usize; N],
    seed_indices: &[[i32; N]],
    seed_distances: &[f64],
    solver: &E,
) -> Result<Vec<f64>> {
    assert!(N >= 2, "signed distance requires at least two dimensions");
    validate_grid_size(grid_size)?;
    let mut buffer = install_seeds(
        seed_indices,
        seed_distances,
        -1.0,
        signed_seed_distance,
        grid_size,
    )?;
    let (inside_band, outside_band) = initial_signed_bands(seed_indices, grid_size)?;

    {
        let mut distance = Grid::new(grid_size, &mut buffer)?;
        let mut narrow_band = band_from_indices(&inside_band, &distance, solver)?;
        march(solver, &mut narrow_band, &mut distance)?;
    }

    // Sign flip: the marched interior becomes negative, seeds regain
    // their original sign, unreached cells stay at the sentinel.
    for d in buffer.iter_mut() {
        if frozen(*d) {
            *d = -*d;
        }
    }

    {
        let mut distance = Grid::new(grid_size, &mut buffer)?;
        let mut narrow_band = band_from_indices(&outside_band, &distance, solver)?;
        march(solver, &mut narrow_band, &mut distance)?;
    }

    ensure_all_frozen(&buffer)?;
    Ok(buffer)
}

fn unsigned_seed_distance(d: f64) -> bool {
    d.is_finite() && d >= 0.0
}

fn signed_seed_distance(d: f64) -> bool {
    d.is_finite()
}

/// Validates the seed set, then allocates the distance buffer and writes
/// `multiplier * distance` at each seed.
///
/// Failure conditions, each a distinct error: empty list, length
/// mismatch, index out of bounds, predicate-rejected distance, duplicate
/// index, seeds covering the whole grid. All are checked before the
/// distance buffer exists.
fn install_seeds<const N: usize>(
    indices: &[[i32; N]],
    distances: &[f64],
    multiplier: f64,
    predicate: fn(f64) -> bool,
    grid_size: [usize; N],
) -> Result<Vec<f64>> {
    if indices.is_empty() {
        return Err(EikonalError::SeedEmpty);
    }
    if indices.len() != distances.len() {
        return Err(EikonalError::SeedMismatch {
            indices: indices.len(),
            distances: distances.len(),
        });
    }

    let mut seen_buffer = vec![false; linear_size(grid_size)];
    let mut seen = Grid::new(grid_size, &mut seen_buffer)?;
    for (&index, &distance) in indices.iter().zip(distances.iter()) {
        if !seen.inside(index) {
            return Err(EikonalError::SeedOutOfBounds {
                index: index.to_vec(),
            });
        }
        if !predicate(distance) {
            return Err(EikonalError::SeedDistanceRejected { distance });
        }
        if seen.get(index) {
            return Err(EikonalError::SeedDuplicate {
                index: index.to_vec(),
            });
        }
        seen.set(index, true);
    }

    // Indices are unique and inside at this point.
    if indices.len() == linear_size(grid_size) {
        return Err(EikonalError::WholeGridFrozen);
    }

    let mut buffer = vec![UNFROZEN; linear_size(grid_size)];
    {
        let mut distance = Grid::new(grid_size, &mut buffer)?;
        for (&index, &d) in indices.iter().zip(distances.iter()) {
            distance.set(index, multiplier * d);
        }
    }
    Ok(buffer)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum BandCell {
    Background,
    Seed,
    Band,
}

/// Derives the signed driver's two initial narrow bands from the seed
/// geometry alone.
///
/// Seeds are clustered into vertex-connected components; each component's
/// dilation bands are classified by bounding-box hypervolume, largest as
/// the outer (outside) band, the rest as inner (inside) bands. From each
/// band only the cells with a face neighbor in the seed set are kept.
/// Outer bands of distinct components may overlap, so cells are collected
/// at most once; inner bands cannot.
fn initial_signed_bands<const N: usize>(
    seed_indices: &[[i32; N]],
    grid_size: [usize; N],
) -> Result<(Vec<[i32; N]>, Vec<[i32; N]>)> {
    let vertex_offsets = vertex_neighbor_offsets::<N>();
    let components = connected_components(seed_indices, grid_size, &vertex_offsets)?;

    let mut label_buffer = vec![BandCell::Background; linear_size(grid_size)];
    let mut labels = Grid::new(grid_size, &mut label_buffer)?;
    for &index in seed_indices {
        labels.set(index, BandCell::Seed);
    }

    let mut inside_band = Vec::new();
    let mut outside_band = Vec::new();
    for component in &components {
        let bands = dilation_bands(component, grid_size)?;
        debug_assert!(!bands.is_empty());
        if bands.len() < 2 {
            // A component touching the grid boundary has its shell merged
            // into one band; inside cannot be told from outside.
            return Err(EikonalError::OpenComponent);
        }

        let mut order: Vec<usize> = (0..bands.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(hyper_volume(&bounding_box(&bands[i]))));

        collect_band_cells(&bands[order[0]], &mut labels, &mut outside_band);
        for &i in &order[1..] {
            collect_band_cells(&bands[i], &mut labels, &mut inside_band);
        }
    }
    Ok((inside_band, outside_band))
}

/// Keeps the band cells that touch a seed by face adjacency, marking them
/// in the label grid so overlapping bands collect each cell once.
fn collect_band_cells<const N: usize>(
    band: &[[i32; N]],
    labels: &mut Grid<'_, BandCell, N>,
    collected: &mut Vec<[i32; N]>,
) {
    for &index in band {
        if labels.get(index) != BandCell::Background {
            continue;
        }
        let mut seed_neighbor_found = false;
        'axes: for axis in 0..N {
            for step in [-1i32, 1] {
                let mut neighbor = index;
                neighbor[axis] += step;
                if labels.inside(neighbor) && labels.get(neighbor) == BandCell::Seed {
                    seed_neighbor_found = true;
                    break 'axes;
                }
            }
        }
        if seed_neighbor_found {
            labels.set(index, BandCell::Band);
            collected.push(index);
        }
    }
}

fn ensure_all_frozen(buffer: &[f64]) -> Result<()> {
    let unfrozen = buffer.iter().filter(|&&d| !frozen(d)).count();
    if unfrozen > 0 {
        return Err(EikonalError::IncompleteMarch { unfrozen });
    }
    Ok(())
}
