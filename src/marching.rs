// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BinaryHeap;

use crate::core::{frozen, linear_size, Grid};
use crate::error::{EikonalError, Result};
use crate::solver::EikonalSolver;

/// A narrow band entry: a tentative distance for a grid cell.
///
/// Ordered by distance only (inverted, so the max-heap pops the minimum).
/// `f64::total_cmp` gives the total order the heap requires.
struct BandEntry<const N: usize> {
    distance: f64,
    index: [i32; N],
}

impl<const N: usize> PartialEq for BandEntry<N> {
    fn eq(&self, other: &Self) -> bool {
        self.distance.total_cmp(&other.distance).is_eq()
    }
}

impl<const N: usize> Eq for BandEntry<N> {}

impl<const N: usize> PartialOrd for BandEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<const N: usize> Ord for BandEntry<N> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.distance.total_cmp(&self.distance)
    }
}

/// The narrow band: a min-priority queue of (distance, index) pairs.
///
/// Multiple entries for the same index are permitted. Only the smallest
/// ever takes effect because later pops observe the cell already frozen,
/// so no decrease-key operation is needed.
pub struct NarrowBand<const N: usize> {
    heap: BinaryHeap<BandEntry<N>>,
}

impl<const N: usize> NarrowBand<N> {
    /// Creates an empty narrow band.
    pub fn new() -> Self {
        NarrowBand {
            heap: BinaryHeap::new(),
        }
    }

    /// Returns true if the band holds no entries.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the number of entries, counting duplicates.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Adds an entry for `index` with the given tentative distance.
    pub fn push(&mut self, distance: f64, index: [i32; N]) {
        self.heap.push(BandEntry { distance, index });
    }

    /// Removes and returns the entry with the smallest distance.
    pub fn pop(&mut self) -> Option<(f64, [i32; N])> {
        self.heap.pop().map(|entry| (entry.distance, entry.index))
    }
}

impl<const N: usize> Default for NarrowBand<N> {
    fn default() -> Self {
        NarrowBand::new()
    }
}

/// Drains the narrow band, freezing cells in order of increasing distance.
///
/// Each pop freezes the cell unless a smaller entry already froze it, then
/// relaxes the non-frozen face neighbors through the solver. Cells whose
/// local update is unsolvable are simply not enqueued from this cell; a
/// later freeze of a different neighbor may still reach them.
pub fn march<const N: usize, E: EikonalSolver<N>>(
    solver: &E,
    narrow_band: &mut NarrowBand<N>,
    distance: &mut Grid<'_, f64, N>,
) -> Result<()> {
    while let Some((d, index)) = narrow_band.pop() {
        // Stale entry: a smaller distance froze this cell earlier.
        if frozen(distance.get(index)) {
            continue;
        }
        distance.set(index, d);
        update_neighbors(index, solver, distance, narrow_band)?;
    }
    Ok(())
}

/// Computes solver distances for the non-frozen face neighbors of `index`
/// and pushes them onto the narrow band. Distances are not written to the
/// grid here; they take effect when popped.
fn update_neighbors<const N: usize, E: EikonalSolver<N>>(
    index: [i32; N],
    solver: &E,
    distance: &mut Grid<'_, f64, N>,
    narrow_band: &mut NarrowBand<N>,
) -> Result<()> {
    for axis in 0..N {
        for step in [-1i32, 1] {
            let mut neighbor = index;
            neighbor[axis] += step;
            if !distance.inside(neighbor) || frozen(distance.get(neighbor)) {
                continue;
            }
            match solver.solve(neighbor, distance) {
                Ok(d) => narrow_band.push(d, neighbor),
                Err(EikonalError::UnsolvableQuadratic) => {}
                Err(e) => return Err(e),
            }
        }
    }
    Ok(())
}

/// Builds the initial narrow band from the face neighbors of the seeds.
///
/// A scratch grid deduplicates cells bordering several seeds so each
/// candidate is enqueued once, with one solver call.
pub fn initial_band_from_seeds<const N: usize, E: EikonalSolver<N>>(
    seed_indices: &[[i32; N]],
    distance: &Grid<'_, f64, N>,
    solver: &E,
) -> Result<NarrowBand<N>> {
    let mut visited_buffer = vec![false; linear_size(distance.size())];
    let mut visited = Grid::new(distance.size(), &mut visited_buffer)?;

    let mut narrow_band = NarrowBand::new();
    for &seed in seed_indices {
        for axis in 0..N {
            for step in [-1i32, 1] {
                let mut neighbor = seed;
                neighbor[axis] += step;
                if !distance.inside(neighbor)
                    || frozen(distance.get(neighbor))
                    || visited.get(neighbor)
                {
                    continue;
                }
                visited.set(neighbor, true);
                match solver.solve(neighbor, distance) {
                    Ok(d) => narrow_band.push(d, neighbor),
                    Err(EikonalError::UnsolvableQuadratic) => {}
                    Err(e) => return Err(e),
                }
            }
        }
    }
    Ok(narrow_band)
}

/// Builds a narrow band from explicit candidate cells, one solver call
/// each. Used by the signed driver to seed its two marches.
pub fn band_from_indices<const N: usize, E: EikonalSolver<N>>(
    indices: &[[i32; N]],
    distance: &Grid<'_, f64, N>,
    solver: &E,
) -> Result<NarrowBand<N>> {
    let mut narrow_band = NarrowBand::new();
    for &index in indices {
        match solver.solve(index, distance) {
            Ok(d) => narrow_band.push(d, index),
            Err(EikonalError::UnsolvableQuadratic) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(narrow_band)
}
