// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Flood-fill labelling and dilation-band extraction for the signed
//! driver: connected components of the seed set decide which cells are
//! enclosed by an interface and which lie outside it.

use crate::core::{
    face_neighbor_offsets, inside, linear_size, offset_index, vertex_neighbor_offsets, Grid,
};
use crate::error::Result;

#[derive(Clone, Copy, PartialEq, Eq)]
enum LabelCell {
    Background,
    Foreground,
    Labelled,
}

/// Partitions `indices` into maximally connected sets under the adjacency
/// given by `neighbor_offsets` (vertex offsets for seed clustering, face
/// offsets for dilation bands).
///
/// Every index must lie inside `grid_size`.
pub(crate) fn connected_components<const N: usize>(
    indices: &[[i32; N]],
    grid_size: [usize; N],
    neighbor_offsets: &[[i32; N]],
) -> Result<Vec<Vec<[i32; N]>>> {
    if indices.is_empty() {
        return Ok(Vec::new());
    }

    let mut label_buffer = vec![LabelCell::Background; linear_size(grid_size)];
    let mut labels = Grid::new(grid_size, &mut label_buffer)?;
    for &index in indices {
        debug_assert!(labels.inside(index));
        labels.set(index, LabelCell::Foreground);
    }

    let mut components = Vec::new();
    for &index in indices {
        // Already swept into an earlier component.
        if labels.get(index) != LabelCell::Foreground {
            continue;
        }
        labels.set(index, LabelCell::Labelled);
        let mut component = vec![index];
        let mut pending = vec![index];
        while let Some(current) = pending.pop() {
            for &offset in neighbor_offsets {
                let neighbor = offset_index(current, offset);
                if labels.inside(neighbor) && labels.get(neighbor) == LabelCell::Foreground {
                    labels.set(neighbor, LabelCell::Labelled);
                    component.push(neighbor);
                    pending.push(neighbor);
                }
            }
        }
        components.push(component);
    }
    Ok(components)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DilationCell {
    Background,
    Foreground,
    Dilated,
}

/// Returns the one-cell shells around a connected set of indices.
///
/// The set is rendered into a grid padded by one cell on each side, its
/// background vertex-neighbors are marked dilated, and the dilated cells
/// are split into face-adjacency components. Padded coordinates are then
/// shifted back and cells falling outside the original grid are dropped,
/// as are bands left empty by that clipping.
pub(crate) fn dilation_bands<const N: usize>(
    indices: &[[i32; N]],
    grid_size: [usize; N],
) -> Result<Vec<Vec<[i32; N]>>> {
    if indices.is_empty() {
        return Ok(Vec::new());
    }

    // Padding avoids boundary branching below: every vertex neighbor of an
    // in-grid cell is a valid padded index.
    let mut padded_size = grid_size;
    for s in padded_size.iter_mut() {
        *s += 2;
    }

    let mut dilation_buffer = vec![DilationCell::Background; linear_size(padded_size)];
    let mut dilation = Grid::new(padded_size, &mut dilation_buffer)?;
    for &index in indices {
        debug_assert!(inside(index, grid_size));
        dilation.set(pad(index), DilationCell::Foreground);
    }

    let offsets = vertex_neighbor_offsets::<N>();
    let mut dilated = Vec::new();
    for &index in indices {
        let padded = pad(index);
        for &offset in &offsets {
            let neighbor = offset_index(padded, offset);
            if dilation.get(neighbor) == DilationCell::Background {
                dilation.set(neighbor, DilationCell::Dilated);
                dilated.push(neighbor);
            }
        }
    }

    let face_offsets = face_neighbor_offsets::<N>();
    let components = connected_components(&dilated, padded_size, &face_offsets)?;

    let mut bands = Vec::new();
    for component in components {
        let band: Vec<[i32; N]> = component
            .into_iter()
            .map(unpad)
            .filter(|&index| inside(index, grid_size))
            .collect();
        if !band.is_empty() {
            bands.push(band);
        }
    }
    Ok(bands)
}

fn pad<const N: usize>(index: [i32; N]) -> [i32; N] {
    let mut r = index;
    for d in r.iter_mut() {
        *d += 1;
    }
    r
}

fn unpad<const N: usize>(index: [i32; N]) -> [i32; N] {
    let mut r = index;
    for d in r.iter_mut() {
        *d -= 1;
    }
    r
}

/// Axis-aligned bounding box of a non-empty index set, as inclusive
/// (min, max) pairs per axis.
pub(crate) fn bounding_box<const N: usize>(indices: &[[i32; N]]) -> [(i32, i32); N] {
    debug_assert!(!indices.is_empty());
    let mut bbox = [(i32::MAX, i32::MIN); N];
    for index in indices {
        for i in 0..N {
            bbox[i].0 = bbox[i].0.min(index[i]);
            bbox[i].1 = bbox[i].1.max(index[i]);
        }
    }
    bbox
}

/// Number of cells covered by an inclusive bounding box.
pub(crate) fn hyper_volume<const N: usize>(bbox: &[(i32, i32); N]) -> usize {
    let mut volume = 1usize;
    for &(lo, hi) in bbox.iter() {
        debug_assert!(lo <= hi);
        volume *= (hi - lo + 1) as usize;
    }
    volume
}
