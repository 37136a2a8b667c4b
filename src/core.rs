// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{EikonalError, Result};

/// Sentinel distance for cells that have not been frozen yet.
///
/// The maximum finite value, not infinity and never NaN, so that every
/// computed distance compares strictly below it. A cell is frozen exactly
/// when its value is strictly less than this sentinel.
pub const UNFROZEN: f64 = f64::MAX;

/// Returns true if the distance value `d` marks a frozen cell.
#[inline]
pub fn frozen(d: f64) -> bool {
    d < UNFROZEN
}

/// Returns the number of cells in a grid of the given size.
/// Note: not checking for integer overflow here!
#[inline]
pub fn linear_size<const N: usize>(size: [usize; N]) -> usize {
    size.iter().product()
}

/// Returns true if `index` lies inside a grid of the given size.
///
/// Components are signed so that indices may go negative during
/// intermediate computation (the dilation grid is padded by one cell).
#[inline]
pub fn inside<const N: usize>(index: [i32; N], size: [usize; N]) -> bool {
    for i in 0..N {
        if index[i] < 0 || index[i] as usize >= size[i] {
            return false;
        }
    }
    true
}

/// Returns `index + offset` component-wise.
#[inline]
pub fn offset_index<const N: usize>(index: [i32; N], offset: [i32; N]) -> [i32; N] {
    let mut r = index;
    for i in 0..N {
        r[i] += offset[i];
    }
    r
}

/// Rejects grid sizes with a zero element.
pub(crate) fn validate_grid_size<const N: usize>(size: [usize; N]) -> Result<()> {
    for (axis, &s) in size.iter().enumerate() {
        if s == 0 {
            return Err(EikonalError::InvalidGridSize { axis, size: s });
        }
    }
    Ok(())
}

/// Row-major strides with axis 0 varying fastest: `[1, s0, s0*s1, ...]`.
fn grid_strides<const N: usize>(size: [usize; N]) -> [usize; N] {
    let mut strides = [1usize; N];
    for i in 1..N {
        strides[i] = strides[i - 1] * size[i - 1];
    }
    strides
}

/// A mutable N-dimensional view over a linear cell buffer.
///
/// The view does not own the buffer and never reallocates; strides are
/// computed once at construction. Axis 0 is the fastest-varying axis.
pub struct Grid<'a, T, const N: usize> {
    size: [usize; N],
    strides: [usize; N],
    cells: &'a mut [T],
}

impl<'a, T: Copy, const N: usize> Grid<'a, T, N> {
    /// Creates a view of `cells` shaped as `size`.
    ///
    /// # Errors
    /// Fails if any size element is zero or the buffer length does not
    /// equal the linear size.
    pub fn new(size: [usize; N], cells: &'a mut [T]) -> Result<Self> {
        validate_grid_size(size)?;
        if cells.len() != linear_size(size) {
            return Err(EikonalError::ShapeMismatch {
                expected: size.to_vec(),
                got: vec![cells.len()],
            });
        }
        Ok(Grid {
            size,
            strides: grid_strides(size),
            cells,
        })
    }

    /// Returns the grid size.
    pub fn size(&self) -> [usize; N] {
        self.size
    }

    /// Returns true if `index` lies inside the grid.
    pub fn inside(&self, index: [i32; N]) -> bool {
        inside(index, self.size)
    }

    fn linear(&self, index: [i32; N]) -> usize {
        debug_assert!(self.inside(index), "index {:?} outside {:?}", index, self.size);
        let mut k = 0usize;
        for i in 0..N {
            k += index[i] as usize * self.strides[i];
        }
        k
    }

    /// Returns the cell value at `index`. The index must be inside.
    #[inline]
    pub fn get(&self, index: [i32; N]) -> T {
        self.cells[self.linear(index)]
    }

    /// Writes the cell value at `index`. The index must be inside.
    #[inline]
    pub fn set(&mut self, index: [i32; N], value: T) {
        let k = self.linear(index);
        self.cells[k] = value;
    }
}

/// A shared N-dimensional view over a linear cell buffer.
///
/// The underlying buffer cannot be changed through this interface, so the
/// view may be shared freely (the speed grid is read by every solve call).
pub struct ConstGrid<'a, T, const N: usize> {
    size: [usize; N],
    strides: [usize; N],
    cells: &'a [T],
}

impl<'a, T: Copy, const N: usize> ConstGrid<'a, T, N> {
    /// Creates a read-only view of `cells` shaped as `size`.
    ///
    /// # Errors
    /// Fails if any size element is zero or the buffer length does not
    /// equal the linear size.
    pub fn new(size: [usize; N], cells: &'a [T]) -> Result<Self> {
        validate_grid_size(size)?;
        if cells.len() != linear_size(size) {
            return Err(EikonalError::ShapeMismatch {
                expected: size.to_vec(),
                got: vec![cells.len()],
            });
        }
        Ok(ConstGrid {
            size,
            strides: grid_strides(size),
            cells,
        })
    }

    /// Returns the grid size.
    pub fn size(&self) -> [usize; N] {
        self.size
    }

    /// Returns true if `index` lies inside the grid.
    pub fn inside(&self, index: [i32; N]) -> bool {
        inside(index, self.size)
    }

    /// Returns the cell value at `index`. The index must be inside.
    #[inline]
    pub fn get(&self, index: [i32; N]) -> T {
        debug_assert!(self.inside(index), "index {:?} outside {:?}", index, self.size);
        let mut k = 0usize;
        for i in 0..N {
            k += index[i] as usize * self.strides[i];
        }
        self.cells[k]
    }
}

/// Odometer-style iterator over every index of an N-dimensional extent,
/// last axis fastest. The order is stable across calls.
pub struct IndexIterator<const N: usize> {
    size: [usize; N],
    next: Option<[i32; N]>,
}

impl<const N: usize> IndexIterator<N> {
    /// Creates an iterator over all indices in `[0, size)` per axis.
    /// An extent with a zero element yields nothing.
    pub fn new(size: [usize; N]) -> Self {
        let next = if linear_size(size) == 0 {
            None
        } else {
            Some([0i32; N])
        };
        IndexIterator { size, next }
    }
}

impl<const N: usize> Iterator for IndexIterator<N> {
    type Item = [i32; N];

    fn next(&mut self) -> Option<[i32; N]> {
        let current = self.next?;
        let mut index = current;
        let mut advanced = false;
        for i in (0..N).rev() {
            if (index[i] as usize) < self.size[i] - 1 {
                index[i] += 1;
                advanced = true;
                break;
            }
            index[i] = 0;
        }
        self.next = if advanced { Some(index) } else { None };
        Some(current)
    }
}

/// Face neighbor offsets: for each axis the two unit offsets, +1 then -1.
/// 2N offsets in a stable order.
pub fn face_neighbor_offsets<const N: usize>() -> Vec<[i32; N]> {
    let mut offsets = Vec::with_capacity(2 * N);
    for axis in 0..N {
        for step in [1i32, -1] {
            let mut offset = [0i32; N];
            offset[axis] = step;
            offsets.push(offset);
        }
    }
    offsets
}

/// Vertex neighbor offsets: the Cartesian product {-1, 0, +1}^N with the
/// all-zero tuple removed. 3^N - 1 offsets in a stable order.
pub fn vertex_neighbor_offsets<const N: usize>() -> Vec<[i32; N]> {
    let mut offsets = Vec::with_capacity(3usize.pow(N as u32) - 1);
    for index in IndexIterator::new([3usize; N]) {
        let mut offset = [0i32; N];
        for i in 0..N {
            offset[i] = index[i] - 1;
        }
        if offset.iter().any(|&d| d != 0) {
            offsets.push(offset);
        }
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_axis0_fastest() {
        let mut buffer = vec![0.0f64; 3 * 4];
        let mut grid = Grid::<f64, 2>::new([3, 4], &mut buffer).unwrap();
        grid.set([1, 0], 1.0);
        grid.set([0, 1], 2.0);
        drop(grid);
        // linear index = i0 + i1 * s0
        assert_eq!(buffer[1], 1.0);
        assert_eq!(buffer[3], 2.0);
    }

    #[test]
    fn grid_read_write_roundtrip_3d() {
        let mut buffer = vec![0.0f64; 2 * 3 * 4];
        let mut grid = Grid::<f64, 3>::new([2, 3, 4], &mut buffer).unwrap();
        for index in IndexIterator::new([2usize, 3, 4]) {
            let v = (index[0] * 100 + index[1] * 10 + index[2]) as f64;
            grid.set(index, v);
        }
        for index in IndexIterator::new([2usize, 3, 4]) {
            let v = (index[0] * 100 + index[1] * 10 + index[2]) as f64;
            assert_eq!(grid.get(index), v, "at {:?}", index);
        }
    }

    #[test]
    fn grid_rejects_zero_dimension() {
        let mut buffer = vec![0.0f64; 0];
        let result = Grid::<f64, 2>::new([0, 4], &mut buffer);
        assert!(matches!(
            result,
            Err(EikonalError::InvalidGridSize { axis: 0, size: 0 })
        ));
    }

    #[test]
    fn grid_rejects_buffer_length_mismatch() {
        let mut buffer = vec![0.0f64; 11];
        let result = Grid::<f64, 2>::new([3, 4], &mut buffer);
        assert!(matches!(result, Err(EikonalError::ShapeMismatch { .. })));
    }

    #[test]
    fn inside_uses_signed_comparisons() {
        let size = [3usize, 4];
        assert!(inside([0, 0], size));
        assert!(inside([2, 3], size));
        assert!(!inside([-1, 0], size));
        assert!(!inside([0, -1], size));
        assert!(!inside([3, 0], size));
        assert!(!inside([0, 4], size));
    }

    #[test]
    fn index_iterator_visits_every_cell_once() {
        let mut seen = vec![false; 2 * 3 * 2];
        let mut count = 0;
        for index in IndexIterator::<3>::new([2, 3, 2]) {
            let k = index[0] as usize * 6 + index[1] as usize * 2 + index[2] as usize;
            assert!(!seen[k]);
            seen[k] = true;
            count += 1;
        }
        assert_eq!(count, 12);
    }

    #[test]
    fn face_offsets_have_expected_count_and_shape() {
        let offsets = face_neighbor_offsets::<3>();
        assert_eq!(offsets.len(), 6);
        for offset in &offsets {
            let nonzero: Vec<_> = offset.iter().filter(|&&d| d != 0).collect();
            assert_eq!(nonzero.len(), 1);
            assert_eq!(nonzero[0].abs(), 1);
        }
        // Stable order: axis-major, +1 before -1.
        assert_eq!(offsets[0], [1, 0, 0]);
        assert_eq!(offsets[1], [-1, 0, 0]);
        assert_eq!(offsets[2], [0, 1, 0]);
    }

    #[test]
    fn vertex_offsets_have_expected_count() {
        assert_eq!(vertex_neighbor_offsets::<1>().len(), 2);
        assert_eq!(vertex_neighbor_offsets::<2>().len(), 8);
        assert_eq!(vertex_neighbor_offsets::<3>().len(), 26);
        assert_eq!(vertex_neighbor_offsets::<4>().len(), 80);
    }

    #[test]
    fn vertex_offsets_exclude_zero_and_stay_in_range() {
        for offset in vertex_neighbor_offsets::<3>() {
            assert!(offset.iter().any(|&d| d != 0));
            assert!(offset.iter().all(|&d| (-1..=1).contains(&d)));
        }
    }

    #[test]
    fn frozen_thresholds() {
        assert!(!frozen(UNFROZEN));
        assert!(frozen(0.0));
        assert!(frozen(-1.0));
        assert!(frozen(1e300));
    }
}
