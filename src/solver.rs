// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::core::{frozen, ConstGrid, Grid, UNFROZEN};
use crate::error::{EikonalError, Result};

/// Selects the upwind discretization order of the local update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// First-order Godunov upwind update.
    FirstOrder,
    /// Second-order upwind update where two frozen cells are available in
    /// the upwind direction, falling back to first order per axis.
    HighOrder,
}

/// Propagation speed of the interface, uniform or per cell.
///
/// A per-cell buffer must match the distance grid shape. Every speed must
/// be positive and finite; this is checked before marching begins.
#[derive(Debug, Clone, Copy)]
pub enum SpeedField<'a> {
    /// One speed for the whole grid. Speed 1 yields Euclidean distance.
    Uniform(f64),
    /// One speed per grid cell, in the distance buffer layout.
    Varying(&'a [f64]),
}

/// Rejects spacings that are not positive and finite.
fn validate_grid_spacing<const N: usize>(grid_spacing: [f64; N]) -> Result<()> {
    for (axis, &h) in grid_spacing.iter().enumerate() {
        if !(h.is_finite() && h > 0.0) {
            return Err(EikonalError::InvalidGridSpacing { axis, spacing: h });
        }
    }
    Ok(())
}

/// Rejects speeds that are not positive and finite.
fn validate_speed(value: f64, index: Option<usize>) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(EikonalError::InvalidSpeed { index, value });
    }
    Ok(())
}

/// Returns the larger real root of `q[2]*x^2 + q[1]*x + q[0] = 0`.
///
/// A negative discriminant, a negative root, or a vanishing quadratic
/// coefficient (no axis contributed) is an unsolvable update.
fn solve_quadratic(q: [f64; 3]) -> Result<f64> {
    if q[2] == 0.0 {
        return Err(EikonalError::UnsolvableQuadratic);
    }
    let discriminant = q[1] * q[1] - 4.0 * q[2] * q[0];
    if discriminant < 0.0 {
        return Err(EikonalError::UnsolvableQuadratic);
    }
    let root = (-q[1] + discriminant.sqrt()) / (2.0 * q[2]);
    if root < 0.0 {
        return Err(EikonalError::UnsolvableQuadratic);
    }
    Ok(root)
}

/// First-order eikonal update at `index`.
///
/// Accumulates, per axis, the quadratic contribution of the smallest
/// frozen face neighbor; axes with no frozen neighbor do not contribute.
/// The coefficients start from `-1/speed^2`, so the returned root solves
/// the Godunov upwind discretization of |grad u| = 1/speed.
pub fn solve_first_order<const N: usize>(
    index: [i32; N],
    distance: &Grid<'_, f64, N>,
    speed: f64,
    grid_spacing: [f64; N],
) -> Result<f64> {
    let mut q = [-1.0 / (speed * speed), 0.0, 0.0];

    for axis in 0..N {
        let mut neighbor_min = UNFROZEN;
        for step in [-1i32, 1] {
            let mut neighbor = index;
            neighbor[axis] += step;
            if distance.inside(neighbor) {
                // Non-frozen neighbors hold the sentinel and never win.
                let d = distance.get(neighbor);
                if d < neighbor_min {
                    neighbor_min = d;
                }
            }
        }

        if frozen(neighbor_min) {
            let w = 1.0 / (grid_spacing[axis] * grid_spacing[axis]);
            q[0] += neighbor_min * neighbor_min * w;
            q[1] += -2.0 * neighbor_min * w;
            q[2] += w;
        }
    }

    solve_quadratic(q)
}

/// High-order eikonal update at `index`.
///
/// Per axis, if the cell two steps away in the chosen upwind direction is
/// frozen with a value less than or equal to the one-step value (equality
/// included), the axis contributes the second-order stencil; otherwise it
/// falls back to the first-order contribution.
pub fn solve_high_order<const N: usize>(
    index: [i32; N],
    distance: &Grid<'_, f64, N>,
    speed: f64,
    grid_spacing: [f64; N],
) -> Result<f64> {
    let mut q = [-1.0 / (speed * speed), 0.0, 0.0];

    for axis in 0..N {
        let mut neighbor_min = UNFROZEN;
        let mut neighbor_min2 = UNFROZEN;
        for step in [-1i32, 1] {
            let mut neighbor = index;
            neighbor[axis] += step;
            if !distance.inside(neighbor) {
                continue;
            }
            let d = distance.get(neighbor);
            if d < neighbor_min {
                neighbor_min = d;
                // The two-step candidate follows the chosen direction.
                neighbor_min2 = UNFROZEN;
                let mut neighbor2 = neighbor;
                neighbor2[axis] += step;
                if distance.inside(neighbor2) {
                    let d2 = distance.get(neighbor2);
                    if d2 <= d {
                        neighbor_min2 = d2;
                    }
                }
            }
        }

        if !frozen(neighbor_min) {
            continue;
        }
        if frozen(neighbor_min2) {
            let alpha = 9.0 / (4.0 * grid_spacing[axis] * grid_spacing[axis]);
            let t = (4.0 * neighbor_min - neighbor_min2) / 3.0;
            q[0] += t * t * alpha;
            q[1] += -2.0 * t * alpha;
            q[2] += alpha;
        } else {
            let w = 1.0 / (grid_spacing[axis] * grid_spacing[axis]);
            q[0] += neighbor_min * neighbor_min * w;
            q[1] += -2.0 * neighbor_min * w;
            q[2] += w;
        }
    }

    solve_quadratic(q)
}

/// Local eikonal update: produces the distance for a single cell from the
/// current state of the distance grid.
///
/// Implementations are monomorphized over the speed source and the
/// discretization order; the marcher is generic over this trait.
pub trait EikonalSolver<const N: usize> {
    /// Returns the distance for the cell at `index` given the current
    /// distance grid, or `UnsolvableQuadratic` if no valid update exists.
    fn solve(&self, index: [i32; N], distance: &Grid<'_, f64, N>) -> Result<f64>;
}

/// First-order solver with a uniform speed.
#[derive(Debug, Clone)]
pub struct UniformSpeedSolver<const N: usize> {
    grid_spacing: [f64; N],
    speed: f64,
}

impl<const N: usize> UniformSpeedSolver<N> {
    /// Creates a solver with the given spacing and uniform speed.
    ///
    /// # Errors
    /// Fails if any spacing or the speed is not positive and finite.
    pub fn new(grid_spacing: [f64; N], speed: f64) -> Result<Self> {
        validate_grid_spacing(grid_spacing)?;
        validate_speed(speed, None)?;
        Ok(UniformSpeedSolver {
            grid_spacing,
            speed,
        })
    }
}

impl<const N: usize> EikonalSolver<N> for UniformSpeedSolver<N> {
    fn solve(&self, index: [i32; N], distance: &Grid<'_, f64, N>) -> Result<f64> {
        solve_first_order(index, distance, self.speed, self.grid_spacing)
    }
}

/// High-order solver with a uniform speed.
#[derive(Debug, Clone)]
pub struct HighOrderUniformSpeedSolver<const N: usize> {
    grid_spacing: [f64; N],
    speed: f64,
}

impl<const N: usize> HighOrderUniformSpeedSolver<N> {
    /// Creates a solver with the given spacing and uniform speed.
    ///
    /// # Errors
    /// Fails if any spacing or the speed is not positive and finite.
    pub fn new(grid_spacing: [f64; N], speed: f64) -> Result<Self> {
        validate_grid_spacing(grid_spacing)?;
        validate_speed(speed, None)?;
        Ok(HighOrderUniformSpeedSolver {
            grid_spacing,
            speed,
        })
    }
}

impl<const N: usize> EikonalSolver<N> for HighOrderUniformSpeedSolver<N> {
    fn solve(&self, index: [i32; N], distance: &Grid<'_, f64, N>) -> Result<f64> {
        solve_high_order(index, distance, self.speed, self.grid_spacing)
    }
}

/// First-order solver reading speed from a per-cell grid.
pub struct VaryingSpeedSolver<'a, const N: usize> {
    grid_spacing: [f64; N],
    speed: ConstGrid<'a, f64, N>,
}

impl<'a, const N: usize> VaryingSpeedSolver<'a, N> {
    /// Creates a solver over a borrowed speed buffer shaped as
    /// `speed_grid_size`.
    ///
    /// # Errors
    /// Fails if any spacing is invalid, the buffer does not match the
    /// grid size, or any speed is not positive and finite.
    pub fn new(
        grid_spacing: [f64; N],
        speed_grid_size: [usize; N],
        speed_buffer: &'a [f64],
    ) -> Result<Self> {
        validate_grid_spacing(grid_spacing)?;
        let speed = ConstGrid::new(speed_grid_size, speed_buffer)?;
        for (index, &value) in speed_buffer.iter().enumerate() {
            validate_speed(value, Some(index))?;
        }
        Ok(VaryingSpeedSolver {
            grid_spacing,
            speed,
        })
    }

    fn speed_at(&self, index: [i32; N]) -> Result<f64> {
        if !self.speed.inside(index) {
            return Err(EikonalError::SpeedOutOfBounds {
                index: index.to_vec(),
            });
        }
        Ok(self.speed.get(index))
    }
}

impl<'a, const N: usize> EikonalSolver<N> for VaryingSpeedSolver<'a, N> {
    fn solve(&self, index: [i32; N], distance: &Grid<'_, f64, N>) -> Result<f64> {
        solve_first_order(index, distance, self.speed_at(index)?, self.grid_spacing)
    }
}

/// High-order solver reading speed from a per-cell grid.
pub struct HighOrderVaryingSpeedSolver<'a, const N: usize> {
    grid_spacing: [f64; N],
    speed: ConstGrid<'a, f64, N>,
}

impl<'a, const N: usize> HighOrderVaryingSpeedSolver<'a, N> {
    /// Creates a solver over a borrowed speed buffer shaped as
    /// `speed_grid_size`.
    ///
    /// # Errors
    /// Fails if any spacing is invalid, the buffer does not match the
    /// grid size, or any speed is not positive and finite.
    pub fn new(
        grid_spacing: [f64; N],
        speed_grid_size: [usize; N],
        speed_buffer: &'a [f64],
    ) -> Result<Self> {
        validate_grid_spacing(grid_spacing)?;
        let speed = ConstGrid::new(speed_grid_size, speed_buffer)?;
        for (index, &value) in speed_buffer.iter().enumerate() {
            validate_speed(value, Some(index))?;
        }
        Ok(HighOrderVaryingSpeedSolver {
            grid_spacing,
            speed,
        })
    }

    fn speed_at(&self, index: [i32; N]) -> Result<f64> {
        if !self.speed.inside(index) {
            return Err(EikonalError::SpeedOutOfBounds {
                index: index.to_vec(),
            });
        }
        Ok(self.speed.get(index))
    }
}

impl<'a, const N: usize> EikonalSolver<N> for HighOrderVaryingSpeedSolver<'a, N> {
    fn solve(&self, index: [i32; N], distance: &Grid<'_, f64, N>) -> Result<f64> {
        solve_high_order(index, distance, self.speed_at(index)?, self.grid_spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from<'a, const N: usize>(
        size: [usize; N],
        buffer: &'a mut [f64],
    ) -> Grid<'a, f64, N> {
        Grid::new(size, buffer).unwrap()
    }

    #[test]
    fn first_order_single_frozen_neighbor() {
        // One frozen neighbor at 0: u = 0 + h / s.
        let mut buffer = vec![UNFROZEN; 9];
        let mut grid = grid_from([3, 3], &mut buffer);
        grid.set([1, 1], 0.0);
        let u = solve_first_order([2, 1], &grid, 1.0, [1.0, 1.0]).unwrap();
        assert!((u - 1.0).abs() < 1e-12);

        let u = solve_first_order([2, 1], &grid, 2.0, [1.0, 1.0]).unwrap();
        assert!((u - 0.5).abs() < 1e-12);
    }

    #[test]
    fn first_order_two_frozen_neighbors() {
        // Both axis minima at 0, h = 1, s = 1: 2u^2 = 1, u = 1/sqrt(2).
        let mut buffer = vec![UNFROZEN; 9];
        let mut grid = grid_from([3, 3], &mut buffer);
        grid.set([0, 1], 0.0);
        grid.set([1, 0], 0.0);
        let u = solve_first_order([1, 1], &grid, 1.0, [1.0, 1.0]).unwrap();
        assert!((u - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn first_order_takes_axis_minimum() {
        let mut buffer = vec![UNFROZEN; 9];
        let mut grid = grid_from([3, 3], &mut buffer);
        grid.set([0, 1], 0.5);
        grid.set([2, 1], 0.2);
        let u = solve_first_order([1, 1], &grid, 1.0, [1.0, 1.0]).unwrap();
        assert!((u - 1.2).abs() < 1e-12);
    }

    #[test]
    fn first_order_respects_anisotropic_spacing() {
        let mut buffer = vec![UNFROZEN; 9];
        let mut grid = grid_from([3, 3], &mut buffer);
        grid.set([1, 0], 0.0);
        // Only axis 1 contributes, with h = 0.5.
        let u = solve_first_order([1, 1], &grid, 1.0, [1.0, 0.5]).unwrap();
        assert!((u - 0.5).abs() < 1e-12);
    }

    #[test]
    fn first_order_no_frozen_neighbor_is_unsolvable() {
        let mut buffer = vec![UNFROZEN; 9];
        let grid = grid_from([3, 3], &mut buffer);
        let result = solve_first_order([1, 1], &grid, 1.0, [1.0, 1.0]);
        assert!(matches!(result, Err(EikonalError::UnsolvableQuadratic)));
    }

    #[test]
    fn first_order_negative_discriminant_is_unsolvable() {
        // Frozen neighbors 0 and 100 on different axes: the front cannot
        // satisfy both, the discriminant goes negative.
        let mut buffer = vec![UNFROZEN; 9];
        let mut grid = grid_from([3, 3], &mut buffer);
        grid.set([0, 1], 0.0);
        grid.set([1, 0], 100.0);
        let result = solve_first_order([1, 1], &grid, 1.0, [1.0, 1.0]);
        assert!(matches!(result, Err(EikonalError::UnsolvableQuadratic)));
    }

    #[test]
    fn high_order_uses_two_step_neighbor() {
        // Column 0, 1 frozen along axis 0: t = (4*1 - 0)/3, alpha = 9/4,
        // giving the exact plane-wave value u = 2.
        let mut buffer = vec![UNFROZEN; 16];
        let mut grid = grid_from([4, 4], &mut buffer);
        grid.set([0, 1], 0.0);
        grid.set([1, 1], 1.0);
        let u = solve_high_order([2, 1], &grid, 1.0, [1.0, 1.0]).unwrap();
        assert!((u - 2.0).abs() < 1e-12);
    }

    #[test]
    fn high_order_accepts_equal_two_step_value() {
        // Two-step neighbor equal to the one-step neighbor still counts.
        let mut buffer = vec![UNFROZEN; 16];
        let mut grid = grid_from([4, 4], &mut buffer);
        grid.set([0, 1], 1.0);
        grid.set([1, 1], 1.0);
        let u = solve_high_order([2, 1], &grid, 1.0, [1.0, 1.0]).unwrap();
        // t = (4 - 1)/3 = 1, alpha*(u - 1)^2 = 1 => u = 1 + 2/3.
        assert!((u - (1.0 + 2.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn high_order_falls_back_when_two_step_larger() {
        let mut buffer = vec![UNFROZEN; 16];
        let mut grid = grid_from([4, 4], &mut buffer);
        grid.set([0, 1], 5.0);
        grid.set([1, 1], 1.0);
        let first = solve_first_order([2, 1], &grid, 1.0, [1.0, 1.0]).unwrap();
        let high = solve_high_order([2, 1], &grid, 1.0, [1.0, 1.0]).unwrap();
        assert!((high - first).abs() < 1e-12);
        assert!((high - 2.0).abs() < 1e-12);
    }

    #[test]
    fn high_order_discards_stale_two_step_on_direction_change() {
        // Axis 0 offers 5 (with two-step 4) from one side and 3 (with no
        // monotone two-step) from the other; the 3 direction wins and the
        // stale two-step from the 5 direction must not be used.
        let mut buffer = vec![UNFROZEN; 25];
        let mut grid = grid_from([5, 5], &mut buffer);
        grid.set([0, 2], 4.0);
        grid.set([1, 2], 5.0);
        grid.set([3, 2], 3.0);
        grid.set([4, 2], 10.0);
        let u = solve_high_order([2, 2], &grid, 1.0, [1.0, 1.0]).unwrap();
        // First-order from 3: u = 4.
        assert!((u - 4.0).abs() < 1e-12);
    }

    #[test]
    fn uniform_solver_rejects_bad_inputs() {
        assert!(matches!(
            UniformSpeedSolver::<2>::new([1.0, 0.0], 1.0),
            Err(EikonalError::InvalidGridSpacing { axis: 1, .. })
        ));
        assert!(matches!(
            UniformSpeedSolver::<2>::new([1.0, 1.0], 0.0),
            Err(EikonalError::InvalidSpeed { index: None, .. })
        ));
        assert!(matches!(
            UniformSpeedSolver::<2>::new([1.0, 1.0], f64::NAN),
            Err(EikonalError::InvalidSpeed { index: None, .. })
        ));
    }

    #[test]
    fn varying_solver_rejects_bad_buffer() {
        let speed = vec![1.0, 1.0, 0.0, 1.0];
        assert!(matches!(
            VaryingSpeedSolver::<2>::new([1.0, 1.0], [2, 2], &speed),
            Err(EikonalError::InvalidSpeed { index: Some(2), .. })
        ));

        let speed = vec![1.0; 3];
        assert!(matches!(
            VaryingSpeedSolver::<2>::new([1.0, 1.0], [2, 2], &speed),
            Err(EikonalError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn varying_solver_reads_speed_at_focal_cell() {
        let speed = vec![2.0, 2.0, 2.0, 4.0];
        let solver = VaryingSpeedSolver::<2>::new([1.0, 1.0], [2, 2], &speed).unwrap();
        let mut buffer = vec![UNFROZEN; 4];
        let mut grid = grid_from([2, 2], &mut buffer);
        grid.set([0, 1], 0.0);
        // Focal cell [1, 1] has speed 4: u = 0 + 1/4.
        let u = solver.solve([1, 1], &grid).unwrap();
        assert!((u - 0.25).abs() < 1e-12);
    }

    #[test]
    fn varying_solver_rejects_out_of_range_index() {
        let speed = vec![1.0; 4];
        let solver = VaryingSpeedSolver::<2>::new([1.0, 1.0], [2, 2], &speed).unwrap();
        let mut buffer = vec![UNFROZEN; 9];
        let mut grid = grid_from([3, 3], &mut buffer);
        grid.set([1, 2], 0.0);
        let result = solver.solve([2, 2], &grid);
        assert!(matches!(result, Err(EikonalError::SpeedOutOfBounds { .. })));
    }
}
