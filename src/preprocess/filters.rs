//! Grid filters applied after padding
//!
//! All filters operate on row-major 28×28 grids and return a fresh grid.

use crate::preprocess::profile::Smoothing;
use crate::preprocess::round_half_up;
use crate::types::{TENSOR_LEN, TENSOR_SIDE};

/// Binarization cut-off for the enhanced profile
pub const BINARIZE_THRESHOLD: f32 = 0.25;

/// Maximum displacement per axis when re-centering
const MAX_CENTER_SHIFT: i64 = 1;

const SIDE: i64 = TENSOR_SIDE as i64;

fn at(grid: &[f32], x: i64, y: i64) -> f32 {
    if x < 0 || y < 0 || x >= SIDE || y >= SIDE {
        0.0
    } else {
        grid[(y * SIDE + x) as usize]
    }
}

/// Ink-weighted centroid `(x, y)`, or `None` for an empty grid
pub fn centroid(grid: &[f32]) -> Option<(f64, f64)> {
    let mut total = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for (i, &v) in grid.iter().enumerate() {
        let v = v as f64;
        cx += (i % TENSOR_SIDE) as f64 * v;
        cy += (i / TENSOR_SIDE) as f64 * v;
        total += v;
    }
    if total <= 0.0 {
        return None;
    }
    Some((cx / total, cy / total))
}

/// Nudge the grid toward its center of mass.
///
/// The shift `round(14 - centroid)` is clamped to one cell per axis; larger
/// offsets are deliberately left uncorrected.
pub fn center_by_mass(grid: &[f32]) -> Vec<f32> {
    let Some((cx, cy)) = centroid(grid) else {
        return grid.to_vec();
    };

    let half = (TENSOR_SIDE / 2) as f64;
    let shift_x = (round_half_up(half - cx) as i64).clamp(-MAX_CENTER_SHIFT, MAX_CENTER_SHIFT);
    let shift_y = (round_half_up(half - cy) as i64).clamp(-MAX_CENTER_SHIFT, MAX_CENTER_SHIFT);

    let mut out = vec![0.0; TENSOR_LEN];
    for y in 0..SIDE {
        for x in 0..SIDE {
            out[(y * SIDE + x) as usize] = at(grid, x - shift_x, y - shift_y);
        }
    }
    out
}

/// 3×3 smoothing with zero padding, output the same size as the input
pub fn smooth(grid: &[f32], level: Smoothing) -> Vec<f32> {
    let (kernel, divisor): ([[f32; 3]; 3], f32) = match level {
        Smoothing::Strong => ([[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]], 16.0),
        Smoothing::Light => ([[0.0, 1.0, 0.0], [1.0, 4.0, 1.0], [0.0, 1.0, 0.0]], 8.0),
    };

    let mut out = vec![0.0; TENSOR_LEN];
    for y in 0..SIDE {
        for x in 0..SIDE {
            let mut acc = 0.0;
            for (ky, row) in kernel.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    acc += weight * at(grid, x + kx as i64 - 1, y + ky as i64 - 1);
                }
            }
            out[(y * SIDE + x) as usize] = acc / divisor;
        }
    }
    out
}

/// 3×3 max filter, stride 1, same-size output
pub fn dilate(grid: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0; TENSOR_LEN];
    for y in 0..SIDE {
        for x in 0..SIDE {
            let mut max = f32::NEG_INFINITY;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let (nx, ny) = (x + dx, y + dy);
                    if (0..SIDE).contains(&nx) && (0..SIDE).contains(&ny) {
                        max = max.max(grid[(ny * SIDE + nx) as usize]);
                    }
                }
            }
            out[(y * SIDE + x) as usize] = max;
        }
    }
    out
}

/// Cells strictly above `threshold` become 1, others 0
pub fn binarize(grid: &[f32], threshold: f32) -> Vec<f32> {
    grid.iter()
        .map(|&v| if v > threshold { 1.0 } else { 0.0 })
        .collect()
}
