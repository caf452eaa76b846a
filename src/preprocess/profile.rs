//! Ink statistics and automatic profile selection
//!
//! The thresholds below were tuned empirically against patient drawings.

use crate::types::{InkStats, Profile};

/// Cells with more ink than this count as active
pub const ACTIVE_INK_THRESHOLD: f32 = 0.15;

/// Fewer active cells than this is a small drawing
const SMALL_ACTIVE_PIXELS: u32 = 120;

/// Less total ink than this is a faint drawing
const FAINT_PIXEL_SUM: f32 = 40.0;

/// Fewer active cells than this, with low mean ink, is a thin drawing.
/// Also the switch between strong and light smoothing.
const THIN_ACTIVE_PIXELS: u32 = 80;

/// Mean ink per active cell below which a small drawing is thin
const THIN_MEAN_INK: f32 = 0.5;

/// Very small drawings are never dilated
const VERY_SMALL_ACTIVE_PIXELS: u32 = 60;
const VERY_SMALL_PIXEL_SUM: f32 = 25.0;

/// Smoothing kernel strength for the enhanced profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Smoothing {
    /// `[[1,2,1],[2,4,2],[1,2,1]] / 16`
    Strong,
    /// `[[0,1,0],[1,4,1],[0,1,0]] / 8`
    Light,
}

/// Count active cells and total ink of a grid
pub fn ink_stats(grid: &[f32]) -> InkStats {
    let active_pixels = grid.iter().filter(|&&v| v > ACTIVE_INK_THRESHOLD).count() as u32;
    let pixel_sum = grid.iter().sum();
    InkStats {
        active_pixels,
        pixel_sum,
    }
}

impl InkStats {
    /// Drawings this small are not dilated in the enhanced profile
    pub fn is_very_small(&self) -> bool {
        self.active_pixels < VERY_SMALL_ACTIVE_PIXELS || self.pixel_sum < VERY_SMALL_PIXEL_SUM
    }

    /// Mean ink over active cells, 0 when none are active
    pub fn mean_active_ink(&self) -> f32 {
        if self.active_pixels == 0 {
            return 0.0;
        }
        self.pixel_sum / self.active_pixels as f32
    }

    /// Kernel used when the enhanced profile smooths this drawing
    pub fn smoothing(&self) -> Smoothing {
        if self.active_pixels < THIN_ACTIVE_PIXELS {
            Smoothing::Strong
        } else {
            Smoothing::Light
        }
    }
}

impl Profile {
    /// Pick a profile for faint, small or thin drawings
    pub fn detect(stats: &InkStats) -> Profile {
        let faint = stats.pixel_sum < FAINT_PIXEL_SUM;
        let small = stats.active_pixels < SMALL_ACTIVE_PIXELS;
        let thin =
            stats.active_pixels < THIN_ACTIVE_PIXELS && stats.mean_active_ink() < THIN_MEAN_INK;

        if faint || small || thin {
            Profile::Enhanced
        } else {
            Profile::Standard
        }
    }

    /// Use the requested profile or detect one from the statistics
    pub fn resolve(requested: Option<Profile>, stats: &InkStats) -> Profile {
        match requested {
            Some(profile) => profile,
            None => {
                let profile = Profile::detect(stats);
                log::debug!(
                    "auto-selected {} profile (active={}, sum={:.2})",
                    profile,
                    stats.active_pixels,
                    stats.pixel_sum
                );
                profile
            }
        }
    }
}
