//! Pure calculation functions for responsive variants.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;
use super::params::Breakpoint;

/// Breakpoints that fit inside the natural width.
///
/// A breakpoint is kept when its width is less than or equal to the natural
/// width, so images are never upscaled.
///
/// # Examples
/// ```
/// # use sitelift::imaging::{select_breakpoints, BREAKPOINTS};
/// let widths: Vec<u32> = select_breakpoints(600, &BREAKPOINTS).iter().map(|b| b.width).collect();
/// assert_eq!(widths, vec![480]);
/// ```
pub fn select_breakpoints(natural_width: u32, breakpoints: &[Breakpoint]) -> Vec<Breakpoint> {
    breakpoints
        .iter()
        .filter(|bp| bp.width <= natural_width)
        .copied()
        .collect()
}

/// Height for a resize to `target_width`, keeping the aspect ratio.
pub fn scaled_height(natural: Dimensions, target_width: u32) -> u32 {
    if natural.width == 0 {
        return 0;
    }
    let h = (natural.height as f64 * target_width as f64 / natural.width as f64).round() as u32;
    h.max(1)
}
