//! Pure calculation functions for thumbnail dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;

/// Calculate the thumbnail size for a source inside a bounding box.
///
/// Sources that already fit are returned unchanged (never upscaled). Larger
/// sources are scaled down by whichever factor (`source / bound`) is bigger,
/// so the longer relative side touches the box and the aspect ratio is kept.
/// Both results are rounded half away from zero.
///
/// Returns `None` for a zero-area source or a zero-sized bound.
///
/// # Examples
/// ```
/// # use thumbcascade::imaging::{Dimensions, plan_dimensions};
/// let bound = Dimensions { width: 32, height: 32 };
/// // 20x50 → height factor 1.5625 wins → 12.8x32 → 13x32
/// let plan = plan_dimensions(Dimensions { width: 20, height: 50 }, bound);
/// assert_eq!(plan, Some(Dimensions { width: 13, height: 32 }));
/// ```
pub fn plan_dimensions(source: Dimensions, bound: Dimensions) -> Option<Dimensions> {
    if source.area() == 0 || bound.area() == 0 {
        return None;
    }
    if source.width <= bound.width && source.height <= bound.height {
        return Some(source);
    }

    let width_factor = source.width as f64 / bound.width as f64;
    let height_factor = source.height as f64 / bound.height as f64;

    let factor = if width_factor >= height_factor && width_factor > 1.0 {
        width_factor
    } else if height_factor > 1.0 {
        height_factor
    } else {
        1.0
    };

    // f64::round rounds half away from zero
    Some(Dimensions {
        width: (source.width as f64 / factor).round() as u32,
        height: (source.height as f64 / factor).round() as u32,
    })
}

/// The single edge a library-driven resize should be constrained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitEdge {
    /// Scale so the width equals this value; height follows the aspect ratio.
    Width(u32),
    /// Scale so the height equals this value; width follows the aspect ratio.
    Height(u32),
}

/// Pick the bounding-box edge that limits the scale.
///
/// Fits to width when the width ratio (`bound / source`) is the smaller one,
/// otherwise to height. Ties go to height, which yields the same size.
///
/// Returns `None` for a zero-area source or a zero-sized bound.
pub fn dominant_edge(source: Dimensions, bound: Dimensions) -> Option<FitEdge> {
    if source.area() == 0 || bound.area() == 0 {
        return None;
    }
    let width_ratio = bound.width as f64 / source.width as f64;
    let height_ratio = bound.height as f64 / source.height as f64;

    if width_ratio < height_ratio {
        Some(FitEdge::Width(bound.width))
    } else {
        Some(FitEdge::Height(bound.height))
    }
}
