//! Ratio bookkeeping for container children.
//!
//! Ratios are percentages: the shares of one container always add up to
//! [`RATIO_TOTAL`] within [`RATIO_SUM_TOLERANCE`]. Every helper here keeps
//! that sum fixed, moving share between slots instead of creating or
//! destroying it.

use crate::error::{LayoutError, ValidationError};
use crate::node::ContainerId;

/// Sum every container's ratios must reach.
pub const RATIO_TOTAL: f64 = 100.0;

/// Accepted drift of a ratio sum from [`RATIO_TOTAL`].
pub const RATIO_SUM_TOLERANCE: f64 = 1e-6;

/// Divide one slot's share for a split.
///
/// The existing child keeps `percentage` of `ratio` and the new child gets
/// the remainder. The pair is returned in slot order: `(kept, new)` when the
/// new child goes after, `(new, kept)` when it goes before. Inserting before
/// therefore puts the remainder in the first slot; `percentage` always
/// follows the existing child rather than the slot position.
#[must_use]
pub fn split_ratio(ratio: f64, percentage: f64, insert_after: bool) -> (f64, f64) {
    let kept = ratio * percentage / RATIO_TOTAL;
    let rest = ratio - kept;
    if insert_after {
        (kept, rest)
    } else {
        (rest, kept)
    }
}

/// Remove slot `index`, folding its share into a neighbor.
///
/// The share goes to the predecessor; only the first slot, which has none,
/// folds into its successor. Returns the removed child, or `None` when
/// `index` is out of range or fewer than two slots exist.
pub fn merge_ratio<T>(ratios: &mut Vec<f64>, children: &mut Vec<T>, index: usize) -> Option<T> {
    if ratios.len() != children.len() || children.len() < 2 || index >= children.len() {
        return None;
    }
    if index == 0 {
        let first = ratios.remove(0);
        ratios[0] += first;
    } else {
        let removed = ratios.remove(index);
        ratios[index - 1] += removed;
    }
    Some(children.remove(index))
}

/// Move the divider between `ratios[index]` and `ratios[index + 1]`.
///
/// Positive `delta` grows the slot before the divider. The shift is clamped
/// so neither neighbor drops below 0; no other slot changes. Returns the
/// delta actually applied.
pub fn apply_resize(ratios: &mut [f64], index: usize, delta: f64) -> Result<f64, LayoutError> {
    if !delta.is_finite() {
        return Err(LayoutError::NonFiniteDelta { delta });
    }
    let dividers = ratios.len().saturating_sub(1);
    if index >= dividers {
        return Err(LayoutError::DividerOutOfRange { index, dividers });
    }
    let lower = -ratios[index].max(0.0);
    let upper = ratios[index + 1].max(0.0);
    let applied = delta.clamp(lower, upper);
    ratios[index] += applied;
    ratios[index + 1] -= applied;
    Ok(applied)
}

/// Check one container's ratio sequence against its child count.
pub fn validate_ratios(
    container: ContainerId,
    ratios: &[f64],
    children: usize,
) -> Result<(), ValidationError> {
    if ratios.len() != children {
        return Err(ValidationError::RatioCountMismatch {
            container,
            ratios: ratios.len(),
            children,
        });
    }
    if children < 2 {
        return Err(ValidationError::DegenerateContainer {
            container,
            children,
        });
    }
    if let Some((index, value)) = ratios
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| !value.is_finite() || *value < 0.0)
    {
        return Err(ValidationError::InvalidRatio {
            container,
            index,
            value,
        });
    }
    let sum: f64 = ratios.iter().sum();
    if (sum - RATIO_TOTAL).abs() > RATIO_SUM_TOLERANCE {
        return Err(ValidationError::RatioSumOutOfTolerance { container, sum });
    }
    Ok(())
}
