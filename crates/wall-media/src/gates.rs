//! Frame-count and resolution gates.
//!
//! Pure classification, no I/O. Tolerances are exacting: equality on the
//! frame count, a one-sided trim margin on the long side only, and
//! greater-or-equal (or exactly-equal, when strict) on resolution.

use wall_models::Resolution;

/// Outcome of comparing a probed frame count against a required one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthClass {
    /// Frame counts match; no action needed.
    Exact,
    /// Over-length but within the trim margin; trimming repairs it.
    TrimNeeded,
    /// Over-length by the margin or more; not acceptable.
    TooLong,
    /// Under-length; never acceptable, no margin applies.
    TooShort,
}

/// Classify a probed frame count against the required count.
pub fn classify_length(probed: u64, required: u64, margin: u64) -> LengthClass {
    if probed == required {
        LengthClass::Exact
    } else if probed > required {
        if probed < required + margin {
            LengthClass::TrimNeeded
        } else {
            LengthClass::TooLong
        }
    } else {
        LengthClass::TooShort
    }
}

/// Whether `probed` satisfies `required`. Non-strict accepts anything at
/// least as large on both axes (the excess is cropped away later); strict
/// demands exact equality and is used to skip cropping entirely.
pub fn meets_resolution(probed: Resolution, required: Resolution, strict: bool) -> bool {
    if strict {
        probed.width == required.width && probed.height == required.height
    } else {
        probed.width >= required.width && probed.height >= required.height
    }
}
