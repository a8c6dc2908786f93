//! Shared validation helpers used by the domain validators.

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error if `value` is zero.
pub(crate) fn validate_positive(errors: &mut Vec<String>, name: &str, value: u32) {
    if value == 0 {
        errors.push(format!("{name} must be positive"));
    }
}
