//! Window dimension checks.

use tracing::warn;

use crate::schema::WindowConfig;

use super::helpers::validate_positive;

pub(crate) fn validate_window(errors: &mut Vec<String>, config: &WindowConfig) {
    validate_positive(errors, "size.width", config.size.width);
    validate_positive(errors, "size.height", config.size.height);
    validate_positive(errors, "min_size.width", config.min_size.width);
    validate_positive(errors, "min_size.height", config.min_size.height);

    if !config.min_size.fits_within(&config.size) {
        warn!(
            min_width = config.min_size.width,
            min_height = config.min_size.height,
            width = config.size.width,
            height = config.size.height,
            "min_size exceeds size; the window will open at min_size"
        );
    }
}
