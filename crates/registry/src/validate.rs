//! Validation and normalization helpers shared by every operation.

use crate::error::{RegistryError, RegistryResult};

/// Removes every ASCII space character from `value`.
#[must_use]
pub fn normalize(value: &str) -> String {
    value.replace(' ', "")
}

/// Whether a (normalized) value is usable: non-empty.
#[must_use]
pub fn is_valid(value: &str) -> bool {
    !value.is_empty()
}

/// Parses a page request: `page ≥ 0`, `size ≥ 1`.
///
/// # Errors
///
/// - [`RegistryError::PageSizeParse`] when either string is not an integer
/// - [`RegistryError::PageSizeInvalid`] when page is negative, or size is negative or zero
pub fn validate_page_and_size(page: &str, size: &str) -> RegistryResult<(usize, usize)> {
    let page: i64 = page.parse().map_err(|source| RegistryError::PageSizeParse { source })?;
    let size: i64 = size.parse().map_err(|source| RegistryError::PageSizeParse { source })?;

    if page < 0 || size <= 0 {
        return Err(RegistryError::PageSizeInvalid);
    }

    Ok((page as usize, size as usize))
}
