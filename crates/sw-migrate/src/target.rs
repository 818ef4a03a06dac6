//! Target version resolution for `baseline`, `migrate` and `reset`.

use crate::error::{MigrationError, MigrationResult};

/// Resolve an optional user-supplied target into a concrete version.
///
/// `None` means the latest local version. Otherwise the specifier must be a
/// plain decimal number in `1..=latest`; migration names are not accepted.
pub fn resolve_target_version(spec: Option<&str>, latest: usize) -> MigrationResult<i32> {
    let latest_version = i32::try_from(latest).unwrap_or(i32::MAX);
    let Some(spec) = spec else {
        return Ok(latest_version);
    };

    let invalid = || MigrationError::InvalidTargetVersion {
        spec: spec.to_string(),
        latest,
    };

    let trimmed = spec.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let version: i32 = trimmed.parse().map_err(|_| invalid())?;
    if version < 1 || version > latest_version {
        return Err(invalid());
    }
    Ok(version)
}
