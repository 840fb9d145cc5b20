//! Environment bootstrap for credential injection.
//!
//! Production schedulers pass storage credentials as a single
//! `--env_vars 'KEY=VALUE;KEY=VALUE'` argument rather than a pre-populated
//! environment, so the pairs are exported here before the logger is
//! configured or any storage call runs.

use log::debug;

use crate::error_handling::types::ArgsError;

/// Parses `spec` using `;` (when present) or newline as the delimiter and
/// exports each pair. Blank entries are skipped; values may contain `=`.
pub fn export_env_vars(spec: &str) -> Result<(), ArgsError> {
    let delimiter = if spec.contains(';') { ';' } else { '\n' };

    for raw in spec.split(delimiter) {
        let pair = raw.trim();
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| ArgsError::BadEnvPair(pair.to_string()))?;
        std::env::set_var(key, value);
        debug!("exported environment variable {}", key);
    }

    Ok(())
}
