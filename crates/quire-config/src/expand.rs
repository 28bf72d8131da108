//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// Only strings containing `${` are expanded. Once they are, shell rules
/// apply to the whole string, so a bare `$VAR` in the same string is
/// expanded too.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let expanded = shellexpand::env_with_context(value, lookup).map_err(|e| {
        ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.0),
        }
    })?;
    Ok(expanded.into_owned())
}

/// Name of a variable that is not set.
struct Unset(String);

fn lookup(var: &str) -> Result<Option<String>, Unset> {
    std::env::var(var)
        .map(Some)
        .map_err(|_| Unset(var.to_owned()))
}
