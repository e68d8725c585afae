//! Node identity: canonical hostname from an override or the local system.

use crate::error::BootstrapError;
use serde::Serialize;
use std::fmt;

/// Trimmed, lower-cased node name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedHostname(String);

impl NormalizedHostname {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    fn normalize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }
}

impl fmt::Display for NormalizedHostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedHostname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolve the node identity, falling back to the system hostname when
/// `override_name` is empty.
pub fn resolve(override_name: &str) -> Result<NormalizedHostname, BootstrapError> {
    resolve_with(override_name, system_hostname)
}

/// Same as [`resolve`], with the system lookup supplied by the caller.
///
/// An override that is only whitespace is rejected; it never falls back to
/// the provider. The provider's answer is trusted to be non-empty.
pub fn resolve_with<F>(
    override_name: &str,
    provider: F,
) -> Result<NormalizedHostname, BootstrapError>
where
    F: FnOnce() -> Result<String, BootstrapError>,
{
    if !override_name.is_empty() {
        let name = NormalizedHostname::normalize(override_name);
        if name.is_empty() {
            return Err(BootstrapError::InvalidHostname(override_name.to_string()));
        }
        return Ok(NormalizedHostname(name));
    }

    let system = provider()?;
    tracing::debug!("[Hostname] Using system hostname {:?}", system);
    Ok(NormalizedHostname(NormalizedHostname::normalize(&system)))
}

/// Hostname reported by the kernel.
pub fn system_hostname() -> Result<String, BootstrapError> {
    let name = nix::unistd::gethostname()
        .map_err(|e| BootstrapError::HostnameLookupFailed(e.to_string()))?;
    name.into_string().map_err(|raw| {
        BootstrapError::HostnameLookupFailed(format!("hostname is not valid UTF-8: {:?}", raw))
    })
}
