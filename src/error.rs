//! Error types for metric probes.
//!
//! Every probe in [`crate::sources`] returns a [`ProbeError`] on failure. None of
//! these ever reach an HTTP client: the snapshot and sampler translate them
//! into omitted entries or default values.

use std::io;

/// Failure of a single metric probe.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The OS refused access to the resource (typically a mount point).
    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    /// The device or its driver stack is not present on this host.
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Reading an OS interface failed.
    #[error("Failed to read {what}: {source}")]
    Io {
        what: String,
        #[source]
        source: io::Error,
    },

    /// The OS interface returned data we could not interpret.
    #[error("Failed to parse {what}: {detail}")]
    Parse { what: String, detail: String },

    /// The probe has no implementation on this platform.
    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),
}

impl ProbeError {
    /// Wraps an I/O error, promoting access errors to [`ProbeError::PermissionDenied`].
    pub fn from_io(what: impl Into<String>, source: io::Error) -> Self {
        let what = what.into();
        if source.kind() == io::ErrorKind::PermissionDenied {
            ProbeError::PermissionDenied { path: what }
        } else {
            ProbeError::Io { what, source }
        }
    }

    pub fn parse(what: impl Into<String>, detail: impl Into<String>) -> Self {
        ProbeError::Parse {
            what: what.into(),
            detail: detail.into(),
        }
    }

    /// Expected absences (no GPU, no permission) are not worth a warning.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ProbeError::PermissionDenied { .. }
                | ProbeError::DeviceUnavailable(_)
                | ProbeError::Unsupported(_)
        )
    }
}
