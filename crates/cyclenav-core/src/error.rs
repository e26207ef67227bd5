//! Error types for `cyclenav-core`.
//!
//! Fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. Remote API failures have
//! their own [`ApiError`] type because they are routed to the error panel
//! rather than propagated.

use std::path::PathBuf;

use crate::api::ApiError;

/// Unified error type for all core operations.
///
/// Each variant captures just enough context for the caller to display
/// a meaningful message or take corrective action.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// A panel identifier did not name any known panel.
    #[error("unknown panel: {0}")]
    UnknownPanel(String),

    /// A preference value could not be encoded or persisted.
    #[error("preference error: {0}")]
    Preference(String),

    /// A remote API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Maps an I/O error on `path` to the most specific variant.
    pub(crate) fn from_io(path: &std::path::Path, e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(e),
        }
    }
}

/// Convenience alias used throughout `cyclenav-core`.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn not_found_displays_path() {
        let err = CoreError::NotFound(PathBuf::from("/missing/config.toml"));
        assert_eq!(err.to_string(), "path not found: /missing/config.toml");
    }

    #[test]
    fn unknown_panel_displays_name() {
        let err = CoreError::UnknownPanel("nowhere".to_string());
        assert_eq!(err.to_string(), "unknown panel: nowhere");
    }

    #[test]
    fn preference_displays_message() {
        let err = CoreError::Preference("disk full".to_string());
        assert_eq!(err.to_string(), "preference error: disk full");
    }

    #[test]
    fn api_error_is_transparent() {
        let err: CoreError = ApiError::Rejected("Invalid password".to_string()).into();
        assert_eq!(err.to_string(), "Invalid password");
    }

    #[test]
    fn from_io_maps_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = CoreError::from_io(std::path::Path::new("/x"), io_err);
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn from_io_maps_permission_denied() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = CoreError::from_io(std::path::Path::new("/secret"), io_err);
        assert_eq!(err.to_string(), "permission denied: /secret");
    }

    #[test]
    fn from_io_keeps_other_kinds() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = CoreError::from_io(std::path::Path::new("/x"), io_err);
        assert!(matches!(err, CoreError::Io(_)));
        assert!(err.to_string().contains("boom"));
    }
}
