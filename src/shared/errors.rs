/// Coarse classification shared by every fallible policy operation.
///
/// Module error enums map onto these so the session and CLI can decide how to
/// present a failure without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    CorruptPolicy,
    InvalidFormat,
    PermissionDenied,
    ValidationError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::CorruptPolicy => "corrupt_policy",
            ErrorKind::InvalidFormat => "invalid_format",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::ValidationError => "validation_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
