use crate::shared::errors::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("policy file {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("policy file {path} does not contain a JSON object")]
    NotAnObject { path: String },
    #[error("failed to create policy directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode policy for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write policy file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove policy file {path}: {source}")]
    Remove {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl PolicyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PolicyError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorKind::NotFound
            }
            PolicyError::Parse { .. } | PolicyError::NotAnObject { .. } => {
                ErrorKind::CorruptPolicy
            }
            PolicyError::Encode { .. } => ErrorKind::ValidationError,
            PolicyError::Read { .. }
            | PolicyError::CreateDir { .. }
            | PolicyError::Write { .. }
            | PolicyError::Remove { .. } => ErrorKind::PermissionDenied,
        }
    }
}
