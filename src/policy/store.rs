use super::{PolicyDocument, PolicyError};
use crate::shared::fs_atomic::atomic_write_file;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of reading the policy file. Loading never fails outright: problems
/// come back as a diagnostic next to an empty document.
#[derive(Debug)]
pub struct LoadedPolicy {
    pub document: PolicyDocument,
    pub found: bool,
    pub diagnostic: Option<PolicyError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStore {
    path: PathBuf,
    create_parent: bool,
}

impl PolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_parent: false,
        }
    }

    /// Allows `save` to create the policy directory when it is missing.
    pub fn with_create_parent(mut self, allow: bool) -> Self {
        self.create_parent = allow;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> LoadedPolicy {
        load_policy(&self.path)
    }

    pub fn save(&self, document: &PolicyDocument) -> Result<(), PolicyError> {
        if self.create_parent {
            create_parent_dir(&self.path)?;
        }
        save_policy(&self.path, document)
    }

    pub fn remove(&self) -> Result<bool, PolicyError> {
        remove_policy(&self.path)
    }
}

pub fn load_policy(path: &Path) -> LoadedPolicy {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return LoadedPolicy {
                document: PolicyDocument::new(),
                found: false,
                diagnostic: None,
            };
        }
        Err(source) => {
            return LoadedPolicy {
                document: PolicyDocument::new(),
                found: true,
                diagnostic: Some(PolicyError::Read {
                    path: path.display().to_string(),
                    source,
                }),
            };
        }
    };

    let parsed = serde_json::from_str::<Value>(&raw)
        .map_err(|source| PolicyError::Parse {
            path: path.display().to_string(),
            source,
        })
        .and_then(|value| match value {
            Value::Object(object) => Ok(PolicyDocument::from_json_object(object)),
            _ => Err(PolicyError::NotAnObject {
                path: path.display().to_string(),
            }),
        });

    match parsed {
        Ok(document) => LoadedPolicy {
            document,
            found: true,
            diagnostic: None,
        },
        Err(err) => LoadedPolicy {
            document: PolicyDocument::new(),
            found: true,
            diagnostic: Some(err),
        },
    }
}

/// Writes `document` as the complete contents of `path`. Keys missing from
/// `document` do not survive from the previous file.
pub fn save_policy(path: &Path, document: &PolicyDocument) -> Result<(), PolicyError> {
    let body = document
        .to_json_pretty()
        .map_err(|source| PolicyError::Encode {
            path: path.display().to_string(),
            source,
        })?;
    atomic_write_file(path, body.as_bytes()).map_err(|source| PolicyError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Deletes the policy file. Returns `false` when there was nothing to remove.
pub fn remove_policy(path: &Path) -> Result<bool, PolicyError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(PolicyError::Remove {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn create_parent_dir(path: &Path) -> Result<(), PolicyError> {
    if let Some(parent) = path.parent() {
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(parent).map_err(|source| PolicyError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }
    Ok(())
}
