//! Error Types
//!
//! Every failure the file manager can surface, partitioned by status class.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Status class reported to callers alongside the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The request violates a document invariant
    BadRequest,
    /// The environment failed underneath a valid request
    ServerError,
}

impl Status {
    /// HTTP-style numeric code
    pub fn code(self) -> u16 {
        match self {
            Status::BadRequest => 400,
            Status::ServerError => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum FileManagerError {
    #[error("File {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Save handler cannot rename files.")]
    RenameNotPermitted,

    #[error("Cannot read code from an unnamed notebook")]
    Unnamed,

    #[error("Filename must not be empty")]
    EmptyFilename,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid app config: {0}")]
    InvalidConfig(String),

    #[error("Failed to save file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to rename from {} to {}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {} to {}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileManagerError {
    pub fn status(&self) -> Status {
        match self {
            FileManagerError::AlreadyExists(_)
            | FileManagerError::RenameNotPermitted
            | FileManagerError::Unnamed
            | FileManagerError::EmptyFilename
            | FileManagerError::InvalidRequest(_)
            | FileManagerError::InvalidConfig(_) => Status::BadRequest,
            FileManagerError::Write { .. }
            | FileManagerError::Rename { .. }
            | FileManagerError::Copy { .. }
            | FileManagerError::Read { .. } => Status::ServerError,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileManagerError>;
