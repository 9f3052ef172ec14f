//! Custom error types for the snapshot daemon
//!
//! Provides structured error handling with context for the different
//! failure scenarios of the snapshot lifecycle.

use std::fmt;

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Configuration parsing error
    ParseError { path: String, reason: String },

    /// Missing required configuration
    MissingRequired { node: String, field: String },

    /// Invalid configuration value
    InvalidValue {
        node: String,
        field: String,
        reason: String,
    },

    /// Node not found in configuration
    NodeNotFound { node: String },

    /// Node exists but is disabled
    NodeDisabled { node: String },

    /// No enabled nodes in the configuration
    NoEnabledNodes,
}

/// Archive creation error variants
#[derive(Debug)]
pub enum ArchiveError {
    /// Source data directory missing or not a directory
    SourceMissing { path: String },

    /// Failed to read an entry while walking the source tree
    EntryFailed { path: String, reason: String },

    /// Failed to write to the archive stream
    WriteFailed { path: String, reason: String },
}

/// Object storage error variants
#[derive(Debug)]
pub enum StorageError {
    /// Backend client could not be constructed
    ClientFailed { reason: String },

    /// Upload to the remote store failed
    UploadFailed { key: String, reason: String },

    /// Download from the remote store failed
    DownloadFailed { key: String, reason: String },

    /// Listing remote objects failed
    ListFailed { prefix: String, reason: String },

    /// Deleting a remote object failed
    DeleteFailed { key: String, reason: String },

    /// Local file handed to the store could not be read or written
    LocalIo { path: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::ParseError { path, reason } => {
                write!(f, "Failed to parse config '{}': {}", path, reason)
            }
            ConfigError::MissingRequired { node, field } => {
                write!(f, "Node '{}': missing required field '{}'", node, field)
            }
            ConfigError::InvalidValue {
                node,
                field,
                reason,
            } => {
                write!(f, "Node '{}': invalid value for '{}': {}", node, field, reason)
            }
            ConfigError::NodeNotFound { node } => {
                write!(f, "Node '{}' not found in configuration", node)
            }
            ConfigError::NodeDisabled { node } => {
                write!(f, "Node '{}' is not enabled", node)
            }
            ConfigError::NoEnabledNodes => {
                write!(f, "No enabled nodes found in configuration")
            }
        }
    }
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::SourceMissing { path } => {
                write!(f, "Source data directory does not exist: {}", path)
            }
            ArchiveError::EntryFailed { path, reason } => {
                write!(f, "Failed to read entry '{}': {}", path, reason)
            }
            ArchiveError::WriteFailed { path, reason } => {
                write!(f, "Failed to write archive entry '{}': {}", path, reason)
            }
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ClientFailed { reason } => {
                write!(f, "Failed to build storage client: {}", reason)
            }
            StorageError::UploadFailed { key, reason } => {
                write!(f, "Failed to upload '{}': {}", key, reason)
            }
            StorageError::DownloadFailed { key, reason } => {
                write!(f, "Failed to download '{}': {}", key, reason)
            }
            StorageError::ListFailed { prefix, reason } => {
                write!(f, "Failed to list objects under '{}': {}", prefix, reason)
            }
            StorageError::DeleteFailed { key, reason } => {
                write!(f, "Failed to delete '{}': {}", key, reason)
            }
            StorageError::LocalIo { path, reason } => {
                write!(f, "Local file error for '{}': {}", path, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for ArchiveError {}
impl std::error::Error for StorageError {}
