//! Error types.

use crate::control::ControlId;
use std::path::PathBuf;
use thiserror::Error;

/// The structural lock of a child list could not be acquired within its spin budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("could not acquire the control list lock for {op}")]
pub struct LockError {
    /// The operation that gave up.
    pub op: &'static str,
}

/// Errors from structural tree operations.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Attaching the control would make it its own ancestor. The tree is unchanged.
    #[error("cannot add control {child} to itself or to one of its descendants ({parent})")]
    InvalidHierarchy { child: ControlId, parent: ControlId },

    /// The control is not owned by the container it was removed from.
    #[error("control {child} is not a child of {parent}")]
    StaleRemoval { child: ControlId, parent: ControlId },

    /// The control is not a layer of the window stack it was removed from.
    #[error("control {0} is not a layer of this window stack")]
    NotALayer(ControlId),

    #[error("content error: {0}")]
    Content(#[from] ContentError),
}

/// The window stack behind a handle has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the window stack has been dropped")]
pub struct StackGone;

/// Errors while acquiring or releasing backing resources.
///
/// These are fatal for the tree that raised them: a partially loaded tree must not be rendered.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
}

/// Errors from a render pass.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render surface error: {0}")]
    Surface(String),

    /// The control was asked to render before its content was loaded.
    #[error("control {0} rendered before its content was loaded")]
    NotLoaded(ControlId),
}

/// Errors reported by an asset provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("asset backend error: {0}")]
    Backend(String),
}

/// Errors while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
