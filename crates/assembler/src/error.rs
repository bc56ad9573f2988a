//! Error types for the assembler crate.
//!
//! Expected absence is never an error: a missing template resolves to empty
//! output, an unbalanced tag stays literal and malformed JSON binds as empty
//! data. What remains are I/O failures while loading a site and the
//! non-termination faults raised by the interpretive engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineKind;

/// Resolution did not reach a fixed point.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Every pass still changed the text.
    #[error("{engine} engine still rewriting after {passes} passes")]
    PassLimit {
        engine: EngineKind,
        passes: usize,
        /// The text as it stood when the limit was hit.
        partial: String,
    },

    /// Slotted references nest deeper than the renderer allows, which only
    /// happens when a template reaches itself.
    #[error("slotted reference '{template}' nested deeper than {depth} levels")]
    DepthLimit { template: String, depth: usize },

    /// The merged text outgrew the configured ceiling.
    #[error("merged output exceeded {limit} bytes")]
    OutputLimit { limit: usize },
}

impl MergeError {
    /// The unresolved text, when the fault carries one.
    pub fn partial(&self) -> Option<&str> {
        match self {
            MergeError::PassLimit { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// Loading a site from disk failed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Site names are a single directory name under the root.
    #[error("invalid site name '{0}'")]
    InvalidSite(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk site directory {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Two files in one site share a stem.
    #[error("template '{name}' defined twice: {} and {}", .first.display(), .second.display())]
    Collision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Any failure of the merge entry point.
#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// An engine name that is not one of the known kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown engine '{0}' (expected interpretive or compiled)")]
pub struct ParseEngineError(pub String);

/// Result type for assembler operations.
pub type Result<T> = std::result::Result<T, AssemblerError>;
