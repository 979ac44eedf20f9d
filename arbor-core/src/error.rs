// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for Arbor

use thiserror::Error;

/// Result type alias
pub type TreeResult<T> = Result<T, TreeError>;

/// Main error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("Not a folder: {0}")]
    NotAFolder(String),

    #[error("Invalid label: {0:?}")]
    InvalidLabel(String),

    #[error("Invalid move target: {0}")]
    InvalidTarget(String),

    #[error("Cannot move {node} into its own subtree at {target}")]
    CycleDetected { node: String, target: String },

    #[error("Loading children of {node} failed: {reason}")]
    LoadFailed { node: String, reason: String },

    #[error("Children of {0} are already being loaded")]
    AlreadyLoading(String),

    #[error("Workspace is empty")]
    NoTree,

    #[error("Corrupt tree: {0}")]
    Corrupt(String),
}

impl TreeError {
    pub fn load_failed(node: impl Into<String>, reason: impl Into<String>) -> Self {
        TreeError::LoadFailed { node: node.into(), reason: reason.into() }
    }

    /// Errors raised because the requested change would break a tree invariant.
    /// The tree is always left untouched when one of these is returned.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TreeError::NotAFolder(_)
                | TreeError::InvalidLabel(_)
                | TreeError::InvalidTarget(_)
                | TreeError::CycleDetected { .. }
        )
    }

    /// Errors after which the same request may succeed when issued again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TreeError::LoadFailed { .. } | TreeError::AlreadyLoading(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_structural() {
        assert!(TreeError::NotAFolder("5".into()).is_structural());
        assert!(TreeError::InvalidLabel("  ".into()).is_structural());
        assert!(TreeError::InvalidTarget("9".into()).is_structural());
        assert!(TreeError::CycleDetected { node: "4".into(), target: "7".into() }.is_structural());

        assert!(!TreeError::NotFound("5".into()).is_structural());
        assert!(!TreeError::load_failed("3", "offline").is_structural());
        assert!(!TreeError::NoTree.is_structural());
    }

    #[test]
    fn test_is_retryable() {
        assert!(TreeError::load_failed("3", "offline").is_retryable());
        assert!(TreeError::AlreadyLoading("3".into()).is_retryable());

        assert!(!TreeError::CycleDetected { node: "4".into(), target: "7".into() }.is_retryable());
        assert!(!TreeError::Corrupt("duplicate id".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = TreeError::CycleDetected { node: "4".into(), target: "7".into() };
        assert_eq!(format!("{}", err), "Cannot move 4 into its own subtree at 7");

        let err = TreeError::load_failed("3", "timed out");
        assert!(format!("{}", err).contains("timed out"));
    }
}
