//! Typed validation and compilation issues.

use std::fmt;

use diagen_core::identifier::Id;

/// Stable code of a compiler issue.
///
/// The codes are part of the public contract: tools match on the string
/// form returned by [`IssueCode::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    /// A node or group id is defined more than once.
    DuplicateId,
    /// A node or group names a parent group that does not exist.
    UndefinedParent,
    /// Group parent pointers form a cycle.
    CircularGroup,
    /// An attribute value cannot be used.
    InvalidAttribute,
    /// An edge endpoint is neither a node nor a group.
    UndefinedEndpoint,
    /// A top-level node is not an endpoint of any edge.
    UnreferencedNode,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateId => "DIAGEN-002",
            Self::UndefinedParent => "DIAGEN-003",
            Self::CircularGroup => "DIAGEN-004",
            Self::InvalidAttribute => "DIAGEN-005",
            Self::UndefinedEndpoint => "DIAGEN-W001",
            Self::UnreferencedNode => "DIAGEN-W002",
        }
    }

    /// Returns `true` for the warning-only codes.
    pub fn is_warning(self) -> bool {
        matches!(self, Self::UndefinedEndpoint | Self::UnreferencedNode)
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation or compilation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub code: IssueCode,
    pub message: String,
    /// Id of the element the issue is about, when there is one.
    pub element_id: Option<Id>,
}

impl Issue {
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            element_id: None,
        }
    }

    pub fn with_element(mut self, id: Id) -> Self {
        self.element_id = Some(id);
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
