use crate::{Innovation, NodeId};

use std::error::Error;
use std::fmt;

/// An error type indicating the gene being
/// added is invalid.
#[derive(Debug)]
pub(crate) enum GeneValidityError {
    /// The gene's innovation number is a duplicate.
    DuplicateInnovation(Innovation),
    /// One or both of the gene's endpoints do not exist.
    NonexistentEndpoints(NodeId, NodeId),
    /// The gene has the same endpoints as another
    /// gene with a different innovation number.
    DuplicateEndpoints(Innovation, (NodeId, NodeId)),
    /// The gene's target is an input node, which
    /// is not allowed.
    InputTarget(NodeId),
}

/// An error type indicating the node being
/// added is invalid.
#[derive(Debug)]
pub(crate) enum NodeValidityError {
    /// The node's id is a duplicate.
    DuplicateNodeId(NodeId),
}

impl fmt::Display for GeneValidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateInnovation(innovation) => {
                write!(f, "duplicate gene insertion with innovation {}", innovation)
            }
            Self::NonexistentEndpoints(source, target) => write!(
                f,
                "gene insertion between nonexistent endpoint(s) {} -> {}",
                source, target
            ),
            Self::DuplicateEndpoints(shadowed, (source, target)) => write!(
                f,
                "gene insertion with endpoints {} -> {} shadows gene with innovation {}",
                source, target, shadowed
            ),
            Self::InputTarget(id) => {
                write!(f, "gene insertion with input node {} as target", id)
            }
        }
    }
}

impl fmt::Display for NodeValidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNodeId(id) => write!(f, "duplicate node insertion with id {}", id),
        }
    }
}

impl Error for GeneValidityError {}
impl Error for NodeValidityError {}
