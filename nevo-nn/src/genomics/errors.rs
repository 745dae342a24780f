use super::NodeType;
use crate::Innovation;

use thiserror::Error;

/// Structural problems in a genome, or in the
/// way it is being used.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenomeError {
    #[error("duplicate node insertion with id {0}")]
    DuplicateNodeId(Innovation),
    #[error("duplicate gene insertion with id {0}")]
    DuplicateGeneId(Innovation),
    #[error("gene {gene} references nonexistent node {node}")]
    DanglingEndpoint { gene: Innovation, node: Innovation },
    #[error("gene {gene} with endpoints {input} -> {output} shadows gene {existing}")]
    DuplicateEndpoints {
        gene: Innovation,
        existing: Innovation,
        input: Innovation,
        output: Innovation,
    },
    #[error("gene {gene} connects node {node} to itself")]
    SelfLoop { gene: Innovation, node: Innovation },
    #[error("gene {gene} ({input} -> {output}) closes a cycle in a feed-forward genome")]
    Cycle {
        gene: Innovation,
        input: Innovation,
        output: Innovation,
    },
    #[error("gene {gene} targets {node_type:?} node {node}")]
    InvalidTarget {
        gene: Innovation,
        node: Innovation,
        node_type: NodeType,
    },
    #[error("expected {expected} inputs, received {found}")]
    InputLength { expected: usize, found: usize },
}

/// Reasons a structural mutation was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MutationError {
    /// No pair of nodes was found to connect.
    #[error("no viable input-output pair found for gene mutation")]
    NoViablePair,
    /// There is no gene to split.
    #[error("node mutation on genome without expressed genes")]
    NoExpressedGene,
    /// There is no gene to re-express.
    #[error("re-enable mutation on genome without suppressed genes")]
    NoSuppressedGene,
}
