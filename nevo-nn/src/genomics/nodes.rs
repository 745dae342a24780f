use crate::Innovation;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use std::collections::HashSet;
use std::fmt;

/// An ActivationType represents the type
/// of activation function the node's network
/// equivalent will use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ActivationType {
    // 1 / (1 + exp(-4.9x))
    Sigmoid,
    // tanh(x)
    Tanh,
    // x
    Identity,
    // 0   if x < 0
    // x   if x ≥ 0
    ReLU,
    // exp(-x²)
    Gaussian,
    // sin(πx)
    Sinusoidal,
    // x clamped to [-1, 1]
    Clamped,
}

impl ActivationType {
    /// Applies the activation function to `x`.
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::ActivationType;
    ///
    /// assert_eq!(ActivationType::Sigmoid.apply(0.0), 0.5);
    /// assert_eq!(ActivationType::ReLU.apply(-3.0), 0.0);
    /// assert_eq!(ActivationType::Clamped.apply(3.0), 1.0);
    /// ```
    pub fn apply(self, x: f32) -> f32 {
        match self {
            ActivationType::Sigmoid => 1.0 / (1.0 + (-4.9 * x).exp()),
            ActivationType::Tanh => x.tanh(),
            ActivationType::Identity => x,
            ActivationType::ReLU => x.max(0.0),
            ActivationType::Gaussian => (-x * x).exp(),
            ActivationType::Sinusoidal => (x * std::f32::consts::PI).sin(),
            ActivationType::Clamped => x.clamp(-1.0, 1.0),
        }
    }
}

/// A NodeType indicates the function of
/// the node's network equivalent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// Input nodes.
    Input,
    /// Constant-output nodes, always emitting 1.
    Bias,
    /// Hidden nodes.
    Hidden,
    /// Output nodes.
    Output,
}

impl NodeType {
    /// Returns `true` for node types that can never be
    /// the target of a gene.
    pub fn is_source_only(self) -> bool {
        matches!(self, NodeType::Input | NodeType::Bias)
    }
}

/// Nodes are the structural elements of genomes
/// between which genes are created.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Node {
    id: Innovation,
    pub(super) inputs: HashSet<Innovation, RandomState>,
    pub(super) outputs: HashSet<Innovation, RandomState>,
    node_type: NodeType,
    activation_type: ActivationType,
}

impl Node {
    /// Generate a new node with the passed parameters.
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::{ActivationType, Node, NodeType};
    ///
    /// let node = Node::new(5, NodeType::Hidden, ActivationType::Sigmoid);
    /// assert_eq!(node.innovation(), 5);
    /// assert_eq!(node.input_genes().count(), 0);
    /// ```
    pub fn new(id: Innovation, node_type: NodeType, activation_type: ActivationType) -> Node {
        Node {
            id,
            inputs: HashSet::default(),
            outputs: HashSet::default(),
            node_type,
            activation_type,
        }
    }

    /// Returns a copy of the node without any gene links.
    pub(super) fn unlinked(&self) -> Node {
        Node::new(self.id, self.node_type, self.activation_type)
    }

    /// Returns the node's innovation number.
    pub fn innovation(&self) -> Innovation {
        self.id
    }

    /// Returns an iterator over the node's input genes' IDs.
    pub fn input_genes(&self) -> impl Iterator<Item = &Innovation> {
        self.inputs.iter()
    }

    /// Returns an iterator over the node's output genes' IDs.
    pub fn output_genes(&self) -> impl Iterator<Item = &Innovation> {
        self.outputs.iter()
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn activation_type(&self) -> ActivationType {
        self.activation_type
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:?} ({:?})",
            self.id, self.node_type, self.activation_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activations() {
        let sigmoid = ActivationType::Sigmoid;
        assert!(sigmoid.apply(10.0) > 0.99);
        assert!(sigmoid.apply(-10.0) < 0.01);
        assert_eq!(ActivationType::Identity.apply(-2.5), -2.5);
        assert_eq!(ActivationType::Gaussian.apply(0.0), 1.0);
        assert!(ActivationType::Sinusoidal.apply(1.0).abs() < 1e-6);
        assert_eq!(ActivationType::Clamped.apply(-7.0), -1.0);
        assert!((ActivationType::Tanh.apply(0.5) - 0.5f32.tanh()).abs() < f32::EPSILON);
    }

    #[test]
    fn unlinked_drops_links() {
        let mut node = Node::new(3, NodeType::Output, ActivationType::Tanh);
        node.inputs.insert(1);
        node.outputs.insert(2);
        let copy = node.unlinked();
        assert_eq!(copy.innovation(), 3);
        assert_eq!(copy.node_type(), NodeType::Output);
        assert_eq!(copy.input_genes().count(), 0);
        assert_eq!(copy.output_genes().count(), 0);
    }

    #[test]
    fn source_only_types() {
        assert!(NodeType::Input.is_source_only());
        assert!(NodeType::Bias.is_source_only());
        assert!(!NodeType::Hidden.is_source_only());
        assert!(!NodeType::Output.is_source_only());
    }
}
