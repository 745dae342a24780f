//! A Network is the phenotype of an [`NNGenome`]:
//! expressed genes become weighted connections
//! between densely indexed nodes, and suppressed
//! genes are ignored.
//!
//! Feed-forward networks are evaluated in topological
//! order, from a clean state on every call. Recurrent
//! networks keep their activation levels between calls
//! and advance one synchronous time-step per call.
//!
//! [`NNGenome`]: crate::genomics::NNGenome
mod connection;

use crate::genomics::{ActivationType, GenomeError, NNGenome, NodeType};
use crate::Innovation;
use connection::Connection;

use ahash::RandomState;

use std::collections::HashMap;
use std::fmt;

/// An arbitrarily-structured neural network.
///
/// Nodes are laid out as inputs, bias nodes, outputs
/// and hidden nodes, each group in ascending id order.
#[derive(Clone, Debug)]
pub struct Network {
    input_count: usize,
    fixed_count: usize,
    output_count: usize,
    node_ids: Box<[Innovation]>,
    input_sums: Box<[f32]>,
    activation_levels: Box<[f32]>,
    activation_functions: Box<[ActivationType]>,
    connections: Box<[Box<[Connection]>]>,
    order: Option<Box<[usize]>>,
}

impl Network {
    /// Compiles the network of the passed genome.
    ///
    /// # Errors
    ///
    /// Returns an error if a gene references a missing node,
    /// or if a feed-forward genome contains a cycle.
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::{ActivationType, GeneticConfig, History, NNGenome};
    /// use nevo_nn::networks::Network;
    /// use rand::SeedableRng;
    ///
    /// let config = GeneticConfig {
    ///     bias_node: false,
    ///     output_activation_types: vec![ActivationType::ReLU],
    ///     initial_expression_chance: 0.0,
    ///     ..GeneticConfig::default()
    /// };
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
    /// let mut genome = NNGenome::new(&config, &mut History::new(&config), &mut rng);
    /// genome.add_gene(0, 0, 1, 2.5).unwrap();
    ///
    /// let mut network = Network::new(&genome).unwrap();
    /// assert_eq!(network.evaluate(&[0.5]).unwrap(), vec![1.25]);
    /// assert_eq!(network.evaluate(&[-0.5]).unwrap(), vec![0.0]);
    /// ```
    pub fn new(genome: &NNGenome) -> Result<Network, GenomeError> {
        let mut input_nodes = vec![];
        let mut bias_nodes = vec![];
        let mut output_nodes = vec![];
        let mut hidden_nodes = vec![];

        // Genome nodes are already sorted by id.
        for node in genome.nodes() {
            let group = match node.node_type() {
                NodeType::Input => &mut input_nodes,
                NodeType::Bias => &mut bias_nodes,
                NodeType::Output => &mut output_nodes,
                NodeType::Hidden => &mut hidden_nodes,
            };
            group.push((node.innovation(), node.activation_type()));
        }
        let (node_ids, activation_functions): (Vec<_>, Vec<_>) = input_nodes
            .iter()
            .chain(&bias_nodes)
            .chain(&output_nodes)
            .chain(&hidden_nodes)
            .copied()
            .unzip();
        let total_node_count = node_ids.len();

        let node_index_from_id: HashMap<_, _, RandomState> = node_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();
        let index_of = |gene: Innovation, node: Innovation| {
            node_index_from_id
                .get(&node)
                .copied()
                .ok_or(GenomeError::DanglingEndpoint { gene, node })
        };

        let mut connections = vec![vec![]; total_node_count];
        for gene in genome.genes().filter(|g| !g.suppressed()) {
            let input = index_of(gene.innovation(), gene.input())?;
            let output = index_of(gene.innovation(), gene.output())?;
            connections[input].push(Connection::new(output, gene.weight()));
        }

        let order = if genome.is_recurrent() {
            None
        } else {
            let order = genome
                .topological_order()?
                .into_iter()
                .filter_map(|id| node_index_from_id.get(&id).copied())
                .collect();
            Some(order)
        };

        let mut network = Network {
            input_count: input_nodes.len(),
            fixed_count: input_nodes.len() + bias_nodes.len(),
            output_count: output_nodes.len(),
            node_ids: node_ids.into(),
            input_sums: vec![0.0; total_node_count].into(),
            activation_levels: vec![0.0; total_node_count].into(),
            activation_functions: activation_functions.into(),
            connections: connections.into_iter().map(|v| v.into()).collect(),
            order,
        };
        network.clear_state();
        Ok(network)
    }

    /// Feeds `inputs` through the network and returns
    /// the output node activation levels.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of inputs does not
    /// match the network's input count.
    pub fn evaluate(&mut self, inputs: &[f32]) -> Result<Vec<f32>, GenomeError> {
        if inputs.len() != self.input_count {
            return Err(GenomeError::InputLength {
                expected: self.input_count,
                found: inputs.len(),
            });
        }
        if self.order.is_some() {
            self.clear_state();
            self.set_inputs(inputs);
            self.feed_forward();
        } else {
            self.set_inputs(inputs);
            self.activate();
        }
        Ok(self.outputs())
    }

    /// Activates every node once, dependencies first.
    fn feed_forward(&mut self) {
        let order = match &self.order {
            Some(order) => order,
            None => return,
        };
        for &node in order.iter() {
            if node >= self.fixed_count {
                self.activation_levels[node] =
                    self.activation_functions[node].apply(self.input_sums[node]);
                self.input_sums[node] = 0.0;
            }
            let activation = self.activation_levels[node];
            for connection in self.connections[node].iter() {
                self.input_sums[connection.output] += activation * connection.weight;
            }
        }
    }

    /// Advances the network a single time-step: every node
    /// fires with its current activation level, and then all
    /// non-fixed activation levels are recomputed at once.
    pub fn activate(&mut self) {
        self.fire_nodes();
        self.compute_activations();
    }

    /// Propagates each node's signal through all its
    /// outgoing connections.
    fn fire_nodes(&mut self) {
        for (activation, output_connections) in self
            .activation_levels
            .iter()
            .zip(self.connections.iter())
        {
            for connection in output_connections.iter() {
                self.input_sums[connection.output] += *activation * connection.weight;
            }
        }
    }

    /// Computes each non-fixed node's activation level,
    /// based on its input sum.
    fn compute_activations(&mut self) {
        for ((input_sum, activation_level), activation_function) in self.input_sums
            [self.fixed_count..]
            .iter_mut()
            .zip(&mut self.activation_levels[self.fixed_count..])
            .zip(&self.activation_functions[self.fixed_count..])
        {
            *activation_level = activation_function.apply(*input_sum);
            *input_sum = 0.0;
        }
    }

    /// Clears the activation state of all nodes.
    /// Bias nodes keep emitting 1.
    pub fn clear_state(&mut self) {
        for (input_sum, activation) in self
            .input_sums
            .iter_mut()
            .zip(self.activation_levels.iter_mut())
        {
            *input_sum = 0.0;
            *activation = 0.0;
        }
        for activation in &mut self.activation_levels[self.input_count..self.fixed_count] {
            *activation = 1.0;
        }
    }

    /// Sets the activation level of each input node
    /// to the corresponding value in the passed slice.
    fn set_inputs(&mut self, values: &[f32]) {
        self.activation_levels[..self.input_count].copy_from_slice(values);
    }

    /// Returns the current output node activation levels,
    /// in ascending output id order.
    pub fn outputs(&self) -> Vec<f32> {
        self.activation_levels[self.fixed_count..self.fixed_count + self.output_count].to_vec()
    }

    /// Returns the number of nodes in the network.
    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, connections) in self.node_ids.iter().zip(self.connections.iter()) {
            write!(f, "{}:", id)?;
            for connection in connections.iter() {
                write!(f, " {:?}", connection)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
