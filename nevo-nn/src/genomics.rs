//! Genomes are the focus of evolution in NEAT.
//! They are a collection of genes and nodes that can be instantiated
//! as a phenotype (a neural network). Genomes can be progressively mutated,
//! thus adding complexity and functionality.

mod config;
mod crossover;
mod errors;
mod genes;
mod history;
mod mutation;
mod nodes;

pub use config::GeneticConfig;
pub use crossover::align;
pub use errors::{GenomeError, MutationError};
pub use genes::Gene;
pub use history::History;
pub use mutation::{perturb_or_reset, random_in};
pub use nodes::{ActivationType, Node, NodeType};

use crate::networks::Network;
use crate::Innovation;

use ahash::RandomState;
use nevo::{chance, ConfigError};
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;

/// A mutable collection of genes and nodes.
///
/// The compiled phenotype is cached inside the genome and
/// rebuilt lazily after any structural change. It is not
/// serialized, and does not take part in equality checks.
///
/// Suports Serde for convenient genome saving and loading.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NNGenome {
    genes: BTreeMap<Innovation, Gene>,
    nodes: BTreeMap<Innovation, Node>,
    node_pairings: HashSet<(Innovation, Innovation), RandomState>,
    recurrent: bool,
    fitness: f32,
    adjusted_fitness: f32,
    #[serde(skip)]
    network: Option<Network>,
}

impl PartialEq for NNGenome {
    fn eq(&self, other: &NNGenome) -> bool {
        self.genes == other.genes
            && self.nodes == other.nodes
            && self.recurrent == other.recurrent
            && self.fitness == other.fitness
            && self.adjusted_fitness == other.adjusted_fitness
    }
}

impl NNGenome {
    /// Create a new genome with the specified configuration.
    ///
    /// Input nodes take the innovation numbers `0..input_count`,
    /// followed by the bias node if configured, and then the output
    /// nodes. Each (input or bias, output) pair is connected with
    /// probability `initial_expression_chance`, using the canonical
    /// gene innovation numbers handed out by the [`History`].
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::{GeneticConfig, History, NNGenome, NodeType};
    /// use rand::SeedableRng;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     bias_node: true,
    ///     initial_expression_chance: 1.0,
    ///     new_weight_interval: (-5.0, 5.0),
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut history = History::new(&config);
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
    ///
    /// let genome = NNGenome::new(&config, &mut history, &mut rng);
    ///
    /// // 3 inputs, 1 bias node and 2 outputs.
    /// assert_eq!(genome.nodes().count(), 3 + 1 + 2);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Input).count(), 3);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Output).count(), 2);
    ///
    /// // With an initial_expression_chance of 1, every pair is connected.
    /// assert_eq!(genome.genes().count(), 4 * 2);
    /// assert!(genome.genes().all(|g| (0..4 * 2).contains(&g.innovation())));
    /// assert!(genome.genes().all(|g| g.weight().abs() <= 5.0));
    /// ```
    pub fn new<R: Rng + ?Sized>(
        config: &GeneticConfig,
        history: &mut History,
        rng: &mut R,
    ) -> NNGenome {
        let mut genome = NNGenome::empty(config.allow_recurrence);
        let input_count = config.input_count.get();
        let fixed_count = config.fixed_node_count();

        for i in 0..input_count {
            genome.insert_node(Node::new(i, NodeType::Input, ActivationType::Identity));
        }
        if config.bias_node {
            genome.insert_node(Node::new(
                input_count,
                NodeType::Bias,
                ActivationType::Identity,
            ));
        }
        for o in 0..config.output_count.get() {
            let activation = config
                .output_activation_types
                .get(o)
                .copied()
                .unwrap_or(ActivationType::Sigmoid);
            genome.insert_node(Node::new(fixed_count + o, NodeType::Output, activation));
        }

        for source in 0..fixed_count {
            for o in 0..config.output_count.get() {
                if chance(rng, config.initial_expression_chance) {
                    let output = fixed_count + o;
                    let id = history.gene_innovation(source, output);
                    let weight = random_in(config.new_weight_interval, rng);
                    genome.insert_gene(Gene::new(id, source, output, weight));
                }
            }
        }

        genome
    }

    fn empty(recurrent: bool) -> NNGenome {
        NNGenome {
            genes: BTreeMap::new(),
            nodes: BTreeMap::new(),
            node_pairings: HashSet::default(),
            recurrent,
            fitness: 0.0,
            adjusted_fitness: 0.0,
            network: None,
        }
    }

    /// Add a new hidden node to the genome.
    /// Returns a reference to the newly created node.
    ///
    /// # Errors
    ///
    /// Returns an error if a node with the same id
    /// already exists in the genome.
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::{ActivationType, GeneticConfig, GenomeError, History, NNGenome, NodeType};
    /// use rand::SeedableRng;
    ///
    /// let config = GeneticConfig::default();
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
    /// let mut genome = NNGenome::new(&config, &mut History::new(&config), &mut rng);
    ///
    /// let node = genome.add_node(42, ActivationType::Tanh).unwrap();
    /// assert_eq!(node.node_type(), NodeType::Hidden);
    ///
    /// assert_eq!(
    ///     genome.add_node(42, ActivationType::Sigmoid).unwrap_err(),
    ///     GenomeError::DuplicateNodeId(42)
    /// );
    /// ```
    pub fn add_node(
        &mut self,
        id: Innovation,
        activation_type: ActivationType,
    ) -> Result<&Node, GenomeError> {
        if self.nodes.contains_key(&id) {
            return Err(GenomeError::DuplicateNodeId(id));
        }
        Ok(self.insert_node(Node::new(id, NodeType::Hidden, activation_type)))
    }

    /// Add a new gene to the genome.
    /// Returns a reference to the new gene.
    ///
    /// # Errors
    ///
    /// Returns an error if a gene with the same id or endpoints
    /// already exists, if either endpoint is missing, if the gene
    /// targets an input or bias node, or if it would close a cycle
    /// in a feed-forward genome.
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::{ActivationType, GeneticConfig, GenomeError, History, NNGenome};
    /// use rand::SeedableRng;
    ///
    /// let config = GeneticConfig {
    ///     initial_expression_chance: 0.0,
    ///     ..GeneticConfig::default()
    /// };
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
    /// let mut genome = NNGenome::new(&config, &mut History::new(&config), &mut rng);
    /// assert_eq!(genome.genes().count(), 0);
    ///
    /// // Nodes: input 0, bias 1, output 2.
    /// genome.add_node(3, ActivationType::Sigmoid).unwrap();
    /// let gene = genome.add_gene(10, 0, 3, 2.5).unwrap();
    /// assert_eq!(gene.endpoints(), (0, 3));
    /// genome.add_gene(11, 3, 2, -1.0).unwrap();
    ///
    /// // 2 -> 3 would close the loop 3 -> 2 -> 3.
    /// assert!(matches!(genome.add_gene(12, 2, 3, 1.0), Err(GenomeError::Cycle { .. })));
    /// assert!(matches!(genome.add_gene(13, 2, 0, 1.0), Err(GenomeError::InvalidTarget { .. })));
    /// ```
    pub fn add_gene(
        &mut self,
        id: Innovation,
        input: Innovation,
        output: Innovation,
        weight: f32,
    ) -> Result<&mut Gene, GenomeError> {
        self.check_gene_viability(id, input, output)?;
        Ok(self.insert_gene(Gene::new(id, input, output, weight)))
    }

    fn check_gene_viability(
        &self,
        gene: Innovation,
        input: Innovation,
        output: Innovation,
    ) -> Result<(), GenomeError> {
        if self.genes.contains_key(&gene) {
            return Err(GenomeError::DuplicateGeneId(gene));
        }
        for node in [input, output] {
            if !self.nodes.contains_key(&node) {
                return Err(GenomeError::DanglingEndpoint { gene, node });
            }
        }
        if input == output {
            return Err(GenomeError::SelfLoop { gene, node: input });
        }
        if let Some(existing) = self
            .genes
            .values()
            .find(|g| g.endpoints() == (input, output))
        {
            return Err(GenomeError::DuplicateEndpoints {
                gene,
                existing: existing.innovation(),
                input,
                output,
            });
        }
        let node_type = self.nodes[&output].node_type();
        if node_type.is_source_only() {
            return Err(GenomeError::InvalidTarget {
                gene,
                node: output,
                node_type,
            });
        }
        if !self.recurrent && self.creates_cycle(input, output) {
            return Err(GenomeError::Cycle {
                gene,
                input,
                output,
            });
        }
        Ok(())
    }

    /// Inserts a node, assuming its id is unused.
    fn insert_node(&mut self, node: Node) -> &Node {
        self.network = None;
        self.nodes.entry(node.innovation()).or_insert(node)
    }

    /// Inserts a gene and links it to its endpoints,
    /// assuming it is viable.
    fn insert_gene(&mut self, gene: Gene) -> &mut Gene {
        let (id, (input, output)) = (gene.innovation(), gene.endpoints());
        if let Some(node) = self.nodes.get_mut(&input) {
            node.outputs.insert(id);
        }
        if let Some(node) = self.nodes.get_mut(&output) {
            node.inputs.insert(id);
        }
        self.node_pairings.insert((input, output));
        self.network = None;
        self.genes.entry(id).or_insert(gene)
    }

    /// Returns `true` if a gene from `input` to `output` would
    /// close a cycle, i.e. `input` is reachable from `output`.
    /// Suppressed genes count, so that re-expressing them
    /// never introduces a cycle.
    pub(crate) fn creates_cycle(&self, input: Innovation, output: Innovation) -> bool {
        let mut visited: HashSet<Innovation, RandomState> = HashSet::default();
        let mut stack = vec![output];
        while let Some(id) = stack.pop() {
            if id == input {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(
                    node.output_genes()
                        .filter_map(|g| self.genes.get(g))
                        .map(Gene::output),
                );
            }
        }
        false
    }

    /// Returns the genome's node ids in topological order
    /// over all of its genes.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::Cycle`] naming a gene inside
    /// the cyclic part of the genome if there is no such order.
    pub(crate) fn topological_order(&self) -> Result<Vec<Innovation>, GenomeError> {
        let mut in_degrees: HashMap<Innovation, usize, RandomState> = HashMap::default();
        let mut successors: BTreeMap<Innovation, Vec<Innovation>> = BTreeMap::new();
        for gene in self.genes.values() {
            *in_degrees.entry(gene.output()).or_default() += 1;
            successors.entry(gene.input()).or_default().push(gene.output());
        }

        let mut ready: VecDeque<Innovation> = self
            .nodes
            .keys()
            .copied()
            .filter(|id| !in_degrees.contains_key(id))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop_front() {
            order.push(id);
            for next in successors.get(&id).into_iter().flatten() {
                if let Some(degree) = in_degrees.get_mut(next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(*next);
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            return Ok(order);
        }
        let ordered: HashSet<Innovation, RandomState> = order.into_iter().collect();
        let gene = self
            .genes
            .values()
            .find(|g| !ordered.contains(&g.input()) && !ordered.contains(&g.output()))
            .or_else(|| self.genes.values().next());
        Err(match gene {
            Some(gene) => GenomeError::Cycle {
                gene: gene.innovation(),
                input: gene.input(),
                output: gene.output(),
            },
            None => GenomeError::Cycle {
                gene: 0,
                input: 0,
                output: 0,
            },
        })
    }

    /// Returns an iterator over the genome's genes,
    /// in ascending innovation order.
    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.genes.values()
    }

    /// Returns an iterator over the genome's nodes,
    /// in ascending innovation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn gene(&self, id: Innovation) -> Option<&Gene> {
        self.genes.get(&id)
    }

    pub fn node(&self, id: Innovation) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Returns `true` if the genome may contain cycles.
    pub fn is_recurrent(&self) -> bool {
        self.recurrent
    }

    /// Returns the genome's highest gene innovation number,
    /// or `None` if it has no genes.
    pub fn max_innovation(&self) -> Option<Innovation> {
        self.genes.keys().next_back().copied()
    }

    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Computes the genetic distance between two genomes:
    ///
    /// `c_e·E/N + c_d·D/N + c_w·W̄`
    ///
    /// where `E` counts the genes beyond the other genome's
    /// highest innovation number, `D` the remaining unmatched
    /// genes and `W̄` the mean weight difference of matching
    /// genes expressed in both genomes. `N` is the larger
    /// gene count, or 1 if both genomes are smaller than
    /// [`distance_normalization_threshold`].
    ///
    /// [`distance_normalization_threshold`]: GeneticConfig::distance_normalization_threshold
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::{GeneticConfig, History, NNGenome};
    /// use rand::SeedableRng;
    ///
    /// let config = GeneticConfig::default();
    /// let mut history = History::new(&config);
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
    ///
    /// let first = NNGenome::new(&config, &mut history, &mut rng);
    /// let second = NNGenome::new(&config, &mut history, &mut rng);
    ///
    /// assert_eq!(NNGenome::genetic_distance(&first, &first, &config), 0.0);
    /// assert_eq!(
    ///     NNGenome::genetic_distance(&first, &second, &config),
    ///     NNGenome::genetic_distance(&second, &first, &config),
    /// );
    /// ```
    pub fn genetic_distance(first: &NNGenome, second: &NNGenome, config: &GeneticConfig) -> f32 {
        let (first_max, second_max) = (first.max_innovation(), second.max_innovation());
        let mut excess = 0;
        let mut disjoint = 0;
        let mut matching = 0;
        let mut weight_difference = 0.0;

        for pair in align(first, second) {
            match pair {
                (Some(a), Some(b)) => {
                    if !a.suppressed() && !b.suppressed() {
                        matching += 1;
                        weight_difference += (a.weight() - b.weight()).abs();
                    }
                }
                (Some(gene), None) if second_max.map_or(true, |max| gene.innovation() > max) => {
                    excess += 1
                }
                (None, Some(gene)) if first_max.map_or(true, |max| gene.innovation() > max) => {
                    excess += 1
                }
                _ => disjoint += 1,
            }
        }

        let size = first.genes.len().max(second.genes.len());
        let normalization = if size < config.distance_normalization_threshold {
            1.0
        } else {
            size.max(1) as f32
        };
        let mean_weight_difference = if matching > 0 {
            weight_difference / matching as f32
        } else {
            0.0
        };

        config.excess_gene_factor * excess as f32 / normalization
            + config.disjoint_gene_factor * disjoint as f32 / normalization
            + config.common_weight_factor * mean_weight_difference
    }

    /// Verifies the genome's structural invariants: all gene
    /// endpoints exist, there is at most one gene per node pair,
    /// no gene loops onto a single node or targets an input or
    /// bias node, and feed-forward genomes are acyclic.
    pub fn check_integrity(&self) -> Result<(), GenomeError> {
        let mut pairs: HashMap<(Innovation, Innovation), Innovation, RandomState> =
            HashMap::default();
        for gene in self.genes.values() {
            let (id, (input, output)) = (gene.innovation(), gene.endpoints());
            for node in [input, output] {
                if !self.nodes.contains_key(&node) {
                    return Err(GenomeError::DanglingEndpoint { gene: id, node });
                }
            }
            if input == output {
                return Err(GenomeError::SelfLoop {
                    gene: id,
                    node: input,
                });
            }
            let node_type = self.nodes[&output].node_type();
            if node_type.is_source_only() {
                return Err(GenomeError::InvalidTarget {
                    gene: id,
                    node: output,
                    node_type,
                });
            }
            if let Some(existing) = pairs.insert((input, output), id) {
                return Err(GenomeError::DuplicateEndpoints {
                    gene: id,
                    existing,
                    input,
                    output,
                });
            }
        }
        if !self.recurrent {
            self.topological_order()?;
        }
        Ok(())
    }

    /// Returns `true` if the genome has the input, bias
    /// and output nodes that `config` describes.
    pub fn conforms_to(&self, config: &GeneticConfig) -> bool {
        let count = |node_type| {
            self.nodes
                .values()
                .filter(|n| n.node_type() == node_type)
                .count()
        };
        self.recurrent == config.allow_recurrence
            && count(NodeType::Input) == config.input_count.get()
            && count(NodeType::Output) == config.output_count.get()
            && count(NodeType::Bias) == config.bias_node as usize
    }

    /// Feeds `inputs` through the genome's network, compiling
    /// it first if the genome changed since the last call.
    ///
    /// Feed-forward genomes evaluate every node in topological
    /// order. Recurrent genomes advance a single time-step,
    /// starting from the activations left by the previous call.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::InputLength`] if the number of
    /// inputs does not match the genome's input node count.
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::{GeneticConfig, GenomeError, History, NNGenome};
    /// use rand::SeedableRng;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(2).unwrap(),
    ///     ..GeneticConfig::default()
    /// };
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
    /// let mut genome = NNGenome::new(&config, &mut History::new(&config), &mut rng);
    ///
    /// let output = genome.process(&[0.5, -0.5]).unwrap();
    /// assert_eq!(output.len(), 1);
    /// assert!((0.0..=1.0).contains(&output[0]));
    ///
    /// assert_eq!(
    ///     genome.process(&[1.0]),
    ///     Err(GenomeError::InputLength { expected: 2, found: 1 })
    /// );
    /// ```
    pub fn process(&mut self, inputs: &[f32]) -> Result<Vec<f32>, GenomeError> {
        let network = match self.network.take() {
            Some(network) => network,
            None => Network::new(self)?,
        };
        self.network.insert(network).evaluate(inputs)
    }

    /// Clears the activation state kept between calls to [`process`].
    ///
    /// [`process`]: NNGenome::process
    pub fn reset_activations(&mut self) {
        if let Some(network) = &mut self.network {
            network.clear_state();
        }
    }

    /// Mutates the genome: weights first, then each structural
    /// mutation with its chance resolved at `progress`.
    /// Structural mutations with no viable target are skipped.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        progress: f32,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) {
        mutation::mutate(self, progress, history, config, rng);
        self.network = None;
    }

    /// Induces a _weight mutation_ in every gene, with
    /// chances resolved at `progress`.
    pub fn mutate_weights<R: Rng + ?Sized>(
        &mut self,
        progress: f32,
        config: &GeneticConfig,
        rng: &mut R,
    ) {
        mutation::mutate_weights(self, progress, config, rng);
        self.network = None;
    }

    /// Induces a _node mutation_ in the genome: a random
    /// expressed gene is split in two, with a new hidden node
    /// in between. Returns the new node's id.
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::{GeneticConfig, History, NNGenome, NodeType};
    /// use rand::SeedableRng;
    ///
    /// let config = GeneticConfig {
    ///     bias_node: false,
    ///     ..GeneticConfig::default()
    /// };
    /// let mut history = History::new(&config);
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
    /// let mut genome = NNGenome::new(&config, &mut history, &mut rng);
    /// let split = genome.genes().next().unwrap().clone();
    ///
    /// let node = genome.mutate_add_node(&mut history, &config, &mut rng).unwrap();
    ///
    /// assert_eq!(genome.node(node).unwrap().node_type(), NodeType::Hidden);
    /// assert!(genome.gene(split.innovation()).unwrap().suppressed());
    /// assert_eq!(genome.genes().count(), 3);
    /// assert!(genome.genes().any(|g| g.endpoints() == (0, node) && g.weight() == 1.0));
    /// assert!(genome.genes().any(|g| g.endpoints() == (node, 1) && g.weight() == split.weight()));
    /// ```
    pub fn mutate_add_node<R: Rng + ?Sized>(
        &mut self,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<Innovation, MutationError> {
        let result = mutation::add_node(self, history, config, rng);
        self.network = None;
        result
    }

    /// Induces a _gene mutation_ in the genome, connecting
    /// a previously unconnected node pair. Returns the new
    /// gene's id.
    pub fn mutate_add_gene<R: Rng + ?Sized>(
        &mut self,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<Innovation, MutationError> {
        let result = mutation::add_gene(self, history, config, rng);
        self.network = None;
        result
    }

    /// Re-expresses a random suppressed gene. Returns its id.
    pub fn mutate_reenable_gene<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Innovation, MutationError> {
        let result = mutation::reenable_gene(self, rng);
        self.network = None;
        result
    }

    /// Combines the genome with an `other` genome and
    /// returns their _child_ genome, with zeroed fitness.
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::{GeneticConfig, History, NNGenome};
    /// use rand::SeedableRng;
    ///
    /// let config = GeneticConfig::default();
    /// let mut history = History::new(&config);
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(5);
    ///
    /// let parent = NNGenome::new(&config, &mut history, &mut rng);
    ///
    /// // A genome mated with itself yields the same structure.
    /// let child = parent.crossover(&parent, &config, &mut rng);
    /// assert!(child.genes().map(|g| g.innovation()).eq(parent.genes().map(|g| g.innovation())));
    /// assert!(child.check_integrity().is_ok());
    /// ```
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        other: &NNGenome,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> NNGenome {
        crossover::crossover(self, other, config, rng)
    }
}

impl fmt::Display for NNGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Genome (fitness: {:.4})", self.fitness)?;
        writeln!(f, "Nodes:")?;
        for node in self.nodes.values() {
            writeln!(f, "\t{}", node)?;
        }
        write!(f, "Genes:")?;
        for gene in self.genes.values() {
            write!(f, "\n\t{}", gene)?;
        }
        Ok(())
    }
}

impl nevo::Genome for NNGenome {
    type Config = GeneticConfig;
    type InnovationHistory = History;
    type Error = GenomeError;

    fn new<R: Rng + ?Sized>(config: &GeneticConfig, history: &mut History, rng: &mut R) -> Self {
        NNGenome::new(config, history, rng)
    }

    fn validate_config(config: &GeneticConfig) -> Result<(), ConfigError> {
        config.validate()
    }

    fn conforms_to(&self, config: &GeneticConfig) -> bool {
        NNGenome::conforms_to(self, config)
    }

    fn process(&mut self, inputs: &[f32]) -> Result<Vec<f32>, GenomeError> {
        NNGenome::process(self, inputs)
    }

    fn reset_activations(&mut self) {
        NNGenome::reset_activations(self)
    }

    fn distance_to(&self, other: &Self, config: &GeneticConfig) -> f32 {
        NNGenome::genetic_distance(self, other, config)
    }

    fn mutate<R: Rng + ?Sized>(
        &mut self,
        progress: f32,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) {
        NNGenome::mutate(self, progress, history, config, rng)
    }

    fn crossover_with<R: Rng + ?Sized>(
        &self,
        other: &Self,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Self {
        NNGenome::crossover(self, other, config, rng)
    }

    fn check_integrity(&self, _config: &GeneticConfig) -> Result<(), GenomeError> {
        NNGenome::check_integrity(self)
    }

    fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    fn fitness(&self) -> f32 {
        self.fitness
    }

    fn set_adjusted_fitness(&mut self, adjusted_fitness: f32) {
        self.adjusted_fitness = adjusted_fitness;
    }

    fn adjusted_fitness(&self) -> f32 {
        self.adjusted_fitness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::num::NonZeroUsize;

    fn config() -> GeneticConfig {
        GeneticConfig {
            input_count: NonZeroUsize::new(3).unwrap(),
            output_count: NonZeroUsize::new(2).unwrap(),
            activation_types: vec![ActivationType::Sigmoid, ActivationType::ReLU],
            node_addition_mutation_chance: nevo::Annealed::fixed(0.5),
            gene_addition_mutation_chance: nevo::Annealed::fixed(0.8),
            ..GeneticConfig::default()
        }
    }

    fn evolved(seed: u64, rounds: usize) -> (NNGenome, History) {
        let config = config();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut history = History::new(&config);
        let mut genome = NNGenome::new(&config, &mut history, &mut rng);
        for _ in 0..rounds {
            genome.mutate(0.5, &mut history, &config, &mut rng);
        }
        (genome, history)
    }

    #[test]
    fn distance_to_self_is_zero() {
        let (genome, _) = evolved(11, 30);
        assert_eq!(NNGenome::genetic_distance(&genome, &genome, &config()), 0.0);
    }

    #[test]
    fn distance_counts_excess_and_disjoint() {
        let config = GeneticConfig {
            initial_expression_chance: 0.0,
            common_weight_factor: 0.0,
            ..GeneticConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut history = History::new(&config);
        let mut first = NNGenome::new(&config, &mut history, &mut rng);
        let mut second = first.clone();

        first.add_node(3, ActivationType::Sigmoid).unwrap();
        second.add_node(3, ActivationType::Sigmoid).unwrap();
        first.add_gene(0, 0, 2, 1.0).unwrap();
        second.add_gene(1, 1, 2, 1.0).unwrap();
        first.add_gene(5, 0, 3, 1.0).unwrap();
        first.add_gene(6, 3, 2, 1.0).unwrap();

        // Genes 5 and 6 are excess, 0 and 1 disjoint.
        assert_eq!(NNGenome::genetic_distance(&first, &second, &config), 4.0);
        assert_eq!(NNGenome::genetic_distance(&second, &first, &config), 4.0);
    }

    #[test]
    fn mutations_keep_feed_forward_genomes_acyclic() {
        for seed in 0..10 {
            let (genome, _) = evolved(seed, 40);
            assert_eq!(genome.check_integrity(), Ok(()));
            assert!(genome.conforms_to(&config()));
        }
    }

    #[test]
    fn recurrent_genomes_keep_state() {
        let config = GeneticConfig {
            allow_recurrence: true,
            output_activation_types: vec![ActivationType::Identity],
            initial_expression_chance: 0.0,
            ..GeneticConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut genome = NNGenome::new(&config, &mut History::new(&config), &mut rng);
        // input 0 -> output 2, output 2 -> hidden 3 -> output 2
        genome.add_gene(0, 0, 2, 1.0).unwrap();
        genome.add_node(3, ActivationType::Identity).unwrap();
        genome.add_gene(10, 2, 3, 1.0).unwrap();
        genome.add_gene(11, 3, 2, 1.0).unwrap();

        assert_eq!(genome.process(&[1.0]).unwrap(), vec![1.0]);
        assert_eq!(genome.process(&[1.0]).unwrap(), vec![1.0]);
        assert_eq!(genome.process(&[1.0]).unwrap(), vec![2.0]);
        genome.reset_activations();
        assert_eq!(genome.process(&[1.0]).unwrap(), vec![1.0]);
    }

    #[test]
    fn feed_forward_evaluation_is_stateless() {
        let config = GeneticConfig {
            output_activation_types: vec![ActivationType::Identity],
            initial_expression_chance: 0.0,
            ..GeneticConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut genome = NNGenome::new(&config, &mut History::new(&config), &mut rng);
        genome.add_node(3, ActivationType::ReLU).unwrap();
        genome.add_gene(0, 0, 3, 2.0).unwrap();
        genome.add_gene(5, 3, 2, 1.5).unwrap();
        genome.add_gene(1, 1, 2, -1.0).unwrap();

        assert_eq!(genome.process(&[2.0]).unwrap(), vec![5.0]);
        assert_eq!(genome.process(&[2.0]).unwrap(), vec![5.0]);
        assert_eq!(genome.process(&[-2.0]).unwrap(), vec![-1.0]);

        genome.genes.get_mut(&5).unwrap().set_suppressed(true);
        genome.network = None;
        assert_eq!(genome.process(&[2.0]).unwrap(), vec![-1.0]);
    }

    #[test]
    fn integrity_names_offending_gene() {
        let config = GeneticConfig {
            initial_expression_chance: 0.0,
            ..GeneticConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut genome = NNGenome::new(&config, &mut History::new(&config), &mut rng);
        genome.add_node(3, ActivationType::Sigmoid).unwrap();
        genome.add_gene(7, 2, 3, 1.0).unwrap();
        genome.insert_gene(Gene::new(8, 3, 2, 1.0));

        assert!(matches!(
            genome.check_integrity(),
            Err(GenomeError::Cycle { .. })
        ));
        genome.recurrent = true;
        assert_eq!(genome.check_integrity(), Ok(()));

        genome.insert_gene(Gene::new(9, 3, 40, 1.0));
        assert_eq!(
            genome.check_integrity(),
            Err(GenomeError::DanglingEndpoint { gene: 9, node: 40 })
        );
    }

    #[test]
    fn serde_round_trip() {
        let (mut genome, _) = evolved(3, 20);
        genome.process(&[0.1, 0.2, 0.3]).unwrap();
        let json = serde_json::to_string(&genome).unwrap();
        let mut restored: NNGenome = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, genome);
        assert_eq!(
            restored.process(&[0.1, 0.2, 0.3]).unwrap(),
            genome.process(&[0.1, 0.2, 0.3]).unwrap()
        );
    }

    #[test]
    fn conformance() {
        let (genome, _) = evolved(2, 5);
        assert!(genome.conforms_to(&config()));
        assert!(!genome.conforms_to(&GeneticConfig::default()));
    }
}
