use crate::genomics::GeneticConfig;
use crate::Innovation;

use ahash::RandomState;
use nevo::InnovationHistory;
use serde::{Deserialize, Serialize};

use std::collections::hash_map::{Entry, HashMap};

/// A `History` keeps track of gene and node innovations in a
/// population, in order to make sure identical mutations
/// within a generation are assigned the same innovation numbers.
///
/// For gene innovations the input and output nodes are used to
/// identify identical mutations.
///
/// For node innovations the split gene is used to identify
/// identical mutations, and the innovation numbers for the
/// corresponding input gene, new node, and output gene are
/// recorded, in that order.
///
/// The recorded mutations are forgotten on [`clear`], but the
/// innovation counters keep growing for the population's lifetime.
///
/// [`clear`]: InnovationHistory::clear
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    fixed_node_count: usize,
    output_count: usize,
    next_gene_innovation: Innovation,
    next_node_innovation: Innovation,
    gene_innovations: HashMap<(Innovation, Innovation), Innovation, RandomState>,
    node_innovations: HashMap<Innovation, (Innovation, Innovation, Innovation), RandomState>,
}

impl History {
    /// Creates a new History using the specified configuration.
    ///
    /// Genes between an input (or bias) node and an output node
    /// always have the canonical innovation number
    /// `o + i ⨯ output_count`, where `i` is the innovation number
    /// of their input node and `o` the index of their output node.
    /// Thus, gene innovation numbers handed out by mutations start
    /// at `fixed_node_count ⨯ output_count`.
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::{GeneticConfig, History};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     bias_node: true,
    ///     ..GeneticConfig::zero()
    /// };
    /// let history = History::new(&config);
    ///
    /// assert_eq!(history.next_gene_innovation(), 4 * 2);
    /// assert_eq!(history.next_node_innovation(), 4 + 2);
    /// ```
    pub fn new(config: &GeneticConfig) -> History {
        let fixed_node_count = config.fixed_node_count();
        let output_count = config.output_count.get();
        History {
            fixed_node_count,
            output_count,
            next_gene_innovation: fixed_node_count * output_count,
            next_node_innovation: fixed_node_count + output_count,
            gene_innovations: HashMap::default(),
            node_innovations: HashMap::default(),
        }
    }

    /// Returns the canonical innovation number of a gene
    /// between a fixed node and an output node, if the
    /// pair is one.
    fn canonical_gene_innovation(
        &self,
        input: Innovation,
        output: Innovation,
    ) -> Option<Innovation> {
        let outputs = self.fixed_node_count..self.fixed_node_count + self.output_count;
        if input < self.fixed_node_count && outputs.contains(&output) {
            Some(output - self.fixed_node_count + input * self.output_count)
        } else {
            None
        }
    }

    /// Returns the innovation number for a gene between
    /// `input` and `output`, registering the mutation if
    /// it was not yet seen this generation.
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::{GeneticConfig, History};
    ///
    /// let config = GeneticConfig::default();
    /// let mut history = History::new(&config);
    ///
    /// // Input 0 -> output 2 is an initial gene.
    /// assert_eq!(history.gene_innovation(0, 2), 0);
    ///
    /// let id = history.gene_innovation(2, 7);
    /// assert_eq!(history.gene_innovation(2, 7), id);
    /// assert_ne!(history.gene_innovation(7, 2), id);
    /// ```
    pub fn gene_innovation(&mut self, input: Innovation, output: Innovation) -> Innovation {
        if let Some(id) = self.canonical_gene_innovation(input, output) {
            return id;
        }
        match self.gene_innovations.entry((input, output)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = self.next_gene_innovation;
                self.next_gene_innovation += 1;
                *entry.insert(id)
            }
        }
    }

    /// Returns the innovation numbers for splitting `split_gene`,
    /// in the format `(input gene, new node, output gene)`.
    ///
    /// If `duplicate` is `true`, fresh numbers are minted
    /// even if the split was already registered, and replace
    /// the registered ones. This is used when the mutating genome
    /// already holds the node that the registered split would add.
    pub fn node_innovation(
        &mut self,
        split_gene: Innovation,
        input: Innovation,
        output: Innovation,
        duplicate: bool,
    ) -> (Innovation, Innovation, Innovation) {
        if !duplicate {
            if let Some(&record) = self.node_innovations.get(&split_gene) {
                return record;
            }
        }
        let node = self.next_node_innovation;
        self.next_node_innovation += 1;

        let input_gene = self.next_gene_innovation;
        let output_gene = self.next_gene_innovation + 1;
        self.next_gene_innovation += 2;
        self.gene_innovations.insert((input, node), input_gene);
        self.gene_innovations.insert((node, output), output_gene);

        let record = (input_gene, node, output_gene);
        self.node_innovations.insert(split_gene, record);
        record
    }

    /// Returns the next unassigned gene innovation number.
    pub fn next_gene_innovation(&self) -> Innovation {
        self.next_gene_innovation
    }

    /// Returns the next unassigned node innovation number.
    pub fn next_node_innovation(&self) -> Innovation {
        self.next_node_innovation
    }

    /// Returns an iterator over the gene mutations recorded this
    /// generation, in the format `((input node, output node), gene)`.
    /// No ordering is guaranteed.
    pub fn gene_innovation_history(
        &self,
    ) -> impl Iterator<Item = (&(Innovation, Innovation), &Innovation)> {
        self.gene_innovations.iter()
    }

    /// Returns an iterator over the node mutations recorded this
    /// generation, in the format
    /// `(split gene, (input gene, new node, output gene))`.
    /// No ordering is guaranteed.
    pub fn node_innovation_history(
        &self,
    ) -> impl Iterator<Item = (&Innovation, &(Innovation, Innovation, Innovation))> {
        self.node_innovations.iter()
    }
}

impl InnovationHistory for History {
    type Config = GeneticConfig;

    fn new(config: &GeneticConfig) -> History {
        History::new(config)
    }

    fn clear(&mut self) {
        self.gene_innovations.clear();
        self.node_innovations.clear();
    }

    fn innovation_count(&self) -> usize {
        self.next_gene_innovation
    }
}
