use crate::genomics::ActivationType;

use nevo::{
    check_annealed, check_interval, check_non_negative, check_probability, Annealed, ConfigError,
};
use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Configuration data for genome generation
/// and inter-genome operations.
///
/// Mutation chances are [`Annealed`]: they range from
/// `min` in a population that keeps improving to `max`
/// in one about to go through a mass extinction.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]; [`validate`]
/// rejects configurations where they are not.
///
/// [`validate`]: GeneticConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Number of inputs in a genome.
    pub input_count: NonZeroUsize,
    /// Number of outputs in a genome.
    pub output_count: NonZeroUsize,
    /// Whether genomes carry a bias node, which always emits 1.
    pub bias_node: bool,
    /// Whether genes may form cycles. Recurrent genomes
    /// advance one time-step per evaluation.
    pub allow_recurrence: bool,
    /// Possible activation types for hidden nodes in a genome.
    /// If an empty vector is given, nodes will default
    /// to [`Sigmoid`].
    ///
    /// [`Sigmoid`]: crate::genomics::ActivationType
    pub activation_types: Vec<ActivationType>,
    /// Activation types of output nodes in a genome.
    /// If fewer than [`output_count`] are specified,
    /// the default is [`Sigmoid`].
    ///
    /// [`output_count`]: GeneticConfig::output_count
    /// [`Sigmoid`]: crate::genomics::ActivationType
    pub output_activation_types: Vec<ActivationType>,
    /// Chance that a gene between an input-output node pair
    /// is created during initial genome generation.
    pub initial_expression_chance: f32,
    /// Interval from which new and reset weights are drawn.
    pub new_weight_interval: (f32, f32),
    /// Chance of each gene's weight being mutated.
    pub weight_mutation_chance: Annealed,
    /// Relative magnitude of weight perturbations.
    pub weight_perturbation_pc: Annealed,
    /// Chance of a mutated weight being reset instead of perturbed.
    pub weight_reset_chance: Annealed,
    /// Chance of a node addition mutation.
    pub node_addition_mutation_chance: Annealed,
    /// Chance of a gene addition mutation.
    pub gene_addition_mutation_chance: Annealed,
    /// Chance of a suppressed gene being expressed again.
    pub gene_reenable_mutation_chance: Annealed,
    /// Maximum number of gene mutation attempts before
    /// mutation returns with failure.
    pub max_gene_addition_mutation_attempts: usize,
    /// Chance that an inherited gene is suppressed
    /// if it was suppressed in either parent.
    pub disable_inherited_gene_chance: f32,
    /// Reject input nodes only present in the less fit parent.
    ///
    /// Genomes built from the same configuration all hold the
    /// full input, bias and output node set, so this only takes
    /// effect when crossing genomes of differing configurations.
    pub infanticide_input_nodes: bool,
    /// Reject output nodes only present in the less fit parent.
    /// Like `infanticide_input_nodes`, it never fires for parents
    /// sharing a configuration.
    pub infanticide_output_nodes: bool,
    /// Weight of excess genes in genetic distance.
    pub excess_gene_factor: f32,
    /// Weight of disjoint genes in genetic distance.
    pub disjoint_gene_factor: f32,
    /// Weight of the common gene weight average in genetic distance.
    pub common_weight_factor: f32,
    /// Genomes with fewer genes than this are not normalized
    /// by size in genetic distance.
    pub distance_normalization_threshold: usize,
}

impl GeneticConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, empty, `false`, or in the case of
    /// `NonZeroUsize`s, 1.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to fill in unused values during
    /// configuration instantiation.
    ///
    /// # Examples
    /// ```
    /// use nevo_nn::genomics::GeneticConfig;
    ///
    /// let cfg = GeneticConfig {
    ///     // Specify some values here...
    ///     allow_recurrence: true,
    ///     initial_expression_chance: 1.0,
    ///     // Default the rest...
    ///     ..GeneticConfig::zero()
    /// };
    /// assert!(cfg.validate().is_ok());
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            input_count: NonZeroUsize::MIN,
            output_count: NonZeroUsize::MIN,
            bias_node: false,
            allow_recurrence: false,
            activation_types: vec![],
            output_activation_types: vec![],
            initial_expression_chance: 0.0,
            new_weight_interval: (0.0, 0.0),
            weight_mutation_chance: Annealed::fixed(0.0),
            weight_perturbation_pc: Annealed::fixed(0.0),
            weight_reset_chance: Annealed::fixed(0.0),
            node_addition_mutation_chance: Annealed::fixed(0.0),
            gene_addition_mutation_chance: Annealed::fixed(0.0),
            gene_reenable_mutation_chance: Annealed::fixed(0.0),
            max_gene_addition_mutation_attempts: 0,
            disable_inherited_gene_chance: 0.0,
            infanticide_input_nodes: false,
            infanticide_output_nodes: false,
            excess_gene_factor: 0.0,
            disjoint_gene_factor: 0.0,
            common_weight_factor: 0.0,
            distance_normalization_threshold: 0,
        }
    }

    /// Number of input nodes plus the bias node, if any.
    pub fn fixed_node_count(&self) -> usize {
        self.input_count.get() + self.bias_node as usize
    }

    /// Checks every field, returning the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("initial_expression_chance", self.initial_expression_chance)?;
        check_interval("new_weight_interval", self.new_weight_interval)?;
        check_annealed("weight_mutation_chance", self.weight_mutation_chance)?;
        check_non_negative("weight_perturbation_pc", self.weight_perturbation_pc.min)?;
        check_non_negative("weight_perturbation_pc", self.weight_perturbation_pc.max)?;
        check_interval(
            "weight_perturbation_pc",
            (self.weight_perturbation_pc.min, self.weight_perturbation_pc.max),
        )?;
        check_annealed("weight_reset_chance", self.weight_reset_chance)?;
        check_annealed(
            "node_addition_mutation_chance",
            self.node_addition_mutation_chance,
        )?;
        check_annealed(
            "gene_addition_mutation_chance",
            self.gene_addition_mutation_chance,
        )?;
        check_annealed(
            "gene_reenable_mutation_chance",
            self.gene_reenable_mutation_chance,
        )?;
        check_probability(
            "disable_inherited_gene_chance",
            self.disable_inherited_gene_chance,
        )?;
        check_non_negative("excess_gene_factor", self.excess_gene_factor)?;
        check_non_negative("disjoint_gene_factor", self.disjoint_gene_factor)?;
        check_non_negative("common_weight_factor", self.common_weight_factor)?;
        Ok(())
    }
}

impl Default for GeneticConfig {
    fn default() -> GeneticConfig {
        GeneticConfig {
            bias_node: true,
            activation_types: vec![ActivationType::Sigmoid],
            output_activation_types: vec![ActivationType::Sigmoid],
            initial_expression_chance: 1.0,
            new_weight_interval: (-2.0, 2.0),
            weight_mutation_chance: Annealed::new(0.7, 0.9),
            weight_perturbation_pc: Annealed::new(0.1, 0.4),
            weight_reset_chance: Annealed::new(0.1, 0.3),
            node_addition_mutation_chance: Annealed::new(0.03, 0.3),
            gene_addition_mutation_chance: Annealed::new(0.03, 0.3),
            gene_reenable_mutation_chance: Annealed::new(0.03, 0.3),
            max_gene_addition_mutation_attempts: 20,
            disable_inherited_gene_chance: 0.75,
            excess_gene_factor: 1.0,
            disjoint_gene_factor: 1.0,
            common_weight_factor: 0.5,
            distance_normalization_threshold: 20,
            ..GeneticConfig::zero()
        }
    }
}
