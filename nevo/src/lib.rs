//! An implementation of NeuroEvolution of Augmenting Topologies,
//! following the 2002 paper: <http://nn.cs.utexas.edu/keyword?stanley:ec02>
//!
//! It is designed to be highly-configurable, allowing arbitrary user-defined
//! genomic structures via the `Genome` trait. Populations speciate their
//! genomes, share fitness within species, and fall back to a mass extinction
//! when the whole population stagnates. Mutation pressure is annealed:
//! probabilities move towards the upper end of their configured ranges as
//! stagnation grows.
//!
//! A neural network-based genome representation, as in the original
//! algorithm, is supplied via the `nevo-nn` crate; `nevo-fito` adds genomes
//! with fixed numeric layers in front of the evolving network.
//!
//! Populations are seeded from a serializable ChaCha RNG, so runs are
//! reproducible and can be saved and resumed mid-experiment.
//!
//! # Example usage: Evolution of XOR function approximator, using `nevo-nn`
//! ```
//! use nevo::{Population, PopulationConfig, RayonScheduler};
//! use nevo_nn::genomics::{GeneticConfig, GenomeError, NNGenome};
//! use std::num::NonZeroUsize;
//!
//! fn evaluate_xor(genome: &mut NNGenome) -> Result<f32, GenomeError> {
//!     let values = [
//!         ([0.0, 0.0], 0.0),
//!         ([0.0, 1.0], 1.0),
//!         ([1.0, 0.0], 1.0),
//!         ([1.0, 1.0], 0.0),
//!     ];
//!
//!     let mut error = 0.0;
//!     for (input, output) in values {
//!         genome.reset_activations();
//!         error += (genome.process(&input)?[0] - output).powi(2);
//!     }
//!     Ok(1.0 / (1.0 + error))
//! }
//!
//! fn main() {
//!     let genetic_config = GeneticConfig {
//!         input_count: NonZeroUsize::new(2).unwrap(),
//!         output_count: NonZeroUsize::new(1).unwrap(),
//!         ..GeneticConfig::default()
//!     };
//!
//!     let population_config = PopulationConfig {
//!         size: NonZeroUsize::new(50).unwrap(),
//!         rng_seed: Some(42),
//!         ..PopulationConfig::default()
//!     };
//!
//!     let mut population = Population::<_, _, NNGenome>::new(population_config, genetic_config)
//!         .unwrap();
//!
//!     let log = population
//!         .evolve_with(10, &RayonScheduler, &evaluate_xor, |record| {
//!             record.fitness.maximum > 0.95
//!         })
//!         .unwrap();
//!
//!     for record in log.iter() {
//!         println!("{}", record);
//!     }
//!     println!("{}", population.champion().unwrap());
//! }
//! ```
mod annealing;
mod genome;
mod persistence;
mod populations;
mod processing;
mod rng;
mod validation;

pub use annealing::Annealed;
pub use genome::*;
pub use persistence::{PersistenceError, FORMAT_VERSION};
pub use populations::*;
pub use processing::{ProcessingScheduler, RayonScheduler, SerialScheduler};
pub use rng::{chance, rank_prob_dist, PopulationRng};
pub use validation::{
    check_annealed, check_interval, check_non_negative, check_positive, check_probability,
    ConfigError,
};
