//! # NEvo-NN
//! A neural network-based implementation of the [`nevo`] crate's `Genome` trait.
//!
//! Provides an [`NNGenome`] type usable in `nevo` `Population`s, along with
//! the [`Network`] phenotype it compiles to. Feed-forward genomes are
//! evaluated in topological order on every call; recurrent genomes advance
//! one synchronous time-step per call, keeping their activations until reset.
//!
//! [`NNGenome`]: crate::genomics::NNGenome
//! [`Network`]: crate::networks::Network
//!
//! # Example usage: Evolution of XOR function approximator
//! ```
//! use nevo_nn::genomics::{ActivationType, GeneticConfig, NNGenome};
//! use nevo_nn::NNPopulation;
//! use nevo::PopulationConfig;
//! use std::num::NonZeroUsize;
//!
//! fn evaluate_xor(genome: &mut NNGenome) -> f32 {
//!     let values = [
//!         ([0.0, 0.0], 0.0),
//!         ([0.0, 1.0], 1.0),
//!         ([1.0, 0.0], 1.0),
//!         ([1.0, 1.0], 0.0),
//!     ];
//!
//!     let mut error = 0.0;
//!     for (input, output) in values {
//!         match genome.process(&input) {
//!             Ok(result) => error += (result[0] - output).powi(2),
//!             Err(_) => return 0.0,
//!         }
//!     }
//!     1.0 / (1.0 + error)
//! }
//!
//! let genetic_config = GeneticConfig {
//!     input_count: NonZeroUsize::new(2).unwrap(),
//!     output_count: NonZeroUsize::new(1).unwrap(),
//!     activation_types: vec![ActivationType::Sigmoid, ActivationType::Tanh],
//!     ..GeneticConfig::default()
//! };
//! let population_config = PopulationConfig {
//!     size: NonZeroUsize::new(60).unwrap(),
//!     rng_seed: Some(3),
//!     ..PopulationConfig::default()
//! };
//!
//! let mut population = NNPopulation::new(population_config, genetic_config).unwrap();
//! population.evolve(10, evaluate_xor).unwrap();
//!
//! let champion = population.champion().unwrap();
//! println!("{}", champion);
//! println!("{}", serde_json::to_string(champion).unwrap());
//! ```
pub mod genomics;
pub mod networks;

/// Innovation numbers identify nodes and genes
/// across every genome of a population.
pub type Innovation = usize;

/// A population of neural network genomes.
pub type NNPopulation =
    nevo::Population<genomics::GeneticConfig, genomics::History, genomics::NNGenome>;
