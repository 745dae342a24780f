//! # NEvo-FiTo
//! Fixed-topology hybrid genomes for the [`nevo`] crate.
//!
//! A [`HybridGenome`] places a fixed sequence of numeric layers in
//! front of an [`NNGenome`]. Layer shapes are set once, at genome
//! construction, from the [`FixedTopologyConfig`]; evolution only ever
//! changes their parameters. The layers' output is flattened and fed
//! to the NEAT network, whose topology evolves as usual.
//!
//! Layer evaluation is delegated to a user-supplied [`Kernel`], so that
//! any tensor backend can provide the numeric operations.
//!
//! [`NNGenome`]: nevo_nn::genomics::NNGenome
//!
//! # Example usage
//! ```
//! use nevo::{Population, PopulationConfig};
//! use nevo_fito::{
//!     FixedLayer, FixedTopologyConfig, HybridConfig, HybridGenome, HybridHistory, Kernel,
//!     KernelError, LayerSpec, Tensor,
//! };
//! use nevo_nn::genomics::GeneticConfig;
//! use std::num::NonZeroUsize;
//!
//! /// Scales every input by the layer's single weight.
//! #[derive(Clone, Debug, Default)]
//! struct Scale;
//!
//! impl Kernel for Scale {
//!     fn apply(&self, layer: &FixedLayer, input: &Tensor) -> Result<Tensor, KernelError> {
//!         let w = layer.weights().data()[0];
//!         Tensor::new(input.shape().to_vec(), input.data().iter().map(|x| x * w).collect())
//!     }
//! }
//!
//! let config = HybridConfig {
//!     fixed: FixedTopologyConfig {
//!         input_shape: vec![2],
//!         layers: vec![LayerSpec::new("scale", vec![1], vec![])],
//!         ..FixedTopologyConfig::default()
//!     },
//!     neat: GeneticConfig {
//!         input_count: NonZeroUsize::new(2).unwrap(),
//!         ..GeneticConfig::default()
//!     },
//! };
//! let population_config = PopulationConfig {
//!     size: NonZeroUsize::new(20).unwrap(),
//!     rng_seed: Some(1),
//!     ..PopulationConfig::default()
//! };
//!
//! let mut population =
//!     Population::<HybridConfig, HybridHistory, HybridGenome<Scale>>::new(population_config, config)
//!         .unwrap();
//! population
//!     .evolve(3, |genome| genome.process(&[1.0, -1.0]).map_or(0.0, |o| o[0]))
//!     .unwrap();
//! assert_eq!(population.generation(), 3);
//! ```
mod config;
mod errors;
mod genome;
mod layers;

pub use config::{FixedTopologyConfig, HybridConfig, MatingMode};
pub use errors::{HybridError, KernelError};
pub use genome::{HybridGenome, HybridHistory};
pub use layers::{FixedLayer, Kernel, LayerSpec, Tensor};
