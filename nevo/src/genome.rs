use crate::ConfigError;

use rand::Rng;

/// An interface for genomes that can be used by NEAT.
///
/// A population only ever talks to its genomes through
/// this trait, so graph genomes and hybrid genomes with
/// fixed front ends can be evolved by the same loop.
pub trait Genome: Sized {
    type Config;
    type InnovationHistory: InnovationHistory<Config = Self::Config>;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns a genome with the configured base structure.
    fn new<R: Rng + ?Sized>(
        config: &Self::Config,
        history: &mut Self::InnovationHistory,
        rng: &mut R,
    ) -> Self;

    /// Checks a configuration before any genome is built from it.
    fn validate_config(config: &Self::Config) -> Result<(), ConfigError>;

    /// Returns `true` if the genome could have been
    /// produced under the specified configuration.
    fn conforms_to(&self, config: &Self::Config) -> bool;

    /// Feeds `inputs` through the genome's phenotype.
    fn process(&mut self, inputs: &[f32]) -> Result<Vec<f32>, Self::Error>;

    /// Clears any activation state kept between calls to [`process`].
    ///
    /// [`process`]: Genome::process
    fn reset_activations(&mut self);

    /// Returns the genetic distance between two genomes.
    /// The distance between a genome and itself is 0.
    fn distance_to(&self, other: &Self, config: &Self::Config) -> f32;

    /// Mutates the genome in place.
    ///
    /// `progress` lies in `[0, 1]` and grows as the population
    /// stagnates; annealed mutation chances are resolved with it.
    fn mutate<R: Rng + ?Sized>(
        &mut self,
        progress: f32,
        history: &mut Self::InnovationHistory,
        config: &Self::Config,
        rng: &mut R,
    );

    /// Combines two genomes and returns a "child" genome
    /// with zeroed fitness.
    fn crossover_with<R: Rng + ?Sized>(&self, other: &Self, config: &Self::Config, rng: &mut R)
        -> Self;

    /// Verifies the genome's structural invariants.
    fn check_integrity(&self, config: &Self::Config) -> Result<(), Self::Error>;

    /// Sets the genome's fitness value.
    ///
    /// Populations only ever assign finite, non-negative values.
    fn set_fitness(&mut self, fitness: f32);

    /// Returns the genome's fitness value.
    fn fitness(&self) -> f32;

    /// Sets the genome's fitness after species-size sharing.
    fn set_adjusted_fitness(&mut self, adjusted_fitness: f32);

    /// Returns the genome's fitness after species-size sharing.
    fn adjusted_fitness(&self) -> f32;
}

/// An Innovation History is used to keep track
/// of genetic innovations throught successive
/// generations of genomes.
///
/// Populations own a single history and call
/// [`clear`] once per generation, after reproduction.
///
/// [`clear`]: InnovationHistory::clear
pub trait InnovationHistory {
    type Config;

    fn new(config: &Self::Config) -> Self;

    /// Forgets the mutations recorded during the current
    /// generation. Identifier counters are never reset.
    fn clear(&mut self);

    /// Returns the number of innovation identifiers handed out so far.
    fn innovation_count(&self) -> usize;
}
