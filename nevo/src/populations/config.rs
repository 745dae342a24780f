use crate::validation::*;
use crate::ConfigError;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// What to do when a fitness evaluation fails, or
/// produces a NaN, infinite or negative score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessFailurePolicy {
    /// Abort the generation with [`EvolutionError::Fitness`].
    ///
    /// [`EvolutionError::Fitness`]: crate::EvolutionError::Fitness
    #[default]
    Propagate,
    /// Score the genome 0 and log a warning.
    AssignMinimal,
}

/// Configuration data for population generation
/// and evolution.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]; [`validate`]
/// rejects configurations where they are not.
///
/// [`validate`]: PopulationConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Size of the population.
    pub size: NonZeroUsize,
    /// Genetic distance threshold, beyond which
    /// genomes are considered as belonging to
    /// different species.
    pub species_distance_threshold: f32,
    /// Fraction of each species (lowest fitness first)
    /// removed before reproduction. At least one
    /// member always survives.
    pub weak_genomes_removal_pc: f32,
    /// Top n of each species which is copied
    /// as-is to the next generation.
    pub elitism: usize,
    /// Chance that offspring will be the result
    /// of sexual reproduction (as opposed to asexual).
    pub mating_chance: f32,
    /// Chance that genomes from different species
    /// will be selected to mate.
    pub interspecies_mating_chance: f32,
    /// Ratio between the selection chances of
    /// consecutively ranked parents. Must be above 1.
    pub rank_prob_dist_coefficient: f32,
    /// Number of generations without a fitness increase
    /// before a species is considered _stagnated_.
    pub stagnation_threshold: NonZeroUsize,
    /// Offspring allotment penalty for stagnation.
    /// Stagnated species will receive this percentage
    /// fewer offspring.
    pub stagnation_penalty: f32,
    /// Species whose share of the population's adjusted
    /// fitness falls below this receive no offspring.
    pub species_elimination_share: f32,
    /// Generations without a population-wide improvement
    /// before a mass extinction.
    pub mass_extinction_threshold: NonZeroUsize,
    /// Relative gain over the reference best fitness
    /// that counts as an improvement.
    pub maex_improvement_threshold_pc: f32,
    /// Genomes kept by a mass extinction.
    pub maex_survivors: NonZeroUsize,
    pub fitness_failure_policy: FitnessFailurePolicy,
    /// Seed for the population's RNG; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl PopulationConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, empty, or in the case of
    /// `NonZeroUsize`s, 1.
    ///
    /// # Note
    /// This value does not pass [`validate`]. It is meant as a
    /// way to abbreviate configuration instantiation.
    ///
    /// [`validate`]: PopulationConfig::validate
    ///
    /// # Examples
    /// ```
    /// use nevo::PopulationConfig;
    ///
    /// let cfg = PopulationConfig {
    ///     // Specify some values here...
    ///     species_distance_threshold: 1.5,
    ///     rank_prob_dist_coefficient: 1.75,
    ///     // Default the rest...
    ///     ..PopulationConfig::zero()
    /// };
    /// assert!(cfg.validate().is_ok());
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::MIN,
            species_distance_threshold: 0.0,
            weak_genomes_removal_pc: 0.0,
            elitism: 0,
            mating_chance: 0.0,
            interspecies_mating_chance: 0.0,
            rank_prob_dist_coefficient: 0.0,
            stagnation_threshold: NonZeroUsize::MIN,
            stagnation_penalty: 0.0,
            species_elimination_share: 0.0,
            mass_extinction_threshold: NonZeroUsize::MIN,
            maex_improvement_threshold_pc: 0.0,
            maex_survivors: NonZeroUsize::MIN,
            fitness_failure_policy: FitnessFailurePolicy::Propagate,
            rng_seed: None,
        }
    }

    /// Checks every field, returning the first violation found.
    ///
    /// # Examples
    /// ```
    /// use nevo::{ConfigError, PopulationConfig};
    ///
    /// let cfg = PopulationConfig {
    ///     mating_chance: 1.2,
    ///     ..PopulationConfig::default()
    /// };
    /// assert!(matches!(
    ///     cfg.validate(),
    ///     Err(ConfigError::ProbabilityOutOfRange { field: "mating_chance", .. })
    /// ));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("species_distance_threshold", self.species_distance_threshold)?;
        check_probability("weak_genomes_removal_pc", self.weak_genomes_removal_pc)?;
        check_probability("mating_chance", self.mating_chance)?;
        check_probability("interspecies_mating_chance", self.interspecies_mating_chance)?;
        if !(self.rank_prob_dist_coefficient > 1.0 && self.rank_prob_dist_coefficient.is_finite())
        {
            return Err(ConfigError::NotAbove {
                field: "rank_prob_dist_coefficient",
                value: self.rank_prob_dist_coefficient,
                bound: 1.0,
            });
        }
        check_probability("stagnation_penalty", self.stagnation_penalty)?;
        check_probability("species_elimination_share", self.species_elimination_share)?;
        check_non_negative(
            "maex_improvement_threshold_pc",
            self.maex_improvement_threshold_pc,
        )?;
        Ok(())
    }
}

impl Default for PopulationConfig {
    fn default() -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::new(100).unwrap_or(NonZeroUsize::MIN),
            species_distance_threshold: 1.75,
            weak_genomes_removal_pc: 0.7,
            elitism: 1,
            mating_chance: 0.75,
            interspecies_mating_chance: 0.01,
            rank_prob_dist_coefficient: 1.75,
            stagnation_threshold: NonZeroUsize::new(15).unwrap_or(NonZeroUsize::MIN),
            stagnation_penalty: 1.0,
            species_elimination_share: 0.0,
            mass_extinction_threshold: NonZeroUsize::new(15).unwrap_or(NonZeroUsize::MIN),
            maex_improvement_threshold_pc: 0.03,
            maex_survivors: NonZeroUsize::new(5).unwrap_or(NonZeroUsize::MIN),
            fitness_failure_policy: FitnessFailurePolicy::Propagate,
            rng_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(PopulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_threshold_rejected() {
        let cfg = PopulationConfig {
            species_distance_threshold: 0.0,
            ..PopulationConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonPositive {
                field: "species_distance_threshold",
                value: 0.0
            })
        );
    }

    #[test]
    fn flat_rank_distribution_rejected() {
        let cfg = PopulationConfig {
            rank_prob_dist_coefficient: 1.0,
            ..PopulationConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::NotAbove { .. })));
    }

    #[test]
    fn serde_round_trip() {
        let cfg = PopulationConfig {
            rng_seed: Some(42),
            fitness_failure_policy: FitnessFailurePolicy::AssignMinimal,
            ..PopulationConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(serde_json::from_str::<PopulationConfig>(&json).unwrap(), cfg);
    }
}
