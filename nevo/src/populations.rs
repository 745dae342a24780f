//! A Population is a collection of genomes.
//! These are grouped into species, which can
//! be evolved using a genome evaluation function
//! as the source of selective pressure.
mod config;
mod errors;
pub mod logging;
mod offspring_factory;
#[cfg(test)]
mod scalar;
mod species;

use crate::persistence::{self, PersistenceError};
use crate::processing::ProcessingScheduler;
use crate::rng::{seeded_rng, PopulationRng};
use crate::{ConfigError, Genome, InnovationHistory};
pub use config::{FitnessFailurePolicy, PopulationConfig};
pub use errors::EvolutionError;
use logging::{EvolutionLog, GenerationRecord, Stats};
use offspring_factory::OffspringFactory;
pub use species::{Species, SpeciesID};

use log::{debug, info, warn};
use rand::SeedableRng;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use std::convert::Infallible;
use std::fmt::Display;
use std::path::Path;

/// The step of the generation loop a population is in.
///
/// A generation runs `Evaluating → Speciating → Culling →
/// Reproducing`, or `Evaluating → Speciating → MassExtinction`,
/// and returns to `Idle`. When a generation is aborted by an
/// error, the phase that failed is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Evaluating,
    Speciating,
    Culling,
    Reproducing,
    MassExtinction,
}

/// Population-wide stagnation, measured against the
/// best fitness at the last improvement.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Stagnation {
    generations: usize,
    reference_fitness: Option<f32>,
}

/// A population of genomes.
#[derive(Serialize, Deserialize)]
pub struct Population<C, H, G> {
    species: Vec<Species<G>>,
    history: H,
    generation: usize,
    phase: Phase,
    stagnation: Stagnation,
    log: EvolutionLog,
    rng: PopulationRng,
    population_config: PopulationConfig,
    genetic_config: C,
}

impl<C, H, G> Population<C, H, G>
where
    H: InnovationHistory<Config = C>,
    G: Genome<InnovationHistory = H, Config = C> + Clone,
{
    /// Creates a new population using the passed configurations.
    ///
    /// The type of `genetic_config` depends on the implementation
    /// of [`Genome`], and is effectively opaque to the population.
    ///
    /// # Errors
    /// Returns an error if either configuration is invalid.
    ///
    /// # Examples
    /// ```
    /// use nevo::{Population, PopulationConfig};
    /// use nevo_nn::genomics::{GeneticConfig, NNGenome};
    /// use std::num::NonZeroUsize;
    ///
    /// let pop_config = PopulationConfig {
    ///     size: NonZeroUsize::new(20).unwrap(),
    ///     ..PopulationConfig::default()
    /// };
    ///
    /// let population = Population::<_, _, NNGenome>::new(pop_config, GeneticConfig::default())
    ///     .unwrap();
    /// assert_eq!(population.genomes().count(), 20);
    /// ```
    pub fn new(
        population_config: PopulationConfig,
        genetic_config: C,
    ) -> Result<Population<C, H, G>, ConfigError> {
        population_config.validate()?;
        G::validate_config(&genetic_config)?;

        let mut rng = seeded_rng(population_config.rng_seed);
        let mut history = H::new(&genetic_config);
        let mut s0 = Species::new(
            SpeciesID(0, 0),
            G::new(&genetic_config, &mut history, &mut rng),
        );
        for _ in 1..population_config.size.get() {
            s0.add_genome(G::new(&genetic_config, &mut history, &mut rng));
        }

        Ok(Population {
            species: vec![s0],
            history,
            generation: 0,
            phase: Phase::Idle,
            stagnation: Stagnation::default(),
            log: EvolutionLog::new(),
            rng,
            population_config,
            genetic_config,
        })
    }

    /// Creates a new population using the passed configurations,
    /// and seeds it with the specified genomes. Each group of genomes
    /// is assigned to its own species, with the first as the
    /// species representative. If the number of seed genomes is not
    /// as large as the configured population size, the remaining
    /// space is filled with fresh genomes in a species of their own.
    ///
    /// # Errors
    /// Returns an error if either configuration is invalid, if there
    /// are more seed genomes than the configured population size, or
    /// if any of the genomes is malformed or incompatible with the
    /// specified genetic config, as established by [`Genome::conforms_to`].
    ///
    /// # Examples
    /// ```
    /// use nevo::{Population, PopulationConfig};
    /// use nevo_nn::genomics::{GeneticConfig, History, NNGenome};
    /// use nevo::InnovationHistory;
    /// use rand::SeedableRng;
    /// use std::num::NonZeroUsize;
    ///
    /// let pop_config = PopulationConfig {
    ///     size: NonZeroUsize::new(100).unwrap(),
    ///     ..PopulationConfig::default()
    /// };
    /// let genetic_config = GeneticConfig::default();
    /// let mut history = History::new(&genetic_config);
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
    /// let mut seed = || NNGenome::new(&genetic_config, &mut history, &mut rng);
    /// let groups = vec![vec![seed(), seed()], vec![seed()]];
    ///
    /// let population = Population::new_seeded(groups, pop_config, genetic_config).unwrap();
    ///
    /// assert_eq!(population.species().count(), 3);
    /// assert_eq!(population.species().map(|s| s.len()).collect::<Vec<_>>(), vec![97, 2, 1]);
    /// ```
    pub fn new_seeded(
        genomes: Vec<Vec<G>>,
        population_config: PopulationConfig,
        genetic_config: C,
    ) -> Result<Population<C, H, G>, ConfigError> {
        population_config.validate()?;
        G::validate_config(&genetic_config)?;

        let seed_count: usize = genomes.iter().map(|v| v.len()).sum();
        let size = population_config.size.get();
        if size < seed_count {
            return Err(ConfigError::InvalidSeed(format!(
                "{} seed genomes exceed the population size of {}",
                seed_count, size
            )));
        }
        for genome in genomes.iter().flatten() {
            if !genome.conforms_to(&genetic_config) {
                return Err(ConfigError::InvalidSeed(
                    "a seed genome does not conform to the genetic configuration".to_string(),
                ));
            }
            genome
                .check_integrity(&genetic_config)
                .map_err(|e| ConfigError::InvalidSeed(e.to_string()))?;
        }

        let mut rng = seeded_rng(population_config.rng_seed);
        let mut history = H::new(&genetic_config);
        let mut species: Vec<Species<G>> = Vec::with_capacity(genomes.len() + 1);
        if seed_count < size {
            let mut s0 = Species::new(
                SpeciesID(0, 0),
                G::new(&genetic_config, &mut history, &mut rng),
            );
            for _ in seed_count + 1..size {
                s0.add_genome(G::new(&genetic_config, &mut history, &mut rng));
            }
            species.push(s0);
        }
        for group in genomes.into_iter().filter(|v| !v.is_empty()) {
            let mut group = group.into_iter();
            if let Some(founder) = group.next() {
                let mut s = Species::new(SpeciesID(0, species.len()), founder);
                for g in group {
                    s.add_genome(g);
                }
                species.push(s);
            }
        }

        Ok(Population {
            species,
            history,
            generation: 0,
            phase: Phase::Idle,
            stagnation: Stagnation::default(),
            log: EvolutionLog::new(),
            rng,
            population_config,
            genetic_config,
        })
    }

    /// Evaluates the fitness of each genome in the
    /// population using the passed evaluator, on the
    /// calling thread.
    ///
    /// # Errors
    /// NaN, infinite and negative scores are handled by the
    /// configured [`FitnessFailurePolicy`].
    pub fn evaluate_fitness<E>(&mut self, mut evaluator: E) -> Result<(), EvolutionError>
    where
        E: FnMut(&mut G) -> f32,
    {
        self.phase = Phase::Evaluating;
        let scores: Vec<Result<f32, Infallible>> = self
            .species
            .iter_mut()
            .flat_map(|s| s.genomes.iter_mut())
            .map(|g| Ok(evaluator(g)))
            .collect();
        self.assign_fitness(scores)
    }

    /// Evaluates the fitness of each genome in the population
    /// through `scheduler`.
    ///
    /// # Errors
    /// Failed evaluations, and NaN, infinite or negative scores,
    /// are handled by the configured [`FitnessFailurePolicy`].
    pub fn evaluate_with<S, F, E>(&mut self, scheduler: &S, fitness: &F) -> Result<(), EvolutionError>
    where
        S: ProcessingScheduler,
        G: Send,
        F: Fn(&mut G) -> Result<f32, E> + Sync,
        E: Send + Display,
    {
        self.phase = Phase::Evaluating;
        let mut genomes: Vec<&mut G> = self
            .species
            .iter_mut()
            .flat_map(|s| s.genomes.iter_mut())
            .collect();
        let scores = scheduler.evaluate(&mut genomes, fitness);
        self.assign_fitness(scores)
    }

    fn assign_fitness<E: Display>(&mut self, scores: Vec<Result<f32, E>>) -> Result<(), EvolutionError> {
        let generation = self.generation;
        let policy = self.population_config.fitness_failure_policy;
        let expected = self.population_config.size.get();
        if scores.len() != expected {
            return Err(EvolutionError::ScoreCount {
                generation,
                expected,
                found: scores.len(),
            });
        }
        let genomes = self.species.iter_mut().flat_map(|s| s.genomes.iter_mut());
        for (index, (genome, score)) in genomes.zip(scores).enumerate() {
            let reason = match score {
                Ok(fitness) if fitness.is_finite() && fitness >= 0.0 => {
                    genome.set_fitness(fitness);
                    continue;
                }
                Ok(fitness) => format!("invalid fitness score {}", fitness),
                Err(e) => e.to_string(),
            };
            match policy {
                FitnessFailurePolicy::Propagate => {
                    return Err(EvolutionError::Fitness {
                        generation,
                        index,
                        reason,
                    })
                }
                FitnessFailurePolicy::AssignMinimal => {
                    warn!(
                        "genome {} of generation {}: {}; assigning minimal fitness",
                        index, generation, reason
                    );
                    genome.set_fitness(0.0);
                }
            }
        }
        Ok(())
    }

    /// Runs every step of a generation after evaluation:
    /// speciation, then either culling and reproduction or
    /// a mass extinction. Returns the generation's record.
    ///
    /// Fitness values must have been assigned beforehand by
    /// [`evaluate_fitness`] or [`evaluate_with`].
    ///
    /// # Errors
    /// Returns an error if an offspring breaks a structural
    /// invariant of its genome type.
    ///
    /// [`evaluate_fitness`]: Population::evaluate_fitness
    /// [`evaluate_with`]: Population::evaluate_with
    pub fn advance(&mut self) -> Result<&GenerationRecord, EvolutionError> {
        self.phase = Phase::Speciating;
        self.speciate();

        let mass_extinction = self.update_stagnation();
        let record = self.summarize(mass_extinction);
        info!("{}", record);

        if mass_extinction {
            self.phase = Phase::MassExtinction;
            self.mass_extinction()?;
        } else {
            self.phase = Phase::Culling;
            let allotted_offspring = self.cull();
            self.phase = Phase::Reproducing;
            self.reproduce(&allotted_offspring)?;
        }
        self.check_partition()?;

        self.history.clear();
        self.generation += 1;
        self.phase = Phase::Idle;
        Ok(self.log.push(record))
    }

    /// Evaluates the population through `scheduler` and
    /// advances it by one generation.
    pub fn next_generation<S, F, E>(
        &mut self,
        scheduler: &S,
        fitness: &F,
    ) -> Result<&GenerationRecord, EvolutionError>
    where
        S: ProcessingScheduler,
        G: Send,
        F: Fn(&mut G) -> Result<f32, E> + Sync,
        E: Send + Display,
    {
        self.evaluate_with(scheduler, fitness)?;
        self.advance()
    }

    /// Evolves the population for `generations` generations,
    /// scoring genomes on the calling thread.
    ///
    /// # Examples
    /// ```
    /// use nevo::{Population, PopulationConfig};
    /// use nevo_nn::genomics::{GeneticConfig, NNGenome};
    /// use std::num::NonZeroUsize;
    ///
    /// let mut population = Population::<_, _, NNGenome>::new(
    ///     PopulationConfig {
    ///         size: NonZeroUsize::new(30).unwrap(),
    ///         rng_seed: Some(5),
    ///         ..PopulationConfig::default()
    ///     },
    ///     GeneticConfig::default(),
    /// )
    /// .unwrap();
    ///
    /// // Networks with outputs closer to 0 are given higher scores.
    /// let log = population
    ///     .evolve(5, |g| {
    ///         let output = g.process(&[1.0]).map_or(1.0, |o| o[0]);
    ///         1.0 - output.abs().min(1.0)
    ///     })
    ///     .unwrap();
    /// assert_eq!(log.len(), 5);
    /// assert_eq!(population.generation(), 5);
    /// ```
    pub fn evolve<E>(&mut self, generations: usize, mut fitness: E) -> Result<&EvolutionLog, EvolutionError>
    where
        E: FnMut(&mut G) -> f32,
    {
        for _ in 0..generations {
            self.evaluate_fitness(&mut fitness)?;
            self.advance()?;
        }
        Ok(&self.log)
    }

    /// Evolves the population for at most `generations`
    /// generations, scoring genomes through `scheduler`.
    /// Stops early once `stop` returns `true` for a
    /// generation's record.
    pub fn evolve_with<S, F, E, P>(
        &mut self,
        generations: usize,
        scheduler: &S,
        fitness: &F,
        mut stop: P,
    ) -> Result<&EvolutionLog, EvolutionError>
    where
        S: ProcessingScheduler,
        G: Send,
        F: Fn(&mut G) -> Result<f32, E> + Sync,
        E: Send + Display,
        P: FnMut(&GenerationRecord) -> bool,
    {
        for _ in 0..generations {
            let record = self.next_generation(scheduler, fitness)?;
            if stop(record) {
                info!("stop condition met after generation {}", record.generation);
                break;
            }
        }
        Ok(&self.log)
    }

    /// Re-assigns every genome to the first species whose
    /// representative lies within the distance threshold,
    /// founding new species as needed.
    fn speciate(&mut self) {
        let mut genomes = Vec::with_capacity(self.population_config.size.get());
        for species in &mut self.species {
            genomes.append(&mut species.genomes);
        }

        let threshold = self.population_config.species_distance_threshold;
        let mut next_index = self
            .species
            .iter()
            .filter(|s| s.id().0 == self.generation)
            .count();
        for genome in genomes {
            match self
                .species
                .iter_mut()
                .find(|s| s.distance_to(&genome, &self.genetic_config) <= threshold)
            {
                Some(species) => species.add_genome(genome),
                None => {
                    let id = SpeciesID(self.generation, next_index);
                    debug!("species {:?} founded", id);
                    self.species.push(Species::new(id, genome));
                    next_index += 1;
                }
            }
        }

        self.remove_empty_species();
        for species in &mut self.species {
            species.refresh_representative(&mut self.rng);
            species.update_fitness();
        }
    }

    /// Updates population-wide stagnation, returning
    /// whether a mass extinction is due.
    fn update_stagnation(&mut self) -> bool {
        let best = self.champion().map_or(0.0, |g| g.fitness());
        let improved = match self.stagnation.reference_fitness {
            None => true,
            Some(reference) => {
                best > reference
                    + reference.abs() * self.population_config.maex_improvement_threshold_pc
            }
        };
        if improved {
            self.stagnation.reference_fitness = Some(best);
            self.stagnation.generations = 0;
        } else {
            self.stagnation.generations += 1;
        }
        self.stagnation.generations >= self.population_config.mass_extinction_threshold.get()
    }

    /// Population stagnation as a fraction of the mass
    /// extinction threshold.
    fn progress(&self) -> f32 {
        self.stagnation.generations as f32
            / self.population_config.mass_extinction_threshold.get() as f32
    }

    fn summarize(&self, mass_extinction: bool) -> GenerationRecord {
        let fitness = Stats::from(self.genomes().map(|g| g.fitness()));
        GenerationRecord {
            generation: self.generation,
            best_ever: fitness.maximum.max(self.log.best_ever()),
            fitness,
            species_count: self.species.len(),
            mass_extinction,
            max_innovation: self.history.innovation_count(),
        }
    }

    /// Shares fitness within species, removes each species'
    /// weakest members, and returns the offspring allotted
    /// to every species.
    fn cull(&mut self) -> Vec<usize> {
        let config = &self.population_config;
        for species in &mut self.species {
            species.sort_by_fitness();
            species.share_fitness();
        }

        let penalized: Vec<f32> = self
            .species
            .iter()
            .map(|s| s.penalized_fitness(config))
            .collect();
        let adjusted: Vec<f32> = self.species.iter().map(|s| s.adjusted_fitness()).collect();
        let mut shares = offspring_shares(&penalized, &adjusted).unwrap_or_else(|| {
            warn!(
                "generation {} has no adjusted fitness; allotting offspring uniformly",
                self.generation
            );
            vec![1.0 / adjusted.len() as f32; adjusted.len()]
        });

        if shares
            .iter()
            .any(|&share| share >= config.species_elimination_share)
        {
            for (species, share) in self.species.iter().zip(shares.iter_mut()) {
                if *share < config.species_elimination_share {
                    debug!("species {:?} eliminated with share {}", species.id(), share);
                    *share = 0.0;
                }
            }
            let kept: f32 = shares.iter().sum();
            for share in &mut shares {
                *share /= kept;
            }
        }

        for species in &mut self.species {
            species.cull(config);
        }

        let size = config.size.get();
        let allotted = round_retain_sum(
            &shares.iter().map(|s| s * size as f32).collect::<Vec<_>>(),
            size,
        );
        debug!("offspring allotment: {:?}", allotted);
        allotted
    }

    fn reproduce(&mut self, allotted_offspring: &[usize]) -> Result<(), EvolutionError> {
        let progress = self.progress();
        let mut offspring = OffspringFactory::new(
            &self.species,
            &mut self.history,
            &self.genetic_config,
            &self.population_config,
            progress,
        )
        .generate_offspring(allotted_offspring, &mut self.rng);

        for species in &mut self.species {
            species.genomes = offspring.remove(&species.id()).unwrap_or_default();
        }
        self.remove_empty_species();
        self.verify_offspring()
    }

    /// Keeps only the best genomes of the population and
    /// refills it with mutated copies of them.
    fn mass_extinction(&mut self) -> Result<(), EvolutionError> {
        let mut ranked = Vec::with_capacity(self.population_config.size.get());
        for species in &mut self.species {
            let id = species.id();
            ranked.extend(species.genomes.drain(..).map(|g| (id, g)));
        }
        ranked.sort_by(|a, b| b.1.fitness().total_cmp(&a.1.fitness()));
        ranked.truncate(self.population_config.maex_survivors.get());

        let survivors = ranked.len();
        let refill = self.population_config.size.get().saturating_sub(survivors);
        info!(
            "mass extinction in generation {}: keeping {} genomes",
            self.generation, survivors
        );

        let mut offspring = Vec::with_capacity(refill);
        for (id, parent) in ranked.iter().cycle().take(refill) {
            let mut child = parent.clone();
            child.set_fitness(0.0);
            child.set_adjusted_fitness(0.0);
            child.reset_activations();
            child.mutate(1.0, &mut self.history, &self.genetic_config, &mut self.rng);
            offspring.push((*id, child));
        }

        for (id, genome) in ranked.into_iter().chain(offspring) {
            if let Some(species) = self.species.iter_mut().find(|s| s.id() == id) {
                species.add_genome(genome);
            }
        }
        self.remove_empty_species();

        self.stagnation.generations = 0;
        for species in &mut self.species {
            species.reset_stagnation();
        }
        self.verify_offspring()
    }

    fn remove_empty_species(&mut self) {
        self.species.retain(|s| {
            if s.is_empty() {
                debug!("species {:?} went extinct", s.id());
            }
            !s.is_empty()
        });
    }

    fn verify_offspring(&self) -> Result<(), EvolutionError> {
        for species in &self.species {
            for (index, genome) in species.genomes().enumerate() {
                genome
                    .check_integrity(&self.genetic_config)
                    .map_err(|e| EvolutionError::InvalidGenome {
                        generation: self.generation,
                        species: species.id(),
                        index,
                        source: Box::new(e),
                    })?;
            }
        }
        Ok(())
    }

    fn check_partition(&self) -> Result<(), EvolutionError> {
        let found: usize = self.species.iter().map(|s| s.len()).sum();
        let expected = self.population_config.size.get();
        if found == expected {
            Ok(())
        } else {
            Err(EvolutionError::BrokenPartition { found, expected })
        }
    }

    /// Returns the best performing genome from the population,
    /// or `None` if no genome has been evaluated yet.
    pub fn champion(&self) -> Option<&G> {
        self.genomes()
            .max_by(|g1, g2| g1.fitness().total_cmp(&g2.fitness()))
    }

    /// Returns an iterator over all genomes in the population.
    pub fn genomes(&self) -> impl Iterator<Item = &G> {
        self.species.iter().flat_map(|s| s.genomes())
    }

    /// Returns an iterator over the population's species.
    pub fn species(&self) -> impl Iterator<Item = &Species<G>> {
        self.species.iter()
    }

    /// Returns the number of generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the population's innovation history.
    pub fn history(&self) -> &H {
        &self.history
    }

    /// Returns the record of every completed generation.
    pub fn log(&self) -> &EvolutionLog {
        &self.log
    }

    /// Returns the step of the generation loop the population is in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn population_config(&self) -> &PopulationConfig {
        &self.population_config
    }

    pub fn genetic_config(&self) -> &C {
        &self.genetic_config
    }

    /// Re-seeds the population's RNG.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = PopulationRng::seed_from_u64(seed);
    }

    /// Resets the population to a freshly generated state,
    /// with the same configurations.
    pub fn reset(&mut self) -> Result<(), ConfigError>
    where
        C: Clone,
    {
        *self = Population::new(self.population_config.clone(), self.genetic_config.clone())?;
        Ok(())
    }

    /// Writes the whole population, RNG state included, to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError>
    where
        C: Serialize,
        H: Serialize,
        G: Serialize,
    {
        persistence::save(path.as_ref(), self)
    }

    /// Reads a population written by [`save`].
    ///
    /// [`save`]: Population::save
    pub fn load(path: impl AsRef<Path>) -> Result<Population<C, H, G>, PersistenceError>
    where
        C: DeserializeOwned,
        H: DeserializeOwned,
        G: DeserializeOwned,
    {
        let path = path.as_ref();
        let population: Population<C, H, G> = persistence::load(path)?;
        population
            .population_config
            .validate()
            .and_then(|_| G::validate_config(&population.genetic_config))
            .map_err(|e| PersistenceError::Corrupted {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(population)
    }
}

/// Each species' share of the offspring, proportional to its
/// penalized fitness. Falls back to the unpenalized fitness when
/// every species is fully penalized, and returns `None` when
/// there is no fitness to share at all.
fn offspring_shares(penalized: &[f32], adjusted: &[f32]) -> Option<Vec<f32>> {
    [penalized, adjusted].into_iter().find_map(|fitness| {
        let total: f32 = fitness.iter().sum();
        if total > 0.0 {
            Some(fitness.iter().map(|f| f / total).collect())
        } else {
            None
        }
    })
}

/// Rounds `values` to integers summing to exactly `total`,
/// handing leftover units to the largest fractional parts.
/// When no value is positive the units are spread evenly.
fn round_retain_sum(values: &[f32], total: usize) -> Vec<usize> {
    let mut rounded: Vec<usize> = values.iter().map(|v| v.max(0.0).floor() as usize).collect();
    let assigned: usize = rounded.iter().sum();

    if assigned < total {
        let mut order: Vec<usize> = (0..values.len()).filter(|&i| values[i] > 0.0).collect();
        if order.is_empty() {
            order = (0..values.len()).collect();
        }
        order.sort_by(|&a, &b| values[b].fract().total_cmp(&values[a].fract()));
        for &i in order.iter().cycle().take(total - assigned) {
            rounded[i] += 1;
        }
    } else {
        for _ in total..assigned {
            if let Some(largest) = rounded.iter_mut().max() {
                *largest -= 1;
            }
        }
    }
    rounded
}

#[cfg(test)]
mod tests {
    use super::scalar::{Counter, Scalar};
    use super::*;
    use crate::{ProcessingScheduler, SerialScheduler};

    use std::num::NonZeroUsize;

    type ScalarPopulation = Population<(), Counter, Scalar>;

    fn config(size: usize) -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::new(size).unwrap(),
            species_distance_threshold: 0.5,
            rng_seed: Some(11),
            ..PopulationConfig::default()
        }
    }

    #[test]
    fn round_retain_sum_hits_total() {
        let values = [0.5, 0.5, 0.5, 1.7, 2.3, 4.5];
        let rounded = round_retain_sum(&values, 10);
        assert_eq!(rounded.iter().sum::<usize>(), 10);
        assert_eq!(rounded[3], 2);
        assert_eq!(rounded[4], 2);

        let rounded = round_retain_sum(&[3.4, 0.0, 3.3, 3.3], 10);
        assert_eq!(rounded, vec![4, 0, 3, 3]);

        let rounded = round_retain_sum(&[6.0, 5.0], 10);
        assert_eq!(rounded.iter().sum::<usize>(), 10);
    }

    #[test]
    fn round_retain_sum_spreads_without_positive_values() {
        assert_eq!(round_retain_sum(&[0.0, 0.0, 0.0], 7), vec![3, 2, 2]);
        assert_eq!(round_retain_sum(&[-1.0, 0.0], 3), vec![2, 1]);
    }

    #[test]
    fn shares_fall_back_to_unpenalized_fitness() {
        assert_eq!(
            offspring_shares(&[2.0, 6.0], &[4.0, 6.0]),
            Some(vec![0.25, 0.75])
        );
        assert_eq!(
            offspring_shares(&[0.0, 0.0], &[3.0, 1.0]),
            Some(vec![0.75, 0.25])
        );
        assert_eq!(offspring_shares(&[0.0, 0.0], &[0.0, 0.0]), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = ScalarPopulation::new(PopulationConfig::zero(), ());
        assert!(matches!(
            result,
            Err(ConfigError::NonPositive {
                field: "species_distance_threshold",
                ..
            })
        ));
    }

    #[test]
    fn partition_is_exact_after_every_generation() {
        for size in [1, 7, 30, 64] {
            let mut population = ScalarPopulation::new(config(size), ()).unwrap();
            for _ in 0..8 {
                population.evaluate_fitness(|g| g.value.abs()).unwrap();
                population.advance().unwrap();
                assert_eq!(population.genomes().count(), size);
                assert!(population.species().all(|s| !s.is_empty()));
                assert_eq!(population.phase(), Phase::Idle);
            }
            assert_eq!(population.generation(), 8);
        }
    }

    #[test]
    fn mass_extinction_fires_after_threshold() {
        let mut population = ScalarPopulation::new(
            PopulationConfig {
                mass_extinction_threshold: NonZeroUsize::new(3).unwrap(),
                maex_survivors: NonZeroUsize::new(2).unwrap(),
                ..config(20)
            },
            (),
        )
        .unwrap();
        let log = population.evolve(7, |_| 1.0).unwrap();
        let fired: Vec<bool> = log.iter().map(|r| r.mass_extinction).collect();
        assert_eq!(fired, vec![false, false, false, true, false, false, true]);
        assert_eq!(population.genomes().count(), 20);
    }

    #[test]
    fn marginal_improvement_still_goes_extinct() {
        let size = 20;
        let mut population = ScalarPopulation::new(
            PopulationConfig {
                mass_extinction_threshold: NonZeroUsize::new(3).unwrap(),
                maex_survivors: NonZeroUsize::new(2).unwrap(),
                maex_improvement_threshold_pc: 0.05,
                ..config(size)
            },
            (),
        )
        .unwrap();
        let mut calls = 0;
        let log = population
            .evolve(7, |_| {
                let generation = calls / size;
                calls += 1;
                10.0 + 0.01 * generation as f32
            })
            .unwrap();
        let best: Vec<f32> = log.iter().map(|r| r.fitness.maximum).collect();
        assert!(best.windows(2).all(|w| w[0] < w[1]));
        let fired: Vec<bool> = log.iter().map(|r| r.mass_extinction).collect();
        assert_eq!(fired, vec![false, false, false, true, false, false, true]);
    }

    #[test]
    fn improving_population_never_goes_extinct() {
        let mut population = ScalarPopulation::new(
            PopulationConfig {
                mass_extinction_threshold: NonZeroUsize::new(2).unwrap(),
                ..config(30)
            },
            (),
        )
        .unwrap();
        let mut calls = 0;
        let log = population
            .evolve(10, |_| {
                calls += 1;
                calls as f32
            })
            .unwrap();
        assert!(log.iter().all(|r| !r.mass_extinction));
    }

    #[test]
    fn best_ever_is_non_decreasing() {
        let mut population = ScalarPopulation::new(config(40), ()).unwrap();
        let log = population.evolve(15, |g| 2.0 - (g.value - 0.7).abs()).unwrap();
        let best: Vec<f32> = log.iter().map(|r| r.best_ever).collect();
        assert!(best.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn failed_fitness_propagates_by_default() {
        let mut population = ScalarPopulation::new(config(10), ()).unwrap();
        let result = population.next_generation(&SerialScheduler, &|g: &mut Scalar| {
            if g.value > 0.0 {
                Ok(-1.0)
            } else {
                Err("no score".to_string())
            }
        });
        assert!(matches!(
            result,
            Err(EvolutionError::Fitness {
                generation: 0,
                index: 0,
                ..
            })
        ));
        assert_eq!(population.phase(), Phase::Evaluating);
        assert_eq!(population.generation(), 0);
    }

    /// Loses the last score of every batch.
    struct LossyScheduler;

    impl ProcessingScheduler for LossyScheduler {
        fn evaluate<G, F, E>(&self, genomes: &mut [&mut G], fitness: &F) -> Vec<Result<f32, E>>
        where
            G: Send,
            F: Fn(&mut G) -> Result<f32, E> + Sync,
            E: Send,
        {
            let mut scores = SerialScheduler.evaluate(genomes, fitness);
            scores.pop();
            scores
        }
    }

    #[test]
    fn missing_scores_abort_the_generation() {
        let mut population = ScalarPopulation::new(config(10), ()).unwrap();
        let result = population.next_generation(&LossyScheduler, &|g: &mut Scalar| {
            Ok::<f32, String>(g.value.abs())
        });
        assert!(matches!(
            result,
            Err(EvolutionError::ScoreCount {
                generation: 0,
                expected: 10,
                found: 9,
            })
        ));
        assert_eq!(population.phase(), Phase::Evaluating);
        assert_eq!(population.generation(), 0);
    }

    #[test]
    fn failed_fitness_can_be_zeroed() {
        let mut population = ScalarPopulation::new(
            PopulationConfig {
                fitness_failure_policy: FitnessFailurePolicy::AssignMinimal,
                ..config(10)
            },
            (),
        )
        .unwrap();
        population
            .evaluate_with(&SerialScheduler, &|_: &mut Scalar| Ok::<f32, String>(f32::NAN))
            .unwrap();
        assert!(population.genomes().all(|g| g.fitness() == 0.0));
        population.advance().unwrap();
        assert_eq!(population.genomes().count(), 10);
    }

    #[test]
    fn history_is_cleared_once_per_generation() {
        let mut population = ScalarPopulation::new(config(12), ()).unwrap();
        population.evolve(4, |g| g.value.abs()).unwrap();
        assert_eq!(population.history().cleared, 4);
        assert_eq!(population.history().minted, 12);
    }

    #[test]
    fn seeded_populations_are_deterministic() {
        let run = || {
            let mut population = ScalarPopulation::new(config(25), ()).unwrap();
            population.evolve(6, |g| g.value.abs()).unwrap();
            population.genomes().map(|g| g.value).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn elite_survives_unchanged() {
        let mut population = ScalarPopulation::new(
            PopulationConfig {
                elitism: 1,
                ..config(20)
            },
            (),
        )
        .unwrap();
        population.evaluate_fitness(|g| g.value + 1.0).unwrap();
        let champion = population.champion().map(|g| g.value).unwrap();
        population.advance().unwrap();
        assert!(population.genomes().any(|g| g.value == champion));
    }

    #[test]
    fn seeded_construction() {
        let seed = |v| Scalar::with_fitness(v, 0.0);
        let population = ScalarPopulation::new_seeded(
            vec![vec![seed(0.1), seed(0.2)], vec![], vec![seed(0.9)]],
            config(10),
            (),
        )
        .unwrap();
        let sizes: Vec<usize> = population.species().map(|s| s.len()).collect();
        assert_eq!(sizes, vec![7, 2, 1]);
        let ids: Vec<SpeciesID> = population.species().map(|s| s.id()).collect();
        assert_eq!(ids, vec![SpeciesID(0, 0), SpeciesID(0, 1), SpeciesID(0, 2)]);

        let full = ScalarPopulation::new_seeded(vec![vec![seed(0.1), seed(0.2)]], config(2), ())
            .unwrap();
        assert_eq!(full.species().count(), 1);

        let overfull = ScalarPopulation::new_seeded(vec![vec![seed(0.1); 3]], config(2), ());
        assert!(matches!(overfull, Err(ConfigError::InvalidSeed(_))));

        let malformed = ScalarPopulation::new_seeded(vec![vec![seed(f32::NAN)]], config(2), ());
        assert!(matches!(malformed, Err(ConfigError::InvalidSeed(_))));
    }

    #[test]
    fn new_species_get_generation_ids() {
        let mut population = ScalarPopulation::new(
            PopulationConfig {
                species_distance_threshold: 0.05,
                ..config(30)
            },
            (),
        )
        .unwrap();
        population.evolve(2, |g| g.value.abs()).unwrap();
        let mut ids: Vec<SpeciesID> = population.species().map(|s| s.id()).collect();
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert!(ids.iter().all(|id| id.0 <= 1));
    }
}
