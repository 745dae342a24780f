use crate::populations::PopulationConfig;
use crate::Genome;

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

/// Species identifier. Specifies
/// the generation in which the species
/// was born, and the count of other species
/// generated in the _same generation_ before
/// the one identified (i.e, if it was the
/// third species born in generation 5, it
/// will be species [5, 2]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeciesID(pub usize, pub usize);

/// Species are collections of reproductively
/// compatible (within a certain [genetic distance])
/// genomes. Membership is determined by calculating
/// the genetic distance to a _representative_, a
/// clone of a randomly chosen member that is refreshed
/// every generation.
///
/// Species will stagnate after [`stagnation_threshold`]
/// generations without improving the species' fitness,
/// and will thereafter be penalized during reproduction.
///
/// [genetic distance]: PopulationConfig::species_distance_threshold
/// [`stagnation_threshold`]: PopulationConfig::stagnation_threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species<G> {
    id: SpeciesID,
    pub(super) genomes: Vec<G>,
    representative: G,
    stagnation: usize,
    best_fitness: f32,
}

impl<G: Genome + Clone> Species<G> {
    /// Creates a new species with the specified ID, founded
    /// by `founder`. The founder becomes both the first member
    /// and the representative.
    pub fn new(id: SpeciesID, founder: G) -> Species<G> {
        Species {
            id,
            representative: founder.clone(),
            genomes: vec![founder],
            stagnation: 0,
            best_fitness: f32::MIN,
        }
    }

    /// Returns the species' ID.
    pub fn id(&self) -> SpeciesID {
        self.id
    }

    /// Returns the species' representative.
    pub fn representative(&self) -> &G {
        &self.representative
    }

    /// Returns the genetic distance between the species'
    /// representative and `other`.
    pub fn distance_to(&self, other: &G, config: &G::Config) -> f32 {
        self.representative.distance_to(other, config)
    }

    /// Adds a genome to the species.
    pub fn add_genome(&mut self, genome: G) {
        self.genomes.push(genome);
    }

    /// Replaces the representative with a clone of a random member.
    pub(super) fn refresh_representative<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if let Some(genome) = self.genomes.choose(rng) {
            self.representative = genome.clone();
        }
    }

    /// Updates the species' record of maximum
    /// fitness, to keep track of stagnation.
    pub(super) fn update_fitness(&mut self) {
        let best = self
            .genomes
            .iter()
            .map(|g| g.fitness())
            .fold(f32::MIN, f32::max);
        if best > self.best_fitness {
            self.best_fitness = best;
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
        }
    }

    /// Caches every member's fitness divided by the species size.
    pub(super) fn share_fitness(&mut self) {
        let size = self.genomes.len() as f32;
        for genome in &mut self.genomes {
            genome.set_adjusted_fitness(genome.fitness() / size);
        }
    }

    /// Returns the species' _member-count adjusted_
    /// fitness. I.e., the sum of its members' adjusted
    /// fitnesses, which equals their mean fitness.
    pub fn adjusted_fitness(&self) -> f32 {
        self.genomes.iter().map(|g| g.adjusted_fitness()).sum()
    }

    /// Returns the adjusted fitness with the stagnation
    /// penalty applied, if the species is stagnated.
    pub(super) fn penalized_fitness(&self, config: &PopulationConfig) -> f32 {
        if self.stagnation >= config.stagnation_threshold.get() {
            self.adjusted_fitness() * (1.0 - config.stagnation_penalty)
        } else {
            self.adjusted_fitness()
        }
    }

    /// Returns the number of generations the species
    /// has been stagnated.
    pub fn time_stagnated(&self) -> usize {
        self.stagnation
    }

    pub(super) fn reset_stagnation(&mut self) {
        self.stagnation = 0;
    }

    /// Returns the best fitness any member has ever reached.
    pub fn best_fitness(&self) -> f32 {
        self.best_fitness.max(0.0)
    }

    /// Returns an iterator over the species' members.
    pub fn genomes(&self) -> impl Iterator<Item = &G> {
        self.genomes.iter()
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    /// Returns `true` if the species has no members.
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Returns the currently best-performing genome.
    pub fn champion(&self) -> Option<&G> {
        self.genomes
            .iter()
            .max_by(|g1, g2| g1.fitness().total_cmp(&g2.fitness()))
    }

    /// Orders members by decreasing fitness.
    pub(super) fn sort_by_fitness(&mut self) {
        self.genomes
            .sort_by(|g1, g2| g2.fitness().total_cmp(&g1.fitness()));
    }

    pub(super) fn count_elite(&self, config: &PopulationConfig) -> usize {
        self.genomes.len().min(config.elitism)
    }

    pub(super) fn count_survivors(&self, config: &PopulationConfig) -> usize {
        let removed = (self.genomes.len() as f32 * config.weak_genomes_removal_pc).floor() as usize;
        self.genomes.len().saturating_sub(removed).max(1)
    }

    /// Drops the weakest members. Expects members
    /// sorted by decreasing fitness.
    pub(super) fn cull(&mut self, config: &PopulationConfig) {
        let survivors = self.count_survivors(config);
        self.genomes.truncate(survivors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::populations::scalar::Scalar;

    fn species_of(fitnesses: &[f32]) -> Species<Scalar> {
        let mut members = fitnesses.iter().map(|&f| Scalar::with_fitness(f, f));
        let mut species = Species::new(SpeciesID(0, 0), members.next().unwrap());
        for g in members {
            species.add_genome(g);
        }
        species
    }

    #[test]
    fn founder_is_representative_and_member() {
        let species = species_of(&[3.0]);
        assert_eq!(species.representative(), &Scalar::with_fitness(3.0, 3.0));
        assert_eq!(species.len(), 1);
        assert_eq!(species.distance_to(&Scalar::with_fitness(3.0, 0.0), &()), 0.0);
    }

    #[test]
    fn stagnation_resets_on_improvement() {
        let mut species = species_of(&[1.0, 2.0]);
        species.update_fitness();
        assert_eq!(species.time_stagnated(), 0);
        species.update_fitness();
        species.update_fitness();
        assert_eq!(species.time_stagnated(), 2);
        species.add_genome(Scalar::with_fitness(0.0, 5.0));
        species.update_fitness();
        assert_eq!(species.time_stagnated(), 0);
        assert_eq!(species.best_fitness(), 5.0);
    }

    #[test]
    fn shared_fitness_is_mean() {
        let mut species = species_of(&[10.0, 20.0, 30.0]);
        species.share_fitness();
        assert!((species.adjusted_fitness() - 20.0).abs() < 1e-5);
    }

    #[test]
    fn culling_keeps_best_and_at_least_one() {
        let config = PopulationConfig {
            weak_genomes_removal_pc: 0.65,
            ..PopulationConfig::default()
        };
        let mut species = species_of(&[1.0, 9.0, 4.0, 7.0, 3.0, 2.0, 8.0, 5.0, 6.0, 0.5]);
        species.sort_by_fitness();
        species.cull(&config);
        let kept: Vec<f32> = species.genomes().map(|g| g.fitness()).collect();
        assert_eq!(kept, vec![9.0, 8.0, 7.0, 6.0]);

        let config = PopulationConfig {
            weak_genomes_removal_pc: 1.0,
            ..config
        };
        species.cull(&config);
        assert_eq!(species.len(), 1);
        assert_eq!(species.champion().map(|g| g.fitness()), Some(9.0));
    }

    #[test]
    fn stagnated_species_are_penalized() {
        let config = PopulationConfig {
            stagnation_threshold: std::num::NonZeroUsize::new(2).unwrap(),
            stagnation_penalty: 0.5,
            ..PopulationConfig::default()
        };
        let mut species = species_of(&[4.0]);
        species.update_fitness();
        species.share_fitness();
        assert_eq!(species.penalized_fitness(&config), 4.0);
        species.update_fitness();
        species.update_fitness();
        assert_eq!(species.penalized_fitness(&config), 2.0);
    }
}
