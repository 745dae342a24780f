use super::{PopulationConfig, Species, SpeciesID};
use crate::rng::{chance, pick_ranked, rank_prob_dist};
use crate::Genome;

use ahash::RandomState;
use rand::{seq::IteratorRandom, Rng};

use std::collections::HashMap;

pub(super) type Offspring<G> = HashMap<SpeciesID, Vec<G>, RandomState>;

/// Auxiliary type for offspring generation.
/// Handles all the tasks of generating a population's
/// offspring according to the specified configs
/// and allotted offspring.
pub(super) struct OffspringFactory<'a, G: Genome> {
    species: &'a [Species<G>],
    history: &'a mut G::InnovationHistory,
    genetic_config: &'a G::Config,
    population_config: &'a PopulationConfig,
    progress: f32,
}

impl<'a, G: Genome + Clone> OffspringFactory<'a, G> {
    pub(super) fn new(
        species: &'a [Species<G>],
        history: &'a mut G::InnovationHistory,
        genetic_config: &'a G::Config,
        population_config: &'a PopulationConfig,
        progress: f32,
    ) -> OffspringFactory<'a, G> {
        OffspringFactory {
            species,
            history,
            genetic_config,
            population_config,
            progress,
        }
    }

    /// Generate the alloted offspring. Expects species
    /// members sorted by decreasing fitness.
    pub(super) fn generate_offspring<R: Rng + ?Sized>(
        &mut self,
        allotted_offspring: &[usize],
        rng: &mut R,
    ) -> Offspring<G> {
        let mut offspring_of_species: Offspring<G> = self
            .species
            .iter()
            .zip(allotted_offspring)
            .map(|(s, &allotted)| (s.id(), Vec::with_capacity(allotted)))
            .collect();

        let all_species = self.species;
        for (species, &allotted) in all_species.iter().zip(allotted_offspring) {
            let elite = species.count_elite(self.population_config).min(allotted);
            offspring_of_species
                .entry(species.id())
                .or_default()
                .extend(species.genomes[..elite].iter().map(|g| {
                    let mut g = g.clone();
                    g.reset_activations();
                    g
                }));

            let weights = rank_prob_dist(
                species.genomes.len(),
                self.population_config.rank_prob_dist_coefficient,
            );
            for _ in elite..allotted {
                let (child_species, child) =
                    self.breed(species, &weights, allotted_offspring, rng);
                offspring_of_species
                    .entry(child_species)
                    .or_default()
                    .push(child);
            }
        }

        offspring_of_species
    }

    /// Produces one mutated child of a rank-selected member
    /// of `species`, either by crossover or by cloning. The
    /// child is assigned to the species of either parent.
    fn breed<R: Rng + ?Sized>(
        &mut self,
        species: &'a Species<G>,
        weights: &[f32],
        allotted_offspring: &[usize],
        rng: &mut R,
    ) -> (SpeciesID, G) {
        let parent1 = &species.genomes[pick_ranked(rng, weights)];
        let mut child_species = species.id();
        let mut child = if chance(rng, self.population_config.mating_chance) {
            let (parent2_species, parent2) = self.choose_second_parent(species, allotted_offspring, rng);
            if rng.gen::<bool>() {
                child_species = parent2_species;
            }
            parent1.crossover_with(parent2, self.genetic_config, rng)
        } else {
            let mut clone = parent1.clone();
            clone.set_fitness(0.0);
            clone.set_adjusted_fitness(0.0);
            clone.reset_activations();
            clone
        };
        child.mutate(self.progress, &mut *self.history, self.genetic_config, rng);
        (child_species, child)
    }

    /// Choose a parent from the current species, or from
    /// another randomly selected one that still has offspring
    /// allotted.
    fn choose_second_parent<R: Rng + ?Sized>(
        &self,
        current_species: &'a Species<G>,
        allotted_offspring: &[usize],
        rng: &mut R,
    ) -> (SpeciesID, &'a G) {
        let all_species = self.species;
        let donor = if all_species.len() > 1
            && chance(rng, self.population_config.interspecies_mating_chance)
        {
            all_species
                .iter()
                .zip(allotted_offspring)
                .filter(|&(s, &allotted)| allotted > 0 && s.id() != current_species.id())
                .map(|(s, _)| s)
                .choose(rng)
                .unwrap_or(current_species)
        } else {
            current_species
        };
        let weights = rank_prob_dist(
            donor.genomes.len(),
            self.population_config.rank_prob_dist_coefficient,
        );
        (donor.id(), &donor.genomes[pick_ranked(rng, &weights)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::populations::scalar::{Counter, Scalar};

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn eliminated_species_do_not_mate() {
        let species: Vec<Species<Scalar>> = [0.0, 10.0, 20.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| Species::new(SpeciesID(0, i), Scalar::with_fitness(v, 1.0)))
            .collect();
        let config = PopulationConfig {
            elitism: 0,
            mating_chance: 1.0,
            interspecies_mating_chance: 1.0,
            ..PopulationConfig::default()
        };
        let mut history = Counter::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let offspring = OffspringFactory::new(&species, &mut history, &(), &config, 0.0)
            .generate_offspring(&[10, 0, 10], &mut rng);

        assert!(offspring
            .get(&SpeciesID(0, 1))
            .map_or(true, |children| children.is_empty()));
        let children: Vec<&Scalar> = offspring.values().flatten().collect();
        assert_eq!(children.len(), 20);
        // Every child is a cross of the two surviving species.
        assert!(children.iter().all(|c| (c.value - 10.0).abs() < 0.2));
    }
}
