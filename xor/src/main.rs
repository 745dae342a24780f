use nevo::{logging::Stats, PopulationConfig, RayonScheduler, SerialScheduler};
use nevo_nn::genomics::{ActivationType, GeneticConfig, GenomeError, NNGenome};
use nevo_nn::NNPopulation;

use log::{error, info};
use rayon::prelude::*;

use std::env;
use std::num::NonZeroUsize;

const ERROR_MARGIN: f32 = 0.3;
const SOLVED: f32 = 16.0;
const MAX_GENERATIONS: usize = 100;

fn evaluate_xor(genome: &mut NNGenome) -> Result<f32, GenomeError> {
    let values = [
        ([0.0, 0.0], 0.0),
        ([0.0, 1.0], 1.0),
        ([1.0, 0.0], 1.0),
        ([1.0, 1.0], 0.0),
    ];

    let mut errors = [0.0; 4];
    for (i, (input, output)) in values.iter().enumerate() {
        errors[i] = (genome.process(input)?[0] - output).abs();
        if errors[i] < ERROR_MARGIN {
            errors[i] = 0.0;
        }
    }

    Ok((4.0 - errors.iter().sum::<f32>()).powi(2))
}

fn is_solved(fitness: f32) -> bool {
    (fitness - SOLVED).abs() < f32::EPSILON
}

fn main() {
    env_logger::init();

    let genetic_config = GeneticConfig {
        input_count: NonZeroUsize::new(2).unwrap(),
        output_count: NonZeroUsize::new(1).unwrap(),
        activation_types: vec![ActivationType::Sigmoid],
        output_activation_types: vec![ActivationType::Sigmoid],
        new_weight_interval: (-5.0, 5.0),
        common_weight_factor: 0.4,
        ..GeneticConfig::default()
    };
    let population_config = PopulationConfig {
        size: NonZeroUsize::new(150).unwrap(),
        species_distance_threshold: 3.0,
        weak_genomes_removal_pc: 0.8,
        mating_chance: 0.6,
        interspecies_mating_chance: 0.001,
        ..PopulationConfig::default()
    };

    match env::args().nth(1).as_deref() {
        Some("serde") => serde_test(&genetic_config, &population_config),
        _ => stress_test(&genetic_config, &population_config),
    }
}

/// Evolves many independently seeded populations in parallel
/// and reports how many generations solving XOR took.
fn stress_test(genetic_config: &GeneticConfig, population_config: &PopulationConfig) {
    const ITERATIONS: u64 = 200;

    let generations: Vec<Option<usize>> = (0..ITERATIONS)
        .into_par_iter()
        .map(|seed| {
            let mut population = match NNPopulation::new(
                PopulationConfig {
                    rng_seed: Some(seed),
                    ..population_config.clone()
                },
                genetic_config.clone(),
            ) {
                Ok(population) => population,
                Err(e) => {
                    error!("{}", e);
                    return None;
                }
            };
            let result = population.evolve_with(
                MAX_GENERATIONS,
                &SerialScheduler,
                &evaluate_xor,
                |record| is_solved(record.fitness.maximum),
            );
            match result {
                Ok(log) => log
                    .latest()
                    .filter(|record| is_solved(record.fitness.maximum))
                    .map(|record| record.generation),
                Err(e) => {
                    error!("seed {}: {}", seed, e);
                    None
                }
            }
        })
        .collect();

    println!(
        "Successful run generation count {:?}, {}% failure rate over {} iterations",
        Stats::from(generations.iter().filter_map(|g| g.map(|g| g as f32))),
        generations.iter().filter(|g| g.is_none()).count() as f32 * 100.0 / ITERATIONS as f32,
        ITERATIONS
    );
}

/// Evolves a population until XOR is solved, prints the champion
/// as RON, then saves, reloads and keeps evolving the population.
fn serde_test(genetic_config: &GeneticConfig, population_config: &PopulationConfig) {
    let mut population =
        match NNPopulation::new(population_config.clone(), genetic_config.clone()) {
            Ok(population) => population,
            Err(e) => {
                error!("{}", e);
                return;
            }
        };

    if let Err(e) = population.evolve_with(MAX_GENERATIONS, &RayonScheduler, &evaluate_xor, |record| {
        is_solved(record.fitness.maximum)
    }) {
        error!("{}", e);
        return;
    }
    if let Some(champion) = population.champion() {
        match ron::ser::to_string_pretty(champion, ron::ser::PrettyConfig::default()) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("{}", e),
        }
    }

    let path = env::temp_dir().join("xor.nevo");
    if let Err(e) = population.save(&path) {
        error!("{}", e);
        return;
    }
    let mut population = match NNPopulation::load(&path) {
        Ok(population) => population,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };
    info!("reloaded generation {} from {}", population.generation(), path.display());

    for _ in 0..10 {
        match population.next_generation(&RayonScheduler, &evaluate_xor) {
            Ok(record) => println!("{}", record),
            Err(e) => {
                error!("{}", e);
                return;
            }
        }
    }
    if let Some(champion) = population.champion() {
        println!("{}", champion);
    }
}
