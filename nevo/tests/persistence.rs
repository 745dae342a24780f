use nevo::{PersistenceError, Population, PopulationConfig, SerialScheduler, FORMAT_VERSION};
use nevo_nn::genomics::{GeneticConfig, GenomeError, NNGenome};
use nevo_nn::NNPopulation;

use std::fs;
use std::num::NonZeroUsize;

fn fitness(genome: &mut NNGenome) -> Result<f32, GenomeError> {
    let output = genome.process(&[0.5, -0.5, 1.0])?;
    Ok(output.iter().map(|o| 1.0 - (o - 0.5).abs()).sum())
}

fn population() -> NNPopulation {
    Population::new(
        PopulationConfig {
            size: NonZeroUsize::new(40).unwrap(),
            rng_seed: Some(99),
            ..PopulationConfig::default()
        },
        GeneticConfig {
            input_count: NonZeroUsize::new(3).unwrap(),
            output_count: NonZeroUsize::new(2).unwrap(),
            ..GeneticConfig::default()
        },
    )
    .unwrap()
}

#[test]
fn reloaded_population_resumes_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("population.nevo");

    let mut original = population();
    for _ in 0..5 {
        original.next_generation(&SerialScheduler, &fitness).unwrap();
    }
    original.save(&path).unwrap();

    let mut restored = NNPopulation::load(&path).unwrap();
    assert_eq!(restored.generation(), original.generation());
    assert_eq!(restored.log(), original.log());
    assert_eq!(restored.history(), original.history());
    assert!(restored.genomes().eq(original.genomes()));

    for _ in 0..5 {
        let expected = original
            .next_generation(&SerialScheduler, &fitness)
            .unwrap()
            .clone();
        let found = restored
            .next_generation(&SerialScheduler, &fitness)
            .unwrap()
            .clone();
        assert_eq!(found, expected);
    }
    assert!(restored.genomes().eq(original.genomes()));
    assert_eq!(restored.history(), original.history());
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.nevo");
    assert!(matches!(
        NNPopulation::load(&path),
        Err(PersistenceError::NotFound(p)) if p == path
    ));
}

#[test]
fn corrupted_payload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("population.nevo");
    population().save(&path).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(bytes.len() / 2);
    fs::write(&path, &bytes).unwrap();
    assert!(matches!(
        NNPopulation::load(&path),
        Err(PersistenceError::Corrupted { .. })
    ));

    fs::write(&path, b"not a population").unwrap();
    assert!(matches!(
        NNPopulation::load(&path),
        Err(PersistenceError::Corrupted { .. })
    ));
}

#[test]
fn version_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("population.nevo");
    population().save(&path).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes[4..8].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());
    fs::write(&path, &bytes).unwrap();
    assert!(matches!(
        NNPopulation::load(&path),
        Err(PersistenceError::VersionMismatch { found, expected, .. })
            if found == FORMAT_VERSION + 1 && expected == FORMAT_VERSION
    ));
}
