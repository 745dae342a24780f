use super::SpeciesID;

use thiserror::Error;

/// Errors that abort a generation.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// A fitness evaluation failed, or returned a NaN,
    /// infinite or negative score.
    #[error("fitness evaluation of genome {index} failed in generation {generation}: {reason}")]
    Fitness {
        generation: usize,
        index: usize,
        reason: String,
    },
    /// A scheduler returned a different number of
    /// scores than there are genomes.
    #[error("scheduler returned {found} scores for {expected} genomes in generation {generation}")]
    ScoreCount {
        generation: usize,
        expected: usize,
        found: usize,
    },
    /// A freshly produced genome broke a structural invariant.
    #[error("offspring {index} of species {species:?} is malformed in generation {generation}: {source}")]
    InvalidGenome {
        generation: usize,
        species: SpeciesID,
        index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Reproduction did not yield exactly one genome per slot.
    #[error("population holds {found} genomes after reproduction, expected {expected}")]
    BrokenPartition { found: usize, expected: usize },
}
