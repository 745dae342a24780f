//! Per-generation summaries of an evolving population.
use serde::{Deserialize, Serialize};

use std::fmt;

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// An empty sequence yields all zeros.
    ///
    /// # Examples
    /// ```
    /// use nevo::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f32>) -> Stats {
        let mut data: Vec<f32> = data.collect();
        if data.is_empty() {
            return Stats {
                maximum: 0.0,
                minimum: 0.0,
                mean: 0.0,
                median: 0.0,
            };
        }
        data.sort_by(f32::total_cmp);
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f32>() / data.len() as f32,
            median,
        }
    }
}

/// A snapshot of one generation, taken after
/// evaluation and speciation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub fitness: Stats,
    /// Best fitness seen in this or any earlier generation.
    pub best_ever: f32,
    pub species_count: usize,
    /// Whether this generation ended in a mass extinction.
    pub mass_extinction: bool,
    /// Innovation identifiers handed out so far.
    pub max_innovation: usize,
}

impl fmt::Display for GenerationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: best {:.4} (ever {:.4}), mean {:.4}, median {:.4}, {} species, {} innovations{}",
            self.generation,
            self.fitness.maximum,
            self.best_ever,
            self.fitness.mean,
            self.fitness.median,
            self.species_count,
            self.max_innovation,
            if self.mass_extinction {
                ", mass extinction"
            } else {
                ""
            }
        )
    }
}

/// A log of the evolution of a population over time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionLog {
    records: Vec<GenerationRecord>,
}

impl EvolutionLog {
    pub fn new() -> EvolutionLog {
        EvolutionLog::default()
    }

    pub(crate) fn push(&mut self, record: GenerationRecord) -> &GenerationRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Iterate over all logged generations.
    pub fn iter(&self) -> impl Iterator<Item = &GenerationRecord> {
        self.records.iter()
    }

    /// Returns the most recent record.
    pub fn latest(&self) -> Option<&GenerationRecord> {
        self.records.last()
    }

    /// Returns the best fitness logged so far, or 0.
    pub fn best_ever(&self) -> f32 {
        self.latest().map_or(0.0, |r| r.best_ever)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_median_averages_middle_pair() {
        let stats = Stats::from([4.0, 1.0, 3.0, 2.0].iter().copied());
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.mean, 2.5);
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = Stats::from(std::iter::empty());
        assert_eq!(stats.maximum, 0.0);
        assert_eq!(stats.median, 0.0);
    }

    #[test]
    fn log_tracks_latest() {
        let mut log = EvolutionLog::new();
        assert_eq!(log.best_ever(), 0.0);
        for generation in 0..3 {
            log.push(GenerationRecord {
                generation,
                fitness: Stats::from([generation as f32].iter().copied()),
                best_ever: generation as f32,
                species_count: 1,
                mass_extinction: false,
                max_innovation: 0,
            });
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.latest().map(|r| r.generation), Some(2));
        assert_eq!(log.best_ever(), 2.0);
        assert!(log.iter().map(|r| r.to_string()).all(|s| s.starts_with("generation")));
    }
}
