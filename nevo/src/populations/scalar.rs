//! A one-gene genome used to exercise populations in isolation.
use crate::{ConfigError, Genome, InnovationHistory};

use rand::Rng;
use serde::{Deserialize, Serialize};

use std::convert::Infallible;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Scalar {
    pub(crate) value: f32,
    fitness: f32,
    adjusted_fitness: f32,
}

impl Scalar {
    pub(crate) fn with_fitness(value: f32, fitness: f32) -> Scalar {
        Scalar {
            value,
            fitness,
            adjusted_fitness: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Counter {
    pub(crate) minted: usize,
    pub(crate) cleared: usize,
}

impl InnovationHistory for Counter {
    type Config = ();

    fn new(_: &()) -> Counter {
        Counter::default()
    }

    fn clear(&mut self) {
        self.cleared += 1;
    }

    fn innovation_count(&self) -> usize {
        self.minted
    }
}

impl Genome for Scalar {
    type Config = ();
    type InnovationHistory = Counter;
    type Error = Infallible;

    fn new<R: Rng + ?Sized>(_: &(), history: &mut Counter, rng: &mut R) -> Scalar {
        history.minted += 1;
        Scalar::with_fitness(rng.gen_range(-1.0..1.0), 0.0)
    }

    fn validate_config(_: &()) -> Result<(), ConfigError> {
        Ok(())
    }

    fn conforms_to(&self, _: &()) -> bool {
        self.value.is_finite()
    }

    fn process(&mut self, inputs: &[f32]) -> Result<Vec<f32>, Infallible> {
        Ok(inputs.iter().map(|x| x * self.value).collect())
    }

    fn reset_activations(&mut self) {}

    fn distance_to(&self, other: &Scalar, _: &()) -> f32 {
        (self.value - other.value).abs()
    }

    fn mutate<R: Rng + ?Sized>(&mut self, progress: f32, _: &mut Counter, _: &(), rng: &mut R) {
        self.value += rng.gen_range(-0.1f32..0.1) * (1.0 + progress);
    }

    fn crossover_with<R: Rng + ?Sized>(&self, other: &Scalar, _: &(), _: &mut R) -> Scalar {
        Scalar::with_fitness((self.value + other.value) / 2.0, 0.0)
    }

    fn check_integrity(&self, _: &()) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    fn fitness(&self) -> f32 {
        self.fitness
    }

    fn set_adjusted_fitness(&mut self, adjusted_fitness: f32) {
        self.adjusted_fitness = adjusted_fitness;
    }

    fn adjusted_fitness(&self) -> f32 {
        self.adjusted_fitness
    }
}
