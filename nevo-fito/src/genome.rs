use crate::{
    FixedLayer, FixedTopologyConfig, HybridConfig, HybridError, Kernel, MatingMode, Tensor,
};

use nevo::{chance, Annealed, ConfigError, Genome, InnovationHistory};
use nevo_nn::genomics::{perturb_or_reset, random_in, History, NNGenome};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Innovation history of hybrid genomes. Fixed layers
/// never innovate, so this only tracks the NEAT network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HybridHistory(History);

impl HybridHistory {
    pub fn neat(&self) -> &History {
        &self.0
    }
}

impl InnovationHistory for HybridHistory {
    type Config = HybridConfig;

    fn new(config: &HybridConfig) -> HybridHistory {
        HybridHistory(History::new(&config.neat))
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn innovation_count(&self) -> usize {
        self.0.innovation_count()
    }
}

/// A fixed sequence of numeric layers feeding an [`NNGenome`].
///
/// The kernel is not serialized; deserialized genomes
/// get `K::default()`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = "K: Default"))]
pub struct HybridGenome<K> {
    input_shape: Vec<usize>,
    layers: Vec<FixedLayer>,
    neat: NNGenome,
    fitness: f32,
    adjusted_fitness: f32,
    #[serde(skip)]
    kernel: K,
}

impl<K> PartialEq for HybridGenome<K> {
    fn eq(&self, other: &HybridGenome<K>) -> bool {
        self.input_shape == other.input_shape
            && self.layers == other.layers
            && self.neat == other.neat
            && self.fitness == other.fitness
            && self.adjusted_fitness == other.adjusted_fitness
    }
}

impl<K: Kernel> HybridGenome<K> {
    /// Creates a genome whose layers follow `config.fixed`,
    /// with parameters drawn from the configured intervals,
    /// evaluated by `kernel`.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, if
    /// `kernel` rejects a layer, or if the layers' output does
    /// not match the network's input count.
    pub fn with_kernel<R: Rng + ?Sized>(
        config: &HybridConfig,
        history: &mut HybridHistory,
        kernel: K,
        rng: &mut R,
    ) -> Result<HybridGenome<K>, ConfigError> {
        config.validate()?;
        config.check_kernel(&kernel)?;
        Ok(HybridGenome::build(config, history, kernel, rng))
    }

    /// Builds a genome from a configuration already
    /// checked against `kernel`.
    fn build<R: Rng + ?Sized>(
        config: &HybridConfig,
        history: &mut HybridHistory,
        kernel: K,
        rng: &mut R,
    ) -> HybridGenome<K> {
        let fixed = &config.fixed;
        let mut layers = Vec::with_capacity(fixed.layers.len());
        for spec in &fixed.layers {
            let weights: Vec<f32> = (0..spec.weight_shape.iter().product::<usize>())
                .map(|_| random_in(fixed.new_weight_interval, rng))
                .collect();
            let biases: Vec<f32> = (0..spec.bias_len())
                .map(|_| random_in(fixed.new_bias_interval, rng))
                .collect();
            let (mut weights, mut biases) = (weights.into_iter(), biases.into_iter());
            layers.push(FixedLayer::from_spec(
                spec,
                || weights.next().unwrap_or_default(),
                || biases.next().unwrap_or_default(),
            ));
        }

        HybridGenome {
            input_shape: fixed.input_shape.clone(),
            layers,
            neat: NNGenome::new(&config.neat, &mut history.0, rng),
            fitness: 0.0,
            adjusted_fitness: 0.0,
            kernel,
        }
    }

    pub fn layers(&self) -> &[FixedLayer] {
        &self.layers
    }

    /// Returns the NEAT network fed by the fixed layers.
    pub fn neat(&self) -> &NNGenome {
        &self.neat
    }

    /// Shapes `inputs` into the configured input tensor, runs it
    /// through every fixed layer and feeds the flattened result
    /// to the NEAT network.
    pub fn process(&mut self, inputs: &[f32]) -> Result<Vec<f32>, HybridError> {
        let expected = self.input_shape.iter().product();
        if inputs.len() != expected {
            return Err(HybridError::InputLength {
                expected,
                found: inputs.len(),
            });
        }
        let mut tensor = Tensor::new(self.input_shape.clone(), inputs.to_vec())
            .map_err(|source| HybridError::Kernel { layer: 0, source })?;
        for (layer, fixed) in self.layers.iter().enumerate() {
            tensor = self
                .kernel
                .apply(fixed, &tensor)
                .map_err(|source| HybridError::Kernel { layer, source })?;
        }
        Ok(self.neat.process(tensor.data())?)
    }

    /// Mean absolute difference between the layer
    /// parameters of two genomes with equal shapes.
    fn layer_distance(&self, other: &HybridGenome<K>) -> f32 {
        let (mut total, mut count) = (0.0, 0usize);
        for (a, b) in self.layers.iter().zip(&other.layers) {
            for (x, y) in a.parameters().zip(b.parameters()) {
                total += (x - y).abs();
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            total / count as f32
        }
    }

    fn check_layers(&self, config: &FixedTopologyConfig) -> Result<(), HybridError> {
        if self.layers.len() != config.layers.len() {
            return Err(HybridError::LayerCount {
                expected: config.layers.len(),
                found: self.layers.len(),
            });
        }
        for (layer, (fixed, spec)) in self.layers.iter().zip(&config.layers).enumerate() {
            if !fixed.matches(spec) {
                return Err(HybridError::LayerShape {
                    layer,
                    expected: spec.weight_shape.clone(),
                    found: fixed.weights().shape().to_vec(),
                });
            }
        }
        Ok(())
    }
}

fn mutate_values<R: Rng + ?Sized>(
    values: &mut [f32],
    progress: f32,
    (mutation, perturbation, reset): (Annealed, Annealed, Annealed),
    interval: (f32, f32),
    rng: &mut R,
) {
    let (mutation, perturbation, reset) =
        (mutation.at(progress), perturbation.at(progress), reset.at(progress));
    for value in values {
        if chance(rng, mutation) {
            *value = perturb_or_reset(*value, perturbation, reset, interval, rng);
        }
    }
}

impl<K: Kernel + Default + Clone> Genome for HybridGenome<K> {
    type Config = HybridConfig;
    type InnovationHistory = HybridHistory;
    type Error = HybridError;

    fn new<R: Rng + ?Sized>(config: &HybridConfig, history: &mut HybridHistory, rng: &mut R) -> Self {
        HybridGenome::build(config, history, K::default(), rng)
    }

    fn validate_config(config: &HybridConfig) -> Result<(), ConfigError> {
        config.validate()?;
        config.check_kernel(&K::default())
    }

    fn conforms_to(&self, config: &HybridConfig) -> bool {
        self.input_shape == config.fixed.input_shape
            && self.check_layers(&config.fixed).is_ok()
            && self.neat.conforms_to(&config.neat)
    }

    fn process(&mut self, inputs: &[f32]) -> Result<Vec<f32>, HybridError> {
        HybridGenome::process(self, inputs)
    }

    fn reset_activations(&mut self) {
        self.neat.reset_activations();
    }

    fn distance_to(&self, other: &Self, config: &HybridConfig) -> f32 {
        NNGenome::genetic_distance(&self.neat, &other.neat, &config.neat)
            + config.fixed.layer_distance_coefficient * self.layer_distance(other)
    }

    fn mutate<R: Rng + ?Sized>(
        &mut self,
        progress: f32,
        history: &mut HybridHistory,
        config: &HybridConfig,
        rng: &mut R,
    ) {
        let fixed = &config.fixed;
        let weight_chances = (
            fixed.weight_mutation_chance,
            fixed.weight_perturbation_pc,
            fixed.weight_reset_chance,
        );
        let bias_chances = (
            fixed.bias_mutation_chance,
            fixed.bias_perturbation_pc,
            fixed.bias_reset_chance,
        );
        for layer in &mut self.layers {
            let (weights, biases) = layer.parameters_mut();
            mutate_values(weights, progress, weight_chances, fixed.new_weight_interval, rng);
            mutate_values(biases, progress, bias_chances, fixed.new_bias_interval, rng);
        }
        self.neat.mutate(progress, &mut history.0, &config.neat, rng);
    }

    fn crossover_with<R: Rng + ?Sized>(&self, other: &Self, config: &HybridConfig, rng: &mut R) -> Self {
        let layers = self
            .layers
            .iter()
            .zip(&other.layers)
            .map(|(a, b)| match config.fixed.mating_mode {
                MatingMode::ExchangeWeights => {
                    if rng.gen::<bool>() {
                        a.clone()
                    } else {
                        b.clone()
                    }
                }
                MatingMode::WeightsMean => {
                    let mut child = a.clone();
                    let (weights, biases) = child.parameters_mut();
                    for (value, other) in weights.iter_mut().chain(biases).zip(b.parameters()) {
                        *value = (*value + other) / 2.0;
                    }
                    child
                }
            })
            .collect();

        HybridGenome {
            input_shape: self.input_shape.clone(),
            layers,
            neat: self.neat.crossover(&other.neat, &config.neat, rng),
            fitness: 0.0,
            adjusted_fitness: 0.0,
            kernel: self.kernel.clone(),
        }
    }

    fn check_integrity(&self, config: &HybridConfig) -> Result<(), HybridError> {
        self.check_layers(&config.fixed)?;
        Ok(self.neat.check_integrity()?)
    }

    fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
        // Crossover of the network picks the fitter parent by its own fitness.
        Genome::set_fitness(&mut self.neat, fitness);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KernelError, LayerSpec};
    use nevo_nn::genomics::GeneticConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::num::NonZeroUsize;

    /// Dense layers: weights shaped `[outputs, inputs]`, biases `[outputs]`.
    #[derive(Clone, Debug, Default)]
    struct Dense;

    impl Kernel for Dense {
        fn apply(&self, layer: &FixedLayer, input: &Tensor) -> Result<Tensor, KernelError> {
            if layer.kind() != "dense" {
                return Err(KernelError::UnsupportedLayer(layer.kind().to_string()));
            }
            let (rows, columns) = (layer.weights().shape()[0], layer.weights().shape()[1]);
            if input.len() != columns {
                return Err(KernelError::ShapeMismatch {
                    shape: vec![columns],
                    found: input.len(),
                });
            }
            let weights = layer.weights().data();
            let output = (0..rows)
                .map(|r| {
                    let sum: f32 = (0..columns)
                        .map(|c| weights[r * columns + c] * input.data()[c])
                        .sum();
                    sum + layer.biases().data().get(r).copied().unwrap_or_default()
                })
                .collect();
            Tensor::new(vec![rows], output)
        }
    }

    fn config(mating_mode: MatingMode) -> HybridConfig {
        HybridConfig {
            fixed: FixedTopologyConfig {
                input_shape: vec![4],
                layers: vec![
                    LayerSpec::new("dense", vec![3, 4], vec![3]),
                    LayerSpec::new("dense", vec![2, 3], vec![]),
                ],
                mating_mode,
                weight_mutation_chance: Annealed::fixed(1.0),
                bias_mutation_chance: Annealed::fixed(1.0),
                ..FixedTopologyConfig::default()
            },
            neat: GeneticConfig {
                input_count: NonZeroUsize::new(2).unwrap(),
                output_count: NonZeroUsize::new(2).unwrap(),
                ..GeneticConfig::default()
            },
        }
    }

    fn pair(config: &HybridConfig, seed: u64) -> (HybridGenome<Dense>, HybridGenome<Dense>, HybridHistory, ChaCha8Rng) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut history = HybridHistory::new(config);
        let first = HybridGenome::<Dense>::new(config, &mut history, &mut rng);
        let second = HybridGenome::<Dense>::new(config, &mut history, &mut rng);
        (first, second, history, rng)
    }

    #[test]
    fn process_feeds_layers_into_network() {
        let config = config(MatingMode::ExchangeWeights);
        let (mut genome, _, _, _) = pair(&config, 0);
        let output = genome.process(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert_eq!(output.len(), 2);
        assert_eq!(
            genome.process(&[0.1, 0.2]),
            Err(HybridError::InputLength {
                expected: 4,
                found: 2
            })
        );
    }

    #[test]
    fn layer_output_must_match_network_inputs() {
        let mut config = config(MatingMode::ExchangeWeights);
        config.neat.input_count = NonZeroUsize::new(3).unwrap();
        let expected = Err(ConfigError::InvalidLayer {
            index: 1,
            reason: "layers yield 2 values, the network expects 3 inputs".to_string(),
        });
        assert_eq!(HybridGenome::<Dense>::validate_config(&config), expected);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut history = HybridHistory::new(&config);
        let genome = HybridGenome::with_kernel(&config, &mut history, Dense, &mut rng);
        assert_eq!(genome.map(|_| ()), expected);
    }

    #[test]
    fn unsupported_layers_are_rejected_up_front() {
        let mut config = config(MatingMode::ExchangeWeights);
        config.fixed.layers[0].kind = "conv".to_string();
        assert_eq!(
            HybridGenome::<Dense>::validate_config(&config),
            Err(ConfigError::InvalidLayer {
                index: 0,
                reason: "unsupported layer kind `conv`".to_string(),
            })
        );
    }

    #[test]
    fn kernel_failures_name_the_layer() {
        let mut config = config(MatingMode::ExchangeWeights);
        config.fixed.layers[1].kind = "conv".to_string();
        let (mut genome, _, _, _) = pair(&config, 0);
        assert_eq!(
            genome.process(&[0.0; 4]),
            Err(HybridError::Kernel {
                layer: 1,
                source: KernelError::UnsupportedLayer("conv".to_string()),
            })
        );
    }

    #[test]
    fn mutation_keeps_shapes() {
        let config = config(MatingMode::ExchangeWeights);
        let (mut genome, _, mut history, mut rng) = pair(&config, 1);
        let before = genome.clone();
        for _ in 0..20 {
            genome.mutate(1.0, &mut history, &config, &mut rng);
        }
        assert_eq!(genome.check_integrity(&config), Ok(()));
        assert!(genome.conforms_to(&config));
        assert!(genome
            .layers()
            .iter()
            .zip(before.layers())
            .all(|(a, b)| a.weights().shape() == b.weights().shape() && a != b));
    }

    #[test]
    fn weights_mean_crossover() {
        let config = config(MatingMode::WeightsMean);
        let (first, second, _, mut rng) = pair(&config, 2);
        let child = first.crossover_with(&second, &config, &mut rng);
        for ((c, a), b) in child.layers().iter().zip(first.layers()).zip(second.layers()) {
            for ((x, y), z) in c.parameters().zip(a.parameters()).zip(b.parameters()) {
                assert_eq!(x, (y + z) / 2.0);
            }
        }
        assert_eq!(child.fitness(), 0.0);
        assert_eq!(child.check_integrity(&config), Ok(()));
    }

    #[test]
    fn exchange_crossover_keeps_whole_layers() {
        let config = config(MatingMode::ExchangeWeights);
        let (first, second, _, mut rng) = pair(&config, 3);
        let child = first.crossover_with(&second, &config, &mut rng);
        for ((c, a), b) in child.layers().iter().zip(first.layers()).zip(second.layers()) {
            assert!(c == a || c == b);
        }
    }

    #[test]
    fn distance_includes_layers() {
        let config = config(MatingMode::ExchangeWeights);
        let (first, second, _, _) = pair(&config, 4);
        assert_eq!(first.distance_to(&first, &config), 0.0);
        let neat_only = NNGenome::genetic_distance(first.neat(), second.neat(), &config.neat);
        assert!(first.distance_to(&second, &config) > neat_only);
    }

    #[test]
    fn serde_round_trip_restores_default_kernel() {
        let config = config(MatingMode::ExchangeWeights);
        let (mut genome, _, _, _) = pair(&config, 5);
        let json = serde_json::to_string(&genome).unwrap();
        let mut restored: HybridGenome<Dense> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, genome);
        let input = [0.5, -0.5, 0.25, 1.0];
        assert_eq!(restored.process(&input).unwrap(), genome.process(&input).unwrap());
    }
}
