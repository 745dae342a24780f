use crate::{FixedLayer, Kernel, LayerSpec, Tensor};

use nevo::{check_annealed, check_interval, check_non_negative, Annealed, ConfigError};
use nevo_nn::genomics::GeneticConfig;
use serde::{Deserialize, Serialize};

/// How the fixed layers of two parents are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatingMode {
    /// Each layer is inherited whole from a random parent.
    #[default]
    ExchangeWeights,
    /// Each parameter is the mean of both parents' values.
    WeightsMean,
}

/// Configuration of the fixed numeric front end
/// of hybrid genomes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedTopologyConfig {
    /// Shape of the tensor built from a genome's input slice.
    pub input_shape: Vec<usize>,
    /// Layers, in evaluation order.
    pub layers: Vec<LayerSpec>,
    /// Chance of each weight being mutated.
    pub weight_mutation_chance: Annealed,
    /// Relative magnitude of weight perturbations.
    pub weight_perturbation_pc: Annealed,
    /// Chance of a mutated weight being reset instead of perturbed.
    pub weight_reset_chance: Annealed,
    /// Interval from which new and reset weights are drawn.
    pub new_weight_interval: (f32, f32),
    pub bias_mutation_chance: Annealed,
    pub bias_perturbation_pc: Annealed,
    pub bias_reset_chance: Annealed,
    pub new_bias_interval: (f32, f32),
    pub mating_mode: MatingMode,
    /// Weight of the mean layer parameter difference
    /// in genetic distance.
    pub layer_distance_coefficient: f32,
}

impl FixedTopologyConfig {
    /// Returns a "zero-valued" configuration, with
    /// no layers and an empty input shape.
    pub const fn zero() -> FixedTopologyConfig {
        FixedTopologyConfig {
            input_shape: Vec::new(),
            layers: Vec::new(),
            weight_mutation_chance: Annealed::fixed(0.0),
            weight_perturbation_pc: Annealed::fixed(0.0),
            weight_reset_chance: Annealed::fixed(0.0),
            new_weight_interval: (0.0, 0.0),
            bias_mutation_chance: Annealed::fixed(0.0),
            bias_perturbation_pc: Annealed::fixed(0.0),
            bias_reset_chance: Annealed::fixed(0.0),
            new_bias_interval: (0.0, 0.0),
            mating_mode: MatingMode::ExchangeWeights,
            layer_distance_coefficient: 0.0,
        }
    }

    /// Number of values a genome expects as input.
    pub fn input_len(&self) -> usize {
        self.input_shape.iter().product()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_shape.is_empty() || self.input_shape.contains(&0) {
            return Err(ConfigError::InvalidLayer {
                index: 0,
                reason: format!("input shape {:?} holds no values", self.input_shape),
            });
        }
        for (index, spec) in self.layers.iter().enumerate() {
            if spec.weight_shape.is_empty() || spec.weight_shape.contains(&0) {
                return Err(ConfigError::InvalidLayer {
                    index,
                    reason: format!("weight shape {:?} holds no values", spec.weight_shape),
                });
            }
            if spec.bias_shape.contains(&0) {
                return Err(ConfigError::InvalidLayer {
                    index,
                    reason: format!("bias shape {:?} holds no values", spec.bias_shape),
                });
            }
        }
        check_annealed("weight_mutation_chance", self.weight_mutation_chance)?;
        check_non_negative("weight_perturbation_pc", self.weight_perturbation_pc.min)?;
        check_non_negative("weight_perturbation_pc", self.weight_perturbation_pc.max)?;
        check_interval(
            "weight_perturbation_pc",
            (self.weight_perturbation_pc.min, self.weight_perturbation_pc.max),
        )?;
        check_annealed("weight_reset_chance", self.weight_reset_chance)?;
        check_interval("new_weight_interval", self.new_weight_interval)?;
        check_annealed("bias_mutation_chance", self.bias_mutation_chance)?;
        check_non_negative("bias_perturbation_pc", self.bias_perturbation_pc.min)?;
        check_non_negative("bias_perturbation_pc", self.bias_perturbation_pc.max)?;
        check_interval(
            "bias_perturbation_pc",
            (self.bias_perturbation_pc.min, self.bias_perturbation_pc.max),
        )?;
        check_annealed("bias_reset_chance", self.bias_reset_chance)?;
        check_interval("new_bias_interval", self.new_bias_interval)?;
        check_non_negative("layer_distance_coefficient", self.layer_distance_coefficient)
    }
}

impl Default for FixedTopologyConfig {
    fn default() -> FixedTopologyConfig {
        FixedTopologyConfig {
            weight_mutation_chance: Annealed::new(0.7, 0.9),
            weight_perturbation_pc: Annealed::new(0.1, 0.4),
            weight_reset_chance: Annealed::new(0.05, 0.2),
            new_weight_interval: (-1.0, 1.0),
            bias_mutation_chance: Annealed::new(0.5, 0.8),
            bias_perturbation_pc: Annealed::new(0.1, 0.4),
            bias_reset_chance: Annealed::new(0.05, 0.2),
            new_bias_interval: (-0.5, 0.5),
            layer_distance_coefficient: 1.0,
            ..FixedTopologyConfig::zero()
        }
    }
}

/// Configuration of hybrid genomes: the fixed front end
/// plus the NEAT network it feeds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HybridConfig {
    pub fixed: FixedTopologyConfig,
    pub neat: GeneticConfig,
}

impl HybridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fixed.validate()?;
        self.neat.validate()
    }

    /// Runs a zero input through zero-valued layers with `kernel`,
    /// checking that every layer is accepted and that the flattened
    /// result matches the network's input count.
    pub fn check_kernel<K: Kernel>(&self, kernel: &K) -> Result<(), ConfigError> {
        let invalid = |index, reason| ConfigError::InvalidLayer { index, reason };
        let mut tensor = Tensor::from_fn(self.fixed.input_shape.clone(), || 0.0);
        for (index, spec) in self.fixed.layers.iter().enumerate() {
            let layer = FixedLayer::from_spec(spec, || 0.0, || 0.0);
            tensor = kernel
                .apply(&layer, &tensor)
                .map_err(|e| invalid(index, e.to_string()))?;
        }
        let expected = self.neat.input_count.get();
        if tensor.len() != expected {
            return Err(invalid(
                self.fixed.layers.len().saturating_sub(1),
                format!(
                    "layers yield {} values, the network expects {} inputs",
                    tensor.len(),
                    expected
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_shape_rejected() {
        assert!(matches!(
            HybridConfig::default().validate(),
            Err(ConfigError::InvalidLayer { .. })
        ));
    }

    #[test]
    fn zero_sized_layer_rejected() {
        let config = FixedTopologyConfig {
            input_shape: vec![4],
            layers: vec![
                LayerSpec::new("dense", vec![2, 4], vec![2]),
                LayerSpec::new("dense", vec![0, 2], vec![]),
            ],
            ..FixedTopologyConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidLayer {
                index: 1,
                reason: "weight shape [0, 2] holds no values".to_string(),
            })
        );
    }

    #[test]
    fn reversed_perturbation_rejected() {
        let config = FixedTopologyConfig {
            input_shape: vec![4],
            bias_perturbation_pc: Annealed::new(0.5, 0.2),
            ..FixedTopologyConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidInterval {
                field: "bias_perturbation_pc",
                min: 0.5,
                max: 0.2,
            })
        );
    }

    #[test]
    fn valid_config() {
        let config = FixedTopologyConfig {
            input_shape: vec![2, 2],
            layers: vec![LayerSpec::new("dense", vec![3, 4], vec![3])],
            ..FixedTopologyConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.input_len(), 4);
    }
}
