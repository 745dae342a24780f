use crate::KernelError;

use serde::{Deserialize, Serialize};

/// A dense, row-major block of values with a fixed shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Wraps `data` in a tensor of the given shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of values does not
    /// match the shape. An empty shape holds a single value.
    ///
    /// # Examples
    /// ```
    /// use nevo_fito::{KernelError, Tensor};
    ///
    /// let tensor = Tensor::new(vec![2, 3], vec![0.0; 6]).unwrap();
    /// assert_eq!(tensor.len(), 6);
    ///
    /// assert_eq!(
    ///     Tensor::new(vec![2, 3], vec![0.0; 5]),
    ///     Err(KernelError::ShapeMismatch { shape: vec![2, 3], found: 5 })
    /// );
    /// ```
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Tensor, KernelError> {
        if shape.iter().product::<usize>() != data.len() {
            return Err(KernelError::ShapeMismatch {
                shape,
                found: data.len(),
            });
        }
        Ok(Tensor { shape, data })
    }

    /// Returns a tensor of the given shape filled with
    /// values produced by `f`.
    pub fn from_fn(shape: Vec<usize>, f: impl FnMut() -> f32) -> Tensor {
        let len = shape.iter().product();
        Tensor {
            shape,
            data: std::iter::repeat_with(f).take(len).collect(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Describes a fixed layer: what kind of operation the
/// kernel should perform, and the shapes of its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub kind: String,
    pub weight_shape: Vec<usize>,
    /// An empty bias shape means the layer has no biases.
    pub bias_shape: Vec<usize>,
}

impl LayerSpec {
    pub fn new(kind: impl Into<String>, weight_shape: Vec<usize>, bias_shape: Vec<usize>) -> LayerSpec {
        LayerSpec {
            kind: kind.into(),
            weight_shape,
            bias_shape,
        }
    }

    pub(crate) fn bias_len(&self) -> usize {
        if self.bias_shape.is_empty() {
            0
        } else {
            self.bias_shape.iter().product()
        }
    }
}

/// A numeric layer with fixed shape and mutable parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedLayer {
    kind: String,
    weights: Tensor,
    biases: Tensor,
}

impl FixedLayer {
    /// Builds a layer from its spec, drawing each weight from
    /// `weight` and each bias from `bias`.
    pub fn from_spec(
        spec: &LayerSpec,
        weight: impl FnMut() -> f32,
        bias: impl FnMut() -> f32,
    ) -> FixedLayer {
        let biases = Tensor::from_fn(vec![spec.bias_len()], bias);
        FixedLayer {
            kind: spec.kind.clone(),
            weights: Tensor::from_fn(spec.weight_shape.clone(), weight),
            biases,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    /// Returns the layer's biases as a flat tensor,
    /// empty if the layer has none.
    pub fn biases(&self) -> &Tensor {
        &self.biases
    }

    pub(crate) fn parameters_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (self.weights.data_mut(), self.biases.data_mut())
    }

    /// Returns `true` if the layer was built from `spec`.
    pub fn matches(&self, spec: &LayerSpec) -> bool {
        self.kind == spec.kind
            && self.weights.shape() == spec.weight_shape.as_slice()
            && self.biases.len() == spec.bias_len()
    }

    /// Iterates over every weight and bias of the layer.
    pub fn parameters(&self) -> impl Iterator<Item = f32> + '_ {
        self.weights.data().iter().chain(self.biases.data()).copied()
    }
}

/// A numeric backend able to evaluate fixed layers.
///
/// Implementations decide what each layer `kind` means;
/// shapes are guaranteed to match the layer's spec.
pub trait Kernel {
    fn apply(&self, layer: &FixedLayer, input: &Tensor) -> Result<Tensor, KernelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_from_spec() {
        let spec = LayerSpec::new("dense", vec![2, 3], vec![2]);
        let layer = FixedLayer::from_spec(&spec, || 1.0, || 0.5);
        assert!(layer.matches(&spec));
        assert_eq!(layer.weights().len(), 6);
        assert_eq!(layer.biases().data(), &[0.5, 0.5]);
        assert_eq!(layer.parameters().count(), 8);
        assert!(!layer.matches(&LayerSpec::new("dense", vec![3, 2], vec![2])));
    }

    #[test]
    fn biasless_layer() {
        let spec = LayerSpec::new("scale", vec![1], vec![]);
        let layer = FixedLayer::from_spec(&spec, || 2.0, || 1.0);
        assert!(layer.biases().is_empty());
        assert!(layer.matches(&spec));
    }
}
