use nevo_nn::genomics::GenomeError;

use thiserror::Error;

/// Failures reported by a [`Kernel`] implementation.
///
/// [`Kernel`]: crate::Kernel
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("tensor of shape {shape:?} cannot hold {found} values")]
    ShapeMismatch { shape: Vec<usize>, found: usize },
    #[error("unsupported layer kind `{0}`")]
    UnsupportedLayer(String),
    #[error("kernel failure: {0}")]
    Failed(String),
}

/// Errors produced while evaluating or checking a hybrid genome.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum HybridError {
    #[error("expected {expected} inputs, received {found}")]
    InputLength { expected: usize, found: usize },
    #[error("layer {layer} failed")]
    Kernel {
        layer: usize,
        #[source]
        source: KernelError,
    },
    #[error("layer {layer} has shape {found:?}, expected {expected:?}")]
    LayerShape {
        layer: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("genome has {found} fixed layers, expected {expected}")]
    LayerCount { expected: usize, found: usize },
    #[error(transparent)]
    Genome(#[from] GenomeError),
}
