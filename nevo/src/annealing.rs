use serde::{Deserialize, Serialize};

/// A probability that moves from `min` towards `max`
/// as a population stagnates.
///
/// Progress is a value in `[0, 1]` supplied by the
/// population; out-of-range and NaN progress values
/// are clamped.
///
/// # Examples
/// ```
/// use nevo::Annealed;
///
/// let chance = Annealed::new(0.1, 0.5);
/// assert_eq!(chance.at(0.0), 0.1);
/// assert_eq!(chance.at(1.0), 0.5);
/// assert_eq!(chance.at(7.0), 0.5);
/// assert!((chance.at(0.5) - 0.3).abs() < 1e-6);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annealed {
    pub min: f32,
    pub max: f32,
}

impl Annealed {
    /// Returns an annealed value ranging over `[min, max]`.
    pub const fn new(min: f32, max: f32) -> Annealed {
        Annealed { min, max }
    }

    /// Returns a value that ignores progress.
    pub const fn fixed(value: f32) -> Annealed {
        Annealed {
            min: value,
            max: value,
        }
    }

    /// Resolves the value for the given stagnation progress.
    pub fn at(&self, progress: f32) -> f32 {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.min + (self.max - self.min) * progress
    }
}

impl From<f32> for Annealed {
    fn from(value: f32) -> Annealed {
        Annealed::fixed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_ignores_progress() {
        let a = Annealed::fixed(0.25);
        for p in [0.0, 0.3, 1.0, f32::NAN, -4.0] {
            assert_eq!(a.at(p), 0.25);
        }
    }

    #[test]
    fn nan_progress_resolves_to_min() {
        assert_eq!(Annealed::new(0.2, 0.9).at(f32::NAN), 0.2);
    }

    #[test]
    fn monotonic_in_progress() {
        let a = Annealed::new(0.1, 0.75);
        let mut last = a.at(0.0);
        for step in 1..=20 {
            let value = a.at(step as f32 / 20.0);
            assert!(value >= last);
            last = value;
        }
    }
}
