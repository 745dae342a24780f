//! Schedulers decide how a batch of genomes is scored.
//!
//! Fitness calls never touch more than the genome they
//! are given, so a batch can be spread over threads (or
//! any other execution fabric) as long as results come
//! back in input order.
use rayon::prelude::*;

/// Scores a batch of genomes with a fitness function.
pub trait ProcessingScheduler {
    /// Returns one result per genome, in input order.
    fn evaluate<G, F, E>(&self, genomes: &mut [&mut G], fitness: &F) -> Vec<Result<f32, E>>
    where
        G: Send,
        F: Fn(&mut G) -> Result<f32, E> + Sync,
        E: Send;
}

/// Evaluates genomes one after the other on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialScheduler;

impl ProcessingScheduler for SerialScheduler {
    fn evaluate<G, F, E>(&self, genomes: &mut [&mut G], fitness: &F) -> Vec<Result<f32, E>>
    where
        G: Send,
        F: Fn(&mut G) -> Result<f32, E> + Sync,
        E: Send,
    {
        genomes.iter_mut().map(|genome| fitness(&mut **genome)).collect()
    }
}

/// Evaluates genomes on rayon's global thread pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct RayonScheduler;

impl ProcessingScheduler for RayonScheduler {
    fn evaluate<G, F, E>(&self, genomes: &mut [&mut G], fitness: &F) -> Vec<Result<f32, E>>
    where
        G: Send,
        F: Fn(&mut G) -> Result<f32, E> + Sync,
        E: Send,
    {
        genomes
            .par_iter_mut()
            .map(|genome| fitness(&mut **genome))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: &mut u32) -> Result<f32, String> {
        if *x == 3 {
            return Err("three".into());
        }
        *x *= *x;
        Ok(*x as f32)
    }

    fn run<S: ProcessingScheduler>(scheduler: S) {
        let mut values: Vec<u32> = (0..64).collect();
        let mut refs: Vec<&mut u32> = values.iter_mut().collect();
        let results = scheduler.evaluate(&mut refs, &square);
        assert_eq!(results.len(), 64);
        for (i, result) in results.into_iter().enumerate() {
            if i == 3 {
                assert_eq!(result, Err("three".to_string()));
            } else {
                assert_eq!(result, Ok((i * i) as f32));
            }
        }
        assert_eq!(values[5], 25);
    }

    #[test]
    fn serial_keeps_order() {
        run(SerialScheduler);
    }

    #[test]
    fn rayon_keeps_order() {
        run(RayonScheduler);
    }
}
