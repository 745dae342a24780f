use super::{ActivationType, Gene, GeneticConfig, History, MutationError, NNGenome, Node, NodeType};
use crate::Innovation;

use log::trace;
use nevo::chance;
use rand::seq::SliceRandom;
use rand::Rng;

pub(super) fn mutate<R: Rng + ?Sized>(
    genome: &mut NNGenome,
    progress: f32,
    history: &mut History,
    config: &GeneticConfig,
    rng: &mut R,
) {
    mutate_weights(genome, progress, config, rng);
    if chance(rng, config.node_addition_mutation_chance.at(progress)) {
        if let Err(e) = add_node(genome, history, config, rng) {
            trace!("skipped node addition: {}", e);
        }
    }
    if chance(rng, config.gene_addition_mutation_chance.at(progress)) {
        if let Err(e) = add_gene(genome, history, config, rng) {
            trace!("skipped gene addition: {}", e);
        }
    }
    if chance(rng, config.gene_reenable_mutation_chance.at(progress)) {
        if let Err(e) = reenable_gene(genome, rng) {
            trace!("skipped gene re-expression: {}", e);
        }
    }
}

pub(super) fn mutate_weights<R: Rng + ?Sized>(
    genome: &mut NNGenome,
    progress: f32,
    config: &GeneticConfig,
    rng: &mut R,
) {
    let mutation_chance = config.weight_mutation_chance.at(progress);
    let perturbation_pc = config.weight_perturbation_pc.at(progress);
    let reset_chance = config.weight_reset_chance.at(progress);
    for gene in genome.genes.values_mut() {
        if chance(rng, mutation_chance) {
            gene.set_weight(perturb_or_reset(
                gene.weight(),
                perturbation_pc,
                reset_chance,
                config.new_weight_interval,
                rng,
            ));
        }
    }
}

/// Returns `value` either reset to a random value in `interval`,
/// with probability `reset_chance`, or perturbed by up to
/// `perturbation_pc` of its own magnitude. Zero values are
/// perturbed as if they were 1.
///
/// # Examples
/// ```
/// use nevo_nn::genomics::perturb_or_reset;
/// use rand::SeedableRng;
///
/// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
///
/// let perturbed = perturb_or_reset(2.0, 0.1, 0.0, (-1.0, 1.0), &mut rng);
/// assert!((1.8..=2.2).contains(&perturbed));
///
/// let reset = perturb_or_reset(2.0, 0.1, 1.0, (-1.0, 1.0), &mut rng);
/// assert!((-1.0..=1.0).contains(&reset));
/// ```
pub fn perturb_or_reset<R: Rng + ?Sized>(
    value: f32,
    perturbation_pc: f32,
    reset_chance: f32,
    interval: (f32, f32),
    rng: &mut R,
) -> f32 {
    if chance(rng, reset_chance) {
        random_in(interval, rng)
    } else {
        let scale = if value == 0.0 { 1.0 } else { value };
        value + scale * rng.gen_range(-perturbation_pc..=perturbation_pc)
    }
}

/// Returns a uniformly distributed value in the closed `interval`.
pub fn random_in<R: Rng + ?Sized>((min, max): (f32, f32), rng: &mut R) -> f32 {
    rng.gen_range(min..=max)
}

pub(super) fn add_gene<R: Rng + ?Sized>(
    genome: &mut NNGenome,
    history: &mut History,
    config: &GeneticConfig,
    rng: &mut R,
) -> Result<Innovation, MutationError> {
    // Feed-forward genomes never read from output nodes.
    let sources: Vec<Innovation> = genome
        .nodes
        .values()
        .filter(|n| genome.recurrent || n.node_type() != NodeType::Output)
        .map(Node::innovation)
        .collect();
    let targets: Vec<Innovation> = genome
        .nodes
        .values()
        .filter(|n| !n.node_type().is_source_only())
        .map(Node::innovation)
        .collect();

    for _ in 0..config.max_gene_addition_mutation_attempts {
        let (input, output) = match (sources.choose(rng), targets.choose(rng)) {
            (Some(&input), Some(&output)) => (input, output),
            _ => break,
        };
        if input == output
            || genome.node_pairings.contains(&(input, output))
            || (!genome.recurrent && genome.creates_cycle(input, output))
        {
            continue;
        }
        let id = history.gene_innovation(input, output);
        let weight = random_in(config.new_weight_interval, rng);
        genome.insert_gene(Gene::new(id, input, output, weight));
        return Ok(id);
    }
    Err(MutationError::NoViablePair)
}

pub(super) fn add_node<R: Rng + ?Sized>(
    genome: &mut NNGenome,
    history: &mut History,
    config: &GeneticConfig,
    rng: &mut R,
) -> Result<Innovation, MutationError> {
    let expressed: Vec<&Gene> = genome.genes.values().filter(|g| !g.suppressed()).collect();
    let (split, (input, output), weight) = match expressed.choose(rng) {
        Some(gene) => (gene.innovation(), gene.endpoints(), gene.weight()),
        None => return Err(MutationError::NoExpressedGene),
    };

    let mut innovations = history.node_innovation(split, input, output, false);
    let (input_gene, node, output_gene) = innovations;
    if genome.nodes.contains_key(&node)
        || genome.genes.contains_key(&input_gene)
        || genome.genes.contains_key(&output_gene)
    {
        // The genome already split this gene in an earlier generation.
        innovations = history.node_innovation(split, input, output, true);
    }
    let (input_gene, node, output_gene) = innovations;

    let activation = config
        .activation_types
        .choose(rng)
        .copied()
        .unwrap_or(ActivationType::Sigmoid);

    if let Some(gene) = genome.genes.get_mut(&split) {
        gene.set_suppressed(true);
    }
    genome.insert_node(Node::new(node, NodeType::Hidden, activation));
    genome.insert_gene(Gene::new(input_gene, input, node, 1.0));
    genome.insert_gene(Gene::new(output_gene, node, output, weight));
    Ok(node)
}

pub(super) fn reenable_gene<R: Rng + ?Sized>(
    genome: &mut NNGenome,
    rng: &mut R,
) -> Result<Innovation, MutationError> {
    let suppressed: Vec<Innovation> = genome
        .genes
        .values()
        .filter(|g| g.suppressed())
        .map(Gene::innovation)
        .collect();
    let id = *suppressed
        .choose(rng)
        .ok_or(MutationError::NoSuppressedGene)?;
    if let Some(gene) = genome.genes.get_mut(&id) {
        gene.set_suppressed(false);
    }
    Ok(id)
}
