use super::{Gene, GeneticConfig, NNGenome, Node, NodeType};
use crate::Innovation;

use nevo::chance;
use rand::Rng;

use std::cmp::Ordering;

/// Pairs up the genes of two genomes by innovation number,
/// in ascending order. Genes present in only one genome are
/// paired with `None`.
///
/// # Examples
/// ```
/// use nevo_nn::genomics::{align, ActivationType, GeneticConfig, History, NNGenome};
/// use rand::SeedableRng;
///
/// let config = GeneticConfig {
///     initial_expression_chance: 0.0,
///     ..GeneticConfig::default()
/// };
/// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
/// let mut first = NNGenome::new(&config, &mut History::new(&config), &mut rng);
/// let mut second = first.clone();
/// first.add_gene(0, 0, 2, 1.0).unwrap();
/// first.add_gene(1, 1, 2, 1.0).unwrap();
/// second.add_gene(1, 1, 2, -1.0).unwrap();
///
/// let ids: Vec<_> = align(&first, &second)
///     .into_iter()
///     .map(|(a, b)| (a.map(|g| g.innovation()), b.map(|g| g.innovation())))
///     .collect();
/// assert_eq!(ids, vec![(Some(0), None), (Some(1), Some(1))]);
/// ```
pub fn align<'a>(
    first: &'a NNGenome,
    second: &'a NNGenome,
) -> Vec<(Option<&'a Gene>, Option<&'a Gene>)> {
    let mut aligned = Vec::with_capacity(first.genes.len().max(second.genes.len()));
    let mut first_genes = first.genes.values().peekable();
    let mut second_genes = second.genes.values().peekable();

    loop {
        let ordering = match (first_genes.peek(), second_genes.peek()) {
            (Some(a), Some(b)) => a.innovation().cmp(&b.innovation()),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        aligned.push(match ordering {
            Ordering::Less => (first_genes.next(), None),
            Ordering::Greater => (None, second_genes.next()),
            Ordering::Equal => (first_genes.next(), second_genes.next()),
        });
    }

    aligned
}

pub(super) fn crossover<R: Rng + ?Sized>(
    first: &NNGenome,
    second: &NNGenome,
    config: &GeneticConfig,
    rng: &mut R,
) -> NNGenome {
    let tie = first.fitness == second.fitness;
    let (primary, secondary) = if second.fitness > first.fitness {
        (second, first)
    } else {
        (first, second)
    };

    let mut child = NNGenome::empty(primary.recurrent);
    child.nodes = primary
        .nodes
        .values()
        .map(|n| (n.innovation(), n.unlinked()))
        .collect();

    for pair in align(primary, secondary) {
        match pair {
            (Some(a), Some(b)) => {
                let mut gene = if rng.gen::<bool>() { a.clone() } else { b.clone() };
                let suppressed = (a.suppressed() || b.suppressed())
                    && chance(rng, config.disable_inherited_gene_chance);
                gene.set_suppressed(suppressed);
                inherit(&mut child, gene, secondary, config);
            }
            (Some(a), None) => {
                if !tie || rng.gen::<bool>() {
                    inherit(&mut child, a.clone(), secondary, config);
                }
            }
            (None, Some(b)) => {
                if tie && rng.gen::<bool>() {
                    inherit(&mut child, b.clone(), secondary, config);
                }
            }
            (None, None) => {}
        }
    }

    child
}

/// Adds `gene` to `child` if it keeps the child valid, together
/// with any endpoint the child lacks. Missing endpoints come from
/// `secondary`, as the child starts with every primary node.
fn inherit(child: &mut NNGenome, gene: Gene, secondary: &NNGenome, config: &GeneticConfig) {
    let (input, output) = gene.endpoints();
    if input == output
        || child.genes.contains_key(&gene.innovation())
        || child.node_pairings.contains(&(input, output))
    {
        return;
    }

    let mut missing: Vec<&Node> = Vec::with_capacity(2);
    for id in [input, output] {
        if child.nodes.contains_key(&id) {
            continue;
        }
        let node = match secondary.nodes.get(&id) {
            Some(node) => node,
            None => return,
        };
        // Only hidden nodes go missing between parents of one configuration.
        let rejected = match node.node_type() {
            NodeType::Input | NodeType::Bias => config.infanticide_input_nodes,
            NodeType::Output => config.infanticide_output_nodes,
            NodeType::Hidden => false,
        };
        if rejected {
            return;
        }
        missing.push(node);
    }

    let target_type = child
        .nodes
        .get(&output)
        .or_else(|| secondary.nodes.get(&output))
        .map(Node::node_type);
    if target_type.map_or(true, NodeType::is_source_only) {
        return;
    }
    if !child.recurrent && child.creates_cycle(input, output) {
        return;
    }

    for node in missing {
        child.insert_node(node.unlinked());
    }
    child.insert_gene(gene);
}
