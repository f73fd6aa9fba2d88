//! Genomes are the unit of evolution: directed graphs of
//! nodes and weighted genes that can be evaluated as a
//! neural network, mutated to grow new structure, and
//! recombined by innovation-number alignment.

mod errors;
mod genes;
mod history;
mod nodes;

use errors::*;
pub use genes::Gene;
pub use history::{History, NodeSplit};
pub use nodes::{Activation, Node, NodeRole};

use crate::{Innovation, NodeId, Params};

use ahash::RandomState;
use rand::prelude::{IteratorRandom, Rng};
use serde::{Deserialize, Serialize};

use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt;

/// Number of times every output node must have activated
/// before an evaluation is considered settled. The second
/// activation lets values computed in the same round as an
/// output's first activation reach it.
const MIN_OUTPUT_ACTIVATIONS: usize = 2;

/// A mutable collection of genes and nodes.
///
/// Nodes live in an arena: the first [`input_size`] entries
/// are the input nodes, the next [`output_size`] the output
/// nodes, and the rest hidden nodes in insertion order.
/// Genes are kept sorted by ascending innovation number,
/// which is what makes linear alignment in [`mate`] and
/// [`distance`] correct.
///
/// Supports Serde for convenient genome saving and loading.
///
/// [`input_size`]: Genome::input_size
/// [`output_size`]: Genome::output_size
/// [`mate`]: Genome::mate
/// [`distance`]: Genome::distance
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Genome {
    nodes: Vec<Node>,
    node_index: HashMap<NodeId, usize, RandomState>,
    genes: Vec<Gene>,
    endpoints: HashSet<(NodeId, NodeId), RandomState>,
    input_size: usize,
    output_size: usize,
    fitness: f32,
}

impl Genome {
    /// Creates a bare genome with the given number of input
    /// and output nodes and no genes.
    ///
    /// Input nodes take ids `0..input_size` and output nodes
    /// `input_size..input_size + output_size`. Both use the
    /// identity activation; hidden nodes added later use the
    /// steepened logistic.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::{Genome, NodeRole};
    ///
    /// let genome = Genome::new(3, 2);
    ///
    /// assert_eq!(genome.nodes().count(), 3 + 2);
    /// assert_eq!(genome.nodes().filter(|n| n.role() == NodeRole::Input).count(), 3);
    /// assert_eq!(genome.nodes().filter(|n| n.role() == NodeRole::Output).count(), 2);
    /// assert_eq!(genome.genes().count(), 0);
    /// ```
    pub fn new(input_size: usize, output_size: usize) -> Genome {
        let mut genome = Genome {
            nodes: Vec::new(),
            node_index: HashMap::default(),
            genes: Vec::new(),
            endpoints: HashSet::default(),
            input_size,
            output_size,
            fitness: 0.0,
        };
        genome.reset(input_size, output_size);
        genome
    }

    /// Discards all genes and hidden nodes, leaving a bare
    /// skeleton with the given number of inputs and outputs.
    /// Fitness is cleared.
    pub fn reset(&mut self, input_size: usize, output_size: usize) {
        self.nodes.clear();
        self.node_index.clear();
        self.genes.clear();
        self.endpoints.clear();
        self.input_size = input_size;
        self.output_size = output_size;
        self.fitness = 0.0;

        for i in 0..input_size {
            self.insert_node(Node::new(i, NodeRole::Input, Activation::Identity));
        }
        for o in 0..output_size {
            self.insert_node(Node::new(
                input_size + o,
                NodeRole::Output,
                Activation::Identity,
            ));
        }
    }

    /// Fully connects a bare genome, adding one gene per
    /// (input, output) pair with a fresh random weight.
    ///
    /// Innovation numbers are taken from `history` in
    /// input-major order, so every genome initialized through
    /// the same history shares the innovations
    /// `0..input_size × output_size`.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::{Genome, History};
    /// use nevo::Params;
    ///
    /// let params = Params {
    ///     weight_bound: 3.0,
    ///     ..Params::zero()
    /// };
    /// let mut history = History::new(3, 2);
    ///
    /// let mut genome = Genome::new(3, 2);
    /// genome.initialize(&mut history, &params);
    ///
    /// assert_eq!(genome.genes().count(), 3 * 2);
    /// assert!(genome.genes().all(|g| g.weight().abs() <= 3.0));
    /// assert!(genome.genes().all(|g| (0..3 * 2).contains(&g.innovation())));
    /// ```
    pub fn initialize(&mut self, history: &mut History, params: &Params) {
        debug_assert!(self.genes.is_empty());
        for i in 0..self.input_size {
            for o in 0..self.output_size {
                let target = self.input_size + o;
                let innovation = history.gene_innovation(i, target);
                self.insert_gene(Gene::new(innovation, i, target, Gene::random_weight(params)));
            }
        }
    }

    /// Adds a new gene to the genome.
    /// Returns a reference to the new gene.
    ///
    /// # Errors
    /// This function returns an error if a gene with the same
    /// innovation number or the same endpoints already exists,
    /// if either endpoint does not correspond to a node present
    /// in the genome, or if the target is an input node.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::Genome;
    ///
    /// let mut genome = Genome::new(3, 2);
    ///
    /// let gene = genome.add_gene(42, 2, 4, 2.5).unwrap();
    /// assert_eq!(gene.innovation(), 42);
    /// assert_eq!(gene.source(), 2);
    /// assert_eq!(gene.target(), 4);
    /// assert_eq!(gene.weight(), 2.5);
    ///
    /// // A cycle (43 goes 3 -> 4, 44 goes 4 -> 3)...
    /// genome.add_gene(43, 3, 4, -3.0).unwrap();
    /// genome.add_gene(44, 4, 3, 1.0).unwrap();
    /// // ...and a self-loop are all legal.
    /// genome.add_gene(45, 4, 4, -1.0).unwrap();
    ///
    /// // Duplicate endpoints are not.
    /// assert!(genome.add_gene(46, 2, 4, 0.5).is_err());
    /// ```
    pub fn add_gene(
        &mut self,
        innovation: Innovation,
        source: NodeId,
        target: NodeId,
        weight: f32,
    ) -> Result<&Gene, impl Error> {
        if let Err(error) = self.check_gene_viability(innovation, source, target) {
            return Err(error);
        }
        Ok(&*self.insert_gene(Gene::new(innovation, source, target, weight)))
    }

    /// Checks whether a gene is a duplicate or is
    /// invalid for the genome.
    fn check_gene_viability(
        &self,
        innovation: Innovation,
        source: NodeId,
        target: NodeId,
    ) -> Result<(), GeneValidityError> {
        use GeneValidityError::*;
        if self.gene(innovation).is_some() {
            Err(DuplicateInnovation(innovation))
        } else if !(self.node_index.contains_key(&source) && self.node_index.contains_key(&target))
        {
            Err(NonexistentEndpoints(source, target))
        } else if let Some(shadowed) = self.genes.iter().find(|g| g.endpoints() == (source, target))
        {
            Err(DuplicateEndpoints(shadowed.innovation(), (source, target)))
        } else if self.node(target).map(Node::role) == Some(NodeRole::Input) {
            Err(InputTarget(target))
        } else {
            Ok(())
        }
    }

    /// Inserts a gene at its sorted position. Assumes the gene
    /// has been validated or is correct by construction.
    fn insert_gene(&mut self, gene: Gene) -> &mut Gene {
        self.endpoints.insert(gene.endpoints());
        // Fresh innovations usually sort last, so search from the back.
        let position = self
            .genes
            .iter()
            .rposition(|g| g.innovation() < gene.innovation())
            .map_or(0, |p| p + 1);
        self.genes.insert(position, gene);
        &mut self.genes[position]
    }

    /// Adds a new hidden node to the genome.
    /// Returns a reference to the new node.
    ///
    /// # Errors
    /// This function returns an error if a node with the
    /// same id already exists in the genome.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::{Activation, Genome, NodeRole};
    ///
    /// let mut genome = Genome::new(3, 2);
    ///
    /// let node = genome.add_node(42, Activation::Sigmoid).unwrap();
    /// assert_eq!(node.id(), 42);
    /// assert_eq!(node.role(), NodeRole::Hidden);
    ///
    /// assert!(genome.add_node(42, Activation::Sigmoid).is_err());
    /// ```
    pub fn add_node(&mut self, id: NodeId, activation: Activation) -> Result<&Node, impl Error> {
        if self.node_index.contains_key(&id) {
            return Err(NodeValidityError::DuplicateNodeId(id));
        }
        Ok(&*self.insert_node(Node::new(id, NodeRole::Hidden, activation)))
    }

    fn insert_node(&mut self, node: Node) -> &mut Node {
        let index = self.nodes.len();
        self.node_index.insert(node.id(), index);
        self.nodes.push(node);
        &mut self.nodes[index]
    }

    /// Propagates the current input values through the network.
    ///
    /// The graph may contain cycles, so evaluation is iterative:
    /// each round, every enabled gene whose source node has
    /// activated at least once contributes `value × weight` to
    /// its target's input sum, and every node that received a
    /// contribution then activates. Rounds run until all output
    /// nodes have activated at least twice, or until
    /// [`params.activations`] rounds have passed, whichever
    /// comes first. An output that never activates keeps the
    /// value zero; this is a valid outcome, not an error.
    ///
    /// [`params.activations`]: crate::Params::activations
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::Genome;
    /// use nevo::Params;
    ///
    /// let params = Params {
    ///     activations: 8,
    ///     ..Params::zero()
    /// };
    ///
    /// let mut genome = Genome::new(1, 1);
    /// genome.add_gene(0, 0, 1, 2.0).unwrap();
    ///
    /// genome.set_inputs(&[1.5]);
    /// genome.evaluate(&params);
    ///
    /// assert_eq!(genome.outputs()[0], 3.0);
    /// ```
    pub fn evaluate(&mut self, params: &Params) {
        for node in &mut self.nodes {
            node.flush();
        }

        // Resolve gene endpoints to arena slots once per evaluation.
        let links: Vec<(usize, usize, f32)> = self
            .genes
            .iter()
            .filter(|g| g.enabled())
            .map(|g| {
                (
                    self.node_index[&g.source()],
                    self.node_index[&g.target()],
                    g.weight(),
                )
            })
            .collect();

        let mut contributed = vec![false; self.nodes.len()];
        for _ in 0..params.activations {
            for flag in &mut contributed {
                *flag = false;
            }
            for node in &mut self.nodes {
                node.clear_sum();
            }

            for &(source, target, weight) in &links {
                if self.nodes[source].activation_count() > 0 {
                    let contribution = self.nodes[source].value() * weight;
                    self.nodes[target].add_to_sum(contribution);
                    contributed[target] = true;
                }
            }

            for (index, node) in self.nodes.iter_mut().enumerate() {
                if contributed[index] {
                    node.activate();
                }
            }

            if self.outputs_settled() {
                break;
            }
        }
    }

    fn outputs_settled(&self) -> bool {
        self.nodes[self.input_size..self.input_size + self.output_size]
            .iter()
            .all(|n| n.activation_count() >= MIN_OUTPUT_ACTIVATIONS)
    }

    /// Writes the given values into the genome's input nodes,
    /// in node id order. Extra values are ignored.
    pub fn set_inputs(&mut self, values: &[f32]) {
        for (node, &value) in self.nodes[..self.input_size].iter_mut().zip(values) {
            node.set_value(value);
        }
    }

    /// Returns the current values of the genome's output
    /// nodes, in node id order.
    pub fn outputs(&self) -> Vec<f32> {
        self.nodes[self.input_size..self.input_size + self.output_size]
            .iter()
            .map(Node::value)
            .collect()
    }

    /// Induces a _weight mutation_ in the genome: each enabled
    /// gene's weight is replaced by a fresh random value with
    /// probability [`weight_reset_chance`], or otherwise nudged
    /// with probability [`weight_nudge_chance`].
    ///
    /// [`weight_reset_chance`]: crate::Params::weight_reset_chance
    /// [`weight_nudge_chance`]: crate::Params::weight_nudge_chance
    pub fn mutate_weights(&mut self, params: &Params) {
        let mut rng = rand::thread_rng();
        for gene in self.genes.iter_mut().filter(|g| g.enabled()) {
            if rng.gen::<f32>() < params.weight_reset_chance {
                gene.randomize_weight(params);
            } else if rng.gen::<f32>() < params.weight_nudge_chance {
                gene.nudge_weight(params);
            }
        }
    }

    /// Induces a _node mutation_ in the genome: a randomly
    /// chosen enabled gene is disabled and replaced by a new
    /// hidden node and two new genes, the incoming one with
    /// weight 1 and the outgoing one with the split gene's
    /// weight.
    ///
    /// If successful, returns the triplet
    /// (_incoming gene_, _new node_, _outgoing gene_).
    ///
    /// Returns `None`, leaving the genome unchanged, if no
    /// enabled gene is found within [`params.timeout`]
    /// attempts.
    ///
    /// [`params.timeout`]: crate::Params::timeout
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::{Genome, History};
    /// use nevo::Params;
    ///
    /// let params = Params {
    ///     timeout: 5,
    ///     ..Params::zero()
    /// };
    /// let mut history = History::new(1, 1);
    ///
    /// let mut genome = Genome::new(1, 1);
    /// genome.initialize(&mut history, &params);
    /// let split_weight = genome.genes().next().unwrap().weight();
    ///
    /// let (incoming, node, outgoing) =
    ///     genome.mutate_add_node(&mut history, &params).unwrap();
    ///
    /// assert_eq!(incoming.target(), node.id());
    /// assert_eq!(incoming.weight(), 1.0);
    /// assert_eq!(outgoing.source(), node.id());
    /// assert_eq!(outgoing.weight(), split_weight);
    ///
    /// assert_eq!(genome.genes().count(), 3);
    /// assert_eq!(genome.nodes().count(), 3);
    /// ```
    pub fn mutate_add_node(
        &mut self,
        history: &mut History,
        params: &Params,
    ) -> Option<(&Gene, &Node, &Gene)> {
        let mut rng = rand::thread_rng();
        let split_index = (0..params.timeout)
            .filter_map(|_| (0..self.genes.len()).choose(&mut rng))
            .find(|&index| self.genes[index].enabled())?;

        let innovation = self.genes[split_index].innovation();
        let (source, target) = self.genes[split_index].endpoints();
        let weight = self.genes[split_index].weight();

        let split = history.node_innovation(innovation);
        // Minted node ids are fresh within a generation: a genome
        // splits at most once before the next history clear, and
        // the id counter never resets.
        debug_assert!(!self.node_index.contains_key(&split.node));

        self.genes[split_index].set_enabled(false);
        self.insert_node(Node::new(split.node, NodeRole::Hidden, Activation::Sigmoid));
        self.insert_gene(Gene::new(split.incoming, source, split.node, 1.0));
        self.insert_gene(Gene::new(split.outgoing, split.node, target, weight));

        match (
            self.gene(split.incoming),
            self.node(split.node),
            self.gene(split.outgoing),
        ) {
            (Some(incoming), Some(node), Some(outgoing)) => Some((incoming, node, outgoing)),
            _ => None,
        }
    }

    /// Induces a _gene mutation_ in the genome: a new gene
    /// with a fresh random weight is created between a random
    /// source node and a random non-input target node.
    /// Self-loops and cycles are legal.
    ///
    /// If successful, returns the new gene.
    ///
    /// Returns `None`, leaving the genome unchanged, if every
    /// pair picked within [`params.timeout`] attempts is
    /// already connected.
    ///
    /// [`params.timeout`]: crate::Params::timeout
    pub fn mutate_add_gene(&mut self, history: &mut History, params: &Params) -> Option<&Gene> {
        if self.nodes.len() == self.input_size {
            return None;
        }

        let mut rng = rand::thread_rng();
        let (source, target) = (0..params.timeout)
            .map(|_| {
                let source = self.nodes[rng.gen_range(0..self.nodes.len())].id();
                let target = self.nodes[rng.gen_range(self.input_size..self.nodes.len())].id();
                (source, target)
            })
            .find(|pair| !self.endpoints.contains(pair))?;

        let innovation = history.gene_innovation(source, target);
        let gene = self.insert_gene(Gene::new(
            innovation,
            source,
            target,
            Gene::random_weight(params),
        ));
        Some(&*gene)
    }

    /// Flips the enabled flag on `n` distinct randomly
    /// chosen genes. If the genome has fewer than `n`
    /// genes, all genes are flipped.
    pub fn mutate_toggle_enable(&mut self, n: usize) {
        let mut rng = rand::thread_rng();
        for index in (0..self.genes.len()).choose_multiple(&mut rng, n) {
            let gene = &mut self.genes[index];
            gene.set_enabled(!gene.enabled());
        }
    }

    /// Combines two parent genomes into a _child_ genome by
    /// aligning their gene lists on innovation numbers.
    ///
    /// Genes matching in both parents inherit a blended weight:
    /// the average of both parents' with probability
    /// [`mate_by_averaging_chance`] (decided once per mating),
    /// or one parent's at random per gene. A matching gene is
    /// enabled if both parents' copies are; if exactly one is,
    /// it stays disabled with probability
    /// [`disable_inheritance_chance`]; if neither is, it stays
    /// disabled. Genes present in only one parent are inherited
    /// only from the fitter parent (ties broken by a coin flip,
    /// decided once per mating), along with any node the child
    /// is missing.
    ///
    /// The child's fitness is the parents' mean. Both parents
    /// are assumed to share input and output sizes.
    ///
    /// [`mate_by_averaging_chance`]: crate::Params::mate_by_averaging_chance
    /// [`disable_inheritance_chance`]: crate::Params::disable_inheritance_chance
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::{Genome, History};
    /// use nevo::Params;
    ///
    /// let params = Params {
    ///     weight_bound: 1.0,
    ///     ..Params::zero()
    /// };
    /// let mut history = History::new(2, 1);
    ///
    /// let mut parent1 = Genome::new(2, 1);
    /// let mut parent2 = Genome::new(2, 1);
    /// parent1.initialize(&mut history, &params);
    /// parent2.initialize(&mut history, &params);
    ///
    /// let child = Genome::mate(&parent1, &parent2, &params);
    ///
    /// // Every child gene comes from at least one parent.
    /// assert!(child.genes().all(|g| {
    ///     parent1.gene(g.innovation()).is_some() || parent2.gene(g.innovation()).is_some()
    /// }));
    /// ```
    pub fn mate(parent1: &Genome, parent2: &Genome, params: &Params) -> Genome {
        let mut rng = rand::thread_rng();

        let parent1_fitter = if parent1.fitness == parent2.fitness {
            rng.gen::<bool>()
        } else {
            parent1.fitness > parent2.fitness
        };
        let average_weights = rng.gen::<f32>() < params.mate_by_averaging_chance;

        let mut child = Genome::new(parent1.input_size, parent1.output_size);
        child.fitness = (parent1.fitness + parent2.fitness) / 2.0;

        let mut genes1 = parent1.genes.as_slice();
        let mut genes2 = parent2.genes.as_slice();
        loop {
            match (genes1.split_first(), genes2.split_first()) {
                (Some((g1, rest1)), Some((g2, rest2)))
                    if g1.innovation() == g2.innovation() =>
                {
                    let weight = if average_weights {
                        (g1.weight() + g2.weight()) / 2.0
                    } else if rng.gen::<bool>() {
                        g1.weight()
                    } else {
                        g2.weight()
                    };
                    let enabled = if g1.enabled() && g2.enabled() {
                        true
                    } else if g1.enabled() || g2.enabled() {
                        rng.gen::<f32>() >= params.disable_inheritance_chance
                    } else {
                        false
                    };
                    child.inherit_gene(g1, weight, enabled);
                    genes1 = rest1;
                    genes2 = rest2;
                }
                (Some((g1, rest1)), Some((g2, rest2))) => {
                    if g1.innovation() < g2.innovation() {
                        if parent1_fitter {
                            child.inherit_gene(g1, g1.weight(), g1.enabled());
                        }
                        genes1 = rest1;
                    } else {
                        if !parent1_fitter {
                            child.inherit_gene(g2, g2.weight(), g2.enabled());
                        }
                        genes2 = rest2;
                    }
                }
                (Some((g1, rest1)), None) => {
                    if parent1_fitter {
                        child.inherit_gene(g1, g1.weight(), g1.enabled());
                    }
                    genes1 = rest1;
                }
                (None, Some((g2, rest2))) => {
                    if !parent1_fitter {
                        child.inherit_gene(g2, g2.weight(), g2.enabled());
                    }
                    genes2 = rest2;
                }
                (None, None) => break,
            }
        }

        child
    }

    /// Copies a parent gene into the child, creating any
    /// endpoint node the child is missing. Genes whose
    /// endpoints are already connected are dropped.
    fn inherit_gene(&mut self, gene: &Gene, weight: f32, enabled: bool) {
        let (source, target) = gene.endpoints();
        if self.endpoints.contains(&(source, target)) {
            return;
        }
        self.resolve_node(source);
        self.resolve_node(target);

        let mut inherited = Gene::new(gene.innovation(), source, target, weight);
        inherited.set_enabled(enabled);
        self.insert_gene(inherited);
    }

    /// Creates a hidden node with the given id if the genome
    /// has none. Ids below `input_size + output_size` always
    /// resolve to the skeleton.
    fn resolve_node(&mut self, id: NodeId) {
        if !self.node_index.contains_key(&id) {
            self.insert_node(Node::new(id, NodeRole::Hidden, Activation::Sigmoid));
        }
    }

    /// Calculates the _genetic distance_ between two genomes.
    ///
    /// Both gene lists are aligned on innovation numbers; the
    /// distance is the fraction of alignment positions where
    /// only one genome has a gene, plus [`weight_power`] times
    /// the root mean square weight difference over matching
    /// positions. Genes present in only one genome contribute
    /// the same miss regardless of where they fall in the
    /// alignment.
    ///
    /// The metric is symmetric, and zero for identical (or two
    /// geneless) genomes.
    ///
    /// [`weight_power`]: crate::Params::weight_power
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::Genome;
    /// use nevo::Params;
    ///
    /// let params = Params {
    ///     weight_power: 0.5,
    ///     ..Params::zero()
    /// };
    ///
    /// let mut genome1 = Genome::new(2, 1);
    /// let mut genome2 = Genome::new(2, 1);
    ///
    /// // A matching gene with a weight difference of 2.0...
    /// genome1.add_gene(0, 0, 2, 1.0).unwrap();
    /// genome2.add_gene(0, 0, 2, -1.0).unwrap();
    /// // ...and a gene only genome1 has.
    /// genome1.add_gene(1, 1, 2, 3.0).unwrap();
    ///
    /// assert_eq!(
    ///     Genome::distance(&genome1, &genome2, &params),
    ///     1.0 / 2.0 + 0.5 * (4.0_f32 / 1.0).sqrt()
    /// );
    /// assert_eq!(Genome::distance(&genome1, &genome1, &params), 0.0);
    /// ```
    pub fn distance(first: &Genome, second: &Genome, params: &Params) -> f32 {
        let mut matches = 0usize;
        let mut misses = 0usize;
        let mut weight_diff_sq = 0.0_f32;

        let mut genes1 = first.genes.as_slice();
        let mut genes2 = second.genes.as_slice();
        loop {
            match (genes1.split_first(), genes2.split_first()) {
                (Some((g1, rest1)), Some((g2, rest2)))
                    if g1.innovation() == g2.innovation() =>
                {
                    matches += 1;
                    weight_diff_sq += (g1.weight() - g2.weight()).powi(2);
                    genes1 = rest1;
                    genes2 = rest2;
                }
                (Some((g1, rest1)), Some((g2, rest2))) => {
                    misses += 1;
                    if g1.innovation() < g2.innovation() {
                        genes1 = rest1;
                    } else {
                        genes2 = rest2;
                    }
                }
                (Some(_), None) => {
                    misses += genes1.len();
                    break;
                }
                (None, Some(_)) => {
                    misses += genes2.len();
                    break;
                }
                (None, None) => break,
            }
        }

        let total_positions = matches + misses;
        if total_positions == 0 {
            return 0.0;
        }

        let mut distance = misses as f32 / total_positions as f32;
        if matches > 0 {
            distance += params.weight_power * (weight_diff_sq / matches as f32).sqrt();
        }
        distance
    }

    /// Returns an iterator over the genome's genes, in
    /// ascending innovation order.
    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.genes.iter()
    }

    /// Returns an iterator over the genome's nodes: inputs
    /// first, then outputs, then hidden nodes in insertion
    /// order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Looks up a gene by innovation number.
    pub fn gene(&self, innovation: Innovation) -> Option<&Gene> {
        self.genes
            .binary_search_by_key(&innovation, |g| g.innovation())
            .ok()
            .map(|index| &self.genes[index])
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|&index| &self.nodes[index])
    }

    /// Returns the number of input nodes.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Returns the number of output nodes.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Sets the genome's fitness to the value passed.
    ///
    /// Any value is accepted here; NaN and negative values
    /// are coerced to zero during selection.
    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Returns the genome's current fitness.
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        nodes.sort_unstable_by_key(|n| n.id());
        f.debug_struct("Genome")
            .field("Genes", &self.genes)
            .field("Nodes", &nodes)
            .field("Fitness", &self.fitness)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params() -> Params {
        Params {
            activations: 8,
            timeout: 20,
            weight_bound: 3.0,
            weight_mutation_power: 1.0,
            ..Params::zero()
        }
    }

    #[test]
    fn new_skeleton() {
        for input_size in 1..6 {
            for output_size in 1..6 {
                let genome = Genome::new(input_size, output_size);
                assert_eq!(genome.nodes.len(), input_size + output_size);
                assert_eq!(genome.genes.len(), 0);
                for (id, node) in genome.nodes().enumerate() {
                    assert_eq!(node.id(), id);
                    let expected = if id < input_size {
                        NodeRole::Input
                    } else {
                        NodeRole::Output
                    };
                    assert_eq!(node.role(), expected);
                }
            }
        }
    }

    #[test]
    fn initialize_fully_connects() {
        let params = test_params();
        for input_size in 1..6 {
            for output_size in 1..6 {
                let mut history = History::new(input_size, output_size);
                let mut genome = Genome::new(input_size, output_size);
                genome.initialize(&mut history, &params);

                assert_eq!(genome.genes.len(), input_size * output_size);
                for gene in genome.genes() {
                    assert!(gene.enabled());
                    assert!(gene.weight().abs() <= params.weight_bound);
                    assert_eq!(
                        gene.innovation(),
                        gene.source() * output_size + (gene.target() - input_size),
                    );
                }
            }
        }
    }

    #[test]
    fn initialize_shares_innovations() {
        let params = test_params();
        let mut history = History::new(3, 2);

        let mut genome1 = Genome::new(3, 2);
        let mut genome2 = Genome::new(3, 2);
        genome1.initialize(&mut history, &params);
        genome2.initialize(&mut history, &params);

        let innovations1: Vec<_> = genome1.genes().map(Gene::innovation).collect();
        let innovations2: Vec<_> = genome2.genes().map(Gene::innovation).collect();
        assert_eq!(innovations1, innovations2);
        assert_eq!(history.innovation_count(), 3 * 2);
    }

    #[test]
    fn add_gene_valid() {
        const INNOVATION: Innovation = 631;
        const SOURCE: NodeId = 0;
        const TARGET: NodeId = 1;
        const WEIGHT: f32 = 3.0;

        let mut genome = Genome::new(1, 1);
        let gene = match genome.add_gene(INNOVATION, SOURCE, TARGET, WEIGHT) {
            Ok(gene) => gene.clone(),
            Err(e) => panic!("gene insertion failed: {}", e),
        };

        assert_eq!(gene.innovation(), INNOVATION);
        assert_eq!(gene.source(), SOURCE);
        assert_eq!(gene.target(), TARGET);
        assert_eq!(gene.weight(), WEIGHT);
        assert_eq!(genome.genes.len(), 1);
        assert_eq!(genome.gene(INNOVATION), Some(&gene));
    }

    #[test]
    fn add_gene_duplicate_innovation() {
        let mut genome = Genome::new(2, 1);
        genome.add_gene(0, 0, 2, 1.0).ok();
        if genome.add_gene(0, 1, 2, 1.0).is_ok() {
            panic!("duplicate innovation should return an error");
        }
        assert_eq!(genome.genes.len(), 1);
    }

    #[test]
    fn add_gene_duplicate_endpoints() {
        let mut genome = Genome::new(2, 1);
        genome.add_gene(0, 0, 2, 1.0).ok();
        if genome.add_gene(1, 0, 2, -1.0).is_ok() {
            panic!("duplicate endpoints should return an error");
        }
    }

    #[test]
    fn add_gene_nonexistent_endpoints() {
        let mut genome = Genome::new(1, 1);
        if genome.add_gene(0, 0, 500, 1.0).is_ok() {
            panic!("nonexistent target should return an error");
        }
        if genome.add_gene(0, 500, 1, 1.0).is_ok() {
            panic!("nonexistent source should return an error");
        }
    }

    #[test]
    fn add_gene_input_target() {
        let mut genome = Genome::new(1, 1);
        if genome.add_gene(0, 1, 0, 1.0).is_ok() {
            panic!("input target should return an error");
        }
    }

    #[test]
    fn genes_stay_sorted() {
        let mut genome = Genome::new(2, 2);
        genome.add_gene(90, 0, 2, 1.0).ok();
        genome.add_gene(7, 0, 3, 1.0).ok();
        genome.add_gene(55, 1, 2, 1.0).ok();
        genome.add_gene(3, 1, 3, 1.0).ok();

        let innovations: Vec<_> = genome.genes().map(Gene::innovation).collect();
        assert_eq!(innovations, vec![3, 7, 55, 90]);
    }

    #[test]
    fn evaluate_identity_chain() {
        let params = test_params();
        let mut genome = Genome::new(1, 1);
        genome.add_gene(0, 0, 1, 2.0).ok();

        genome.set_inputs(&[1.5]);
        genome.evaluate(&params);
        assert_eq!(genome.outputs(), vec![3.0]);

        // Re-evaluation with new inputs starts from scratch.
        genome.set_inputs(&[-1.0]);
        genome.evaluate(&params);
        assert_eq!(genome.outputs(), vec![-2.0]);
    }

    #[test]
    fn evaluate_hidden_sigmoid() {
        let params = test_params();
        let mut genome = Genome::new(1, 1);
        genome.add_node(2, Activation::Sigmoid).ok();
        genome.add_gene(0, 0, 2, 1.0).ok();
        genome.add_gene(1, 2, 1, 1.0).ok();

        genome.set_inputs(&[0.0]);
        genome.evaluate(&params);

        // sigmoid(0) = 0.5, forwarded unchanged by the identity output.
        assert_eq!(genome.outputs(), vec![0.5]);
    }

    #[test]
    fn evaluate_skips_disabled_genes() {
        let params = test_params();
        let mut genome = Genome::new(1, 1);
        genome.add_gene(0, 0, 1, 2.0).ok();
        genome.mutate_toggle_enable(1);

        genome.set_inputs(&[1.0]);
        genome.evaluate(&params);
        assert_eq!(genome.outputs(), vec![0.0]);
    }

    #[test]
    fn evaluate_geneless_terminates() {
        let params = test_params();
        let mut genome = Genome::new(2, 2);
        genome.set_inputs(&[1.0, 1.0]);
        genome.evaluate(&params);
        assert_eq!(genome.outputs(), vec![0.0, 0.0]);
    }

    #[test]
    fn evaluate_self_loop_terminates() {
        let params = test_params();
        let mut genome = Genome::new(1, 1);
        genome.add_gene(0, 0, 1, 1.0).ok();
        genome.add_gene(1, 1, 1, 1.0).ok();

        genome.set_inputs(&[1.0]);
        genome.evaluate(&params);

        // Round one: the input contributes 1.0. Round two: the
        // self-loop adds the output's previous value on top.
        assert_eq!(genome.outputs(), vec![2.0]);
    }

    #[test]
    fn evaluate_zero_rounds_leaves_outputs_off() {
        let params = Params {
            activations: 0,
            ..test_params()
        };
        let mut genome = Genome::new(1, 1);
        genome.add_gene(0, 0, 1, 1.0).ok();
        genome.set_inputs(&[1.0]);
        genome.evaluate(&params);
        assert_eq!(genome.outputs(), vec![0.0]);
    }

    /// It is possible this test will fail due to the new
    /// weight returned by the rng being identical to the
    /// previous one, but the chances of this are minimal.
    #[test]
    fn mutate_weights_reset() {
        let params = Params {
            weight_reset_chance: 1.0,
            ..test_params()
        };
        let mut history = History::new(1, 1);
        let mut genome = Genome::new(1, 1);
        genome.initialize(&mut history, &params);
        let initial_weight = genome.genes[0].weight();

        genome.mutate_weights(&params);
        assert_ne!(genome.genes[0].weight(), initial_weight);
        assert!(genome.genes[0].weight().abs() <= params.weight_bound);
    }

    /// It is possible this test will fail due to the nudge
    /// being exactly zero, but the chances of this are minimal.
    #[test]
    fn mutate_weights_nudge() {
        let params = Params {
            weight_reset_chance: 0.0,
            weight_nudge_chance: 1.0,
            ..test_params()
        };
        let mut history = History::new(1, 1);
        let mut genome = Genome::new(1, 1);
        genome.initialize(&mut history, &params);
        let initial_weight = genome.genes[0].weight();

        genome.mutate_weights(&params);
        let new_weight = genome.genes[0].weight();
        assert_ne!(new_weight, initial_weight);
        assert!((new_weight - initial_weight).abs() <= params.weight_mutation_power);
        assert!(new_weight.abs() <= params.weight_bound);
    }

    #[test]
    fn mutate_weights_no_chances() {
        let params = Params {
            weight_reset_chance: 0.0,
            weight_nudge_chance: 0.0,
            ..test_params()
        };
        let mut history = History::new(1, 1);
        let mut genome = Genome::new(1, 1);
        genome.initialize(&mut history, &params);
        let initial_weight = genome.genes[0].weight();

        genome.mutate_weights(&params);
        assert_eq!(genome.genes[0].weight(), initial_weight);
    }

    #[test]
    fn mutate_weights_skips_disabled() {
        let params = Params {
            weight_reset_chance: 1.0,
            weight_nudge_chance: 1.0,
            ..test_params()
        };
        let mut genome = Genome::new(1, 1);
        genome.add_gene(0, 0, 1, 2.0).ok();
        genome.mutate_toggle_enable(1);

        genome.mutate_weights(&params);
        assert_eq!(genome.genes[0].weight(), 2.0);
    }

    #[test]
    fn mutate_add_node_splits_gene() {
        let params = test_params();
        let mut history = History::new(2, 1);
        let mut genome = Genome::new(2, 1);
        genome.initialize(&mut history, &params);

        let split = genome.mutate_add_node(&mut history, &params);
        assert!(split.is_some());

        assert_eq!(genome.genes.len(), 4);
        assert_eq!(genome.nodes.len(), 4);
        assert_eq!(genome.genes().filter(|g| !g.enabled()).count(), 1);

        let disabled = genome.genes().find(|g| !g.enabled()).cloned();
        let disabled = disabled.as_ref();
        let new_node = genome.node(3);
        assert_eq!(new_node.map(Node::role), Some(NodeRole::Hidden));

        // The split gene's endpoints are bridged by the new node.
        let incoming = genome.gene(2);
        let outgoing = genome.gene(3);
        assert_eq!(incoming.map(Gene::source), disabled.map(|g| g.source()));
        assert_eq!(incoming.map(Gene::target), Some(3));
        assert_eq!(incoming.map(Gene::weight), Some(1.0));
        assert_eq!(outgoing.map(Gene::source), Some(3));
        assert_eq!(outgoing.map(Gene::target), disabled.map(|g| g.target()));
        assert_eq!(outgoing.map(Gene::weight), disabled.map(|g| g.weight()));
    }

    #[test]
    fn mutate_add_node_all_disabled() {
        let params = test_params();
        let mut history = History::new(1, 1);
        let mut genome = Genome::new(1, 1);
        genome.initialize(&mut history, &params);
        genome.mutate_toggle_enable(1);

        assert!(genome.mutate_add_node(&mut history, &params).is_none());
        assert_eq!(genome.genes.len(), 1);
        assert_eq!(genome.nodes.len(), 2);
    }

    #[test]
    fn mutate_add_node_empty_genome() {
        let params = test_params();
        let mut history = History::new(1, 1);
        let mut genome = Genome::new(1, 1);
        assert!(genome.mutate_add_node(&mut history, &params).is_none());
    }

    /// It is possible this test will fail due to every attempt
    /// picking the already-connected pair, but the chances of
    /// this are minimal with 20 attempts over two candidates.
    #[test]
    fn mutate_add_gene_connects_new_pair() {
        let params = test_params();
        let mut history = History::new(1, 1);
        let mut genome = Genome::new(1, 1);
        genome.initialize(&mut history, &params);

        let added = genome.mutate_add_gene(&mut history, &params).cloned();
        let added = match added {
            Some(gene) => gene,
            None => panic!("no viable pair found"),
        };

        // The only unconnected pair is the output's self-loop.
        assert_eq!(added.endpoints(), (1, 1));
        assert_eq!(added.innovation(), 1);
        assert_eq!(genome.genes.len(), 2);
    }

    #[test]
    fn mutate_add_gene_fully_connected() {
        let params = test_params();
        let mut history = History::new(1, 1);
        let mut genome = Genome::new(1, 1);
        genome.initialize(&mut history, &params);
        genome.add_gene(1, 1, 1, 1.0).ok();

        assert!(genome.mutate_add_gene(&mut history, &params).is_none());
        assert_eq!(genome.genes.len(), 2);
    }

    #[test]
    fn mutate_toggle_enable_flips() {
        let params = test_params();
        let mut history = History::new(2, 1);
        let mut genome = Genome::new(2, 1);
        genome.initialize(&mut history, &params);

        genome.mutate_toggle_enable(1);
        assert_eq!(genome.genes().filter(|g| !g.enabled()).count(), 1);

        // Flipping more genes than exist flips them all.
        let enabled_before: Vec<_> = genome.genes().map(Gene::enabled).collect();
        genome.mutate_toggle_enable(10);
        let enabled_after: Vec<_> = genome.genes().map(Gene::enabled).collect();
        assert!(enabled_before
            .iter()
            .zip(&enabled_after)
            .all(|(before, after)| before != after));
    }

    #[test]
    fn mate_prefers_fitter_parent_structure() {
        const WEIGHT_A_0: f32 = 1.0;
        const WEIGHT_A_1: f32 = -2.0;
        const WEIGHT_B_0: f32 = 3.0;
        const WEIGHT_B_1: f32 = 0.0;

        let params = Params {
            mate_by_averaging_chance: 1.0,
            ..test_params()
        };

        let mut parent_a = Genome::new(2, 1);
        parent_a.add_gene(0, 0, 2, WEIGHT_A_0).ok();
        parent_a.add_gene(1, 1, 2, WEIGHT_A_1).ok();
        parent_a.add_gene(2, 2, 2, 0.5).ok();
        parent_a.set_fitness(10.0);

        let mut parent_b = Genome::new(2, 1);
        parent_b.add_gene(0, 0, 2, WEIGHT_B_0).ok();
        parent_b.add_gene(1, 1, 2, WEIGHT_B_1).ok();
        parent_b.add_gene(3, 2, 2, -0.5).ok();
        parent_b.set_fitness(5.0);

        let child = Genome::mate(&parent_a, &parent_b, &params);

        // Matching genes are kept with averaged weights; the gene
        // found only in the less fit parent is excluded.
        let innovations: Vec<_> = child.genes().map(Gene::innovation).collect();
        assert_eq!(innovations, vec![0, 1, 2]);
        assert_eq!(
            child.gene(0).map(Gene::weight),
            Some((WEIGHT_A_0 + WEIGHT_B_0) / 2.0)
        );
        assert_eq!(
            child.gene(1).map(Gene::weight),
            Some((WEIGHT_A_1 + WEIGHT_B_1) / 2.0)
        );
        assert_eq!(child.gene(2).map(Gene::weight), Some(0.5));
        assert_eq!(child.fitness(), 7.5);
    }

    #[test]
    fn mate_creates_missing_nodes() {
        let params = Params {
            disable_inheritance_chance: 1.0,
            ..test_params()
        };
        let mut history = History::new(1, 1);

        let mut parent_a = Genome::new(1, 1);
        parent_a.initialize(&mut history, &params);
        parent_a.mutate_add_node(&mut history, &params);
        parent_a.set_fitness(2.0);

        let mut parent_b = Genome::new(1, 1);
        parent_b.initialize(&mut history, &params);
        parent_b.set_fitness(1.0);

        let child = Genome::mate(&parent_a, &parent_b, &params);

        // The child inherits the fitter parent's hidden node.
        assert_eq!(child.nodes().count(), 3);
        assert_eq!(child.node(2).map(Node::role), Some(NodeRole::Hidden));
        let innovations: Vec<_> = child.genes().map(Gene::innovation).collect();
        assert_eq!(innovations, vec![0, 1, 2]);

        // Gene 0 is disabled in the fitter parent, and full
        // disable inheritance keeps it disabled in the child.
        assert_eq!(child.gene(0).map(Gene::enabled), Some(false));
        assert_eq!(child.gene(1).map(Gene::enabled), Some(true));
        assert_eq!(child.gene(2).map(Gene::enabled), Some(true));
    }

    #[test]
    fn mate_keeps_both_disabled_genes_disabled() {
        let params = Params {
            disable_inheritance_chance: 0.0,
            ..test_params()
        };

        let mut parent_a = Genome::new(1, 1);
        parent_a.add_gene(0, 0, 1, 1.0).ok();
        parent_a.mutate_toggle_enable(1);
        let mut parent_b = parent_a.clone();
        parent_b.set_fitness(1.0);

        let child = Genome::mate(&parent_a, &parent_b, &params);
        assert_eq!(child.gene(0).map(Gene::enabled), Some(false));
    }

    #[test]
    fn mate_never_invents_genes() {
        let params = test_params();
        let mut history = History::new(2, 2);

        let mut parent_a = Genome::new(2, 2);
        let mut parent_b = Genome::new(2, 2);
        parent_a.initialize(&mut history, &params);
        parent_b.initialize(&mut history, &params);
        parent_a.mutate_add_node(&mut history, &params);
        parent_b.mutate_add_gene(&mut history, &params);

        for _ in 0..20 {
            let child = Genome::mate(&parent_a, &parent_b, &params);
            for gene in child.genes() {
                assert!(
                    parent_a.gene(gene.innovation()).is_some()
                        || parent_b.gene(gene.innovation()).is_some()
                );
            }
            // Matching genes always survive into the child.
            for gene in parent_a.genes() {
                if parent_b.gene(gene.innovation()).is_some() {
                    assert!(child.gene(gene.innovation()).is_some());
                }
            }
            let innovations: Vec<_> = child.genes().map(Gene::innovation).collect();
            let mut sorted = innovations.clone();
            sorted.sort_unstable();
            assert_eq!(innovations, sorted);
        }
    }

    #[test]
    fn distance_identity_is_zero() {
        let params = Params {
            weight_power: 0.5,
            ..test_params()
        };
        let mut history = History::new(2, 2);
        let mut genome = Genome::new(2, 2);
        genome.initialize(&mut history, &params);

        assert_eq!(Genome::distance(&genome, &genome, &params), 0.0);
    }

    #[test]
    fn distance_geneless_is_zero() {
        let params = test_params();
        let genome1 = Genome::new(1, 1);
        let genome2 = Genome::new(1, 1);
        assert_eq!(Genome::distance(&genome1, &genome2, &params), 0.0);
    }

    #[test]
    fn distance_no_matches() {
        let params = Params {
            weight_power: 0.5,
            ..test_params()
        };
        let mut genome1 = Genome::new(1, 1);
        let mut genome2 = Genome::new(1, 1);
        genome1.add_gene(0, 0, 1, 1.0).ok();
        genome2.add_gene(1, 1, 1, 1.0).ok();

        // All positions miss; no weight term without matches.
        assert_eq!(Genome::distance(&genome1, &genome2, &params), 1.0);
    }

    #[test]
    fn distance_hand_computed() {
        const WEIGHT_POWER: f32 = 0.5;
        let params = Params {
            weight_power: WEIGHT_POWER,
            ..test_params()
        };

        let mut genome1 = Genome::new(2, 1);
        genome1.add_gene(0, 0, 2, 1.0).ok();
        genome1.add_gene(1, 1, 2, 0.0).ok();
        genome1.add_gene(2, 2, 2, 2.0).ok();

        let mut genome2 = Genome::new(2, 1);
        genome2.add_gene(0, 0, 2, -1.0).ok();
        genome2.add_gene(1, 1, 2, 1.0).ok();
        genome2.add_gene(3, 2, 2, 1.0).ok();

        // Matches {0, 1} with squared differences 4 and 1,
        // misses {2, 3}, four alignment positions in total.
        let expected = 2.0 / 4.0 + WEIGHT_POWER * (5.0_f32 / 2.0).sqrt();
        let distance = Genome::distance(&genome1, &genome2, &params);
        assert!((distance - expected).abs() < f32::EPSILON);
    }

    #[test]
    fn distance_is_symmetric() {
        let params = Params {
            weight_power: 0.7,
            ..test_params()
        };
        let mut history = History::new(2, 2);
        let mut genome1 = Genome::new(2, 2);
        let mut genome2 = Genome::new(2, 2);
        genome1.initialize(&mut history, &params);
        genome2.initialize(&mut history, &params);
        genome1.mutate_add_node(&mut history, &params);
        genome2.mutate_add_gene(&mut history, &params);

        assert_eq!(
            Genome::distance(&genome1, &genome2, &params),
            Genome::distance(&genome2, &genome1, &params),
        );
    }

    #[test]
    fn serde_round_trip() -> Result<(), serde_json::Error> {
        let params = test_params();
        let mut history = History::new(2, 1);
        let mut genome = Genome::new(2, 1);
        genome.initialize(&mut history, &params);
        genome.mutate_add_node(&mut history, &params);
        genome.set_fitness(3.25);

        let serialized = serde_json::to_string(&genome)?;
        let deserialized: Genome = serde_json::from_str(&serialized)?;
        assert_eq!(genome, deserialized);
        Ok(())
    }
}
