use crate::{Innovation, NodeId};

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use std::collections::hash_map::{Entry, HashMap};

/// The record of a node addition: the id of the node
/// created by splitting a gene, and the innovations of
/// the two genes that replace the split gene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSplit {
    /// Id of the new node.
    pub node: NodeId,
    /// Innovation of the gene from the split gene's
    /// source to the new node.
    pub incoming: Innovation,
    /// Innovation of the gene from the new node to
    /// the split gene's target.
    pub outgoing: Innovation,
}

/// A `History` keeps track of gene and node innovations in a
/// population, in order to make sure identical mutations
/// are assigned the same innovation numbers.
///
/// For gene innovations the source and target nodes are used
/// to identify identical mutations, and the corresponding
/// innovation number is recorded.
///
/// For node innovations the split gene is used to identify
/// identical mutations, and the id of the new node and the
/// innovation numbers of the two replacement genes are
/// recorded as a [`NodeSplit`].
///
/// Mutation records only need to stay consistent within a
/// single reproduction round, so the tables are [cleared]
/// once per generation; the innovation and node id counters
/// are never reset.
///
/// [cleared]: History::clear
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct History {
    next_innovation: Innovation,
    next_node_id: NodeId,
    gene_innovations: HashMap<(NodeId, NodeId), Innovation, RandomState>,
    node_innovations: HashMap<Innovation, NodeSplit, RandomState>,
}

impl History {
    /// Creates a new History for genomes with the given
    /// number of inputs and outputs.
    ///
    /// Innovation numbers for all possible initial genes are
    /// pre-allocated: the gene from input `i` to output `o`
    /// is given the innovation number `o + i × output_size`.
    /// Node ids `0..input_size + output_size` are reserved
    /// for the input and output nodes.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::History;
    ///
    /// let history = History::new(2, 1);
    ///
    /// assert_eq!(history.innovation_count(), 2);
    /// assert_eq!(history.node_count(), 3);
    /// ```
    pub fn new(input_size: usize, output_size: usize) -> History {
        let gene_innovations = (0..input_size)
            .flat_map(|i| (0..output_size).map(move |o| (i, o)))
            .map(|(i, o)| ((i, input_size + o), o + i * output_size))
            .collect();
        History {
            next_innovation: input_size * output_size,
            next_node_id: input_size + output_size,
            gene_innovations,
            node_innovations: HashMap::default(),
        }
    }

    /// Returns the innovation number for a gene between the
    /// given nodes, assigning a fresh one if the mutation has
    /// not been recorded since the last [`clear`].
    ///
    /// [`clear`]: History::clear
    pub fn gene_innovation(&mut self, source: NodeId, target: NodeId) -> Innovation {
        match self.gene_innovations.entry((source, target)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let innovation = self.next_innovation;
                entry.insert(innovation);
                self.next_innovation += 1;
                innovation
            }
        }
    }

    /// Returns the [`NodeSplit`] for splitting the gene with
    /// the given innovation number, minting a fresh node id
    /// and two fresh gene innovations if the mutation has not
    /// been recorded since the last [`clear`].
    ///
    /// [`clear`]: History::clear
    pub fn node_innovation(&mut self, split_gene: Innovation) -> NodeSplit {
        match self.node_innovations.entry(split_gene) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let split = NodeSplit {
                    node: self.next_node_id,
                    incoming: self.next_innovation,
                    outgoing: self.next_innovation + 1,
                };
                entry.insert(split);
                self.next_node_id += 1;
                self.next_innovation += 2;
                split
            }
        }
    }

    /// Clears the history's record of mutations, but keeps
    /// its innovation number and node id counts.
    ///
    /// Called once per generation: identical mutations in
    /// different generations are distinct innovations.
    pub fn clear(&mut self) {
        self.gene_innovations.clear();
        self.node_innovations.clear();
    }

    /// Returns the number of gene innovations assigned so far,
    /// including the pre-allocated initial genes.
    pub fn innovation_count(&self) -> usize {
        self.next_innovation
    }

    /// Returns the number of node ids allocated so far,
    /// including the input and output nodes.
    pub fn node_count(&self) -> usize {
        self.next_node_id
    }
}
