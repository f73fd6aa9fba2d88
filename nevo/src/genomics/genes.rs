use crate::{Innovation, NodeId, Params};

use std::fmt;

use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

/// Genes are the principal components of genomes.
/// Each one represents a directed, weighted connection
/// between two nodes, tagged with the historical marker
/// ([`Innovation`]) of the mutation that created it.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Gene {
    innovation: Innovation,
    source: NodeId,
    target: NodeId,
    weight: f32,
    enabled: bool,
}

impl Gene {
    /// Returns a new _enabled_ gene with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::Gene;
    ///
    /// let gene = Gene::new(42, 3, 9, 2.0);
    /// ```
    pub fn new(innovation: Innovation, source: NodeId, target: NodeId, weight: f32) -> Gene {
        Gene {
            innovation,
            source,
            target,
            weight,
            enabled: true,
        }
    }

    /// Returns a random weight. Uses a uniform distribution
    /// over the range ±`params.weight_bound`.
    pub(super) fn random_weight(params: &Params) -> f32 {
        thread_rng().gen_range(-params.weight_bound..=params.weight_bound)
    }

    /// Randomizes the gene's weight. Uses a uniform
    /// distribution over the range ±[`weight_bound`].
    ///
    /// [`weight_bound`]: crate::Params::weight_bound
    pub fn randomize_weight(&mut self, params: &Params) {
        self.weight = Self::random_weight(params);
    }

    /// Nudges the gene's weight by a random amount. Uses a
    /// uniform distribution over the range ±[`weight_mutation_power`].
    /// If the weight's magnitude would exceed the [`weight_bound`],
    /// the weight is set to the maximum magnitude with the same
    /// sign.
    ///
    /// [`weight_mutation_power`]: crate::Params::weight_mutation_power
    /// [`weight_bound`]: crate::Params::weight_bound
    pub fn nudge_weight(&mut self, params: &Params) {
        self.weight +=
            thread_rng().gen_range(-params.weight_mutation_power..=params.weight_mutation_power);
        self.weight = self.weight.clamp(-params.weight_bound, params.weight_bound);
    }

    /// Returns the gene's innovation number.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::Gene;
    ///
    /// let gene = Gene::new(42, 3, 9, 2.0);
    ///
    /// assert_eq!(gene.innovation(), 42);
    /// ```
    pub fn innovation(&self) -> Innovation {
        self.innovation
    }

    /// Returns the id of the gene's source node.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::Gene;
    ///
    /// let gene = Gene::new(42, 3, 9, 2.0);
    ///
    /// assert_eq!(gene.source(), 3);
    /// ```
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Returns the id of the gene's target node.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::Gene;
    ///
    /// let gene = Gene::new(42, 3, 9, 2.0);
    ///
    /// assert_eq!(gene.target(), 9);
    /// ```
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Returns the gene's weight.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::Gene;
    ///
    /// let gene = Gene::new(42, 3, 9, 2.0);
    ///
    /// assert_eq!(gene.weight(), 2.0);
    /// ```
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Sets the gene's weight.
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    /// Returns whether the gene is enabled. Disabled genes
    /// remain in the genome and keep their historical marker,
    /// but do not contribute during evaluation.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::Gene;
    ///
    /// let gene = Gene::new(42, 3, 9, 2.0);
    ///
    /// assert!(gene.enabled());
    /// ```
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Sets whether the gene is enabled.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::Gene;
    ///
    /// let mut gene = Gene::new(42, 3, 9, 2.0);
    /// gene.set_enabled(false);
    ///
    /// assert!(!gene.enabled());
    /// ```
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns the ids of the gene's source and target nodes.
    pub(super) fn endpoints(&self) -> (NodeId, NodeId) {
        (self.source, self.target)
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}[{}->{}, {:.3}]{}",
            if self.enabled { "" } else { "(" },
            self.innovation,
            self.source,
            self.target,
            self.weight,
            if self.enabled { "" } else { ")" },
        )
    }
}
