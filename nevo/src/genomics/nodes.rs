use crate::NodeId;

use serde::{Deserialize, Serialize};

use std::fmt;

/// An Activation represents the nonlinearity
/// applied to a node's input sum when the
/// node activates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Activation {
    // 1 / (1 + exp(-4.9x))
    Sigmoid,
    // x
    Identity,
    // 0   if x < 0
    // x   if x ≥ 0
    ReLU,
    // exp(-x²)
    Gaussian,
    // sin(πx)
    Sinusoidal,
}

impl Activation {
    /// Applies the activation function to the input sum.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::Activation;
    ///
    /// assert_eq!(Activation::Identity.apply(-1.5), -1.5);
    /// assert_eq!(Activation::ReLU.apply(-1.5), 0.0);
    /// assert_eq!(Activation::Sigmoid.apply(0.0), 0.5);
    /// ```
    pub fn apply(self, input_sum: f32) -> f32 {
        match self {
            Activation::Sigmoid => 1.0 / (1.0 + (-4.9 * input_sum).exp()),
            Activation::Identity => input_sum,
            Activation::ReLU => input_sum.max(0.0),
            Activation::Gaussian => (-input_sum.powf(2.0)).exp(),
            Activation::Sinusoidal => (input_sum * std::f32::consts::PI).sin(),
        }
    }
}

/// A NodeRole indicates the function of the
/// node within its genome's network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    /// Input nodes. Always considered activated,
    /// so that their values propagate on the first
    /// evaluation round.
    Input,
    /// Output nodes.
    Output,
    /// Hidden nodes.
    Hidden,
}

/// Nodes are the structural elements of genomes
/// between which genes are created.
///
/// A node carries its activation state (input sum,
/// output value, activation count), which is volatile:
/// it is cleared at the start of each [evaluation].
///
/// [evaluation]: crate::genomics::Genome::evaluate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    role: NodeRole,
    activation: Activation,
    value: f32,
    sum: f32,
    activations: usize,
}

impl Node {
    /// Generates a new node with the passed parameters.
    ///
    /// # Examples
    /// ```
    /// use nevo::genomics::{Activation, Node, NodeRole};
    ///
    /// let node = Node::new(5, NodeRole::Hidden, Activation::Sigmoid);
    ///
    /// assert_eq!(node.id(), 5);
    /// assert_eq!(node.value(), 0.0);
    /// ```
    pub fn new(id: NodeId, role: NodeRole, activation: Activation) -> Node {
        Node {
            id,
            role,
            activation,
            value: 0.0,
            sum: 0.0,
            activations: 0,
        }
    }

    /// Returns the node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the node's role.
    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Returns the node's activation function.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Returns the node's current output value.
    ///
    /// Zero if the node has not activated since the
    /// last evaluation began.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Returns the number of times the node has activated
    /// since the last evaluation began.
    pub fn activation_count(&self) -> usize {
        self.activations
    }

    /// Sets the node's output value directly.
    ///
    /// Meant for writing input nodes between evaluations.
    pub fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    /// Clears all volatile activation state. Input nodes
    /// count as already activated, so their values are
    /// picked up on the first propagation round.
    pub(super) fn flush(&mut self) {
        self.sum = 0.0;
        self.activations = match self.role {
            NodeRole::Input => 1,
            NodeRole::Output | NodeRole::Hidden => {
                self.value = 0.0;
                0
            }
        };
    }

    pub(super) fn clear_sum(&mut self) {
        self.sum = 0.0;
    }

    pub(super) fn add_to_sum(&mut self, contribution: f32) {
        self.sum += contribution;
    }

    /// Passes the accumulated input sum through the node's
    /// activation function and records the activation.
    pub(super) fn activate(&mut self) {
        self.value = self.activation.apply(self.sum);
        self.activations += 1;
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{:?}, {:?}]", self.id, self.role, self.activation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_marks_inputs_activated() {
        let mut input = Node::new(0, NodeRole::Input, Activation::Identity);
        let mut hidden = Node::new(2, NodeRole::Hidden, Activation::Sigmoid);

        input.set_value(0.75);
        hidden.add_to_sum(1.0);
        hidden.activate();

        input.flush();
        hidden.flush();

        assert_eq!(input.activation_count(), 1);
        assert_eq!(input.value(), 0.75);
        assert_eq!(hidden.activation_count(), 0);
        assert_eq!(hidden.value(), 0.0);
    }

    #[test]
    fn activate_applies_nonlinearity_to_sum() {
        let mut node = Node::new(3, NodeRole::Hidden, Activation::ReLU);
        node.add_to_sum(0.5);
        node.add_to_sum(-2.0);
        node.activate();
        assert_eq!(node.value(), 0.0);
        assert_eq!(node.activation_count(), 1);

        node.clear_sum();
        node.add_to_sum(0.25);
        node.activate();
        assert_eq!(node.value(), 0.25);
        assert_eq!(node.activation_count(), 2);
    }
}
