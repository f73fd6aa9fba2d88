//! An implementation of NeuroEvolution of Augmenting Topologies,
//! following the 2002 paper: <http://nn.cs.utexas.edu/keyword?stanley:ec02>
//!
//! Genomes double as their own phenotypes: each genome is a
//! directed graph of nodes and weighted genes that can be
//! evaluated in place as a recurrent neural network. Genomes
//! are compared and recombined by innovation number, grouped
//! into species by genetic distance, and evolved under a
//! caller-supplied fitness function. Generational population
//! logging is also supported.
//!
//! This crate grew out of my own experimentation with
//! neuroevolution. Critiques and contributions are welcome.
//!
//! Interfaces and implementations may still change in the
//! future.
//!
//! # Example usage: Evolution of XOR function approximator
//! ```
//! use nevo::genomics::Genome;
//! use nevo::populations::Population;
//! use nevo::Params;
//!
//! // Allowed error margin for neural net answers.
//! const ERROR_MARGIN: f32 = 0.3;
//!
//! fn evaluate_xor(genome: &mut Genome, params: &Params) -> f32 {
//!     let values = [
//!         ([1.0, 0.0, 0.0], 0.0),
//!         ([1.0, 0.0, 1.0], 1.0),
//!         ([1.0, 1.0, 0.0], 1.0),
//!         ([1.0, 1.0, 1.0], 0.0),
//!     ];
//!
//!     let mut errors = [0.0, 0.0, 0.0, 0.0];
//!     for (i, (input, output)) in values.iter().enumerate() {
//!         genome.set_inputs(input);
//!         genome.evaluate(params);
//!         errors[i] = (genome.outputs()[0] - output).abs();
//!         if errors[i] < ERROR_MARGIN {
//!             errors[i] = 0.0;
//!         }
//!     }
//!
//!     (4.0 - errors.iter().copied().sum::<f32>()).powf(2.0)
//! }
//!
//! fn main() {
//!     let params = Params {
//!         population: 150,
//!         mating_chance: 0.75,
//!         ..Params::default()
//!     };
//!
//!     let mut population = Population::new(3, 1, params.clone());
//!     for _ in 0..100 {
//!         population.evaluate_fitness(|genome| evaluate_xor(genome, &params));
//!         if (population.select().fitness() - 16.0).abs() < f32::EPSILON {
//!             println!(
//!                 "Solution found!: {}",
//!                 serde_json::to_string(population.champion()).unwrap()
//!             );
//!             break;
//!         }
//!         population.reproduce();
//!     }
//! }
//! ```

pub mod genomics;
pub mod populations;

mod params;

pub use params::Params;

/// Historical marking of a gene. Genes created by the same
/// mutation during a generation share an innovation number.
pub type Innovation = usize;

/// Identifier of a node within a genome.
pub type NodeId = usize;
