//! A population is the complete collection of genomes under
//! evolution. Genomes are grouped into species by genetic
//! distance, and evolved generation by generation using an
//! external fitness function as the source of selective
//! pressure.
pub mod logging;
mod offspring;
mod species;

use crate::genomics::{Genome, History};
use crate::Params;
use offspring::OffspringFactory;
pub use species::{Species, SpeciesID};

use serde::{Deserialize, Serialize};

/// A population of genomes.
///
/// The generational cycle has three phases, driven by the
/// caller: score every genome ([`evaluate_fitness`]), group
/// them into species and allot each species' offspring quota
/// ([`select`]), and breed the next generation ([`reproduce`]).
///
/// Supports Serde for convenient population saving and loading.
///
/// [`evaluate_fitness`]: Population::evaluate_fitness
/// [`select`]: Population::select
/// [`reproduce`]: Population::reproduce
///
/// # Examples
/// ```
/// use nevo::populations::Population;
/// use nevo::Params;
///
/// let params = Params {
///     population: 50,
///     ..Params::default()
/// };
/// let mut population = Population::new(3, 1, params.clone());
///
/// for _ in 0..10 {
///     population.evaluate_fitness(|genome| {
///         genome.set_inputs(&[1.0, 0.0, 1.0]);
///         genome.evaluate(&params);
///         // Reward outputs close to one.
///         1.0 / (1.0 + (genome.outputs()[0] - 1.0).abs())
///     });
///     let best = population.select().fitness();
///     println!("generation {}: best {}", population.generation(), best);
///     population.reproduce();
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Population {
    genomes: Vec<Genome>,
    species: Vec<Species>,
    history: History,
    params: Params,
    distance_threshold: f32,
    generation: usize,
}

impl Population {
    /// Creates a population of [`params.population`] genomes,
    /// each fully connecting `input_size` inputs to
    /// `output_size` outputs with independent random weights.
    /// All initial genomes share the same innovation numbers
    /// through the population's tracker.
    ///
    /// Species are first assigned by [`select`].
    ///
    /// [`params.population`]: crate::Params::population
    /// [`select`]: Population::select
    pub fn new(input_size: usize, output_size: usize, params: Params) -> Population {
        let mut history = History::new(input_size, output_size);
        let genomes = (0..params.population)
            .map(|_| {
                let mut genome = Genome::new(input_size, output_size);
                genome.initialize(&mut history, &params);
                genome
            })
            .collect();
        Population {
            genomes,
            species: Vec::new(),
            history,
            distance_threshold: params.distance_threshold,
            params,
            generation: 0,
        }
    }

    /// Scores every genome in the population with the passed
    /// evaluator, sequentially.
    ///
    /// The returned fitness may use any caller-defined scale;
    /// NaN and negative values are coerced to zero during
    /// [`select`].
    ///
    /// [`select`]: Population::select
    pub fn evaluate_fitness<E>(&mut self, mut evaluator: E)
    where
        E: FnMut(&mut Genome) -> f32,
    {
        for genome in &mut self.genomes {
            let fitness = evaluator(genome);
            genome.set_fitness(fitness);
        }
    }

    /// Runs the selection phase on the scored population:
    /// groups every genome into a species, refreshes species
    /// statistics, and allots each species' offspring quota
    /// for the coming [`reproduce`] call.
    ///
    /// Returns the population's current best genome.
    ///
    /// In detail: NaN and negative fitness values are coerced
    /// to zero; every genome joins the first species whose
    /// representative lies within the current distance
    /// threshold (or founds a new species); the threshold is
    /// nudged one [`distance_mod`] step toward the
    /// [`species_target`] species count; member lists are
    /// sorted, kill-ratio truncated and averaged; stagnant
    /// species are denied offspring while some other species
    /// holds the population's best genome; finally the
    /// population-wide quota is split proportionally to each
    /// species' share of the total average fitness, with the
    /// integer remainder distributed round-robin in descending
    /// average-fitness order.
    ///
    /// [`reproduce`]: Population::reproduce
    /// [`distance_mod`]: crate::Params::distance_mod
    /// [`species_target`]: crate::Params::species_target
    ///
    /// # Panics
    /// This function will panic if the population is empty.
    pub fn select(&mut self) -> &Genome {
        self.sanitize_fitness();
        self.respeciate();
        self.adapt_distance_threshold();
        for species in &mut self.species {
            species.compute_stats(&self.genomes, &self.params);
        }
        self.allot_offspring();

        let champion = self.champion();
        log::debug!(
            "generation {}: {} species, best fitness {}",
            self.generation,
            self.species.len(),
            champion.fitness()
        );
        champion
    }

    /// Coerces NaN and negative fitness values to zero before
    /// any ranking or averaging uses them.
    fn sanitize_fitness(&mut self) {
        for genome in &mut self.genomes {
            let fitness = genome.fitness();
            if fitness.is_nan() || fitness < 0.0 {
                genome.set_fitness(0.0);
            }
        }
    }

    /// Rebuilds species membership from scratch: every genome
    /// joins the first species (in insertion order) whose
    /// representative is within the current distance threshold,
    /// founding a new species when none is. Species left
    /// without members are dropped.
    fn respeciate(&mut self) {
        for species in &mut self.species {
            species.members.clear();
        }

        let mut born = self
            .species
            .iter()
            .filter(|s| s.id().0 == self.generation)
            .count();
        for (index, genome) in self.genomes.iter().enumerate() {
            let matched = self.species.iter_mut().find(|s| {
                Genome::distance(genome, s.representative(), &self.params)
                    < self.distance_threshold
            });
            match matched {
                Some(species) => species.members.push(index),
                None => {
                    self.species.push(Species::new(
                        SpeciesID(self.generation, born),
                        genome.clone(),
                        index,
                    ));
                    born += 1;
                }
            }
        }

        self.species.retain(|s| s.member_count() > 0);
    }

    /// Nudges the distance threshold one step toward the
    /// target species count. Disabled when [`species_target`]
    /// is zero.
    ///
    /// [`species_target`]: crate::Params::species_target
    fn adapt_distance_threshold(&mut self) {
        if self.params.species_target == 0 {
            return;
        }
        if self.species.len() > self.params.species_target {
            self.distance_threshold += self.params.distance_mod;
        } else if self.species.len() < self.params.species_target {
            self.distance_threshold =
                (self.distance_threshold - self.params.distance_mod).max(self.params.distance_mod);
        }
    }

    /// Splits the population-wide offspring quota across
    /// species proportionally to their share of total average
    /// fitness. Stagnant species contribute nothing unless they
    /// hold the population's best genome; the champion's
    /// species always does, so stagnation alone can never
    /// starve the population.
    fn allot_offspring(&mut self) {
        if self.species.is_empty() {
            return;
        }
        let best_fitness = self.champion().fitness();
        let population = self.params.population;

        let contributions: Vec<f32> = self
            .species
            .iter()
            .map(|s| {
                if s.is_stagnant(&self.params) && s.max_fitness() < best_fitness {
                    0.0
                } else {
                    s.avg_fitness()
                }
            })
            .collect();
        let total: f32 = contributions.iter().sum();

        let mut quotas: Vec<usize> = if total == 0.0 {
            // Degenerate generation (every genome scored zero):
            // split the quota evenly instead of starving everyone.
            vec![population / self.species.len(); self.species.len()]
        } else {
            contributions
                .iter()
                .map(|c| (c / total * population as f32).floor() as usize)
                .collect()
        };

        // Hand out the integer remainder round-robin, best
        // species first.
        let mut order: Vec<usize> = (0..self.species.len())
            .filter(|&i| total == 0.0 || contributions[i] > 0.0)
            .collect();
        order.sort_unstable_by(|&a, &b| {
            self.species[b]
                .avg_fitness()
                .partial_cmp(&self.species[a].avg_fitness())
                .unwrap_or_else(|| panic!("uncomparable fitness value detected"))
        });
        let remainder = population - quotas.iter().sum::<usize>();
        for i in 0..remainder {
            quotas[order[i % order.len()]] += 1;
        }

        for (species, quota) in self.species.iter_mut().zip(quotas) {
            species.offspring = quota;
        }
    }

    /// Replaces the current generation with the offspring
    /// allotted by the last [`select`] call: each species
    /// carries its champion over unchanged and fills the rest
    /// of its quota with children bred from its survivors (see
    /// [`Genome::mate`] and the mutation chances in
    /// [`Params`]). Species keep their statistics and
    /// representative snapshots; member lists are rebuilt by
    /// the next [`select`].
    ///
    /// The innovation tracker is cleared first: historical
    /// markings are only consistent within one reproduction
    /// round.
    ///
    /// Does nothing if no offspring have been allotted.
    ///
    /// [`select`]: Population::select
    pub fn reproduce(&mut self) {
        if self.species.iter().all(|s| s.offspring == 0) {
            return;
        }
        self.history.clear();

        let next_generation = OffspringFactory::new(
            &self.genomes,
            &self.species,
            &mut self.history,
            &self.params,
        )
        .generate_offspring();
        self.genomes = next_generation;

        for species in &mut self.species {
            species.members.clear();
            species.offspring = 0;
        }
        self.generation += 1;
    }

    /// Returns the population's current best genome.
    ///
    /// # Panics
    /// This function will panic if the population is empty.
    pub fn champion(&self) -> &Genome {
        self.genomes
            .iter()
            .max_by(|g1, g2| {
                g1.fitness()
                    .partial_cmp(&g2.fitness())
                    .unwrap_or_else(|| panic!("invalid genome fitnesses detected (NaN)"))
            })
            .expect("empty population has no champion")
    }

    /// Returns an iterator over all current genomes.
    pub fn genomes(&self) -> impl Iterator<Item = &Genome> {
        self.genomes.iter()
    }

    /// Returns an iterator over all current species.
    pub fn species(&self) -> impl Iterator<Item = &Species> {
        self.species.iter()
    }

    /// Returns an iterator over the genomes assigned to a
    /// species by the last [`select`] call.
    ///
    /// [`select`]: Population::select
    pub fn species_members<'a>(
        &'a self,
        species: &'a Species,
    ) -> impl Iterator<Item = &'a Genome> + 'a {
        species.members().map(move |index| &self.genomes[index])
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the population's innovation history.
    pub fn history(&self) -> &History {
        &self.history
    }
}
