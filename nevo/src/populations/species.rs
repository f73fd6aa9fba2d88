use crate::genomics::Genome;
use crate::Params;

use serde::{Deserialize, Serialize};

/// Species identifier. Specifies the generation in which the
/// species was born, and the count of other species born in
/// the _same generation_ before it (i.e., if it was the third
/// species born in generation 5, it will be species [5, 2]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeciesID(pub usize, pub usize);

/// Species are clusters of reproductively compatible (within a
/// [genetic distance] threshold of a shared representative)
/// genomes. A species owns none of its members: it holds their
/// indices into the population's genome arena, and membership
/// is rebuilt from scratch every generation. The representative
/// is a snapshot of the species' best member from the previous
/// generation.
///
/// A species whose best fitness has not improved for
/// [`dropoff_age`] generations is stagnant, and is denied
/// offspring while some other species holds the population's
/// best genome.
///
/// [genetic distance]: Genome::distance
/// [`dropoff_age`]: crate::Params::dropoff_age
///
/// # Examples
/// ```
/// use nevo::populations::Population;
/// use nevo::Params;
///
/// let params = Params {
///     population: 10,
///     ..Params::default()
/// };
/// let mut population = Population::new(2, 1, params);
///
/// population.evaluate_fitness(|_| 1.0);
/// population.select();
///
/// for species in population.species() {
///     println!(
///         "{:?}: {} members, {} survivors, quota {}",
///         species.id(),
///         species.member_count(),
///         species.survivor_count(),
///         species.offspring(),
///     );
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    id: SpeciesID,
    representative: Genome,
    pub(super) members: Vec<usize>,
    survivor_count: usize,
    avg_fitness: f32,
    max_fitness: f32,
    best_fitness: f32,
    time_since_improvement: usize,
    pub(super) offspring: usize,
}

impl Species {
    /// Creates a new species with the given founding member.
    pub(super) fn new(id: SpeciesID, representative: Genome, member: usize) -> Species {
        Species {
            id,
            representative,
            members: vec![member],
            survivor_count: 0,
            avg_fitness: 0.0,
            max_fitness: 0.0,
            best_fitness: 0.0,
            time_since_improvement: 0,
            offspring: 0,
        }
    }

    /// Refreshes the species' statistics from its members'
    /// fitness: sorts members in descending fitness order,
    /// marks the kill-ratio tail as non-surviving (at least
    /// one member always survives), averages fitness over the
    /// survivors, advances the stagnation clock and snapshots
    /// the best member as the next representative.
    pub(super) fn compute_stats(&mut self, genomes: &[Genome], params: &Params) {
        debug_assert!(!self.members.is_empty());
        self.members.sort_unstable_by(|&a, &b| {
            genomes[b]
                .fitness()
                .partial_cmp(&genomes[a].fitness())
                .unwrap_or_else(|| panic!("uncomparable fitness value detected"))
        });

        let killed = (self.members.len() as f32 * params.kill_ratio).floor() as usize;
        self.survivor_count = (self.members.len() - killed).max(1);
        self.avg_fitness = self.members[..self.survivor_count]
            .iter()
            .map(|&index| genomes[index].fitness())
            .sum::<f32>()
            / self.survivor_count as f32;

        self.max_fitness = genomes[self.members[0]].fitness();
        if self.max_fitness > self.best_fitness {
            self.best_fitness = self.max_fitness;
            self.time_since_improvement = 0;
        } else {
            self.time_since_improvement += 1;
        }
        self.representative = genomes[self.members[0]].clone();
    }

    pub(super) fn is_stagnant(&self, params: &Params) -> bool {
        self.time_since_improvement >= params.dropoff_age
    }

    /// Returns the species' ID.
    pub fn id(&self) -> SpeciesID {
        self.id
    }

    /// Returns the species' representative.
    pub fn representative(&self) -> &Genome {
        &self.representative
    }

    /// Returns an iterator over the species' member indices
    /// into the population's genome arena, best first once
    /// statistics have been computed.
    pub fn members(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().copied()
    }

    /// Returns the number of genomes assigned to the species.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Returns the number of members that survived the last
    /// selection and may reproduce.
    pub fn survivor_count(&self) -> usize {
        self.survivor_count
    }

    /// Returns the average fitness of the species' surviving
    /// members.
    pub fn avg_fitness(&self) -> f32 {
        self.avg_fitness
    }

    /// Returns the fitness of the species' best member in the
    /// last selection.
    pub fn max_fitness(&self) -> f32 {
        self.max_fitness
    }

    /// Returns the best fitness the species has ever reached.
    pub fn best_fitness(&self) -> f32 {
        self.best_fitness
    }

    /// Returns the number of generations since the species
    /// last improved its best fitness.
    pub fn time_since_improvement(&self) -> usize {
        self.time_since_improvement
    }

    /// Returns the number of offspring allotted to the species
    /// in the last selection.
    pub fn offspring(&self) -> usize {
        self.offspring
    }
}
