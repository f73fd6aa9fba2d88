use super::{Population, SpeciesID};

use crate::genomics::Genome;

use std::fmt;

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug)]
pub enum ReportingLevel {
    /// Clones the entire population.
    AllGenomes,
    /// Clones species and their champions.
    SpeciesChampions,
    /// Clones only the population champion.
    PopulationChampion,
    /// Clones no genomes.
    NoGenomes,
}

/// A snapshot of a population.
#[derive(Clone, Debug)]
pub struct Log {
    pub generation_number: usize,
    pub generation_sample: GenerationMemberRecord,
    pub species_count: usize,
    pub genome_stats: Vec<(String, Stats)>,
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Log {{\n\
            \tgeneration_number: {:?}\n\
            \tspecies_count: {:?}\n\
            {}
            }}",
            &self.generation_number,
            &self.species_count,
            self.genome_stats
                .iter()
                .map(|(name, stats)| format!("\t{}: {:?}\n", name, stats))
                .collect::<Vec<_>>()
                .join("")
        )
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// The median of an even-length sequence is the mean
    /// of the two middle values.
    ///
    /// # Panics
    /// This function will panic if the sequence is empty
    /// or contains NaN values.
    ///
    /// # Examples
    /// ```
    /// use nevo::populations::logging::Stats;
    ///
    /// let stats = Stats::from([1.0, -0.5, 3.0, 0.5, 2.0].iter().copied());
    /// assert_eq!(stats.maximum, 3.0);
    /// assert_eq!(stats.minimum, -0.5);
    /// assert_eq!(stats.mean, 1.2);
    /// assert_eq!(stats.median, 1.0);
    /// ```
    pub fn from(data: impl Iterator<Item = f32>) -> Stats {
        let mut data: Vec<f32> = data.collect();
        let mid = data.len() / 2;
        let (mut max, mut min, mut sum) = (f32::MIN, f32::MAX, 0.0);
        for d in &data {
            max = d.max(max);
            min = d.min(min);
            sum += d;
        }
        let mean = sum / data.len() as f32;
        let mut median = *data
            .select_nth_unstable_by(mid, |a, b| a.partial_cmp(b).unwrap())
            .1;
        if data.len() % 2 == 0 {
            median = (median
                + *data
                    .select_nth_unstable_by(mid - 1, |a, b| a.partial_cmp(b).unwrap())
                    .1)
                / 2.0;
        }
        Stats {
            maximum: max,
            minimum: min,
            mean,
            median,
        }
    }
}

/// A reporting-level dependant store
/// of genomes from a population.
#[derive(Clone, Debug)]
pub enum GenerationMemberRecord {
    /// Species IDs, genomes, and time since improvement.
    Species(Vec<(SpeciesID, Vec<Genome>, usize)>),
    /// Only species IDs, species champions,
    /// and time since improvement.
    SpeciesChampions(Vec<(SpeciesID, Genome, usize)>),
    /// Only population champion.
    PopulationChampion(Genome),
    /// Empty.
    None,
}

/// A log of the evolution of a population over time.
#[derive(Clone, Debug)]
pub struct EvolutionLogger {
    reporting_level: ReportingLevel,
    logs: Vec<Log>,
}

impl EvolutionLogger {
    /// Returns a logger with the appropiate reporting level.
    ///
    /// # Examples
    /// ```
    /// use nevo::populations::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let logger = EvolutionLogger::new(ReportingLevel::NoGenomes);
    /// ```
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger {
        EvolutionLogger {
            reporting_level,
            logs: vec![],
        }
    }

    /// Store a snapshot of a population.
    ///
    /// The `genome_stat_extractor` provides a way of
    /// obtaining arbitrary statistics on the population,
    /// where each statistic is named by `stat_names`.
    ///
    /// Genome samples follow the species groupings made by
    /// the last [`select`] call.
    ///
    /// [`select`]: super::Population::select
    ///
    /// # Examples
    /// ```
    /// use nevo::populations::logging::{EvolutionLogger, ReportingLevel};
    /// use nevo::populations::Population;
    /// use nevo::Params;
    ///
    /// let mut logger = EvolutionLogger::new(ReportingLevel::NoGenomes);
    /// let mut population = Population::new(3, 1, Params::default());
    ///
    /// // Do something with the population...
    /// // Then log a snapshot.
    /// logger.log(
    ///     &population,
    ///     &|g| [g.fitness(), g.genes().count() as f32],
    ///     ["fitness", "gene count"],
    /// );
    /// ```
    pub fn log<SE, const N: usize>(
        &mut self,
        population: &Population,
        genome_stat_extractor: &SE,
        stat_names: [&str; N],
    ) where
        SE: Fn(&Genome) -> [f32; N],
    {
        let stats: Vec<[f32; N]> = population.genomes().map(genome_stat_extractor).collect();
        let stats = stat_names
            .iter()
            .cloned()
            .map(String::from)
            .zip(unzip_n_vecs(stats.into_iter()))
            .map(|(name, data)| (name, Stats::from(data.into_iter())))
            .collect();
        self.logs.push(Log {
            generation_number: population.generation(),
            generation_sample: match self.reporting_level {
                ReportingLevel::AllGenomes => GenerationMemberRecord::Species(
                    population
                        .species()
                        .map(|s| {
                            (
                                s.id(),
                                population.species_members(s).cloned().collect(),
                                s.time_since_improvement(),
                            )
                        })
                        .collect(),
                ),
                ReportingLevel::SpeciesChampions => GenerationMemberRecord::SpeciesChampions(
                    population
                        .species()
                        .filter_map(|s| {
                            population.species_members(s).next().map(|champion| {
                                (s.id(), champion.clone(), s.time_since_improvement())
                            })
                        })
                        .collect(),
                ),
                ReportingLevel::PopulationChampion => {
                    GenerationMemberRecord::PopulationChampion(population.champion().clone())
                }
                ReportingLevel::NoGenomes => GenerationMemberRecord::None,
            },
            species_count: population.species().count(),
            genome_stats: stats,
        })
    }

    /// Iterate over all logged snapshots.
    ///
    /// # Examples
    /// ```
    /// use nevo::populations::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let logger = EvolutionLogger::new(ReportingLevel::AllGenomes);
    /// // Log some stuff... then
    /// for log in logger.iter() {
    ///     println!("{}", log);
    /// }
    /// ```
    pub fn iter(&self) -> impl Iterator<Item = &Log> {
        self.logs.iter()
    }
}

fn unzip_n_vecs<T: Clone, const N: usize>(iter: impl Iterator<Item = [T; N]>) -> Vec<Vec<T>> {
    let mut vecs = vec![Vec::default(); N];
    for items in iter {
        for (vec, item) in vecs.iter_mut().zip(items) {
            vec.push(item);
        }
    }
    vecs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Params;

    #[test]
    fn stats_from_even_length_data() {
        let stats = Stats::from([4.0, 1.0, 3.0, 2.0].iter().copied());
        assert_eq!(stats.maximum, 4.0);
        assert_eq!(stats.minimum, 1.0);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn stats_from_single_value() {
        let stats = Stats::from(std::iter::once(7.0));
        assert_eq!(stats.maximum, 7.0);
        assert_eq!(stats.minimum, 7.0);
        assert_eq!(stats.mean, 7.0);
        assert_eq!(stats.median, 7.0);
    }

    #[test]
    fn logger_records_population_snapshots() {
        let params = Params {
            population: 10,
            distance_threshold: 0.6,
            distance_mod: 0.05,
            dropoff_age: 15,
            kill_ratio: 0.5,
            ..Params::zero()
        };
        let mut population = Population::new(2, 1, params);
        population.evaluate_fitness(|g| g.genes().count() as f32);
        population.select();

        let mut logger = EvolutionLogger::new(ReportingLevel::SpeciesChampions);
        logger.log(&population, &|g| [g.fitness()], ["fitness"]);

        let log = logger.iter().next().unwrap();
        assert_eq!(log.generation_number, 0);
        assert_eq!(log.species_count, 1);
        assert_eq!(log.genome_stats[0].0, "fitness");
        assert_eq!(log.genome_stats[0].1.mean, 2.0);
        match &log.generation_sample {
            GenerationMemberRecord::SpeciesChampions(champions) => {
                assert_eq!(champions.len(), 1);
                assert_eq!(champions[0].1.fitness(), 2.0);
            }
            sample => panic!("unexpected sample variant: {:?}", sample),
        }
    }
}
