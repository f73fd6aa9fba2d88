use serde::{Deserialize, Serialize};

/// Configuration data for genome generation, mutation,
/// mating, speciation and reproduction.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]. Using
/// values that are not in this bound may result
/// in odd behaviours and/or incorrect programs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Number of genomes in the population.
    pub population: usize,
    /// Maximum number of activation rounds
    /// during genome evaluation.
    pub activations: usize,
    /// Maximum number of attempts a structural
    /// mutation makes to find a valid site
    /// before giving up.
    pub timeout: usize,
    /// Desired number of species. If nonzero, the
    /// speciation threshold is adjusted each generation
    /// to approach this count. 0 disables adjustment.
    pub species_target: usize,
    /// Number of generations without fitness improvement
    /// after which a species is considered stagnant.
    pub dropoff_age: usize,
    /// Genetic distance above which a genome is placed
    /// in a different species than a representative.
    pub distance_threshold: f32,
    /// Step by which the speciation threshold is adjusted
    /// when approaching [`species_target`].
    ///
    /// [`species_target`]: Params::species_target
    pub distance_mod: f32,
    /// Weight of the average gene weight difference
    /// in genetic distance.
    pub weight_power: f32,
    /// Fraction of each species culled before reproduction.
    pub kill_ratio: f32,
    /// Maximum magnitude of a gene's weight.
    pub weight_bound: f32,
    /// Magnitude of the bound on the weight nudge
    /// uniform distribution. Assumed to be lesser
    /// than [`weight_bound`].
    ///
    /// [`weight_bound`]: Params::weight_bound
    pub weight_mutation_power: f32,
    /// Chance of a gene's weight being replaced by a
    /// fresh random value during weight mutation.
    pub weight_reset_chance: f32,
    /// Chance of a gene's weight being nudged during
    /// weight mutation, if not reset.
    pub weight_nudge_chance: f32,
    /// Chance of a child undergoing weight mutation.
    pub weight_mutation_chance: f32,
    /// Chance of a child undergoing a node addition mutation.
    pub node_addition_chance: f32,
    /// Chance of a child undergoing a gene addition mutation.
    pub gene_addition_chance: f32,
    /// Chance of a child having one gene's enabled flag flipped.
    pub toggle_enable_chance: f32,
    /// Chance of a child being produced by mating rather
    /// than by copying a single parent.
    pub mating_chance: f32,
    /// Chance of a mating partner being drawn from the
    /// whole population instead of the parent's species.
    pub interspecies_mating_chance: f32,
    /// Chance that common gene weights are averaged during
    /// mating, instead of copying the weight from a randomly
    /// chosen parent.
    pub mate_by_averaging_chance: f32,
    /// Chance that a gene disabled in either parent
    /// remains disabled in the child.
    pub disable_inheritance_chance: f32,
}

impl Params {
    /// Returns a "zero-valued" configuration.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to fill in unused values during
    /// configuration instantiation.
    ///
    /// # Examples
    /// ```
    /// use nevo::Params;
    ///
    /// let params = Params {
    ///     // Specify some values here...
    ///     weight_bound: 1.0,
    ///     mating_chance: 1.0,
    ///     // Default the rest...
    ///     ..Params::zero()
    /// };
    /// ```
    pub const fn zero() -> Params {
        Params {
            population: 0,
            activations: 0,
            timeout: 0,
            species_target: 0,
            dropoff_age: 0,
            distance_threshold: 0.0,
            distance_mod: 0.0,
            weight_power: 0.0,
            kill_ratio: 0.0,
            weight_bound: 0.0,
            weight_mutation_power: 0.0,
            weight_reset_chance: 0.0,
            weight_nudge_chance: 0.0,
            weight_mutation_chance: 0.0,
            node_addition_chance: 0.0,
            gene_addition_chance: 0.0,
            toggle_enable_chance: 0.0,
            mating_chance: 0.0,
            interspecies_mating_chance: 0.0,
            mate_by_averaging_chance: 0.0,
            disable_inheritance_chance: 0.0,
        }
    }

    /// Reads a parameter set from whitespace-separated
    /// `name value` pairs.
    ///
    /// Unrecognized names and unparseable values are
    /// reported through [`log::warn!`] and skipped,
    /// leaving the corresponding default in place.
    ///
    /// # Examples
    /// ```
    /// use nevo::Params;
    ///
    /// let params = Params::parse(
    ///     "population 100
    ///      weight_bound 2.5"
    /// );
    ///
    /// assert_eq!(params.population, 100);
    /// assert_eq!(params.weight_bound, 2.5);
    /// assert_eq!(params.dropoff_age, Params::default().dropoff_age);
    /// ```
    pub fn parse(text: &str) -> Params {
        let mut params = Params::default();
        let mut tokens = text.split_whitespace();
        while let Some(name) = tokens.next() {
            match tokens.next() {
                Some(value) => params.set(name, value),
                None => log::warn!("parameter {:?} is missing a value", name),
            }
        }
        params
    }

    fn set(&mut self, name: &str, value: &str) {
        match name {
            "population" => set_usize(name, value, &mut self.population),
            "activations" => set_usize(name, value, &mut self.activations),
            "timeout" => set_usize(name, value, &mut self.timeout),
            "species_target" => set_usize(name, value, &mut self.species_target),
            "dropoff_age" => set_usize(name, value, &mut self.dropoff_age),
            "distance_threshold" => set_f32(name, value, &mut self.distance_threshold),
            "distance_mod" => set_f32(name, value, &mut self.distance_mod),
            "weight_power" => set_f32(name, value, &mut self.weight_power),
            "kill_ratio" => set_f32(name, value, &mut self.kill_ratio),
            "weight_bound" => set_f32(name, value, &mut self.weight_bound),
            "weight_mutation_power" => set_f32(name, value, &mut self.weight_mutation_power),
            "weight_reset_chance" => set_f32(name, value, &mut self.weight_reset_chance),
            "weight_nudge_chance" => set_f32(name, value, &mut self.weight_nudge_chance),
            "weight_mutation_chance" => set_f32(name, value, &mut self.weight_mutation_chance),
            "node_addition_chance" => set_f32(name, value, &mut self.node_addition_chance),
            "gene_addition_chance" => set_f32(name, value, &mut self.gene_addition_chance),
            "toggle_enable_chance" => set_f32(name, value, &mut self.toggle_enable_chance),
            "mating_chance" => set_f32(name, value, &mut self.mating_chance),
            "interspecies_mating_chance" => {
                set_f32(name, value, &mut self.interspecies_mating_chance)
            }
            "mate_by_averaging_chance" => set_f32(name, value, &mut self.mate_by_averaging_chance),
            "disable_inheritance_chance" => {
                set_f32(name, value, &mut self.disable_inheritance_chance)
            }
            _ => log::warn!("unrecognized parameter {:?} skipped", name),
        }
    }
}

impl Default for Params {
    fn default() -> Params {
        Params {
            population: 150,
            activations: 8,
            timeout: 12,
            species_target: 12,
            dropoff_age: 15,
            distance_threshold: 0.6,
            distance_mod: 0.05,
            weight_power: 0.5,
            kill_ratio: 0.5,
            weight_bound: 4.0,
            weight_mutation_power: 2.5,
            weight_reset_chance: 0.1,
            weight_nudge_chance: 0.8,
            weight_mutation_chance: 0.8,
            node_addition_chance: 0.03,
            gene_addition_chance: 0.05,
            toggle_enable_chance: 0.01,
            mating_chance: 0.75,
            interspecies_mating_chance: 0.01,
            mate_by_averaging_chance: 0.4,
            disable_inheritance_chance: 0.75,
        }
    }
}

fn set_usize(name: &str, value: &str, slot: &mut usize) {
    match value.parse() {
        Ok(parsed) => *slot = parsed,
        Err(_) => log::warn!(
            "invalid value {:?} for parameter {:?}, keeping {}",
            value,
            name,
            slot
        ),
    }
}

fn set_f32(name: &str, value: &str, slot: &mut f32) {
    match value.parse() {
        Ok(parsed) => *slot = parsed,
        Err(_) => log::warn!(
            "invalid value {:?} for parameter {:?}, keeping {}",
            value,
            name,
            slot
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_overrides_defaults() {
        let params = Params::parse(
            "population 42
             dropoff_age 3
             distance_threshold 1.25
             mating_chance 0.9",
        );
        assert_eq!(params.population, 42);
        assert_eq!(params.dropoff_age, 3);
        assert_eq!(params.distance_threshold, 1.25);
        assert_eq!(params.mating_chance, 0.9);
        // Unmentioned parameters keep their defaults.
        assert_eq!(params.activations, Params::default().activations);
        assert_eq!(params.weight_bound, Params::default().weight_bound);
    }

    #[test]
    fn parse_skips_unknown_names() {
        let params = Params::parse(
            "warp_factor 9
             population 33",
        );
        assert_eq!(params.population, 33);
        assert_eq!(params, Params {
            population: 33,
            ..Params::default()
        });
    }

    #[test]
    fn parse_keeps_default_on_bad_value() {
        let params = Params::parse(
            "population many
             kill_ratio 0.25",
        );
        assert_eq!(params.population, Params::default().population);
        assert_eq!(params.kill_ratio, 0.25);
    }

    #[test]
    fn parse_ignores_trailing_name() {
        let params = Params::parse("population 10 timeout");
        assert_eq!(params.population, 10);
        assert_eq!(params.timeout, Params::default().timeout);
    }

    #[test]
    fn parse_empty_is_default() {
        assert_eq!(Params::parse(""), Params::default());
    }
}
