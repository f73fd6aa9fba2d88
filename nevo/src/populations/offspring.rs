use super::*;

use rand::prelude::{Rng, SliceRandom};

/// Auxiliary type for offspring generation. Breeds each
/// species' allotted offspring from its surviving members
/// into the next generation's genome arena.
pub(super) struct OffspringFactory<'a> {
    genomes: &'a [Genome],
    species: &'a [Species],
    history: &'a mut History,
    params: &'a Params,
}

impl<'a> OffspringFactory<'a> {
    pub(super) fn new(
        genomes: &'a [Genome],
        species: &'a [Species],
        history: &'a mut History,
        params: &'a Params,
    ) -> OffspringFactory<'a> {
        OffspringFactory {
            genomes,
            species,
            history,
            params,
        }
    }

    /// Generates the allotted offspring of every species.
    ///
    /// Each species first carries its champion over unchanged,
    /// then fills its quota with bred children.
    pub(super) fn generate_offspring(&mut self) -> Vec<Genome> {
        let all_species = self.species;
        // Interspecies partners come from any species' survivors.
        let survivor_pool: Vec<usize> = all_species
            .iter()
            .flat_map(|s| s.members[..s.survivor_count()].iter().copied())
            .collect();

        let mut next_generation =
            Vec::with_capacity(all_species.iter().map(|s| s.offspring).sum());
        for species in all_species.iter().filter(|s| s.offspring > 0) {
            next_generation.push(self.genomes[species.members[0]].clone());
            for _ in 1..species.offspring {
                next_generation.push(self.breed_child(species, &survivor_pool));
            }
        }
        next_generation
    }

    /// Produces one child: a crossover of two surviving
    /// parents with probability [`mating_chance`], otherwise a
    /// copy of a single surviving parent. Every child is then
    /// run through the mutation gates.
    ///
    /// [`mating_chance`]: crate::Params::mating_chance
    fn breed_child(&mut self, species: &Species, survivor_pool: &[usize]) -> Genome {
        let genomes = self.genomes;
        let params = self.params;
        let mut rng = rand::thread_rng();

        let survivors = &species.members[..species.survivor_count()];
        let parent1 = *survivors
            .choose(&mut rng)
            .unwrap_or_else(|| panic!("no eligible parents in species {:?}", species.id()));

        let mut child = if rng.gen::<f32>() < params.mating_chance {
            match Self::choose_partner(survivors, survivor_pool, params, &mut rng) {
                Some(parent2) => Genome::mate(&genomes[parent1], &genomes[parent2], params),
                None => genomes[parent1].clone(),
            }
        } else {
            genomes[parent1].clone()
        };
        self.mutate_child(&mut child);
        child
    }

    /// Chooses a second parent from the species' survivors, or
    /// from the population-wide survivor pool with probability
    /// [`interspecies_mating_chance`]. Returns `None` if the
    /// species has no second parent to offer.
    ///
    /// [`interspecies_mating_chance`]: crate::Params::interspecies_mating_chance
    fn choose_partner(
        survivors: &[usize],
        survivor_pool: &[usize],
        params: &Params,
        rng: &mut impl Rng,
    ) -> Option<usize> {
        if survivor_pool.len() > 1 && rng.gen::<f32>() < params.interspecies_mating_chance {
            survivor_pool.choose(rng).copied()
        } else if survivors.len() > 1 {
            survivors.choose(rng).copied()
        } else {
            None
        }
    }

    /// Runs a child through the mutation gates. Structural
    /// mutations are exclusive; weight and toggle mutations can
    /// both apply to the same child.
    fn mutate_child(&mut self, child: &mut Genome) {
        let mut rng = rand::thread_rng();
        if rng.gen::<f32>() < self.params.node_addition_chance {
            child.mutate_add_node(self.history, self.params);
        } else if rng.gen::<f32>() < self.params.gene_addition_chance {
            child.mutate_add_gene(self.history, self.params);
        } else {
            if rng.gen::<f32>() < self.params.weight_mutation_chance {
                child.mutate_weights(self.params);
            }
            if rng.gen::<f32>() < self.params.toggle_enable_chance {
                child.mutate_toggle_enable(1);
            }
        }
    }
}
