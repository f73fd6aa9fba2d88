use nevo::genomics::Genome;
use nevo::populations::logging::{EvolutionLogger, ReportingLevel, Stats};
use nevo::populations::Population;
use nevo::Params;

use std::env;
use std::fs;
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use ron;

const ERROR_MARGIN: f32 = 0.3;
const GENERATION_LIMIT: usize = 100;

fn evaluate_xor(genome: &mut Genome, params: &Params) -> f32 {
    let values = [
        ([1.0, 0.0, 0.0], 0.0),
        ([1.0, 0.0, 1.0], 1.0),
        ([1.0, 1.0, 0.0], 1.0),
        ([1.0, 1.0, 1.0], 0.0),
    ];

    let mut errors = [0.0, 0.0, 0.0, 0.0];
    for (i, (input, output)) in values.iter().enumerate() {
        genome.set_inputs(input);
        genome.evaluate(params);
        errors[i] = (genome.outputs()[0] - output).abs();
        if errors[i] < ERROR_MARGIN {
            errors[i] = 0.0;
        }
    }

    (4.0 - errors.iter().copied().sum::<f32>()).powf(2.0)
}

fn solved(population: &Population) -> bool {
    (population.champion().fitness() - 16.0).abs() < f32::EPSILON
}

fn main() {
    env_logger::init();

    // An optional parameter file overrides the built-in setup.
    let params = match env::args().nth(1) {
        Some(path) => Params::parse(&fs::read_to_string(path).expect("unreadable parameter file")),
        None => Params {
            population: 150,
            weight_bound: 5.0,
            weight_reset_chance: 0.2,
            weight_nudge_chance: 0.9,
            ..Params::default()
        },
    };

    logging_test(&params);
    serde_test(&params);
    stress_test(&params);
}

fn logging_test(params: &Params) {
    let mut logger = EvolutionLogger::new(ReportingLevel::PopulationChampion);
    let mut population = Population::new(3, 1, params.clone());
    for _ in 0..GENERATION_LIMIT {
        population.evaluate_fitness(|genome| evaluate_xor(genome, params));
        population.select();
        logger.log(
            &population,
            &|g| [g.fitness(), g.genes().count() as f32, g.nodes().count() as f32],
            ["fitness", "gene count", "node count"],
        );
        if solved(&population) {
            break;
        }
        population.reproduce();
    }

    if let Some(log) = logger.iter().last() {
        println!("{}", log);
    }
    println!(
        "best fitness {} in generation {}",
        population.champion().fitness(),
        population.generation()
    );
}

fn serde_test(params: &Params) {
    let mut snapshot = String::new();
    let mut population = Population::new(3, 1, params.clone());
    for _ in 0..GENERATION_LIMIT {
        population.evaluate_fitness(|genome| evaluate_xor(genome, params));
        population.select();
        if solved(&population) {
            println!("{}", ron::to_string(population.champion()).unwrap());
            snapshot = ron::to_string(&population).unwrap();
            break;
        }
        population.reproduce();
    }
    if snapshot.is_empty() {
        println!("no solution to snapshot after {} generations", GENERATION_LIMIT);
        return;
    }

    let mut population: Population = ron::from_str(&snapshot).unwrap();
    population.evaluate_fitness(|genome| evaluate_xor(genome, params));
    population.select();
    println!(
        "reloaded population, champion fitness {}",
        population.champion().fitness()
    );
}

fn stress_test(params: &Params) {
    let generations = Arc::new(Mutex::new(vec![]));

    const ITERATIONS: usize = 2000;
    (0..ITERATIONS).into_par_iter().for_each(|_| {
        let mut population = Population::new(3, 1, params.clone());
        for _ in 0..GENERATION_LIMIT {
            population.evaluate_fitness(|genome| evaluate_xor(genome, params));
            population.select();
            if solved(&population) {
                break;
            }
            population.reproduce();
        }
        let result = if solved(&population) {
            Some(population.generation())
        } else {
            None
        };
        generations.lock().unwrap().push(result);
    });

    let generations = generations.lock().unwrap();

    println!(
        "Successful run generation count {:?}, {}% failure rate over {} iterations",
        Stats::from(
            generations
                .iter()
                .filter_map(|g| g.as_ref().map(|g| *g as f32))
        ),
        generations.iter().filter(|g| g.is_none()).count() as f32 * 100.0 / ITERATIONS as f32,
        ITERATIONS
    );
}
