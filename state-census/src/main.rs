use deme_states::hitting::{HittingProbabilities, Params};
use deme_states::transitions::{MigrationConfig, MigrationModel, TransitionGenerator};
use deme_states::walks::logging::{ReportingLevel, Stats, WalkLogger};
use deme_states::walks::MigrationWalk;
use deme_states::{Init, State, StateSpace, StateSpaceError};

use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use ron;

use std::error::Error;

const DEFAULT_COUNTS: [usize; 3] = [2, 2, 1];
const DEFAULT_MIGRATION_RATE: f64 = 0.5;
const POP_SIZE: f64 = 1.0;
const MUTATION_RATE: f64 = 0.1;
const TOP_HITS: usize = 5;

const WALKS: u64 = 2000;
const WALK_STEPS: usize = 50;
const LOGGED_STEPS: usize = 5;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let (init, model) = parse_args()?;
    let space = StateSpace::new(init)?;
    println!(
        "{} states over {} demes, per-group dimensions {:?}",
        space.total_states(),
        space.demes(),
        space.dims()
    );

    rate_summary(&space, &model)?;
    walk_test(&space, &model)?;
    hitting_test(&space, &model)?;
    serde_test(&space, &model)?;

    Ok(())
}

/// Reads `state-census [migration_rate count...]`, with
/// one deme per count. Falls back to defaults when no
/// arguments are given.
fn parse_args() -> Result<(Init, MigrationConfig), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (rate, counts) = match args.split_first() {
        None => (DEFAULT_MIGRATION_RATE, DEFAULT_COUNTS.to_vec()),
        Some((rate, counts)) => (
            rate.parse::<f64>()?,
            counts
                .iter()
                .map(|c| c.parse::<usize>())
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };
    let init = Init::new(counts)?;
    let model = MigrationConfig::uniform(init.demes_nonzero(), rate);
    Ok((init, model))
}

fn rate_summary<M>(space: &StateSpace, model: &M) -> Result<(), Box<dyn Error>>
where
    M: MigrationModel + Sync,
{
    let generator = TransitionGenerator::new(space, model)?;
    let total = space.total_states();

    let exit_rates = (0..total)
        .into_par_iter()
        .map(|idx| generator.exit_rate(idx))
        .collect::<Result<Vec<_>, _>>()?;
    let degrees = (0..total)
        .into_par_iter()
        .map(|idx| space.neighbor_set(idx).map(|n| n.len() as f64))
        .collect::<Result<Vec<_>, _>>()?;

    println!("Exit rates: {:?}", Stats::from(exit_rates.into_iter()));
    println!("Distinct neighbors: {:?}", Stats::from(degrees.into_iter()));

    Ok(())
}

fn walk_test<M>(space: &StateSpace, model: &M) -> Result<(), Box<dyn Error>>
where
    M: MigrationModel + Sync,
{
    let generator = TransitionGenerator::new(space, model)?;
    let start = space.home_index().unwrap_or(0);

    let outcomes = (0..WALKS)
        .into_par_iter()
        .map(|seed| -> Result<_, StateSpaceError> {
            let mut walk = MigrationWalk::new(generator, start, StdRng::seed_from_u64(seed))?;
            let steps = walk.run(WALK_STEPS)?;
            Ok((steps, walk.time(), walk.current() == start))
        })
        .collect::<Result<Vec<_>, _>>()?;

    println!(
        "Elapsed time after {} migrations {:?}, {}% of {} walks back at the start",
        WALK_STEPS,
        Stats::from(
            outcomes
                .iter()
                .filter(|(steps, _, _)| *steps == WALK_STEPS)
                .map(|&(_, time, _)| time)
        ),
        outcomes.iter().filter(|(_, _, home)| *home).count() as f64 * 100.0 / WALKS as f64,
        WALKS
    );

    let mut walk = MigrationWalk::new(generator, start, StdRng::seed_from_u64(WALKS))?;
    let mut logger = WalkLogger::new(ReportingLevel::DemeTotals);
    logger.log(&walk)?;
    for _ in 0..LOGGED_STEPS {
        if walk.step()?.is_none() {
            break;
        }
        logger.log(&walk)?;
    }
    for log in logger.iter() {
        println!("{}", log);
    }

    Ok(())
}

fn hitting_test(space: &StateSpace, model: &MigrationConfig) -> Result<(), Box<dyn Error>> {
    let params = Params {
        migration: model.clone(),
        pop_sizes: vec![POP_SIZE; space.demes()],
        mut_rates: vec![MUTATION_RATE; space.demes()],
    };
    let hp = match HittingProbabilities::new(space.clone(), params) {
        Ok(hp) => hp,
        Err(StateSpaceError::NoHomeState) => {
            println!("No home state, skipping hitting probabilities");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let demes = space.demes();
    let mut hits = (0..space.total_states() * demes)
        .into_par_iter()
        .map(|i| hp.get(i / demes, i % demes).map(|p| (i / demes, i % demes, p)))
        .collect::<Result<Vec<_>, _>>()?;
    hits.sort_unstable_by(|a, b| b.2.total_cmp(&a.2));

    println!(
        "Coalescence before mutation with probability {:.6}",
        hp.coalescence_probability()?
    );
    for &(idx, deme, p) in hits.iter().take(TOP_HITS) {
        println!(
            "  {} coalescing in deme {}: {:.6}",
            space.index_to_state(idx)?,
            deme,
            p
        );
    }
    println!("Params: {}", ron::to_string(hp.params())?);

    Ok(())
}

fn serde_test(space: &StateSpace, model: &MigrationConfig) -> Result<(), Box<dyn Error>> {
    let generator = TransitionGenerator::new(space, model)?;

    let init = ron::to_string(space.init())?;
    let config = ron::to_string(model)?;
    let start = space.home_index().unwrap_or(0);
    let transitions: Vec<_> = generator
        .transitions()?
        .into_iter()
        .filter(|t| t.from == start)
        .collect();
    println!("{}", init);
    println!("{}", config);
    println!("{}", ron::to_string(&transitions)?);

    let restored = StateSpace::new(ron::from_str::<Init>(&init)?)?;
    let restored_model: MigrationConfig = ron::from_str(&config)?;
    let state: State = restored.index_to_state(start)?;
    println!(
        "Restored {} with {} states, start state {}, round trip {}",
        ron::to_string(restored.init())?,
        restored.total_states(),
        state,
        if restored.init() == space.init() && &restored_model == model {
            "ok"
        } else {
            "FAILED"
        }
    );

    Ok(())
}
