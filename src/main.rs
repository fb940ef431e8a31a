use anyhow::{bail, Context, Result};
use atc_sim::scenario::random_roster;
use atc_sim::{AgentAttributes, Coordinator, Scenario};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

const USAGE: &str = "usage: atc-sim [SCENARIO.json] [--ticks N] [--random N] [--seed S] [--add \"CS x y altitude speed heading\"]";

struct Args {
    scenario: Option<String>,
    ticks: usize,
    random: Option<usize>,
    seed: u64,
    extra: Vec<AgentAttributes>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        scenario: None,
        ticks: 120,
        random: None,
        seed: 0,
        extra: vec![],
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = || iter.next().with_context(|| format!("{} needs a value", arg));
        match arg.as_str() {
            "--ticks" => args.ticks = value()?.parse().context("--ticks")?,
            "--random" => args.random = Some(value()?.parse().context("--random")?),
            "--seed" => args.seed = value()?.parse().context("--seed")?,
            "--add" => args.extra.push(value()?.parse()?),
            "-h" | "--help" => bail!(USAGE),
            _ if arg.starts_with('-') => bail!("unknown option {}\n{}", arg, USAGE),
            _ => args.scenario = Some(arg.clone()),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path).with_context(|| format!("loading {}", path))?,
        None => Scenario::demo(),
    };
    if let Some(count) = args.random {
        scenario.roster = random_roster(count, &mut StdRng::seed_from_u64(args.seed));
    }
    scenario.roster.extend(args.extra);

    let mut coordinator = Coordinator::with_config(scenario.config)?;
    coordinator.load_roster(&scenario.roster)?;

    println!("Simulating {} agents...", scenario.roster.len());
    for _ in 0..args.ticks {
        let reports = coordinator.tick();
        for report in &reports {
            info!("[{:>6.0}s] {}", coordinator.elapsed_secs(), report);
        }
    }
    info!(
        "Simulated {:.0}s with {} resolution searches",
        coordinator.elapsed_secs(),
        coordinator.searches_dispatched()
    );

    println!("{}", serde_json::to_string_pretty(&coordinator.snapshot())?);
    Ok(())
}
