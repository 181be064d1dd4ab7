use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use cutstock::cli::Cli;
use cutstock::{ColgenConfig, Instance, MasterModel};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<()> {
    let args = Cli::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    let config = match &args.config_file {
        None => ColgenConfig::default(),
        Some(path) => {
            let reader = BufReader::new(
                File::open(path).with_context(|| format!("could not open {}", path.display()))?,
            );
            serde_json::from_reader(reader).context("incorrect config file format")?
        }
    };
    info!("using {config:?}");

    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(args.seed);
    for i in 0..args.count {
        let seed = rng.gen_range(0..=u64::MAX);
        let instance = Instance::random(seed, args.sizes, args.max_step, args.max_amount)
            .context("could not generate instance")?;
        println!("{i}: {instance}");

        let mut master = MasterModel::with_config(instance, config.clone())
            .with_context(|| format!("could not build master problem for instance {i}"))?;
        let solution = master
            .solve_integer()
            .with_context(|| format!("could not solve instance {i}"))?;
        let lower_bound = master.lower_bound().unwrap_or(0.0);

        println!("{i}: {solution}");
        println!(
            "{i}: int. value: {}, lower bound: {lower_bound}",
            solution.stock_needed()
        );
        if lower_bound > solution.stock_needed() as f64 {
            warn!("instance {i}: lower bound {lower_bound} exceeds the integer value");
        }
        master.clean_up();
    }
    println!("solved {} instances in {:.2?}", args.count, start.elapsed());
    Ok(())
}
