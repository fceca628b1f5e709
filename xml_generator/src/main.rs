mod cli;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use xmlgenerator::{GeneratorConfig, XMLGenerator};

fn emit<R: Rng>(generator: &XMLGenerator, cli: &cli::Cli, rng: &mut R) -> xmlgenerator::Result<()> {
    let root = cli.root.as_deref();

    match &cli.output {
        Some(path) => generator.write(root, path, rng),
        None => {
            print!("{}", generator.generate_string(root, rng)?);
            Ok(())
        }
    }
}

fn run(cli: &cli::Cli) -> xmlgenerator::Result<()> {
    let config = GeneratorConfig::default().with_max_depth(cli.max_depth);
    let generator = XMLGenerator::from_path(&cli.schema)?.with_config(config);

    match cli.seed {
        Some(seed) => emit(&generator, cli, &mut XorShiftRng::seed_from_u64(seed)),
        None => emit(&generator, cli, &mut rand::rng()),
    }
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
