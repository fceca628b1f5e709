use clap::Parser;
use std::path::PathBuf;
use xmlgenerator::config::DEFAULT_MAX_DEPTH;

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    #[clap(value_parser, help = "The XSD schema file")]
    pub schema: PathBuf,

    #[clap(long, help = "Element to use as the document root")]
    pub root: Option<String>,

    #[clap(long, short, help = "Write the document to this file instead of stdout")]
    pub output: Option<PathBuf>,

    #[clap(long, help = "Seed for reproducible output")]
    pub seed: Option<u64>,

    #[clap(long, default_value_t = DEFAULT_MAX_DEPTH, help = "Nesting depth treated as runaway recursion")]
    pub max_depth: usize,

    #[clap(long, short, help = "Log index, cycle check and root selection decisions")]
    pub verbose: bool,
}
