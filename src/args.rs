use jv_common::BuildOptions;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
pub struct Args {
    /// source files making up the program, each holding one compilation unit
    #[structopt(name = "FILES", parse(from_os_str), required = true)]
    pub files: Vec<PathBuf>,

    /// write printed output to this file instead of stdout
    #[structopt(name = "OUTPUT", short = "o", parse(from_os_str))]
    pub output: Option<PathBuf>,

    /// if set, run compilation to a given stage and print the output as human-readable
    /// text
    #[structopt(short = "p", long = "print-stage", parse(try_from_str = parse_compile_stage))]
    pub print_stage: Option<CompileStage>,

    /// upper bound on passes over goals that asked to be retried
    #[structopt(long = "max-passes", default_value = "8")]
    pub max_passes: usize,

    /// don't remember failed lookups in resolver caches
    #[structopt(long = "no-cache-misses")]
    pub no_cache_misses: bool,

    /// print frontend backtrace on compilation failure
    #[structopt(long = "backtrace", short = "bt")]
    pub backtrace: bool,

    #[structopt(long = "verbose", short = "v")]
    pub verbose: bool,
}

impl Args {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            verbose: self.verbose,
            max_passes: self.max_passes,
            cache_misses: !self.no_cache_misses,
        }
    }
}

#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
pub enum CompileStage {
    Parse,
    Typecheck,
}

fn parse_compile_stage(s: &str) -> Result<CompileStage, String> {
    match s {
        "p" | "parse" => Ok(CompileStage::Parse),
        "t" | "typecheck" => Ok(CompileStage::Typecheck),
        _ => Err(format!("invalid output kind: {}", s)),
    }
}
