use anyhow::Result;
use clap::Parser;
use mergetrace::areas::repository::Repository;
use mergetrace::commands::explain::ExplainOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mergetrace",
    version = "0.1.0",
    about = "Explain which commits caused the current merge conflicts",
    long_about = "Run inside a repository with a conflicted merge in progress. \
    For every conflicting file, mergetrace walks the history exclusive to each \
    side of the merge and lists the commits that changed that file, so you can \
    see where the conflicting edits came from before resolving them."
)]
struct Cli {
    #[arg(help = "Only report these paths (default: every conflicting path)")]
    paths: Vec<PathBuf>,

    #[arg(long, help = "Path to the .git directory (default: discover upwards)")]
    git_dir: Option<PathBuf>,

    #[arg(
        long,
        help = "Abort if the ancestry walk materializes more than this many commits"
    )]
    budget: Option<usize>,

    #[arg(long, help = "Disable colored output")]
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let writer = Box::new(std::io::stdout());
    let repository = match &cli.git_dir {
        Some(git_dir) => Repository::open(git_dir, writer)?,
        None => Repository::discover(writer)?,
    };

    let opts = ExplainOptions {
        paths: cli.paths,
        budget: cli.budget,
    };
    repository.explain(&opts)
}
