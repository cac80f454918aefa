use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use gitwrite::cli::{Cli, Commands};
use gitwrite::output::{self, Verbosity};
use gitwrite::{GitError, GitwriteContext, commands};
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    output::set_verbosity(verbosity);
    init_tracing(verbosity);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(kind) = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<GitError>())
            .and_then(GitError::failure_kind)
        {
            eprintln!("{} {}: {}", "Hint:".yellow().bold(), kind, kind.hint());
        }
        process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` takes precedence over the verbosity flags.
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Validate { url } => commands::validate::execute(&url)?,
        Commands::Name { url } => commands::name::execute(&url)?,
        Commands::Push(args) => {
            let ctx = GitwriteContext::new()?;
            commands::push::execute(&ctx, &args)?;
        }
        Commands::Config { action } => {
            let mut ctx = GitwriteContext::new()?;
            commands::config::execute(&mut ctx, action)?;
        }
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
        }
    }
    Ok(())
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
