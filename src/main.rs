//! Installer - GitHub release binaries and host setup
//!
//! Downloads the release asset matching this host's operating system, CPU
//! architecture and C library, installs it with permissions and ownership,
//! and provisions SSH, shell startup files, apt packages and docker.

use std::io::Write;

use clap::Parser;
use log::LevelFilter;
use miette::Diagnostic;

mod cli;
mod commands;
mod error;
mod fetch;
mod git;
mod github;
mod hash;
mod install;
mod packages;
mod path_utils;
mod platform;
mod process;
mod progress;
mod resolver;
mod retry;
mod shell;
mod ssh;
mod temp;
mod tools;

use cli::{Cli, Commands};

/// Log level for `-v`/`-q`; warn when neither is given
fn level_filter(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(level: LevelFilter) {
    let mut builder = env_logger::Builder::from_default_env();
    // RUST_LOG wins over the flags
    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(level);
    }
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(level_filter(cli.verbose, cli.quiet));

    let result = match cli.command {
        Commands::Tool(cmd) => commands::tool::run(cmd),
        Commands::Run(args) => commands::run::run(args),
        Commands::AptPackage(args) => commands::packages::apt_package(args),
        Commands::Curl(args) => commands::packages::named("curl", args),
        Commands::Git(args) => commands::packages::named("git", args),
        Commands::Rsync(args) => commands::packages::named("rsync", args),
        Commands::Docker(args) => commands::packages::docker(args),
        Commands::GitClone(args) => commands::git_clone::run(args),
        Commands::SetupAuthorizedKeys(args) => commands::ssh::authorized_keys(args),
        Commands::SetupSshConfig(args) => commands::ssh::ssh_config(args),
        Commands::SetupSshdConfig(args) => commands::ssh::sshd_config(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let Some(help) = e.help() {
            eprintln!("  help: {help}");
        }
        std::process::exit(1);
    }
}
