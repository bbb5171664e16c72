//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

/// Devhand - a workspace-aware CLI for paired frontend/backend webapps
#[derive(Parser, Debug)]
#[command(name = "dh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if dh was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set AND stdin is a TTY
    pub fn interactive(&self) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// One-time setup of the development environment
    #[command(
        name = "setup",
        long_about = "One-time setup of the development environment.\n\n\
            Setup detects the workspace layout, checks the required tools, and \
            walks you through configuring database credentials and environment \
            files for both projects. Re-running it is safe: existing values are \
            offered as defaults.",
        after_help = "\
WORKFLOW EXAMPLES:
    # First-time setup from anywhere in the workspace
    dh setup

    # After setup, verify everything
    dh validate

TYPICAL FIRST SESSION:
    dh setup               # configure credentials and env files
    dh install             # install dependencies for both projects
    dh db migrate          # initialize database tables (from the backend)
    dh dev                 # start a dev server"
    )]
    Setup,

    /// Check if the environment is properly configured
    #[command(
        name = "validate",
        long_about = "Check if the environment is properly configured.\n\n\
            Runs the battery of environment checks that applies to your current \
            position in the workspace and prints a health report. Validation \
            never blocks: you always get the full report, and the exit code \
            reflects the overall status (nonzero only when a check fails).",
        after_help = "\
WORKFLOW EXAMPLES:
    # Local development readiness
    dh validate

    # Deployment readiness (superset of the standard checks)
    dh validate --deploy

    # Machine-readable output for scripting
    dh validate --json

READING THE OUTPUT:
    ✓ check passed
    ! warning - worth a look, does not block dev/build
    ✗ failure - blocks dev/build, and db actions block on warnings too"
    )]
    Validate {
        /// Validate deployment readiness (backend, database, frontend)
        #[arg(long)]
        deploy: bool,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Install project dependencies
    #[command(
        name = "install",
        long_about = "Install dependencies for every detected project.\n\n\
            Runs the package manager appropriate to each project's role: \
            'npm install' for the frontend and 'uv sync --dev' for the backend.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Install everything after a fresh clone
    dh install"
    )]
    Install,

    /// Start the context-appropriate dev server
    #[command(
        name = "dev",
        long_about = "Start the dev server for the project you are in.\n\n\
            The command and port come from dh.toml (or the defaults for the \
            project's role). The environment must be warn-or-better: failing \
            checks block the dev server, since a server relying on missing \
            dependencies cannot meaningfully start.",
        after_help = "\
WORKFLOW EXAMPLES:
    # From the frontend project: npm run dev on port 3000
    cd hello-world-fe && dh dev

    # From the backend project: uvicorn on port 8000
    cd hello-world-be && dh dev

IF IT REFUSES TO START:
    dh validate            # see which checks are failing
    dh install             # most failures are missing dependencies"
    )]
    Dev,

    /// Build production artifacts
    #[command(
        name = "build",
        long_about = "Build production artifacts for the project you are in.\n\n\
            Builds a production bundle by default, or a Docker image with \
            --docker. Like dev, the environment must be warn-or-better.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Production bundle
    dh build

    # Docker image tagged with the project name
    dh build --docker"
    )]
    Build {
        /// Build a Docker image instead of a production bundle
        #[arg(long)]
        docker: bool,
    },

    /// Database operations (backend only)
    #[command(subcommand)]
    Db(DbCommand),

    /// Remove build artifacts
    #[command(
        name = "clean",
        long_about = "Remove build artifacts for the current project, or for \
            every project when run from the workspace root.\n\n\
            Clean is never gated: removing artifacts must always be possible, \
            even from a broken environment, to allow recovery.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Clean the project you are in
    dh clean

    # Clean the whole workspace
    cd .. && dh clean"
    )]
    Clean,

    /// Generate shell completions
    #[command(name = "completion")]
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Database subcommands.
#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Run database migrations
    #[command(
        name = "migrate",
        long_about = "Run database migrations.\n\n\
            Only valid from the backend project, and only when every standard \
            check passes: a migration applied from a broken environment risks \
            inconsistent state, so this gate is stricter than dev/build.",
        after_help = "\
WORKFLOW EXAMPLES:
    cd hello-world-be && dh db migrate"
    )]
    Migrate,

    /// Sync allowed users to the database
    #[command(
        name = "sync-users",
        long_about = "Sync the allowed-users list to the database.\n\n\
            Reads the users file (one email per line, '#' comments allowed) \
            and delegates the sync. Backend only, pass-only gate, same as \
            migrate.",
        after_help = "\
WORKFLOW EXAMPLES:
    cd hello-world-be && dh db sync-users"
    )]
    SyncUsers,
}
