//! Command-line interface for beacon.
//!
//! `beacon generate` writes the snapshot artifacts; `beacon serve` exposes
//! them over HTTP; `beacon brain` updates the `.brain.yml` notebook.

use beacon::brain::{self, BRAIN_FILE, BrainUpdate, DEFAULT_MAX_RECENT};
use beacon::server::{self, AppState};
use beacon::{
    BeaconBuilder, BeaconConfig, DEFAULT_BIND_ADDR, DEFAULT_CHECKPOINT_PATTERN,
    DEFAULT_MAX_INLINE_BYTES, GitCli, NoVcs, VersionControl, generate,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// beacon — project snapshot generator and server
#[derive(Parser)]
#[command(name = "beacon", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write dist/snapshot.yaml and dist/digest.md
    Generate(GenerateArgs),
    /// Serve the artifacts over HTTP
    Serve(ServeArgs),
    /// Update .brain.yml (step, DoD, next steps, recent commands, troubleshooting)
    Brain(BrainArgs),
}

#[derive(Args)]
struct Common {
    /// Project root (default current dir)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Output directory, relative to the root
    #[arg(long, default_value = "dist")]
    output_dir: PathBuf,

    /// Skip all git queries
    #[arg(long)]
    no_git: bool,

    /// Checkpoint tag pattern
    #[arg(long, default_value = DEFAULT_CHECKPOINT_PATTERN)]
    checkpoint_pattern: String,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    common: Common,

    /// Largest file (in bytes) whose content is inlined
    #[arg(long, default_value_t = DEFAULT_MAX_INLINE_BYTES)]
    max_inline_bytes: u64,

    /// Ignore patterns (can be repeated)
    #[arg(short = 'I', long = "ignore")]
    ignore_patterns: Vec<String>,

    /// Honour .gitignore files
    #[arg(long)]
    respect_gitignore: bool,
}

#[derive(Args)]
struct ServeArgs {
    #[command(flatten)]
    common: Common,

    /// Address to listen on
    #[arg(long, env = "BEACON_BIND", default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// Allowed CORS origins (any origin when empty)
    #[arg(long = "cors-origin", env = "BEACON_CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Public base URL reported by /runtime
    #[arg(long, env = "BEACON_PUBLIC_URL")]
    public_url: Option<String>,

    /// Generate the artifacts at startup when they are missing
    #[arg(long)]
    auto_generate: bool,
}

#[derive(Args)]
struct BrainArgs {
    /// Project root holding .brain.yml (default current dir)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Set current_step.name
    #[arg(long)]
    step: Option<String>,

    /// Add a Definition of Done item (can be repeated)
    #[arg(long)]
    dod: Vec<String>,

    /// Append a next step (can be repeated)
    #[arg(long = "next")]
    next_steps: Vec<String>,

    /// Record a recently used command (can be repeated)
    #[arg(long = "add-command")]
    commands: Vec<String>,

    /// Troubleshooting entry as 'issue|cause|fix1;fix2;...'
    #[arg(long)]
    trouble: Option<String>,

    /// Most recent commands to keep
    #[arg(long, default_value_t = DEFAULT_MAX_RECENT)]
    max_recent: usize,
}

impl Common {
    fn builder(&self) -> BeaconBuilder {
        BeaconBuilder::new(&self.root)
            .output_dir(&self.output_dir)
            .checkpoint_pattern(&self.checkpoint_pattern)
    }

    fn vcs(&self, config: &BeaconConfig) -> Arc<dyn VersionControl> {
        if self.no_git {
            Arc::new(NoVcs)
        } else {
            Arc::new(GitCli::new(&config.root, &config.checkpoint_pattern))
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("beacon=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Generate(args) => run_generate(args),
        Command::Serve(args) => run_serve(args),
        Command::Brain(args) => run_brain(args),
    }
}

fn run_generate(args: GenerateArgs) {
    let config = args
        .common
        .builder()
        .max_inline_bytes(args.max_inline_bytes)
        .ignore_patterns(args.ignore_patterns)
        .respect_gitignore(args.respect_gitignore)
        .build();
    let vcs = args.common.vcs(&config);

    match generate(&config, vcs.as_ref()) {
        Ok(artifacts) => {
            println!(
                "Snapshot written: {}, {}",
                artifacts.snapshot.display(),
                artifacts.digest.display()
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}

fn run_serve(args: ServeArgs) {
    let config = args
        .common
        .builder()
        .bind_addr(args.bind)
        .cors_origins(args.cors_origins)
        .public_url(args.public_url)
        .auto_generate_on_missing(args.auto_generate)
        .build();
    let vcs = args.common.vcs(&config);
    let state = AppState::new(config, vcs);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            exit(1);
        }
    };
    if let Err(e) = runtime.block_on(server::serve(state)) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

fn run_brain(args: BrainArgs) {
    let path = args.root.join(BRAIN_FILE);
    let update = BrainUpdate {
        step: args.step,
        definition_of_done: args.dod,
        next_steps: args.next_steps,
        commands: args.commands,
        trouble: args.trouble,
        max_recent: args.max_recent,
    };
    match brain::update_file(&path, &update) {
        Ok(()) => println!("Updated {}", path.display()),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}
