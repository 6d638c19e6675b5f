use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use verbump::bump::{BumpKind, BumpRequest, Services};
use verbump::cli::{self, BumpWorkflowArgs, WorkflowResult};
use verbump::config::{self, Config};
use verbump::domain::BumpLabel;
use verbump::git::Git2Repository;
use verbump::hooks::ShellRunner;
use verbump::ui;

#[derive(clap::Parser)]
#[command(
    name = "verbump",
    version,
    about = "Manage a semantic version file with hooks, plugins and workspaces"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Version file (overrides config `path`)")]
    path: Option<PathBuf>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the current version
    Show,
    /// Overwrite the version file
    Set { version: String },
    /// Create the version file from the latest tag, or 0.1.0
    Init,
    /// Bump the version
    Bump(BumpArgs),
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum KindArg {
    Patch,
    Minor,
    Major,
    Release,
    Auto,
    Pre,
}

impl From<KindArg> for BumpKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Patch => BumpKind::Patch,
            KindArg::Minor => BumpKind::Minor,
            KindArg::Major => BumpKind::Major,
            KindArg::Release => BumpKind::Release,
            KindArg::Auto => BumpKind::Auto,
            KindArg::Pre => BumpKind::Pre,
        }
    }
}

#[derive(clap::Args)]
struct BumpArgs {
    #[arg(value_enum)]
    kind: KindArg,

    #[arg(long, help = "Pre-release label, e.g. beta or rc.1")]
    pre: Option<String>,

    #[arg(long, help = "Build metadata to attach")]
    meta: Option<String>,

    #[arg(long, help = "Keep existing build metadata")]
    preserve_meta: bool,

    #[arg(long, help = "Do not run pre-release or post-bump hooks")]
    skip_hooks: bool,

    #[arg(long, help = "Disable bump inference for `auto`")]
    no_infer: bool,

    #[arg(long, help = "Explicit label for `auto`: patch, minor or major")]
    label: Option<BumpLabel>,

    #[arg(long, help = "Bump every configured workspace module")]
    workspace: bool,

    #[arg(long, help = "Run workspace modules concurrently")]
    parallel: bool,

    #[arg(long, help = "Stop at the first failing module")]
    fail_fast: bool,
}

impl BumpArgs {
    fn into_workflow_args(self, version_path: PathBuf) -> BumpWorkflowArgs {
        let mut request = BumpRequest::new(self.kind.into());
        if let Some(label) = self.label {
            request = request.with_label(label);
        }
        if let Some(pre) = self.pre {
            request = request.with_pre_release(pre);
        }
        if let Some(meta) = self.meta {
            request = request.with_metadata(meta);
        }
        if self.preserve_meta {
            request = request.preserving_meta();
        }
        if self.skip_hooks {
            request = request.skipping_hooks();
        }
        if self.no_infer {
            request = request.without_inference();
        }

        BumpWorkflowArgs {
            version_path,
            request,
            workspace: self.workspace,
            parallel: self.parallel,
            fail_fast: self.fail_fast,
        }
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("verbump={level}")))
        .context("Failed to create tracing filter")?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    Ok(())
}

fn open_services() -> Result<Services> {
    let repo = Git2Repository::open(".").context("Git repository error")?;
    Ok(Services::from_repository(Arc::new(repo), Arc::new(ShellRunner)))
}

/// Cancel the token on Ctrl-C so running pipelines stop at their next check
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let handle = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            handle.cancel();
        }
    });
    token
}

async fn run(args: Args) -> Result<bool> {
    let config: Config = config::load_config(args.config.as_deref())?;
    let version_path = args.path.unwrap_or_else(|| config.path.clone());

    match args.command {
        Command::Show => {
            println!("{}", cli::show_version(&version_path)?);
        }
        Command::Set { version } => {
            let version = cli::set_version(&version_path, &version)?;
            ui::display_success(&format!("Set {} to {}", version_path.display(), version));
        }
        Command::Init => {
            let services = open_services()?;
            if !cli::init_version(&version_path, &services)? {
                ui::display_status(&format!("{} already exists", version_path.display()));
            }
        }
        Command::Bump(bump) => {
            let services = open_services()?;
            let cancel = cancel_on_ctrl_c();
            let workflow_args = bump.into_workflow_args(version_path);
            let result = cli::run_bump_workflow(workflow_args, &config, services, &cancel).await?;

            match &result {
                WorkflowResult::Single(outcome) => ui::display_outcome(outcome),
                WorkflowResult::Workspace(results) => ui::display_execution_results(results),
            }
            return Ok(result.is_clean());
        }
    }
    Ok(true)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.verbose) {
        eprintln!("{e:#}");
    }

    match run(args).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            ui::display_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}
