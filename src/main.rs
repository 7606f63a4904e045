use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use version_gate::cli::orchestration::{RunReport, EXIT_FATAL};
use version_gate::cli::{run_check, CheckWorkflowArgs};
use version_gate::config::{self, Config};
use version_gate::domain::{CiEnvironment, ExecutionContext};
use version_gate::git::Git2Repository;
use version_gate::{output, registry, ui};

#[derive(clap::Parser)]
#[command(
    name = "version-gate",
    version,
    about = "Validate package version bumps and decide the release tag"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        long,
        value_enum,
        help = "Execution context (detected from GITHUB_EVENT_NAME when omitted)"
    )]
    context: Option<ExecutionContext>,

    #[arg(
        short,
        long,
        env = "GITHUB_BASE_REF",
        help = "Branch whose tags define the release state"
    )]
    base_branch: Option<String>,

    #[arg(long, help = "Resolve release state from this reference instead")]
    reference: Option<String>,

    #[arg(long, default_value = ".", help = "Path inside the repository")]
    repo: PathBuf,

    #[arg(long, help = "Skip fetching the base branch and tags")]
    no_fetch: bool,

    #[arg(long, help = "Decide the tag without writing step outputs")]
    dry_run: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            return exit_code(EXIT_FATAL);
        }
    };

    match run(&args, &config) {
        Ok(code) => exit_code(code),
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            exit_code(EXIT_FATAL)
        }
    }
}

fn run(args: &Args, config: &Config) -> anyhow::Result<i32> {
    let repo = Git2Repository::open(&args.repo)?;
    let workspace_root = repo
        .workdir()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("Repository at {} has no working tree", args.repo.display()))?;

    let registry = registry::from_config(&config.registry)?;

    let context = args
        .context
        .unwrap_or_else(|| ExecutionContext::detect(&CiEnvironment::from_env()));

    let workflow_args = CheckWorkflowArgs {
        context,
        base_branch: config
            .repository
            .effective_base_branch(args.base_branch.as_deref()),
        reference: args.reference.clone(),
        fetch: config.repository.fetch && !args.no_fetch,
    };

    if workflow_args.fetch {
        ui::display_status(&format!(
            "Fetching {} and tags from {}...",
            workflow_args.base_branch, config.repository.remote
        ));
    }

    let report = run_check(
        &repo,
        registry.as_ref(),
        &workspace_root,
        config,
        &workflow_args,
    )?;

    for warning in report.warnings() {
        ui::display_boundary_warning(warning);
    }
    ui::display_observed_versions(report.outcomes());

    match &report {
        RunReport::Tagged(result) => {
            ui::display_decided_tag(&result.tag, result.context);

            if args.dry_run {
                ui::display_status("Dry run: step outputs not written");
            } else if config.output.github_output {
                if let Some(path) = output::github_output_path() {
                    output::write_github_output(&path, &config.output.key, &result.tag)?;
                    tracing::debug!(path = %path.display(), "wrote step output");
                }
            }
        }
        RunReport::Rejected(run) => ui::display_failure_report(&run.failure),
    }

    Ok(report.exit_code())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("VERSION_GATE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX))
}
