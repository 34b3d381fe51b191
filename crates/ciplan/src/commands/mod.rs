mod plan;
mod run;
mod validate;

use std::path::{Path, PathBuf};

use ciplan_config::{Config, DEFAULT_CONFIG_FILE, Provenance};
use ciplan_engine::{Decision, PlanRequest, Revisions};
use ciplan_git::{DiffBase, Repository, collect_changes};
use ciplan_graph::discover_graph;
use clap::{Args, Subcommand, ValueEnum};

use crate::environment;
use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Compute the CI plan for the current change set
    Plan(PlanArgs),
    /// Plan, then execute the configured command for every active surface
    Run(RunArgs),
    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Commands {
    pub(crate) fn execute(self, start_path: &Path) -> Result<()> {
        match self {
            Self::Plan(args) => plan::run(&args, start_path),
            Self::Run(args) => run::run(&args, start_path),
            Self::Config { command } => match command {
                ConfigCommands::Validate(args) => validate::run(&args, start_path),
            },
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommands {
    /// Parse and validate ciplan.toml
    Validate(ValidateArgs),
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    Text,
    Json,
    Kv,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ProvenanceArg {
    /// Inspect CI actor variables for a bot author
    Auto,
    Human,
    Automated,
}

impl ProvenanceArg {
    fn resolve(self) -> Provenance {
        match self {
            Self::Auto => environment::detect_provenance(),
            Self::Human => Provenance::Human,
            Self::Automated => Provenance::Automated,
        }
    }
}

#[derive(Args)]
pub(crate) struct PlanArgs {
    /// Diff against this revision (CIPLAN_BASE_REV is honored when omitted)
    #[arg(long, value_name = "REV")]
    pub(crate) base: Option<String>,

    /// Diff against the merge base of HEAD and this branch
    #[arg(long = "merge-base", value_name = "BRANCH", conflicts_with = "base")]
    pub(crate) merge_base: Option<String>,

    /// Treat every tracked file as changed
    #[arg(long, conflicts_with_all = ["base", "merge_base"])]
    pub(crate) all: bool,

    /// Restrict the rendered plan to one surface
    #[arg(long, value_name = "SURFACE")]
    pub(crate) surface: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub(crate) format: Format,

    /// Include per-path reasons in the text output
    #[arg(long)]
    pub(crate) explain: bool,

    /// Change authorship, which selects the confidence policy
    #[arg(long, value_enum, default_value_t = ProvenanceArg::Auto)]
    pub(crate) provenance: ProvenanceArg,

    /// Write the full JSON decision to this file for audit
    #[arg(long, value_name = "PATH")]
    pub(crate) receipt: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct RunArgs {
    /// Diff against this revision (CIPLAN_BASE_REV is honored when omitted)
    #[arg(long, value_name = "REV")]
    pub(crate) base: Option<String>,

    /// Diff against the merge base of HEAD and this branch
    #[arg(long = "merge-base", value_name = "BRANCH", conflicts_with = "base")]
    pub(crate) merge_base: Option<String>,

    /// Treat every tracked file as changed
    #[arg(long, conflicts_with_all = ["base", "merge_base"])]
    pub(crate) all: bool,

    /// Change authorship, which selects the confidence policy
    #[arg(long, value_enum, default_value_t = ProvenanceArg::Auto)]
    pub(crate) provenance: ProvenanceArg,

    /// Print what would run without executing anything
    #[arg(long)]
    pub(crate) dry_run: bool,
}

#[derive(Args)]
pub(crate) struct ValidateArgs {
    /// Also flag unused surfaces and unmapped profiles
    #[arg(long)]
    pub(crate) strict: bool,
}

pub(crate) struct PlannedRun {
    pub(crate) config: Config,
    pub(crate) root: PathBuf,
    pub(crate) decision: Decision,
}

/// Selects the diff baseline. With no explicit choice and no environment
/// override the full tree is planned, which is the conservative default.
fn baseline(base: Option<&str>, merge_base: Option<&str>, all: bool) -> DiffBase {
    if all {
        return DiffBase::All;
    }
    if let Some(branch) = merge_base {
        return DiffBase::MergeBase {
            branch: branch.to_string(),
        };
    }
    match base
        .map(ToString::to_string)
        .or_else(environment::base_rev_override)
    {
        Some(base) => DiffBase::Revision { base },
        None => DiffBase::All,
    }
}

/// Shared front half of `plan` and `run`: open the repository, discover the
/// workspace, load the configuration, collect the diff, and decide.
fn compute_plan(
    start_path: &Path,
    base: DiffBase,
    provenance: Provenance,
) -> Result<PlannedRun> {
    let repo = Repository::open(start_path)?;
    let graph = discover_graph(repo.root())?;
    let config = Config::load(&graph.root().join(DEFAULT_CONFIG_FILE))?;

    let change_set = collect_changes(&repo, &base)?;

    let decision = ciplan_engine::plan(PlanRequest {
        config: &config,
        graph: &graph,
        changes: &change_set.paths,
        revisions: Revisions {
            base: change_set.base,
            target: change_set.target,
        },
        provenance,
        dirty_ignored: change_set.dirty_ignored,
    });

    Ok(PlannedRun {
        config,
        root: graph.root().to_path_buf(),
        decision,
    })
}
