use crate::audit::AuditLogger;
use crate::config::Config;
use crate::error::AppResult;
use crate::error_translation::ErrorTranslator;
use crate::git::{CommitMessage, GitExecutor, PipelineReport, Repository};
use crate::github::{BranchLister, GitHubClient, RepoCoordinates, UnconfiguredLister, parse_github_remote};
use crate::session::{CheckoutOutcome, OperationError, Session, SwitchResolution};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "gitpanel")]
#[command(about = "Branch, commit and sync panel for git repositories hosted on GitHub", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Path inside the working tree (default: current directory)
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// GitHub repository owner (default: config, then the remote URL)
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// GitHub repository name (default: config, then the remote URL)
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open the interactive panel (default)
    Tui,

    /// List the branches on GitHub
    Branches,

    /// Stage everything and list added, modified and deleted files
    Changes,

    /// Switch branches, deciding what happens to uncommitted work
    Checkout {
        branch: String,

        /// Carry uncommitted changes over to the new branch
        #[arg(long, conflicts_with = "leave")]
        bring: bool,

        /// Park uncommitted changes on the current branch
        #[arg(long)]
        leave: bool,
    },

    /// Stage everything, commit and push
    Commit {
        /// Commit summary
        #[arg(short, long)]
        summary: String,

        /// Commit description; each line becomes a paragraph
        #[arg(short, long, default_value = "")]
        description: String,

        /// Branch to push (default: current branch)
        #[arg(long)]
        branch: Option<String>,
    },

    /// Fetch and pull a branch
    Sync {
        /// Branch to sync (default: current branch)
        #[arg(long)]
        branch: Option<String>,
    },

    /// Create or delete a branch locally and on the remote
    Branch {
        #[command(subcommand)]
        action: BranchCommand,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum BranchCommand {
    /// Create a branch and push it
    Add { name: String },
    /// Delete a merged branch locally, then on the remote
    Remove { name: String },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// True when the interactive panel should start
    pub fn wants_tui(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tui))
    }
}

/// Work out which GitHub repository to list branches from.
///
/// Flags win over config, config wins over the remote URL.
pub async fn resolve_coordinates(
    args: &GlobalArgs,
    config: &Config,
    repo: &Repository,
    cancel: &CancellationToken,
) -> AppResult<Option<RepoCoordinates>> {
    let from_remote = if args.owner.is_none() || args.name.is_none() {
        repo.remote_url(cancel)
            .await?
            .and_then(|url| parse_github_remote(&url))
    } else {
        None
    };

    let owner = args
        .owner
        .clone()
        .or_else(|| config.github.owner.clone())
        .or_else(|| from_remote.as_ref().map(|c| c.owner.clone()));
    let name = args
        .name
        .clone()
        .or_else(|| config.github.repo.clone())
        .or_else(|| from_remote.as_ref().map(|c| c.repo.clone()));

    Ok(owner.zip(name).map(|(owner, name)| RepoCoordinates::new(owner, name)))
}

/// Discover the repository and wire up everything a session needs
pub async fn open_session(args: &GlobalArgs, config: &Config) -> AppResult<Session> {
    let discovered = match args.repo {
        Some(ref path) => Repository::discover_from(path)?,
        None => Repository::discover()?,
    };
    log::debug!("repository at {}", discovered.path().display());

    let executor = GitExecutor::new(discovered.path())
        .with_timeout(Duration::from_secs(config.git.timeout_seconds));
    let mut repo = discovered.with_remote(config.git.remote.clone());
    repo.set_runner(Arc::new(executor));

    if config.behavior.log_commands {
        match AuditLogger::new() {
            Ok(audit) => repo = repo.with_audit(audit),
            Err(e) => log::warn!("audit history disabled: {}", e),
        }
    }

    let cancel = CancellationToken::new();
    let lister: Arc<dyn BranchLister> = match resolve_coordinates(args, config, &repo, &cancel).await? {
        Some(coordinates) => {
            log::info!("listing branches of {}", coordinates);
            Arc::new(GitHubClient::from_config(config, coordinates)?)
        }
        None => {
            log::warn!("no GitHub repository configured and origin is not a GitHub URL");
            Arc::new(UnconfiguredLister::new(
                "pass --owner and --name, or set github.owner and github.repo",
            ))
        }
    };

    Ok(Session::new(Arc::new(repo), lister).with_restore_parked(config.behavior.restore_parked_changes))
}

/// Run one non-interactive command. `Ok(false)` means a git step failed.
pub async fn run_command(command: Commands, args: &GlobalArgs, config: &Config) -> AppResult<bool> {
    if let Commands::Config {
        action: ConfigCommand::Init { force },
    } = command
    {
        return init_config(force);
    }

    let mut session = open_session(args, config).await?;
    let cancel = CancellationToken::new();

    match command {
        Commands::Tui | Commands::Config { .. } => Ok(true),
        Commands::Branches => {
            session.select_current_branch(&cancel).await?;
            session.refresh_branches(&cancel).await?;
            for branch in session.branches() {
                let marker = if session.selected() == Some(branch.as_str()) { "*" } else { " " };
                println!("{} {}", marker, branch);
            }
            Ok(true)
        }
        Commands::Changes => {
            let report = session.get_changes(&cancel).await?;
            print_changes(&session);
            Ok(report.succeeded())
        }
        Commands::Checkout { branch, bring, leave } => {
            session.select_current_branch(&cancel).await?;
            match session.request_checkout(&branch, &cancel).await? {
                CheckoutOutcome::AlreadySelected => {
                    println!("Already on '{}'", branch);
                    Ok(true)
                }
                CheckoutOutcome::CheckedOut(reports) => Ok(print_reports(&reports)),
                CheckoutOutcome::NeedsConfirmation(switch) => {
                    let resolution = if bring {
                        SwitchResolution::Bring
                    } else if leave {
                        SwitchResolution::Leave
                    } else {
                        return Err(OperationError::SwitchNeedsResolution {
                            from: switch.from,
                            to: switch.to,
                        }
                        .into());
                    };
                    let reports = session.resolve_switch(resolution, &cancel).await?;
                    Ok(print_reports(&reports))
                }
            }
        }
        Commands::Commit {
            summary,
            description,
            branch,
        } => {
            select_branch(&mut session, branch, &cancel).await?;
            let message = CommitMessage::new(summary, description);
            if !message.has_summary() {
                return Err(OperationError::EmptySummary.into());
            }
            session.get_changes(&cancel).await?;
            print_changes(&session);
            let report = session.commit_and_push(&message, &cancel).await?;
            Ok(print_reports(std::slice::from_ref(&report)))
        }
        Commands::Sync { branch } => {
            select_branch(&mut session, branch, &cancel).await?;
            let report = session.fetch_and_pull(&cancel).await?;
            Ok(print_reports(std::slice::from_ref(&report)))
        }
        Commands::Branch { action } => {
            let report = match action {
                BranchCommand::Add { name } => session.add_branch(&name, &cancel).await?,
                BranchCommand::Remove { name } => session.remove_branch(&name, &cancel).await?,
            };
            Ok(print_reports(std::slice::from_ref(&report)))
        }
    }
}

async fn select_branch(session: &mut Session, branch: Option<String>, cancel: &CancellationToken) -> AppResult<()> {
    match branch {
        Some(name) => session.select(name),
        None => {
            session.select_current_branch(cancel).await?;
        }
    }
    Ok(())
}

fn init_config(force: bool) -> AppResult<bool> {
    let path = Config::config_path()?;
    if path.exists() && !force {
        println!("Config already exists at {} (use --force to overwrite)", path.display());
        return Ok(false);
    }

    let written = Config::default().save()?;
    println!("Wrote {}", written.display());
    Ok(true)
}

fn print_changes(session: &Session) {
    let changes = session.changes();
    if changes.is_empty() {
        println!("No local changes");
        return;
    }

    for (label, files) in [
        ("Added", &changes.added),
        ("Modified", &changes.modified),
        ("Deleted", &changes.deleted),
    ] {
        if files.is_empty() {
            continue;
        }
        println!("{} ({}):", label, files.len());
        for file in files {
            println!("  {}", file);
        }
    }
}

/// Render reports the way the output pane does. Returns false if any step failed.
fn print_reports(reports: &[PipelineReport]) -> bool {
    for report in reports {
        print!("{}", render_report(report));
    }
    reports.iter().all(PipelineReport::succeeded)
}

/// Plain-text rendering of a pipeline report
pub fn render_report(report: &PipelineReport) -> String {
    let mut text = format!("==> {}\n", report.name);

    for outcome in &report.outcomes {
        text.push_str(&format!("$ {}\n", outcome.command));
        for line in outcome.output.stdout.lines() {
            text.push_str(&format!("  {}\n", line));
        }
        for line in outcome.output.stderr.lines() {
            text.push_str(&format!("  {}\n", line));
        }
        if !outcome.output.success {
            text.push_str(&format!("  (exit {})\n", outcome.output.exit_code));
        }
    }

    for skipped in &report.skipped {
        text.push_str(&format!("skipped: {}\n", skipped));
    }

    for diagnosis in ErrorTranslator::diagnose(report) {
        text.push_str(&format!("! {}\n", diagnosis.simple_message));
        if let Some(suggestion) = diagnosis.suggestion {
            text.push_str(&format!("  hint: {}\n", suggestion));
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::executor::CommandOutput;
    use crate::git::pipeline::StepOutcome;

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["gitpanel"]).unwrap();
        assert!(cli.wants_tui());

        let cli = Cli::try_parse_from(["gitpanel", "tui", "--repo", "/tmp"]).unwrap();
        assert!(cli.wants_tui());
        assert_eq!(cli.global.repo, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_commit_args() {
        let cli = Cli::try_parse_from([
            "gitpanel", "commit", "-s", "Fix jump", "-d", "line one\nline two", "--branch", "dev",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Commit {
                summary,
                description,
                branch,
            }) => {
                assert_eq!(summary, "Fix jump");
                assert_eq!(description, "line one\nline two");
                assert_eq!(branch.as_deref(), Some("dev"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bring_and_leave_conflict() {
        assert!(Cli::try_parse_from(["gitpanel", "checkout", "dev", "--bring", "--leave"]).is_err());
        assert!(Cli::try_parse_from(["gitpanel", "checkout", "dev", "--leave"]).is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gitpanel", "branches", "--owner", "acme", "--name", "game", "-v"]).unwrap();
        assert_eq!(cli.global.owner.as_deref(), Some("acme"));
        assert_eq!(cli.global.name.as_deref(), Some("game"));
        assert!(cli.global.verbose);
        assert!(!cli.wants_tui());
    }

    #[test]
    fn test_branch_subcommands() {
        let cli = Cli::try_parse_from(["gitpanel", "branch", "remove", "old-feature"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Branch {
                action: BranchCommand::Remove { ref name }
            }) if name == "old-feature"
        ));
    }

    #[test]
    fn test_render_report_marks_failures_and_skips() {
        let report = PipelineReport {
            name: "Remove branch feature".to_string(),
            outcomes: vec![StepOutcome {
                command: "git branch -d feature".to_string(),
                output: CommandOutput {
                    stdout: String::new(),
                    stderr: "error: The branch 'feature' is not fully merged.".to_string(),
                    exit_code: 1,
                    success: false,
                },
            }],
            aborted_at: Some(0),
            skipped: vec!["git push origin --delete feature".to_string()],
        };

        let text = render_report(&report);
        assert!(text.starts_with("==> Remove branch feature\n"));
        assert!(text.contains("$ git branch -d feature\n"));
        assert!(text.contains("(exit 1)"));
        assert!(text.contains("skipped: git push origin --delete feature"));
        assert!(text.contains("! The branch has commits"));
    }
}
