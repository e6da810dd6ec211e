//! commit-assist - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use tracing_subscriber::EnvFilter;

use commit_assist::commit::CommitMessage;
use commit_assist::git::{Project, check_git_installed};
use commit_assist::session::{Assistant, Generation, commit_status_line};
use commit_assist::{OpenAiCompatClient, Settings, SystemRunner};

/// Generate commit messages for staged changes using a local model.
#[derive(Parser, Debug)]
#[command(name = "commit-assist")]
#[command(about = "Generate commit messages for staged changes using a local model")]
#[command(version)]
struct Cli {
    /// Repository to operate on (any path inside the working tree)
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Chat-completion base URL (overrides COMMIT_ASSIST_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Model name (overrides COMMIT_ASSIST_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stage all changes and generate a commit message
    Generate {
        /// Extra context for the model, appended to the prompt verbatim
        #[arg(long)]
        context: Option<String>,

        /// Commit with the generated message
        #[arg(long)]
        commit: bool,

        /// Skip the confirmation prompt when committing
        #[arg(long, requires = "commit")]
        yes: bool,

        /// Push after committing
        #[arg(long, requires = "commit")]
        push: bool,
    },

    /// Stage all changes and commit with the given message
    Commit {
        /// Summary line
        #[arg(long)]
        summary: String,

        /// Description (bullet list)
        #[arg(long, default_value = "")]
        description: String,

        /// Push after committing
        #[arg(long)]
        push: bool,
    },

    /// Stage all changes and list the staged files
    Files,

    /// Check that the model endpoint answers
    TestConnection,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::from_env().with_overrides(cli.base_url.clone(), cli.model.clone());
    let gateway = OpenAiCompatClient::new(&settings).context("Failed to build HTTP client")?;
    let runner = SystemRunner::new(settings.git_timeout);
    let assistant =
        Assistant::new(runner, gateway).with_empty_diff_retries(settings.empty_diff_retries);

    if let Command::TestConnection = cli.command {
        println!("Testing connection to {}...", settings.base_url);
        let reply = assistant.test_connection().await?;
        println!("Connected. Model replied: {reply}");
        return Ok(());
    }

    check_git_installed().context("git is required")?;
    let project = Project::open(&cli.repo)
        .context("Not a git repository. Run commit-assist from within a git repository.")?;

    match cli.command {
        Command::Generate {
            context,
            commit,
            yes,
            push,
        } => {
            println!("Staging changes (git add -A) and preparing diff...");
            let generation = assistant.generate(&project, context.as_deref()).await?;
            println!("{}", generation.status_line());

            let generated = match generation {
                Generation::Generated(generated) => generated,
                Generation::NoChanges => return Ok(()),
            };

            if generated.diff_truncated {
                println!("Note: the diff was too large and was truncated before sending.");
            }
            println!();
            println!("{}", generated.message.format());
            println!();

            if !commit {
                return Ok(());
            }

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Commit with this message?")
                    .default(true)
                    .interact()
                    .context("Confirmation prompt failed")?;
                if !confirmed {
                    println!("Commit cancelled.");
                    return Ok(());
                }
            }

            commit_and_maybe_push(&assistant, &project, &generated.message, push).await?;
        }
        Command::Commit {
            summary,
            description,
            push,
        } => {
            let message = CommitMessage::new(summary, description);
            commit_and_maybe_push(&assistant, &project, &message, push).await?;
        }
        Command::Files => {
            let files = assistant.staged_files(&project).await?;
            if files.is_empty() {
                println!("No staged changes.");
            }
            for file in files {
                match file.old_path {
                    Some(old) => println!("{:>8}  {} -> {}", file.status.to_string(), old, file.path),
                    None => println!("{:>8}  {}", file.status.to_string(), file.path),
                }
            }
        }
        Command::TestConnection => {}
    }

    Ok(())
}

async fn commit_and_maybe_push(
    assistant: &Assistant<SystemRunner, OpenAiCompatClient>,
    project: &Project,
    message: &CommitMessage,
    push: bool,
) -> Result<()> {
    if message.summary_too_long() {
        eprintln!("Warning: summary is longer than 72 characters.");
    }

    println!("Committing changes...");
    let output = assistant.commit(project, message).await?;
    println!("{}", commit_status_line(&output));

    if push {
        let branch = project.current_branch()?.unwrap_or_else(|| "HEAD".to_string());
        println!("Pushing {branch}...");
        assistant.push(project).await?;
        println!("Push completed.");
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
