use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use dawvc_store::{FsPersistence, RepoConfig, RepoLayout, Repository};
use dawvc_types::Commit;
use serde::Serialize;

use crate::cli::*;
use crate::render::{print_changes, print_json, ChangeReport};

/// Run one parsed command against the repository in the current directory.
pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let root = std::env::current_dir().context("cannot determine working directory")?;
    let layout = RepoLayout::new(root);
    let format = cli.format;
    match cli.command {
        Command::Init => cmd_init(&layout, format),
        Command::Add(args) => cmd_add(&open(&layout)?, args, format),
        Command::Commit(args) => cmd_commit(&open(&layout)?, args, format),
        Command::Status(args) => cmd_status(&open(&layout)?, &args.project, format),
        Command::Diff(args) => cmd_diff(&open(&layout)?, args, format),
        Command::Log(args) => cmd_log(&open(&layout)?, args, format),
        Command::Show(args) => cmd_show(&open(&layout)?, &args.hash, format),
    }
}

type Repo = Repository<FsPersistence>;

fn open(layout: &RepoLayout) -> anyhow::Result<Repo> {
    Ok(Repository::open(FsPersistence::new(layout.clone()))?)
}

fn cmd_init(layout: &RepoLayout, format: OutputFormat) -> anyhow::Result<()> {
    Repository::init(FsPersistence::new(layout.clone()), RepoConfig::default())?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "initialized": layout.meta_dir.display().to_string(),
        })),
        OutputFormat::Text => {
            println!(
                "{} Initialized DAW repository in {}",
                "✓".green().bold(),
                layout.meta_dir.display().to_string().bold()
            );
            Ok(())
        }
    }
}

fn cmd_add(repo: &Repo, args: AddArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut staged = Vec::with_capacity(args.projects.len());
    for project in &args.projects {
        let entry = repo.add(project)?;
        if format == OutputFormat::Text {
            println!("  {} {}", "staged:".green(), entry.path);
        }
        staged.push(entry.path);
    }
    if format == OutputFormat::Json {
        print_json(&serde_json::json!({ "staged": staged }))?;
    }
    Ok(())
}

#[derive(Serialize)]
struct CommitSummary<'a> {
    hash: String,
    message: &'a str,
    timestamp: String,
    paths: Vec<&'a str>,
}

impl<'a> From<&'a Commit> for CommitSummary<'a> {
    fn from(commit: &'a Commit) -> Self {
        Self {
            hash: commit.hash.to_hex(),
            message: &commit.message,
            timestamp: commit.timestamp.to_rfc3339(),
            paths: commit.paths(),
        }
    }
}

fn cmd_commit(repo: &Repo, args: CommitArgs, format: OutputFormat) -> anyhow::Result<()> {
    let commit = repo.commit(&args.message)?;
    match format {
        OutputFormat::Json => print_json(&CommitSummary::from(&commit)),
        OutputFormat::Text => {
            println!(
                "{} [{}] {}",
                "✓".green().bold(),
                commit.hash.to_string().yellow(),
                commit.message
            );
            for path in commit.paths() {
                println!("  {path}");
            }
            Ok(())
        }
    }
}

fn cmd_status(repo: &Repo, project: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let status = repo.status(project)?;
    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "path": status.path,
            "tracked": status.tracked,
            "clean": status.is_clean(),
            "staged": status.staged.as_ref().map(ChangeReport::from),
            "working": ChangeReport::from(&status.working),
        }));
    }

    let tracking = if status.tracked { "tracked".green() } else { "untracked".red() };
    println!("Project {} ({tracking})", status.path.bold());
    if let Some(staged) = &status.staged {
        println!("Changes staged for commit:");
        print_changes(staged, "  ");
    }
    if status.working.is_empty() {
        println!("{} Working copy matches last commit.", "✓".green());
    } else {
        println!("Changes in working copy:");
        print_changes(&status.working, "  ");
    }
    Ok(())
}

fn cmd_diff(repo: &Repo, args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let set = if args.staged {
        match repo.diff_staged(&args.project)? {
            Some(set) => set,
            None => {
                match format {
                    OutputFormat::Json => print_json(&serde_json::json!({ "staged": null }))?,
                    OutputFormat::Text => println!("Nothing staged for {}.", args.project.display()),
                }
                return Ok(());
            }
        }
    } else {
        repo.diff_working(&args.project)?
    };

    match format {
        OutputFormat::Json => print_json(&ChangeReport::from(&set)),
        OutputFormat::Text => {
            print_changes(&set, "");
            Ok(())
        }
    }
}

fn cmd_log(repo: &Repo, args: LogArgs, format: OutputFormat) -> anyhow::Result<()> {
    let commits = repo.log(args.limit)?;
    if format == OutputFormat::Json {
        let summaries: Vec<CommitSummary<'_>> = commits.iter().map(CommitSummary::from).collect();
        return print_json(&summaries);
    }
    for commit in &commits {
        println!("{}: {}", commit.hash.to_string().yellow(), commit.message);
        if args.full {
            println!("  Date: {}", commit.timestamp.to_rfc3339().dimmed());
            for path in commit.paths() {
                println!("  {path}");
            }
        }
    }
    Ok(())
}

fn cmd_show(repo: &Repo, hash: &str, format: OutputFormat) -> anyhow::Result<()> {
    let detail = repo.show(hash)?;
    if format == OutputFormat::Json {
        let paths: Vec<serde_json::Value> = detail
            .paths
            .iter()
            .map(|p| {
                serde_json::json!({
                    "path": p.path,
                    "new": p.is_new,
                    "changes": ChangeReport::from(&p.changes),
                })
            })
            .collect();
        return print_json(&serde_json::json!({
            "commit": CommitSummary::from(&detail.commit),
            "paths": paths,
        }));
    }

    let commit = &detail.commit;
    println!("commit {}", commit.hash.to_string().yellow().bold());
    println!("Date:   {}", commit.timestamp.to_rfc3339());
    println!("\n    {}\n", commit.message);
    for change in &detail.paths {
        if change.is_new {
            println!("{} {}", change.path.bold(), "(new project)".cyan());
        } else {
            println!("{}", change.path.bold());
            print_changes(&change.changes, "  ");
        }
    }
    Ok(())
}
