//! `murmur repos`: list, clone, write, diff and commit destination repos.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use murmur_core::SystemRunner;
use murmur_sync::{
    diff_targets, ensure_complete, MatchMode, Outcome, Synchronizer, TargetReport, WriteReport,
    WriteResult, DEFAULT_COMMIT_MSG,
};

use super::common::{RepoArgs, ScopeArgs};

#[derive(Subcommand, Debug)]
pub enum ReposCommand {
    /// Print each unique destination as repo:branch.
    List(ListArgs),
    /// Shallow-clone every destination repository.
    Clone(CloneArgs),
    /// Copy rendered artifacts into cloned repositories.
    Write(WriteArgs),
    /// Show what write would change.
    Diff(DiffArgs),
    /// Commit and push (or run a commit script) where something changed.
    Commit(CommitArgs),
}

pub fn run(command: ReposCommand) -> Result<()> {
    match command {
        ReposCommand::List(args) => args.run(),
        ReposCommand::Clone(args) => args.run(),
        ReposCommand::Write(args) => args.run(),
        ReposCommand::Diff(args) => args.run(),
        ReposCommand::Commit(args) => args.run(),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Descriptor files, or `-` to read them from stdin.
    pub files: Vec<String>,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let targets = self.repo.targets(&self.scope, &self.files)?;
        let sync = Synchronizer::new(SystemRunner, self.repo.config(self.scope.errexit)?);
        let rows = sync.list_repos(&targets);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }
        for row in rows {
            println!("{row}");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// clone
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct CloneArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Remove and re-clone working copies that already exist.
    #[arg(long)]
    pub overwrite: bool,

    pub files: Vec<String>,
}

impl CloneArgs {
    pub fn run(self) -> Result<()> {
        let targets = self.repo.targets(&self.scope, &self.files)?;
        let mut config = self.repo.config(self.scope.errexit)?;
        config.overwrite = self.overwrite;

        let reports = Synchronizer::new(SystemRunner, config)
            .clone_repos(&targets)
            .context("clone failed")?;
        print_reports(&reports);
        ensure_complete(&reports).context("clone failed")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// write
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct WriteArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Artifact naming convention: prefix (<prefix>-<type>.json) or app (*-<app>-<type>.json).
    #[arg(long = "match", default_value_t = MatchMode::Prefix)]
    pub match_mode: MatchMode,

    /// Show what would be written without writing any files.
    #[arg(long)]
    pub dry_run: bool,

    pub files: Vec<String>,
}

impl WriteArgs {
    pub fn run(self) -> Result<()> {
        let targets = self.repo.targets(&self.scope, &self.files)?;
        let mut config = self.repo.config(self.scope.errexit)?;
        config.match_mode = self.match_mode;
        config.dry_run = self.dry_run;

        let reports = Synchronizer::new(SystemRunner, config)
            .write_repos(&targets)
            .context("write failed")?;
        print_writes(&reports, self.dry_run);
        Ok(())
    }
}

fn print_writes(reports: &[WriteReport], dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    for report in reports {
        let changed = report
            .writes
            .iter()
            .filter(|w| !matches!(w, WriteResult::Unchanged { .. }))
            .count();
        println!(
            "{prefix}{} {} ({changed} written, {} unchanged)",
            "✓".green(),
            report.key,
            report.writes.len() - changed
        );
        for w in &report.writes {
            match w {
                WriteResult::Written { dest, .. } => println!("  ✎  {}", dest.display()),
                WriteResult::WouldWrite { dest, .. } => println!("  ~  {}", dest.display()),
                WriteResult::Unchanged { dest, .. } => println!("  ·  {}", dest.display()),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    #[command(flatten)]
    pub repo: RepoArgs,

    #[arg(long = "match", default_value_t = MatchMode::Prefix)]
    pub match_mode: MatchMode,

    pub files: Vec<String>,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let targets = self.repo.targets(&self.scope, &self.files)?;
        let mut config = self.repo.config(self.scope.errexit)?;
        config.match_mode = self.match_mode;

        let diffs = diff_targets(&config, &targets).context("diff failed")?;
        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }
        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// commit
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct CommitArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Script run in each changed working copy instead of commit + push.
    #[arg(long)]
    pub commit_script: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_COMMIT_MSG)]
    pub commit_msg: String,

    pub files: Vec<String>,
}

impl CommitArgs {
    pub fn run(self) -> Result<()> {
        let targets = self.repo.targets(&self.scope, &self.files)?;
        let mut config = self.repo.config(self.scope.errexit)?;
        config.commit_script = self.commit_script;
        config.commit_msg = self.commit_msg;

        let reports = Synchronizer::new(SystemRunner, config)
            .commit_repos(&targets)
            .context("commit failed")?;
        print_reports(&reports);
        ensure_complete(&reports).context("commit failed")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Shared output
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "target")]
    target: String,
    #[tabled(rename = "repo")]
    repo: String,
    #[tabled(rename = "outcome")]
    outcome: String,
}

pub(crate) fn print_reports(reports: &[TargetReport]) {
    if reports.is_empty() {
        return;
    }
    let rows: Vec<ReportRow> = reports
        .iter()
        .map(|r| ReportRow {
            target: r.key.to_string(),
            repo: r.repo.clone(),
            outcome: outcome_label(&r.outcome),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Cloned | Outcome::Pushed | Outcome::ScriptRan => outcome.to_string().green().to_string(),
        Outcome::Skipped(_) | Outcome::NoChanges => outcome.to_string().yellow().to_string(),
        Outcome::Failed(_) => outcome.to_string().red().to_string(),
    }
}
