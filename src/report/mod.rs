pub mod types;

pub use types::{Address, PatchSummary, RepoSummary, Report};

use crate::patch::Patch;
use crate::repo::Repo;
use crate::scan::Scan;
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Build a Report from a scan, encoding every address up front.
pub fn build(scan: &Scan) -> Report {
    Report {
        repos: scan.repos.iter().map(summarize_repo).collect(),
        patches: scan.patches.iter().map(summarize_patch).collect(),
        skipped: scan.skipped,
        rejected: scan.rejected,
    }
}

fn summarize_repo(repo: &Repo) -> RepoSummary {
    let title = repo
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| repo.id.clone());
    RepoSummary {
        guid: repo.guid(),
        naddr: repo.naddr().into(),
        title,
        description: repo.description.clone(),
        clone: repo.clone.clone(),
        web: repo.web.clone(),
        relay_hints: repo.relay_hints.clone(),
        incomplete: !repo.is_complete(),
    }
}

fn summarize_patch(patch: &Patch) -> PatchSummary {
    PatchSummary {
        nevent: patch.nevent().into(),
        subject: subject(&patch.preamble),
        repo: patch.repo.as_ref().map(|r| r.guid()),
        files: patch
            .files
            .iter()
            .map(|f| if f.path.is_empty() { "(unnamed)".to_string() } else { f.path.clone() })
            .collect(),
        additions: patch.additions(),
        deletions: patch.deletions(),
    }
}

/// `Subject:` header of a format-patch preamble, or its first non-empty line.
fn subject(preamble: &str) -> String {
    preamble
        .lines()
        .find_map(|line| line.strip_prefix("Subject:"))
        .or_else(|| preamble.lines().map(str::trim).find(|line| !line.is_empty()))
        .map(|line| line.trim().to_string())
        .unwrap_or_else(|| "(no subject)".to_string())
}

/// Output the report to terminal (default) or to a markdown file.
#[instrument(skip(report), fields(repos = report.repos.len(), patches = report.patches.len()))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing report to file");
            write_markdown_report(report, path)
        }
    }
}

fn print_terminal_report(report: &Report) {
    println!();
    println!("═══ Repositories ({}) ═══", report.repos.len());
    if report.repos.is_empty() {
        println!("  None.");
    }
    for repo in &report.repos {
        let marker = if repo.incomplete {
            " [no d tag]".yellow().to_string()
        } else {
            String::new()
        };
        println!("{}{}", repo.title.bold(), marker);
        println!("  guid:  {}", repo.guid);
        println!("  naddr: {}", colorize_address(&repo.naddr));
        if let Some(description) = &repo.description {
            println!("  {}", description);
        }
        for url in &repo.clone {
            println!("  • clone {}", url);
        }
        for url in &repo.web {
            println!("  • web {}", url);
        }
        if !repo.relay_hints.is_empty() {
            println!("  relays: {}", repo.relay_hints.join(", "));
        }
    }
    println!();

    println!("═══ Patches ({}) ═══", report.patches.len());
    if report.patches.is_empty() {
        println!("  None.");
    }
    for patch in &report.patches {
        println!(
            "{} {} {}",
            patch.subject.bold(),
            format!("+{}", patch.additions).green(),
            format!("-{}", patch.deletions).red()
        );
        println!("  nevent: {}", colorize_address(&patch.nevent));
        match &patch.repo {
            Some(repo) => println!("  repo:   {}", repo),
            None => println!("  repo:   {}", "unknown".dimmed()),
        }
        for file in &patch.files {
            println!("  • {}", file);
        }
    }
    println!();

    println!(
        "═══ Skipped: {} | Rejected patches: {} ═══",
        report.skipped, report.rejected
    );
    println!();
}

fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    std::fs::write(path, render_markdown(report))?;
    Ok(())
}

fn render_markdown(report: &Report) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Repositories ({})\n\n", report.repos.len()));
    for repo in &report.repos {
        md.push_str(&format!("## {}\n\n", repo.title));
        if repo.incomplete {
            md.push_str("**Incomplete:** missing `d` tag\n\n");
        }
        md.push_str(&format!("- **guid:** `{}`\n", repo.guid));
        md.push_str(&format!("- **naddr:** `{}`\n", repo.naddr));
        if let Some(description) = &repo.description {
            md.push_str(&format!("- **description:** {}\n", description));
        }
        for url in &repo.clone {
            md.push_str(&format!("- **clone:** {}\n", url));
        }
        for url in &repo.web {
            md.push_str(&format!("- **web:** {}\n", url));
        }
        if !repo.relay_hints.is_empty() {
            md.push_str(&format!("- **relays:** {}\n", repo.relay_hints.join(", ")));
        }
        md.push('\n');
    }

    md.push_str(&format!("# Patches ({})\n\n", report.patches.len()));
    for patch in &report.patches {
        md.push_str(&format!(
            "## {} (+{} -{})\n\n",
            patch.subject, patch.additions, patch.deletions
        ));
        md.push_str(&format!("- **nevent:** `{}`\n", patch.nevent));
        match &patch.repo {
            Some(repo) => md.push_str(&format!("- **repo:** `{}`\n", repo)),
            None => md.push_str("- **repo:** unknown\n"),
        }
        for file in &patch.files {
            md.push_str(&format!("- `{}`\n", file));
        }
        md.push('\n');
    }

    md.push_str(&format!(
        "**Skipped events:** {} | **Rejected patches:** {}\n",
        report.skipped, report.rejected
    ));
    md
}

fn colorize_address(address: &Address) -> colored::ColoredString {
    match address {
        Address::Encoded(encoded) => encoded.as_str().cyan(),
        Address::Invalid(_) => address.to_string().yellow(),
    }
}
