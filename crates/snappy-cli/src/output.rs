//! Output formatting for the CLI.

use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use colored::*;
use serde_json::{json, Value};
use snappy_domain::{CreationDecision, RetentionPolicy, SnapshotRecord, Tier, TierWindows};
use snappy_janitor::RunReport;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet format (one action per line)
    Quiet,
}

/// Kind of store action in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Create,
    Rename,
    Delete,
}

impl Action {
    fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Rename => "RENAME",
            Action::Delete => "DELETE",
        }
    }
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome of a retention pass.
    pub fn format_report(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&report_json(report))?),
            OutputFormat::Quiet => Ok(action_lines(report).join("\n")),
            OutputFormat::Table => {
                let mut sections = Vec::new();
                if let Some(note) = self.creation_note(report) {
                    sections.push(note);
                }
                sections.push(self.actions_table(report));
                sections.push(self.report_summary(report));
                Ok(sections.join("\n\n"))
            }
        }
    }

    /// Format a plan preview: windows, per-period selections and actions.
    pub fn format_plan(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut value = report_json(report);
                value["windows"] = windows_json(&report.windows);
                value["selections"] = report
                    .plan
                    .selections
                    .iter()
                    .map(|s| {
                        json!({
                            "tier": s.tier.as_str(),
                            "period": s.label,
                            "period_index": s.period_index,
                            "keep": s.representative.origin(),
                            "members": s.members,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(action_lines(report).join("\n")),
            OutputFormat::Table => {
                let mut windows = Builder::default();
                windows.push_record(["Tier", "Start", "End"]);
                for window in report.windows.iter() {
                    if window.is_empty() {
                        windows.push_record([window.tier.as_str(), "skipped", "skipped"]);
                    } else {
                        windows.push_record([window.tier.as_str(), &instant(window.start), &instant(window.end)]);
                    }
                }

                let mut sections = vec![render(windows)];

                if !report.plan.selections.is_empty() {
                    let mut selections = Builder::default();
                    selections.push_record(["Tier", "Period", "Keep", "Members"]);
                    for s in &report.plan.selections {
                        selections.push_record([
                            s.tier.as_str(),
                            &s.label,
                            s.representative.origin(),
                            &s.members.to_string(),
                        ]);
                    }
                    sections.push(render(selections));
                }

                sections.push(self.actions_table(report));
                Ok(sections.join("\n\n"))
            }
        }
    }

    /// Format a decoded inventory with the zone each snapshot falls in.
    pub fn format_inventory(&self, records: &[SnapshotRecord], windows: &TierWindows) -> Result<String> {
        let zone = |record: &SnapshotRecord| windows.zone_of(record.timestamp()).map(|t| t.as_str()).unwrap_or("-");

        match self.format {
            OutputFormat::Json => {
                let entries: Vec<Value> = records
                    .iter()
                    .map(|r| {
                        json!({
                            "snapshot": r.origin(),
                            "tier": r.tier().as_str(),
                            "timestamp": instant(r.timestamp()),
                            "zone": windows.zone_of(r.timestamp()).map(|t| t.as_str()),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&entries)?)
            }
            OutputFormat::Quiet => Ok(records.iter().map(|r| r.origin()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if records.is_empty() {
                    return Ok(self.colorize("No managed snapshots found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Snapshot", "Tier", "Timestamp", "Zone"]);
                for record in records {
                    builder.push_record([
                        record.origin(),
                        record.tier().as_str(),
                        &instant(record.timestamp()),
                        zone(record),
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format a resolved retention policy.
    pub fn format_policy(&self, dataset: &str, policy: &RetentionPolicy) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "dataset": dataset,
                "prefix": policy.prefix,
                "daily": policy.daily,
                "weekly": policy.weekly,
                "monthly": policy.monthly,
                "yearly": policy.yearly,
            }))?),
            OutputFormat::Quiet => {
                let mut fields: Vec<String> = Tier::ALL
                    .iter()
                    .map(|tier| format!("{}={}", tier, policy.count(*tier)))
                    .collect();
                fields.push(format!("prefix={}", policy.prefix));
                Ok(fields.join(" "))
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Setting", "Value"]);
                builder.push_record(["dataset", dataset]);
                builder.push_record(["snapshot_prefix", &policy.prefix]);
                for tier in Tier::ALL {
                    builder.push_record([tier.as_str(), &policy.count(tier).to_string()]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn creation_note(&self, report: &RunReport) -> Option<String> {
        match report.creation? {
            CreationDecision::Create => None,
            CreationDecision::AlreadyExists => {
                Some(self.info("Skipped creation: daily snapshot for today already exists"))
            }
            CreationDecision::Unchanged => Some(self.info("Skipped creation: dataset unchanged since last snapshot")),
        }
    }

    fn actions_table(&self, report: &RunReport) -> String {
        let actions = actions(report);
        if actions.is_empty() {
            return self.info(&format!("{}: nothing to do", report.dataset));
        }

        let mut builder = Builder::default();
        builder.push_record(["Action", "Snapshot", "Target"]);
        for (action, snapshot, target) in &actions {
            builder.push_record([action.as_str(), snapshot.as_str(), target.as_deref().unwrap_or("")]);
        }
        render(builder)
    }

    fn report_summary(&self, report: &RunReport) -> String {
        let planned = actions(report).len();
        if report.dry_run {
            self.warning(&format!("DRY RUN: {} action(s) planned for {}, nothing changed", planned, report.dataset))
        } else {
            self.success(&format!("{}: {} action(s) applied", report.dataset, report.applied))
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Creation, renames and deletions in execution order
fn actions(report: &RunReport) -> Vec<(Action, String, Option<String>)> {
    let mut actions = Vec::new();
    if let Some(created) = &report.created {
        actions.push((Action::Create, created.clone(), None));
    }
    for rename in &report.plan.renames {
        actions.push((Action::Rename, rename.record.origin().to_string(), Some(rename.target())));
    }
    for record in &report.plan.deletions {
        actions.push((Action::Delete, record.origin().to_string(), None));
    }
    actions
}

/// `CREATE x`, `RENAME a → b`, `DELETE x`, prefixed with `[DRY] ` in dry runs
fn action_lines(report: &RunReport) -> Vec<String> {
    let marker = if report.dry_run { "[DRY] " } else { "" };
    actions(report)
        .into_iter()
        .map(|(action, snapshot, target)| match target {
            Some(target) => format!("{}{} {} → {}", marker, action.as_str(), snapshot, target),
            None => format!("{}{} {}", marker, action.as_str(), snapshot),
        })
        .collect()
}

fn report_json(report: &RunReport) -> Value {
    json!({
        "dataset": report.dataset,
        "dry_run": report.dry_run,
        "creation": report.creation.map(creation_label),
        "created": report.created,
        "renames": report
            .plan
            .renames
            .iter()
            .map(|r| json!({ "from": r.record.origin(), "to": r.target(), "tier": r.to.as_str() }))
            .collect::<Vec<_>>(),
        "deletions": report.plan.deletions.iter().map(|r| r.origin()).collect::<Vec<_>>(),
        "applied": report.applied,
    })
}

fn windows_json(windows: &TierWindows) -> Value {
    windows
        .iter()
        .map(|w| {
            json!({
                "tier": w.tier.as_str(),
                "start": instant(w.start),
                "end": instant(w.end),
                "empty": w.is_empty(),
            })
        })
        .collect()
}

fn creation_label(decision: CreationDecision) -> &'static str {
    match decision {
        CreationDecision::Create => "create",
        CreationDecision::Unchanged => "unchanged",
        CreationDecision::AlreadyExists => "already_exists",
    }
}

fn instant(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}
