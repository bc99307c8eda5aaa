//! Styled text views of a [`Report`].
//!
//! Every function returns the finished text; printing is left to the caller.

use crate::model::CommitSummary;
use crate::report::Report;
use console::{measure_text_width, style, Style};

const MESSAGE_WIDTH: usize = 50;
const MAX_BAR: usize = 50;
const DATE_FORMAT: &str = "%a %b %-d %H:%M:%S %Y %z";

fn accent() -> Style {
    Style::new().color256(62)
}

fn header(title: &str) -> String {
    Style::new()
        .white()
        .bright()
        .on_color256(62)
        .bold()
        .apply_to(format!("  {title}  "))
        .to_string()
}

/// Draw a rounded box around `lines`, padded by one row and two columns.
fn panel(lines: &[String]) -> String {
    let border = Style::new().color256(63);
    let width = lines.iter().map(|l| measure_text_width(l)).max().unwrap_or(0);
    let inner = width + 4;
    let blank = format!(
        "{}{}{}",
        border.apply_to("│"),
        " ".repeat(inner),
        border.apply_to("│")
    );

    let mut out = Vec::with_capacity(lines.len() + 4);
    out.push(border.apply_to(format!("╭{}╮", "─".repeat(inner))).to_string());
    out.push(blank.clone());
    for line in lines {
        let pad = width - measure_text_width(line);
        out.push(format!(
            "{}  {}{}  {}",
            border.apply_to("│"),
            line,
            " ".repeat(pad),
            border.apply_to("│")
        ));
    }
    out.push(blank);
    out.push(border.apply_to(format!("╰{}╯", "─".repeat(inner))).to_string());
    out.join("\n")
}

/// Header plus body lines indented by one column, as used by the statistics and timeline panels.
fn titled_panel(title: &str, body: Vec<String>) -> String {
    let mut lines = vec![header(title)];
    lines.extend(body.into_iter().map(|l| format!(" {l}")));
    panel(&lines)
}

pub fn render_graph(report: &Report, compact: bool) -> String {
    let commits = &report.history.commits;
    let mut lines = vec![panel(&[header("Git Repository Visualizer")]), String::new()];

    for (i, commit) in commits.iter().enumerate() {
        if compact {
            let connector = if i == 0 {
                String::new()
            } else {
                format!("{} ", style("→").cyan())
            };
            lines.push(format!("{connector}{}", compact_line(report, commit)));
        } else {
            lines.extend(detailed_block(report, commit));
            if i + 1 < commits.len() {
                lines.push(style("│").cyan().to_string());
                lines.push(style("▼").cyan().to_string());
            }
        }
    }

    lines.push(String::new());
    lines.push(
        accent()
            .apply_to(format!(" Showing {} commits ", commits.len()))
            .to_string(),
    );
    lines.join("\n")
}

fn compact_line(report: &Report, commit: &CommitSummary) -> String {
    let mut line = style(&commit.id).red().bright().bold().to_string();
    if commit.is_merge {
        line.push_str(&style(" (merge)").magenta().bright().bold().to_string());
    }

    let message: String = commit.message.chars().take(MESSAGE_WIDTH).collect();
    line.push(' ');
    line.push_str(&style(message).white().bright().to_string());
    if commit.message.chars().count() > MESSAGE_WIDTH {
        line.push_str("...");
    }

    line.push(' ');
    line.push_str(&style(format!("({})", commit.author)).green().bright().to_string());

    let branches = report.branches.names(&commit.id);
    if !branches.is_empty() {
        line.push_str(
            &style(format!(" [{}]", branches.join(", ")))
                .yellow()
                .bright()
                .to_string(),
        );
    }
    line
}

fn detailed_block(report: &Report, commit: &CommitSummary) -> Vec<String> {
    let meta = Style::new().cyan().bright();
    let mut lines = vec![style(format!("Commit: {}", commit.id))
        .red()
        .bright()
        .bold()
        .to_string()];

    if commit.is_merge {
        lines.push(style("Merge commit").magenta().bright().bold().to_string());
    }
    lines.push(
        style(format!("Author: {} <{}>", commit.author, commit.email))
            .green()
            .bright()
            .to_string(),
    );
    lines.push(
        meta.apply_to(format!("Date:   {}", commit.timestamp.format(DATE_FORMAT)))
            .to_string(),
    );
    lines.push(String::new());
    lines.push(style(format!("    {}", commit.message)).white().bright().to_string());
    lines.push(String::new());

    let branches = report.branches.names(&commit.id);
    if !branches.is_empty() {
        lines.push(
            style(format!("Branches: {}", branches.join(", ")))
                .yellow()
                .bright()
                .to_string(),
        );
    }

    lines.push(
        style(format!("Files changed: {}", commit.changes))
            .blue()
            .bright()
            .to_string(),
    );
    lines.extend(commit.files.iter().map(|f| format!("    {f}")));

    if !commit.parents.is_empty() {
        lines.push(
            meta.apply_to(format!("Parents: {}", commit.parents.join(", ")))
                .to_string(),
        );
    }
    lines.push(String::new());
    lines
}

pub fn render_stats(report: &Report) -> String {
    let stats = &report.history.stats;
    let mut body = vec![
        format!("Total Commits:    {}", report.history.len()),
        format!("Files Changed:    {}", stats.total_files_changed),
        format!("Lines Added:      {}", stats.total_additions),
        format!("Lines Deleted:    {}", stats.total_deletions),
        String::new(),
        "Top Authors:".to_string(),
    ];
    body.extend(
        report
            .top_authors
            .iter()
            .map(|a| format!("- {}: {} commits", a.email, a.count)),
    );
    titled_panel("Repository Statistics", body)
}

pub fn render_timeline(report: &Report) -> String {
    let body = report
        .weeks
        .iter()
        .map(|bucket| {
            let mut bar = "■".repeat(bucket.commit_count.min(MAX_BAR));
            if bucket.commit_count > MAX_BAR {
                bar.push_str("...");
            }
            format!("{}: {} {} commits", bucket.week, bar, bucket.commit_count)
        })
        .collect();
    titled_panel("Commit Timeline", body)
}
