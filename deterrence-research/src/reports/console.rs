use anyhow::Result;
use colored::Colorize;
use std::io::Write;

use deterrence_core::{AnalysisReport, TestNarrative};

use super::{NO_SESSIONS, NO_VARIABLES, ranked_domains};

fn heading<W: Write>(out: &mut W, title: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title.bright_yellow().bold())?;
    writeln!(out, "{}", "-".repeat(title.chars().count()).yellow())?;
    Ok(())
}

fn narrative<W: Write>(out: &mut W, narrative: &TestNarrative) -> Result<()> {
    writeln!(out, "  → {}", narrative.name.green().bold())?;
    writeln!(out, "     {}", narrative.justification)?;
    writeln!(out, "     {} {}", "Application:".dimmed(), narrative.application)?;
    Ok(())
}

fn variable_list(ids: &[deterrence_core::VariableId]) -> String {
    if ids.is_empty() {
        return "none detected".to_string();
    }
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

pub fn write_console_report<W: Write>(out: &mut W, report: &AnalysisReport) -> Result<()> {
    writeln!(out, "{}", "📊 Deterrence Research Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    if report.selected_sessions.is_empty() {
        writeln!(out, "{}", NO_SESSIONS.yellow())?;
    } else {
        writeln!(
            out,
            "Sessions: {} ({})",
            report.selected_sessions.len().to_string().green(),
            report.selected_sessions.join(", ")
        )?;
    }
    if !report.missing_sessions.is_empty() {
        writeln!(
            out,
            "Missing: {}",
            report.missing_sessions.join(", ").red()
        )?;
    }
    writeln!(
        out,
        "Grouping: {} ({} groups), comparison: {}",
        report.counts.grouping_variable, report.counts.num_groups, report.counts.comparison_type
    )?;

    heading(out, "Descriptive Statistics")?;
    if report.summary.is_empty() {
        writeln!(out, "{}", NO_VARIABLES.dimmed())?;
    } else {
        writeln!(
            out,
            "{:<28} {:>4} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "Variable", "n", "Mean", "Median", "SD", "Min", "Max", "Range"
        )?;
        for stat in report.summary.values() {
            writeln!(
                out,
                "{:<28} {:>4} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
                stat.label, stat.n, stat.mean, stat.median, stat.std_dev, stat.min, stat.max, stat.range
            )?;
        }
    }

    heading(out, "Statistical Tests")?;
    for test in &report.tests {
        if test.appropriate {
            writeln!(out, "✅ {} - {}", test.name.green().bold(), test.reason)?;
        } else {
            writeln!(out, "❌ {} - {}", test.name, test.reason.dimmed())?;
        }
    }

    for (index, hypothesis) in report.hypotheses.iter().enumerate() {
        heading(out, &format!("Hypothesis {}", index + 1))?;
        writeln!(out, "\"{}\"", hypothesis.text.italic())?;
        writeln!(out, "Variables: {}", variable_list(&hypothesis.variables))?;
        for item in hypothesis.tests.iter().flatten() {
            narrative(out, item)?;
        }
    }

    if let Some(question) = &report.question {
        heading(out, "Research Question")?;
        writeln!(out, "\"{}\"", question.text.italic())?;
        writeln!(out, "Variables: {}", variable_list(&question.variables))?;
        if let Some(item) = &question.test {
            narrative(out, item)?;
        }
    }

    if !report.card_frequency.is_empty() {
        heading(out, "Card Purchase Frequency")?;
        for row in &report.card_frequency {
            writeln!(
                out,
                "{:<6} {:<36} {:>4} purchases (NATO {}, Russia {}) in {} session(s), {}%",
                row.card_id.bold(),
                row.card_name,
                row.display_count,
                row.nato_count,
                row.russia_count,
                row.sessions_appeared,
                row.percentage
            )?;
        }
    }

    let mut rankings = ranked_domains(report).peekable();
    if rankings.peek().is_some() {
        heading(out, "Purchases by Domain")?;
        for (domain, team, ranked) in rankings {
            writeln!(out, "{} / {}", domain.to_string().bold(), team)?;
            for (position, card) in ranked.iter().enumerate() {
                writeln!(
                    out,
                    "  {}. {} {} ×{} ({}% of domain, {}% overall)",
                    position + 1,
                    card.card_id,
                    card.card_name,
                    card.count,
                    card.domain_percentage,
                    card.overall_percentage
                )?;
            }
        }
    }

    Ok(())
}
