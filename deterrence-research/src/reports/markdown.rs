use anyhow::Result;
use chrono::{DateTime, Utc};
use std::io::Write;

use deterrence_core::{AnalysisReport, TestNarrative};

use super::{NO_SESSIONS, NO_VARIABLES, ranked_domains};

fn narrative<W: Write>(out: &mut W, narrative: &TestNarrative) -> Result<()> {
    writeln!(out, "#### {}\n", narrative.name)?;
    writeln!(out, "- **Justification**: {}", narrative.justification)?;
    writeln!(out, "- **Application**: {}\n", narrative.application)?;
    Ok(())
}

/// Report-style document covering methodology, statistics, recommendations
/// and card rankings.
pub fn write_markdown_report<W: Write>(
    out: &mut W,
    report: &AnalysisReport,
    generated_at: DateTime<Utc>,
) -> Result<()> {
    writeln!(out, "# Deterrence Research Report\n")?;
    writeln!(out, "_Generated {}_\n", generated_at.format("%Y-%m-%d %H:%M UTC"))?;

    writeln!(out, "## Methodology\n")?;
    match &report.methodology {
        Some(methodology) => writeln!(out, "- **Selected test**: {methodology}")?,
        None => writeln!(out, "- **Selected test**: _not chosen_")?,
    }
    writeln!(out, "- **Sessions**: {}", report.selected_sessions.len())?;
    writeln!(
        out,
        "- **Grouping variable**: {} ({} groups)",
        report.counts.grouping_variable, report.counts.num_groups
    )?;
    writeln!(out, "- **Comparison**: {}", report.counts.comparison_type)?;
    if !report.missing_sessions.is_empty() {
        writeln!(
            out,
            "- **Unavailable sessions**: {}",
            report.missing_sessions.join(", ")
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Descriptive Statistics\n")?;
    if report.selected_sessions.is_empty() {
        writeln!(out, "_{NO_SESSIONS}_\n")?;
    } else if report.summary.is_empty() {
        writeln!(out, "_{NO_VARIABLES}_\n")?;
    } else {
        writeln!(out, "| Variable | n | Mean | Median | SD | Min | Max | Range |")?;
        writeln!(out, "|---|---:|---:|---:|---:|---:|---:|---:|")?;
        for stat in report.summary.values() {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} | {} | {} |",
                stat.label, stat.n, stat.mean, stat.median, stat.std_dev, stat.min, stat.max, stat.range
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "## Statistical Test Recommendations\n")?;
    writeln!(out, "| Test | Appropriate | Reason |")?;
    writeln!(out, "|---|:---:|---|")?;
    for test in &report.tests {
        let mark = if test.appropriate { "✅" } else { "❌" };
        writeln!(out, "| {} | {mark} | {} |", test.name, test.reason)?;
    }
    writeln!(out)?;

    if !report.hypotheses.is_empty() || report.question.is_some() {
        writeln!(out, "## Hypotheses and Research Question\n")?;
    }
    for (index, hypothesis) in report.hypotheses.iter().enumerate() {
        writeln!(out, "### Hypothesis {}\n", index + 1)?;
        writeln!(out, "> {}\n", hypothesis.text)?;
        for item in hypothesis.tests.iter().flatten() {
            narrative(out, item)?;
        }
    }
    if let Some(question) = &report.question {
        writeln!(out, "### Research Question\n")?;
        writeln!(out, "> {}\n", question.text)?;
        if let Some(item) = &question.test {
            narrative(out, item)?;
        }
    }

    if !report.card_frequency.is_empty() {
        writeln!(out, "## Card Purchase Frequency\n")?;
        writeln!(out, "| Card | Name | NATO | Russia | Total | Sessions | % of sessions |")?;
        writeln!(out, "|---|---|---:|---:|---:|---:|---:|")?;
        for row in &report.card_frequency {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} | {} |",
                row.card_id,
                row.card_name,
                row.nato_count,
                row.russia_count,
                row.total_count,
                row.sessions_appeared,
                row.percentage
            )?;
        }
        writeln!(out)?;
    }

    let mut rankings = ranked_domains(report).peekable();
    if rankings.peek().is_some() {
        writeln!(out, "## Purchases by Domain\n")?;
        for (domain, team, ranked) in rankings {
            writeln!(out, "### {domain} ({team})\n")?;
            writeln!(out, "| Rank | Card | Count | % of domain | % overall |")?;
            writeln!(out, "|---:|---|---:|---:|---:|")?;
            for (position, card) in ranked.iter().enumerate() {
                writeln!(
                    out,
                    "| {} | {} ({}) | {} | {} | {} |",
                    position + 1,
                    card.card_name,
                    card.card_id,
                    card.count,
                    card.domain_percentage,
                    card.overall_percentage
                )?;
            }
            writeln!(out)?;
        }
    }

    Ok(())
}
