//! Human-readable and JSON renditions of a [`StatsReport`].

use std::path::Path;

use colored::Colorize;
use unredact_core::StatsReport;

use crate::prelude::{println, *};

/// Format an integer with `,` thousands separators.
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// The summary table for a report.
pub fn stats_table(stats: &StatsReport) -> prettytable::Table {
    let mut table = new_table();

    if stats.has_boxes() {
        table.add_row(prettytable::row!["Redaction boxes found", thousands(stats.boxes_found)]);
        table.add_row(prettytable::row!["Words recovered", thousands(stats.words_recovered)]);
        table.add_row(prettytable::row!["Characters recovered", thousands(stats.chars_recovered)]);
        table.add_row(prettytable::row![
            "Recovery rate",
            f!("{:.1}% of text was hidden", stats.recovery_rate)
        ]);
        table.add_row(prettytable::row![
            "Total extracted",
            f!("{} words", thousands(stats.words_total))
        ]);
    } else {
        table.add_row(prettytable::row![
            "Total text extracted",
            f!(
                "{} words ({} chars)",
                thousands(stats.words_total),
                thousands(stats.chars_total)
            )
        ]);
    }

    table
}

/// Print the summary to stdout.
pub fn print_stats(stats: &StatsReport) {
    println!("\n{}\n", "Unredaction Results".bold());

    if !stats.has_boxes() {
        println!("{}", "No redaction boxes detected".yellow().bold());
        println!("(Document may not have standard black-bar redactions)\n");
    }

    stats_table(stats).printstd();
    println!();
}

/// Pretty-printed JSON, two-space indent.
pub fn stats_json(stats: &StatsReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(stats)?)
}

pub fn write_stats_json(path: &Path, stats: &StatsReport) -> Result<()> {
    std::fs::write(path, stats_json(stats)?)
        .wrap_err_with(|| f!("Failed to write stats to {}", path.display()))?;
    println!("Stats written to: {}", path.display());
    Ok(())
}
