use std::collections::HashMap;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use license_expr::models::{CheckedLicense, Verdict};

/// Render a colored terminal report of checked licenses.
pub fn render(rows: &[CheckedLicense], heading: &str, verbose: bool, quiet: bool) -> Result<()> {
    let total = rows.len();
    let allow_count = count(rows, Verdict::Allow);
    let unknown_count = count(rows, Verdict::Unknown);
    let reject_count = count(rows, Verdict::Reject);

    if quiet {
        println!(
            "Total: {}  Allow: {}  Unknown: {}  Reject: {}",
            total,
            allow_count.to_string().green(),
            unknown_count.to_string().yellow(),
            reject_count.to_string().red(),
        );
        return Ok(());
    }

    println!("\n {} v{}", "license-expr".bold(), env!("CARGO_PKG_VERSION"));
    println!(" {}\n", heading);

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Total licenses : {}", total));
    println!(
        " │  {:<48} │",
        format!(
            "{}  Allow       : {:>4}  {}",
            "✓".green(),
            allow_count,
            summarize_expressions(rows, Verdict::Allow)
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Unknown     : {:>4}  {}",
            "?".yellow(),
            unknown_count,
            summarize_expressions(rows, Verdict::Unknown)
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Reject      : {:>4}  {}",
            "✗".red(),
            reject_count,
            summarize_expressions(rows, Verdict::Reject)
        )
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if reject_count > 0 {
        println!(" {} Licenses rejected by policy:\n", "[REJECT]".red().bold());
        render_table(rows, Verdict::Reject);
        println!();
    }

    if unknown_count > 0 {
        println!(" {} Licenses needing review:\n", "[UNKNOWN]".yellow().bold());
        render_table(rows, Verdict::Unknown);
        println!();
    }

    if verbose && allow_count > 0 {
        println!(" {} Allowed licenses:\n", "[ALLOW]".green().bold());
        render_table(rows, Verdict::Allow);
        println!();
    }

    Ok(())
}

fn count(rows: &[CheckedLicense], verdict: Verdict) -> usize {
    rows.iter().filter(|r| r.verdict == verdict).count()
}

fn render_table(rows: &[CheckedLicense], verdict_filter: Verdict) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Input").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Expression").add_attribute(Attribute::Bold),
            Cell::new("Verdict").add_attribute(Attribute::Bold),
            Cell::new("Reasons").add_attribute(Attribute::Bold),
        ]);

    for row in rows.iter().filter(|r| r.verdict == verdict_filter) {
        let (verdict_str, verdict_color) = match row.verdict {
            Verdict::Allow => ("✓ allow", Color::Green),
            Verdict::Unknown => ("? unknown", Color::Yellow),
            Verdict::Reject => ("✗ reject", Color::Red),
        };

        table.add_row(vec![
            Cell::new(&row.input),
            Cell::new(row.source.to_string()),
            Cell::new(row.expression.as_deref().unwrap_or("-")),
            Cell::new(verdict_str)
                .fg(verdict_color)
                .set_alignment(CellAlignment::Center),
            Cell::new(row.reasons.join("\n")).fg(Color::DarkGrey),
        ]);
    }

    println!("{}", table);
}

/// The three most frequent expressions for `verdict`, e.g. `[MIT (3), ISC (1)]`.
fn summarize_expressions(rows: &[CheckedLicense], verdict: Verdict) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows.iter().filter(|r| r.verdict == verdict) {
        let expr = row.expression.as_deref().unwrap_or("none");
        *counts.entry(expr).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(expr, cnt)| format!("{} ({})", expr, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use license_expr::models::InputSource;

    fn row(expr: Option<&str>, verdict: Verdict) -> CheckedLicense {
        CheckedLicense {
            input: expr.unwrap_or("pom.xml").to_string(),
            source: InputSource::Expression,
            expression: expr.map(str::to_string),
            verdict,
            reasons: Vec::new(),
        }
    }

    #[test]
    fn test_summary_lists_most_frequent_first() {
        let rows = vec![
            row(Some("MIT"), Verdict::Allow),
            row(Some("ISC"), Verdict::Allow),
            row(Some("MIT"), Verdict::Allow),
            row(None, Verdict::Reject),
        ];
        assert_eq!(
            summarize_expressions(&rows, Verdict::Allow),
            "[MIT (2), ISC (1)]"
        );
        assert_eq!(summarize_expressions(&rows, Verdict::Reject), "[none (1)]");
        assert_eq!(summarize_expressions(&rows, Verdict::Unknown), "");
    }

    #[test]
    fn test_counts_by_verdict() {
        let rows = vec![row(Some("MIT"), Verdict::Allow), row(None, Verdict::Reject)];
        assert_eq!(count(&rows, Verdict::Allow), 1);
        assert_eq!(count(&rows, Verdict::Unknown), 0);
    }
}
