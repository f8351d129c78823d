// src/report.rs
// =============================================================================
// Rendering audit reports for the terminal.
//
// Two formats:
// - JSON: the full AuditReport tree, for pipelines
// - table: one row per check plus the score and ranked recommendations
// =============================================================================

use std::io::{self, Write};

use crate::audit::AuditReport;
use crate::checks::CheckName;

const URL_WIDTH: usize = 50;
const NOTE_WIDTH: usize = 70;

/// Full report as pretty JSON.
pub fn to_json(report: &AuditReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Several reports as one pretty JSON array.
pub fn batch_to_json(reports: &[AuditReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

pub fn print_table(report: &AuditReport) -> io::Result<()> {
    write_table(&mut io::stdout().lock(), report)
}

pub fn print_batch_table(reports: &[AuditReport]) -> io::Result<()> {
    write_batch_table(&mut io::stdout().lock(), reports)
}

pub fn write_table(out: &mut impl Write, report: &AuditReport) -> io::Result<()> {
    writeln!(out, "🔍 SEO audit for {}", report.url)?;
    if let Some(status) = report.page_status.filter(|s| !(200..300).contains(s)) {
        writeln!(out, "⚠️  Page answered HTTP {}", status)?;
    }
    writeln!(out)?;
    writeln!(out, "{:<18} {:<10} {}", "CHECK", "STATUS", "NOTE")?;
    writeln!(out, "{}", "=".repeat(18 + 1 + 10 + 1 + NOTE_WIDTH))?;

    for name in CheckName::ALL {
        let (passed, top) = report.checks.summary(name);
        let status = if passed { "✅ PASS" } else { "❌ FAIL" };
        let note = truncate(top.unwrap_or(""), NOTE_WIDTH);
        writeln!(out, "{:<18} {:<10} {}", name.as_str(), status, note)?;
    }

    writeln!(out)?;
    writeln!(out, "📊 Score: {}/100 (grade {})", report.overall_score, report.grade)?;

    if report.recommendations.is_empty() {
        writeln!(out, "✅ Nothing to fix")?;
    } else {
        writeln!(out, "📋 Recommendations:")?;
        for (rank, recommendation) in report.recommendations.iter().enumerate() {
            writeln!(out, "   {}. {}", rank + 1, recommendation)?;
        }
    }
    Ok(())
}

pub fn write_batch_table(out: &mut impl Write, reports: &[AuditReport]) -> io::Result<()> {
    writeln!(out, "{:<width$} {:<6} {:<6} {}", "URL", "SCORE", "GRADE", "TOP RECOMMENDATION", width = URL_WIDTH)?;
    writeln!(out, "{}", "=".repeat(URL_WIDTH + 1 + 6 + 1 + 6 + 1 + NOTE_WIDTH))?;

    for report in reports {
        let top = report.recommendations.first().map(String::as_str).unwrap_or("");
        writeln!(
            out,
            "{:<width$} {:<6} {:<6} {}",
            truncate(&report.url, URL_WIDTH),
            report.overall_score,
            report.grade.to_string(),
            truncate(top, NOTE_WIDTH),
            width = URL_WIDTH
        )?;
    }

    writeln!(out)?;
    let failed = reports.iter().filter(|r| r.is_failed()).count();
    writeln!(out, "📊 Summary:")?;
    writeln!(out, "   📋 Audited: {}", reports.len())?;
    writeln!(out, "   ❌ Unreachable: {}", failed)?;
    if let Some(average) = average_score(reports) {
        writeln!(out, "   📈 Average score: {:.1}", average)?;
    }
    Ok(())
}

/// Mean score of the audits that actually ran.
fn average_score(reports: &[AuditReport]) -> Option<f64> {
    let scores: Vec<f64> = reports
        .iter()
        .filter(|r| !r.is_failed())
        .map(|r| f64::from(r.overall_score))
        .collect();
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Cuts `text` to at most `width` characters, marking the cut with "...".
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;

    fn failed_report(url: &str) -> AuditReport {
        AuditReport::failed(url, &AuditError::network(url, "Connection refused"))
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééééé", 8), "ééééé...");
        assert_eq!(truncate("abcdefghij", 10), "abcdefghij");
    }

    #[test]
    fn test_table_lists_every_check() {
        let mut out = Vec::new();
        write_table(&mut out, &failed_report("https://example.com/")).unwrap();
        let text = String::from_utf8(out).unwrap();

        for name in CheckName::ALL {
            assert!(text.contains(name.as_str()), "missing row for {}", name);
        }
        assert!(text.contains("Score: 0/100 (grade D)"));
        assert!(text.contains("1. Unable to audit https://example.com/"));
    }

    #[test]
    fn test_table_flags_error_status() {
        let mut report = failed_report("https://example.com/");
        report.page_status = Some(404);
        let mut out = Vec::new();
        write_table(&mut out, &report).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Page answered HTTP 404"));

        report.page_status = Some(200);
        let mut out = Vec::new();
        write_table(&mut out, &report).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("Page answered"));
    }

    #[test]
    fn test_batch_summary() {
        let reports = vec![failed_report("https://a.example/"), failed_report("https://b.example/")];
        let mut out = Vec::new();
        write_batch_table(&mut out, &reports).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Audited: 2"));
        assert!(text.contains("Unreachable: 2"));
        assert!(!text.contains("Average score"));
    }

    #[test]
    fn test_json_round_trips_the_report() {
        let report = failed_report("https://example.com/");
        let json = to_json(&report).unwrap();
        let parsed: AuditReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
