//! Rendering scan results to JSON, CSV, and text.

use crate::error::Result;
use crate::format::ReportFormat;
use gotcha_scanner::{DomainReport, ScanResult, ScanSummary, Verdict, VerdictKind};
use serde::Serialize;

const RULE: &str = "============================================================";

/// Knobs for the text report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// List NOT_FOUND verdicts too
    pub show_not_found: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    tool: &'static str,
    version: &'static str,
    generated_at: String,
    results: Vec<JsonScan<'a>>,
}

#[derive(Serialize)]
struct JsonScan<'a> {
    #[serde(flatten)]
    result: &'a ScanResult,
    summary: ScanSummary,
}

/// Render `results` in the given format.
pub fn render(
    results: &[ScanResult],
    format: ReportFormat,
    options: ReportOptions,
) -> Result<String> {
    match format {
        ReportFormat::Json => render_json(results),
        ReportFormat::Csv => Ok(render_csv(results)),
        ReportFormat::Txt => Ok(render_text(results, options)),
    }
}

/// One JSON document holding every scan and its summary.
pub fn render_json(results: &[ScanResult]) -> Result<String> {
    let report = JsonReport {
        tool: "gotcha",
        version: env!("CARGO_PKG_VERSION"),
        generated_at: chrono::Utc::now().to_rfc3339(),
        results: results
            .iter()
            .map(|result| JsonScan {
                result,
                summary: result.summary(),
            })
            .collect(),
    };

    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}

const CSV_HEADER: &str = "scan_id,identifier,identifier_kind,category,platform_id,platform_name,status,http_status,profile_url,elapsed_ms,detail";

/// Quote a CSV field when it carries a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One header line plus one row per verdict, in report order.
#[must_use]
pub fn render_csv(results: &[ScanResult]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for result in results {
        let identifier = csv_field(&result.identifier.to_string());
        let kind = result.identifier.kind();

        for verdict in result.verdicts() {
            let row = [
                result.scan_id.to_string(),
                identifier.clone(),
                kind.to_string(),
                verdict.category.to_string(),
                verdict.platform_id.to_string(),
                csv_field(&verdict.platform_name),
                verdict.status.to_string(),
                verdict.http_status.map(|s| s.to_string()).unwrap_or_default(),
                csv_field(verdict.profile_url.as_deref().unwrap_or_default()),
                verdict.elapsed_ms.to_string(),
                csv_field(verdict.detail.as_deref().unwrap_or_default()),
            ];
            out.push_str(&row.join(","));
            out.push('\n');
        }
    }

    out
}

fn marker(kind: VerdictKind) -> &'static str {
    match kind {
        VerdictKind::Found => "[+]",
        VerdictKind::NotFound => "[-]",
        VerdictKind::Indeterminate => "[?]",
        VerdictKind::Error => "[!]",
    }
}

fn text_line(verdict: &Verdict) -> String {
    let tail = match verdict.status {
        VerdictKind::Found => verdict.profile_url.clone().unwrap_or_default(),
        VerdictKind::NotFound => "not found".to_string(),
        VerdictKind::Indeterminate | VerdictKind::Error => {
            verdict.detail.clone().unwrap_or_default()
        }
    };
    format!(
        "  {} {:<24} {}",
        marker(verdict.status),
        verdict.platform_name,
        tail
    )
}

fn text_domain(report: &DomainReport) -> String {
    let mx = if report.accepts_mail() {
        report
            .mx_records
            .iter()
            .map(|mx| format!("{} {}", mx.preference, mx.exchange))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        "none (domain does not receive mail)".to_string()
    };
    let dmarc = match (&report.dmarc, &report.dmarc_policy) {
        (Some(_), Some(policy)) => format!("policy {policy}"),
        (Some(record), None) => record.clone(),
        (None, _) => "none".to_string(),
    };
    let provider = if report.free_provider {
        "free mailbox provider"
    } else {
        "custom domain"
    };

    let mut out = format!(
        "\n[ Email Domain: {} ]\n  MX:       {mx}\n  SPF:      {}\n  DMARC:    {dmarc}\n  Provider: {provider}\n",
        report.domain,
        report.spf.as_deref().unwrap_or("none"),
    );
    for error in &report.lookup_errors {
        out.push_str(&format!("  [!] {error}\n"));
    }
    out
}

/// Human-readable report: found accounts first-class, failures flagged.
#[must_use]
pub fn render_text(results: &[ScanResult], options: ReportOptions) -> String {
    results
        .iter()
        .map(|result| text_scan(result, options))
        .collect()
}

fn text_scan(result: &ScanResult, options: ReportOptions) -> String {
    let summary = result.summary();

    let mut out = format!(
        "{RULE}\n Target: {} ({})\n Scan:   {}  {}  {:.1}s\n{RULE}\n",
        result.identifier,
        result.identifier.kind(),
        result.scan_id,
        result.started_at,
        result.duration().as_secs_f64()
    );

    for (category, verdicts) in &result.categories {
        out.push_str(&format!("\n[ {} ]\n", category.display_name()));

        let lines: Vec<String> = verdicts
            .iter()
            .filter(|v| options.show_not_found || v.status != VerdictKind::NotFound)
            .map(text_line)
            .collect();

        if lines.is_empty() {
            out.push_str("  no accounts found\n");
        }
        for line in lines {
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }

    if let Some(domain) = &result.domain {
        out.push_str(&text_domain(domain));
    }

    out.push_str(&format!(
        "\nSummary: {} found, {} not found, {} indeterminate, {} errors ({} platforms)\n\n",
        summary.found, summary.not_found, summary.indeterminate, summary.error, summary.total
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_csv(&[]), format!("{CSV_HEADER}\n"));
        assert!(render_text(&[], ReportOptions::default()).is_empty());

        let json: serde_json::Value =
            serde_json::from_str(&render_json(&[]).expect("render json")).expect("valid json");
        assert_eq!(json["tool"], "gotcha");
        assert_eq!(json["results"].as_array().map(Vec::len), Some(0));
    }
}
