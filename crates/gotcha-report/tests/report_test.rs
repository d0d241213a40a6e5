use gotcha_core::{Category, Identifier, PlatformId, Timestamp};
use gotcha_report::{
    render_csv, render_json, render_text, save_report, ReportFormat, ReportOptions,
};
use gotcha_scanner::{DomainReport, MxRecord, ScanResult, Verdict, VerdictKind};
use std::collections::BTreeMap;
use tempfile::TempDir;
use uuid::Uuid;

fn verdict(id: &str, name: &str, category: Category, status: VerdictKind) -> Verdict {
    Verdict {
        platform_id: PlatformId::new(id).expect("valid platform ID"),
        platform_name: name.to_string(),
        category,
        status,
        profile_url: (status == VerdictKind::Found)
            .then(|| format!("https://{id}.example/testuser123")),
        http_status: (status != VerdictKind::Error).then_some(200),
        elapsed_ms: 120,
        detail: match status {
            VerdictKind::Error => Some("timeout: no response within 10000ms".to_string()),
            VerdictKind::Indeterminate => Some("rate limited, retry later".to_string()),
            _ => None,
        },
    }
}

fn sample_result() -> ScanResult {
    let mut categories = BTreeMap::new();
    categories.insert(
        Category::Social,
        vec![
            verdict("instagram", "Instagram", Category::Social, VerdictKind::Indeterminate),
            verdict("mastodon", "Mastodon", Category::Social, VerdictKind::NotFound),
        ],
    );
    categories.insert(
        Category::Developer,
        vec![
            verdict("github", "GitHub", Category::Developer, VerdictKind::Found),
            verdict("gitlab", "GitLab", Category::Developer, VerdictKind::Error),
        ],
    );

    ScanResult {
        scan_id: Uuid::new_v4(),
        identifier: Identifier::username("testuser123").expect("valid username"),
        started_at: Timestamp::now(),
        finished_at: Timestamp::now(),
        categories,
        domain: None,
    }
}

#[test]
fn test_json_report_shape() {
    let json = render_json(&[sample_result()]).expect("render json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

    let scan = &value["results"][0];
    assert_eq!(scan["identifier"]["kind"], "username");
    assert_eq!(scan["identifier"]["value"], "testuser123");
    assert_eq!(scan["categories"]["developer"][0]["status"], "FOUND");
    assert_eq!(
        scan["categories"]["developer"][0]["profile_url"],
        "https://github.example/testuser123"
    );
    assert_eq!(scan["categories"]["social"][1]["status"], "NOT_FOUND");
    assert_eq!(scan["summary"]["total"], 4);
    assert_eq!(scan["summary"]["found"], 1);
    assert!(scan["scan_id"].is_string());
}

#[test]
fn test_csv_report_rows() {
    let csv = render_csv(&[sample_result()]);
    let lines: Vec<_> = csv.lines().collect();

    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("scan_id,identifier,identifier_kind,category"));

    // Categories come out in report order: social before developer.
    assert!(lines[1].contains(",social,instagram,Instagram,INDETERMINATE,200,,120,"));
    assert!(lines[1].ends_with("\"rate limited, retry later\""));
    assert!(lines[3].contains(",developer,github,GitHub,FOUND,200,https://github.example/testuser123,120,"));
    assert!(lines[4].contains(",GitLab,ERROR,,,120,timeout: no response within 10000ms"));
}

#[test]
fn test_text_report_hides_not_found_by_default() {
    let results = [sample_result()];

    let text = render_text(&results, ReportOptions::default());
    assert!(text.contains(" Target: testuser123 (username)"));
    assert!(text.contains("[ Developer Platforms ]"));
    assert!(text.contains("[+] GitHub"));
    assert!(text.contains("https://github.example/testuser123"));
    assert!(text.contains("[?] Instagram"));
    assert!(text.contains("[!] GitLab"));
    assert!(!text.contains("Mastodon"));
    assert!(text.contains("Summary: 1 found, 1 not found, 1 indeterminate, 1 errors (4 platforms)"));

    let verbose = render_text(&results, ReportOptions { show_not_found: true });
    assert!(verbose.contains("[-] Mastodon"));
}

#[test]
fn test_save_report_writes_each_format() {
    let tmp = TempDir::new().expect("create temp dir");
    let results = [sample_result()];

    for format in ReportFormat::ALL {
        let path = tmp.path().join(format!("report.{format}"));
        save_report(&path, &results, format, ReportOptions::default()).expect("save report");

        let contents = std::fs::read_to_string(&path).expect("read report");
        assert!(contents.contains("testuser123"), "{format} report lacks target");
        assert_eq!(ReportFormat::from_path(&path), Some(format));
    }
}

fn domain_report() -> DomainReport {
    DomainReport {
        domain: "example.com".to_string(),
        mx_records: vec![MxRecord {
            preference: 10,
            exchange: "mx.example.com".to_string(),
        }],
        spf: Some("v=spf1 -all".to_string()),
        dmarc: Some("v=DMARC1; p=reject".to_string()),
        dmarc_policy: Some("reject".to_string()),
        free_provider: false,
        lookup_errors: vec!["timeout: _dmarc.example.com: no answer within 10000ms".to_string()],
    }
}

#[test]
fn test_domain_analysis_in_reports() {
    let identifier = Identifier::email("john@example.com").expect("valid email");
    let results = [ScanResult::domain_only(identifier, domain_report())];

    let text = render_text(&results, ReportOptions::default());
    assert!(text.contains("[ Email Domain: example.com ]"));
    assert!(text.contains("MX:       10 mx.example.com"));
    assert!(text.contains("DMARC:    policy reject"));
    assert!(text.contains("Provider: custom domain"));
    assert!(text.contains("[!] timeout: _dmarc.example.com"));

    let json: serde_json::Value =
        serde_json::from_str(&render_json(&results).expect("render json")).expect("valid json");
    assert_eq!(json["results"][0]["domain"]["mx_records"][0]["exchange"], "mx.example.com");
    assert_eq!(json["results"][0]["domain"]["free_provider"], false);

    let without = render_json(&[sample_result()]).expect("render json");
    assert!(!without.contains("\"domain\""));
}

#[test]
fn test_text_report_lists_every_target() {
    let mut second = sample_result();
    second.identifier = Identifier::username("otheruser").expect("valid username");

    let text = render_text(&[sample_result(), second], ReportOptions::default());
    assert_eq!(text.matches(" Target: ").count(), 2);
    assert_eq!(text.matches("Summary: ").count(), 2);
    assert!(text.find("testuser123") < text.find("otheruser"));
}
