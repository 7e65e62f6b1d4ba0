use percepta::persistence::ReportSink;
use percepta::source::{CampaignSource, SourceError, SourceResult};
use percepta::survey::{CampaignRecord, DimensionRecord, ItemRecord, RespondentRecord, ResponseRecord};
use percepta::{
    AnalysisConfig, Analyzer, CampaignOutcome, DatasetSource, MemoryReportSink, OnaError, ReportStore,
    StabilityConfig, StabilityLabel,
};
use serde_json::{json, Value};
use tempfile::TempDir;

/// (department, LID, COM, INN) per perceptual group
const GROUPS: [(&str, i32, i32, i32); 3] = [
    ("Operaciones", 5, 1, 1),
    ("Ventas", 1, 5, 1),
    ("Finanzas", 1, 1, 5),
];

fn config() -> AnalysisConfig {
    AnalysisConfig {
        stability: StabilityConfig {
            iterations: 10,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Export with one campaign per entry of `(id, status, created_at, per_group)`
fn export(campaigns: &[(&str, &str, &str, usize)]) -> Value {
    let mut campaign_rows = Vec::new();
    let mut respondents = Vec::new();
    let mut responses = Vec::new();

    for &(id, status, created_at, per_group) in campaigns {
        campaign_rows.push(json!({
            "id": id,
            "instrument_id": "core",
            "status": status,
            "created_at": created_at,
        }));
        for (g, &(dept, lid, com, inn)) in GROUPS.iter().enumerate() {
            for i in 0..per_group {
                let rid = format!("{}-g{}-{}", id, g, i);
                respondents.push(json!({
                    "id": rid,
                    "campaign_id": id,
                    "department": dept,
                    "tenure": "1-3",
                    "status": "completed",
                }));
                for (item, score) in [
                    ("i-lid", lid),
                    ("i-check", 3),
                    ("i-com", com),
                    ("i-inn", inn),
                    ("i-inn-rev", 6 - inn),
                    ("i-eng", 4),
                ] {
                    responses.push(json!({"respondent_id": rid, "item_id": item, "score": score}));
                }
            }
        }
        // Never counted
        respondents.push(json!({"id": format!("{}-pending", id), "campaign_id": id, "status": "in_progress"}));
    }

    json!({
        "campaigns": campaign_rows,
        "dimensions": [
            {"id": "d-lid", "code": "LID", "instrument_id": "core"},
            {"id": "d-com", "code": "COM", "instrument_id": "core"},
            {"id": "d-inn", "code": "INN", "instrument_id": "core"},
            {"id": "d-eng", "code": "ENG", "instrument_id": "core"},
            {"id": "d-eng-only", "code": "ENG", "instrument_id": "pulse"}
        ],
        "items": [
            {"id": "i-lid", "dimension_id": "d-lid"},
            {"id": "i-check", "dimension_id": "d-lid", "is_attention_check": true},
            {"id": "i-com", "dimension_id": "d-com"},
            {"id": "i-inn", "dimension_id": "d-inn"},
            {"id": "i-inn-rev", "dimension_id": "d-inn", "is_reverse": true},
            {"id": "i-eng", "dimension_id": "d-eng"}
        ],
        "respondents": respondents,
        "responses": responses,
    })
}

fn source(campaigns: &[(&str, &str, &str, usize)]) -> DatasetSource {
    DatasetSource::from_json(&export(campaigns).to_string()).unwrap()
}

#[test]
fn test_three_perceptual_groups() {
    let source = source(&[("c-2025", "closed", "2025-06-01T00:00:00Z", 4)]);
    let sink = MemoryReportSink::new();
    let analyzer = Analyzer::new(config()).unwrap();

    let report = analyzer.process_campaign(&source, &sink, "c-2025").unwrap();

    // Three disjoint cliques of four: 18 of 66 pairs
    assert_eq!(report.summary.nodes, 12);
    assert_eq!(report.summary.edges, 18);
    assert!((report.summary.density - 0.2727).abs() < 1e-3);
    assert_eq!(report.summary.communities, 3);
    assert!((report.summary.modularity - 0.6667).abs() < 1e-3);
    assert!((report.summary.avg_clustering - 1.0).abs() < 1e-9);

    assert_eq!(report.stability.label, StabilityLabel::Robust);
    assert_eq!(report.stability.iterations, 10);
    assert_eq!(report.stability.method, "leiden");

    let mut departments: Vec<&str> = report
        .communities
        .iter()
        .map(|c| c.dominant_department.as_str())
        .collect();
    departments.sort();
    assert_eq!(departments, vec!["Finanzas", "Operaciones", "Ventas"]);
    for community in &report.communities {
        assert_eq!(community.size, 4);
        assert!((community.avg_score - 2.33).abs() < 0.01);
    }

    // ENG is excluded; every remaining dimension separates the groups by 4 points
    let codes: Vec<&str> = report.discriminants.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes.len(), 3);
    assert!(!codes.contains(&"ENG"));
    assert!(report.discriminants.iter().all(|d| (d.spread - 4.0).abs() < 1e-9));
    assert!(!report.global_means.keys().any(|k| k.as_str() == "ENG"));

    assert!(report.bridges.is_empty());
    assert!(report.critical_edges.is_empty());
    assert_eq!(report.node_metrics.len(), 12);
    assert!(report.narrative.contains("Se identificaron 3 grupos perceptuales"));
    assert_eq!(report.graph_image_format.as_deref(), Some("svg"));
    assert!(report.graph_image.is_some());

    assert_eq!(sink.count("c-2025", "ona_network").unwrap(), 1);
}

#[test]
fn test_report_without_image() {
    let source = source(&[("c-2025", "closed", "2025-06-01T00:00:00Z", 4)]);
    let sink = MemoryReportSink::new();
    let analyzer = Analyzer::new(AnalysisConfig {
        render_image: false,
        ..config()
    })
    .unwrap();

    let report = analyzer.process_campaign(&source, &sink, "c-2025").unwrap();
    assert!(report.graph_image.is_none());

    let json: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert!(json["graph_image"].is_null());
    assert_eq!(json["summary"]["communities"], 3);
    assert_eq!(json["stability"]["label"], "robust");
}

#[test]
fn test_reprocessing_replaces_stored_report() {
    let dir = TempDir::new().unwrap();
    let source = source(&[("c-2025", "closed", "2025-06-01T00:00:00Z", 4)]);
    let analyzer = Analyzer::new(config()).unwrap();

    {
        let store = ReportStore::open(dir.path()).unwrap();
        analyzer.process_campaign(&source, &store, "c-2025").unwrap();
        analyzer.process_campaign(&source, &store, "c-2025").unwrap();
        assert_eq!(store.count("c-2025", "ona_network").unwrap(), 1);
    }

    // Survives reopening
    let store = ReportStore::open(dir.path()).unwrap();
    let stored = store.get("c-2025", "ona_network").unwrap().unwrap();
    assert_eq!(stored.summary.nodes, 12);
    assert_eq!(store.count("c-2025", "other_type").unwrap(), 0);
}

#[test]
fn test_missing_campaign_is_skipped() {
    let source = source(&[]);
    let analyzer = Analyzer::new(config()).unwrap();
    let err = analyzer
        .process_campaign(&source, &MemoryReportSink::new(), "ghost")
        .unwrap_err();
    assert!(matches!(err, OnaError::CampaignNotFound(_)));
    assert!(err.is_skip());
}

/// Fails every respondent query for one campaign
struct FlakySource {
    inner: DatasetSource,
    broken: &'static str,
}

impl CampaignSource for FlakySource {
    fn campaign(&self, campaign_id: &str) -> SourceResult<Option<CampaignRecord>> {
        self.inner.campaign(campaign_id)
    }

    fn dimensions(&self, instrument_ids: &[String]) -> SourceResult<Vec<DimensionRecord>> {
        self.inner.dimensions(instrument_ids)
    }

    fn items(&self, dimension_ids: &[String]) -> SourceResult<Vec<ItemRecord>> {
        self.inner.items(dimension_ids)
    }

    fn completed_respondents(&self, campaign_id: &str) -> SourceResult<Vec<RespondentRecord>> {
        if campaign_id == self.broken {
            return Err(SourceError::Unavailable("connection reset".to_string()));
        }
        self.inner.completed_respondents(campaign_id)
    }

    fn responses(&self, respondent_ids: &[String]) -> SourceResult<Vec<ResponseRecord>> {
        self.inner.responses(respondent_ids)
    }

    fn terminal_campaigns(&self) -> SourceResult<Vec<CampaignRecord>> {
        self.inner.terminal_campaigns()
    }
}

#[test]
fn test_batch_continues_past_failures() {
    let mut data = export(&[
        ("good", "archived", "2025-03-01T00:00:00Z", 4),
        ("tiny", "closed", "2025-01-01T00:00:00Z", 1),
        ("broken", "closed", "2025-02-01T00:00:00Z", 4),
        ("running", "active", "2024-12-01T00:00:00Z", 4),
    ]);
    data["campaigns"].as_array_mut().unwrap().push(json!({
        "id": "pulse",
        "instrument_id": "pulse",
        "status": "closed",
        "created_at": "2025-04-01T00:00:00Z",
    }));

    let source = FlakySource {
        inner: DatasetSource::from_json(&data.to_string()).unwrap(),
        broken: "broken",
    };
    let sink = MemoryReportSink::new();
    let analyzer = Analyzer::new(config()).unwrap();

    let summary = analyzer.process_all(&source, &sink).unwrap();

    let ids: Vec<&str> = summary.outcomes.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["tiny", "broken", "good", "pulse"]);
    assert!(matches!(summary.outcomes[0].1, CampaignOutcome::Skipped(_)));
    assert!(matches!(summary.outcomes[1].1, CampaignOutcome::Failed(_)));
    assert_eq!(summary.outcomes[2].1, CampaignOutcome::Completed);
    // Only the excluded outcome dimension
    assert!(matches!(summary.outcomes[3].1, CampaignOutcome::Skipped(_)));

    assert_eq!(summary.completed(), 1);
    assert_eq!(summary.skipped(), 2);
    assert_eq!(summary.failed(), 1);

    let stored: Vec<String> = sink.records().unwrap().into_iter().map(|r| r.campaign_id).collect();
    assert_eq!(stored, vec!["good"]);
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = config();
    config.threshold.min_density = 0.5;
    config.threshold.max_density = 0.2;
    assert!(matches!(Analyzer::new(config), Err(OnaError::Config(_))));
}
