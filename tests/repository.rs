//! Tier-3 repository client and tracker against a mock API server.

use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use u_roadmap::config::{RepositoryConfig, RoadmapConfig};
use u_roadmap::graph::GraphBuilder;
use u_roadmap::models::{CapacityModel, MetricsSnapshot, Project, ProjectStatus, Quarter};
use u_roadmap::pipeline::Pipeline;
use u_roadmap::progress::{
    ActivityBasis, ChecklistProgress, Confidence, GitHubClient, ProgressTracker, RepositoryActivitySource,
    Velocity,
};
use u_roadmap::scheduler::{QuarterScheduler, ScheduleRequest};
use u_roadmap::RoadmapError;

const REPO: &str = "acme/app";
const TOKEN: &str = "test-token";

fn since() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn settings(server: &MockServer) -> RepositoryConfig {
    RepositoryConfig {
        api_base: server.uri(),
        timeout_secs: 5,
        ..Default::default()
    }
}

async fn mount_listings(server: &MockServer) {
    let commits: Vec<_> = (0..12).map(|i| json!({ "sha": format!("c{i}") })).collect();
    Mock::given(method("GET"))
        .and(path(format!("/repos/{REPO}/commits")))
        .and(query_param("since", "2025-01-01T00:00:00Z"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(commits))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/{REPO}/pulls")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "state": "closed", "merged_at": "2025-02-01T10:00:00Z" },
            { "state": "closed", "merged_at": "2024-11-20T10:00:00Z" },
            { "state": "closed", "merged_at": null },
            { "state": "open", "merged_at": null }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/{REPO}/issues")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "state": "open" },
            { "state": "open" },
            { "state": "closed" },
            { "state": "open", "pull_request": { "url": "x" } }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/{REPO}/releases")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "published_at": "2025-02-15T00:00:00Z" },
            { "published_at": "2024-06-01T00:00:00Z" }
        ])))
        .mount(server)
        .await;
}

async fn mount_roadmap(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{REPO}/contents/ROADMAP.md")))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_activity_counts() {
    let server = MockServer::start().await;
    mount_listings(&server).await;
    mount_roadmap(&server, 200, "# Roadmap\n- [x] sync\n- [ ] export\n- [x] search\n").await;

    let client = GitHubClient::new(&settings(&server), TOKEN).unwrap();
    let counts = client.fetch_activity(REPO, since()).await.unwrap();

    assert_eq!(counts.commits, 12);
    assert_eq!(counts.merged_prs, 1);
    assert_eq!(counts.open_prs, 1);
    assert_eq!(counts.open_issues, 2);
    assert_eq!(counts.closed_issues, 1);
    assert_eq!(counts.releases, 1);
    assert_eq!(counts.roadmap, Some(ChecklistProgress { done: 2, total: 3 }));
}

#[tokio::test]
async fn test_missing_roadmap_is_not_an_error() {
    let server = MockServer::start().await;
    mount_listings(&server).await;
    mount_roadmap(&server, 404, "Not Found").await;

    let client = GitHubClient::new(&settings(&server), TOKEN).unwrap();
    let counts = client.fetch_activity(REPO, since()).await.unwrap();
    assert_eq!(counts.roadmap, None);
    assert_eq!(counts.commits, 12);
}

#[tokio::test]
async fn test_server_error_is_repository_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = GitHubClient::new(&settings(&server), TOKEN).unwrap();
    let err = client.fetch_activity(REPO, since()).await.unwrap_err();
    assert!(matches!(err, RoadmapError::Repository { .. }));
    assert!(!err.is_fatal());
    assert!(err.to_string().contains("HTTP 500"));
}

fn tracked_project() -> Project {
    Project::new("sync")
        .with_status(ProjectStatus::InProgress)
        .with_repository(REPO)
        .with_start_date(since())
}

async fn track(config: RoadmapConfig, source: Arc<dyn RepositoryActivitySource>) -> Vec<u_roadmap::progress::ProgressReport> {
    let projects = vec![tracked_project()];
    let graph = GraphBuilder::new(&projects).build();
    let schedule = QuarterScheduler::new(CapacityModel::uniform(120.0, 60.0))
        .schedule(&ScheduleRequest::new(&projects, &[], &graph));
    ProgressTracker::new(config)
        .with_source(source)
        .with_today(NaiveDate::from_ymd_opt(2025, 3, 12).unwrap())
        .track(&projects, &graph, &schedule, &MetricsSnapshot::new())
        .await
}

#[tokio::test]
async fn test_tracker_uses_roadmap_checklist() {
    let server = MockServer::start().await;
    mount_listings(&server).await;
    mount_roadmap(&server, 200, "- [x] one\n- [ ] two\n").await;

    let mut config = RoadmapConfig::default();
    config.progress.repository = settings(&server);
    let client = GitHubClient::new(&config.progress.repository, TOKEN).unwrap();
    let reports = track(config, Arc::new(client)).await;

    let report = &reports[0];
    let tier3 = report.tier3.as_ref().unwrap();
    assert_eq!(tier3.basis, ActivityBasis::Roadmap);
    assert_eq!(tier3.confidence, Confidence::High);
    // only tier 3 is available, so it carries the whole estimate
    assert!((report.overall_progress_pct - 50.0).abs() < 1e-10);
    // 12 commits over 10 weeks
    assert!((tier3.commits_per_week - 1.2).abs() < 1e-10);
    assert_eq!(report.velocity, Velocity::Low);
}

#[tokio::test]
async fn test_pipeline_with_injected_tracker() {
    let server = MockServer::start().await;
    mount_listings(&server).await;
    mount_roadmap(&server, 200, "- [x] one\n- [x] two\n- [ ] three\n- [ ] four\n").await;

    let mut config = RoadmapConfig::default();
    config.current_quarter = Quarter::Q2;
    config.progress.repository = settings(&server);
    let client = GitHubClient::new(&config.progress.repository, TOKEN).unwrap();
    let tracker = ProgressTracker::new(config.clone())
        .with_source(Arc::new(client))
        .with_today(NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());

    let pipeline = Pipeline::new(config).with_tracker(tracker);
    let out = pipeline.run(&[tracked_project()], &MetricsSnapshot::new()).await;

    assert_eq!(out.current_quarter, Quarter::Q2);
    assert_eq!(out.progress.len(), 1);
    let tier3 = out.progress[0].tier3.as_ref().unwrap();
    assert_eq!(tier3.basis, ActivityBasis::Roadmap);
    assert!((out.progress[0].overall_progress_pct - 50.0).abs() < 1e-10);
}

#[tokio::test]
async fn test_tracker_degrades_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = RoadmapConfig::default();
    config.progress.repository = settings(&server);
    let client = GitHubClient::new(&config.progress.repository, TOKEN).unwrap();
    let reports = track(config, Arc::new(client)).await;

    assert_eq!(reports.len(), 1);
    assert!(reports[0].tier3.is_none());
    assert_eq!(reports[0].velocity, Velocity::Unknown);
    assert!((reports[0].overall_progress_pct - 0.0).abs() < 1e-10);
}

#[test]
fn test_tracker_offline_without_token() {
    let mut config = RoadmapConfig::default();
    config.progress.repository.token_env = "U_ROADMAP_TEST_TOKEN_THAT_IS_NEVER_SET".into();
    assert!(!ProgressTracker::from_environment(config).is_online());

    let mut disabled = RoadmapConfig::default();
    disabled.progress.repository.enabled = false;
    assert!(!ProgressTracker::from_environment(disabled).is_online());
}
