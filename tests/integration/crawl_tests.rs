//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the comment API and run full
//! crawls against a temporary output directory.

use comment_trawl::config::{
    load_config, ApiConfig, Config, CrawlerConfig, OutputConfig, QuotaConfig, ResumeMode,
    TextFormat, ThreadOrder,
};
use comment_trawl::crawler::{run_crawl, CrawlReport};
use comment_trawl::output::{log_path, marker_path, CommentRecord};
use comment_trawl::quota::LedgerError;
use comment_trawl::{ResourceState, TrawlError};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, root: &Path, ceiling: u64, margin: u64) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            api_key: Some("test-key".to_string()),
            api_key_env: "YOUTUBE_API_KEY".to_string(),
            page_size: 100,
            order: ThreadOrder::Relevance,
            text_format: TextFormat::PlainText,
            request_timeout_secs: 5,
        },
        quota: QuotaConfig {
            ceiling,
            margin,
            ledger_path: None,
        },
        crawler: CrawlerConfig {
            resources: root.join("videos.csv").to_string_lossy().into_owned(),
            backoff_ms: 10, // Very short for testing
            max_retries: 0,
            retry_backoff_ms: 5,
            resume_mode: ResumeMode::LogPresence,
        },
        output: OutputConfig {
            directory: root.join("out").to_string_lossy().into_owned(),
        },
    }
}

/// Writes the resource list with per-video metadata derived from the id
fn write_resources(root: &Path, ids: &[&str]) {
    let mut csv = String::from("video_id,period,channel_leaning,Source\n");
    for id in ids {
        csv.push_str(&format!("{id},period-{id},leaning-{id},source-{id}\n"));
    }
    fs::write(root.join("videos.csv"), csv).unwrap();
}

fn comment_json(id: &str) -> Value {
    json!({
        "id": id,
        "snippet": {
            "textDisplay": format!("text of {}", id),
            "authorDisplayName": format!("@{}", id),
            "likeCount": 1,
            "publishedAt": "2024-03-01T10:00:00Z"
        }
    })
}

fn thread_json(comment_id: &str, reply_count: u64) -> Value {
    json!({
        "id": format!("thread-{}", comment_id),
        "snippet": {
            "topLevelComment": comment_json(comment_id),
            "totalReplyCount": reply_count
        }
    })
}

fn page_json(items: Vec<Value>, next: Option<&str>) -> Value {
    match next {
        Some(token) => json!({ "items": items, "nextPageToken": token }),
        None => json!({ "items": items }),
    }
}

fn error_json(code: u16, reason: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": format!("{} error", reason),
            "errors": [{ "reason": reason }]
        }
    })
}

async fn mount_threads(server: &MockServer, video_id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", video_id))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_replies(server: &MockServer, parent_id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/comments"))
        .and(query_param("parentId", parent_id))
        .respond_with(response)
        .mount(server)
        .await;
}

/// One top-level comment with two replies for the given video
async fn mount_small_video(server: &MockServer, video_id: &str) {
    let parent = format!("c-{}", video_id);
    mount_threads(
        server,
        video_id,
        ResponseTemplate::new(200).set_body_json(page_json(vec![thread_json(&parent, 2)], None)),
    )
    .await;
    mount_replies(
        server,
        &parent,
        ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                comment_json(&format!("r1-{}", video_id)),
                comment_json(&format!("r2-{}", video_id)),
            ],
            None,
        )),
    )
    .await;
}

fn read_log(config: &Config, video_id: &str) -> Vec<CommentRecord> {
    let content = fs::read_to_string(log_path(config.output_dir(), video_id)).unwrap();
    content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn ledger_value(config: &Config) -> u64 {
    fs::read_to_string(config.ledger_path())
        .unwrap()
        .trim()
        .parse()
        .unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn test_two_videos_with_replies() {
    let server = MockServer::start().await;
    mount_small_video(&server, "vid1").await;
    mount_small_video(&server, "vid2").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1", "vid2"]);
    let config = create_test_config(&server.uri(), root.path(), 100, 10);

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.count(ResourceState::Done), 2);
    assert!(!report.halted_on_quota);
    assert_eq!(report.calls_issued, 4);
    assert_eq!(report.records_written, 6);
    assert_eq!(ledger_value(&config), 4);
    assert_eq!(request_count(&server).await, 4);

    for id in ["vid1", "vid2"] {
        let records = read_log(&config, id);
        assert_eq!(records.len(), 3);
        assert!(!records[0].is_reply);
        assert!(records[1].is_reply && records[2].is_reply);
        assert!(marker_path(config.output_dir(), id).is_file());
    }
}

#[tokio::test]
async fn test_records_keep_hierarchy_and_metadata() {
    let server = MockServer::start().await;
    mount_small_video(&server, "vid1").await;
    mount_small_video(&server, "vid2").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1", "vid2"]);
    let config = create_test_config(&server.uri(), root.path(), 100, 10);

    run_crawl(config.clone()).await.expect("Crawl failed");

    for id in ["vid1", "vid2"] {
        let records = read_log(&config, id);

        for record in &records {
            assert_eq!(record.video_id, id);
            assert_eq!(record.period, format!("period-{}", id));
            assert_eq!(record.channel_leaning, format!("leaning-{}", id));
            assert_eq!(record.source, format!("source-{}", id));
        }

        let top_level: Vec<_> = records.iter().filter(|r| !r.is_reply).collect();
        for top in &top_level {
            assert!(top.parent_comment_id.is_empty());
        }

        for reply in records.iter().filter(|r| r.is_reply) {
            let parents: Vec<_> = top_level
                .iter()
                .filter(|t| t.comment_id == reply.parent_comment_id)
                .collect();
            assert_eq!(parents.len(), 1, "reply {} has no unique parent", reply.comment_id);
            assert_eq!(reply.thread_id, parents[0].thread_id);
        }
    }
}

#[tokio::test]
async fn test_quota_ceiling_leaves_second_video_pending() {
    let server = MockServer::start().await;
    mount_small_video(&server, "vid1").await;
    mount_small_video(&server, "vid2").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1", "vid2"]);
    let config = create_test_config(&server.uri(), root.path(), 2, 0);

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.count(ResourceState::Done), 1);
    assert_eq!(report.count(ResourceState::Pending), 1);
    assert!(report.halted_on_quota);
    assert_eq!(ledger_value(&config), 2);
    assert_eq!(read_log(&config, "vid1").len(), 3);
    assert!(!log_path(config.output_dir(), "vid2").exists());
}

#[tokio::test]
async fn test_margin_checked_before_first_video() {
    let server = MockServer::start().await;
    mount_small_video(&server, "vid1").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1"]);

    // With a margin of 10 a ceiling of 2 leaves nothing to spend
    let config_path = root.path().join("trawl.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[api]
base-url = '{}'
api-key = "test-key"

[quota]
ceiling = 2
margin = 10

[crawler]
resources = '{}'

[output]
directory = '{}'
"#,
            server.uri(),
            root.path().join("videos.csv").display(),
            root.path().join("out").display()
        ),
    )
    .unwrap();
    let config = load_config(&config_path).expect("Config rejected");

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert!(report.halted_on_quota);
    assert_eq!(report.count(ResourceState::Pending), 1);
    assert_eq!(request_count(&server).await, 0);
    assert!(!log_path(config.output_dir(), "vid1").exists());
}

#[tokio::test]
async fn test_rerun_skips_completed_logs() {
    let server = MockServer::start().await;
    mount_small_video(&server, "vid1").await;
    mount_small_video(&server, "vid2").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1", "vid2"]);
    let config = create_test_config(&server.uri(), root.path(), 100, 10);

    run_crawl(config.clone()).await.expect("First crawl failed");
    let first_logs: Vec<_> = ["vid1", "vid2"]
        .iter()
        .map(|id| read_log(&config, id))
        .collect();

    let report = run_crawl(config.clone()).await.expect("Second crawl failed");

    assert_eq!(report.count(ResourceState::Skipped), 2);
    assert_eq!(report.calls_issued, 0);
    assert_eq!(request_count(&server).await, 4);
    assert_eq!(ledger_value(&config), 4);

    let second_logs: Vec<_> = ["vid1", "vid2"]
        .iter()
        .map(|id| read_log(&config, id))
        .collect();
    assert_eq!(first_logs, second_logs);
}

#[tokio::test]
async fn test_ledger_resumes_from_previous_spend() {
    let server = MockServer::start().await;
    mount_small_video(&server, "vid1").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1"]);
    let config = create_test_config(&server.uri(), root.path(), 100, 10);
    fs::create_dir_all(config.output_dir()).unwrap();
    fs::write(config.ledger_path(), "40").unwrap();

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.calls_issued, 2);
    assert_eq!(report.quota_used, 42);
    assert_eq!(ledger_value(&config), 42);
}

#[tokio::test]
async fn test_exhausted_ledger_issues_no_requests() {
    let server = MockServer::start().await;
    mount_small_video(&server, "vid1").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1"]);
    let config = create_test_config(&server.uri(), root.path(), 100, 0);
    fs::create_dir_all(config.output_dir()).unwrap();
    fs::write(config.ledger_path(), "100").unwrap();

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert!(report.halted_on_quota);
    assert_eq!(request_count(&server).await, 0);
    assert_eq!(ledger_value(&config), 100);
}

#[tokio::test]
async fn test_reply_walk_never_exceeds_ceiling() {
    let server = MockServer::start().await;
    mount_small_video(&server, "vid1").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1"]);
    let config = create_test_config(&server.uri(), root.path(), 1, 0);

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.count(ResourceState::Aborted), 1);
    assert_eq!(request_count(&server).await, 1);
    assert_eq!(ledger_value(&config), 1);
    // The top-level record made it to disk before the budget ran out
    assert_eq!(read_log(&config, "vid1").len(), 1);
    assert!(!marker_path(config.output_dir(), "vid1").exists());
}

#[tokio::test]
async fn test_follows_page_tokens() {
    let server = MockServer::start().await;

    // Mounted first so they win over the first-page mocks below
    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("pageToken", "threads-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_json(vec![thread_json("b", 2)], None)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/comments"))
        .and(query_param("pageToken", "replies-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_json(vec![comment_json("b-r2")], None)),
        )
        .mount(&server)
        .await;

    mount_threads(
        &server,
        "vid1",
        ResponseTemplate::new(200)
            .set_body_json(page_json(vec![thread_json("a", 0)], Some("threads-2"))),
    )
    .await;
    mount_replies(
        &server,
        "b",
        ResponseTemplate::new(200)
            .set_body_json(page_json(vec![comment_json("b-r1")], Some("replies-2"))),
    )
    .await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1"]);
    let config = create_test_config(&server.uri(), root.path(), 100, 10);

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.count(ResourceState::Done), 1);
    assert_eq!(ledger_value(&config), 4);

    let ids: Vec<_> = read_log(&config, "vid1")
        .into_iter()
        .map(|r| r.comment_id)
        .collect();
    assert_eq!(ids, vec!["a", "b", "b-r1", "b-r2"]);
}

#[tokio::test]
async fn test_near_exhaustion_stops_mid_video() {
    let server = MockServer::start().await;
    mount_threads(
        &server,
        "vid1",
        ResponseTemplate::new(200)
            .set_body_json(page_json(vec![thread_json("a", 0)], Some("threads-2"))),
    )
    .await;
    mount_small_video(&server, "vid2").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1", "vid2"]);
    let config = create_test_config(&server.uri(), root.path(), 10, 9);

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.count(ResourceState::Aborted), 1);
    assert_eq!(report.count(ResourceState::Pending), 1);
    assert_eq!(ledger_value(&config), 1);
    assert_eq!(read_log(&config, "vid1").len(), 1);
    assert!(!log_path(config.output_dir(), "vid2").exists());
}

#[tokio::test]
async fn test_network_failure_retried_and_charged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_threads(
        &server,
        "vid1",
        ResponseTemplate::new(200).set_body_json(page_json(vec![thread_json("a", 0)], None)),
    )
    .await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1"]);
    let mut config = create_test_config(&server.uri(), root.path(), 100, 10);
    config.crawler.max_retries = 1;

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.count(ResourceState::Done), 1);
    assert_eq!(request_count(&server).await, 2);
    assert_eq!(ledger_value(&config), 2);
    assert_eq!(read_log(&config, "vid1").len(), 1);
}

#[tokio::test]
async fn test_missing_video_abandoned_run_continues() {
    let server = MockServer::start().await;
    mount_threads(
        &server,
        "gone",
        ResponseTemplate::new(404).set_body_json(error_json(404, "videoNotFound")),
    )
    .await;
    mount_threads(
        &server,
        "vid2",
        ResponseTemplate::new(200).set_body_json(page_json(vec![thread_json("a", 0)], None)),
    )
    .await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["gone", "vid2"]);
    let config = create_test_config(&server.uri(), root.path(), 100, 10);

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.count(ResourceState::Abandoned), 1);
    assert_eq!(report.count(ResourceState::Done), 1);
    assert_eq!(ledger_value(&config), 2);
    assert!(read_log(&config, "gone").is_empty());
    assert!(!marker_path(config.output_dir(), "gone").exists());
}

#[tokio::test]
async fn test_quota_rejection_halts_run() {
    let server = MockServer::start().await;
    mount_threads(
        &server,
        "vid1",
        ResponseTemplate::new(403).set_body_json(error_json(403, "quotaExceeded")),
    )
    .await;
    mount_small_video(&server, "vid2").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1", "vid2"]);
    let config = create_test_config(&server.uri(), root.path(), 100, 10);

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.count(ResourceState::Aborted), 1);
    assert_eq!(report.count(ResourceState::Pending), 1);
    assert!(report.halted_on_quota);
    assert_eq!(request_count(&server).await, 1);
    assert_eq!(ledger_value(&config), 1);
}

#[tokio::test]
async fn test_failed_reply_walk_keeps_thread_walk_going() {
    let server = MockServer::start().await;
    mount_threads(
        &server,
        "vid1",
        ResponseTemplate::new(200).set_body_json(page_json(
            vec![thread_json("a", 3), thread_json("b", 1)],
            None,
        )),
    )
    .await;
    mount_replies(&server, "a", ResponseTemplate::new(500)).await;
    mount_replies(
        &server,
        "b",
        ResponseTemplate::new(200).set_body_json(page_json(vec![comment_json("b-r1")], None)),
    )
    .await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1"]);
    let config = create_test_config(&server.uri(), root.path(), 100, 10);

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.count(ResourceState::Done), 1);
    assert_eq!(ledger_value(&config), 3);

    let ids: Vec<_> = read_log(&config, "vid1")
        .into_iter()
        .map(|r| r.comment_id)
        .collect();
    assert_eq!(ids, vec!["a", "b", "b-r1"]);
}

#[tokio::test]
async fn test_malformed_body_abandons_video() {
    let server = MockServer::start().await;
    mount_threads(
        &server,
        "vid1",
        ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
    )
    .await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1"]);
    let config = create_test_config(&server.uri(), root.path(), 100, 10);

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.count(ResourceState::Abandoned), 1);
    assert_eq!(ledger_value(&config), 1);
}

#[tokio::test]
async fn test_malformed_descriptor_skipped() {
    let server = MockServer::start().await;
    mount_small_video(&server, "vid1").await;
    mount_small_video(&server, "vid3").await;

    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("videos.csv"),
        "video_id,period,channel_leaning,Source\n\
         vid1,pre,left,cnn\n\
         vid2,pre,,cnn\n\
         vid3,post,right,fox\n",
    )
    .unwrap();
    let config = create_test_config(&server.uri(), root.path(), 100, 10);

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    let expected = CrawlReport {
        done: 2,
        malformed: 1,
        records_written: 6,
        calls_issued: 4,
        quota_used: 4,
        quota_ceiling: 100,
        ..Default::default()
    };
    assert_eq!(report, expected);
    assert!(!log_path(config.output_dir(), "vid2").exists());
}

#[tokio::test]
async fn test_partial_log_skipped_in_log_presence_mode() {
    let server = MockServer::start().await;
    mount_small_video(&server, "vid1").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1"]);
    let config = create_test_config(&server.uri(), root.path(), 100, 10);
    fs::create_dir_all(config.output_dir()).unwrap();
    fs::write(log_path(config.output_dir(), "vid1"), "{\"partial\":true}\n").unwrap();

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.count(ResourceState::Skipped), 1);
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_marker_mode_recrawls_partial_log() {
    let server = MockServer::start().await;
    mount_small_video(&server, "vid1").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1"]);
    let mut config = create_test_config(&server.uri(), root.path(), 100, 10);
    config.crawler.resume_mode = ResumeMode::Marker;
    fs::create_dir_all(config.output_dir()).unwrap();
    fs::write(log_path(config.output_dir(), "vid1"), "{\"partial\":true}\n").unwrap();

    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.count(ResourceState::Done), 1);
    assert_eq!(read_log(&config, "vid1").len(), 3);
    assert!(marker_path(config.output_dir(), "vid1").is_file());

    let report = run_crawl(config.clone()).await.expect("Second crawl failed");
    assert_eq!(report.count(ResourceState::Skipped), 1);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_ledger_persist_failure_aborts_run() {
    let server = MockServer::start().await;
    mount_small_video(&server, "vid1").await;

    let root = TempDir::new().unwrap();
    write_resources(root.path(), &["vid1"]);
    let config = create_test_config(&server.uri(), root.path(), 100, 10);

    // A directory where the ledger's temp file goes makes every debit fail
    fs::create_dir_all(config.ledger_path().with_extension("tmp")).unwrap();

    let result = run_crawl(config.clone()).await;

    assert!(matches!(
        result,
        Err(TrawlError::Ledger(LedgerError::Persist { .. }))
    ));
    assert_eq!(request_count(&server).await, 0);
    assert!(!config.ledger_path().exists());
    assert!(!marker_path(config.output_dir(), "vid1").exists());
}
