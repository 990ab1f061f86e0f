use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};

use reports_core::api::API_KEY_HEADER;
use reports_core::shell::{ApiClient, Shell, Transport};
use reports_core::view::SELECT_PLACEHOLDER;
use reports_core::{render_text, ApiConfig, ApiError, CaseId, Event, ReportId, ToastKind, ViewState};

const REPORTS: &str = r#"[
    {"id": 1, "title": "A", "content": "x", "case_id": null},
    {"id": 2, "title": "B", "content": "y", "case_id": 3}
]"#;
const CASES: &str = r#"[{"id": 9, "case_number": "C-9", "title": "Theft"}]"#;

/// Answers by request path and records every request it sees.
#[derive(Clone, Default)]
struct FakeTransport {
    routes: Arc<Mutex<HashMap<String, HttpResult>>>,
    seen: Arc<Mutex<Vec<HttpRequest>>>,
}

impl FakeTransport {
    fn respond(&self, path: &str, status: u16, body: &str) {
        let response = HttpResponse::status(status).body(body).build();
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), HttpResult::Ok(response));
    }

    fn seen(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> HttpResult {
        let path = url::Url::parse(&request.url).unwrap().path().to_string();
        self.seen.lock().unwrap().push(request);

        self.routes
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .unwrap_or_else(|| HttpResult::Err(crux_http::Error::Io(format!("no route for {path}"))))
    }
}

fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

fn config() -> ApiConfig {
    ApiConfig::new("https://api.test/v1", "test-key").unwrap()
}

fn loaded_transport() -> FakeTransport {
    let transport = FakeTransport::default();
    transport.respond("/v1/reports", 200, REPORTS);
    transport.respond("/v1/cases", 200, CASES);
    transport
}

fn ready_reports(shell: &Shell<FakeTransport>) -> Vec<reports_core::view::ReportItem> {
    match shell.view().state {
        ViewState::Ready { reports } => reports,
        other => panic!("expected ready view, got {other:?}"),
    }
}

#[tokio::test]
async fn test_mount_loads_both_listings() {
    let transport = loaded_transport();
    let (mut shell, _notifications) = Shell::new(transport.clone());

    shell.dispatch(Event::Mounted(config()));
    assert_eq!(shell.in_flight(), 2);
    assert_eq!(shell.view().state, ViewState::Loading);
    assert!(shell.take_render());
    assert_eq!(render_text(&shell.view()), "Loading…\n");

    shell.settle().await;

    assert_eq!(shell.in_flight(), 0);
    assert_eq!(shell.view().report_count(), 2);

    let seen = transport.seen();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|r| r.method == "GET"));
    assert!(seen.iter().all(|r| header(r, API_KEY_HEADER).is_none()));
    assert!(seen
        .iter()
        .any(|r| r.url == "https://api.test/v1/reports?limit=50"));
}

#[tokio::test]
async fn test_link_report_to_case() {
    let transport = loaded_transport();
    let (mut shell, mut notifications) = Shell::new(transport.clone());
    shell.dispatch(Event::Mounted(config()));
    shell.settle().await;

    transport.respond(
        "/v1/reports/1/link_case",
        200,
        r#"{"id": 1, "title": "A", "content": "x", "case_id": 9}"#,
    );

    shell.dispatch(Event::CaseSelected {
        report_id: "1".into(),
        case_id: "9".into(),
    });
    assert_eq!(shell.in_flight(), 1);
    let pending = ready_reports(&shell);
    assert!(pending[0].selector.disabled);
    assert_eq!(pending[0].selector.selected.as_deref(), Some("9"));

    shell.settle().await;

    let link = transport.seen().pop().unwrap();
    assert_eq!(link.method, "POST");
    assert_eq!(link.url, "https://api.test/v1/reports/1/link_case");
    assert_eq!(header(&link, API_KEY_HEADER), Some("test-key"));
    assert_eq!(link.body, b"case_id=9");

    let toast = notifications.try_recv().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.message, "Report 1 linked to CASE-9");

    let reports = ready_reports(&shell);
    assert_eq!(reports[0].id, ReportId::new("1").to_string());
    assert_eq!(reports[0].case_label, "CASE-9");
    assert!(!reports[0].selector.disabled);
    assert_eq!(reports[0].selector.selected, None);
    assert_eq!(reports[0].selector.placeholder, SELECT_PLACEHOLDER);
    assert_eq!(reports[1].case_label, "CASE-3");
}

#[tokio::test]
async fn test_link_failure_is_notified() {
    let transport = loaded_transport();
    let (mut shell, mut notifications) = Shell::new(transport.clone());
    shell.dispatch(Event::Mounted(config()));
    shell.settle().await;
    let before = ready_reports(&shell);

    transport.respond("/v1/reports/1/link_case", 404, "not found");
    shell.dispatch(Event::CaseSelected {
        report_id: "1".into(),
        case_id: "9".into(),
    });
    shell.settle().await;

    let toast = notifications.try_recv().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.message, "Error: Failed: 404 not found");
    assert_eq!(ready_reports(&shell), before);
    assert!(render_text(&shell.view()).contains("(✗) Error: Failed: 404 not found"));
}

#[tokio::test]
async fn test_listing_failure_shows_error_only() {
    let transport = FakeTransport::default();
    transport.respond("/v1/reports", 200, REPORTS);
    transport.respond("/v1/cases", 500, "boom");
    let (mut shell, _notifications) = Shell::new(transport);

    shell.dispatch(Event::Mounted(config()));
    shell.settle().await;

    let view = shell.view();
    assert_eq!(
        view.state,
        ViewState::Error {
            message: "HTTP 500 boom".into()
        }
    );
    assert_eq!(render_text(&view), "[!] HTTP 500 boom\n");
}

#[tokio::test]
async fn test_link_while_errored_is_not_sent() {
    let transport = FakeTransport::default();
    transport.respond("/v1/reports", 200, REPORTS);
    let (mut shell, mut notifications) = Shell::new(transport.clone());
    shell.dispatch(Event::Mounted(config()));
    shell.settle().await;
    assert!(matches!(shell.view().state, ViewState::Error { .. }));

    shell.dispatch(Event::CaseSelected {
        report_id: "1".into(),
        case_id: "9".into(),
    });

    assert_eq!(shell.in_flight(), 0);
    assert_eq!(transport.seen().len(), 2);
    assert!(notifications.try_recv().is_err());
}

#[tokio::test]
async fn test_reload_after_failure() {
    let transport = FakeTransport::default();
    let (mut shell, _notifications) = Shell::new(transport.clone());
    shell.dispatch(Event::Mounted(config()));
    shell.settle().await;
    assert!(matches!(shell.view().state, ViewState::Error { .. }));

    transport.respond("/v1/reports", 200, REPORTS);
    transport.respond("/v1/cases", 200, CASES);
    shell.dispatch(Event::Reload);
    shell.settle().await;

    assert_eq!(shell.view().report_count(), 2);
}

#[tokio::test]
async fn test_api_client_operations() {
    let transport = loaded_transport();
    transport.respond(
        "/v1/reports/2/link_case",
        200,
        r#"{"id": "2", "title": "B", "content": "y", "case_id": "9"}"#,
    );
    let client = ApiClient::new(config(), transport.clone());

    let reports = client.list_reports(10).await.unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].case_id, Some(CaseId::new("3")));

    let cases = client.list_cases().await.unwrap();
    assert_eq!(cases[0].option_label(), "C-9 – Theft");

    let linked = client
        .link_report(&ReportId::new("2"), &CaseId::new("9"))
        .await
        .unwrap();
    assert_eq!(linked.case_id, Some(CaseId::new("9")));

    let seen = transport.seen();
    assert!(seen[0].url.ends_with("/reports?limit=10"));
    assert_eq!(header(&seen[2], API_KEY_HEADER), Some("test-key"));
    assert_eq!(seen[2].body, b"case_id=9");

    let err = client
        .link_report(&ReportId::new("2"), &CaseId::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));
    assert_eq!(transport.seen().len(), 3);
}

#[tokio::test]
async fn test_api_client_link_failure() {
    let transport = loaded_transport();
    transport.respond("/v1/reports/1/link_case", 404, "not found");
    let client = ApiClient::new(config(), transport);

    let err = client
        .link_report(&ReportId::new("1"), &CaseId::new("9"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed: 404 not found");
}
