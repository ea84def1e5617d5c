use tests::*;

use pretty_assertions::assert_eq;
use quarry::{ProtocolState, SearchResponse};
use std::time::Duration;

async fn paged_once(plan: &CountingPlan, backend: &mut ScriptedBackend) -> quarry::QueryRequest {
    let mut request = builder(plan)
        .cursor(Duration::from_secs(30))
        .build()
        .unwrap();
    request.fetch_page(backend).await.unwrap();
    assert_eq!(request.protocol_state(), ProtocolState::Paging);
    request
}

fn open_cursor() -> ScriptedBackend {
    let mut responses = pages(&[2, 2, 0]);
    responses[0].cursor_id = Some("h1".to_string());
    ScriptedBackend::with_responses(responses)
}

#[tokio::test]
async fn early_cleanup_drops_the_handle_without_release() {
    let plan = CountingPlan::default();
    let mut backend = open_cursor();
    let log = backend.log();

    let mut request = paged_once(&plan, &mut backend).await;
    assert!(request.has_more_pages());

    request.cleanup(&mut backend).await.unwrap();
    assert!(log.releases().is_empty());
    assert_eq!(request.protocol_state(), ProtocolState::ExhaustedClean);
    assert_eq!(request.cursor_token().unwrap(), None);
    assert!(!request.has_more_pages());

    let page = request.fetch_page(&mut backend).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn force_cleanup_releases_mid_paging() {
    let plan = CountingPlan::default();
    let mut backend = open_cursor();
    let log = backend.log();

    let mut request = paged_once(&plan, &mut backend).await;
    request.force_cleanup(&mut backend).await.unwrap();

    assert_eq!(log.releases(), ["h1"]);
    assert_eq!(request.protocol_state(), ProtocolState::ExhaustedClean);
    assert!(!request.has_more_pages());

    request.force_cleanup(&mut backend).await.unwrap();
    request.cleanup(&mut backend).await.unwrap();
    assert_eq!(log.releases(), ["h1"]);
}

#[tokio::test]
async fn failed_release_still_clears_the_handle() {
    let plan = CountingPlan::default();
    let mut backend = open_cursor();
    backend.fail_next_release("cursor not found");
    let log = backend.log();

    let mut request = paged_once(&plan, &mut backend).await;
    while request.has_more_pages() {
        request.fetch_page(&mut backend).await.unwrap();
    }
    assert_eq!(request.protocol_state(), ProtocolState::ExhaustedPendingCleanup);

    let err = request.cleanup(&mut backend).await.unwrap_err();
    assert!(err.is_backend_operation_failed());
    assert!(err.to_string().contains("cursor not found"), "got: {err}");
    assert_eq!(request.protocol_state(), ProtocolState::ExhaustedClean);
    assert_eq!(request.cursor_token().unwrap(), None);

    // Nothing left to release
    request.cleanup(&mut backend).await.unwrap();
    assert_eq!(log.releases(), ["h1"]);
}

#[tokio::test]
async fn exhausted_without_a_handle() {
    let plan = CountingPlan::default();
    let mut backend = ScriptedBackend::with_responses([SearchResponse::default()]);
    let log = backend.log();

    let mut request = builder(&plan)
        .cursor(Duration::from_secs(30))
        .build()
        .unwrap();
    let page = request.fetch_page(&mut backend).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(request.protocol_state(), ProtocolState::ExhaustedPendingCleanup);
    assert!(!request.has_more_pages());

    request.cleanup(&mut backend).await.unwrap();
    assert!(log.releases().is_empty());
    assert_eq!(request.protocol_state(), ProtocolState::ExhaustedClean);
}

#[tokio::test]
async fn resumed_handle_before_first_fetch() {
    let plan = CountingPlan::default();
    let mut backend = ScriptedBackend::new();
    let log = backend.log();

    let mut request = builder(&plan)
        .cursor(Duration::from_secs(30))
        .resume("h9", None)
        .build()
        .unwrap();
    assert_eq!(request.protocol_state(), ProtocolState::Fresh);
    assert!(request.has_more_pages());

    request.cleanup(&mut backend).await.unwrap();
    assert!(log.releases().is_empty());
    assert_eq!(request.protocol_state(), ProtocolState::ExhaustedClean);

    let mut request = builder(&plan)
        .cursor(Duration::from_secs(30))
        .resume("h9", None)
        .build()
        .unwrap();
    request.force_cleanup(&mut backend).await.unwrap();
    assert_eq!(log.releases(), ["h9"]);
    assert_eq!(plan.calls(), 0);
}

#[tokio::test]
async fn failed_force_cleanup_still_clears_the_handle() {
    let plan = CountingPlan::default();
    let mut backend = open_cursor();
    backend.fail_next_release("cursor not found");
    let log = backend.log();

    let mut request = paged_once(&plan, &mut backend).await;

    let err = request.force_cleanup(&mut backend).await.unwrap_err();
    assert!(err.is_backend_operation_failed());
    assert_eq!(request.cursor_token().unwrap(), None);
    assert_eq!(request.protocol_state(), ProtocolState::ExhaustedClean);
    assert!(!request.has_more_pages());

    request.force_cleanup(&mut backend).await.unwrap();
    assert_eq!(log.releases(), ["h1"]);
}

#[tokio::test]
async fn empty_cursor_id_is_not_adopted() {
    let plan = CountingPlan::default();
    let mut responses = pages(&[2, 0]);
    responses[0].cursor_id = Some(String::new());
    let mut backend = ScriptedBackend::with_responses(responses);
    let log = backend.log();

    let mut request = builder(&plan)
        .cursor(Duration::from_secs(30))
        .build()
        .unwrap();
    request.fetch_page(&mut backend).await.unwrap();
    assert_eq!(request.cursor_token().unwrap(), None);

    request.fetch_page(&mut backend).await.unwrap();
    assert_eq!(log.last_request().unwrap().cursor_id(), None);

    request.force_cleanup(&mut backend).await.unwrap();
    assert!(log.releases().is_empty());
}
