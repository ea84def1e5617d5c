use tests::*;

use pretty_assertions::assert_eq;
use quarry::{driver::SearchRequest, ProtocolState, RequestDescriptor, SearchResponse};
use quarry_core::request::{SortField, SortOrder};
use std::time::Duration;

const SIZES: &[usize] = &[3, 2, 0];

fn scripted_pages() -> ScriptedBackend {
    let mut responses = pages(SIZES);
    responses[0].cursor_id = Some("h1".to_string());
    ScriptedBackend::with_responses(responses)
}

#[tokio::test]
async fn pages_until_empty_then_releases_once() {
    let plan = CountingPlan::default();
    let mut backend = scripted_pages();
    let log = backend.log();

    let mut request = builder(&plan)
        .size(3)
        .cursor(Duration::from_secs(30))
        .build()
        .unwrap();
    assert_eq!(request.protocol_state(), ProtocolState::Fresh);

    let mut has_more = vec![];
    let mut lengths = vec![];
    for _ in 0..SIZES.len() {
        let page = request.fetch_page(&mut backend).await.unwrap();
        lengths.push(page.len());
        has_more.push(request.has_more_pages());
    }

    assert_eq!(lengths, [3, 2, 0]);
    assert_eq!(has_more, [true, true, false]);
    assert_eq!(request.protocol_state(), ProtocolState::ExhaustedPendingCleanup);
    assert!(log.releases().is_empty());

    request.cleanup(&mut backend).await.unwrap();
    assert_eq!(log.releases(), ["h1"]);
    assert_eq!(request.protocol_state(), ProtocolState::ExhaustedClean);
    assert_eq!(request.cursor_token().unwrap(), None);
    assert_eq!(request.descriptor().cursor, None);

    request.cleanup(&mut backend).await.unwrap();
    request.force_cleanup(&mut backend).await.unwrap();
    assert_eq!(log.releases(), ["h1"]);
}

#[tokio::test]
async fn each_call_resumes_after_the_last_hit() {
    let plan = CountingPlan::default();
    let mut backend = scripted_pages();
    let log = backend.log();

    let mut request = builder(&plan)
        .cursor(Duration::from_secs(30))
        .build()
        .unwrap();
    for _ in 0..SIZES.len() {
        request.fetch_page(&mut backend).await.unwrap();
    }

    let requests = log.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(log.searches(), 1);
    assert_eq!(log.continues(), 2);

    let first = &requests[0];
    assert_eq!(first.cursor_id(), None);
    assert_eq!(first.source.search_after, None);
    assert_eq!(first.cursor_keep_alive, Some(Duration::from_secs(30)));
    assert_eq!(first.source.timeout, Some(Duration::from_secs(30)));

    for (n, sent) in requests.iter().enumerate().skip(1) {
        assert_eq!(sent.cursor_id(), Some("h1"));
        assert_eq!(
            sent.source.cursor.as_ref().map(|binding| binding.keep_alive),
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            sent.source.search_after.as_deref(),
            Some(&last_sort_of_page(SIZES, n - 1)[..])
        );
    }

    // The tiebreak sort is attached once, not once per page
    for sent in &requests {
        assert_eq!(
            sent.source.sort.as_deref(),
            Some(&[SortField::asc("_doc"), SortField::asc("_id")][..])
        );
    }

    assert_eq!(
        request.continuation().unwrap().last_sort_values(),
        Some(&last_sort_of_page(SIZES, 1)[..])
    );
}

#[tokio::test]
async fn no_backend_calls_after_exhaustion() {
    let plan = CountingPlan::default();
    let mut backend = scripted_pages();
    let log = backend.log();

    let mut request = builder(&plan)
        .cursor_with_default_keep_alive()
        .build()
        .unwrap();
    for _ in 0..SIZES.len() {
        request.fetch_page(&mut backend).await.unwrap();
    }
    assert_eq!(log.len(), 3);

    for _ in 0..3 {
        let page = request.fetch_page(&mut backend).await.unwrap();
        assert!(page.is_empty());
    }
    assert_eq!(log.len(), 3);
    assert_eq!(plan.calls(), 3);

    request.cleanup(&mut backend).await.unwrap();
    let page = request.fetch_page(&mut backend).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(log.len(), 4);
}

#[tokio::test]
async fn caller_sort_is_kept() {
    let plan = CountingPlan::default();
    let mut backend = scripted_pages();
    let log = backend.log();

    let descriptor = RequestDescriptor::new()
        .with_sort("balance", SortOrder::Desc)
        .with_extra("query", serde_json::json!({ "match_all": {} }));

    let mut request = builder(&plan)
        .descriptor(descriptor)
        .cursor(Duration::from_secs(30))
        .build()
        .unwrap();
    request.fetch_page(&mut backend).await.unwrap();
    request.fetch_page(&mut backend).await.unwrap();

    for sent in log.requests() {
        assert_eq!(
            sent.source.sort.as_deref(),
            Some(&[SortField::new("balance", SortOrder::Desc)][..])
        );
        assert_eq!(sent.source.extra["query"], serde_json::json!({ "match_all": {} }));
    }
}

#[tokio::test]
async fn refreshed_handle_is_adopted() {
    let plan = CountingPlan::default();
    let mut responses = pages(SIZES);
    responses[0].cursor_id = Some("h1".to_string());
    responses[1].cursor_id = Some("h2".to_string());
    let mut backend = ScriptedBackend::with_responses(responses);
    let log = backend.log();

    let mut request = builder(&plan)
        .cursor(Duration::from_secs(30))
        .build()
        .unwrap();
    for _ in 0..SIZES.len() {
        request.fetch_page(&mut backend).await.unwrap();
    }

    let bound: Vec<_> = log
        .requests()
        .iter()
        .map(|sent| sent.cursor_id().map(str::to_string))
        .collect();
    assert_eq!(bound, [None, Some("h1".to_string()), Some("h2".to_string())]);

    request.cleanup(&mut backend).await.unwrap();
    assert_eq!(log.releases(), ["h2"]);
}

#[tokio::test]
async fn failed_page_is_retried_from_the_same_position() {
    let plan = CountingPlan::default();
    let mut responses = pages(SIZES).into_iter();
    let mut backend = ScriptedBackend::new();
    backend.respond(responses.next().unwrap().with_cursor_id("h1"));
    backend.fail_next("timed out");
    for response in responses {
        backend.respond(response);
    }
    let log = backend.log();

    let mut request = builder(&plan)
        .cursor(Duration::from_secs(30))
        .build()
        .unwrap();
    request.fetch_page(&mut backend).await.unwrap();

    let err = request.fetch_page(&mut backend).await.unwrap_err();
    assert!(err.is_backend_operation_failed());
    assert_eq!(request.protocol_state(), ProtocolState::Paging);
    assert!(request.has_more_pages());

    let page = request.fetch_page(&mut backend).await.unwrap();
    assert_eq!(page.len(), 2);

    let requests: Vec<SearchRequest> = log.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1], requests[2]);
    assert_eq!(
        requests[2].source.search_after.as_deref(),
        Some(&last_sort_of_page(SIZES, 0)[..])
    );

    // One plan per physical call, including the failed one
    assert_eq!(plan.calls(), 3);
}

#[tokio::test]
async fn aggregation_only_page_keeps_paging() {
    let plan = CountingPlan::default();
    let mut backend = ScriptedBackend::new();
    backend
        .respond(
            SearchResponse::default()
                .with_aggregations(serde_json::json!({ "count": 7 }))
                .with_cursor_id("h1"),
        )
        .respond(SearchResponse::default());

    let mut request = builder(&plan)
        .cursor(Duration::from_secs(30))
        .build()
        .unwrap();

    let page = request.fetch_page(&mut backend).await.unwrap();
    assert!(!page.is_empty());
    assert_eq!(request.protocol_state(), ProtocolState::Paging);
    assert_eq!(request.continuation().unwrap().last_sort_values(), None);

    let page = request.fetch_page(&mut backend).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(request.protocol_state(), ProtocolState::ExhaustedPendingCleanup);
}
