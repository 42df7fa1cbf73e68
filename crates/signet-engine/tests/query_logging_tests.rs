// Operation boundary events emitted by DocumentQuery

mod common;

use common::{Fixture, Recording};
use signet_core::logging_facility::{init_test_capture, CapturedEvent, TestCapture};
use signet_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_COMPONENT, FIELD_DURATION_MS, FIELD_ERR_CODE,
    FIELD_ERR_KIND, FIELD_FETCHED, FIELD_HAS_MORE, FIELD_PREDICATES, FIELD_REQUEST_ID,
    FIELD_RELATION, FIELD_RETURNED, FIELD_ROWS, FIELD_SIGNERS,
};
use signet_core_types::{RequestContext, RequestId};
use signet_engine::DocumentQuery;

fn events_for_request(capture: &TestCapture, request_id: &str) -> Vec<CapturedEvent> {
    capture
        .events_for_op("document_query")
        .into_iter()
        .filter(|e| e.field(FIELD_REQUEST_ID) == Some(request_id))
        .collect()
}

#[test]
fn test_successful_query_logs_start_and_end() {
    let capture = init_test_capture();
    let fx = Fixture::new();
    for id in 1..=3 {
        fx.document(id, "PHID-USER-a", 1, 0);
    }
    let storage = Recording::new(&fx.conn);
    let request_id = "req-logging-success";

    DocumentQuery::new(&storage, &storage)
        .with_creator_phids(["PHID-USER-a"])
        .need_document_bodies(true)
        .with_limit(2)
        .with_request_context(RequestContext::with_request_id(RequestId::from_string(
            request_id.to_string(),
        )))
        .execute_page()
        .unwrap();

    let events = events_for_request(&capture, request_id);
    assert_eq!(events.len(), 2);

    let start = &events[0];
    assert_eq!(start.event.as_deref(), Some(EVENT_START));
    assert_eq!(start.field(FIELD_PREDICATES), Some("creator_phids"));
    assert_eq!(start.field(FIELD_SIGNERS), Some("0"));
    assert_eq!(
        start.field(FIELD_COMPONENT),
        Some("signet_engine::query")
    );

    let end = &events[1];
    assert_eq!(end.event.as_deref(), Some(EVENT_END));
    assert_eq!(end.field(FIELD_FETCHED), Some("2"));
    assert_eq!(end.field(FIELD_RETURNED), Some("2"));
    assert_eq!(end.field(FIELD_HAS_MORE), Some("true"));
    assert!(end.field(FIELD_DURATION_MS).is_some());

    // Hydration detail is logged at debug level without an op
    let body_loads = capture.count_events(|e| {
        e.field(FIELD_RELATION) == Some("bodies") && e.field(FIELD_ROWS).is_some()
    });
    assert!(body_loads >= 1);
}

#[test]
fn test_failed_query_logs_end_error_with_code() {
    let capture = init_test_capture();
    let fx = Fixture::new();
    let storage = Recording::new(&fx.conn);
    let request_id = "req-logging-failure";

    let err = DocumentQuery::new(&storage, &storage)
        .after_cursor("definitely not a cursor")
        .with_request_context(RequestContext::with_request_id(RequestId::from_string(
            request_id.to_string(),
        )))
        .execute_page()
        .unwrap_err();

    let events = events_for_request(&capture, request_id);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(events[1].field(FIELD_ERR_CODE), Some(err.code()));
    assert_eq!(events[1].field(FIELD_ERR_KIND), Some("InvalidCursor"));
    assert!(events
        .iter()
        .all(|e| e.event.as_deref() != Some(EVENT_END)));
}
