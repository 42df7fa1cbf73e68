use signet_core::errors::{ExError, ExErrorKind, SignetError};
use signet_core::logging_facility::init_test_capture;
use signet_core::signet_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use signet_core::{log_op_end, log_op_error, log_op_start};

#[test]
fn test_start_and_end_events_carry_op() {
    let capture = init_test_capture();
    let op_name = "logging_start_end_1";

    log_op_start!(op_name, limit = 25);
    log_op_end!(op_name, duration_ms = 3, returned = 25);

    let start = capture
        .events_for_op(op_name)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_START))
        .expect("start event");
    assert_eq!(start.field("limit"), Some("25"));

    let end = capture
        .events_for_op(op_name)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END))
        .expect("end event");
    assert_eq!(end.field("duration_ms"), Some("3"));
    assert_eq!(end.field("returned"), Some("25"));
}

#[test]
fn test_error_event_includes_stable_code() {
    let capture = init_test_capture();
    let op_name = "logging_error_code_2";

    let err = SignetError::InvalidCursor {
        reason: "base64 decode failed".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 1);

    let error_event = capture
        .events_for_op(op_name)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("error event");
    assert_eq!(error_event.field("err_code"), Some("ERR_INVALID_CURSOR"));
    assert_eq!(error_event.field("err_kind"), Some("InvalidCursor"));
}

#[test]
fn test_error_macro_accepts_ex_error() {
    let capture = init_test_capture();
    let op_name = "logging_ex_error_3";

    let err = ExError::new(ExErrorKind::Timeout).with_message("budget spent");
    log_op_error!(op_name, err, duration_ms = 5000, stage = "hydrate");

    let error_event = capture
        .events_for_op(op_name)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("error event");
    assert_eq!(error_event.field("err_code"), Some("ERR_TIMEOUT"));
    assert_eq!(error_event.field("stage"), Some("hydrate"));
}

#[test]
fn test_one_start_one_end_per_operation() {
    let capture = init_test_capture();
    let op_name = "logging_boundary_4";

    log_op_start!(op_name);
    log_op_end!(op_name, duration_ms = 0);

    let starts = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START)
    });
    let ends = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END)
    });
    assert_eq!(starts, 1);
    assert_eq!(ends, 1);
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_assert_event_exists_fails_for_missing_event() {
    let capture = init_test_capture();
    capture.assert_event_exists("logging_never_logged_5", EVENT_START);
}
