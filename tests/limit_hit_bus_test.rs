mod helpers;

use std::sync::{Arc, Mutex};

use helpers::{project_limit_error, setup_engine};
use plangate::types::{ApiErrorResponse, LimitKind};

#[test]
fn test_listeners_run_in_registration_order() {
    let t = setup_engine();
    let order = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (1..=3)
        .map(|n| {
            let order = order.clone();
            t.engine
                .bus()
                .add_listener(move |_| order.lock().unwrap().push(n))
        })
        .collect();

    t.engine.classify(&project_limit_error()).unwrap();
    assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(handles.len(), 3);
}

#[test]
fn test_panicking_listener_does_not_block_others() {
    let t = setup_engine();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let _bad = t.engine.bus().add_listener(|_| panic!("listener blew up"));
    let sink = seen.clone();
    let _good = t
        .engine
        .bus()
        .add_listener(move |event| sink.lock().unwrap().push(event.kind));

    let event = t.engine.classify(&project_limit_error()).unwrap();
    assert_eq!(event.kind, LimitKind::ProjectLimit);
    assert_eq!(event.current_usage, Some(2));
    assert_eq!(event.limit, Some(2));
    assert_eq!(*seen.lock().unwrap(), vec![LimitKind::ProjectLimit]);
}

#[test]
fn test_unsubscribe_is_idempotent_and_detaches() {
    let t = setup_engine();
    let hits = Arc::new(Mutex::new(0));
    let sink = hits.clone();
    let baseline = t.engine.bus().listener_count();

    let handle = t
        .engine
        .bus()
        .add_listener(move |_| *sink.lock().unwrap() += 1);
    assert_eq!(t.engine.bus().listener_count(), baseline + 1);

    t.engine.classify(&project_limit_error()).unwrap();
    handle.unsubscribe();
    handle.unsubscribe();
    assert!(!handle.is_active());
    assert_eq!(t.engine.bus().listener_count(), baseline);

    t.engine.classify(&project_limit_error()).unwrap();
    assert_eq!(*hits.lock().unwrap(), 1);
}

#[test]
fn test_unrecognised_errors_notify_nobody() {
    let t = setup_engine();
    let hits = Arc::new(Mutex::new(0));
    let sink = hits.clone();
    let _handle = t
        .engine
        .bus()
        .add_listener(move |_| *sink.lock().unwrap() += 1);

    for resp in [
        ApiErrorResponse::new(403, "{}"),
        ApiErrorResponse::new(403, "Forbidden"),
        ApiErrorResponse::new(403, r#"{"code":"FORBIDDEN","message":"Not your project"}"#),
        ApiErrorResponse::new(429, r#"{"code":"ANALYSIS_LIMIT_EXCEEDED"}"#),
    ] {
        assert!(t.engine.classify(&resp).is_none(), "{:?}", resp.body);
    }
    assert_eq!(*hits.lock().unwrap(), 0);
    assert!(t.engine.recent_limit_hits().is_empty());
}

#[test]
fn test_message_fallback_classification() {
    let t = setup_engine();
    let cases = [
        (r#"{"message":"Opinion limit reached for this project"}"#, LimitKind::OpinionLimit),
        (r#"{"message":"Monthly analysis quota exhausted"}"#, LimitKind::AnalysisLimit),
        (r#"{"message":"Plan limit exceeded"}"#, LimitKind::ProjectLimit),
    ];
    for (body, expected) in cases {
        let event = t
            .engine
            .classify(&ApiErrorResponse::new(403, body))
            .unwrap_or_else(|| panic!("{} should classify", body));
        assert_eq!(event.kind, expected);
    }
}

#[test]
fn test_hits_recorded_for_banner_window() {
    let t = setup_engine();
    t.engine.classify(&project_limit_error()).unwrap();
    t.engine
        .classify(&ApiErrorResponse::new(
            403,
            r#"{"code":"ANALYSIS_LIMIT_EXCEEDED","message":"No analyses left"}"#,
        ))
        .unwrap();

    let recent = t.engine.recent_limit_hits();
    let kinds: Vec<LimitKind> = recent.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![LimitKind::ProjectLimit, LimitKind::AnalysisLimit]);
}
