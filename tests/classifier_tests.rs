use nadri::domain::error::NadriError;
use nadri::domain::failure::{classify, FailureKind, FailurePolicy};

fn api_error(code: &str) -> NadriError {
    NadriError::Api {
        code: code.to_string(),
        message: "upstream message".to_string(),
    }
}

#[test]
fn transport_failures_classify_as_offline() {
    let err = NadriError::Connection("dns lookup failed".to_string());
    assert_eq!(classify(&err), FailureKind::NetworkOffline);
    assert_eq!(classify(&err).policy(), FailurePolicy::GoOffline);
}

#[test]
fn auth_statuses_classify_as_expired_credentials() {
    for status in [401, 403] {
        let err = NadriError::HttpStatus { status };
        assert_eq!(classify(&err), FailureKind::AuthExpired);
        assert!(matches!(
            classify(&err).policy(),
            FailurePolicy::Degrade { .. }
        ));
    }
}

#[test]
fn server_errors_degrade_to_sample_data() {
    for status in [500, 502, 503] {
        let err = NadriError::HttpStatus { status };
        assert_eq!(classify(&err), FailureKind::ServerError);
        assert!(matches!(
            classify(&err).policy(),
            FailurePolicy::Degrade { .. }
        ));
    }
}

#[test]
fn quota_code_degrades_with_a_reason() {
    let err = api_error("22");
    assert_eq!(classify(&err), FailureKind::QuotaExceeded);
    match classify(&err).policy() {
        FailurePolicy::Degrade { reason } => assert!(!reason.is_empty()),
        other => panic!("expected degrade, got {other:?}"),
    }
}

#[test]
fn key_codes_classify_as_auth() {
    for code in ["30", "31"] {
        assert_eq!(classify(&api_error(code)), FailureKind::AuthExpired);
    }
}

#[test]
fn no_data_resolves_empty_without_mode_change() {
    let err = api_error("03");
    assert_eq!(classify(&err), FailureKind::NoData);
    assert_eq!(classify(&err).policy(), FailurePolicy::Empty);
}

#[test]
fn unrecognized_failures_resolve_empty() {
    assert_eq!(classify(&api_error("99")), FailureKind::Unknown);
    assert_eq!(
        classify(&NadriError::HttpStatus { status: 404 }),
        FailureKind::Unknown
    );
    assert_eq!(
        classify(&NadriError::Config("bad".to_string())),
        FailureKind::Unknown
    );
    assert_eq!(classify(&api_error("99")).policy(), FailurePolicy::Empty);
}
