use nadri::domain::mode::{ModeState, OperatingMode};

#[test]
fn starts_normal_with_writes_allowed() {
    let mode = ModeState::new();
    assert_eq!(mode.current_mode(), OperatingMode::Normal);
    assert!(mode.can_perform_write());
}

#[test]
fn offline_mode_still_allows_writes() {
    let mode = ModeState::new();
    mode.enter_offline_mode();
    assert_eq!(mode.current_mode(), OperatingMode::Offline);
    assert!(mode.can_perform_write());
}

#[test]
fn mock_mode_blocks_writes_and_carries_the_reason() {
    let mode = ModeState::new();
    mode.enter_mock_mode("quota exhausted");
    assert!(!mode.can_perform_write());
    match mode.current_mode() {
        OperatingMode::MockFallback { reason } => assert_eq!(reason, "quota exhausted"),
        other => panic!("expected mock fallback, got {other:?}"),
    }
}

#[test]
fn first_mock_reason_wins() {
    let mode = ModeState::new();
    mode.enter_mock_mode("first cause");
    mode.enter_mock_mode("second cause");
    match mode.current_mode() {
        OperatingMode::MockFallback { reason } => assert_eq!(reason, "first cause"),
        other => panic!("expected mock fallback, got {other:?}"),
    }
}

#[test]
fn clones_share_one_mode() {
    let mode = ModeState::new();
    let observer = mode.clone();
    mode.enter_offline_mode();
    assert_eq!(observer.current_mode(), OperatingMode::Offline);
}
