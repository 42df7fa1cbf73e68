use signet_core::logging_facility::{init, Profile};

// Runs in its own test binary so the global subscriber is not contended.
#[test]
fn test_init_is_idempotent() {
    init(Profile::Test);
    init(Profile::Test);
    init(Profile::Production);
    tracing::info!("still logging after repeated init");
}
