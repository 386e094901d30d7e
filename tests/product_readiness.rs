use mouza_payments::config::AppConfig;

#[test]
fn gateway_timeout_default_is_finite_and_generous() {
    let cfg = AppConfig::from_env();
    assert!(cfg.gateway_timeout_ms >= 10_000);
    assert!(cfg.gateway_timeout_ms <= 120_000);
}

#[test]
fn outcome_routes_are_distinct() {
    let cfg = AppConfig::from_env();
    let routes = [
        cfg.success_route.clone(),
        cfg.cancelled_route.clone(),
        cfg.failed_route.clone(),
        cfg.error_route.clone(),
    ];
    for (i, a) in routes.iter().enumerate() {
        for b in routes.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn payment_endpoints_are_documented_in_readme() {
    let readme = std::fs::read_to_string("README.md").unwrap_or_default();
    assert!(readme.contains("/payment/eps/initialize/"));
    assert!(readme.contains("/payment/eps/callback/"));
    assert!(readme.contains("/payment/eps/status/"));
    assert!(readme.contains("/ops/readiness"));
}
