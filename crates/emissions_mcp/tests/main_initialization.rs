/// Tests for main.rs initialization logic
/// These tests verify configuration and initialization behavior
use emissions_core::config::Config;
use emissions_mcp::EmissionsMcpHandler;

#[test]
fn test_log_env_priority() {
    let level = emissions_mcp::log_level(Some("debug".into()), Some("trace".into()));
    assert_eq!(level, "debug");
    let level = emissions_mcp::log_level(None, Some("trace".into()));
    assert_eq!(level, "trace");
    assert_eq!(emissions_mcp::log_level(Some(" ".into()), Some("warn".into())), "warn");
    assert_eq!(emissions_mcp::log_level(None, None), "info");
}

#[test]
fn test_env_filter_keeps_rmcp_quiet() {
    let filter = emissions_mcp::log_filter("debug").to_string();
    assert!(filter.contains("debug"));
    assert!(filter.contains("rmcp=warn"));
    assert!(filter.contains("serve_inner=warn"));
}

#[test]
fn test_env_filter_fallback() {
    let filter = emissions_mcp::log_filter("emissions=loud").to_string();
    assert!(filter.contains("info"));
    assert!(filter.contains("rmcp=warn"));
    assert!(!filter.contains("loud"));
}

#[test]
fn test_config_defaults_without_env() {
    let cfg = Config::from_env_with(|_| None).expect("defaults");
    assert_eq!(cfg.data_file, std::path::PathBuf::from("emissions_data.csv"));
    assert_eq!(cfg.top_n, 10);
}

#[test]
fn test_config_rejects_bad_top_n() {
    let res = Config::from_env_with(|k| (k == "EMISSIONS_TOP_N").then(|| "lots".to_string()));
    assert!(res.is_err());
}

#[tokio::test]
async fn test_handler_initialization() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = Config {
        data_file: dir.path().join("emissions_data.csv"),
        reports_dir: dir.path().join("reports"),
        ..Config::default()
    };
    let handler = EmissionsMcpHandler::from_config(&cfg);

    // Handler should have tools and prompts registered
    assert!(handler.tool_count() > 0);
    assert!(handler.prompt_count() > 0);
    // Constructing the handler touches nothing on disk
    assert!(!cfg.data_file.exists());
    assert!(!cfg.reports_dir.exists());
}
