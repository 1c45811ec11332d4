use crate::config::{Config, DEFAULT_MODEL_PATH, MarketDataMode};
use std::env;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const KEYS: [&str; 14] = [
    "SERVER_BIND_ADDRESS",
    "SERVER_PORT",
    "MODEL_PATH",
    "MODEL_PERSIST",
    "DEMO_SAMPLES",
    "DEMO_SEED",
    "MODEL_N_TREES",
    "MODEL_MAX_DEPTH",
    "MODEL_MIN_SAMPLES_SPLIT",
    "MARKET_DATA_MODE",
    "BINANCE_BASE_URL",
    "BINANCE_API_KEY",
    "MARKET_DATA_INTERVAL",
    "MARKET_DATA_TIMEOUT_SECS",
];

fn clear_env() {
    for key in KEYS {
        unsafe { env::remove_var(key) };
    }
}

fn set(key: &str, value: &str) {
    unsafe { env::set_var(key, value) };
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.model.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
    assert!(config.model.persist);
    assert_eq!(config.model.demo_samples, 1000);
    assert_eq!(config.market_data.timeout_secs, 10);
    assert_eq!(config.model.demo_seed, 42);
    assert_eq!(config.model.n_trees, 100);
    assert_eq!(config.model.max_depth, 10);
    assert_eq!(config.model.min_samples_split, 5);
    assert_eq!(config.market_data.mode, MarketDataMode::Binance);
    assert_eq!(config.market_data.binance_base_url, "https://api.binance.com");
    assert!(config.market_data.binance_api_key.is_none());
    assert_eq!(config.market_data.interval, "1h");
    assert_eq!(config.market_data.timeout_secs, 10);
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_overrides() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();
    set("SERVER_PORT", "9001");
    set("MODEL_PATH", "/tmp/nexthour/model.json");
    set("MODEL_PERSIST", "false");
    set("MODEL_N_TREES", "25");
    set("DEMO_SEED", "7");
    set("MARKET_DATA_MODE", "mock");
    set("BINANCE_API_KEY", "key");
    set("MARKET_DATA_TIMEOUT_SECS", "3");

    let config = Config::from_env().unwrap();

    assert_eq!(config.server.port, 9001);
    assert_eq!(config.model.model_path, PathBuf::from("/tmp/nexthour/model.json"));
    assert!(!config.model.persist);
    assert_eq!(config.model.n_trees, 25);
    assert_eq!(config.model.forest_parameters().seed, 7);
    assert_eq!(config.market_data.mode, MarketDataMode::Mock);
    assert_eq!(config.market_data.binance_api_key.as_deref(), Some("key"));
    assert_eq!(config.market_data.timeout(), std::time::Duration::from_secs(3));

    clear_env();
}

#[test]
fn test_malformed_numbers_fall_back_to_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();
    set("SERVER_PORT", "not-a-port");
    set("DEMO_SAMPLES", "-3");
    set("MARKET_DATA_TIMEOUT_SECS", "0");

    let config = Config::from_env().unwrap();
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.model.demo_samples, 1000);
    assert_eq!(config.market_data.timeout_secs, 10);

    clear_env();
}

#[test]
fn test_unknown_market_data_mode_is_error() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();
    set("MARKET_DATA_MODE", "carrier-pigeon");

    let result = Config::from_env();
    assert!(result.is_err());
    let err_msg = format!("{:?}", result.err().unwrap());
    assert!(err_msg.contains("Invalid MARKET_DATA_MODE"));

    clear_env();
}

#[test]
fn test_invalid_forest_settings_rejected() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    set("MODEL_N_TREES", "0");
    assert!(Config::from_env().is_err());
    clear_env();

    set("MODEL_MIN_SAMPLES_SPLIT", "1");
    let err_msg = format!("{:?}", Config::from_env().err().unwrap());
    assert!(err_msg.contains("MODEL_MIN_SAMPLES_SPLIT"));
    clear_env();

    let mut config = Config::default();
    config.model.max_depth = 0;
    assert!(config.validate().is_err());
}
