//! Loading configuration files from disk.

use std::io::Write;

use rust_decimal_macros::dec;
use tempfile::NamedTempFile;
use twap_keeper::error::{ConfigError, Error};
use twap_keeper::infrastructure::config::settings::Config;

const CONTRACT: &str = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512";

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn full_file_round_trips_into_settings() {
    let file = write_config(&format!(
        r#"
dry_run = true

[chain]
rpc_url = "wss://rpc.example.org/ws"
contract_address = "{CONTRACT}"
chain_id = 11155111

[keeper]
tick_interval_secs = 12
event_poll_interval_secs = 4
resubscribe_delay_secs = 7
max_gas_price_gwei = 25.5
gas_limit = 350000
confirmations = 2
confirmation_timeout_secs = 90
stale_block_warn_secs = 600

[rpc]
max_attempts = 5
base_delay_ms = 500
max_delay_ms = 8000
request_timeout_secs = 10

[logging]
level = "debug"
format = "json"
"#
    ));

    let config = Config::load(file.path()).unwrap();

    assert!(config.dry_run);
    assert_eq!(config.chain.chain_id, Some(11_155_111));
    assert_eq!(config.chain.rpc_endpoint().unwrap().scheme(), "wss");
    assert_eq!(config.keeper.tick_interval_secs, 12);
    assert_eq!(config.keeper.resubscribe_delay_secs, 7);
    assert_eq!(config.keeper.max_gas_price_gwei, Some(dec!(25.5)));
    assert_eq!(config.keeper.max_gas_price_wei(), Some(25_500_000_000));
    assert_eq!(config.keeper.gas_limit, 350_000);
    assert_eq!(config.keeper.confirmations, 2);
    assert_eq!(config.rpc.max_attempts, 5);
    assert!(config.logging.is_json());
}

#[test]
fn minimal_file_uses_defaults() {
    let file = write_config(&format!(
        "[chain]\ncontract_address = \"{CONTRACT}\"\n"
    ));

    let config = Config::load(file.path()).unwrap();

    assert!(!config.dry_run);
    assert_eq!(config.chain.rpc_url, "http://127.0.0.1:8545");
    assert_eq!(config.keeper.tick_interval_secs, 10);
    assert_eq!(config.keeper.event_poll_interval_secs, 2);
    assert_eq!(config.keeper.max_gas_price_wei(), Some(50_000_000_000));
    assert_eq!(config.keeper.gas_limit, 300_000);
    assert_eq!(config.keeper.confirmations, 1);
    assert_eq!(config.keeper.stale_block_warn_secs, 900);
    assert_eq!(config.rpc.max_attempts, 3);
    assert_eq!(config.rpc.base_delay_ms, 2_000);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path().join("absent.toml"));

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("[chain\ncontract_address = 1");

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn bad_contract_address_is_rejected() {
    let file = write_config("[chain]\ncontract_address = \"0x1234\"\n");

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "contract_address",
            ..
        }))
    ));
}

#[test]
fn unsupported_rpc_scheme_is_rejected() {
    let file = write_config(&format!(
        "[chain]\nrpc_url = \"ftp://node\"\ncontract_address = \"{CONTRACT}\"\n"
    ));

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "rpc_url",
            ..
        }))
    ));
}

#[test]
fn negative_gas_ceiling_is_rejected() {
    let file = write_config(&format!(
        "[chain]\ncontract_address = \"{CONTRACT}\"\n\n[keeper]\nmax_gas_price_gwei = -1\n"
    ));

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "max_gas_price_gwei",
            ..
        }))
    ));
}

#[test]
fn key_is_never_read_from_the_file() {
    let file = write_config(&format!(
        "private_key = \"0xabc\"\n\n[chain]\ncontract_address = \"{CONTRACT}\"\n"
    ));

    let contents = std::fs::read_to_string(file.path()).unwrap();
    let config = Config::parse_toml_with_key(&contents, None).unwrap();

    assert!(config.private_key.is_none());
}
