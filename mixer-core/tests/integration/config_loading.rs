use mixer_core::foundation::Network;
use mixer_core::infrastructure::config::{load_app_config_from_path, load_config_from_file, load_config_from_file_with_profile, Role};
use std::env;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

fn lock_env() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

const SAMPLE: &str = r#"
network = "devnet"

[coordinator]
port = 9100
player_count = 4
amount = 2500

[participant]
coordinator_addr = "127.0.0.1:9100"
wallet_path = "alice.json"
amount = 2500
target_addresses = [" dmx:aa ", "dmx:bb", "", "dmx:cc", "dmx:dd"]

[runtime]
signature_timeout_secs = 30

[profiles.fast.runtime]
input_timeout_secs = 5
signature_timeout_secs = 5

[profiles.fast.coordinator]
player_count = 2
"#;

fn write_sample(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("mixer-config.toml");
    std::fs::write(&path, SAMPLE).expect("write config");
    path
}

#[test]
fn file_values_override_defaults_and_blank_targets_are_dropped() {
    let _guard = lock_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_sample(dir.path());

    let config = load_config_from_file(&path, dir.path()).expect("load");
    assert_eq!(config.network, Network::Devnet);
    assert_eq!(config.coordinator.port, 9100);
    assert_eq!(config.coordinator.listen_addr, "0.0.0.0");
    assert_eq!(config.runtime.signature_timeout_secs, 30);
    assert_eq!(config.runtime.input_timeout_secs, 300);
    assert_eq!(config.participant.target_addresses, vec!["dmx:aa", "dmx:bb", "dmx:cc", "dmx:dd"]);
    assert_eq!(config.data_dir, dir.path().to_string_lossy());
}

#[test]
fn profile_overrides_apply_on_top_of_the_file() {
    let _guard = lock_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_sample(dir.path());

    let config = load_config_from_file_with_profile(&path, dir.path(), "fast").expect("load");
    assert_eq!(config.coordinator.player_count, 2);
    assert_eq!(config.coordinator.amount, 2500);
    assert_eq!(config.runtime.signature_timeout_secs, 5);
    assert!(load_config_from_file_with_profile(&path, dir.path(), "missing").is_err());
}

#[test]
fn environment_wins_over_file() {
    let _guard = lock_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_sample(dir.path());

    env::set_var("MIXER_COORDINATOR__PLAYER_COUNT", "7");
    let config = load_config_from_file(&path, dir.path());
    env::remove_var("MIXER_COORDINATOR__PLAYER_COUNT");
    assert_eq!(config.expect("load").coordinator.player_count, 7);
}

#[test]
fn launcher_overrides_run_before_validation() {
    let _guard = lock_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_sample(dir.path());

    let err = load_app_config_from_path(&path, dir.path(), Role::Coordinator, None, |config| config.coordinator.player_count = 1)
        .expect_err("one player is not a round");
    assert!(err.to_string().contains("coordinator.player_count"));

    let config = load_app_config_from_path(&path, dir.path(), Role::Participant, None, |config| config.participant.amount = 10).expect("valid");
    assert_eq!(config.participant.amount, 10);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let _guard = lock_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = load_config_from_file(&dir.path().join("absent.toml"), dir.path()).expect("defaults");
    assert_eq!(config.network, Network::Testnet);
    assert_eq!(config.coordinator.player_count, 3);
}
