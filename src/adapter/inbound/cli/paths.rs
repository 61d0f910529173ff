//! Path utilities.
//!
//! Keeper data lives under `~/.twap-keeper/`:
//! - `~/.twap-keeper/config.toml` - main configuration

use std::path::PathBuf;

/// Returns the keeper home directory (`~/.twap-keeper/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".twap-keeper")
}

/// Returns the default config file path (`~/.twap-keeper/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_lives_under_keeper_home() {
        let config = default_config();
        assert!(config.starts_with(home_dir()));
        assert!(config.ends_with("config.toml"));
        assert!(home_dir().to_string_lossy().contains(".twap-keeper"));
    }
}
