//! TOML configuration loading.

use std::path::Path;

use veld_types::config::ProtocolConfig;

use crate::{ExchangeError, Result};

/// Parse a [`ProtocolConfig`] from TOML text. Missing fields take the
/// original deployment defaults.
pub fn parse_config(text: &str) -> Result<ProtocolConfig> {
    toml::from_str(text).map_err(|e| ExchangeError::Config(e.to_string()))
}

/// Load a [`ProtocolConfig`] from a TOML file.
pub fn load_config(path: &Path) -> Result<ProtocolConfig> {
    let text =
        std::fs::read_to_string(path).map_err(|e| ExchangeError::Config(e.to_string()))?;
    parse_config(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_defaults() {
        let cfg = parse_config("").expect("empty config");
        assert_eq!(cfg.volatile_fee, 30);
        assert_eq!(cfg.epoch_length, 604_800);
    }

    #[test]
    fn test_partial_override() {
        let cfg = parse_config(
            r#"
volatile_fee = 25
emission_decay_num = 9_800
"#,
        )
        .expect("partial config");
        assert_eq!(cfg.volatile_fee, 25);
        assert_eq!(cfg.emission_decay_num, 9_800);
        assert_eq!(cfg.stable_fee, 5);
    }

    #[test]
    fn test_malformed_config_rejected() {
        let err = parse_config("volatile_fee = \"thirty\"").expect_err("bad type");
        assert!(matches!(err, ExchangeError::Config(_)));
    }
}
