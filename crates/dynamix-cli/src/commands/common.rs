//! Shared CLI helpers used across multiple commands.

use dynamix_config::{EngineConfig, PresetLibrary};

/// Parse a `key=value` string with a numeric value.
pub fn parse_key_val(s: &str) -> Result<(String, f32), String> {
    let Some((key, value)) = s.split_once('=') else {
        return Err(format!("invalid parameter '{s}' (expected key=value)"));
    };
    let value = value
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("invalid value in '{s}': {e}"))?;
    Ok((key.trim().to_string(), value))
}

/// Preset library over the configured, user and system directories.
pub fn library(config: &EngineConfig) -> PresetLibrary {
    PresetLibrary::with_default_dirs(&config.preset_dirs)
}

/// Print a section header.
pub fn header(title: &str) {
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(parse_key_val("ratio=4"), Ok(("ratio".to_string(), 4.0)));
        assert_eq!(
            parse_key_val(" band1_threshold = -30.5"),
            Ok(("band1_threshold".to_string(), -30.5))
        );
        assert!(parse_key_val("ratio").is_err());
        assert!(parse_key_val("ratio=fast").is_err());
    }
}
