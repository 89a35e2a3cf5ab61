//! Tracing subscriber setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber. `RUST_LOG` overrides `level` when set.
/// Calling this again after a subscriber is installed is a no-op.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(default_directives(level)),
    }
    .map_err(|e| anyhow!("Invalid log filter: {}", e))?;

    // Err only means a global subscriber is already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
    Ok(())
}

fn default_directives(level: &str) -> String {
    format!("money_box_backend={level},shared={level}", level = level.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives(" debug "),
            "money_box_backend=debug,shared=debug"
        );
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging("info").unwrap();
        init_logging("warn").unwrap();
    }
}
