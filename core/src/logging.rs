//! Tracing setup for hosts and tools embedding the core.
//!
//! Console output only; the host decides where stderr goes. `RUST_LOG`
//! overrides the requested level when set.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Install a global fmt subscriber at `level`.
///
/// Returns `false` if a global subscriber was already installed, which is
/// expected when a host calls this more than once.
pub fn init_tracing(level: Level) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(filter);

    let installed = tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(%level, "tracing initialized");
    }
    installed
}

/// Parse a level name such as `"debug"`, case-insensitively.
pub fn parse_level(name: &str) -> Option<Level> {
    name.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_accepts_common_names() {
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level(" WARN "), Some(Level::WARN));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn second_init_reports_false() {
        let _ = init_tracing(Level::WARN);
        assert!(!init_tracing(Level::WARN));
    }
}
