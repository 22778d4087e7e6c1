//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Default filter for a `-v`/`-q` balance: negative is quieter.
pub fn default_directive(verbosity: i8) -> &'static str {
    match verbosity {
        i8::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the verbosity flags.
///
/// Calling it twice is harmless; the second install is ignored.
pub fn init_tracing(verbosity: i8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_directive(-5), "error");
        assert_eq!(default_directive(-1), "warn");
        assert_eq!(default_directive(0), "info");
        assert_eq!(default_directive(1), "debug");
        assert_eq!(default_directive(3), "trace");
    }

    #[test]
    fn repeated_init_does_not_panic() {
        init_tracing(0);
        init_tracing(2);
    }
}
