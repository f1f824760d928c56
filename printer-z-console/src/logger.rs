use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logs go to stderr so stdout stays clean for decoded output.
/// `RUST_LOG` takes precedence over `--debug`.
pub fn init_logger(json_mode: bool, debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("printer_z=debug,printer_z_query=debug,printer_z_console=debug")
        } else {
            EnvFilter::new("printer_z=info,printer_z_query=warn,printer_z_console=info")
        }
    });

    if json_mode {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}
