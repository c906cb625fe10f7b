use chrono::Local;
use env_logger::{Builder, Env};
use std::io::Write;

/// Default filter when `RUST_LOG` is not set.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Initialize the logger with a custom format. `RUST_LOG` wins over `verbose`.
pub fn init_logger(verbose: bool) {
    Builder::from_env(Env::default().default_filter_or(default_filter(verbose)))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}
