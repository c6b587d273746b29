use std::io::Write;

use env_logger::{Builder, Env};

/// Initializes logging to stderr.
///
/// Defaults to `info`, and can be overridden with `RUST_LOG`.
pub fn init_logging(quiet: bool) {
    let logging_env = Env::default().filter_or("RUST_LOG", "info");

    Builder::from_env(logging_env)
        .format(move |buf, record| {
            if quiet {
                return Ok(());
            }

            writeln!(
                buf,
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}
