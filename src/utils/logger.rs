use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Logging setup: crate-name tag, colored WARN/ERROR levels, debug level
/// when verbose. Dependency noise stays filtered to warn. Safe to call more
/// than once (later calls are no-ops).
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let line = match record.level() {
                Level::Warn => {
                    format!("[{} {}] {}", name.cyan(), "WARN".yellow(), record.args())
                }
                Level::Error => {
                    format!("[{} {}] {}", name.cyan(), "ERROR".red(), record.args())
                }
                _ => format!("[{}] {}", name.cyan(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
