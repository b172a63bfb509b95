//! Logging through `env_logger`, routed around the step spinners in a TTY

use std::io::Write;

use indicatif::MultiProgress;

/// `[LEVEL]` prefix, padded to a fixed width, ANSI-colored when `color`.
fn level_prefix(level: log::Level, color: bool) -> String {
    let (label, ansi) = match level {
        log::Level::Error => ("ERROR", "31"),
        log::Level::Warn => ("WARN ", "33"),
        log::Level::Info => ("INFO ", "32"),
        log::Level::Debug => ("DEBUG", "36"),
        log::Level::Trace => ("TRACE", "35"),
    };
    if color {
        format!("[\x1b[{ansi}m{label}\x1b[0m]")
    } else {
        format!("[{label}]")
    }
}

/// Prints each record with the spinners suspended, so log lines and step
/// lines never interleave.
struct SpinnerLogger {
    filter: env_logger::Logger,
    multi: MultiProgress,
}

impl log::Log for SpinnerLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.filter.matches(record) {
            let line = format!("{} {}", level_prefix(record.level(), true), record.args());
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {}
}

/// Install the global logger. `RUST_LOG` overrides the default level.
///
/// With `multi`, lines go through the spinner display in color; without,
/// plain `[LEVEL] message` lines go to stderr. A logger installed earlier
/// (tests, embedding binaries) is left in place.
pub fn init_logging(quiet: bool, debug: bool, multi: Option<&MultiProgress>) {
    let default_level = match (debug, quiet) {
        (true, _) => "debug",
        (false, true) => "warn",
        (false, false) => "info",
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    match multi {
        Some(multi) => {
            let filter = builder.build();
            let max_level = filter.filter();
            let logger = SpinnerLogger {
                filter,
                multi: multi.clone(),
            };
            if log::set_boxed_logger(Box::new(logger)).is_ok() {
                log::set_max_level(max_level);
            }
        }
        None => {
            let _ = builder
                .format(|buf, record| {
                    writeln!(buf, "{} {}", level_prefix(record.level(), false), record.args())
                })
                .try_init();
        }
    }
}
