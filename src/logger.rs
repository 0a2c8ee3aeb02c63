// Cost Basis
// Written in 2023 by
//   Andrew Poelstra <tradetracker@wpsoftware.net>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! Logging
//!
//! Log infrastructure. This uses the traits and macros from the log 0.4 crate.
//!
//! Will write INFO and more urgent messages to stderr (stdout is reserved for
//! reports); will also log everything DEBUG and up to a debug log (with more
//! precise timestamp/severity information), and routes individual lot matches
//! to their own log.
//!
//! Any errors related to writing are simply dropped and the messages won't be
//! logged. Errors related to initially opening the files should kill the program.
//!

use crate::cost_basis::MATCH_LOG_TARGET;
use anyhow::Context;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use time::macros::format_description;

/// Internal marker structure used to indicate that we only log to stderr
struct StderrOnly;

impl log::Log for StderrOnly {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Actual logging structure
pub struct Logger {
    /// Log for general output (excluding individual lot matches)
    ///
    /// Info and greater logs will also be put to stderr
    debug_log: Mutex<File>,
    /// Log to dump lot matches to
    match_log: Mutex<File>,
}

impl Logger {
    /// Initialize a global logger
    pub fn init<P: AsRef<Path>>(debug_log: P, match_log: P) -> Result<(), anyhow::Error> {
        let debug_name = debug_log.as_ref().to_string_lossy().into_owned();
        let match_name = match_log.as_ref().to_string_lossy().into_owned();
        let logger = Logger {
            debug_log: Mutex::new(
                File::create(debug_log).with_context(|| format!("creating log {debug_name}"))?,
            ),
            match_log: Mutex::new(
                File::create(match_log).with_context(|| format!("creating log {match_name}"))?,
            ),
        };
        log::set_max_level(log::LevelFilter::Debug);
        log::set_boxed_logger(Box::new(logger)).map_err(From::from)
    }

    /// Initialize a global logger (without extra files)
    pub fn init_stderr_only() -> Result<(), log::SetLoggerError> {
        log::set_max_level(log::LevelFilter::Info);
        log::set_logger(&StderrOnly)
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Debug
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if record.target() == MATCH_LOG_TARGET {
            // Lot matches go to the match log with no additional processing
            if let Ok(mut log) = self.match_log.lock() {
                let _ = writeln!(log, "{}", record.args());
            }
            return;
        }

        // If it's more important than info, log to stderr
        if record.level() <= log::Level::Info {
            eprintln!("{}", record.args());
        }
        // Regardless, log to debug log with more precise timestamp and log level
        let now = time::OffsetDateTime::now_utc();
        let stamp = now
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
            ))
            .unwrap_or_default();
        if let Ok(mut log) = self.debug_log.lock() {
            let _ = writeln!(log, "{} [{}] {}", stamp, record.level(), record.args());
        }
    }

    fn flush(&self) {
        if let Ok(mut log) = self.debug_log.lock() {
            let _ = log.flush();
        }
        if let Ok(mut log) = self.match_log.lock() {
            let _ = log.flush();
        }
    }
}
