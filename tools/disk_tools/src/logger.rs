use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{Level, LevelFilter, Log};
use owo_colors::OwoColorize;

/// Environment variable holding the log level filter.
pub const LOG_ENV: &str = "FATDISK_LOG";

const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

struct ToolLogger {
    colored: AtomicBool,
}

static LOGGER: ToolLogger = ToolLogger { colored: AtomicBool::new(false) };

impl ToolLogger {
    fn write_with_color(&self, out: &mut impl Write, color: Color, string: impl Display) {
        if !self.colored.load(Ordering::Relaxed) {
            let _ = write!(out, "{string}");
            return;
        }
        let string: &dyn Display = match color {
            Color::Default => &string,
            Color::Gray => &string.dimmed(),
            Color::BrightRed => &string.bright_red(),
            Color::BrightYellow => &string.bright_yellow(),
            Color::BrightBlue => &string.bright_blue(),
            Color::BrightCyan => &string.bright_cyan(),
            Color::BrightMagenta => &string.bright_magenta(),
        };
        let _ = write!(out, "{string}");
    }
}

impl Log for ToolLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut out = io::stderr().lock();
        let level = record.level();
        self.write_with_color(&mut out, level_color(level), format_args!("{level:5} "));
        if level >= Level::Debug {
            self.write_with_color(&mut out, Color::Gray, format_args!("[{}] ", record.target()));
        }
        self.write_with_color(&mut out, Color::Default, record.args());
        self.write_with_color(&mut out, Color::Default, "\n");
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::BrightRed,
        Level::Warn => Color::BrightYellow,
        Level::Info => Color::BrightBlue,
        Level::Debug => Color::BrightCyan,
        Level::Trace => Color::BrightMagenta,
    }
}

/// Parse a `FATDISK_LOG` value. Unset or unrecognised values fall back to `warn`.
pub fn level_from(value: Option<&str>) -> LevelFilter {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(DEFAULT_LEVEL)
}

/// Install the stderr logger. Level comes from `FATDISK_LOG`.
pub fn init() -> Result<(), log::SetLoggerError> {
    LOGGER.colored.store(io::stderr().is_terminal(), Ordering::Relaxed);
    let level = level_from(std::env::var(LOG_ENV).ok().as_deref());
    log::set_max_level(level);
    log::set_logger(&LOGGER)
}

enum Color {
    Default,
    Gray,
    BrightRed,
    BrightYellow,
    BrightBlue,
    BrightCyan,
    BrightMagenta,
}
