//! Log initialisation for the binaries

use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use std::io::Write;

/// Level for a `-v` count; `quiet` wins and keeps warnings and errors only
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Warn;
    }
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global logger on stderr; `RUST_LOG` adds per-module filters
pub fn init_logging(verbosity: u8, quiet: bool) {
    env_logger::Builder::new()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match level {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.module_path().unwrap_or("unknown_module"),
                record.args()
            )
        })
        .filter_level(level_filter(verbosity, quiet))
        .parse_default_env()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(0, false), LevelFilter::Info);
        assert_eq!(level_filter(1, false), LevelFilter::Debug);
        assert_eq!(level_filter(5, false), LevelFilter::Trace);
        assert_eq!(level_filter(2, true), LevelFilter::Warn);
    }
}
