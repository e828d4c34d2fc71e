use std::io::Write;

use colored::{ColoredString, Colorize};
use env_logger::Env;
use log::Level;

/// 初始化日志，默认只输出警告及以上，`RUST_LOG` 可覆盖
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| writeln!(buf, "[{}] {}", label(record.level()), record.args()))
        .try_init();
}

fn label(level: Level) -> ColoredString {
    match level {
        Level::Error => "Error".red(),
        Level::Warn => "Warning".yellow(),
        Level::Info => "INFO".blue(),
        Level::Debug => "DEBUG".magenta(),
        Level::Trace => "TRACE".normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_keep_plain_text() {
        colored::control::set_override(false);
        assert_eq!(label(Level::Warn).to_string(), "Warning");
        assert_eq!(label(Level::Error).to_string(), "Error");
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logger(false);
        init_logger(true);
    }
}
