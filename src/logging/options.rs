use super::console::ConsoleProvider;
use crate::config::formatter::FormatStyle;
use crate::config::handler::ConsoleStream;

const NO_COLOR_ENV: &str = "NO_COLOR";

/// How `setup_logger` installs its console handler.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerOptions {
    /// Record format, the default one when missing.
    pub fmt: Option<String>,
    pub datefmt: Option<String>,
    pub style: FormatStyle,
    pub stream: ConsoleStream,
    /// Forces (or disables) ANSI colors instead of detecting a terminal.
    pub isatty: Option<bool>,
    /// Replace an existing console handler instead of keeping it.
    pub reconfigure: bool,
    /// Keep milliseconds in `asctime` when no `datefmt` is given.
    pub milliseconds: bool,
    pub level_styles: Option<String>,
    pub field_styles: Option<String>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            fmt: None,
            datefmt: None,
            style: FormatStyle::default(),
            stream: ConsoleStream::Stderr,
            isatty: None,
            reconfigure: true,
            milliseconds: false,
            level_styles: None,
            field_styles: None,
        }
    }
}

impl LoggerOptions {
    pub(crate) fn use_colors(&self, console: &dyn ConsoleProvider) -> bool {
        self.isatty.unwrap_or_else(|| {
            std::env::var_os(NO_COLOR_ENV).is_none() && console.is_terminal(self.stream)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::console::test::CapturedConsole;

    #[test]
    fn defaults_reconfigure_on_stderr() {
        let options = LoggerOptions::default();

        assert!(options.reconfigure);
        assert_eq!(ConsoleStream::Stderr, options.stream);
        assert_eq!(None, options.isatty);
    }

    #[test]
    fn explicit_isatty_wins_over_detection() {
        let forced = LoggerOptions {
            isatty: Some(true),
            ..Default::default()
        };
        let disabled = LoggerOptions {
            isatty: Some(false),
            ..Default::default()
        };

        assert!(forced.use_colors(&CapturedConsole::default()));
        assert!(!disabled.use_colors(&CapturedConsole::terminal()));
    }
}
