use serde::Deserialize;

/// Placeholder syntax used by a format string.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum FormatStyle {
    /// `%(name)s`
    #[default]
    #[serde(rename = "%")]
    Percent,
    /// `{name}`
    #[serde(rename = "{")]
    Brace,
    /// `$name` or `${name}`
    #[serde(rename = "$")]
    Dollar,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum FormatterClass {
    #[default]
    #[serde(rename = "logging.Formatter")]
    Plain,
    /// Renders with ANSI colors when color support is compiled in.
    #[serde(rename = "coloredlogs.ColoredFormatter")]
    Colored,
}

/// A `formatters` entry.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct FormatterConfig {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub datefmt: Option<String>,
    #[serde(default)]
    pub style: FormatStyle,
    #[serde(default, alias = "()")]
    pub class: FormatterClass,
    #[serde(default = "validate_default")]
    pub validate: bool,
}

fn validate_default() -> bool {
    true
}
