use super::format::Attribute;
use crate::config::level::LogLevel;
use std::fmt::Debug;

/// Decorates rendered record attributes, e.g. with ANSI colors.
pub trait RecordStyle: Debug + Send + Sync {
    fn paint(&self, attribute: Attribute, level: LogLevel, text: String) -> String;

    fn is_colored(&self) -> bool {
        false
    }
}

/// Leaves every attribute untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainStyle;

impl RecordStyle for PlainStyle {
    fn paint(&self, _attribute: Attribute, _level: LogLevel, text: String) -> String {
        text
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "color")] {
        pub use colored_style::{ColoredStyle, Palette, TextStyle};

        pub(crate) fn colored_or_plain(
            level_styles: Option<&str>,
            field_styles: Option<&str>,
        ) -> std::sync::Arc<dyn RecordStyle> {
            std::sync::Arc::new(ColoredStyle::new(Palette::new(level_styles, field_styles)))
        }
    } else {
        pub(crate) fn colored_or_plain(
            _level_styles: Option<&str>,
            _field_styles: Option<&str>,
        ) -> std::sync::Arc<dyn RecordStyle> {
            std::sync::Arc::new(PlainStyle)
        }
    }
}

#[cfg(feature = "color")]
mod colored_style {
    use super::*;
    use crate::defaults::{DEFAULT_FIELD_STYLES, DEFAULT_LEVEL_STYLES};
    use colored::Color;
    use std::collections::HashMap;
    use std::str::FromStr;

    /// Color and emphasis for one attribute or level.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct TextStyle {
        pub color: Option<Color>,
        pub bold: bool,
        pub faint: bool,
        pub underline: bool,
        pub inverse: bool,
    }

    impl TextStyle {
        fn parse(encoded: &str) -> Self {
            let mut style = Self::default();
            for token in encoded.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                match token.to_ascii_lowercase().as_str() {
                    "bold" | "bright" => style.bold = true,
                    "faint" | "dimmed" => style.faint = true,
                    "underline" => style.underline = true,
                    "inverse" | "reversed" => style.inverse = true,
                    name => style.color = Color::from_str(name).ok(),
                }
            }
            style
        }

        fn is_plain(&self) -> bool {
            *self == Self::default()
        }

        fn apply(&self, text: String) -> String {
            if self.is_plain() || text.is_empty() {
                return text;
            }
            let mut codes: Vec<String> = Vec::new();
            if self.bold {
                codes.push("1".to_string());
            }
            if self.faint {
                codes.push("2".to_string());
            }
            if self.underline {
                codes.push("4".to_string());
            }
            if self.inverse {
                codes.push("7".to_string());
            }
            if let Some(color) = self.color {
                codes.push(color.to_fg_str().to_string());
            }
            format!("\x1b[{}m{text}\x1b[0m", codes.join(";"))
        }
    }

    /// Styles per level name (applied to the message) and per attribute name.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Palette {
        level_styles: HashMap<String, TextStyle>,
        field_styles: HashMap<String, TextStyle>,
    }

    impl Default for Palette {
        fn default() -> Self {
            Self {
                level_styles: parse_encoded_styles(DEFAULT_LEVEL_STYLES),
                field_styles: parse_encoded_styles(DEFAULT_FIELD_STYLES),
            }
        }
    }

    impl Palette {
        /// Builds a palette, replacing the defaults with the encoded styles that are given.
        pub fn new(level_styles: Option<&str>, field_styles: Option<&str>) -> Self {
            let default = Self::default();
            Self {
                level_styles: level_styles
                    .map(parse_encoded_styles)
                    .unwrap_or(default.level_styles),
                field_styles: field_styles
                    .map(parse_encoded_styles)
                    .unwrap_or(default.field_styles),
            }
        }
    }

    /// Parses `debug=green;warning=yellow;critical=red,bold`. Unknown tokens are ignored.
    pub(crate) fn parse_encoded_styles(encoded: &str) -> HashMap<String, TextStyle> {
        encoded
            .split(';')
            .filter_map(|entry| entry.split_once('='))
            .map(|(name, style)| (name.trim().to_ascii_lowercase(), TextStyle::parse(style)))
            .collect()
    }

    /// ANSI colored rendering: the message takes the style of its level, other attributes
    /// their own style.
    #[derive(Debug, Default, Clone)]
    pub struct ColoredStyle {
        palette: Palette,
    }

    impl ColoredStyle {
        pub fn new(palette: Palette) -> Self {
            Self { palette }
        }
    }

    impl RecordStyle for ColoredStyle {
        fn paint(&self, attribute: Attribute, level: LogLevel, text: String) -> String {
            let style = match attribute {
                Attribute::Message => self
                    .palette
                    .level_styles
                    .get(&level.name().to_ascii_lowercase()),
                other => self.palette.field_styles.get(other.name()),
            };
            match style {
                Some(style) => style.apply(text),
                None => text,
            }
        }

        fn is_colored(&self) -> bool {
            true
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn encoded_styles_are_parsed() {
            let styles = parse_encoded_styles("debug=green;critical=red,bold;info=");
            assert_eq!(
                Some(&TextStyle {
                    color: Some(Color::Red),
                    bold: true,
                    ..Default::default()
                }),
                styles.get("critical")
            );
            assert_eq!(Some(Color::Green), styles["debug"].color);
            assert!(styles["info"].is_plain());
        }

        #[test]
        fn message_takes_the_level_style() {
            let style = ColoredStyle::default();
            assert_eq!(
                "\x1b[33mcareful\x1b[0m",
                style.paint(Attribute::Message, LogLevel::WARNING, "careful".to_string())
            );
            assert_eq!(
                "fine",
                style.paint(Attribute::Message, LogLevel::INFO, "fine".to_string())
            );
        }

        #[test]
        fn attributes_take_their_own_style() {
            let style = ColoredStyle::default();
            assert_eq!(
                "\x1b[1;30mERROR\x1b[0m",
                style.paint(Attribute::Levelname, LogLevel::ERROR, "ERROR".to_string())
            );
            assert_eq!(
                "42",
                style.paint(Attribute::Lineno, LogLevel::ERROR, "42".to_string())
            );
        }

        #[test]
        fn custom_palette_replaces_defaults() {
            let style = ColoredStyle::new(Palette::new(Some("info=blue"), Some("")));
            assert_eq!(
                "\x1b[34mhi\x1b[0m",
                style.paint(Attribute::Message, LogLevel::INFO, "hi".to_string())
            );
            assert_eq!(
                "ERROR",
                style.paint(Attribute::Levelname, LogLevel::ERROR, "ERROR".to_string())
            );
        }
    }
}
