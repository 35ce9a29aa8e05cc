//! Format strings for log records.
//!
//! Three placeholder syntaxes are understood, selected by [FormatStyle]:
//! `%(name)-8s`, `{name:<8}` and `$name`/`${name}`. Placeholders name record
//! attributes ([Attribute]). Formats are parsed once, when a formatter is built, so
//! rendering a record cannot fail.
use super::record::Record;
use super::style::RecordStyle;
use crate::config::formatter::FormatStyle;
use crate::defaults::{DEFAULT_DATE_FORMAT, MESSAGE_FORMAT};
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FormatError {
    #[error("unknown record attribute `{0}`")]
    UnknownAttribute(String),
    #[error("invalid format `{format}`: {reason}")]
    Malformed { format: String, reason: String },
    #[error("invalid date format `{0}`")]
    InvalidDateFormat(String),
}

/// Record attributes that can be referenced from a format string.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Attribute {
    Asctime,
    Created,
    Msecs,
    RelativeCreated,
    Name,
    Levelname,
    Levelno,
    Pathname,
    Filename,
    Module,
    Lineno,
    FuncName,
    Process,
    ProcessName,
    Thread,
    ThreadName,
    Hostname,
    Programname,
    Message,
}

impl Attribute {
    pub fn from_name(name: &str) -> Result<Self, FormatError> {
        Ok(match name {
            "asctime" => Self::Asctime,
            "created" => Self::Created,
            "msecs" => Self::Msecs,
            "relativeCreated" => Self::RelativeCreated,
            "name" => Self::Name,
            "levelname" => Self::Levelname,
            "levelno" => Self::Levelno,
            "pathname" => Self::Pathname,
            "filename" => Self::Filename,
            "module" => Self::Module,
            "lineno" => Self::Lineno,
            "funcName" => Self::FuncName,
            "process" => Self::Process,
            "processName" => Self::ProcessName,
            "thread" => Self::Thread,
            "threadName" => Self::ThreadName,
            "hostname" => Self::Hostname,
            "programname" => Self::Programname,
            "message" => Self::Message,
            other => return Err(FormatError::UnknownAttribute(other.to_string())),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Asctime => "asctime",
            Self::Created => "created",
            Self::Msecs => "msecs",
            Self::RelativeCreated => "relativeCreated",
            Self::Name => "name",
            Self::Levelname => "levelname",
            Self::Levelno => "levelno",
            Self::Pathname => "pathname",
            Self::Filename => "filename",
            Self::Module => "module",
            Self::Lineno => "lineno",
            Self::FuncName => "funcName",
            Self::Process => "process",
            Self::ProcessName => "processName",
            Self::Thread => "thread",
            Self::ThreadName => "threadName",
            Self::Hostname => "hostname",
            Self::Programname => "programname",
            Self::Message => "message",
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
enum Align {
    #[default]
    Default,
    Left,
    Right,
    Center,
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
enum Conversion {
    #[default]
    Str,
    Repr,
    Int,
    Float,
}

#[derive(Debug, PartialEq, Clone)]
struct Placeholder {
    attribute: Attribute,
    align: Align,
    fill: char,
    zero_pad: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: Conversion,
    // `%`-style placeholders right-align by default, `{}`-style ones left-align text.
    text_left_aligned: bool,
}

impl Placeholder {
    fn new(attribute: Attribute) -> Self {
        Self {
            attribute,
            align: Align::Default,
            fill: ' ',
            zero_pad: false,
            width: None,
            precision: None,
            conversion: Conversion::Str,
            text_left_aligned: false,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

enum Value {
    Text(String),
    Int(i64),
    Float(f64),
}

/// A parsed format string plus its date format.
#[derive(Debug, PartialEq, Clone)]
pub struct RecordFormat {
    segments: Vec<Segment>,
    datefmt: Option<String>,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            segments: vec![Segment::Placeholder(Placeholder::new(Attribute::Message))],
            datefmt: None,
        }
    }
}

impl RecordFormat {
    /// Parses `format`. With `validate`, a format without any placeholder is rejected.
    pub fn parse(
        format: Option<&str>,
        datefmt: Option<&str>,
        style: FormatStyle,
        validate: bool,
    ) -> Result<Self, FormatError> {
        let format = format.unwrap_or(MESSAGE_FORMAT);
        let segments = match style {
            FormatStyle::Percent => parse_percent(format)?,
            FormatStyle::Brace => parse_brace(format)?,
            FormatStyle::Dollar => parse_dollar(format)?,
        };

        if validate
            && !segments
                .iter()
                .any(|segment| matches!(segment, Segment::Placeholder(_)))
        {
            return Err(malformed(format, "no record attribute referenced"));
        }

        if let Some(datefmt) = datefmt {
            if StrftimeItems::new(datefmt).any(|item| matches!(item, Item::Error)) {
                return Err(FormatError::InvalidDateFormat(datefmt.to_string()));
            }
        }

        Ok(Self {
            segments,
            datefmt: datefmt.map(str::to_string),
        })
    }

    /// Renders `record` into a single line, without the trailing newline.
    pub fn render(&self, record: &Record, style: &dyn RecordStyle) -> String {
        let mut line = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Placeholder(placeholder) => {
                    let value = self.value_of(placeholder.attribute, record);
                    let text = apply_spec(placeholder, value);
                    line.push_str(&style.paint(placeholder.attribute, record.level, text));
                }
            }
        }
        line
    }

    fn asctime(&self, record: &Record) -> String {
        let mut asctime = String::new();
        match &self.datefmt {
            Some(datefmt) => {
                let _ = write!(asctime, "{}", record.created.format(datefmt));
            }
            None => {
                let _ = write!(
                    asctime,
                    "{},{:03}",
                    record.created.format(DEFAULT_DATE_FORMAT),
                    record.created.timestamp_subsec_millis()
                );
            }
        }
        asctime
    }

    fn value_of(&self, attribute: Attribute, record: &Record) -> Value {
        match attribute {
            Attribute::Asctime => Value::Text(self.asctime(record)),
            Attribute::Created => Value::Float(record.created.timestamp_micros() as f64 / 1e6),
            Attribute::Msecs => Value::Int(record.created.timestamp_subsec_millis() as i64),
            Attribute::RelativeCreated => Value::Int(record.relative_created_ms),
            Attribute::Name => Value::Text(record.name.clone()),
            Attribute::Levelname => Value::Text(record.level.name()),
            Attribute::Levelno => Value::Int(record.level.number() as i64),
            Attribute::Pathname => Value::Text(
                record
                    .pathname
                    .clone()
                    .unwrap_or_else(|| "(unknown file)".to_string()),
            ),
            Attribute::Filename => Value::Text(
                record
                    .pathname
                    .as_deref()
                    .map(|path| path.rsplit(['/', '\\']).next().unwrap_or(path).to_string())
                    .unwrap_or_else(|| "(unknown file)".to_string()),
            ),
            Attribute::Module => Value::Text(module_of(record)),
            Attribute::Lineno => Value::Int(record.lineno.unwrap_or_default() as i64),
            Attribute::FuncName => Value::Text(
                record
                    .func_name
                    .clone()
                    .unwrap_or_else(|| "(unknown function)".to_string()),
            ),
            Attribute::Process => Value::Int(std::process::id() as i64),
            Attribute::ProcessName | Attribute::Programname => Value::Text(program_name()),
            Attribute::Thread => Value::Int(record.thread_id as i64),
            Attribute::ThreadName => Value::Text(record.thread_name.clone()),
            Attribute::Hostname => Value::Text(hostname()),
            Attribute::Message => Value::Text(record.message.clone()),
        }
    }
}

fn module_of(record: &Record) -> String {
    if let Some(path) = record.pathname.as_deref() {
        let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
        return file.split('.').next().unwrap_or(file).to_string();
    }
    record
        .module_path
        .as_deref()
        .and_then(|module_path| module_path.rsplit("::").next())
        .unwrap_or("Unknown module")
        .to_string()
}

fn program_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(target_family = "unix")]
fn hostname() -> String {
    nix::unistd::gethostname()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string())
}

#[cfg(not(target_family = "unix"))]
fn hostname() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_else(|_| "localhost".to_string())
}

fn apply_spec(placeholder: &Placeholder, value: Value) -> String {
    let (body, numeric) = match (placeholder.conversion, value) {
        (Conversion::Int, Value::Int(n)) => (n.to_string(), true),
        (Conversion::Int, Value::Float(f)) => ((f.trunc() as i64).to_string(), true),
        (Conversion::Float, Value::Int(n)) => (
            format!("{:.*}", placeholder.precision.unwrap_or(6), n as f64),
            true,
        ),
        (Conversion::Float, Value::Float(f)) => {
            (format!("{:.*}", placeholder.precision.unwrap_or(6), f), true)
        }
        // Text rendered through a numeric conversion is kept as is.
        (Conversion::Int | Conversion::Float, Value::Text(text)) => (text, false),
        (Conversion::Str, Value::Text(text)) => (truncate(text, placeholder.precision), false),
        (Conversion::Str, Value::Int(n)) => (n.to_string(), true),
        (Conversion::Str, Value::Float(f)) => (f.to_string(), true),
        (Conversion::Repr, Value::Text(text)) => (
            truncate(format!("'{text}'"), placeholder.precision),
            false,
        ),
        (Conversion::Repr, Value::Int(n)) => (n.to_string(), true),
        (Conversion::Repr, Value::Float(f)) => (f.to_string(), true),
    };
    pad(placeholder, body, numeric)
}

fn truncate(text: String, precision: Option<usize>) -> String {
    match precision {
        Some(max) if text.chars().count() > max => text.chars().take(max).collect(),
        _ => text,
    }
}

fn pad(placeholder: &Placeholder, body: String, numeric: bool) -> String {
    let Some(width) = placeholder.width else {
        return body;
    };
    let len = body.chars().count();
    if len >= width {
        return body;
    }
    let missing = width - len;

    if numeric && placeholder.zero_pad && placeholder.align == Align::Default {
        let (sign, digits) = match body.strip_prefix('-') {
            Some(digits) => ("-", digits),
            None => ("", body.as_str()),
        };
        return format!("{sign}{}{digits}", "0".repeat(missing));
    }

    let align = match placeholder.align {
        Align::Default if numeric || !placeholder.text_left_aligned => Align::Right,
        Align::Default => Align::Left,
        other => other,
    };
    let fill = |n: usize| placeholder.fill.to_string().repeat(n);
    match align {
        Align::Left => format!("{body}{}", fill(missing)),
        Align::Center => {
            let left = missing / 2;
            format!("{}{body}{}", fill(left), fill(missing - left))
        }
        _ => format!("{}{body}", fill(missing)),
    }
}

fn malformed(format: &str, reason: impl Into<String>) -> FormatError {
    FormatError::Malformed {
        format: format.to_string(),
        reason: reason.into(),
    }
}

fn push_literal(segments: &mut Vec<Segment>, c: char) {
    if let Some(Segment::Literal(text)) = segments.last_mut() {
        text.push(c);
    } else {
        segments.push(Segment::Literal(c.to_string()));
    }
}

fn read_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits.parse().ok()
}

/// `%(name)[flags][width][.precision]conversion`
fn parse_percent(format: &str) -> Result<Vec<Segment>, FormatError> {
    let mut segments = Vec::new();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            push_literal(&mut segments, c);
            continue;
        }
        match chars.next() {
            Some('%') => {
                push_literal(&mut segments, '%');
                continue;
            }
            Some('(') => {}
            _ => return Err(malformed(format, "expected `%(name)` placeholder")),
        }

        let mut name = String::new();
        loop {
            match chars.next() {
                Some(')') => break,
                Some(c) => name.push(c),
                None => return Err(malformed(format, "unterminated `%(` placeholder")),
            }
        }
        let mut placeholder = Placeholder::new(Attribute::from_name(&name)?);

        while let Some(flag) = chars.peek().copied() {
            match flag {
                '-' => placeholder.align = Align::Left,
                '0' => placeholder.zero_pad = true,
                ' ' | '+' | '#' => {}
                _ => break,
            }
            chars.next();
        }
        placeholder.width = read_number(&mut chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            placeholder.precision = Some(read_number(&mut chars).unwrap_or(0));
        }
        placeholder.conversion = match chars.next() {
            Some('s') => Conversion::Str,
            Some('r') => Conversion::Repr,
            Some('d') | Some('i') => Conversion::Int,
            Some('f') => Conversion::Float,
            Some(other) => {
                return Err(malformed(format, format!("unsupported conversion `{other}`")))
            }
            None => return Err(malformed(format, "missing conversion")),
        };
        segments.push(Segment::Placeholder(placeholder));
    }
    Ok(segments)
}

/// `{name[!conversion][:[[fill]align][0][width][.precision][type]]}`
fn parse_brace(format: &str) -> Result<Vec<Segment>, FormatError> {
    let mut segments = Vec::new();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                push_literal(&mut segments, '{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                push_literal(&mut segments, '}');
            }
            '}' => return Err(malformed(format, "single `}` encountered")),
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => field.push(c),
                        None => return Err(malformed(format, "unterminated `{` placeholder")),
                    }
                }
                segments.push(Segment::Placeholder(parse_brace_field(format, &field)?));
            }
            other => push_literal(&mut segments, other),
        }
    }
    Ok(segments)
}

fn parse_brace_field(format: &str, field: &str) -> Result<Placeholder, FormatError> {
    let (head, spec) = field.split_once(':').unwrap_or((field, ""));
    let (name, conversion) = head.split_once('!').unwrap_or((head, ""));

    let mut placeholder = Placeholder::new(Attribute::from_name(name)?);
    placeholder.text_left_aligned = true;
    placeholder.conversion = match conversion {
        "" | "s" => Conversion::Str,
        "r" | "a" => Conversion::Repr,
        other => return Err(malformed(format, format!("unsupported conversion `!{other}`"))),
    };

    let spec: Vec<char> = spec.chars().collect();
    let mut pos = 0;
    let align_of = |c: char| match c {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        _ => None,
    };
    if let Some(align) = spec.get(1).copied().and_then(align_of) {
        placeholder.fill = spec[0];
        placeholder.align = align;
        pos = 2;
    } else if let Some(align) = spec.first().copied().and_then(align_of) {
        placeholder.align = align;
        pos = 1;
    }
    if spec.get(pos) == Some(&'0') {
        placeholder.zero_pad = true;
        pos += 1;
    }

    let rest: String = spec[pos..].iter().collect();
    let mut chars = rest.chars().peekable();
    placeholder.width = read_number(&mut chars);
    if chars.peek() == Some(&'.') {
        chars.next();
        placeholder.precision = Some(read_number(&mut chars).unwrap_or(0));
    }
    match chars.next() {
        None | Some('s') => {}
        Some('d') => placeholder.conversion = Conversion::Int,
        Some('f') => placeholder.conversion = Conversion::Float,
        Some(other) => return Err(malformed(format, format!("unsupported type `{other}`"))),
    }
    if chars.next().is_some() {
        return Err(malformed(format, format!("invalid format spec `{field}`")));
    }
    Ok(placeholder)
}

/// `$name`, `${name}` and `$$`
fn parse_dollar(format: &str) -> Result<Vec<Segment>, FormatError> {
    let mut segments = Vec::new();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            push_literal(&mut segments, c);
            continue;
        }
        let name = match chars.peek().copied() {
            Some('$') => {
                chars.next();
                push_literal(&mut segments, '$');
                continue;
            }
            Some('{') => {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return Err(malformed(format, "unterminated `${` placeholder")),
                    }
                }
                name
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(c) = chars
                    .peek()
                    .copied()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                {
                    name.push(c);
                    chars.next();
                }
                name
            }
            _ => return Err(malformed(format, "invalid `$` placeholder")),
        };
        segments.push(Segment::Placeholder(Placeholder::new(Attribute::from_name(
            &name,
        )?)));
    }
    Ok(segments)
}
