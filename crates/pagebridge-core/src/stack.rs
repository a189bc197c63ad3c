//! Stack trace parsing for remote exception descriptions.
//!
//! Descriptions follow the V8 layout: a message (possibly multi-line) followed
//! by frames of the form `    at fn (file:line:column)` or `    at file:line:column`.

use crate::config::EvaluationConfig;
use regex::Regex;
use std::sync::LazyLock;

static FRAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*at (?:(?P<function>.+?) \((?P<location>.*)\)|(?P<bare>.+))$")
        .expect("stack frame regex must compile")
});

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>.+?)(?::(?P<line>\d+)(?::(?P<column>\d+))?)?$")
        .expect("frame location regex must compile")
});

/// One parsed stack frame. Fields are `None` where the line does not say.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackFrame {
    pub function: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    /// Frame was reported as `at async ...`.
    pub is_async: bool,
}

impl StackFrame {
    /// Parse a single `at ...` line.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = FRAME_RE.captures(line)?;
        let (function, location) = match (caps.name("function"), caps.name("location")) {
            (Some(function), Some(location)) => (Some(function.as_str()), location.as_str()),
            _ => (None, caps.name("bare")?.as_str()),
        };

        let (function, is_async) = match function {
            Some(name) => match name.strip_prefix("async ") {
                Some(rest) => (Some(rest.to_string()), true),
                None => (Some(name.to_string()), false),
            },
            None => (None, false),
        };

        // `at async file:1:2` carries the marker on the location.
        let (location, is_async) = match location.strip_prefix("async ") {
            Some(rest) if function.is_none() => (rest, true),
            _ => (location, is_async),
        };

        let mut frame = StackFrame {
            function,
            is_async,
            ..Default::default()
        };

        if let Some(loc) = LOCATION_RE.captures(location) {
            frame.file = loc.name("file").map(|m| m.as_str().to_string());
            frame.line = loc.name("line").and_then(|m| m.as_str().parse().ok());
            frame.column = loc.name("column").and_then(|m| m.as_str().parse().ok());
        }

        Some(frame)
    }

    /// True for frames inside the script the bridge itself sent.
    pub fn is_evaluation_script(&self) -> bool {
        self.file
            .as_deref()
            .is_some_and(|file| file.ends_with(EvaluationConfig::SCRIPT_URL))
    }
}

fn is_frame_line(line: &str) -> bool {
    line.starts_with("    at ")
}

/// Parse every frame line of a description, in order.
pub fn parse_stack(description: &str) -> Vec<StackFrame> {
    description
        .lines()
        .filter(|line| is_frame_line(line))
        .filter_map(StackFrame::parse)
        .collect()
}

/// Description text preceding the first frame line.
pub fn message_portion(description: &str) -> String {
    description
        .lines()
        .take_while(|line| !is_frame_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_frame() {
        let frame = StackFrame::parse("    at increment (http://localhost:8080/app.js:12:34)").unwrap();
        assert_eq!(frame.function.as_deref(), Some("increment"));
        assert_eq!(frame.file.as_deref(), Some("http://localhost:8080/app.js"));
        assert_eq!(frame.line, Some(12));
        assert_eq!(frame.column, Some(34));
        assert!(!frame.is_async);
    }

    #[test]
    fn test_parse_bare_frame() {
        let frame = StackFrame::parse("    at __pagebridge_evaluation_script__:2:9").unwrap();
        assert_eq!(frame.function, None);
        assert_eq!(frame.file.as_deref(), Some("__pagebridge_evaluation_script__"));
        assert_eq!(frame.line, Some(2));
        assert_eq!(frame.column, Some(9));
        assert!(frame.is_evaluation_script());
    }

    #[test]
    fn test_parse_async_and_anonymous_frames() {
        let frame = StackFrame::parse("    at async fetchData (<anonymous>)").unwrap();
        assert_eq!(frame.function.as_deref(), Some("fetchData"));
        assert_eq!(frame.file.as_deref(), Some("<anonymous>"));
        assert_eq!(frame.line, None);
        assert!(frame.is_async);

        let frame = StackFrame::parse("    at async script.js:4:1").unwrap();
        assert_eq!(frame.function, None);
        assert_eq!(frame.file.as_deref(), Some("script.js"));
        assert!(frame.is_async);
    }

    #[test]
    fn test_parse_stack_skips_message_lines() {
        let description = "TypeError: x is not a function\n    with a second line\n    at foo (a.js:1:2)\n    at b.js:3:4";
        let stack = parse_stack(description);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack[0].function.as_deref(), Some("foo"));
        assert_eq!(stack[1].file.as_deref(), Some("b.js"));
        assert_eq!(
            message_portion(description),
            "TypeError: x is not a function\n    with a second line"
        );
    }

    #[test]
    fn test_parse_stack_without_frames() {
        assert!(parse_stack("42").is_empty());
        assert_eq!(message_portion("42"), "42");
    }
}
