//! Program encoding.
//!
//! Turns caller input into the text that is sent to the remote context:
//! expressions get the source-location marker unless they carry one already;
//! function source is validated, repaired once if it uses shorthand method
//! syntax, and always gets the marker.

use crate::config::EvaluationConfig;
use crate::syntax;
use crate::{BridgeError, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static SOURCE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*//[@#] sourceURL=\s*(\S*?)\s*$").expect("source URL regex must compile")
});

/// Caller input: an expression, or the printable source of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Program {
    Expression(String),
    Function(String),
}

impl Program {
    pub fn expression(source: impl Into<String>) -> Self {
        Program::Expression(source.into())
    }

    pub fn function(source: impl Into<String>) -> Self {
        Program::Function(source.into())
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Program::Function(_))
    }
}

/// Program text ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedProgram {
    /// Expression for `Runtime.evaluate`.
    Expression(String),
    /// Declaration for `Runtime.callFunctionOn`.
    FunctionDeclaration(String),
}

impl EncodedProgram {
    pub fn text(&self) -> &str {
        match self {
            EncodedProgram::Expression(text) | EncodedProgram::FunctionDeclaration(text) => text,
        }
    }
}

/// True if any line of `text` is a source-location marker comment.
pub fn has_source_url(text: &str) -> bool {
    SOURCE_URL_RE.is_match(text)
}

/// Append the marker to an expression that does not already carry one.
pub fn append_source_url(expression: &str) -> String {
    if has_source_url(expression) {
        expression.to_string()
    } else {
        format!("{}\n{}", expression, EvaluationConfig::source_url_comment())
    }
}

fn parses_wrapped(source: &str) -> bool {
    syntax::parses_as_expression(&format!("({})", source))
}

/// Validate function source, repairing shorthand method syntax.
///
/// Exactly one repair is attempted: `async name() {}` becomes
/// `async function name() {}`, anything else gets `function ` prepended.
pub fn normalize_function(source: &str) -> Result<String> {
    if parses_wrapped(source) {
        return Ok(source.to_string());
    }

    let repaired = match source.strip_prefix("async ") {
        Some(rest) => format!("async function {}", rest),
        None => format!("function {}", source),
    };

    if parses_wrapped(&repaired) {
        debug!("Repaired shorthand function source");
        Ok(repaired)
    } else {
        Err(BridgeError::MalformedCallable {
            source_text: source.to_string(),
        })
    }
}

/// Produce the final program text for `program`.
pub fn encode(program: &Program) -> Result<EncodedProgram> {
    match program {
        Program::Expression(expression) => {
            Ok(EncodedProgram::Expression(append_source_url(expression)))
        }
        Program::Function(source) => {
            let declaration = normalize_function(source)?;
            Ok(EncodedProgram::FunctionDeclaration(format!(
                "{}\n{}\n",
                declaration,
                EvaluationConfig::source_url_comment()
            )))
        }
    }
}
