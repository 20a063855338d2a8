//! Arithmetic calculator tool.
//!
//! Pulls the longest arithmetic-looking run out of a free-text question and
//! evaluates it with a small recursive-descent parser. The grammar covers
//! decimal numbers, `+ - * /`, parentheses and unary sign with standard
//! precedence; nothing else parses, so arbitrary expressions never reach an
//! evaluator.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ToolError;
use crate::tool::Tool;

/// Fixed answer when the question contains nothing arithmetic-looking.
pub const NO_EXPRESSION_MESSAGE: &str =
    "I couldn't find an arithmetic expression in your question.";

// Candidate expressions are contiguous runs of these characters.
static EXPR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9+\-*/().\s]+").expect("valid expression regex"));

/// Evaluates basic arithmetic found inside a free-text question.
///
/// Questions without any usable run answer with
/// [`NO_EXPRESSION_MESSAGE`]; malformed expressions and division by zero
/// answer with an error-shaped sentence. The tool itself never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorTool;

impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate basic arithmetic (+ - * / and parentheses) found in the question"
    }

    fn call(&self, input: &str) -> Result<String, ToolError> {
        let Some(expression) = extract_expression(input) else {
            return Ok(NO_EXPRESSION_MESSAGE.to_owned());
        };

        match eval_expression(expression) {
            Ok(value) => Ok(format_number(value)),
            Err(err) => Ok(format!("Couldn't evaluate '{expression}': {err}")),
        }
    }
}

/// The longest contiguous run of expression characters, trimmed.
///
/// Runs that trim to nothing (bare whitespace between words) are not
/// candidates; ties go to the later run.
fn extract_expression(question: &str) -> Option<&str> {
    EXPR_RE
        .find_iter(question)
        .map(|m| m.as_str())
        .filter(|run| !run.trim().is_empty())
        .max_by_key(|run| run.len())
        .map(str::trim)
}

/// Format a result: integral values print without a trailing `.0`.
#[allow(clippy::cast_possible_truncation)]
fn format_number(value: f64) -> String {
    // The guard keeps the cast inside i64 range.
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Evaluation error for the restricted arithmetic grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
enum CalcError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

/// Evaluate a trimmed arithmetic expression.
fn eval_expression(expression: &str) -> Result<f64, CalcError> {
    let mut parser = Parser::new(expression);
    let value = parser.expr()?;
    match parser.peek() {
        None => Ok(value),
        Some(trailing) => Err(CalcError::UnexpectedChar(char::from(trailing))),
    }
}

/// Recursive-descent parser over the arithmetic grammar:
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := factor (('*' | '/') factor)*
/// factor := ('+' | '-') factor | '(' expr ')' | number
/// ```
///
/// The input is ASCII by construction (it came out of `EXPR_RE`), so byte
/// positions are always char boundaries.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Next significant byte, skipping whitespace.
    fn peek(&mut self) -> Option<u8> {
        let bytes = self.input.as_bytes();
        while matches!(bytes.get(self.pos), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        bytes.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(b'+') => {
                    self.bump();
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.bump();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some(b'*') => {
                    self.bump();
                    value *= self.factor()?;
                }
                Some(b'/') => {
                    self.bump();
                    let divisor = self.factor()?;
                    // IEEE division would give inf; callers want an error.
                    #[allow(clippy::float_cmp)]
                    if divisor == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(b'+') => {
                self.bump();
                self.factor()
            }
            Some(b'-') => {
                self.bump();
                Ok(-self.factor()?)
            }
            Some(b'(') => {
                self.bump();
                let value = self.expr()?;
                match self.peek() {
                    Some(b')') => {
                        self.bump();
                        Ok(value)
                    }
                    Some(other) => Err(CalcError::UnexpectedChar(char::from(other))),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(b) if b.is_ascii_digit() || b == b'.' => self.number(),
            Some(other) => Err(CalcError::UnexpectedChar(char::from(other))),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        while matches!(bytes.get(self.pos), Some(b) if b.is_ascii_digit() || *b == b'.') {
            self.pos += 1;
        }
        let text = &self.input[start..self.pos];
        text.parse::<f64>()
            .map_err(|_| CalcError::InvalidNumber(text.to_owned()))
    }
}
