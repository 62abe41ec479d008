use std::io::Write;

use cursor::Line;
use errors::{LoxError, LoxErrors};
use parser::{Expr, ParseError, Parser, Stmt};
use scanner::{ScanErrors, Token, TokenKind};

mod environment;
pub use environment::Environment;

mod value;
pub use value::Value;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RuntimeErrorType {
    #[error("invalid operand, expected number")]
    InvalidOperand,
    #[error("operands must be numbers")]
    OperandsMustBeNumbers,
    #[error("operands must be strings or numbers")]
    OperandsMustBeStringsOrNumbers,
    #[error("undefined variable {0}")]
    UndefinedVariable(String),
    #[error("failed to write output: {0}")]
    Output(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{error}\n[line {line}]")]
pub struct RuntimeError {
    pub error: RuntimeErrorType,
    pub line: Line,
}

impl RuntimeError {
    pub fn new(error: RuntimeErrorType, line: Line) -> Self {
        Self { error, line }
    }
}

impl From<RuntimeError> for LoxError {
    fn from(e: RuntimeError) -> Self {
        LoxError::new(e.line, format!("Runtime error: {}", e.error))
    }
}

/// Everything that can go wrong when running source text end to end.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanErrors),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl From<Error> for LoxErrors {
    fn from(e: Error) -> Self {
        match e {
            Error::Scan(errors) => errors.0.into_iter().collect(),
            Error::Parse(error) => LoxError::from(error).into(),
            Error::Runtime(error) => LoxError::from(error).into(),
        }
    }
}

#[derive(Debug)]
pub struct Interpreter<W> {
    environment: Environment,
    output: W,
}

impl<W: Write> Interpreter<W> {
    /// `print` statements write to `output`.
    pub fn new(output: W) -> Self {
        Self::with_environment(Environment::default(), output)
    }

    pub fn with_environment(environment: Environment, output: W) -> Self {
        Self { environment, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Scans, parses and runs `source`. Lexical errors are reported all at once and
    /// prevent parsing; parsing and execution stop at their first error.
    pub fn run_source(&mut self, source: &str) -> Result<(), Error> {
        let (tokens, errors) = scanner::scan(source);
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let stmts = Parser::new(tokens).parse()?;
        self.interpret(&stmts)?;
        Ok(())
    }

    /// Evaluates `source` as a single expression.
    pub fn evaluate_source(&mut self, source: &str) -> Result<Value, Error> {
        let (tokens, errors) = scanner::scan(source);
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let expr = Parser::new(tokens).parse_expression()?;
        Ok(self.evaluate(&expr)?)
    }

    pub fn interpret(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        for s in stmts {
            self.execute(s)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        log::trace!("Executing {stmt}");
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }
            Stmt::Print { keyword, expr } => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{value}").map_err(|e| {
                    RuntimeError::new(RuntimeErrorType::Output(e.to_string()), keyword.line())
                })?;
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme(), value);
            }
        }
        Ok(())
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(literal) => Ok((*literal).into()),

            Expr::Grouping(expr) => self.evaluate(expr),

            Expr::Variable(name) => self.environment.get(name).cloned(),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.ty() {
                    TokenKind::Minus => right.as_number().map(|n| Value::from(-n)).ok_or_else(|| {
                        RuntimeError::new(RuntimeErrorType::InvalidOperand, operator.line())
                    }),
                    TokenKind::Bang => Ok((!right.is_truthy()).into()),
                    _ => unreachable!("Not a unary operator: {operator}"),
                }
            }

            Expr::Binary { left, operator, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                let numbers = || number_operands(operator, &left, &right);
                match operator.ty() {
                    TokenKind::Minus => numbers().map(|(l, r)| Value::from(l - r)),
                    TokenKind::Slash => numbers().map(|(l, r)| Value::from(l / r)),
                    TokenKind::Star => numbers().map(|(l, r)| Value::from(l * r)),
                    TokenKind::Plus => add(operator, &left, &right),

                    TokenKind::Greater => numbers().map(|(l, r)| Value::from(l > r)),
                    TokenKind::GreaterEqual => numbers().map(|(l, r)| Value::from(l >= r)),
                    TokenKind::Less => numbers().map(|(l, r)| Value::from(l < r)),
                    TokenKind::LessEqual => numbers().map(|(l, r)| Value::from(l <= r)),

                    TokenKind::EqualEqual => Ok((left == right).into()),
                    TokenKind::BangEqual => Ok((left != right).into()),

                    _ => unreachable!("Not a binary operator: {operator}"),
                }
            }
        }
    }
}

fn number_operands(
    operator: &Token,
    left: &Value,
    right: &Value,
) -> Result<(f64, f64), RuntimeError> {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(RuntimeError::new(RuntimeErrorType::OperandsMustBeNumbers, operator.line())),
    }
}

fn add(operator: &Token, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        return Ok((l + r).into());
    }
    if let (Some(l), Some(r)) = (left.as_str(), right.as_str()) {
        return Ok(format!("{l}{r}").into());
    }
    Err(RuntimeError::new(RuntimeErrorType::OperandsMustBeStringsOrNumbers, operator.line()))
}
