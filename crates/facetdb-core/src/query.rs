//! Boolean feature expressions.
//!
//! Grammar:
//!
//! ```text
//! expr := term (op term)*
//! term := feature_id | '(' expr ')'
//! op   := '&' | '|'
//! ```
//!
//! Evaluation is eager and left-to-right with no precedence other than
//! parentheses. Each term is folded into the accumulator as soon as
//! it is read, using whichever operator is active at that moment. A group
//! gets its own accumulator and operator, at any depth; when it closes, its
//! result is folded into the enclosing accumulator with the enclosing
//! operator.
//!
//! ```text
//! "0&2|1"  =>  ((∅ | f0) & f2) | f1
//! ```

use roaring::RoaringBitmap;

use crate::error::{Error, Result};
use crate::storage::Storage;

/// Operator applied when folding a term into an accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    /// Intersection (`&`).
    And,
    /// Union (`|`).
    #[default]
    Or,
}

impl Operator {
    /// Folds `operand` into `acc`. A missing operand is the empty set.
    pub fn apply(self, acc: &mut RoaringBitmap, operand: Option<&RoaringBitmap>) {
        match (self, operand) {
            (Self::And, Some(bitmap)) => *acc &= bitmap,
            (Self::And, None) => acc.clear(),
            (Self::Or, Some(bitmap)) => *acc |= bitmap,
            (Self::Or, None) => {}
        }
    }
}

/// Lexical token of a feature expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Feature id; `None` when the literal does not fit in `u32`.
    Feature(Option<u32>),
    /// `&`
    And,
    /// `|`
    Or,
    /// `(`
    Open,
    /// `)`
    Close,
}

/// Splits an expression into `(byte offset, token)` pairs.
///
/// Whitespace is ignored.
///
/// # Errors
///
/// Returns `InvalidExpression` on any character that is not a digit,
/// whitespace, an operator or a parenthesis.
pub fn tokenize(expression: &str) -> Result<Vec<(usize, Token)>> {
    let bytes = expression.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let token = match bytes[pos] {
            b'&' => Token::And,
            b'|' => Token::Or,
            b'(' => Token::Open,
            b')' => Token::Close,
            b if b.is_ascii_whitespace() => {
                pos += 1;
                continue;
            }
            b if b.is_ascii_digit() => {
                let start = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                let id = expression[start..pos].parse::<u32>().ok();
                tokens.push((start, Token::Feature(id)));
                continue;
            }
            _ => {
                let found = expression[pos..].chars().next().unwrap_or_default();
                return Err(Error::invalid_expression(
                    pos,
                    format!("unexpected character '{found}'"),
                ));
            }
        };
        tokens.push((pos, token));
        pos += 1;
    }

    Ok(tokens)
}

/// Evaluates feature expressions against an inverted feature index.
#[derive(Debug, Clone, Copy)]
pub struct QueryEvaluator<'a> {
    feature_products: &'a [Option<RoaringBitmap>],
}

impl<'a> QueryEvaluator<'a> {
    /// Creates an evaluator over `feature_products[feature]`.
    #[must_use]
    pub fn new(feature_products: &'a [Option<RoaringBitmap>]) -> Self {
        Self { feature_products }
    }

    /// Evaluates `expression` into the set of matching product ids.
    ///
    /// Feature ids outside the index are skipped. A feature with no products
    /// clears the accumulator under `&` and is a no-op under `|`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidExpression` for unknown characters and unbalanced
    /// parentheses.
    pub fn evaluate(&self, expression: &str) -> Result<RoaringBitmap> {
        let mut current = Frame::default();
        // Enclosing frames paired with the offset of the '(' that left them.
        let mut parents: Vec<(usize, Frame)> = Vec::new();

        for (pos, token) in tokenize(expression)? {
            match token {
                Token::Open => {
                    parents.push((pos, std::mem::take(&mut current)));
                }
                Token::Close => {
                    let Some((_, mut parent)) = parents.pop() else {
                        return Err(Error::invalid_expression(pos, "unbalanced ')'"));
                    };
                    parent.op.apply(&mut parent.acc, Some(&current.acc));
                    current = parent;
                }
                Token::And => current.op = Operator::And,
                Token::Or => current.op = Operator::Or,
                Token::Feature(id) => {
                    let Some(slot) = id.and_then(|id| self.feature_products.get(id as usize))
                    else {
                        continue;
                    };
                    current.op.apply(&mut current.acc, slot.as_ref());
                }
            }
        }

        if let Some(&(pos, _)) = parents.last() {
            return Err(Error::invalid_expression(pos, "unclosed '('"));
        }

        Ok(current.acc)
    }
}

/// Accumulator and active operator of one nesting level.
#[derive(Debug, Default)]
struct Frame {
    acc: RoaringBitmap,
    op: Operator,
}

impl Storage {
    /// Evaluates a feature expression into the set of matching product ids.
    ///
    /// # Errors
    ///
    /// Returns `NotReady` before the load completes, or `InvalidExpression`
    /// for malformed input.
    pub fn evaluate(&self, expression: &str) -> Result<RoaringBitmap> {
        self.ensure_ready()?;
        QueryEvaluator::new(&self.feature_products).evaluate(expression)
    }
}
