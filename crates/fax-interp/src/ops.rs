use fax_lex::TokenKind;
use fax_util::{ErrorKind, FaxError, Span};

use crate::value::Value;

/// Truthiness (§4.5.1): only `bool` values participate in `&`/`|`;
/// every other type, including `nothing`, is a type error.
pub fn truthiness(value: &Value, span: Span) -> Result<bool, FaxError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(FaxError::type_error(
            span,
            format!("expected bool, found {}", other.type_name()),
        )),
    }
}

/// Condition truthiness (§4.4.3/§4.5.5): `while`/`if` also accept
/// `nothing` as a legal, falsy condition.
pub fn condition_truthiness(value: &Value, span: Span) -> Result<bool, FaxError> {
    match value {
        Value::Nothing => Ok(false),
        Value::Bool(b) => Ok(*b),
        other => Err(FaxError::type_error(
            span,
            format!("expected bool or nothing, found {}", other.type_name()),
        )),
    }
}

/// Maps a compound-assignment token to the binary operator it desugars
/// to (§4.4.2: `x += y` means `x = x + y`). `ASSIGN` itself has no
/// underlying operator.
pub fn compound_to_binary(op: TokenKind) -> Option<TokenKind> {
    match op {
        TokenKind::PlusEq => Some(TokenKind::Plus),
        TokenKind::MinusEq => Some(TokenKind::Minus),
        TokenKind::StarEq => Some(TokenKind::Star),
        TokenKind::SlashEq => Some(TokenKind::Slash),
        TokenKind::PercentEq => Some(TokenKind::Percent),
        _ => None,
    }
}

/// Binary operator semantics (§4.5.1/§4.5.2). Arithmetic and ordering
/// accept any mix of int/float operands, promoting to float whenever
/// either side is float; `%` is the one exception and requires two
/// ints. `==`/`!=` are stricter: an int and a float are never equal
/// regardless of numeric value, since equality compares by type and
/// not by promoted value.
pub fn apply_binary(op: TokenKind, lhs: Value, rhs: Value, span: Span) -> Result<Value, FaxError> {
    use TokenKind::*;
    match op {
        EqEq => Ok(Value::Bool(equality(&lhs, &rhs, span)?)),
        BangEq => Ok(Value::Bool(!equality(&lhs, &rhs, span)?)),
        Amp => Ok(Value::Bool(truthiness(&lhs, span)? && truthiness(&rhs, span)?)),
        Pipe => Ok(Value::Bool(truthiness(&lhs, span)? || truthiness(&rhs, span)?)),
        Plus => arithmetic_or_concat(lhs, rhs, span),
        Minus | Star | Slash | Percent => numeric_binary(op, lhs, rhs, span),
        Lt | LtEq | Gt | GtEq => comparison(op, lhs, rhs, span),
        _ => Err(FaxError::new(
            ErrorKind::Internal,
            span,
            format!("{op:?} is not a binary operator"),
        )),
    }
}

/// Unary operator semantics (§4.5.1): `-` negates int/float, `!`
/// negates bool.
pub fn apply_unary(op: TokenKind, operand: Value, span: Span) -> Result<Value, FaxError> {
    match op {
        TokenKind::Minus => match operand {
            Value::Int(i) => Ok(Value::Int(-i)),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(FaxError::type_error(
                span,
                format!("cannot negate {}", other.type_name()),
            )),
        },
        TokenKind::Bang => Ok(Value::Bool(!truthiness(&operand, span)?)),
        other => Err(FaxError::new(
            ErrorKind::Internal,
            span,
            format!("{other:?} is not a unary operator"),
        )),
    }
}

fn equality(lhs: &Value, rhs: &Value, span: Span) -> Result<bool, FaxError> {
    if matches!(lhs, Value::Function(_) | Value::Module(_))
        || matches!(rhs, Value::Function(_) | Value::Module(_))
    {
        return Err(FaxError::type_error(
            span,
            format!(
                "cannot compare {} and {}",
                lhs.type_name(),
                rhs.type_name()
            ),
        ));
    }
    Ok(lhs.structural_eq(rhs))
}

fn arithmetic_or_concat(lhs: Value, rhs: Value, span: Span) -> Result<Value, FaxError> {
    match (&lhs, &rhs) {
        (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::new_str(format!(
            "{}{}",
            crate::value::stringify(&lhs),
            crate::value::stringify(&rhs)
        ))),
        _ => numeric_binary(TokenKind::Plus, lhs, rhs, span),
    }
}

fn numeric_binary(op: TokenKind, lhs: Value, rhs: Value, span: Span) -> Result<Value, FaxError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(op, a, b, span),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(op, a, b))),
        (Value::Int(_), Value::Float(_)) | (Value::Float(_), Value::Int(_))
            if op == TokenKind::Percent =>
        {
            Err(FaxError::type_error(
                span,
                "% requires two ints",
            ))
        }
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(float_op(op, a as f64, b))),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(float_op(op, a, b as f64))),
        (lhs, rhs) => Err(FaxError::type_error(
            span,
            format!(
                "cannot apply {op:?} to {} and {}",
                lhs.type_name(),
                rhs.type_name()
            ),
        )),
    }
}

fn int_op(op: TokenKind, a: i64, b: i64, span: Span) -> Result<Value, FaxError> {
    use TokenKind::*;
    match op {
        Plus => Ok(Value::Int(a.wrapping_add(b))),
        Minus => Ok(Value::Int(a.wrapping_sub(b))),
        Star => Ok(Value::Int(a.wrapping_mul(b))),
        Slash => {
            if b == 0 {
                Err(FaxError::type_error(span, "division by zero"))
            } else {
                Ok(Value::Int(a.wrapping_div(b)))
            }
        }
        Percent => {
            if b == 0 {
                Err(FaxError::type_error(span, "modulo by zero"))
            } else {
                Ok(Value::Int(a.wrapping_rem(b)))
            }
        }
        _ => unreachable!("numeric_binary only dispatches arithmetic ops"),
    }
}

fn float_op(op: TokenKind, a: f64, b: f64) -> f64 {
    use TokenKind::*;
    match op {
        Plus => a + b,
        Minus => a - b,
        Star => a * b,
        Slash => a / b,
        Percent => a % b,
        _ => unreachable!("numeric_binary only dispatches arithmetic ops"),
    }
}

fn comparison(op: TokenKind, lhs: Value, rhs: Value, span: Span) -> Result<Value, FaxError> {
    use TokenKind::*;
    let ordering = match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => a.cmp(&b),
        (Value::Float(a), Value::Float(b)) => a
            .partial_cmp(&b)
            .ok_or_else(|| FaxError::type_error(span, "comparison produced NaN".to_string()))?,
        (Value::Int(a), Value::Float(b)) => (a as f64)
            .partial_cmp(&b)
            .ok_or_else(|| FaxError::type_error(span, "comparison produced NaN".to_string()))?,
        (Value::Float(a), Value::Int(b)) => a
            .partial_cmp(&(b as f64))
            .ok_or_else(|| FaxError::type_error(span, "comparison produced NaN".to_string()))?,
        (lhs, rhs) => {
            return Err(FaxError::type_error(
                span,
                format!(
                    "cannot compare {} and {}",
                    lhs.type_name(),
                    rhs.type_name()
                ),
            ))
        }
    };
    let result = match op {
        Lt => ordering.is_lt(),
        LtEq => ordering.is_le(),
        Gt => ordering.is_gt(),
        GtEq => ordering.is_ge(),
        _ => unreachable!("comparison only dispatches relational ops"),
    };
    Ok(Value::Bool(result))
}
