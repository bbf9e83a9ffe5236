//! JSON token dump (§6.3): `{type_string, type_int, metadata:{line,
//! column}, value}`. This is the exact wire contract `--dump-json
//! --lex` produces, and it doubles as the format property 1 in §8.1
//! round-trips through (lex -> dump -> re-lex agrees with a direct
//! re-lex of the same source).

use fax_util::{ErrorKind, FaxError, Span};
use serde_json::{json, Value as Json};

use crate::token::{Token, TokenKind, TokenValue};

pub fn tokens_to_json(tokens: &[Token]) -> String {
    let array: Vec<Json> = tokens.iter().map(token_to_json).collect();
    serde_json::to_string_pretty(&Json::Array(array)).expect("token dump is always valid JSON")
}

fn token_to_json(token: &Token) -> Json {
    let value = match &token.value {
        TokenValue::Absent => Json::Null,
        TokenValue::Int(i) => json!(i),
        TokenValue::Float(f) => json!(f),
        TokenValue::String(s) => json!(s),
        TokenValue::Bool(b) => json!(b),
    };
    json!({
        "type_string": token.kind.name(),
        "type_int": token.kind.as_type_int(),
        "metadata": { "line": token.span.line, "column": token.span.column },
        "value": value,
    })
}

/// Parses a dump produced by [`tokens_to_json`] back into tokens.
pub fn tokens_from_json(source: &str) -> Result<Vec<Token>, FaxError> {
    let parsed: Json = serde_json::from_str(source)
        .map_err(|e| FaxError::new(ErrorKind::Internal, Span::DUMMY, format!("malformed token JSON: {e}")))?;
    let Json::Array(entries) = parsed else {
        return Err(FaxError::new(
            ErrorKind::Internal,
            Span::DUMMY,
            "token dump root must be an array",
        ));
    };
    entries.iter().map(token_from_json).collect()
}

fn token_from_json(entry: &Json) -> Result<Token, FaxError> {
    let bad = |msg: &str| FaxError::new(ErrorKind::Internal, Span::DUMMY, msg.to_string());
    let type_string = entry
        .get("type_string")
        .and_then(Json::as_str)
        .ok_or_else(|| bad("missing type_string"))?;
    let type_int = entry
        .get("type_int")
        .and_then(Json::as_u64)
        .ok_or_else(|| bad("missing type_int"))?;
    let kind = TokenKind::from_name(type_string).ok_or_else(|| bad("unknown type_string"))?;
    if kind.as_type_int() as u64 != type_int {
        return Err(bad("type_string/type_int disagree"));
    }
    let line = entry
        .get("metadata")
        .and_then(|m| m.get("line"))
        .and_then(Json::as_u64)
        .ok_or_else(|| bad("missing metadata.line"))?;
    let column = entry
        .get("metadata")
        .and_then(|m| m.get("column"))
        .and_then(Json::as_u64)
        .ok_or_else(|| bad("missing metadata.column"))?;
    let span = Span::new(line as u32, column as u32);
    let value_json = entry.get("value").cloned().unwrap_or(Json::Null);
    let value = match kind {
        TokenKind::IntLiteral => TokenValue::Int(value_json.as_i64().ok_or_else(|| bad("expected int value"))?),
        TokenKind::FloatLiteral => {
            TokenValue::Float(value_json.as_f64().ok_or_else(|| bad("expected float value"))?)
        }
        TokenKind::Identifier | TokenKind::StringLiteral => TokenValue::String(
            value_json
                .as_str()
                .ok_or_else(|| bad("expected string value"))?
                .to_string(),
        ),
        TokenKind::BoolLiteral => {
            TokenValue::Bool(value_json.as_bool().ok_or_else(|| bad("expected bool value"))?)
        }
        _ => TokenValue::Absent,
    };
    Ok(Token::new(kind, value, span))
}
