//! JSON AST dump (§6.3): each node is `{type_string, type_int,
//! zchildren:[...], data:{...}, xmetadata:{line,column}}`. The odd key
//! names (`zchildren`, `xmetadata`) are part of the wire contract, not
//! a typo — downstream tooling keys off them verbatim.

use fax_lex::TokenKind;
use fax_util::{ErrorKind, FaxError, Span};
use serde_json::{json, Value as Json};

use crate::ast::{Node, NodeData, NodeKind};

pub fn to_json(node: &Node) -> String {
    serde_json::to_string_pretty(&node_to_json(node)).expect("AST dump is always valid JSON")
}

pub fn from_json(source: &str) -> Result<Node, FaxError> {
    let parsed: Json = serde_json::from_str(source)
        .map_err(|e| FaxError::new(ErrorKind::Internal, Span::DUMMY, format!("malformed AST JSON: {e}")))?;
    node_from_json(&parsed)
}

fn node_to_json(node: &Node) -> Json {
    let zchildren: Vec<Json> = node.children.iter().map(node_to_json).collect();
    json!({
        "type_string": node.kind.name(),
        "type_int": node.kind.as_type_int(),
        "zchildren": zchildren,
        "data": data_to_json(&node.data),
        "xmetadata": { "line": node.span.line, "column": node.span.column },
    })
}

fn data_to_json(data: &NodeData) -> Json {
    match data {
        NodeData::None => Json::Null,
        NodeData::Ident(s) => json!({ "ident": s }),
        NodeData::Int(i) => json!({ "int": i }),
        NodeData::Float(f) => json!({ "float": f }),
        NodeData::Bool(b) => json!({ "bool": b }),
        NodeData::Str(s) => json!({ "str": s }),
        NodeData::BinOp(op) => json!({ "op": op.name() }),
        NodeData::UnaryOp(op) => json!({ "op": op.name() }),
        NodeData::AssignOp(op) => json!({ "op": op.name() }),
        NodeData::VarDecl { name, is_const } => json!({ "name": name, "is_const": is_const }),
        NodeData::FuncDecl { name, params } => json!({ "name": name, "params": params }),
        NodeData::FieldName(name) => json!({ "field": name }),
        NodeData::Import { path, alias } => json!({ "path": path, "alias": alias }),
    }
}

fn node_from_json(value: &Json) -> Result<Node, FaxError> {
    let bad = |msg: &str| FaxError::new(ErrorKind::Internal, Span::DUMMY, msg.to_string());
    let type_string = value
        .get("type_string")
        .and_then(Json::as_str)
        .ok_or_else(|| bad("missing type_string"))?;
    let type_int = value
        .get("type_int")
        .and_then(Json::as_u64)
        .ok_or_else(|| bad("missing type_int"))?;
    let kind = NodeKind::from_name(type_string).ok_or_else(|| bad("unknown type_string"))?;
    if kind.as_type_int() as u64 != type_int {
        return Err(bad("type_string/type_int disagree"));
    }
    let zchildren = value
        .get("zchildren")
        .and_then(Json::as_array)
        .ok_or_else(|| bad("missing zchildren"))?;
    let children = zchildren
        .iter()
        .map(node_from_json)
        .collect::<Result<Vec<_>, _>>()?;
    let line = value
        .get("xmetadata")
        .and_then(|m| m.get("line"))
        .and_then(Json::as_u64)
        .ok_or_else(|| bad("missing xmetadata.line"))?;
    let column = value
        .get("xmetadata")
        .and_then(|m| m.get("column"))
        .and_then(Json::as_u64)
        .ok_or_else(|| bad("missing xmetadata.column"))?;
    let span = Span::new(line as u32, column as u32);
    let data_json = value.get("data").cloned().unwrap_or(Json::Null);
    let data = data_from_json(kind, &data_json, &bad)?;
    Ok(Node::new(kind, children, data, span))
}

fn data_from_json(
    kind: NodeKind,
    data: &Json,
    bad: &dyn Fn(&str) -> FaxError,
) -> Result<NodeData, FaxError> {
    let get_str = |key: &str| -> Result<String, FaxError> {
        data.get(key)
            .and_then(Json::as_str)
            .map(str::to_string)
            .ok_or_else(|| bad("expected string field in data"))
    };
    Ok(match kind {
        NodeKind::VarLookup => NodeData::Ident(get_str("ident")?),
        NodeKind::IntLiteral => NodeData::Int(
            data.get("int")
                .and_then(Json::as_i64)
                .ok_or_else(|| bad("expected data.int"))?,
        ),
        NodeKind::FloatLiteral => NodeData::Float(
            data.get("float")
                .and_then(Json::as_f64)
                .ok_or_else(|| bad("expected data.float"))?,
        ),
        NodeKind::BoolLiteral => NodeData::Bool(
            data.get("bool")
                .and_then(Json::as_bool)
                .ok_or_else(|| bad("expected data.bool"))?,
        ),
        NodeKind::StringLiteral => NodeData::Str(get_str("str")?),
        NodeKind::BinaryOp => NodeData::BinOp(
            data.get("op")
                .and_then(Json::as_str)
                .and_then(TokenKind::from_name)
                .ok_or_else(|| bad("expected data.op"))?,
        ),
        NodeKind::UnaryOp => NodeData::UnaryOp(
            data.get("op")
                .and_then(Json::as_str)
                .and_then(TokenKind::from_name)
                .ok_or_else(|| bad("expected data.op"))?,
        ),
        NodeKind::AssignOp => NodeData::AssignOp(
            data.get("op")
                .and_then(Json::as_str)
                .and_then(TokenKind::from_name)
                .ok_or_else(|| bad("expected data.op"))?,
        ),
        NodeKind::VarDeclare => NodeData::VarDecl {
            name: get_str("name")?,
            is_const: data
                .get("is_const")
                .and_then(Json::as_bool)
                .ok_or_else(|| bad("expected data.is_const"))?,
        },
        NodeKind::FuncDeclare => NodeData::FuncDecl {
            name: get_str("name")?,
            params: data
                .get("params")
                .and_then(Json::as_array)
                .ok_or_else(|| bad("expected data.params"))?
                .iter()
                .map(|p| p.as_str().map(str::to_string).ok_or_else(|| bad("param must be a string")))
                .collect::<Result<Vec<_>, _>>()?,
        },
        NodeKind::FieldAccess => NodeData::FieldName(get_str("field")?),
        NodeKind::ModuleImport => NodeData::Import {
            path: get_str("path")?,
            alias: data.get("alias").and_then(Json::as_str).map(str::to_string),
        },
        _ => NodeData::None,
    })
}
