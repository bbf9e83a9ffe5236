//! fax-par - the AST model (§3.2, §3.4) and the Pratt-style parser
//! (§4.2) that builds it from a token stream.

mod ast;
#[cfg(feature = "serde")]
mod dump;
mod parser;

pub use ast::{Node, NodeData, NodeKind};
pub use parser::parse;

#[cfg(feature = "serde")]
pub use dump::{from_json, to_json};

/// Convenience: lex then parse a full source string.
pub fn parse_source(source: &str) -> Result<Node, fax_util::FaxError> {
    let tokens = fax_lex::lex(source)?;
    parse(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    fn parse_expr_of(stmt_src: &str) -> Node {
        // Wrap a bare expression so it goes through the real statement
        // grammar, then pull the expression (or assign target) back out.
        let src = format!("function main() {stmt_src} ..");
        let top = parse_source(&src).unwrap();
        let main_decl = &top.children[0];
        let body = &main_decl.children[0];
        body.children[0].clone()
    }

    #[test]
    fn precedence_mul_binds_tighter_than_add() {
        let node = parse_expr_of("a + b * c;");
        assert_eq!(node.kind, NodeKind::BinaryOp);
        assert_eq!(node.data, NodeData::BinOp(fax_lex::TokenKind::Plus));
        let rhs = &node.children[1];
        assert_eq!(rhs.kind, NodeKind::BinaryOp);
        assert_eq!(rhs.data, NodeData::BinOp(fax_lex::TokenKind::Star));
    }

    #[test]
    fn precedence_eq_and_lt_with_amp() {
        // a == b & c < d  parses as  (a == b) & (c < d)
        let node = parse_expr_of("a == b & c < d;");
        assert_eq!(node.data, NodeData::BinOp(fax_lex::TokenKind::Amp));
        assert_eq!(
            node.children[0].data,
            NodeData::BinOp(fax_lex::TokenKind::EqEq)
        );
        assert_eq!(
            node.children[1].data,
            NodeData::BinOp(fax_lex::TokenKind::Lt)
        );
    }

    #[test]
    fn unary_minus_binds_tighter_than_star() {
        // -a * b parses as (-a) * b
        let node = parse_expr_of("-a * b;");
        assert_eq!(node.data, NodeData::BinOp(fax_lex::TokenKind::Star));
        assert_eq!(node.children[0].kind, NodeKind::UnaryOp);
    }

    #[test]
    fn unary_minus_on_field_access() {
        // -obj.field means -(obj.field)
        let node = parse_expr_of("-obj.field;");
        assert_eq!(node.kind, NodeKind::UnaryOp);
        assert_eq!(node.children[0].kind, NodeKind::FieldAccess);
    }

    #[test]
    fn left_associative_subtraction() {
        // a - b - c evaluates as (a - b) - c
        let node = parse_expr_of("a - b - c;");
        assert_eq!(node.data, NodeData::BinOp(fax_lex::TokenKind::Minus));
        assert_eq!(node.children[0].kind, NodeKind::BinaryOp);
        assert_eq!(node.children[1].kind, NodeKind::VarLookup);
    }

    #[test]
    fn call_and_index_and_field_fold_correctly() {
        let call = parse_expr_of("f(1, 2);");
        assert_eq!(call.kind, NodeKind::FuncCall);
        assert_eq!(call.children[1].children.len(), 2);

        let index = parse_expr_of("v[0];");
        assert_eq!(index.kind, NodeKind::IndexAccess);

        let field = parse_expr_of("o.name;");
        assert_eq!(field.kind, NodeKind::FieldAccess);
        assert_eq!(field.data, NodeData::FieldName("name".into()));
    }

    #[test]
    fn if_elseif_else_desugars_to_nested_if() {
        let src = "function main() if a 1; elseif b 2; else 3; .. ..";
        let top = parse_source(src).unwrap();
        let body = &top.children[0].children[0];
        let outer_if = &body.children[0];
        assert_eq!(outer_if.kind, NodeKind::If);
        assert_eq!(outer_if.children.len(), 3);
        let inner_if = &outer_if.children[2];
        assert_eq!(inner_if.kind, NodeKind::If);
        assert_eq!(inner_if.children.len(), 3);
    }

    #[test]
    fn while_and_compound_assign() {
        let src = "function main() let i = 0; while i < 5 i += 1; .. ..";
        let top = parse_source(src).unwrap();
        let body = &top.children[0].children[0];
        assert_eq!(body.children[1].kind, NodeKind::While);
        let while_body = &body.children[1].children[1];
        assert_eq!(while_body.children[0].kind, NodeKind::AssignOp);
    }

    #[test]
    fn import_with_and_without_alias() {
        let src = r#"import "a.lang" as m; import "b.lang";"#;
        let top = parse_source(src).unwrap();
        assert_eq!(top.children[0].kind, NodeKind::ModuleImport);
        match &top.children[0].data {
            NodeData::Import { path, alias } => {
                assert_eq!(path, "a.lang");
                assert_eq!(alias.as_deref(), Some("m"));
            }
            _ => panic!("wrong data"),
        }
        match &top.children[1].data {
            NodeData::Import { alias, .. } => assert!(alias.is_none()),
            _ => panic!("wrong data"),
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn ast_json_round_trip_preserves_shape() {
        let src = "function main() let x = 1 + 2 * 3; print(x); ..";
        let node = parse_source(src).unwrap();
        let json = to_json(&node);
        let back = from_json(&json).unwrap();
        assert_eq!(node, back);
    }

    #[test]
    fn missing_block_terminator_is_parse_error() {
        let err = parse_source("function main() print(1);").unwrap_err();
        assert_eq!(err.kind, fax_util::ErrorKind::Parse);
    }

    #[test]
    fn vector_and_dict_literals() {
        let vec_node = parse_expr_of("[1, 2, 3];");
        assert_eq!(vec_node.kind, NodeKind::VecLiteral);
        assert_eq!(vec_node.children.len(), 3);

        let dict_node = parse_expr_of(r#"{"a": 1, 2: "b"};"#);
        assert_eq!(dict_node.kind, NodeKind::DictLiteral);
        assert_eq!(dict_node.children.len(), 4);
    }
}
