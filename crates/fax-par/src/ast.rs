use fax_lex::TokenKind;
use fax_util::Span;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The closed set of AST node kinds (§3.4). `BUILTIN_*` members exist
/// for completeness of the closed set and for use by later stages that
/// recognize a call against a known built-in and want a stable tag for
/// it (see `DESIGN.md`); the hand-written parser in this crate never
/// constructs one directly, since the grammar has no dedicated syntax
/// for built-ins — `print(...)` and `v.length()` parse as ordinary
/// `FUNC_CALL`/`FIELD_ACCESS` nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeKind {
    TopLevel,
    Block,
    AssignOp,
    VarDeclare,
    FuncDeclare,
    ModuleImport,
    If,
    Return,
    While,
    BinaryOp,
    UnaryOp,
    FuncCall,
    IndexAccess,
    FieldAccess,
    VarLookup,
    ExprList,
    VecLiteral,
    DictLiteral,
    BoolLiteral,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    NothingLiteral,
    BuiltinPrint,
    BuiltinVectorLength,
    BuiltinVectorAppend,
    BuiltinStringLength,
    BuiltinDictLength,
    BuiltinDictKeys,
    BuiltinDictContains,
}

impl NodeKind {
    /// Stable wire-format tag used as `type_string` in the JSON AST
    /// dump (§6.3).
    pub fn name(self) -> &'static str {
        use NodeKind::*;
        match self {
            TopLevel => "TOP_LEVEL",
            Block => "BLOCK",
            AssignOp => "ASSIGN_OP",
            VarDeclare => "VAR_DECLARE",
            FuncDeclare => "FUNC_DECLARE",
            ModuleImport => "MODULE_IMPORT",
            If => "IF",
            Return => "RETURN",
            While => "WHILE",
            BinaryOp => "BINARY_OP",
            UnaryOp => "UNARY_OP",
            FuncCall => "FUNC_CALL",
            IndexAccess => "INDEX_ACCESS",
            FieldAccess => "FIELD_ACCESS",
            VarLookup => "VAR_LOOKUP",
            ExprList => "EXPR_LIST",
            VecLiteral => "VEC_LITERAL",
            DictLiteral => "DICT_LITERAL",
            BoolLiteral => "BOOL_LITERAL",
            IntLiteral => "INT_LITERAL",
            FloatLiteral => "FLOAT_LITERAL",
            StringLiteral => "STRING_LITERAL",
            NothingLiteral => "NOTHING_LITERAL",
            BuiltinPrint => "BUILTIN_PRINT",
            BuiltinVectorLength => "BUILTIN_VECTOR_LENGTH",
            BuiltinVectorAppend => "BUILTIN_VECTOR_APPEND",
            BuiltinStringLength => "BUILTIN_STRING_LENGTH",
            BuiltinDictLength => "BUILTIN_DICT_LENGTH",
            BuiltinDictKeys => "BUILTIN_DICT_KEYS",
            BuiltinDictContains => "BUILTIN_DICT_CONTAINS",
        }
    }

    pub fn as_type_int(self) -> u32 {
        self as u32
    }

    pub(crate) fn from_name(name: &str) -> Option<NodeKind> {
        use NodeKind::*;
        Some(match name {
            "TOP_LEVEL" => TopLevel,
            "BLOCK" => Block,
            "ASSIGN_OP" => AssignOp,
            "VAR_DECLARE" => VarDeclare,
            "FUNC_DECLARE" => FuncDeclare,
            "MODULE_IMPORT" => ModuleImport,
            "IF" => If,
            "RETURN" => Return,
            "WHILE" => While,
            "BINARY_OP" => BinaryOp,
            "UNARY_OP" => UnaryOp,
            "FUNC_CALL" => FuncCall,
            "INDEX_ACCESS" => IndexAccess,
            "FIELD_ACCESS" => FieldAccess,
            "VAR_LOOKUP" => VarLookup,
            "EXPR_LIST" => ExprList,
            "VEC_LITERAL" => VecLiteral,
            "DICT_LITERAL" => DictLiteral,
            "BOOL_LITERAL" => BoolLiteral,
            "INT_LITERAL" => IntLiteral,
            "FLOAT_LITERAL" => FloatLiteral,
            "STRING_LITERAL" => StringLiteral,
            "NOTHING_LITERAL" => NothingLiteral,
            "BUILTIN_PRINT" => BuiltinPrint,
            "BUILTIN_VECTOR_LENGTH" => BuiltinVectorLength,
            "BUILTIN_VECTOR_APPEND" => BuiltinVectorAppend,
            "BUILTIN_STRING_LENGTH" => BuiltinStringLength,
            "BUILTIN_DICT_LENGTH" => BuiltinDictLength,
            "BUILTIN_DICT_KEYS" => BuiltinDictKeys,
            "BUILTIN_DICT_CONTAINS" => BuiltinDictContains,
            _ => return None,
        })
    }
}

/// The auxiliary fields a node carries beyond its children (§3.2's
/// `data` mapping). Which variant is populated is determined entirely
/// by `kind` — see the table in `DESIGN.md`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeData {
    None,
    Ident(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    BinOp(TokenKind),
    UnaryOp(TokenKind),
    AssignOp(TokenKind),
    VarDecl { name: String, is_const: bool },
    FuncDecl { name: String, params: Vec<String> },
    FieldName(String),
    Import { path: String, alias: Option<String> },
}

/// An AST node (§3.2). Nodes are value-typed — cloning a node deep-
/// copies its entire subtree, matching "no sharing" in the spec.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    pub data: NodeData,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Node>, data: NodeData, span: Span) -> Self {
        Self {
            kind,
            children,
            data,
            span,
        }
    }

    pub fn leaf(kind: NodeKind, data: NodeData, span: Span) -> Self {
        Self::new(kind, Vec::new(), data, span)
    }

    pub fn top_level(decls: Vec<Node>, span: Span) -> Self {
        Self::new(NodeKind::TopLevel, decls, NodeData::None, span)
    }

    pub fn block(stmts: Vec<Node>, span: Span) -> Self {
        Self::new(NodeKind::Block, stmts, NodeData::None, span)
    }

    pub fn var_declare(name: String, is_const: bool, init: Node, span: Span) -> Self {
        Self::new(
            NodeKind::VarDeclare,
            vec![init],
            NodeData::VarDecl { name, is_const },
            span,
        )
    }

    pub fn func_declare(name: String, params: Vec<String>, body: Node, span: Span) -> Self {
        Self::new(
            NodeKind::FuncDeclare,
            vec![body],
            NodeData::FuncDecl { name, params },
            span,
        )
    }

    pub fn module_import(path: String, alias: Option<String>, span: Span) -> Self {
        Self::leaf(NodeKind::ModuleImport, NodeData::Import { path, alias }, span)
    }

    pub fn if_stmt(cond: Node, then: Node, else_branch: Option<Node>, span: Span) -> Self {
        let mut children = vec![cond, then];
        if let Some(e) = else_branch {
            children.push(e);
        }
        Self::new(NodeKind::If, children, NodeData::None, span)
    }

    pub fn while_stmt(cond: Node, body: Node, span: Span) -> Self {
        Self::new(NodeKind::While, vec![cond, body], NodeData::None, span)
    }

    pub fn return_stmt(expr: Node, span: Span) -> Self {
        Self::new(NodeKind::Return, vec![expr], NodeData::None, span)
    }

    pub fn assign_op(op: TokenKind, lhs: Node, rhs: Node, span: Span) -> Self {
        Self::new(
            NodeKind::AssignOp,
            vec![lhs, rhs],
            NodeData::AssignOp(op),
            span,
        )
    }

    pub fn binary_op(op: TokenKind, lhs: Node, rhs: Node, span: Span) -> Self {
        Self::new(NodeKind::BinaryOp, vec![lhs, rhs], NodeData::BinOp(op), span)
    }

    pub fn unary_op(op: TokenKind, operand: Node, span: Span) -> Self {
        Self::new(
            NodeKind::UnaryOp,
            vec![operand],
            NodeData::UnaryOp(op),
            span,
        )
    }

    pub fn func_call(callee: Node, args: Node, span: Span) -> Self {
        Self::new(NodeKind::FuncCall, vec![callee, args], NodeData::None, span)
    }

    pub fn index_access(lhs: Node, index: Node, span: Span) -> Self {
        Self::new(NodeKind::IndexAccess, vec![lhs, index], NodeData::None, span)
    }

    pub fn field_access(lhs: Node, field: String, span: Span) -> Self {
        Self::new(
            NodeKind::FieldAccess,
            vec![lhs],
            NodeData::FieldName(field),
            span,
        )
    }

    pub fn var_lookup(name: String, span: Span) -> Self {
        Self::leaf(NodeKind::VarLookup, NodeData::Ident(name), span)
    }

    pub fn expr_list(exprs: Vec<Node>, span: Span) -> Self {
        Self::new(NodeKind::ExprList, exprs, NodeData::None, span)
    }

    pub fn vec_literal(elems: Vec<Node>, span: Span) -> Self {
        Self::new(NodeKind::VecLiteral, elems, NodeData::None, span)
    }

    /// `children` alternates key, value, key, value, ... in source
    /// order (§3.4: "position is semantic").
    pub fn dict_literal(pairs: Vec<(Node, Node)>, span: Span) -> Self {
        let mut children = Vec::with_capacity(pairs.len() * 2);
        for (k, v) in pairs {
            children.push(k);
            children.push(v);
        }
        Self::new(NodeKind::DictLiteral, children, NodeData::None, span)
    }

    pub fn bool_literal(v: bool, span: Span) -> Self {
        Self::leaf(NodeKind::BoolLiteral, NodeData::Bool(v), span)
    }

    pub fn int_literal(v: i64, span: Span) -> Self {
        Self::leaf(NodeKind::IntLiteral, NodeData::Int(v), span)
    }

    pub fn float_literal(v: f64, span: Span) -> Self {
        Self::leaf(NodeKind::FloatLiteral, NodeData::Float(v), span)
    }

    pub fn string_literal(v: String, span: Span) -> Self {
        Self::leaf(NodeKind::StringLiteral, NodeData::Str(v), span)
    }

    pub fn nothing_literal(span: Span) -> Self {
        Self::leaf(NodeKind::NothingLiteral, NodeData::None, span)
    }
}

