use crate::ast::Node;
use fax_lex::{Token, TokenKind, TokenValue};
use fax_util::{FaxError, Span};

/// Parse a complete token stream (including its trailing `END_OF_FILE`)
/// into a `TOP_LEVEL` node (§4.2.1).
pub fn parse(tokens: Vec<Token>) -> Result<Node, FaxError> {
    let mut state = ParserState::new(tokens);
    state.parse_top_level()
}

/// Wraps the token slice and a monotone index (§4.2). `expect` is the
/// only way statement/expression parsing ever advances past a token it
/// cares about; everything else goes through `peek_kind`/`advance`.
struct ParserState {
    tokens: Vec<Token>,
    pos: usize,
}

impl ParserState {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        // The token stream always ends in END_OF_FILE, so `pos` never
        // runs past the end as long as callers only advance past a
        // non-EOF token.
        self.tokens.get(self.pos).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_span(&self) -> Span {
        self.peek().span
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if tok.kind != TokenKind::EndOfFile {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, FaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(FaxError::parse(
                self.peek_span(),
                format!(
                    "expected {} but found {}",
                    kind.as_str(),
                    self.peek_kind().as_str()
                ),
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, FaxError> {
        let tok = self.expect(TokenKind::Identifier)?;
        Ok(ident_text(&tok))
    }

    // ---- top level ----------------------------------------------------

    fn parse_top_level(&mut self) -> Result<Node, FaxError> {
        let span = self.peek_span();
        let mut decls = Vec::new();
        while !self.check(TokenKind::EndOfFile) {
            let decl = match self.peek_kind() {
                TokenKind::Let | TokenKind::Const => self.parse_var_declare()?,
                TokenKind::Function => self.parse_function_declare()?,
                TokenKind::Import => self.parse_module_import()?,
                other => {
                    return Err(FaxError::parse(
                        self.peek_span(),
                        format!("unexpected top-level token {}", other.as_str()),
                    ))
                }
            };
            decls.push(decl);
        }
        Ok(Node::top_level(decls, span))
    }

    fn parse_var_declare(&mut self) -> Result<Node, FaxError> {
        let is_const = self.check(TokenKind::Const);
        let kw = self.advance(); // `let` or `const`
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Eq)?;
        let init = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Node::var_declare(name, is_const, init, kw.span))
    }

    fn parse_function_declare(&mut self) -> Result<Node, FaxError> {
        let span = self.expect(TokenKind::Function)?.span;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier()?);
                if self.check(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Node::func_declare(name, params, body, span))
    }

    fn parse_module_import(&mut self) -> Result<Node, FaxError> {
        let span = self.expect(TokenKind::Import)?.span;
        let path_tok = self.expect(TokenKind::StringLiteral)?;
        let path = string_text(&path_tok);
        let alias = if self.check(TokenKind::As) {
            self.advance();
            Some(self.expect_identifier()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(Node::module_import(path, alias, span))
    }

    // ---- blocks and statements -----------------------------------------

    /// `block ::= statement* '..'` (§4.2.1): used for function bodies and
    /// `while` bodies, which each own and consume their closing `..`.
    fn parse_block(&mut self) -> Result<Node, FaxError> {
        let span = self.peek_span();
        let stmts = self.parse_stmts_until(&[TokenKind::DotDot])?;
        self.expect(TokenKind::DotDot)?;
        Ok(Node::block(stmts, span))
    }

    fn parse_stmts_until(&mut self, terminators: &[TokenKind]) -> Result<Vec<Node>, FaxError> {
        let mut stmts = Vec::new();
        while !terminators.contains(&self.peek_kind()) {
            if self.check(TokenKind::EndOfFile) {
                return Err(FaxError::parse(
                    self.peek_span(),
                    "unexpected end of file: missing block terminator '..'",
                ));
            }
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    fn parse_statement(&mut self) -> Result<Node, FaxError> {
        match self.peek_kind() {
            TokenKind::Let | TokenKind::Const => self.parse_var_declare(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            _ => self.parse_expr_statement(),
        }
    }

    fn parse_while_stmt(&mut self) -> Result<Node, FaxError> {
        let span = self.expect(TokenKind::While)?.span;
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Node::while_stmt(cond, body, span))
    }

    fn parse_return_stmt(&mut self) -> Result<Node, FaxError> {
        let span = self.expect(TokenKind::Return)?.span;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Node::return_stmt(expr, span))
    }

    fn parse_expr_statement(&mut self) -> Result<Node, FaxError> {
        let lhs = self.parse_expr()?;
        let node = if self.peek_kind().is_assign_op() {
            let op_tok = self.advance();
            let rhs = self.parse_expr()?;
            Node::assign_op(op_tok.kind, lhs.clone(), rhs, lhs.span)
        } else {
            lhs
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(node)
    }

    /// `if_block ::= 'if' expr <stmts> ('elseif' expr <stmts>)* ('else'
    /// block)? '..'` (§4.2.1). Each `elseif` is desugared into the
    /// `else` slot of a nested `IF` node (the closed AST shape only has
    /// room for `[cond, then, ?else]`), and a single trailing `..`
    /// closes the whole chain regardless of how many branches it has.
    fn parse_if_stmt(&mut self) -> Result<Node, FaxError> {
        let span = self.expect(TokenKind::If)?.span;
        let node = self.parse_if_chain(span)?;
        self.expect(TokenKind::DotDot)?;
        Ok(node)
    }

    fn parse_if_chain(&mut self, span: Span) -> Result<Node, FaxError> {
        let cond = self.parse_expr()?;
        let then_span = self.peek_span();
        let then_stmts = self.parse_stmts_until(&[
            TokenKind::ElseIf,
            TokenKind::Else,
            TokenKind::DotDot,
        ])?;
        let then_block = Node::block(then_stmts, then_span);

        let else_branch = if self.check(TokenKind::ElseIf) {
            let elseif_span = self.advance().span;
            Some(self.parse_if_chain(elseif_span)?)
        } else if self.check(TokenKind::Else) {
            self.advance();
            let else_span = self.peek_span();
            let else_stmts = self.parse_stmts_until(&[TokenKind::DotDot])?;
            Some(Node::block(else_stmts, else_span))
        } else {
            None
        };

        Ok(Node::if_stmt(cond, then_block, else_branch, span))
    }

    // ---- expressions (Pratt, §4.2.2) -----------------------------------

    fn parse_expr(&mut self) -> Result<Node, FaxError> {
        let lhs = self.parse_primary()?;
        self.parse_expr_helper(lhs, 0)
    }

    fn parse_expr_helper(&mut self, mut lhs: Node, min_prec: u8) -> Result<Node, FaxError> {
        loop {
            let op_kind = self.peek_kind();
            let Some(prec) = op_kind.binary_precedence() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let lhs_span = lhs.span;
            self.advance(); // consume the operator

            lhs = match op_kind {
                TokenKind::LParen => {
                    let args = self.parse_call_args()?;
                    let expr_list = Node::expr_list(args, lhs_span);
                    Node::func_call(lhs, expr_list, lhs_span)
                }
                TokenKind::LBracket => {
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    Node::index_access(lhs, index, lhs_span)
                }
                TokenKind::Dot => {
                    let field = self.expect_identifier()?;
                    Node::field_access(lhs, field, lhs_span)
                }
                _ => {
                    let rhs_primary = self.parse_primary()?;
                    let rhs = self.parse_expr_helper(rhs_primary, prec + 1)?;
                    Node::binary_op(op_kind, lhs, rhs, lhs_span)
                }
            };
        }
        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<Node, FaxError> {
        match self.peek_kind() {
            TokenKind::Minus | TokenKind::Bang => {
                let op_tok = self.advance();
                let operand_primary = self.parse_primary()?;
                let operand = self.parse_expr_helper(operand_primary, TokenKind::UNARY_PRECEDENCE)?;
                Ok(Node::unary_op(op_tok.kind, operand, op_tok.span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_vec_literal(),
            TokenKind::LBrace => self.parse_dict_literal(),
            TokenKind::Identifier => {
                let tok = self.advance();
                Ok(Node::var_lookup(ident_text(&tok), tok.span))
            }
            TokenKind::IntLiteral => {
                let tok = self.advance();
                let TokenValue::Int(v) = tok.value else {
                    unreachable!("lexer guarantees IntLiteral carries Int")
                };
                Ok(Node::int_literal(v, tok.span))
            }
            TokenKind::FloatLiteral => {
                let tok = self.advance();
                let TokenValue::Float(v) = tok.value else {
                    unreachable!("lexer guarantees FloatLiteral carries Float")
                };
                Ok(Node::float_literal(v, tok.span))
            }
            TokenKind::StringLiteral => {
                let tok = self.advance();
                Ok(Node::string_literal(string_text(&tok), tok.span))
            }
            TokenKind::BoolLiteral => {
                let tok = self.advance();
                let TokenValue::Bool(v) = tok.value else {
                    unreachable!("lexer guarantees BoolLiteral carries Bool")
                };
                Ok(Node::bool_literal(v, tok.span))
            }
            TokenKind::NothingLiteral => {
                let tok = self.advance();
                Ok(Node::nothing_literal(tok.span))
            }
            other => Err(FaxError::parse(
                self.peek_span(),
                format!("unexpected token {} in expression", other.as_str()),
            )),
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Node>, FaxError> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.check(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_vec_literal(&mut self) -> Result<Node, FaxError> {
        let span = self.expect(TokenKind::LBracket)?.span;
        let mut elems = Vec::new();
        if !self.check(TokenKind::RBracket) {
            loop {
                elems.push(self.parse_expr()?);
                if self.check(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(Node::vec_literal(elems, span))
    }

    fn parse_dict_literal(&mut self) -> Result<Node, FaxError> {
        let span = self.expect(TokenKind::LBrace)?.span;
        let mut pairs = Vec::new();
        if !self.check(TokenKind::RBrace) {
            loop {
                let key = self.parse_expr()?;
                self.expect(TokenKind::Colon)?;
                let value = self.parse_expr()?;
                pairs.push((key, value));
                if self.check(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Node::dict_literal(pairs, span))
    }
}

fn ident_text(tok: &Token) -> String {
    match &tok.value {
        TokenValue::String(s) => s.clone(),
        _ => unreachable!("lexer guarantees Identifier carries a String payload"),
    }
}

fn string_text(tok: &Token) -> String {
    match &tok.value {
        TokenValue::String(s) => s.clone(),
        _ => unreachable!("lexer guarantees StringLiteral carries a String payload"),
    }
}
