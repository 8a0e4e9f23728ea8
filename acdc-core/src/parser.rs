//! トークン列をASTに変換する再帰下降構文解析器。
//!
//! ```text
//! Program    := (Declaration | Statement)* EndOfInput
//! Declaration:= ("int" | "float") Identifier ";"
//! Statement  := Identifier "=" Expr ";"
//!             | "print" Identifier ";"
//! Expr       := Term (("+" | "-") Term)*
//! Term       := Val (("*" | "/") Val)*
//! Val        := IntLiteral | FloatLiteral | Identifier
//! ```
//!
//! 先読みは1トークンのみでバックトラックはしない。最初の字句・構文エラーで
//! 解析を打ち切り、途中までのASTは返さない。

use crate::ast::*;
use crate::error::{LangError, SyntaxError};
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};
use tracing::debug;

/// 構文解析器
pub struct Parser {
    scanner: Scanner,
}

impl Parser {
    pub fn new(scanner: Scanner) -> Self {
        Self { scanner }
    }

    /// プログラム全体をパースする
    pub fn parse(&mut self) -> Result<Program, LangError> {
        let mut nodes = Vec::new();
        loop {
            match self.peek_kind()? {
                TokenKind::TyInt | TokenKind::TyFloat => {
                    nodes.push(DeclOrStmt::Decl(self.parse_declaration()?))
                }
                TokenKind::Id | TokenKind::Print => nodes.push(self.parse_statement()?),
                TokenKind::Eof => break,
                _ => return Err(self.unexpected()?.into()),
            }
        }
        self.match_kind(TokenKind::Eof)?;
        debug!(nodes = nodes.len(), "parsed program");
        Ok(Program::new(nodes))
    }

    /// 宣言 `int a;` / `float a;` をパースする
    fn parse_declaration(&mut self) -> Result<Declaration, LangError> {
        let keyword = self.scanner.next()?;
        let lang_type = match keyword.kind {
            TokenKind::TyInt => LangType::Int,
            TokenKind::TyFloat => LangType::Float,
            _ => return Err(syntax_error(None, &keyword).into()),
        };
        let id = self.parse_identifier()?;
        self.match_kind(TokenKind::Semi)?;
        Ok(Declaration::new(lang_type, id, keyword.span))
    }

    /// 代入文またはprint文をパースする
    fn parse_statement(&mut self) -> Result<DeclOrStmt, LangError> {
        match self.peek_kind()? {
            TokenKind::Id => {
                let id = self.parse_identifier()?;
                let span = id.span;
                self.match_kind(TokenKind::Assign)?;
                let expr = self.parse_expr()?;
                self.match_kind(TokenKind::Semi)?;
                Ok(DeclOrStmt::Assign(Assignment::new(id, expr, span)))
            }
            TokenKind::Print => {
                let span = self.match_kind(TokenKind::Print)?.span;
                let id = self.parse_identifier()?;
                self.match_kind(TokenKind::Semi)?;
                Ok(DeclOrStmt::Print(PrintStmt::new(id, span)))
            }
            _ => Err(self.unexpected()?.into()),
        }
    }

    /// `Term (("+" | "-") Term)*` を左結合で畳み込む
    fn parse_expr(&mut self) -> Result<Expr, LangError> {
        let mut node = self.parse_term()?;
        loop {
            let op = match self.peek_kind()? {
                TokenKind::Plus => LangOper::Plus,
                TokenKind::Minus => LangOper::Minus,
                _ => break,
            };
            self.scanner.next()?;
            let rhs = self.parse_term()?;
            node = Expr::binary(op, node, rhs);
        }
        Ok(node)
    }

    /// `Val (("*" | "/") Val)*` を左結合で畳み込む
    fn parse_term(&mut self) -> Result<Expr, LangError> {
        let mut node = self.parse_val()?;
        loop {
            let op = match self.peek_kind()? {
                TokenKind::Times => LangOper::Times,
                TokenKind::Div => LangOper::Div,
                _ => break,
            };
            self.scanner.next()?;
            let rhs = self.parse_val()?;
            node = Expr::binary(op, node, rhs);
        }
        Ok(node)
    }

    fn parse_val(&mut self) -> Result<Expr, LangError> {
        match self.peek_kind()? {
            TokenKind::Int => {
                let token = self.match_kind(TokenKind::Int)?;
                Ok(Expr::constant(token.text(), LangType::Int, token.span))
            }
            TokenKind::Float => {
                let token = self.match_kind(TokenKind::Float)?;
                Ok(Expr::constant(token.text(), LangType::Float, token.span))
            }
            TokenKind::Id => Ok(Expr::deref(self.parse_identifier()?)),
            _ => Err(self.unexpected()?.into()),
        }
    }

    fn parse_identifier(&mut self) -> Result<Identifier, LangError> {
        let token = self.match_kind(TokenKind::Id)?;
        Ok(Identifier::new(token.text(), token.span))
    }

    // --- ヘルパー関数 ---

    /// 次のトークンが`expected`なら消費して返し、そうでなければ即座に失敗する
    fn match_kind(&mut self, expected: TokenKind) -> Result<Token, LangError> {
        let token = self.scanner.peek()?;
        if token.kind == expected {
            return Ok(self.scanner.next()?);
        }
        Err(syntax_error(Some(expected), token).into())
    }

    fn peek_kind(&mut self) -> Result<TokenKind, LangError> {
        Ok(self.scanner.peek()?.kind)
    }

    fn unexpected(&mut self) -> Result<SyntaxError, LangError> {
        let token = self.scanner.peek()?;
        Ok(syntax_error(None, token))
    }
}

fn syntax_error(expected: Option<TokenKind>, found: &Token) -> SyntaxError {
    let message = match expected {
        Some(expected) => format!(
            "expected {expected} but found {} '{}'",
            found.kind,
            found.text()
        ),
        None => format!("unexpected token {} '{}'", found.kind, found.text()),
    };
    SyntaxError {
        message,
        expected,
        found: found.kind,
        text: found.text(),
        span: found.span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn parse(source: &str) -> Result<Program, LangError> {
        Parser::new(Scanner::new(source)).parse()
    }

    fn assigned_expr(source: &str) -> String {
        let program = parse(source).expect("source should parse");
        match program.nodes.last() {
            Some(DeclOrStmt::Assign(assign)) => assign.expr.to_string(),
            other => panic!("expected an assignment, got {other:?}"),
        }
    }

    #[test]
    fn declarations_and_print() {
        let program = parse("int a;\nfloat b;\nprint a;").unwrap();
        assert_eq!(
            program.to_string(),
            "[Program:[Decl:INT,[Id:a]][Decl:FLOAT,[Id:b]][Print:[Id:a]]]"
        );
        assert!(program.ty.is_none());
        match &program.nodes[1] {
            DeclOrStmt::Decl(decl) => assert_eq!(decl.id.span, Span::new(2, 7)),
            other => panic!("expected a declaration, got {other:?}"),
        }
    }

    #[test]
    fn empty_program_is_valid() {
        assert!(parse("  \n ").unwrap().nodes.is_empty());
    }

    #[test]
    fn additive_operators_are_left_associative() {
        assert_eq!(
            assigned_expr("b = 3 - 2 - 7;"),
            "[BinOp:[BinOp:[Const:INT,3],MINUS,[Const:INT,2]],MINUS,[Const:INT,7]]"
        );
    }

    #[test]
    fn multiplicative_operators_bind_tighter() {
        assert_eq!(
            assigned_expr("b = 3 - 2*4 - 7;"),
            "[BinOp:[BinOp:[Const:INT,3],MINUS,[BinOp:[Const:INT,2],TIMES,[Const:INT,4]]],MINUS,[Const:INT,7]]"
        );
        assert_eq!(
            assigned_expr("c = a / b / 2.5 + 1;"),
            "[BinOp:[BinOp:[BinOp:[Deref:[Id:a]],DIV,[Deref:[Id:b]]],DIV,[Const:FLOAT,2.5]],PLUS,[Const:INT,1]]"
        );
    }

    #[test]
    fn missing_semicolon_reports_found_token() {
        let err = parse("int a\nprint a;").unwrap_err();
        match err {
            LangError::Syntax(err) => {
                assert_eq!(err.expected, Some(TokenKind::Semi));
                assert_eq!(err.found, TokenKind::Print);
                assert_eq!(err.span.line, 2);
            }
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn statement_cannot_start_with_literal() {
        let err = parse("int a; 4 = a;").unwrap_err();
        match err {
            LangError::Syntax(err) => {
                assert_eq!(err.expected, None);
                assert_eq!(err.found, TokenKind::Int);
                assert_eq!(err.text, "4");
            }
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn dangling_operator_is_a_syntax_error() {
        assert!(matches!(parse("a = 1 + ;"), Err(LangError::Syntax(_))));
        assert!(matches!(parse("a = 1 2;"), Err(LangError::Syntax(_))));
        assert!(matches!(parse("print 3;"), Err(LangError::Syntax(_))));
    }

    #[test]
    fn lexical_errors_propagate_through_the_parser() {
        let err = parse("float f;\nf = 1.234567;").unwrap_err();
        match err {
            LangError::Lexical(err) => assert_eq!(err.span.line, 2),
            other => panic!("expected a lexical error, got {other:?}"),
        }
    }

    #[test]
    fn two_parses_are_structurally_equal() {
        let source = "int a; float b; a = 4 * 2 - 1; b = a / 3.5; print b;";
        let first = parse(source).unwrap();
        let second = parse(source).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }
}
