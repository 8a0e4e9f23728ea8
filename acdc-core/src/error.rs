//! コンパイル処理中に発生するエラーを定義します。
//!
//! 字句・構文エラーは最初の1件で処理を打ち切る。意味エラーは型検査の間に
//! ログへ蓄積され、まとめて`SemanticLog`として報告される。

use crate::span::Span;
use crate::token::TokenKind;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// ライブラリ全体で発生しうるエラーの集約
#[derive(Debug, Error)]
pub enum LangError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Lexical Error: {0}")]
    Lexical(#[from] LexicalError),
    #[error("Syntax Error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("Semantic Error:\n{0}")]
    Semantic(#[from] SemanticLog),
    #[error("Codegen Error: {0}")]
    Codegen(#[from] CodegenError),
}

/// 字句解析エラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} at {span}")]
pub struct LexicalError {
    pub message: String,
    pub span: Span,
}

impl LexicalError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// 構文解析エラー。問題のトークンの種類・綴り・位置を保持する。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} at {span}")]
pub struct SyntaxError {
    pub message: String,
    pub expected: Option<TokenKind>,
    pub found: TokenKind,
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticErrorKind {
    DuplicateDeclaration,
    UndeclaredVariable,
    IncompatibleAssignment,
    IncompatibleOperands,
}

/// 型検査で見つかった1件の違反
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub message: String,
    pub span: Span,
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

/// 意味エラーのログ。発見順に1行1件で表示する。
#[derive(Debug, Clone, Default, Error, PartialEq, Eq)]
pub struct SemanticLog {
    pub errors: Vec<SemanticError>,
}

impl SemanticLog {
    pub fn push(&mut self, kind: SemanticErrorKind, message: impl Into<String>, span: Span) {
        self.errors.push(SemanticError {
            kind,
            message: message.into(),
            span,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SemanticError> {
        self.errors.iter()
    }

    pub fn count(&self, kind: SemanticErrorKind) -> usize {
        self.errors.iter().filter(|err| err.kind == kind).count()
    }
}

impl fmt::Display for SemanticLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "no semantic errors");
        }
        for (idx, error) in self.errors.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// コード生成の前提条件違反
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodegenError {
    #[error("program is not well-typed; code generation refused")]
    IllTyped,
    #[error("no register left for variable '{name}' at {span}")]
    RegistersExhausted { name: String, span: Span },
    #[error("variable '{name}' at {span} has no allocated register")]
    Unresolved { name: String, span: Span },
}
