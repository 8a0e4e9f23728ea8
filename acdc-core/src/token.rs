//! 字句解析の結果であるトークンの種類を定義します。

use crate::span::Span;
use std::fmt;

/// トークンの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    TyInt,   // int
    TyFloat, // float
    Print,   // print

    // Identifier and Literals
    Id,
    Int,
    Float,

    // Symbols
    Assign, // =
    Plus,   // +
    Minus,  // -
    Times,  // *
    Div,    // /
    Semi,   // ;

    Eof,
}

impl TokenKind {
    /// 文字列がキーワードに一致する場合、対応するTokenKindを返す
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "int" => Some(TokenKind::TyInt),
            "float" => Some(TokenKind::TyFloat),
            "print" => Some(TokenKind::Print),
            _ => None,
        }
    }

    /// 1文字の演算子・区切り記号に対応するTokenKindを返す
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '=' => Some(TokenKind::Assign),
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Times),
            '/' => Some(TokenKind::Div),
            ';' => Some(TokenKind::Semi),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::TyInt => "TYINT",
            TokenKind::TyFloat => "TYFLOAT",
            TokenKind::Print => "PRINT",
            TokenKind::Id => "ID",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Div => "DIV",
            TokenKind::Semi => "SEMI",
            TokenKind::Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// 字句解析器が生成する不変のトークン。
/// 識別子・リテラル・キーワードはソース上の綴りを`value`に保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            value: None,
        }
    }

    pub fn with_value(kind: TokenKind, span: Span, value: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            value: Some(value.into()),
        }
    }

    /// トークンの行番号
    pub fn row(&self) -> usize {
        self.span.line
    }

    /// 診断メッセージ用のテキスト。値を持たないトークンは種類名で代用する。
    pub fn text(&self) -> String {
        match &self.value {
            Some(value) => value.clone(),
            None => self.kind.to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "<{},r:{},{}>", self.kind, self.row(), value),
            None => write!(f, "<{},r:{}>", self.kind, self.row()),
        }
    }
}
