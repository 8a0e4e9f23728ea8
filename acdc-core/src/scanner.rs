//! ソースコード文字列をトークンの遅延シーケンスに変換する字句解析器(Scanner)。
//!
//! `next`で1トークンずつ読み進め、`peek`で1トークン先読みする。先読みした
//! トークンは`next`が消費するまで保持されるため、`peek`は何度呼んでも同じ
//! トークンを返す。

use crate::error::{LangError, LexicalError};
use crate::span::Span;
use crate::token::{Token, TokenKind};
use std::fs;
use std::iter::Peekable;
use std::path::Path;
use std::vec::IntoIter;
use tracing::trace;

/// 浮動小数点リテラルの小数部に許される最大桁数
pub const MAX_FRACTION_DIGITS: usize = 5;

/// 字句解析器
pub struct Scanner {
    input: Peekable<IntoIter<char>>,
    line: usize,
    column: usize,
    peeked: Option<Token>,
}

impl Scanner {
    /// 新しいScannerを生成する
    pub fn new(source: &str) -> Self {
        Self {
            input: source.chars().collect::<Vec<_>>().into_iter().peekable(),
            line: 1,
            column: 1,
            peeked: None,
        }
    }

    /// ファイルを読み込み、その内容を走査するScannerを生成する
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LangError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| LangError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(&source))
    }

    /// 次のトークンを返して読み進める
    pub fn next(&mut self) -> Result<Token, LexicalError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scan_token(),
        }
    }

    /// 次のトークンを読み進めずに返す
    pub fn peek(&mut self) -> Result<&Token, LexicalError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan_token()?,
        };
        Ok(self.peeked.insert(token))
    }

    /// 入力の終端(EOFトークンを含む)までをすべてトークンに変換する
    pub fn tokenize_all(&mut self) -> Result<Vec<Token>, LexicalError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn scan_token(&mut self) -> Result<Token, LexicalError> {
        self.skip_blanks();
        let span = self.span();
        let Some(&c) = self.input.peek() else {
            return Ok(Token::new(TokenKind::Eof, span));
        };

        let token = match c {
            '0'..='9' | '.' => self.scan_number(span)?,
            'a'..='z' => self.scan_identifier(span),
            _ => {
                self.next_char();
                match TokenKind::from_symbol(c) {
                    Some(kind) => Token::new(kind, span),
                    None => {
                        return Err(LexicalError::new(
                            format!("illegal character '{}'", c.escape_default()),
                            span,
                        ))
                    }
                }
            }
        };
        trace!(token = %token, "scanned token");
        Ok(token)
    }

    fn scan_number(&mut self, span: Span) -> Result<Token, LexicalError> {
        let mut text = String::new();
        self.consume_digits(&mut text);
        if self.input.peek() != Some(&'.') {
            return Ok(Token::with_value(TokenKind::Int, span, text));
        }

        text.push('.');
        self.next_char();
        let integer_len = text.len();
        self.consume_digits(&mut text);
        let fraction_digits = text.len() - integer_len;
        if !(1..=MAX_FRACTION_DIGITS).contains(&fraction_digits) {
            return Err(LexicalError::new(
                format!(
                    "malformed float literal '{text}': expected 1 to {MAX_FRACTION_DIGITS} fractional digits, found {fraction_digits}"
                ),
                span,
            ));
        }
        Ok(Token::with_value(TokenKind::Float, span, text))
    }

    fn scan_identifier(&mut self, span: Span) -> Token {
        let mut text = String::new();
        while let Some(&c) = self.input.peek() {
            if !c.is_ascii_lowercase() {
                break;
            }
            text.push(c);
            self.next_char();
        }
        match TokenKind::from_keyword(&text) {
            Some(keyword) => Token::new(keyword, span),
            None => Token::with_value(TokenKind::Id, span, text),
        }
    }

    // --- ヘルパー関数 ---

    fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.input.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_blanks(&mut self) {
        while let Some(&c) = self.input.peek() {
            if !matches!(c, ' ' | '\t' | '\r' | '\n') {
                break;
            }
            self.next_char();
        }
    }

    fn consume_digits(&mut self, text: &mut String) {
        while let Some(&c) = self.input.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.next_char();
        }
    }
}
