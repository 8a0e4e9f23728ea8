//! acdcコンパイラのライブラリのクレート。
//! 字句解析、構文解析、型検査、`dc`コード生成のパイプラインを管理します。

pub mod ast;
pub mod compiler;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod span;
pub mod symbol_table;
pub mod token;

use crate::ast::{Program, TypeDescriptor};
use crate::compiler::Compiler;
use crate::error::{LangError, SemanticLog};
use crate::parser::Parser;
use crate::scanner::Scanner;
use crate::symbol_table::SymbolTable;
use crate::token::Token;
use std::path::Path;

/// `analyze_source`の戻り値。
/// 型検査済みのASTと、検査に使ったコンパイラの状態をまとめて保持します。
#[derive(Debug)]
pub struct Analysis {
    pub program: Program,
    compiler: Compiler,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        !self.compiler.log.is_empty()
    }

    pub fn log(&self) -> &SemanticLog {
        &self.compiler.log
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.compiler.symbol_table
    }

    /// 型検査が誤りなしで終わっていればコードを生成する。
    /// 生成後は記号表の各エントリにレジスタが記録されている。
    pub fn generate(&mut self) -> Result<String, LangError> {
        if self.has_errors() {
            return Err(LangError::Semantic(self.compiler.log.clone()));
        }
        Ok(self.compiler.generate(&self.program)?)
    }
}

/// ソースコードを末尾(EOFを含む)まで字句解析するヘルパー。
pub fn tokenize(source: &str) -> Result<Vec<Token>, LangError> {
    Ok(Scanner::new(source).tokenize_all()?)
}

/// ソースコードを構文解析し、型の付いていないASTを返す
pub fn parse_source(source: &str) -> Result<Program, LangError> {
    Parser::new(Scanner::new(source)).parse()
}

/// 構文解析と型検査を行う。意味エラーは`Err`にならず、`Analysis`のログに残る。
pub fn analyze_source(source: &str) -> Result<Analysis, LangError> {
    analyze(Scanner::new(source))
}

/// 既に用意されたScanner(ファイルや標準入力)から解析する
pub fn analyze(scanner: Scanner) -> Result<Analysis, LangError> {
    let mut program = Parser::new(scanner).parse()?;
    let mut compiler = Compiler::new();
    compiler.check(&mut program);
    Ok(Analysis { program, compiler })
}

/// ソースコードから`dc`のプログラムテキストを生成するメイン関数
pub fn compile_source(source: &str) -> Result<String, LangError> {
    let program = parse_source(source)?;
    compile_program(program)
}

/// ファイルを読み込んでコンパイルする
pub fn compile_file(path: impl AsRef<Path>) -> Result<String, LangError> {
    let program = Parser::new(Scanner::from_path(path)?).parse()?;
    compile_program(program)
}

fn compile_program(mut program: Program) -> Result<String, LangError> {
    let mut compiler = Compiler::new();
    let code = compiler.compile(&mut program)?;
    debug_assert_eq!(program.ty, Some(TypeDescriptor::Void));
    Ok(code)
}
