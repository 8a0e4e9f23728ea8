//! 型付け済みASTから`dc`のプログラムテキストを生成するパス。
//!
//! 数値は`dc`のスタックに積まれ、変数は1文字のレジスタに置かれる。
//! 浮動小数点の演算は精度を5桁に上げてから行い、代入のたびに0桁へ戻す。

use super::Compiler;
use crate::ast::*;
use crate::error::CodegenError;
use crate::scanner::MAX_FRACTION_DIGITS;
use crate::symbol_table::SymbolId;
use std::fmt;
use tracing::debug;

/// 変数に割り当てるレジスタ名。宣言順に先頭から使う。
pub const REGISTERS: &str = "abcdefghijklmnopqrstuvwxyz";

/// `dc`の命令1つ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// 数値リテラルをスタックに積む
    Push(String),
    /// `lX`: レジスタの値を積む
    Load(char),
    /// `sX`: スタックの先頭をレジスタに格納する
    Store(char),
    /// `N k`: 精度を設定する
    Precision(usize),
    Arith(LangOper),
    Print,
    Pop,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(value) => write!(f, "{value}"),
            Instruction::Load(register) => write!(f, "l{register}"),
            Instruction::Store(register) => write!(f, "s{register}"),
            Instruction::Precision(digits) => write!(f, "{digits} k"),
            Instruction::Arith(op) => write!(f, "{}", op.symbol()),
            Instruction::Print => write!(f, "p"),
            Instruction::Pop => write!(f, "P"),
        }
    }
}

pub fn generate_program(compiler: &mut Compiler, program: &Program) -> Result<String, CodegenError> {
    if program.ty != Some(TypeDescriptor::Void) {
        return Err(CodegenError::IllTyped);
    }
    compiler.instructions.clear();
    compiler.next_register = 0;

    for node in &program.nodes {
        match node {
            DeclOrStmt::Decl(decl) => allocate(compiler, &decl.id)?,
            DeclOrStmt::Assign(assign) => {
                generate_expr(compiler, &assign.expr)?;
                let register = register_of(compiler, &assign.id)?;
                compiler.instructions.push(Instruction::Store(register));
                compiler.instructions.push(Instruction::Precision(0));
            }
            DeclOrStmt::Print(print) => {
                let register = register_of(compiler, &print.id)?;
                compiler.instructions.push(Instruction::Load(register));
                compiler.instructions.push(Instruction::Print);
                compiler.instructions.push(Instruction::Pop);
            }
        }
    }

    let code = compiler.code();
    debug!(instructions = compiler.instructions.len(), "generated dc code");
    Ok(code)
}

fn allocate(compiler: &mut Compiler, id: &Identifier) -> Result<(), CodegenError> {
    let symbol = resolve(compiler, id)?;
    let register = compiler
        .take_register()
        .ok_or_else(|| CodegenError::RegistersExhausted {
            name: id.name.clone(),
            span: id.span,
        })?;
    let attributes = compiler
        .symbol_table
        .attributes_mut(symbol)
        .ok_or_else(|| unresolved(id))?;
    attributes.register = Some(register);
    debug!(name = %id.name, %register, "allocated register");
    Ok(())
}

fn register_of(compiler: &Compiler, id: &Identifier) -> Result<char, CodegenError> {
    let symbol = resolve(compiler, id)?;
    compiler
        .symbol_table
        .attributes(symbol)
        .and_then(|attributes| attributes.register)
        .ok_or_else(|| unresolved(id))
}

/// 識別子のハンドルがこのコンパイラの記号表の同名エントリを指すことを確かめる
fn resolve(compiler: &Compiler, id: &Identifier) -> Result<SymbolId, CodegenError> {
    id.symbol
        .filter(|&symbol| compiler.symbol_table.name(symbol) == Some(id.name.as_str()))
        .ok_or_else(|| unresolved(id))
}

fn unresolved(id: &Identifier) -> CodegenError {
    CodegenError::Unresolved {
        name: id.name.clone(),
        span: id.span,
    }
}

fn generate_expr(compiler: &mut Compiler, expr: &Expr) -> Result<(), CodegenError> {
    match &expr.kind {
        ExprKind::Const { value, .. } => {
            compiler.instructions.push(Instruction::Push(value.clone()));
        }
        ExprKind::Deref(id) => {
            let register = register_of(compiler, id)?;
            compiler.instructions.push(Instruction::Load(register));
        }
        ExprKind::BinOp { op, left, right } => {
            generate_expr(compiler, left)?;
            generate_expr(compiler, right)?;
            compiler.instructions.push(Instruction::Arith(*op));
        }
        ExprKind::Convert(inner) => {
            generate_expr(compiler, inner)?;
            compiler
                .instructions
                .push(Instruction::Precision(MAX_FRACTION_DIGITS));
        }
    }
    Ok(())
}
