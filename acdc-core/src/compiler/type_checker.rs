//! ASTに型を付け、記号表を構築する型検査パス。
//!
//! 意味エラーでは中断しない。違反をログに積み、該当ノードをERRORとして
//! 残りの木の解析を続けるので、1回の実行ですべての違反が報告される。
//! ERRORを受け取った親ノードは新たなエラーを記録せずにERRORを伝播する。

use super::Compiler;
use crate::ast::*;
use crate::error::SemanticErrorKind;
use crate::symbol_table::Attributes;
use std::mem;
use tracing::{debug, warn};

/// プログラム全体を検査し、結果型を`program.ty`に書き込む
pub fn check_program(compiler: &mut Compiler, program: &mut Program) -> TypeDescriptor {
    compiler.reset();
    for node in &mut program.nodes {
        match node {
            DeclOrStmt::Decl(decl) => check_declaration(compiler, decl),
            DeclOrStmt::Assign(assign) => check_assignment(compiler, assign),
            DeclOrStmt::Print(print) => check_print(compiler, print),
        }
    }

    let result = if compiler.log.is_empty() {
        TypeDescriptor::Void
    } else {
        TypeDescriptor::Error
    };
    debug!(result = %result, errors = compiler.log.len(), "type check finished");
    program.ty = Some(result);
    result
}

fn check_declaration(compiler: &mut Compiler, decl: &mut Declaration) {
    let declared = TypeDescriptor::from(decl.lang_type);
    match compiler
        .symbol_table
        .enter(&decl.id.name, Attributes::new(decl.lang_type))
    {
        Some(symbol) => {
            debug!(name = %decl.id.name, ty = %declared, "declared variable");
            decl.id.symbol = Some(symbol);
            decl.id.ty = Some(declared);
            decl.ty = Some(declared);
        }
        None => {
            report(
                compiler,
                SemanticErrorKind::DuplicateDeclaration,
                format!("Declaration: variable '{}' already declared.", decl.id.name),
                decl.id.span,
            );
            decl.id.ty = Some(TypeDescriptor::Error);
            decl.ty = Some(TypeDescriptor::Error);
        }
    }
}

fn check_assignment(compiler: &mut Compiler, assign: &mut Assignment) {
    let target = check_identifier(compiler, &mut assign.id);
    let source = check_expr(compiler, &mut assign.expr);

    if target == TypeDescriptor::Error || source == TypeDescriptor::Error {
        assign.ty = Some(TypeDescriptor::Error);
        return;
    }
    if !TypeDescriptor::compatible(target, source) {
        report(
            compiler,
            SemanticErrorKind::IncompatibleAssignment,
            format!("Assignment: cannot assign '{source}' type to '{target}' type."),
            assign.span,
        );
        assign.ty = Some(TypeDescriptor::Error);
        return;
    }
    if source != target {
        widen(&mut assign.expr);
    }
    assign.ty = Some(target);
}

fn check_print(compiler: &mut Compiler, print: &mut PrintStmt) {
    let ty = check_identifier(compiler, &mut print.id);
    let declared = compiler.symbol_table.lookup(&print.id.name).is_some();
    print.ty = Some(if ty != TypeDescriptor::Error && declared {
        ty
    } else {
        TypeDescriptor::Error
    });
}

/// 読み出し位置の識別子を記号表で解決する
fn check_identifier(compiler: &mut Compiler, id: &mut Identifier) -> TypeDescriptor {
    let table = &compiler.symbol_table;
    let resolved = table
        .lookup(&id.name)
        .and_then(|symbol| Some((symbol, table.attributes(symbol)?.lang_type)));
    let ty = match resolved {
        Some((symbol, lang_type)) => {
            id.symbol = Some(symbol);
            TypeDescriptor::from(lang_type)
        }
        None => {
            report(
                compiler,
                SemanticErrorKind::UndeclaredVariable,
                format!("Variable: variable '{}' is not declared.", id.name),
                id.span,
            );
            TypeDescriptor::Error
        }
    };
    id.ty = Some(ty);
    ty
}

fn check_expr(compiler: &mut Compiler, expr: &mut Expr) -> TypeDescriptor {
    let ty = match &mut expr.kind {
        ExprKind::Const { lang_type, .. } => TypeDescriptor::from(*lang_type),
        ExprKind::Deref(id) => check_identifier(compiler, id),
        ExprKind::BinOp { op, left, right } => {
            let op = *op;
            let lhs = check_expr(compiler, left);
            let rhs = check_expr(compiler, right);
            check_operands(compiler, op, left, right, lhs, rhs, expr.span)
        }
        // 変換ノードは再検査時にだけ現れる。中身の識別子を解決し直す。
        ExprKind::Convert(inner) => {
            check_expr(compiler, inner);
            TypeDescriptor::Float
        }
    };
    expr.ty = Some(ty);
    ty
}

/// 二項演算の結果型を決める。INTとFLOATが混在する場合はINT側を拡大する。
fn check_operands(
    compiler: &mut Compiler,
    op: LangOper,
    left: &mut Expr,
    right: &mut Expr,
    lhs: TypeDescriptor,
    rhs: TypeDescriptor,
    span: crate::span::Span,
) -> TypeDescriptor {
    use TypeDescriptor::{Error, Float, Int};
    match (lhs, rhs) {
        (Error, _) | (_, Error) => Error,
        (l, r) if l == r => l,
        (Int, Float) => {
            widen(left);
            Float
        }
        (Float, Int) => {
            widen(right);
            Float
        }
        (l, r) => {
            report(
                compiler,
                SemanticErrorKind::IncompatibleOperands,
                format!("BinaryOperation: incompatible operand types '{l}' and '{r}' for '{op}'."),
                span,
            );
            Error
        }
    }
}

/// 式をその場でFLOATへの変換ノードで包む
fn widen(expr: &mut Expr) {
    let placeholder = Expr::constant(String::new(), LangType::Int, expr.span);
    let inner = mem::replace(expr, placeholder);
    *expr = Expr::convert(inner);
}

fn report(
    compiler: &mut Compiler,
    kind: SemanticErrorKind,
    message: String,
    span: crate::span::Span,
) {
    warn!(?kind, %span, "{message}");
    compiler.log.push(kind, message, span);
}
