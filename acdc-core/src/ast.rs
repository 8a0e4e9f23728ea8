//! パーサーが生成する抽象構文木(AST)のデータ構造を定義します。
//!
//! 型検査の前は各ノードの`ty`が`None`のまま。型検査がすべてのノードに
//! `TypeDescriptor`を書き込み、必要な箇所に`Convert`ノードを挿入する。
//! `Display`はノードの構造を`[Program:[Decl:INT,[Id:a]]...]`の形で表す。

use crate::span::Span;
use crate::symbol_table::SymbolId;
use std::fmt;

/// ソース上で宣言できる型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LangType {
    Int,
    Float,
}

/// 型検査がノードに付与する型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Int,
    Float,
    Void,
    Error,
}

impl TypeDescriptor {
    /// `target`型の格納先に`source`型の値を入れられるかどうか。
    /// 同じ型か、INTからFLOATへの拡大のみを許す。ERRORはどれとも両立しない。
    pub fn compatible(target: TypeDescriptor, source: TypeDescriptor) -> bool {
        if target == TypeDescriptor::Error || source == TypeDescriptor::Error {
            return false;
        }
        target == source || (target == TypeDescriptor::Float && source == TypeDescriptor::Int)
    }
}

impl From<LangType> for TypeDescriptor {
    fn from(lang_type: LangType) -> Self {
        match lang_type {
            LangType::Int => TypeDescriptor::Int,
            LangType::Float => TypeDescriptor::Float,
        }
    }
}

/// 二項演算子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LangOper {
    Plus,
    Minus,
    Times,
    Div,
}

impl LangOper {
    /// dcの演算命令
    pub fn symbol(&self) -> char {
        match self {
            LangOper::Plus => '+',
            LangOper::Minus => '-',
            LangOper::Times => '*',
            LangOper::Div => '/',
        }
    }
}

/// プログラム全体。宣言と文をソース上の順序で保持する。
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub nodes: Vec<DeclOrStmt>,
    /// 型検査後: 誤りがなければVOID、あればERROR
    pub ty: Option<TypeDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclOrStmt {
    Decl(Declaration),
    Assign(Assignment),
    Print(PrintStmt),
}

/// `int a;` / `float b;`
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub lang_type: LangType,
    pub id: Identifier,
    pub ty: Option<TypeDescriptor>,
    pub span: Span,
}

/// `a = <expr>;`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub id: Identifier,
    pub expr: Expr,
    pub ty: Option<TypeDescriptor>,
    pub span: Span,
}

/// `print a;`
#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub id: Identifier,
    pub ty: Option<TypeDescriptor>,
    pub span: Span,
}

/// 変数名。`symbol`は型検査で解決される記号表エントリへのハンドル。
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub ty: Option<TypeDescriptor>,
    pub symbol: Option<SymbolId>,
    pub span: Span,
}

/// 値を生む式
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Option<TypeDescriptor>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Const {
        value: String,
        lang_type: LangType,
    },
    /// 変数の値の読み出し
    Deref(Identifier),
    BinOp {
        op: LangOper,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// INT値をFLOATとして扱う暗黙の変換。型検査だけが挿入する。
    Convert(Box<Expr>),
}

impl Program {
    pub fn new(nodes: Vec<DeclOrStmt>) -> Self {
        Self { nodes, ty: None }
    }
}

impl Declaration {
    pub fn new(lang_type: LangType, id: Identifier, span: Span) -> Self {
        Self {
            lang_type,
            id,
            ty: None,
            span,
        }
    }
}

impl Assignment {
    pub fn new(id: Identifier, expr: Expr, span: Span) -> Self {
        Self {
            id,
            expr,
            ty: None,
            span,
        }
    }
}

impl PrintStmt {
    pub fn new(id: Identifier, span: Span) -> Self {
        Self { id, ty: None, span }
    }
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            ty: None,
            symbol: None,
            span,
        }
    }
}

impl Expr {
    pub fn constant(value: impl Into<String>, lang_type: LangType, span: Span) -> Self {
        Self::untyped(
            ExprKind::Const {
                value: value.into(),
                lang_type,
            },
            span,
        )
    }

    pub fn deref(id: Identifier) -> Self {
        let span = id.span;
        Self::untyped(ExprKind::Deref(id), span)
    }

    pub fn binary(op: LangOper, left: Expr, right: Expr) -> Self {
        let span = left.span;
        Self::untyped(
            ExprKind::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    /// `inner`をFLOATへの変換ノードで包む
    pub fn convert(inner: Expr) -> Self {
        let span = inner.span;
        Self {
            kind: ExprKind::Convert(Box::new(inner)),
            ty: Some(TypeDescriptor::Float),
            span,
        }
    }

    fn untyped(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            ty: None,
            span,
        }
    }
}

// --- 構造表示 ---

impl fmt::Display for LangType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LangType::Int => write!(f, "INT"),
            LangType::Float => write!(f, "FLOAT"),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Int => write!(f, "INT"),
            TypeDescriptor::Float => write!(f, "FLOAT"),
            TypeDescriptor::Void => write!(f, "VOID"),
            TypeDescriptor::Error => write!(f, "ERROR"),
        }
    }
}

impl fmt::Display for LangOper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LangOper::Plus => write!(f, "PLUS"),
            LangOper::Minus => write!(f, "MINUS"),
            LangOper::Times => write!(f, "TIMES"),
            LangOper::Div => write!(f, "DIV"),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Program:")?;
        for node in &self.nodes {
            write!(f, "{node}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for DeclOrStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclOrStmt::Decl(decl) => write!(f, "[Decl:{},{}]", decl.lang_type, decl.id),
            DeclOrStmt::Assign(assign) => write!(f, "[Assign:{},{}]", assign.id, assign.expr),
            DeclOrStmt::Print(print) => write!(f, "[Print:{}]", print.id),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Id:{}]", self.name)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Const { value, lang_type } => write!(f, "[Const:{lang_type},{value}]"),
            ExprKind::Deref(id) => write!(f, "[Deref:{id}]"),
            ExprKind::BinOp { op, left, right } => write!(f, "[BinOp:{left},{op},{right}]"),
            ExprKind::Convert(inner) => write!(f, "[Convert:{inner}]"),
        }
    }
}
