//! 型付け済みでないASTを受け取り、型検査とコード生成を行うコンパイラ。
//!
//! 2つのパスは同じ`Compiler`の状態(記号表・意味エラーのログ・命令列)を
//! 共有する。コード生成は型検査が誤りなしと判定した場合にだけ実行される。

pub mod code_generator;
pub mod type_checker;

pub use code_generator::{Instruction, REGISTERS};

use crate::ast::{Program, TypeDescriptor};
use crate::error::{CodegenError, LangError, SemanticLog};
use crate::symbol_table::SymbolTable;

/// 1回のコンパイルで共有される状態を管理する構造体。
#[derive(Debug, Default)]
pub struct Compiler {
    pub symbol_table: SymbolTable,
    pub log: SemanticLog,
    pub instructions: Vec<Instruction>,
    next_register: usize,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しいコンパイル単位のために状態を初期化する
    pub fn reset(&mut self) {
        self.symbol_table.init();
        self.log = SemanticLog::default();
        self.instructions.clear();
        self.next_register = 0;
    }

    /// 型検査パス。プログラム全体の結果型(VOIDまたはERROR)を返す。
    pub fn check(&mut self, program: &mut Program) -> TypeDescriptor {
        type_checker::check_program(self, program)
    }

    /// コード生成パス。型検査を通過したプログラムだけを受け付ける。
    pub fn generate(&mut self, program: &Program) -> Result<String, CodegenError> {
        code_generator::generate_program(self, program)
    }

    /// コンパイルのメインエントリーポイント
    pub fn compile(&mut self, program: &mut Program) -> Result<String, LangError> {
        // --- フェーズ1: 型検査 ---
        if self.check(program) == TypeDescriptor::Error {
            return Err(LangError::Semantic(self.log.clone()));
        }

        // --- フェーズ2: コード生成 ---
        Ok(self.generate(program)?)
    }

    /// 次に割り当てるレジスタを取り出す。使い切った場合は`None`。
    pub(crate) fn take_register(&mut self) -> Option<char> {
        let register = REGISTERS.chars().nth(self.next_register)?;
        self.next_register += 1;
        Some(register)
    }

    /// 生成済みの命令列を空白区切りの文字列にする
    pub fn code(&self) -> String {
        self.instructions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
