//! 変数名から属性(宣言型・割り当てレジスタ)への対応表。
//!
//! 1回のコンパイルごとに新しい表を作り、型検査とコード生成の両方に
//! 渡して使う。ASTの識別子は属性への参照を持たず、`SymbolId`で引く。

use crate::ast::LangType;
use std::collections::HashMap;
use std::fmt::Write;

/// 記号表エントリへのハンドル。宣言順に0から振られる。
/// 別の表が発行したハンドルは`None`になるか、別の名前のエントリを指す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(usize);

/// 変数の属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub lang_type: LangType,
    /// コード生成が宣言順に割り当てるdcのレジスタ
    pub register: Option<char>,
}

impl Attributes {
    pub fn new(lang_type: LangType) -> Self {
        Self {
            lang_type,
            register: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<(String, Attributes)>,
    index: HashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 表を空にして新しいコンパイル単位を始める
    pub fn init(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// 未登録の名前だけを登録する。既に存在すれば何も変えずに`None`を返す。
    pub fn enter(&mut self, name: &str, attributes: Attributes) -> Option<SymbolId> {
        if self.index.contains_key(name) {
            return None;
        }
        let id = SymbolId(self.entries.len());
        self.entries.push((name.to_string(), attributes));
        self.index.insert(name.to_string(), id);
        Some(id)
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.index.get(name).copied()
    }

    pub fn attributes(&self, id: SymbolId) -> Option<&Attributes> {
        self.entries.get(id.0).map(|(_, attributes)| attributes)
    }

    pub fn attributes_mut(&mut self, id: SymbolId) -> Option<&mut Attributes> {
        self.entries.get_mut(id.0).map(|(_, attributes)| attributes)
    }

    pub fn name(&self, id: SymbolId) -> Option<&str> {
        self.entries.get(id.0).map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Attributes> {
        self.lookup(name).and_then(|id| self.attributes(id))
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 宣言順にエントリを列挙する
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attributes)> {
        self.entries
            .iter()
            .map(|(name, attributes)| (name.as_str(), attributes))
    }

    /// 診断用の表形式ダンプ
    pub fn dump(&self) -> String {
        let mut out = String::from("symbol table\n=============\n");
        for (name, attributes) in self.iter() {
            let register = attributes
                .register
                .map_or_else(|| "-".to_string(), |r| r.to_string());
            let _ = writeln!(out, "{name:<12}{:<8}{register}", attributes.lang_type.to_string());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_never_overwrites() {
        let mut table = SymbolTable::new();
        let id = table.enter("a", Attributes::new(LangType::Int)).unwrap();
        assert!(table.enter("a", Attributes::new(LangType::Float)).is_none());
        assert_eq!(table.size(), 1);
        assert_eq!(table.attributes(id).map(|attrs| attrs.lang_type), Some(LangType::Int));
        assert_eq!(table.name(id), Some("a"));
        assert_eq!(table.lookup("a"), Some(id));
        assert_eq!(table.lookup("b"), None);
    }

    #[test]
    fn handles_from_another_table_are_not_found() {
        let mut other = SymbolTable::new();
        other.enter("a", Attributes::new(LangType::Int));
        let foreign = other.enter("b", Attributes::new(LangType::Float)).unwrap();

        let mut table = SymbolTable::new();
        assert!(table.attributes(foreign).is_none());
        assert!(table.attributes_mut(foreign).is_none());
        assert_eq!(table.name(foreign), None);

        table.enter("x", Attributes::new(LangType::Int));
        table.enter("y", Attributes::new(LangType::Int));
        assert_eq!(table.name(foreign), Some("y"));
    }

    #[test]
    fn init_starts_a_fresh_scope() {
        let mut table = SymbolTable::new();
        table.enter("a", Attributes::new(LangType::Int));
        table.init();
        assert!(table.is_empty());
        assert!(table.get("a").is_none());
    }

    #[test]
    fn dump_lists_entries_in_declaration_order() {
        let mut table = SymbolTable::new();
        let b = table.enter("b", Attributes::new(LangType::Float)).unwrap();
        table.enter("a", Attributes::new(LangType::Int));
        table.attributes_mut(b).unwrap().register = Some('a');

        let dump = table.dump();
        let rows: Vec<&str> = dump.lines().skip(2).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("b ") && rows[0].contains("FLOAT") && rows[0].ends_with('a'));
        assert!(rows[1].starts_with("a ") && rows[1].ends_with('-'));
    }
}
