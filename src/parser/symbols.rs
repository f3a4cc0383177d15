//! Symbol and variable-declaration tables.

use crate::INVALID_INDEX;

/// Flag bits attached to symbols.
pub mod symbol_flags {
    pub const IS_TYPE: u8 = 1 << 0;
    pub const IS_CONST: u8 = 1 << 1;
    pub const IS_FUNCTION: u8 = 1 << 2;
    pub const IS_GENERIC_PARAM: u8 = 1 << 3;
    pub const IS_VARIADIC: u8 = 1 << 4;
    pub const HAS_VARIADIC_GENERIC: u8 = 1 << 5;
    pub const IS_ENUM: u8 = 1 << 6;
    pub const IS_ENUM_MEMBER: u8 = 1 << 7;
}

/// Structure-of-arrays symbol table.
///
/// Symbols are appended as declarations are parsed and never removed.
/// Shadowing falls out of the lookup rule: scan from the highest id down
/// and take the first name match whose scope depth does not exceed the
/// current one.
#[derive(Debug, Default)]
pub struct SymbolList<'src> {
    pub names: Vec<&'src str>,
    /// Reference into the `TypeList`; sentinel while unresolved.
    pub type_indices: Vec<u32>,
    /// Scope depth at the declaration site.
    pub scopes: Vec<u32>,
    pub flags: Vec<u8>,
}

impl<'src> SymbolList<'src> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn add(&mut self, name: &'src str, type_index: u32, scope: u32, flags: u8) -> u32 {
        let index = self.names.len() as u32;
        self.names.push(name);
        self.type_indices.push(type_index);
        self.scopes.push(scope);
        self.flags.push(flags);
        index
    }

    /// Inner-scope-first lookup: latest declaration wins among matches
    /// visible from `current_scope`. Returns the sentinel when no symbol
    /// matches.
    pub fn lookup(&self, name: &str, current_scope: u32) -> u32 {
        for i in (0..self.names.len()).rev() {
            if self.names[i] == name && self.scopes[i] <= current_scope {
                return i as u32;
            }
        }
        INVALID_INDEX
    }
}

/// Structure-of-arrays record of variable declarations, kept for
/// observation by the compiler driver.
#[derive(Debug, Default)]
pub struct VarDeclList<'src> {
    pub names: Vec<&'src str>,
    pub type_indices: Vec<u32>,
    /// Initializer expression ids.
    pub init_indices: Vec<u32>,
    pub flags: Vec<u8>,
    pub lines: Vec<u32>,
    pub columns: Vec<u32>,
}

impl<'src> VarDeclList<'src> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add(
        &mut self,
        name: &'src str,
        type_index: u32,
        init_index: u32,
        flags: u8,
        line: u32,
        col: u32,
    ) -> u32 {
        let index = self.names.len() as u32;
        self.names.push(name);
        self.type_indices.push(type_index);
        self.init_indices.push(init_index);
        self.flags.push(flags);
        self.lines.push(line);
        self.columns.push(col);
        index
    }
}
