//! Structure-of-arrays type table.

use crate::INVALID_INDEX;

/// Every type expression the parser has seen, one row per appearance.
///
/// A row always has a name. Two optional shapes hang off it: a generic
/// head `(generic_start, generic_count)` slicing the flat
/// `generic_params` array, and a function shape `(function_param_start,
/// function_param_count, function_return_type)` slicing the flat
/// `function_params` array. Rows without a shape hold zero counts and
/// sentinels. Type annotations are appended per appearance and never
/// deduplicated; inference reuses rows by name lookup.
#[derive(Debug, Default)]
pub struct TypeList<'src> {
    pub names: Vec<&'src str>,

    pub generic_starts: Vec<u32>,
    pub generic_counts: Vec<u32>,
    /// Flat child ids referenced by generic heads. Entries are type ids
    /// for pointer generic arguments and symbol ids for declaration-site
    /// generic parameter lists.
    pub generic_params: Vec<u32>,

    pub function_param_starts: Vec<u32>,
    pub function_param_counts: Vec<u32>,
    /// Flat parameter type ids referenced by function shapes.
    pub function_params: Vec<u32>,
    pub function_return_types: Vec<u32>,
}

impl<'src> TypeList<'src> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Adds a shapeless row (primitive or named type).
    pub fn add_simple(&mut self, name: &'src str) -> u32 {
        self.add_row(name, 0, 0, INVALID_INDEX, 0, INVALID_INDEX)
    }

    /// Adds a row with a generic head over `generic_params`.
    pub fn add_generic(&mut self, name: &'src str, generic_start: u32, generic_count: u32) -> u32 {
        self.add_row(name, generic_start, generic_count, INVALID_INDEX, 0, INVALID_INDEX)
    }

    /// Adds a function-shaped row over `function_params`.
    pub fn add_function(&mut self, param_start: u32, param_count: u32, return_type: u32) -> u32 {
        self.add_row("function", 0, 0, param_start, param_count, return_type)
    }

    fn add_row(
        &mut self,
        name: &'src str,
        generic_start: u32,
        generic_count: u32,
        function_param_start: u32,
        function_param_count: u32,
        function_return_type: u32,
    ) -> u32 {
        let index = self.names.len() as u32;
        self.names.push(name);
        self.generic_starts.push(generic_start);
        self.generic_counts.push(generic_count);
        self.function_param_starts.push(function_param_start);
        self.function_param_counts.push(function_param_count);
        self.function_return_types.push(function_return_type);
        index
    }

    /// First row with the given name, if any.
    pub fn find_by_name(&self, name: &str) -> Option<u32> {
        self.names.iter().position(|n| *n == name).map(|i| i as u32)
    }

    /// Child ids of a row's generic head.
    pub fn generic_args(&self, index: u32) -> &[u32] {
        let start = self.generic_starts[index as usize] as usize;
        let count = self.generic_counts[index as usize] as usize;
        &self.generic_params[start..start + count]
    }

    /// Parameter type ids of a function-shaped row.
    pub fn function_param_types(&self, index: u32) -> &[u32] {
        let start = self.function_param_starts[index as usize] as usize;
        let count = self.function_param_counts[index as usize] as usize;
        &self.function_params[start..start + count]
    }

    /// Whether the row carries a function shape.
    pub fn is_function(&self, index: u32) -> bool {
        self.function_param_starts[index as usize] != INVALID_INDEX
    }
}
