//! Recursive-descent parser for the Yu language.
//!
//! The parser consumes a [`TokenList`] and populates four tables: the
//! [`Ast`] (expressions and statements), the [`SymbolList`], the
//! [`TypeList`], and a [`VarDeclList`] kept for driver observation. The
//! lexer is retained for line/column mapping and token text lookup.
//!
//! Errors become [`Diagnostic`]s. A WARNING accumulates and parsing
//! continues in place; an ERROR triggers synchronization to the next
//! statement boundary; a FATAL aborts the parse. `parse_program` succeeds
//! only if no ERROR or FATAL diagnostics were produced.

pub mod symbols;
pub mod types;

pub use symbols::{symbol_flags, SymbolList, VarDeclList};
pub use types::TypeList;

use crate::ast::{stmt_flags, Ast, NodeKind};
use crate::diagnostics::{diagnostic_flags, Diagnostic, Severity};
use crate::error::{Result, YucError};
use crate::lexer::{Lexer, Token, TokenKind, TokenList};
use crate::INVALID_INDEX;

fn operator_precedence(kind: TokenKind) -> u32 {
    match kind {
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 3,
        TokenKind::Plus | TokenKind::Minus => 2,
        TokenKind::And | TokenKind::Or | TokenKind::Xor => 1,
        _ => 0,
    }
}

/// A borrowing parser over one token stream.
pub struct Parser<'src> {
    lexer: &'src Lexer<'src>,
    tokens: &'src TokenList,
    source: &'src str,
    file_name: &'src str,
    current: usize,
    current_scope: u32,

    ast: Ast<'src>,
    var_decls: VarDeclList<'src>,
    types: TypeList<'src>,
    symbols: SymbolList<'src>,
    warnings: Vec<Diagnostic>,
    errors: Vec<Diagnostic>,
    fatal: bool,
}

impl<'src> Parser<'src> {
    pub fn new(
        tokens: &'src TokenList,
        source: &'src str,
        file_name: &'src str,
        lexer: &'src Lexer<'src>,
    ) -> Self {
        Parser {
            lexer,
            tokens,
            source,
            file_name,
            current: 0,
            current_scope: 0,
            ast: Ast::new(),
            var_decls: VarDeclList::new(),
            types: TypeList::new(),
            symbols: SymbolList::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            fatal: false,
        }
    }

    /// Parses the whole token stream into the AST. Top-level productions
    /// are variable/constant declarations, function declarations, and
    /// bare expression statements.
    pub fn parse_program(&mut self) -> Result<&Ast<'src>> {
        self.ast = Ast::new();
        self.var_decls = VarDeclList::new();
        self.types = TypeList::new();
        self.symbols = SymbolList::new();
        self.warnings.clear();
        self.errors.clear();
        self.fatal = false;
        self.current = 0;
        self.current_scope = 0;

        let mut top_level = Vec::new();
        while !self.is_at_end() && !self.fatal {
            let before = self.current;
            let stmt = match self.peek_kind() {
                TokenKind::Var | TokenKind::Const => self.parse_variable_decl(),
                TokenKind::Function => self.parse_function_decl(),
                TokenKind::EndOfFile => break,
                _ => self.parse_expression_statement(),
            };
            match stmt {
                Some(s) => top_level.push(s),
                // Synchronization may stop on a statement keyword without
                // consuming anything; force progress.
                None if self.current == before => self.advance(),
                None => {}
            }
        }
        self.ast.add_root_block(&top_level, 0, 0);

        if self.fatal || !self.errors.is_empty() {
            return Err(YucError::ParseError(format!(
                "{}: {} error(s)",
                self.file_name,
                self.errors.len()
            )));
        }
        Ok(&self.ast)
    }

    // --- Observers ---

    pub fn ast(&self) -> &Ast<'src> {
        &self.ast
    }

    pub fn var_decls(&self) -> &VarDeclList<'src> {
        &self.var_decls
    }

    pub fn symbols(&self) -> &SymbolList<'src> {
        &self.symbols
    }

    pub fn types(&self) -> &TypeList<'src> {
        &self.types
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    // --- Token cursor ---

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
            || self.tokens.kinds[self.current] == TokenKind::EndOfFile
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens.kinds[self.current.min(self.tokens.len() - 1)]
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens.kinds[(self.current + offset).min(self.tokens.len() - 1)]
    }

    fn current_token(&self) -> Token {
        self.tokens.get(self.current.min(self.tokens.len() - 1))
    }

    fn advance(&mut self) {
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        let matches = !self.is_at_end() && self.tokens.kinds[self.current] == kind;
        if matches {
            self.advance();
        }
        matches
    }

    fn token_text(&self) -> &'src str {
        self.lexer.token_text(self.current_token())
    }

    fn line_col_at(&self, token_index: usize) -> (u32, u32) {
        self.lexer
            .line_col(self.tokens.get(token_index.min(self.tokens.len() - 1)))
    }

    // --- Declarations ---

    fn parse_variable_decl(&mut self) -> Option<u32> {
        let is_const = self.match_kind(TokenKind::Const);
        if !is_const && !self.match_kind(TokenKind::Var) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected 'var' or 'const' at the start of variable declaration",
                "Use 'var' or 'const' when declaring a variable",
            );
            return None;
        }

        if self.peek_kind() != TokenKind::Identifier {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected identifier after 'var' or 'const'",
                "Provide a valid variable name",
            );
            return None;
        }
        let name = self.token_text();
        let name_token = self.current;
        self.advance();

        let mut type_index = INVALID_INDEX;
        if self.match_kind(TokenKind::Colon) {
            type_index = self.parse_type()?;
        }

        if !self.match_kind(TokenKind::Equal) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected '=' for variable initialization",
                "Use '=' to assign a value to the variable",
            );
            return None;
        }

        let init_index = self.parse_expression()?;

        if type_index == INVALID_INDEX {
            type_index = self.infer_type(init_index);
            if type_index == INVALID_INDEX {
                self.error_here(
                    diagnostic_flags::TYPE_MISMATCH,
                    "Unable to infer type for variable",
                    "Provide an explicit type annotation",
                );
                return None;
            }
        }

        let flags = if is_const { stmt_flags::IS_CONST } else { 0 };
        let sym_flags = if is_const { symbol_flags::IS_CONST } else { 0 };
        let symbol_index = self
            .symbols
            .add(name, type_index, self.current_scope, sym_flags);

        let (line, col) = self.line_col_at(name_token);
        self.var_decls
            .add(name, type_index, init_index, flags, line, col);

        if !self.match_kind(TokenKind::Semicolon) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected ';' at the end of variable declaration",
                "Add ';' to complete the variable declaration",
            );
            return None;
        }

        Some(self.ast.statements.add_var_decl(
            name,
            type_index,
            init_index,
            symbol_index,
            flags,
            line,
            col,
        ))
    }

    fn parse_function_decl(&mut self) -> Option<u32> {
        self.advance(); // 'function'

        let mut generic_start = 0;
        let mut generic_count = 0;
        let mut has_variadic_generic = false;
        if self.peek_kind() == TokenKind::Less {
            let (start, count, variadic) = self.parse_generic_params()?;
            generic_start = start;
            generic_count = count;
            has_variadic_generic = variadic;
        }

        if self.peek_kind() != TokenKind::Identifier {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected function name",
                "Provide a valid function name",
            );
            return None;
        }
        let name = self.token_text();
        let name_token = self.current;

        // The function symbol exists before the body is parsed so the
        // name is visible for recursion.
        let mut func_flags = symbol_flags::IS_FUNCTION;
        if has_variadic_generic {
            func_flags |= symbol_flags::HAS_VARIADIC_GENERIC;
        }
        let func_symbol = self
            .symbols
            .add(name, INVALID_INDEX, self.current_scope, func_flags);
        self.advance();

        if !self.match_kind(TokenKind::LeftParen) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected '(' to start parameter list",
                "Open parameter list with '('",
            );
            return None;
        }

        let mut param_type_ids = Vec::new();
        let mut param_symbols = Vec::new();
        while self.peek_kind() != TokenKind::RightParen && !self.is_at_end() {
            if self.peek_kind() != TokenKind::Identifier {
                self.error_here(
                    diagnostic_flags::UNEXPECTED_TOKEN,
                    "Expected parameter name",
                    "Provide a valid parameter name",
                );
                return None;
            }
            let param_name = self.token_text();
            self.advance();

            if !self.match_kind(TokenKind::Colon) {
                self.error_here(
                    diagnostic_flags::UNEXPECTED_TOKEN,
                    "Expected ':' after parameter name",
                    "Provide type annotation for parameter",
                );
                return None;
            }

            let param_type = self.parse_type()?;

            // Parameters live in the body's inner scope.
            let param_symbol =
                self.symbols
                    .add(param_name, param_type, self.current_scope + 1, 0);
            param_symbols.push(param_symbol);
            param_type_ids.push(param_type);

            if !self.match_kind(TokenKind::Comma) && self.peek_kind() != TokenKind::RightParen {
                break;
            }
        }

        if !self.match_kind(TokenKind::RightParen) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected ')' to close parameter list",
                "Close parameter list with ')'",
            );
            return None;
        }

        // The arrow is two tokens: '-' then '>'.
        if !self.match_kind(TokenKind::Minus) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected '->' before return type",
                "Specify return type with '->'",
            );
            return None;
        }
        if !self.match_kind(TokenKind::Greater) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected '>' to complete return type arrow",
                "Complete return type specification with '->'",
            );
            return None;
        }

        let return_type = self.parse_type()?;
        self.symbols.type_indices[func_symbol as usize] = return_type;

        let param_start = self.types.function_params.len() as u32;
        let param_count = param_type_ids.len() as u32;
        self.types.function_params.extend_from_slice(&param_type_ids);
        let function_type_index = self
            .types
            .add_function(param_start, param_count, return_type);
        self.types.generic_starts[function_type_index as usize] = generic_start;
        self.types.generic_counts[function_type_index as usize] = generic_count;

        if self.peek_kind() != TokenKind::LeftBrace {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected '{' to start function body",
                "Open function body with '{'",
            );
            return None;
        }
        let body_index = self.parse_block_statement()?;

        let (line, col) = self.line_col_at(name_token);
        Some(self.ast.statements.add_function(
            name,
            function_type_index,
            &param_symbols,
            body_index,
            line,
            col,
        ))
    }

    /// Parses `<...>` at a declaration site. Returns the slice of the
    /// flat `generic_params` array holding the parameter symbol ids and
    /// whether a `...` variadic marker was seen.
    fn parse_generic_params(&mut self) -> Option<(u32, u32, bool)> {
        if !self.match_kind(TokenKind::Less) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected '<' to start generic parameters",
                "Open generic parameters with '<'",
            );
            return None;
        }

        let mut param_ids = Vec::new();
        let mut has_variadic = false;
        while self.peek_kind() != TokenKind::Greater && !self.is_at_end() {
            // `...` marks the next parameter variadic; one per list.
            let mut variadic = false;
            if self.peek_kind() == TokenKind::Dot
                && self.peek_kind_at(1) == TokenKind::Dot
                && self.peek_kind_at(2) == TokenKind::Dot
            {
                if has_variadic {
                    self.error_here(
                        diagnostic_flags::INVALID_SYNTAX,
                        "Multiple variadic generic parameters",
                        "Only one variadic generic parameter is allowed",
                    );
                    return None;
                }
                has_variadic = true;
                variadic = true;
                self.advance();
                self.advance();
                self.advance();
            }

            if self.peek_kind() != TokenKind::Identifier {
                self.error_here(
                    diagnostic_flags::UNEXPECTED_TOKEN,
                    "Expected identifier in generic parameters",
                    "Provide a valid identifier for generic parameter",
                );
                return None;
            }
            let param_name = self.token_text();
            let (line, col) = self.line_col_at(self.current);

            let mut sym_flags = symbol_flags::IS_GENERIC_PARAM;
            if variadic {
                sym_flags |= symbol_flags::IS_VARIADIC;
            }
            let symbol_index =
                self.symbols
                    .add(param_name, INVALID_INDEX, self.current_scope, sym_flags);
            self.advance();

            let mut nested = INVALID_INDEX;
            if self.peek_kind() == TokenKind::Less {
                let (nested_start, _, _) = self.parse_generic_params()?;
                nested = nested_start;
            }

            self.ast
                .expressions
                .add_generic_param(param_name, symbol_index, variadic, line, col, nested);
            param_ids.push(symbol_index);

            if self.peek_kind() == TokenKind::Comma {
                self.advance();
            } else if self.peek_kind() != TokenKind::Greater {
                self.error_here(
                    diagnostic_flags::UNEXPECTED_TOKEN,
                    "Expected ',' or '>' in generic parameters",
                    "Separate generic parameters with ',' or close with '>'",
                );
                return None;
            }
        }

        if !self.match_kind(TokenKind::Greater) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected '>' to close generic parameters",
                "Close generic parameters with '>'",
            );
            return None;
        }

        // Nested lists have already appended their own ids; extending
        // here keeps this list's slice contiguous.
        let start = self.types.generic_params.len() as u32;
        self.types.generic_params.extend_from_slice(&param_ids);
        Some((start, param_ids.len() as u32, has_variadic))
    }

    // --- Types ---

    fn parse_type(&mut self) -> Option<u32> {
        match self.peek_kind() {
            TokenKind::U8
            | TokenKind::I8
            | TokenKind::U16
            | TokenKind::I16
            | TokenKind::U32
            | TokenKind::I32
            | TokenKind::U64
            | TokenKind::I64
            | TokenKind::F32
            | TokenKind::F64
            | TokenKind::String
            | TokenKind::Boolean
            | TokenKind::Void => {
                let name = self.token_text();
                self.advance();
                Some(self.types.add_simple(name))
            }

            TokenKind::Ptr => {
                let name = self.token_text();
                self.advance();

                if self.match_kind(TokenKind::Less) {
                    let mut args = Vec::new();
                    loop {
                        let arg = self.parse_type()?;
                        args.push(arg);
                        if !self.match_kind(TokenKind::Comma) {
                            break;
                        }
                    }
                    if !self.match_kind(TokenKind::Greater) {
                        self.error_here(
                            diagnostic_flags::UNEXPECTED_TOKEN,
                            "Expected '>' to close generic type parameters",
                            "Close generic type parameters with '>'",
                        );
                        return None;
                    }
                    // Nested pointer types append their own arguments
                    // first; extend afterwards so this slice stays whole.
                    let start = self.types.generic_params.len() as u32;
                    let count = args.len() as u32;
                    self.types.generic_params.extend_from_slice(&args);
                    Some(self.types.add_generic(name, start, count))
                } else {
                    Some(self.types.add_simple(name))
                }
            }

            TokenKind::Identifier => {
                let name = self.token_text();
                let symbol_index = self.symbols.lookup(name, self.current_scope);
                if symbol_index != INVALID_INDEX
                    && self.symbols.flags[symbol_index as usize]
                        & (symbol_flags::IS_TYPE | symbol_flags::IS_GENERIC_PARAM)
                        != 0
                {
                    self.advance();
                    return Some(self.types.add_simple(name));
                }

                self.error_here(
                    diagnostic_flags::UNRESOLVED_SYMBOL,
                    "Unrecognized type",
                    "Use a valid type or define the type before use",
                );
                None
            }

            _ => {
                self.error_here(
                    diagnostic_flags::UNRESOLVED_SYMBOL,
                    "Unrecognized type",
                    "Use a valid type or define the type before use",
                );
                None
            }
        }
    }

    // --- Statements ---

    fn parse_statement(&mut self) -> Option<u32> {
        match self.peek_kind() {
            TokenKind::If => self.parse_if_statement(),
            TokenKind::LeftBrace => self.parse_block_statement(),
            TokenKind::Var | TokenKind::Const => self.parse_variable_decl(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_if_statement(&mut self) -> Option<u32> {
        let if_token = self.current;
        self.advance(); // 'if'

        if !self.match_kind(TokenKind::LeftParen) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected '(' after 'if'",
                "Open condition with '('",
            );
            return None;
        }

        let condition = self.parse_expression()?;

        if !self.match_kind(TokenKind::RightParen) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected ')' after condition",
                "Close condition with ')'",
            );
            return None;
        }

        let then_branch = self.parse_statement()?;
        let mut else_branch = INVALID_INDEX;
        if self.match_kind(TokenKind::Else) {
            else_branch = self.parse_statement()?;
        }

        let (line, col) = self.line_col_at(if_token);
        Some(self
            .ast
            .statements
            .add_if(condition, then_branch, else_branch, line, col))
    }

    fn parse_block_statement(&mut self) -> Option<u32> {
        let brace_token = self.current;
        self.advance(); // '{'
        self.current_scope += 1;
        let inner_scope = self.current_scope;

        let mut stmts = Vec::new();
        while self.peek_kind() != TokenKind::RightBrace && !self.is_at_end() && !self.fatal {
            let before = self.current;
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None if self.current == before => self.advance(),
                None => {}
            }
        }

        let closed = self.match_kind(TokenKind::RightBrace);
        self.current_scope -= 1;
        if !closed {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected '}' to close block",
                "Close the block with '}'",
            );
            return None;
        }

        let (line, col) = self.line_col_at(brace_token);
        Some(self.ast.statements.add_block(&stmts, inner_scope, line, col))
    }

    fn parse_return_statement(&mut self) -> Option<u32> {
        let return_token = self.current;
        self.advance(); // 'return'

        let mut value_index = INVALID_INDEX;
        if self.peek_kind() != TokenKind::Semicolon {
            value_index = self.parse_expression()?;
        }

        if !self.match_kind(TokenKind::Semicolon) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected ';' after return statement",
                "End return statement with ';'",
            );
            return None;
        }

        let (line, col) = self.line_col_at(return_token);
        Some(self.ast.statements.add_return(value_index, line, col))
    }

    fn parse_expression_statement(&mut self) -> Option<u32> {
        let first_token = self.current;
        let expr_index = self.parse_expression()?;

        if !self.match_kind(TokenKind::Semicolon) {
            self.error_here(
                diagnostic_flags::UNEXPECTED_TOKEN,
                "Expected ';' after expression",
                "End expression statement with ';'",
            );
            return None;
        }

        let (line, col) = self.line_col_at(first_token);
        Some(self.ast.statements.add_expression(expr_index, line, col))
    }

    // --- Expressions ---

    fn parse_expression(&mut self) -> Option<u32> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, precedence: u32) -> Option<u32> {
        let mut left = self.parse_unary()?;

        while !self.is_at_end() {
            let op = self.peek_kind();
            let op_precedence = operator_precedence(op);
            if op_precedence <= precedence {
                break;
            }

            let op_token = self.current;
            self.advance();
            let right = self.parse_binary(op_precedence)?;
            let (line, col) = self.line_col_at(op_token);
            left = self.ast.expressions.add_binary(left, op, right, line, col);
        }

        Some(left)
    }

    fn parse_unary(&mut self) -> Option<u32> {
        if self.peek_kind() == TokenKind::Minus || self.peek_kind() == TokenKind::Bang {
            let op = self.peek_kind();
            let op_token = self.current;
            self.advance();
            let operand = self.parse_unary()?;
            let (line, col) = self.line_col_at(op_token);
            return Some(self.ast.expressions.add_unary(op, operand, line, col));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Option<u32> {
        let (line, col) = self.line_col_at(self.current);
        match self.peek_kind() {
            TokenKind::NumLiteral
            | TokenKind::StrLiteral
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Nil => {
                let value = self.token_text();
                self.advance();
                Some(self.ast.expressions.add_literal(value, line, col))
            }

            TokenKind::Identifier => {
                let name = self.token_text();
                let symbol_index = self.symbols.lookup(name, self.current_scope);
                self.advance();

                if self.match_kind(TokenKind::LeftParen) {
                    let mut args = Vec::new();
                    if self.peek_kind() != TokenKind::RightParen {
                        loop {
                            let arg = self.parse_expression()?;
                            args.push(arg);
                            if !self.match_kind(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    if !self.match_kind(TokenKind::RightParen) {
                        self.error_here(
                            diagnostic_flags::UNEXPECTED_TOKEN,
                            "Expected ')' after call arguments",
                            "Close the argument list with ')'",
                        );
                        return None;
                    }
                    let callee = self
                        .ast
                        .expressions
                        .add_variable(name, symbol_index, line, col);
                    return Some(self.ast.expressions.add_call(callee, &args, line, col));
                }

                Some(self
                    .ast
                    .expressions
                    .add_variable(name, symbol_index, line, col))
            }

            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                if !self.match_kind(TokenKind::RightParen) {
                    self.error_here(
                        diagnostic_flags::UNEXPECTED_TOKEN,
                        "Expected closing parenthesis ')'",
                        "Close the parenthesized expression with ')'",
                    );
                    return None;
                }
                Some(inner)
            }

            _ => {
                self.error_here(
                    diagnostic_flags::UNEXPECTED_TOKEN,
                    "Expected expression",
                    "Provide a valid literal or expression",
                );
                None
            }
        }
    }

    // --- Type inference ---

    /// Infers a `TypeList` row for an unannotated declaration from the
    /// shape of its initializer. Returns the sentinel when nothing can be
    /// concluded.
    fn infer_type(&mut self, expr_index: u32) -> u32 {
        if expr_index as usize >= self.ast.expressions.len() {
            return INVALID_INDEX;
        }

        match self.ast.expressions.kinds[expr_index as usize] {
            NodeKind::Literal => {
                let value = self.ast.expressions.literal_values[expr_index as usize];
                if value.starts_with('"') {
                    self.primitive_type_index("string")
                } else if value == "true" || value == "false" || value == "null" {
                    self.primitive_type_index("bool")
                } else if value.contains('.') {
                    self.primitive_type_index("f64")
                } else {
                    let digits = value.trim_start_matches(['+', '-']);
                    let magnitude = digits.parse::<u64>().unwrap_or(0);
                    if magnitude <= i32::MAX as u64 {
                        self.primitive_type_index("i32")
                    } else {
                        self.primitive_type_index("i64")
                    }
                }
            }

            NodeKind::Variable => {
                let symbol_index = self.ast.expressions.symbol_indices[expr_index as usize];
                if symbol_index == INVALID_INDEX {
                    return INVALID_INDEX;
                }
                self.symbols.type_indices[symbol_index as usize]
            }

            _ => INVALID_INDEX,
        }
    }

    /// Row for a primitive type name, reusing an existing row when one
    /// was already created.
    fn primitive_type_index(&mut self, name: &'static str) -> u32 {
        match self.types.find_by_name(name) {
            Some(index) => index,
            None => self.types.add_simple(name),
        }
    }

    // --- Diagnostics ---

    fn error_here(&mut self, flags: u8, message: &str, suggestion: &str) {
        let diagnostic =
            self.create_diagnostic(flags, Severity::Error, message, suggestion, self.current);
        self.report(diagnostic);
    }

    /// Builds a diagnostic anchored at `token_index`, capturing the
    /// source line and a caret aligned under the token.
    pub fn create_diagnostic(
        &self,
        flags: u8,
        severity: Severity,
        message: &str,
        suggestion: &str,
        token_index: usize,
    ) -> Diagnostic {
        let token = self.tokens.get(token_index.min(self.tokens.len() - 1));
        let (line, column) = self.lexer.line_col(token);
        Diagnostic {
            flags,
            severity,
            message: message.to_string(),
            suggestion: suggestion.to_string(),
            filename: self.file_name.to_string(),
            line,
            column,
            source_line: self.source_line_of(line),
            caret: self.create_caret(token),
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => self.warnings.push(diagnostic),
            Severity::Error => {
                self.errors.push(diagnostic);
                self.synchronize();
            }
            Severity::Fatal => {
                self.errors.push(diagnostic);
                self.fatal = true;
            }
        }
    }

    /// Consumes tokens until just past the next `;` or up to a token
    /// that can start a statement.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::Function
                | TokenKind::Var
                | TokenKind::Const
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::RightBrace => return,
                _ => self.advance(),
            }
        }
    }

    fn source_line_of(&self, line_number: u32) -> String {
        let bytes = self.source.as_bytes();
        let mut pos = 0usize;
        let mut current_line = 1u32;
        while current_line < line_number && pos < bytes.len() {
            if bytes[pos] == b'\n' {
                current_line += 1;
            }
            pos += 1;
        }

        let mut end = pos;
        while end < bytes.len() && bytes[end] != b'\n' {
            end += 1;
        }

        String::from_utf8_lossy(&bytes[pos..end]).into_owned()
    }

    fn create_caret(&self, token: Token) -> String {
        let bytes = self.source.as_bytes();
        let start = token.start as usize;
        let mut line_start = start.min(bytes.len());
        while line_start > 0 && bytes[line_start - 1] != b'\n' {
            line_start -= 1;
        }

        let col = start - line_start;
        let mut caret = " ".repeat(col);
        caret.push('^');
        caret.push_str(&"~".repeat((token.length as usize).saturating_sub(1)));
        caret
    }
}
