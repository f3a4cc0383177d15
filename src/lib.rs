//! Front- and middle-end of the Yu language compiler.
//!
//! Source text flows through four stages, each owning its output:
//!
//! 1. [`lexer`] — bytes to a structure-of-arrays token list plus a line
//!    table for line/column mapping.
//! 2. [`parser`] — tokens to an AST with symbol, type, and
//!    variable-declaration tables, accumulating structured
//!    [`diagnostics`] instead of aborting.
//! 3. [`ir`] — a register-based SSA intermediate representation built
//!    through an append-only builder and frozen by `seal()`.
//! 4. [`analysis`] — validators for SSA form, typing, and control flow
//!    over the sealed module.
//!
//! The AST and the IR are deliberately separate: the parser's output is
//! observable to the driver, while the IR is constructed through its own
//! builder API. A small x86-64 emitter ([`codegen`]) lowers a subset of
//! the IR to machine code.
//!
//! All cross-references between tables are `u32` ids with
//! [`INVALID_INDEX`] as the "absent / unresolved" sentinel.
//!
//! ```
//! use yuc::{IRAnalyzer, IRBuilder, IrOp};
//!
//! let mut builder = IRBuilder::new();
//! builder.create_function("answer", &[], IrOp::TypeI32);
//! builder.create_bb();
//! let value = builder.add_instruction(IrOp::TypeI32, &[42]);
//! builder.add_instruction(IrOp::Return, &[value]);
//!
//! let module = builder.seal();
//! let mut analyzer = IRAnalyzer::new(&module);
//! assert!(analyzer.validate_ssa());
//! assert!(analyzer.validate_type());
//! assert!(analyzer.validate_control_flow());
//! ```

pub mod analysis;
pub mod ast;
pub mod codegen;
pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod parser;

// Re-export the core pipeline types for easier access
pub use analysis::IRAnalyzer;
pub use diagnostics::{Diagnostic, Severity};
pub use error::{Result, YucError};
pub use ir::{IRBuilder, IRModule, IrOp};
pub use lexer::{Lexer, Token, TokenKind, TokenList};
pub use parser::Parser;

/// Sentinel for absent or unresolved `u32` ids across all tables.
pub const INVALID_INDEX: u32 = u32::MAX;

/// Runs the front end over one in-memory source buffer.
///
/// Succeeds iff parsing produced zero ERROR/FATAL diagnostics. The
/// parsed tables are discarded; drivers that want to observe them should
/// drive [`Lexer`] and [`Parser`] directly.
pub fn check_source(source: &str, file_name: &str) -> Result<()> {
    let mut lexer = Lexer::new(source);
    lexer.tokenize();
    let mut parser = Parser::new(lexer.tokens(), source, file_name, &lexer);
    parser.parse_program()?;
    Ok(())
}

/// Runs all three IR validators and reports the union of their causes.
pub fn validate_module(module: &IRModule) -> Result<()> {
    let mut analyzer = IRAnalyzer::new(module);
    let ssa = analyzer.validate_ssa();
    let types = analyzer.validate_type();
    let control_flow = analyzer.validate_control_flow();
    if ssa && types && control_flow {
        Ok(())
    } else {
        Err(YucError::ValidationError(
            analyzer.diagnostics().join("; "),
        ))
    }
}
