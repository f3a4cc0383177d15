//! End-to-end pipeline scenarios: lexing and parsing real source,
//! building IR through the builder, validating it, and emitting machine
//! code for the supported subset.

use pretty_assertions::assert_eq;
use yuc::codegen::X86Generator;
use yuc::ir::IRModule;
use yuc::{IRAnalyzer, IRBuilder, IrOp, Lexer, Parser, TokenKind, INVALID_INDEX};

fn assert_all_validators_pass(module: &IRModule) {
    let mut analyzer = IRAnalyzer::new(module);
    assert!(analyzer.validate_ssa(), "ssa: {:?}", analyzer.diagnostics());
    assert!(
        analyzer.validate_type(),
        "types: {:?}",
        analyzer.diagnostics()
    );
    assert!(
        analyzer.validate_control_flow(),
        "control flow: {:?}",
        analyzer.diagnostics()
    );
}

#[test]
fn test_arithmetic_function() {
    let mut builder = IRBuilder::new();
    builder.create_function("arithmetic_test", &[], IrOp::TypeI32);
    builder.create_bb();

    let ten = builder.add_instruction(IrOp::TypeI32, &[10]);
    let five = builder.add_instruction(IrOp::TypeI32, &[5]);
    let two = builder.add_instruction(IrOp::TypeI32, &[2]);
    builder.add_instruction(IrOp::Add, &[ten, five]);
    builder.add_instruction(IrOp::Sub, &[ten, five]);
    builder.add_instruction(IrOp::Mul, &[ten, two]);
    let quotient = builder.add_instruction(IrOp::Div, &[ten, two]);
    builder.add_instruction(IrOp::Return, &[quotient]);

    let module = builder.seal();
    assert_all_validators_pass(&module);

    let dump = module.dump();
    let ret_line = format!("ret %{}", quotient);
    assert!(
        dump.lines().any(|line| line.trim_end().ends_with(&ret_line)),
        "dump missing '{}':\n{}",
        ret_line,
        dump
    );
}

#[test]
fn test_control_flow_function() {
    let mut builder = IRBuilder::new();
    builder.create_function("control_flow_test", &[], IrOp::TypeI32);
    let entry = builder.create_bb();

    let five = builder.add_instruction(IrOp::TypeI32, &[5]);
    let ten = builder.add_instruction(IrOp::TypeI32, &[10]);
    let cond = builder.add_instruction(IrOp::Lt, &[five, ten]);

    let then_bb = builder.create_bb();
    let else_bb = builder.create_bb();
    let merge_bb = builder.create_bb();

    builder.set_current_bb(entry);
    builder.add_instruction(IrOp::Branch, &[cond, then_bb, else_bb]);

    builder.set_current_bb(then_bb);
    let then_value = builder.add_instruction(IrOp::TypeI32, &[42]);
    builder.add_instruction(IrOp::Jump, &[merge_bb]);

    builder.set_current_bb(else_bb);
    let else_value = builder.add_instruction(IrOp::TypeI32, &[24]);
    builder.add_instruction(IrOp::Jump, &[merge_bb]);

    builder.set_current_bb(merge_bb);
    let result = builder.add_instruction(
        IrOp::Phi,
        &[then_value, then_bb, else_value, else_bb],
    );
    builder.add_instruction(IrOp::Return, &[result]);

    let module = builder.seal();
    assert_all_validators_pass(&module);

    let dump = module.dump();
    let phi_lines: Vec<&str> = dump.lines().filter(|l| l.contains("phi")).collect();
    assert_eq!(phi_lines.len(), 1);
    assert!(phi_lines[0].contains("bb1"));
    assert!(phi_lines[0].contains("bb2"));
}

#[test]
fn test_zero_extension_function() {
    let build = |to_type: IrOp| {
        let mut builder = IRBuilder::new();
        builder.create_function("type_conversion_test", &[], IrOp::TypeI64);
        builder.create_bb();
        let value = builder.add_instruction(IrOp::TypeI32, &[42]);
        let widened = builder.add_conversion(IrOp::ZExt, &[value], IrOp::TypeI32, to_type);
        builder.add_instruction(IrOp::Return, &[widened]);
        builder.seal()
    };

    let good = build(IrOp::TypeI64);
    assert_all_validators_pass(&good);

    let bad = build(IrOp::TypeI32);
    let mut analyzer = IRAnalyzer::new(&bad);
    assert!(!analyzer.validate_type());
}

#[test]
fn test_memory_function() {
    let mut builder = IRBuilder::new();
    builder.create_function("memory_test", &[], IrOp::TypeI32);
    builder.create_bb();

    let pointer = builder.add_instruction(IrOp::TypePtr, &[0x1000]);
    let value = builder.add_instruction(IrOp::TypeI32, &[42]);
    builder.add_memory_op(IrOp::MemStore, &[pointer, value], IrOp::TypeI32);
    let loaded = builder.add_memory_op(IrOp::MemLoad, &[pointer], IrOp::TypeI32);
    builder.add_instruction(IrOp::Return, &[loaded]);

    let module = builder.seal();
    assert_all_validators_pass(&module);
}

#[test]
fn test_lexing_nested_generics() {
    let source = "var matrix: Array<Array<Vector3<T>>>;";
    let mut lexer = Lexer::new(source);
    lexer.tokenize();

    let kinds = &lexer.tokens().kinds;
    assert_eq!(
        kinds,
        &vec![
            TokenKind::Var,
            TokenKind::Identifier,
            TokenKind::Colon,
            TokenKind::Identifier,
            TokenKind::Less,
            TokenKind::Identifier,
            TokenKind::Less,
            TokenKind::Identifier,
            TokenKind::Less,
            TokenKind::Identifier,
            TokenKind::Greater,
            TokenKind::Greater,
            TokenKind::Greater,
            TokenKind::Semicolon,
            TokenKind::EndOfFile,
        ]
    );
    assert_eq!(lexer.token_text_at(1), "matrix");
    assert_eq!(lexer.token_text_at(7), "Vector3");
}

#[test]
fn test_parser_literal_inference() {
    let source = "var x = 1.5;\nvar y = 2;\nvar s = \"hi\";";
    let mut lexer = Lexer::new(source);
    lexer.tokenize();
    let mut parser = Parser::new(lexer.tokens(), source, "infer.yu", &lexer);
    parser.parse_program().expect("parse failed");

    let decls = parser.var_decls();
    let types = parser.types();
    assert_eq!(decls.len(), 3);
    assert_eq!(types.names[decls.type_indices[0] as usize], "f64");
    assert_eq!(types.names[decls.type_indices[1] as usize], "i32");
    assert_eq!(types.names[decls.type_indices[2] as usize], "string");
}

#[test]
fn test_front_end_tables_are_consistent() {
    let source = "\
function clamp_low(n: i32, floor: i32) -> i32 {
    if (n - floor) {
        return n;
    }
    return floor;
}
var lowest: i32 = clamp_low(3, 0);
";
    let mut lexer = Lexer::new(source);
    lexer.tokenize();
    let mut parser = Parser::new(lexer.tokens(), source, "clamp.yu", &lexer);
    parser.parse_program().expect("parse failed");

    assert!(parser.ast().validate());
    assert!(parser.errors().is_empty());
    assert!(parser.warnings().is_empty());

    // Every symbol id stored in the AST exists; every type index exists
    // or is the unresolved sentinel.
    let symbol_len = parser.symbols().len() as u32;
    let type_len = parser.types().len() as u32;
    for &symbol in &parser.ast().expressions.symbol_indices {
        assert!(symbol == INVALID_INDEX || symbol < symbol_len);
    }
    for &symbol in &parser.ast().statements.symbol_indices {
        assert!(symbol == INVALID_INDEX || symbol < symbol_len);
    }
    for &ty in &parser.var_decls().type_indices {
        assert!(ty == INVALID_INDEX || ty < type_len);
    }
    for &ty in &parser.symbols().type_indices {
        assert!(ty == INVALID_INDEX || ty < type_len);
    }
}

#[test]
fn test_token_spans_reconstruct_source_length() {
    // No trailing whitespace or comments: the last real token ends at
    // the source boundary, and consecutive spans never overlap.
    let source = "function main() -> void { return; }";
    let mut lexer = Lexer::new(source);
    lexer.tokenize();
    let tokens = lexer.tokens();

    for i in 0..tokens.len() {
        let end = tokens.starts[i] + tokens.lengths[i] as u32;
        assert!(end <= source.len() as u32);
        if i + 1 < tokens.len() {
            assert!(end <= tokens.starts[i + 1]);
        }
    }
    let last_real = tokens.len() - 2;
    assert_eq!(
        tokens.starts[last_real] + tokens.lengths[last_real] as u32,
        source.len() as u32
    );
}

#[test]
fn test_sealed_blocks_partition_instructions() {
    let mut builder = IRBuilder::new();
    builder.create_function("partitioned", &[], IrOp::TypeI32);
    let entry = builder.create_bb();
    let c = builder.add_instruction(IrOp::TypeBool, &[1]);
    let exit_a = builder.create_bb();
    let exit_b = builder.create_bb();
    builder.set_current_bb(entry);
    builder.add_instruction(IrOp::Branch, &[c, exit_a, exit_b]);
    builder.set_current_bb(exit_a);
    let one = builder.add_instruction(IrOp::TypeI32, &[1]);
    builder.add_instruction(IrOp::Return, &[one]);
    builder.set_current_bb(exit_b);
    let two = builder.add_instruction(IrOp::TypeI32, &[2]);
    builder.add_instruction(IrOp::Return, &[two]);

    let module = builder.seal();
    let blocks = module.blocks();
    let instructions = module.instructions();

    for i in 0..instructions.len() {
        assert_eq!(instructions.destinations[i], i as u32);
        let bb = instructions.bb_indices[i] as usize;
        assert!(bb < blocks.len());
    }
    for b in 0..blocks.len() {
        let end = blocks.start_indices[b] + blocks.instruction_counts[b];
        let next = if b + 1 < blocks.len() {
            blocks.start_indices[b + 1]
        } else {
            instructions.len() as u32
        };
        assert_eq!(end, next);
    }
}

#[test]
fn test_emit_constant_function() {
    let mut builder = IRBuilder::new();
    builder.create_function("six", &[], IrOp::TypeI32);
    builder.create_bb();
    let two = builder.add_instruction(IrOp::TypeI32, &[2]);
    let four = builder.add_instruction(IrOp::TypeI32, &[4]);
    let sum = builder.add_instruction(IrOp::Add, &[two, four]);
    builder.add_instruction(IrOp::Return, &[sum]);

    let module = builder.seal();
    assert_all_validators_pass(&module);

    let mut generator = X86Generator::new(&module);
    let block = generator.generate_function(0).expect("codegen failed");
    assert_eq!(&block.code[..4], &[0x55, 0x48, 0x89, 0xe5]);
    assert_eq!(&block.code[block.code.len() - 2..], &[0xc9, 0xc3]);

    let code = generator.finalize();
    assert!(!code.is_empty());
}

#[test]
fn test_diagnostics_render_for_broken_source() {
    let source = "var x: Widget = 1;";
    let mut lexer = Lexer::new(source);
    lexer.tokenize();
    let mut parser = Parser::new(lexer.tokens(), source, "broken.yu", &lexer);
    assert!(parser.parse_program().is_err());

    let errors = parser.errors();
    assert!(!errors.is_empty());
    let rendered = errors[0].render();
    assert!(rendered.contains("--> broken.yu:1:8"));
    assert!(rendered.contains("error[E0433]"));
    assert!(rendered.contains("var x: Widget = 1;"));
}
