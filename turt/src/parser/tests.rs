//! Parser tests for TurtLang

use crate::ast::{BinOp, Expr, Literal, LogicalOp, Program, Stmt, UnOp};
use crate::error::CompileError;
use crate::lexer::tokenize;
use crate::parser::{parse, MAX_NESTING};

/// Helper to parse a program and return the AST
fn parse_program(source: &str) -> Result<Program, Vec<CompileError>> {
    parse(tokenize(source)?)
}

/// Helper to parse and expect success
fn parse_ok(source: &str) -> Program {
    parse_program(source).expect("Parse should succeed")
}

/// Helper to parse and expect failure
fn parse_errors(source: &str) -> Vec<CompileError> {
    parse_program(source).expect_err("Parse should fail")
}

/// Expression of the single expression statement in `source`
fn expr_of(source: &str) -> Expr {
    let prog = parse_ok(source);
    assert_eq!(prog.statements.len(), 1);
    match &prog.statements[0].node {
        Stmt::Expression(e) => e.node.clone(),
        other => panic!("Expected expression statement, got {:?}", other),
    }
}

// ============================================
// Expressions and precedence
// ============================================

#[test]
fn test_parse_number_literal() {
    assert!(matches!(expr_of("42;"), Expr::Literal(Literal::Number(n)) if n == 42.0));
}

#[test]
fn test_parse_keyword_literals() {
    assert!(matches!(expr_of("true;"), Expr::Literal(Literal::Bool(true))));
    assert!(matches!(expr_of("false;"), Expr::Literal(Literal::Bool(false))));
    assert!(matches!(expr_of("null;"), Expr::Literal(Literal::Null)));
}

#[test]
fn test_factor_binds_tighter_than_term() {
    // 1 + 2 * 3  =>  1 + (2 * 3)
    match expr_of("1 + 2 * 3;") {
        Expr::Binary { op: BinOp::Add, right, .. } => {
            assert!(matches!(right.node, Expr::Binary { op: BinOp::Mul, .. }));
        }
        other => panic!("Expected addition, got {:?}", other),
    }
}

#[test]
fn test_term_is_left_associative() {
    // 1 - 2 - 3  =>  (1 - 2) - 3
    match expr_of("1 - 2 - 3;") {
        Expr::Binary { op: BinOp::Sub, left, right } => {
            assert!(matches!(left.node, Expr::Binary { op: BinOp::Sub, .. }));
            assert!(matches!(right.node, Expr::Literal(Literal::Number(n)) if n == 3.0));
        }
        other => panic!("Expected subtraction, got {:?}", other),
    }
}

#[test]
fn test_comparison_below_equality() {
    // 1 < 2 == true  =>  (1 < 2) == true
    match expr_of("1 < 2 == true;") {
        Expr::Binary { op: BinOp::Eq, left, .. } => {
            assert!(matches!(left.node, Expr::Binary { op: BinOp::Lt, .. }));
        }
        other => panic!("Expected equality, got {:?}", other),
    }
}

#[test]
fn test_logical_operators_share_one_left_associative_level() {
    // a or b and c  =>  (a or b) and c
    match expr_of("a or b and c;") {
        Expr::Logical { op: LogicalOp::And, left, .. } => {
            assert!(matches!(left.node, Expr::Logical { op: LogicalOp::Or, .. }));
        }
        other => panic!("Expected and, got {:?}", other),
    }
}

#[test]
fn test_logical_below_equality() {
    match expr_of("a == 1 or b;") {
        Expr::Logical { op: LogicalOp::Or, left, .. } => {
            assert!(matches!(left.node, Expr::Binary { op: BinOp::Eq, .. }));
        }
        other => panic!("Expected or, got {:?}", other),
    }
}

#[test]
fn test_unary_nests() {
    match expr_of("!-x;") {
        Expr::Unary { op: UnOp::Not, expr } => {
            assert!(matches!(expr.node, Expr::Unary { op: UnOp::Neg, .. }));
        }
        other => panic!("Expected not, got {:?}", other),
    }
}

#[test]
fn test_assignment_is_right_associative() {
    match expr_of("a = b = 3;") {
        Expr::Assign { name, value } => {
            assert_eq!(name, "a");
            assert!(matches!(value.node, Expr::Assign { ref name, .. } if name == "b"));
        }
        other => panic!("Expected assignment, got {:?}", other),
    }
}

#[test]
fn test_invalid_assignment_target_is_reported() {
    let errors = parse_errors("1 + 2 = 3;");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message(), "Invalid assignment target.");
    assert_eq!(errors[0].to_string(), "[line 1] Error at '=': Invalid assignment target.");
}

#[test]
fn test_index_assignment_is_not_a_target() {
    let errors = parse_errors("var a = [1]; a[0] = 2;");
    assert_eq!(errors[0].message(), "Invalid assignment target.");
}

#[test]
fn test_chained_calls() {
    match expr_of("f(1)(2, 3);") {
        Expr::Call { callee, args } => {
            assert_eq!(args.len(), 2);
            assert!(matches!(callee.node, Expr::Call { .. }));
        }
        other => panic!("Expected call, got {:?}", other),
    }
}

#[test]
fn test_call_without_arguments() {
    match expr_of("getX();") {
        Expr::Call { callee, args } => {
            assert!(args.is_empty());
            assert!(matches!(callee.node, Expr::Var(ref n) if n == "getX"));
        }
        other => panic!("Expected call, got {:?}", other),
    }
}

#[test]
fn test_array_literal_and_index() {
    match expr_of("[1, \"two\", [3]][-1];") {
        Expr::Index { target, index } => {
            assert!(matches!(target.node, Expr::Array(ref items) if items.len() == 3));
            assert!(matches!(index.node, Expr::Unary { op: UnOp::Neg, .. }));
        }
        other => panic!("Expected index, got {:?}", other),
    }
}

#[test]
fn test_empty_array_literal() {
    assert!(matches!(expr_of("[];"), Expr::Array(ref items) if items.is_empty()));
}

#[test]
fn test_grouping() {
    match expr_of("(1 + 2) * 3;") {
        Expr::Binary { op: BinOp::Mul, left, .. } => {
            assert!(matches!(left.node, Expr::Grouping(_)));
        }
        other => panic!("Expected multiplication, got {:?}", other),
    }
}

// ============================================
// Statements
// ============================================

#[test]
fn test_var_without_initializer() {
    let prog = parse_ok("var x;");
    match &prog.statements[0].node {
        Stmt::Var { name, initializer } => {
            assert_eq!(name.node, "x");
            assert!(initializer.is_none());
        }
        other => panic!("Expected var, got {:?}", other),
    }
}

#[test]
fn test_function_declaration() {
    let prog = parse_ok("function add(a, b) { return a + b; }");
    match &prog.statements[0].node {
        Stmt::Function(decl) => {
            assert_eq!(decl.name.node, "add");
            let params: Vec<_> = decl.params.iter().map(|p| p.node.as_str()).collect();
            assert_eq!(params, vec!["a", "b"]);
            assert!(matches!(decl.body[0].node, Stmt::Return(Some(_))));
        }
        other => panic!("Expected function, got {:?}", other),
    }
}

#[test]
fn test_if_else() {
    let prog = parse_ok("if (x) print(1); else { print(2); }");
    match &prog.statements[0].node {
        Stmt::If { else_branch, .. } => {
            let else_branch = else_branch.as_ref().expect("else branch");
            assert!(matches!(else_branch.node, Stmt::Block(_)));
        }
        other => panic!("Expected if, got {:?}", other),
    }
}

#[test]
fn test_return_without_value() {
    let prog = parse_ok("function f() { return; }");
    match &prog.statements[0].node {
        Stmt::Function(decl) => assert!(matches!(decl.body[0].node, Stmt::Return(None))),
        other => panic!("Expected function, got {:?}", other),
    }
}

#[test]
fn test_for_desugars_to_block_with_while() {
    let prog = parse_ok("for (var i = 0; i < 3; i = i + 1) { print(i); }");
    let Stmt::Block(outer) = &prog.statements[0].node else {
        panic!("Expected block");
    };
    assert_eq!(outer.len(), 2);
    assert!(matches!(outer[0].node, Stmt::Var { .. }));
    let Stmt::While { cond, body } = &outer[1].node else {
        panic!("Expected while");
    };
    assert!(matches!(cond.node, Expr::Binary { op: BinOp::Lt, .. }));
    let Stmt::Block(inner) = &body.node else {
        panic!("Expected block body");
    };
    assert_eq!(inner.len(), 2);
    assert!(matches!(inner[0].node, Stmt::Block(_)));
    assert!(matches!(
        inner[1].node,
        Stmt::Expression(ref e) if matches!(e.node, Expr::Assign { .. })
    ));
}

#[test]
fn test_for_without_clauses_loops_on_true() {
    let prog = parse_ok("for (;;) x;");
    match &prog.statements[0].node {
        Stmt::While { cond, body } => {
            assert!(matches!(cond.node, Expr::Literal(Literal::Bool(true))));
            assert!(matches!(body.node, Stmt::Expression(_)));
        }
        other => panic!("Expected bare while, got {:?}", other),
    }
}

#[test]
fn test_statement_lines() {
    let prog = parse_ok("var a = 1;\n\nvar b = 2;");
    assert_eq!(prog.statements[0].span.line, 1);
    assert_eq!(prog.statements[1].span.line, 3);
}

// ============================================
// Error recovery
// ============================================

#[test]
fn test_missing_semicolon() {
    let errors = parse_errors("var x = 1");
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "[line 1] Error at end: Expected ';' after variable declaration."
    );
}

#[test]
fn test_multiple_errors_reported_in_one_pass() {
    let errors = parse_errors("var = 1;\nprint(2);\nvar y = ;\nwhile x) {}");
    let lines: Vec<_> = errors.iter().filter_map(|e| e.line()).collect();
    assert_eq!(lines, vec![1, 3, 4]);
    assert_eq!(errors[0].message(), "Expected variable name.");
    assert_eq!(errors[1].message(), "Expected an expression.");
    assert_eq!(errors[2].message(), "Expected '(' after 'while'.");
}

#[test]
fn test_error_inside_block_recovers_within_block() {
    let errors = parse_errors("{ var = 1; print(1); }\nvar ok = 2 2;");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].line(), Some(1));
    assert_eq!(errors[1].line(), Some(2));
}

#[test]
fn test_unclosed_block() {
    let errors = parse_errors("{ print(1);");
    assert_eq!(errors[0].message(), "Expected '}' after block.");
}

#[test]
fn test_function_parameter_error() {
    let errors = parse_errors("function f(a, 1) {}");
    assert_eq!(errors[0].message(), "Expected parameter name.");
}

#[test]
fn test_dot_is_not_an_expression() {
    let errors = parse_errors(".;");
    assert_eq!(errors[0].to_string(), "[line 1] Error at '.': Expected an expression.");
}

// ============================================
// Nesting limit
// ============================================

/// Exactly one "Too much nesting." error, and nothing else
fn assert_too_deep(source: &str) {
    let errors = parse_errors(source);
    assert_eq!(errors.len(), 1, "{:?}", errors.first());
    assert_eq!(errors[0].message(), "Too much nesting.");
}

#[test]
fn test_deep_blocks_are_rejected() {
    let source = format!("{}{}", "{".repeat(20_000), "}".repeat(20_000));
    assert_too_deep(&source);
}

#[test]
fn test_deep_if_chain_is_rejected() {
    let source = format!("{}print(1);", "if (true) ".repeat(20_000));
    assert_too_deep(&source);
}

#[test]
fn test_deep_function_nesting_is_rejected() {
    let source = format!("{}{}", "function f() { ".repeat(5_000), "}".repeat(5_000));
    assert_too_deep(&source);
}

#[test]
fn test_deep_expressions_are_rejected() {
    assert_too_deep(&format!("{}1;", "-".repeat(20_000)));
    assert_too_deep(&format!("{}1{};", "(".repeat(20_000), ")".repeat(20_000)));
    assert_too_deep(&format!("x{};", " = x".repeat(20_000)));
    assert_too_deep(&format!("1{};", " + 1".repeat(20_000)));
    assert_too_deep(&format!("f{};", "()".repeat(20_000)));
    assert_too_deep(&format!("a{};", " or b".repeat(20_000)));
}

#[test]
fn test_nesting_error_location() {
    // one brace per line: the first brace past the limit is reported
    let errors = parse_errors(&"{\n".repeat(1_000));
    assert_eq!(
        errors[0].to_string(),
        format!("[line {}] Error at '{{': Too much nesting.", MAX_NESTING + 1)
    );
}

#[test]
fn test_moderate_nesting_parses() {
    let blocks = format!("{}print(1);{}", "{ ".repeat(100), "}".repeat(100));
    assert_eq!(parse_ok(&blocks).statements.len(), 1);
    let parens = format!("{}1{};", "(".repeat(100), ")".repeat(100));
    assert!(matches!(expr_of(&parens), Expr::Grouping(_)));
    let sum = format!("1{};", " + 1".repeat(200));
    assert!(matches!(expr_of(&sum), Expr::Binary { op: BinOp::Add, .. }));
}
