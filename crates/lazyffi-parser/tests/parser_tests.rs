//! Parser tests: operator precedence, calls and member chains, arrow and
//! function expressions, statements with automatic semicolons, error
//! reporting, and the 100-iteration determinism test.

use lazyffi_parser::{parse_expression, parse_program};
use lazyffi_types::js::{
    ArrowBody, AssignOp, BinaryOp, Expr, ExprKind, ForInit, LogicalOp, PropertyKey, StmtKind,
    UnaryOp, VarKind,
};
use lazyffi_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn expr(src: &str) -> Expr {
    let sf = SourceFile::new("test.js", src);
    let result = parse_expression(&sf);
    assert!(
        !result.errors.has_errors(),
        "unexpected errors for {src:?}: {:?}",
        result.errors.errors
    );
    result.expr.expect("expression")
}

fn expr_error(src: &str) -> String {
    let sf = SourceFile::new("test.js", src);
    let result = parse_expression(&sf);
    assert!(result.expr.is_none(), "expected failure for {src:?}");
    result
        .errors
        .errors
        .first()
        .map(|e| e.message.clone())
        .unwrap_or_default()
}

fn stmts(src: &str) -> Vec<StmtKind> {
    let sf = SourceFile::new("test.js", src);
    let result = parse_program(&sf);
    assert!(
        !result.errors.has_errors(),
        "unexpected errors for {src:?}: {:?}",
        result.errors.errors
    );
    result
        .program
        .expect("program")
        .body
        .into_iter()
        .map(|s| s.kind)
        .collect()
}

fn program_errors(src: &str) -> usize {
    let sf = SourceFile::new("test.js", src);
    parse_program(&sf).errors.total_errors
}

fn is_ident(e: &Expr, name: &str) -> bool {
    matches!(&e.kind, ExprKind::Ident(n) if n == name)
}

// ─────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_multiplicative_binds_tighter_than_additive() {
    let e = expr("a + b * c");
    let ExprKind::Binary { op, left, right } = &e.kind else {
        panic!("{e:?}");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(is_ident(left, "a"));
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn test_exponent_is_right_associative() {
    let e = expr("a ** b ** c");
    let ExprKind::Binary { op, left, right } = &e.kind else {
        panic!("{e:?}");
    };
    assert_eq!(*op, BinaryOp::Exp);
    assert!(is_ident(left, "a"));
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Exp, .. }));
}

#[test]
fn test_subtraction_is_left_associative() {
    let e = expr("a - b - c");
    let ExprKind::Binary { left, right, .. } = &e.kind else {
        panic!("{e:?}");
    };
    assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
    assert!(is_ident(right, "c"));
}

#[test]
fn test_logical_and_conditional() {
    let e = expr("a || b && c ? d : e");
    let ExprKind::Conditional { test, .. } = &e.kind else {
        panic!("{e:?}");
    };
    let ExprKind::Logical { op, right, .. } = &test.kind else {
        panic!("{test:?}");
    };
    assert_eq!(*op, LogicalOp::Or);
    assert!(matches!(right.kind, ExprKind::Logical { op: LogicalOp::And, .. }));
}

#[test]
fn test_assignment_is_right_associative() {
    let e = expr("a = b += 1");
    let ExprKind::Assign { op, value, .. } = &e.kind else {
        panic!("{e:?}");
    };
    assert_eq!(*op, AssignOp::Assign);
    assert!(matches!(value.kind, ExprKind::Assign { op: AssignOp::Add, .. }));
}

#[test]
fn test_unary_operators() {
    let e = expr("typeof !x");
    let ExprKind::Unary { op, operand } = &e.kind else {
        panic!("{e:?}");
    };
    assert_eq!(*op, UnaryOp::TypeOf);
    assert!(matches!(operand.kind, ExprKind::Unary { op: UnaryOp::Not, .. }));
}

// ─────────────────────────────────────────────────────────────────────
// Calls, members, new
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_call_template_expression() {
    let e = expr("document.getElementById(\"app\").appendChild(node)");
    let ExprKind::Call { callee, args } = &e.kind else {
        panic!("{e:?}");
    };
    assert_eq!(args.len(), 1);
    let ExprKind::Member { object, property } = &callee.kind else {
        panic!("{callee:?}");
    };
    assert_eq!(property, "appendChild");
    assert!(matches!(object.kind, ExprKind::Call { .. }));
}

#[test]
fn test_keywords_as_property_names() {
    let e = expr("promise.then(f).catch(g)['delete']");
    assert!(matches!(e.kind, ExprKind::Index { .. }));
    let e = expr("x.new");
    assert!(matches!(&e.kind, ExprKind::Member { property, .. } if property == "new"));
}

#[test]
fn test_new_with_and_without_arguments() {
    let e = expr("new Date");
    assert!(matches!(&e.kind, ExprKind::New { args, .. } if args.is_empty()));

    let e = expr("new window.Map([[1, 2]]).get(1)");
    let ExprKind::Call { callee, .. } = &e.kind else {
        panic!("{e:?}");
    };
    let ExprKind::Member { object, .. } = &callee.kind else {
        panic!("{callee:?}");
    };
    assert!(matches!(&object.kind, ExprKind::New { args, .. } if args.len() == 1));
}

#[test]
fn test_spread_arguments() {
    let e = expr("f.apply(null, [...xs, 1])");
    let ExprKind::Call { args, .. } = &e.kind else {
        panic!("{e:?}");
    };
    let ExprKind::Array(items) = &args[1].kind else {
        panic!("{:?}", args[1]);
    };
    assert!(matches!(items[0].kind, ExprKind::Spread(_)));
}

// ─────────────────────────────────────────────────────────────────────
// Literals & functions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_object_literal_forms() {
    let e = expr("({ a: 1, 'b': 2, 3: c, [k]: v, d, m(x) { return x; } })");
    let ExprKind::Object(props) = &e.kind else {
        panic!("{e:?}");
    };
    assert_eq!(props.len(), 6);
    assert!(matches!(&props[1].key, PropertyKey::Str(s) if s == "b"));
    assert!(matches!(props[2].key, PropertyKey::Number(n) if n == 3.0));
    assert!(matches!(props[3].key, PropertyKey::Computed(_)));
    assert!(is_ident(&props[4].value, "d"));
    assert!(matches!(props[5].value.kind, ExprKind::Function(_)));
}

#[test]
fn test_arrow_functions() {
    let e = expr("x => x + 1");
    assert!(matches!(&e.kind, ExprKind::Arrow { params, body: ArrowBody::Expr(_) } if params == &["x"]));

    let e = expr("(a, b) => { return a; }");
    assert!(matches!(&e.kind, ExprKind::Arrow { params, body: ArrowBody::Block(b) } if params.len() == 2 && b.len() == 1));

    let e = expr("() => 0");
    assert!(matches!(&e.kind, ExprKind::Arrow { params, .. } if params.is_empty()));
}

#[test]
fn test_parenthesised_expression_is_not_an_arrow() {
    let e = expr("(a, b)");
    assert!(matches!(&e.kind, ExprKind::Sequence(items) if items.len() == 2));
}

#[test]
fn test_function_expression() {
    let e = expr("function (a1) { return function (a2) { return a1 + a2; }; }");
    let ExprKind::Function(f) = &e.kind else {
        panic!("{e:?}");
    };
    assert_eq!(f.params, ["a1"]);
    assert!(f.name.is_none());
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_statement_forms() {
    let body = stmts(
        "var a = 1, b;\n\
         function f(x) { if (x) return 1; else { return 2 } }\n\
         while (a < 3) { a++; if (a == 2) break; continue; }\n\
         for (var i = 0; i < 2; i++) ;\n\
         throw new Error('x');",
    );
    assert!(matches!(&body[0], StmtKind::Var(VarKind::Var, d) if d.len() == 2));
    assert!(matches!(&body[1], StmtKind::Function(f) if f.name.as_deref() == Some("f")));
    assert!(matches!(body[2], StmtKind::While { .. }));
    assert!(matches!(&body[3], StmtKind::For { init: Some(ForInit::Var(..)), .. }));
    assert!(matches!(body[4], StmtKind::Throw(_)));
}

#[test]
fn test_automatic_semicolons() {
    let body = stmts("let a = 1\nconst b = a\nreturn\nb");
    assert_eq!(body.len(), 4);
    assert!(matches!(body[2], StmtKind::Return(None)));
}

#[test]
fn test_for_with_in_inside_parentheses() {
    let body = stmts("for (var k = ('a' in o); k; ) {}");
    assert!(matches!(&body[0], StmtKind::For { test: Some(_), update: None, .. }));
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unbalanced_call_is_rejected() {
    assert_eq!(expr_error("window.alert(a"), "expected ')', got 'end of input'");
}

#[test]
fn test_trailing_tokens_are_rejected() {
    assert_eq!(expr_error("a b"), "unexpected 'b' after expression");
}

#[test]
fn test_invalid_assignment_target() {
    assert_eq!(expr_error("f() = 1"), "invalid assignment target");
    assert_eq!(expr_error("1++"), "invalid update target");
}

#[test]
fn test_errors_use_invalid_host_code() {
    let sf = SourceFile::new("call", "x.(");
    let result = parse_expression(&sf);
    let err = &result.errors.errors[0];
    assert_eq!(err.code, ErrorCode::INVALID_HOST_CODE);
    assert_eq!(err.binding, "call");
    assert_eq!(err.source_line, "x.(");
}

#[test]
fn test_lexer_errors_fail_the_parse() {
    let sf = SourceFile::new("call", "f('abc)");
    let result = parse_expression(&sf);
    assert!(result.expr.is_none());
    assert_eq!(result.errors.errors[0].message, "unterminated string literal");
}

#[test]
fn test_program_recovers_after_error() {
    assert_eq!(program_errors("var = 1;\nvar ok = 2;\nf(;\n"), 2);
}

#[test]
fn test_const_requires_initializer() {
    assert_eq!(program_errors("const a;"), 1);
}

#[test]
fn test_deep_nesting_is_bounded() {
    let src = format!("{}1{}", "(".repeat(400), ")".repeat(400));
    let sf = SourceFile::new("deep", src);
    let result = parse_expression(&sf);
    assert!(result.expr.is_none());
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_parsing_is_deterministic() {
    let src = "function (a1) { return __io(function () { return __fromHost([\"int\"], Math.max(a1, 2)); }); }";
    let first = expr(src);
    for _ in 0..100 {
        assert_eq!(expr(src), first);
    }
}
