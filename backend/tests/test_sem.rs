//! Semantic analysis integration tests: lex -> parse -> pass1 over source
//! strings, asserting acceptance, the first diagnostic kind, and capture sets.

use backend::{
    pass0_program, pass1_program, tagged::TaggedStmtValue, CompilerError, LangType, Pass1Program,
};
use frontend::{
    input::{StrInput, TokenStream},
    lexer::Lexer,
    parser::program::parse_program,
};

fn analyze(src: &str) -> Result<Pass1Program, CompilerError> {
    let tokens = Lexer::new(StrInput::new(src)).lex_all().expect("lexes");
    let ast = parse_program(&mut TokenStream::new(tokens)).expect("parses");
    pass1_program(pass0_program(), &ast)
}

fn error_kind(src: &str) -> &'static str {
    analyze(src).expect_err("expected a semantic error").kind()
}

fn captured_names(pass1: &Pass1Program, name: &str) -> Vec<String> {
    pass1
        .function(name)
        .unwrap_or_else(|| panic!("no function `{name}`"))
        .captured
        .iter()
        .map(|c| c.name.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Well-typed programs
// ---------------------------------------------------------------------------

#[test]
fn accepts_hello() {
    analyze(r#"fun main():nothing { writeString("hello\n"); }"#).expect("accepted");
}

#[test]
fn accepts_factorial() {
    let pass1 = analyze(
        r#"
fun main():nothing {
    fun fact(n: int): int {
        if n <= 1 then return 1;
        return n * fact(n - 1);
    }
    writeInteger(fact(5));
}
"#,
    )
    .expect("accepted");

    assert!(pass1.function("fact").unwrap().has_return);
}

#[test]
fn accepts_iterative_sum() {
    analyze(
        r#"
fun main():nothing {
    var sum:int;
    var i:int;
    sum <- 0;
    i <- 1;
    while i <= 10 do {
        sum <- sum + i;
        i <- i + 1;
    }
    writeInteger(sum);
}
"#,
    )
    .expect("accepted");
}

#[test]
fn accepts_swap_by_reference() {
    analyze(
        r#"
fun main():nothing {
    var a:int;
    var b:int;
    fun swap(ref x:int, ref y:int):nothing {
        var t:int;
        t <- x;
        x <- y;
        y <- t;
    }
    a <- 1;
    b <- 2;
    swap(a, b);
    writeInteger(a);
    writeInteger(b);
}
"#,
    )
    .expect("accepted");
}

#[test]
fn accepts_array_reverse() {
    analyze(
        r#"
fun main():nothing {
    var s:char[5];
    fun rev(ref s:char[]):nothing {
        var i:int;
        var j:int;
        var t:char;
        i <- 0;
        j <- strlen(s) - 1;
        while i < j do {
            t <- s[i];
            s[i] <- s[j];
            s[j] <- t;
            i <- i + 1;
            j <- j - 1;
        }
    }
    strcpy(s, "abcd");
    rev(s);
    writeString(s);
}
"#,
    )
    .expect("accepted");
}

#[test]
fn accepts_string_literal_for_ref_char_array() {
    analyze(r#"fun main():nothing { writeString("x"); }"#).expect("accepted");
}

#[test]
fn conditions_annotate_bool() {
    let pass1 = analyze("fun main():nothing { if 1 == 1 and not false then ; }").expect("accepted");

    let body = pass1.function("main").unwrap().body.clone().unwrap();
    let TaggedStmtValue::Block(items) = &body.value else {
        panic!("body is not a block");
    };
    let TaggedStmtValue::If { cond, .. } = &items[0].value else {
        panic!("expected an if statement");
    };
    assert_eq!(*cond.ty, LangType::Bool);
}

#[test]
fn analysis_is_repeatable() {
    let src = r#"
fun main():nothing {
    var x:int;
    fun inc():nothing { x <- x + 1; }
    inc();
}
"#;
    let first = analyze(src).expect("accepted");
    let second = analyze(src).expect("accepted");

    assert_eq!(
        captured_names(&first, "inc"),
        captured_names(&second, "inc")
    );
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[test]
fn rejects_undeclared_variable() {
    assert_eq!(
        error_kind("fun main():nothing { x <- 1; }"),
        "undeclared name"
    );
}

#[test]
fn rejects_undeclared_function() {
    assert_eq!(error_kind("fun main():nothing { frob(); }"), "undeclared name");
}

#[test]
fn rejects_redeclaration_in_same_scope() {
    assert_eq!(
        error_kind("fun main():nothing { var x:int; var x:char; }"),
        "redeclaration"
    );
}

#[test]
fn rejects_assignment_type_mismatch() {
    assert_eq!(
        error_kind("fun main():nothing { var x:int; x <- 'a'; }"),
        "type mismatch"
    );
}

#[test]
fn rejects_wholesale_array_assignment() {
    assert_eq!(
        error_kind("fun main():nothing { var a:int[4]; var b:int[4]; a <- b; }"),
        "type mismatch"
    );
}

#[test]
fn rejects_array_in_arithmetic() {
    assert_eq!(
        error_kind("fun main():nothing { var a:int[4]; var x:int; x <- a + 1; }"),
        "type mismatch"
    );
}

#[test]
fn rejects_wrong_arity() {
    assert_eq!(
        error_kind("fun main():nothing { writeInteger(1, 2); }"),
        "arity mismatch"
    );
}

#[test]
fn rejects_non_lvalue_for_ref_parameter() {
    assert_eq!(
        error_kind(
            r#"
fun main():nothing {
    var x:int;
    fun f(ref a:int):nothing { a <- 0; }
    f(x + 1);
}
"#
        ),
        "parameter mode"
    );
}

#[test]
fn rejects_array_parameter_by_value() {
    assert_eq!(
        error_kind("fun main():nothing { fun f(a:int[]):nothing { } }"),
        "parameter mode"
    );
}

#[test]
fn rejects_missing_return() {
    assert_eq!(
        error_kind(
            r#"
fun main():nothing {
    fun f(): int {
        if 1 == 1 then return 1;
    }
    writeInteger(f());
}
"#
        ),
        "return"
    );
}

#[test]
fn accepts_return_on_both_if_branches() {
    analyze(
        r#"
fun main():nothing {
    fun sign(n: int): int {
        if n < 0 then return -1;
        else return 1;
    }
    writeInteger(sign(-5));
}
"#,
    )
    .expect("accepted");
}

#[test]
fn rejects_value_return_in_procedure() {
    assert_eq!(error_kind("fun main():nothing { return 1; }"), "return");
}

#[test]
fn rejects_bare_return_in_value_function() {
    assert_eq!(
        error_kind(
            r#"
fun main():nothing {
    fun f(): int { return; }
    writeInteger(f());
}
"#
        ),
        "return"
    );
}

#[test]
fn rejects_value_function_as_statement() {
    assert_eq!(
        error_kind("fun main():nothing { readInteger(); }"),
        "type mismatch"
    );
}

#[test]
fn rejects_procedure_in_expression() {
    assert_eq!(
        error_kind("fun main():nothing { var x:int; x <- writeInteger(1); }"),
        "type mismatch"
    );
}

#[test]
fn rejects_mixed_comparison() {
    assert_eq!(
        error_kind("fun main():nothing { if 1 == 'a' then ; }"),
        "type mismatch"
    );
}

#[test]
fn rejects_top_level_with_parameters() {
    assert_eq!(error_kind("fun main(n: int):nothing { }"), "arity mismatch");
}

#[test]
fn rejects_top_level_returning_value() {
    assert_eq!(error_kind("fun main(): int { return 0; }"), "type mismatch");
}

#[test]
fn rejects_index_into_scalar() {
    assert_eq!(
        error_kind("fun main():nothing { var x:int; x[0] <- 1; }"),
        "type mismatch"
    );
}

#[test]
fn rejects_non_int_index() {
    assert_eq!(
        error_kind("fun main():nothing { var a:int[4]; a['x'] <- 1; }"),
        "type mismatch"
    );
}

// ---------------------------------------------------------------------------
// Capture analysis
// ---------------------------------------------------------------------------

#[test]
fn captures_enclosing_variable() {
    let pass1 = analyze(
        r#"
fun bump():nothing {
    var x:int;
    x <- 0;
    fun inc():nothing { x <- x + 1; }
    inc();
    inc();
    writeInteger(x);
}
"#,
    )
    .expect("accepted");

    assert_eq!(captured_names(&pass1, "inc"), vec!["x"]);
    assert!(captured_names(&pass1, "bump").is_empty());
}

#[test]
fn captures_propagate_through_intervening_function() {
    let pass1 = analyze(
        r#"
fun top():nothing {
    var x:int;
    fun middle():nothing {
        fun inner():nothing { x <- x + 1; }
        inner();
    }
    x <- 0;
    middle();
}
"#,
    )
    .expect("accepted");

    // `middle` never names `x` but must pass it through to `inner`
    assert_eq!(captured_names(&pass1, "inner"), vec!["x"]);
    assert_eq!(captured_names(&pass1, "middle"), vec!["x"]);
}

#[test]
fn captures_propagate_to_sibling_callers() {
    let pass1 = analyze(
        r#"
fun top():nothing {
    var x:int;
    fun g():nothing { x <- x + 1; }
    fun f():nothing { g(); }
    x <- 0;
    f();
}
"#,
    )
    .expect("accepted");

    assert_eq!(captured_names(&pass1, "g"), vec!["x"]);
    // `f` forwards the pointer `g` needs even though it never uses `x`
    assert_eq!(captured_names(&pass1, "f"), vec!["x"]);
}

#[test]
fn captures_forward_referenced_sibling() {
    let pass1 = analyze(
        r#"
fun top():nothing {
    var x:int;
    fun f():nothing { g(); }
    fun g():nothing { x <- x + 1; }
    x <- 0;
    f();
}
"#,
    )
    .expect("accepted");

    assert_eq!(captured_names(&pass1, "f"), vec!["x"]);
}

#[test]
fn shadowing_local_is_not_a_capture() {
    let pass1 = analyze(
        r#"
fun top():nothing {
    var x:int;
    fun f():nothing {
        var x:int;
        x <- 1;
    }
    x <- 0;
    f();
}
"#,
    )
    .expect("accepted");

    assert!(captured_names(&pass1, "f").is_empty());
}

#[test]
fn captures_reference_parameter() {
    let pass1 = analyze(
        r#"
fun top():nothing {
    var n:int;
    fun outer(ref m:int):nothing {
        fun bump():nothing { m <- m + 1; }
        bump();
    }
    n <- 0;
    outer(n);
}
"#,
    )
    .expect("accepted");

    assert_eq!(captured_names(&pass1, "bump"), vec!["m"]);
}

#[test]
fn capture_order_is_first_seen() {
    let pass1 = analyze(
        r#"
fun top():nothing {
    var a:int;
    var b:int;
    fun f():nothing {
        b <- 1;
        a <- 2;
        b <- 3;
    }
    a <- 0;
    b <- 0;
    f();
}
"#,
    )
    .expect("accepted");

    assert_eq!(captured_names(&pass1, "f"), vec!["b", "a"]);
}

#[test]
fn nested_function_symbols_are_disambiguated() {
    let pass1 = analyze(
        r#"
fun top():nothing {
    fun f():nothing {
        fun helper():nothing { }
        helper();
    }
    fun g():nothing {
        fun helper():nothing { }
        helper();
    }
    f();
    g();
}
"#,
    )
    .expect("accepted");

    let symbols = pass1
        .functions
        .iter()
        .filter(|f| f.name == "helper")
        .map(|f| f.symbol.clone())
        .collect::<Vec<_>>();
    assert_eq!(symbols.len(), 2);
    assert_ne!(symbols[0], symbols[1]);
}
