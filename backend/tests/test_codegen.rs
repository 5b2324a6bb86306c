//! Code generation tests: compile source strings to textual LLVM IR and
//! assert on its structure. Every compile also runs the module verifier.

use backend::{compile_module, pass0_program, pass1_program};
use frontend::{
    input::{StrInput, TokenStream},
    lexer::Lexer,
    parser::program::parse_program,
};

fn compile(src: &str) -> String {
    compile_opt(src, false)
}

fn compile_opt(src: &str, optimize: bool) -> String {
    let tokens = Lexer::new(StrInput::new(src)).lex_all().expect("lexes");
    let ast = parse_program(&mut TokenStream::new(tokens)).expect("parses");
    let pass1 = pass1_program(pass0_program(), &ast).expect("analyzes");
    compile_module(&pass1, "test", optimize).expect("compiles")
}

#[test]
fn emits_external_main_calling_top_function() {
    let ir = compile(r#"fun start():nothing { writeString("hello\n"); }"#);

    assert!(ir.contains("define i32 @main()"), "no entry wrapper:\n{ir}");
    assert!(
        ir.contains("call void @start()"),
        "main does not call the top-level function:\n{ir}"
    );
    assert!(
        ir.contains("define internal void @start()"),
        "user functions must be internal:\n{ir}"
    );
    assert!(ir.contains("ret i32 0"), "main must return 0:\n{ir}");
}

#[test]
fn top_function_named_main_is_renamed() {
    let ir = compile("fun main():nothing { }");

    assert!(ir.contains("define i32 @main()"), "entry wrapper:\n{ir}");
    assert!(
        ir.contains("define internal void @main.0()"),
        "colliding source name needs a suffix:\n{ir}"
    );
}

#[test]
fn declares_builtin_runtime() {
    let ir = compile("fun main():nothing { }");

    assert!(ir.contains("declare void @writeInteger(i32)"), "{ir}");
    assert!(ir.contains("declare void @writeString(ptr)"), "{ir}");
    assert!(ir.contains("declare i32 @readInteger()"), "{ir}");
    assert!(ir.contains("declare i8 @readChar()"), "{ir}");
    assert!(ir.contains("declare i32 @strlen(ptr)"), "{ir}");
    assert!(ir.contains("declare void @strcpy(ptr, ptr)"), "{ir}");
}

#[test]
fn string_literal_is_private_constant() {
    let ir = compile(r#"fun main():nothing { writeString("hi\n"); }"#);

    assert!(
        ir.contains("private unnamed_addr constant"),
        "string globals must be private:\n{ir}"
    );
    assert!(
        ir.contains("c\"hi\\0A\\00\""),
        "string must be NUL-terminated:\n{ir}"
    );
}

#[test]
fn scalars_use_i32_and_i8() {
    let ir = compile(
        r#"
fun main():nothing {
    var x:int;
    var c:char;
    x <- 42;
    c <- 'a';
}
"#,
    );

    assert!(ir.contains("alloca i32"), "int local:\n{ir}");
    assert!(ir.contains("alloca i8"), "char local:\n{ir}");
    assert!(ir.contains("store i32 42"), "int store:\n{ir}");
    assert!(ir.contains("store i8 97"), "char store:\n{ir}");
}

#[test]
fn arithmetic_is_signed() {
    let ir = compile(
        r#"
fun main():nothing {
    var x:int;
    x <- 7;
    x <- x / 2 + x % 3 - -x;
}
"#,
    );

    assert!(ir.contains("sdiv"), "signed division:\n{ir}");
    assert!(ir.contains("srem"), "signed remainder:\n{ir}");
    assert!(ir.contains("sub i32 0"), "unary minus is sub 0, e:\n{ir}");
}

#[test]
fn factorial_recurses() {
    let ir = compile(
        r#"
fun main():nothing {
    fun fact(n: int): int {
        if n <= 1 then return 1;
        return n * fact(n - 1);
    }
    writeInteger(fact(5));
}
"#,
    );

    assert!(ir.contains("define internal i32 @fact(i32"), "{ir}");
    assert!(ir.contains("call i32 @fact"), "{ir}");
    assert!(ir.contains("icmp sle"), "signed comparison:\n{ir}");
    assert!(ir.contains("if_true"), "{ir}");
}

#[test]
fn while_loop_blocks() {
    let ir = compile(
        r#"
fun main():nothing {
    var i:int;
    i <- 0;
    while i < 10 do i <- i + 1;
}
"#,
    );

    assert!(ir.contains("loop_entry"), "{ir}");
    assert!(ir.contains("loop_body"), "{ir}");
    assert!(ir.contains("loop_exit"), "{ir}");
    assert!(ir.contains("icmp slt"), "{ir}");
}

#[test]
fn conditions_short_circuit() {
    let ir = compile(
        r#"
fun main():nothing {
    var x:int;
    x <- 0;
    if x > 0 and 10 / x > 1 then x <- 1;
    if x == 0 or x == 1 then x <- 2;
    if not (x == 2) then x <- 3;
}
"#,
    );

    assert!(ir.contains("and_rhs"), "and needs a mid block:\n{ir}");
    assert!(ir.contains("or_rhs"), "or needs a mid block:\n{ir}");
}

#[test]
fn char_comparison_is_unsigned() {
    let ir = compile(
        r#"
fun main():nothing {
    var c:char;
    c <- 'a';
    if c < 'b' then c <- 'b';
}
"#,
    );

    assert!(ir.contains("icmp ult"), "char compares unsigned:\n{ir}");
}

#[test]
fn reference_parameters_are_pointers() {
    let ir = compile(
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
}
"#,
    );

    assert!(
        ir.contains("define internal void @swap(ptr"),
        "ref params lower to pointers:\n{ir}"
    );
    assert!(ir.contains("call void @swap(ptr"), "{ir}");
}

#[test]
fn local_array_allocas_and_indexing() {
    let ir = compile(
        r#"
fun main():nothing {
    var a:int[4];
    a[0] <- 1;
    a[1] <- a[0] + 1;
}
"#,
    );

    assert!(ir.contains("alloca [4 x i32]"), "{ir}");
    assert!(ir.contains("getelementptr"), "{ir}");
}

#[test]
fn sized_array_decays_when_passed_by_reference() {
    let ir = compile(
        r#"
fun main():nothing {
    var s:char[8];
    strcpy(s, "abcd");
    writeString(s);
}
"#,
    );

    assert!(ir.contains("alloca [8 x i8]"), "{ir}");
    assert!(ir.contains("call void @strcpy(ptr"), "{ir}");
}

#[test]
fn captured_variable_becomes_hidden_pointer_parameter() {
    let ir = compile(
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
    );

    assert!(
        ir.contains("define internal void @inc(ptr"),
        "capture must add a trailing pointer parameter:\n{ir}"
    );
    assert!(
        ir.contains("call void @inc(ptr"),
        "call sites must pass the captured pointer:\n{ir}"
    );
}

#[test]
fn pass_through_capture_in_intervening_function() {
    let ir = compile(
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
    );

    assert!(ir.contains("define internal void @middle(ptr"), "{ir}");
    assert!(ir.contains("define internal void @inner(ptr"), "{ir}");
}

#[test]
fn return_discards_trailing_statements() {
    let ir = compile(
        r#"
fun main():nothing {
    fun f(): int {
        return 1;
        return 2;
    }
    writeInteger(f());
}
"#,
    );

    assert!(ir.contains("ret i32 1"), "{ir}");
    assert!(!ir.contains("ret i32 2"), "dead return must be dropped:\n{ir}");
}

#[test]
fn optimizer_keeps_module_valid() {
    let ir = compile_opt(
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
        true,
    );

    assert!(ir.contains("define i32 @main()"), "{ir}");
    assert!(ir.contains("call void @writeInteger"), "{ir}");
}

#[test]
fn empty_procedure_gets_ret_void() {
    let ir = compile("fun main():nothing { }");

    assert!(ir.contains("ret void"), "{ir}");
}
