use nazg::diagnostics;
use nazg::interpreter::value::Value;
use nazg::interpreter::Interpreter;
use nazg::keywords::load_keywords;
use nazg::parser::{ParseError, Parser};
use nazg::scanner::Scanner;
use nazg::span::Span;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

// Print output sink the test can read back after the run
#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// Mimic what the nazg binary is doing
fn eval_with_output(source: &str) -> (Result<Value, String>, String) {
    let buf = SharedBuf::default();
    let mut interpreter = Interpreter::with_output(Box::new(buf.clone()));

    let result = (|| {
        let keywords = load_keywords(None).map_err(|e| e.to_string())?;

        let scanner = Scanner::new(source, &keywords);
        let tokens = scanner.scan_tokens().map_err(|e| format!("{:?}", e))?;

        let parser = Parser::new(tokens);
        let program = parser.parse().map_err(|e| format!("{:?}", e))?;

        interpreter
            .interpret(&program)
            .map_err(|e| format!("{:?}", e))
    })();

    let output = String::from_utf8(buf.0.borrow().clone()).expect("print output is utf-8");
    (result, output)
}

fn eval(source: &str) -> Result<Value, String> {
    eval_with_output(source).0
}

fn output_of(source: &str) -> String {
    let (result, output) = eval_with_output(source);
    assert!(result.is_ok(), "program failed: {:?}", result.err());
    output
}

fn parse_errors(source: &str) -> Vec<ParseError> {
    let keywords = load_keywords(None).expect("default keywords");
    let tokens = Scanner::new(source, &keywords)
        .scan_tokens()
        .expect("scan succeeds");
    match Parser::new(tokens).parse() {
        Ok(program) => panic!("expected parse errors, got {:?}", program),
        Err(errors) => errors,
    }
}

// Canonical rendering of a parsed program
fn canon(source: &str) -> String {
    let keywords = load_keywords(None).expect("default keywords");
    let tokens = Scanner::new(source, &keywords)
        .scan_tokens()
        .expect("scan succeeds");
    Parser::new(tokens)
        .parse()
        .expect("parse succeeds")
        .to_string()
}

// --- PRECEDENCE AND ARITHMETIC ---

#[test]
fn multiplication_binds_tighter_than_addition() {
    let result = eval("1 + 2 * 3;");
    match result {
        Ok(Value::Int(n)) => assert_eq!(n, 7),
        _ => panic!("Expected Int(7), got {:?}", result),
    }
}

#[test]
fn parens_override_precedence() {
    let result = eval("(1 + 2) * 3;");
    match result {
        Ok(Value::Int(n)) => assert_eq!(n, 9),
        _ => panic!("Expected Int(9), got {:?}", result),
    }
}

#[test]
fn plus_concatenates_when_either_side_is_a_string() {
    match eval("\"a\" + 1;") {
        Ok(Value::Str(s)) => assert_eq!(s, "a1"),
        other => panic!("Expected Str(\"a1\"), got {:?}", other),
    }
    match eval("1 + \"a\";") {
        Ok(Value::Str(s)) => assert_eq!(s, "1a"),
        other => panic!("Expected Str(\"1a\"), got {:?}", other),
    }
}

#[test]
fn division_always_produces_a_float() {
    // true division, even when it comes out even
    assert_eq!(output_of("print 6 / 2;"), "3.0\n");
    assert_eq!(output_of("print 1 / 4;"), "0.25\n");
}

#[test]
fn float_contaminates_int_arithmetic() {
    match eval("1 + 2.5;") {
        Ok(Value::Float(x)) => assert_eq!(x, 3.5),
        other => panic!("Expected Float(3.5), got {:?}", other),
    }
}

#[test]
fn division_by_zero_fails() {
    let result = eval("1 / 0;");
    assert!(
        result.as_ref().is_err_and(|e| e.contains("divide by zero")),
        "Expected division-by-zero error, got {:?}",
        result
    );

    // float zero divisor is just as dead
    assert!(eval("1.0 / 0.0;").is_err());
}

#[test]
fn arithmetic_on_a_boolean_is_a_type_error() {
    let result = eval("true + 1;");
    assert!(
        result.as_ref().is_err_and(|e| e.contains("Type")),
        "Expected TypeError, got {:?}",
        result
    );
    assert!(eval("\"a\" * 2;").is_err());
}

#[test]
fn integer_overflow_fails_instead_of_wrapping() {
    let result = eval("9223372036854775807 + 1;");
    assert!(
        result.as_ref().is_err_and(|e| e.contains("overflow")),
        "Expected overflow error, got {:?}",
        result
    );
}

#[test]
fn chained_unary_minus() {
    match eval("--5;") {
        Ok(Value::Int(n)) => assert_eq!(n, 5),
        other => panic!("Expected Int(5), got {:?}", other),
    }
}

#[test]
fn not_applies_truthiness() {
    assert_eq!(output_of("print not 0;"), "true\n");
    assert_eq!(output_of("print not \"a\";"), "false\n");
}

#[test]
fn negating_a_string_is_a_type_error() {
    assert!(eval("-\"a\";").is_err());
}

// --- VARIABLES AND SCOPING ---

#[test]
fn assignment_mutates_and_prints() {
    assert_eq!(output_of("x = 5; x = x + 1; print x;"), "6\n");
}

#[test]
fn assignment_yields_the_assigned_value() {
    match eval("x = 5;") {
        Ok(Value::Int(n)) => assert_eq!(n, 5),
        other => panic!("Expected Int(5), got {:?}", other),
    }
}

#[test]
fn undefined_variable_is_a_name_error() {
    let result = eval("x + 1;");
    assert!(
        result
            .as_ref()
            .is_err_and(|e| e.contains("undefined variable")),
        "Expected NameError, got {:?}",
        result
    );
}

#[test]
fn while_loop_mutates_the_enclosing_scope() {
    // each iteration strictly decreases x, and x stays bound outside the body
    assert_eq!(output_of("x = 3; while (x > 0) { x = x - 1; } print x;"), "0\n");
}

#[test]
fn block_local_binding_does_not_leak() {
    // y is created inside the block scope (not the root!), so it is gone
    // by the time print looks for it
    let result = eval("if (true) { y = 2; } print y;");
    assert!(
        result
            .as_ref()
            .is_err_and(|e| e.contains("undefined variable")),
        "Expected NameError, got {:?}",
        result
    );
}

#[test]
fn assignment_inside_block_reaches_the_owning_scope() {
    assert_eq!(output_of("x = 1; if (true) { x = 2; } print x;"), "2\n");
}

// --- CONTROL FLOW ---

#[test]
fn if_else_takes_the_right_branch() {
    assert_eq!(
        output_of("if (1 < 2) { print \"yes\"; } else { print \"no\"; }"),
        "yes\n"
    );
    assert_eq!(
        output_of("if (1 > 2) { print \"yes\"; } else { print \"no\"; }"),
        "no\n"
    );
}

#[test]
fn elif_chain_selects_the_matching_arm() {
    let code = r#"
    x = 2;
    if x == 1 { print "one"; }
    elif x == 2 { print "two"; }
    elif x == 3 { print "three"; }
    else { print "many"; }
    "#;
    assert_eq!(output_of(code), "two\n");
}

#[test]
fn condition_parens_are_optional() {
    assert_eq!(output_of("if 1 < 2 { print \"bare\"; }"), "bare\n");
    assert_eq!(output_of("while (false) { print \"never\"; }"), "");
}

#[test]
fn zero_and_empty_string_are_falsy() {
    assert_eq!(output_of("if 0 { print \"t\"; } else { print \"f\"; }"), "f\n");
    assert_eq!(
        output_of("if \"\" { print \"t\"; } else { print \"f\"; }"),
        "f\n"
    );
    assert_eq!(
        output_of("if \"a\" { print \"t\"; } else { print \"f\"; }"),
        "t\n"
    );
}

#[test]
fn if_yields_the_value_of_its_branch() {
    // block value semantics: the branch's last statement is the if's value
    match eval("if (true) { 5; }") {
        Ok(Value::Int(n)) => assert_eq!(n, 5),
        other => panic!("Expected Int(5), got {:?}", other),
    }
}

// --- LOGICAL OPERATORS ---

#[test]
fn logical_operators_yield_an_operand() {
    match eval("1 and 2;") {
        Ok(Value::Int(n)) => assert_eq!(n, 2),
        other => panic!("Expected Int(2), got {:?}", other),
    }
    match eval("0 or 3;") {
        Ok(Value::Int(n)) => assert_eq!(n, 3),
        other => panic!("Expected Int(3), got {:?}", other),
    }
}

#[test]
fn logical_operators_do_not_short_circuit() {
    // both operands always evaluate, so the doomed division still runs
    assert!(eval("true or 1 / 0;").is_err());
    assert!(eval("false and 1 / 0;").is_err());
}

// --- COMPARISONS ---

#[test]
fn numbers_order_across_representations() {
    assert_eq!(output_of("print 1 < 2.5;"), "true\n");
    assert_eq!(output_of("print 2 >= 2;"), "true\n");
}

#[test]
fn strings_order_lexicographically() {
    assert_eq!(output_of("print \"abc\" < \"abd\";"), "true\n");
}

#[test]
fn ordering_a_string_against_a_number_is_a_type_error() {
    let result = eval("\"a\" < 1;");
    assert!(
        result.as_ref().is_err_and(|e| e.contains("cannot order")),
        "Expected TypeError, got {:?}",
        result
    );
}

#[test]
fn equality_across_kinds_is_false_not_an_error() {
    assert_eq!(output_of("print 1 == \"1\";"), "false\n");
    assert_eq!(output_of("print 1 != \"1\";"), "true\n");
    // ints and floats compare numerically
    assert_eq!(output_of("print 1 == 1.0;"), "true\n");
}

// --- FUNCTIONS ---

#[test]
fn function_call_returns_its_value() {
    assert_eq!(
        output_of("fun add(a, b) { return a + b; } print add(2, 3);"),
        "5\n"
    );
}

#[test]
fn wrong_argument_count_is_an_arity_error() {
    let result = eval("fun add(a, b) { return a + b; } add(1);");
    assert!(
        result
            .as_ref()
            .is_err_and(|e| e.contains("expects 2 arguments, but got 1")),
        "Expected ArityError, got {:?}",
        result
    );
}

#[test]
fn calling_an_undefined_name_is_a_name_error() {
    assert!(eval("nope(1);")
        .is_err_and(|e| e.contains("undefined variable")));
}

#[test]
fn calling_a_non_function_is_a_type_error() {
    let result = eval("x = 1; x(2);");
    assert!(
        result.as_ref().is_err_and(|e| e.contains("is not a function")),
        "Expected TypeError, got {:?}",
        result
    );
}

#[test]
fn bare_return_yields_null() {
    match eval("fun f() { return; } f();") {
        Ok(Value::Null) => {}
        other => panic!("Expected Null, got {:?}", other),
    }
}

#[test]
fn function_without_return_yields_its_last_statement() {
    assert_eq!(output_of("fun f() { 42; } print f();"), "42\n");
}

#[test]
fn return_unwinds_through_a_loop() {
    let code = r#"
    fun first() {
        x = 3;
        while x > 0 {
            return x;
        }
        return 0;
    }
    print first();
    "#;
    assert_eq!(output_of(code), "3\n");
}

#[test]
fn recursion_works() {
    let code = r#"
    fun fact(n) {
        if n <= 1 { return 1; }
        return n * fact(n - 1);
    }
    print fact(5);
    "#;
    assert_eq!(output_of(code), "120\n");
}

#[test]
fn return_at_top_level_is_an_internal_error() {
    let result = eval("return 1;");
    assert!(
        result
            .as_ref()
            .is_err_and(|e| e.contains("return outside of a function")),
        "Expected internal error, got {:?}",
        result
    );
}

#[test]
fn function_body_sees_globals_not_caller_locals() {
    // call frames chain to the globals, so g resolves...
    assert_eq!(output_of("g = 10; fun f() { return g; } print f();"), "10\n");

    // ...but a caller's block-local y does not
    let result = eval("fun f() { return y; } if (true) { y = 1; print f(); }");
    assert!(
        result
            .as_ref()
            .is_err_and(|e| e.contains("undefined variable")),
        "Expected NameError, got {:?}",
        result
    );
}

#[test]
fn functions_can_be_defined_in_nested_scopes() {
    assert_eq!(
        output_of("if (true) { fun f() { return 1; } print f(); }"),
        "1\n"
    );
}

#[test]
fn print_yields_the_printed_value() {
    let (result, output) = eval_with_output("print 7;");
    assert_eq!(output, "7\n");
    match result {
        Ok(Value::Int(n)) => assert_eq!(n, 7),
        other => panic!("Expected Int(7), got {:?}", other),
    }
}

#[test]
fn prints_appear_one_per_line_in_program_order() {
    assert_eq!(output_of("print 1; print 2; print 3;"), "1\n2\n3\n");
}

// --- LEXER EDGE CASES ---

#[test]
fn string_escapes_resolve() {
    // \n, \t and \" mean what they say; any other escaped char is itself
    assert_eq!(output_of(r#"print "a\nb\t\"c\"\q";"#), "a\nb\t\"c\"q\n");
}

#[test]
fn unterminated_string_is_a_lex_error() {
    assert!(eval("print \"oops;").is_err());
}

#[test]
fn unexpected_character_is_a_lex_error() {
    let result = eval("1 @ 2;");
    assert!(
        result.as_ref().is_err_and(|e| e.contains('@')),
        "Expected the offending character in the error, got {:?}",
        result
    );
}

#[test]
fn comments_are_skipped() {
    let code = r#"
    // a line comment
    x = 1; /* a block
    comment */ print x;
    "#;
    assert_eq!(output_of(code), "1\n");
}

#[test]
fn int_and_float_literals_keep_their_form() {
    assert_eq!(output_of("print 2;"), "2\n");
    assert_eq!(output_of("print 2.0;"), "2.0\n");
    assert_eq!(output_of("print 2.5;"), "2.5\n");
}

#[test]
fn dot_without_following_digit_does_not_extend_the_number() {
    // "2." lexes as the int 2 followed by a stray '.'
    assert!(eval("2.;").is_err());
}

// --- KEYWORD SPELLINGS ---

#[test]
fn black_speech_spellings_work() {
    assert_eq!(
        output_of("gul goth { krimp \"snaga\"; } skai { krimp \"uruk\"; }"),
        "snaga\n"
    );
    assert_eq!(output_of("fun f(n) { zagh n + 1; } krimp f(1);"), "2\n");
    assert_eq!(output_of("krimp 1 agh 2;"), "2\n");
    assert_eq!(output_of("arburz burzum { krimp \"never\"; }"), "");
}

#[test]
fn spellings_are_case_sensitive() {
    // IF is not a keyword, so it is an ordinary identifier
    assert_eq!(output_of("IF = 1; print IF;"), "1\n");
}

// --- PARSER EDGE CASES ---

#[test]
fn missing_semicolon_is_a_syntax_error() {
    let errors = parse_errors("x = 1 y = 2;");
    assert!(
        errors[0].message.contains("Expected ';'"),
        "got {:?}",
        errors
    );
}

#[test]
fn statement_at_eof_may_omit_the_semicolon() {
    match eval("true") {
        Ok(Value::Bool(b)) => assert!(b),
        other => panic!("Expected Bool(true), got {:?}", other),
    }
}

#[test]
fn last_statement_of_a_block_may_omit_the_semicolon() {
    assert_eq!(output_of("fun f() { 1 } print f();"), "1\n");
}

#[test]
fn block_statements_need_separators() {
    assert!(eval("fun f() { 1 2 } f();").is_err());
}

#[test]
fn parser_reports_every_broken_statement() {
    let errors = parse_errors("1 + ; 2 + ;");
    assert_eq!(errors.len(), 2, "got {:?}", errors);
}

#[test]
fn expect_failure_names_expected_and_actual() {
    let errors = parse_errors("fun f( { }");
    assert!(
        errors[0].message.contains("parameter name")
            && errors[0].message.contains("LeftBrace"),
        "got {:?}",
        errors
    );
}

// --- CANONICAL FORM ---

#[test]
fn canonical_form_parses_back_to_itself() {
    let code = r#"
    x = 1 + 2 * 3;
    s = "a\nb" + x;
    fun dec(n) {
        if n <= 0 { return 0; }
        elif n == 1 { return 1; }
        else { return n - 1; }
    }
    while x > 0 and not (x == s) {
        x = dec(x);
        print -x;
    }
    "#;
    let first = canon(code);
    let second = canon(&first);
    assert_eq!(first, second);
}

#[test]
fn canonical_form_makes_precedence_explicit() {
    assert_eq!(canon("1 + 2 * 3;"), "(1 + (2 * 3));");
    assert_eq!(canon("print not 0;"), "print (not 0);");
}

// --- DIAGNOSTICS ---

#[test]
fn rendered_diagnostics_point_at_the_source() {
    let source = "x = nope + 1;";
    let span = Span {
        line: 1,
        col: 5,
        length: 4,
    };
    let rendered = diagnostics::render(
        source,
        "NameError",
        span,
        "undefined variable 'nope'",
        diagnostics::suggest_hint("undefined variable 'nope'").as_deref(),
    );
    assert!(rendered.contains("error[NameError]: undefined variable 'nope'"));
    assert!(rendered.contains("x = nope + 1;"));
    assert!(rendered.contains("^^^^"));
    assert!(rendered.contains("hint:"));
}
