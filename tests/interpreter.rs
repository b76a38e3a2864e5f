#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;

    use lox_interpreter as lox;

    use lox::error::LoxError;
    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner::Scanner;

    /// `print` sink shared between the test and the interpreter.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `source` through the whole pipeline and return everything it
    /// printed, or the first runtime error.
    fn run(source: &str) -> Result<String, LoxError> {
        let tokens: Vec<_> = Scanner::new(source.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .expect("source should tokenize cleanly");

        let (statements, parse_errors) = Parser::new(&tokens).parse();
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);

        let buf = SharedBuf::default();
        let mut interpreter = Interpreter::with_output(Box::new(buf.clone()));

        let resolve_errors = Resolver::new(&mut interpreter).resolve(&statements);
        assert!(
            resolve_errors.is_empty(),
            "resolve errors: {:?}",
            resolve_errors
        );

        interpreter.interpret(&statements)?;

        Ok(buf.contents())
    }

    fn run_ok(source: &str) -> String {
        run(source).expect("program should run without runtime errors")
    }

    fn run_err(source: &str) -> String {
        run(source)
            .expect_err("program should fail at runtime")
            .to_string()
    }

    // ── printing and values ──────────────────────────────────────────

    #[test]
    fn test_interp_01_print_and_number_formatting() {
        assert_eq!(run_ok("print 1 + 2;"), "3\n");
        assert_eq!(run_ok("print 3.5 * 2;"), "7\n");
        assert_eq!(run_ok("print 10 / 4;"), "2.5\n");
        assert_eq!(run_ok("print nil;"), "nil\n");
        assert_eq!(run_ok("print true;"), "true\n");
        assert_eq!(run_ok(r#"print "a" + "b";"#), "ab\n");
    }

    #[test]
    fn test_interp_02_equality_has_no_coercion() {
        assert_eq!(run_ok(r#"print 1 == "1";"#), "false\n");
        assert_eq!(run_ok("print nil == nil;"), "true\n");
        assert_eq!(run_ok("print nil == false;"), "false\n");
        assert_eq!(run_ok("print 1 != 2;"), "true\n");
    }

    #[test]
    fn test_interp_03_truthiness_and_logical_operands() {
        // logical operators yield the deciding operand, not a bool
        assert_eq!(run_ok(r#"print "hi" or 2;"#), "hi\n");
        assert_eq!(run_ok("print nil or 2;"), "2\n");
        assert_eq!(run_ok("print nil and 2;"), "nil\n");
        assert_eq!(run_ok("print 0 and 2;"), "2\n"); // 0 is truthy
    }

    #[test]
    fn test_interp_04_logical_short_circuit_skips_side_effects() {
        assert_eq!(
            run_ok("var a = 1; true or (a = 2); print a;"),
            "1\n"
        );
        assert_eq!(
            run_ok("var a = 1; false and (a = 2); print a;"),
            "1\n"
        );
    }

    // ── variables and scope ──────────────────────────────────────────

    #[test]
    fn test_interp_05_block_scope_shadowing() {
        let source = r#"
            var a = "outer";
            {
                var a = "inner";
                print a;
            }
            print a;
        "#;

        assert_eq!(run_ok(source), "inner\nouter\n");
    }

    #[test]
    fn test_interp_06_assignment_is_an_expression() {
        assert_eq!(run_ok("var a = 1; print a = 2; print a;"), "2\n2\n");
    }

    #[test]
    fn test_interp_07_closure_captures_binding_not_value() {
        let source = r#"
            fun makeCounter() {
                var count = 0;
                fun next() {
                    count = count + 1;
                    return count;
                }
                return next;
            }
            var counter = makeCounter();
            print counter();
            print counter();
            print counter();
        "#;

        assert_eq!(run_ok(source), "1\n2\n3\n");
    }

    #[test]
    fn test_interp_07b_closures_are_independent() {
        let source = r#"
            fun makeCounter() {
                var count = 0;
                fun next() {
                    count = count + 1;
                    return count;
                }
                return next;
            }
            var a = makeCounter();
            var b = makeCounter();
            print a();
            print a();
            print b();
        "#;

        assert_eq!(run_ok(source), "1\n2\n1\n");
    }

    #[test]
    fn test_interp_08_resolution_is_static() {
        // the classic jlox scoping pitfall: `show` must keep seeing the
        // global it closed over, not the later shadowing declaration
        let source = r#"
            var a = "global";
            {
                fun show() { print a; }
                show();
                var a = "block";
                show();
            }
        "#;

        assert_eq!(run_ok(source), "global\nglobal\n");
    }

    // ── control flow ─────────────────────────────────────────────────

    #[test]
    fn test_interp_09_while_and_break() {
        let source = r#"
            var i = 0;
            while (true) {
                i = i + 1;
                if (i == 3) break;
            }
            print i;
        "#;

        assert_eq!(run_ok(source), "3\n");
    }

    #[test]
    fn test_interp_10_for_continue_still_runs_increment() {
        let source = r#"
            for (var i = 0; i < 5; i = i + 1) {
                if (i == 2) continue;
                print i;
            }
        "#;

        assert_eq!(run_ok(source), "0\n1\n3\n4\n");
    }

    #[test]
    fn test_interp_11_break_skips_increment_and_nested_loops() {
        let source = r#"
            for (var i = 0; i < 3; i = i + 1) {
                for (var j = 0; j < 3; j = j + 1) {
                    if (j == 1) break;
                    print i * 10 + j;
                }
            }
        "#;

        assert_eq!(run_ok(source), "0\n10\n20\n");
    }

    #[test]
    fn test_interp_12_return_unwinds_through_loops() {
        let source = r#"
            fun firstOver(limit) {
                for (var i = 0; ; i = i + 1) {
                    if (i > limit) return i;
                }
            }
            print firstOver(4);
        "#;

        assert_eq!(run_ok(source), "5\n");
    }

    #[test]
    fn test_interp_13_function_without_return_yields_nil() {
        assert_eq!(run_ok("fun f() {} print f();"), "nil\n");
    }

    #[test]
    fn test_interp_14_recursion() {
        let source = r#"
            fun fib(n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            print fib(10);
        "#;

        assert_eq!(run_ok(source), "55\n");
    }

    // ── classes ──────────────────────────────────────────────────────

    #[test]
    fn test_interp_15_fields_methods_and_this() {
        let source = r#"
            class Counter {
                init(start) {
                    this.value = start;
                }
                bump() {
                    this.value = this.value + 1;
                    return this.value;
                }
            }
            var c = Counter(10);
            print c.bump();
            print c.bump();
            print c.value;
        "#;

        assert_eq!(run_ok(source), "11\n12\n12\n");
    }

    #[test]
    fn test_interp_16_displays() {
        let source = r#"
            class A {}
            fun f() {}
            print A;
            print f;
            print A();
            print clock;
        "#;

        assert_eq!(run_ok(source), "A\n<fn f>\nA instance\n<native fn clock>\n");
    }

    #[test]
    fn test_interp_17_bound_method_retains_receiver() {
        let source = r#"
            class Person {
                init(name) { this.name = name; }
                greet() { print "hi " + this.name; }
            }
            var m = Person("ada").greet;
            m();
        "#;

        assert_eq!(run_ok(source), "hi ada\n");
    }

    #[test]
    fn test_interp_18_fields_shadow_methods() {
        let source = r#"
            class A {
                go() { return "method"; }
            }
            var a = A();
            print a.go();
            a.go = 1;
            print a.go;
        "#;

        assert_eq!(run_ok(source), "method\n1\n");
    }

    #[test]
    fn test_interp_19_initializer_returns_instance() {
        let source = r#"
            class A {
                init() {
                    this.x = 1;
                    return;
                }
            }
            var a = A();
            print a.init() == a;
        "#;

        assert_eq!(run_ok(source), "true\n");
    }

    #[test]
    fn test_interp_20_inheritance_and_super() {
        let source = r#"
            class A {
                speak() { print "A"; }
            }
            class B < A {
                speak() {
                    super.speak();
                    print "B";
                }
            }
            B().speak();
        "#;

        assert_eq!(run_ok(source), "A\nB\n");
    }

    #[test]
    fn test_interp_21_super_binds_statically_across_levels() {
        // `super` in A's method must reach Base even when called on a C
        // instance whose own class overrides the method again
        let source = r#"
            class Base {
                go() { print "Base"; }
            }
            class A < Base {
                go() { super.go(); print "A"; }
            }
            class C < A {
                go() { super.go(); print "C"; }
            }
            C().go();
        "#;

        assert_eq!(run_ok(source), "Base\nA\nC\n");
    }

    #[test]
    fn test_interp_22_methods_inherited_through_chain() {
        let source = r#"
            class A { hello() { print "hello"; } }
            class B < A {}
            class C < B {}
            C().hello();
        "#;

        assert_eq!(run_ok(source), "hello\n");
    }

    #[test]
    fn test_interp_23_instance_identity_equality() {
        let source = r#"
            class A {}
            var a = A();
            var b = A();
            var c = a;
            print a == b;
            print a == c;
        "#;

        assert_eq!(run_ok(source), "false\ntrue\n");
    }

    // ── runtime errors ───────────────────────────────────────────────

    #[test]
    fn test_interp_24_divide_by_zero() {
        assert!(run_err("print 5 / 0;").contains("Divide by 0 detected."));
    }

    #[test]
    fn test_interp_25_operand_type_errors() {
        assert!(run_err(r#"print 1 + "b";"#)
            .contains("Operands must be either two numbers or two strings."));
        assert!(run_err(r#"print 1 - "b";"#).contains("Operands must be numbers."));
        assert!(run_err(r#"print -"a";"#).contains("Operand must be a number."));
        assert!(run_err(r#"print 1 < "b";"#).contains("Operands must be numbers."));
    }

    #[test]
    fn test_interp_26_undefined_variable() {
        assert!(run_err("print missing;").contains("Undefined variable 'missing'."));
        assert!(run_err("missing = 1;").contains("Undefined variable 'missing'."));
    }

    #[test]
    fn test_interp_27_call_errors() {
        assert!(run_err(r#""hello"();"#).contains("Can only call functions and classes."));
        assert!(run_err("fun f(a, b) {} f(1);").contains("Expected 2 arguments but got 1."));
        assert!(run_err("class A {} A(1);").contains("Expected 0 arguments but got 1."));
    }

    #[test]
    fn test_interp_28_property_errors() {
        assert!(run_err("var a = 1; print a.b;").contains("Only instances have properties."));
        assert!(run_err("var a = 1; a.b = 2;").contains("Only instances have properties."));
        assert!(run_err("class A {} print A().missing;").contains("Undefined property 'missing'"));
    }

    #[test]
    fn test_interp_29_superclass_must_be_a_class() {
        assert!(run_err("var NotAClass = 1; class A < NotAClass {}")
            .contains("Superclass must be a class."));
    }

    #[test]
    fn test_interp_30_runtime_error_carries_position() {
        let rendered = run_err("print 5 / 0;");

        assert!(
            rendered.starts_with("[line 1 column 9] Error:"),
            "got: {}",
            rendered
        );
    }

    #[test]
    fn test_interp_31_statements_before_error_still_print() {
        let source = r#"
            print "before";
            print 1 / 0;
            print "after";
        "#;

        let tokens: Vec<_> = Scanner::new(source.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let (statements, _) = Parser::new(&tokens).parse();

        let buf = SharedBuf::default();
        let mut interpreter = Interpreter::with_output(Box::new(buf.clone()));

        let resolve_errors = Resolver::new(&mut interpreter).resolve(&statements);
        assert!(resolve_errors.is_empty());

        assert!(interpreter.interpret(&statements).is_err());
        assert_eq!(buf.contents(), "before\n");
    }

    #[test]
    fn test_interp_32_evaluate_single_expression() {
        let tokens: Vec<_> = Scanner::new(b"(2 + 3) * 4 == 20")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let mut parser = Parser::new(&tokens);
        let expr = parser.parse_expression().unwrap();

        let mut interpreter = Interpreter::new();
        let value = interpreter.evaluate_expression(&expr).unwrap();

        assert_eq!(value.to_string(), "true");
    }

    #[test]
    fn test_interp_33_evaluate_super_and_this_without_resolver() {
        // expression mode never runs the resolver; keyword references must
        // surface as runtime errors, not aborts
        let tokens: Vec<_> = Scanner::new(b"super.m")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let mut parser = Parser::new(&tokens);
        let expr = parser.parse_expression().unwrap();

        let mut interpreter = Interpreter::new();
        let err = interpreter.evaluate_expression(&expr).unwrap_err();

        assert!(
            err.to_string()
                .contains("Can't use 'super' outside of a class."),
            "got: {}",
            err
        );

        let tokens: Vec<_> = Scanner::new(b"this")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let mut parser = Parser::new(&tokens);
        let expr = parser.parse_expression().unwrap();

        let mut interpreter = Interpreter::new();
        let err = interpreter.evaluate_expression(&expr).unwrap_err();

        assert!(
            err.to_string().contains("Undefined variable 'this'."),
            "got: {}",
            err
        );
    }
}
