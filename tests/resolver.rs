#[cfg(test)]
mod resolver_tests {
    use lox_interpreter as lox;

    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner::Scanner;

    /// Parse `source` and return the rendered resolution errors.
    fn resolve_errors(source: &str) -> Vec<String> {
        let tokens: Vec<_> = Scanner::new(source.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .expect("source should tokenize cleanly");

        let (statements, parse_errors) = Parser::new(&tokens).parse();
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);

        let mut interpreter = Interpreter::new();

        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    fn assert_single_error(source: &str, message: &str) {
        let errors = resolve_errors(source);

        assert_eq!(errors.len(), 1, "errors: {:?}", errors);
        assert!(errors[0].contains(message), "got: {}", errors[0]);
    }

    #[test]
    fn test_resolver_01_clean_program() {
        let errors = resolve_errors(
            "var a = 1; { var b = a; fun f(x) { return x + b; } print f(2); }",
        );

        assert!(errors.is_empty(), "errors: {:?}", errors);
    }

    #[test]
    fn test_resolver_02_self_read_in_initializer() {
        assert_single_error(
            "{ var a = a; }",
            "Can't read local variable in its own initializer.",
        );
    }

    #[test]
    fn test_resolver_03_redeclaration_in_local_scope() {
        assert_single_error(
            "{ var a = 1; var a = 2; }",
            "Variable with this name already declared in this scope.",
        );
    }

    #[test]
    fn test_resolver_04_global_redeclaration_is_fine() {
        assert!(resolve_errors("var a = 1; var a = 2;").is_empty());
    }

    #[test]
    fn test_resolver_05_top_level_return() {
        assert_single_error("return 1;", "Can't return from top-level code.");
    }

    #[test]
    fn test_resolver_06_return_value_from_initializer() {
        assert_single_error(
            "class A { init() { return 1; } }",
            "Can't return a value from an initializer.",
        );
    }

    #[test]
    fn test_resolver_07_bare_return_from_initializer_is_fine() {
        assert!(resolve_errors("class A { init() { return; } }").is_empty());
    }

    #[test]
    fn test_resolver_08_this_outside_class() {
        assert_single_error("print this;", "Can't use 'this' outside of a class.");
        assert_single_error(
            "fun f() { return this; }",
            "Can't use 'this' outside of a class.",
        );
    }

    #[test]
    fn test_resolver_09_super_outside_class() {
        assert_single_error(
            "fun f() { super.go(); }",
            "Can't use 'super' outside of a class.",
        );
    }

    #[test]
    fn test_resolver_10_super_without_superclass() {
        assert_single_error(
            "class A { go() { super.go(); } }",
            "Can't use 'super' in a class with no superclass.",
        );
    }

    #[test]
    fn test_resolver_11_inherit_from_itself() {
        assert_single_error("class A < A {}", "A class can't inherit from itself.");
    }

    #[test]
    fn test_resolver_12_break_outside_loop() {
        assert_single_error("break;", "Can't use 'break' outside of a loop.");
    }

    #[test]
    fn test_resolver_13_continue_outside_loop() {
        assert_single_error("continue;", "Can't use 'continue' outside of a loop.");
    }

    #[test]
    fn test_resolver_14_loop_control_inside_loop_is_fine() {
        assert!(resolve_errors("while (true) { if (true) break; continue; }").is_empty());
        assert!(resolve_errors("for (var i = 0; i < 3; i = i + 1) continue;").is_empty());
    }

    #[test]
    fn test_resolver_15_break_in_function_inside_loop() {
        // the enclosing loop does not license `break` inside the nested
        // function body
        assert_single_error(
            "while (true) { fun f() { break; } }",
            "Can't use 'break' outside of a loop.",
        );
    }

    #[test]
    fn test_resolver_16_errors_accumulate() {
        let errors = resolve_errors("break; continue; return 1;");

        assert_eq!(errors.len(), 3, "errors: {:?}", errors);
    }

    #[test]
    fn test_resolver_17_error_format_carries_line_and_column() {
        let errors = resolve_errors("break;");

        assert!(
            errors[0].starts_with("[line 1 column 1] Error:"),
            "got: {}",
            errors[0]
        );
    }
}
