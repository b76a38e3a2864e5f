#[cfg(test)]
mod parser_tests {
    use lox_interpreter as lox;

    use lox::ast::Ast;
    use lox::parser::Parser;
    use lox::scanner::Scanner;
    use lox::stmt::Stmt;
    use lox::token::Token;

    fn tokenize(source: &str) -> Vec<Token<'_>> {
        Scanner::new(source.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .expect("source should tokenize cleanly")
    }

    fn printed(source: &str) -> String {
        let tokens = tokenize(source);
        let mut parser = Parser::new(&tokens);

        let expr = parser
            .parse_expression()
            .expect("source should parse as an expression");

        Ast.print(&expr)
    }

    #[test]
    fn test_parser_01_precedence() {
        assert_eq!(printed("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(printed("(1 + 2) * 3"), "(* (group (+ 1.0 2.0)) 3.0)");
        assert_eq!(printed("-1 - 2"), "(- (- 1.0) 2.0)");
        assert_eq!(printed("1 < 2 == true"), "(== (< 1.0 2.0) true)");
    }

    #[test]
    fn test_parser_02_logical_and_assignment() {
        assert_eq!(printed("a or b and c"), "(or a (and b c))");
        assert_eq!(printed("a = b = 1"), "(= a (= b 1.0))");
    }

    #[test]
    fn test_parser_03_calls_and_properties() {
        assert_eq!(printed("f(1, 2)"), "(call f 1.0 2.0)");
        assert_eq!(printed("a.b.c"), "(. (. a b) c)");
        assert_eq!(printed("a.b = 1"), "(= a b 1.0)");
        assert_eq!(printed("super.go()"), "(call (super go))");
    }

    #[test]
    fn test_parser_04_invalid_assignment_target() {
        let tokens = tokenize("1 = 2");
        let mut parser = Parser::new(&tokens);

        let err = parser.parse_expression().unwrap_err();

        assert!(err.to_string().contains("Invalid assignment target"));
    }

    #[test]
    fn test_parser_05_for_desugars_to_while() {
        let tokens = tokenize("for (var i = 0; i < 3; i = i + 1) print i;");
        let (statements, errors) = Parser::new(&tokens).parse();

        assert!(errors.is_empty());
        assert_eq!(statements.len(), 1);

        // initializer block wrapping a While carrying the increment
        let Stmt::Block(inner) = &statements[0] else {
            panic!("expected a wrapping block, got {:?}", statements[0]);
        };

        assert_eq!(inner.len(), 2);
        assert!(matches!(inner[0], Stmt::Var { .. }));

        let Stmt::While { increment, .. } = &inner[1] else {
            panic!("expected a while loop, got {:?}", inner[1]);
        };

        assert!(increment.is_some());
    }

    #[test]
    fn test_parser_06_while_has_no_increment() {
        let tokens = tokenize("while (true) print 1;");
        let (statements, errors) = Parser::new(&tokens).parse();

        assert!(errors.is_empty());

        let Stmt::While { increment, .. } = &statements[0] else {
            panic!("expected a while loop");
        };

        assert!(increment.is_none());
    }

    #[test]
    fn test_parser_07_error_recovery_keeps_later_statements() {
        let tokens = tokenize("var a = ;\nprint 1;\nvar b = ;\nprint 2;");
        let (statements, errors) = Parser::new(&tokens).parse();

        // both broken declarations reported, both prints survive
        assert_eq!(errors.len(), 2);
        assert_eq!(statements.len(), 2);
        assert!(statements.iter().all(|s| matches!(s, Stmt::Print(_))));
    }

    #[test]
    fn test_parser_08_error_at_token_format() {
        let tokens = tokenize("var 1 = 2;");
        let (_, errors) = Parser::new(&tokens).parse();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().starts_with("[line 1] Error at '1':"));
    }

    #[test]
    fn test_parser_09_error_at_eof_has_no_location_suffix() {
        let tokens = tokenize("print 1");
        let (_, errors) = Parser::new(&tokens).parse();

        assert_eq!(errors.len(), 1);

        let rendered = errors[0].to_string();
        assert!(rendered.starts_with("[line 1] Error:"), "{}", rendered);
        assert!(!rendered.contains(" at '"), "{}", rendered);
    }

    #[test]
    fn test_parser_10_class_declaration_shape() {
        let tokens = tokenize("class B < A { init(x) {} go() {} }");
        let (statements, errors) = Parser::new(&tokens).parse();

        assert!(errors.is_empty());

        let Stmt::Class {
            name,
            superclass,
            methods,
        } = &statements[0]
        else {
            panic!("expected a class declaration");
        };

        assert_eq!(name.lexeme, "B");
        assert!(superclass.is_some());
        assert_eq!(methods.len(), 2);
    }

    #[test]
    fn test_parser_11_break_and_continue_statements() {
        let tokens = tokenize("while (true) { break; continue; }");
        let (statements, errors) = Parser::new(&tokens).parse();

        assert!(errors.is_empty());

        let Stmt::While { body, .. } = &statements[0] else {
            panic!("expected a while loop");
        };

        let Stmt::Block(inner) = body.as_ref() else {
            panic!("expected a block body");
        };

        assert!(matches!(inner[0], Stmt::Break { .. }));
        assert!(matches!(inner[1], Stmt::Continue { .. }));
    }
}
