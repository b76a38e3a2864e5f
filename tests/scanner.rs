#[cfg(test)]
mod scanner_tests {
    use lox_interpreter as lox;

    use lox::scanner::*;
    use lox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_operators() {
        assert_token_sequence(
            "! != = == < <= > >=",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "var language = lox; break continue",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "language"),
                (TokenType::EQUAL, "="),
                (TokenType::IDENTIFIER, "lox"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::BREAK, "break"),
                (TokenType::CONTINUE, "continue"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_literals() {
        let scanner = Scanner::new(br#"12 3.25 "hi there""#);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].token_type, TokenType::NUMBER(12.0));
        assert_eq!(tokens[1].token_type, TokenType::NUMBER(3.25));
        assert_eq!(tokens[2].token_type, TokenType::STRING("hi there".into()));

        match &tokens[0].token_type {
            TokenType::NUMBER(n) => assert_eq!(*n, 12.0),
            other => panic!("expected NUMBER, got {:?}", other),
        }

        match &tokens[2].token_type {
            TokenType::STRING(s) => assert_eq!(s, "hi there"),
            other => panic!("expected STRING, got {:?}", other),
        }
    }

    #[test]
    fn test_scanner_05_line_comments() {
        assert_token_sequence(
            "var x; // trailing comment\nvar y;",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "x"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "y"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_06_nested_block_comments() {
        assert_token_sequence(
            "1 /* outer /* inner */ still outer */ 2",
            &[
                (TokenType::NUMBER(1.0), "1"),
                (TokenType::NUMBER(2.0), "2"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_07_unterminated_block_comment() {
        let results: Vec<_> = Scanner::new(b"/* no end").collect();

        let err = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("expected a lex error");

        assert!(err.to_string().contains("Unterminated block comment."));
    }

    #[test]
    fn test_scanner_08_line_and_column_positions() {
        let source = "var x;\n  x = 1;";
        let tokens: Vec<_> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        // var x ; on line 1
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 5));
        assert_eq!((tokens[2].line, tokens[2].column), (1, 6));

        // x = 1 ; on line 2, columns restart after the newline
        assert_eq!((tokens[3].line, tokens[3].column), (2, 3));
        assert_eq!((tokens[4].line, tokens[4].column), (2, 5));
        assert_eq!((tokens[5].line, tokens[5].column), (2, 7));
    }

    #[test]
    fn test_scanner_09_multiline_string_tracks_lines() {
        let source = "\"a\nb\" x";
        let tokens: Vec<_> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].token_type, TokenType::STRING("a\nb".into()));
        assert_eq!(tokens[0].line, 1);

        // the identifier after the string sits on line 2
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_scanner_10_errors_do_not_end_stream() {
        let source = ",.$(#";
        let results: Vec<_> = Scanner::new(source.as_bytes()).collect();

        // COMMA DOT err LEFT_PAREN err EOF
        assert_eq!(results.len(), 6);

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2);

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                err.to_string().contains("Unexpected character"),
                "unexpected message: {}",
                err
            );
        }

        let last = results.last().unwrap().as_ref().unwrap();
        assert_eq!(last.token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_11_number_display() {
        let tokens: Vec<_> = Scanner::new(b"3 3.14").filter_map(Result::ok).collect();

        assert_eq!(tokens[0].to_string(), "NUMBER 3 3.0");
        assert_eq!(tokens[1].to_string(), "NUMBER 3.14 3.14");
    }

    #[test]
    fn test_scanner_12_columns_stay_exact_across_line_comments() {
        // comment running to EOF: the EOF token sits just past the text
        let tokens: Vec<_> = Scanner::new(b"1 // abc").filter_map(Result::ok).collect();

        let eof = tokens.last().unwrap();
        assert_eq!(eof.token_type, TokenType::EOF);
        assert_eq!((eof.line, eof.column), (1, 9));

        // comment ending in a newline: the next token starts at column 1
        let tokens: Vec<_> = Scanner::new(b"// x\ny").filter_map(Result::ok).collect();

        assert_eq!(tokens[0].lexeme, "y");
        assert_eq!((tokens[0].line, tokens[0].column), (2, 1));
    }

    #[test]
    fn test_scanner_13_fused_after_eof() {
        let mut scanner = Scanner::new(b"1");

        assert!(scanner.next().is_some()); // NUMBER
        assert!(scanner.next().is_some()); // EOF
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
