//! # Parser 测试

use super::*;
use crate::script::token::Position;

fn parse_ok(input: &str) -> Program {
    match parse(input) {
        Ok(program) => program,
        Err(e) => panic!("unexpected parse errors: {e}"),
    }
}

fn parse_with_errors(input: &str) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(input);
    let program = parser.parse_program();
    (program, parser.errors().to_vec())
}

// -------------------------------------------------------------------------
// 正常解析
// -------------------------------------------------------------------------

#[test]
fn test_statement_ordering() {
    let program = parse_ok("こんにちは[r]世界[p]");
    assert_eq!(program.len(), 4);

    let expressions: Vec<&Expression> = program.expressions().collect();
    assert_eq!(expressions[0], &Expression::text("こんにちは"));
    assert_eq!(expressions[1], &Expression::command("r"));
    assert_eq!(expressions[2], &Expression::text("世界"));
    assert_eq!(expressions[3], &Expression::command("p"));
}

#[test]
fn test_empty_input() {
    let program = parse_ok("");
    assert!(program.is_empty());
}

#[test]
fn test_plain_text_only() {
    let program = parse_ok("勇者は剣を抜いた。\nスライムが現れた！");
    assert_eq!(program.len(), 1);
    assert_eq!(
        program.statements[0].expression,
        Expression::text("勇者は剣を抜いた。\nスライムが現れた！")
    );
}

#[test]
fn test_command_with_params() {
    let program = parse_ok(r#"[se file="door.ogg" volume="0.8"]"#);
    assert_eq!(program.len(), 1);
    assert_eq!(
        program.statements[0].expression,
        Expression::command_with("se", [("file", "door.ogg"), ("volume", "0.8")])
    );
}

#[test]
fn test_command_whitespace_and_newlines() {
    let program = parse_ok("[ img\n  src = \"a.png\"\n]");
    assert_eq!(
        program.statements[0].expression,
        Expression::command_with("img", [("src", "a.png")])
    );
}

#[test]
fn test_text_keeps_newlines_between_commands() {
    let program = parse_ok("一行目[r]\n二行目");
    assert_eq!(program.len(), 3);
    assert_eq!(program.statements[2].expression, Expression::text("\n二行目"));
}

#[test]
fn test_statement_positions() {
    let program = parse_ok("東京\n[p]京都");
    assert_eq!(program.statements[0].position, Position::new(1, 1));
    assert_eq!(program.statements[1].position, Position::new(2, 1));
    assert_eq!(program.statements[2].position, Position::new(2, 4));
}

#[test]
fn test_duplicate_param_last_wins_with_warning() {
    let mut parser = Parser::new(r#"[se file="a.ogg" file="b.ogg"]"#);
    let program = parser.parse_program();
    assert!(parser.errors().is_empty());
    assert_eq!(parser.warnings().len(), 1);
    assert!(parser.warnings()[0].message.contains("duplicate parameter 'file'"));
    assert_eq!(
        program.statements[0].expression,
        Expression::command_with("se", [("file", "b.ogg")])
    );
}

// -------------------------------------------------------------------------
// 错误处理
// -------------------------------------------------------------------------

#[test]
fn test_missing_equals() {
    let (program, errors) = parse_with_errors("[se file]続き");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ParseError::MissingEquals { command, param, position }
        if command == "se" && param == "file" && *position == Position::new(1, 9)
    ));
    // 出错的命令被丢弃，后续正文照常解析
    assert_eq!(program.len(), 1);
    assert_eq!(program.statements[0].expression, Expression::text("続き"));
}

#[test]
fn test_missing_value() {
    let (program, errors) = parse_with_errors("[se file=][p]");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ParseError::MissingValue { command, param, .. } if command == "se" && param == "file"
    ));
    assert_eq!(program.len(), 1);
    assert_eq!(program.statements[0].expression, Expression::command("p"));
}

#[test]
fn test_unquoted_value_is_missing_value() {
    let (_, errors) = parse_with_errors("[wait time=10]");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ParseError::MissingValue { .. }));
}

#[test]
fn test_unterminated_command() {
    let (program, errors) = parse_with_errors("abc[se file=\"x\"");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ParseError::UnterminatedCommand { command, position }
        if command == "se" && *position == Position::new(1, 4)
    ));
    assert_eq!(program.len(), 1);
}

#[test]
fn test_unterminated_string() {
    let (program, errors) = parse_with_errors("[se file=\"abc");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ParseError::UnterminatedString { .. }));
    assert!(program.is_empty());
}

#[test]
fn test_missing_command_name() {
    let (program, errors) = parse_with_errors("[]あ");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ParseError::MissingCommandName { .. }));
    assert_eq!(program.len(), 1);

    let (_, errors) = parse_with_errors("[");
    assert!(matches!(errors[0], ParseError::MissingCommandName { .. }));
}

#[test]
fn test_illegal_character_in_command() {
    let (program, errors) = parse_with_errors("[wait 10]後");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ParseError::IllegalCharacter { literal, .. } if literal == "1"
    ));
    assert_eq!(program.len(), 1);
}

#[test]
fn test_unexpected_token_in_command() {
    let (_, errors) = parse_with_errors(r#"[se ="x"]"#);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        ParseError::UnexpectedToken {
            found: TokenKind::Equal,
            ..
        }
    ));
}

#[test]
fn test_stray_bracket_close_has_no_prefix_handler() {
    let (program, errors) = parse_with_errors("a]b");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        ParseError::NoPrefixHandler {
            kind: TokenKind::BracketClose,
            ..
        }
    ));
    assert_eq!(program.len(), 2);
}

#[test]
fn test_recovery_stops_at_next_command() {
    let (program, errors) = parse_with_errors("[se file [p]");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ParseError::MissingEquals { .. }));
    assert_eq!(program.len(), 1);
    assert_eq!(program.statements[0].expression, Expression::command("p"));
}

#[test]
fn test_errors_accumulate() {
    let result = parse("[a b]text[c d]");
    let err = result.unwrap_err();
    assert_eq!(err.len(), 2);
    assert!(err.errors.iter().all(|e| matches!(e, ParseError::MissingEquals { .. })));
    assert!(err.to_string().contains("1:5"));
}
