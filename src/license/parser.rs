//! License expression parser.
//!
//! Two passes: an operator-precedence (shunting-yard) pass reorders tokens into
//! reverse Polish notation, then an evaluation pass builds the tree and checks
//! operand shapes. Binding strength, tightest first: `+`, `WITH`, `AND`, `OR`.
//!
//! ```text
//! "A+ WITH B"        => (A+) WITH B
//! "A OR B AND C"     => A OR (B AND C)
//! ```

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseError;
use crate::license::expression::{License, LicenseException, LicenseExpression};

/// Parentheses, the postfix `+`, or a run of anything else that is not whitespace.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[()+]|[^\s()+]+").expect("Invalid token pattern"));

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Literal(String),
    LeftParen,
    RightParen,
    Plus,
    With,
    And,
    Or,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    range: Range<usize>,
}

impl TokenKind {
    /// Binding strength of binary operators; larger binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            TokenKind::Or => 1,
            TokenKind::And => 2,
            TokenKind::With => 3,
            _ => 0,
        }
    }

    fn is_binary_operator(&self) -> bool {
        matches!(self, TokenKind::With | TokenKind::And | TokenKind::Or)
    }
}

/// Parse a license expression such as `"MIT OR (GPL-2.0-only WITH Classpath-exception-2.0)"`.
///
/// Operator keywords are case-insensitive. `NONE` and `NOASSERTION` denote the
/// sentinel expressions; every other literal is taken as a standard identifier.
pub fn parse(input: &str) -> Result<LicenseExpression, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new(
            "Empty license expression",
            0..input.len(),
            input,
        ));
    }
    let tokens = tokenize(input);
    let rpn = to_reverse_polish(&tokens, input)?;
    evaluate(&rpn, input)
}

fn tokenize(input: &str) -> Vec<Token> {
    TOKEN_PATTERN
        .find_iter(input)
        .map(|m| {
            let text = m.as_str();
            let kind = match text {
                "(" => TokenKind::LeftParen,
                ")" => TokenKind::RightParen,
                "+" => TokenKind::Plus,
                _ if text.eq_ignore_ascii_case("WITH") => TokenKind::With,
                _ if text.eq_ignore_ascii_case("AND") => TokenKind::And,
                _ if text.eq_ignore_ascii_case("OR") => TokenKind::Or,
                _ => TokenKind::Literal(text.to_string()),
            };
            Token {
                kind,
                range: m.range(),
            }
        })
        .collect()
}

/// Shunting-yard. `+` is a postfix operator that binds tighter than anything
/// else, so it goes straight to the output.
fn to_reverse_polish<'a>(tokens: &'a [Token], input: &str) -> Result<Vec<&'a Token>, ParseError> {
    let mut output: Vec<&Token> = Vec::with_capacity(tokens.len());
    let mut operators: Vec<&Token> = Vec::new();

    for token in tokens {
        match &token.kind {
            TokenKind::Literal(_) | TokenKind::Plus => output.push(token),
            TokenKind::LeftParen => operators.push(token),
            TokenKind::RightParen => loop {
                match operators.pop() {
                    Some(top) if top.kind == TokenKind::LeftParen => break,
                    Some(top) => output.push(top),
                    None => {
                        return Err(ParseError::new(
                            "Unmatched closing parenthesis",
                            token.range.clone(),
                            input,
                        ))
                    }
                }
            },
            kind => {
                while let Some(top) = operators.last() {
                    if top.kind.is_binary_operator()
                        && top.kind.precedence() >= kind.precedence()
                    {
                        output.push(top);
                        operators.pop();
                    } else {
                        break;
                    }
                }
                operators.push(token);
            }
        }
    }

    while let Some(top) = operators.pop() {
        if top.kind == TokenKind::LeftParen {
            return Err(ParseError::new(
                "Unmatched opening parenthesis",
                top.range.clone(),
                input,
            ));
        }
        output.push(top);
    }
    Ok(output)
}

fn evaluate(rpn: &[&Token], input: &str) -> Result<LicenseExpression, ParseError> {
    let mut stack: Vec<(LicenseExpression, Range<usize>)> = Vec::new();

    for token in rpn {
        let operator = || input[token.range.clone()].to_string();
        match &token.kind {
            TokenKind::Literal(text) => {
                let leaf = match text.as_str() {
                    "NONE" => LicenseExpression::None,
                    "NOASSERTION" => LicenseExpression::NoAssertion,
                    id => LicenseExpression::License(License::spdx(id)),
                };
                stack.push((leaf, token.range.clone()));
            }
            TokenKind::Plus => {
                let (operand, range) = pop_operand(&mut stack, token, input)?;
                match operand {
                    LicenseExpression::License(license) => stack.push((
                        LicenseExpression::OrLater(license),
                        range.start..token.range.end,
                    )),
                    other => {
                        return Err(ParseError::new(
                            format!(
                                "`{}` applies only to a single license, got {}",
                                operator(),
                                other.kind_name()
                            ),
                            token.range.clone(),
                            input,
                        ))
                    }
                }
            }
            TokenKind::With => {
                let (exception, exception_range) = pop_operand(&mut stack, token, input)?;
                let (license, license_range) = pop_operand(&mut stack, token, input)?;
                let Some(simple) = license.as_simple() else {
                    return Err(ParseError::new(
                        format!(
                            "`{}` expects a license or or-later license on the left, got {}",
                            operator(),
                            license.kind_name()
                        ),
                        token.range.clone(),
                        input,
                    ));
                };
                let exception = match exception {
                    LicenseExpression::License(License::Standard(standard)) => {
                        LicenseException::Standard(standard)
                    }
                    other => {
                        return Err(ParseError::new(
                            format!(
                                "`{}` expects an exception identifier on the right, got {}",
                                operator(),
                                other.kind_name()
                            ),
                            token.range.clone(),
                            input,
                        ))
                    }
                };
                stack.push((
                    LicenseExpression::with(simple, exception),
                    license_range.start..exception_range.end,
                ));
            }
            TokenKind::And | TokenKind::Or => {
                let (right, right_range) = pop_operand(&mut stack, token, input)?;
                let (left, left_range) = pop_operand(&mut stack, token, input)?;
                let combined = if token.kind == TokenKind::And {
                    LicenseExpression::and([left, right])
                } else {
                    LicenseExpression::or([left, right])
                };
                stack.push((combined, left_range.start..right_range.end));
            }
            TokenKind::LeftParen | TokenKind::RightParen => {
                return Err(ParseError::new(
                    "Unexpected parenthesis",
                    token.range.clone(),
                    input,
                ))
            }
        }
    }

    match stack.len() {
        0 => Err(ParseError::new(
            "Empty license expression",
            0..input.len(),
            input,
        )),
        1 => Ok(stack.pop().map(|(expr, _)| expr).unwrap_or(LicenseExpression::None)),
        _ => {
            let (_, range) = &stack[1];
            Err(ParseError::new(
                format!(
                    "Expected an operator before `{}`",
                    &input[range.clone()]
                ),
                range.clone(),
                input,
            ))
        }
    }
}

fn pop_operand(
    stack: &mut Vec<(LicenseExpression, Range<usize>)>,
    token: &Token,
    input: &str,
) -> Result<(LicenseExpression, Range<usize>), ParseError> {
    stack.pop().ok_or_else(|| {
        ParseError::new(
            format!("`{}` is missing an operand", &input[token.range.clone()]),
            token.range.clone(),
            input,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::expression::SimpleExpression;

    fn id(s: &str) -> LicenseExpression {
        LicenseExpression::spdx(s)
    }

    #[test]
    fn test_single_license() {
        assert_eq!(parse("MIT").unwrap(), id("MIT"));
        assert_eq!(parse("  MIT  ").unwrap(), id("MIT"));
    }

    #[test]
    fn test_or_prints_canonically() {
        let expr = parse("MIT OR GPL").unwrap();
        assert_eq!(expr, LicenseExpression::or([id("MIT"), id("GPL")]));
        assert_eq!(expr.to_string(), "GPL OR MIT");
    }

    #[test]
    fn test_or_later_with_exception() {
        let expected = LicenseExpression::with(
            SimpleExpression::OrLater(License::spdx("A")),
            LicenseException::spdx("B"),
        );
        assert_eq!(parse("(A+) WITH B").unwrap(), expected);
        assert_eq!(parse("A+ WITH B").unwrap(), expected);
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("A OR B AND C").unwrap();
        assert_eq!(expr, id("A") | (id("B") & id("C")));
        let expr = parse("A AND B OR C").unwrap();
        assert_eq!(expr, (id("A") & id("B")) | id("C"));
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse("(A OR B) AND C").unwrap();
        assert_eq!(expr, (id("A") | id("B")) & id("C"));
        assert_eq!(expr.to_string(), "C AND (A OR B)");
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(parse("mit or isc").unwrap(), id("mit") | id("isc"));
        assert_eq!(
            parse("GPL-2.0-only with Classpath-exception-2.0").unwrap(),
            LicenseExpression::with(
                SimpleExpression::License(License::spdx("GPL-2.0-only")),
                LicenseException::spdx("Classpath-exception-2.0"),
            )
        );
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(parse("NONE").unwrap(), LicenseExpression::None);
        assert_eq!(
            parse("NOASSERTION OR MIT").unwrap(),
            LicenseExpression::NoAssertion | id("MIT")
        );
    }

    #[test]
    fn test_nested_and_flattens() {
        let expr = parse("A AND (B AND C)").unwrap();
        assert_eq!(expr, LicenseExpression::and([id("A"), id("B"), id("C")]));
    }

    #[test]
    fn test_plus_on_compound_is_rejected() {
        let err = parse("(A AND B)+").unwrap_err();
        assert_eq!(err.token(), "+");
        assert!(err.message.contains("conjunction"), "{}", err.message);
    }

    #[test]
    fn test_plus_twice_is_rejected() {
        let err = parse("A++").unwrap_err();
        assert_eq!(err.range, 2..3);
        assert!(err.message.contains("or-later license"), "{}", err.message);
    }

    #[test]
    fn test_with_on_compound_is_rejected() {
        let err = parse("(A OR B) WITH C").unwrap_err();
        assert_eq!(err.token(), "WITH");
        assert!(err.message.contains("disjunction"), "{}", err.message);
    }

    #[test]
    fn test_with_twice_is_rejected() {
        let err = parse("A WITH B WITH C").unwrap_err();
        assert_eq!(err.range, 9..13);
        assert!(err.message.contains("license with exception"), "{}", err.message);
    }

    #[test]
    fn test_with_or_later_exception_is_rejected() {
        let err = parse("A WITH B+").unwrap_err();
        assert!(err.message.contains("exception identifier"), "{}", err.message);
    }

    #[test]
    fn test_missing_operand() {
        let err = parse("MIT OR").unwrap_err();
        assert_eq!(err.token(), "OR");
        let err = parse("AND MIT").unwrap_err();
        assert_eq!(err.token(), "AND");
    }

    #[test]
    fn test_two_roots() {
        let err = parse("MIT ISC").unwrap_err();
        assert_eq!(err.token(), "ISC");
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = parse("(MIT OR ISC").unwrap_err();
        assert_eq!(err.range, 0..1);
        let err = parse("MIT)").unwrap_err();
        assert_eq!(err.range, 3..4);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
        assert!(parse("()").is_err());
    }

    #[test]
    fn test_round_trip_of_printed_form() {
        for text in [
            "MIT",
            "GPL-2.0+",
            "GPL-2.0-or-later WITH Classpath-exception-2.0",
            "Apache-2.0 OR MIT",
            "ISC AND (Apache-2.0 OR MIT)",
            "NONE OR MIT AND Zlib",
            "LGPL-2.1-only+ WITH GCC-exception-3.1 AND (BSD-2-Clause OR BSD-3-Clause)",
        ] {
            let expr = parse(text).unwrap();
            assert_eq!(parse(&expr.to_string()).unwrap(), expr, "{text}");
        }
    }

    #[test]
    fn test_error_renders_caret() {
        let err = parse("MIT OR").unwrap_err();
        assert_eq!(
            err.to_string(),
            "`OR` is missing an operand\nMIT OR\n    ^^"
        );
    }
}
