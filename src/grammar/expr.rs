use super::lexer::TokenKind;
use super::{Parse, ParseRes, Parser};
use crate::ast::{BinOp, Expr, ExprRef, Ident, Term, TermRef};
use crate::error::WantedSpec;

impl<'s> Parse<'s> for ExprRef<'s> {
    fn parse(parser: &mut Parser<'s>) -> ParseRes<Self> {
        parse_expr(parser, 0)
    }
}

/// Precedence climbing: parse a term as `lhs`, then keep absorbing operators
/// whose precedence clears `min_prec`, recursing one level tighter for the
/// right operand so equal precedence associates to the left.
fn parse_expr<'s>(parser: &mut Parser<'s>, min_prec: u8) -> ParseRes<ExprRef<'s>> {
    let term = match parse_term(parser)? {
        Some(term) => term,
        None => return parser.error_expected(WantedSpec::Description("'expression'")),
    };
    let mut lhs = parser.ast_mut().exprs.alloc(Expr::Term(term));
    while let Some(op) = parser.peek_kind(0).and_then(BinOp::from_token) {
        if op.precedence() < min_prec {
            break;
        }
        parser.bump();
        let rhs = parse_expr(parser, op.precedence() + 1)?;
        lhs = parser.ast_mut().exprs.alloc(match op {
            BinOp::Arith(op) => Expr::Binary { op, lhs, rhs },
            BinOp::Cond(op) => Expr::Cond { op, lhs, rhs },
        });
    }
    Ok(lhs)
}

/// A primary: integer literal, identifier or parenthesised expression.
/// Returns `None` when the current token starts none of them, leaving the
/// caller to decide what was expected.
pub(super) fn parse_term<'s>(parser: &mut Parser<'s>) -> ParseRes<Option<TermRef<'s>>> {
    if let Some(token) = parser.try_consume(TokenKind::IntLit) {
        let term = parser.ast_mut().terms.alloc(Term::IntLit(token.source));
        return Ok(Some(term));
    }
    if let Some(token) = parser.try_consume(TokenKind::Ident) {
        let term = parser.ast_mut().terms.alloc(Term::Ident(Ident {
            name: token.source,
            line: token.line,
        }));
        return Ok(Some(term));
    }
    if parser.try_consume(TokenKind::OpenParen).is_some() {
        let expr = parse_expr(parser, 0)?;
        parser.expect_token(TokenKind::CloseParen)?;
        let term = parser.ast_mut().terms.alloc(Term::Paren(expr));
        return Ok(Some(term));
    }
    Ok(None)
}
