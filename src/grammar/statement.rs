use super::expr::parse_term;
use super::lexer::TokenKind;
use super::scope::expect_scope;
use super::{Parse, ParseRes, Parser};
use crate::ast::{
    ArithOp, ExprRef, IfPred, IfPredRef, Reassign, StepOp, Stmt, StmtRef,
};
use crate::error::WantedSpec;

impl<'s> Parse<'s> for StmtRef<'s> {
    fn parse(parser: &mut Parser<'s>) -> ParseRes<Self> {
        parse_stmt(parser)
    }
}

pub(super) fn parse_stmt<'s>(parser: &mut Parser<'s>) -> ParseRes<StmtRef<'s>> {
    let stmt = match parser.peek_kind(0) {
        Some(TokenKind::Exit) if parser.peek_kind(1) == Some(TokenKind::OpenParen) => {
            parser.bump();
            parser.bump();
            let expr = ExprRef::parse(parser)?;
            parser.expect_token(TokenKind::CloseParen)?;
            parser.expect_token(TokenKind::Semi)?;
            Stmt::Exit(expr)
        }
        // commit to a declaration only on the full `let IDENT =` shape
        Some(TokenKind::Let)
            if parser.peek_kind(1) == Some(TokenKind::Ident)
                && parser.peek_kind(2) == Some(TokenKind::Eq) =>
        {
            parser.bump();
            let name = parser.expect_ident()?;
            parser.bump();
            let init = ExprRef::parse(parser)?;
            parser.expect_token(TokenKind::Semi)?;
            Stmt::Let { name, init }
        }
        Some(TokenKind::Ident) if parser.peek_kind(1) == Some(TokenKind::Eq) => {
            let name = parser.expect_ident()?;
            parser.bump();
            let value = ExprRef::parse(parser)?;
            parser.expect_token(TokenKind::Semi)?;
            Stmt::Assign { name, value }
        }
        Some(TokenKind::Ident) if matches!(
            parser.peek_kind(1),
            Some(TokenKind::PlusPlus | TokenKind::MinusMinus)
        ) =>
        {
            let name = parser.expect_ident()?;
            let op = match parser.bump().kind {
                TokenKind::PlusPlus => StepOp::Increment,
                _ => StepOp::Decrement,
            };
            parser.expect_token(TokenKind::Semi)?;
            Stmt::Reassign(Reassign::Unary { name, op })
        }
        Some(TokenKind::Ident) if matches!(
            parser.peek_kind(1),
            Some(TokenKind::PlusEq | TokenKind::MinusEq | TokenKind::StarEq | TokenKind::SlashEq)
        ) =>
        {
            let name = parser.expect_ident()?;
            let op = match parser.bump().kind {
                TokenKind::PlusEq => ArithOp::Add,
                TokenKind::MinusEq => ArithOp::Subtract,
                TokenKind::StarEq => ArithOp::Multiply,
                _ => ArithOp::Divide,
            };
            let term = match parse_term(parser)? {
                Some(term) => term,
                None => return parser.error_expected(WantedSpec::Description("'term'")),
            };
            parser.expect_token(TokenKind::Semi)?;
            Stmt::Reassign(Reassign::Compound { name, op, term })
        }
        Some(TokenKind::OpenBrace) => {
            let scope = expect_scope(parser)?;
            Stmt::Scope(scope)
        }
        Some(TokenKind::If) => {
            parser.bump();
            parser.expect_token(TokenKind::OpenParen)?;
            let condition = ExprRef::parse(parser)?;
            parser.expect_token(TokenKind::CloseParen)?;
            let then = expect_scope(parser)?;
            let pred = parse_if_pred(parser)?;
            Stmt::If {
                condition,
                then,
                pred,
            }
        }
        Some(TokenKind::While) => {
            parser.bump();
            parser.expect_token(TokenKind::OpenParen)?;
            let condition = ExprRef::parse(parser)?;
            parser.expect_token(TokenKind::CloseParen)?;
            let body = expect_scope(parser)?;
            Stmt::While { condition, body }
        }
        _ => return parser.error_expected(WantedSpec::Description("statement")),
    };
    Ok(parser.ast_mut().stmts.alloc(stmt))
}

/// `elif (cond) { ... }` repeated by recursion, optionally closed by a final
/// `else { ... }`.
fn parse_if_pred<'s>(parser: &mut Parser<'s>) -> ParseRes<Option<IfPredRef<'s>>> {
    if parser.try_consume(TokenKind::Elif).is_some() {
        parser.expect_token(TokenKind::OpenParen)?;
        let condition = ExprRef::parse(parser)?;
        parser.expect_token(TokenKind::CloseParen)?;
        let scope = expect_scope(parser)?;
        let next = parse_if_pred(parser)?;
        let pred = parser.ast_mut().preds.alloc(IfPred::Elif {
            condition,
            scope,
            next,
        });
        return Ok(Some(pred));
    }
    if parser.try_consume(TokenKind::Else).is_some() {
        let scope = expect_scope(parser)?;
        return Ok(Some(parser.ast_mut().preds.alloc(IfPred::Else(scope))));
    }
    Ok(None)
}
