use super::lexer::TokenKind;
use super::statement::parse_stmt;
use super::{ParseRes, Parser};
use crate::ast::{Scope, ScopeRef};
use crate::error::WantedSpec;

/// `{ stmt* }`. Returns `None` when the current token is not an opening
/// brace; the statement forms that require a scope turn that into an error.
pub(super) fn parse_scope<'s>(parser: &mut Parser<'s>) -> ParseRes<Option<ScopeRef<'s>>> {
    if parser.try_consume(TokenKind::OpenBrace).is_none() {
        return Ok(None);
    }
    let mut stmts = Vec::new();
    while parser.peek(0).is_some() && !parser.at(TokenKind::CloseBrace) {
        stmts.push(parse_stmt(parser)?);
    }
    parser.expect_token(TokenKind::CloseBrace)?;
    Ok(Some(parser.ast_mut().scopes.alloc(Scope(stmts))))
}

pub(super) fn expect_scope<'s>(parser: &mut Parser<'s>) -> ParseRes<ScopeRef<'s>> {
    match parse_scope(parser)? {
        Some(scope) => Ok(scope),
        None => parser.error_expected(WantedSpec::Description("'scope'")),
    }
}
