use super::statement::parse_stmt;
use super::{Parse, ParseRes, Parser};
use crate::ast::Program;

impl<'s> Parse<'s> for Program<'s> {
    fn parse(parser: &mut Parser<'s>) -> ParseRes<Self> {
        let mut stmts = Vec::new();
        while parser.peek(0).is_some() {
            stmts.push(parse_stmt(parser)?);
        }
        Ok(Program { stmts })
    }
}
