use crate::arena::{Arena, NodeRef};
use crate::grammar::lexer::TokenKind;

pub type ExprRef<'s> = NodeRef<Expr<'s>>;
pub type TermRef<'s> = NodeRef<Term<'s>>;
pub type StmtRef<'s> = NodeRef<Stmt<'s>>;
pub type ScopeRef<'s> = NodeRef<Scope<'s>>;
pub type IfPredRef<'s> = NodeRef<IfPred<'s>>;

/// Owner of every AST node. The parser emplaces nodes here; the generator
/// only reads them. Dropping the arena releases the whole tree at once.
#[derive(Default, Debug)]
pub struct Ast<'s> {
    pub exprs: Arena<Expr<'s>>,
    pub terms: Arena<Term<'s>>,
    pub stmts: Arena<Stmt<'s>>,
    pub scopes: Arena<Scope<'s>>,
    pub preds: Arena<IfPred<'s>>,
}

impl<'s> Ast<'s> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug)]
pub struct Program<'s> {
    pub stmts: Vec<StmtRef<'s>>,
}

/// An identifier as it was spelled in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'s> {
    pub name: &'s str,
    pub line: u32,
}

#[derive(Debug)]
pub enum Stmt<'s> {
    Exit(ExprRef<'s>),
    Let {
        name: Ident<'s>,
        init: ExprRef<'s>,
    },
    Assign {
        name: Ident<'s>,
        value: ExprRef<'s>,
    },
    Reassign(Reassign<'s>),
    Scope(ScopeRef<'s>),
    If {
        condition: ExprRef<'s>,
        then: ScopeRef<'s>,
        pred: Option<IfPredRef<'s>>,
    },
    While {
        condition: ExprRef<'s>,
        body: ScopeRef<'s>,
    },
}

/// In-place update of an existing variable: `x++`, `x--` or `x op= term`.
#[derive(Debug)]
pub enum Reassign<'s> {
    Unary {
        name: Ident<'s>,
        op: StepOp,
    },
    Compound {
        name: Ident<'s>,
        op: ArithOp,
        term: TermRef<'s>,
    },
}

#[derive(Debug)]
pub struct Scope<'s>(pub Vec<StmtRef<'s>>);

/// Tail of an `if` statement: a linear chain of `elif` links terminated by
/// an optional `else`.
#[derive(Debug)]
pub enum IfPred<'s> {
    Elif {
        condition: ExprRef<'s>,
        scope: ScopeRef<'s>,
        next: Option<IfPredRef<'s>>,
    },
    Else(ScopeRef<'s>),
}

#[derive(Debug)]
pub enum Expr<'s> {
    Term(TermRef<'s>),
    Binary {
        op: ArithOp,
        lhs: ExprRef<'s>,
        rhs: ExprRef<'s>,
    },
    Cond {
        op: CondOp,
        lhs: ExprRef<'s>,
        rhs: ExprRef<'s>,
    },
}

#[derive(Debug)]
pub enum Term<'s> {
    /// The literal's decimal spelling, kept verbatim for emission.
    IntLit(&'s str),
    Ident(Ident<'s>),
    Paren(ExprRef<'s>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondOp {
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Equal,
    NotEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOp {
    Increment,
    Decrement,
}

/// Any infix operator the expression parser climbs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Arith(ArithOp),
    Cond(CondOp),
}

impl BinOp {
    pub const fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => Self::Arith(ArithOp::Add),
            TokenKind::Minus => Self::Arith(ArithOp::Subtract),
            TokenKind::Star => Self::Arith(ArithOp::Multiply),
            TokenKind::Slash => Self::Arith(ArithOp::Divide),
            TokenKind::Greater => Self::Cond(CondOp::Greater),
            TokenKind::GreaterEq => Self::Cond(CondOp::GreaterEqual),
            TokenKind::Less => Self::Cond(CondOp::Less),
            TokenKind::LessEq => Self::Cond(CondOp::LessEqual),
            TokenKind::EqEq => Self::Cond(CondOp::Equal),
            TokenKind::NotEq => Self::Cond(CondOp::NotEqual),
            _ => return None,
        })
    }

    /// Comparisons bind loosest, multiplication tightest. All levels are
    /// left-associative.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Cond(_) => 0,
            Self::Arith(ArithOp::Add | ArithOp::Subtract) => 1,
            Self::Arith(ArithOp::Multiply | ArithOp::Divide) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::lexer::Lexer;
    use crate::grammar::{Parse, ParseRes, Parser};

    fn parse_source(source: &str) -> ParseRes<(Program<'_>, Ast<'_>)> {
        let tokens = Lexer::new(source).tokenize().expect("lexing failed");
        Parser::new(tokens).parse_program()
    }

    fn parse_ok(source: &str) -> (Program<'_>, Ast<'_>) {
        parse_source(source).expect("expected no failure")
    }

    fn parse_expr_ok(source: &str) -> (ExprRef<'_>, Ast<'_>) {
        let tokens = Lexer::new(source).tokenize().expect("lexing failed");
        let mut parser = Parser::new(tokens);
        let expr = ExprRef::parse(&mut parser).expect("expected no failure");
        (expr, parser.into_ast())
    }

    /// Resolves an expression down to the integer literal it wraps, erroring
    /// out loudly when the shape is different.
    fn as_int<'s>(ast: &Ast<'s>, expr: ExprRef<'s>) -> &'s str {
        match &ast.exprs[expr] {
            Expr::Term(term) => match ast.terms[*term] {
                Term::IntLit(digits) => digits,
                ref other => panic!("expected int literal, got {:?}", other),
            },
            other => panic!("expected term, got {:?}", other),
        }
    }

    mod expression {
        use super::*;

        #[test]
        fn number() {
            let (expr, ast) = parse_expr_ok("12");
            assert_eq!(as_int(&ast, expr), "12");
        }

        #[test]
        fn binary_op() {
            let (expr, ast) = parse_expr_ok("1 + 2");
            match ast.exprs[expr] {
                Expr::Binary { op, lhs, rhs } => {
                    assert_eq!(op, ArithOp::Add);
                    assert_eq!(as_int(&ast, lhs), "1");
                    assert_eq!(as_int(&ast, rhs), "2");
                }
                ref other => panic!("expected binary expression, got {:?}", other),
            }
        }

        #[test]
        fn precedence() {
            // 1 + 2 * 3 parses as 1 + (2 * 3)
            let (expr, ast) = parse_expr_ok("1 + 2 * 3");
            match ast.exprs[expr] {
                Expr::Binary { op, lhs, rhs } => {
                    assert_eq!(op, ArithOp::Add);
                    assert_eq!(as_int(&ast, lhs), "1");
                    match ast.exprs[rhs] {
                        Expr::Binary { op, lhs, rhs } => {
                            assert_eq!(op, ArithOp::Multiply);
                            assert_eq!(as_int(&ast, lhs), "2");
                            assert_eq!(as_int(&ast, rhs), "3");
                        }
                        ref other => panic!("expected product, got {:?}", other),
                    }
                }
                ref other => panic!("expected sum, got {:?}", other),
            }
        }

        #[test]
        fn left_associativity() {
            // a - b - c parses as (a - b) - c
            let (expr, ast) = parse_expr_ok("10 - 3 - 2");
            match ast.exprs[expr] {
                Expr::Binary { op, lhs, rhs } => {
                    assert_eq!(op, ArithOp::Subtract);
                    assert_eq!(as_int(&ast, rhs), "2");
                    match ast.exprs[lhs] {
                        Expr::Binary { op, lhs, rhs } => {
                            assert_eq!(op, ArithOp::Subtract);
                            assert_eq!(as_int(&ast, lhs), "10");
                            assert_eq!(as_int(&ast, rhs), "3");
                        }
                        ref other => panic!("expected nested difference, got {:?}", other),
                    }
                }
                ref other => panic!("expected difference, got {:?}", other),
            }
        }

        #[test]
        fn comparison_binds_loosest() {
            // 4 + 1 > 2 parses as (4 + 1) > 2
            let (expr, ast) = parse_expr_ok("4 + 1 > 2");
            match ast.exprs[expr] {
                Expr::Cond { op, lhs, rhs } => {
                    assert_eq!(op, CondOp::Greater);
                    assert!(matches!(ast.exprs[lhs], Expr::Binary { .. }));
                    assert_eq!(as_int(&ast, rhs), "2");
                }
                ref other => panic!("expected comparison, got {:?}", other),
            }
        }

        #[test]
        fn parenthesised() {
            // (1 + 2) * 3 keeps the sum on the left
            let (expr, ast) = parse_expr_ok("(1 + 2) * 3");
            match ast.exprs[expr] {
                Expr::Binary { op, lhs, rhs } => {
                    assert_eq!(op, ArithOp::Multiply);
                    assert_eq!(as_int(&ast, rhs), "3");
                    match &ast.exprs[lhs] {
                        Expr::Term(term) => match ast.terms[*term] {
                            Term::Paren(inner) => {
                                assert!(matches!(ast.exprs[inner], Expr::Binary { .. }))
                            }
                            ref other => panic!("expected paren term, got {:?}", other),
                        },
                        other => panic!("expected term, got {:?}", other),
                    }
                }
                ref other => panic!("expected product, got {:?}", other),
            }
        }
    }

    mod statement {
        use super::*;

        #[test]
        fn exit_statement() {
            let (program, ast) = parse_ok("exit(0);");
            assert_eq!(program.stmts.len(), 1);
            assert!(matches!(ast.stmts[program.stmts[0]], Stmt::Exit(_)));
        }

        #[test]
        fn let_and_assign() {
            let (program, ast) = parse_ok("let x = 1; x = 2;");
            match ast.stmts[program.stmts[0]] {
                Stmt::Let { name, .. } => assert_eq!(name.name, "x"),
                ref other => panic!("expected let, got {:?}", other),
            }
            match ast.stmts[program.stmts[1]] {
                Stmt::Assign { name, .. } => assert_eq!(name.name, "x"),
                ref other => panic!("expected assignment, got {:?}", other),
            }
        }

        #[test]
        fn reassign_forms() {
            let (program, ast) = parse_ok("x++; x--; x += 1; x -= 2; x *= 3; x /= 4;");
            let ops: Vec<_> = program
                .stmts
                .iter()
                .map(|&stmt| match &ast.stmts[stmt] {
                    Stmt::Reassign(re) => match re {
                        Reassign::Unary { op, .. } => format!("{:?}", op),
                        Reassign::Compound { op, .. } => format!("{:?}", op),
                    },
                    other => panic!("expected reassign, got {:?}", other),
                })
                .collect();
            assert_eq!(
                ops,
                ["Increment", "Decrement", "Add", "Subtract", "Multiply", "Divide"]
            );
        }

        #[test]
        fn compound_rhs_is_a_term() {
            // the right-hand side of `op=` is a single term, not an expression
            let err = parse_source("x += 1 + 2;").unwrap_err();
            assert_eq!(err.to_string(), "[Parsing Error] Expected ';' on line 1");
        }

        #[test]
        fn if_chain_is_linear() {
            let (program, ast) =
                parse_ok("if (1) { exit(1); } elif (2) { exit(2); } else { exit(3); }");
            let pred = match ast.stmts[program.stmts[0]] {
                Stmt::If { pred, .. } => pred.expect("expected a predicate chain"),
                ref other => panic!("expected if, got {:?}", other),
            };
            let next = match ast.preds[pred] {
                IfPred::Elif { next, .. } => next.expect("expected a trailing else"),
                ref other => panic!("expected elif, got {:?}", other),
            };
            assert!(matches!(ast.preds[next], IfPred::Else(_)));
        }

        #[test]
        fn while_statement() {
            let (program, ast) = parse_ok("while (1) { exit(0); }");
            assert!(matches!(ast.stmts[program.stmts[0]], Stmt::While { .. }));
        }

        #[test]
        fn missing_semicolon_names_the_line() {
            let err = parse_source("exit(1)").unwrap_err();
            assert_eq!(err.to_string(), "[Parsing Error] Expected ';' on line 1");
        }

        #[test]
        fn missing_scope_after_if() {
            let err = parse_source("if (1) exit(1);").unwrap_err();
            assert_eq!(err.to_string(), "[Parsing Error] Expected 'scope' on line 1");
        }

        #[test]
        fn missing_expression_in_parens() {
            let err = parse_source("exit();").unwrap_err();
            assert_eq!(
                err.to_string(),
                "[Parsing Error] Expected 'expression' on line 1"
            );
        }
    }
}
