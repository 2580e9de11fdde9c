//! Tree-walking code generator. The runtime stack is modelled as two
//! regions indexed upward from the stack pointer in 8-byte slots: one slot
//! per live named variable, then a growing region for expression
//! temporaries. `var_count` and `expr_depth` size the two regions; pushes
//! and pops address `sp + 8 * (var_count + expr_depth)`.

pub mod assembly;

mod arm64;
mod backend;
mod x86_64;

pub use arm64::Arm64;
pub use backend::{Backend, Scratch, Target};
pub use x86_64::X64;

use log::debug;
use thiserror::Error;

use crate::ast::{
    Ast, CondOp, Expr, ExprRef, IfPred, IfPredRef, Program, Reassign, ScopeRef, Stmt, StmtRef,
    Term, TermRef,
};
use assembly::{AssemblyOutput, LabelAllocator};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("Undeclared Identifier: {0}")]
    UndeclaredIdentifier(String),
    #[error("Identifier already used: {0}")]
    RedeclaredIdentifier(String),
}

pub fn compile<'s>(
    program: &Program<'s>,
    ast: &Ast<'s>,
    backend: &dyn Backend,
) -> Result<String, CodegenError> {
    debug!(
        "generating {} for {} top-level statements",
        backend.target(),
        program.stmts.len()
    );
    let output = Generator::new(ast, backend).generate(program)?;
    Ok(output.to_string())
}

struct Var<'s> {
    name: &'s str,
    slot: usize,
}

struct Generator<'a, 's> {
    ast: &'a Ast<'s>,
    backend: &'a dyn Backend,
    output: AssemblyOutput,
    /// Currently live named variables, in declaration order.
    vars: Vec<Var<'s>>,
    /// Saved `vars` lengths, one per open scope.
    scopes: Vec<usize>,
    /// Slots taken by the variable region.
    var_count: usize,
    /// Height of the expression region on top of it.
    expr_depth: usize,
    labels: LabelAllocator,
}

impl<'a, 's> Generator<'a, 's> {
    fn new(ast: &'a Ast<'s>, backend: &'a dyn Backend) -> Self {
        Self {
            ast,
            backend,
            output: AssemblyOutput::new(),
            vars: Vec::new(),
            scopes: Vec::new(),
            var_count: 0,
            expr_depth: 0,
            labels: LabelAllocator::new(),
        }
    }

    fn generate(mut self, program: &Program<'s>) -> Result<AssemblyOutput, CodegenError> {
        self.backend.prologue(&mut self.output);
        for &stmt in &program.stmts {
            self.statement(stmt)?;
        }
        self.backend.epilogue(&mut self.output);
        Ok(self.output)
    }

    fn statement(&mut self, stmt: StmtRef<'s>) -> Result<(), CodegenError> {
        let ast = self.ast;
        match &ast.stmts[stmt] {
            Stmt::Exit(expr) => {
                self.expression(*expr)?;
                self.output.comment("exit");
                self.expr_depth -= 1;
                let top = self.var_count + self.expr_depth;
                self.backend.exit_with_slot(&mut self.output, top);
            }
            Stmt::Let { name, init } => {
                if self.lookup(name.name).is_some() {
                    return Err(CodegenError::RedeclaredIdentifier(name.name.to_string()));
                }
                let slot = self.var_count;
                self.vars.push(Var {
                    name: name.name,
                    slot,
                });
                self.var_count += 1;
                self.output.comment(format!(
                    "variable '{}' allocated at offset {}",
                    name.name,
                    slot * 8
                ));
                self.expression(*init)?;
                self.pop(Scratch::Primary);
                self.backend
                    .store_slot(&mut self.output, Scratch::Primary, slot);
            }
            Stmt::Assign { name, value } => {
                let slot = self.slot_of(name.name)?;
                self.output.comment(format!(
                    "reassigning variable '{}' at offset {}",
                    name.name,
                    slot * 8
                ));
                self.expression(*value)?;
                self.pop(Scratch::Primary);
                self.backend
                    .store_slot(&mut self.output, Scratch::Primary, slot);
            }
            Stmt::Reassign(Reassign::Unary { name, op }) => {
                let slot = self.slot_of(name.name)?;
                self.backend
                    .load_slot(&mut self.output, Scratch::Primary, slot);
                self.backend.step(&mut self.output, *op);
                self.backend
                    .store_slot(&mut self.output, Scratch::Primary, slot);
            }
            Stmt::Reassign(Reassign::Compound { name, op, term }) => {
                let slot = self.slot_of(name.name)?;
                self.term(*term)?;
                self.pop(Scratch::Secondary);
                self.backend
                    .load_slot(&mut self.output, Scratch::Primary, slot);
                self.backend.binop(&mut self.output, *op);
                self.backend
                    .store_slot(&mut self.output, Scratch::Primary, slot);
            }
            Stmt::Scope(scope) => self.scope(*scope)?,
            Stmt::If {
                condition,
                then,
                pred,
            } => {
                self.output.comment("if");
                self.expression(*condition)?;
                self.pop(Scratch::Primary);
                let false_label = self.labels.fresh();
                self.backend.branch_if_zero(&mut self.output, false_label);
                self.scope(*then)?;
                match pred {
                    Some(pred) => {
                        let end_label = self.labels.tagged("end_");
                        self.backend.jump(&mut self.output, end_label);
                        self.output.label(false_label);
                        self.if_pred(*pred, end_label)?;
                        self.output.label(end_label);
                    }
                    None => self.output.label(false_label),
                }
                self.output.comment("/if");
            }
            Stmt::While { condition, body } => {
                self.output.comment("while");
                let start_label = self.labels.tagged("loop_start_");
                let end_label = self.labels.tagged("end_");
                self.output.label(start_label);
                self.expression(*condition)?;
                self.pop(Scratch::Primary);
                self.backend.branch_if_zero(&mut self.output, end_label);
                self.scope(*body)?;
                self.backend.jump(&mut self.output, start_label);
                self.output.label(end_label);
                self.output.comment("/while");
            }
        }
        Ok(())
    }

    /// Elif chains share the outer `end` label for every exit; each link
    /// places its own fall-through label.
    fn if_pred(
        &mut self,
        pred: IfPredRef<'s>,
        end_label: assembly::Label,
    ) -> Result<(), CodegenError> {
        let ast = self.ast;
        match &ast.preds[pred] {
            IfPred::Elif {
                condition,
                scope,
                next,
            } => {
                self.output.comment("elif");
                self.expression(*condition)?;
                self.pop(Scratch::Primary);
                let false_label = self.labels.fresh();
                self.backend.branch_if_zero(&mut self.output, false_label);
                self.scope(*scope)?;
                self.backend.jump(&mut self.output, end_label);
                self.output.label(false_label);
                if let Some(next) = next {
                    self.if_pred(*next, end_label)?;
                }
            }
            IfPred::Else(scope) => {
                self.output.comment("else");
                self.scope(*scope)?;
            }
        }
        Ok(())
    }

    fn scope(&mut self, scope: ScopeRef<'s>) -> Result<(), CodegenError> {
        self.begin_scope();
        let ast = self.ast;
        for &stmt in &ast.scopes[scope].0 {
            self.statement(stmt)?;
        }
        self.end_scope();
        Ok(())
    }

    /// Evaluates `expr` and leaves its value in the topmost expression slot:
    /// `expr_depth` ends exactly one higher than it started.
    fn expression(&mut self, expr: ExprRef<'s>) -> Result<(), CodegenError> {
        let ast = self.ast;
        match &ast.exprs[expr] {
            Expr::Term(term) => self.term(*term)?,
            Expr::Binary { op, lhs, rhs } => {
                // right operand first, so the left ends up popped first
                self.expression(*rhs)?;
                self.expression(*lhs)?;
                self.pop(Scratch::Primary);
                self.pop(Scratch::Secondary);
                self.backend.binop(&mut self.output, *op);
                self.push(Scratch::Primary);
            }
            Expr::Cond { op, lhs, rhs } => {
                self.expression(*rhs)?;
                self.expression(*lhs)?;
                self.pop(Scratch::Primary);
                self.pop(Scratch::Secondary);
                let true_label = self.labels.tagged(cond_tag(*op));
                let end_label = self.labels.tagged("end_");
                self.backend.compare_branch(&mut self.output, *op, true_label);
                self.backend.move_imm(&mut self.output, "0");
                self.backend.jump(&mut self.output, end_label);
                self.output.label(true_label);
                self.backend.move_imm(&mut self.output, "1");
                self.output.label(end_label);
                self.push(Scratch::Primary);
            }
        }
        Ok(())
    }

    fn term(&mut self, term: TermRef<'s>) -> Result<(), CodegenError> {
        let ast = self.ast;
        match &ast.terms[term] {
            Term::IntLit(digits) => {
                self.backend.move_imm(&mut self.output, digits);
                self.push(Scratch::Primary);
            }
            Term::Ident(name) => {
                let slot = self.slot_of(name.name)?;
                self.backend
                    .load_slot(&mut self.output, Scratch::Primary, slot);
                self.push(Scratch::Primary);
            }
            Term::Paren(expr) => self.expression(*expr)?,
        }
        Ok(())
    }

    fn push(&mut self, reg: Scratch) {
        let slot = self.var_count + self.expr_depth;
        self.backend.store_slot(&mut self.output, reg, slot);
        self.expr_depth += 1;
    }

    fn pop(&mut self, reg: Scratch) {
        self.expr_depth -= 1;
        let slot = self.var_count + self.expr_depth;
        self.backend.load_slot(&mut self.output, reg, slot);
    }

    fn begin_scope(&mut self) {
        self.scopes.push(self.vars.len());
    }

    fn end_scope(&mut self) {
        let saved = self.scopes.pop().expect("scope stack underflow");
        let pop_count = self.vars.len() - saved;
        self.vars.truncate(saved);
        self.var_count -= pop_count;
    }

    /// Declarations are searched against every live binding, not just the
    /// innermost scope: shadowing is rejected until the outer binding dies.
    fn lookup(&self, name: &str) -> Option<usize> {
        self.vars
            .iter()
            .find(|var| var.name == name)
            .map(|var| var.slot)
    }

    fn slot_of(&self, name: &str) -> Result<usize, CodegenError> {
        self.lookup(name)
            .ok_or_else(|| CodegenError::UndeclaredIdentifier(name.to_string()))
    }
}

const fn cond_tag(op: CondOp) -> &'static str {
    match op {
        CondOp::Greater => "greater_",
        CondOp::GreaterEqual => "greater_eq_",
        CondOp::Less => "less_",
        CondOp::LessEqual => "less_eq_",
        CondOp::Equal => "eq_",
        CondOp::NotEqual => "not_eq_",
    }
}
