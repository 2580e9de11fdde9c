//! NASM-syntax backend for x86_64 Linux. Programs enter at `_start` and
//! leave through the `exit` syscall (number 60).

use super::assembly::{AssemblyOutput, Label};
use super::backend::{Backend, Scratch, Target};
use crate::ast::{ArithOp, CondOp, StepOp};

pub struct X64;

const fn reg(scratch: Scratch) -> &'static str {
    match scratch {
        Scratch::Primary => "rax",
        Scratch::Secondary => "rbx",
    }
}

fn slot_operand(slot: usize) -> String {
    format!("QWORD [rsp + {}]", slot * 8)
}

impl Backend for X64 {
    fn target(&self) -> Target {
        Target::X86_64Linux
    }

    fn prologue(&self, out: &mut AssemblyOutput) {
        out.directive("global _start");
        out.named_label("_start");
    }

    fn epilogue(&self, out: &mut AssemblyOutput) {
        out.instruction("mov rax, 60");
        out.instruction("mov rdi, 0");
        out.instruction("syscall");
    }

    fn move_imm(&self, out: &mut AssemblyOutput, digits: &str) {
        out.instruction(format!("mov rax, {}", digits));
    }

    fn load_slot(&self, out: &mut AssemblyOutput, scratch: Scratch, slot: usize) {
        out.instruction(format!("mov {}, {}", reg(scratch), slot_operand(slot)));
    }

    fn store_slot(&self, out: &mut AssemblyOutput, scratch: Scratch, slot: usize) {
        out.instruction(format!("mov {}, {}", slot_operand(slot), reg(scratch)));
    }

    fn binop(&self, out: &mut AssemblyOutput, op: ArithOp) {
        match op {
            ArithOp::Add => out.instruction("add rax, rbx"),
            ArithOp::Subtract => out.instruction("sub rax, rbx"),
            ArithOp::Multiply => out.instruction("imul rax, rbx"),
            ArithOp::Divide => {
                // signed division: sign-extend rax into rdx:rax first
                out.instruction("cqo");
                out.instruction("idiv rbx");
            }
        }
    }

    fn step(&self, out: &mut AssemblyOutput, op: StepOp) {
        match op {
            StepOp::Increment => out.instruction("add rax, 1"),
            StepOp::Decrement => out.instruction("sub rax, 1"),
        }
    }

    fn compare_branch(&self, out: &mut AssemblyOutput, op: CondOp, target: Label) {
        let jump = match op {
            CondOp::Greater => "jg",
            CondOp::GreaterEqual => "jge",
            CondOp::Less => "jl",
            CondOp::LessEqual => "jle",
            CondOp::Equal => "je",
            CondOp::NotEqual => "jne",
        };
        out.instruction("cmp rax, rbx");
        out.instruction(format!("{} {}", jump, target));
    }

    fn branch_if_zero(&self, out: &mut AssemblyOutput, target: Label) {
        out.instruction("test rax, rax");
        out.instruction(format!("jz {}", target));
    }

    fn jump(&self, out: &mut AssemblyOutput, target: Label) {
        out.instruction(format!("jmp {}", target));
    }

    fn exit_with_slot(&self, out: &mut AssemblyOutput, slot: usize) {
        out.instruction(format!("mov rdi, {}", slot_operand(slot)));
        out.instruction("mov rax, 60");
        out.instruction("syscall");
    }
}
