//! Backend for arm64 Darwin. Programs expose `_main`, keep a conventional
//! frame-pointer prologue and leave through `svc #0` with x16 = 1.

use super::assembly::{AssemblyOutput, Label};
use super::backend::{Backend, Scratch, Target};
use crate::ast::{ArithOp, CondOp, StepOp};

pub struct Arm64;

const fn reg(scratch: Scratch) -> &'static str {
    match scratch {
        Scratch::Primary => "x0",
        Scratch::Secondary => "x1",
    }
}

impl Backend for Arm64 {
    fn target(&self) -> Target {
        Target::Arm64Darwin
    }

    fn prologue(&self, out: &mut AssemblyOutput) {
        out.directive(".global _main");
        out.named_label("_main");
        out.instruction("stp x29, x30, [sp, #-16]!");
        out.instruction("mov x29, sp");
    }

    fn epilogue(&self, out: &mut AssemblyOutput) {
        out.instruction("mov sp, x29");
        out.instruction("ldp x29, x30, [sp], #16");
        out.instruction("mov x16, #1");
        out.instruction("mov x0, #0");
        out.instruction("svc #0");
    }

    fn move_imm(&self, out: &mut AssemblyOutput, digits: &str) {
        out.instruction(format!("mov x0, #{}", digits));
    }

    fn load_slot(&self, out: &mut AssemblyOutput, scratch: Scratch, slot: usize) {
        out.instruction(format!("ldr {}, [sp, #{}]", reg(scratch), slot * 8));
    }

    fn store_slot(&self, out: &mut AssemblyOutput, scratch: Scratch, slot: usize) {
        out.instruction(format!("str {}, [sp, #{}]", reg(scratch), slot * 8));
    }

    fn binop(&self, out: &mut AssemblyOutput, op: ArithOp) {
        match op {
            ArithOp::Add => out.instruction("add x0, x0, x1"),
            ArithOp::Subtract => out.instruction("sub x0, x0, x1"),
            ArithOp::Multiply => out.instruction("mul x0, x0, x1"),
            ArithOp::Divide => out.instruction("sdiv x0, x0, x1"),
        }
    }

    fn step(&self, out: &mut AssemblyOutput, op: StepOp) {
        match op {
            StepOp::Increment => out.instruction("add x0, x0, #1"),
            StepOp::Decrement => out.instruction("sub x0, x0, #1"),
        }
    }

    fn compare_branch(&self, out: &mut AssemblyOutput, op: CondOp, target: Label) {
        let condition = match op {
            CondOp::Greater => "gt",
            CondOp::GreaterEqual => "ge",
            CondOp::Less => "lt",
            CondOp::LessEqual => "le",
            CondOp::Equal => "eq",
            CondOp::NotEqual => "ne",
        };
        out.instruction("cmp x0, x1");
        out.instruction(format!("b.{} {}", condition, target));
    }

    fn branch_if_zero(&self, out: &mut AssemblyOutput, target: Label) {
        out.instruction(format!("cbz x0, {}", target));
    }

    fn jump(&self, out: &mut AssemblyOutput, target: Label) {
        out.instruction(format!("b {}", target));
    }

    fn exit_with_slot(&self, out: &mut AssemblyOutput, slot: usize) {
        out.instruction(format!("ldr x0, [sp, #{}]", slot * 8));
        out.instruction("mov x16, #1");
        out.instruction("svc #0");
    }
}
