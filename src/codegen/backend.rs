use std::fmt;
use std::str::FromStr;

use super::assembly::{AssemblyOutput, Label};
use super::{arm64::Arm64, x86_64::X64};
use crate::ast::{ArithOp, CondOp, StepOp};

/// The two registers the stack machine cycles values through. Popping the
/// left operand targets the primary register, the right operand the
/// secondary; arithmetic leaves its result in the primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scratch {
    Primary,
    Secondary,
}

/// Everything that differs between the emitted instruction sets: register
/// names, load/store idioms, compare/branch mnemonics, the exit syscall ABI
/// and the prologue shape. The generator drives these against its own stack
/// discipline, so backends stay register-allocation-free.
pub trait Backend {
    fn target(&self) -> Target;

    fn prologue(&self, out: &mut AssemblyOutput);
    /// Fallback exit with status 0 after the last statement.
    fn epilogue(&self, out: &mut AssemblyOutput);

    /// Load an integer literal (decimal spelling) into the primary register.
    fn move_imm(&self, out: &mut AssemblyOutput, digits: &str);
    /// Load a frame slot (8-byte units above the stack pointer).
    fn load_slot(&self, out: &mut AssemblyOutput, reg: Scratch, slot: usize);
    fn store_slot(&self, out: &mut AssemblyOutput, reg: Scratch, slot: usize);

    /// `primary = primary op secondary`, signed.
    fn binop(&self, out: &mut AssemblyOutput, op: ArithOp);
    /// Increment or decrement the primary register by one.
    fn step(&self, out: &mut AssemblyOutput, op: StepOp);

    /// Compare primary against secondary and branch to `target` when the
    /// condition holds.
    fn compare_branch(&self, out: &mut AssemblyOutput, op: CondOp, target: Label);
    fn branch_if_zero(&self, out: &mut AssemblyOutput, target: Label);
    fn jump(&self, out: &mut AssemblyOutput, target: Label);

    /// Terminate the process with the value stored in `slot` as exit code.
    fn exit_with_slot(&self, out: &mut AssemblyOutput, slot: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    X86_64Linux,
    Arm64Darwin,
}

impl Target {
    /// Backend matching the operating system the compiler itself runs on.
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::Arm64Darwin
        } else {
            Self::X86_64Linux
        }
    }

    pub fn backend(self) -> Box<dyn Backend> {
        match self {
            Self::X86_64Linux => Box::new(X64),
            Self::Arm64Darwin => Box::new(Arm64),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::X86_64Linux => "x86_64-linux",
            Self::Arm64Darwin => "arm64-darwin",
        })
    }
}

impl FromStr for Target {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_64-linux" => Ok(Self::X86_64Linux),
            "arm64-darwin" => Ok(Self::Arm64Darwin),
            other => Err(format!(
                "unknown target `{}`, expected x86_64-linux or arm64-darwin",
                other
            )),
        }
    }
}
