pub mod instr;
pub mod lex;

pub use self::instr::{CondFlag, Reg};
pub use self::lex::{classify, ClassifyError, Dialect};

/// Word address in the machine's 64Ki address space.
pub type Address = u16;

/// One classified source line: an optional label, an optional trailing
/// comment, and whatever operation sits between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub label: Option<&'a str>,
    pub op: Op<'a>,
    pub comment: Option<&'a str>,
}

impl Line<'_> {
    /// Comment-only lines are the only ones that take no slot in the
    /// instruction stream.
    pub fn occupies_address(&self) -> bool {
        !matches!(self.op, Op::NoOp)
    }
}

/// The operation part of a line, discriminated by which grammar won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op<'a> {
    /// Blank, or only a label and/or comment.
    NoOp,
    /// Fully specified instruction; nothing left to resolve.
    Full {
        opcode: &'a str,
        predicate: Option<CondFlag>,
        target: Reg,
        src1: Reg,
        src2: Reg,
        /// Displacement off `src2`; reads as 0 downstream when absent.
        offset: Option<i32>,
    },
    /// A data word stored at this address rather than an instruction.
    Data {
        predicate: Option<CondFlag>,
        /// Stored word; 0 downstream when absent.
        value: Option<u32>,
    },
    /// Memory reference through a label, to be rewritten pc-relative.
    MemOp {
        opcode: &'a str,
        predicate: Option<CondFlag>,
        target: Reg,
        labelref: &'a str,
    },
    /// Jump pseudo-instruction; becomes an add on the program counter.
    Jump {
        predicate: Option<CondFlag>,
        labelref: &'a str,
    },
}
