//! Second pass: rewrite memory references against the label table.

#[cfg(test)]
mod test;

use std::fmt;
use std::io::{self, Write as _};

use dasm::{classify, Address, ClassifyError, CondFlag, Line, Op, Reg};

use crate::{Options, SymTab};

/// Opcode a jump pseudo-instruction is realized with: add a
/// pc-relative displacement into the program counter.
const JUMP_EXPANSION: &str = "ADD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// The line matched none of the line grammars.
    Syntax,
    /// A predicate letter named no condition flag.
    Predicate(char),
    /// A memory reference named a label with no binding.
    Unresolved(String),
}

impl From<ClassifyError> for LineError {
    fn from(e: ClassifyError) -> LineError {
        match e {
            ClassifyError::Syntax => LineError::Syntax,
            ClassifyError::Predicate(c) => LineError::Predicate(c),
        }
    }
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::Syntax => f.write_str("Syntax error"),
            LineError::Predicate(c) => write!(f, "Unknown condition flag `{c}`"),
            LineError::Unresolved(name) => write!(f, "Unresolved label `{name}`"),
        }
    }
}

impl std::error::Error for LineError {}

/// Resolved output of one run. Lines that failed are omitted and
/// counted; a run that returns at all stayed within the error budget.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub lines: Vec<String>,
    pub errors: usize,
}

/// The error budget ran out and the rest of the input was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abandoned {
    pub errors: usize,
}

impl fmt::Display for Abandoned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("too many errors; abandoning")
    }
}

impl std::error::Error for Abandoned {}

/// Rewrite the source against `symtab`.
///
/// Fully specified lines, data words, and comments pass through with
/// trailing whitespace trimmed. Memory-reference and jump lines are
/// rewritten pc-relative: the displacement is the distance from the
/// rewritten instruction itself to the referenced line, so the second
/// phase can emit it against `r15` directly.
///
/// Per-line failures are reported to `diag` with the line number and
/// original text, and the line is dropped from the output. Once more
/// than `opts.error_limit` lines have failed the remaining input is
/// discarded and the run fails as a whole.
pub fn transform<W: io::Write>(
    src: &str,
    symtab: &SymTab,
    opts: &Options,
    diag: &mut W,
) -> Result<Transformed, Abandoned> {
    let mut lines = Vec::new();
    let mut errors = 0;
    let mut address: Address = 0;
    for (lnum, raw) in src.lines().enumerate() {
        let line = raw.trim_end();
        let parsed = match classify(line, &opts.dialect) {
            Ok(parsed) => parsed,
            Err(e) => {
                errors += 1;
                report(diag, lnum, line, &LineError::from(e));
                if errors > opts.error_limit {
                    return Err(Abandoned { errors });
                }
                // unclassifiable lines consumed no address in the
                // label pass either
                continue;
            }
        };
        match rewrite(&parsed, line, address, symtab) {
            Ok(text) => lines.push(text),
            Err(e) => {
                errors += 1;
                report(diag, lnum, line, &e);
                if errors > opts.error_limit {
                    return Err(Abandoned { errors });
                }
            }
        }
        // the slot is consumed even when the rewrite failed, keeping
        // this counter in step with the label pass
        if parsed.occupies_address() {
            address += 1;
        }
    }
    tracing::debug!(lines = lines.len(), errors, "rewrite pass complete");
    Ok(Transformed { lines, errors })
}

fn report<W: io::Write>(diag: &mut W, lnum: usize, line: &str, err: &LineError) {
    let _ = writeln!(diag, "{err} in line {lnum}: {line}");
}

fn rewrite(
    parsed: &Line<'_>,
    line: &str,
    address: Address,
    symtab: &SymTab,
) -> Result<String, LineError> {
    match parsed.op {
        Op::NoOp | Op::Full { .. } | Op::Data { .. } => Ok(line.to_string()),
        Op::MemOp {
            opcode,
            predicate,
            target,
            labelref,
        } => {
            let displacement = displacement(symtab, labelref, address)?;
            Ok(render(
                parsed.label,
                opcode,
                predicate,
                target,
                displacement,
                labelref,
                parsed.comment,
            ))
        }
        Op::Jump { predicate, labelref } => {
            let displacement = displacement(symtab, labelref, address)?;
            Ok(render(
                parsed.label,
                JUMP_EXPANSION,
                predicate,
                Reg::PC,
                displacement,
                labelref,
                parsed.comment,
            ))
        }
    }
}

/// Distance from the instruction being rewritten to the referenced
/// line. Relative to the instruction's own address, not the following
/// one; the second phase depends on this convention.
fn displacement(symtab: &SymTab, labelref: &str, address: Address) -> Result<i32, LineError> {
    let bound = symtab
        .address_of(labelref)
        .ok_or_else(|| LineError::Unresolved(labelref.to_string()))?;
    Ok(i32::from(bound) - i32::from(address))
}

/// Render a rewritten line in the fixed layout the second phase
/// expects, the referenced label kept as a trailing comment.
fn render(
    label: Option<&str>,
    opcode: &str,
    predicate: Option<CondFlag>,
    target: Reg,
    displacement: i32,
    labelref: &str,
    comment: Option<&str>,
) -> String {
    let label = match label {
        Some(l) => format!("{l}:"),
        None => "    ".to_string(),
    };
    let opcode = opcode.to_ascii_uppercase();
    let predicate = match predicate {
        Some(p) => format!("/{p}"),
        None => String::new(),
    };
    let comment = comment.unwrap_or_default();
    format!(
        "{label}   {opcode}{predicate}  {target},{},{}[{displacement}] #{labelref}  {comment}",
        Reg::ZERO,
        Reg::PC,
    )
}
