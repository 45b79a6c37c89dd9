//! Classification of one source line against the ordered line grammars.
//!
//! A line is tried against each grammar in a fixed order and the first
//! full match wins. The order is part of the contract: a fully
//! specified instruction must never be read as a memory-reference
//! form, and a `DATA` word must never be read as an instruction.


use std::fmt;

use crate::instr::{CondFlag, Reg};
use crate::{Line, Op};

/// Grammar knobs covering the dialect variations seen in the wild.
///
/// The defaults are the canonical grammar: keywords are matched
/// case-insensitively like every other opcode, data words take no
/// predicate, and any mnemonic may appear in memory-reference form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dialect {
    /// Require the `DATA`/`JUMP` keywords in uppercase exactly.
    pub strict_keywords: bool,
    /// Accept a `/predicate` on data lines.
    pub data_predicate: bool,
    /// Mnemonics never classified as a memory-reference form, for
    /// instruction sets where a load-immediate mnemonic would
    /// otherwise swallow label operands.
    pub memop_excludes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyError {
    /// The line matched none of the line grammars.
    Syntax,
    /// The line's shape matched, but a predicate letter names no
    /// condition flag.
    Predicate(char),
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::Syntax => f.write_str("does not match any instruction form"),
            ClassifyError::Predicate(c) => write!(f, "unknown condition flag `{c}`"),
        }
    }
}

impl std::error::Error for ClassifyError {}

/// Classify one source line.
///
/// Grammars overlap, so try-order decides: full instructions first,
/// then data words, comment-only lines, memory references, and jumps
/// last. A shape match never falls through to a looser grammar, even
/// when a field inside it fails to parse.
pub fn classify<'a>(line: &'a str, dialect: &Dialect) -> Result<Line<'a>, ClassifyError> {
    if let Some(parsed) = full(line)? {
        return Ok(parsed);
    }
    if let Some(parsed) = data(line, dialect)? {
        return Ok(parsed);
    }
    if let Some(parsed) = comment_only(line) {
        return Ok(parsed);
    }
    if let Some(parsed) = memop(line, dialect)? {
        return Ok(parsed);
    }
    if let Some(parsed) = jump(line, dialect)? {
        return Ok(parsed);
    }
    Err(ClassifyError::Syntax)
}

type Attempt<'a> = Result<Option<Line<'a>>, ClassifyError>;

/// `[label:] opcode[/predicate] target,src1,src2[[offset]] [comment]`
///
/// No whitespace inside the operand list; the offset bracket abuts the
/// second source register.
fn full(line: &str) -> Attempt<'_> {
    let mut s = Scan::new(line);
    s.ws();
    let label = s.label();
    s.ws();
    let Some(opcode) = s.letters() else {
        return Ok(None);
    };
    let predicate = s.predicate();
    if !s.ws1() {
        return Ok(None);
    }
    let Some(target) = s.reg() else {
        return Ok(None);
    };
    if !s.eat(',') {
        return Ok(None);
    }
    let Some(src1) = s.reg() else {
        return Ok(None);
    };
    if !s.eat(',') {
        return Ok(None);
    }
    let Some(src2) = s.reg() else {
        return Ok(None);
    };
    let offset = s.offset();
    let Some(comment) = s.trailer() else {
        return Ok(None);
    };
    let predicate = parse_predicate(predicate)?;
    Ok(Some(Line {
        label,
        comment,
        op: Op::Full {
            opcode,
            predicate,
            target,
            src1,
            src2,
            offset,
        },
    }))
}

/// `[label:] DATA [value] [comment]`
fn data<'a>(line: &'a str, dialect: &Dialect) -> Attempt<'a> {
    let mut s = Scan::new(line);
    s.ws();
    let label = s.label();
    s.ws();
    let Some(opcode) = s.letters() else {
        return Ok(None);
    };
    if !keyword(opcode, "DATA", dialect) {
        return Ok(None);
    }
    let predicate = if dialect.data_predicate {
        s.predicate()
    } else {
        None
    };
    s.ws();
    let value = s.literal();
    let Some(comment) = s.trailer() else {
        return Ok(None);
    };
    let predicate = parse_predicate(predicate)?;
    Ok(Some(Line {
        label,
        comment,
        op: Op::Data { predicate, value },
    }))
}

/// `[label:] [comment]`, blank lines and label-only lines included.
fn comment_only(line: &str) -> Option<Line<'_>> {
    let mut s = Scan::new(line);
    s.ws();
    let label = s.label();
    let comment = s.trailer()?;
    Some(Line {
        label,
        comment,
        op: Op::NoOp,
    })
}

/// `[label:] opcode[/predicate] target,labelref [comment]`
fn memop<'a>(line: &'a str, dialect: &Dialect) -> Attempt<'a> {
    let mut s = Scan::new(line);
    s.ws();
    let label = s.label();
    s.ws();
    let Some(opcode) = s.letters() else {
        return Ok(None);
    };
    if dialect
        .memop_excludes
        .iter()
        .any(|m| m.eq_ignore_ascii_case(opcode))
    {
        return Ok(None);
    }
    let predicate = s.predicate();
    if !s.ws1() {
        return Ok(None);
    }
    let Some(target) = s.reg() else {
        return Ok(None);
    };
    if !s.eat(',') {
        return Ok(None);
    }
    let Some(labelref) = s.ident() else {
        return Ok(None);
    };
    let Some(comment) = s.trailer() else {
        return Ok(None);
    };
    let predicate = parse_predicate(predicate)?;
    Ok(Some(Line {
        label,
        comment,
        op: Op::MemOp {
            opcode,
            predicate,
            target,
            labelref,
        },
    }))
}

/// `[label:] JUMP[/predicate] labelref [comment]`. No explicit
/// registers; the target is implicitly the program counter.
fn jump<'a>(line: &'a str, dialect: &Dialect) -> Attempt<'a> {
    let mut s = Scan::new(line);
    s.ws();
    let label = s.label();
    s.ws();
    let Some(opcode) = s.letters() else {
        return Ok(None);
    };
    if !keyword(opcode, "JUMP", dialect) {
        return Ok(None);
    }
    let predicate = s.predicate();
    if !s.ws1() {
        return Ok(None);
    }
    let Some(labelref) = s.ident() else {
        return Ok(None);
    };
    let Some(comment) = s.trailer() else {
        return Ok(None);
    };
    let predicate = parse_predicate(predicate)?;
    Ok(Some(Line {
        label,
        comment,
        op: Op::Jump { predicate, labelref },
    }))
}

fn keyword(opcode: &str, kw: &str, dialect: &Dialect) -> bool {
    if dialect.strict_keywords {
        opcode == kw
    } else {
        opcode.eq_ignore_ascii_case(kw)
    }
}

fn parse_predicate(p: Option<&str>) -> Result<Option<CondFlag>, ClassifyError> {
    match p {
        Some(p) => CondFlag::parse(p)
            .map(Some)
            .map_err(ClassifyError::Predicate),
        None => Ok(None),
    }
}

/// Character cursor over one line. Multi-character matchers clone the
/// cursor, advance the clone, and commit only on success, so a failed
/// probe never consumes input.
#[derive(Debug, Clone)]
struct Scan<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scan<'a> {
    fn new(src: &'a str) -> Scan<'a> {
        Scan { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn first(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.first()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.first() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.first().is_some_and(&mut predicate) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn ws(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    /// At least one whitespace character.
    fn ws1(&mut self) -> bool {
        !self.eat_while(char::is_whitespace).is_empty()
    }

    fn done(&self) -> bool {
        self.rest().is_empty()
    }

    /// Identifier: one letter, then letters, digits, or underscore.
    fn ident(&mut self) -> Option<&'a str> {
        if !self.first().is_some_and(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        Some(self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_'))
    }

    /// Opcode mnemonic: letters only.
    fn letters(&mut self) -> Option<&'a str> {
        let s = self.eat_while(|c| c.is_ascii_alphabetic());
        (!s.is_empty()).then_some(s)
    }

    /// Leading `label:`, committed only when the colon is present.
    fn label(&mut self) -> Option<&'a str> {
        let mut probe = self.clone();
        let name = probe.ident()?;
        if !probe.eat(':') {
            return None;
        }
        *self = probe;
        Some(name)
    }

    /// `/letters` predicate; the letters are validated later.
    fn predicate(&mut self) -> Option<&'a str> {
        let mut probe = self.clone();
        if !probe.eat('/') {
            return None;
        }
        let p = probe.letters()?;
        *self = probe;
        Some(p)
    }

    /// Register token, `r` plus a decimal number.
    fn reg(&mut self) -> Option<Reg> {
        let mut probe = self.clone();
        let word = probe.eat_while(|c| c.is_ascii_alphanumeric());
        let reg = word.parse().ok()?;
        *self = probe;
        Some(reg)
    }

    /// Bracketed signed displacement, `[-12]`.
    fn offset(&mut self) -> Option<i32> {
        let mut probe = self.clone();
        if !probe.eat('[') {
            return None;
        }
        let start = probe.pos;
        probe.eat('-');
        if probe.eat_while(|c| c.is_ascii_digit()).is_empty() {
            return None;
        }
        let n = probe.src[start..probe.pos].parse().ok()?;
        if !probe.eat(']') {
            return None;
        }
        *self = probe;
        Some(n)
    }

    /// Integer literal, decimal or `0x`-prefixed hexadecimal.
    fn literal(&mut self) -> Option<u32> {
        let mut probe = self.clone();
        let n = if probe.rest().starts_with("0x") {
            probe.pos += 2;
            let digits = probe.eat_while(|c| c.is_ascii_hexdigit());
            if digits.is_empty() {
                return None;
            }
            u32::from_str_radix(digits, 16).ok()?
        } else {
            let digits = probe.eat_while(|c| c.is_ascii_digit());
            if digits.is_empty() {
                return None;
            }
            digits.parse().ok()?
        };
        *self = probe;
        Some(n)
    }

    /// Trailing comment beginning `#` or `;`, marker included.
    fn comment(&mut self) -> Option<&'a str> {
        if matches!(self.first(), Some('#' | ';')) {
            let s = self.rest();
            self.pos = self.src.len();
            Some(s)
        } else {
            None
        }
    }

    /// Optional trailing comment, then end of line. `None` means the
    /// line has trailing junk and the grammar does not match.
    fn trailer(&mut self) -> Option<Option<&'a str>> {
        self.ws();
        let comment = self.comment();
        self.ws();
        self.done().then_some(comment)
    }
}
