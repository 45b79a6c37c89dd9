//! The instruction-format vocabulary shared by both assembler phases:
//! condition flags and register names. Opcodes are an open set at this
//! level; only the second phase checks them against the opcode table.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

/// Condition bits guarding a predicated instruction.
///
/// A predicate is any OR-combination of the four machine condition
/// bits; `ALWAYS` and `NEVER` are the named combinations.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CondFlag(u8);

impl CondFlag {
    /// result was negative
    pub const M: CondFlag = CondFlag(0b0001);
    /// result was zero
    pub const Z: CondFlag = CondFlag(0b0010);
    /// result was positive
    pub const P: CondFlag = CondFlag(0b0100);
    /// result overflowed
    pub const V: CondFlag = CondFlag(0b1000);
    pub const NEVER: CondFlag = CondFlag(0b0000);
    pub const ALWAYS: CondFlag = CondFlag(0b1111);

    /// The flag a single mnemonic letter names, either case.
    pub fn from_letter(c: char) -> Option<CondFlag> {
        Some(match c.to_ascii_uppercase() {
            'M' => Self::M,
            'Z' => Self::Z,
            'P' => Self::P,
            'V' => Self::V,
            _ => return None,
        })
    }

    /// Parse a predicate mnemonic: one of the named combinations, or a
    /// run of flag letters such as `ZP`. Fails with the first letter
    /// that names no condition bit.
    pub fn parse(m: &str) -> Result<CondFlag, char> {
        if m.eq_ignore_ascii_case("ALWAYS") {
            return Ok(Self::ALWAYS);
        }
        if m.eq_ignore_ascii_case("NEVER") {
            return Ok(Self::NEVER);
        }
        let mut composite = Self::NEVER;
        for c in m.chars() {
            composite = composite | Self::from_letter(c).ok_or(c)?;
        }
        Ok(composite)
    }
}

impl BitOr for CondFlag {
    type Output = CondFlag;
    fn bitor(self, rhs: CondFlag) -> CondFlag {
        CondFlag(self.0 | rhs.0)
    }
}

impl fmt::Display for CondFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NEVER => f.write_str("NEVER"),
            Self::ALWAYS => f.write_str("ALWAYS"),
            _ => {
                for (flag, letter) in [
                    (Self::M, "M"),
                    (Self::Z, "Z"),
                    (Self::P, "P"),
                    (Self::V, "V"),
                ] {
                    if self.0 & flag.0 != 0 {
                        f.write_str(letter)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for CondFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// One of the sixteen general registers, `r0` through `r15`.
///
/// `r0` always reads as zero and `r15` is the program counter; the
/// rewrite of symbolic references leans on both.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(u8);

impl Reg {
    /// Hardwired zero source.
    pub const ZERO: Reg = Reg(0);
    /// Program counter.
    pub const PC: Reg = Reg(15);
}

impl FromStr for Reg {
    type Err = ();

    /// `r` followed by a decimal register number. Range checking is a
    /// second-phase concern; anything that fits a byte parses.
    fn from_str(s: &str) -> Result<Reg, ()> {
        let digits = s.strip_prefix('r').ok_or(())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(());
        }
        digits.parse().map(Reg).map_err(|_| ())
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Debug for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
