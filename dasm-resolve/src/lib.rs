//! First assembly phase: resolve symbolic memory references.
//!
//! Source may name memory locations by label instead of spelling out
//! register and displacement operands:
//!
//! ```text
//! again:  STORE r1,x
//!         SUB   r1,r0,r0[1]
//!         JUMP/P  again
//!         HALT r0,r0,r0
//! x:      DATA 0
//! ```
//!
//! Two passes over the source turn every such reference into a fully
//! specified pc-relative operand triple: `resolve` binds each label
//! to the address of its line, then `transform` rewrites
//! memory-reference and jump lines against the table, leaving
//! everything else untouched. The output feeds the second phase, which
//! encodes binary instruction words.

use ahash::AHashMap;
use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

use dasm::Address;
pub use dasm::Dialect;

pub mod resolve;
pub mod transform;

pub use self::resolve::resolve;
pub use self::transform::{transform, Abandoned, LineError, Transformed};

type LabelMap = AHashMap<DefaultSymbol, Address>;

/// Label bindings produced by the first pass, read-only in the second.
///
/// A label is bound to the address of the line it appears on; a later
/// binding for the same name silently replaces the earlier one.
#[derive(Debug, Default)]
pub struct SymTab {
    si: StringInterner<DefaultBackend>,
    labels: LabelMap,
}

impl SymTab {
    pub fn bind(&mut self, name: &str, address: Address) {
        let sym = self.si.get_or_intern(name);
        self.labels.insert(sym, address);
    }

    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.si.get(name).and_then(|sym| self.labels.get(&sym).copied())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Bindings in name order.
    pub fn bindings(&self) -> Vec<(&str, Address)> {
        let mut out: Vec<_> = self
            .labels
            .iter()
            .filter_map(|(sym, addr)| self.si.resolve(*sym).map(|name| (name, *addr)))
            .collect();
        out.sort();
        out
    }
}

const DEFAULT_ERROR_LIMIT: usize = 5;

/// Knobs for one run of the rewrite pass. Both the grammar dialect and
/// the error budget are per-run values handed in by the caller; the
/// passes keep no process-wide state.
#[derive(Debug, Clone)]
pub struct Options {
    pub dialect: Dialect,
    /// Abandon the run once more than this many lines have failed.
    pub error_limit: usize,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            dialect: Dialect::default(),
            error_limit: DEFAULT_ERROR_LIMIT,
        }
    }
}
