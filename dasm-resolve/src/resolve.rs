//! First pass: build the label table.

#[cfg(test)]
mod test;

use dasm::{classify, Address, Dialect};

use crate::SymTab;

/// Scan the source and bind every label to the address of its line.
///
/// Addresses count classified non-comment lines, starting at 0; a
/// label on a comment-only line therefore binds to the address of the
/// next instruction-bearing line. Lines that fail to classify are
/// skipped without consuming an address; the rewrite pass reports
/// them, with the same bookkeeping, so the two passes stay in step.
pub fn resolve(src: &str, dialect: &Dialect) -> SymTab {
    let mut symtab = SymTab::default();
    let mut address: Address = 0;
    for line in src.lines() {
        let Ok(parsed) = classify(line.trim_end(), dialect) else {
            continue;
        };
        if let Some(label) = parsed.label {
            tracing::debug!(label, address, "binding label");
            symtab.bind(label, address);
        }
        if parsed.occupies_address() {
            address += 1;
        }
    }
    symtab
}
