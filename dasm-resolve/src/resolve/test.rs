use std::fmt::Write;

use expect_test::{expect, Expect};

use dasm::Dialect;

fn check(src: &str, expect: Expect) {
    let symtab = super::resolve(src, &Dialect::default());
    let mut out = String::new();
    for (name, address) in symtab.bindings() {
        writeln!(out, "{name} = {address}").unwrap();
    }
    expect.assert_eq(&out);
}

#[test]
fn empty() {
    check("", expect![[""]]);
}

#[test]
fn label_addresses() {
    check(
        "again:  STORE r1,x\n        SUB   r1,r0,r0[1]\n        JUMP/P  again\n        HALT r0,r0,r0\nx:      DATA 0",
        expect![[r#"
            again = 0
            x = 4
        "#]],
    );
}

// Blank, comment-only, and label-only lines take no address slot; a
// label sitting on one binds to the next instruction-bearing line.
#[test]
fn comments_consume_no_address() {
    check(
        "# prologue\n\nstart:\n        ADD r1,r2,r3\nmid: ; note\n        SUB r1,r1,r0\n",
        expect![[r#"
            mid = 1
            start = 0
        "#]],
    );
}

// A label at end of file with nothing after it binds to the address
// one past the last instruction.
#[test]
fn trailing_label() {
    check(
        "        ADD r1,r2,r3\nend:",
        expect![[r#"
            end = 1
        "#]],
    );
}

#[test]
fn duplicate_label_overwrites() {
    check(
        "x: DATA 1\nx: DATA 2",
        expect![[r#"
            x = 1
        "#]],
    );
}

// Unclassifiable lines are swallowed here and consume no address; the
// rewrite pass is the one that reports them.
#[test]
fn bad_lines_skipped() {
    check(
        "!!!\na: ADD r1,r2,r3\n???\nb: DATA 0",
        expect![[r#"
            a = 0
            b = 1
        "#]],
    );
}

// A label on an instruction denotes that same line's address, not the
// following one.
#[test]
fn direct_lookup() {
    let symtab = super::resolve("a: DATA 0\nb: DATA 0", &Dialect::default());
    assert_eq!(symtab.len(), 2);
    assert!(!symtab.is_empty());
    assert_eq!(symtab.address_of("a"), Some(0));
    assert_eq!(symtab.address_of("b"), Some(1));
    assert_eq!(symtab.address_of("missing"), None);
}

#[test]
fn label_binds_own_line() {
    check(
        "first: ADD r1,r2,r3\nsecond: SUB r1,r2,r3",
        expect![[r#"
            first = 0
            second = 1
        "#]],
    );
}
