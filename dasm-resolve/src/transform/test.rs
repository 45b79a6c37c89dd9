use std::fmt::Write;

use expect_test::{expect, Expect};

use crate::{resolve, Options};

fn check_opts(opts: &Options, src: &str, expect: Expect) {
    let symtab = resolve(src, &opts.dialect);
    let mut diag = Vec::new();
    let result = super::transform(src, &symtab, opts, &mut diag);
    let mut out = String::new();
    match result {
        Ok(t) => {
            // trailing padding is pinned down by the layout tests
            // below; keep the snapshots free of invisible whitespace
            for line in &t.lines {
                out.push_str(line.trim_end());
                out.push('\n');
            }
            writeln!(out, "== errors: {}", t.errors).unwrap();
        }
        Err(a) => writeln!(out, "== {a} ({} errors)", a.errors).unwrap(),
    }
    let diag = String::from_utf8(diag).unwrap();
    if !diag.is_empty() {
        out.push_str("== diagnostics:\n");
        out.push_str(&diag);
    }
    expect.assert_eq(&out);
}

fn check(src: &str, expect: Expect) {
    check_opts(&Options::default(), src, expect);
}

#[test]
fn empty() {
    check(
        "",
        expect![[r#"
            == errors: 0
        "#]],
    );
}

// Fully specified input passes through untouched apart from trailing
// whitespace; nothing is rewritten.
#[test]
fn passthrough() {
    check(
        "# setup\n        ADD r1,r2,r3\nx:      DATA 18\n        HALT r0,r0,r0",
        expect![[r#"
            # setup
                    ADD r1,r2,r3
            x:      DATA 18
                    HALT r0,r0,r0
            == errors: 0
        "#]],
    );
}

#[test]
fn worked_example() {
    check(
        "again:  STORE r1,x\n        SUB   r1,r0,r0[1]\n        JUMP/P  again\n        HALT r0,r0,r0\nx:      DATA 0",
        expect![[r#"
            again:   STORE  r1,r0,r15[4] #x
                    SUB   r1,r0,r0[1]
                   ADD/P  r15,r0,r15[-2] #again
                    HALT r0,r0,r0
            x:      DATA 0
            == errors: 0
        "#]],
    );
}

#[test]
fn forward_and_backward_references() {
    check(
        "top:    LOAD r1,bottom\n        LOAD r2,top\nself:   LOAD r3,self\nbottom: DATA 7",
        expect![[r#"
            top:   LOAD  r1,r0,r15[3] #bottom
                   LOAD  r2,r0,r15[-1] #top
            self:   LOAD  r3,r0,r15[0] #self
            bottom: DATA 7
            == errors: 0
        "#]],
    );
}

#[test]
fn label_on_comment_line_binds_ahead() {
    check(
        "loop:\n        ADD r1,r2,r3\n        JUMP loop",
        expect![[r#"
            loop:
                    ADD r1,r2,r3
                   ADD  r15,r0,r15[-1] #loop
            == errors: 0
        "#]],
    );
}

// A line that classified but failed to rewrite still consumes its
// address slot, so later displacements match the label table.
#[test]
fn unresolved_label_keeps_addressing() {
    check(
        "        LOAD r1,missing\n        LOAD r2,x\nx:      DATA 0",
        expect![[r#"
                   LOAD  r2,r0,r15[1] #x
            x:      DATA 0
            == errors: 1
            == diagnostics:
            Unresolved label `missing` in line 0:         LOAD r1,missing
        "#]],
    );
}

#[test]
fn syntax_error_reported_and_dropped() {
    check(
        "        BOGUS!!!\n        ADD r1,r2,r3",
        expect![[r#"
                    ADD r1,r2,r3
            == errors: 1
            == diagnostics:
            Syntax error in line 0:         BOGUS!!!
        "#]],
    );
}

#[test]
fn unknown_flag_reported() {
    check(
        "        ADD/Q r1,r2,r3",
        expect![[r#"
            == errors: 1
            == diagnostics:
            Unknown condition flag `Q` in line 0:         ADD/Q r1,r2,r3
        "#]],
    );
}

// The sixth error breaks the budget of five; the seventh line is
// never looked at.
#[test]
fn abandoned_past_error_limit() {
    check(
        "one\ntwo\nthree\nfour\nfive\nsix\nseven",
        expect![[r#"
            == too many errors; abandoning (6 errors)
            == diagnostics:
            Syntax error in line 0: one
            Syntax error in line 1: two
            Syntax error in line 2: three
            Syntax error in line 3: four
            Syntax error in line 4: five
            Syntax error in line 5: six
        "#]],
    );
}

#[test]
fn error_limit_is_configurable() {
    let opts = Options {
        error_limit: 0,
        ..Options::default()
    };
    check_opts(
        &opts,
        "bad!\nADD r1,r2,r3",
        expect![[r#"
            == too many errors; abandoning (1 errors)
            == diagnostics:
            Syntax error in line 0: bad!
        "#]],
    );
}

#[test]
fn jump_rewritten_to_add() {
    let opts = Options::default();
    let src = "x: DATA 0\n        JUMP x";
    let symtab = resolve(src, &opts.dialect);
    let t = super::transform(src, &symtab, &opts, &mut Vec::new()).unwrap();
    assert!(t.lines.iter().all(|l| !l.contains("JUMP")));
    assert_eq!(t.lines[1], "       ADD  r15,r0,r15[-1] #x  ");
}

#[test]
fn rewrite_layout_exact() {
    let opts = Options::default();
    let src = "again:  STORE r1,x # store it\nx: DATA 0";
    let symtab = resolve(src, &opts.dialect);
    let t = super::transform(src, &symtab, &opts, &mut Vec::new()).unwrap();
    assert_eq!(t.lines[0], "again:   STORE  r1,r0,r15[1] #x  # store it");
}

#[test]
fn opcode_uppercased() {
    let opts = Options::default();
    let src = "store r1,x\nx: DATA 0";
    let symtab = resolve(src, &opts.dialect);
    let t = super::transform(src, &symtab, &opts, &mut Vec::new()).unwrap();
    assert_eq!(t.lines[0], "       STORE  r1,r0,r15[1] #x  ");
}
