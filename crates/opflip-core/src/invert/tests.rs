// Engine tests. These build trees by hand; end-to-end coverage through
// the parser and renderer lives in tests/end_to_end.rs.

use pretty_assertions::assert_eq;

use super::*;
use crate::ast::{BoolOpKind, CmpOp, Expr, Pos, Program, Stmt};

const ALL_OPS: [CmpOp; 10] = [
    CmpOp::Eq,
    CmpOp::NotEq,
    CmpOp::Lt,
    CmpOp::LtE,
    CmpOp::Gt,
    CmpOp::GtE,
    CmpOp::Is,
    CmpOp::IsNot,
    CmpOp::In,
    CmpOp::NotIn,
];

fn name(s: &str) -> Expr {
    Expr::Name(s.to_string())
}

fn cmp_at(line: u32, column: u32, left: &str, op: CmpOp, right: i64) -> Expr {
    Expr::Compare {
        pos: Pos::new(line, column),
        left: Box::new(name(left)),
        ops: vec![op],
        comparators: vec![Expr::Int(right)],
    }
}

fn cmp(left: &str, op: CmpOp, right: i64) -> Expr {
    cmp_at(1, 3, left, op, right)
}

fn first_op(expr: &Expr) -> CmpOp {
    match expr {
        Expr::Compare { ops, .. } => ops[0],
        other => panic!("expected comparison, got {other:?}"),
    }
}

#[test]
fn inversion_table_pairs() {
    assert_eq!(CmpOp::Eq.inverted(), CmpOp::NotEq);
    assert_eq!(CmpOp::NotEq.inverted(), CmpOp::Eq);
    assert_eq!(CmpOp::Lt.inverted(), CmpOp::GtE);
    assert_eq!(CmpOp::LtE.inverted(), CmpOp::Gt);
    assert_eq!(CmpOp::Gt.inverted(), CmpOp::LtE);
    assert_eq!(CmpOp::GtE.inverted(), CmpOp::Lt);
    assert_eq!(CmpOp::Is.inverted(), CmpOp::IsNot);
    assert_eq!(CmpOp::IsNot.inverted(), CmpOp::Is);
    assert_eq!(CmpOp::In.inverted(), CmpOp::NotIn);
    assert_eq!(CmpOp::NotIn.inverted(), CmpOp::In);
}

#[test]
fn inversion_table_is_involutive() {
    for op in ALL_OPS {
        assert_eq!(op.inverted().inverted(), op);
    }
}

#[test]
fn change_log_preserves_append_order() {
    let mut log = ChangeLog::new();
    assert!(log.is_empty());
    log.record(Pos::new(3, 0), CmpOp::Gt, CmpOp::LtE);
    log.record(Pos::new(1, 8), CmpOp::In, CmpOp::NotIn);
    log.record(Pos::new(1, 8), CmpOp::In, CmpOp::NotIn);

    // Append order, no deduplication, no sorting by position.
    assert_eq!(log.len(), 3);
    assert_eq!(log.changes()[0].pos, Pos::new(3, 0));
    assert_eq!(log.changes()[1], log.changes()[2]);
}

#[test]
fn single_operator_branch_inversion() {
    let mut program = Program {
        statements: vec![Stmt::If {
            test: cmp_at(1, 3, "x", CmpOp::Gt, 0),
            body: vec![Stmt::Pass],
            orelse: vec![],
        }],
    };
    let changes = invert_conditions(&mut program).unwrap();

    assert_eq!(
        changes,
        vec![ChangeRecord {
            pos: Pos::new(1, 3),
            original: CmpOp::Gt,
            replacement: CmpOp::LtE,
        }]
    );
    let Stmt::If { test, .. } = &program.statements[0] else {
        panic!("branch statement replaced");
    };
    assert_eq!(first_op(test), CmpOp::LtE);
}

#[test]
fn comparison_outside_branch_is_untouched() {
    let mut program = Program {
        statements: vec![Stmt::Assign {
            target: name("result"),
            value: cmp("x", CmpOp::Gt, 0),
        }],
    };
    let snapshot = program.clone();
    let changes = invert_conditions(&mut program).unwrap();

    assert!(changes.is_empty());
    assert_eq!(program, snapshot);
}

#[test]
fn while_condition_is_untouched() {
    let mut program = Program {
        statements: vec![Stmt::While {
            test: cmp("x", CmpOp::LtE, 0),
            body: vec![Stmt::Pass],
        }],
    };
    let snapshot = program.clone();
    let changes = invert_conditions(&mut program).unwrap();

    assert!(changes.is_empty());
    assert_eq!(program, snapshot);
}

#[test]
fn combinator_operands_inherit_the_test_scope() {
    let mut program = Program {
        statements: vec![Stmt::If {
            test: Expr::BoolOp {
                op: BoolOpKind::And,
                values: vec![
                    cmp_at(1, 3, "x", CmpOp::GtE, 0),
                    cmp_at(1, 12, "x", CmpOp::NotEq, 0),
                ],
            },
            body: vec![Stmt::Pass],
            orelse: vec![],
        }],
    };
    let changes = invert_conditions(&mut program).unwrap();

    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].original, CmpOp::GtE);
    assert_eq!(changes[0].replacement, CmpOp::Lt);
    assert_eq!(changes[1].original, CmpOp::NotEq);
    assert_eq!(changes[1].replacement, CmpOp::Eq);
}

#[test]
fn elif_chain_inverts_each_test_independently() {
    // if x > 0: ... elif x < 0: ... elif x == 0: ...
    let mut program = Program {
        statements: vec![Stmt::If {
            test: cmp_at(1, 3, "x", CmpOp::Gt, 0),
            body: vec![Stmt::Assign {
                target: name("a"),
                value: cmp_at(2, 8, "y", CmpOp::Lt, 1),
            }],
            orelse: vec![Stmt::If {
                test: cmp_at(3, 5, "x", CmpOp::Lt, 0),
                body: vec![Stmt::Pass],
                orelse: vec![Stmt::If {
                    test: cmp_at(5, 5, "x", CmpOp::Eq, 0),
                    body: vec![Stmt::Pass],
                    orelse: vec![],
                }],
            }],
        }],
    };
    let changes = invert_conditions(&mut program).unwrap();

    let kinds: Vec<_> = changes.iter().map(|c| (c.original, c.replacement)).collect();
    assert_eq!(
        kinds,
        vec![
            (CmpOp::Gt, CmpOp::LtE),
            (CmpOp::Lt, CmpOp::GtE),
            (CmpOp::Eq, CmpOp::NotEq),
        ]
    );

    // The comparison in the first body was not a branch test.
    let Stmt::If { body, .. } = &program.statements[0] else {
        unreachable!()
    };
    let Stmt::Assign { value, .. } = &body[0] else {
        unreachable!()
    };
    assert_eq!(first_op(value), CmpOp::Lt);
}

#[test]
fn nested_branch_in_body_gets_its_own_scope() {
    // if x > 0:
    //     y = z < 10
    //     if y < 0:
    //         pass
    let mut program = Program {
        statements: vec![Stmt::If {
            test: cmp_at(1, 3, "x", CmpOp::Gt, 0),
            body: vec![
                Stmt::Assign {
                    target: name("y"),
                    value: cmp_at(2, 8, "z", CmpOp::Lt, 10),
                },
                Stmt::If {
                    test: cmp_at(3, 7, "y", CmpOp::Lt, 0),
                    body: vec![Stmt::Pass],
                    orelse: vec![],
                },
            ],
            orelse: vec![],
        }],
    };
    let changes = invert_conditions(&mut program).unwrap();

    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].pos, Pos::new(1, 3));
    assert_eq!(changes[1].pos, Pos::new(3, 7));

    let Stmt::If { body, .. } = &program.statements[0] else {
        unreachable!()
    };
    let Stmt::Assign { value, .. } = &body[0] else {
        unreachable!()
    };
    assert_eq!(first_op(value), CmpOp::Lt);
}

#[test]
fn chained_comparison_inverts_all_slots_logs_first() {
    // Slot-wise inversion of `a < b < c` yields `a >= b >= c`, which is
    // not the logical negation of the chain. That, and the single
    // first-slot record, are the contract.
    let mut program = Program {
        statements: vec![Stmt::If {
            test: Expr::Compare {
                pos: Pos::new(1, 3),
                left: Box::new(name("a")),
                ops: vec![CmpOp::Lt, CmpOp::Lt],
                comparators: vec![name("b"), name("c")],
            },
            body: vec![Stmt::Pass],
            orelse: vec![],
        }],
    };
    let changes = invert_conditions(&mut program).unwrap();

    assert_eq!(
        changes,
        vec![ChangeRecord {
            pos: Pos::new(1, 3),
            original: CmpOp::Lt,
            replacement: CmpOp::GtE,
        }]
    );
    let Stmt::If { test, .. } = &program.statements[0] else {
        unreachable!()
    };
    let Expr::Compare { ops, .. } = test else {
        unreachable!()
    };
    assert_eq!(ops, &vec![CmpOp::GtE, CmpOp::GtE]);
}

#[test]
fn scope_leaks_into_conditional_expressions_and_comprehensions() {
    // if (a > 0 if flag == 1 else b < 2): ...
    let mut ternary = Program {
        statements: vec![Stmt::If {
            test: Expr::IfExp {
                test: Box::new(cmp_at(1, 12, "flag", CmpOp::Eq, 1)),
                body: Box::new(cmp_at(1, 4, "a", CmpOp::Gt, 0)),
                orelse: Box::new(cmp_at(1, 25, "b", CmpOp::Lt, 2)),
            },
            body: vec![Stmt::Pass],
            orelse: vec![],
        }],
    };
    let changes = invert_conditions(&mut ternary).unwrap();
    assert_eq!(changes.len(), 3);

    // if [v for v in xs if v > 0]: ...
    let mut comp = Program {
        statements: vec![Stmt::If {
            test: Expr::ListComp {
                element: Box::new(name("v")),
                target: "v".to_string(),
                iter: Box::new(name("xs")),
                filter: Some(Box::new(cmp_at(1, 21, "v", CmpOp::Gt, 0))),
            },
            body: vec![Stmt::Pass],
            orelse: vec![],
        }],
    };
    let changes = invert_conditions(&mut comp).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].original, CmpOp::Gt);

    // if lambda-wrapped comparison: the lambda body leaks too.
    let mut lambda = Program {
        statements: vec![Stmt::If {
            test: Expr::Lambda {
                params: vec!["v".to_string()],
                body: Box::new(cmp_at(1, 13, "v", CmpOp::Is, 0)),
            },
            body: vec![Stmt::Pass],
            orelse: vec![],
        }],
    };
    let changes = invert_conditions(&mut lambda).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].replacement, CmpOp::IsNot);
}

#[test]
fn comparison_operands_are_a_traversal_leaf() {
    // The rewrite applies to the outer comparison's slots only; a
    // comparison nested in one of its operands is not visited.
    let mut program = Program {
        statements: vec![Stmt::If {
            test: Expr::Compare {
                pos: Pos::new(1, 3),
                left: Box::new(Expr::Compare {
                    pos: Pos::new(1, 4),
                    left: Box::new(name("a")),
                    ops: vec![CmpOp::Lt],
                    comparators: vec![name("b")],
                }),
                ops: vec![CmpOp::Eq],
                comparators: vec![Expr::Bool(true)],
            },
            body: vec![Stmt::Pass],
            orelse: vec![],
        }],
    };
    let changes = invert_conditions(&mut program).unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].original, CmpOp::Eq);
    let Stmt::If { test, .. } = &program.statements[0] else {
        unreachable!()
    };
    let Expr::Compare { left, ops, .. } = test else {
        unreachable!()
    };
    assert_eq!(ops[0], CmpOp::NotEq);
    assert_eq!(first_op(left), CmpOp::Lt);
}

#[test]
fn records_follow_preorder_discovery() {
    let mut program = Program {
        statements: vec![
            Stmt::If {
                test: cmp_at(1, 3, "a", CmpOp::Lt, 0),
                body: vec![Stmt::If {
                    test: cmp_at(2, 7, "b", CmpOp::Is, 0),
                    body: vec![Stmt::Pass],
                    orelse: vec![],
                }],
                orelse: vec![],
            },
            Stmt::If {
                test: cmp_at(4, 3, "c", CmpOp::In, 0),
                body: vec![Stmt::Pass],
                orelse: vec![],
            },
        ],
    };
    let changes = invert_conditions(&mut program).unwrap();

    let positions: Vec<_> = changes.iter().map(|c| c.pos).collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
    assert_eq!(positions.len(), 3);
}

#[test]
fn structural_mismatch_is_fatal_and_unrecorded() {
    let mut program = Program {
        statements: vec![Stmt::If {
            test: Expr::Compare {
                pos: Pos::new(1, 3),
                left: Box::new(name("a")),
                ops: vec![CmpOp::Lt, CmpOp::Gt],
                comparators: vec![name("b")],
            },
            body: vec![Stmt::Pass],
            orelse: vec![],
        }],
    };

    let mut inverter = ConditionInverter::new();
    let err = inverter.visit_program(&mut program).unwrap_err();
    assert_eq!(
        err,
        InvertError::Structural {
            pos: Pos::new(1, 3),
            ops: 2,
            comparators: 1,
        }
    );
    // The engine stopped before logging anything for the bad node.
    assert!(inverter.changes().is_empty());
}

#[test]
fn malformed_comparison_outside_a_test_is_not_validated() {
    // The engine only inspects candidate nodes; outside a branch test
    // it assumes the parser's contract and does not validate.
    let mut program = Program {
        statements: vec![Stmt::Expr {
            value: Expr::Compare {
                pos: Pos::new(1, 0),
                left: Box::new(name("a")),
                ops: vec![],
                comparators: vec![],
            },
        }],
    };
    assert!(invert_conditions(&mut program).unwrap().is_empty());
}
