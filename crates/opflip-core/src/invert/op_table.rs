// Operator inversion table

use crate::ast::CmpOp;

impl CmpOp {
    /// The logical negation of this operator. Total and involutive:
    /// `op.inverted().inverted() == op` for every kind. The enum is
    /// closed, so there is no out-of-vocabulary case and no failure
    /// mode.
    pub fn inverted(self) -> CmpOp {
        match self {
            CmpOp::Eq => CmpOp::NotEq,
            CmpOp::NotEq => CmpOp::Eq,
            CmpOp::Lt => CmpOp::GtE,
            CmpOp::LtE => CmpOp::Gt,
            CmpOp::Gt => CmpOp::LtE,
            CmpOp::GtE => CmpOp::Lt,
            CmpOp::Is => CmpOp::IsNot,
            CmpOp::IsNot => CmpOp::Is,
            CmpOp::In => CmpOp::NotIn,
            CmpOp::NotIn => CmpOp::In,
        }
    }
}
