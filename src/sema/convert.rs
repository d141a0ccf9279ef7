//! The implicit conversion lattice and constant folding.
//!
//! One policy, applied uniformly by assignment checking and overload
//! scoring: narrower integer to wider integer of the same signedness,
//! bool and integer interchange, integer to floating with a warning,
//! floating widening freely and narrowing with a warning, `null` to any
//! identity type. Floating to integer never converts implicitly.

use crate::ast::decl::{Def, VarKind};
use crate::ast::expr::{BinaryOp, Expr, ExprKind, UnaryOp, Value};
use crate::ast::types::{FloatKind, IntKind, Type};

/// Cost and warning flag of one implicit conversion; `None` means the
/// conversion does not exist. Cost 0 is an exact match; higher costs lose
/// overload ties, which is what makes `f(short)` prefer `f(int)` over
/// `f(long)`.
pub fn conversion<'a>(from: &Type<'a>, to: &Type<'a>) -> Option<(u32, bool)> {
    if from == to {
        return Some((0, false));
    }
    match (from, to) {
        (Type::Int(a), Type::Int(b)) => {
            if a.is_signed() == b.is_signed() && b.width() > a.width() {
                Some((rank_distance(*a, *b), false))
            } else {
                None
            }
        }
        (Type::Bool, Type::Int(_)) | (Type::Int(_), Type::Bool) => Some((1, false)),
        (Type::Int(_), Type::Float(_)) => Some((8, true)),
        (Type::Float(FloatKind::Float), Type::Float(FloatKind::Double)) => Some((1, false)),
        (Type::Float(FloatKind::Double), Type::Float(FloatKind::Float)) => Some((2, true)),
        (Type::Null, Type::Class(_)) | (Type::Null, Type::Enum(_)) => Some((1, false)),
        _ => None,
    }
}

fn rank_distance(from: IntKind, to: IntKind) -> u32 {
    // Widths are powers of two, so the log difference counts widening
    // steps.
    to.width().trailing_zeros() - from.width().trailing_zeros()
}

/// Is `from` usable where `to` is expected? Warning flag as in
/// [`conversion`].
pub fn assignable<'a>(from: &Type<'a>, to: &Type<'a>) -> Option<bool> {
    conversion(from, to).map(|(_, warn)| warn)
}

/// Does a compile-time constant fit the value range of an integer kind?
/// Lets `short s = 1` through even though `int` does not otherwise narrow.
pub fn int_fits(value: i128, kind: IntKind) -> bool {
    match kind {
        IntKind::Byte => (0..=u8::MAX as i128).contains(&value),
        IntKind::Short => (i16::MIN as i128..=i16::MAX as i128).contains(&value),
        IntKind::Ushort => (0..=u16::MAX as i128).contains(&value),
        IntKind::Int => (i32::MIN as i128..=i32::MAX as i128).contains(&value),
        IntKind::Uint => (0..=u32::MAX as i128).contains(&value),
        IntKind::Long => (i64::MIN as i128..=i64::MAX as i128).contains(&value),
        IntKind::Ulong => (0..=u64::MAX as i128).contains(&value),
    }
}

/// Result type of arithmetic on two numeric operands: the wider one, the
/// signed one on a width tie. Returns `None` for non-numeric operands.
pub fn wider_numeric<'a>(left: &'a Type<'a>, right: &'a Type<'a>) -> Option<&'a Type<'a>> {
    match (left, right) {
        (Type::Float(a), Type::Float(b)) => Some(if a.width() >= b.width() { left } else { right }),
        (Type::Float(_), Type::Int(_)) => Some(left),
        (Type::Int(_), Type::Float(_)) => Some(right),
        (Type::Int(a), Type::Int(b)) => {
            if a.width() > b.width() {
                Some(left)
            } else if b.width() > a.width() {
                Some(right)
            } else if a.is_signed() {
                Some(left)
            } else {
                Some(right)
            }
        }
        _ => None,
    }
}

/// Fold a compile-time constant integer expression: literals, negation,
/// basic arithmetic, references to `const` variables with constant
/// initializers, and enum entries (their 1-based index).
pub fn const_int_value(expr: &Expr<'_>) -> Option<i128> {
    match &expr.kind {
        ExprKind::Value(Value::Int { value, .. }) => Some(*value as i128),
        ExprKind::Value(Value::Bool(b)) => Some(*b as i128),
        ExprKind::Value(Value::Char(c)) => Some(*c as i128),
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => const_int_value(operand).map(|v| -v),
        ExprKind::Binary { op, left, right } => {
            let l = const_int_value(left)?;
            let r = const_int_value(right)?;
            match op {
                BinaryOp::Add => l.checked_add(r),
                BinaryOp::Sub => l.checked_sub(r),
                BinaryOp::Mul => l.checked_mul(r),
                BinaryOp::Div => l.checked_div(r),
                BinaryOp::Rem => l.checked_rem(r),
                BinaryOp::Shl => u32::try_from(r).ok().and_then(|s| l.checked_shl(s)),
                BinaryOp::Shr => u32::try_from(r).ok().and_then(|s| l.checked_shr(s)),
                BinaryOp::BitAnd => Some(l & r),
                BinaryOp::BitOr => Some(l | r),
                BinaryOp::BitXor => Some(l ^ r),
                _ => None,
            }
        }
        ExprKind::VarRef(var_ref) => match var_ref.def.get()? {
            Def::Var(var) if var.kind == VarKind::EnumEntry => Some(var.index as i128),
            Def::Var(var) if var.is_constant() => var.init.and_then(const_int_value),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_free() {
        assert_eq!(
            conversion(&Type::Int(IntKind::Int), &Type::Int(IntKind::Int)),
            Some((0, false))
        );
    }

    #[test]
    fn widening_cost_grows_with_distance() {
        let short = Type::Int(IntKind::Short);
        assert_eq!(conversion(&short, &Type::Int(IntKind::Int)), Some((1, false)));
        assert_eq!(conversion(&short, &Type::Int(IntKind::Long)), Some((2, false)));
    }

    #[test]
    fn no_narrowing_and_no_sign_change() {
        assert_eq!(
            conversion(&Type::Int(IntKind::Long), &Type::Int(IntKind::Int)),
            None
        );
        assert_eq!(
            conversion(&Type::Int(IntKind::Int), &Type::Int(IntKind::Uint)),
            None
        );
    }

    #[test]
    fn bool_and_integer_interchange() {
        assert!(conversion(&Type::Bool, &Type::Int(IntKind::Int)).is_some());
        assert!(conversion(&Type::Int(IntKind::Byte), &Type::Bool).is_some());
    }

    #[test]
    fn int_to_float_warns() {
        assert_eq!(
            conversion(&Type::Int(IntKind::Int), &Type::Float(FloatKind::Double)),
            Some((8, true))
        );
    }

    #[test]
    fn float_to_int_never_converts() {
        assert_eq!(
            conversion(&Type::Float(FloatKind::Float), &Type::Int(IntKind::Long)),
            None
        );
    }

    #[test]
    fn wider_numeric_picks_width_then_sign() {
        let int = Type::Int(IntKind::Int);
        let long = Type::Int(IntKind::Long);
        let uint = Type::Int(IntKind::Uint);
        assert_eq!(wider_numeric(&int, &long), Some(&long));
        assert_eq!(wider_numeric(&uint, &int), Some(&int));
        let double = Type::Float(FloatKind::Double);
        assert_eq!(wider_numeric(&int, &double), Some(&double));
    }
}
