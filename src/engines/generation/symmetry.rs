//! Symmetry transforms for the 2-D embedding mode.
//!
//! A pair `(f, g)` is symmetric when `g` is obtained from `f` by a
//! structure-preserving transform: a trig function swap, a phase shift, a
//! negation, or a reciprocal. Whole-tree derivation builds `g` from `f`
//! directly; node-level mutation nudges an existing pair toward symmetry by
//! transforming one matching trig node in each tree.

use std::f64::consts::FRAC_PI_2;

use rand::Rng;

use super::ast::{BinaryOp, Expr, UnaryOp};

#[derive(Debug, Clone, Copy)]
enum TransformKind {
    /// Replace every occurrence of one trig function with its partner.
    Swap(UnaryOp, UnaryOp),
    /// Shift the argument of every trig node by a quarter period.
    PhaseShift(f64),
    /// `g = -1 * f`.
    Negate,
    /// `g = 1 / f`.
    Reciprocal,
}

const TRANSFORMS: [TransformKind; 8] = [
    TransformKind::Swap(UnaryOp::Sin, UnaryOp::Cos),
    TransformKind::Swap(UnaryOp::Cos, UnaryOp::Sin),
    TransformKind::Swap(UnaryOp::Sind, UnaryOp::Cosd),
    TransformKind::Swap(UnaryOp::Cosd, UnaryOp::Sind),
    // Radian trig shifts by pi/2, degree trig by 90.
    TransformKind::PhaseShift(FRAC_PI_2),
    TransformKind::PhaseShift(90.0),
    TransformKind::Negate,
    TransformKind::Reciprocal,
];

fn swap_trig(expr: &mut Expr, from: UnaryOp, to: UnaryOp) {
    match expr {
        Expr::Const(_) | Expr::Id => {}
        Expr::Mod(child, _) => swap_trig(child, from, to),
        Expr::Unary(op, child) => {
            if *op == from {
                *op = to;
            }
            swap_trig(child, from, to);
        }
        Expr::Binary(_, left, right) => {
            swap_trig(left, from, to);
            swap_trig(right, from, to);
        }
    }
}

fn shift_trig_arguments(expr: &mut Expr, shift: f64) {
    match expr {
        Expr::Const(_) | Expr::Id => {}
        Expr::Mod(child, _) => shift_trig_arguments(child, shift),
        Expr::Unary(op, child) => {
            shift_trig_arguments(child, shift);
            if op.is_trig() {
                let argument = std::mem::replace(&mut **child, Expr::Id);
                **child = shifted(argument, shift);
            }
        }
        Expr::Binary(_, left, right) => {
            shift_trig_arguments(left, shift);
            shift_trig_arguments(right, shift);
        }
    }
}

fn shifted(argument: Expr, shift: f64) -> Expr {
    Expr::Binary(
        BinaryOp::Add,
        Box::new(argument),
        Box::new(Expr::Const(shift)),
    )
}

fn negated(expr: Expr) -> Expr {
    Expr::Binary(BinaryOp::Mul, Box::new(Expr::Const(-1.0)), Box::new(expr))
}

fn reciprocal(expr: Expr) -> Expr {
    Expr::Binary(BinaryOp::Div, Box::new(Expr::Const(1.0)), Box::new(expr))
}

fn apply(base: &Expr, transform: TransformKind) -> Expr {
    let mut derived = base.clone();
    match transform {
        TransformKind::Swap(from, to) => swap_trig(&mut derived, from, to),
        TransformKind::PhaseShift(shift) => shift_trig_arguments(&mut derived, shift),
        TransformKind::Negate => derived = negated(derived),
        TransformKind::Reciprocal => derived = reciprocal(derived),
    }
    derived
}

/// Derive a symmetric partner for `base` using a randomly chosen transform.
/// Returns the pair `(base, derived)` with `base` untouched.
pub fn derive_pair<R: Rng>(base: &Expr, rng: &mut R) -> (Expr, Expr) {
    let transform = TRANSFORMS[rng.gen_range(0..TRANSFORMS.len())];
    (base.clone(), apply(base, transform))
}

/// Node-level transform applied to one matching trig node.
#[derive(Debug, Clone, Copy)]
enum NodeAction {
    SwapTo(UnaryOp),
    PhaseShift(f64),
    Negate,
    Reciprocal,
}

const NODE_TRANSFORMS: [(UnaryOp, NodeAction); 16] = [
    (UnaryOp::Sin, NodeAction::SwapTo(UnaryOp::Cos)),
    (UnaryOp::Cos, NodeAction::SwapTo(UnaryOp::Sin)),
    (UnaryOp::Sind, NodeAction::SwapTo(UnaryOp::Cosd)),
    (UnaryOp::Cosd, NodeAction::SwapTo(UnaryOp::Sind)),
    (UnaryOp::Sin, NodeAction::PhaseShift(FRAC_PI_2)),
    (UnaryOp::Cos, NodeAction::PhaseShift(FRAC_PI_2)),
    (UnaryOp::Sind, NodeAction::PhaseShift(90.0)),
    (UnaryOp::Cosd, NodeAction::PhaseShift(90.0)),
    (UnaryOp::Sin, NodeAction::Negate),
    (UnaryOp::Cos, NodeAction::Negate),
    (UnaryOp::Sind, NodeAction::Negate),
    (UnaryOp::Cosd, NodeAction::Negate),
    (UnaryOp::Sin, NodeAction::Reciprocal),
    (UnaryOp::Cos, NodeAction::Reciprocal),
    (UnaryOp::Sind, NodeAction::Reciprocal),
    (UnaryOp::Cosd, NodeAction::Reciprocal),
];

fn count_matches(expr: &Expr, from: UnaryOp) -> usize {
    match expr {
        Expr::Const(_) | Expr::Id => 0,
        Expr::Mod(child, _) => count_matches(child, from),
        Expr::Unary(op, child) => {
            (if *op == from { 1 } else { 0 }) + count_matches(child, from)
        }
        Expr::Binary(_, left, right) => count_matches(left, from) + count_matches(right, from),
    }
}

/// Apply `action` to the `target`-th preorder node whose op equals `from`.
fn apply_at_match(expr: &mut Expr, from: UnaryOp, target: &mut usize, action: NodeAction) -> bool {
    let matches = matches!(expr, Expr::Unary(op, _) if *op == from);
    if matches {
        if *target == 0 {
            match action {
                NodeAction::SwapTo(to) => {
                    if let Expr::Unary(op, _) = expr {
                        *op = to;
                    }
                }
                NodeAction::PhaseShift(shift) => {
                    if let Expr::Unary(_, child) = expr {
                        let argument = std::mem::replace(&mut **child, Expr::Id);
                        **child = shifted(argument, shift);
                    }
                }
                NodeAction::Negate => {
                    let node = std::mem::replace(expr, Expr::Id);
                    *expr = negated(node);
                }
                NodeAction::Reciprocal => {
                    let node = std::mem::replace(expr, Expr::Id);
                    *expr = reciprocal(node);
                }
            }
            return true;
        }
        *target -= 1;
    }
    match expr {
        Expr::Const(_) | Expr::Id => false,
        Expr::Mod(child, _) | Expr::Unary(_, child) => {
            apply_at_match(child, from, target, action)
        }
        Expr::Binary(_, left, right) => {
            apply_at_match(left, from, target, action)
                || apply_at_match(right, from, target, action)
        }
    }
}

/// Mutate an existing pair toward symmetry: pick a transform and apply it to
/// one randomly chosen matching node in each tree. Returns `None` when
/// neither tree contains a matching trig node.
pub fn symmetric_mutation<R: Rng>(f: &Expr, g: &Expr, rng: &mut R) -> Option<(Expr, Expr)> {
    let (from, action) = NODE_TRANSFORMS[rng.gen_range(0..NODE_TRANSFORMS.len())];

    let matches_f = count_matches(f, from);
    let matches_g = count_matches(g, from);
    if matches_f == 0 && matches_g == 0 {
        return None;
    }

    let mut new_f = f.clone();
    if matches_f > 0 {
        let mut target = rng.gen_range(0..matches_f);
        apply_at_match(&mut new_f, from, &mut target, action);
    }
    let mut new_g = g.clone();
    if matches_g > 0 {
        let mut target = rng.gen_range(0..matches_g);
        apply_at_match(&mut new_g, from, &mut target, action);
    }
    Some((new_f, new_g))
}
