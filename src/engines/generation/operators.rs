//! Stochastic tree construction and transformation operators.

use rand::Rng;

use super::ast::{BinaryOp, Expr, UnaryOp, BINARY_OPS, IRRATIONAL_CONSTANTS, UNARY_OPS};

pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Random leaf: 40% the variable, 20% an irrational constant, 40% a small
/// integer.
pub fn random_leaf<R: Rng>(rng: &mut R) -> Expr {
    let choice = rng.gen::<f64>();
    if choice < 0.4 {
        Expr::Id
    } else if choice < 0.6 {
        Expr::Const(IRRATIONAL_CONSTANTS[rng.gen_range(0..IRRATIONAL_CONSTANTS.len())])
    } else {
        Expr::Const(rng.gen_range(1..=10) as f64)
    }
}

/// Recursive stochastic constructor: 20% modulus wrap, 30% unary wrap, 50%
/// binary combine at each interior step.
pub fn random_tree<R: Rng>(rng: &mut R, max_depth: usize) -> Expr {
    if max_depth == 0 {
        return random_leaf(rng);
    }
    let p = rng.gen::<f64>();
    if p < 0.2 {
        Expr::Mod(
            Box::new(random_tree(rng, max_depth - 1)),
            rng.gen_range(2..=101),
        )
    } else if p < 0.5 {
        let op = UNARY_OPS[rng.gen_range(0..UNARY_OPS.len())];
        Expr::Unary(op, Box::new(random_tree(rng, max_depth - 1)))
    } else {
        let op = BINARY_OPS[rng.gen_range(0..BINARY_OPS.len())];
        Expr::Binary(
            op,
            Box::new(random_tree(rng, max_depth - 1)),
            Box::new(random_tree(rng, max_depth - 1)),
        )
    }
}

/// Polynomial-like trees: compositions of +, -, *, square, cube and mod
/// over constants and the variable. These get dedicated coefficient
/// perturbation during mutation.
pub fn is_polynomial(expr: &Expr) -> bool {
    match expr {
        Expr::Const(_) | Expr::Id => true,
        Expr::Binary(BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul, left, right) => {
            is_polynomial(left) && is_polynomial(right)
        }
        Expr::Unary(UnaryOp::Square | UnaryOp::Cube, child) => is_polynomial(child),
        Expr::Mod(child, _) => is_polynomial(child),
        _ => false,
    }
}

/// Collect the values of coefficient constants. Inside `c * n` / `n * c`
/// products only the constant factor counts.
fn collect_coefficients(expr: &Expr, out: &mut Vec<f64>) {
    match expr {
        Expr::Const(value) => out.push(*value),
        Expr::Id => {}
        Expr::Binary(BinaryOp::Mul, left, right) => match (&**left, &**right) {
            (Expr::Const(value), Expr::Id) | (Expr::Id, Expr::Const(value)) => out.push(*value),
            _ => {
                collect_coefficients(left, out);
                collect_coefficients(right, out);
            }
        },
        Expr::Binary(_, left, right) => {
            collect_coefficients(left, out);
            collect_coefficients(right, out);
        }
        Expr::Unary(_, child) | Expr::Mod(child, _) => collect_coefficients(child, out),
    }
}

/// Nudge a coefficient: integers move by a small delta (avoiding a collapse
/// to zero), floats by up to 10% with a floor against vanishing.
fn perturb_value<R: Rng>(value: f64, rng: &mut R) -> f64 {
    if value.fract() == 0.0 {
        let mut nudged = value + rng.gen_range(-2..=2) as f64;
        if value.abs() > 1.0 && nudged == 0.0 {
            nudged = if rng.gen::<bool>() { 1.0 } else { -1.0 };
        }
        nudged
    } else {
        let mut nudged = value * (1.0 + rng.gen_range(-0.1..0.1));
        if nudged.abs() < 1e-6 {
            nudged = if rng.gen::<bool>() { 0.1 } else { -0.1 };
        }
        nudged
    }
}

/// Replace every constant structurally equal to `old` (relative tolerance)
/// with `new`. Returns whether anything changed.
fn replace_coefficient(expr: &mut Expr, old: f64, new: f64) -> bool {
    let tolerance = (old.abs() * 1e-10).max(1e-10);
    match expr {
        Expr::Const(value) => {
            if (*value - old).abs() < tolerance {
                *value = new;
                true
            } else {
                false
            }
        }
        Expr::Id => false,
        Expr::Binary(_, left, right) => {
            let l = replace_coefficient(left, old, new);
            let r = replace_coefficient(right, old, new);
            l || r
        }
        Expr::Unary(_, child) | Expr::Mod(child, _) => replace_coefficient(child, old, new),
    }
}

/// Single mutation entry point: coefficient perturbation for polynomial-like
/// trees (15%), whole-subtree replacement (35%), per-variant structural
/// mutation (35%), operand swap for binaries (15%), unary unwrap otherwise.
pub fn mutate_tree<R: Rng>(tree: &Expr, rng: &mut R) -> Expr {
    let action = rng.gen::<f64>();

    if action < 0.15 && is_polynomial(tree) {
        let mut coefficients = Vec::new();
        collect_coefficients(tree, &mut coefficients);
        if !coefficients.is_empty() {
            let old = coefficients[rng.gen_range(0..coefficients.len())];
            let new = perturb_value(old, rng);
            let mut mutated = tree.clone();
            if replace_coefficient(&mut mutated, old, new) {
                return mutated;
            }
        }
    }

    if action < 0.35 {
        return random_tree(rng, DEFAULT_MAX_DEPTH);
    }
    if action < 0.70 {
        return tree.mutate(rng);
    }
    if action < 0.85 {
        if let Expr::Binary(op, left, right) = tree {
            return Expr::Binary(*op, right.clone(), left.clone());
        }
    }
    if let Expr::Unary(_, child) = tree {
        return (**child).clone();
    }
    tree.clone()
}

/// Clone of the preorder node at `index` (0 is the root).
fn node_at(expr: &Expr, index: &mut usize) -> Option<Expr> {
    if *index == 0 {
        return Some(expr.clone());
    }
    *index -= 1;
    match expr {
        Expr::Const(_) | Expr::Id => None,
        Expr::Mod(child, _) | Expr::Unary(_, child) => node_at(child, index),
        Expr::Binary(_, left, right) => node_at(left, index).or_else(|| node_at(right, index)),
    }
}

/// Replace the preorder node at `index` with `replacement`. Returns false
/// when the index is out of range.
fn replace_node_at(expr: &mut Expr, index: &mut usize, replacement: &Expr) -> bool {
    if *index == 0 {
        *expr = replacement.clone();
        return true;
    }
    *index -= 1;
    match expr {
        Expr::Const(_) | Expr::Id => false,
        Expr::Mod(child, _) | Expr::Unary(_, child) => {
            replace_node_at(child, index, replacement)
        }
        Expr::Binary(_, left, right) => {
            replace_node_at(left, index, replacement)
                || replace_node_at(right, index, replacement)
        }
    }
}

/// Subtree crossover: a uniformly chosen node from each parent (root
/// included) is swapped between deep copies. The parents are never touched.
pub fn crossover_trees<R: Rng>(a: &Expr, b: &Expr, rng: &mut R) -> (Expr, Expr) {
    let index_a = rng.gen_range(0..a.size());
    let index_b = rng.gen_range(0..b.size());

    let mut cursor = index_a;
    let subtree_a = node_at(a, &mut cursor).expect("index within size");
    let mut cursor = index_b;
    let subtree_b = node_at(b, &mut cursor).expect("index within size");

    let mut child_a = a.clone();
    let mut cursor = index_a;
    replace_node_at(&mut child_a, &mut cursor, &subtree_b);

    let mut child_b = b.clone();
    let mut cursor = index_b;
    replace_node_at(&mut child_b, &mut cursor, &subtree_a);

    (child_a, child_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_random_tree_respects_depth() {
        let mut rng = seeded();
        for _ in 0..100 {
            let tree = random_tree(&mut rng, 3);
            assert!(tree.size() >= 1);
            // Depth 3 over binary nodes bounds the node count.
            assert!(tree.size() <= 15);
        }
    }

    #[test]
    fn test_random_tree_depth_zero_is_leaf() {
        let mut rng = seeded();
        for _ in 0..20 {
            assert_eq!(random_tree(&mut rng, 0).size(), 1);
        }
    }

    #[test]
    fn test_polynomial_detection() {
        let poly = Expr::Binary(
            BinaryOp::Add,
            Box::new(Expr::Binary(
                BinaryOp::Mul,
                Box::new(Expr::Const(3.0)),
                Box::new(Expr::Id),
            )),
            Box::new(Expr::Unary(UnaryOp::Square, Box::new(Expr::Id))),
        );
        assert!(is_polynomial(&poly));

        let not_poly = Expr::Unary(UnaryOp::Sin, Box::new(Expr::Id));
        assert!(!is_polynomial(&not_poly));

        let div = Expr::Binary(BinaryOp::Div, Box::new(Expr::Id), Box::new(Expr::Const(2.0)));
        assert!(!is_polynomial(&div));
    }

    #[test]
    fn test_replace_coefficient_hits_all_occurrences() {
        let mut tree = Expr::Binary(
            BinaryOp::Add,
            Box::new(Expr::Const(3.0)),
            Box::new(Expr::Binary(
                BinaryOp::Mul,
                Box::new(Expr::Const(3.0)),
                Box::new(Expr::Id),
            )),
        );
        assert!(replace_coefficient(&mut tree, 3.0, 5.0));
        assert_eq!(tree.evaluate(2), 15.0); // 5 + 5*2
    }

    #[test]
    fn test_mutate_tree_keeps_valid_size() {
        let mut rng = seeded();
        let tree = random_tree(&mut rng, 3);
        for _ in 0..200 {
            let mutated = mutate_tree(&tree, &mut rng);
            assert!(mutated.size() >= 1);
        }
    }

    #[test]
    fn test_crossover_does_not_mutate_parents() {
        let mut rng = seeded();
        let a = random_tree(&mut rng, 3);
        let b = random_tree(&mut rng, 3);
        let a_before = a.clone();
        let b_before = b.clone();

        for _ in 0..50 {
            let (child_a, child_b) = crossover_trees(&a, &b, &mut rng);
            assert!(child_a.size() >= 1);
            assert!(child_b.size() >= 1);
        }

        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
    }

    #[test]
    fn test_crossover_at_root_swaps_whole_trees() {
        // Single-node parents force the root pick on both sides.
        let a = Expr::Id;
        let b = Expr::Const(7.0);
        let mut rng = seeded();
        let (child_a, child_b) = crossover_trees(&a, &b, &mut rng);
        assert_eq!(child_a, Expr::Const(7.0));
        assert_eq!(child_b, Expr::Id);
    }
}
