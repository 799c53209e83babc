use rand::Rng;
use std::fmt;

/// Operand magnitude above which exponentiation is treated as overflow.
const POW_OVERFLOW_LIMIT: f64 = 1e6;
/// Epsilon added inside `log` so the domain extends over all of R.
const LOG_EPSILON: f64 = 1e-12;

pub const IRRATIONAL_CONSTANTS: [f64; 4] = [
    std::f64::consts::PI,
    std::f64::consts::E,
    std::f64::consts::SQRT_2,
    1.618033988749895, // golden ratio
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Sin,
    Cos,
    Sind,
    Cosd,
    Sqrt,
    Log,
    Abs,
    Floor,
    Ceil,
    Square,
    Cube,
}

pub const UNARY_OPS: [UnaryOp; 11] = [
    UnaryOp::Sin,
    UnaryOp::Cos,
    UnaryOp::Sind,
    UnaryOp::Cosd,
    UnaryOp::Sqrt,
    UnaryOp::Log,
    UnaryOp::Abs,
    UnaryOp::Floor,
    UnaryOp::Ceil,
    UnaryOp::Square,
    UnaryOp::Cube,
];

impl UnaryOp {
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Sind => "sind",
            UnaryOp::Cosd => "cosd",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Log => "log",
            UnaryOp::Abs => "abs",
            UnaryOp::Floor => "floor",
            UnaryOp::Ceil => "ceil",
            UnaryOp::Square => "square",
            UnaryOp::Cube => "cube",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        UNARY_OPS.iter().copied().find(|op| op.name() == name)
    }

    pub fn is_trig(self) -> bool {
        matches!(
            self,
            UnaryOp::Sin | UnaryOp::Cos | UnaryOp::Sind | UnaryOp::Cosd
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

pub const BINARY_OPS: [BinaryOp; 6] = [
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::Mul,
    BinaryOp::Div,
    BinaryOp::Mod,
    BinaryOp::Pow,
];

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
        }
    }
}

/// Expression tree over the free variable `n`.
///
/// Trees are finite, rooted and acyclic; `evaluate` is a pure function of
/// the tree and `n`. Non-finite results propagate as NaN/inf rather than
/// panicking; callers filter them.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Id,
    Mod(Box<Expr>, i64),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Node count, always >= 1.
    pub fn size(&self) -> usize {
        match self {
            Expr::Const(_) | Expr::Id => 1,
            Expr::Mod(child, _) | Expr::Unary(_, child) => 1 + child.size(),
            Expr::Binary(_, left, right) => 1 + left.size() + right.size(),
        }
    }

    pub fn evaluate(&self, n: i64) -> f64 {
        match self {
            Expr::Const(value) => *value,
            Expr::Id => n as f64,
            Expr::Mod(child, modulus) => child.evaluate(n) % (*modulus as f64),
            Expr::Unary(op, child) => {
                let value = child.evaluate(n);
                match op {
                    UnaryOp::Sin => value.sin(),
                    UnaryOp::Cos => value.cos(),
                    UnaryOp::Sind => value.to_radians().sin(),
                    UnaryOp::Cosd => value.to_radians().cos(),
                    UnaryOp::Sqrt => value.abs().sqrt(),
                    UnaryOp::Log => (value.abs() + LOG_EPSILON).ln(),
                    UnaryOp::Abs => value.abs(),
                    UnaryOp::Floor => value.floor(),
                    UnaryOp::Ceil => value.ceil(),
                    UnaryOp::Square => value * value,
                    UnaryOp::Cube => value * value * value,
                }
            }
            Expr::Binary(op, left, right) => {
                let l = left.evaluate(n);
                let r = right.evaluate(n);
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Mod => {
                        if r != 0.0 {
                            l % r
                        } else {
                            l
                        }
                    }
                    BinaryOp::Pow => pow_guarded(l, r),
                }
            }
        }
    }

    /// One structural mutation, dispatched per variant.
    pub fn mutate<R: Rng>(&self, rng: &mut R) -> Expr {
        match self {
            Expr::Const(value) => {
                if value.fract() == 0.0 {
                    Expr::Const(value + rng.gen_range(-2..=2) as f64)
                } else {
                    Expr::Const(value + rng.gen_range(-0.5..0.5))
                }
            }
            Expr::Id => {
                if rng.gen::<f64>() < 0.3 {
                    Expr::Const(rng.gen_range(1..=10) as f64)
                } else {
                    Expr::Id
                }
            }
            Expr::Mod(child, modulus) => {
                if rng.gen::<f64>() < 0.3 {
                    let shifted = (modulus + rng.gen_range(-5..=5)).clamp(2, 101);
                    Expr::Mod(Box::new(child.mutate(rng)), shifted)
                } else {
                    child.mutate(rng)
                }
            }
            Expr::Unary(op, child) => {
                if rng.gen::<f64>() < 0.3 {
                    let swapped = UNARY_OPS[rng.gen_range(0..UNARY_OPS.len())];
                    Expr::Unary(swapped, child.clone())
                } else if rng.gen::<f64>() < 0.5 {
                    Expr::Unary(*op, Box::new(child.mutate(rng)))
                } else {
                    (**child).clone()
                }
            }
            Expr::Binary(op, left, right) => {
                let choice = rng.gen::<f64>();
                if choice < 0.4 {
                    Expr::Binary(*op, Box::new(left.mutate(rng)), right.clone())
                } else if choice < 0.8 {
                    Expr::Binary(*op, left.clone(), Box::new(right.mutate(rng)))
                } else {
                    let swapped = BINARY_OPS[rng.gen_range(0..BINARY_OPS.len())];
                    Expr::Binary(swapped, left.clone(), right.clone())
                }
            }
        }
    }
}

/// Exponentiation with the numeric edge-case policy: `0^0 = 1`, negative
/// base with fractional exponent is NaN, operands past the overflow limit
/// are NaN.
fn pow_guarded(base: f64, exponent: f64) -> f64 {
    if base == 0.0 && exponent == 0.0 {
        return 1.0;
    }
    if base < 0.0 && exponent.fract() != 0.0 {
        return f64::NAN;
    }
    if base.abs() > POW_OVERFLOW_LIMIT || exponent.abs() > POW_OVERFLOW_LIMIT {
        return f64::NAN;
    }
    base.powf(exponent)
}

impl fmt::Display for Expr {
    /// Canonical textual form: fully parenthesized binary operations, the
    /// outermost excepted. Round-trips through the parser.
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(out, "{}", value),
            Expr::Id => write!(out, "n"),
            Expr::Mod(child, modulus) => write!(out, "({} % {})", child, modulus),
            Expr::Unary(op, child) => write!(out, "{}({})", op.name(), child),
            Expr::Binary(op, left, right) => match op {
                BinaryOp::Pow => write!(out, "({})^({})", left, right),
                _ => write!(out, "({}) {} ({})", left, op.symbol(), right),
            },
        }
    }
}
