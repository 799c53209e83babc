pub mod ast;
pub mod operators;
pub mod parser;
pub mod symmetry;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use operators::{crossover_trees, mutate_tree, random_tree, DEFAULT_MAX_DEPTH};
pub use parser::parse;
pub use symmetry::{derive_pair, symmetric_mutation};
