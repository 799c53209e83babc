//! Infix expression parser: tokenize, shunting-yard to postfix, build tree.

use crate::error::PrimeFoldError;
use super::ast::{BinaryOp, Expr, UnaryOp};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Variable,
    Constant(f64),
    Function(UnaryOp),
    Operator(BinaryOp),
    /// `-x` rewritten to `0 - x` at build time.
    UnaryMinus,
    LeftParen,
    RightParen,
}

fn named_constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        "sqrt2" => Some(std::f64::consts::SQRT_2),
        "phi" => Some(1.618033988749895),
        _ => None,
    }
}

fn binary_op(symbol: &str) -> Option<BinaryOp> {
    match symbol {
        "+" => Some(BinaryOp::Add),
        "-" => Some(BinaryOp::Sub),
        "*" => Some(BinaryOp::Mul),
        "/" => Some(BinaryOp::Div),
        "%" | "mod" => Some(BinaryOp::Mod),
        "^" => Some(BinaryOp::Pow),
        _ => None,
    }
}

fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Add | BinaryOp::Sub => 1,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 2,
        BinaryOp::Pow => 3,
    }
}

fn is_right_associative(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::Pow)
}

/// Parse an infix expression into an [`Expr`].
///
/// Malformed input and unknown tokens are errors; there is no fallback
/// expression.
pub fn parse(input: &str) -> Result<Expr, PrimeFoldError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(PrimeFoldError::Parse("empty expression".to_string()));
    }
    let postfix = infix_to_postfix(tokens)?;
    build_tree(postfix)
}

fn tokenize(input: &str) -> Result<Vec<Token>, PrimeFoldError> {
    let mut tokens = Vec::new();
    let mut unknown = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let run: String = chars[start..i].iter().collect();
            // A digit run may carry a scientific-notation suffix (e.g. 1e-7
            // from a stringified float constant).
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    while j < chars.len() && chars[j].is_ascii_digit() {
                        j += 1;
                    }
                    let full: String = chars[start..j].iter().collect();
                    let value = full.parse::<f64>().map_err(|_| {
                        PrimeFoldError::Parse(format!("bad number literal: {}", full))
                    })?;
                    tokens.push(Token::Number(value));
                    i = j;
                    continue;
                }
            }
            let value = run
                .parse::<f64>()
                .map_err(|_| PrimeFoldError::Parse(format!("bad number literal: {}", run)))?;
            tokens.push(Token::Number(value));
        } else if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            if word == "n" {
                tokens.push(Token::Variable);
            } else if word == "mod" {
                tokens.push(Token::Operator(BinaryOp::Mod));
            } else if let Some(op) = UnaryOp::from_name(&word) {
                tokens.push(Token::Function(op));
            } else if let Some(value) = named_constant(&word) {
                tokens.push(Token::Constant(value));
            } else {
                unknown.push(word);
            }
        } else {
            match c {
                '(' => tokens.push(Token::LeftParen),
                ')' => tokens.push(Token::RightParen),
                '-' if is_unary_position(tokens.last()) => tokens.push(Token::UnaryMinus),
                _ => match binary_op(&c.to_string()) {
                    Some(op) => tokens.push(Token::Operator(op)),
                    None => unknown.push(c.to_string()),
                },
            }
            i += 1;
        }
    }

    if !unknown.is_empty() {
        return Err(PrimeFoldError::UnknownTokens(unknown.join(", ")));
    }
    Ok(tokens)
}

/// A `-` is unary at expression start, after `(`, or after an operator.
fn is_unary_position(previous: Option<&Token>) -> bool {
    matches!(
        previous,
        None | Some(Token::LeftParen)
            | Some(Token::Operator(_))
            | Some(Token::UnaryMinus)
            | Some(Token::Function(_))
    )
}

fn infix_to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>, PrimeFoldError> {
    let mut output = Vec::new();
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(_) | Token::Variable | Token::Constant(_) => output.push(token),
            Token::Function(_) | Token::UnaryMinus => stack.push(token),
            Token::Operator(op) => {
                while let Some(top) = stack.last() {
                    let pops = match top {
                        Token::Function(_) | Token::UnaryMinus => true,
                        Token::Operator(other) => {
                            precedence(*other) > precedence(op)
                                || (precedence(*other) == precedence(op)
                                    && !is_right_associative(op))
                        }
                        _ => false,
                    };
                    if !pops {
                        break;
                    }
                    output.push(stack.pop().expect("stack top checked"));
                }
                stack.push(Token::Operator(op));
            }
            Token::LeftParen => stack.push(token),
            Token::RightParen => {
                loop {
                    match stack.pop() {
                        Some(Token::LeftParen) => break,
                        Some(inner) => output.push(inner),
                        None => {
                            return Err(PrimeFoldError::Parse(
                                "unbalanced parentheses".to_string(),
                            ))
                        }
                    }
                }
                if matches!(stack.last(), Some(Token::Function(_)) | Some(Token::UnaryMinus)) {
                    output.push(stack.pop().expect("stack top checked"));
                }
            }
        }
    }

    while let Some(token) = stack.pop() {
        if matches!(token, Token::LeftParen) {
            return Err(PrimeFoldError::Parse("unbalanced parentheses".to_string()));
        }
        output.push(token);
    }

    Ok(output)
}

fn build_tree(postfix: Vec<Token>) -> Result<Expr, PrimeFoldError> {
    let mut stack: Vec<Expr> = Vec::new();

    for token in postfix {
        match token {
            Token::Number(value) | Token::Constant(value) => stack.push(Expr::Const(value)),
            Token::Variable => stack.push(Expr::Id),
            Token::Function(op) => {
                let child = stack.pop().ok_or_else(|| {
                    PrimeFoldError::Parse(format!("missing operand for {}", op.name()))
                })?;
                stack.push(Expr::Unary(op, Box::new(child)));
            }
            Token::UnaryMinus => {
                let child = stack
                    .pop()
                    .ok_or_else(|| PrimeFoldError::Parse("missing operand for -".to_string()))?;
                stack.push(Expr::Binary(
                    BinaryOp::Sub,
                    Box::new(Expr::Const(0.0)),
                    Box::new(child),
                ));
            }
            Token::Operator(op) => {
                let right = stack.pop();
                let left = stack.pop();
                match (left, right) {
                    (Some(left), Some(right)) => {
                        stack.push(Expr::Binary(op, Box::new(left), Box::new(right)))
                    }
                    _ => {
                        return Err(PrimeFoldError::Parse(format!(
                            "missing operand for {}",
                            op.symbol()
                        )))
                    }
                }
            }
            Token::LeftParen | Token::RightParen => {
                return Err(PrimeFoldError::Parse("unexpected parenthesis".to_string()))
            }
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(expr), true) => Ok(expr),
        (Some(_), false) => Err(PrimeFoldError::Parse(
            "dangling operands in expression".to_string(),
        )),
        (None, _) => Err(PrimeFoldError::Parse("empty expression".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str, n: i64) -> f64 {
        parse(input).expect("parse failed").evaluate(n)
    }

    #[test]
    fn test_parse_variable_and_literal() {
        assert_eq!(parse("n").unwrap(), Expr::Id);
        assert_eq!(parse("42").unwrap(), Expr::Const(42.0));
        assert_eq!(parse("2.5").unwrap(), Expr::Const(2.5));
    }

    #[test]
    fn test_named_constants() {
        assert!((eval("pi", 0) - std::f64::consts::PI).abs() < 1e-12);
        assert!((eval("phi", 0) - 1.618033988749895).abs() < 1e-12);
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 3 * 4", 0), 14.0);
        assert_eq!(eval("(2 + 3) * 4", 0), 20.0);
        assert_eq!(eval("10 - 4 - 3", 0), 3.0); // left associative
    }

    #[test]
    fn test_pow_right_associative() {
        // 2^(3^2) = 512, not (2^3)^2 = 64
        assert_eq!(eval("2 ^ 3 ^ 2", 0), 512.0);
    }

    #[test]
    fn test_function_application() {
        assert!((eval("sin(pi)", 0)).abs() < 1e-12);
        assert_eq!(eval("square(n)", 5), 25.0);
        assert_eq!(eval("cube(2)", 0), 8.0);
        // Function binds to its argument only, not the rest of the sum.
        assert_eq!(eval("abs(3 - 5) + 1", 0), 3.0);
    }

    #[test]
    fn test_modulo_forms() {
        assert_eq!(eval("7 % 3", 0), 1.0);
        assert_eq!(eval("7 mod 3", 0), 1.0);
        assert_eq!(eval("n % 5", 13), 3.0);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(eval("-3", 0), -3.0);
        assert_eq!(eval("-n + 1", 4), -3.0);
        assert_eq!(eval("2 * -3", 0), -6.0);
        assert_eq!(eval("2 ^ -1", 0), 0.5);
        assert_eq!(eval("-sin(0) + 7", 0), 7.0);
    }

    #[test]
    fn test_unknown_tokens_are_errors() {
        match parse("foo(n) + 2") {
            Err(PrimeFoldError::UnknownTokens(tokens)) => assert!(tokens.contains("foo")),
            other => panic!("expected unknown-token error, got {:?}", other),
        }
        assert!(parse("n ? 2").is_err());
    }

    #[test]
    fn test_malformed_input_is_error() {
        assert!(parse("").is_err());
        assert!(parse("1 +").is_err());
        assert!(parse("(1 + 2").is_err());
        assert!(parse("1 2").is_err());
    }

    #[test]
    fn test_round_trip_holds_for_random_trees() {
        use crate::engines::generation::{mutate_tree, random_tree};
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(12);
        for i in 0..300 {
            let mut tree = random_tree(&mut rng, 3);
            // Mutations introduce perturbed float and negative constants.
            if i % 2 == 1 {
                tree = mutate_tree(&tree, &mut rng);
            }
            let text = tree.to_string();
            let reparsed =
                parse(&text).unwrap_or_else(|e| panic!("{} failed to parse: {}", text, e));
            for n in [-3_i64, 0, 1, 7, 50] {
                let a = tree.evaluate(n);
                let b = reparsed.evaluate(n);
                if a.is_finite() || b.is_finite() {
                    let tolerance = 1e-9 * a.abs().max(1.0);
                    assert!(
                        (a - b).abs() <= tolerance,
                        "{} diverged at n={}: {} vs {}",
                        text,
                        n,
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn test_round_trip_preserves_evaluation() {
        let inputs = [
            "((n) + (1)) * ((n % 7))",
            "sin((n) / (3))",
            "log(abs((n) - (10)))",
            "sqrt(n) + cosd((n) * (90))",
            "((n)^(2)) mod 11",
            "(-1) * (sin(n))",
            "square((n) + (2))",
        ];
        for input in inputs {
            let tree = parse(input).unwrap();
            let reparsed = parse(&tree.to_string()).unwrap();
            for n in [-5_i64, 0, 1, 2, 17, 100] {
                let a = tree.evaluate(n);
                let b = reparsed.evaluate(n);
                if a.is_finite() || b.is_finite() {
                    let tolerance = 1e-9 * a.abs().max(1.0);
                    assert!(
                        (a - b).abs() < tolerance,
                        "{} diverged at n={}: {} vs {}",
                        input,
                        n,
                        a,
                        b
                    );
                }
            }
        }
    }
}
