use crate::algebra::simplify::simplify;
use crate::expr::*;

/// Largest integer power of a sum that is multiplied out.
const MAX_EXPANDED_POWER: i64 = 12;

/// Multiplies products of sums out and expands small positive integer powers of sums, then simplifies.
pub fn expand(expr: Expression) -> Expression {
	use ExpressionMeta::*;

	let expanded = match expr.0.map_args(expand) {
		Product { factors } => factors.into_iter().fold(Expression::int(1), multiply),
		Power { base, exponent } => match exponent.as_number().and_then(|n| n.as_integer()) {
			Some(n) if (2..=MAX_EXPANDED_POWER).contains(&n) && matches!(base.0, Sum { .. }) => {
				(0..n).fold(Expression::int(1), |acc, _| multiply(acc, (*base).clone()))
			},
			_ => Expression::power(*base, *exponent),
		},
		node => Expression(node),
	};
	simplify(expanded)
}

fn multiply(left: Expression, right: Expression) -> Expression {
	let left = terms(left);
	let right = terms(right);
	let products = left.iter()
		.flat_map(|a| right.iter().map(move |b| simplify(Expression::product(vec![a.clone(), b.clone()]))))
		.collect();
	simplify(Expression::sum(products))
}

fn terms(expr: Expression) -> Vec<Expression> {
	match expr.0 {
		ExpressionMeta::Sum { terms } => terms,
		node => vec![Expression(node)],
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::SymbolTable;
	use crate::parsing::parse_expression;

	fn expanded(text: &str) -> String {
		expand(parse_expression(text, &SymbolTable::default()).unwrap()).to_string()
	}

	#[test]
	fn binomials() {
		assert_eq!(expanded("(x+1)^2"), expanded("x^2 + 2x + 1"));
		assert_eq!(expanded("(x+1)(x-1)"), expanded("x^2 - 1"));
	}

	#[test]
	fn leaves_non_polynomial_parts() {
		assert_eq!(expanded("sin(x)*(y+1)"), expanded("y*sin(x) + sin(x)"));
	}
}
