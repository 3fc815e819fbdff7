//! Canonical form of expression trees.
//!
//! Sums and products are flattened, numbers folded, like terms and equal bases collected and the operands sorted,
//! so two equal canonical trees compare (and hash) equal.

use crate::expr::*;
use crate::number::Number;
use crate::utils::apply::*;
use std::collections::BTreeMap;

pub fn simplify(expr: Expression) -> Expression {
	use ExpressionMeta::*;

	match expr.0.map_args(simplify) {
		Sum { terms } => simplify_sum(terms),
		Product { factors } => simplify_product(factors),
		Power { base, exponent } => simplify_power(*base, *exponent),
		Function { function, args } => simplify_function(function, args),
		node => Expression(node),
	}
}

fn simplify_sum(terms: Vec<Expression>) -> Expression {
	let mut constant = Number::ZERO;
	let mut collected: BTreeMap<Expression, Number> = BTreeMap::new();
	for term in flatten(terms, |e| match e.0 {
		ExpressionMeta::Sum { terms } => Ok(terms),
		node => Err(Expression(node)),
	}) {
		match term.as_number() {
			Some(n) => constant = constant + n,
			None => {
				let (coefficient, rest) = split_coefficient(term);
				let entry = collected.entry(rest).or_insert(Number::ZERO);
				*entry = *entry + coefficient;
			},
		}
	}

	let mut result: Vec<Expression> = collected.into_iter()
		.filter(|(_, c)| !c.is_zero())
		.map(|(rest, c)| with_coefficient(c, rest))
		.collect();
	if !constant.is_zero() || result.is_empty() {
		result.push(Expression::number(constant));
	}
	Expression::sum(result)
}

fn simplify_product(factors: Vec<Expression>) -> Expression {
	let mut coefficient = Number::ONE;
	let mut powers: BTreeMap<Expression, Vec<Expression>> = BTreeMap::new();
	for factor in flatten(factors, |e| match e.0 {
		ExpressionMeta::Product { factors } => Ok(factors),
		node => Err(Expression(node)),
	}) {
		match factor.as_number() {
			Some(n) => coefficient = coefficient * n,
			None => {
				let (base, exponent) = split_power(factor);
				powers.entry(base).or_default().push(exponent);
			},
		}
	}
	if coefficient.is_zero() {
		return Expression::number(coefficient);
	}

	let mut result = Vec::new();
	let mut renormalize = false;
	for (base, exponents) in powers {
		let factor = simplify_power(base, simplify_sum(exponents));
		match factor.as_number() {
			Some(n) => coefficient = coefficient * n,
			None => {
				renormalize |= matches!(factor.0, ExpressionMeta::Product { .. });
				result.push(factor);
			},
		}
	}
	if renormalize {
		result.insert(0, Expression::number(coefficient));
		return simplify_product(result);
	}
	// `2*(x + 1)` is `2*x + 2`
	if let [Expression(ExpressionMeta::Sum { terms })] = result.as_slice() {
		if !coefficient.is_one() {
			return simplify_sum(terms.iter()
				.map(|t| simplify_product(vec![Expression::number(coefficient), t.clone()]))
				.collect());
		}
	}
	if !coefficient.is_one() || result.is_empty() {
		result.insert(0, Expression::number(coefficient));
	}
	Expression::product(result)
}

pub(crate) fn simplify_power(base: Expression, exponent: Expression) -> Expression {
	use ExpressionMeta::*;

	match (base.as_number(), exponent.as_number()) {
		(_, Some(e)) if e.is_zero() => return Expression::int(1),
		(_, Some(e)) if e.is_one() => return base,
		(Some(b), _) if b.is_one() => return base,
		(Some(b), Some(e)) => {
			let value = b.pow(e);
			if value.is_exact() || !b.is_exact() || !e.is_exact() {
				return Expression::number(value);
			}
		},
		_ => {},
	}

	let integer = exponent.as_number().and_then(Number::as_integer);
	match (base.0, integer) {
		(Power { base: inner, exponent: own }, Some(n)) => {
			simplify_power(*inner, simplify_product(vec![*own, Expression::int(n)]))
		},
		(Product { factors }, Some(n)) => {
			simplify_product(factors.into_iter().map(|f| simplify_power(f, Expression::int(n))).collect())
		},
		(base, _) => Expression::power(Expression(base), exponent),
	}
}

fn simplify_function(function: Builtin, mut args: Vec<Expression>) -> Expression {
	if function == Builtin::Sqrt && args.len() == 1 {
		return simplify_power(args.remove(0), Expression::number(Number::rational(1, 2)));
	}
	if let [arg] = args.as_slice() {
		if let Some(value) = arg.as_number() {
			let exact = match function {
				Builtin::Sin | Builtin::Tan | Builtin::Asin | Builtin::Atan | Builtin::Sinh | Builtin::Tanh
					if value.is_zero() => Some(Number::ZERO),
				Builtin::Cos | Builtin::Cosh | Builtin::Exp if value.is_zero() => Some(Number::ONE),
				Builtin::Log if value.is_one() => Some(Number::ZERO),
				Builtin::Abs => Some(value.abs()),
				_ => None,
			};
			let approximate = (!value.is_exact())
				.then(|| function.eval(value.to_f64()).map(Number::Float))
				.flatten();
			if let Some(result) = exact.or(approximate) {
				return Expression::number(result);
			}
		}
		if let ExpressionMeta::Function { function: inner, args: inner_args } = &arg.0 {
			if let ((Builtin::Exp, Builtin::Log) | (Builtin::Log, Builtin::Exp), [value]) = ((function, *inner), inner_args.as_slice()) {
				return value.clone();
			}
		}
	}
	ExpressionMeta::Function { function, args }.apply(Expression)
}

fn flatten<F>(items: Vec<Expression>, mut open: F) -> Vec<Expression>
where
	F: FnMut(Expression) -> Result<Vec<Expression>, Expression>,
{
	let mut result = Vec::with_capacity(items.len());
	let mut stack: Vec<Expression> = items.into_iter().rev().collect();
	while let Some(item) = stack.pop() {
		match open(item) {
			Ok(inner) => stack.extend(inner.into_iter().rev()),
			Err(item) => result.push(item),
		}
	}
	result
}

/// `3*x*y` into `(3, x*y)`.
pub(crate) fn split_coefficient(term: Expression) -> (Number, Expression) {
	match term.0 {
		ExpressionMeta::Product { mut factors } => match factors.first().and_then(Expression::as_number) {
			Some(c) => {
				factors.remove(0);
				(c, Expression::product(factors))
			},
			None => (Number::ONE, ExpressionMeta::Product { factors }.apply(Expression)),
		},
		node => (Number::ONE, Expression(node)),
	}
}

fn with_coefficient(coefficient: Number, rest: Expression) -> Expression {
	if coefficient.is_one() {
		return rest;
	}
	let mut factors = vec![Expression::number(coefficient)];
	match rest.0 {
		ExpressionMeta::Product { factors: inner } => factors.extend(inner),
		node => factors.push(Expression(node)),
	}
	Expression::product(factors)
}

fn split_power(factor: Expression) -> (Expression, Expression) {
	match factor.0 {
		ExpressionMeta::Power { base, exponent } => (*base, *exponent),
		node => (Expression(node), Expression::int(1)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::SymbolTable;
	use crate::parsing::parse_expression;

	fn simplified(text: &str) -> String {
		simplify(parse_expression(text, &SymbolTable::default()).unwrap()).to_string()
	}

	#[test]
	fn folds_numbers() {
		assert_eq!(simplified("1 + 2*3"), "7");
		assert_eq!(simplified("2^10"), "1024");
		assert_eq!(simplified("6/4"), "3/2");
		assert_eq!(simplified("sqrt(16)"), "4");
	}

	#[test]
	fn collects_like_terms() {
		assert_eq!(simplified("x + x"), "2*x");
		assert_eq!(simplified("x*y - y*x"), "0");
		assert_eq!(simplified("x*x*x"), "x^3");
		assert_eq!(simplified("x/3"), "x/3");
	}

	#[test]
	fn keeps_irrational_roots() {
		assert_eq!(simplified("sqrt(2)"), "sqrt(2)");
		assert_eq!(simplified("sqrt(2)*sqrt(2)"), "2");
	}

	#[test]
	fn distributes_integer_powers() {
		assert_eq!(simplified("(2x)^2"), "4*x^2");
		assert_eq!(simplified("(x^(1/2))^2"), "x");
	}

	#[test]
	fn is_idempotent() {
		for text in &["x + 2*y - 3", "(x+1)^2 / (2y)", "sin(x)^2 + cos(x)^2", "a*b*c*a", "-x - 1"] {
			let once = simplify(parse_expression(text, &SymbolTable::default()).unwrap());
			assert_eq!(simplify(once.clone()), once, "{}", text);
		}
	}
}
