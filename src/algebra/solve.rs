use crate::algebra::expand::expand;
use crate::algebra::simplify::simplify;
use crate::expr::*;
use crate::number::Number;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SolveError {
	#[error("can not solve for `{0}`")]
	Unsolvable(Variable),
}

/// Real solutions of `left = right` for `variable`, each one free of `variable`.
///
/// Polynomials of degree one and two are solved by formula, as are pure powers `a*v^n + c`.
/// Anything else is solved only when `variable` occurs exactly once, by inverting the operations around it.
pub fn solve(left: &Expression, right: &Expression, variable: &Variable) -> Result<Vec<Expression>, SolveError> {
	let equation = simplify(Expression::sub(left.clone(), right.clone()));
	if !equation.contains(variable) {
		return Ok(vec![]);
	}

	let solutions = match polynomial(&expand(equation.clone()), variable) {
		Some(coefficients) => solve_polynomial(coefficients, variable)?,
		None if equation.occurrences(variable) == 1 => isolate(&equation, Expression::int(0), variable)?,
		None => return Err(SolveError::Unsolvable(variable.clone())),
	};

	let mut result: Vec<Expression> = Vec::with_capacity(solutions.len());
	for solution in solutions {
		let solution = simplify(solution);
		if !result.contains(&solution) {
			result.push(solution);
		}
	}
	Ok(result)
}

/// Coefficients by degree when `expr` is a polynomial in `variable`.
pub(crate) fn polynomial(expr: &Expression, variable: &Variable) -> Option<BTreeMap<u32, Expression>> {
	let terms = match &expr.0 {
		ExpressionMeta::Sum { terms } => terms.clone(),
		_ => vec![expr.clone()],
	};

	let mut result: BTreeMap<u32, Vec<Expression>> = BTreeMap::new();
	for term in terms {
		let factors = match term.0 {
			ExpressionMeta::Product { factors } => factors,
			node => vec![Expression(node)],
		};
		let mut degree = 0u32;
		let mut rest = Vec::new();
		for factor in factors {
			if !factor.contains(variable) {
				rest.push(factor);
				continue;
			}
			match &factor.0 {
				ExpressionMeta::Symbol { variable: v } if v == variable => degree += 1,
				ExpressionMeta::Power { base, exponent } if base.as_variable() == Some(variable) => {
					let n = exponent.as_number()?.as_integer()?;
					degree += u32::try_from(n).ok()?;
				},
				_ => return None,
			}
		}
		result.entry(degree).or_default().push(Expression::product(rest));
	}

	Some(result.into_iter()
		.map(|(degree, parts)| (degree, simplify(Expression::sum(parts))))
		.filter(|(_, c)| !c.is_zero())
		.collect())
}

fn solve_polynomial(coefficients: BTreeMap<u32, Expression>, variable: &Variable) -> Result<Vec<Expression>, SolveError> {
	let zero = Expression::int(0);
	let coefficient = |degree: u32| coefficients.get(&degree).cloned().unwrap_or_else(|| zero.clone());
	let degree = coefficients.keys().next_back().copied().unwrap_or(0);

	match degree {
		0 => Ok(vec![]),
		1 => Ok(vec![Expression::neg(Expression::div(coefficient(0), coefficient(1)))]),
		2 if coefficients.contains_key(&1) => {
			let (a, b, c) = (coefficient(2), coefficient(1), coefficient(0));
			let discriminant = simplify(Expression::sub(
				Expression::power(b.clone(), Expression::int(2)),
				Expression::product(vec![Expression::int(4), a.clone(), c]),
			));
			let denominator = Expression::product(vec![Expression::int(2), a]);
			let minus_b = Expression::neg(b);
			match discriminant.as_number() {
				Some(d) if d.is_negative() => Ok(vec![]),
				Some(d) if d.is_zero() => Ok(vec![Expression::div(minus_b, denominator)]),
				_ => {
					let root = Expression::power(discriminant, Expression::number(Number::rational(1, 2)));
					Ok(vec![
						Expression::div(Expression::sub(minus_b.clone(), root.clone()), denominator.clone()),
						Expression::div(Expression::sum(vec![minus_b, root]), denominator),
					])
				},
			}
		},
		n if coefficients.len() <= 2 && coefficients.keys().all(|d| *d == 0 || *d == n) => {
			let value = simplify(Expression::neg(Expression::div(coefficient(0), coefficient(n))));
			Ok(real_roots(value, n))
		},
		_ => Err(SolveError::Unsolvable(variable.clone())),
	}
}

/// Real `n`-th roots of `value`.
fn real_roots(value: Expression, n: u32) -> Vec<Expression> {
	let exponent = Expression::number(Number::rational(1, i64::from(n)));
	let sign = value.as_number().map(|v| (v.is_negative(), v.is_zero()));
	match (n % 2 == 0, sign) {
		(_, Some((_, true))) => vec![Expression::int(0)],
		(true, Some((true, _))) => vec![],
		(false, Some((true, _))) => vec![Expression::neg(Expression::power(Expression::neg(value), exponent))],
		(true, _) => {
			let root = Expression::power(value, exponent);
			vec![Expression::neg(root.clone()), root]
		},
		(false, _) => vec![Expression::power(value, exponent)],
	}
}

/// Solves `target = value` where `variable` occurs exactly once in `target`.
fn isolate(target: &Expression, value: Expression, variable: &Variable) -> Result<Vec<Expression>, SolveError> {
	use ExpressionMeta::*;

	let unsolvable = || SolveError::Unsolvable(variable.clone());
	let split = |items: &[Expression]| -> Option<(Expression, Vec<Expression>)> {
		let index = items.iter().position(|e| e.contains(variable))?;
		let mut others = items.to_vec();
		let inner = others.remove(index);
		Some((inner, others))
	};

	match &target.0 {
		Symbol { variable: v } if v == variable => Ok(vec![value]),
		Sum { terms } => {
			let (inner, others) = split(terms).ok_or_else(unsolvable)?;
			isolate(&inner, Expression::sub(value, Expression::sum(others)), variable)
		},
		Product { factors } => {
			let (inner, others) = split(factors).ok_or_else(unsolvable)?;
			isolate(&inner, Expression::div(value, Expression::product(others)), variable)
		},
		Power { base, exponent } if !exponent.contains(variable) => {
			let degree = exponent.as_number()
				.and_then(Number::as_integer)
				.and_then(|n| u32::try_from(n).ok())
				.filter(|n| *n > 0);
			match degree {
				Some(n) => {
					let value = simplify(value);
					let mut result = Vec::new();
					for root in real_roots(value, n) {
						result.extend(isolate(base, root, variable)?);
					}
					Ok(result)
				},
				_ => {
					let inverse = simplify(Expression::div(Expression::int(1), (**exponent).clone()));
					isolate(base, Expression::power(value, inverse), variable)
				},
			}
		},
		Power { base, exponent } => {
			let log = |e: Expression| Expression::function(Builtin::Log, e);
			isolate(exponent, Expression::div(log(value), log((**base).clone())), variable)
		},
		Function { function, args } => {
			let inner = match args.as_slice() {
				[inner] => inner,
				_ => return Err(unsolvable()),
			};
			let inverse = match function {
				Builtin::Sin => Builtin::Asin,
				Builtin::Cos => Builtin::Acos,
				Builtin::Tan => Builtin::Atan,
				Builtin::Asin => Builtin::Sin,
				Builtin::Acos => Builtin::Cos,
				Builtin::Atan => Builtin::Tan,
				Builtin::Exp => Builtin::Log,
				Builtin::Log => Builtin::Exp,
				Builtin::Sqrt => return isolate(inner, Expression::power(value, Expression::int(2)), variable),
				Builtin::Abs => {
					let mut result = isolate(inner, Expression::neg(value.clone()), variable)?;
					result.extend(isolate(inner, value, variable)?);
					return Ok(result);
				},
				_ => return Err(unsolvable()),
			};
			isolate(inner, Expression::function(inverse, value), variable)
		},
		_ => Err(unsolvable()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::SymbolTable;
	use crate::parsing::parse_expression;

	fn solutions(left: &str, right: &str, variable: &str) -> Result<Vec<String>, SolveError> {
		let symbols = SymbolTable::default();
		let variable = match symbols.reserved(variable) {
			Some(r) => Variable::Reserved(r),
			None => Variable::free(variable),
		};
		let left = parse_expression(left, &symbols).unwrap();
		let right = parse_expression(right, &symbols).unwrap();
		solve(&left, &right, &variable).map(|s| s.iter().map(|e| e.to_string()).collect())
	}

	#[test]
	fn linear() {
		assert_eq!(solutions("y", "2x + 1", "y").unwrap(), vec!["2*x + 1"]);
		assert_eq!(solutions("3a", "1", "a").unwrap(), vec!["1/3"]);
	}

	#[test]
	fn quadratic() {
		assert_eq!(solutions("x^2", "4", "x").unwrap(), vec!["-2", "2"]);
		assert_eq!(solutions("x^2 + 2x + 1", "0", "x").unwrap(), vec!["-1"]);
		assert!(solutions("x^2", "-1", "x").unwrap().is_empty());
		assert_eq!(solutions("x^2 - 3x + 2", "0", "x").unwrap(), vec!["1", "2"]);
	}

	#[test]
	fn pure_powers() {
		assert_eq!(solutions("x^3", "8", "x").unwrap(), vec!["2"]);
		assert_eq!(solutions("x^3", "-8", "x").unwrap(), vec!["-2"]);
		assert_eq!(solutions("z^2", "x^2 + y^2", "z").unwrap().len(), 2);
	}

	#[test]
	fn huge_degrees_keep_their_exponent() {
		let roots = solutions("x^4294967297", "8", "x").unwrap();
		assert_eq!(roots.len(), 1);
		assert_ne!(roots[0], "8");
	}

	#[test]
	fn inverts_single_occurrence() {
		assert_eq!(solutions("sqrt(x)", "2", "x").unwrap(), vec!["4"]);
		assert_eq!(solutions("exp(y)", "x", "y").unwrap(), vec!["log(x)"]);
	}

	#[test]
	fn gives_up_on_repeated_transcendental() {
		assert_eq!(solutions("sin(x) + x", "1", "x"), Err(SolveError::Unsolvable(Variable::Reserved(Reserved::X))));
	}
}
