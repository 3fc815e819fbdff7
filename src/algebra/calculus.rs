//! `diff` and `integrate`: rewriting the calls into operator nodes and evaluating those nodes symbolically.

use crate::algebra::expand::expand;
use crate::algebra::simplify::simplify;
use crate::algebra::solve::polynomial;
use crate::expr::*;
use crate::number::Number;
use crate::utils::apply::*;
use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CalculusError {
	#[error("bad arguments to `{name}`: {message}")]
	BadOperator {
		name: &'static str,
		message: String,
	},
}

/// Highest derivative order `diff` accepts.
pub const MAX_ORDER: u32 = 1000;

fn bad(name: &'static str, message: String) -> CalculusError {
	CalculusError::BadOperator { name, message }
}

fn operator_variable(name: &'static str, arg: Option<Expression>) -> Result<Variable, CalculusError> {
	match arg {
		Some(arg) => arg.as_variable().cloned().ok_or_else(|| bad(name, format!("`{}` is not a variable", arg))),
		None => Err(bad(name, "missing variable".to_string())),
	}
}

/// Turns `diff(...)` and `integrate(...)` calls into `Derivative` and `Integral` nodes.
pub fn rewrite_operators(expr: Expression) -> Result<Expression, CalculusError> {
	use ExpressionMeta::*;

	Ok(match expr.0.try_map_args(rewrite_operators)? {
		Function { function: Builtin::Diff, args } => {
			let mut args = args.into_iter();
			let body = args.next().ok_or_else(|| bad("diff", "missing expression".to_string()))?;
			let variable = operator_variable("diff", args.next())?;
			let order = match args.next() {
				None => 1,
				Some(order) => order.as_number()
					.and_then(Number::as_integer)
					.and_then(|n| u32::try_from(n).ok())
					.filter(|n| *n > 0)
					.ok_or_else(|| bad("diff", format!("order `{}` is not a positive integer", order)))?,
			};
			if order > MAX_ORDER {
				return Err(bad("diff", format!("order {} is above {}", order, MAX_ORDER)));
			}
			Derivative { body: Box::new(body), variable, order }.apply(Expression)
		},
		Function { function: Builtin::Integrate, args } => {
			if args.len() == 3 {
				return Err(bad("integrate", "expected both bounds or none".to_string()));
			}
			let mut args = args.into_iter();
			let body = args.next().ok_or_else(|| bad("integrate", "missing expression".to_string()))?;
			let variable = operator_variable("integrate", args.next())?;
			Integral { body: Box::new(body), variable, bounds: args.collect() }.apply(Expression)
		},
		node => Expression(node),
	})
}

/// Evaluates every operator node whose body is known well enough. The rest stay in the tree.
pub fn evaluate_operators(expr: Expression) -> Expression {
	use ExpressionMeta::*;

	match expr.0.map_args(evaluate_operators) {
		Derivative { body, variable, order } => {
			let mut result = (*body).clone();
			for _ in 0..order {
				if !result.contains(&variable) {
					return Expression::int(0);
				}
				result = match differentiate(&result, &variable) {
					Some(derivative) => simplify(derivative),
					None => return Derivative { body, variable, order }.apply(Expression),
				};
			}
			result
		},
		Integral { body, variable, bounds } => {
			let primitive = match antiderivative(&body, &variable) {
				Some(primitive) => primitive,
				None => return Integral { body, variable, bounds }.apply(Expression),
			};
			match bounds.as_slice() {
				[lower, upper] => simplify(Expression::sub(
					primitive.substitute(&variable, upper),
					primitive.substitute(&variable, lower),
				)),
				_ => simplify(primitive),
			}
		},
		node => Expression(node),
	}
}

/// Symbolic derivative. `None` when an unresolved call or operator depends on `variable`.
pub fn differentiate(expr: &Expression, variable: &Variable) -> Option<Expression> {
	use ExpressionMeta::*;

	if !expr.contains(variable) {
		return Some(Expression::int(0));
	}
	let pow = |base: Expression, exponent: Expression| Expression::power(base, exponent);
	let log = |arg: Expression| Expression::function(Builtin::Log, arg);

	Some(match &expr.0 {
		Symbol { .. } => Expression::int(1),
		Sum { terms } => Expression::sum(terms.iter().map(|t| differentiate(t, variable)).collect::<Option<Vec<_>>>()?),
		Product { factors } => {
			let mut terms = Vec::with_capacity(factors.len());
			for (index, factor) in factors.iter().enumerate() {
				if !factor.contains(variable) {
					continue;
				}
				let mut product = factors.clone();
				product[index] = differentiate(factor, variable)?;
				terms.push(Expression::product(product));
			}
			Expression::sum(terms)
		},
		Power { base, exponent } => {
			let (base, exponent) = ((**base).clone(), (**exponent).clone());
			if !exponent.contains(variable) {
				Expression::product(vec![
					exponent.clone(),
					pow(base.clone(), Expression::sum(vec![exponent, Expression::int(-1)])),
					differentiate(&base, variable)?,
				])
			} else if !base.contains(variable) {
				Expression::product(vec![pow(base.clone(), exponent.clone()), log(base), differentiate(&exponent, variable)?])
			} else {
				let inner = Expression::sum(vec![
					Expression::product(vec![differentiate(&exponent, variable)?, log(base.clone())]),
					Expression::product(vec![exponent.clone(), differentiate(&base, variable)?, pow(base.clone(), Expression::int(-1))]),
				]);
				Expression::product(vec![pow(base, exponent), inner])
			}
		},
		Function { function, args } => {
			let u = match args.as_slice() {
				[u] => u.clone(),
				_ => return None,
			};
			let half = || Expression::number(Number::rational(1, 2));
			let minus_half = || Expression::number(Number::rational(-1, 2));
			let one_minus_square = || Expression::sub(Expression::int(1), pow(u.clone(), Expression::int(2)));
			let outer = match function {
				Builtin::Sin => Expression::function(Builtin::Cos, u.clone()),
				Builtin::Cos => Expression::neg(Expression::function(Builtin::Sin, u.clone())),
				Builtin::Tan => pow(Expression::function(Builtin::Cos, u.clone()), Expression::int(-2)),
				Builtin::Asin => pow(one_minus_square(), minus_half()),
				Builtin::Acos => Expression::neg(pow(one_minus_square(), minus_half())),
				Builtin::Atan => pow(Expression::sum(vec![Expression::int(1), pow(u.clone(), Expression::int(2))]), Expression::int(-1)),
				Builtin::Sinh => Expression::function(Builtin::Cosh, u.clone()),
				Builtin::Cosh => Expression::function(Builtin::Sinh, u.clone()),
				Builtin::Tanh => Expression::sub(Expression::int(1), pow(Expression::function(Builtin::Tanh, u.clone()), Expression::int(2))),
				Builtin::Exp => Expression::function(Builtin::Exp, u.clone()),
				Builtin::Log => pow(u.clone(), Expression::int(-1)),
				Builtin::Sqrt => Expression::product(vec![half(), pow(u.clone(), minus_half())]),
				Builtin::Abs => Expression::div(u.clone(), Expression::function(Builtin::Abs, u.clone())),
				Builtin::Diff | Builtin::Integrate => return None,
			};
			Expression::product(vec![outer, differentiate(&u, variable)?])
		},
		_ => return None,
	})
}

/// Antiderivative without the integration constant, for the forms that have a table entry.
pub fn antiderivative(expr: &Expression, variable: &Variable) -> Option<Expression> {
	use ExpressionMeta::*;

	let v = Expression::variable(variable.clone());
	if !expr.contains(variable) {
		return Some(Expression::product(vec![expr.clone(), v]));
	}

	match &expr.0 {
		Symbol { .. } => Some(Expression::product(vec![
			Expression::number(Number::rational(1, 2)),
			Expression::power(v, Expression::int(2)),
		])),
		Sum { terms } => terms.iter().map(|t| antiderivative(t, variable)).collect::<Option<Vec<_>>>().map(Expression::sum),
		Product { factors } => {
			let (dependent, constant): (Vec<_>, Vec<_>) = factors.iter().cloned().partition(|f| f.contains(variable));
			match dependent.as_slice() {
				[single] => {
					let mut result = constant;
					result.push(antiderivative(single, variable)?);
					Some(Expression::product(result))
				},
				_ => None,
			}
		},
		Power { base, exponent } if base.as_variable() == Some(variable) && !exponent.contains(variable) => {
			let raised = simplify(Expression::sum(vec![(**exponent).clone(), Expression::int(1)]));
			if raised.is_zero() {
				Some(Expression::function(Builtin::Log, v))
			} else {
				Some(Expression::div(Expression::power(v, raised.clone()), raised))
			}
		},
		Power { base, exponent } if !base.contains(variable) => {
			let (slope, _) = linear(exponent, variable)?;
			Some(Expression::div(
				expr.clone(),
				Expression::product(vec![slope, Expression::function(Builtin::Log, (**base).clone())]),
			))
		},
		Function { function, args } => {
			let u = match args.as_slice() {
				[u] => u.clone(),
				_ => return None,
			};
			let (slope, _) = linear(&u, variable)?;
			let primitive = match function {
				Builtin::Sin => Expression::neg(Expression::function(Builtin::Cos, u)),
				Builtin::Cos => Expression::function(Builtin::Sin, u),
				Builtin::Exp => Expression::function(Builtin::Exp, u),
				Builtin::Sinh => Expression::function(Builtin::Cosh, u),
				Builtin::Cosh => Expression::function(Builtin::Sinh, u),
				_ => return None,
			};
			Some(Expression::div(primitive, slope))
		},
		_ => None,
	}
}

/// `(a, b)` when `expr` is `a*variable + b`.
fn linear(expr: &Expression, variable: &Variable) -> Option<(Expression, Expression)> {
	let coefficients = polynomial(&expand(expr.clone()), variable)?;
	if coefficients.keys().any(|degree| *degree > 1) {
		return None;
	}
	let slope = coefficients.get(&1)?.clone();
	let intercept = coefficients.get(&0).cloned().unwrap_or_else(|| Expression::int(0));
	Some((slope, intercept))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::SymbolTable;
	use crate::parsing::parse_expression;

	fn evaluated(text: &str) -> Result<String, CalculusError> {
		let expr = parse_expression(text, &SymbolTable::default()).unwrap();
		Ok(simplify(evaluate_operators(rewrite_operators(expr)?)).to_string())
	}

	fn same(left: &str, right: &str) {
		let right = simplify(parse_expression(right, &SymbolTable::default()).unwrap()).to_string();
		assert_eq!(evaluated(left).unwrap(), right, "{}", left);
	}

	#[test]
	fn derivatives() {
		same("diff(x^3, x)", "3x^2");
		same("diff(sin(2x), x)", "2cos(2x)");
		same("diff(x^3, x, 2)", "6x");
		same("diff(a*x + b, x)", "a");
	}

	#[test]
	fn derivatives_of_constants_stop_early() {
		let constant = Expression(ExpressionMeta::Derivative {
			body: Box::new(Expression::int(5)),
			variable: Variable::Reserved(Reserved::X),
			order: u32::MAX,
		});
		assert_eq!(evaluate_operators(constant), Expression::int(0));
		same("diff(x^2, x, 3)", "0");
		same("diff(x, x, 1000)", "0");
		assert!(matches!(evaluated("diff(x, x, 1001)"), Err(CalculusError::BadOperator { name: "diff", .. })));
	}

	#[test]
	fn integrals() {
		same("integrate(x^2, x)", "x^3/3");
		same("integrate(cos(x), x)", "sin(x)");
		same("integrate(2x, x, 0, 3)", "9");
		same("integrate(1/x, x)", "log(x)");
	}

	#[test]
	fn unknown_calls_stay_unevaluated() {
		let expr = rewrite_operators(parse_expression("diff(f(x), x)", &SymbolTable::default()).unwrap()).unwrap();
		assert!(evaluate_operators(expr).has_operators());
	}

	#[test]
	fn bad_arguments() {
		assert!(matches!(evaluated("diff(x^2, 2)"), Err(CalculusError::BadOperator { name: "diff", .. })));
		assert!(matches!(evaluated("diff(x^2, x, 0)"), Err(CalculusError::BadOperator { .. })));
		assert!(matches!(evaluated("integrate(x, x, 1)"), Err(CalculusError::BadOperator { name: "integrate", .. })));
	}
}
