use crate::context::SymbolTable;
use crate::expr::*;
use crate::number::Number;
use crate::utils::apply::*;

/// Numeric value of a closed expression. `None` when a symbol, a user call or an operator is left.
pub fn evaluate(expr: &Expression, symbols: &SymbolTable) -> Option<f64> {
	use ExpressionMeta::*;

	match &expr.0 {
		Literal { value } => Some(value.to_f64()),
		Constant { name } => symbols.constant(name),
		Function { function, args } => match args.as_slice() {
			[arg] => function.eval(evaluate(arg, symbols)?),
			_ => None,
		},
		Sum { terms } => terms.iter().map(|t| evaluate(t, symbols)).sum(),
		Product { factors } => factors.iter().map(|f| evaluate(f, symbols)).product(),
		Power { base, exponent } => Some(evaluate(base, symbols)?.powf(evaluate(exponent, symbols)?)),
		_ => None,
	}
}

/// Truth value of a closed relation or relation chain.
pub fn truth_value(expr: &Expression, symbols: &SymbolTable) -> Option<bool> {
	match &expr.0 {
		ExpressionMeta::Relation { op, left, right } => Some(op.holds(evaluate(left, symbols)?, evaluate(right, symbols)?)),
		ExpressionMeta::Chain { links } => links.iter().try_fold(true, |all, link| Some(all && truth_value(link, symbols)?)),
		_ => None,
	}
}

/// Replaces named constants with their numeric values.
pub fn substitute_constants(expr: Expression, symbols: &SymbolTable) -> Expression {
	match expr.0 {
		ExpressionMeta::Constant { name } => match symbols.constant(&name) {
			Some(value) => Expression::number(Number::Float(value)),
			None => ExpressionMeta::Constant { name }.apply(Expression),
		},
		node => node.map_args(|arg| substitute_constants(arg, symbols)).apply(Expression),
	}
}
