//! Symbolic algebra over `Expression`: canonical simplification, expansion, solving, calculus and numeric evaluation.

pub mod calculus;
pub mod evaluate;
pub mod expand;
pub mod simplify;
pub mod solve;

pub use calculus::{evaluate_operators, rewrite_operators, CalculusError};
pub use evaluate::{evaluate, substitute_constants, truth_value};
pub use expand::expand;
pub use simplify::simplify;
pub use solve::{solve, SolveError};

use crate::context::SymbolTable;
use crate::expr::Expression;

/// Final pass over every classified body: constants become numbers, `diff`/`integrate` become operators
/// and are evaluated where possible, and the result is simplified.
pub fn post_process(expr: Expression, symbols: &SymbolTable) -> Result<Expression, CalculusError> {
	let expr = rewrite_operators(substitute_constants(expr, symbols))?;
	Ok(simplify(evaluate_operators(expr)))
}
