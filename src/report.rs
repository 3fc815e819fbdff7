//! Error Reporter: every failure of a statement as a label, and span-carrying errors as source snippets.

use crate::binding::Binding;
use crate::classify::ClassifyError;
use crate::expr::SubstituteError;
use crate::parsing::ParseError;
use crate::statement::Label;
use crate::utils::span::render_error_snippet;
use itertools::Itertools;
use std::collections::BTreeSet;
use thiserror::Error;

/// Everything that can go wrong with one statement. None of these stop the resolution of the others.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum BindingError {
	#[error(transparent)]
	Parse(#[from] ParseError),
	#[error(transparent)]
	Classify(#[from] ClassifyError),
	#[error("multiple definitions of `{0}`")]
	MultipleDefinitions(String),
	#[error("Unresolvable.")]
	Unresolvable,
	#[error("Unbound: {}", .0.iter().join(", "))]
	UnboundSymbols(BTreeSet<String>),
	#[error("unevaluated derivative or integral")]
	InvalidAtoms,
	/// Substituting a declaration failed, e.g. a function called with the wrong number of arguments.
	#[error(transparent)]
	EngineFailure(SubstituteError),
}

impl BindingError {
	pub fn label(&self) -> Label {
		Label::error(self.to_string())
	}

	/// Error with the offending part of `text` underlined, when the error knows where it is.
	pub fn snippet(&self, text: &str, color: bool) -> String {
		let span = match self {
			BindingError::Parse(err) => err.span(),
			_ => None,
		};
		render_error_snippet(text, &self.to_string(), span, color)
	}
}

/// Label of a binding that resolved without errors.
pub fn success_label(binding: &Binding, truth: Option<bool>) -> Label {
	match (&binding.plot_kind, truth) {
		(Some(_), _) => Label::none(binding.to_string()),
		(None, Some(truth)) => Label::value(truth.to_string()),
		(None, None) => Label::value(binding.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::utils::span::GlobalSpan;

	#[test]
	fn messages() {
		let unbound = BindingError::UnboundSymbols(vec!["f".to_string(), "a".to_string()].into_iter().collect());
		assert_eq!(unbound.label(), Label::error("Unbound: a, f"));
		assert_eq!(BindingError::Unresolvable.to_string(), "Unresolvable.");
		assert_eq!(BindingError::MultipleDefinitions("c".to_string()).to_string(), "multiple definitions of `c`");
	}

	#[test]
	fn snippet_points_at_span() {
		let err = BindingError::Parse(ParseError::TooManyRelations { span: GlobalSpan(10..11) });
		let snippet = err.snippet("a < b < c < d", false);
		assert!(snippet.contains("too many relations"));
		assert!(snippet.contains("a < b < c < d"));
	}
}
