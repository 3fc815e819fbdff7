//! Interface to the statements the engine resolves. The UI owns them; the engine only reads their text and flags
//! and writes labels and colours back.

use crate::binding::Rgb;

/// Identity of a statement, stable across edits of its text.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StatementId(pub u32);

impl std::fmt::Display for StatementId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LabelKind {
	/// Plain display string of a plot.
	None,
	/// Value of a declaration, a coordinate or a numeric relation.
	Value,
	Error,
}

/// Inline feedback for one statement.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Label {
	pub kind: LabelKind,
	pub message: String,
}

impl Label {
	pub fn none(message: impl Into<String>) -> Self {
		Label { kind: LabelKind::None, message: message.into() }
	}

	pub fn value(message: impl Into<String>) -> Self {
		Label { kind: LabelKind::Value, message: message.into() }
	}

	pub fn error(message: impl Into<String>) -> Self {
		Label { kind: LabelKind::Error, message: message.into() }
	}

	pub fn is_error(&self) -> bool {
		self.kind == LabelKind::Error
	}
}

pub trait Statement {
	fn id(&self) -> StatementId;
	fn text(&self) -> &str;
	fn label(&mut self, label: Label);
	fn colour(&self) -> Option<Rgb>;
	fn set_colour(&mut self, colour: Rgb);

	fn is_hidden(&self) -> bool {
		false
	}

	/// Plotting suppressed for this statement by the UI, e.g. invalid parametric bounds.
	fn has_cancelled_plot(&self) -> bool {
		false
	}

	/// Draw a surface as contours.
	fn is_contoured(&self) -> bool {
		false
	}
}

/// Plain in-memory statement.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Row {
	pub id: u32,
	pub text: String,
	pub label: Option<Label>,
	pub colour: Option<Rgb>,
	pub locked: bool,
	pub hidden: bool,
	pub contoured: bool,
	pub cancelled: bool,
}

impl Row {
	pub fn new(id: u32, text: &str) -> Self {
		Row {
			id,
			text: text.to_string(),
			..Row::default()
		}
	}
}

impl Statement for Row {
	fn id(&self) -> StatementId { StatementId(self.id) }
	fn text(&self) -> &str { &self.text }
	fn label(&mut self, label: Label) { self.label = Some(label); }
	fn colour(&self) -> Option<Rgb> { self.colour }
	fn set_colour(&mut self, colour: Rgb) { self.colour = Some(colour); }
	fn is_hidden(&self) -> bool { self.hidden }
	fn has_cancelled_plot(&self) -> bool { self.cancelled }
	fn is_contoured(&self) -> bool { self.contoured }
}
