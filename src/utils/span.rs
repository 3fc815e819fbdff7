use crate::utils::char_index::get_char_range;
use annotate_snippets::{
	display_list::{DisplayList, FormatOptions},
	snippet::{Annotation, AnnotationType, Slice, Snippet, SourceAnnotation},
};
use std::ops::Range;

/// Byte range inside the statement text.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct GlobalSpan(pub Range<usize>);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Spanned<T> {
	pub span: GlobalSpan,
	pub inner: T,
}

impl<T> Spanned<T> {
	pub fn new(t: T, span: GlobalSpan) -> Self {
		Spanned {
			span,
			inner: t,
		}
	}
}

/// Renders `message` as an error over `source`, underlining `span` when there is one.
pub fn render_error_snippet(source: &str, message: &str, span: Option<&GlobalSpan>, color: bool) -> String {
	// Zero-width spans (end of input) get one column of padding to point at.
	let padded;
	let (source, range) = match span.and_then(|span| get_char_range(source, span.0.clone())) {
		Some(range) if range.start == range.end => {
			padded = format!("{} ", source);
			(padded.as_str(), (range.start.0, range.start.0 + 1))
		},
		Some(range) => (source, (range.start.0, range.end.0)),
		None => (source, (0, 0)),
	};

	let snippet = Snippet {
		title: Some(Annotation {
			label: Some(message),
			id: None,
			annotation_type: AnnotationType::Error,
		}),
		footer: vec![],
		slices: vec![
			Slice {
				source,
				line_start: 1,
				origin: None,
				fold: false,
				annotations: if range.0 == range.1 {
					vec![]
				} else {
					vec![
						SourceAnnotation {
							label: "",
							annotation_type: AnnotationType::Error,
							range,
						},
					]
				},
			},
		],
		opt: FormatOptions {
			color,
			..Default::default()
		},
	};
	DisplayList::from(snippet).to_string()
}
