/*!
# Structural comparison of documents

[`compare`] walks two documents side by side and stops at the first
difference, reporting where it occurred. XML text is read into a compact
symbolic tree first; trees are compared as given, without resolving their
names.
*/
use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::options::{ReadOptions, Style};
use crate::tree::{Element, Node};
use crate::visitor::TreeBuilder;
use crate::xml::{traverse_str, TracingLogger};

/// A document given either as symbolic tree or as XML text.
#[derive(Clone, Copy, Debug)]
pub enum Document<'a> {
	Tree(&'a Element),
	Xml(&'a str),
}

impl<'a> From<&'a Element> for Document<'a> {
	fn from(other: &'a Element) -> Self {
		Self::Tree(other)
	}
}

impl<'a> From<&'a str> for Document<'a> {
	fn from(other: &'a str) -> Self {
		Self::Xml(other)
	}
}

impl<'a> From<&'a String> for Document<'a> {
	fn from(other: &'a String) -> Self {
		Self::Xml(other.as_str())
	}
}

impl<'a> Document<'a> {
	fn into_tree(self) -> Result<Cow<'a, Element>> {
		match self {
			Self::Tree(el) => Ok(Cow::Borrowed(el)),
			Self::Xml(xml) => {
				let opts = ReadOptions::new().style(Style::Compact);
				let builder = traverse_str(
					xml,
					opts.namespaces.as_ref(),
					TreeBuilder::new(opts.style),
					&TracingLogger,
				)?;
				Ok(Cow::Owned(builder.finish()?))
			}
		}
	}
}

fn mismatch(path: &str, message: String) -> Error {
	Error::ComparisonMismatch {
		path: path.to_string(),
		message,
	}
}

fn describe(node: &Node) -> String {
	match node {
		Node::Element(el) => el.name.to_string(),
		Node::Text(text) => text.clone(),
	}
}

fn compare_elements(a: &Element, b: &Element, path: &str) -> Result<()> {
	if a.name != b.name {
		return Err(mismatch(
			path,
			format!("element names differ: '{}', '{}'", a.name, b.name),
		));
	}
	if a.attrs != b.attrs {
		return Err(mismatch(path, "attributes differ".into()));
	}
	if a.children.len() != b.children.len() {
		return Err(mismatch(path, "child count differs".into()));
	}

	let path = if path.is_empty() {
		a.name.to_string()
	} else {
		format!("{}/{}", path, a.name)
	};
	for (ca, cb) in a.children.iter().zip(b.children.iter()) {
		match (ca, cb) {
			(Node::Element(ea), Node::Element(eb)) => compare_elements(ea, eb, &path)?,
			_ if ca == cb => (),
			_ => {
				return Err(mismatch(
					&path,
					format!("content differs: '{}', '{}'", describe(ca), describe(cb)),
				))
			}
		}
	}
	Ok(())
}

/// Compare two documents.
///
/// Returns [`Error::ComparisonMismatch`] for the first difference found in
/// document order.
pub fn compare<'a, 'b, A: Into<Document<'a>>, B: Into<Document<'b>>>(a: A, b: B) -> Result<()> {
	let a = a.into().into_tree()?;
	let b = b.into().into_tree()?;
	compare_elements(&a, &b, "")
}
