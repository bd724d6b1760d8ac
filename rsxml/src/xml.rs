/*!
# Traversal of parsed XML

This module drives a [`Visitor`] from a parsed XML document, with the same
calls a traversal of the equivalent symbolic tree produces. The parser is
abstracted by the [`XmlNode`] trait; [`ParsedNode`] implements it on top of
[`roxmltree`].

Namespace bindings are taken from the namespace definitions the parser
reports for each element, not from raw `xmlns` attributes.

Comments and processing instructions are skipped and reported to a
[`NodeLogger`].

## Fragments

Input without a single root, or input which uses prefixes declared
elsewhere, can be read as a fragment: it is wrapped in a synthetic
`RsxmlXmlWrapper` element declaring the given namespaces, parsed, and the
wrapper is stripped again. The fragment root then declares the wrapper's
bindings itself, unless it redeclares them.
*/
use tracing::{debug, trace, warn};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::namespaces::{declarations_for, Scope, PREFIX_XML, PREFIX_XMLNS, XMLNS_XML};
use crate::options::Style;
use crate::qname::{split, ExplodedAttributes, ExplodedName};
use crate::visitor::{Children, Visitor};
use crate::writer::XmlWriter;

/// Name of the synthetic element fragments are wrapped in.
pub const WRAP_ELEMENT: &'static str = "RsxmlXmlWrapper";

/// Classification of a parsed node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
	Element,
	Text,
	/// Anything else; the string names the kind for logging.
	Other(&'static str),
}

/// A namespace as reported by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeNamespace<'a> {
	/// `None` for the default namespace
	pub prefix: Option<&'a str>,
	pub uri: &'a str,
}

/// An attribute as reported by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeAttribute<'a> {
	pub name: &'a str,
	pub value: &'a str,
	pub namespace: Option<NodeNamespace<'a>>,
}

/// Node of a parsed XML document.
pub trait XmlNode: Sized {
	fn kind(&self) -> NodeKind;

	/// Local name of an element.
	fn name(&self) -> &str;

	/// Namespace of an element, if any.
	fn namespace(&self) -> Option<NodeNamespace<'_>>;

	fn attributes(&self) -> Vec<NodeAttribute<'_>>;

	/// Namespaces declared on this element.
	fn namespace_definitions(&self) -> Vec<NodeNamespace<'_>>;

	/// Text of a text node, or the content of other non-element nodes.
	fn text_content(&self) -> Option<&str>;

	fn children(&self) -> Vec<Self>;
}

/// Receives nodes skipped during traversal.
pub trait NodeLogger {
	fn skipped(&self, kind: &str, content: Option<&str>);
}

/// [`NodeLogger`] which emits `tracing` warnings.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl NodeLogger for TracingLogger {
	fn skipped(&self, kind: &str, content: Option<&str>) {
		warn!(kind, content, "skipping unsupported node");
	}
}

impl<F: Fn(&str)> NodeLogger for F {
	fn skipped(&self, kind: &str, content: Option<&str>) {
		match content {
			Some(content) => self(&format!("unknown node kind {}: {:?}", kind, content)),
			None => self(&format!("unknown node kind {}", kind)),
		}
	}
}

/// Split a start tag into the element's qualified name and the qualified
/// names of its attributes, declarations included, in source order.
fn scan_start_tag(raw: &str) -> (&str, Vec<&str>) {
	let raw = raw.strip_prefix('<').unwrap_or(raw);
	let end = raw
		.find(|c: char| c.is_whitespace() || c == '/' || c == '>')
		.unwrap_or(raw.len());
	let (name, mut rest) = raw.split_at(end);
	let mut attrs = Vec::new();
	loop {
		rest = rest.trim_start();
		if rest.is_empty() || rest.starts_with('>') || rest.starts_with('/') {
			break;
		}
		let end = rest
			.find(|c: char| c.is_whitespace() || c == '=')
			.unwrap_or(rest.len());
		attrs.push(&rest[..end]);
		rest = rest[end..].trim_start();
		rest = rest.strip_prefix('=').unwrap_or(rest).trim_start();
		let quote = match rest.chars().next() {
			Some(c @ ('"' | '\'')) => c,
			_ => break,
		};
		rest = &rest[1..];
		match rest.find(quote) {
			Some(i) => rest = &rest[i + 1..],
			None => break,
		}
	}
	(name, attrs)
}

/**
# [`XmlNode`] backed by [`roxmltree`]

roxmltree resolves namespaces but keeps neither prefixes nor the location
of declarations. Both are recovered from the element's start tag in the
source text, so a declaration repeating an outer one is still reported and
each attribute keeps the prefix it was written with.
*/
#[derive(Clone, Copy, Debug)]
pub struct ParsedNode<'a, 'input> {
	node: roxmltree::Node<'a, 'input>,
	source: &'input str,
}

impl<'a, 'input> ParsedNode<'a, 'input> {
	/// Wrap `node`, which must belong to a document parsed from `source`.
	pub fn new(node: roxmltree::Node<'a, 'input>, source: &'input str) -> Self {
		Self { node, source }
	}

	/// The root element of `doc`.
	pub fn root(doc: &'a roxmltree::Document<'input>, source: &'input str) -> Self {
		Self::new(doc.root_element(), source)
	}

	fn start_tag(&self) -> (&'input str, Vec<&'input str>) {
		match self.source.get(self.node.range()) {
			Some(raw) => scan_start_tag(raw),
			None => ("", Vec::new()),
		}
	}

	fn resolves_to(&self, prefix: &'a str, uri: &str) -> bool {
		if prefix == PREFIX_XML {
			return uri == XMLNS_XML;
		}
		self.node.lookup_namespace_uri(Some(prefix)) == Some(uri)
	}

	fn attribute_prefix(&self, qnames: &[&'input str], local: &str, uri: &str) -> Option<&'input str> {
		qnames.iter().copied().find_map(|qname| match split(qname) {
			(l, Some(p)) if l == local && p != PREFIX_XMLNS && self.resolves_to(p, uri) => Some(p),
			_ => None,
		})
	}
}

impl<'a, 'input> XmlNode for ParsedNode<'a, 'input> {
	fn kind(&self) -> NodeKind {
		if self.node.is_element() {
			NodeKind::Element
		} else if self.node.is_text() {
			NodeKind::Text
		} else if self.node.is_comment() {
			NodeKind::Other("comment")
		} else if self.node.is_pi() {
			NodeKind::Other("processing instruction")
		} else {
			NodeKind::Other("document")
		}
	}

	fn name(&self) -> &str {
		self.node.tag_name().name()
	}

	fn namespace(&self) -> Option<NodeNamespace<'_>> {
		let uri = self.node.tag_name().namespace().filter(|uri| !uri.is_empty())?;
		Some(NodeNamespace {
			prefix: split(self.start_tag().0).1,
			uri,
		})
	}

	fn attributes(&self) -> Vec<NodeAttribute<'_>> {
		let (_, qnames) = self.start_tag();
		self.node
			.attributes()
			.map(|attr| NodeAttribute {
				name: attr.name(),
				value: attr.value(),
				namespace: attr
					.namespace()
					.filter(|uri| !uri.is_empty())
					.map(|uri| NodeNamespace {
						prefix: self.attribute_prefix(&qnames, attr.name(), uri),
						uri,
					}),
			})
			.collect()
	}

	fn namespace_definitions(&self) -> Vec<NodeNamespace<'_>> {
		let (_, qnames) = self.start_tag();
		qnames
			.into_iter()
			.filter_map(|qname| match split(qname) {
				(PREFIX_XMLNS, None) => Some(None),
				(prefix, Some(PREFIX_XMLNS)) if prefix != PREFIX_XML => Some(Some(prefix)),
				_ => None,
			})
			.map(|prefix| NodeNamespace {
				prefix,
				uri: self.node.lookup_namespace_uri(prefix).unwrap_or(""),
			})
			.collect()
	}

	fn text_content(&self) -> Option<&str> {
		self.node.text()
	}

	fn children(&self) -> Vec<Self> {
		self.node
			.children()
			.map(|node| ParsedNode::new(node, self.source))
			.collect()
	}
}

fn explode_element_name(name: &str, namespace: Option<NodeNamespace<'_>>) -> ExplodedName {
	match namespace {
		Some(ns) => ExplodedName::qualified(name, ns.prefix.unwrap_or(""), ns.uri),
		None => ExplodedName::local(name),
	}
}

fn explode_attribute_name(attr: &NodeAttribute<'_>) -> ExplodedName {
	match attr.namespace {
		Some(NodeNamespace {
			prefix: Some(prefix),
			uri,
		}) if !prefix.is_empty() => ExplodedName::qualified(attr.name, prefix, uri),
		_ => ExplodedName::local(attr.name),
	}
}

fn walk_node<N: XmlNode>(
	node: &N,
	visitor: &mut dyn Visitor,
	ctx: &mut Context,
	logger: &dyn NodeLogger,
	inherited: Option<&Scope>,
) -> Result<()> {
	let mut scope = inherited.cloned().unwrap_or_default();
	for ns in node.namespace_definitions() {
		scope.insert(ns.prefix.unwrap_or("").to_string(), ns.uri.to_string());
	}

	let name = explode_element_name(node.name(), node.namespace());
	if name.local_part.is_empty() {
		return Err(Error::MalformedTree("element without name".into()));
	}
	let mut attrs = ExplodedAttributes::new();
	for attr in node.attributes() {
		attrs.insert(explode_attribute_name(&attr), attr.value.to_string());
	}

	let mut guard = ctx.enter(scope, &name.to_compact());
	let scope = guard.scope();
	trace!(name = %name, depth = guard.depth(), "entering element");

	let children = node.children();
	let mut walk = |visitor: &mut dyn Visitor, ctx: &mut Context| -> Result<()> {
		for child in children.iter() {
			match child.kind() {
				NodeKind::Element => walk_node(child, visitor, ctx, logger, None)?,
				NodeKind::Text => visitor.text(ctx, child.text_content().unwrap_or(""))?,
				NodeKind::Other(kind) => logger.skipped(kind, child.text_content()),
			}
		}
		Ok(())
	};
	visitor.element(&mut guard, &name, &attrs, &scope, Children::new(&mut walk))
}

/// Traverse the element `node` with `visitor`, logging skipped nodes with
/// `tracing`.
pub fn traverse<N: XmlNode, V: Visitor>(node: &N, visitor: V) -> Result<V> {
	traverse_with_logger(node, visitor, &TracingLogger)
}

/// Traverse the element `node` with `visitor`, reporting skipped nodes to
/// `logger`.
pub fn traverse_with_logger<N: XmlNode, V: Visitor>(
	node: &N,
	mut visitor: V,
	logger: &dyn NodeLogger,
) -> Result<V> {
	if node.kind() != NodeKind::Element {
		return Err(Error::MalformedTree("traversal must start at an element".into()));
	}
	walk_node(node, &mut visitor, &mut Context::new(), logger, None)?;
	Ok(visitor)
}

/// Wrap `fragment` in a [`WRAP_ELEMENT`] declaring `namespaces`.
pub fn wrap_fragment(fragment: &str, namespaces: &Scope) -> Result<String> {
	debug!(declarations = namespaces.len(), "wrapping fragment");
	let decls = declarations_for(namespaces, Style::Compact);
	let mut w = XmlWriter::new();
	w.element::<_, _, _, _, Error>(
		WRAP_ELEMENT,
		decls.iter().map(|(k, v)| (k.to_string(), v.as_str())),
		|w| Ok(w.raw(fragment)?),
	)?;
	Ok(w.finish()?)
}

/// Return the single element child of a wrapper element.
pub fn unwrap_fragment<N: XmlNode>(wrapper: &N) -> Result<N> {
	let mut roots = Vec::new();
	for child in wrapper.children() {
		match child.kind() {
			NodeKind::Element => roots.push(child),
			NodeKind::Text => {
				let text = child.text_content().unwrap_or("");
				if !text.trim().is_empty() {
					return Err(Error::MalformedTree(format!(
						"text outside of fragment root: {:?}",
						text
					)));
				}
			}
			NodeKind::Other(_) => (),
		}
	}
	match roots.len() {
		0 => Err(Error::MalformedTree("fragment has no root element".into())),
		1 => Ok(roots.remove(0)),
		n => Err(Error::MultipleRoots(n)),
	}
}

/// Parse `xml` and traverse its root element with `visitor`.
///
/// If `namespaces` is given, `xml` is read as a fragment declaring them.
pub fn traverse_str<V: Visitor>(
	xml: &str,
	namespaces: Option<&Scope>,
	mut visitor: V,
	logger: &dyn NodeLogger,
) -> Result<V> {
	let wrapped;
	let source = match namespaces {
		Some(ns) => {
			wrapped = wrap_fragment(xml, ns)?;
			wrapped.as_str()
		}
		None => xml,
	};
	let doc = roxmltree::Document::parse(source)?;
	let root = ParsedNode::root(&doc, source);
	let mut ctx = Context::new();
	match namespaces {
		Some(ns) => {
			let inner = unwrap_fragment(&root)?;
			walk_node(&inner, &mut visitor, &mut ctx, logger, Some(ns))?;
		}
		None => walk_node(&root, &mut visitor, &mut ctx, logger, None)?,
	}
	Ok(visitor)
}
