/*!
# Symbolic trees for XML

This crate converts between XML text and a compact symbolic tree
representation of it: elements with names, attributes and children, where
each child is either another element or a piece of text.

## Features

* Names in either compact (`"prefix:local"`) or exploded (local part,
  prefix and namespace URI) form
* Namespace declarations are derived from the names used: output declares
  each binding once, on the outermost element which needs it
* Fragments with externally declared namespaces can be read
* Pluggable visitors over both symbolic trees and parsed XML
* Transformation of names and attributes during conversion

## Example

```
use rsxml::{tree, ReadOptions, Style};

let t = tree![("bar", "foo", "http://foo.com/foo"), {"foo:foofoo" => "fff"}, "text"];
let xml = rsxml::to_xml(&t).unwrap();
assert_eq!(
	xml,
	"<foo:bar xmlns:foo=\"http://foo.com/foo\" foo:foofoo=\"fff\">text</foo:bar>",
);

let back = rsxml::to_rsxml_tree(&xml, &ReadOptions::new()).unwrap();
assert_eq!(
	back,
	tree!["foo:bar", {"xmlns:foo" => "http://foo.com/foo", "foo:foofoo" => "fff"}, "text"],
);

let exploded = rsxml::to_rsxml_tree(&xml, &ReadOptions::new().style(Style::Exploded)).unwrap();
assert_eq!(
	exploded,
	tree![
		("bar", "foo", "http://foo.com/foo"),
		{("foofoo", "foo", "http://foo.com/foo") => "fff"},
		"text"
	],
);
```

## Traversal

Conversions are built from a traversal, which walks either a symbolic tree
([`traverse()`]) or a parsed document ([`xml::traverse()`]) and drives a
[`Visitor`](visitor::Visitor). Both produce the same sequence of visitor
calls for equivalent documents. The visitors shipped with this crate are a
serializer, a tree builder and a mock for tests.
*/
pub mod compare;
pub mod context;
pub mod error;
pub mod namespaces;
pub mod options;
pub mod qname;
pub mod traverse;
pub mod tree;
pub mod visitor;
pub mod writer;
pub mod xml;


#[doc(inline)]
pub use compare::{compare, Document};
#[doc(inline)]
pub use error::{Error, Result};
pub use namespaces::Scope;
#[doc(inline)]
pub use options::{ReadOptions, Style, WriteOptions};
#[doc(inline)]
pub use qname::{ExplodedAttributes, ExplodedName, Name};
#[doc(inline)]
pub use traverse::{traverse, traverse_with};
pub use tree::{Attributes, Element, Node};

use context::Context;
use visitor::{Serializer, Transform, TreeBuilder};

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

fn write_context(options: &WriteOptions) -> Context {
	match options.namespaces.as_ref() {
		Some(ns) => Context::with_bindings(ns.clone()),
		None => Context::new(),
	}
}

/// Serialize a symbolic tree to XML.
pub fn to_xml(tree: &Element) -> Result<String> {
	to_xml_with(tree, &WriteOptions::new())
}

/// Serialize a symbolic tree to XML.
///
/// Bindings given in `options` are assumed to be declared by an enclosing
/// document and are not written.
pub fn to_xml_with(tree: &Element, options: &WriteOptions) -> Result<String> {
	traverse_with(tree, Serializer::new(), &mut write_context(options))?.finish()
}

/// Serialize a symbolic tree to XML, passing each element through
/// `transformer` first.
pub fn to_xml_transformed<T: Transform + 'static>(
	tree: &Element,
	options: &WriteOptions,
	transformer: T,
) -> Result<String> {
	let serializer = Serializer::new().with_transformer(transformer);
	traverse_with(tree, serializer, &mut write_context(options))?.finish()
}

/// Read XML into a symbolic tree.
///
/// If `options` carries namespaces, `xml` is read as a fragment in which
/// those are declared.
pub fn to_rsxml_tree(xml: &str, options: &ReadOptions) -> Result<Element> {
	read(xml, options, TreeBuilder::new(options.style))
}

/// Read XML into a symbolic tree, passing each element through
/// `transformer` before it is built.
pub fn to_rsxml_tree_with<T: Transform + 'static>(
	xml: &str,
	options: &ReadOptions,
	transformer: T,
) -> Result<Element> {
	read(
		xml,
		options,
		TreeBuilder::new(options.style).with_transformer(transformer),
	)
}

fn read(xml: &str, options: &ReadOptions, builder: TreeBuilder) -> Result<Element> {
	xml::traverse_str(
		xml,
		options.namespaces.as_ref(),
		builder,
		&xml::TracingLogger,
	)?
	.finish()
}
