/*!
# Symbolic trees

An [`Element`] is a name, a set of attributes and an ordered list of
children, each of which is either another element or a piece of text.

Trees are most conveniently written with the [`tree!`](crate::tree!) macro,
which mirrors the `[name, {attrs}, children...]` literal form:

```rust
use rsxml::tree;
use rsxml::tree::{Element, Node};

let t = tree!["item", {"foo" => 100}, ["bar"], "foofoo", ["baz"]];
assert_eq!(
	t,
	Element::new("item")
		.attr("foo", "100")
		.child(Element::new("bar"))
		.text("foofoo")
		.child(Element::new("baz")),
);
assert!(matches!(t.children[1], Node::Text(_)));
```

Names are anything convertible into a [`Name`]: `"foo:bar"` for a compact
name, `("bar", "foo")` for a prefixed name whose namespace is looked up, or
`("bar", "foo", "http://foo.com/foo")` for a fully qualified one.
*/
use indexmap::IndexMap;

use crate::qname::Name;

/// Attributes of a symbolic tree element.
///
/// Equality does not depend on attribute order.
pub type Attributes = IndexMap<Name, String>;

/// A child of an element.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
	Element(Element),
	Text(String),
}

impl Node {
	pub fn as_element(&self) -> Option<&Element> {
		match self {
			Self::Element(el) => Some(el),
			Self::Text(_) => None,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Element(_) => None,
			Self::Text(t) => Some(t),
		}
	}
}

impl From<Element> for Node {
	fn from(el: Element) -> Node {
		Node::Element(el)
	}
}

impl From<String> for Node {
	fn from(s: String) -> Node {
		Node::Text(s)
	}
}

impl From<&str> for Node {
	fn from(s: &str) -> Node {
		Node::Text(s.to_string())
	}
}

/// An element of a symbolic tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
	pub name: Name,
	pub attrs: Attributes,
	pub children: Vec<Node>,
}

impl Element {
	/// Create an element without attributes and children.
	pub fn new<N: Into<Name>>(name: N) -> Self {
		Self {
			name: name.into(),
			attrs: Attributes::new(),
			children: Vec::new(),
		}
	}

	/// Add an attribute, replacing any previous value.
	pub fn attr<N: Into<Name>, V: Into<String>>(mut self, name: N, value: V) -> Self {
		self.attrs.insert(name.into(), value.into());
		self
	}

	/// Append a child element.
	pub fn child<E: Into<Element>>(mut self, child: E) -> Self {
		self.children.push(Node::Element(child.into()));
		self
	}

	/// Append a text child.
	pub fn text<T: Into<String>>(mut self, text: T) -> Self {
		self.children.push(Node::Text(text.into()));
		self
	}

	/// Iterate over the element children, skipping text.
	pub fn elements(&self) -> impl Iterator<Item = &Element> {
		self.children.iter().filter_map(Node::as_element)
	}
}

/// Build an [`Element`](crate::tree::Element) from the literal tree form.
///
/// ```rust
/// use rsxml::tree;
///
/// let t = tree![("bar", "foo", "http://foo.com/foo"), {"foo:foofoo" => "fff"}];
/// assert_eq!(t.attrs.len(), 1);
/// ```
#[macro_export]
macro_rules! tree {
	(@children $el:ident) => {};
	(@children $el:ident [$($inner:tt)*] $(, $($rest:tt)*)?) => {
		$el.children.push($crate::tree::Node::Element($crate::tree![$($inner)*]));
		$crate::tree!(@children $el $($($rest)*)?);
	};
	(@children $el:ident $text:expr $(, $($rest:tt)*)?) => {
		$el.children.push($crate::tree::Node::Text(::std::string::ToString::to_string(&$text)));
		$crate::tree!(@children $el $($($rest)*)?);
	};
	($name:expr, {$($k:expr => $v:expr),* $(,)?} $(, $($rest:tt)*)?) => {{
		#[allow(unused_mut)]
		let mut el = $crate::tree::Element::new($name);
		$(el.attrs.insert(
			::std::convert::Into::<$crate::qname::Name>::into($k),
			::std::string::ToString::to_string(&$v),
		);)*
		$crate::tree!(@children el $($($rest)*)?);
		el
	}};
	($name:expr $(, $($rest:tt)*)?) => {{
		#[allow(unused_mut)]
		let mut el = $crate::tree::Element::new($name);
		$crate::tree!(@children el $($($rest)*)?);
		el
	}};
}
