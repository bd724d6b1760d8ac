use crate::context::Context;
use crate::error::{Error, Result};
use crate::namespaces::{declarations_for, Scope};
use crate::options::Style;
use crate::qname::{ExplodedAttributes, ExplodedName, Name};
use crate::tree::{Attributes, Element, Node};

use super::{apply_transform, declare_required, Children, Transform, Visitor};

/**
# Visitor building a symbolic tree

With [`Style::Compact`], names become `prefix:local` strings and the
bindings each element introduces become `xmlns` attributes. With
[`Style::Exploded`], names keep their namespace URI and no declaration
attributes are added.
*/
pub struct TreeBuilder {
	style: Style,
	transformer: Option<Box<dyn Transform>>,
	cursor: Vec<Element>,
	root: Option<Element>,
}

impl TreeBuilder {
	pub fn new(style: Style) -> Self {
		Self {
			style,
			transformer: None,
			cursor: Vec::new(),
			root: None,
		}
	}

	/// Rewrite element names and attributes before the element is built.
	pub fn with_transformer<T: Transform + 'static>(mut self, transformer: T) -> Self {
		self.transformer = Some(Box::new(transformer));
		self
	}

	/// Return the root of the tree built.
	pub fn finish(self) -> Result<Element> {
		self.root
			.ok_or_else(|| Error::MalformedTree("no element was visited".into()))
	}

	// A bare compact name below an exploded name with empty prefix would be
	// read back in that element's namespace.
	fn default_in_output(&self) -> bool {
		self.cursor.iter().any(|el| match &el.name {
			Name::Exploded(e) => e.prefix.as_deref() == Some("") && e.uri.is_some(),
			Name::Compact(_) => false,
		})
	}

	fn make_element(&self, ctx: &Context, name: ExplodedName, attrs: ExplodedAttributes) -> Element {
		match self.style {
			Style::Compact => {
				let mut el_attrs = declarations_for(&ctx.scope(), Style::Compact);
				for (k, v) in attrs {
					el_attrs.insert(Name::from(k.to_compact()), v);
				}
				Element {
					name: Name::from(name.to_compact()),
					attrs: el_attrs,
					children: Vec::new(),
				}
			}
			Style::Exploded => Element {
				name: if name.prefix.is_none() && self.default_in_output() {
					Name::Exploded(name)
				} else {
					name.into_name()
				},
				attrs: attrs
					.into_iter()
					.map(|(k, v)| (k.into_name(), v))
					.collect::<Attributes>(),
				children: Vec::new(),
			},
		}
	}
}

impl Visitor for TreeBuilder {
	fn element(
		&mut self,
		ctx: &mut Context,
		name: &ExplodedName,
		attrs: &ExplodedAttributes,
		_scope: &Scope,
		children: Children<'_>,
	) -> Result<()> {
		let (name, attrs) = apply_transform(self.transformer.as_mut(), ctx, name, attrs)?;
		declare_required(ctx, &name, &attrs)?;
		let el = self.make_element(ctx, name, attrs);
		self.cursor.push(el);
		children.visit(self, ctx)?;
		let el = match self.cursor.pop() {
			Some(el) => el,
			None => return Err(Error::MalformedTree("unbalanced element".into())),
		};
		match self.cursor.last_mut() {
			Some(parent) => parent.children.push(Node::Element(el)),
			None => self.root = Some(el),
		}
		Ok(())
	}

	fn text(&mut self, _ctx: &mut Context, text: &str) -> Result<()> {
		match self.cursor.last_mut() {
			Some(parent) => {
				parent.children.push(Node::Text(text.to_string()));
				Ok(())
			}
			None => Err(Error::MalformedTree("text outside of element".into())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::traverse::traverse;
	use crate::tree;

	fn build(t: &Element, style: Style) -> Result<Element> {
		traverse(t, TreeBuilder::new(style))?.finish()
	}

	#[test]
	fn rebuilds_plain_tree() {
		let t = tree!["item", {"foo" => "100"}, ["bar"], "foofoo", ["baz"]];
		assert_eq!(build(&t, Style::Compact).unwrap(), t);
		assert_eq!(build(&t, Style::Exploded).unwrap(), t);
	}

	#[test]
	fn compact_style_adds_implied_declarations() {
		let t = tree![("bar", "foo", "http://foo.com/foo"), {"foo:foofoo" => "fff"}];
		assert_eq!(
			build(&t, Style::Compact).unwrap(),
			tree!["foo:bar", {"xmlns:foo" => "http://foo.com/foo", "foo:foofoo" => "fff"}]
		);
	}

	#[test]
	fn exploded_style_drops_declarations() {
		let t = tree!["foo:bar", {"xmlns:foo" => "http://foo.com/foo", "a" => "1"}, ["foo:baz"]];
		assert_eq!(
			build(&t, Style::Exploded).unwrap(),
			tree![
				("bar", "foo", "http://foo.com/foo"),
				{"a" => "1"},
				[("baz", "foo", "http://foo.com/foo")]
			]
		);
	}

	#[test]
	fn exploded_style_keeps_default_namespace() {
		let t = tree!["bar", {"xmlns" => "urn:d"}];
		assert_eq!(build(&t, Style::Exploded).unwrap(), tree![("bar", "", "urn:d")]);
	}

	#[test]
	fn compact_style_keeps_undeclared_default() {
		let t = tree!["a", {"xmlns" => "urn:d"}, ["b", {"xmlns" => ""}, ["c"]]];
		assert_eq!(build(&t, Style::Compact).unwrap(), t);
	}

	#[test]
	fn exploded_style_keeps_names_outside_default_namespace() {
		let t = tree!["a", {"xmlns" => "urn:d"}, ["b", {"xmlns" => ""}, ["c"]]];
		assert_eq!(
			build(&t, Style::Exploded).unwrap(),
			tree![
				("a", "", "urn:d"),
				[ExplodedName::local("b"), [ExplodedName::local("c")]]
			]
		);
	}

	#[test]
	fn transformer_namespace_is_declared_in_compact_style() {
		let t = tree!["a", ["b"]];
		let result = build_with(&t, |_: &Context, name: ExplodedName, attrs: ExplodedAttributes| {
			(ExplodedName::qualified(name.local_part, "q", "urn:q"), attrs)
		});
		assert_eq!(result, tree!["q:a", {"xmlns:q" => "urn:q"}, ["q:b"]]);
	}

	#[test]
	fn transformer_sees_parent_path() {
		let t = tree!["root", ["foo", ["leaf"]], ["foo", ["leaf"]]];
		let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
		let record = seen.clone();
		build_with(&t, move |ctx: &Context, name: ExplodedName, attrs: ExplodedAttributes| {
			record.borrow_mut().push(ctx.parent_path());
			(name, attrs)
		});
		assert_eq!(
			*seen.borrow(),
			vec!["", "/root[0]", "/root[0]/foo[0]", "/root[0]", "/root[0]/foo[1]"]
		);
	}

	#[test]
	fn transformer_capitalizes_names() {
		fn capitalize(mut name: ExplodedName) -> ExplodedName {
			let mut chars = name.local_part.chars();
			let capitalized: String = match chars.next() {
				Some(first) => first.to_uppercase().chain(chars).collect(),
				None => String::new(),
			};
			name.local_part = capitalized.into();
			name
		}
		let t = tree!["foo", {"bar" => "10", "baz" => "20"}];
		let result = build_with(&t, |_: &Context, name: ExplodedName, attrs: ExplodedAttributes| {
			let attrs: ExplodedAttributes = attrs.into_iter().map(|(k, v)| (capitalize(k), v)).collect();
			(capitalize(name), attrs)
		});
		assert_eq!(result, tree!["Foo", {"Bar" => "10", "Baz" => "20"}]);
	}

	#[test]
	fn transformer_must_return_valid_name() {
		let t = tree!["foo"];
		let result = traverse(
			&t,
			TreeBuilder::new(Style::Compact).with_transformer(
				|_: &Context, _: ExplodedName, attrs: ExplodedAttributes| {
					(ExplodedName::local(""), attrs)
				},
			),
		);
		assert!(matches!(result, Err(Error::TransformerError(_))));
	}

	#[test]
	fn finish_without_element_fails() {
		assert!(matches!(
			TreeBuilder::new(Style::Compact).finish(),
			Err(Error::MalformedTree(_))
		));
	}

	fn build_with<T: Transform + 'static>(t: &Element, transformer: T) -> Element {
		traverse(t, TreeBuilder::new(Style::Compact).with_transformer(transformer))
			.unwrap()
			.finish()
			.unwrap()
	}
}
