/*!
# Visitors

A [`Visitor`] consumes a traversal, either of a symbolic tree
([`crate::traverse`]) or of parsed XML ([`crate::xml`]). Both drive the
visitor with the same sequence of calls for equivalent input: exploded names
and attributes, and the namespace bindings each element introduces.

The visitor decides whether to descend into an element's children by
calling [`Children::visit`].

This module provides three visitors:

- [`Serializer`]: writes XML text
- [`TreeBuilder`]: builds a symbolic tree
- [`MockVisitor`](mock::MockVisitor): checks calls against expectations
*/
pub mod build;
pub mod mock;
pub mod write;

use rxml_validation::validate_ncname;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::namespaces::{extract_exploded_bindings, undeclared, Scope};
use crate::qname::{ExplodedAttributes, ExplodedName};

pub use self::build::TreeBuilder;
pub use self::write::Serializer;

type Walk<'a> = dyn FnMut(&mut dyn Visitor, &mut Context) -> Result<()> + 'a;

/// Handle to the children of the element being visited.
pub struct Children<'a> {
	walk: &'a mut Walk<'a>,
}

impl<'a> Children<'a> {
	pub(crate) fn new(walk: &'a mut Walk<'a>) -> Self {
		Self { walk }
	}

	/// Traverse the children with `visitor`.
	pub fn visit(self, visitor: &mut dyn Visitor, ctx: &mut Context) -> Result<()> {
		(self.walk)(visitor, ctx)
	}

	/// Do not traverse the children.
	pub fn skip(self) {}
}

/// Consumer of a traversal.
pub trait Visitor {
	/// Called for each element in document order.
	///
	/// `scope` holds the bindings which the element introduces, declared
	/// and implied. They are already pushed onto `ctx.bindings()`.
	fn element(
		&mut self,
		ctx: &mut Context,
		name: &ExplodedName,
		attrs: &ExplodedAttributes,
		scope: &Scope,
		children: Children<'_>,
	) -> Result<()>;

	/// Called for each text node.
	fn text(&mut self, ctx: &mut Context, text: &str) -> Result<()>;
}

/**
# Element name and attribute transformer

Called by [`Serializer`] and [`TreeBuilder`] for each element before it is
emitted. The returned name must have a valid NCName as local part, and must
not carry a URI without a prefix.

Closures of the matching signature implement this trait:

```rust
use rsxml::context::Context;
use rsxml::options::Style;
use rsxml::visitor::TreeBuilder;
use rsxml::{traverse, tree, Element, ExplodedAttributes, ExplodedName};

let builder = TreeBuilder::new(Style::Compact).with_transformer(
	|_ctx: &Context, mut name: ExplodedName, attrs: ExplodedAttributes| {
		name.local_part = name.local_part.to_uppercase().into();
		(name, attrs)
	},
);
let t = traverse(&tree!["foo", ["bar"]], builder).unwrap().finish().unwrap();
assert_eq!(t, Element::new("FOO").child(Element::new("BAR")));
```
*/
pub trait Transform {
	fn transform(
		&mut self,
		ctx: &Context,
		name: ExplodedName,
		attrs: ExplodedAttributes,
	) -> (ExplodedName, ExplodedAttributes);
}

impl<F> Transform for F
where
	F: FnMut(&Context, ExplodedName, ExplodedAttributes) -> (ExplodedName, ExplodedAttributes),
{
	fn transform(
		&mut self,
		ctx: &Context,
		name: ExplodedName,
		attrs: ExplodedAttributes,
	) -> (ExplodedName, ExplodedAttributes) {
		self(ctx, name, attrs)
	}
}

fn check_transformed_name(name: &ExplodedName) -> Result<()> {
	if name.local_part.is_empty() {
		return Err(Error::TransformerError("empty local name".into()));
	}
	validate_ncname(&name.local_part)
		.map_err(|e| Error::TransformerError(format!("{}: {}", name, e)))?;
	name.validate()
		.map_err(|e| Error::TransformerError(e.to_string()))
}

/// Apply `transformer`, if any, and check its output.
pub(crate) fn apply_transform(
	transformer: Option<&mut Box<dyn Transform>>,
	ctx: &Context,
	name: &ExplodedName,
	attrs: &ExplodedAttributes,
) -> Result<(ExplodedName, ExplodedAttributes)> {
	let transformer = match transformer {
		Some(t) => t,
		None => return Ok((name.clone(), attrs.clone())),
	};
	let (name, attrs) = transformer.transform(ctx, name.clone(), attrs.clone());
	check_transformed_name(&name)?;
	for attr in attrs.keys() {
		check_transformed_name(attr)?;
	}
	Ok((name, attrs))
}

/// Declare on the current element what `name` and `attrs` need in scope.
///
/// This covers bindings implied by URIs a transformer introduced, and
/// `xmlns=""` for an unprefixed name while a default namespace is visible.
pub(crate) fn declare_required(
	ctx: &mut Context,
	name: &ExplodedName,
	attrs: &ExplodedAttributes,
) -> Result<()> {
	let required = extract_exploded_bindings(name, attrs)?;
	let implied = undeclared(ctx.bindings(), &required)?;
	ctx.declare(&implied)?;
	if name.prefix.is_none() && ctx.bindings().default_namespace().is_some() {
		let mut undeclare = Scope::new();
		undeclare.insert(String::new(), String::new());
		ctx.declare(&undeclare)?;
	}
	Ok(())
}
