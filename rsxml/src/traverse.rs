/*!
# Symbolic tree traversal

Pre-order, depth-first walk over an [`Element`], driving a [`Visitor`].

For each element, the traversal

1. splits namespace declarations off the attributes,
2. collects the bindings implied by exploded names carrying a URI,
3. pushes the declared bindings plus those implied ones which are not yet
   in scope,
4. resolves the element and attribute names against the new stack, and
5. calls [`Visitor::element`], which may descend into the children.

The scope is popped again on every exit path, including errors.
*/
use tracing::trace;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::namespaces::{extract_declared_bindings, extract_explicit_bindings, undeclared};
use crate::qname::{explode, explode_attributes, Name};
use crate::tree::{Element, Node};
use crate::visitor::{Children, Visitor};

fn segment(name: &Name) -> String {
	match name {
		Name::Compact(s) => s.to_string(),
		Name::Exploded(e) => e.to_compact(),
	}
}

fn walk_element(el: &Element, visitor: &mut dyn Visitor, ctx: &mut Context) -> Result<()> {
	if el.name.is_empty() {
		return Err(Error::MalformedTree(format!(
			"element without name below '{}'",
			ctx.parent_path()
		)));
	}

	let (attrs, declared) = extract_declared_bindings(&el.attrs);
	let explicit = extract_explicit_bindings(&el.name, &el.attrs)?;

	let mut guard = ctx.enter(declared, &segment(&el.name));
	let implied = undeclared(guard.bindings(), &explicit)?;
	guard.declare(&implied)?;

	let name = explode(guard.bindings(), &el.name, false)?;
	let attrs = explode_attributes(guard.bindings(), &attrs)?;
	let scope = guard.scope();
	trace!(name = %name, depth = guard.depth(), "entering element");

	let mut walk = |visitor: &mut dyn Visitor, ctx: &mut Context| -> Result<()> {
		for child in el.children.iter() {
			match child {
				Node::Element(child) => walk_element(child, visitor, ctx)?,
				Node::Text(text) => visitor.text(ctx, text)?,
			}
		}
		Ok(())
	};
	visitor.element(&mut guard, &name, &attrs, &scope, Children::new(&mut walk))
}

/// Traverse `tree` with `visitor` and return the visitor.
pub fn traverse<V: Visitor>(tree: &Element, visitor: V) -> Result<V> {
	traverse_with(tree, visitor, &mut Context::new())
}

/// Traverse `tree` with `visitor` in an existing context.
///
/// Bindings already on the context's stack are treated as declared.
pub fn traverse_with<V: Visitor>(tree: &Element, mut visitor: V, ctx: &mut Context) -> Result<V> {
	walk_element(tree, &mut visitor, ctx)?;
	Ok(visitor)
}
