/*!
# Traversal context

The [`Context`] is created once per traversal and handed to every visitor
callback. It owns the [`BindingStack`] and keeps track of where in the tree
the traversal currently is.
*/
use std::fmt::Write as _;
use std::ops::{Deref, DerefMut};

use crate::error::Result;
use crate::namespaces::{merge, BindingStack, Scope};

/**
# State of a single traversal

Besides the binding stack, the context records the names of the elements
which are currently open together with their position among their element
siblings. Transformers use this through [`Context::parent_path`].
*/
#[derive(Debug)]
pub struct Context {
	bindings: BindingStack,
	ancestors: Vec<(String, usize)>,
	siblings: Vec<usize>,
}

impl Context {
	/// Create a context with no bindings in effect.
	pub fn new() -> Self {
		Self {
			bindings: BindingStack::new(),
			ancestors: Vec::new(),
			siblings: vec![0],
		}
	}

	/// Create a context with an outer scope of bindings which are assumed
	/// to be declared already.
	pub fn with_bindings(scope: Scope) -> Self {
		let mut result = Self::new();
		result.bindings.push(scope);
		result
	}

	/// The bindings currently in effect.
	pub fn bindings(&self) -> &BindingStack {
		&self.bindings
	}

	/// Number of currently open elements.
	pub fn depth(&self) -> usize {
		self.ancestors.len()
	}

	/// Location of the parent of the current element.
	///
	/// This is `""` for the root element and `/name[index]` per ancestor
	/// otherwise, where `index` counts element siblings from zero.
	pub fn parent_path(&self) -> String {
		let n = self.ancestors.len().saturating_sub(1);
		let mut path = String::new();
		for (name, index) in self.ancestors[..n].iter() {
			// writing to a String cannot fail
			let _ = write!(path, "/{}[{}]", name, index);
		}
		path
	}

	/// Enter an element called `name`, pushing `scope`.
	///
	/// Scope and element are left again when the returned guard is
	/// dropped.
	pub fn enter(&mut self, scope: Scope, name: &str) -> ScopeGuard<'_> {
		let index = match self.siblings.last_mut() {
			Some(count) => {
				let index = *count;
				*count += 1;
				index
			}
			None => 0,
		};
		self.ancestors.push((name.to_string(), index));
		self.siblings.push(0);
		self.bindings.push(scope);
		ScopeGuard { ctx: self }
	}

	/// Add bindings to the innermost scope, failing on clashes with what it
	/// already declares.
	pub fn declare(&mut self, extra: &Scope) -> Result<()> {
		if extra.is_empty() {
			return Ok(());
		}
		if let Some(top) = self.bindings.top_mut() {
			*top = merge(top, extra)?;
		}
		Ok(())
	}

	/// The innermost scope.
	pub fn scope(&self) -> Scope {
		self.bindings.top().cloned().unwrap_or_default()
	}

	fn leave(&mut self) {
		self.bindings.pop();
		self.siblings.pop();
		self.ancestors.pop();
	}
}

impl Default for Context {
	fn default() -> Self {
		Self::new()
	}
}

/// Keeps an element entered with [`Context::enter`] open.
pub struct ScopeGuard<'c> {
	ctx: &'c mut Context,
}

impl<'c> Deref for ScopeGuard<'c> {
	type Target = Context;

	fn deref(&self) -> &Context {
		self.ctx
	}
}

impl<'c> DerefMut for ScopeGuard<'c> {
	fn deref_mut(&mut self) -> &mut Context {
		self.ctx
	}
}

impl<'c> Drop for ScopeGuard<'c> {
	fn drop(&mut self) {
		self.ctx.leave();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scope(prefix: &str, uri: &str) -> Scope {
		let mut s = Scope::new();
		s.insert(prefix.into(), uri.into());
		s
	}

	#[test]
	fn guard_pops_scope_on_drop() {
		let mut ctx = Context::new();
		{
			let guard = ctx.enter(scope("p", "A"), "outer");
			assert_eq!(guard.bindings().lookup("p"), Some("A"));
		}
		assert_eq!(ctx.bindings().lookup("p"), None);
		assert_eq!(ctx.depth(), 0);
	}

	#[test]
	fn guard_pops_scope_on_error_exit() {
		fn fails(ctx: &mut Context) -> Result<()> {
			let _guard = ctx.enter(scope("p", "A"), "x");
			Err(crate::error::Error::MalformedTree("test".into()))
		}
		let mut ctx = Context::new();
		assert!(fails(&mut ctx).is_err());
		assert_eq!(ctx.bindings().depth(), 0);
	}

	#[test]
	fn nested_scopes_shadow_and_restore() {
		let mut ctx = Context::new();
		let mut outer = ctx.enter(scope("p", "A"), "outer");
		{
			let inner = outer.enter(scope("p", "B"), "inner");
			assert_eq!(inner.bindings().lookup("p"), Some("B"));
		}
		assert_eq!(outer.bindings().lookup("p"), Some("A"));
	}

	#[test]
	fn declare_merges_into_innermost_scope() {
		let mut ctx = Context::new();
		let mut guard = ctx.enter(scope("p", "A"), "x");
		guard.declare(&scope("q", "B")).unwrap();
		assert_eq!(guard.scope().len(), 2);
		assert!(guard.declare(&scope("p", "C")).is_err());
	}

	#[test]
	fn with_bindings_provides_outer_scope() {
		let ctx = Context::with_bindings(scope("foo", "urn:foo"));
		assert_eq!(ctx.bindings().lookup("foo"), Some("urn:foo"));
	}

	#[test]
	fn parent_path_counts_element_siblings() {
		let mut ctx = Context::new();
		let mut root = ctx.enter(Scope::new(), "root");
		assert_eq!(root.parent_path(), "");
		{
			let mut foo = root.enter(Scope::new(), "foo");
			assert_eq!(foo.parent_path(), "/root[0]");
			let bar = foo.enter(Scope::new(), "bar");
			assert_eq!(bar.parent_path(), "/root[0]/foo[0]");
		}
		root.enter(Scope::new(), "foo");
		let second = root.enter(Scope::new(), "foo");
		drop(second);
		let mut third = root.enter(Scope::new(), "baz");
		let leaf = third.enter(Scope::new(), "leaf");
		assert_eq!(leaf.parent_path(), "/root[0]/baz[3]");
	}
}
