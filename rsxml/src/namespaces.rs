/*!
# Namespace bindings

A [`Scope`] maps prefixes (`""` for the default namespace) to namespace
URIs for one element and its descendants. The [`BindingStack`] holds one
scope per ancestor; lookups search from the innermost scope outwards, so
closer declarations shadow outer ones.

The free functions in this module compute, for a single element, which
bindings it declares, which bindings its qualified names imply and which of
those still need declaring.
*/
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::options::Style;
use crate::qname::{split, ExplodedAttributes, ExplodedName, Name};
use crate::tree::Attributes;

/// XML core namespace URI (for the `xml:` prefix)
pub const XMLNS_XML: &'static str = "http://www.w3.org/XML/1998/namespace";
/// XML namespace URI (for the `xmlns:` prefix)
pub const XMLNS_XMLNS: &'static str = "http://www.w3.org/2000/xmlns/";

/// The prefix implicitly bound to [`XMLNS_XML`].
pub const PREFIX_XML: &'static str = "xml";
/// The prefix reserved for namespace declarations.
pub const PREFIX_XMLNS: &'static str = "xmlns";

/// Prefix to namespace URI bindings of a single element.
pub type Scope = IndexMap<String, String>;

/**
# Stack of namespace binding scopes

The `xml` prefix is implicitly bound to [`XMLNS_XML`] below the outermost
scope, as required by Namespaces in XML 1.0.
*/
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindingStack {
	scopes: Vec<Scope>,
}

impl BindingStack {
	/// Create an empty stack.
	pub fn new() -> Self {
		Self { scopes: Vec::new() }
	}

	pub fn push(&mut self, scope: Scope) {
		self.scopes.push(scope);
	}

	pub fn pop(&mut self) -> Option<Scope> {
		self.scopes.pop()
	}

	/// Number of scopes on the stack.
	pub fn depth(&self) -> usize {
		self.scopes.len()
	}

	/// The innermost scope, if any.
	pub fn top(&self) -> Option<&Scope> {
		self.scopes.last()
	}

	pub(crate) fn top_mut(&mut self) -> Option<&mut Scope> {
		self.scopes.last_mut()
	}

	/// Look up the URI bound to `prefix`, innermost scope first.
	pub fn lookup(&self, prefix: &str) -> Option<&str> {
		for scope in self.scopes.iter().rev() {
			if let Some(uri) = scope.get(prefix) {
				return Some(uri.as_str());
			}
		}
		if prefix == PREFIX_XML {
			return Some(XMLNS_XML);
		}
		None
	}

	/// Look up `prefix` and, if it is bound and `expected` is given, check
	/// that it is bound to `expected`.
	pub fn find_namespace_uri(&self, prefix: &str, expected: Option<&str>) -> Result<Option<&str>> {
		let uri = self.lookup(prefix);
		match (uri, expected) {
			(Some(bound), Some(required)) if bound != required => {
				Err(Error::conflict(prefix, bound, required))
			}
			_ => Ok(uri),
		}
	}

	/// The default namespace in effect, if any.
	///
	/// A default namespace undeclared with `xmlns=""` counts as none.
	pub fn default_namespace(&self) -> Option<&str> {
		self.lookup("").filter(|uri| !uri.is_empty())
	}
}

fn declared_prefix(name: &Name) -> Option<&str> {
	match name {
		Name::Compact(s) if s.as_str() == PREFIX_XMLNS => Some(""),
		Name::Compact(s) => match split(s) {
			(local, Some(PREFIX_XMLNS)) => Some(local),
			_ => None,
		},
		Name::Exploded(e) => match e.prefix.as_deref() {
			Some(PREFIX_XMLNS) => Some(e.local_part.as_str()),
			None if e.local_part.as_str() == PREFIX_XMLNS => Some(""),
			_ => None,
		},
	}
}

/// Split attributes into the real attributes and the bindings declared by
/// `xmlns` and `xmlns:prefix` attributes.
pub fn extract_declared_bindings(attrs: &Attributes) -> (Attributes, Scope) {
	let mut rest = Attributes::new();
	let mut declared = Scope::new();
	for (name, value) in attrs.iter() {
		match declared_prefix(name) {
			Some(prefix) => {
				declared.insert(prefix.to_string(), value.clone());
			}
			None => {
				rest.insert(name.clone(), value.clone());
			}
		}
	}
	(rest, declared)
}

fn bind_explicit(scope: &mut Scope, name: &Name) -> Result<()> {
	match name {
		Name::Exploded(e) => bind_exploded(scope, e),
		Name::Compact(_) => Ok(()),
	}
}

fn bind_exploded(scope: &mut Scope, e: &ExplodedName) -> Result<()> {
	let (prefix, uri) = match (e.prefix.as_deref(), e.uri.as_deref()) {
		(Some(PREFIX_XMLNS), _) => return Ok(()),
		(Some(prefix), Some(uri)) => (prefix, uri),
		_ => return Ok(()),
	};
	match scope.get(prefix) {
		Some(bound) if bound != uri => Err(Error::conflict(prefix, bound.as_str(), uri)),
		Some(_) => Ok(()),
		None => {
			scope.insert(prefix.to_string(), uri.to_string());
			Ok(())
		}
	}
}

/// Collect the bindings implied by names which carry a namespace URI.
pub fn extract_explicit_bindings(name: &Name, attrs: &Attributes) -> Result<Scope> {
	let mut scope = Scope::new();
	bind_explicit(&mut scope, name)?;
	for attr in attrs.keys() {
		bind_explicit(&mut scope, attr)?;
	}
	Ok(scope)
}

/// Collect the bindings needed by already exploded names, as produced by a
/// transformer.
pub fn extract_exploded_bindings(name: &ExplodedName, attrs: &ExplodedAttributes) -> Result<Scope> {
	let mut scope = Scope::new();
	bind_exploded(&mut scope, name)?;
	for attr in attrs.keys() {
		bind_exploded(&mut scope, attr)?;
	}
	Ok(scope)
}

/// Return the bindings of `explicit` which are not yet visible in `stack`.
///
/// Fails if `stack` binds one of the prefixes to a different URI.
pub fn undeclared(stack: &BindingStack, explicit: &Scope) -> Result<Scope> {
	let mut result = Scope::new();
	for (prefix, uri) in explicit.iter() {
		if stack.find_namespace_uri(prefix, Some(uri.as_str()))?.is_none() {
			result.insert(prefix.clone(), uri.clone());
		}
	}
	Ok(result)
}

/// Union of two scopes, failing on disagreeing bindings.
pub fn merge(a: &Scope, b: &Scope) -> Result<Scope> {
	let mut result = a.clone();
	for (prefix, uri) in b.iter() {
		match result.get(prefix) {
			Some(bound) if bound != uri => {
				return Err(Error::conflict(prefix.as_str(), bound.as_str(), uri.as_str()))
			}
			Some(_) => (),
			None => {
				result.insert(prefix.clone(), uri.clone());
			}
		}
	}
	Ok(result)
}

/// Render a scope as namespace declaration attributes.
///
/// With [`Style::Compact`], names are `xmlns` and `xmlns:prefix` strings.
/// With [`Style::Exploded`], the default declaration is still named `xmlns`
/// while prefixed ones become `[prefix, "xmlns"]`.
pub fn declarations_for(scope: &Scope, style: Style) -> Attributes {
	let mut attrs = Attributes::new();
	for (prefix, uri) in scope.iter() {
		let name = match (prefix.as_str(), style) {
			("", _) => Name::from(PREFIX_XMLNS),
			(prefix, Style::Compact) => Name::from(format!("{}:{}", PREFIX_XMLNS, prefix)),
			(prefix, Style::Exploded) => {
				Name::Exploded(ExplodedName::prefixed(prefix, PREFIX_XMLNS))
			}
		};
		attrs.insert(name, uri.clone());
	}
	attrs
}
