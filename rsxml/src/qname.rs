/*!
# Qualified names

Element and attribute names come in two shapes:

- [`Name::Compact`]: a single string as it would appear in an XML document,
  for example `foo:bar` or `bar`.
- [`Name::Exploded`]: an [`ExplodedName`] carrying local part, prefix and
  namespace URI separately, so that no prefix resolution is necessary to
  know which namespace the name lives in.

The functions in this module convert between the two against a
[`BindingStack`].

The empty prefix `""` denotes the default namespace and is distinct from
"no prefix". An exploded name without prefix must not carry a URI.
*/
use std::fmt;

use indexmap::IndexMap;

use rxml_validation::validate_ncname;

use crate::error::{Error, Result};
use crate::namespaces::{BindingStack, PREFIX_XMLNS};

/// Storage for local parts and prefixes.
pub type NameStr = smartstring::alias::String;

/// Attributes with exploded names, as handed to visitors.
pub type ExplodedAttributes = IndexMap<ExplodedName, String>;

/**
# Name with separate local part, prefix and namespace URI

Conceptually this is the `[local, prefix, uri]` triple of the literal tree
form; `[local, prefix]` is represented with `uri: None`.
*/
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ExplodedName {
	pub local_part: NameStr,
	pub prefix: Option<NameStr>,
	pub uri: Option<String>,
}

impl ExplodedName {
	/// Create a name from its raw parts, without any checking.
	pub fn new<L: Into<NameStr>>(local_part: L, prefix: Option<&str>, uri: Option<&str>) -> Self {
		Self {
			local_part: local_part.into(),
			prefix: prefix.map(NameStr::from),
			uri: uri.map(String::from),
		}
	}

	/// A name without namespace.
	pub fn local<L: Into<NameStr>>(local_part: L) -> Self {
		Self {
			local_part: local_part.into(),
			prefix: None,
			uri: None,
		}
	}

	/// A prefixed name whose URI is still to be resolved.
	pub fn prefixed<L: Into<NameStr>, P: Into<NameStr>>(local_part: L, prefix: P) -> Self {
		Self {
			local_part: local_part.into(),
			prefix: Some(prefix.into()),
			uri: None,
		}
	}

	/// A fully qualified name.
	pub fn qualified<L: Into<NameStr>, P: Into<NameStr>, U: Into<String>>(
		local_part: L,
		prefix: P,
		uri: U,
	) -> Self {
		Self {
			local_part: local_part.into(),
			prefix: Some(prefix.into()),
			uri: Some(uri.into()),
		}
	}

	/// Check the prefix-implies-uri rule.
	pub fn validate(&self) -> Result<()> {
		if self.prefix.is_none() && self.uri.is_some() {
			return Err(Error::InvalidName(format!(
				"{} has a namespace URI but no prefix",
				self
			)));
		}
		Ok(())
	}

	/// Render as `prefix:local` (or just `local` for no or the empty
	/// prefix) without consulting any bindings.
	pub fn to_compact(&self) -> String {
		match self.prefix.as_deref() {
			Some(prefix) if !prefix.is_empty() => {
				let mut s = String::with_capacity(prefix.len() + 1 + self.local_part.len());
				s.push_str(prefix);
				s.push(':');
				s.push_str(&self.local_part);
				s
			}
			_ => self.local_part.to_string(),
		}
	}

	/// Convert into a [`Name`], using the compact form if the name carries
	/// no prefix at all.
	pub fn into_name(self) -> Name {
		if self.prefix.is_none() {
			Name::Compact(self.local_part)
		} else {
			Name::Exploded(self)
		}
	}

	/// Strip the empty prefix from an attribute name.
	///
	/// Unprefixed attributes are never in the default namespace, so an
	/// exploded attribute with prefix `""` is just its local part.
	fn into_attribute_name(self) -> Self {
		match self.prefix.as_deref() {
			Some("") => Self::local(self.local_part),
			_ => self,
		}
	}
}

impl fmt::Display for ExplodedName {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str("[")?;
		f.write_str(&self.local_part)?;
		if let Some(prefix) = self.prefix.as_ref() {
			write!(f, ", {:?}", prefix.as_str())?;
		} else if self.uri.is_some() {
			f.write_str(", nil")?;
		}
		if let Some(uri) = self.uri.as_ref() {
			write!(f, ", {}", uri)?;
		}
		f.write_str("]")
	}
}

/// Element or attribute name, in either representation.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Name {
	/// `prefix:local` or `local`
	Compact(NameStr),
	/// Separate local part, prefix and URI
	Exploded(ExplodedName),
}

impl Name {
	/// Return the local part and prefix, splitting compact names.
	pub fn parts(&self) -> (&str, Option<&str>) {
		match self {
			Self::Compact(s) => split(s),
			Self::Exploded(e) => (&e.local_part, e.prefix.as_deref()),
		}
	}

	/// Return the namespace URI carried by the name itself, if any.
	pub fn uri(&self) -> Option<&str> {
		match self {
			Self::Compact(_) => None,
			Self::Exploded(e) => e.uri.as_deref(),
		}
	}

	/// True if the name has no usable local part.
	pub fn is_empty(&self) -> bool {
		self.parts().0.is_empty()
	}
}

impl fmt::Display for Name {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Compact(s) => f.write_str(s),
			Self::Exploded(e) => fmt::Display::fmt(e, f),
		}
	}
}

impl From<&str> for Name {
	fn from(s: &str) -> Name {
		Name::Compact(s.into())
	}
}

impl From<String> for Name {
	fn from(s: String) -> Name {
		Name::Compact(s.into())
	}
}

impl From<NameStr> for Name {
	fn from(s: NameStr) -> Name {
		Name::Compact(s)
	}
}

impl From<ExplodedName> for Name {
	fn from(e: ExplodedName) -> Name {
		Name::Exploded(e)
	}
}

/// `(local, prefix)`
impl From<(&str, &str)> for Name {
	fn from((local, prefix): (&str, &str)) -> Name {
		Name::Exploded(ExplodedName::prefixed(local, prefix))
	}
}

/// `(local, prefix, uri)`
impl From<(&str, &str, &str)> for Name {
	fn from((local, prefix, uri): (&str, &str, &str)) -> Name {
		Name::Exploded(ExplodedName::qualified(local, prefix, uri))
	}
}

/// Split a compact name into local part and prefix.
///
/// Only names with exactly one colon and non-empty text on both sides are
/// split; everything else is returned in full as local part.
pub fn split(name: &str) -> (&str, Option<&str>) {
	match name.split_once(':') {
		Some((prefix, local))
			if !prefix.is_empty() && !local.is_empty() && !local.contains(':') =>
		{
			(local, Some(prefix))
		}
		_ => (name, None),
	}
}

/// Resolve a name against the bindings.
///
/// Compact names are split and their prefix resolved. Unprefixed element
/// names pick up the default namespace if one is bound; unprefixed
/// attribute names never do. Attribute names with the `xmlns` prefix are
/// returned unresolved.
///
/// Exploded names are validated and returned as-is, except that a missing
/// URI is filled in from the bindings.
pub fn explode(stack: &BindingStack, name: &Name, is_attribute: bool) -> Result<ExplodedName> {
	match name {
		Name::Exploded(e) => {
			e.validate()?;
			let prefix = match e.prefix.as_deref() {
				None => return Ok(e.clone()),
				Some(_) if e.uri.is_some() => return Ok(e.clone()),
				Some(p) if is_attribute && p == PREFIX_XMLNS => return Ok(e.clone()),
				Some(p) => p,
			};
			let uri = stack.lookup(prefix).ok_or_else(|| Error::unbound(prefix))?;
			Ok(ExplodedName::qualified(e.local_part.clone(), prefix, uri))
		}
		Name::Compact(s) => {
			let (local, prefix) = split(s);
			match prefix {
				Some(p) if is_attribute && p == PREFIX_XMLNS => {
					Ok(ExplodedName::prefixed(local, p))
				}
				Some(p) => {
					let uri = stack.lookup(p).ok_or_else(|| Error::unbound(p))?;
					Ok(ExplodedName::qualified(local, p, uri))
				}
				None if is_attribute => Ok(ExplodedName::local(local)),
				None => match stack.default_namespace() {
					Some(uri) => Ok(ExplodedName::qualified(local, "", uri)),
					None => Ok(ExplodedName::local(local)),
				},
			}
		}
	}
}

/// Produce the `prefix:local` string for a name.
///
/// Compact names are returned unchanged; exploded names are checked as by
/// [`compact_exploded`].
pub fn compact(stack: &BindingStack, name: &Name) -> Result<String> {
	match name {
		Name::Compact(s) => Ok(s.to_string()),
		Name::Exploded(e) => compact_exploded(stack, e),
	}
}

/// Produce the `prefix:local` string for an exploded name.
///
/// Local part and prefix must be NCNames. The prefix must be bound in
/// `stack`, and if the name carries a URI, it must match the binding. The
/// `xmlns` prefix is exempt from the binding checks.
pub fn compact_exploded(stack: &BindingStack, name: &ExplodedName) -> Result<String> {
	name.validate()?;
	validate_ncname(&name.local_part)
		.map_err(|e| Error::InvalidName(format!("{}: {}", name, e)))?;
	if let Some(prefix) = name.prefix.as_deref().filter(|p| !p.is_empty()) {
		validate_ncname(prefix).map_err(|e| Error::InvalidName(format!("{}: {}", name, e)))?;
	}
	if let Some(prefix) = name.prefix.as_deref() {
		if prefix != PREFIX_XMLNS
			&& stack
				.find_namespace_uri(prefix, name.uri.as_deref())?
				.is_none()
		{
			return Err(Error::unbound(prefix));
		}
	}
	Ok(name.to_compact())
}

/// Explode all attribute names.
///
/// Attribute names which end up with the empty prefix are reduced to their
/// local part.
pub fn explode_attributes<'a, I>(stack: &BindingStack, attrs: I) -> Result<ExplodedAttributes>
where
	I: IntoIterator<Item = (&'a Name, &'a String)>,
{
	let mut result = ExplodedAttributes::new();
	for (name, value) in attrs {
		let name = explode(stack, name, true)?.into_attribute_name();
		result.insert(name, value.clone());
	}
	Ok(result)
}

/// Compact all attribute names, keeping their order.
///
/// The result is a list, not a map: two distinct exploded names may compact
/// to the same string, which the writer then rejects.
pub fn compact_attributes(
	stack: &BindingStack,
	attrs: &ExplodedAttributes,
) -> Result<Vec<(String, String)>> {
	attrs
		.iter()
		.map(|(name, value)| Ok((compact_exploded(stack, name)?, value.clone())))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	use rstest::rstest;

	use crate::namespaces::{Scope, XMLNS_XML};

	fn stack(scopes: &[&[(&str, &str)]]) -> BindingStack {
		let mut stack = BindingStack::new();
		for scope in scopes {
			stack.push(
				scope
					.iter()
					.map(|(p, u)| (p.to_string(), u.to_string()))
					.collect::<Scope>(),
			);
		}
		stack
	}

	#[rstest]
	#[case("foo:bar", ("bar", Some("foo")))]
	#[case("bar", ("bar", None))]
	#[case("foo:bar:baz", ("foo:bar:baz", None))]
	#[case(":bar", (":bar", None))]
	#[case("foo:", ("foo:", None))]
	fn split_only_splits_on_exactly_one_colon(
		#[case] input: &str,
		#[case] expected: (&str, Option<&str>),
	) {
		assert_eq!(split(input), expected);
	}

	#[test]
	fn explode_leaves_fully_exploded_name_alone() {
		let name = Name::from(("bar", "foo", "http://foo.com/foo"));
		assert_eq!(
			explode(&stack(&[]), &name, false).unwrap(),
			ExplodedName::qualified("bar", "foo", "http://foo.com/foo"),
		);
	}

	#[test]
	fn explode_fills_in_uri_for_bound_prefix() {
		let s = stack(&[&[("foo", "http://foo.com/foo")]]);
		assert_eq!(
			explode(&s, &Name::from(("bar", "foo")), false).unwrap(),
			ExplodedName::qualified("bar", "foo", "http://foo.com/foo"),
		);
	}

	#[test]
	fn explode_rejects_unbound_prefix_without_uri() {
		match explode(&stack(&[]), &Name::from(("bar", "foo")), false) {
			Err(Error::UnboundPrefix { prefix }) => assert_eq!(prefix, "foo"),
			other => panic!("unexpected explode result: {:?}", other),
		}
	}

	#[test]
	fn explode_rejects_uri_without_prefix() {
		let name = Name::Exploded(ExplodedName::new("bar", None, Some("http://foo.com/foo")));
		assert!(matches!(
			explode(&stack(&[]), &name, false),
			Err(Error::InvalidName(_))
		));
	}

	#[test]
	fn explode_unprefixed_element_without_default_namespace() {
		assert_eq!(
			explode(&stack(&[]), &Name::from("bar"), false).unwrap(),
			ExplodedName::local("bar"),
		);
	}

	#[test]
	fn explode_unprefixed_element_in_default_namespace() {
		let s = stack(&[&[("", "http://foo.com/foo")]]);
		assert_eq!(
			explode(&s, &Name::from("bar"), false).unwrap(),
			ExplodedName::qualified("bar", "", "http://foo.com/foo"),
		);
	}

	#[test]
	fn explode_unprefixed_attribute_ignores_default_namespace() {
		let s = stack(&[&[("", "http://foo.com/foo")]]);
		assert_eq!(
			explode(&s, &Name::from("bar"), true).unwrap(),
			ExplodedName::local("bar"),
		);
	}

	#[test]
	fn explode_prefixed_name() {
		let s = stack(&[&[("foo", "http://foo.com/foo")]]);
		assert_eq!(
			explode(&s, &Name::from("foo:bar"), false).unwrap(),
			ExplodedName::qualified("bar", "foo", "http://foo.com/foo"),
		);
	}

	#[test]
	fn explode_prefixed_name_with_unbound_prefix() {
		assert!(matches!(
			explode(&stack(&[]), &Name::from("foo:bar"), false),
			Err(Error::UnboundPrefix { .. })
		));
	}

	#[test]
	fn explode_does_not_resolve_xmlns_attributes() {
		assert_eq!(
			explode(&stack(&[]), &Name::from("xmlns:foo"), true).unwrap(),
			ExplodedName::prefixed("foo", "xmlns"),
		);
	}

	#[test]
	fn explode_resolves_xml_prefix_implicitly() {
		assert_eq!(
			explode(&stack(&[]), &Name::from("xml:lang"), true).unwrap(),
			ExplodedName::qualified("lang", "xml", XMLNS_XML),
		);
	}

	#[test]
	fn explode_uses_innermost_binding() {
		let s = stack(&[&[("p", "urn:a")], &[("p", "urn:b")]]);
		assert_eq!(
			explode(&s, &Name::from("p:x"), false).unwrap().uri.as_deref(),
			Some("urn:b"),
		);
	}

	#[test]
	fn compact_pair_and_triple() {
		let s = stack(&[&[("foo", "http://foo.com/foo")]]);
		assert_eq!(compact(&s, &Name::from(("bar", "foo"))).unwrap(), "foo:bar");
		assert_eq!(
			compact(&s, &Name::from(("bar", "foo", "http://foo.com/foo"))).unwrap(),
			"foo:bar"
		);
	}

	#[test]
	fn compact_default_namespace_name() {
		let s = stack(&[&[("", "http://foo.com/foo")]]);
		assert_eq!(compact(&s, &Name::from(("bar", ""))).unwrap(), "bar");
		assert_eq!(
			compact(&s, &Name::from(("bar", "", "http://foo.com/foo"))).unwrap(),
			"bar"
		);
	}

	#[test]
	fn compact_leaves_strings_alone() {
		assert_eq!(compact(&stack(&[]), &Name::from("foo:bar")).unwrap(), "foo:bar");
	}

	#[test]
	fn compact_rejects_uri_without_prefix() {
		let name = Name::Exploded(ExplodedName::new("bar", None, Some("http://foo.com/foo")));
		assert!(matches!(
			compact(&stack(&[]), &name),
			Err(Error::InvalidName(_))
		));
	}

	#[test]
	fn compact_rejects_unbound_prefix() {
		assert!(matches!(
			compact(&stack(&[]), &Name::from(("bar", "foo", "http://foo.com/foo"))),
			Err(Error::UnboundPrefix { .. })
		));
	}

	#[test]
	fn compact_rejects_clashing_binding() {
		let s = stack(&[&[("foo", "http://foo.com/foo")]]);
		match compact(&s, &Name::from(("bar", "foo", "http://bar.com/bar"))) {
			Err(Error::BindingConflict {
				prefix,
				bound,
				required,
			}) => {
				assert_eq!(prefix, "foo");
				assert_eq!(bound, "http://foo.com/foo");
				assert_eq!(required, "http://bar.com/bar");
			}
			other => panic!("unexpected compact result: {:?}", other),
		}
	}

	#[test]
	fn compact_rejects_clashing_default_binding() {
		let s = stack(&[&[("", "http://foo.com/foo")]]);
		match compact(&s, &Name::from(("bar", "", "http://bar.com/bar"))) {
			Err(Error::BindingConflict { prefix, .. }) => assert_eq!(prefix, ""),
			other => panic!("unexpected compact result: {:?}", other),
		}
	}

	#[test]
	fn compact_skips_checks_for_xmlns() {
		assert_eq!(
			compact(&stack(&[]), &Name::from(("foo", "xmlns"))).unwrap(),
			"xmlns:foo"
		);
	}

	#[test]
	fn compact_attributes_with_default_namespace() {
		let s = stack(&[&[
			("", "http://default.com/default"),
			("foo", "http://foo.com/foo"),
		]]);
		let mut attrs = ExplodedAttributes::new();
		attrs.insert(ExplodedName::prefixed("bar", "foo"), "barbar".to_string());
		attrs.insert(ExplodedName::prefixed("boo", ""), "booboo".to_string());
		attrs.insert(ExplodedName::local("baz"), "bazbaz".to_string());
		assert_eq!(
			compact_attributes(&s, &attrs).unwrap(),
			vec![
				("foo:bar".to_string(), "barbar".to_string()),
				("boo".to_string(), "booboo".to_string()),
				("baz".to_string(), "bazbaz".to_string()),
			]
		);
	}

	#[test]
	fn compact_attributes_with_unbound_default_namespace() {
		let s = stack(&[&[("foo", "http://foo.com/foo")]]);
		let mut attrs = ExplodedAttributes::new();
		attrs.insert(ExplodedName::prefixed("boo", ""), "booboo".to_string());
		assert!(matches!(
			compact_attributes(&s, &attrs),
			Err(Error::UnboundPrefix { .. })
		));
	}

	#[test]
	fn explode_attributes_collapses_the_empty_prefix() {
		let s = stack(&[&[
			("", "http://default.com/default"),
			("foo", "http://foo.com/foo"),
		]]);
		let mut attrs = IndexMap::new();
		attrs.insert(Name::from("foo:bar"), "barbar".to_string());
		attrs.insert(Name::from("baz"), "bazbaz".to_string());
		attrs.insert(Name::from(("boo", "", "http://default.com/default")), "b".to_string());
		let exploded = explode_attributes(&s, &attrs).unwrap();
		assert_eq!(
			exploded[&ExplodedName::qualified("bar", "foo", "http://foo.com/foo")],
			"barbar"
		);
		assert_eq!(exploded[&ExplodedName::local("baz")], "bazbaz");
		assert_eq!(exploded[&ExplodedName::local("boo")], "b");
	}

	#[test]
	fn into_name_prefers_compact_form_for_local_names() {
		assert_eq!(ExplodedName::local("foo").into_name(), Name::from("foo"));
		assert_eq!(
			ExplodedName::qualified("foo", "", "urn:x").into_name(),
			Name::from(("foo", "", "urn:x")),
		);
	}

	#[rstest]
	#[case(ExplodedName::local("p:"))]
	#[case(ExplodedName::local(":a"))]
	#[case(ExplodedName::local("a:b:c"))]
	#[case(ExplodedName::local("not valid"))]
	#[case(ExplodedName::qualified("a", "p q", "urn:x"))]
	fn compact_rejects_non_ncname_parts(#[case] name: ExplodedName) {
		let s = stack(&[&[("p q", "urn:x")]]);
		assert!(matches!(compact_exploded(&s, &name), Err(Error::InvalidName(_))));
	}
}
