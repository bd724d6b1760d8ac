/*!
# Conversion options

Typed configuration for the conversion entry points. Options can be built
with the builder methods or from string key/value pairs, which are checked
when they are read:

```rust
use rsxml::options::{ReadOptions, Style};

let opts = ReadOptions::from_pairs([
	("style", "exploded"),
	("xmlns:foo", "http://foo.com/foo"),
]).unwrap();
assert_eq!(opts.style, Style::Exploded);
assert!(ReadOptions::from_pairs([("nope", "x")]).is_err());
```
*/
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::namespaces::{Scope, PREFIX_XMLNS};
use crate::qname::split;

/// Name style of trees produced from XML.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Style {
	/// Names as `prefix:local` strings, namespace declarations as `xmlns`
	/// attributes.
	#[default]
	Compact,
	/// Names as `[local, prefix, uri]`, without declaration attributes.
	Exploded,
}

impl FromStr for Style {
	type Err = Error;

	fn from_str(s: &str) -> Result<Style> {
		match s {
			"compact" => Ok(Style::Compact),
			"exploded" => Ok(Style::Exploded),
			other => Err(Error::InvalidOptionValue {
				option: "style".into(),
				value: other.into(),
			}),
		}
	}
}

// "xmlns" => Some(""), "xmlns:p" => Some("p")
fn namespace_option(key: &str) -> Option<&str> {
	if key == PREFIX_XMLNS {
		return Some("");
	}
	match split(key) {
		(prefix, Some(PREFIX_XMLNS)) => Some(prefix),
		_ => None,
	}
}

/// Options for reading XML into a tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadOptions {
	/// Name style of the produced tree.
	pub style: Style,

	/// If set, the input is treated as a fragment and wrapped in an element
	/// declaring these namespaces before parsing.
	pub namespaces: Option<Scope>,
}

impl ReadOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn style(mut self, style: Style) -> Self {
		self.style = style;
		self
	}

	/// Declare a namespace for fragment parsing (`""` for the default
	/// namespace).
	pub fn namespace<P: Into<String>, U: Into<String>>(mut self, prefix: P, uri: U) -> Self {
		self.namespaces
			.get_or_insert_with(Scope::new)
			.insert(prefix.into(), uri.into());
		self
	}

	/// Build options from key/value pairs.
	///
	/// Accepted keys are `style`, `xmlns` and `xmlns:<prefix>`.
	pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let mut result = Self::new();
		for (k, v) in pairs {
			let (k, v) = (k.as_ref(), v.as_ref());
			if k == "style" {
				result.style = v.parse()?;
			} else if let Some(prefix) = namespace_option(k) {
				result = result.namespace(prefix, v);
			} else {
				return Err(Error::UnknownOption(k.into()));
			}
		}
		Ok(result)
	}
}

/// Options for serializing a tree to XML.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteOptions {
	/// Bindings assumed to be declared by an enclosing document.
	///
	/// They are used to resolve prefixes but are not declared in the
	/// output.
	pub namespaces: Option<Scope>,
}

impl WriteOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Assume `prefix` to be bound to `uri` (`""` for the default
	/// namespace).
	pub fn namespace<P: Into<String>, U: Into<String>>(mut self, prefix: P, uri: U) -> Self {
		self.namespaces
			.get_or_insert_with(Scope::new)
			.insert(prefix.into(), uri.into());
		self
	}

	/// Build options from key/value pairs.
	///
	/// Accepted keys are `xmlns` and `xmlns:<prefix>`.
	pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let mut result = Self::new();
		for (k, v) in pairs {
			let (k, v) = (k.as_ref(), v.as_ref());
			match namespace_option(k) {
				Some(prefix) => result = result.namespace(prefix, v),
				None => return Err(Error::UnknownOption(k.into())),
			}
		}
		Ok(result)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use rstest::rstest;

	#[rstest]
	#[case("compact", Style::Compact)]
	#[case("exploded", Style::Exploded)]
	fn style_from_str(#[case] input: &str, #[case] expected: Style) {
		assert_eq!(input.parse::<Style>().unwrap(), expected);
	}

	#[test]
	fn style_rejects_unknown_value() {
		assert_eq!(
			"squashed".parse::<Style>(),
			Err(Error::InvalidOptionValue {
				option: "style".into(),
				value: "squashed".into(),
			})
		);
	}

	#[test]
	fn default_style_is_compact() {
		assert_eq!(ReadOptions::new().style, Style::Compact);
	}

	#[test]
	fn read_options_from_pairs() {
		let opts = ReadOptions::from_pairs([
			("xmlns", "http://baz.com/baz"),
			("xmlns:foo", "http://foo.com/foo"),
		])
		.unwrap();
		let ns = opts.namespaces.unwrap();
		assert_eq!(ns[""], "http://baz.com/baz");
		assert_eq!(ns["foo"], "http://foo.com/foo");
	}

	#[test]
	fn read_options_reject_unknown_key() {
		assert_eq!(
			ReadOptions::from_pairs([("ns", "x")]),
			Err(Error::UnknownOption("ns".into()))
		);
	}

	#[test]
	fn read_options_reject_bad_style() {
		assert!(matches!(
			ReadOptions::from_pairs([("style", "fancy")]),
			Err(Error::InvalidOptionValue { .. })
		));
	}

	#[test]
	fn write_options_do_not_accept_style() {
		assert_eq!(
			WriteOptions::from_pairs([("style", "compact")]),
			Err(Error::UnknownOption("style".into()))
		);
	}

	#[test]
	fn write_options_builder() {
		let opts = WriteOptions::new().namespace("foo", "urn:foo");
		assert_eq!(opts.namespaces.unwrap()["foo"], "urn:foo");
	}
}
