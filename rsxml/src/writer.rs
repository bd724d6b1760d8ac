/*!
# Writer for XML text

A minimal, element-oriented XML writer: opening tags with attributes, text
and closing tags, written into a [`BytesMut`].

The writer does not know anything about namespaces. Names are written as
given after checking them against the XML `Name` production; namespace
declarations are just attributes to it.

```rust
use rsxml::writer::XmlWriter;

let mut w = XmlWriter::new();
w.start_element("item", [("foo", "100")]).unwrap();
w.text("a < b").unwrap();
w.end_element().unwrap();
assert_eq!(w.finish().unwrap(), "<item foo=\"100\">a &lt; b</item>");
```
*/
use std::collections::HashSet;

use bytes::{BufMut, BytesMut};

use rxml_validation::{validate_cdata, validate_name};

const CDATA_SPECIALS: &'static [u8] = &[b'<', b'>', b'&', b'\r'];

const ATTR_SPECIALS: &'static [u8] = &[b'"', b'\'', b'\r', b'\n', b'\t', b'<', b'>', b'&'];

fn escape<'a, B: BufMut>(out: &'a mut B, data: &'a [u8], specials: &'static [u8]) {
	let mut last_index = 0;
	for i in 0..data.len() {
		let ch = data[i];
		if !specials.contains(&ch) {
			continue;
		}
		if i > last_index {
			out.put_slice(&data[last_index..i]);
		}
		let replacement: &[u8] = match ch {
			b'"' => b"&#34;",
			b'\'' => b"&#39;",
			b'<' => b"&lt;",
			b'>' => b"&gt;",
			b'&' => b"&amp;",
			b'\r' => b"&#xd;",
			b'\n' => b"&#xa;",
			b'\t' => b"&#x9;",
			_ => &data[i..i + 1],
		};
		out.put_slice(replacement);
		last_index = i + 1;
	}
	out.put_slice(&data[last_index..data.len()]);
}

/// Error conditions of the [`XmlWriter`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
	/// An element or attribute name does not match the `Name` production.
	#[error("invalid name {0:?}")]
	InvalidName(String),

	/// Text or an attribute value contains characters which cannot be
	/// represented in XML 1.0.
	#[error("invalid text: {0}")]
	InvalidText(String),

	/// The same attribute name occurs twice on one element.
	#[error("duplicate attribute {0:?}")]
	DuplicateAttribute(String),

	/// Text or an element foot was written outside of any element.
	#[error("no open element")]
	NoOpenElement,

	/// The writer was finished while elements were still open.
	#[error("{0} element(s) left open")]
	UnclosedElements(usize),

	/// Content was written after the root element was closed.
	#[error("no content allowed after end of root element")]
	EndOfDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
	Start,
	Content,
	EndOfDocument,
}

/**
Writes a single XML element tree into a buffer.

Writers are stateful and can only be used to write a single document; they
have then to be [`finish`](Self::finish)ed.

Elements are always written with an explicit end tag (`<a></a>`) and
attribute values are always double-quoted.
*/
pub struct XmlWriter {
	state: WriterState,
	name_stack: Vec<String>,
	buf: BytesMut,
}

impl XmlWriter {
	/// Create a new writer with an empty buffer.
	pub fn new() -> Self {
		Self {
			state: WriterState::Start,
			name_stack: Vec::new(),
			buf: BytesMut::new(),
		}
	}

	/// Open an element.
	///
	/// Attributes are emitted in iteration order.
	pub fn start_element<I, K, V>(&mut self, name: &str, attrs: I) -> Result<(), EncodeError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		if self.state == WriterState::EndOfDocument {
			return Err(EncodeError::EndOfDocument);
		}
		validate_name(name).map_err(|_| EncodeError::InvalidName(name.to_string()))?;
		self.buf.put_u8(b'<');
		self.buf.put_slice(name.as_bytes());
		let mut seen = HashSet::new();
		for (k, v) in attrs {
			let (k, v) = (k.as_ref(), v.as_ref());
			validate_name(k).map_err(|_| EncodeError::InvalidName(k.to_string()))?;
			validate_cdata(v).map_err(|e| EncodeError::InvalidText(e.to_string()))?;
			if !seen.insert(k.to_string()) {
				return Err(EncodeError::DuplicateAttribute(k.to_string()));
			}
			self.buf.put_u8(b' ');
			self.buf.put_slice(k.as_bytes());
			self.buf.put_slice(b"=\"");
			escape(&mut self.buf, v.as_bytes(), ATTR_SPECIALS);
			self.buf.put_u8(b'"');
		}
		self.buf.put_u8(b'>');
		self.name_stack.push(name.to_string());
		self.state = WriterState::Content;
		Ok(())
	}

	/// Write escaped text into the current element.
	pub fn text(&mut self, text: &str) -> Result<(), EncodeError> {
		self.check_content()?;
		validate_cdata(text).map_err(|e| EncodeError::InvalidText(e.to_string()))?;
		escape(&mut self.buf, text.as_bytes(), CDATA_SPECIALS);
		Ok(())
	}

	/// Write pre-serialized markup into the current element, unchecked.
	pub fn raw(&mut self, markup: &str) -> Result<(), EncodeError> {
		self.check_content()?;
		self.buf.put_slice(markup.as_bytes());
		Ok(())
	}

	/// Close the innermost open element.
	pub fn end_element(&mut self) -> Result<(), EncodeError> {
		self.check_content()?;
		let name = match self.name_stack.pop() {
			Some(name) => name,
			None => return Err(EncodeError::NoOpenElement),
		};
		self.buf.put_slice(b"</");
		self.buf.put_slice(name.as_bytes());
		self.buf.put_u8(b'>');
		if self.name_stack.is_empty() {
			self.state = WriterState::EndOfDocument;
		}
		Ok(())
	}

	/// Write a complete element, with `f` producing its content.
	pub fn element<I, K, V, F, E>(&mut self, name: &str, attrs: I, f: F) -> Result<(), E>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
		F: FnOnce(&mut Self) -> Result<(), E>,
		E: From<EncodeError>,
	{
		self.start_element(name, attrs)?;
		f(self)?;
		self.end_element()?;
		Ok(())
	}

	/// Number of currently open elements.
	pub fn depth(&self) -> usize {
		self.name_stack.len()
	}

	/// Consume the writer and return the text written.
	pub fn finish(self) -> Result<String, EncodeError> {
		if !self.name_stack.is_empty() {
			return Err(EncodeError::UnclosedElements(self.name_stack.len()));
		}
		String::from_utf8(self.buf.to_vec()).map_err(|e| EncodeError::InvalidText(e.to_string()))
	}

	fn check_content(&self) -> Result<(), EncodeError> {
		match self.state {
			WriterState::Content => Ok(()),
			WriterState::Start => Err(EncodeError::NoOpenElement),
			WriterState::EndOfDocument => Err(EncodeError::EndOfDocument),
		}
	}
}

impl Default for XmlWriter {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const NO_ATTRS: [(&str, &str); 0] = [];

	fn escaped(data: &str, specials: &'static [u8]) -> String {
		let mut buf = BytesMut::new();
		escape(&mut buf, data.as_bytes(), specials);
		String::from_utf8(buf.to_vec()).unwrap()
	}

	#[test]
	fn escape_cdata_specials() {
		assert_eq!(escaped("a<b>&c\r\n\t'\"", CDATA_SPECIALS), "a&lt;b&gt;&amp;c&#xd;\n\t'\"");
	}

	#[test]
	fn escape_attr_specials() {
		assert_eq!(
			escaped("a<b>&c\r\n\t'\"", ATTR_SPECIALS),
			"a&lt;b&gt;&amp;c&#xd;&#xa;&#x9;&#39;&#34;"
		);
	}

	#[test]
	fn escape_passes_through_plain_text() {
		assert_eq!(escaped("fööbar", ATTR_SPECIALS), "fööbar");
	}

	#[test]
	fn writes_nested_elements_with_end_tags() {
		let mut w = XmlWriter::new();
		w.start_element("item", [("foo", "100")]).unwrap();
		w.start_element("bar", NO_ATTRS).unwrap();
		w.end_element().unwrap();
		w.text("foofoo").unwrap();
		w.start_element("baz", NO_ATTRS).unwrap();
		w.end_element().unwrap();
		w.end_element().unwrap();
		assert_eq!(
			w.finish().unwrap(),
			"<item foo=\"100\"><bar></bar>foofoo<baz></baz></item>"
		);
	}

	#[test]
	fn element_helper_wraps_content() {
		let mut w = XmlWriter::new();
		w.element::<_, _, _, _, EncodeError>("a", [("xmlns:p", "urn:p")], |w| w.raw("<p:b/>"))
			.unwrap();
		assert_eq!(w.finish().unwrap(), "<a xmlns:p=\"urn:p\"><p:b/></a>");
	}

	#[test]
	fn rejects_invalid_element_name() {
		let mut w = XmlWriter::new();
		assert_eq!(
			w.start_element("1foo", NO_ATTRS),
			Err(EncodeError::InvalidName("1foo".into()))
		);
	}

	#[test]
	fn rejects_invalid_attribute_name() {
		let mut w = XmlWriter::new();
		assert_eq!(
			w.start_element("foo", [("a b", "x")]),
			Err(EncodeError::InvalidName("a b".into()))
		);
	}

	#[test]
	fn rejects_duplicate_attribute() {
		let mut w = XmlWriter::new();
		assert_eq!(
			w.start_element("foo", [("a", "x"), ("a", "y")]),
			Err(EncodeError::DuplicateAttribute("a".into()))
		);
	}

	#[test]
	fn rejects_invalid_text() {
		let mut w = XmlWriter::new();
		w.start_element("foo", NO_ATTRS).unwrap();
		assert!(matches!(w.text("\u{0}"), Err(EncodeError::InvalidText(_))));
	}

	#[test]
	fn rejects_text_at_global_level() {
		let mut w = XmlWriter::new();
		assert_eq!(w.text("foo"), Err(EncodeError::NoOpenElement));
	}

	#[test]
	fn rejects_content_after_root() {
		let mut w = XmlWriter::new();
		w.start_element("a", NO_ATTRS).unwrap();
		w.end_element().unwrap();
		assert_eq!(w.start_element("b", NO_ATTRS), Err(EncodeError::EndOfDocument));
		assert_eq!(w.text("x"), Err(EncodeError::EndOfDocument));
	}

	#[test]
	fn finish_rejects_unclosed_elements() {
		let mut w = XmlWriter::new();
		w.start_element("a", NO_ATTRS).unwrap();
		w.start_element("b", NO_ATTRS).unwrap();
		assert_eq!(w.finish(), Err(EncodeError::UnclosedElements(2)));
	}
}
