use crate::context::Context;
use crate::error::Result;
use crate::namespaces::{declarations_for, Scope};
use crate::options::Style;
use crate::qname::{compact_attributes, compact_exploded, ExplodedAttributes, ExplodedName};
use crate::writer::XmlWriter;

use super::{apply_transform, declare_required, Children, Transform, Visitor};

/**
# Visitor writing XML text

Names are compacted against the bindings in effect. The bindings an element
introduces are written as `xmlns` declarations in front of its attributes,
so each prefix is declared on the outermost element which needs it.

```rust
use rsxml::{traverse, tree};
use rsxml::visitor::Serializer;

let t = tree![("bar", "foo", "http://foo.com/foo"), {"foo:foofoo" => "fff"}];
let xml = traverse(&t, Serializer::new()).unwrap().finish().unwrap();
assert_eq!(
	xml,
	"<foo:bar xmlns:foo=\"http://foo.com/foo\" foo:foofoo=\"fff\"></foo:bar>",
);
```
*/
pub struct Serializer {
	writer: XmlWriter,
	transformer: Option<Box<dyn Transform>>,
}

impl Serializer {
	pub fn new() -> Self {
		Self {
			writer: XmlWriter::new(),
			transformer: None,
		}
	}

	/// Rewrite element names and attributes before they are written.
	pub fn with_transformer<T: Transform + 'static>(mut self, transformer: T) -> Self {
		self.transformer = Some(Box::new(transformer));
		self
	}

	/// Return the XML written.
	pub fn finish(self) -> Result<String> {
		Ok(self.writer.finish()?)
	}
}

impl Default for Serializer {
	fn default() -> Self {
		Self::new()
	}
}

impl Visitor for Serializer {
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
		let qname = compact_exploded(ctx.bindings(), &name)?;
		let mut qattrs: Vec<(String, String)> = declarations_for(&ctx.scope(), Style::Compact)
			.into_iter()
			.map(|(k, v)| (k.to_string(), v))
			.collect();
		qattrs.extend(compact_attributes(ctx.bindings(), &attrs)?);

		self.writer.start_element(&qname, qattrs)?;
		children.visit(self, ctx)?;
		self.writer.end_element()?;
		Ok(())
	}

	fn text(&mut self, _ctx: &mut Context, text: &str) -> Result<()> {
		self.writer.text(text)?;
		Ok(())
	}
}
