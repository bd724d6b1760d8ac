/*!
# Visitor checking calls against expectations

```rust
use rsxml::{traverse, tree, ExplodedName};
use rsxml::visitor::mock::{Expectation, Matcher, MockVisitor};

let t = tree!["item", ["bar"], "foofoo"];
let mock = MockVisitor::new(vec![
	Expectation::element(ExplodedName::local("item"), Matcher::Any, Matcher::Any),
	Expectation::element(Matcher::pred(|n: &ExplodedName| n.local_part.as_str() == "bar"), Matcher::Any, Matcher::Any),
	Expectation::text("foofoo"),
]);
traverse(&t, mock).unwrap().finish().unwrap();
```
*/
use std::collections::VecDeque;
use std::fmt;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::namespaces::Scope;
use crate::qname::{ExplodedAttributes, ExplodedName};

use super::{Children, Visitor};

/// Matcher for a single argument of a call.
pub enum Matcher<T> {
	/// Matches anything.
	Any,
	/// Matches values equal to the one given.
	Eq(T),
	/// Matches values for which the predicate returns true.
	Pred(Box<dyn Fn(&T) -> bool>),
}

impl<T> Matcher<T> {
	pub fn pred<F: Fn(&T) -> bool + 'static>(f: F) -> Self {
		Self::Pred(Box::new(f))
	}
}

impl<T: PartialEq> Matcher<T> {
	fn matches(&self, value: &T) -> bool {
		match self {
			Self::Any => true,
			Self::Eq(expected) => expected == value,
			Self::Pred(f) => f(value),
		}
	}
}

impl<T> From<T> for Matcher<T> {
	fn from(value: T) -> Self {
		Self::Eq(value)
	}
}

impl<T: fmt::Debug> fmt::Debug for Matcher<T> {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Any => f.write_str("_"),
			Self::Eq(v) => fmt::Debug::fmt(v, f),
			Self::Pred(_) => f.write_str("<predicate>"),
		}
	}
}

/// An expected visitor call.
#[derive(Debug)]
pub enum Expectation {
	Element {
		name: Matcher<ExplodedName>,
		attrs: Matcher<ExplodedAttributes>,
		scope: Matcher<Scope>,
	},
	Text(Matcher<String>),
}

impl Expectation {
	pub fn element<N, A, S>(name: N, attrs: A, scope: S) -> Self
	where
		N: Into<Matcher<ExplodedName>>,
		A: Into<Matcher<ExplodedAttributes>>,
		S: Into<Matcher<Scope>>,
	{
		Self::Element {
			name: name.into(),
			attrs: attrs.into(),
			scope: scope.into(),
		}
	}

	pub fn text<T: Into<String>>(text: T) -> Self {
		Self::Text(Matcher::Eq(text.into()))
	}

	/// A text call with any content.
	pub fn any_text() -> Self {
		Self::Text(Matcher::Any)
	}
}

impl fmt::Display for Expectation {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Element { name, attrs, scope } => {
				write!(f, "element({:?}, {:?}, {:?})", name, attrs, scope)
			}
			Self::Text(text) => write!(f, "text({:?})", text),
		}
	}
}

/**
# Visitor which checks each call against a list of expectations

Calls are matched in order. The first mismatch fails the traversal with
[`Error::UnexpectedInvocation`]. Elements are always descended into.
*/
pub struct MockVisitor {
	expectations: VecDeque<Expectation>,
}

impl MockVisitor {
	pub fn new<I: IntoIterator<Item = Expectation>>(expectations: I) -> Self {
		Self {
			expectations: expectations.into_iter().collect(),
		}
	}

	/// Fail if there are expectations left.
	pub fn finish(self) -> Result<()> {
		if self.expectations.is_empty() {
			return Ok(());
		}
		let missing: Vec<String> = self.expectations.iter().map(|x| x.to_string()).collect();
		Err(Error::MissingInvocations(missing.join("\n")))
	}

	fn check<F: FnOnce(&Expectation) -> bool>(&mut self, actual: String, f: F) -> Result<()> {
		match self.expectations.pop_front() {
			Some(expected) if f(&expected) => Ok(()),
			Some(expected) => Err(Error::UnexpectedInvocation {
				actual,
				expected: expected.to_string(),
			}),
			None => Err(Error::UnexpectedInvocation {
				actual,
				expected: "nothing".into(),
			}),
		}
	}
}

impl Visitor for MockVisitor {
	fn element(
		&mut self,
		ctx: &mut Context,
		name: &ExplodedName,
		attrs: &ExplodedAttributes,
		scope: &Scope,
		children: Children<'_>,
	) -> Result<()> {
		let actual = format!("element({:?}, {:?}, {:?})", name, attrs, scope);
		self.check(actual, |x| match x {
			Expectation::Element {
				name: n,
				attrs: a,
				scope: s,
			} => n.matches(name) && a.matches(attrs) && s.matches(scope),
			Expectation::Text(_) => false,
		})?;
		children.visit(self, ctx)
	}

	fn text(&mut self, _ctx: &mut Context, text: &str) -> Result<()> {
		let actual = format!("text({:?})", text);
		let text = text.to_string();
		self.check(actual, |x| match x {
			Expectation::Text(t) => t.matches(&text),
			Expectation::Element { .. } => false,
		})
	}
}
