/*!
# Error types

This module holds the error types returned by the various functions of this
crate.

All errors are fatal to the operation which produced them: a traversal which
fails is aborted as a whole and no partial result is returned.
*/
use std::result::Result as StdResult;

pub use crate::writer::EncodeError;

/// Error types which may be returned from conversions and traversals.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	/// A node of the symbolic tree (or of a parsed document) is structurally
	/// invalid, for example an element without a name.
	#[error("malformed tree: {0}")]
	MalformedTree(String),

	/// A name carries a namespace URI but no prefix, or is otherwise not a
	/// usable qualified name.
	#[error("invalid name: {0}")]
	InvalidName(String),

	/// A name refers to a prefix which is not bound in the current scope.
	#[error("namespace prefix not bound: '{prefix}'")]
	UnboundPrefix {
		/// The prefix which could not be resolved (`""` for the default
		/// namespace).
		prefix: String,
	},

	/// Two bindings for the same prefix disagree.
	///
	/// This is reported when merging binding sets, when extracting the
	/// bindings implied by qualified names, and when compacting a name
	/// against a scope where its prefix is bound to a different URI.
	#[error("bindings clash: '{prefix}' is bound to '{bound}', but '{required}' is required")]
	BindingConflict {
		/// The prefix in question.
		prefix: String,
		/// The URI the prefix is already bound to.
		bound: String,
		/// The URI which was requested.
		required: String,
	},

	/// A user-supplied name transformer returned an unusable name.
	#[error("transformer returned an invalid name: {0}")]
	TransformerError(String),

	/// A fragment contained more than one root element after unwrapping.
	#[error("fragment has {0} root elements, expected exactly one")]
	MultipleRoots(usize),

	/// An option key is not supported by the entry point.
	#[error("option not permitted: {0}")]
	UnknownOption(String),

	/// An option value is not one of the permitted values.
	#[error("unknown value for option {option}: {value}")]
	InvalidOptionValue {
		/// The option key.
		option: String,
		/// The rejected value.
		value: String,
	},

	/// Two trees differ; `path` locates the first divergence in document
	/// order.
	#[error("[{path}]: {message}")]
	ComparisonMismatch {
		/// `/`-separated element names from the root to the parent of the
		/// differing node.
		path: String,
		/// Description of the difference.
		message: String,
	},

	/// The XML parser rejected the input.
	#[error("not well-formed: {0}")]
	Parse(String),

	/// The XML writer refused to emit a construct.
	#[error("cannot encode: {0}")]
	Encode(#[from] EncodeError),

	/// A [`MockVisitor`](crate::visitor::mock::MockVisitor) saw an
	/// invocation which does not match its next expectation.
	#[error("unexpected invocation: {actual}. expected: {expected}")]
	UnexpectedInvocation {
		/// The invocation as it happened.
		actual: String,
		/// The expectation it was matched against.
		expected: String,
	},

	/// A [`MockVisitor`](crate::visitor::mock::MockVisitor) was finished
	/// with expectations left over.
	#[error("missing invocations: {0}")]
	MissingInvocations(String),
}

pub type Result<T> = StdResult<T, Error>;

impl Error {
	pub(crate) fn unbound<P: Into<String>>(prefix: P) -> Error {
		Error::UnboundPrefix {
			prefix: prefix.into(),
		}
	}

	pub(crate) fn conflict<P: Into<String>, B: Into<String>, R: Into<String>>(
		prefix: P,
		bound: B,
		required: R,
	) -> Error {
		Error::BindingConflict {
			prefix: prefix.into(),
			bound: bound.into(),
			required: required.into(),
		}
	}
}

impl From<roxmltree::Error> for Error {
	fn from(e: roxmltree::Error) -> Error {
		Error::Parse(e.to_string())
	}
}
