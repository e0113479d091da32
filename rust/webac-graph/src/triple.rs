//! Minimal RDF triple representation.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The `rdf:type` predicate.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// A term in subject or object position of a [`Triple`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Node {
    /// A named resource
    Uri(String),
    /// A literal, reduced to its lexical form
    Literal(String),
    /// A blank node label
    Blank(String),
}

impl Node {
    /// Shorthand for [`Node::Uri`].
    pub fn uri(value: impl Into<String>) -> Self {
        Node::Uri(value.into())
    }

    /// Shorthand for [`Node::Literal`].
    pub fn literal(value: impl Into<String>) -> Self {
        Node::Literal(value.into())
    }

    /// The URI of this node, if it is one.
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Node::Uri(uri) => Some(uri),
            _ => None,
        }
    }

    /// The string value of a URI or literal node. Blank nodes have none.
    pub fn lexical(&self) -> Option<&str> {
        match self {
            Node::Uri(value) | Node::Literal(value) => Some(value),
            Node::Blank(_) => None,
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Uri(uri) => write!(f, "<{uri}>"),
            Node::Literal(value) => write!(f, "\"{value}\""),
            Node::Blank(label) => write!(f, "_:{label}"),
        }
    }
}

/// A single `(subject, predicate, object)` statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// The subject of the statement
    pub subject: Node,
    /// The predicate URI of the statement
    pub predicate: String,
    /// The object of the statement
    pub object: Node,
}

impl Triple {
    /// Create a triple from its three parts.
    pub fn new(subject: Node, predicate: impl Into<String>, object: Node) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }

    /// True when this triple asserts `rdf:type <class>`.
    pub fn is_type(&self, class: &str) -> bool {
        self.predicate == RDF_TYPE && self.object.as_uri() == Some(class)
    }
}

impl Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}
