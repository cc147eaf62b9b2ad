//! Mutable markup tree
//!
//! Rendered markup is parsed as an HTML fragment in `<body>` context. The
//! parser recovers from malformed input the way browsers do, so parsing
//! never fails. Slots are filled by swapping element children in place and
//! the tree is serialized back afterwards.

use crate::error::{BlocksError, BlocksResult};
use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_fragment, serialize};
use markup5ever::{LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::mem;
use std::rc::Rc;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parsed markup fragment
pub struct MarkupFragment {
	// Dropping the document tears down the whole subtree, so it lives
	// exactly as long as the fragment
	_document: Handle,
	root: Handle,
}

impl MarkupFragment {
	/// Parse `markup` as a body fragment
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_reusable_blocks_core::markup::MarkupFragment;
	///
	/// let fragment = MarkupFragment::parse("<p>Unclosed <b>bold");
	/// assert_eq!(fragment.serialize().unwrap(), "<p>Unclosed <b>bold</b></p>");
	/// ```
	pub fn parse(markup: &str) -> Self {
		let context = QualName::new(
			None,
			Namespace::from(HTML_NAMESPACE),
			LocalName::from("body"),
		);
		let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new())
			.one(markup);

		let document = dom.document.clone();
		let root = document
			.children
			.borrow()
			.first()
			.cloned()
			.unwrap_or_else(|| document.clone());
		Self {
			_document: document,
			root,
		}
	}

	/// Container element whose children are the fragment's top-level nodes
	pub fn root(&self) -> &Handle {
		&self.root
	}

	/// Serialize the fragment back to markup
	pub fn serialize(&self) -> BlocksResult<String> {
		serialize_children(&self.root)
	}

	/// Elements carrying `attribute`, in document order
	///
	/// `<template>` contents are inert and not searched.
	pub fn elements_with_attribute(&self, attribute: &str) -> Vec<Handle> {
		let mut found = Vec::new();
		let mut pending: Vec<Handle> = self.root.children.borrow().iter().rev().cloned().collect();
		while let Some(node) = pending.pop() {
			if attribute_value(&node, attribute).is_some() {
				found.push(node.clone());
			}
			pending.extend(node.children.borrow().iter().rev().cloned());
		}
		found
	}

	/// Replace the children of `element` with the top-level nodes of `fragment`
	pub fn replace_children(element: &Handle, fragment: MarkupFragment) {
		let incoming = fragment.take_nodes();
		for node in &incoming {
			node.parent.set(Some(Rc::downgrade(element)));
		}
		let previous = mem::replace(&mut *element.children.borrow_mut(), incoming);
		for node in &previous {
			node.parent.set(None);
		}
	}

	/// Replace `element` itself with the top-level nodes of `fragment`
	///
	/// A detached element is left untouched.
	pub fn replace_element(element: &Handle, fragment: MarkupFragment) {
		let Some(parent) = parent_of(element) else {
			return;
		};
		let incoming = fragment.take_nodes();
		let mut siblings = parent.children.borrow_mut();
		let Some(index) = siblings.iter().position(|node| Rc::ptr_eq(node, element)) else {
			return;
		};
		for node in &incoming {
			node.parent.set(Some(Rc::downgrade(&parent)));
		}
		let tail = siblings.split_off(index + 1);
		siblings.pop();
		siblings.extend(incoming);
		siblings.extend(tail);
		element.parent.set(None);
	}

	fn take_nodes(&self) -> Vec<Handle> {
		mem::take(&mut *self.root.children.borrow_mut())
	}
}

fn parent_of(node: &Handle) -> Option<Handle> {
	let weak = node.parent.take();
	let parent = weak.as_ref().and_then(|w| w.upgrade());
	node.parent.set(weak);
	parent
}

/// Serialized markup of the children of `element`
pub fn inner_markup(element: &Handle) -> BlocksResult<String> {
	serialize_children(element)
}

/// Value of `name` on `element`, `None` for non-elements or a missing attribute
pub fn attribute_value(element: &Handle, name: &str) -> Option<String> {
	match &element.data {
		NodeData::Element { attrs, .. } => attrs
			.borrow()
			.iter()
			.find(|attr| attr.name.local.as_ref() == name)
			.map(|attr| attr.value.to_string()),
		_ => None,
	}
}

fn serialize_children(node: &Handle) -> BlocksResult<String> {
	let mut bytes = Vec::new();
	let opts = SerializeOpts {
		traversal_scope: TraversalScope::ChildrenOnly(None),
		..Default::default()
	};
	serialize(&mut bytes, &SerializableHandle::from(node.clone()), opts)
		.map_err(|e| BlocksError::Markup(e.to_string()))?;
	String::from_utf8(bytes).map_err(|e| BlocksError::Markup(e.to_string()))
}
