//! Structural edits: attaching, replacing, and copying nodes.
//!
//! Every link change goes through the sibling-list helpers at the bottom of
//! this file, so a parent's child list and each child's `parent` field are
//! always updated together. The element-only view of the children is
//! computed on demand by [`Document::elements`], so there is no second list
//! to keep in sync.
//!
//! # Attaching an attached node
//!
//! A parent exclusively owns its children. Appending a node that already
//! has a parent is a caller error: the old parent's child list would still
//! point at the node and both lists end up corrupted. Debug builds catch this
//! with an assertion; release builds do not check.

use super::{Document, NodeId, NodeKind};
use crate::error::TreeError;

impl Document {
    /// Appends `child` to the end of `parent`'s children.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidOperation`](crate::ErrorKind::InvalidOperation)
    /// error if `parent` is a text node.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `child` already has a parent or is
    /// `parent` itself.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_attach(parent, child)?;
        self.link_last(parent, child);
        Ok(())
    }

    /// Appends `child` surrounded by newline text nodes, so that serialized
    /// output puts each appended element on its own line.
    ///
    /// A leading newline is added only when `parent` has no element
    /// children yet; a trailing newline always follows `child`.
    ///
    /// # Errors
    ///
    /// Same as [`append_child`](Self::append_child).
    ///
    /// # Examples
    ///
    /// ```
    /// use xmlarbor::Document;
    /// use xmlarbor::serial::serialize_node;
    ///
    /// let mut doc = Document::new();
    /// let list = doc.create_element("list").unwrap();
    /// for _ in 0..2 {
    ///     let item = doc.create_element("item").unwrap();
    ///     doc.append_child_pretty(list, item).unwrap();
    /// }
    /// assert_eq!(serialize_node(&doc, list), "<list>\n<item/>\n<item/>\n</list>");
    /// ```
    pub fn append_child_pretty(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_attach(parent, child)?;
        if self.first_element(parent, None).is_none() {
            let newline = self.create_text("\n");
            self.link_last(parent, newline);
        }
        self.link_last(parent, child);
        let newline = self.create_text("\n");
        self.link_last(parent, newline);
        Ok(())
    }

    /// Puts `child` in the slot of the first existing child with the same
    /// name, or appends it when there is none.
    ///
    /// Names compare as [`node_name`](Self::node_name) does, so a text
    /// `child` replaces the first text child. The displaced node is
    /// detached and keeps its own subtree.
    ///
    /// # Errors
    ///
    /// Same as [`append_child`](Self::append_child).
    pub fn replace_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_attach(parent, child)?;
        let name = self.node_name(child);
        let target = self
            .children(parent)
            .find(|&existing| self.node_name(existing) == name);
        match target {
            Some(old) => self.splice(old, child),
            None => self.link_last(parent, child),
        }
        Ok(())
    }

    /// Removes every child of `parent` and makes `child` its only child.
    ///
    /// # Errors
    ///
    /// Same as [`append_child`](Self::append_child).
    pub fn replace_content(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_attach(parent, child)?;
        while let Some(old) = self.first_child(parent) {
            self.detach(old);
        }
        self.link_last(parent, child);
        Ok(())
    }

    /// Detaches a node from its parent. The node and its subtree stay in
    /// the arena as an independent tree. Does nothing for a parentless node.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };

        let prev = self.node(id).prev_sibling;
        let next = self.node(id).next_sibling;

        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }

        match next {
            Some(n) => self.node_mut(n).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }

        let node = self.node_mut(id);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Copies a node and its whole subtree, returning the parentless copy.
    ///
    /// Names, attributes (in order), and text are duplicated; the copy shares
    /// no nodes with the original, so editing one never affects the other.
    #[must_use]
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let copy = self.alloc(self.node(id).kind.clone());
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            let child_copy = self.deep_copy(child);
            self.link_last(copy, child_copy);
        }
        copy
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !matches!(self.node(parent).kind, NodeKind::Element { .. }) {
            return Err(TreeError::invalid_operation(
                "children require an element node",
            ));
        }
        debug_assert!(
            self.node(child).parent.is_none(),
            "child already has a parent; detach it first"
        );
        debug_assert!(parent != child, "a node cannot be its own child");
        Ok(())
    }

    /// Links a parentless `child` after `parent`'s last child.
    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);

        if let Some(last) = self.node(parent).last_child {
            self.node_mut(last).next_sibling = Some(child);
            self.node_mut(child).prev_sibling = Some(last);
            self.node_mut(parent).last_child = Some(child);
        } else {
            self.node_mut(parent).first_child = Some(child);
            self.node_mut(parent).last_child = Some(child);
        }
    }

    /// Moves `new` into the position held by the attached node `old`.
    fn splice(&mut self, old: NodeId, new: NodeId) {
        let (parent, prev, next) = {
            let data = self.node(old);
            (data.parent, data.prev_sibling, data.next_sibling)
        };
        let Some(parent) = parent else {
            return;
        };

        {
            let data = self.node_mut(new);
            data.parent = Some(parent);
            data.prev_sibling = prev;
            data.next_sibling = next;
        }
        match prev {
            Some(p) => self.node_mut(p).next_sibling = Some(new),
            None => self.node_mut(parent).first_child = Some(new),
        }
        match next {
            Some(n) => self.node_mut(n).prev_sibling = Some(new),
            None => self.node_mut(parent).last_child = Some(new),
        }

        let data = self.node_mut(old);
        data.parent = None;
        data.prev_sibling = None;
        data.next_sibling = None;
    }
}
