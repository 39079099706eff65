use std::mem;

use crate::error::{Error, Result};
use crate::node::{DocumentId, NodeId};

#[derive(Debug, Clone, Copy, Default)]
struct Link {
    parent: Option<NodeId>,
    attached: bool,
    element: bool,
}

/// Per-node bookkeeping of a document: which element a node hangs under and
/// whether some collection currently holds it.
#[derive(Debug)]
pub struct Links {
    document: DocumentId,
    links: Vec<Link>,
}

impl Links {
    pub(crate) fn new(document: DocumentId) -> Self {
        Links {
            document,
            links: Vec::new(),
        }
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub(crate) fn register(&mut self, element: bool) -> NodeId {
        let index = self.links.len();
        self.links.push(Link {
            element,
            ..Link::default()
        });
        NodeId {
            document: self.document,
            index,
        }
    }

    pub(crate) fn index(&self, id: NodeId) -> Result<usize> {
        if id.document != self.document || id.index >= self.links.len() {
            return Err(Error::ForeignNode(id));
        }
        Ok(id.index)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.link(id).and_then(|link| link.parent)
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.link(id).map_or(false, |link| link.attached)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.link(id).map_or(false, |link| link.element)
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(link) = self.link_mut(id) {
            link.parent = parent;
        }
    }

    fn set_attached(&mut self, id: NodeId, attached: bool) {
        if let Some(link) = self.link_mut(id) {
            link.attached = attached;
        }
    }

    fn link(&self, id: NodeId) -> Option<&Link> {
        let index = self.index(id).ok()?;
        self.links.get(index)
    }

    fn link_mut(&mut self, id: NodeId) -> Option<&mut Link> {
        let index = self.index(id).ok()?;
        self.links.get_mut(index)
    }

    /// A node may enter a collection only if it belongs to this document and
    /// no collection holds it yet.
    fn check_insertable(&self, id: NodeId) -> Result<()> {
        self.index(id)?;
        if self.is_attached(id) {
            return Err(Error::AlreadyAttached(id));
        }
        Ok(())
    }
}

/// Strategy run by a [`NodeCollection`] whenever a node enters or leaves it.
///
/// `attached` runs exactly once per insertion, after the node is in place.
/// Returning an error makes the collection undo that insertion.
pub trait AttachHook {
    fn attached(&mut self, child: NodeId, links: &mut Links) -> Result<()>;

    fn detached(&mut self, child: NodeId, links: &mut Links);
}

/// Children of an element point back to it.
#[derive(Debug, Clone, Copy)]
pub struct ParentLink {
    owner: NodeId,
}

impl ParentLink {
    pub(crate) fn new(owner: NodeId) -> Self {
        ParentLink { owner }
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }
}

impl AttachHook for ParentLink {
    fn attached(&mut self, child: NodeId, links: &mut Links) -> Result<()> {
        let mut ancestor = Some(self.owner);
        while let Some(id) = ancestor {
            if id == child {
                return Err(Error::Cycle(child));
            }
            ancestor = links.parent(id);
        }
        links.set_parent(child, Some(self.owner));
        Ok(())
    }

    fn detached(&mut self, child: NodeId, links: &mut Links) {
        links.set_parent(child, None);
    }
}

/// The top level of a document holds at most one element, cached as `root`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentRoot {
    root: Option<NodeId>,
}

impl DocumentRoot {
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }
}

impl AttachHook for DocumentRoot {
    fn attached(&mut self, child: NodeId, links: &mut Links) -> Result<()> {
        if links.is_element(child) {
            if self.root.is_some() {
                return Err(Error::DuplicateRoot);
            }
            self.root = Some(child);
        }
        links.set_parent(child, None);
        Ok(())
    }

    fn detached(&mut self, child: NodeId, _links: &mut Links) {
        if self.root == Some(child) {
            self.root = None;
        }
    }
}

/// Ordered child nodes, in document order. Index access never clamps:
/// an index past the end is [`Error::OutOfBounds`].
#[derive(Debug)]
pub struct NodeCollection<H> {
    nodes: Vec<NodeId>,
    hook: H,
}

impl<H: AttachHook> NodeCollection<H> {
    pub fn new(hook: H) -> Self {
        NodeCollection {
            nodes: Vec::new(),
            hook,
        }
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<NodeId> {
        self.nodes.get(index).copied().ok_or(Error::OutOfBounds {
            index,
            len: self.nodes.len(),
        })
    }

    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.nodes.iter().position(|&id| id == node)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// Replaces the node at `index`, returning the one it displaced.
    pub(crate) fn set(
        &mut self,
        index: usize,
        node: NodeId,
        links: &mut Links,
    ) -> Result<NodeId> {
        self.check_index(index, self.nodes.len())?;
        links.check_insertable(node)?;

        let old = mem::replace(&mut self.nodes[index], node);
        links.set_attached(old, false);
        self.hook.detached(old, links);

        links.set_attached(node, true);
        if let Err(err) = self.hook.attached(node, links) {
            links.set_attached(node, false);
            self.nodes[index] = old;
            links.set_attached(old, true);
            // `old` was accepted before and the collection is back in that state
            let _ = self.hook.attached(old, links);
            return Err(err);
        }
        Ok(old)
    }

    pub(crate) fn add(&mut self, node: NodeId, links: &mut Links) -> Result<()> {
        let index = self.nodes.len();
        self.add_at(index, node, links)
    }

    pub(crate) fn add_at(&mut self, index: usize, node: NodeId, links: &mut Links) -> Result<()> {
        self.check_index(index, self.nodes.len() + 1)?;
        links.check_insertable(node)?;

        self.nodes.insert(index, node);
        links.set_attached(node, true);
        if let Err(err) = self.hook.attached(node, links) {
            self.nodes.remove(index);
            links.set_attached(node, false);
            return Err(err);
        }
        Ok(())
    }

    /// Removes the first occurrence of `node`, returning where it was.
    pub(crate) fn remove(&mut self, node: NodeId, links: &mut Links) -> Option<usize> {
        let index = self.index_of(node)?;
        self.detach_at(index, links);
        Some(index)
    }

    pub(crate) fn remove_at(&mut self, index: usize, links: &mut Links) -> Result<NodeId> {
        self.check_index(index, self.nodes.len())?;
        Ok(self.detach_at(index, links))
    }

    pub(crate) fn clear(&mut self, links: &mut Links) {
        for node in mem::take(&mut self.nodes) {
            links.set_attached(node, false);
            self.hook.detached(node, links);
        }
    }

    fn detach_at(&mut self, index: usize, links: &mut Links) -> NodeId {
        let node = self.nodes.remove(index);
        links.set_attached(node, false);
        self.hook.detached(node, links);
        node
    }

    fn check_index(&self, index: usize, limit: usize) -> Result<()> {
        if index >= limit {
            return Err(Error::OutOfBounds {
                index,
                len: self.nodes.len(),
            });
        }
        Ok(())
    }
}

/// Mutable view of a collection together with the links its hook maintains.
pub struct CollectionMut<'a, H> {
    collection: &'a mut NodeCollection<H>,
    links: &'a mut Links,
}

impl<'a, H: AttachHook> CollectionMut<'a, H> {
    pub(crate) fn new(collection: &'a mut NodeCollection<H>, links: &'a mut Links) -> Self {
        CollectionMut { collection, links }
    }

    pub fn size(&self) -> usize {
        self.collection.size()
    }

    pub fn get(&self, index: usize) -> Result<NodeId> {
        self.collection.get(index)
    }

    pub fn set(&mut self, index: usize, node: NodeId) -> Result<NodeId> {
        self.collection.set(index, node, self.links)
    }

    pub fn add(&mut self, node: NodeId) -> Result<()> {
        self.collection.add(node, self.links)
    }

    pub fn add_at(&mut self, index: usize, node: NodeId) -> Result<()> {
        self.collection.add_at(index, node, self.links)
    }

    pub fn remove(&mut self, node: NodeId) -> Option<usize> {
        self.collection.remove(node, self.links)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<NodeId> {
        self.collection.remove_at(index, self.links)
    }

    pub fn clear(&mut self) {
        self.collection.clear(self.links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        attached: Vec<NodeId>,
        detached: Vec<NodeId>,
        reject: Option<NodeId>,
    }

    impl AttachHook for Recorder {
        fn attached(&mut self, child: NodeId, _links: &mut Links) -> Result<()> {
            self.attached.push(child);
            if self.reject == Some(child) {
                return Err(Error::DuplicateRoot);
            }
            Ok(())
        }

        fn detached(&mut self, child: NodeId, _links: &mut Links) {
            self.detached.push(child);
        }
    }

    fn setup(count: usize) -> (Links, Vec<NodeId>) {
        let mut links = Links::new(DocumentId::next());
        let ids = (0..count).map(|_| links.register(false)).collect();
        (links, ids)
    }

    #[test]
    fn test_hook_runs_once_per_insertion() {
        let (mut links, ids) = setup(3);
        let mut nodes = NodeCollection::new(Recorder::default());
        nodes.add(ids[0], &mut links).unwrap();
        nodes.add_at(0, ids[1], &mut links).unwrap();
        nodes.set(1, ids[2], &mut links).unwrap();

        assert_eq!(vec![ids[0], ids[1], ids[2]], nodes.hook().attached);
        assert_eq!(vec![ids[0]], nodes.hook().detached);
        assert_eq!(vec![ids[1], ids[2]], nodes.iter().collect::<Vec<_>>());
        assert!(!links.is_attached(ids[0]));
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let (mut links, ids) = setup(2);
        let mut nodes = NodeCollection::new(Recorder::default());
        nodes.add(ids[0], &mut links).unwrap();

        assert!(matches!(nodes.get(1), Err(Error::OutOfBounds { index: 1, len: 1 })));
        assert!(matches!(nodes.set(1, ids[1], &mut links), Err(Error::OutOfBounds { .. })));
        assert!(matches!(nodes.remove_at(5, &mut links), Err(Error::OutOfBounds { .. })));
        assert!(matches!(nodes.add_at(2, ids[1], &mut links), Err(Error::OutOfBounds { .. })));
        // appending through add_at is allowed
        nodes.add_at(1, ids[1], &mut links).unwrap();
        assert_eq!(2, nodes.size());
    }

    #[test]
    fn test_rejected_insertion_is_undone() {
        let (mut links, ids) = setup(2);
        let mut nodes = NodeCollection::new(Recorder {
            reject: Some(ids[1]),
            ..Recorder::default()
        });
        nodes.add(ids[0], &mut links).unwrap();

        assert!(nodes.add(ids[1], &mut links).is_err());
        assert!(nodes.set(0, ids[1], &mut links).is_err());
        assert_eq!(vec![ids[0]], nodes.iter().collect::<Vec<_>>());
        assert!(links.is_attached(ids[0]));
        assert!(!links.is_attached(ids[1]));
    }

    #[test]
    fn test_attached_node_cannot_be_added_twice() {
        let (mut links, ids) = setup(1);
        let mut first = NodeCollection::new(Recorder::default());
        let mut second = NodeCollection::new(Recorder::default());
        first.add(ids[0], &mut links).unwrap();

        assert!(matches!(second.add(ids[0], &mut links), Err(Error::AlreadyAttached(_))));
        assert_eq!(Some(0), first.remove(ids[0], &mut links));
        second.add(ids[0], &mut links).unwrap();
        assert_eq!(1, second.size());
    }

    #[test]
    fn test_foreign_node_is_rejected() {
        let (mut links, _) = setup(1);
        let (_, foreign) = setup(1);
        let mut nodes = NodeCollection::new(Recorder::default());
        assert!(matches!(nodes.add(foreign[0], &mut links), Err(Error::ForeignNode(_))));
        assert!(nodes.hook().attached.is_empty());
    }

    #[test]
    fn test_document_root_allows_one_element() {
        let mut links = Links::new(DocumentId::next());
        let first = links.register(true);
        let second = links.register(true);
        let comment = links.register(false);
        let mut nodes = NodeCollection::new(DocumentRoot::default());

        nodes.add(comment, &mut links).unwrap();
        nodes.add(first, &mut links).unwrap();
        assert_eq!(Some(first), nodes.hook().root());
        assert!(matches!(nodes.add(second, &mut links), Err(Error::DuplicateRoot)));

        nodes.remove(first, &mut links);
        assert_eq!(None, nodes.hook().root());
        nodes.add(second, &mut links).unwrap();
        assert_eq!(Some(second), nodes.hook().root());
    }

    #[test]
    fn test_parent_link_rejects_cycles() {
        let mut links = Links::new(DocumentId::next());
        let outer = links.register(true);
        let inner = links.register(true);
        let mut outer_children = NodeCollection::new(ParentLink::new(outer));
        let mut inner_children = NodeCollection::new(ParentLink::new(inner));

        outer_children.add(inner, &mut links).unwrap();
        assert_eq!(Some(outer), links.parent(inner));
        assert!(matches!(inner_children.add(outer, &mut links), Err(Error::Cycle(_))));
        assert!(inner_children.is_empty());

        outer_children.clear(&mut links);
        assert_eq!(None, links.parent(inner));
    }
}
