//! LinkedList: singly linked sequence of `Element`s stored in a slot arena.

use crate::element::{element_eq, Element, EqFn};
use crate::list_iterator::ListIterator;
use core::cell::Cell;
use core::fmt;
use slotmap::{DefaultKey, SlotMap};

thread_local! {
    // Lists are !Send, so ids only need to be unique per thread.
    static NEXT_LIST_ID: Cell<u64> = const { Cell::new(1) };
}

/// Identity of a list instance; iterators remember which list made them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct ListId(u64);

impl ListId {
    fn fresh() -> Self {
        NEXT_LIST_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            ListId(id)
        })
    }
}

#[derive(Debug)]
struct Node {
    value: Element,
    next: Option<DefaultKey>,
}

pub struct LinkedList {
    nodes: SlotMap<DefaultKey, Node>,
    head: Option<DefaultKey>,
    last: Option<DefaultKey>,
    size: usize,
    eq_fn: EqFn,
    // Bumped on every structural change; iterators compare against it.
    generation: u64,
    id: ListId,
}

impl Default for LinkedList {
    fn default() -> Self {
        Self::new(element_eq)
    }
}

impl LinkedList {
    /// Create an empty list that uses `eq_fn` for `contains`.
    pub fn new(eq_fn: EqFn) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            last: None,
            size: 0,
            eq_fn,
            generation: 0,
            id: ListId::fresh(),
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn eq_fn(&self) -> EqFn {
        self.eq_fn
    }

    /// Structural generation; changes whenever nodes are linked or unlinked.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn id(&self) -> ListId {
        self.id
    }

    pub(crate) fn head_key(&self) -> Option<DefaultKey> {
        self.head
    }

    pub(crate) fn next_key(&self, k: DefaultKey) -> Option<DefaultKey> {
        self.nodes.get(k).and_then(|n| n.next)
    }

    pub(crate) fn value_at(&self, k: DefaultKey) -> Option<&Element> {
        self.nodes.get(k).map(|n| &n.value)
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Key of the node at `index`, walking from the head.
    fn node_at(&self, index: usize) -> Option<DefaultKey> {
        if index >= self.size {
            return None;
        }
        let mut cur = self.head?;
        for _ in 0..index {
            cur = self.nodes[cur].next?;
        }
        Some(cur)
    }

    /// Append at the end in O(1).
    pub fn append(&mut self, value: Element) {
        let k = self.nodes.insert(Node { value, next: None });
        match self.last {
            Some(last) => self.nodes[last].next = Some(k),
            None => self.head = Some(k),
        }
        self.last = Some(k);
        self.size += 1;
        self.bump();
    }

    /// Insert at the front in O(1).
    pub fn prepend(&mut self, value: Element) {
        let k = self.nodes.insert(Node {
            value,
            next: self.head,
        });
        self.head = Some(k);
        if self.last.is_none() {
            self.last = Some(k);
        }
        self.size += 1;
        self.bump();
    }

    /// Insert so that `value` ends up at `index`. Valid indices are
    /// `0..=len()`; any other index leaves the list untouched and returns
    /// `false`.
    pub fn insert(&mut self, index: usize, value: Element) -> bool {
        if index > self.size {
            return false;
        }
        if index == 0 {
            self.prepend(value);
            return true;
        }
        if index == self.size {
            self.append(value);
            return true;
        }
        let Some(prev) = self.node_at(index - 1) else {
            return false;
        };
        let next = self.nodes[prev].next;
        let k = self.nodes.insert(Node { value, next });
        self.nodes[prev].next = Some(k);
        self.size += 1;
        self.bump();
        true
    }

    /// Unlink the node at `index` and return its value. Valid indices are
    /// `0..len()`; any other index returns `None` and changes nothing.
    pub fn remove(&mut self, index: usize) -> Option<Element> {
        if index >= self.size {
            return None;
        }
        let (prev, k) = if index == 0 {
            (None, self.head?)
        } else {
            let prev = self.node_at(index - 1)?;
            (Some(prev), self.nodes[prev].next?)
        };
        let node = self.nodes.remove(k)?;
        match prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.head = node.next,
        }
        if self.last == Some(k) {
            self.last = prev;
        }
        self.size -= 1;
        self.bump();
        Some(node.value)
    }

    /// Element at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<&Element> {
        self.node_at(index).map(|k| &self.nodes[k].value)
    }

    /// Mutable access to the element at `index`. Not a structural change.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Element> {
        let k = self.node_at(index)?;
        Some(&mut self.nodes[k].value)
    }

    /// Membership under the list's equality function.
    pub fn contains(&self, value: &Element) -> bool {
        let eq = self.eq_fn;
        self.iter().any(|e| eq(e, value))
    }

    /// Drop every node; the list is empty afterwards.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.last = None;
        self.size = 0;
        self.bump();
        tracing::trace!(list = self.id.0, "linked list cleared");
    }

    /// True iff `pred` holds for every element. Stops at the first failure.
    pub fn all<X, P>(&self, mut pred: P, extra: &X) -> bool
    where
        X: ?Sized,
        P: FnMut(&Element, &X) -> bool,
    {
        self.iter().all(|e| pred(e, extra))
    }

    /// True iff `pred` holds for some element. Stops at the first match.
    pub fn any<X, P>(&self, mut pred: P, extra: &X) -> bool
    where
        X: ?Sized,
        P: FnMut(&Element, &X) -> bool,
    {
        self.iter().any(|e| pred(e, extra))
    }

    /// Call `f` on every element in list order, allowing in-place updates.
    pub fn apply_to_all<X, F>(&mut self, mut f: F, extra: &X)
    where
        X: ?Sized,
        F: FnMut(&mut Element, &X),
    {
        let mut cur = self.head;
        while let Some(k) = cur {
            let node = &mut self.nodes[k];
            f(&mut node.value, extra);
            cur = node.next;
        }
    }

    /// Borrowing iterator in list order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cur: self.head,
            remaining: self.size,
        }
    }

    /// Cursor positioned on the first element of the list as it is now.
    pub fn iterator(&self) -> ListIterator {
        ListIterator::new(self)
    }
}

impl fmt::Debug for LinkedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Extend<Element> for LinkedList {
    fn extend<I: IntoIterator<Item = Element>>(&mut self, iter: I) {
        for e in iter {
            self.append(e);
        }
    }
}

impl FromIterator<Element> for LinkedList {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        let mut list = LinkedList::default();
        list.extend(iter);
        list
    }
}

/// Iterator over `&Element` in list order.
pub struct Iter<'a> {
    list: &'a LinkedList,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Element;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cur?;
        let node = self.list.nodes.get(k)?;
        self.cur = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a LinkedList {
    type Item = &'a Element;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
