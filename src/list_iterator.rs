//! ListIterator: a detached cursor over a `LinkedList`.
//!
//! The cursor does not borrow its list. Every operation takes the list as
//! an argument, like a handle, and first checks that it is the same list
//! and that no structural change happened since the cursor was created.

use crate::element::Element;
use crate::linked_list::{LinkedList, ListId};
use core::fmt;
use slotmap::DefaultKey;

/// Why a cursor operation was refused.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IteratorError {
    /// The list was appended to, inserted into, removed from or cleared
    /// after the cursor was created.
    Stale,
    /// The cursor was used with a list other than the one that created it.
    ForeignList,
}

impl fmt::Display for IteratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IteratorError::Stale => {
                f.write_str("list was structurally modified after iterator creation")
            }
            IteratorError::ForeignList => f.write_str("iterator used with a different list"),
        }
    }
}

impl std::error::Error for IteratorError {}

#[derive(Clone, Debug)]
pub struct ListIterator {
    list: ListId,
    generation: u64,
    cursor: Option<DefaultKey>,
    index: usize,
}

impl ListIterator {
    pub(crate) fn new(list: &LinkedList) -> Self {
        Self {
            list: list.id(),
            generation: list.generation(),
            cursor: list.head_key(),
            index: 0,
        }
    }

    fn check(&self, list: &LinkedList) -> Result<(), IteratorError> {
        if list.id() != self.list {
            tracing::debug!(index = self.index, "list iterator used with foreign list");
            return Err(IteratorError::ForeignList);
        }
        if list.generation() != self.generation {
            tracing::debug!(
                created = self.generation,
                now = list.generation(),
                "stale list iterator"
            );
            return Err(IteratorError::Stale);
        }
        Ok(())
    }

    /// Position of the cursor, counted from the first element.
    pub fn index(&self) -> usize {
        self.index
    }

    /// True iff an element follows the cursor.
    pub fn has_next(&self, list: &LinkedList) -> Result<bool, IteratorError> {
        self.check(list)?;
        Ok(self.cursor.and_then(|k| list.next_key(k)).is_some())
    }

    /// Step to the following element and return it. At the end of the list
    /// this returns `Ok(None)` and the cursor stays where it is.
    pub fn next<'l>(
        &mut self,
        list: &'l LinkedList,
    ) -> Result<Option<&'l Element>, IteratorError> {
        self.check(list)?;
        let Some(next) = self.cursor.and_then(|k| list.next_key(k)) else {
            return Ok(None);
        };
        self.cursor = Some(next);
        self.index += 1;
        Ok(list.value_at(next))
    }

    /// Element under the cursor; `Ok(None)` for an empty list.
    pub fn current<'l>(
        &self,
        list: &'l LinkedList,
    ) -> Result<Option<&'l Element>, IteratorError> {
        self.check(list)?;
        Ok(self.cursor.and_then(|k| list.value_at(k)))
    }

    /// Move the cursor back onto the first element.
    pub fn reset(&mut self, list: &LinkedList) -> Result<(), IteratorError> {
        self.check(list)?;
        self.cursor = list.head_key();
        self.index = 0;
        Ok(())
    }
}
