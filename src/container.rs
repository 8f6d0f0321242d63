use std::fmt;

use thiserror::Error;

///
/// # Container
///
/// A doubly linked sequence of integer [Nodes](Node) that behaves as a stack or a queue
/// depending on the [Mode] it is pushed with. Nodes live in an index arena, `previous` and
/// `next` are [NodeId]s into that arena rather than pointers, so there is never a dangling
/// link to chase after a node is released.
///
/// Every read and removal happens at the front. The mode only decides which end `push`
/// inserts at:
///
///```text
/// stack mode, push 1, push 2, push 3
///
///   front                   back
///   (3) <-> (2) <-> (1)
///
/// queue mode, push 1, push 2, push 3
///
///   front                   back
///   (1) <-> (2) <-> (3)
///```
///
/// Released slots go onto a free list and are reused by the next push. The free list always
/// has room for every slot in the arena, so releasing a node never needs to allocate.
#[derive(Debug, Default)]
pub struct Container {
    nodes: Vec<Node>,
    free: Vec<usize>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    len: usize,
}

/// Where `push` inserts new nodes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// LIFO, new nodes go in front
    #[default]
    Stack,
    /// FIFO, new nodes go at the back
    Queue,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Stack => write!(f, "stack"),
            Mode::Queue => write!(f, "queue"),
        }
    }
}

/// Storage for a new node could not be obtained.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("node storage could not be obtained")]
pub struct AllocError;

/// Index of a [Node] inside the [Container] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

/// A single integer cell and the links to its neighbours.
#[derive(Debug, Clone, Copy)]
struct Node {
    value: i32,
    previous: Option<NodeId>,
    next: Option<NodeId>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_none()
    }

    /// Pushes using the end selected by `mode`.
    pub fn push(&mut self, mode: Mode, value: i32) -> Result<(), AllocError> {
        match mode {
            Mode::Stack => self.push_front(value),
            Mode::Queue => self.push_back(value),
        }
    }

    pub fn push_front(&mut self, value: i32) -> Result<(), AllocError> {
        let id = self.alloc(value)?;
        self.nodes[id.0].next = self.front;
        match self.front {
            Some(old) => self.nodes[old.0].previous = Some(id),
            None => self.back = Some(id),
        }
        self.front = Some(id);
        self.len += 1;
        Ok(())
    }

    pub fn push_back(&mut self, value: i32) -> Result<(), AllocError> {
        let id = self.alloc(value)?;
        self.nodes[id.0].previous = self.back;
        match self.back {
            Some(old) => self.nodes[old.0].next = Some(id),
            None => self.front = Some(id),
        }
        self.back = Some(id);
        self.len += 1;
        Ok(())
    }

    /// Removes the front node and returns its value, `None` when empty.
    pub fn pop_front(&mut self) -> Option<i32> {
        let id = self.front?;
        let Node { value, next, .. } = self.nodes[id.0];
        self.front = next;
        match next {
            Some(n) => self.nodes[n.0].previous = None,
            None => self.back = None,
        }
        self.release(id);
        Some(value)
    }

    pub fn front_value(&self) -> Option<i32> {
        self.front.map(|id| self.nodes[id.0].value)
    }

    /// The front value and the value right behind it.
    pub fn top_two(&self) -> Option<(i32, i32)> {
        let first = self.front?;
        let second = self.nodes[first.0].next?;
        Some((self.nodes[first.0].value, self.nodes[second.0].value))
    }

    /// Values from front to back.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            container: self,
            cursor: self.front,
            remaining: self.len,
        }
    }

    /// Relinks the first two nodes so the second becomes the front. Returns `false`, leaving
    /// the container untouched, when there are fewer than two nodes.
    pub fn swap_front(&mut self) -> bool {
        let Some(first) = self.front else { return false };
        let Some(second) = self.nodes[first.0].next else { return false };
        let third = self.nodes[second.0].next;

        self.nodes[first.0].previous = Some(second);
        self.nodes[first.0].next = third;
        match third {
            Some(t) => self.nodes[t.0].previous = Some(first),
            None => self.back = Some(first),
        }
        self.nodes[second.0].previous = None;
        self.nodes[second.0].next = Some(first);
        self.front = Some(second);
        true
    }

    /// Releases the front node and stores `value` in the node that was second, which becomes
    /// the new front. Returns `false` when there are fewer than two nodes.
    pub fn collapse_front(&mut self, value: i32) -> bool {
        let Some(first) = self.front else { return false };
        let Some(second) = self.nodes[first.0].next else { return false };

        self.nodes[second.0].value = value;
        self.nodes[second.0].previous = None;
        self.front = Some(second);
        self.release(first);
        true
    }

    /// Moves the front node to the back.
    pub fn rotate_left(&mut self) {
        let (Some(first), Some(last)) = (self.front, self.back) else { return };
        let Some(second) = self.nodes[first.0].next else { return };

        self.nodes[second.0].previous = None;
        self.front = Some(second);
        self.nodes[last.0].next = Some(first);
        self.nodes[first.0].previous = Some(last);
        self.nodes[first.0].next = None;
        self.back = Some(first);
    }

    /// Moves the back node to the front.
    pub fn rotate_right(&mut self) {
        let (Some(first), Some(last)) = (self.front, self.back) else { return };
        let Some(penultimate) = self.nodes[last.0].previous else { return };

        self.nodes[penultimate.0].next = None;
        self.back = Some(penultimate);
        self.nodes[last.0].previous = None;
        self.nodes[last.0].next = Some(first);
        self.nodes[first.0].previous = Some(last);
        self.front = Some(last);
    }

    /// Frees every node and resets the container to empty. Safe to call any number of times.
    /// Returns how many nodes were still held.
    pub fn release_all(&mut self) -> usize {
        let released = self.len;
        *self = Self::default();
        released
    }

    fn alloc(&mut self, value: i32) -> Result<NodeId, AllocError> {
        let node = Node {
            value,
            previous: None,
            next: None,
        };
        if let Some(index) = self.free.pop() {
            self.nodes[index] = node;
            return Ok(NodeId(index));
        }

        // the free list is empty here, so this keeps room for every slot
        let slots = self.nodes.len() + 1;
        self.nodes.try_reserve(1).map_err(|_| AllocError)?;
        self.free.try_reserve(slots).map_err(|_| AllocError)?;
        self.nodes.push(node);
        Ok(NodeId(self.nodes.len() - 1))
    }

    fn release(&mut self, id: NodeId) {
        self.free.push(id.0);
        self.len -= 1;
    }

    /// Walks the links both ways and panics if `previous`/`next`, `front`/`back` or the
    /// length disagree.
    #[cfg(test)]
    pub(crate) fn check_links(&self) {
        assert_eq!(self.front.is_none(), self.len == 0, "front is null iff empty");
        assert_eq!(self.back.is_none(), self.len == 0, "back is null iff empty");

        let mut forward = Vec::new();
        let mut previous: Option<NodeId> = None;
        let mut cursor = self.front;
        while let Some(id) = cursor {
            assert_eq!(self.nodes[id.0].previous, previous, "broken previous link");
            assert!(!self.free.contains(&id.0), "released node still linked");
            forward.push(id);
            previous = Some(id);
            cursor = self.nodes[id.0].next;
        }
        assert_eq!(previous, self.back, "back is not the last node");
        assert_eq!(forward.len(), self.len);

        let mut backward = Vec::new();
        let mut cursor = self.back;
        while let Some(id) = cursor {
            backward.push(id);
            cursor = self.nodes[id.0].previous;
        }
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(self.nodes.len(), self.len + self.free.len());
    }
}

pub struct Iter<'a> {
    container: &'a Container,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        let id = self.cursor?;
        let node = &self.container.nodes[id.0];
        self.cursor = node.next;
        self.remaining -= 1;
        Some(node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}
