//! Positioned views over a green tree.
//!
//! A [`SyntaxTree`] is one navigation session. Facade records live in an
//! append-only arena owned by the session and refer to their parent by arena
//! index, so a child never keeps its parent alive and there are no reference
//! cycles. Records never move once allocated, and reading one takes no lock.
//! Each record has one memo slot per child; the first thread to publish a
//! child wins and any concurrently computed duplicate is discarded.

use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use la_arena::{Idx, RawIdx};
use text_size::TextSize;

use crate::{
    GreenElement, GreenNode, NodeOrToken, SyntaxElement, SyntaxNode, SyntaxPath, SyntaxToken,
    TreeError,
};

pub(crate) type FacadeId = Idx<FacadeData>;

pub(crate) struct FacadeData {
    pub(crate) green: GreenElement,
    pub(crate) offset: TextSize,
    pub(crate) parent: Option<FacadeId>,
    /// Position among the parent's children.
    pub(crate) index: u32,
    children: Box<[OnceLock<FacadeId>]>,
}

impl FacadeData {
    fn new(green: GreenElement, offset: TextSize, parent: Option<FacadeId>, index: u32) -> Self {
        let slots = match &green {
            NodeOrToken::Node(node) => node.len(),
            NodeOrToken::Token(_) => 0,
        };
        let children = (0..slots).map(|_| OnceLock::new()).collect();
        Self { green, offset, parent, index, children }
    }
}

/// Records in the first segment; segment `n` holds `FIRST_SEGMENT << n`.
const FIRST_SEGMENT: usize = 32;
/// Enough segments to address every `u32` index.
const SEGMENTS: usize = 27;

/// Append-only arena whose records stay put while it grows.
///
/// Growing allocates a new segment twice the size of the previous one
/// instead of moving existing records, so readers need no lock.
struct FacadeArena {
    segments: [OnceLock<Box<[OnceLock<FacadeData>]>>; SEGMENTS],
    /// Indices handed out so far.
    reserved: AtomicUsize,
    /// Records allocated by a thread that lost a memo race.
    discarded: AtomicUsize,
}

impl FacadeArena {
    fn new() -> Self {
        Self {
            segments: std::array::from_fn(|_| OnceLock::new()),
            reserved: AtomicUsize::new(0),
            discarded: AtomicUsize::new(0),
        }
    }

    /// Segment and position within it of the record at `index`.
    fn locate(index: usize) -> (usize, usize) {
        let biased = index + FIRST_SEGMENT;
        let bit = (usize::BITS - 1 - biased.leading_zeros()) as usize;
        (bit - FIRST_SEGMENT.trailing_zeros() as usize, biased - (1 << bit))
    }

    /// Panics once every `u32` index is in use.
    fn alloc(&self, data: FacadeData) -> FacadeId {
        let index = self.reserved.fetch_add(1, Ordering::Relaxed);
        let (segment, slot) = Self::locate(index);
        assert!(segment < SEGMENTS && u32::try_from(index).is_ok(), "facade arena is full");
        let records = self.segments[segment]
            .get_or_init(|| (0..FIRST_SEGMENT << segment).map(|_| OnceLock::new()).collect());
        if records[slot].set(data).is_err() {
            unreachable!("facade index {index} was handed out twice");
        }
        Idx::from_raw(RawIdx::from(index as u32))
    }

    fn get(&self, id: FacadeId) -> &FacadeData {
        let index = u32::from(id.into_raw()) as usize;
        let (segment, slot) = Self::locate(index);
        match self.segments[segment].get().and_then(|records| records[slot].get()) {
            Some(data) => data,
            None => unreachable!("facade {index} is used before it was allocated"),
        }
    }

    fn len(&self) -> usize {
        self.reserved.load(Ordering::Acquire) - self.discarded.load(Ordering::Acquire)
    }
}

/// A navigation session over one green root.
pub struct SyntaxTree {
    root: GreenNode,
    root_id: FacadeId,
    arena: FacadeArena,
}

impl SyntaxTree {
    /// Opens a session whose root facade sits at offset 0.
    pub fn new(root: GreenNode) -> Self {
        let arena = FacadeArena::new();
        let root_id = arena.alloc(FacadeData::new(root.clone().into(), TextSize::new(0), None, 0));
        Self { root, root_id, arena }
    }

    #[inline]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(self, self.root_id)
    }

    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.root
    }

    /// Number of facade records materialized so far, not counting duplicates
    /// dropped after losing a race.
    pub fn facade_count(&self) -> usize {
        self.arena.len()
    }

    /// Builds a facade for `green` at `offset` under `parent`.
    ///
    /// Without a parent the result is a detached root of this session. With a
    /// parent, `green` must be exactly one of the parent's children at
    /// `offset`; the memoized facade for that child is returned. Interned
    /// tokens can make several zero-width siblings identical, and such a
    /// request is rejected since the child cannot be told apart. Use
    /// [`SyntaxNode::child_at`] for those.
    pub fn facade(
        &self,
        green: impl Into<GreenElement>,
        offset: TextSize,
        parent: Option<SyntaxNode<'_>>,
    ) -> Result<SyntaxElement<'_>, TreeError> {
        let green = green.into();
        let Some(parent) = parent else {
            let id = self.arena.alloc(FacadeData::new(green, offset, None, 0));
            return Ok(self.element(id));
        };
        if !std::ptr::eq(parent.tree(), self) {
            return Err(TreeError::shape(parent.kind(), "parent facade belongs to another session"));
        }

        let parent_green = parent.green();
        let parent_offset = parent.offset();
        let mut matches = (0..parent_green.len()).filter(|&index| {
            parent_green.slot(index).is_some_and(|(child_offset, child)| {
                child.ptr_eq(&green) && parent_offset + child_offset == offset
            })
        });
        match (matches.next(), matches.next()) {
            (Some(index), None) => match self.child(parent.id(), index) {
                Some(id) => Ok(self.element(id)),
                None => Err(TreeError::ChildOutOfRange {
                    kind: parent.kind(),
                    index,
                    len: parent_green.len(),
                }),
            },
            (Some(first), Some(second)) => Err(TreeError::shape(
                parent.kind(),
                format!(
                    "{:?} at {offset:?} is both child {first} and child {second}",
                    green.kind()
                ),
            )),
            (None, _) => Err(TreeError::shape(
                parent.kind(),
                format!("{:?} at {offset:?} is not a child of this node", green.kind()),
            )),
        }
    }

    /// Follows `path` from the root.
    pub fn resolve(&self, path: &SyntaxPath) -> Result<SyntaxElement<'_>, TreeError> {
        let mut current = self.root_id;
        for (depth, &index) in path.indices().iter().enumerate() {
            current = self
                .child(current, index as usize)
                .ok_or_else(|| TreeError::InvalidPath { path: path.clone(), depth })?;
        }
        Ok(self.element(current))
    }

    #[inline]
    pub(crate) fn with<R>(&self, id: FacadeId, f: impl FnOnce(&FacadeData) -> R) -> R {
        f(self.arena.get(id))
    }

    pub(crate) fn element(&self, id: FacadeId) -> SyntaxElement<'_> {
        if self.arena.get(id).green.as_node().is_some() {
            NodeOrToken::Node(SyntaxNode::new(self, id))
        } else {
            NodeOrToken::Token(SyntaxToken::new(self, id))
        }
    }

    /// Returns the memoized facade of child `index` under `parent`,
    /// materializing it on first access.
    pub(crate) fn child(&self, parent: FacadeId, index: usize) -> Option<FacadeId> {
        let data = self.arena.get(parent);
        let slot = data.children.get(index)?;
        if let Some(&id) = slot.get() {
            return Some(id);
        }

        let (child_offset, green) = data.green.as_node()?.slot(index)?;
        let pending =
            FacadeData::new(green.clone(), data.offset + child_offset, Some(parent), index as u32);
        let id = self.arena.alloc(pending);
        match slot.set(id) {
            Ok(()) => Some(id),
            Err(_) => {
                self.arena.discarded.fetch_add(1, Ordering::Release);
                slot.get().copied()
            }
        }
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("root", &self.root.kind())
            .field("width", &self.root.width())
            .finish_non_exhaustive()
    }
}
