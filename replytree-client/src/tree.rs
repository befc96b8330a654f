use std::collections::{HashMap, HashSet};

use crate::api::{Reply, ReplyId};

/// Key under which a reply gets grouped with its siblings
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ParentKey {
    Root,
    Reply(ReplyId),
}

impl From<Option<ReplyId>> for ParentKey {
    fn from(parent: Option<ReplyId>) -> ParentKey {
        match parent {
            None => ParentKey::Root,
            Some(id) => ParentKey::Reply(id),
        }
    }
}

/// The replies of a thread, grouped by parent
///
/// Replies are stored once, in the order they were given, and the tree only
/// keeps indices into that list. Within a group, children keep the relative
/// order they had in the input: nothing here sorts by date, the caller is
/// trusted to hand replies over in display order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReplyTree {
    replies: Vec<Reply>,
    index: HashMap<ReplyId, usize>,
    children: HashMap<ParentKey, Vec<usize>>,
}

impl ReplyTree {
    pub fn build(replies: Vec<Reply>) -> ReplyTree {
        let mut index = HashMap::with_capacity(replies.len());
        let mut children = HashMap::<ParentKey, Vec<usize>>::new();
        for (i, r) in replies.iter().enumerate() {
            if index.contains_key(&r.id) {
                tracing::warn!(reply_id=?r.id, "duplicate reply id in thread");
            } else {
                index.insert(r.id, i);
            }
            children
                .entry(ParentKey::from(r.parent_reply_id))
                .or_default()
                .push(i);
        }
        let res = ReplyTree {
            replies,
            index,
            children,
        };
        for o in res.orphans() {
            tracing::debug!(
                reply_id=?o.id,
                parent_id=?o.parent_reply_id,
                "reply has no parent in thread, it will not be displayed"
            );
        }
        res
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    /// All replies, in input order
    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }

    pub fn get(&self, id: &ReplyId) -> Option<&Reply> {
        self.index.get(id).map(|&i| &self.replies[i])
    }

    pub(crate) fn at(&self, idx: usize) -> &Reply {
        &self.replies[idx]
    }

    pub(crate) fn children_idx(&self, key: ParentKey) -> &[usize] {
        self.children.get(&key).map(|v| &v[..]).unwrap_or(&[])
    }

    pub fn children(&self, key: ParentKey) -> impl Iterator<Item = &Reply> + '_ {
        self.children_idx(key).iter().map(move |&i| &self.replies[i])
    }

    pub fn roots(&self) -> impl Iterator<Item = &Reply> + '_ {
        self.children(ParentKey::Root)
    }

    /// Every non-empty group, in no particular order
    pub fn groups(&self) -> impl Iterator<Item = (ParentKey, Vec<&Reply>)> + '_ {
        self.children
            .iter()
            .map(move |(k, v)| (*k, v.iter().map(|&i| &self.replies[i]).collect()))
    }

    /// Distance from `id` to its root reply, or `None` if `id` is unknown or
    /// its ancestry never reaches a root reply (missing parent or cycle)
    pub fn depth_of(&self, id: &ReplyId) -> Option<usize> {
        let mut seen = HashSet::new();
        let mut cur = self.get(id)?;
        let mut depth = 0;
        while let Some(parent) = cur.parent_reply_id {
            if !seen.insert(cur.id) {
                return None;
            }
            cur = self.get(&parent)?;
            depth += 1;
        }
        Some(depth)
    }

    /// Replies whose parent is not part of this thread
    pub fn orphans(&self) -> impl Iterator<Item = &Reply> + '_ {
        self.replies.iter().filter(move |r| match r.parent_reply_id {
            None => false,
            Some(p) => !self.index.contains_key(&p),
        })
    }

    /// Replies that can't be reached by walking down from the root replies,
    /// in input order. This includes orphans, their descendants, and any
    /// reply caught in a parent cycle.
    pub fn unreachable(&self) -> impl Iterator<Item = &Reply> + '_ {
        let mut reachable = HashSet::with_capacity(self.replies.len());
        let mut todo = self.children_idx(ParentKey::Root).to_vec();
        while let Some(i) = todo.pop() {
            if reachable.insert(i) {
                let key = ParentKey::Reply(self.replies[i].id);
                todo.extend_from_slice(self.children_idx(key));
            }
        }
        self.replies
            .iter()
            .enumerate()
            .filter(move |(i, _)| !reachable.contains(i))
            .map(|(_, r)| r)
    }
}

impl FromIterator<Reply> for ReplyTree {
    fn from_iter<I: IntoIterator<Item = Reply>>(iter: I) -> ReplyTree {
        ReplyTree::build(iter.into_iter().collect())
    }
}
