use std::collections::HashSet;

use crate::{
    api::{Reply, ReplyPerms, ViewContext, MAX_DEPTH},
    relative_label, Clock, ParentKey, ReplyTree,
};

/// One reply, ready to be displayed
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplyNode<'a> {
    pub reply: &'a Reply,

    /// Actual nesting level, root replies being at depth 0
    pub depth: usize,

    /// Nesting level to display at, which never goes past `MAX_DEPTH`
    pub indent: usize,

    pub perms: ReplyPerms,

    /// eg. "5m ago"
    pub age: String,

    /// Positions of the direct children in `Materialized::lines`
    pub children: Vec<usize>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Materialized<'a> {
    /// The thread has no root reply. Callers should show an empty-state
    /// message rather than an empty list.
    NoReplies,
    Thread {
        /// In display order: each reply is followed by its descendants
        lines: Vec<ReplyNode<'a>>,

        /// Positions of the root replies in `lines`
        roots: Vec<usize>,
    },
}

impl<'a> Materialized<'a> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Materialized::NoReplies)
    }

    pub fn lines(&self) -> &[ReplyNode<'a>] {
        match self {
            Materialized::NoReplies => &[],
            Materialized::Thread { lines, .. } => lines,
        }
    }

    pub fn roots(&self) -> impl Iterator<Item = &ReplyNode<'a>> + '_ {
        let roots = match self {
            Materialized::NoReplies => &[][..],
            Materialized::Thread { roots, .. } => &roots[..],
        };
        roots.iter().map(move |&i| &self.lines()[i])
    }

    pub fn children<'b>(
        &'b self,
        node: &'b ReplyNode<'a>,
    ) -> impl Iterator<Item = &'b ReplyNode<'a>> + 'b {
        node.children.iter().map(move |&i| &self.lines()[i])
    }

    pub fn count(&self) -> usize {
        self.lines().len()
    }
}

/// Lay out a thread for display, starting from its root replies
///
/// Replies whose parent is missing never show up, and neither do their
/// descendants. Nesting depth is unbounded, so the walk keeps its own stack.
pub fn materialize<'a>(tree: &'a ReplyTree, ctx: &ViewContext, clock: &Clock) -> Materialized<'a> {
    if tree.roots().next().is_none() {
        return Materialized::NoReplies;
    }
    let mut lines = Vec::with_capacity(tree.len());
    let mut roots = Vec::new();
    let mut visited = HashSet::with_capacity(tree.len());

    // (reply index in tree, depth, position of the parent in `lines`)
    let mut todo = tree
        .children_idx(ParentKey::Root)
        .iter()
        .rev()
        .map(|&i| (i, 0, None))
        .collect::<Vec<(usize, usize, Option<usize>)>>();
    while let Some((i, depth, parent)) = todo.pop() {
        let reply = tree.at(i);
        if !visited.insert(i) {
            tracing::warn!(reply_id=?reply.id, "reply reached twice while rendering thread");
            continue;
        }
        let pos = lines.len();
        match parent {
            None => roots.push(pos),
            Some(p) => {
                let p: &mut ReplyNode = &mut lines[p];
                p.children.push(pos);
            }
        }
        lines.push(ReplyNode {
            reply,
            depth,
            indent: depth.min(MAX_DEPTH),
            perms: ReplyPerms::for_reply(ctx, reply, depth),
            age: relative_label(&reply.created_at, clock),
            children: Vec::new(),
        });
        todo.extend(
            tree.children_idx(ParentKey::Reply(reply.id))
                .iter()
                .rev()
                .map(|&c| (c, depth + 1, Some(pos))),
        );
    }
    Materialized::Thread { lines, roots }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        api::ReplyId,
        tree::tests::{reply, reply_by, rid, uid},
        Tz,
    };

    fn clock() -> Clock {
        Clock::new(
            Utc.timestamp_opt(1_672_740_000 + 3600, 0)
                .single()
                .expect("building test clock"),
            Tz::UTC,
        )
    }

    fn ctx(is_team: bool, is_locked: bool) -> ViewContext {
        ViewContext::new(uid(1), is_team, is_locked)
    }

    fn chain() -> ReplyTree {
        ReplyTree::build(vec![
            reply(1, None),
            reply(2, Some(1)),
            reply(3, Some(2)),
            reply(4, Some(3)),
            reply(5, Some(4)),
        ])
    }

    fn line_ids(m: &Materialized) -> Vec<ReplyId> {
        m.lines().iter().map(|n| n.reply.id).collect()
    }

    #[test]
    fn empty_thread_signals_no_replies() {
        let t = ReplyTree::build(Vec::new());
        let m = materialize(&t, &ctx(false, false), &clock());
        assert_eq!(m, Materialized::NoReplies);
        assert!(m.is_empty());
        assert_eq!(m.count(), 0);

        // only orphans is the same as nothing at all
        let t = ReplyTree::build(vec![reply(2, Some(1))]);
        assert!(materialize(&t, &ctx(false, false), &clock()).is_empty());
    }

    #[test]
    fn preorder_display() {
        let t = ReplyTree::build(vec![
            reply(1, None),
            reply(2, None),
            reply(3, Some(1)),
            reply(4, Some(2)),
            reply(5, Some(3)),
            reply(6, Some(1)),
        ]);
        let m = materialize(&t, &ctx(false, false), &clock());
        assert_eq!(
            line_ids(&m),
            vec![rid(1), rid(3), rid(5), rid(6), rid(2), rid(4)]
        );
        let depths = m.lines().iter().map(|n| n.depth).collect::<Vec<_>>();
        assert_eq!(depths, vec![0, 1, 2, 1, 0, 1]);
        let roots = m.roots().collect::<Vec<_>>();
        assert_eq!(roots.len(), 2);
        let children = m.children(roots[0]).map(|n| n.reply.id).collect::<Vec<_>>();
        assert_eq!(children, vec![rid(3), rid(6)]);
        assert_eq!(m.children(roots[1]).count(), 1);
    }

    #[test]
    fn depth_cap() {
        let t = chain();
        let m = materialize(&t, &ctx(false, false), &clock());
        let lines = m.lines();
        assert_eq!(lines.len(), 5);
        for (depth, n) in lines.iter().enumerate() {
            assert_eq!(n.depth, depth);
            assert_eq!(n.perms.can_reply, depth < 3, "at depth {depth}");
        }
        let indents = lines.iter().map(|n| n.indent).collect::<Vec<_>>();
        assert_eq!(indents, vec![0, 1, 2, 3, 3]);
    }

    #[test]
    fn authorization() {
        let t = ReplyTree::build(vec![reply_by(1, None, 1), reply_by(2, Some(1), 2)]);

        let m = materialize(&t, &ctx(false, false), &clock());
        let lines = m.lines();
        assert!(lines[0].perms.can_edit && lines[0].perms.can_delete);
        assert!(!lines[1].perms.can_edit && !lines[1].perms.can_delete);

        let m = materialize(&t, &ctx(true, false), &clock());
        for n in m.lines() {
            assert!(n.perms.can_edit && n.perms.can_delete);
        }
    }

    #[test]
    fn lock_only_affects_replying() {
        let t = ReplyTree::build(vec![
            reply_by(1, None, 1),
            reply_by(2, Some(1), 2),
            reply_by(3, Some(2), 1),
        ]);
        let open = materialize(&t, &ctx(false, false), &clock());
        let locked = materialize(&t, &ctx(false, true), &clock());
        for (o, l) in open.lines().iter().zip(locked.lines().iter()) {
            assert!(o.perms.can_reply);
            assert!(!l.perms.can_reply);
            assert_eq!(o.perms.can_edit, l.perms.can_edit);
            assert_eq!(o.perms.can_delete, l.perms.can_delete);
        }
    }

    #[test]
    fn very_deep_chains_render() {
        const N: u128 = 100_000;
        let t = std::iter::once(reply(0, None))
            .chain((1..N).map(|i| reply(i, Some(i - 1))))
            .collect::<ReplyTree>();
        let m = materialize(&t, &ctx(false, false), &clock());
        assert_eq!(m.count(), N as usize);
        assert_eq!(m.roots().count(), 1);
        let last = &m.lines()[N as usize - 1];
        assert_eq!(last.reply.id, rid(N - 1));
        assert_eq!(last.depth, N as usize - 1);
        assert_eq!(last.indent, MAX_DEPTH);
        assert!(!last.perms.can_reply);
        assert!(last.children.is_empty());
        assert_eq!(t.unreachable().count(), 0);
    }

    #[test]
    fn ages() {
        let t = ReplyTree::build(vec![reply(0, None)]);
        let m = materialize(&t, &ctx(false, false), &clock());
        assert_eq!(m.lines()[0].age, "1h ago");
    }

    #[test]
    fn duplicates_and_cycles_render_once() {
        let t = ReplyTree::build(vec![
            reply(1, None),
            reply(1, None),
            reply(2, Some(1)),
            reply(3, Some(4)),
            reply(4, Some(3)),
        ]);
        let m = materialize(&t, &ctx(false, false), &clock());
        assert_eq!(line_ids(&m), vec![rid(1), rid(2), rid(1)]);
    }

    #[test]
    fn renders_exactly_the_reachable_replies() {
        bolero::check!()
            .with_type::<Vec<Option<u8>>>()
            .for_each(|parents: &Vec<Option<u8>>| {
                let t = parents
                    .iter()
                    .enumerate()
                    .map(|(i, p)| reply(i as u128, p.map(|p| p as u128)))
                    .collect::<ReplyTree>();
                let m = materialize(&t, &ctx(false, false), &clock());
                let unreachable = t.unreachable().count();
                assert_eq!(m.count() + unreachable, t.len());
                for n in m.lines() {
                    assert_eq!(t.depth_of(&n.reply.id), Some(n.depth));
                    assert!(n.indent <= MAX_DEPTH);
                    assert_eq!(n.perms.can_reply, n.depth < MAX_DEPTH);
                }
            })
    }
}
