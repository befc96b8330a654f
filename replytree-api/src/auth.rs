use crate::{Reply, UserId, MAX_DEPTH};

/// Who is looking at a thread, and in which state the thread is
///
/// This is handed down by whatever hosts the thread view, and is never
/// fetched by the materializer itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ViewContext {
    pub current_user: UserId,

    /// Team members can edit and delete anyone's replies
    pub is_team: bool,

    pub is_locked: bool,
}

impl ViewContext {
    pub fn new(current_user: UserId, is_team: bool, is_locked: bool) -> ViewContext {
        ViewContext {
            current_user,
            is_team,
            is_locked,
        }
    }

    /// Whether `reply` can be edited or deleted. Locking plays no role here.
    pub fn can_modify(&self, reply: &Reply) -> bool {
        reply.author_id == self.current_user || self.is_team
    }

    /// Whether a reply sitting at `depth` can get a child reply
    pub fn can_reply_at(&self, depth: usize) -> bool {
        !self.is_locked && depth < MAX_DEPTH
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ReplyPerms {
    pub can_reply: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl ReplyPerms {
    pub fn for_reply(ctx: &ViewContext, reply: &Reply, depth: usize) -> ReplyPerms {
        let can_modify = ctx.can_modify(reply);
        ReplyPerms {
            can_reply: ctx.can_reply_at(depth),
            can_edit: can_modify,
            can_delete: can_modify,
        }
    }
}
