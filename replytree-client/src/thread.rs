use crate::{
    api::{self, Backend, Error, Reply, ReplyId, Thread, UserId, ViewContext},
    materialize, Clock, Materialized, ReplyTree,
};

/// A thread as seen by one user
///
/// Mutations are only ever forwarded to the backend: the local tree is not
/// touched until the caller hands a fresh reply list to `refresh`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThreadView {
    thread: Thread,
    ctx: ViewContext,
    tree: ReplyTree,
}

impl ThreadView {
    pub fn new(thread: Thread, current_user: UserId, is_team: bool, replies: Vec<Reply>) -> Self {
        let ctx = ViewContext::new(current_user, is_team, thread.is_locked);
        let mut res = ThreadView {
            thread,
            ctx,
            tree: ReplyTree::default(),
        };
        res.refresh(replies);
        res
    }

    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    pub fn context(&self) -> &ViewContext {
        &self.ctx
    }

    pub fn tree(&self) -> &ReplyTree {
        &self.tree
    }

    pub fn set_thread(&mut self, thread: Thread) {
        if thread.id != self.thread.id {
            tracing::warn!(old=?self.thread.id, new=?thread.id, "thread view switched threads");
        }
        self.ctx.is_locked = thread.is_locked;
        self.thread = thread;
    }

    /// Rebuild the tree from the latest reply list
    pub fn refresh(&mut self, mut replies: Vec<Reply>) {
        let thread_id = self.thread.id;
        replies.retain(|r| {
            let keep = r.thread_id == thread_id;
            if !keep {
                tracing::warn!(reply_id=?r.id, reply_thread=?r.thread_id, ?thread_id, "dropping reply from another thread");
            }
            keep
        });
        self.tree = ReplyTree::build(replies);
    }

    /// Fetch both the thread and its replies again
    pub async fn reload<B: Backend + Send>(&mut self, backend: &mut B) -> Result<(), Error> {
        let thread = backend.fetch_thread(self.thread.id).await?;
        let replies = backend.fetch_replies(self.thread.id).await?;
        self.set_thread(thread);
        self.refresh(replies);
        Ok(())
    }

    pub fn materialize(&self, clock: &Clock) -> Materialized<'_> {
        materialize(&self.tree, &self.ctx, clock)
    }

    fn check_backend<B: Backend>(&self, backend: &B) {
        if backend.current_user() != self.ctx.current_user {
            tracing::warn!(
                view_user=?self.ctx.current_user,
                backend_user=?backend.current_user(),
                "thread view and backend disagree on the current user"
            );
        }
    }

    fn existing(&self, id: &ReplyId) -> Result<&Reply, Error> {
        self.tree.get(id).ok_or(Error::UnknownReply(*id))
    }

    /// Post a new reply, on the thread itself if `parent` is `None`
    pub async fn reply<B: Backend + Send>(
        &self,
        backend: &mut B,
        content: String,
        parent: Option<ReplyId>,
    ) -> Result<Reply, Error> {
        api::validate_content(&content)?;
        if self.ctx.is_locked {
            return Err(Error::ThreadLocked(self.thread.id));
        }
        if let Some(parent) = parent {
            let depth = self
                .tree
                .depth_of(&parent)
                .ok_or(Error::UnknownReply(parent))?;
            if !self.ctx.can_reply_at(depth) {
                return Err(Error::DepthCapReached(parent));
            }
        }
        self.check_backend(backend);
        tracing::debug!(thread_id=?self.thread.id, ?parent, "submitting new reply");
        backend.create_reply(self.thread.id, content, parent).await
    }

    pub async fn edit<B: Backend + Send>(
        &self,
        backend: &mut B,
        reply: ReplyId,
        content: String,
    ) -> Result<(), Error> {
        api::validate_content(&content)?;
        if !self.ctx.can_modify(self.existing(&reply)?) {
            return Err(Error::PermissionDenied);
        }
        self.check_backend(backend);
        tracing::debug!(reply_id=?reply, "submitting reply edit");
        backend.update_reply(reply, content).await
    }

    pub async fn delete<B: Backend + Send>(
        &self,
        backend: &mut B,
        reply: ReplyId,
    ) -> Result<(), Error> {
        if !self.ctx.can_modify(self.existing(&reply)?) {
            return Err(Error::PermissionDenied);
        }
        self.check_backend(backend);
        tracing::debug!(reply_id=?reply, "submitting reply deletion");
        backend.delete_reply(reply).await
    }
}
