use async_trait::async_trait;

use crate::{Error, Reply, ReplyId, Thread, ThreadId, UserId};

/// Whatever actually stores replies
///
/// Implementations are expected to enforce the same rules as the client
/// does, as the client-side checks only exist to avoid pointless round-trips.
#[async_trait]
pub trait Backend {
    fn current_user(&self) -> UserId;
    async fn fetch_thread(&mut self, thread: ThreadId) -> Result<Thread, Error>;

    /// Replies are returned in creation order
    async fn fetch_replies(&mut self, thread: ThreadId) -> Result<Vec<Reply>, Error>;

    async fn create_reply(
        &mut self,
        thread: ThreadId,
        content: String,
        parent: Option<ReplyId>,
    ) -> Result<Reply, Error>;
    async fn update_reply(&mut self, reply: ReplyId, content: String) -> Result<(), Error>;
    async fn delete_reply(&mut self, reply: ReplyId) -> Result<(), Error>;
}
