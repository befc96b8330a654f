use std::{
    collections::{btree_map, BTreeMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use replytree_client::{
    api::{
        self, Action, Backend, Error, Reply, ReplyId, Thread, ThreadId, User, UserId,
        ViewContext, Uuid,
    },
    ReplyTree,
};
use tokio::sync::{mpsc, Mutex};

/// In-memory stand-in for the real backend, enforcing the same rules
pub struct MockServer {
    users: BTreeMap<UserId, User>,
    team: HashSet<UserId>,
    threads: BTreeMap<ThreadId, DbThread>,
}

#[derive(Debug)]
struct DbThread {
    thread: Thread,

    /// In creation order
    replies: Vec<Reply>,
    feeds: Vec<mpsc::UnboundedSender<Action>>,
}

impl DbThread {
    fn relay_action(&mut self, a: Action) {
        tracing::trace!(thread_id=?a.thread_id(), num_feeds=self.feeds.len(), "relaying action");
        self.feeds.retain(|f| matches!(f.send(a.clone()), Ok(())));
    }

    fn reply_mut(&mut self, id: ReplyId) -> Option<&mut Reply> {
        self.replies.iter_mut().find(|r| r.id == id)
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            users: BTreeMap::new(),
            team: HashSet::new(),
            threads: BTreeMap::new(),
        }
    }

    pub fn admin_create_user(&mut self, u: User) -> Result<(), Error> {
        u.validate()?;
        match self.users.entry(u.id) {
            btree_map::Entry::Occupied(_) => Err(Error::UuidAlreadyUsed(u.id.0)),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(u);
                Ok(())
            }
        }
    }

    pub fn admin_add_team_member(&mut self, u: UserId) -> Result<(), Error> {
        if !self.users.contains_key(&u) {
            return Err(Error::PermissionDenied);
        }
        self.team.insert(u);
        Ok(())
    }

    pub fn admin_create_thread(&mut self, t: Thread) -> Result<(), Error> {
        t.validate()?;
        match self.threads.entry(t.id) {
            btree_map::Entry::Occupied(_) => Err(Error::UuidAlreadyUsed(t.id.0)),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(DbThread {
                    thread: t,
                    replies: Vec::new(),
                    feeds: Vec::new(),
                });
                Ok(())
            }
        }
    }

    pub fn admin_set_locked(&mut self, thread: ThreadId, locked: bool) -> Result<(), Error> {
        let t = self.thread_mut(thread)?;
        t.thread.is_locked = locked;
        t.relay_action(Action::SetLocked {
            thread_id: thread,
            locked,
        });
        Ok(())
    }

    /// Return the current number of replies across all threads
    pub fn test_num_replies(&self) -> usize {
        self.threads.values().map(|t| t.replies.len()).sum()
    }

    fn user(&self, u: UserId) -> Result<&User, Error> {
        self.users.get(&u).ok_or(Error::PermissionDenied)
    }

    fn thread(&self, thread: ThreadId) -> Result<&DbThread, Error> {
        self.threads
            .get(&thread)
            .ok_or(Error::UnknownThread(thread))
    }

    fn thread_mut(&mut self, thread: ThreadId) -> Result<&mut DbThread, Error> {
        self.threads
            .get_mut(&thread)
            .ok_or(Error::UnknownThread(thread))
    }

    fn thread_of(&self, reply: ReplyId) -> Result<ThreadId, Error> {
        self.threads
            .values()
            .find(|t| t.replies.iter().any(|r| r.id == reply))
            .map(|t| t.thread.id)
            .ok_or(Error::UnknownReply(reply))
    }

    fn context_for(&self, u: UserId, thread: ThreadId) -> Result<ViewContext, Error> {
        self.user(u)?;
        let t = self.thread(thread)?;
        Ok(ViewContext::new(
            u,
            self.team.contains(&u),
            t.thread.is_locked,
        ))
    }

    pub fn fetch_thread(&self, u: UserId, thread: ThreadId) -> Result<Thread, Error> {
        self.user(u)?;
        Ok(self.thread(thread)?.thread.clone())
    }

    pub fn fetch_replies(&self, u: UserId, thread: ThreadId) -> Result<Vec<Reply>, Error> {
        self.user(u)?;
        Ok(self.thread(thread)?.replies.clone())
    }

    pub fn create_reply(
        &mut self,
        u: UserId,
        thread: ThreadId,
        content: String,
        parent: Option<ReplyId>,
    ) -> Result<Reply, Error> {
        api::validate_content(&content)?;
        let ctx = self.context_for(u, thread)?;
        if ctx.is_locked {
            return Err(Error::ThreadLocked(thread));
        }
        let author_name = self.user(u)?.name.clone();
        let t = self.thread_mut(thread)?;
        if let Some(parent) = parent {
            let tree = ReplyTree::build(t.replies.clone());
            let depth = tree.depth_of(&parent).ok_or(Error::UnknownReply(parent))?;
            if !ctx.can_reply_at(depth) {
                return Err(Error::DepthCapReached(parent));
            }
        }
        let mut r = Reply::now(thread, u, author_name, content, parent);
        while t.replies.iter().any(|o| o.id == r.id) {
            r.id = ReplyId(Uuid::new_v4());
        }
        tracing::debug!(reply_id=?r.id, ?thread, "mock server stored new reply");
        t.replies.push(r.clone());
        t.relay_action(Action::NewReply(r.clone()));
        Ok(r)
    }

    pub fn update_reply(&mut self, u: UserId, reply: ReplyId, content: String) -> Result<(), Error> {
        api::validate_content(&content)?;
        let thread = self.thread_of(reply)?;
        let ctx = self.context_for(u, thread)?;
        let t = self.thread_mut(thread)?;
        let r = t.reply_mut(reply).ok_or(Error::UnknownReply(reply))?;
        if !ctx.can_modify(r) {
            return Err(Error::PermissionDenied);
        }
        r.content = content.clone();
        r.is_edited = true;
        t.relay_action(Action::EditReply {
            thread_id: thread,
            reply_id: reply,
            content,
        });
        Ok(())
    }

    /// Only the reply itself goes away: its children stay stored, and drop out
    /// of the displayed tree until their parent is restored
    pub fn delete_reply(&mut self, u: UserId, reply: ReplyId) -> Result<(), Error> {
        let thread = self.thread_of(reply)?;
        let ctx = self.context_for(u, thread)?;
        let t = self.thread_mut(thread)?;
        let pos = t
            .replies
            .iter()
            .position(|r| r.id == reply)
            .ok_or(Error::UnknownReply(reply))?;
        if !ctx.can_modify(&t.replies[pos]) {
            return Err(Error::PermissionDenied);
        }
        t.replies.remove(pos);
        t.relay_action(Action::DeleteReply {
            thread_id: thread,
            reply_id: reply,
        });
        Ok(())
    }

    pub fn action_feed(
        &mut self,
        u: UserId,
        thread: ThreadId,
    ) -> Result<mpsc::UnboundedReceiver<Action>, Error> {
        self.user(u)?;
        let t = self.thread_mut(thread)?;
        let (sender, receiver) = mpsc::unbounded_channel();
        t.feeds.push(sender);
        Ok(receiver)
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

/// One user's connection to a shared `MockServer`
///
/// Errors go through their wire encoding on the way back, like they would
/// over http.
#[derive(Clone)]
pub struct MockClient {
    server: Arc<Mutex<MockServer>>,
    user: UserId,
}

impl MockClient {
    pub fn new(server: Arc<Mutex<MockServer>>, user: UserId) -> MockClient {
        MockClient { server, user }
    }
}

fn over_wire<T>(res: Result<T, Error>) -> Result<T, Error> {
    res.map_err(|e| {
        Error::parse(&e.contents())
            .unwrap_or_else(|err| Error::Unknown(format!("unparseable error: {err:#}")))
    })
}

#[async_trait]
impl Backend for MockClient {
    fn current_user(&self) -> UserId {
        self.user
    }

    async fn fetch_thread(&mut self, thread: ThreadId) -> Result<Thread, Error> {
        over_wire(self.server.lock().await.fetch_thread(self.user, thread))
    }

    async fn fetch_replies(&mut self, thread: ThreadId) -> Result<Vec<Reply>, Error> {
        over_wire(self.server.lock().await.fetch_replies(self.user, thread))
    }

    async fn create_reply(
        &mut self,
        thread: ThreadId,
        content: String,
        parent: Option<ReplyId>,
    ) -> Result<Reply, Error> {
        over_wire(
            self.server
                .lock()
                .await
                .create_reply(self.user, thread, content, parent),
        )
    }

    async fn update_reply(&mut self, reply: ReplyId, content: String) -> Result<(), Error> {
        over_wire(
            self.server
                .lock()
                .await
                .update_reply(self.user, reply, content),
        )
    }

    async fn delete_reply(&mut self, reply: ReplyId) -> Result<(), Error> {
        over_wire(self.server.lock().await.delete_reply(self.user, reply))
    }
}
