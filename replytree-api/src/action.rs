use crate::{Reply, ReplyId, ThreadId};

/// Changes to a thread, as relayed to anyone watching it
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Action {
    NewReply(Reply),
    EditReply {
        thread_id: ThreadId,
        reply_id: ReplyId,
        content: String,
    },
    DeleteReply {
        thread_id: ThreadId,
        reply_id: ReplyId,
    },
    SetLocked {
        thread_id: ThreadId,
        locked: bool,
    },
}

impl Action {
    pub fn thread_id(&self) -> ThreadId {
        match self {
            Action::NewReply(r) => r.thread_id,
            Action::EditReply { thread_id, .. }
            | Action::DeleteReply { thread_id, .. }
            | Action::SetLocked { thread_id, .. } => *thread_id,
        }
    }
}
