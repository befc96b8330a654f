use chrono::Utc;
use uuid::Uuid;

use crate::{ThreadId, Time, UserId, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct ReplyId(pub Uuid);

impl ReplyId {
    pub fn stub() -> ReplyId {
        ReplyId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Reply {
    pub id: ReplyId,
    pub thread_id: ThreadId,
    pub author_id: UserId,
    pub author_name: String,
    pub content: String,

    /// `None` for replies posted directly on the thread
    #[serde(default)]
    pub parent_reply_id: Option<ReplyId>,

    /// Set by the backend once the content got modified after creation
    #[serde(default)]
    pub is_edited: bool,

    pub created_at: Time,
}

impl Reply {
    pub fn now(
        thread_id: ThreadId,
        author_id: UserId,
        author_name: String,
        content: String,
        parent_reply_id: Option<ReplyId>,
    ) -> Reply {
        Reply {
            id: ReplyId(Uuid::new_v4()),
            thread_id,
            author_id,
            author_name,
            content,
            parent_reply_id,
            is_edited: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_reply_id.is_none()
    }

    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::validate_string(&self.author_name)?;
        crate::validate_content(&self.content)
    }
}
