use uuid::Uuid;

use crate::{Time, UserId, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct ThreadId(pub Uuid);

impl ThreadId {
    pub fn stub() -> ThreadId {
        ThreadId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Thread {
    pub id: ThreadId,
    pub owner_id: UserId,
    pub title: String,
    pub created_at: Time,

    /// Locked threads accept no new replies, but existing replies can still
    /// be moderated
    #[serde(default)]
    pub is_locked: bool,
}

impl Thread {
    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::validate_string(&self.title)
    }
}
