use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

/// Replies at this depth (root replies being at depth 0) can no longer be
/// replied to
pub const MAX_DEPTH: usize = 3;

mod action;
pub use action::Action;

mod auth;
pub use auth::{ReplyPerms, ViewContext};

mod backend;
pub use backend::Backend;

mod error;
pub use error::Error;

mod reply;
pub use reply::{Reply, ReplyId};

mod thread;
pub use thread::{Thread, ThreadId};

mod user;
pub use user::{User, UserId};

// null bytes are refused anywhere a string crosses the wire
pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}

/// Validation for anything a user types as the body of a reply
pub fn validate_content(s: &str) -> Result<(), Error> {
    validate_string(s)?;
    if s.trim().is_empty() {
        return Err(Error::EmptyContent);
    }
    Ok(())
}
