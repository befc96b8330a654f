use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde_json::json;
use uuid::Uuid;

use crate::{ReplyId, ThreadId};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Reply content is empty")]
    EmptyContent,

    #[error("Thread {0:?} is locked")]
    ThreadLocked(ThreadId),

    #[error("Reply {0:?} is nested too deep to be replied to")]
    DepthCapReached(ReplyId),

    #[error("Unknown reply {0:?}")]
    UnknownReply(ReplyId),

    #[error("Unknown thread {0:?}")]
    UnknownThread(ThreadId),

    #[error("Uuid already used {0}")]
    UuidAlreadyUsed(Uuid),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),
}

fn get_uuid(data: &serde_json::Value, field: &str) -> anyhow::Result<Uuid> {
    data.get(field)
        .and_then(|u| u.as_str())
        .and_then(|u| Uuid::from_str(u).ok())
        .ok_or_else(|| anyhow!("error is missing a proper {field} uuid"))
}

impl Error {
    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::EmptyContent => json!({
                "message": "reply content is empty",
                "type": "empty-content",
            }),
            Error::ThreadLocked(t) => json!({
                "message": "thread is locked",
                "type": "thread-locked",
                "thread": t.0,
            }),
            Error::DepthCapReached(r) => json!({
                "message": "reply is nested too deep to be replied to",
                "type": "depth-cap",
                "reply": r.0,
            }),
            Error::UnknownReply(r) => json!({
                "message": "unknown reply",
                "type": "unknown-reply",
                "reply": r.0,
            }),
            Error::UnknownThread(t) => json!({
                "message": "unknown thread",
                "type": "unknown-thread",
                "thread": t.0,
            }),
            Error::UuidAlreadyUsed(u) => json!({
                "message": "uuid conflict",
                "type": "conflict-uuid",
                "uuid": u,
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "permission-denied" => Error::PermissionDenied,
                "empty-content" => Error::EmptyContent,
                "thread-locked" => Error::ThreadLocked(ThreadId(get_uuid(&data, "thread")?)),
                "depth-cap" => Error::DepthCapReached(ReplyId(get_uuid(&data, "reply")?)),
                "unknown-reply" => Error::UnknownReply(ReplyId(get_uuid(&data, "reply")?)),
                "unknown-thread" => Error::UnknownThread(ThreadId(get_uuid(&data, "thread")?)),
                "conflict-uuid" => Error::UuidAlreadyUsed(get_uuid(&data, "uuid")?),
                "null-byte" => Error::NullByteInString(String::from(
                    data.get("string").and_then(|s| s.as_str()).ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
