mod materialize;
pub use materialize::{materialize, Materialized, ReplyNode};

mod thread;
pub use thread::ThreadView;

mod time;
pub use time::{relative_label, Clock};

mod tree;
pub use tree::{ParentKey, ReplyTree};

pub use chrono_tz::Tz;

pub mod api {
    pub use replytree_api::*;
}
