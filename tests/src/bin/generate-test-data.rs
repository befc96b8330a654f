use anyhow::Context;
use chrono::{Duration, Utc};
use rand::{seq::SliceRandom, Rng};
use replytree_api::{Reply, ReplyId, ThreadId, Time, UserId, Uuid, MAX_DEPTH};

const USER_NAMES: &[&str] = &["ana", "bastien", "chloe", "dmitri", "eun-ji"];

const ROOT_PROBABILITY: f64 = 0.3;
const REPLY_SENTENCE_COUNT: usize = 3;
const REPLY_WORD_COUNT: usize = 12;

/// Mean number of minutes between two replies
const MEAN_GAP_MINUTES: i64 = 90;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Number of replies to generate
    #[structopt(short, long, default_value = "40")]
    num_replies: usize,

    /// Number of replies pointing to a parent that does not exist
    #[structopt(long, default_value = "0")]
    orphans: usize,
}

fn gen_content(rng: &mut impl Rng) -> String {
    (0..rng.gen_range(1..=REPLY_SENTENCE_COUNT))
        .map(|_| lipsum::lipsum_words(rng.gen_range(3..=REPLY_WORD_COUNT)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> anyhow::Result<()> {
    let opt = <Opt as structopt::StructOpt>::from_args();
    let mut rng = rand::thread_rng();

    let users = USER_NAMES
        .iter()
        .map(|name| (UserId(Uuid::new_v4()), String::from(*name)))
        .collect::<Vec<_>>();
    let thread_id = ThreadId(Uuid::new_v4());

    let total = opt.num_replies + opt.orphans;
    let mut date: Time =
        Utc::now() - Duration::minutes(MEAN_GAP_MINUTES * 2 * total as i64);

    // (id, depth) of every reply that can still be replied to
    let mut open: Vec<(ReplyId, usize)> = Vec::new();
    let mut replies = Vec::with_capacity(total);
    for _ in 0..opt.num_replies {
        let (author_id, author_name) = users
            .choose(&mut rng)
            .context("picking an author")?
            .clone();
        let parent = match rng.gen_bool(ROOT_PROBABILITY) {
            true => None,
            false => open.choose(&mut rng).copied(),
        };
        let depth = parent.map(|(_, d)| d + 1).unwrap_or(0);
        date = date + Duration::minutes(rng.gen_range(0..MEAN_GAP_MINUTES * 2));
        let r = Reply {
            id: ReplyId(Uuid::new_v4()),
            thread_id,
            author_id,
            author_name,
            content: gen_content(&mut rng),
            parent_reply_id: parent.map(|(p, _)| p),
            is_edited: rng.gen_bool(0.1),
            created_at: date,
        };
        if depth < MAX_DEPTH {
            open.push((r.id, depth));
        }
        replies.push(r);
    }

    for _ in 0..opt.orphans {
        let (author_id, author_name) = users
            .choose(&mut rng)
            .context("picking an author")?
            .clone();
        let r = Reply {
            id: ReplyId(Uuid::new_v4()),
            thread_id,
            author_id,
            author_name,
            content: gen_content(&mut rng),
            parent_reply_id: Some(ReplyId(Uuid::new_v4())),
            is_edited: false,
            created_at: date,
        };
        let at = rng.gen_range(0..=replies.len());
        replies.insert(at, r);
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&replies).context("serializing replies")?
    );
    Ok(())
}
