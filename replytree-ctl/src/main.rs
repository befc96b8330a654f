use std::{
    collections::{HashMap, HashSet},
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use replytree_client::{
    api::{Reply, ReplyId, UserId, Uuid, ViewContext, MAX_DEPTH},
    materialize, Clock, Materialized, ReplyTree, Tz,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// User to render the thread for, defaults to the REPLYTREE_USER
    /// environment variable
    #[structopt(short, long)]
    user: Option<Uuid>,

    /// Render as a team member
    #[structopt(long)]
    team: bool,

    /// Render as if the thread were locked
    #[structopt(long)]
    locked: bool,

    /// Timezone for absolute dates
    #[structopt(long, default_value = "UTC")]
    tz: String,

    /// Reference time for relative dates (RFC 3339), defaults to now
    #[structopt(long)]
    now: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print a reply dump as an indented tree
    Render {
        /// JSON list of replies, `-` for stdin
        #[structopt(parse(from_os_str))]
        file: PathBuf,
    },

    /// Look for replies that would not be displayed, or not the way one
    /// would expect
    Check {
        /// JSON list of replies, `-` for stdin
        #[structopt(parse(from_os_str))]
        file: PathBuf,
    },
}

fn current_user(opt: &Opt) -> anyhow::Result<UserId> {
    if let Some(u) = opt.user {
        return Ok(UserId(u));
    }
    let u = std::env::var("REPLYTREE_USER")
        .context("no --user given, retrieving REPLYTREE_USER environment variable")?;
    let u = Uuid::try_parse(&u).context("parsing REPLYTREE_USER as a user id")?;
    Ok(UserId(u))
}

fn clock(opt: &Opt) -> anyhow::Result<Clock> {
    let tz = opt
        .tz
        .parse::<Tz>()
        .map_err(|e| anyhow!("unknown timezone {:?}: {}", opt.tz, e))?;
    let now = match &opt.now {
        None => Utc::now(),
        Some(now) => DateTime::parse_from_rfc3339(now)
            .with_context(|| format!("parsing {now:?} as a RFC 3339 date"))?
            .with_timezone(&Utc),
    };
    Ok(Clock::new(now, tz))
}

fn load_replies(file: &Path) -> anyhow::Result<Vec<Reply>> {
    let data = match file.to_str() {
        Some("-") => {
            let mut data = String::new();
            std::io::stdin()
                .read_to_string(&mut data)
                .context("reading replies from stdin")?;
            data
        }
        _ => std::fs::read_to_string(file)
            .with_context(|| format!("reading replies from {file:?}"))?,
    };
    serde_json::from_str(&data).context("parsing reply dump")
}

fn render(m: &Materialized) -> String {
    let mut res = String::new();
    if m.is_empty() {
        res.push_str("no replies yet\n");
        return res;
    }
    for n in m.lines() {
        let pad = "    ".repeat(n.indent);
        let mut actions = Vec::new();
        if n.perms.can_reply {
            actions.push("reply");
        }
        if n.perms.can_edit {
            actions.push("edit");
        }
        if n.perms.can_delete {
            actions.push("delete");
        }
        let edited = match n.reply.is_edited {
            true => " (edited)",
            false => "",
        };
        res.push_str(&format!(
            "{pad}* {} · {}{edited} [{}]\n",
            n.reply.author_name,
            n.age,
            actions.join(" "),
        ));
        for line in n.reply.content.lines() {
            res.push_str(&format!("{pad}  {line}\n"));
        }
    }
    res
}

#[derive(Debug, Eq, PartialEq)]
enum Problem {
    DuplicateId(ReplyId),
    MissingParent { reply: ReplyId, parent: ReplyId },
    BelowMissingParent { reply: ReplyId, parent: ReplyId },
    Cycle(ReplyId),
    TooDeep { reply: ReplyId, depth: usize },
}

fn check(tree: &ReplyTree) -> Vec<Problem> {
    let mut res = Vec::new();

    let mut counts = HashMap::new();
    for r in tree.replies() {
        *counts.entry(r.id).or_insert(0) += 1;
    }
    let mut reported = HashSet::new();
    for r in tree.replies() {
        if counts[&r.id] > 1 && reported.insert(r.id) {
            res.push(Problem::DuplicateId(r.id));
        }
    }

    for r in tree.unreachable() {
        // walk up until something is either missing or seen twice
        let mut seen = HashSet::new();
        let mut cur = r;
        let problem = loop {
            if !seen.insert(cur.id) {
                break Problem::Cycle(r.id);
            }
            let parent = match cur.parent_reply_id {
                Some(p) => p,
                // unreachable replies can't have a root ancestor
                None => break Problem::Cycle(r.id),
            };
            match tree.get(&parent) {
                Some(p) => cur = p,
                None if cur.id == r.id => {
                    break Problem::MissingParent { reply: r.id, parent }
                }
                None => break Problem::BelowMissingParent { reply: r.id, parent },
            }
        };
        res.push(problem);
    }

    for r in tree.replies() {
        if let Some(depth) = tree.depth_of(&r.id) {
            if depth > MAX_DEPTH {
                res.push(Problem::TooDeep { reply: r.id, depth });
            }
        }
    }
    res
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    match &opt.cmd {
        Command::Render { file } => {
            let ctx = ViewContext::new(current_user(&opt)?, opt.team, opt.locked);
            let clock = clock(&opt)?;
            let tree = ReplyTree::build(load_replies(file)?);
            print!("{}", render(&materialize(&tree, &ctx, &clock)));
        }
        Command::Check { file } => {
            let tree = ReplyTree::build(load_replies(file)?);
            let problems = check(&tree);
            for p in problems.iter() {
                println!("{p:?}");
            }
            if !problems.is_empty() {
                return Err(anyhow!(
                    "found {} problems among {} replies",
                    problems.len(),
                    tree.len()
                ));
            }
            tracing::info!(num_replies = tree.len(), "reply dump looks fine");
        }
    }

    Ok(())
}
