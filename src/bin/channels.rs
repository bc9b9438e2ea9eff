//! gnubot-channels - manage the channel lists in a gnubot store.
//!
//! ```text
//! gnubot-channels <STORAGE> [--list NAME] add|remove|list [ROOM]
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use gnubot::client::normalize_room;
use gnubot::store::{COMMUNITIES, ChannelStore, DEFAULT_THRESHOLD, RedbStore};

#[derive(Debug, PartialEq, Eq, Parser)]
#[command(name = "gnubot-channels")]
#[command(about = "Manage the channel lists in a gnubot store")]
struct Args {
    /// Path to the redb store (e.g. db/gnubot.redb)
    storage: String,

    /// Channel list to operate on
    #[arg(long, global = true, value_name = "NAME", default_value = COMMUNITIES)]
    list: String,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Action {
    /// Add a room to the list
    Add {
        #[arg(value_parser = parse_room)]
        room: String,
    },

    /// Remove a room from the list
    Remove {
        #[arg(value_parser = parse_room)]
        room: String,
    },

    /// Print every room in the list
    List,
}

fn parse_room(room: &str) -> Result<String, String> {
    let room = normalize_room(room);
    if room.len() > 1 {
        Ok(room)
    } else {
        Err("room name is empty".to_string())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let store = RedbStore::open(&args.storage, DEFAULT_THRESHOLD)
        .with_context(|| format!("failed to open store at {}", args.storage))?;

    match args.action {
        Action::Add { room } => {
            if store.add_to(&args.list, &room)? {
                println!("added {room} to {}", args.list);
            } else {
                println!("{room} is already in {}", args.list);
            }
        }
        Action::Remove { room } => {
            if store.remove_from(&args.list, &room)? {
                println!("removed {room} from {}", args.list);
            } else {
                println!("{room} is not in {}", args.list);
            }
        }
        Action::List => {
            for room in store.channels_in(&args.list)? {
                println!("{room}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("gnubot-channels").chain(line.split_whitespace()))
    }

    #[test]
    fn test_parse_add_defaults_to_communities() {
        assert_eq!(
            args("db/x.redb add gnu").unwrap(),
            Args {
                storage: "db/x.redb".into(),
                list: COMMUNITIES.into(),
                action: Action::Add { room: "#gnu".into() },
            }
        );
    }

    #[test]
    fn test_parse_named_list() {
        let parsed = args("db/x.redb --list audited_by_gnu remove #quiet").unwrap();
        assert_eq!(parsed.list, "audited_by_gnu");
        assert_eq!(parsed.action, Action::Remove { room: "#quiet".into() });

        let parsed = args("db/x.redb list --list audited_by_gnu").unwrap();
        assert_eq!(parsed.list, "audited_by_gnu");
        assert_eq!(parsed.action, Action::List);
    }

    #[test]
    fn test_parse_rejects_bad_usage() {
        assert!(args("db/x.redb").is_err());
        assert!(args("db/x.redb frobnicate").is_err());
        assert!(args("db/x.redb add").is_err());
        assert!(args("db/x.redb add #").is_err());
        assert!(args("db/x.redb list #extra").is_err());
        assert!(args("db/x.redb add a b").is_err());
        assert!(args("db/x.redb list --list").is_err());
    }
}
