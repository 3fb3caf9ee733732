use std::str::FromStr;

use strum_macros::EnumString;

use crate::ai::TextGenerator;
use crate::engine::StoryEngine;
use crate::platform::{ChannelId, ChatPlatform, CommandEvent, Member};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum CommandName {
    #[strum(serialize = "roleplay", serialize = "start-narrative")]
    StartNarrative,
    #[strum(serialize = "karma", serialize = "check-karma")]
    CheckKarma,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartNarrative { theme: String },
    CheckKarma { target: Option<String> },
}

impl Command {
    pub fn from_event(event: &CommandEvent) -> Option<Self> {
        let args = event.args.trim();
        match CommandName::from_str(&event.name).ok()? {
            CommandName::StartNarrative => Some(Command::StartNarrative {
                theme: args.to_string(),
            }),
            CommandName::CheckKarma => Some(Command::CheckKarma {
                target: (!args.is_empty()).then(|| args.to_string()),
            }),
        }
    }
}

/// Split `!name rest of line` into a command event. Anything without the prefix is chatter.
pub fn parse_command(
    prefix: &str,
    channel: ChannelId,
    author: Member,
    text: &str,
) -> Option<CommandEvent> {
    let body = text.trim_start().strip_prefix(prefix)?;
    let (name, args) = match body.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (body, ""),
    };
    if name.is_empty() {
        return None;
    }
    Some(CommandEvent {
        channel,
        author,
        name: name.to_string(),
        args: args.to_string(),
    })
}

/// Handle one command to completion. A story start only returns once that story is over,
/// so callers spawn this per event.
pub async fn dispatch<P: ChatPlatform, G: TextGenerator>(
    engine: &StoryEngine<P, G>,
    event: CommandEvent,
) {
    match Command::from_event(&event) {
        Some(Command::StartNarrative { theme }) => {
            engine
                .start_narrative(&event.channel, &event.author, &theme)
                .await
        }
        Some(Command::CheckKarma { target }) => {
            engine
                .check_karma(&event.channel, &event.author, target.as_deref())
                .await
        }
        None => log::debug!("Ignoring unknown command {:?}", event.name),
    }
}
