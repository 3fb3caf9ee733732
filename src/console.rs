//! A chat platform that lives in the terminal: every member types into the
//! same stdin, the bot prints to stdout.
//!
//! Input lines look like `alice: !roleplay a haunted lighthouse`,
//! `bob@tavern: react 3 🔥` or `carol: dms off`. Lines without a name belong
//! to the default member.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use crate::error::{DeliveryError, PlatformError};
use crate::platform::{
    ChannelId, ChatPlatform, Member, MemberId, MessageHandle, MessageId, Reaction,
};

pub const DEFAULT_CHANNEL: &str = "console";
pub const DEFAULT_MEMBER: &str = "you";
const BOT_NAME: &str = "Storyteller";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    Say(String),
    React { message: u64, emoji: String },
    Dms(bool),
    Quit,
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub member: String,
    pub channel: ChannelId,
    pub action: ConsoleAction,
}

impl ConsoleLine {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (speaker, text) = match line.split_once(':') {
            Some((speaker, text)) if is_speaker(speaker) => (speaker.trim(), text.trim()),
            _ => (DEFAULT_MEMBER, line),
        };
        let (member, channel) = match speaker.split_once('@') {
            Some((member, channel)) if !channel.is_empty() => (member, channel),
            _ => (speaker, DEFAULT_CHANNEL),
        };

        let mut words = text.split_whitespace();
        let action = match (words.next(), words.next(), words.next()) {
            (Some("quit" | "exit"), None, None) => ConsoleAction::Quit,
            (Some("dms"), Some("on"), None) => ConsoleAction::Dms(true),
            (Some("dms"), Some("off"), None) => ConsoleAction::Dms(false),
            (Some("react"), Some(message), Some(emoji)) => {
                match message.trim_start_matches('#').parse() {
                    Ok(message) => ConsoleAction::React {
                        message,
                        emoji: emoji.to_string(),
                    },
                    Err(_) => ConsoleAction::Say(text.to_string()),
                }
            }
            _ => ConsoleAction::Say(text.to_string()),
        };

        Some(Self {
            member: member.to_string(),
            channel: ChannelId::from(channel),
            action,
        })
    }
}

fn is_speaker(candidate: &str) -> bool {
    let candidate = candidate.trim();
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))
}

#[derive(Debug)]
struct ConsoleMember {
    display_name: String,
    accepts_dms: bool,
}

#[derive(Debug)]
struct ConsoleMessage {
    channel: ChannelId,
    reactions: Vec<Reaction>,
}

#[derive(Debug, Default)]
struct ConsoleState {
    members: HashMap<MemberId, ConsoleMember>,
    messages: HashMap<MessageId, ConsoleMessage>,
}

#[derive(Debug, Default)]
pub struct ConsolePlatform {
    state: Mutex<ConsoleState>,
    next_message: AtomicU64,
}

impl ConsolePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// The member behind a console name, created on first sight.
    pub async fn member(&self, name: &str) -> Member {
        let id = member_id(name);
        let mut state = self.state.lock().await;
        let entry = state
            .members
            .entry(id.clone())
            .or_insert_with(|| ConsoleMember {
                display_name: name.to_string(),
                accepts_dms: true,
            });
        Member {
            id,
            display_name: entry.display_name.clone(),
        }
    }

    pub async fn set_accepts_dms(&self, member: &MemberId, accepts: bool) {
        if let Some(entry) = self.state.lock().await.members.get_mut(member) {
            entry.accepts_dms = accepts;
        }
    }

    pub async fn react(
        &self,
        message: MessageId,
        emoji: &str,
        member: &MemberId,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock().await;
        let message = state
            .messages
            .get_mut(&message)
            .ok_or(PlatformError::UnknownMessage(message.0))?;
        push_reaction(&mut message.reactions, emoji, member);
        Ok(())
    }
}

fn member_id(name: &str) -> MemberId {
    MemberId(name.trim().trim_start_matches('@').to_lowercase())
}

fn push_reaction(reactions: &mut Vec<Reaction>, emoji: &str, member: &MemberId) {
    match reactions.iter_mut().find(|reaction| reaction.emoji == emoji) {
        Some(reaction) if reaction.users.contains(member) => {}
        Some(reaction) => reaction.users.push(member.clone()),
        None => reactions.push(Reaction {
            emoji: emoji.to_string(),
            users: vec![member.clone()],
        }),
    }
}

impl ChatPlatform for ConsolePlatform {
    fn bot_id(&self) -> MemberId {
        member_id(BOT_NAME)
    }

    async fn publish(
        &self,
        channel: &ChannelId,
        text: &str,
    ) -> Result<MessageHandle, PlatformError> {
        let id = MessageId(self.next_message.fetch_add(1, Ordering::Relaxed) + 1);
        self.state.lock().await.messages.insert(
            id,
            ConsoleMessage {
                channel: channel.clone(),
                reactions: Vec::new(),
            },
        );
        println!("[#{channel}] ({id}) {BOT_NAME}:\n{text}\n");
        Ok(MessageHandle {
            channel: channel.clone(),
            id,
        })
    }

    async fn add_reaction(
        &self,
        message: &MessageHandle,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        self.react(message.id, emoji, &self.bot_id()).await?;
        println!("[#{}] ({}) react {emoji} to vote", message.channel, message.id);
        Ok(())
    }

    async fn fetch_reactions(
        &self,
        message: &MessageHandle,
    ) -> Result<Vec<Reaction>, PlatformError> {
        let state = self.state.lock().await;
        let stored = state
            .messages
            .get(&message.id)
            .filter(|stored| stored.channel == message.channel)
            .ok_or(PlatformError::UnknownMessage(message.id.0))?;
        Ok(stored.reactions.clone())
    }

    async fn send_private_notice(
        &self,
        member: &MemberId,
        text: &str,
    ) -> Result<(), DeliveryError> {
        let state = self.state.lock().await;
        match state.members.get(member) {
            Some(entry) if entry.accepts_dms => {
                println!("[dm -> {}] {text}\n", entry.display_name);
                Ok(())
            }
            Some(_) => Err(DeliveryError {
                member: member.to_string(),
                reason: "direct messages are closed".to_string(),
            }),
            None => Err(DeliveryError {
                member: member.to_string(),
                reason: "unknown member".to_string(),
            }),
        }
    }

    async fn resolve_member(&self, identifier: &str) -> Option<Member> {
        let id = member_id(identifier);
        let state = self.state.lock().await;
        state.members.get(&id).map(|entry| Member {
            id: id.clone(),
            display_name: entry.display_name.clone(),
        })
    }
}
