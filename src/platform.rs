// The boundary between the story engine and whatever chat service carries it.
use std::future::Future;

use derive_more::{Display, From};

use crate::error::{DeliveryError, PlatformError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
pub struct ChannelId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
pub struct MemberId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From)]
pub struct MessageId(pub u64);

impl From<&str> for ChannelId {
    fn from(value: &str) -> Self {
        ChannelId(value.to_string())
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        MemberId(value.to_string())
    }
}

/// A message the bot has published, enough to find it again later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub channel: ChannelId,
    pub id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
}

/// One reaction symbol on a message and everyone who used it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub emoji: String,
    pub users: Vec<MemberId>,
}

/// A command typed by a member in a channel.
#[derive(Debug, Clone)]
pub struct CommandEvent {
    pub channel: ChannelId,
    pub author: Member,
    pub name: String,
    pub args: String,
}

pub trait ChatPlatform: Send + Sync + 'static {
    /// Identity of the bot itself, so its own marker reactions are not counted.
    fn bot_id(&self) -> MemberId;

    fn publish(
        &self,
        channel: &ChannelId,
        text: &str,
    ) -> impl Future<Output = Result<MessageHandle, PlatformError>> + Send;

    fn add_reaction(
        &self,
        message: &MessageHandle,
        emoji: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Always re-reads the live state; members react while the vote is open.
    fn fetch_reactions(
        &self,
        message: &MessageHandle,
    ) -> impl Future<Output = Result<Vec<Reaction>, PlatformError>> + Send;

    fn send_private_notice(
        &self,
        member: &MemberId,
        text: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;

    fn resolve_member(&self, identifier: &str) -> impl Future<Output = Option<Member>> + Send;
}
