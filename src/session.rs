use std::collections::HashMap;

use crate::platform::ChannelId;

/// One generated step of the story and, once voting closes, what the group picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub narrative: String,
    pub chosen_option: Option<String>,
}

impl Segment {
    pub fn new(narrative: impl Into<String>) -> Self {
        Self {
            narrative: narrative.into(),
            chosen_option: None,
        }
    }
}

/// A story in progress in one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub history: Vec<Segment>,
}

impl Session {
    pub fn push(&mut self, segment: Segment) {
        self.history.push(segment);
    }

    pub fn last(&self) -> Option<&Segment> {
        self.history.last()
    }

    /// Record the winning option on the latest segment. The choice is written
    /// once; later calls leave an already chosen segment alone.
    pub fn choose(&mut self, chosen: String) -> bool {
        match self.history.last_mut() {
            Some(segment) if segment.chosen_option.is_none() => {
                segment.chosen_option = Some(chosen);
                true
            }
            _ => false,
        }
    }
}

/// Active sessions keyed by channel. A channel has an entry iff a story is running there.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<ChannelId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the channel for a new story. Returns false if one is already running.
    pub fn begin(&mut self, channel: &ChannelId) -> bool {
        if self.sessions.contains_key(channel) {
            return false;
        }
        self.sessions.insert(channel.clone(), Session::default());
        true
    }

    pub fn get(&self, channel: &ChannelId) -> Option<&Session> {
        self.sessions.get(channel)
    }

    pub fn get_mut(&mut self, channel: &ChannelId) -> Option<&mut Session> {
        self.sessions.get_mut(channel)
    }

    pub fn end(&mut self, channel: &ChannelId) -> Option<Session> {
        self.sessions.remove(channel)
    }

    pub fn is_active(&self, channel: &ChannelId) -> bool {
        self.sessions.contains_key(channel)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
