//! The voting loop: publish a segment, wait, count reactions, award karma,
//! ask the generator for what happens next, repeat until nobody reacts.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::IndexedRandom;
use tokio::sync::Mutex;

use crate::ai::TextGenerator;
use crate::emoji::marker_emojis;
use crate::error::{AppError, PlatformError};
use crate::karma::KarmaLedger;
use crate::message::{MESSAGE_LIMIT, split_message};
use crate::narrative::{Choice, OptionPair, Scene, extract_options};
use crate::platform::{ChannelId, ChatPlatform, Member, MemberId, MessageHandle};
use crate::prompts;
use crate::session::{Segment, Session, SessionStore};
use crate::settings::Settings;
use crate::vote::{Tally, Verdict};

pub const USAGE_HINT: &str =
    "Please provide a theme for the roleplay. Example: `!roleplay space adventure`";
pub const ALREADY_RUNNING: &str =
    "A story is already unfolding in this channel. Vote on the current options!";
pub const STORY_ENDED: &str = "No one voted. The story ends here...";

pub const SECRET_ROLES: [&str; 5] = ["Traitor", "Spy", "Double Agent", "Saboteur", "Impostor"];

/// The segment currently open for votes.
#[derive(Debug, Clone)]
pub struct Round {
    pub message: MessageHandle,
    pub emoji_a: &'static str,
    pub emoji_b: &'static str,
    pub options: OptionPair,
}

#[derive(Debug)]
pub enum Step {
    Continue(Round),
    Ended,
}

pub struct StoryEngine<P, G> {
    platform: Arc<P>,
    generator: Arc<G>,
    sessions: Mutex<SessionStore>,
    karma: Mutex<KarmaLedger>,
    voting_window: Duration,
    message_limit: usize,
}

impl<P: ChatPlatform, G: TextGenerator> StoryEngine<P, G> {
    pub fn new(platform: Arc<P>, generator: Arc<G>) -> Self {
        Self {
            platform,
            generator,
            sessions: Mutex::new(SessionStore::new()),
            karma: Mutex::new(KarmaLedger::new()),
            voting_window: Duration::from_secs(60),
            message_limit: MESSAGE_LIMIT,
        }
    }

    pub fn from_settings(platform: Arc<P>, generator: Arc<G>, settings: &Settings) -> Self {
        Self::new(platform, generator)
            .voting_window(settings.voting_duration())
            .message_limit(settings.message_limit)
    }

    pub fn voting_window(mut self, voting_window: Duration) -> Self {
        self.voting_window = voting_window;
        self
    }

    pub fn message_limit(mut self, message_limit: usize) -> Self {
        self.message_limit = message_limit.max(1);
        self
    }

    pub fn platform(&self) -> &Arc<P> {
        &self.platform
    }

    pub async fn karma(&self, member: &MemberId) -> u64 {
        self.karma.lock().await.get(member)
    }

    /// Snapshot of the story running in `channel`, if any.
    pub async fn session(&self, channel: &ChannelId) -> Option<Session> {
        self.sessions.lock().await.get(channel).cloned()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Run a whole story in `channel`, returning once it has ended.
    pub async fn start_narrative(&self, channel: &ChannelId, author: &Member, theme: &str) {
        let theme = theme.trim();
        if theme.is_empty() {
            self.say(channel, USAGE_HINT).await;
            return;
        }

        if !self.sessions.lock().await.begin(channel) {
            log::info!("Rejected overlapping story start in {channel}");
            self.say(channel, ALREADY_RUNNING).await;
            return;
        }
        log::info!("{} started a story in {channel}: {theme}", author.display_name);

        match self.open(channel, author, theme).await {
            Ok(round) => self.run(channel, round).await,
            Err(err) => {
                log::error!("Opening scenario failed in {channel}: {err}");
                self.sessions.lock().await.end(channel);
                self.say(channel, &format!("An error occurred: {}", cause(&err)))
                    .await;
            }
        }
    }

    pub async fn check_karma(&self, channel: &ChannelId, author: &Member, target: Option<&str>) {
        let member = match target.map(str::trim).filter(|target| !target.is_empty()) {
            None => author.clone(),
            Some(target) => match self.platform.resolve_member(target).await {
                Some(member) => member,
                None => {
                    self.say(channel, &format!("I don't know who {target} is."))
                        .await;
                    return;
                }
            },
        };

        let points = self.karma(&member.id).await;
        self.say(
            channel,
            &format!("{} has {} karma points.", member.display_name, points),
        )
        .await;
    }

    async fn open(
        &self,
        channel: &ChannelId,
        author: &Member,
        theme: &str,
    ) -> Result<Round, AppError> {
        let response = self
            .generator
            .generate(&prompts::opening_prompt(theme))
            .await?;
        let scene = extract_options(&response);

        if theme.to_lowercase().contains("secret") {
            self.assign_secret_role(author).await;
        }

        self.record(channel, &scene).await;
        Ok(self.present(channel, scene).await?)
    }

    async fn run(&self, channel: &ChannelId, mut round: Round) {
        loop {
            tokio::time::sleep(self.voting_window).await;
            match self.tally(channel, round).await {
                Step::Continue(next) => round = next,
                Step::Ended => break,
            }
        }
        log::info!("Story in {channel} is over");
    }

    /// Close the vote on `round` and either continue the story or end it.
    pub async fn tally(&self, channel: &ChannelId, round: Round) -> Step {
        match self.try_tally(channel, &round).await {
            Ok(step) => step,
            Err(err) => {
                log::error!("Continuing the story in {channel} failed: {err}");
                self.sessions.lock().await.end(channel);
                self.say(
                    channel,
                    &format!("An error occurred while continuing the story: {}", cause(&err)),
                )
                .await;
                Step::Ended
            }
        }
    }

    async fn try_tally(&self, channel: &ChannelId, round: &Round) -> Result<Step, AppError> {
        let reactions = self.platform.fetch_reactions(&round.message).await?;
        let tally = Tally::from_reactions(
            &reactions,
            round.emoji_a,
            round.emoji_b,
            &self.platform.bot_id(),
        );
        let verdict = tally.verdict(&mut rand::rng());

        let Some(choice) = verdict.choice() else {
            self.sessions.lock().await.end(channel);
            self.say(channel, STORY_ENDED).await;
            return Ok(Step::Ended);
        };

        let winners = tally.winners(verdict);
        {
            let mut karma = self.karma.lock().await;
            for member in winners {
                karma.award(member);
            }
        }

        let chosen = round.options.label(choice);
        let elements = tally.elements();
        let prompt = {
            let mut sessions = self.sessions.lock().await;
            let Some(session) = sessions.get_mut(channel) else {
                log::warn!("Session for {channel} vanished before the tally");
                return Ok(Step::Ended);
            };
            session.choose(chosen.clone());
            prompts::continuation_prompt(&session.history, &elements)
        };
        log::debug!(
            "Tally in {channel}: A={} B={} custom={} -> {chosen}",
            tally.voters_a.len(),
            tally.voters_b.len(),
            tally.custom.len()
        );

        let response = self.generator.generate(&prompt).await?;
        let scene = extract_options(&response);
        self.record(channel, &scene).await;

        let announcement = match verdict {
            Verdict::Neutral(_) => {
                format!("No votes were cast for either option, so fate decides: {chosen}")
            }
            _ => {
                let emoji = match choice {
                    Choice::A => round.emoji_a,
                    Choice::B => round.emoji_b,
                };
                format!(
                    "Option {emoji} won with {} votes!\n{chosen}",
                    winners.len()
                )
            }
        };
        self.platform.publish(channel, &announcement).await?;
        if !elements.is_empty() {
            self.platform
                .publish(channel, &prompts::elements_announcement(&elements))
                .await?;
        }

        Ok(Step::Continue(self.present(channel, scene).await?))
    }

    async fn assign_secret_role(&self, author: &Member) {
        let role = SECRET_ROLES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(SECRET_ROLES[0]);
        let notice = format!("Your secret role in this scenario: **{role}**.\nOnly you know this!");
        if let Err(err) = self.platform.send_private_notice(&author.id, &notice).await {
            log::debug!("Secret role not delivered: {err}");
        }
    }

    async fn record(&self, channel: &ChannelId, scene: &Scene) {
        if let Some(session) = self.sessions.lock().await.get_mut(channel) {
            session.push(Segment::new(scene.narrative.clone()));
        }
    }

    // Publish the segment and put the two marker reactions on its last chunk.
    async fn present(&self, channel: &ChannelId, scene: Scene) -> Result<Round, PlatformError> {
        let mut last = None;
        for chunk in split_message(&scene.narrative, self.message_limit) {
            last = Some(self.platform.publish(channel, &chunk).await?);
        }
        let message = last.ok_or_else(|| PlatformError::Send("empty segment".to_string()))?;

        let (emoji_a, emoji_b) = marker_emojis(&scene.options.a, &scene.options.b);
        self.platform.add_reaction(&message, emoji_a).await?;
        self.platform.add_reaction(&message, emoji_b).await?;

        Ok(Round {
            message,
            emoji_a,
            emoji_b,
            options: scene.options,
        })
    }

    // Best-effort announcement; a failure here has nowhere else to go but the log.
    async fn say(&self, channel: &ChannelId, text: &str) {
        for chunk in split_message(text, self.message_limit) {
            if let Err(err) = self.platform.publish(channel, &chunk).await {
                log::error!("Could not publish to {channel}: {err}");
                return;
            }
        }
    }
}

// The innermost message, without the umbrella prefix.
fn cause(err: &AppError) -> String {
    match err {
        AppError::Generation(err) => err.to_string(),
        AppError::Platform(err) => err.to_string(),
        other => other.to_string(),
    }
}
