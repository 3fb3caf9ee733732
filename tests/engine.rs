// ../tests/engine.rs
use roleplay_bot::emoji::marker_emojis;
use roleplay_bot::engine::{ALREADY_RUNNING, STORY_ENDED, USAGE_HINT};
use roleplay_bot::message::split_message;
use roleplay_bot::*;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BOT: &str = "storyteller";
const KNOWN_MEMBERS: [&str; 6] = ["Alice", "Bob", "Carol", "Dave", "Erin", "Mary Ann"];

const LIGHTHOUSE: &str = "The lamp above you gutters as the storm batters the glass.\n\nSomething knocks from inside the sealed keeper's room.\n\n**A)** Climb the tower stairs\n**B)** Search the keeper's cabin";
const SECOND_SEGMENT: &str = "The stairs groan beneath you, slick with sea spray.\n\n**A)** Light the great lamp\n**B)** Hide behind the lens";
const THIRD_SEGMENT: &str = "A voice answers from the dark.\n\n**A)** Answer the voice\n**B)** Run down to the beach";

#[derive(Debug, Clone)]
enum Vote {
    A(&'static [&'static str]),
    B(&'static [&'static str]),
    Custom(&'static str, &'static [&'static str]),
}

#[derive(Default)]
struct Script {
    next_id: u64,
    published: Vec<(MessageId, String)>,
    markers: HashMap<MessageId, Vec<String>>,
    rounds: VecDeque<Vec<Vote>>,
    notices: Vec<(MemberId, String)>,
    dms_closed: bool,
}

#[derive(Default)]
struct ScriptedPlatform {
    script: Mutex<Script>,
}

impl ScriptedPlatform {
    fn with_rounds(rounds: Vec<Vec<Vote>>) -> Arc<Self> {
        let platform = Self::default();
        platform.script.lock().unwrap().rounds = rounds.into();
        Arc::new(platform)
    }

    fn close_dms(&self) {
        self.script.lock().unwrap().dms_closed = true;
    }

    fn published(&self) -> Vec<String> {
        let script = self.script.lock().unwrap();
        script.published.iter().map(|(_, text)| text.clone()).collect()
    }

    fn last_published(&self) -> String {
        self.published().last().cloned().unwrap_or_default()
    }

    fn notices(&self) -> Vec<(MemberId, String)> {
        self.script.lock().unwrap().notices.clone()
    }

    fn markers(&self) -> Vec<(MessageId, Vec<String>)> {
        let script = self.script.lock().unwrap();
        let mut markers: Vec<_> = script
            .markers
            .iter()
            .map(|(id, emojis)| (*id, emojis.clone()))
            .collect();
        markers.sort_by_key(|(id, _)| id.0);
        markers
    }

    fn message_id_of(&self, text: &str) -> Option<MessageId> {
        let script = self.script.lock().unwrap();
        script
            .published
            .iter()
            .find(|(_, published)| published == text)
            .map(|(id, _)| *id)
    }
}

impl ChatPlatform for ScriptedPlatform {
    fn bot_id(&self) -> MemberId {
        MemberId::from(BOT)
    }

    async fn publish(
        &self,
        channel: &ChannelId,
        text: &str,
    ) -> Result<MessageHandle, PlatformError> {
        let mut script = self.script.lock().unwrap();
        script.next_id += 1;
        let id = MessageId(script.next_id);
        script.published.push((id, text.to_string()));
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
        let mut script = self.script.lock().unwrap();
        script
            .markers
            .entry(message.id)
            .or_default()
            .push(emoji.to_string());
        Ok(())
    }

    async fn fetch_reactions(
        &self,
        message: &MessageHandle,
    ) -> Result<Vec<Reaction>, PlatformError> {
        let mut script = self.script.lock().unwrap();
        let markers = script.markers.get(&message.id).cloned().unwrap_or_default();
        let mut reactions: Vec<Reaction> = markers
            .iter()
            .map(|emoji| Reaction {
                emoji: emoji.clone(),
                users: vec![MemberId::from(BOT)],
            })
            .collect();

        for vote in script.rounds.pop_front().unwrap_or_default() {
            let (emoji, users) = match vote {
                Vote::A(users) => (markers[0].clone(), users),
                Vote::B(users) => (markers[1].clone(), users),
                Vote::Custom(emoji, users) => (emoji.to_string(), users),
            };
            let users = users.iter().map(|user| MemberId::from(*user));
            match reactions.iter_mut().find(|reaction| reaction.emoji == emoji) {
                Some(reaction) => reaction.users.extend(users),
                None => reactions.push(Reaction {
                    emoji,
                    users: users.collect(),
                }),
            }
        }
        Ok(reactions)
    }

    async fn send_private_notice(
        &self,
        member: &MemberId,
        text: &str,
    ) -> Result<(), DeliveryError> {
        let mut script = self.script.lock().unwrap();
        if script.dms_closed {
            return Err(DeliveryError {
                member: member.to_string(),
                reason: "direct messages are closed".to_string(),
            });
        }
        script.notices.push((member.clone(), text.to_string()));
        Ok(())
    }

    async fn resolve_member(&self, identifier: &str) -> Option<Member> {
        let name = identifier.trim_start_matches('@');
        KNOWN_MEMBERS
            .iter()
            .find(|known| known.eq_ignore_ascii_case(name))
            .map(|known| member(known))
    }
}

#[derive(Default)]
struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn replying(responses: Vec<Result<&str, GenerationError>>) -> Arc<Self> {
        let generator = Self::default();
        *generator.responses.lock().unwrap() = responses
            .into_iter()
            .map(|response| response.map(str::to_string))
            .collect();
        Arc::new(generator)
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::EmptyResponse))
    }
}

type Engine = StoryEngine<ScriptedPlatform, ScriptedGenerator>;

fn member(name: &str) -> Member {
    Member {
        id: MemberId::from(name.to_lowercase().as_str()),
        display_name: name.to_string(),
    }
}

fn channel() -> ChannelId {
    ChannelId::from("lighthouse")
}

fn engine(platform: &Arc<ScriptedPlatform>, generator: &Arc<ScriptedGenerator>) -> Arc<Engine> {
    Arc::new(
        StoryEngine::new(platform.clone(), generator.clone())
            .voting_window(Duration::from_secs(60)),
    )
}

fn spawn_story(engine: &Arc<Engine>, theme: &'static str) -> tokio::task::JoinHandle<()> {
    let engine = engine.clone();
    tokio::spawn(async move {
        engine
            .start_narrative(&channel(), &member("Alice"), theme)
            .await
    })
}

async fn karma_of(engine: &Engine, name: &str) -> u64 {
    engine.karma(&MemberId::from(name)).await
}

#[tokio::test(start_paused = true)]
async fn test_majority_vote_wins_and_awards_karma() {
    let platform = ScriptedPlatform::with_rounds(vec![vec![
        Vote::A(&["alice", "bob", "carol"]),
        Vote::B(&["dave"]),
    ]]);
    let generator = ScriptedGenerator::replying(vec![Ok(LIGHTHOUSE), Ok(SECOND_SEGMENT)]);
    let engine = engine(&platform, &generator);

    let story = spawn_story(&engine, "a haunted lighthouse");

    // First vote closes at 60s, the second one would close at 120s.
    tokio::time::sleep(Duration::from_secs(90)).await;

    let session = engine.session(&channel()).await.expect("story still running");
    assert_eq!(session.history.len(), 2);
    assert_eq!(
        session.history[0].chosen_option.as_deref(),
        Some("**A)** Climb the tower stairs")
    );
    assert_eq!(session.history[0].narrative, LIGHTHOUSE);
    assert_eq!(session.history[1].chosen_option, None);

    for voter in ["alice", "bob", "carol"] {
        assert_eq!(karma_of(&engine, voter).await, 1);
    }
    assert_eq!(karma_of(&engine, "dave").await, 0);

    let (emoji_a, emoji_b) = marker_emojis("Climb the tower stairs", "Search the keeper's cabin");
    assert_ne!(emoji_a, emoji_b);
    assert!(
        platform
            .published()
            .contains(&format!("Option {emoji_a} won with 3 votes!\n**A)** Climb the tower stairs"))
    );

    let prompts = generator.prompts();
    assert!(prompts[0].contains("a haunted lighthouse"));
    assert!(prompts[1].starts_with(LIGHTHOUSE));
    assert!(prompts[1].contains("The group chose: **A)** Climb the tower stairs"));

    story.await.unwrap();
    assert!(engine.session(&channel()).await.is_none());
    assert_eq!(platform.last_published(), STORY_ENDED);
}

#[tokio::test(start_paused = true)]
async fn test_tie_goes_to_option_b() {
    let platform = ScriptedPlatform::with_rounds(vec![vec![
        Vote::A(&["alice", "bob"]),
        Vote::B(&["carol", "dave"]),
    ]]);
    let generator = ScriptedGenerator::replying(vec![Ok(LIGHTHOUSE), Ok(SECOND_SEGMENT)]);
    let engine = engine(&platform, &generator);

    engine
        .start_narrative(&channel(), &member("Alice"), "a haunted lighthouse")
        .await;

    assert_eq!(karma_of(&engine, "alice").await, 0);
    assert_eq!(karma_of(&engine, "bob").await, 0);
    assert_eq!(karma_of(&engine, "carol").await, 1);
    assert_eq!(karma_of(&engine, "dave").await, 1);
    assert!(generator.prompts()[1].contains("The group chose: **B)** Search the keeper's cabin"));
}

#[tokio::test(start_paused = true)]
async fn test_no_reactions_ends_the_story() {
    let platform = ScriptedPlatform::with_rounds(vec![]);
    let generator = ScriptedGenerator::replying(vec![Ok(LIGHTHOUSE), Ok(SECOND_SEGMENT)]);
    let engine = engine(&platform, &generator);

    engine
        .start_narrative(&channel(), &member("Alice"), "a haunted lighthouse")
        .await;

    // The bot's own marker reactions are not interactions.
    assert_eq!(generator.prompts().len(), 1);
    assert!(engine.session(&channel()).await.is_none());
    assert_eq!(engine.active_sessions().await, 0);
    assert_eq!(platform.last_published(), STORY_ENDED);
}

#[tokio::test(start_paused = true)]
async fn test_custom_reactions_only_take_the_neutral_path() {
    let platform =
        ScriptedPlatform::with_rounds(vec![vec![Vote::Custom("🎉", &["alice", "bob"])]]);
    let generator = ScriptedGenerator::replying(vec![Ok(LIGHTHOUSE), Ok(SECOND_SEGMENT)]);
    let engine = engine(&platform, &generator);

    let story = spawn_story(&engine, "a haunted lighthouse");
    tokio::time::sleep(Duration::from_secs(90)).await;

    let session = engine.session(&channel()).await.expect("story continues");
    assert_eq!(session.history.len(), 2);
    let chosen = session.history[0].chosen_option.clone().expect("a branch was picked");
    assert!(
        chosen == "**A)** Climb the tower stairs" || chosen == "**B)** Search the keeper's cabin"
    );

    assert_eq!(karma_of(&engine, "alice").await, 0);
    assert_eq!(karma_of(&engine, "bob").await, 0);

    let prompt = &generator.prompts()[1];
    assert!(prompt.contains("celebration (2 members)"));
    assert!(prompt.contains("Weave these elements"));

    let published = platform.published();
    assert!(published.iter().any(|text| text.starts_with("No votes were cast for either option")));
    assert!(published.contains(&"Incorporating these elements: celebration (2)".to_string()));

    story.await.unwrap();
    assert!(engine.session(&channel()).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_custom_reactions_do_not_change_the_winner() {
    let platform = ScriptedPlatform::with_rounds(vec![vec![
        Vote::A(&["alice"]),
        Vote::Custom("👻", &["bob", "carol", "dave"]),
    ]]);
    let generator = ScriptedGenerator::replying(vec![Ok(LIGHTHOUSE), Ok(SECOND_SEGMENT)]);
    let engine = engine(&platform, &generator);

    engine
        .start_narrative(&channel(), &member("Alice"), "a haunted lighthouse")
        .await;

    assert_eq!(karma_of(&engine, "alice").await, 1);
    assert_eq!(karma_of(&engine, "bob").await, 0);
    let prompt = &generator.prompts()[1];
    assert!(prompt.contains("The group chose: **A)** Climb the tower stairs"));
    assert!(prompt.contains("ghost (3 members)"));
}

#[tokio::test(start_paused = true)]
async fn test_karma_accumulates_across_rounds() {
    let platform = ScriptedPlatform::with_rounds(vec![
        vec![Vote::A(&["alice", "bob"]), Vote::B(&["carol"])],
        vec![Vote::A(&["alice"]), Vote::B(&["bob", "carol"])],
    ]);
    let generator =
        ScriptedGenerator::replying(vec![Ok(LIGHTHOUSE), Ok(SECOND_SEGMENT), Ok(THIRD_SEGMENT)]);
    let engine = engine(&platform, &generator);

    engine
        .start_narrative(&channel(), &member("Alice"), "a haunted lighthouse")
        .await;

    assert_eq!(karma_of(&engine, "alice").await, 1);
    assert_eq!(karma_of(&engine, "bob").await, 2);
    assert_eq!(karma_of(&engine, "carol").await, 1);

    // Every prompt carries the whole story so far.
    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[2].contains("The group chose: **A)** Climb the tower stairs"));
    assert!(prompts[2].contains("The group chose: **B)** Hide behind the lens"));
    assert!(prompts[2].find(LIGHTHOUSE) < prompts[2].find(SECOND_SEGMENT));

    engine
        .check_karma(&channel(), &member("Alice"), Some("@bob"))
        .await;
    assert_eq!(platform.last_published(), "Bob has 2 karma points.");

    engine.check_karma(&channel(), &member("Alice"), None).await;
    assert_eq!(platform.last_published(), "Alice has 1 karma points.");

    engine
        .check_karma(&channel(), &member("Alice"), Some("@nobody"))
        .await;
    assert_eq!(platform.last_published(), "I don't know who @nobody is.");

    let event =
        commands::parse_command("!", channel(), member("Bob"), "!karma @Mary Ann").unwrap();
    commands::dispatch(engine.as_ref(), event).await;
    assert_eq!(platform.last_published(), "Mary Ann has 0 karma points.");
}

#[tokio::test(start_paused = true)]
async fn test_generation_failure_tears_down_the_session() {
    let platform = ScriptedPlatform::with_rounds(vec![vec![Vote::A(&["alice"])]]);
    let generator = ScriptedGenerator::replying(vec![
        Ok(LIGHTHOUSE),
        Err(GenerationError::EmptyResponse),
    ]);
    let engine = engine(&platform, &generator);

    engine
        .start_narrative(&channel(), &member("Alice"), "a haunted lighthouse")
        .await;

    assert!(engine.session(&channel()).await.is_none());
    assert!(
        platform
            .last_published()
            .starts_with("An error occurred while continuing the story: ")
    );
    // Karma for the closed vote stands.
    assert_eq!(karma_of(&engine, "alice").await, 1);
    assert_eq!(generator.prompts().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_opening_failure_leaves_no_session() {
    let platform = ScriptedPlatform::with_rounds(vec![]);
    let generator = ScriptedGenerator::replying(vec![Err(GenerationError::NotConfigured)]);
    let engine = engine(&platform, &generator);

    engine
        .start_narrative(&channel(), &member("Alice"), "a haunted lighthouse")
        .await;

    assert!(engine.session(&channel()).await.is_none());
    assert_eq!(
        platform.published(),
        vec!["An error occurred: No API key configured for the text generator".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_theme_prints_usage() {
    let platform = ScriptedPlatform::with_rounds(vec![]);
    let generator = ScriptedGenerator::replying(vec![Ok(LIGHTHOUSE)]);
    let engine = engine(&platform, &generator);

    engine.start_narrative(&channel(), &member("Alice"), "   ").await;

    assert_eq!(platform.published(), vec![USAGE_HINT.to_string()]);
    assert!(generator.prompts().is_empty());
    assert!(engine.session(&channel()).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_second_start_in_same_channel_is_rejected() {
    let platform = ScriptedPlatform::with_rounds(vec![vec![Vote::A(&["alice"])]]);
    let generator = ScriptedGenerator::replying(vec![Ok(LIGHTHOUSE), Ok(SECOND_SEGMENT)]);
    let engine = engine(&platform, &generator);

    let story = spawn_story(&engine, "a haunted lighthouse");
    tokio::time::sleep(Duration::from_secs(10)).await;

    engine
        .start_narrative(&channel(), &member("Bob"), "a pirate cove")
        .await;
    assert_eq!(platform.last_published(), ALREADY_RUNNING);
    assert_eq!(generator.prompts().len(), 1);

    let session = engine.session(&channel()).await.expect("first story untouched");
    assert_eq!(session.history.len(), 1);

    // Another channel is independent.
    let other = ChannelId::from("tavern");
    let other_story = {
        let engine = engine.clone();
        let other = other.clone();
        tokio::spawn(async move {
            engine
                .start_narrative(&other, &member("Bob"), "a pirate cove")
                .await
        })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(engine.active_sessions().await, 2);

    story.await.unwrap();
    other_story.await.unwrap();
    assert_eq!(engine.active_sessions().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_secret_theme_whispers_a_role() {
    let platform = ScriptedPlatform::with_rounds(vec![]);
    let generator = ScriptedGenerator::replying(vec![Ok(LIGHTHOUSE)]);
    let engine = engine(&platform, &generator);

    engine
        .start_narrative(&channel(), &member("Alice"), "a Secret society")
        .await;

    let notices = platform.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].0, MemberId::from("alice"));
    assert!(notices[0].1.starts_with("Your secret role in this scenario: **"));
    assert!(
        roleplay_bot::engine::SECRET_ROLES
            .iter()
            .any(|role| notices[0].1.contains(&format!("**{role}**")))
    );
}

#[tokio::test(start_paused = true)]
async fn test_undeliverable_secret_role_does_not_stop_the_story() {
    let platform = ScriptedPlatform::with_rounds(vec![]);
    platform.close_dms();
    let generator = ScriptedGenerator::replying(vec![Ok(LIGHTHOUSE)]);
    let engine = engine(&platform, &generator);

    let story = spawn_story(&engine, "the secret of the lighthouse");
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(platform.notices().is_empty());
    let session = engine.session(&channel()).await.expect("story started anyway");
    assert_eq!(session.history.len(), 1);
    assert!(platform.published().contains(&LIGHTHOUSE.to_string()));

    story.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_long_segments_are_chunked_with_markers_on_the_last_piece() {
    let long_story = format!(
        "{}\n\n{}\n\n**A)** Open the door\n**B)** Climb out the window",
        "The fog rolls in over the rocks. ".repeat(8).trim(),
        "Gulls scream somewhere below the cliff. ".repeat(8).trim()
    );
    let platform = ScriptedPlatform::with_rounds(vec![]);
    let generator = ScriptedGenerator::replying(vec![Ok(long_story.as_str())]);
    let engine = Arc::new(
        StoryEngine::new(platform.clone(), generator.clone())
            .voting_window(Duration::from_secs(60))
            .message_limit(120),
    );

    engine
        .start_narrative(&channel(), &member("Alice"), "a haunted lighthouse")
        .await;

    let chunks = split_message(&long_story, 120);
    assert!(chunks.len() > 1);
    let published = platform.published();
    assert_eq!(published[..chunks.len()], chunks[..]);

    let last_chunk = platform.message_id_of(&chunks[chunks.len() - 1]).unwrap();
    let markers = platform.markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].0, last_chunk);
    let (emoji_a, emoji_b) = marker_emojis("Open the door", "Climb out the window");
    assert_eq!(markers[0].1, vec![emoji_a.to_string(), emoji_b.to_string()]);
}
