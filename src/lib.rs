pub mod ai;
pub mod commands;
pub mod console;
pub mod emoji;
pub mod engine;
pub mod error;
pub mod karma;
pub mod logging;
pub mod message;
pub mod narrative;
pub mod platform;
pub mod prompts;
pub mod session;
pub mod settings;
pub mod vote;

// Re-export commonly used items for easier access
pub use ai::{OpenAiGenerator, TextGenerator};
pub use engine::{Round, Step, StoryEngine};
pub use error::{AppError, ConfigError, DeliveryError, GenerationError, PlatformError};
pub use karma::KarmaLedger;
pub use narrative::{Choice, OptionPair, Scene, extract_options};
pub use platform::{
    ChannelId, ChatPlatform, CommandEvent, Member, MemberId, MessageHandle, MessageId, Reaction,
};
pub use session::{Segment, Session, SessionStore};
pub use settings::Settings;
pub use vote::{Tally, Verdict};
