use std::sync::Arc;

use roleplay_bot::{
    OpenAiGenerator, Settings, StoryEngine,
    commands::{self, parse_command},
    console::{ConsoleAction, ConsoleLine, ConsolePlatform},
    logging,
    platform::MessageId,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

type Engine = StoryEngine<ConsolePlatform, OpenAiGenerator>;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let settings = Settings::load()?;
    logging::init(&logging::default_log_dir()?, settings.log_level())?;
    log::info!("roleplay_bot start: {}", chrono::Local::now());

    // Without a generator key nothing can be told.
    settings.require_api_key()?;

    let platform = Arc::new(ConsolePlatform::new());
    let generator = Arc::new(OpenAiGenerator::from_settings(&settings));
    let engine = Arc::new(StoryEngine::from_settings(
        platform.clone(),
        generator,
        &settings,
    ));

    // Create channel for stdin lines
    let (line_sender, mut line_receiver) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line_sender.send(line).is_err() {
                break;
            }
        }
    });

    println!(
        "Type `name: {prefix}roleplay <theme>` to begin, `name: react <n> <emoji>` to vote, \
         `name: {prefix}karma [@name]` for scores, `quit` to leave.\n",
        prefix = settings.command_prefix
    );

    loop {
        tokio::select! {
            line = line_receiver.recv() => {
                let Some(line) = line else { break };
                if !handle_line(&engine, &settings.command_prefix, &line).await {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    log::info!("roleplay_bot exit: {}", chrono::Local::now());
    Ok(())
}

// Returns false once the user asks to quit.
async fn handle_line(engine: &Arc<Engine>, prefix: &str, line: &str) -> bool {
    let Some(parsed) = ConsoleLine::parse(line) else {
        return true;
    };
    let platform = engine.platform();
    let member = platform.member(&parsed.member).await;

    match parsed.action {
        ConsoleAction::Quit => return false,
        ConsoleAction::Dms(accepts) => platform.set_accepts_dms(&member.id, accepts).await,
        ConsoleAction::React { message, emoji } => {
            if let Err(err) = platform.react(MessageId(message), &emoji, &member.id).await {
                println!("{err}");
            }
        }
        ConsoleAction::Say(text) => {
            if let Some(event) = parse_command(prefix, parsed.channel, member, &text) {
                let engine = engine.clone();
                tokio::spawn(async move { commands::dispatch(engine.as_ref(), event).await });
            }
        }
    }
    true
}
