use crate::session::Segment;

// region:  --- Instructions

const OPENING_PREAMBLE: &str = "You are an expert storyteller creating an immersive, dramatic roleplay scenario. ";

const OPENING_RULES: &str = r#"Follow these formatting rules:
1. Use rich, descriptive language with proper paragraph breaks for readability
2. Create atmosphere through sensory details and environmental descriptions
3. Use occasional bold or italic text for emphasis on important elements
4. End with exactly two distinct choices labeled as:

**A)** [first option] - Make this option distinct and meaningful
**B)** [second option] - Make this option clearly different from option A

Ensure the options present a meaningful choice with different possible outcomes."#;

const CONTINUATION_RULES: &str = r#"Continue the story based on the chosen option, following these formatting rules:
1. Use rich, descriptive language with proper paragraph breaks for readability
2. Build on previous events with dramatic tension and atmosphere
3. Use occasional bold or italic text for emphasis on important elements
4. End with exactly two distinct choices labeled as:

**A)** [first option] - Make this option distinct and meaningful
**B)** [second option] - Make this option clearly different from option A

Ensure the options present a meaningful choice with different possible outcomes."#;

// endregion:  --- Instructions

/// A reaction that was not a vote, already described in words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryElement {
    pub description: String,
    pub count: usize,
}

pub fn opening_prompt(theme: &str) -> String {
    format!(
        "{OPENING_PREAMBLE}Generate an engaging opening scenario for a roleplay about: {theme}.\n\n{OPENING_RULES}"
    )
}

/// The whole story so far, oldest segment first.
pub fn story_context(history: &[Segment]) -> String {
    let mut context = String::new();
    for segment in history {
        context.push_str(&segment.narrative);
        context.push_str("\n\n");
        if let Some(chosen) = &segment.chosen_option {
            context.push_str(&format!("The group chose: {chosen}\n\n"));
        }
    }
    context
}

pub fn continuation_prompt(history: &[Segment], elements: &[StoryElement]) -> String {
    let mut prompt = format!("{}\n\n{CONTINUATION_RULES}", story_context(history));
    if !elements.is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(&elements_addendum(elements));
    }
    prompt
}

pub fn elements_addendum(elements: &[StoryElement]) -> String {
    let listed = elements
        .iter()
        .map(|element| format!("- {} ({})", element.description, members(element.count)))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "The audience also reacted with these elements:\n{listed}\nWeave these elements naturally into the next part of the story."
    )
}

pub fn elements_announcement(elements: &[StoryElement]) -> String {
    let listed = elements
        .iter()
        .map(|element| format!("{} ({})", element.description, element.count))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Incorporating these elements: {listed}")
}

fn members(count: usize) -> String {
    match count {
        1 => "1 member".to_string(),
        n => format!("{n} members"),
    }
}
