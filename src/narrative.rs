//! Turns whatever the generator wrote into a story segment with exactly two options.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use strum_macros::{Display, EnumIter};

pub const FALLBACK_OPTION_A: &str = "Continue cautiously";
pub const FALLBACK_OPTION_B: &str = "Take a risk";
const FALLBACK_NARRATIVE: &str = "The story continues...";

static STRICT_OPTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\*\*A\)\*\*(.*?)(?:\n|$).*?\*\*B\)\*\*(.*?)(?:\n|$)")
        .expect("valid strict options regex")
});
static RELAXED_OPTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)A\)(.*?)(?:\n|$).*?B\)(.*?)(?:\n|$)").expect("valid relaxed options regex")
});

// A bare or bold `A)` / `B)` label and the spacing after it.
static OPTION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\*\*)?([AB])\)(?:\*\*)?[ \t]*").expect("valid option marker regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Choice {
    A,
    B,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionPair {
    pub a: String,
    pub b: String,
}

impl OptionPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    pub fn text(&self, choice: Choice) -> &str {
        match choice {
            Choice::A => &self.a,
            Choice::B => &self.b,
        }
    }

    /// Canonical bold label, e.g. `**A)** Open the door`.
    pub fn label(&self, choice: Choice) -> String {
        format!("**{choice})** {}", self.text(choice))
    }
}

impl fmt::Display for OptionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.label(Choice::A), self.label(Choice::B))
    }
}

/// A parsed generator response: the text to publish and the two options in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    /// Full text of the segment, option block included in canonical bold form.
    pub narrative: String,
    pub options: OptionPair,
}

type Strategy = fn(&str) -> Option<Scene>;

/// Tried in order; the last one always succeeds.
const STRATEGIES: &[Strategy] = &[strict_markup, relaxed_markup];

/// Extract the narrative and both options. Total: malformed input falls back
/// to generic options rather than failing.
pub fn extract_options(response: &str) -> Scene {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(response))
        .unwrap_or_else(|| fallback(response))
}

fn captured_options(pattern: &Regex, response: &str) -> Option<OptionPair> {
    let captures = pattern.captures(response)?;
    let a = option_text(captures.get(1)?.as_str());
    let b = option_text(captures.get(2)?.as_str());
    if a.is_empty() || b.is_empty() {
        return None;
    }
    Some(OptionPair::new(a, b))
}

// What follows a marker, minus the leftover closing `**` of a bold label.
fn option_text(captured: &str) -> &str {
    captured.trim().trim_start_matches('*').trim()
}

fn strict_markup(response: &str) -> Option<Scene> {
    let options = captured_options(&STRICT_OPTIONS, response)?;
    Some(Scene {
        narrative: response.to_string(),
        options,
    })
}

fn relaxed_markup(response: &str) -> Option<Scene> {
    let options = captured_options(&RELAXED_OPTIONS, response)?;
    let first = OPTION_MARKER.find_iter(response).find(|marker| marker.as_str().contains('A'))?;
    let (before, after) = response.split_at(first.start());
    let block = OPTION_MARKER.replace_all(after, "**${1})** ");
    let before = before.trim();
    let narrative = if before.is_empty() {
        block.into_owned()
    } else {
        format!("{before}\n\n{block}")
    };
    Some(Scene { narrative, options })
}

fn fallback(response: &str) -> Scene {
    let paragraphs: Vec<&str> = response.split("\n\n").collect();
    let body = if paragraphs.len() > 1 {
        paragraphs[..paragraphs.len() - 1].join("\n\n")
    } else {
        response.to_string()
    };
    let body = match body.trim() {
        "" => FALLBACK_NARRATIVE,
        trimmed => trimmed,
    };
    let options = OptionPair::new(FALLBACK_OPTION_A, FALLBACK_OPTION_B);
    Scene {
        narrative: format!("{body}\n\n{options}"),
        options,
    }
}
