// Counting the reactions on a story segment once the vote closes.
use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::IteratorRandom;
use strum::IntoEnumIterator;

use crate::emoji::{describe, same_emoji};
use crate::narrative::Choice;
use crate::platform::{MemberId, Reaction};
use crate::prompts::StoryElement;

/// Reactions on one segment, split into the two votes and everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub voters_a: BTreeSet<MemberId>,
    pub voters_b: BTreeSet<MemberId>,
    /// Non-marker reactions, each with the members who used it.
    pub custom: BTreeMap<String, BTreeSet<MemberId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nobody reacted at all; the story ends.
    Abandoned,
    /// Someone voted for A or B.
    Decided(Choice),
    /// Only custom reactions, so a branch was picked at random.
    Neutral(Choice),
}

impl Verdict {
    pub fn choice(&self) -> Option<Choice> {
        match self {
            Verdict::Abandoned => None,
            Verdict::Decided(choice) | Verdict::Neutral(choice) => Some(*choice),
        }
    }
}

impl Tally {
    pub fn from_reactions(
        reactions: &[Reaction],
        emoji_a: &str,
        emoji_b: &str,
        bot: &MemberId,
    ) -> Self {
        let mut tally = Tally::default();
        for reaction in reactions {
            let users = reaction.users.iter().filter(|user| *user != bot).cloned();
            if same_emoji(&reaction.emoji, emoji_a) {
                tally.voters_a.extend(users);
            } else if same_emoji(&reaction.emoji, emoji_b) {
                tally.voters_b.extend(users);
            } else {
                let users: BTreeSet<MemberId> = users.collect();
                if !users.is_empty() {
                    tally
                        .custom
                        .entry(reaction.emoji.clone())
                        .or_default()
                        .extend(users);
                }
            }
        }
        tally
    }

    pub fn total_interactions(&self) -> usize {
        self.voters_a.len()
            + self.voters_b.len()
            + self.custom.values().map(BTreeSet::len).sum::<usize>()
    }

    /// A wins only with strictly more voters; a tie goes to B.
    pub fn verdict<R: Rng + ?Sized>(&self, rng: &mut R) -> Verdict {
        if self.total_interactions() == 0 {
            return Verdict::Abandoned;
        }
        if self.voters_a.is_empty() && self.voters_b.is_empty() {
            let choice = Choice::iter().choose(rng).unwrap_or(Choice::B);
            return Verdict::Neutral(choice);
        }
        if self.voters_a.len() > self.voters_b.len() {
            Verdict::Decided(Choice::A)
        } else {
            Verdict::Decided(Choice::B)
        }
    }

    /// Members who earn karma for this verdict.
    pub fn winners(&self, verdict: Verdict) -> &BTreeSet<MemberId> {
        static NOBODY: BTreeSet<MemberId> = BTreeSet::new();
        match verdict {
            Verdict::Decided(Choice::A) => &self.voters_a,
            Verdict::Decided(Choice::B) => &self.voters_b,
            Verdict::Neutral(_) | Verdict::Abandoned => &NOBODY,
        }
    }

    /// Custom reactions as prompt-ready story elements, ordered by emoji.
    pub fn elements(&self) -> Vec<StoryElement> {
        self.custom
            .iter()
            .map(|(emoji, users)| StoryElement {
                description: describe(emoji),
                count: users.len(),
            })
            .collect()
    }
}
