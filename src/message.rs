// Splitting long story text into pieces that fit the chat platform's message limit.
use std::ops::Range;

/// Discord's limit, and the default for every platform.
pub const MESSAGE_LIMIT: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Boundary {
    Word,
    Sentence,
    Paragraph,
}

// A run of whitespace that could separate two chunks.
#[derive(Debug, Clone, Copy)]
struct Gap {
    start: usize,
    end: usize,
    boundary: Boundary,
}

/// Split `text` into chunks of at most `limit` characters.
///
/// Prefers blank-line paragraph breaks, then sentence ends, then spaces.
/// A single word longer than `limit` is cut where it must be.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    chunk_spans(text, limit)
        .into_iter()
        .map(|span| text[span].to_string())
        .collect()
}

/// Byte ranges of each chunk. Whatever lies between two consecutive ranges is
/// the whitespace dropped at that break, so the ranges plus the gaps cover
/// the whole input.
pub fn chunk_spans(text: &str, limit: usize) -> Vec<Range<usize>> {
    let limit = limit.max(1);
    let mut spans = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let rest = &text[start..];
        let Some((window, _)) = rest.char_indices().nth(limit) else {
            spans.push(start..text.len());
            break;
        };
        let window_end = start + window;

        match best_gap(text, start, window_end) {
            Some(gap) => {
                spans.push(start..gap.start);
                start = gap.end;
            }
            None => {
                spans.push(start..window_end);
                start = window_end;
            }
        }
    }

    spans
}

// Last gap of the strongest boundary kind that leaves a non-empty chunk no
// longer than the window and does not swallow the rest of the text.
fn best_gap(text: &str, start: usize, window_end: usize) -> Option<Gap> {
    let mut best: Option<Gap> = None;
    for gap in gaps(text, start, window_end) {
        if gap.start == start || gap.end == text.len() {
            continue;
        }
        best = match best {
            Some(current) if current.boundary > gap.boundary => Some(current),
            _ => Some(gap),
        };
    }
    best
}

// Gaps starting at or before `until`.
fn gaps(text: &str, from: usize, until: usize) -> Vec<Gap> {
    let mut gaps = Vec::new();
    let mut previous: Option<char> = None;
    let mut open: Option<(usize, Option<char>)> = None;

    for (index, ch) in text[from..].char_indices() {
        let index = from + index;
        if open.is_none() && index > until {
            return gaps;
        }
        if ch.is_whitespace() {
            if open.is_none() {
                open = Some((index, previous));
            }
        } else if let Some((gap_start, before)) = open.take() {
            gaps.push(classify(text, gap_start, index, before));
        }
        previous = Some(ch);
    }
    if let Some((gap_start, before)) = open {
        gaps.push(classify(text, gap_start, text.len(), before));
    }
    gaps
}

fn classify(text: &str, start: usize, end: usize, before: Option<char>) -> Gap {
    let run = &text[start..end];
    let boundary = if run.contains("\n\n") {
        Boundary::Paragraph
    } else if run.contains('\n') || matches!(before, Some('.' | '!' | '?')) {
        Boundary::Sentence
    } else {
        Boundary::Word
    };
    Gap {
        start,
        end,
        boundary,
    }
}
