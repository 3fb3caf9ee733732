//! Keyword to emoji mapping used to label story options, and the reverse
//! direction used to turn member reactions back into story elements.

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered keyword table. The first keyword found in an option wins, so order matters.
pub const EMOJI_KEYWORDS: &[(&str, &str)] = &[
    // region:  --- Elements & Nature
    ("fire", "🔥"),
    ("water", "💧"),
    ("earth", "🌍"),
    ("air", "💨"),
    ("forest", "🌳"),
    ("tree", "🌲"),
    ("mountain", "⛰️"),
    ("river", "🏞️"),
    ("ocean", "🌊"),
    ("sea", "🐚"),
    ("beach", "🏖️"),
    ("sun", "☀️"),
    ("moon", "🌙"),
    ("star", "⭐"),
    ("sky", "🌌"),
    ("cloud", "☁️"),
    ("rain", "🌧️"),
    ("snow", "❄️"),
    ("lightning", "⚡"),
    ("thunder", "⛈️"),
    // endregion:  --- Elements & Nature

    // region:  --- Movement & Action
    ("run", "🏃"),
    ("walk", "🚶"),
    ("jump", "⬆️"),
    ("climb", "🧗"),
    ("swim", "🏊"),
    ("fly", "✈️"),
    ("hide", "🙈"),
    ("fight", "👊"),
    ("attack", "⚔️"),
    ("defend", "🛡️"),
    ("escape", "🚪"),
    ("retreat", "↩️"),
    ("shoot", "🔫"),
    ("throw", "🤾"),
    ("catch", "🧤"),
    ("build", "🔨"),
    // endregion:  --- Movement & Action

    // region:  --- Directions & Navigation
    ("left", "⬅️"),
    ("right", "➡️"),
    ("up", "⬆️"),
    ("down", "⬇️"),
    ("forward", "⏩"),
    ("backward", "⏪"),
    ("north", "⬆️"),
    ("south", "⬇️"),
    ("east", "➡️"),
    ("west", "⬅️"),
    ("map", "🗺️"),
    ("compass", "🧭"),
    // endregion:  --- Directions & Navigation

    // region:  --- Objects & Tools
    ("key", "🔑"),
    ("lock", "🔒"),
    ("door", "🚪"),
    ("light", "💡"),
    ("book", "📚"),
    ("scroll", "📜"),
    ("potion", "🧪"),
    ("bag", "👝"),
    ("gold", "💰"),
    ("money", "💵"),
    ("treasure", "💎"),
    ("sword", "🗡️"),
    ("weapon", "🔪"),
    ("bow", "🏹"),
    ("shield", "🛡️"),
    ("armor", "🦺"),
    ("wand", "🪄"),
    ("staff", "🪄"),
    ("orb", "🔮"),
    ("crystal", "💎"),
    // endregion:  --- Objects & Tools

    // region:  --- Creatures & Characters
    ("monster", "👹"),
    ("dragon", "🐉"),
    ("ghost", "👻"),
    ("alien", "👽"),
    ("robot", "🤖"),
    ("pirate", "🏴‍☠️"),
    ("knight", "🛡️"),
    ("wizard", "🧙‍♂️"),
    ("warrior", "⚔️"),
    ("beast", "🐺"),
    ("demon", "😈"),
    ("angel", "😇"),
    ("king", "👑"),
    ("queen", "👸"),
    ("prince", "🤴"),
    ("princess", "👸"),
    // endregion:  --- Creatures & Characters

    // region:  --- Emotions & States
    ("happy", "😄"),
    ("sad", "😢"),
    ("angry", "😠"),
    ("scared", "😱"),
    ("calm", "😌"),
    ("confused", "😕"),
    ("love", "❤️"),
    ("hate", "💔"),
    ("sleep", "😴"),
    ("awake", "👁️"),
    ("sick", "🤒"),
    ("heal", "💊"),
    ("alive", "💓"),
    ("dead", "💀"),
    ("poison", "☠️"),
    ("curse", "👿"),
    // endregion:  --- Emotions & States

    // region:  --- Settings & Locations
    ("castle", "🏰"),
    ("village", "🏘️"),
    ("city", "🏙️"),
    ("house", "🏠"),
    ("cave", "🕳️"),
    ("dungeon", "🔐"),
    ("temple", "🏛️"),
    ("tower", "🗼"),
    ("ship", "🚢"),
    ("boat", "⛵"),
    ("plane", "✈️"),
    ("space", "🚀"),
    ("island", "🏝️"),
    ("volcano", "🌋"),
    ("desert", "🏜️"),
    ("jungle", "🌴"),
    // endregion:  --- Settings & Locations

    // region:  --- Time & Weather
    ("day", "🌞"),
    ("night", "🌃"),
    ("dawn", "🌅"),
    ("dusk", "🌇"),
    ("time", "⏰"),
    ("hour", "🕓"),
    ("minute", "⏱️"),
    ("second", "⏲️"),
    ("season", "🍂"),
    ("spring", "🌱"),
    ("summer", "☀️"),
    ("autumn", "🍁"),
    ("winter", "❄️"),
    ("storm", "🌩️"),
    ("fog", "🌫️"),
    ("wind", "🌬️"),
    // endregion:  --- Time & Weather

    // region:  --- Communication & Magic
    ("talk", "💬"),
    ("speak", "🗣️"),
    ("listen", "👂"),
    ("whisper", "🤫"),
    ("shout", "📢"),
    ("spell", "✨"),
    ("magic", "🔮"),
    ("enchant", "🪄"),
    ("bless", "🙏"),
    ("ritual", "📿"),
    ("summon", "🧿"),
    // endregion:  --- Communication & Magic

    // region:  --- Miscellaneous
    ("wait", "⏳"),
    ("hurry", "⚡"),
    ("secret", "🤫"),
    ("open", "📭"),
    ("search", "🔍"),
    ("find", "🔎"),
    ("steal", "🥷"),
    ("give", "🎁"),
    ("yes", "✅"),
    ("no", "❌"),
    ("maybe", "❓"),
    ("help", "🆘"),
    ("danger", "⚠️"),
    ("safe", "🔒"),
    ("trap", "⚠️"),
    ("trick", "🎭"),
    // endregion:  --- Miscellaneous
];

/// Markers used whenever the two options cannot be told apart by keyword.
pub const DEFAULT_EMOJIS: (&str, &str) = ("🅰️", "🅱️");

pub const UNKNOWN_ELEMENT: &str = "mysterious element";

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("valid word regex"));
static CUSTOM_EMOJI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<a?:([A-Za-z0-9_~]+):\d+>$").expect("valid custom emoji regex"));

/// Emoji for a single option text, if any keyword applies.
///
/// Substring match over the whole lower-cased text first, then exact match per word.
pub fn emoji_for(option: &str) -> Option<&'static str> {
    let lower = option.to_lowercase();
    EMOJI_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, emoji)| *emoji)
        .or_else(|| {
            WORD.find_iter(&lower).find_map(|word| {
                EMOJI_KEYWORDS
                    .iter()
                    .find(|(keyword, _)| *keyword == word.as_str())
                    .map(|(_, emoji)| *emoji)
            })
        })
}

/// Pick the two marker emojis for an option pair. The result is always two distinct emojis.
pub fn marker_emojis(option_a: &str, option_b: &str) -> (&'static str, &'static str) {
    let mut emoji_a = emoji_for(option_a);
    let mut emoji_b = emoji_for(option_b);

    if !distinct(emoji_a, emoji_b) {
        let a = option_a.to_lowercase();
        let b = option_b.to_lowercase();

        if a.contains("axe") || a.contains("weapon") {
            emoji_a = Some("🪓");
        } else if a.contains("grab") || a.contains("take") {
            emoji_a = Some("👊");
        } else if a.contains("door") {
            emoji_a = Some("🚪");
        } else if a.contains("window") {
            emoji_a = Some("🪟");
        }

        if b.contains("cable") || b.contains("wire") {
            emoji_b = Some("⚡");
        } else if b.contains("door") {
            emoji_b = Some("🚪");
        } else if b.contains("barricade") || b.contains("block") {
            emoji_b = Some("🛑");
        }
    }

    match (emoji_a, emoji_b) {
        (Some(a), Some(b)) if distinct(Some(a), Some(b)) => (a, b),
        _ => DEFAULT_EMOJIS,
    }
}

fn distinct(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => !same_emoji(a, b),
        _ => false,
    }
}

/// Compares two emojis ignoring the U+FE0F variation selector, which chat
/// platforms add or drop inconsistently.
pub fn same_emoji(a: &str, b: &str) -> bool {
    strip_variation(a) == strip_variation(b)
}

fn strip_variation(emoji: &str) -> String {
    emoji.chars().filter(|c| *c != '\u{FE0F}').collect()
}

/// Short phrase describing what a reaction brings to the story.
///
/// Never fails: anything unrecognised becomes a "mysterious element".
pub fn describe(emoji: &str) -> String {
    let emoji = emoji.trim();
    if emoji.is_empty() {
        return UNKNOWN_ELEMENT.to_string();
    }

    if let Some(keyword) = keyword_for(emoji) {
        return keyword.to_string();
    }

    if let Some(captures) = CUSTOM_EMOJI.captures(emoji) {
        return humanize(&captures[1]);
    }

    if let Some(name) = character_name(emoji) {
        return simplify_name(name);
    }

    if let Some(description) = common_symbol(emoji) {
        return description.to_string();
    }

    emoji
        .chars()
        .next()
        .and_then(category_of)
        .unwrap_or(UNKNOWN_ELEMENT)
        .to_string()
}

fn keyword_for(emoji: &str) -> Option<&'static str> {
    EMOJI_KEYWORDS
        .iter()
        .find(|(_, candidate)| same_emoji(candidate, emoji))
        .map(|(keyword, _)| *keyword)
}

// "dancing_SkeletonParty" -> "dancing skeleton party"
fn humanize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch == '~' {
            out.push(' ');
            previous_lower = false;
            continue;
        }
        if ch.is_uppercase() && previous_lower {
            out.push(' ');
        }
        previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        out.extend(ch.to_lowercase());
    }
    let words: Vec<&str> = out.split_whitespace().collect();
    if words.is_empty() {
        UNKNOWN_ELEMENT.to_string()
    } else {
        words.join(" ")
    }
}

// Bundled subset of Unicode character names for reactions people actually use.
const CHARACTER_NAMES: &[(&str, &str)] = &[
    ("😀", "grinning face"),
    ("😃", "grinning face with big eyes"),
    ("😁", "beaming face with smiling eyes"),
    ("😆", "grinning squinting face"),
    ("😅", "grinning face with sweat"),
    ("🤣", "rolling on the floor laughing"),
    ("😂", "face with tears of joy"),
    ("🙂", "slightly smiling face"),
    ("😉", "winking face"),
    ("😊", "smiling face with smiling eyes"),
    ("🥰", "smiling face with hearts"),
    ("😍", "smiling face with heart eyes"),
    ("🤩", "star struck"),
    ("😘", "face blowing a kiss"),
    ("😋", "face savoring food"),
    ("😜", "winking face with tongue"),
    ("🤪", "zany face"),
    ("🤔", "thinking face"),
    ("🤨", "face with raised eyebrow"),
    ("😐", "neutral face"),
    ("😑", "expressionless face"),
    ("😶", "face without mouth"),
    ("😏", "smirking face"),
    ("😒", "unamused face"),
    ("🙄", "face with rolling eyes"),
    ("😬", "grimacing face"),
    ("🤥", "lying face"),
    ("😔", "pensive face"),
    ("😪", "sleepy face"),
    ("🤤", "drooling face"),
    ("😷", "face with medical mask"),
    ("🤢", "nauseated face"),
    ("🤮", "face vomiting"),
    ("🥵", "hot face"),
    ("🥶", "cold face"),
    ("😵", "dizzy face"),
    ("🤯", "exploding head"),
    ("🤠", "cowboy hat face"),
    ("🥳", "partying face"),
    ("😎", "smiling face with sunglasses"),
    ("🤓", "nerd face"),
    ("🧐", "face with monocle"),
    ("😟", "worried face"),
    ("🙁", "slightly frowning face"),
    ("😮", "face with open mouth"),
    ("😯", "hushed face"),
    ("😲", "astonished face"),
    ("😳", "flushed face"),
    ("🥺", "pleading face"),
    ("😦", "frowning face with open mouth"),
    ("😨", "fearful face"),
    ("😰", "anxious face with sweat"),
    ("😥", "sad but relieved face"),
    ("😭", "loudly crying face"),
    ("😖", "confounded face"),
    ("😣", "persevering face"),
    ("😞", "disappointed face"),
    ("😓", "downcast face with sweat"),
    ("😩", "weary face"),
    ("😫", "tired face"),
    ("🥱", "yawning face"),
    ("😤", "face with steam from nose"),
    ("😡", "pouting face"),
    ("🤬", "face with symbols on mouth"),
    ("🤡", "clown face"),
    ("💩", "pile of poo"),
    ("🙀", "weary cat face"),
    ("🐱", "cat face"),
    ("🐶", "dog face"),
    ("🦊", "fox face"),
    ("🐸", "frog face"),
    ("🐍", "snake"),
    ("🕷️", "spider"),
    ("🦇", "bat"),
    ("🐀", "rat"),
    ("🦉", "owl"),
    ("🐙", "octopus"),
    ("🦈", "shark"),
    ("🌹", "rose"),
    ("🍄", "mushroom"),
    ("🍷", "wine glass"),
    ("🍺", "beer mug"),
    ("🕯️", "candle"),
    ("⚰️", "coffin"),
    ("🪦", "headstone"),
    ("🎃", "jack o lantern"),
    ("🧟", "zombie"),
    ("🧛", "vampire"),
    ("🧜", "merperson"),
    ("🧚", "fairy"),
    ("🦄", "unicorn"),
    ("🎲", "game die"),
    ("🃏", "joker"),
    ("🪤", "mouse trap"),
    ("🧨", "firecracker"),
    ("💣", "bomb"),
    ("🩸", "drop of blood"),
];

fn character_name(emoji: &str) -> Option<&'static str> {
    CHARACTER_NAMES
        .iter()
        .find(|(candidate, _)| same_emoji(candidate, emoji))
        .map(|(_, name)| *name)
}

// Facial expressions collapse into a handful of emotions.
const EMOTIONS: &[(&str, &str)] = &[
    ("tears of joy", "laughter"),
    ("laughing", "laughter"),
    ("heart", "affection"),
    ("kiss", "affection"),
    ("crying", "sorrow"),
    ("sad", "sorrow"),
    ("pensive", "sorrow"),
    ("disappointed", "sorrow"),
    ("fearful", "fear"),
    ("anxious", "fear"),
    ("worried", "fear"),
    ("pouting", "anger"),
    ("steam", "anger"),
    ("symbols on mouth", "anger"),
    ("astonished", "surprise"),
    ("open mouth", "surprise"),
    ("hushed", "surprise"),
    ("exploding", "surprise"),
    ("thinking", "curiosity"),
    ("monocle", "curiosity"),
    ("raised eyebrow", "suspicion"),
    ("smirking", "mischief"),
    ("winking", "mischief"),
    ("zany", "mischief"),
    ("lying", "deception"),
    ("sleepy", "exhaustion"),
    ("tired", "exhaustion"),
    ("weary", "exhaustion"),
    ("yawning", "exhaustion"),
    ("nauseated", "sickness"),
    ("vomiting", "sickness"),
    ("medical mask", "sickness"),
    ("partying", "celebration"),
    ("grinning", "joy"),
    ("smiling", "joy"),
    ("beaming", "joy"),
];

fn simplify_name(name: &str) -> String {
    if let Some((_, emotion)) = EMOTIONS.iter().find(|(fragment, _)| name.contains(fragment)) {
        return emotion.to_string();
    }

    let mut trimmed = name;
    for suffix in [" emoji", " face"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            trimmed = stripped;
        }
    }
    let trimmed = trimmed.trim();
    if trimmed.is_empty() {
        UNKNOWN_ELEMENT.to_string()
    } else {
        trimmed.to_string()
    }
}

// Popular reactions that are not story keywords and have no useful character name.
const COMMON_SYMBOLS: &[(&str, &str)] = &[
    ("👍", "approval"),
    ("👎", "disapproval"),
    ("👏", "applause"),
    ("🙌", "celebration"),
    ("🎉", "celebration"),
    ("🎊", "festivities"),
    ("💯", "total commitment"),
    ("👀", "watchful eyes"),
    ("💪", "strength"),
    ("🤝", "an alliance"),
    ("🤞", "hope"),
    ("✌️", "peace"),
    ("👋", "a greeting"),
    ("🫡", "loyalty"),
    ("🍀", "luck"),
    ("🌈", "a rainbow"),
    ("🍕", "a feast"),
    ("🍖", "a feast"),
    ("🍎", "an apple"),
    ("☕", "a warm drink"),
    ("🎵", "music"),
    ("🎶", "music"),
    ("💤", "slumber"),
    ("💥", "an explosion"),
    ("💫", "dizziness"),
    ("💦", "splashing water"),
    ("🔔", "a ringing bell"),
    ("🕸️", "cobwebs"),
    ("🏆", "victory"),
    ("🥇", "victory"),
];

fn common_symbol(emoji: &str) -> Option<&'static str> {
    COMMON_SYMBOLS
        .iter()
        .find(|(candidate, _)| same_emoji(candidate, emoji))
        .map(|(_, description)| *description)
}

fn category_of(first: char) -> Option<&'static str> {
    let description = match u32::from(first) {
        0x1F1E6..=0x1F1FF => "a distant land",
        0x1F32D..=0x1F37F => "something to eat",
        0x1F400..=0x1F4FF if is_creature(first) => "a wild creature",
        0x1F300..=0x1F5FF => "a curious object",
        0x1F600..=0x1F64F => "a strong emotion",
        0x1F680..=0x1F6FF => "a journey",
        0x1F900..=0x1F9FF => "a strange presence",
        0x2600..=0x26FF => "a mystical symbol",
        0x2700..=0x27BF => "a strange sign",
        _ => return None,
    };
    Some(description)
}

fn is_creature(ch: char) -> bool {
    matches!(u32::from(ch), 0x1F400..=0x1F43F)
}
