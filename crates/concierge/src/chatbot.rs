//! Text helpers for the chatbot front door.
//!
//! Each helper is a single regex-driven transformation over the user's
//! input. Patterns are compiled once per process.
//!
//! Word, digit and non-word classes are spelled out as ASCII ranges, and word
//! boundaries are ASCII, so that accented letters or non-Latin digits count as
//! punctuation the way a browser's regex engine treats them. Whitespace is
//! the browser's set too: NEL (U+0085) is not whitespace, BOM (U+FEFF) is.

use std::sync::LazyLock;

use regex::Regex;

/// Reply when a phone number has the expected shape.
pub const PHONE_ACCEPTED: &str = "Thanks! You can now download me to your phone.";

/// Prefix of the reply when a phone number is rejected; the input follows it verbatim.
pub const PHONE_REJECTED_PREFIX: &str = "Oops, it seems like I can't reach out to ";

/// Prefix of the greeting returned by [`nice_to_meet_you`].
pub const GREETING_PREFIX: &str = "Nice to meet you, ";

/// ECMAScript `\s`.
const WHITESPACE: &str =
    r"[\t\n\v\f\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]";

static COMMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^chatbot").expect("valid regex"));

// "emoji", optional id, exactly one whitespace character
static EMOJI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i)emoji[0-9]*{WHITESPACE}")).expect("valid regex"));

// e.g. "(+34) 659-771-594"
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "[^0-9A-Za-z_]{{2}}[0-9]{{2}}[^0-9A-Za-z_]{WHITESPACE}\
         [0-9]{{3}}[^0-9A-Za-z_][0-9]{{3}}[^0-9A-Za-z_][0-9]{{3}}"
    ))
    .expect("valid regex")
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)[a-z]+\.[a-z]{2,6}(?-u:\b)").expect("valid regex"));

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("([0-9A-Za-z_]+),{WHITESPACE}([0-9A-Za-z_]+)")).expect("valid regex")
});

/// Whether `command` is addressed to the chatbot, i.e. starts with
/// `chatbot` in any letter case.
///
/// ```
/// use concierge::chatbot::is_valid_command;
///
/// assert!(is_valid_command("Chatbot, play a song from the 80's."));
/// assert!(!is_valid_command("Hey Chatbot, where is the closest pharmacy?"));
/// ```
pub fn is_valid_command(command: &str) -> bool {
    COMMAND_RE.is_match(command)
}

/// Replace every emoji placeholder (`emoji`, an optional numeric id and one
/// whitespace character) with a single space.
///
/// Only the whitespace character directly after the token is consumed, so
/// the space before the token survives and the result keeps a double space
/// where the token was.
pub fn remove_emoji(message: &str) -> String {
    let cleaned = EMOJI_RE.replace_all(message, " ");
    tracing::trace!(
        removed = EMOJI_RE.find_iter(message).count(),
        "stripped emoji placeholders"
    );
    cleaned.into_owned()
}

/// Check that `number` contains a phone number shaped like
/// `(+34) 659-771-594` and answer accordingly.
///
/// The match may appear anywhere in the input.
pub fn check_phone_number(number: &str) -> String {
    if PHONE_RE.is_match(number) {
        PHONE_ACCEPTED.to_string()
    } else {
        format!("{PHONE_REJECTED_PREFIX}{number}")
    }
}

/// Every bare domain (`letters.tld`, TLD of 2 to 6 lowercase letters) in
/// `user_input`, in order of appearance.
///
/// Returns `None` when nothing matches. Matches never overlap, so
/// `www.site.com` yields `www.site`.
pub fn get_url(user_input: &str) -> Option<Vec<&str>> {
    let urls: Vec<&str> = URL_RE.find_iter(user_input).map(|m| m.as_str()).collect();
    tracing::trace!(count = urls.len(), "extracted domains");
    (!urls.is_empty()).then_some(urls)
}

/// Greet a user whose profile stores the name as `Surname, Given`.
///
/// The first `word, word` pair is swapped to `Given Surname`; anything else
/// is greeted as written.
///
/// ```
/// use concierge::chatbot::nice_to_meet_you;
///
/// assert_eq!(nice_to_meet_you("Sanz, Pablo"), "Nice to meet you, Pablo Sanz");
/// ```
pub fn nice_to_meet_you(full_name: &str) -> String {
    let name = NAME_RE.replace(full_name, "${2} ${1}");
    format!("{GREETING_PREFIX}{name}")
}
