//! Thread link parsing.
//!
//! Accepts Slack message permalinks of the form
//! `https://<workspace>.slack.com/archives/<channelId>/p<digits>` and the
//! pre-resolved `<channelId>:<ts>` identifier produced by [`ThreadReference`]'s
//! `Display` impl.

use regex::Regex;
use std::sync::LazyLock;

use crate::core::models::ThreadReference;
use crate::errors::DigestError;

static THREAD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[\w.-]+\.slack\.com/archives/(\w+)/p(\d+)$")
        .unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

static THREAD_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9]+)[:/](\d{10}\.\d+)$")
        .unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

/// Number of leading digits in a permalink's `p` segment that form the seconds part.
const TS_SECONDS_DIGITS: usize = 10;

/// True when `text` (after trimming) looks like a Slack message permalink.
#[must_use]
pub fn is_thread_link(text: &str) -> bool {
    THREAD_LINK_RE.is_match(text.trim())
}

/// Parses a permalink or `<channelId>:<ts>` identifier.
///
/// # Examples
///
/// ```
/// use slack_digest::slack::thread_ref::parse_thread_reference;
///
/// let r = parse_thread_reference("https://acme.slack.com/archives/C123/p1700000000000").unwrap();
/// assert_eq!(r.channel_id, "C123");
/// assert_eq!(r.ts, "1700000000.000");
/// ```
///
/// # Errors
///
/// Returns `InvalidReferenceKind` when the input matches neither shape.
pub fn parse_thread_reference(input: &str) -> Result<ThreadReference, DigestError> {
    let trimmed = input.trim();

    if let Some(caps) = THREAD_LINK_RE.captures(trimmed) {
        let digits = &caps[2];
        if digits.len() <= TS_SECONDS_DIGITS {
            return Err(DigestError::InvalidReferenceKind(format!(
                "message timestamp in {trimmed} is too short"
            )));
        }
        let (secs, frac) = digits.split_at(TS_SECONDS_DIGITS);
        return Ok(ThreadReference {
            channel_id: caps[1].to_string(),
            ts: format!("{secs}.{frac}"),
        });
    }

    if let Some(caps) = THREAD_ID_RE.captures(trimmed) {
        return Ok(ThreadReference {
            channel_id: caps[1].to_string(),
            ts: caps[2].to_string(),
        });
    }

    Err(DigestError::InvalidReferenceKind(trimmed.to_string()))
}
