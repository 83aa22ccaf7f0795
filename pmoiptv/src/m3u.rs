//! Extended M3U playlist parsing
//!
//! A playlist pairs each `#EXTINF:` directive with the next non-blank line,
//! which holds the stream endpoint:
//!
//! ```text
//! #EXTM3U
//! #EXTINF:-1 group-title="News" tvg-name="ERT 1" tvg-logo="https://i.imgur.com/x.png",ERT1 HD
//! https://ert.example/ert_1/playlist.m3u8
//! ```
//!
//! Attributes are looked up one by one on the directive line rather than
//! through a strict grammar: a missing or malformed attribute only leaves that
//! field at its default.

use crate::error::{Error, Result};
use crate::models::{ChannelRecord, UNKNOWN_CHANNEL_NAME, UNKNOWN_GROUP};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Marker opening a directive line
pub const DIRECTIVE_MARKER: &str = "#EXTINF:";

/// Duration value meaning "no meaningful duration"
const NO_DURATION: f64 = -1.0;

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#EXTINF:([^,\s]+)").expect("valid duration regex"));
static GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"group-title="([^"]+)""#).expect("valid group-title regex"));
static TVG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"tvg-name="([^"]+)""#).expect("valid tvg-name regex"));
static LOGO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"tvg-logo="([^"]+)""#).expect("valid tvg-logo regex"));
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",([^,]+)$").expect("valid name regex"));
static LEADING_FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid float regex")
});

/// Parse a whole playlist into channels, in source order
///
/// Blank lines are removed before pairing, so the endpoint of a directive is
/// the next non-blank line. A directive not followed by an endpoint (end of
/// input, or another `#` line) is dropped silently.
pub fn parse_playlist(content: &str) -> Vec<ChannelRecord> {
    let lines: Vec<&str> = content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut channels = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if is_directive(line) {
            if let Some(url) = lines.get(i + 1).filter(|next| !next.starts_with('#')) {
                match parse_extinf(line, url) {
                    Ok(channel) => channels.push(channel),
                    Err(e) => warn!(directive = %line, "Skipping playlist entry: {}", e),
                }
                // The endpoint line is consumed with its directive
                i += 1;
            }
        }

        i += 1;
    }

    channels
}

/// `true` for a directive line
pub fn is_directive(line: &str) -> bool {
    line.starts_with(DIRECTIVE_MARKER)
}

/// Build one channel from a directive line and its endpoint line
pub fn parse_extinf(directive: &str, url: &str) -> Result<ChannelRecord> {
    let directive = directive.trim();
    if !is_directive(directive) {
        return Err(Error::InvalidDirective(directive.to_string()));
    }

    let url = url.trim();
    if url.is_empty() {
        return Err(Error::InvalidDirective(format!(
            "{} (missing endpoint)",
            directive
        )));
    }

    let duration = capture(&DURATION_RE, directive)
        .and_then(parse_leading_float)
        .filter(|d| *d != NO_DURATION);

    let name = capture(&NAME_RE, directive)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_CHANNEL_NAME);

    Ok(ChannelRecord {
        name: name.to_string(),
        url: url.to_string(),
        logo: capture(&LOGO_RE, directive).map(str::to_string),
        group: capture(&GROUP_RE, directive)
            .unwrap_or(UNKNOWN_GROUP)
            .to_string(),
        tvg_name: capture(&TVG_NAME_RE, directive).map(str::to_string),
        duration,
    })
}

fn capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Read the numeric prefix of a token (`"900"`, `"-1"`, `"10.5s"`)
fn parse_leading_float(token: &str) -> Option<f64> {
    LEADING_FLOAT_RE
        .find(token)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"#EXTM3U
#EXTINF:-1 group-title="ΠΑΝΕΛΛΑΔΙΚΑ" tvg-name="ERT 1" tvg-logo="https://i.imgur.com/Dd3HM0I.png",ERT1 HD
http://ert-live-bcbs15228.siliconweb.com/media/ert_1/ert_1_3Mbps.m3u8
#EXTINF:-1 group-title="ΠΑΝΕΛΛΑΔΙΚΑ" tvg-name="ERT 2" tvg-logo="https://i.imgur.com/cpzgu5L.png",ERT2 HD
http://ert-live-bcbs15228.siliconweb.com/media/ert_2/ert_2_3Mbps.m3u8
#EXTINF:900 group-title="ΠΑΝΕΛΛΑΔΙΚΑ" tvg-name="megatv.com" tvg-logo="https://i.imgur.com/yyp6tS5.png",MEGA HD
https://streamcdnm17-c98db5952cb54b358365984178fb898a.msvdn.net/live/S86713049/gonOwuUacAxM/playlist.m3u8"#;

    #[test]
    fn test_parse_sample_playlist() {
        let channels = parse_playlist(SAMPLE);
        assert_eq!(channels.len(), 3);

        let ert1 = &channels[0];
        assert_eq!(ert1.name, "ERT1 HD");
        assert_eq!(ert1.group, "ΠΑΝΕΛΛΑΔΙΚΑ");
        assert_eq!(ert1.tvg_name.as_deref(), Some("ERT 1"));
        assert_eq!(ert1.logo.as_deref(), Some("https://i.imgur.com/Dd3HM0I.png"));
        assert_eq!(ert1.duration, None);
        assert_eq!(
            ert1.url,
            "http://ert-live-bcbs15228.siliconweb.com/media/ert_1/ert_1_3Mbps.m3u8"
        );

        let mega = &channels[2];
        assert_eq!(mega.name, "MEGA HD");
        assert_eq!(mega.duration, Some(900.0));
        assert_eq!(mega.tvg_name.as_deref(), Some("megatv.com"));
    }

    #[test]
    fn test_duration_sentinel_is_absent() {
        let channel = parse_extinf("#EXTINF:-1,Foo", "https://foo").unwrap();
        assert_eq!(channel.duration, None);

        let channel = parse_extinf("#EXTINF:0,Foo", "https://foo").unwrap();
        assert_eq!(channel.duration, Some(0.0));

        let channel = parse_extinf("#EXTINF:-2.5,Foo", "https://foo").unwrap();
        assert_eq!(channel.duration, Some(-2.5));
    }

    #[test]
    fn test_unparseable_duration_is_absent() {
        let channel = parse_extinf("#EXTINF:abc,Foo", "https://foo").unwrap();
        assert_eq!(channel.duration, None);
        assert_eq!(channel.name, "Foo");
    }

    #[test]
    fn test_missing_attributes_fall_back() {
        let channel = parse_extinf("#EXTINF:-1", "https://foo").unwrap();
        assert_eq!(channel.name, UNKNOWN_CHANNEL_NAME);
        assert_eq!(channel.group, UNKNOWN_GROUP);
        assert_eq!(channel.logo, None);
        assert_eq!(channel.tvg_name, None);
    }

    #[test]
    fn test_malformed_attribute_only_affects_its_field() {
        // Unterminated group-title quote, empty tvg-name
        let channel = parse_extinf(
            r#"#EXTINF:-1 group-title="News tvg-name="" tvg-logo="https://logo",Alpha"#,
            "https://alpha",
        )
        .unwrap();

        assert_eq!(channel.name, "Alpha");
        assert_eq!(channel.logo.as_deref(), Some("https://logo"));
        assert_eq!(channel.tvg_name, None);
    }

    #[test]
    fn test_name_is_text_after_last_comma() {
        let channel = parse_extinf(
            r#"#EXTINF:-1 tvg-name="A, B",First, Second ,  Final Name  "#,
            "https://x",
        )
        .unwrap();
        assert_eq!(channel.name, "Final Name");
    }

    #[test]
    fn test_trailing_comma_gives_sentinel_name() {
        let channel = parse_extinf("#EXTINF:-1 group-title=\"G\",", "https://x").unwrap();
        assert_eq!(channel.name, UNKNOWN_CHANNEL_NAME);
        assert_eq!(channel.group, "G");
    }

    #[test]
    fn test_dangling_directive_at_end_is_dropped() {
        let channels = parse_playlist("#EXTINF:-1,A\nhttps://a\n#EXTINF:-1,B\n");
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].name, "A");
    }

    #[test]
    fn test_consecutive_directives_drop_the_first() {
        let channels = parse_playlist("#EXTINF:-1,A\n#EXTINF:-1,B\nhttps://b\n#EXTINF:-1,C\nhttps://c");
        let names: Vec<_> = channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["B", "C"]);
        assert_eq!(channels[0].url, "https://b");
    }

    #[test]
    fn test_blank_lines_are_removed_before_pairing() {
        let channels = parse_playlist("#EXTINF:-1,A\n\n   \r\n  https://a  \r\n");
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].url, "https://a");
    }

    #[test]
    fn test_tag_line_between_directive_and_endpoint() {
        let channels = parse_playlist("#EXTINF:-1,A\n#EXTVLCOPT:http-referrer=x\nhttps://a\n#EXTINF:-1,B\nhttps://b");
        let names: Vec<_> = channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["B"]);
    }

    #[test]
    fn test_no_deduplication() {
        let channels = parse_playlist("#EXTINF:-1,A\nhttps://a\n#EXTINF:-1,A\nhttps://a");
        assert_eq!(channels.len(), 2);
    }

    #[test]
    fn test_empty_or_garbage_input() {
        assert!(parse_playlist("").is_empty());
        assert!(parse_playlist("\n\n").is_empty());
        assert!(parse_playlist("<html>Not found</html>").is_empty());
    }

    #[test]
    fn test_declared_fields_round_trip() {
        let directive = format!(
            r#"{}{} group-title="{}" tvg-name="{}" tvg-logo="{}",{}"#,
            DIRECTIVE_MARKER, 42, "Sports", "Sport 1", "https://logo/1.png", "Sport One"
        );
        let channel = parse_extinf(&directive, "  https://sport/1.m3u8 ").unwrap();

        assert_eq!(channel.duration, Some(42.0));
        assert_eq!(channel.group, "Sports");
        assert_eq!(channel.tvg_name.as_deref(), Some("Sport 1"));
        assert_eq!(channel.logo.as_deref(), Some("https://logo/1.png"));
        assert_eq!(channel.name, "Sport One");
        assert_eq!(channel.url, "https://sport/1.m3u8");
    }

    #[test]
    fn test_parse_extinf_rejects_non_directive() {
        assert!(matches!(
            parse_extinf("#EXTM3U", "https://x"),
            Err(Error::InvalidDirective(_))
        ));
        assert!(parse_extinf("#EXTINF:-1,A", "   ").is_err());
    }
}
