//! Bracket grammars shared by discovery and substitution
//!
//! A placeholder is written in one of three bracket shapes. The order of
//! [`Bracket::ALL`] is the priority order: double brace, square bracket,
//! single brace. Discovery scans the shapes in this order and substitution
//! prefers the double-brace form when several shapes start at one position.

use once_cell::sync::Lazy;
use regex::Regex;

static DOUBLE_BRACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("double brace grammar"));
static SQUARE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]").expect("square bracket grammar"));
static SINGLE_BRACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}]+)\}").expect("single brace grammar"));
static MARKUP_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("markup tag"));

/// One of the three supported placeholder shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bracket {
    /// `{{key}}`
    DoubleBrace,
    /// `[key]`
    Square,
    /// `{key}`
    SingleBrace,
}

impl Bracket {
    /// All shapes in priority order
    pub const ALL: [Bracket; 3] = [Bracket::DoubleBrace, Bracket::Square, Bracket::SingleBrace];

    pub fn open(self) -> &'static str {
        match self {
            Bracket::DoubleBrace => "{{",
            Bracket::Square => "[",
            Bracket::SingleBrace => "{",
        }
    }

    pub fn close(self) -> &'static str {
        match self {
            Bracket::DoubleBrace => "}}",
            Bracket::Square => "]",
            Bracket::SingleBrace => "}",
        }
    }

    /// Write `key` in this shape, e.g. `{{key}}`
    pub fn wrap(self, key: &str) -> String {
        format!("{}{}{}", self.open(), key, self.close())
    }

    /// Discovery pattern: the capture is any run without the closing character
    pub(crate) fn discovery_regex(self) -> &'static Regex {
        match self {
            Bracket::DoubleBrace => &DOUBLE_BRACE_RE,
            Bracket::Square => &SQUARE_RE,
            Bracket::SingleBrace => &SINGLE_BRACE_RE,
        }
    }

    /// Pattern for a token of this shape whose delimiters may be separated
    /// from the (already escaped) key by intervening markup.
    ///
    /// The filler on either side of the key never crosses the shape's closing
    /// character. Single-brace fillers cross no brace at all, so a span never
    /// reaches from one unrelated `{...}` to another.
    pub(crate) fn split_pattern(self, escaped_key: &str) -> String {
        match self {
            Bracket::DoubleBrace => format!(r"\{{\{{[^}}]*?{escaped_key}[^}}]*?\}}\}}"),
            Bracket::Square => format!(r"\[[^\]]*?{escaped_key}[^\]]*?\]"),
            Bracket::SingleBrace => format!(r"\{{[^{{}}]*?{escaped_key}[^{{}}]*?\}}"),
        }
    }
}

/// Regex recognizing the literal forms `{{k}}`, `[k]` and `{k}` for every key
/// in `keys`, in one pass.
///
/// Capture groups 1, 2 and 3 hold the key for the double-brace, square and
/// single-brace alternatives. Returns `None` when there are no keys, since an
/// empty alternation would match bare `{{}}`.
pub(crate) fn exact_token_regex<'a, I>(keys: I) -> Option<Regex>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut keys: Vec<&str> = keys.into_iter().filter(|k| !k.is_empty()).collect();
    if keys.is_empty() {
        return None;
    }
    // Longer keys first so that a key that prefixes another never shadows it
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    keys.dedup();

    let alternation = keys
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"\{{\{{({alternation})\}}\}}|\[({alternation})\]|\{{({alternation})\}}");

    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Failed to build combined placeholder pattern: {}", e);
            None
        }
    }
}

/// The key captured by a match of [`exact_token_regex`], with its shape
pub(crate) fn exact_capture<'t>(caps: &regex::Captures<'t>) -> Option<(Bracket, &'t str)> {
    Bracket::ALL
        .iter()
        .enumerate()
        .find_map(|(i, bracket)| caps.get(i + 1).map(|m| (*bracket, m.as_str())))
}

/// Remove every markup tag (`<...>`) from `text`
pub fn strip_markup(text: &str) -> String {
    MARKUP_TAG_RE.replace_all(text, "").into_owned()
}

/// Escape the five XML reserved characters
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text the way it is serialized inside an element's character data
///
/// Word leaves quotes alone in `w:t` content, so only `&`, `<` and `>` are
/// turned into entities.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(Bracket::DoubleBrace.wrap("name"), "{{name}}");
        assert_eq!(Bracket::Square.wrap("name"), "[name]");
        assert_eq!(Bracket::SingleBrace.wrap("name"), "{name}");
    }

    #[test]
    fn test_escape_xml_all_reserved() {
        assert_eq!(
            escape_xml(r#"O'Brien & Co. <"x">"#),
            "O&apos;Brien &amp; Co. &lt;&quot;x&quot;&gt;"
        );
    }

    #[test]
    fn test_escape_text_keeps_quotes() {
        assert_eq!(escape_text(r#"A & "B""#), r#"A &amp; "B""#);
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("{{</w:t></w:r><w:r><w:t>name}}"),
            "{{name}}"
        );
    }

    #[test]
    fn test_exact_token_regex_prefers_double_brace() {
        let re = exact_token_regex(["x"]).unwrap();
        let m = re.captures("{{x}}").unwrap();
        assert_eq!(m.get(0).unwrap().as_str(), "{{x}}");
        assert_eq!(exact_capture(&m), Some((Bracket::DoubleBrace, "x")));
    }

    #[test]
    fn test_exact_token_regex_escapes_metacharacters() {
        let re = exact_token_regex(["a.b"]).unwrap();
        assert!(re.is_match("{{a.b}}"));
        assert!(!re.is_match("{{axb}}"));
    }

    #[test]
    fn test_exact_token_regex_prefix_keys() {
        let re = exact_token_regex(["a", "ab"]).unwrap();
        let caps = re.captures("[ab]").unwrap();
        assert_eq!(exact_capture(&caps), Some((Bracket::Square, "ab")));
    }

    #[test]
    fn test_exact_token_regex_no_keys() {
        assert!(exact_token_regex(Vec::<&str>::new()).is_none());
        assert!(exact_token_regex([""]).is_none());
    }

    #[test]
    fn test_split_pattern_matches_across_markup() {
        let re = Regex::new(&Bracket::DoubleBrace.split_pattern("name")).unwrap();
        let xml = "<w:t>{{</w:t></w:r><w:r><w:t>name}}</w:t>";
        assert_eq!(
            re.find(xml).unwrap().as_str(),
            "{{</w:t></w:r><w:r><w:t>name}}"
        );
    }

    #[test]
    fn test_single_brace_split_pattern_stays_between_braces() {
        let re = Regex::new(&Bracket::SingleBrace.split_pattern("name")).unwrap();
        assert!(re.find("{a} your name {b}").is_none());
        assert_eq!(
            re.find("{a} {</w:t><w:t>name}").unwrap().as_str(),
            "{</w:t><w:t>name}"
        );
    }
}
