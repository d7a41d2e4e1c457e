use regex::Regex;
use std::sync::OnceLock;

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // A single fenced block wrapping the whole payload, optionally tagged `json`.
        Regex::new(r"(?s)\A```[A-Za-z]*[ \t]*\r?\n(.*?)\r?\n?```\z").expect("valid code fence regex")
    })
}

/// Drops the decorative part of an option label ("Romantic ❤️" -> "Romantic").
///
/// The decoration is everything after the first space.
pub fn strip_decorative_suffix(label: &str) -> &str {
    let trimmed = label.trim();
    trimmed.split(' ').next().unwrap_or(trimmed)
}

/// Cleans raw model text before it is parsed as JSON.
pub fn filter_structured_output(text: &str) -> String {
    let trimmed = text.trim();
    match code_fence_re().captures(trimmed) {
        Some(caps) => caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        None => trimmed.to_string(),
    }
}

pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_emoji_suffix() {
        assert_eq!(strip_decorative_suffix("Romantic ❤️"), "Romantic");
        assert_eq!(strip_decorative_suffix("At-home 🏠"), "At-home");
        assert_eq!(strip_decorative_suffix("Cheap"), "Cheap");
        assert_eq!(strip_decorative_suffix("  Free 💰 "), "Free");
    }

    #[test]
    fn structured_output_is_trimmed() {
        assert_eq!(filter_structured_output("\n  {\"a\":1}  \n"), "{\"a\":1}");
    }

    #[test]
    fn structured_output_unwraps_one_fence() {
        let fenced = "```json\n{\"messages\":[]}\n```";
        assert_eq!(filter_structured_output(fenced), "{\"messages\":[]}");
        let bare = "```\n[1]\n```";
        assert_eq!(filter_structured_output(bare), "[1]");
    }

    #[test]
    fn text_around_fence_is_left_alone() {
        let s = "Here you go:\n```json\n{}\n```";
        assert_eq!(filter_structured_output(s), s);
    }
}
