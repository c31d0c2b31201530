//! Human-readable text renderings of rulesets.

use archivyr_core::Ruleset;
use chrono::{DateTime, Utc};

/// URI scheme under which rulesets are exposed as resources.
pub const URI_SCHEME: &str = "ruleset://";

/// Short form accepted when reading a resource.
const URI_SHORT_PREFIX: &str = "ruleset:";

/// The resource URI of a ruleset.
pub fn resource_uri(name: &str) -> String {
    format!("{URI_SCHEME}{name}")
}

/// Extracts the ruleset name from `ruleset://{name}` or `ruleset:{name}`.
pub fn name_from_uri(uri: &str) -> Option<&str> {
    uri.strip_prefix(URI_SCHEME)
        .or_else(|| uri.strip_prefix(URI_SHORT_PREFIX))
        .filter(|name| !name.is_empty())
}

fn display_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn display_tags(tags: &[String]) -> String {
    format!("[{}]", tags.join(", "))
}

/// Renders a ruleset as markdown preceded by a metadata header.
pub fn document(ruleset: &Ruleset) -> String {
    format!(
        "---\nname: {}\ndescription: {}\ntags: {}\ncreated_at: {}\nlast_modified: {}\n---\n\n{}",
        ruleset.name,
        ruleset.description,
        display_tags(&ruleset.tags),
        display_time(&ruleset.created_at),
        display_time(&ruleset.last_modified),
        ruleset.markdown,
    )
}

/// Renders a bullet list of rulesets.
///
/// `pattern` is mentioned in the heading unless it is the match-all `*`.
pub fn listing(rulesets: &[Ruleset], pattern: &str) -> String {
    let all = pattern == "*";
    if rulesets.is_empty() {
        return if all {
            "No rulesets found".to_string()
        } else {
            format!("No rulesets found matching pattern '{pattern}'")
        };
    }

    let heading = if all {
        format!("Found {} ruleset(s):", rulesets.len())
    } else {
        format!("Found {} ruleset(s) matching '{pattern}':", rulesets.len())
    };
    let entries: String = rulesets.iter().map(listing_entry).collect();

    format!("{heading}\n\n{entries}")
}

fn listing_entry(ruleset: &Ruleset) -> String {
    let tags = if ruleset.tags.is_empty() {
        String::new()
    } else {
        format!("  Tags: {}\n", display_tags(&ruleset.tags))
    };

    format!(
        "- **{}**: {}\n{tags}  Created: {}, Modified: {}\n\n",
        ruleset.name,
        ruleset.description,
        display_time(&ruleset.created_at),
        display_time(&ruleset.last_modified),
    )
}

#[cfg(test)]
mod tests {
    use archivyr_core::RulesetName;
    use chrono::TimeZone;
    use test_case::test_case;

    use super::*;

    fn ruleset(name: &str, tags: &[&str]) -> Ruleset {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        Ruleset {
            name: RulesetName::new(name).unwrap(),
            description: "Python conventions".to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            markdown: "# Python\n\nUse black.".to_string(),
            created_at,
            last_modified: Utc.with_ymd_and_hms(2024, 3, 2, 10, 30, 15).unwrap(),
        }
    }

    #[test]
    fn document_has_metadata_header() {
        let text = document(&ruleset("python_style", &["python", "style"]));
        assert_eq!(
            text,
            "---\nname: python_style\ndescription: Python conventions\ntags: [python, \
             style]\ncreated_at: 2024-03-01 09:00:00\nlast_modified: 2024-03-02 \
             10:30:15\n---\n\n# Python\n\nUse black."
        );
    }

    #[test]
    fn listing_all() {
        let text = listing(&[ruleset("python_style", &["python"]), ruleset("bare", &[])], "*");
        assert!(text.starts_with("Found 2 ruleset(s):\n\n"));
        assert!(text.contains("- **python_style**: Python conventions\n  Tags: [python]\n"));
        assert!(text.contains("- **bare**: Python conventions\n  Created: 2024-03-01 09:00:00"));
    }

    #[test]
    fn listing_layout() {
        let rulesets = [ruleset("python_style", &["python", "style"]), ruleset("bare", &[])];
        let text = listing(&rulesets, "*");
        assert_eq!(
            text,
            "Found 2 ruleset(s):\n\n\
             - **python_style**: Python conventions\n  Tags: [python, style]\n  Created: \
             2024-03-01 09:00:00, Modified: 2024-03-02 10:30:15\n\n\
             - **bare**: Python conventions\n  Created: 2024-03-01 09:00:00, Modified: \
             2024-03-02 10:30:15\n\n"
        );
    }

    #[test]
    fn listing_with_pattern() {
        let text = listing(&[ruleset("python_style", &[])], "python*");
        assert!(text.starts_with("Found 1 ruleset(s) matching 'python*':"));
    }

    #[test]
    fn empty_listings() {
        assert_eq!(listing(&[], "*"), "No rulesets found");
        assert_eq!(
            listing(&[], "go*"),
            "No rulesets found matching pattern 'go*'"
        );
    }

    #[test_case("ruleset://python_style", Some("python_style"); "full scheme")]
    #[test_case("ruleset:python_style", Some("python_style"); "short form")]
    #[test_case("ruleset://", None; "empty after scheme")]
    #[test_case("ruleset:", None; "empty after prefix")]
    #[test_case("file:///etc/passwd", None; "other scheme")]
    fn parses_uris(uri: &str, expected: Option<&str>) {
        assert_eq!(name_from_uri(uri), expected);
    }

    #[test]
    fn uri_roundtrip() {
        assert_eq!(name_from_uri(&resource_uri("go_rules")), Some("go_rules"));
    }
}
