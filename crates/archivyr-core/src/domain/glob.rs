//! Anchored glob matching.
//!
//! `*` matches any run of characters (including none), `?` matches exactly one
//! character and every other character matches itself. The whole text must
//! match, so `python*` does not match `my_python_rules`.

/// Returns `true` if `text` matches the glob `pattern`.
#[must_use]
pub fn matches(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let (mut t, mut p) = (0, 0);
    // Position of the last `*` seen and the text index it is currently
    // absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star, absorbed)) => {
                    p = star + 1;
                    t = absorbed + 1;
                    backtrack = Some((star, t));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::matches;

    #[test_case("python_style_guide", "python*"; "prefix")]
    #[test_case("python_style_guide", "*_style_guide"; "suffix")]
    #[test_case("python_style_guide", "*_style_*"; "infix needs backtracking")]
    #[test_case("python_style_guide", "*"; "star matches all")]
    #[test_case("", "*"; "star matches empty")]
    #[test_case("python", "python*"; "star matches empty run")]
    #[test_case("go_conventions", "go_conventions"; "literal")]
    #[test_case("rule_1", "rule_?"; "question mark")]
    #[test_case("aaab", "*a*b"; "repeated characters")]
    #[test_case("abcabd", "*abd"; "partial match then retry")]
    #[test_case("style", "**style**"; "consecutive stars")]
    #[test_case("rust_rules", "r?st*s"; "mixed wildcards")]
    fn matching(text: &str, pattern: &str) {
        assert!(matches(text, pattern));
    }

    #[test_case("my_python_rules", "python*"; "anchored at start")]
    #[test_case("python_style_guide", "python"; "anchored at end")]
    #[test_case("go_conventions", "*_style_guide"; "different suffix")]
    #[test_case("rule_12", "rule_?"; "question mark is exactly one")]
    #[test_case("rule_", "rule_?"; "question mark is not optional")]
    #[test_case("", "?"; "question mark on empty")]
    #[test_case("abc", ""; "empty pattern")]
    #[test_case("abcabc", "*abd"; "no split point works")]
    fn not_matching(text: &str, pattern: &str) {
        assert!(!matches(text, pattern));
    }
}
