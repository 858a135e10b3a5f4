use regex::{Regex, RegexBuilder};

/// Case-insensitive literal substring predicate over resource names.
///
/// The target is escaped before compilation, so characters such as `+` or
/// `(` in an application name are matched literally.
#[derive(Debug, Clone)]
pub struct Matcher {
    target: String,
    pattern: Option<Regex>,
}

impl Matcher {
    pub fn new(target: &str) -> Self {
        let pattern = RegexBuilder::new(&regex::escape(target))
            .case_insensitive(true)
            .build()
            .ok();
        Self {
            target: target.to_string(),
            pattern,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match &self.pattern {
            Some(re) => re.is_match(candidate),
            None => candidate.to_lowercase().contains(&self.target.to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(candidate: &str, target: &str) -> bool {
        Matcher::new(target).matches(candidate)
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert!(matches("My App 2.0", "my app"));
        assert!(matches("Microsoft Office", "Office"));
        assert!(matches("OFFICE TOOLS", "office"));
        assert!(!matches("App", "application"));
    }

    #[test]
    fn test_target_is_literal() {
        assert!(matches("Notepad++", "notepad++"));
        assert!(!matches("Notepadd", "notepad+"));
        assert!(matches("Foo (x86)", "(x86)"));
        assert!(!matches("Foo x86", "(x86)"));
        assert!(!matches("FooBar", "Foo.ar"));
    }

    #[test]
    fn test_substring_collisions_are_kept() {
        assert!(matches("WhatsApp", "App"));
    }
}
