//! Text splitting for pre-tokenization.
//!
//! The learner and the tokenizer must cut text into words the same way, so the
//! policy is part of the model and travels with it through serialization.

use crate::error::{BpeError, Result};
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// GPT-2 (r50k) pre-tokenization pattern.
pub const GPT2_PATTERN: &str =
    r"'(?:[sdmt]|ll|ve|re)| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

/// Word splitting policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitPolicy {
    /// Words are maximal runs of non-whitespace; whitespace is dropped.
    #[default]
    Whitespace,
    /// GPT-2 style: letters, digits and punctuation runs with their leading space.
    /// Whitespace is kept inside the words.
    Gpt2,
}

impl SplitPolicy {
    /// Name used in model files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitPolicy::Whitespace => "whitespace",
            SplitPolicy::Gpt2 => "gpt2",
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitPolicy {
    type Err = BpeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "whitespace" => Ok(SplitPolicy::Whitespace),
            "gpt2" => Ok(SplitPolicy::Gpt2),
            other => Err(BpeError::InvalidConfig(format!(
                "unknown split policy {other:?} (expected \"whitespace\" or \"gpt2\")"
            ))),
        }
    }
}

fn gpt2_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(GPT2_PATTERN).expect("GPT-2 pattern is valid"))
}

/// Text splitter for pre-tokenization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Splitter {
    policy: SplitPolicy,
}

impl Splitter {
    /// Create a new splitter.
    pub fn new(policy: SplitPolicy) -> Self {
        Self { policy }
    }

    /// Create a whitespace splitter.
    pub fn whitespace() -> Self {
        Self::new(SplitPolicy::Whitespace)
    }

    /// The policy this splitter applies.
    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    /// Split text into words, borrowing from `text`.
    pub fn split<'a>(&self, text: &'a str) -> Result<Vec<&'a str>> {
        let mut words = Vec::new();
        self.for_each_word(text, |word| words.push(word))?;
        Ok(words)
    }

    /// Call `f` for every word of `text`, in order.
    pub fn for_each_word<'a, F>(&self, text: &'a str, mut f: F) -> Result<()>
    where
        F: FnMut(&'a str),
    {
        match self.policy {
            SplitPolicy::Whitespace => text.split_whitespace().for_each(f),
            SplitPolicy::Gpt2 => {
                for m in gpt2_regex().find_iter(text) {
                    let m = m.map_err(|e| BpeError::Split(e.to_string()))?;
                    f(m.as_str());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_split() {
        let splitter = Splitter::whitespace();
        let result = splitter.split("hello world \n test\t").unwrap();
        assert_eq!(result, vec!["hello", "world", "test"]);
    }

    #[test]
    fn test_gpt2_split_keeps_spaces() {
        let splitter = Splitter::new(SplitPolicy::Gpt2);
        let result = splitter.split("Hello world, it's 42!").unwrap();
        assert_eq!(
            result,
            vec!["Hello", " world", ",", " it", "'s", " 42", "!"]
        );
        assert_eq!(result.concat(), "Hello world, it's 42!");
    }

    #[test]
    fn test_gpt2_trailing_whitespace() {
        let splitter = Splitter::new(SplitPolicy::Gpt2);
        let result = splitter.split("a  b ").unwrap();
        assert_eq!(result, vec!["a", " ", " b", " "]);
    }

    #[test]
    fn test_empty_string() {
        for policy in [SplitPolicy::Whitespace, SplitPolicy::Gpt2] {
            let result = Splitter::new(policy).split("").unwrap();
            assert_eq!(result, Vec::<&str>::new());
        }
    }

    #[test]
    fn test_policy_names() {
        assert_eq!("gpt2".parse::<SplitPolicy>().unwrap(), SplitPolicy::Gpt2);
        assert_eq!(SplitPolicy::Whitespace.to_string(), "whitespace");
        assert!(matches!(
            "regex".parse::<SplitPolicy>(),
            Err(BpeError::InvalidConfig(_))
        ));
    }
}
