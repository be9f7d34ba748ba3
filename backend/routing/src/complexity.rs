//! Prompt complexity classifier.
//!
//! Scores a prompt against three tiers with word-bounded regex patterns, then
//! adds length, technical-keyword and code-indicator heuristics. Any complex
//! signal wins outright; otherwise moderate must beat simple.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RoutingError;

/// Processing tier a prompt is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [Complexity::Simple, Complexity::Moderate, Complexity::Complex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Complexity {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Complexity::Simple),
            "moderate" => Ok(Complexity::Moderate),
            "complex" => Ok(Complexity::Complex),
            other => Err(RoutingError::UnknownComplexity(other.to_string())),
        }
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
        .collect()
}

static SIMPLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(fix|format|indent|rename|import)\b",
        r"\b(add|remove|delete)\s+\w+\s*(comment|log|print)\b",
        r"\bgenerate\s+(getter|setter|constructor)\b",
        r"\b(what|where|when|how)\s+is\b",
    ])
});

static MODERATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(refactor|optimize|implement|create)\b",
        r"\b(add|write|build)\s+(function|method|class)\b",
        r"\b(test|debug|fix)\s+(bug|issue|error)\b",
        r"\b(explain|describe|analyze)\b.*\b(code|algorithm|pattern)\b",
    ])
});

static COMPLEX_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(architect|design|migrate|transform)\b",
        r"\b(integrate|connect|sync)\s+.*\b(api|database|service)\b",
        r"\b(performance|security|scalability)\s+(issue|concern|optimization)\b",
        r"\b(multi|cross)[-\s](platform|service|thread|process)\b",
        r"\b(deploy|ci/cd|infrastructure|docker|kubernetes)\b",
    ])
});

const TECHNICAL_KEYWORDS: [&str; 13] = [
    "algorithm",
    "architecture",
    "framework",
    "library",
    "protocol",
    "asynchronous",
    "concurrent",
    "distributed",
    "microservice",
    "authentication",
    "authorization",
    "encryption",
    "validation",
];

const CODE_INDICATORS: [&str; 6] = ["class", "function", "method", "interface", "enum", "struct"];

/// Per-tier evidence accumulated for one prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComplexityScores {
    pub simple: u32,
    pub moderate: u32,
    pub complex: u32,
}

impl ComplexityScores {
    fn decide(&self) -> Complexity {
        if self.complex > 0 {
            Complexity::Complex
        } else if self.moderate > self.simple {
            Complexity::Moderate
        } else {
            Complexity::Simple
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub complexity: Complexity,
    pub scores: ComplexityScores,
}

/// Heuristic classifier. Stateless; the pattern tables are compiled once.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityClassifier;

impl ComplexityClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, prompt: &str, context: Option<&str>) -> Classification {
        let text = format!("{} {}", prompt, context.unwrap_or_default()).to_lowercase();

        let mut scores = ComplexityScores {
            simple: count_matches(&SIMPLE_PATTERNS, &text),
            moderate: count_matches(&MODERATE_PATTERNS, &text),
            complex: count_matches(&COMPLEX_PATTERNS, &text),
        };
        add_heuristic_scores(&text, &mut scores);

        let complexity = scores.decide();
        info!(
            complexity = %complexity,
            simple = scores.simple,
            moderate = scores.moderate,
            complex = scores.complex,
            "Classified prompt"
        );
        Classification { complexity, scores }
    }
}

fn count_matches(patterns: &[Regex], text: &str) -> u32 {
    patterns
        .iter()
        .map(|re| re.find_iter(text).count() as u32)
        .sum()
}

fn add_heuristic_scores(text: &str, scores: &mut ComplexityScores) {
    let word_count = text.split_whitespace().count();
    if word_count > 100 {
        scores.complex += 2;
    } else if word_count > 50 {
        scores.moderate += 1;
    } else {
        scores.simple += 1;
    }

    let tech = TECHNICAL_KEYWORDS.iter().filter(|k| text.contains(*k)).count() as u32;
    if tech >= 3 {
        scores.complex += tech;
    } else if tech >= 1 {
        scores.moderate += tech;
    }

    let code = CODE_INDICATORS.iter().filter(|k| text.contains(*k)).count();
    if code >= 5 {
        scores.complex += 1;
    } else if code >= 3 {
        scores.moderate += 1;
    }
}
