//! Declarative violation rules and the scanner that evaluates them
//!
//! A rule fires once per document when its trigger phrase occurs anywhere in
//! the text and its required-absence phrase does not. New checks are added
//! as table entries; the scanner never changes.

pub mod healthcare;

use crate::patterns::{contains_phrase, normalize};
use shared_types::Violation;
use std::borrow::Cow;

/// One row of the rule table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationRule {
    pub trigger: Cow<'static, str>,
    /// Phrase whose presence suppresses the rule. Empty means no suppression.
    pub required_absence: Cow<'static, str>,
    pub category: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub suggestion: Cow<'static, str>,
}

impl ViolationRule {
    /// Build a rule from static strings (usable in const tables)
    pub const fn from_static(
        trigger: &'static str,
        required_absence: &'static str,
        category: &'static str,
        description: &'static str,
        suggestion: &'static str,
    ) -> Self {
        Self {
            trigger: Cow::Borrowed(trigger),
            required_absence: Cow::Borrowed(required_absence),
            category: Cow::Borrowed(category),
            description: Cow::Borrowed(description),
            suggestion: Cow::Borrowed(suggestion),
        }
    }

    pub fn new(
        trigger: impl Into<String>,
        required_absence: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            trigger: Cow::Owned(trigger.into()),
            required_absence: Cow::Owned(required_absence.into()),
            category: Cow::Owned(category.into()),
            description: Cow::Owned(description.into()),
            suggestion: Cow::Owned(suggestion.into()),
        }
    }

    /// Evaluate against already-normalized text
    pub fn matches(&self, text_lower: &str) -> bool {
        if !contains_phrase(text_lower, &self.trigger) {
            return false;
        }
        self.required_absence.is_empty() || !contains_phrase(text_lower, &self.required_absence)
    }

    pub fn to_violation(&self) -> Violation {
        Violation {
            category: self.category.to_string(),
            description: self.description.to_string(),
            suggestion: self.suggestion.to_string(),
        }
    }
}

/// Generic scanner over a rule table
#[derive(Debug, Clone)]
pub struct ViolationDetector {
    rules: Vec<ViolationRule>,
}

impl ViolationDetector {
    /// Detector loaded with the default healthcare rule table
    pub fn new() -> Self {
        Self::with_rules(healthcare::HEALTHCARE_RULES.to_vec())
    }

    pub fn with_rules(rules: Vec<ViolationRule>) -> Self {
        Self { rules }
    }

    /// Append a rule to the table
    pub fn with_rule(mut self, rule: ViolationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[ViolationRule] {
        &self.rules
    }

    /// Scan the full document text. Violations come back in table order.
    pub fn detect(&self, text: &str) -> Vec<Violation> {
        let text_lower = normalize(text);

        let violations: Vec<Violation> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(&text_lower))
            .inspect(|rule| {
                tracing::debug!(category = %rule.category, trigger = %rule.trigger, "Rule fired")
            })
            .map(ViolationRule::to_violation)
            .collect();

        tracing::info!("Detected {} potential violations", violations.len());
        violations
    }
}

impl Default for ViolationDetector {
    fn default() -> Self {
        Self::new()
    }
}
