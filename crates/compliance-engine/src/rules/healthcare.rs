// Default rule table for healthcare documents (HIPAA, PII)
use super::ViolationRule;

pub const HEALTHCARE_RULES: &[ViolationRule] = &[
    ViolationRule::from_static(
        "patient data",
        "encrypted",
        "HIPAA",
        "Unencrypted patient data detected.",
        "Ensure all patient data is stored and transmitted with strong encryption.",
    ),
    ViolationRule::from_static(
        "social security",
        "protected",
        "PII",
        "Unprotected sensitive data (Social Security Number) detected.",
        "Mask or redact Social Security Numbers and ensure access is restricted.",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_phrases_are_lowercase() {
        for rule in HEALTHCARE_RULES {
            assert_eq!(rule.trigger, rule.trigger.to_lowercase());
            assert_eq!(rule.required_absence, rule.required_absence.to_lowercase());
        }
    }

    #[test]
    fn test_table_categories() {
        let categories: Vec<&str> = HEALTHCARE_RULES.iter().map(|r| &*r.category).collect();
        assert_eq!(categories, vec!["HIPAA", "PII"]);
    }
}
