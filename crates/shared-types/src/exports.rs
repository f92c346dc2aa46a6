//! Test case exports for ALM tools: Jira, Azure DevOps and Polarion
//!
//! Jira and Azure DevOps receive JSON work items. Polarion receives a
//! tab-indented XML document. Requirement metadata is looked up by
//! `requirement_id`; a test case whose requirement is unknown exports with
//! empty compliance standards.

use crate::types::{Requirement, TestCase, TestStep};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All export formats produced for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlmExports {
    pub jira: Vec<JiraTestCase>,
    pub azure_devops: Vec<AzureTestCase>,
    pub polarion: String,
}

impl AlmExports {
    pub fn build(test_cases: &[TestCase], requirements: &[Requirement]) -> Self {
        Self {
            jira: to_jira(test_cases, requirements),
            azure_devops: to_azure_devops(test_cases, requirements),
            polarion: to_polarion_xml(test_cases),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraTestCase {
    #[serde(rename = "issueType")]
    pub issue_type: String,
    pub fields: JiraFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraPriority {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraFields {
    pub summary: String,
    pub description: String,
    /// Requirement link
    #[serde(rename = "customfield_10001")]
    pub requirement_link: String,
    #[serde(rename = "customfield_10002")]
    pub test_case_id: String,
    #[serde(rename = "customfield_10003")]
    pub test_steps: String,
    #[serde(rename = "customfield_10004")]
    pub expected_results: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<JiraPriority>,
    #[serde(rename = "customfield_10005")]
    pub compliance_standards: Vec<String>,
    #[serde(rename = "customfield_10006")]
    pub risk_category: String,
    #[serde(rename = "customfield_10007")]
    pub regulatory_citations: Vec<String>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureTestCase {
    #[serde(rename = "workItemType")]
    pub work_item_type: String,
    pub fields: AzureFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureFields {
    #[serde(rename = "System.Title")]
    pub title: String,
    #[serde(rename = "System.Description")]
    pub description: String,
    #[serde(rename = "Microsoft.VSTS.TCM.Steps")]
    pub steps: String,
    #[serde(rename = "Custom.RequirementLink")]
    pub requirement_link: String,
    #[serde(rename = "Custom.ComplianceStandard")]
    pub compliance_standard: String,
    #[serde(rename = "Custom.RiskCategory")]
    pub risk_category: String,
    #[serde(rename = "Custom.RegulatoryCitations")]
    pub regulatory_citations: String,
    #[serde(rename = "System.Tags")]
    pub tags: String,
}

/// Number, action and expected result of a step. Steps without a number
/// are numbered by position.
fn step_parts(index: usize, step: &TestStep) -> (u32, &str, &str) {
    let position = u32::try_from(index + 1).unwrap_or(u32::MAX);
    match step {
        TestStep::Structured {
            step,
            action,
            expected_result,
        } => (
            step.unwrap_or(position),
            action.as_str(),
            expected_result.as_deref().unwrap_or(""),
        ),
        TestStep::Text(action) => (position, action.as_str(), ""),
    }
}

fn standards_for<'a>(requirements: &HashMap<&str, &'a Requirement>, requirement_id: &str) -> Vec<&'a str> {
    requirements
        .get(requirement_id)
        .and_then(|req| req.attributes.get("compliance_standards"))
        .map(|joined| joined.split("; ").filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

fn by_id(requirements: &[Requirement]) -> HashMap<&str, &Requirement> {
    requirements.iter().map(|req| (req.id.as_str(), req)).collect()
}

pub fn to_jira(test_cases: &[TestCase], requirements: &[Requirement]) -> Vec<JiraTestCase> {
    let requirements = by_id(requirements);

    test_cases
        .iter()
        .map(|tc| {
            let test_steps = tc
                .steps
                .iter()
                .enumerate()
                .map(|(i, step)| {
                    let (number, action, expected) = step_parts(i, step);
                    format!("{number}. {action} | {expected}")
                })
                .collect::<Vec<_>>()
                .join("\n");

            let risk_category = tc.extra_str("risk_category").unwrap_or_default().to_string();
            let automation = if tc.extra_bool("automation_feasible").unwrap_or(false) {
                "Automated"
            } else {
                "Manual"
            };
            let test_type = tc.extra_str("test_type").unwrap_or_default();
            let labels = [test_type, risk_category.as_str(), "Healthcare", automation]
                .into_iter()
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect();

            JiraTestCase {
                issue_type: "Test Case".to_string(),
                fields: JiraFields {
                    summary: tc.title.clone(),
                    description: tc.description.clone(),
                    requirement_link: tc.requirement_id.clone(),
                    test_case_id: tc.test_case_id.clone(),
                    test_steps,
                    expected_results: tc.expected_results.join("\n"),
                    priority: tc.extra_str("priority").map(|name| JiraPriority { name: name.to_string() }),
                    compliance_standards: standards_for(&requirements, &tc.requirement_id)
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                    risk_category,
                    regulatory_citations: tc.extra_strings("regulatory_citations"),
                    labels,
                },
            }
        })
        .collect()
}

/// Wrap text in CDATA, splitting any `]]>` it contains
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

pub fn to_azure_devops(test_cases: &[TestCase], requirements: &[Requirement]) -> Vec<AzureTestCase> {
    let requirements = by_id(requirements);

    test_cases
        .iter()
        .map(|tc| {
            let steps_xml: String = tc
                .steps
                .iter()
                .enumerate()
                .map(|(i, step)| {
                    let (number, action, expected) = step_parts(i, step);
                    format!(
                        "<step id='{number}'><parameterizedString isformatted='true'>{}</parameterizedString>\
                         <parameterizedString isformatted='true'>{}</parameterizedString><description/></step>",
                        cdata(action),
                        cdata(expected)
                    )
                })
                .collect();

            let risk_category = tc.extra_str("risk_category").unwrap_or_default().to_string();

            AzureTestCase {
                work_item_type: "Test Case".to_string(),
                fields: AzureFields {
                    title: tc.title.clone(),
                    description: tc.description.clone(),
                    steps: format!("<steps>{steps_xml}</steps>"),
                    requirement_link: tc.requirement_id.clone(),
                    compliance_standard: standards_for(&requirements, &tc.requirement_id).join(", "),
                    regulatory_citations: tc.extra_strings("regulatory_citations").join(", "),
                    tags: format!(
                        "{}; {}; Healthcare",
                        tc.extra_str("test_type").unwrap_or_default(),
                        risk_category
                    ),
                    risk_category,
                },
            }
        })
        .collect()
}

fn escape_xml(text: &str) -> String {
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

/// Polarion import document, one `<testcase>` per test case, tab indented
pub fn to_polarion_xml(test_cases: &[TestCase]) -> String {
    if test_cases.is_empty() {
        return "<testcases />".to_string();
    }

    let mut xml = String::from("<testcases>\n");
    for tc in test_cases {
        xml.push_str(&format!("\t<testcase id=\"{}\">\n", escape_xml(&tc.test_case_id)));
        xml.push_str(&format!("\t\t<title>{}</title>\n", escape_xml(&tc.title)));
        xml.push_str(&format!(
            "\t\t<requirement_link>{}</requirement_link>\n",
            escape_xml(&tc.requirement_id)
        ));
        xml.push_str(&format!(
            "\t\t<compliance_std>{}</compliance_std>\n",
            escape_xml(&tc.extra_strings("regulatory_citations").join(", "))
        ));
        xml.push_str(&format!(
            "\t\t<risk_class>{}</risk_class>\n",
            escape_xml(tc.extra_str("risk_category").unwrap_or_default())
        ));

        if tc.steps.is_empty() {
            xml.push_str("\t\t<steps />\n");
        } else {
            xml.push_str("\t\t<steps>\n");
            for (i, step) in tc.steps.iter().enumerate() {
                let (_, action, expected) = step_parts(i, step);
                xml.push_str("\t\t\t<step>\n");
                xml.push_str(&format!("\t\t\t\t<action>{}</action>\n", escape_xml(action)));
                xml.push_str(&format!(
                    "\t\t\t\t<expected_result>{}</expected_result>\n",
                    escape_xml(expected)
                ));
                xml.push_str("\t\t\t</step>\n");
            }
            xml.push_str("\t\t</steps>\n");
        }
        xml.push_str("\t</testcase>\n");
    }
    xml.push_str("</testcases>");
    xml
}
