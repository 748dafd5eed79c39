//! Prompt rendering for the qualification oracle

use crate::types::Candidate;
use serde::Serialize;
use serde_json::Value;

/// Profile attributes shown to the oracle, each passed through as received
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDigest<'a> {
    full_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_positions: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    connection_degree: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spotlight_badges: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headline: Option<&'a Value>,
    #[serde(rename = "seniorityV2s", skip_serializing_if = "Option::is_none")]
    seniority: Option<&'a Value>,
}

impl<'a> From<&'a Candidate> for ProfileDigest<'a> {
    fn from(candidate: &'a Candidate) -> Self {
        let profile = &candidate.profile;
        Self {
            full_name: &candidate.full_name,
            current_positions: profile.get("currentPositions"),
            connection_degree: profile.get("degree"),
            spotlight_badges: profile.get("spotlightBadges"),
            summary: profile.get("summary"),
            headline: profile.get("headline"),
            seniority: profile.get("seniorityV2s"),
        }
    }
}

const QUALIFICATION_CRITERIA: &str = "\
## Qualification Criteria
Qualify people who can make or strongly influence buying decisions:
- Business owners, founders and co-founders
- C-level executives (CEO, CTO, CMO, CFO, COO and similar)
- VPs, directors and senior managers
- Entrepreneurs and other business leaders with purchasing authority

Do not qualify:
- Junior staff, interns and students
- Administrative, coordinating or assistant roles
- Entry-level positions and any role without decision-making authority
";

const INSTRUCTIONS: &str = "\
## Instructions
1. Decide whether the person is qualified from their title, role and seniority.
2. If qualified, personalize the template: use their first name naturally, and
   mention their current role, company, industry, headline or summary where it helps.
3. Replace every {{variableName}} placeholder in the template with the person's data.
   If data is missing, fall back to a generic phrasing; with several current
   positions use the first one; without a headline use the title.
4. Keep the tone professional, warm and conversational. Do not be pushy.
   The message must read naturally, be grammatically correct and stay under 300 characters.

## Output
Return a JSON object with exactly two fields:
- \"qualified\": boolean
- \"outreachMessage\": the ready-to-send message, or an empty string when not qualified
";

/// Render the prompt sent to the oracle for one candidate
///
/// Industry lines are only included when the corresponding filter is set and
/// non-empty.
pub fn build_outreach_prompt(
    template: &str,
    candidate: &Candidate,
    target_industries: Option<&str>,
    exclude_industries: Option<&str>,
) -> String {
    let digest = serde_json::to_string_pretty(&ProfileDigest::from(candidate))
        .unwrap_or_else(|_| "{}".to_string());

    let mut prompt = String::with_capacity(2048 + template.len() + digest.len());
    prompt.push_str(
        "You write short, personalized connection requests for professional outreach. \
         First decide whether the person below is a qualified prospect, then, only if \
         they are, compose the message from the template.\n\n",
    );

    prompt.push_str("## Message Template\n<OutreachMessageTemplate>\n");
    prompt.push_str(template);
    prompt.push_str("\n</OutreachMessageTemplate>\n\n");

    prompt.push_str("## Person\n<PersonInformation>\n");
    prompt.push_str(&digest);
    prompt.push_str("\n</PersonInformation>\n\n");

    prompt.push_str(QUALIFICATION_CRITERIA);

    if let Some(target) = target_industries.filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!(
            "\n**TARGET INDUSTRIES:** Only qualify people working in: {}\n",
            target
        ));
    }
    if let Some(exclude) = exclude_industries.filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!(
            "\n**EXCLUDE INDUSTRIES:** Never qualify people working in: {}\n",
            exclude
        ));
    }

    prompt.push('\n');
    prompt.push_str(INSTRUCTIONS);
    prompt
}
