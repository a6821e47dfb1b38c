use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use crate::artifacts::ArtifactError;
use crate::domain::analysis::{AnalysisResult, Issue, Summary};

pub const SUMMARY_EMAIL_TEMPLATE: &str = "summary_email.txt";
pub const TENANT_EMAIL_TEMPLATE: &str = "tenant_email.txt";
pub const TENANT_EMAIL_SUBJECT: &str =
    "High-Risk Clauses in Your Rental Agreement - Action Required";
pub const EMAIL_ISSUE_LIMIT: usize = 5;
pub const TENANT_CLAUSE_CHAR_LIMIT: usize = 100;

const SUMMARY_EMAIL_SOURCE: &str = "Subject: Rental Agreement Risk Summary

High Risk Clauses: {{ summary.high_risk }}
Medium Risk Clauses: {{ summary.medium_risk }}
OK Clauses: {{ summary.ok }}
Total Clauses Analyzed: {{ summary.total }}

Top Issues and Recommendations:
{% for issue in issues %}{{ loop.index }}. Clause: {{ issue.clause }}
   Risk: {{ issue.risk }}
   Rationale: {{ issue.rationale }}
   Recommendation: {{ issue.recommendation }}

{% endfor %}";

const TENANT_EMAIL_SOURCE: &str = "Dear Tenant,

I am writing to inform you about several high-risk clauses identified in your rental agreement that require immediate attention.

{% for issue in issues %}{{ loop.index }}. Clause: {{ issue.clause }}...
   Risk Level: {{ issue.risk }}
   Recommendation: {{ issue.recommendation }}

{% endfor %}It is strongly recommended that you:
1. Review these clauses carefully
2. Consider negotiating with your landlord
3. Seek legal advice if necessary

Best regards,
Rental Agreement Analysis System";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
    pub recommendations: Vec<String>,
}

/// Renders email artifacts from embedded templates.
#[derive(Clone, Debug)]
pub struct EmailRenderer {
    tera: Tera,
}

#[derive(Serialize)]
struct SummaryEmailContext<'a> {
    summary: &'a Summary,
    issues: &'a [Issue],
}

#[derive(Serialize)]
struct TenantEmailContext {
    issues: Vec<Issue>,
}

impl EmailRenderer {
    pub fn new() -> Result<Self, ArtifactError> {
        let mut tera = Tera::default();
        tera.add_raw_template(SUMMARY_EMAIL_TEMPLATE, SUMMARY_EMAIL_SOURCE)?;
        tera.add_raw_template(TENANT_EMAIL_TEMPLATE, TENANT_EMAIL_SOURCE)?;
        Ok(Self { tera })
    }

    /// Plain-text summary of the counts and the first five issues.
    pub fn summary_email(&self, analysis: &AnalysisResult) -> Result<String, ArtifactError> {
        let issue_count = analysis.issues.len().min(EMAIL_ISSUE_LIMIT);
        let context = Context::from_serialize(SummaryEmailContext {
            summary: &analysis.summary,
            issues: &analysis.issues[..issue_count],
        })?;
        Ok(self.tera.render(SUMMARY_EMAIL_TEMPLATE, &context)?)
    }

    /// Notification covering the first five HIGH issues only.
    pub fn tenant_email(&self, analysis: &AnalysisResult) -> Result<EmailDraft, ArtifactError> {
        let issues: Vec<Issue> = analysis
            .high_risk_issues()
            .take(EMAIL_ISSUE_LIMIT)
            .map(|issue| Issue {
                clause: issue.clause.chars().take(TENANT_CLAUSE_CHAR_LIMIT).collect(),
                ..issue.clone()
            })
            .collect();
        let recommendations = issues.iter().map(|issue| issue.recommendation.clone()).collect();

        let context = Context::from_serialize(TenantEmailContext { issues })?;
        let body = self.tera.render(TENANT_EMAIL_TEMPLATE, &context)?;

        Ok(EmailDraft { subject: TENANT_EMAIL_SUBJECT.to_string(), body, recommendations })
    }
}
