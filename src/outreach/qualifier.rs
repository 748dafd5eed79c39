//! Oracle call and verdict normalization

use crate::config::RunConfig;
use crate::error::OracleError;
use crate::oracle::QualificationOracle;
use crate::types::{Candidate, OracleVerdict, QualificationResult};
use std::sync::Arc;

/// Asks the oracle about one candidate at a time
#[derive(Clone)]
pub struct Qualifier {
    oracle: Arc<dyn QualificationOracle>,
}

impl Qualifier {
    /// Qualifier backed by `oracle`
    pub fn new(oracle: Arc<dyn QualificationOracle>) -> Self {
        Self { oracle }
    }

    /// One oracle call with the run's template and industry filters
    pub async fn qualify(
        &self,
        config: &RunConfig,
        candidate: &Candidate,
    ) -> Result<QualificationResult, OracleError> {
        let verdict = self
            .oracle
            .generate(
                &config.message_template,
                candidate,
                config.target_industries.as_deref(),
                config.exclude_industries.as_deref(),
            )
            .await?;
        Ok(normalize(verdict))
    }
}

/// Fill in defaults for a partial verdict
///
/// A missing `qualified` means no; a rejected candidate never carries a message.
pub fn normalize(verdict: OracleVerdict) -> QualificationResult {
    let qualified = verdict.qualified.unwrap_or(false);
    let message = if qualified {
        verdict.outreach_message.unwrap_or_default()
    } else {
        String::new()
    };
    QualificationResult { qualified, message }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::outreach::test_helpers::{ScriptedOracle, candidate};

    #[test]
    fn partial_verdicts_normalize() {
        assert_eq!(normalize(OracleVerdict::default()), QualificationResult::default());
        assert_eq!(
            normalize(OracleVerdict {
                qualified: Some(true),
                outreach_message: None
            }),
            QualificationResult {
                qualified: true,
                message: String::new()
            }
        );
        assert_eq!(
            normalize(OracleVerdict {
                qualified: Some(false),
                outreach_message: Some("ignored".into())
            }),
            QualificationResult::default()
        );
    }

    #[tokio::test]
    async fn qualify_forwards_template_and_filters() {
        let oracle = Arc::new(ScriptedOracle::always_qualified("Hello there"));
        let qualifier = Qualifier::new(oracle.clone());
        let mut config = RunConfig::new(1, "Hi {{firstName}}", "list");
        config.target_industries = Some("Healthcare".into());

        let result = qualifier.qualify(&config, &candidate("p1")).await.unwrap();

        assert!(result.qualified);
        assert_eq!(result.message, "Hello there");
        let calls = oracle.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].template, "Hi {{firstName}}");
        assert_eq!(calls[0].target_industries.as_deref(), Some("Healthcare"));
        assert!(calls[0].exclude_industries.is_none());
    }

    #[tokio::test]
    async fn oracle_failure_is_returned_not_raised() {
        let oracle = Arc::new(ScriptedOracle::failing_for("p1"));
        let qualifier = Qualifier::new(oracle);
        let err = qualifier
            .qualify(&RunConfig::new(1, "t", "l"), &candidate("p1"))
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::Transport(_)));
    }
}
