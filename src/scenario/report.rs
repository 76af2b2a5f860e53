use super::{Outcome, ScenarioResult};
use serde_derive::Serialize;

/// Exit status of automake style harnesses for a skipped test.
const EXIT_SKIP: u8 = 77;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum TeardownStatus {
    NotRequired,
    Completed,
    Failed,
}

#[derive(Debug, Serialize)]
pub(crate) struct Report {
    pub(crate) outcome: &'static str,
    pub(crate) stage: &'static str,
    pub(crate) error_kind: Option<&'static str>,
    pub(crate) reason: Option<String>,
    pub(crate) elapsed_ms: u64,
    pub(crate) teardown: TeardownStatus,
}

impl ScenarioResult {
    pub(crate) fn report(&self) -> Report {
        let (error_kind, reason) = match &self.outcome {
            Outcome::Pass => (None, None),
            Outcome::Fail(err) | Outcome::Skip(err) => {
                (Some(err.kind().slug()), Some(err.chain_text()))
            }
        };

        Report {
            outcome: self.outcome.as_str(),
            stage: self.reached.as_str(),
            error_kind,
            reason,
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
            teardown: self.teardown,
        }
    }

    pub(crate) fn exit_code(&self) -> u8 {
        match self.outcome {
            Outcome::Pass => 0,
            Outcome::Fail(_) => 1,
            Outcome::Skip(_) => EXIT_SKIP,
        }
    }
}
