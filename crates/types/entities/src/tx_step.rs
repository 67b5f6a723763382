use strum_macros::{Display, EnumString};

/// Which contract call is currently in flight for a liquidity operation.
///
/// Exactly one transaction hash is tracked per non-idle step; a receipt whose
/// hash does not match the tracked one must be discarded by the orchestrator.
#[derive(Clone, Copy, Debug, Default, Display, EnumString, Eq, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum TxStep {
    #[default]
    Idle,
    Approve,
    Add,
    RemoveApprove,
    RemoveLiquidity,
}

impl TxStep {
    pub fn is_idle(&self) -> bool {
        matches!(self, TxStep::Idle)
    }
}

/// Outcome of the best-effort block-explorer source verification. Exposed to
/// the UI but never gates token usability.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Success,
    Failed,
}
