use crate::collaborators::{MalwareScanner, ToolLocation};
use crate::error::CodeSignerError;

/// The only action the malware gate applies to.
pub const ACTION_BATCH_SIGN: &str = "batch_sign";

/// Affirmative value of the malware-scan flag, compared case-insensitively.
const SCAN_ENABLED: &str = "true";

/// Unforgeable proof that the malware gate was evaluated for this run.
///
/// Construction is double-locked:
/// 1. `Seal` is private, so no struct literal outside this file.
/// 2. Constructors are `pub(super)`, so only `pipeline/` can mint one.
///
/// No `Clone` or `Copy`; `SigningCommand::clear` consumes it.
#[derive(Debug)]
pub struct ScanClearance {
    pub(crate) scanned: bool,
    _seal: Seal,
}

#[derive(Debug)]
struct Seal;

impl ScanClearance {
    pub(super) fn not_required() -> Self {
        Self {
            scanned: false,
            _seal: Seal,
        }
    }

    pub(super) fn scanned() -> Self {
        Self {
            scanned: true,
            _seal: Seal,
        }
    }
}

/// Result of gate evaluation.
#[derive(Debug)]
pub enum GateDecision {
    Pass(ScanClearance),
    /// Scanner reported a problem; nothing may be signed.
    Block,
}

pub fn scan_enabled(flag: &str) -> bool {
    flag.eq_ignore_ascii_case(SCAN_ENABLED)
}

/// Gate applies iff the action is batch signing and the flag is affirmative.
pub fn gate_applies(action: &str, flag: &str) -> bool {
    action == ACTION_BATCH_SIGN && scan_enabled(flag)
}

/// Evaluate the malware gate. Scanner errors propagate unchanged.
pub async fn evaluate(
    action: &str,
    flag: &str,
    tool: &ToolLocation,
    scanner: &dyn MalwareScanner,
) -> Result<GateDecision, CodeSignerError> {
    tracing::info!(
        "Malware scan is: {}",
        if scan_enabled(flag) { "enabled" } else { "disabled" }
    );

    if !gate_applies(action, flag) {
        return Ok(GateDecision::Pass(ScanClearance::not_required()));
    }

    if scanner.scan(tool, action).await? {
        tracing::info!("malware scan passed");
        Ok(GateDecision::Pass(ScanClearance::scanned()))
    } else {
        tracing::warn!("malware scan blocked signing");
        Ok(GateDecision::Block)
    }
}
