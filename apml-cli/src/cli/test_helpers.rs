//! Small helpers shared across CLI tests.

use apml_core::{DispatchOutcome, SimulatedPlatform};

use super::{render_outcome, run_with};

/// Console streams captured from one invocation.
pub(super) struct Rendered {
    pub(super) outcome: DispatchOutcome,
    pub(super) stdout: String,
    pub(super) stderr: String,
}

pub(super) fn tokens(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|token| (*token).to_owned()).collect()
}

pub(super) fn invoke(platform: &mut SimulatedPlatform, raw: &[&str]) -> Rendered {
    let outcome = run_with(platform, &tokens(raw));
    let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
    if let Err(err) = render_outcome(&outcome, &mut stdout, &mut stderr) {
        panic!("rendering into memory failed: {err}");
    }
    Rendered {
        outcome,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    }
}
