use apml_core::{
    DispatchOutcome, Dispatcher, Report, SimulatedPlatform,
    command::{ArgKind, Command},
};

pub fn dispatch(platform: &mut SimulatedPlatform, tokens: &[&str]) -> DispatchOutcome {
    Dispatcher::new(platform).run(tokens)
}

pub fn dispatched(outcome: DispatchOutcome) -> Report {
    match outcome {
        DispatchOutcome::Dispatched(report) => report,
        other => panic!("expected a report, got {other:?}"),
    }
}

/// Arguments every simulator socket accepts for `command`.
#[must_use]
pub fn sample_tokens(command: &Command) -> Vec<String> {
    command
        .slots()
        .iter()
        .map(|slot| match (slot.kind, slot.name) {
            (ArgKind::Text, "INTERFACE") => "sbrmi".to_owned(),
            (ArgKind::Text, "LINKID") => "G0".to_owned(),
            (ArgKind::Text, _) => "AGG_BW".to_owned(),
            _ => "1".to_owned(),
        })
        .collect()
}
