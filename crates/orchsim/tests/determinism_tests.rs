//! Seed reproducibility and statistical properties of the simulator.

use orchsim::{
    Decision, Outcome, Rng, Role, SimRng, Simulator, SimulatorOptions, Status,
};
use proptest::prelude::*;

/// One step of a scripted session.
#[derive(Debug, Clone)]
enum Step {
    Send(String),
    Advance(u64),
    Chaos,
    Clear,
    InjectError,
    LongRunning,
}

fn apply(sim: &mut Simulator, step: &Step) {
    match step {
        Step::Send(prompt) => {
            sim.send_user(prompt.clone()).unwrap();
        }
        Step::Advance(ms) => {
            sim.advance_by(*ms);
        }
        Step::Chaos => {
            sim.toggle_chaos_mode();
        }
        Step::Clear => sim.clear(),
        Step::InjectError => {
            sim.inject_error();
        }
        Step::LongRunning => {
            sim.simulate_long_running();
        }
    }
}

fn run_script(seed: u32, steps: &[Step]) -> Simulator {
    let mut sim = Simulator::new(SimulatorOptions::default().with_seed(seed));
    for step in steps {
        apply(&mut sim, step);
    }
    sim.run_until_idle();
    sim
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => "[a-z ]{0,12}".prop_map(Step::Send),
        3 => (0u64..3_000).prop_map(Step::Advance),
        1 => Just(Step::Chaos),
        1 => Just(Step::Clear),
        1 => Just(Step::InjectError),
        1 => Just(Step::LongRunning),
    ]
}

// ============================================================================
// Reproducibility
// ============================================================================

#[test]
fn seed_42_generator_reference() {
    let mut rng = SimRng::new(42);
    let outputs: Vec<u32> = (0..5).map(|_| rng.next_u32()).collect();
    assert_eq!(
        outputs,
        vec![2_581_720_956, 1_925_393_290, 3_661_312_704, 2_876_485_805, 750_819_978]
    );

    let mut rng = SimRng::new(42);
    let draws: Vec<i64> = (0..8).map(|_| rng.random_int(3, 7).unwrap()).collect();
    assert_eq!(draws, vec![6, 5, 7, 6, 3, 5, 4, 6]);
}

#[test]
fn identical_scripts_produce_identical_sessions() {
    let script = vec![
        Step::Send("plan".into()),
        Step::Send("build".into()),
        Step::Advance(1_000),
        Step::Chaos,
        Step::Send("deploy".into()),
        Step::LongRunning,
        Step::Advance(500),
        Step::InjectError,
        Step::Send("verify".into()),
    ];

    let a = run_script(42, &script);
    let b = run_script(42, &script);

    assert_eq!(a.messages(), b.messages());
    assert_eq!(a.decisions().first_divergence(b.decisions()), None);
    assert_eq!(
        serde_json::to_string(&a.messages()).unwrap(),
        serde_json::to_string(&b.messages()).unwrap()
    );
}

#[test]
fn different_seeds_diverge() {
    let script: Vec<Step> = (0..6).map(|i| Step::Send(format!("p{i}"))).collect();

    let a = run_script(1, &script);
    let b = run_script(2, &script);

    assert_ne!(a.session_id(), b.session_id());
    assert!(a.decisions().first_divergence(b.decisions()).is_some());
}

// ============================================================================
// Chaos Doubling
// ============================================================================

#[test]
fn chaos_doubles_failure_rates() {
    let options = SimulatorOptions::default()
        .with_seed(7)
        .with_warning_pct(0.1)
        .with_error_pct(0.05);
    let mut sim = Simulator::new(options);
    sim.toggle_chaos_mode();

    let mut counts = [0usize; 3];
    let mut total = 0usize;

    // Batches keep the log short; clear leaves the generator and chaos alone.
    for _ in 0..10 {
        for i in 0..500 {
            sim.send_user(format!("job {i}")).unwrap();
        }
        sim.run_until_idle();

        for message in sim.messages().iter().filter(|m| m.role == Role::Assistant) {
            match message.status {
                Status::Error => counts[0] += 1,
                Status::Warning => counts[1] += 1,
                Status::Success => counts[2] += 1,
                other => panic!("unresolved message with status {other:?}"),
            }
            total += 1;
        }
        sim.clear();
    }

    assert_eq!(total, 5_000);
    let error_rate = counts[0] as f64 / total as f64;
    let warning_rate = counts[1] as f64 / total as f64;

    assert!((error_rate - 0.10).abs() < 0.02, "error rate {error_rate}");
    assert!((warning_rate - 0.20).abs() < 0.025, "warning rate {warning_rate}");
}

#[test]
fn resolved_decisions_record_chaos_state() {
    let mut sim = Simulator::new(SimulatorOptions::default().with_seed(5));
    sim.send_user("a").unwrap();
    sim.toggle_chaos_mode();
    sim.run_until_idle();

    let resolved: Vec<(Outcome, bool)> = sim
        .decisions()
        .entries()
        .iter()
        .filter_map(|entry| match &entry.decision {
            Decision::Resolved { outcome, chaos, .. } => Some((*outcome, *chaos)),
            _ => None,
        })
        .collect();

    assert_eq!(resolved.len(), 1);
    assert!(resolved[0].1);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn same_seed_same_trace(seed in any::<u32>(), steps in prop::collection::vec(step_strategy(), 0..24)) {
        let a = run_script(seed, &steps);
        let b = run_script(seed, &steps);

        prop_assert_eq!(a.messages(), b.messages());
        prop_assert_eq!(a.decisions(), b.decisions());
        prop_assert_eq!(a.now_ms(), b.now_ms());
    }

    #[test]
    fn every_reply_resolves_exactly_once(seed in any::<u32>(), steps in prop::collection::vec(step_strategy(), 0..24)) {
        let sim = run_script(seed, &steps);

        prop_assert_eq!(sim.pending(), 0);
        for message in sim.messages() {
            prop_assert!(message.is_terminal(), "{:?} left non-terminal", message.id);
            prop_assert!(message.finished_at.unwrap() >= message.started_at);
        }

        let scheduled = sim
            .decisions()
            .entries()
            .iter()
            .filter(|e| matches!(e.decision, Decision::ResolutionScheduled { .. } | Decision::LongRunningScheduled { .. }))
            .count();
        let settled = sim
            .decisions()
            .entries()
            .iter()
            .filter(|e| matches!(e.decision, Decision::Resolved { .. } | Decision::ResolutionDropped { .. }))
            .count();
        prop_assert_eq!(scheduled, settled);
    }
}
