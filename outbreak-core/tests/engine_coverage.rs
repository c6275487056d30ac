use std::cell::RefCell;
use std::rc::Rc;

use outbreak_core::{
    BuildError, ClockReading, InitialInfection, OutbreakEngine, OutcomeKind, RegionCatalog,
    RegionId, RegionInfo, SimEvent, SimulationConfig,
};

fn catalog(ids: &[&str]) -> RegionCatalog {
    RegionCatalog {
        regions: ids.iter().map(|id| RegionInfo::new(id, id)).collect(),
        urban_hubs: Vec::new(),
    }
}

fn config_with_seed_infection(seed_infection: f32) -> SimulationConfig {
    SimulationConfig {
        initial_infection: InitialInfection {
            min: seed_infection,
            max: seed_infection,
        },
        ..SimulationConfig::default()
    }
}

fn recording_engine(
    cfg: SimulationConfig,
    regions: &[&str],
) -> (OutbreakEngine, Rc<RefCell<Vec<SimEvent>>>) {
    let mut engine = OutbreakEngine::new(cfg, 0xDEAD).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    engine.initialize(&catalog(regions)).unwrap();
    seen.borrow_mut().clear();
    (engine, seen)
}

#[test]
fn hour_of_growth_matches_base_rate_on_day_one() {
    let mut cfg = config_with_seed_infection(0.10);
    cfg.virus.base_infection_per_hour = 0.02;
    let mut engine = OutbreakEngine::new(cfg, 1).unwrap();
    engine.initialize(&catalog(&["a"])).unwrap();

    engine.advance(60.0, 1);
    let province = engine.province(&RegionId::new("a")).unwrap();
    // virus strength factor is 1.0 on day 1
    assert!((province.infection_level - 0.12).abs() < 1e-6);
}

#[test]
fn later_days_amplify_growth() {
    let mut cfg = config_with_seed_infection(0.10);
    cfg.virus.base_infection_per_hour = 0.02;
    cfg.virus.daily_growth_rate = 0.5;
    let mut engine = OutbreakEngine::new(cfg, 1).unwrap();
    engine.initialize(&catalog(&["a"])).unwrap();

    engine.advance(60.0, 3);
    let province = engine.province(&RegionId::new("a")).unwrap();
    // day 3: factor 1 + 2 * 0.5 = 2.0
    assert!((province.infection_level - 0.14).abs() < 1e-6);
}

#[test]
fn outposts_disable_when_infection_crosses_the_threshold() {
    let mut cfg = config_with_seed_infection(0.75);
    cfg.virus.base_infection_per_hour = 0.03;
    cfg.virus.daily_growth_rate = 0.0;
    cfg.outposts.local_cure_per_hour = 0.01;
    cfg.costs.base_cost = 10;
    cfg.costs.cost_per_existing_outpost = 0;
    let mut engine = OutbreakEngine::new(cfg, 1).unwrap();
    engine.initialize(&catalog(&["a"])).unwrap();
    engine.try_build_outpost(&RegionId::new("a")).unwrap();

    // net +0.02/hour while the outpost still works
    engine.advance(120.0, 1);
    let province = engine.province(&RegionId::new("a")).unwrap();
    assert!((province.infection_level - 0.79).abs() < 1e-6);
    assert!(!province.outposts_disabled);

    engine.advance(60.0, 1);
    let province = engine.province(&RegionId::new("a")).unwrap();
    assert!(province.infection_level >= 0.8);
    assert!(province.outposts_disabled);

    // disabled outposts stop curing, so the full base rate applies
    engine.advance(60.0, 1);
    let province = engine.province(&RegionId::new("a")).unwrap();
    assert!((province.infection_level - 0.84).abs() < 1e-6);
    assert!(province.outposts_disabled);
}

#[test]
fn national_outpost_cost_exhausts_the_budget() {
    let mut cfg = config_with_seed_infection(0.10);
    cfg.starting_budget = 20;
    cfg.costs.base_cost = 20;
    cfg.costs.cost_per_existing_outpost = 8;
    let mut engine = OutbreakEngine::new(cfg, 1).unwrap();
    engine.initialize(&catalog(&["a", "b"])).unwrap();

    let quote = engine.can_build_outpost(&RegionId::new("a")).unwrap();
    assert_eq!(quote.cost, 20);
    let receipt = engine.try_build_outpost(&RegionId::new("a")).unwrap();
    assert_eq!(receipt.remaining_budget, 0);

    // the next outpost anywhere costs 28 now
    assert_eq!(
        engine.can_build_outpost(&RegionId::new("b")),
        Err(BuildError::NotEnoughZar {
            cost: 28,
            budget: 0
        })
    );
    assert_eq!(
        engine.can_build_outpost(&RegionId::new("a")),
        Err(BuildError::NotEnoughZar {
            cost: 28,
            budget: 0
        })
    );
}

#[test]
fn simultaneous_full_infection_defeats_once() {
    let mut cfg = config_with_seed_infection(0.90);
    cfg.virus.base_infection_per_hour = 0.10;
    cfg.virus.daily_growth_rate = 0.0;
    let (mut engine, seen) = recording_engine(cfg, &["a", "b"]);

    let summary = engine.advance(60.0, 4);
    assert!(summary.outcome_reached);
    assert!(summary.all_infected);

    let outcome = engine.outcome().unwrap();
    assert_eq!(outcome.kind, OutcomeKind::Defeat);
    assert_eq!(outcome.day, 4);
    assert_eq!(outcome.provinces_saved, 0);
    assert_eq!(outcome.provinces_fully_infected, 2);

    let outcome_events = seen
        .borrow()
        .iter()
        .filter(|e| matches!(e, SimEvent::OutcomeReached { .. }))
        .count();
    assert_eq!(outcome_events, 1);

    // further ticks keep running but never re-decide
    let summary = engine.advance(60.0, 5);
    assert!(!summary.outcome_reached);
    let outcome_events = seen
        .borrow()
        .iter()
        .filter(|e| matches!(e, SimEvent::OutcomeReached { .. }))
        .count();
    assert_eq!(outcome_events, 1);
}

#[test]
fn cure_completion_wins_and_stays_won() {
    let mut cfg = config_with_seed_infection(0.10);
    cfg.virus.base_infection_per_hour = 0.0;
    cfg.outposts.global_cure_per_hour = 0.05;
    cfg.outposts.diminishing_factor = 1.0;
    cfg.costs.base_cost = 10;
    cfg.costs.cost_per_existing_outpost = 0;
    let (mut engine, seen) = recording_engine(cfg, &["a", "b"]);

    engine.try_build_outpost(&RegionId::new("a")).unwrap();
    engine.try_build_outpost(&RegionId::new("b")).unwrap();

    // factor 2.0 at 0.05/hour: a full day saturates the cure
    let summary = engine.advance(1_440.0, 2);
    assert!(summary.cure_completed);
    assert!(summary.outcome_reached);

    let outcome = engine.outcome().unwrap();
    assert_eq!(outcome.kind, OutcomeKind::Victory);
    assert_eq!(outcome.day, 2);
    assert_eq!(outcome.provinces_saved, 2);
    assert_eq!(outcome.provinces_fully_infected, 0);
    assert!((outcome.global.cure_progress - 1.0).abs() < f32::EPSILON);

    engine.advance(1_440.0, 3);
    let events = seen.borrow();
    let completions = events
        .iter()
        .filter(|e| matches!(e, SimEvent::CureCompleted))
        .count();
    let outcomes = events
        .iter()
        .filter(|e| matches!(e, SimEvent::OutcomeReached { .. }))
        .count();
    assert_eq!(completions, 1);
    assert_eq!(outcomes, 1);
}

#[test]
fn cure_progress_is_monotonic_across_ticks() {
    let mut cfg = config_with_seed_infection(0.10);
    cfg.costs.base_cost = 10;
    cfg.costs.cost_per_existing_outpost = 0;
    let mut engine = OutbreakEngine::new(cfg, 1).unwrap();
    engine.initialize(&catalog(&["a", "b", "c"])).unwrap();
    engine.try_build_outpost(&RegionId::new("a")).unwrap();

    let mut previous = engine.global_state().unwrap().cure_progress;
    for day in 1..=10 {
        engine.advance(240.0, day);
        let progress = engine.global_state().unwrap().cure_progress;
        assert!(progress >= previous);
        previous = progress;
    }
}

#[test]
fn zero_elapsed_advance_is_idempotent() {
    let mut engine = OutbreakEngine::new(config_with_seed_infection(0.30), 1).unwrap();
    engine.initialize(&catalog(&["a", "b"])).unwrap();
    engine.advance(90.0, 1);

    let provinces_before: Vec<_> = engine.provinces().to_vec();
    let global_before = engine.global_state().unwrap();

    for _ in 0..5 {
        engine.advance(0.0, 2);
    }
    assert_eq!(engine.provinces(), provinces_before.as_slice());
    assert_eq!(engine.global_state().unwrap(), global_before);
}

#[test]
fn clock_feed_handles_rollover_and_backwards_readings() {
    let mut cfg = config_with_seed_infection(0.10);
    cfg.virus.base_infection_per_hour = 0.02;
    cfg.virus.daily_growth_rate = 0.0;
    cfg.clock.minutes_per_day = 1_440.0;
    let mut engine = OutbreakEngine::new(cfg, 1).unwrap();
    engine.initialize(&catalog(&["a"])).unwrap();

    let summary = engine.advance_clock(ClockReading::new(1, 1_380.0));
    assert!((summary.elapsed_minutes - 0.0).abs() < f32::EPSILON);

    // one simulated hour spanning midnight
    let summary = engine.advance_clock(ClockReading::new(2, 0.0));
    assert!((summary.elapsed_minutes - 60.0).abs() < 1e-3);
    let province = engine.province(&RegionId::new("a")).unwrap();
    assert!((province.infection_level - 0.12).abs() < 1e-5);

    // a backwards reading clamps to zero elapsed and changes nothing
    let before = engine.province(&RegionId::new("a")).unwrap().clone();
    let summary = engine.advance_clock(ClockReading::new(1, 600.0));
    assert!((summary.elapsed_minutes - 0.0).abs() < f32::EPSILON);
    assert_eq!(engine.province(&RegionId::new("a")).unwrap(), &before);
}

#[test]
fn province_events_precede_the_global_event_within_a_tick() {
    let cfg = config_with_seed_infection(0.10);
    let (mut engine, seen) = recording_engine(cfg, &["a", "b", "c"]);

    engine.advance(60.0, 1);
    let events = seen.borrow();
    let last_province = events
        .iter()
        .rposition(|e| matches!(e, SimEvent::ProvinceChanged { .. }))
        .unwrap();
    let first_global = events
        .iter()
        .position(|e| matches!(e, SimEvent::GlobalChanged { .. }))
        .unwrap();
    assert!(last_province < first_global);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, SimEvent::GlobalChanged { .. }))
            .count(),
        1
    );
}

#[test]
fn urban_hubs_accelerate_the_cure() {
    let mut cfg = config_with_seed_infection(0.10);
    cfg.virus.base_infection_per_hour = 0.0;
    cfg.outposts.urban_hub_bonus = 2.0;
    cfg.costs.base_cost = 10;
    cfg.costs.cost_per_existing_outpost = 0;

    let run = |hubs: Vec<RegionId>| {
        let mut catalog = catalog(&["a", "b"]);
        catalog.urban_hubs = hubs;
        let mut engine = OutbreakEngine::new(cfg, 1).unwrap();
        engine.initialize(&catalog).unwrap();
        engine.try_build_outpost(&RegionId::new("a")).unwrap();
        engine.advance(600.0, 1);
        engine.global_state().unwrap().cure_progress
    };

    let plain = run(Vec::new());
    let boosted = run(vec![RegionId::new("a")]);
    assert!(boosted > plain);
    assert!((boosted - plain * 2.0).abs() < 1e-6);
}
