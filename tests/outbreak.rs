use approx::assert_abs_diff_eq;
use geospread::prelude::*;
use geospread::rand::rngs::SmallRng;
use geospread::rand::SeedableRng;
use geospread::{advance_simulation, reset_to_origin, StepInput};

const WUHAN: GeoPoint = GeoPoint::new(30.5928, 114.3055);

fn run_days(
    parameters: &SimulationParameters,
    mitigations: &MitigationMeasures,
    days: u32,
    seed: u64,
) -> Vec<Vec<InfectionSite>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut sites = reset_to_origin(WUHAN);
    let mut snapshots = Vec::new();
    for day in 1..=days {
        let input = StepInput {
            day,
            running: true,
            origin: WUHAN,
            parameters,
            mitigations,
        };
        sites = advance_simulation(sites, &input, &mut rng);
        snapshots.push(sites.clone());
    }
    snapshots
}

fn with_r0(r0: f64) -> SimulationParameters {
    SimulationParameters {
        r0,
        ..SimulationParameters::default()
    }
}

#[test]
fn mitigations_never_speed_up_growth() {
    let parameters = with_r0(8.0);
    let none = MitigationMeasures::default();
    let all = MitigationMeasures {
        travel_restrictions: true,
        social_distancing: true,
        mask_usage: true,
        vaccination: 30.0,
    };
    for seed in 0..10 {
        let free = run_days(&parameters, &none, 15, seed);
        let mitigated = run_days(&parameters, &all, 15, seed);
        for (free, mitigated) in free.iter().zip(&mitigated) {
            assert!(mitigated.len() <= free.len());
        }
    }
}

#[test]
fn wuhan_default_parameters_stay_at_the_origin() {
    // R0 2 gives a spread factor of 0.4, so a single site never spawns another.
    let snapshots = run_days(&with_r0(2.0), &MitigationMeasures::default(), 30, 7);
    assert!(snapshots.iter().all(|sites| sites.len() == 1));
}

#[test]
fn long_runs_respect_capacity() {
    let snapshots = run_days(&with_r0(40.0), &MitigationMeasures::default(), 300, 3);
    let mut compactions = 0;
    for pair in snapshots.windows(2) {
        assert!(pair[1].len() <= 150);
        if pair[1].len() < pair[0].len() {
            compactions += 1;
            assert_eq!(pair[1].len(), 140);
        }
    }
    assert!(compactions > 0);
}

#[test]
fn every_site_is_on_the_marker_shell() {
    let snapshots = run_days(&with_r0(40.0), &MitigationMeasures::default(), 60, 11);
    for site in snapshots.last().unwrap() {
        assert_abs_diff_eq!(site.position.length(), 1.01, epsilon = 1e-9);
        let geo = to_geo(&site.position, 1.01);
        assert!(geo.lat.abs() <= 85.0 + 1e-9);
        assert!((0.2..=1.0).contains(&site.intensity));
        assert!((0.01..=0.03).contains(&site.radius));
    }
}

#[test]
fn idle_step_resets_any_state() {
    let snapshots = run_days(&with_r0(40.0), &MitigationMeasures::default(), 20, 5);
    let grown = snapshots.last().unwrap().clone();
    assert!(grown.len() > 1);

    let parameters = with_r0(40.0);
    let mitigations = MitigationMeasures::default();
    let input = StepInput {
        day: 21,
        running: false,
        origin: WUHAN,
        parameters: &parameters,
        mitigations: &mitigations,
    };
    let mut rng = SmallRng::seed_from_u64(0);
    let sites = advance_simulation(grown, &input, &mut rng);
    assert_eq!(sites, reset_to_origin(WUHAN));
}

#[test]
fn context_run_from_config_file() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data/mitigated_measles.json");
    let config = load_config(&path).unwrap();
    assert_eq!(config.pathogen, Some(Pathogen::Measles));

    let mut context = Context::new();
    context.init_random(2024);
    context.init_outbreak(&config);
    context.start_outbreak();
    context.execute();

    let status = context.outbreak_status();
    assert_eq!(status.day, 20);
    assert!(status.running);
    assert_abs_diff_eq!(status.r0, 15.0);
    assert_abs_diff_eq!(status.effective_r0, 15.0 * 0.7 * 0.75, epsilon = 1e-12);
    // Day n is simulated at time (n - 1) / speed.
    assert_abs_diff_eq!(context.get_current_time(), 19.0 / 2.5, epsilon = 1e-9);
    assert_eq!(context.outbreak_history().len(), 20);
    assert!(context.infection_sites().len() <= 150);
}
