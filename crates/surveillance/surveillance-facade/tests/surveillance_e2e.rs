//! End-to-end tests for the surveillance pipeline
//!
//! Tests complete runs from configuration to forecast using only the
//! facade's API.

use std::collections::HashSet;

use surveillance_facade::prelude::*;
use surveillance_facade::{SurveillancePipeline, MAX_HORIZON_WEEKS};

fn two_clinic_config() -> SurveillanceConfig {
    SurveillanceConfig::default().with_registry(RegistryConfig::default().with_sites(vec![
        ClinicSite::new("CF Felippe Cardoso (Penha)", -22.8427502, -43.2815405),
        ClinicSite::new("CF Zilda Arns (Complexo do Alemão)", -22.865377, -43.269168),
    ]))
}

#[test]
fn e2e_two_clinics_full_year() {
    let run = SurveillancePipeline::new().run(&two_clinic_config()).unwrap();

    // 2 clinics x 3 diseases x 52 weeks
    assert_eq!(run.historical.len(), 312);
    assert!(run.report.is_complete());
    assert_eq!(run.report.forecasts().len(), 6);
    assert_eq!(run.report.importances().len(), 3);

    // One forecast per (clinic, disease) of the history
    let expected: HashSet<(String, DiseaseCategory)> = run
        .historical
        .iter()
        .map(|r| (r.clinic.clone(), r.disease))
        .collect();
    let forecast: HashSet<(String, DiseaseCategory)> = run
        .report
        .forecasts()
        .iter()
        .map(|r| (r.clinic.clone(), r.disease))
        .collect();
    assert_eq!(expected, forecast);

    // Forecasts follow the last historical week
    let last_week = run.historical.iter().map(|r| r.week).max().unwrap();
    assert!(run
        .report
        .forecasts()
        .iter()
        .all(|r| r.week == last_week + chrono::Duration::weeks(1)));
}

#[test]
fn e2e_importances_sum_to_one() {
    let run = SurveillancePipeline::new().run(&two_clinic_config()).unwrap();
    for importance in run.report.importances() {
        assert!((importance.total() - 1.0).abs() < 1e-9);
        assert!(importance.entries.iter().all(|e| (0.0..=1.0).contains(&e.importance)));
        let features = importance.disease.default_profile().features;
        assert_eq!(importance.entries.len(), features.len());
    }
}

#[test]
fn e2e_same_seed_reproduces_every_table() {
    let config = two_clinic_config().with_seed(2024);
    let first = SurveillancePipeline::new().run(&config).unwrap();
    let second = SurveillancePipeline::new().run(&config).unwrap();

    assert_eq!(
        serde_json::to_string(&*first.historical).unwrap(),
        serde_json::to_string(&*second.historical).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&first.report.forecasts()).unwrap(),
        serde_json::to_string(&second.report.forecasts()).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&first.report.importances()).unwrap(),
        serde_json::to_string(&second.report.importances()).unwrap()
    );
}

#[test]
fn e2e_parallelism_does_not_change_output() {
    let parallel = SurveillancePipeline::new().run(&two_clinic_config()).unwrap();
    let config = two_clinic_config()
        .with_forecast(ForecastConfig::default().sequential());
    let sequential = SurveillancePipeline::new().run(&config).unwrap();

    assert_eq!(parallel.report, sequential.report);
}

#[test]
fn e2e_different_seed_changes_history() {
    let a = SurveillancePipeline::new().run(&two_clinic_config().with_seed(1)).unwrap();
    let b = SurveillancePipeline::new().run(&two_clinic_config().with_seed(2)).unwrap();
    assert_ne!(*a.historical, *b.historical);
}

#[test]
fn e2e_single_disease_run() {
    let config = two_clinic_config().with_disease_names(&["influenza"]).unwrap();
    let run = SurveillancePipeline::new().run(&config).unwrap();

    assert_eq!(run.historical.len(), 2 * 52);
    assert_eq!(run.historical.diseases(), vec![DiseaseCategory::Influenza]);
    assert_eq!(run.report.outcomes().len(), 1);
    assert_eq!(
        run.report.highest_risk_disease(),
        Some(DiseaseCategory::Influenza)
    );
}

#[test]
fn e2e_risk_summary() {
    let run = SurveillancePipeline::new().run(&two_clinic_config()).unwrap();
    let summary = run.summary();

    assert_eq!(summary.monitored_clinics, 2);
    assert_eq!(summary.disease_totals.len(), 3);
    let totals: Vec<u64> = summary.disease_totals.iter().map(|(_, t)| *t).collect();
    assert!(totals.windows(2).all(|w| w[0] >= w[1]));

    let top = run.report.highest_risk_clinic().unwrap();
    assert!(run
        .report
        .forecasts()
        .iter()
        .all(|r| r.predicted_case_count <= top.predicted_case_count));

    let ranking = run.report.ranking(DiseaseCategory::Dengue);
    assert_eq!(ranking.len(), 2);
    assert!(ranking[0].predicted_case_count >= ranking[1].predicted_case_count);

    let history = run.historical.clinic_history("CF Felippe Cardoso (Penha)");
    assert_eq!(history.len(), 3 * 52);
}

#[test]
fn e2e_configuration_errors_stop_the_run() {
    let mut pipeline = SurveillancePipeline::new();

    let zero_horizon =
        two_clinic_config().with_simulation(SimulationConfig::default().with_horizon(0));
    assert_eq!(
        pipeline.run(&zero_horizon).unwrap_err(),
        ConfigurationError::ZeroHorizon
    );

    let duplicate = SurveillanceConfig::default().with_registry(
        RegistryConfig::default().with_sites(vec![
            ClinicSite::new("Same", -22.8, -43.2),
            ClinicSite::new("Same", -22.9, -43.3),
        ]),
    );
    assert_eq!(
        pipeline.run(&duplicate).unwrap_err(),
        ConfigurationError::DuplicateClinic("Same".to_string())
    );

    let mut inverted = two_clinic_config();
    inverted.registry.risk_factor_range = ValueRange::new(1.8, 1.0);
    assert!(matches!(
        pipeline.run(&inverted).unwrap_err(),
        ConfigurationError::InvalidRange { .. }
    ));

    let calendar_end = two_clinic_config().with_simulation(
        SimulationConfig::default()
            .with_start_date(chrono::NaiveDate::MAX - chrono::Duration::days(10)),
    );
    assert!(matches!(
        pipeline.run(&calendar_end).unwrap_err(),
        ConfigurationError::InvalidParameter { name, .. } if name == "start_date"
    ));

    let too_long = two_clinic_config()
        .with_simulation(SimulationConfig::default().with_horizon(MAX_HORIZON_WEEKS + 1));
    assert!(matches!(
        pipeline.run(&too_long).unwrap_err(),
        ConfigurationError::InvalidParameter { name, .. } if name == "horizon_weeks"
    ));

    assert!(two_clinic_config().with_disease_names(&["ebola"]).is_err());
    assert!(pipeline.cache().is_empty());
}

#[test]
fn e2e_json_configuration() {
    let json = r#"{
        "seed": 5,
        "diseases": ["Dengue", "Chikungunya"],
        "registry": { "sites": [
            { "name": "CF Wilma Costa (Cocotá)", "latitude": -22.803715, "longitude": -43.1813638 }
        ] },
        "simulation": { "horizon_weeks": 26 },
        "forecast": { "forest": { "n_trees": 15 } }
    }"#;
    let config: SurveillanceConfig = serde_json::from_str(json).unwrap();
    let run = SurveillancePipeline::new().run(&config).unwrap();

    assert_eq!(run.historical.len(), 2 * 26);
    assert_eq!(run.report.forecasts().len(), 2);
}
