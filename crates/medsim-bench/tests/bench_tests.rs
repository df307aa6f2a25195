//! Integration tests for medsim-bench.

use medsim_bench::{BenchmarkMetrics, BenchmarkRunner, Scenario, ScenarioKind};
use medsim_pbd::PbdModelConfig;

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn hanging_strand_setup() {
    let s = Scenario::hanging_strand();
    assert_eq!(s.kind, ScenarioKind::HangingStrand);
    assert_eq!(s.geometry.vertex_count(), 41);
    assert_eq!(s.pinned, vec![0]);
    assert_eq!(s.config.parameters.bend_stride, 2);
}

#[test]
fn hanging_sheet_setup() {
    let s = Scenario::hanging_sheet();
    assert_eq!(s.geometry.vertex_count(), 441); // 21×21
    assert_eq!(s.pinned.len(), 21);
}

#[test]
fn tet_block_pins_top_face() {
    let s = Scenario::tet_block();
    // 9 × 5 vertices on the top face of an 8×4×4 grid
    assert_eq!(s.pinned.len(), 45);
    assert!(s.map_surface);
    assert_eq!(s.geometry.as_tetrahedral().unwrap().cell_count(), 8 * 4 * 4 * 6);
}

#[test]
fn scenario_names_round_trip() {
    assert_eq!(ScenarioKind::all().len(), 3);
    for &kind in ScenarioKind::all() {
        assert_eq!(ScenarioKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(ScenarioKind::from_name("sphere_drape"), None);
}

// ─── Runner Tests ─────────────────────────────────────────────

#[test]
fn run_hanging_strand() {
    let mut scenario = Scenario::hanging_strand();
    scenario.timesteps = 5;
    let metrics = BenchmarkRunner::run(&scenario).unwrap();

    assert_eq!(metrics.scenario, "hanging_strand");
    assert_eq!(metrics.timesteps, 5);
    // 40 edges + bend triples with stride 2
    assert_eq!(metrics.constraint_count, 40 + 37);
    assert!(metrics.max_displacement > 0.0);
    assert_eq!(metrics.max_map_error, 0.0);
}

#[test]
fn tet_block_surface_follows_volume() {
    let mut scenario = Scenario::tet_block();
    scenario.timesteps = 3;
    let metrics = BenchmarkRunner::run(&scenario).unwrap();
    assert!(metrics.max_displacement > 0.0);
    assert!(metrics.max_map_error < 1e-9);
    assert!(metrics.partition_count > 0);
}

#[test]
fn sequential_config_has_no_partitions() {
    let config = PbdModelConfig {
        partition_threshold: usize::MAX,
        ..PbdModelConfig::default()
    };
    let mut scenario = Scenario::hanging_sheet().with_config(config);
    scenario.timesteps = 2;
    let metrics = BenchmarkRunner::run(&scenario).unwrap();
    assert_eq!(metrics.partition_count, 0);
    assert_eq!(metrics.sequential_count, metrics.constraint_count);
}

#[test]
fn run_all_scenarios() {
    let results = BenchmarkRunner::run_all(Some(2)).unwrap();
    assert_eq!(results.len(), 3);
    for (metrics, kind) in results.iter().zip(ScenarioKind::all()) {
        assert_eq!(metrics.scenario, kind.name());
        assert_eq!(metrics.timesteps, 2);
        assert!(metrics.avg_iterations > 0.0);
    }
}

// ─── Metrics Tests ────────────────────────────────────────────

#[test]
fn csv_has_header_and_rows() {
    let results = BenchmarkRunner::run_all(Some(1)).unwrap();
    let csv = BenchmarkMetrics::to_csv(&results);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    let columns = lines[0].split(',').count();
    assert!(lines[1..].iter().all(|l| l.split(',').count() == columns));
    assert!(lines[1].starts_with("hanging_strand,"));
}

#[test]
fn metrics_serialize_to_json() {
    let mut scenario = Scenario::hanging_strand();
    scenario.timesteps = 1;
    let metrics = BenchmarkRunner::run(&scenario).unwrap();
    let json = serde_json::to_string(&metrics).unwrap();
    let back: BenchmarkMetrics = serde_json::from_str(&json).unwrap();
    assert_eq!(back.scenario, metrics.scenario);
    assert_eq!(back.constraint_count, metrics.constraint_count);
}
