//! CLI command implementations.

use medsim_bench::{BenchmarkMetrics, BenchmarkRunner, Scenario, ScenarioKind};
use medsim_mesh::shared;
use medsim_pbd::coloring::is_vertex_disjoint;
use medsim_pbd::{PbdModel, PbdModelConfig};
use medsim_types::PbdParticleId;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn scenarios(name: &str) -> Result<Vec<ScenarioKind>, String> {
    if name == "all" {
        return Ok(ScenarioKind::all().to_vec());
    }
    ScenarioKind::from_name(name).map(|k| vec![k]).ok_or_else(|| {
        let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
        format!("Unknown scenario '{name}'. Available: {}, all", available.join(", "))
    })
}

fn load_config(path: &str) -> Result<PbdModelConfig, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let config: PbdModelConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Run benchmark scenarios.
pub fn run(
    scenario_name: &str,
    config_path: Option<&str>,
    steps: Option<u32>,
    output_path: Option<&str>,
) -> CliResult {
    println!("medsim benchmark");
    println!("════════════════");
    println!();

    let config = config_path.map(load_config).transpose()?;
    let mut all_metrics = Vec::new();

    for kind in scenarios(scenario_name)? {
        let mut scenario = Scenario::from_kind(kind);
        if let Some(config) = config {
            scenario = scenario.with_config(config);
        }
        if let Some(n) = steps {
            scenario.timesteps = n;
        }

        println!(
            "Running: {} ({} verts, {} constraint kinds, {} steps)",
            kind.name(),
            scenario.geometry.vertex_count(),
            scenario.constraints.len(),
            scenario.timesteps,
        );

        let metrics = BenchmarkRunner::run(&scenario)
            .map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Constraints:   {}", metrics.constraint_count);
        println!(
            "  Partitions:    {} (+{} sequential)",
            metrics.partition_count, metrics.sequential_count
        );
        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg step:      {:.3}ms", metrics.avg_step_time * 1000.0);
        println!("  Residual:      {:.3e}", metrics.final_residual);
        println!("  Max displace:  {:.4}m", metrics.max_displacement);
        println!();

        all_metrics.push(metrics);
    }

    let csv = BenchmarkMetrics::to_csv(&all_metrics);
    if let Some(path) = output_path {
        std::fs::write(path, &csv)?;
        println!("Results written to: {path}");
    } else {
        println!("CSV Output:");
        println!("{csv}");
    }
    Ok(())
}

/// Partition one scenario's constraints and verify bucket disjointness.
pub fn partition(scenario_name: &str, threshold: Option<usize>) -> CliResult {
    let kind = ScenarioKind::from_name(scenario_name)
        .ok_or_else(|| format!("Unknown scenario '{scenario_name}'"))?;
    let scenario = Scenario::from_kind(kind);

    let mut config = scenario.config;
    if let Some(t) = threshold {
        config.partition_threshold = t;
    }
    let mut model = PbdModel::new(config)?;
    let body = model.add_body(shared(scenario.geometry.clone()), scenario.vertex_mass);
    for &c in &scenario.constraints {
        model.enable_constraint(c, body)?;
    }
    let summary = model.partition();

    println!("medsim partition: {}", kind.name());
    println!("──────────────────");
    println!("Constraints:  {}", model.container().len());
    println!("Colors:       {}", summary.colors);
    println!("Threshold:    {}", config.partition_threshold);
    println!("Sequential:   {}", summary.sequential);
    for (i, size) in summary.partitions.iter().enumerate() {
        println!("  bucket {i:>3}: {size}");
    }

    let disjoint = model.container().inspect(|_, buckets| {
        buckets.iter().all(|bucket| {
            let sets: Vec<&[PbdParticleId]> =
                bucket.iter().map(|e| e.constraint.particles()).collect();
            is_vertex_disjoint(&sets)
        })
    });
    if !disjoint {
        return Err("Partition buckets share vertices".into());
    }
    println!("Buckets are vertex-disjoint.");
    Ok(())
}

/// Print a configuration preset as JSON.
pub fn print_config(preset: &str) -> CliResult {
    let config = match preset {
        "default" => PbdModelConfig::default(),
        "debug" => PbdModelConfig::debug(),
        "high_quality" => PbdModelConfig::high_quality(),
        other => {
            return Err(
                format!("Unknown preset '{other}'. Available: default, debug, high_quality").into(),
            )
        }
    };
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Validate a JSON configuration file.
pub fn validate_config(path: &str) -> CliResult {
    println!("Validating config: {path}");
    let config = load_config(path)?;
    println!(
        "Config is valid ({:?}, {} iterations, dt = {}).",
        config.solver_type, config.iterations, config.dt
    );
    Ok(())
}
