//! Benchmark runner: builds a PBD model for a scenario, steps it and
//! collects metrics.

use std::time::Instant;

use medsim_mapping::{GeometryMap, TetraTriangleMap};
use medsim_mesh::{read_geometry, shared, Geometry, SharedGeometry};
use medsim_pbd::PbdModel;
use medsim_types::MedsimResult;
use tracing::info;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

pub struct BenchmarkRunner;

/// Extracted boundary surface driven by the simulated volume.
struct MappedSurface {
    surface: SharedGeometry,
    vertex_map: Vec<usize>,
    map: TetraTriangleMap,
}

impl MappedSurface {
    fn build(volume: &SharedGeometry) -> MedsimResult<Self> {
        let extraction = read_geometry(volume).as_tetrahedral()?.extract_surface()?;
        let surface = shared(extraction.surface);
        let mut map = TetraTriangleMap::between(volume.clone(), surface.clone())?;
        map.compute()?;
        Ok(Self {
            surface,
            vertex_map: extraction.vertex_map,
            map,
        })
    }

    /// Largest gap between a mapped surface vertex and its source vertex.
    fn error(&self, volume: &SharedGeometry) -> f64 {
        let volume = read_geometry(volume);
        let surface = read_geometry(&self.surface);
        surface
            .positions()
            .iter()
            .zip(&self.vertex_map)
            .map(|(p, &v)| p.distance(volume.positions()[v]))
            .fold(0.0, f64::max)
    }
}

fn element_count(geometry: &Geometry) -> usize {
    match geometry {
        Geometry::PointSet(_) => 0,
        Geometry::Line(m) => m.cell_count(),
        Geometry::Surface(m) => m.cell_count(),
        Geometry::Tetrahedral(m) => m.cell_count(),
    }
}

impl BenchmarkRunner {
    /// Runs a single scenario.
    pub fn run(scenario: &Scenario) -> MedsimResult<BenchmarkMetrics> {
        let mut model = PbdModel::new(scenario.config)?;
        let geometry = shared(scenario.geometry.clone());
        let body = model.add_body(geometry.clone(), scenario.vertex_mass);
        model.fix_vertices(body, &scenario.pinned)?;
        for &kind in &scenario.constraints {
            model.enable_constraint(kind, body)?;
        }
        let partition = model.partition();

        let mut mapped = if scenario.map_surface {
            Some(MappedSurface::build(&geometry)?)
        } else {
            None
        };

        let mut step_times = Vec::with_capacity(scenario.timesteps as usize);
        let mut total_iterations = 0u64;
        let mut final_residual = 0.0;
        let total_start = Instant::now();

        for _ in 0..scenario.timesteps {
            let start = Instant::now();
            let report = model.step();
            if let Some(mapped) = mapped.as_mut() {
                mapped.map.apply();
            }
            step_times.push(start.elapsed().as_secs_f64());
            total_iterations += u64::from(report.iterations);
            final_residual = report.final_residual;
        }
        let total_wall_time = total_start.elapsed().as_secs_f64();

        let initial = scenario.geometry.initial_positions();
        let max_displacement = model
            .state()
            .body(body)
            .map(|b| {
                b.positions
                    .iter()
                    .zip(initial)
                    .map(|(p, q)| p.distance(*q))
                    .fold(0.0, f64::max)
            })
            .unwrap_or(0.0);

        let steps = step_times.len().max(1) as f64;
        let metrics = BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            vertex_count: scenario.geometry.vertex_count(),
            element_count: element_count(&scenario.geometry),
            constraint_count: model.container().len(),
            partition_count: partition.partitions.len(),
            sequential_count: partition.sequential,
            timesteps: scenario.timesteps,
            total_wall_time,
            avg_step_time: step_times.iter().sum::<f64>() / steps,
            min_step_time: step_times.iter().copied().reduce(f64::min).unwrap_or(0.0),
            max_step_time: step_times.iter().copied().fold(0.0, f64::max),
            avg_iterations: total_iterations as f64 / steps,
            final_residual,
            final_kinetic_energy: model.kinetic_energy(),
            max_displacement,
            max_map_error: mapped.as_ref().map_or(0.0, |m| m.error(&geometry)),
        };
        info!(
            scenario = %metrics.scenario,
            wall_time = metrics.total_wall_time,
            partitions = metrics.partition_count,
            "Benchmark finished"
        );
        Ok(metrics)
    }

    /// Runs every scenario, overriding its step count when `timesteps` is set.
    pub fn run_all(timesteps: Option<u32>) -> MedsimResult<Vec<BenchmarkMetrics>> {
        ScenarioKind::all()
            .iter()
            .map(|&kind| {
                let mut scenario = Scenario::from_kind(kind);
                if let Some(n) = timesteps {
                    scenario.timesteps = n;
                }
                Self::run(&scenario)
            })
            .collect()
    }
}
