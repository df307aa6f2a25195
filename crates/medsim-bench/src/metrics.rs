//! Metrics collected during a benchmark run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    pub scenario: String,
    pub vertex_count: usize,
    /// Cells of the simulated geometry (segments, triangles or tetrahedra).
    pub element_count: usize,
    pub constraint_count: usize,
    /// Parallel buckets after partitioning.
    pub partition_count: usize,
    /// Constraints left in the sequential pool.
    pub sequential_count: usize,
    pub timesteps: u32,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    pub avg_step_time: f64,
    pub min_step_time: f64,
    pub max_step_time: f64,
    pub avg_iterations: f64,
    /// Solver residual of the last step.
    pub final_residual: f64,
    pub final_kinetic_energy: f64,
    /// Largest distance of any vertex from its rest position.
    pub max_displacement: f64,
    /// Largest distance between a mapped surface vertex and the volume
    /// vertex it was extracted from (0 when no surface is mapped).
    pub max_map_error: f64,
}

impl BenchmarkMetrics {
    pub fn to_csv_header() -> String {
        "scenario,vertex_count,element_count,constraint_count,partitions,sequential,timesteps,total_wall_time_s,avg_step_ms,min_step_ms,max_step_ms,avg_iterations,final_residual,final_ke,max_displacement,max_map_error".to_string()
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.1},{:.6e},{:.6e},{:.6},{:.3e}",
            self.scenario,
            self.vertex_count,
            self.element_count,
            self.constraint_count,
            self.partition_count,
            self.sequential_count,
            self.timesteps,
            self.total_wall_time,
            self.avg_step_time * 1000.0,
            self.min_step_time * 1000.0,
            self.max_step_time * 1000.0,
            self.avg_iterations,
            self.final_residual,
            self.final_kinetic_energy,
            self.max_displacement,
            self.max_map_error,
        )
    }

    /// Header plus one row per run.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}
