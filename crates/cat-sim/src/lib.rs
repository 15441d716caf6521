//! Monte Carlo simulation harness for the CAT engine: synthetic item banks,
//! a simulated-examinee loop driving the real `cat_core::CatEngine`, and
//! quintile-stratified metrics rendered into a Markdown validation report.

pub mod bank;
pub mod config;
pub mod examinee;
pub mod metrics;
pub mod report;

pub use bank::generate_item_bank;
pub use config::SimulationConfig;
pub use examinee::{run_examinee, simulate_response, ExamineeResult};
pub use metrics::{aggregate_results, compute_quintile_metrics, QuintileMetrics, SimulationResult, EXIT_CRITERIA_PASS_RATE};
pub use report::generate_report;
