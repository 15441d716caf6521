//! Renders a simulation run into the Markdown report an operator reads to
//! judge whether the engine meets its precision and content-balance goals.

use crate::config::SimulationConfig;
use crate::metrics::{SimulationResult, EXIT_CRITERIA_PASS_RATE, RMSE_QUINTILE_TOLERANCE};
use cat_config::CatConfig;
use std::fmt::Write as _;

/// Render `result` as a Markdown report: configuration, overall metrics,
/// quintile breakdown, stopping-reason distribution, and exit-criteria
/// validation.
pub fn generate_report(sim_config: &SimulationConfig, cat_config: &CatConfig, result: &SimulationResult) -> String {
    let mut out = String::new();

    writeln!(out, "# CAT Simulation Report\n").unwrap();

    writeln!(out, "## Simulation Configuration\n").unwrap();
    writeln!(out, "- **N Examinees**: {}", sim_config.n_examinees).unwrap();
    writeln!(out, "- **Theta Distribution**: N({}, {}\u{b2})", sim_config.theta_mean, sim_config.theta_sd).unwrap();
    writeln!(out, "- **SE Threshold**: {}", cat_config.se_threshold).unwrap();
    writeln!(out, "- **Min Items**: {}", cat_config.min_items).unwrap();
    writeln!(out, "- **Max Items**: {}", cat_config.max_items).unwrap();
    writeln!(out, "- **Min Items per Domain (stopping)**: {}", cat_config.min_items_per_domain).unwrap();
    writeln!(
        out,
        "- **Item Selection Mode**: {}",
        if sim_config.deterministic_selection {
            "Deterministic (k=1)"
        } else {
            "Randomesque (k=5, production)"
        }
    )
    .unwrap();
    writeln!(out, "- **Random Seed**: {}\n", sim_config.seed).unwrap();

    writeln!(out, "## Overall Metrics\n").unwrap();
    writeln!(out, "| Metric | Value |").unwrap();
    writeln!(out, "|--------|-------|").unwrap();
    writeln!(out, "| Mean Items | {:.2} |", result.overall_mean_items).unwrap();
    writeln!(out, "| Median Items | {:.1} |", result.overall_median_items).unwrap();
    writeln!(out, "| Mean SE | {:.3} |", result.overall_mean_se).unwrap();
    writeln!(out, "| Mean Bias | {:.3} |", result.overall_mean_bias).unwrap();
    writeln!(out, "| RMSE | {:.3} |", result.overall_rmse).unwrap();
    writeln!(out, "| Convergence Rate | {:.1}% |\n", result.overall_convergence_rate * 100.0).unwrap();

    writeln!(out, "## Quintile Breakdown\n").unwrap();
    writeln!(out, "| Quintile | N | Mean Items | Median Items | Mean SE | RMSE | Convergence |").unwrap();
    writeln!(out, "|----------|---|------------|--------------|---------|------|-------------|").unwrap();
    for qm in &result.quintile_metrics {
        writeln!(
            out,
            "| {} | {} | {:.2} | {:.1} | {:.3} | {:.3} | {:.1}% |",
            qm.label,
            qm.n,
            qm.mean_items,
            qm.median_items,
            qm.mean_se,
            qm.rmse,
            qm.convergence_rate * 100.0
        )
        .unwrap();
    }
    writeln!(out).unwrap();

    writeln!(out, "## Stopping Reason Distribution\n").unwrap();
    writeln!(out, "| Reason | Count | Percentage |").unwrap();
    writeln!(out, "|--------|-------|------------|").unwrap();
    let total: u32 = result.stopping_reason_counts.values().sum();
    let mut reasons: Vec<(&String, &u32)> = result.stopping_reason_counts.iter().collect();
    reasons.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (reason, count) in reasons {
        let pct = if total > 0 { *count as f64 / total as f64 } else { 0.0 };
        writeln!(out, "| {reason} | {count} | {:.1}% |", pct * 100.0).unwrap();
    }
    writeln!(out).unwrap();

    writeln!(out, "## Exit Criteria Validation\n").unwrap();
    let conv_pass = if result.overall_convergence_rate >= EXIT_CRITERIA_PASS_RATE {
        "PASS"
    } else {
        "FAIL"
    };
    writeln!(
        out,
        "- **SE < {:.2} in \u{2264}{} items for \u{2265}90% of examinees**: {conv_pass} ({:.1}%)",
        cat_config.se_threshold,
        cat_config.max_items,
        result.overall_convergence_rate * 100.0
    )
    .unwrap();

    let balance_pass = if result.content_balance_rate >= EXIT_CRITERIA_PASS_RATE {
        "PASS"
    } else {
        "FAIL"
    };
    writeln!(
        out,
        "- **Content balance (all domains \u{2265}{} items) for \u{2265}90% of tests**: {balance_pass} ({:.1}%)",
        cat_config.min_items_per_domain,
        result.content_balance_rate * 100.0
    )
    .unwrap();

    let rmse_pass = if result.rmse_stable_across_quintiles { "PASS" } else { "FAIL" };
    let max_deviation = result
        .quintile_metrics
        .iter()
        .filter(|qm| qm.n > 0)
        .map(|qm| (qm.rmse - result.overall_rmse).abs())
        .fold(0.0_f64, f64::max);
    writeln!(
        out,
        "- **RMSE bounded and roughly constant across quintiles (within {:.2} of overall)**: {rmse_pass} (max deviation {:.3})",
        RMSE_QUINTILE_TOLERANCE, max_deviation
    )
    .unwrap();

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::examinee::ExamineeResult;
    use crate::metrics::aggregate_results;

    fn sample_result() -> ExamineeResult {
        ExamineeResult {
            true_theta: 0.5,
            estimated_theta: 0.4,
            final_se: 0.25,
            bias: -0.1,
            items_administered: 10,
            stopping_reason: "se_threshold".to_string(),
            converged: true,
            domain_coverage: cat_core::empty_coverage(),
        }
    }

    #[test]
    fn report_contains_every_expected_section() {
        let sim_config = SimulationConfig::default();
        let cat_config = CatConfig::default();
        let result = aggregate_results(&[sample_result()], cat_config.min_items_per_domain);
        let report = generate_report(&sim_config, &cat_config, &result);
        assert!(report.contains("## Simulation Configuration"));
        assert!(report.contains("## Overall Metrics"));
        assert!(report.contains("## Quintile Breakdown"));
        assert!(report.contains("## Stopping Reason Distribution"));
        assert!(report.contains("## Exit Criteria Validation"));
    }

    #[test]
    fn report_asserts_all_three_exit_criteria() {
        let sim_config = SimulationConfig::default();
        let cat_config = CatConfig::default();
        let result = aggregate_results(&[sample_result()], cat_config.min_items_per_domain);
        let report = generate_report(&sim_config, &cat_config, &result);
        assert!(report.contains("SE <"));
        assert!(report.contains("Content balance"));
        assert!(report.contains("RMSE bounded and roughly constant across quintiles"));
    }

    #[test]
    fn report_renders_stopping_reason_row() {
        let sim_config = SimulationConfig::default();
        let cat_config = CatConfig::default();
        let result = aggregate_results(&[sample_result()], cat_config.min_items_per_domain);
        let report = generate_report(&sim_config, &cat_config, &result);
        assert!(report.contains("se_threshold"));
    }
}
