//! IRT and quadrature primitives for the CAT engine.

pub mod math;

pub use math::eap::{eap_estimate, ResponseRecord, GRID_MAX, GRID_MIN, GRID_POINTS};
pub use math::irt::{fisher_information_2pl, probability_2pl};
pub use math::normal::{
    standard_normal_cdf, standard_normal_log_pdf, standard_normal_pdf, standard_normal_quantile,
};
pub use math::stable::{log_add_exp, log_sub_exp, log_sum_exp};
