//! Risk scoring and Markdown exposure report rendering (§4.4).

mod render;
mod risk;

pub use render::{
    generate_exposure_report, AccountFinding, BreachFinding, BrokerFinding, ExposureReportInputs,
    SearchExposureFinding,
};
pub use risk::{compute_risk_score, risk_label, RiskLabel};
