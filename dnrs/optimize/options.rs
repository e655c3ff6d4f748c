use bon::Builder;
use clap::ValueEnum;

/// How a [`crate::optimize::Solution`] is rendered.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportStyle {
    /// Key-value summary lines.
    Summary,
    /// Summary lines followed by a per-switch state table.
    Table,
}

#[derive(Debug, Clone, Builder)]
pub struct OptimizeOptions {
    #[builder(default = ReportStyle::Summary)]
    pub report_style: ReportStyle,

    /// Include the analytic lower bound on the minimum loss in the report.
    #[builder(default = true)]
    pub lower_bound: bool,
}
