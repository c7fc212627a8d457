//! Festive Analytics Engine — synthetic festival-season dataset and its analytics
//!
//! Provides:
//! - Festival calendar and simulation window
//! - Seasonal trend, festival effect model, sales / social generators
//! - Derived cross-table metrics (engagement, buzz index, uplift)
//! - Atomic reseed pipeline over a pluggable storage sink
//! - Read-side analytics (timeline, summary, lag analysis, counterfactual)

pub mod analytics;
pub mod calendar;
pub mod derived;
pub mod effects;
pub mod generator;
pub mod rounding;
pub mod sales;
pub mod social;
pub mod trend;

// Re-exports for convenience
pub use analytics::{
    optional_range, required_range, Analytics, AnalyticsError, CounterfactualReport, LagPoint,
    Summary, TimelinePoint, DEFAULT_LAG_DAYS,
};
pub use calendar::{default_festivals, Festival, Platform, SimulationConfig};
pub use derived::compose_derived;
pub use effects::{sales_effect, social_multiplier, SalesEffect, SalesPhase};
pub use generator::{
    generate_dataset, seed_all_data, DatasetSink, GeneratedDataset, SeedError, SeedSummary,
};
pub use sales::{generate_daily_sales, SalesDraw};
pub use social::generate_social_metrics;
pub use trend::base_curve;
