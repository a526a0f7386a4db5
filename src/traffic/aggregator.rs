//! Grid fan-out and report assembly.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::metrics;

use super::client::FlowSource;
use super::grid::{sample_grid, GeoPoint};
use super::types::TrafficReportEntry;

/// Counts for one aggregation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationSummary {
    /// Grid points queried.
    pub requested: usize,
    /// Entries emitted.
    pub emitted: usize,
    /// Points skipped because the provider had no flow data.
    pub skipped: usize,
    /// Points skipped because the lookup failed.
    pub failed: usize,
}

/// Queries a flow source over the sample grid and builds the report.
#[derive(Debug, Clone)]
pub struct TrafficAggregator {
    source: Arc<dyn FlowSource>,
    max_concurrency: usize,
}

impl TrafficAggregator {
    /// Create an aggregator allowing `max_concurrency` lookups in flight.
    pub fn new(source: Arc<dyn FlowSource>, max_concurrency: usize) -> Self {
        Self {
            source,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Lookups allowed in flight per aggregation.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Build the report for `center`.
    ///
    /// Entries come back in grid order. Points without flow data and points
    /// whose lookup failed are left out, so the result may be empty.
    pub async fn aggregate(&self, center: GeoPoint) -> Vec<TrafficReportEntry> {
        self.aggregate_with_summary(center).await.0
    }

    /// Like [`aggregate`](Self::aggregate), also returning per-run counts.
    #[instrument(skip(self, center), fields(center = %center))]
    pub async fn aggregate_with_summary(
        &self,
        center: GeoPoint,
    ) -> (Vec<TrafficReportEntry>, AggregationSummary) {
        let _timer = metrics::timer_aggregation();
        let grid = sample_grid(center);

        let mut summary = AggregationSummary {
            requested: grid.len(),
            ..AggregationSummary::default()
        };

        // `buffered` yields in input order regardless of completion order.
        let results: Vec<_> = stream::iter(grid)
            .map(|point| {
                let source = Arc::clone(&self.source);
                async move { (point, source.fetch_flow(point).await) }
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut entries = Vec::with_capacity(results.len());
        for (point, result) in results {
            match result {
                Ok(Some(sample)) => entries.push(TrafficReportEntry::from_sample(point, sample)),
                Ok(None) => {
                    debug!(point = %point, "No flow data, skipping point");
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!(point = %point, error = %e, "Flow lookup failed, skipping point");
                    summary.failed += 1;
                }
            }
        }
        summary.emitted = entries.len();

        metrics::add_points_skipped((summary.skipped + summary.failed) as u64);
        info!(
            emitted = summary.emitted,
            skipped = summary.skipped,
            failed = summary.failed,
            "Traffic aggregation complete"
        );

        (entries, summary)
    }
}
