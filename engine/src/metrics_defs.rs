use shared::metrics_defs::{MetricDef, MetricType};

pub const AIRPORTS_UPDATED: MetricDef = MetricDef {
    name: "sync.airports.updated",
    metric_type: MetricType::Counter,
    description: "Airports successfully refreshed and persisted by a bulk sync",
};

pub const AIRPORTS_FAILED: MetricDef = MetricDef {
    name: "sync.airports.failed",
    metric_type: MetricType::Counter,
    description: "Airports a bulk sync could not refresh or persist",
};

pub const BATCH_FALLBACKS: MetricDef = MetricDef {
    name: "sync.directory.batch_fallbacks",
    metric_type: MetricType::Counter,
    description: "Batch directory lookups that degraded to per-airport lookups",
};

pub const ALL_METRICS: &[MetricDef] = &[AIRPORTS_UPDATED, AIRPORTS_FAILED, BATCH_FALLBACKS];
