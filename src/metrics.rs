//! Observability for relation builds and the queries behind them.
//!
//! - `metrics` feature: a Prometheus-exported OpenTelemetry meter (`METRICS`).
//! - `tracing` feature: span constructors in [`tracing_helpers`].

#[cfg(feature = "metrics")]
pub use self::otel::{TetherMetrics, METRICS};

#[cfg(feature = "metrics")]
mod otel {
    use once_cell::sync::Lazy;
    use opentelemetry::{
        metrics::{Counter, Histogram, MeterProvider as _},
        KeyValue,
    };
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{Registry, TextEncoder};
    use std::time::Duration;

    pub static METRICS: Lazy<TetherMetrics> = Lazy::new(TetherMetrics::init);

    pub struct TetherMetrics {
        pub registry: Registry,
        _provider: SdkMeterProvider,
        pub queries_total: Counter<u64>,
        pub query_errors_total: Counter<u64>,
        pub query_duration: Histogram<f64>,
        pub relation_lookups_total: Counter<u64>,
        pub relation_lookup_duration: Histogram<f64>,
        pub relation_unresolved_ids_total: Counter<u64>,
    }

    impl TetherMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let exporter = opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build()
                .expect("failed to build prometheus exporter");
            // Collection stops once the provider is dropped
            let provider = SdkMeterProvider::builder().with_reader(exporter).build();
            let meter = provider.meter("tether");

            let queries_total = meter
                .u64_counter("tether_queries_total")
                .with_description("Total queries executed")
                .build();

            let query_errors_total = meter
                .u64_counter("tether_query_errors_total")
                .with_description("Queries that returned an error")
                .build();

            let query_duration = meter
                .f64_histogram("tether_query_duration_seconds")
                .with_description("Duration of queries")
                .build();

            let relation_lookups_total = meter
                .u64_counter("tether_relation_lookups_total")
                .with_description("Identifier lookups issued by relation builders")
                .build();

            let relation_lookup_duration = meter
                .f64_histogram("tether_relation_lookup_duration_seconds")
                .with_description("Duration of relation identifier lookups")
                .build();

            let relation_unresolved_ids_total = meter
                .u64_counter("tether_relation_unresolved_ids_total")
                .with_description("Requested identifiers that no lookup resolved")
                .build();

            Self {
                registry,
                _provider: provider,
                queries_total,
                query_errors_total,
                query_duration,
                relation_lookups_total,
                relation_lookup_duration,
                relation_unresolved_ids_total,
            }
        }

        /// Prometheus text exposition of everything recorded so far
        pub fn render(&self) -> Result<String, prometheus::Error> {
            TextEncoder::new().encode_to_string(&self.registry.gather())
        }

        pub fn record_query_duration(&self, elapsed: Duration) {
            self.queries_total.add(1, &[]);
            self.query_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_query_error(&self) {
            self.query_errors_total.add(1, &[]);
        }

        /// Record one relation lookup. `unresolved` is the number of distinct
        /// identifiers the lookup did not return a model for.
        pub fn record_relation_lookup(&self, relation: &str, elapsed: Duration, unresolved: usize) {
            let attrs = [KeyValue::new("relation", relation.to_string())];
            self.relation_lookups_total.add(1, &attrs);
            self.relation_lookup_duration
                .record(elapsed.as_secs_f64(), &attrs);
            if unresolved > 0 {
                self.relation_unresolved_ids_total
                    .add(unresolved as u64, &attrs);
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::METRICS;
        use std::time::Duration;

        #[test]
        fn test_partial_lookup_is_exported() {
            METRICS.record_relation_lookup("posts", Duration::from_millis(3), 1);

            let text = METRICS.render().unwrap();
            let line = text
                .lines()
                .find(|l| l.starts_with("tether_relation_unresolved_ids_total{"))
                .expect("unresolved counter should be exported");
            assert!(line.contains(r#"relation="posts""#), "{line}");
            assert!(text.contains("tether_relation_lookups_total"));
        }

        #[test]
        fn test_query_timings_are_exported() {
            METRICS.record_query_duration(Duration::from_millis(12));
            METRICS.record_query_error();

            let text = METRICS.render().unwrap();
            assert!(text.contains("tether_queries_total"));
            assert!(text.contains("tether_query_errors_total"));
            assert!(text.contains("tether_query_duration_seconds_bucket"));
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::Span;

    pub fn acquire_connection_span() -> Span {
        tracing::info_span!("tether.acquire_connection")
    }

    pub fn execute_query_span(query: &str) -> Span {
        tracing::debug_span!("tether.execute_query", db.statement = query)
    }

    pub fn relation_build_span(relation: &str, kind: &str) -> Span {
        tracing::debug_span!("tether.relation.build", relation, kind)
    }

    pub fn relation_lookup_span(relation: &str, requested: usize) -> Span {
        tracing::info_span!("tether.relation.lookup", relation, requested)
    }
}
