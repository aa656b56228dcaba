//! Optional metrics instrumentation for shushdb.
//!
//! When the `observe` feature is enabled, transaction lifecycle events emit
//! counters and histograms via the [`metrics`] crate. A downstream
//! application must install a metrics recorder (e.g. `metrics-exporter-prometheus`)
//! to collect the data.
//!
//! When the feature is **not** enabled every function in this module is a
//! zero-cost no-op.

/// Record a write transaction commit (counter + latency histogram).
///
/// - `shushdb.txn.commits_total` – incremented on every commit
/// - `shushdb.txn.commit_duration_seconds` – histogram of commit latency
#[inline]
pub fn record_commit(duration: std::time::Duration) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("shushdb.txn.commits_total").increment(1);
        metrics::histogram!("shushdb.txn.commit_duration_seconds").record(duration.as_secs_f64());
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = duration;
    }
}

/// Record a write transaction abort.
///
/// - `shushdb.txn.aborts_total` – counter with `reason` label (`explicit` / `error` / `drop`)
#[inline]
pub fn record_abort(reason: &'static str) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("shushdb.txn.aborts_total", "reason" => reason).increment(1);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = reason;
    }
}

/// Record a read transaction being opened.
///
/// - `shushdb.txn.reads_total` – counter
#[inline]
pub fn record_read_txn() {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("shushdb.txn.reads_total").increment(1);
    }
}

/// Record stale reader slots reclaimed at open or on demand.
///
/// - `shushdb.env.stale_readers_cleared_total` – counter
#[inline]
pub fn record_stale_readers(cleared: usize) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("shushdb.env.stale_readers_cleared_total").increment(cleared as u64);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = cleared;
    }
}
