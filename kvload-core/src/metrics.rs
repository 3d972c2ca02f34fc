//! Latency samples and summary statistics

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One recorded operation outcome; immutable once recorded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Wall-clock span from issue to full response, in milliseconds
    pub latency_ms: f64,
    pub success: bool,
}

/// Summary of a closed sample set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub count: usize,
    pub successes: usize,
    pub errors: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencyStats {
    /// Summarize `samples`; `None` when there are none
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut latencies: Vec<f64> = samples.iter().map(|s| s.latency_ms).collect();
        latencies.sort_by(|a, b| a.total_cmp(b));

        let count = latencies.len();
        let successes = samples.iter().filter(|s| s.success).count();

        Some(Self {
            count,
            successes,
            errors: count - successes,
            min: latencies[0],
            max: latencies[count - 1],
            mean: latencies.iter().sum::<f64>() / count as f64,
            median: median(&latencies),
            p95: nearest_rank(&latencies, 95),
            p99: nearest_rank(&latencies, 99),
        })
    }

    /// Failed operations as a fraction of all operations
    pub fn error_rate(&self) -> f64 {
        self.errors as f64 / self.count as f64
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice.
///
/// Index is `floor(len * percentile / 100)` clamped to `len - 1`; no interpolation.
pub fn nearest_rank(sorted: &[f64], percentile: u32) -> f64 {
    let index = sorted.len() * percentile as usize / 100;
    sorted[index.min(sorted.len() - 1)]
}

/// Middle value of an ascending, non-empty slice (mean of the two middle values for even lengths)
pub fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[derive(Debug, Default)]
struct CollectorState {
    samples: Vec<Sample>,
    successes: usize,
    errors: usize,
}

/// Per-client sample sink.
///
/// Written only by its owning worker; read by the orchestrator once that
/// worker has joined. The lock makes both sides safe from any task.
#[derive(Debug)]
pub struct MetricsCollector {
    client_index: usize,
    state: Mutex<CollectorState>,
}

impl MetricsCollector {
    pub fn new(client_index: usize) -> Self {
        Self {
            client_index,
            state: Mutex::new(CollectorState::default()),
        }
    }

    pub fn client_index(&self) -> usize {
        self.client_index
    }

    /// Append a sample
    pub fn record(&self, latency_ms: f64, success: bool) {
        let mut state = self.state.lock();
        state.samples.push(Sample {
            latency_ms,
            success,
        });
        if success {
            state.successes += 1;
        } else {
            state.errors += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn successes(&self) -> usize {
        self.state.lock().successes
    }

    pub fn errors(&self) -> usize {
        self.state.lock().errors
    }

    /// Copy of the samples in issue order
    pub fn samples(&self) -> Vec<Sample> {
        self.state.lock().samples.clone()
    }

    pub fn summarize(&self) -> Option<LatencyStats> {
        LatencyStats::from_samples(&self.state.lock().samples)
    }
}
