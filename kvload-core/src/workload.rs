//! Workload policies: pure mappings from operation index to operation
//!
//! Every policy is stateless and deterministic, so repeating a run with the
//! same parameters replays the same key sequence.

use kvload_config::WorkloadKind;
use std::sync::Arc;

use crate::protocol::Operation;

/// Keys accessed by most of the hot-key traffic
pub const HOT_KEY_COUNT: usize = 5;
/// Keys sharing the remaining hot-key traffic
pub const COLD_KEY_COUNT: usize = 100;
/// Share of hot-key operations (out of 100) aimed at hot keys
pub const HOT_KEY_PERCENT: usize = 80;

/// A named operation mix
pub trait Workload: Send + Sync {
    /// Short identifier, e.g. `read-heavy`
    fn name(&self) -> &'static str;

    /// Human-readable mix description
    fn description(&self) -> &'static str;

    /// Operation number `op_index` of client `client_index`
    fn operation(&self, client_index: usize, op_index: usize, key_range: usize) -> Operation;
}

/// Per-client key for the ratio policies
pub fn client_key(client_index: usize, op_index: usize, key_range: usize) -> String {
    format!("key_{}_{}", client_index, op_index % key_range.max(1))
}

/// Value written by operation `op_index` of client `client_index`
pub fn client_value(client_index: usize, op_index: usize) -> String {
    format!("value_{}_{}", client_index, op_index)
}

/// Throwaway operation used to prime server-side state before measuring
pub fn warmup_operation(index: usize) -> Operation {
    let key = format!("warmup_key_{}", index / 2);
    if index % 2 == 0 {
        Operation::set(key, "warmup_value")
    } else {
        Operation::get(key)
    }
}

/// 1 write per 9 reads
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadHeavy;

impl Workload for ReadHeavy {
    fn name(&self) -> &'static str {
        "read-heavy"
    }

    fn description(&self) -> &'static str {
        "Read-Heavy (90% read, 10% write)"
    }

    fn operation(&self, client_index: usize, op_index: usize, key_range: usize) -> Operation {
        let key = client_key(client_index, op_index, key_range);
        if op_index % 10 == 0 {
            Operation::set(key, client_value(client_index, op_index))
        } else {
            Operation::get(key)
        }
    }
}

/// 1 read per 9 writes
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteHeavy;

impl Workload for WriteHeavy {
    fn name(&self) -> &'static str {
        "write-heavy"
    }

    fn description(&self) -> &'static str {
        "Write-Heavy (10% read, 90% write)"
    }

    fn operation(&self, client_index: usize, op_index: usize, key_range: usize) -> Operation {
        let key = client_key(client_index, op_index, key_range);
        if op_index % 10 == 0 {
            Operation::get(key)
        } else {
            Operation::set(key, client_value(client_index, op_index))
        }
    }
}

/// Write on even indices, read on odd
#[derive(Debug, Clone, Copy, Default)]
pub struct Balanced;

impl Workload for Balanced {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn description(&self) -> &'static str {
        "Balanced (50% read, 50% write)"
    }

    fn operation(&self, client_index: usize, op_index: usize, key_range: usize) -> Operation {
        let key = client_key(client_index, op_index, key_range);
        if op_index % 2 == 0 {
            Operation::set(key, client_value(client_index, op_index))
        } else {
            Operation::get(key)
        }
    }
}

/// 6 reads, 3 writes, 1 delete per 10 operations
#[derive(Debug, Clone, Copy, Default)]
pub struct Mixed;

impl Workload for Mixed {
    fn name(&self) -> &'static str {
        "mixed"
    }

    fn description(&self) -> &'static str {
        "Mixed (60% read, 30% write, 10% delete)"
    }

    fn operation(&self, client_index: usize, op_index: usize, key_range: usize) -> Operation {
        let key = client_key(client_index, op_index, key_range);
        match op_index % 10 {
            0..=5 => Operation::get(key),
            6..=8 => Operation::set(key, client_value(client_index, op_index)),
            _ => Operation::delete(key),
        }
    }
}

/// Skewed access: 80% of operations on five shared hot keys.
///
/// The hot and cold pools are shared by all clients and `key_range` is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct HotKey;

impl HotKey {
    fn key(op_index: usize) -> String {
        if op_index % 100 < HOT_KEY_PERCENT {
            format!("hot_key_{}", op_index % HOT_KEY_COUNT)
        } else {
            format!("cold_key_{}", op_index % COLD_KEY_COUNT)
        }
    }
}

impl Workload for HotKey {
    fn name(&self) -> &'static str {
        "hot-key"
    }

    fn description(&self) -> &'static str {
        "Hot Keys (80% hot, 20% cold)"
    }

    fn operation(&self, client_index: usize, op_index: usize, _key_range: usize) -> Operation {
        let key = Self::key(op_index);
        if op_index % 2 == 0 {
            Operation::set(key, client_value(client_index, op_index))
        } else {
            Operation::get(key)
        }
    }
}

/// Policy implementing a configured workload kind
pub fn policy_for(kind: WorkloadKind) -> Arc<dyn Workload> {
    match kind {
        WorkloadKind::ReadHeavy => Arc::new(ReadHeavy),
        WorkloadKind::WriteHeavy => Arc::new(WriteHeavy),
        WorkloadKind::Balanced => Arc::new(Balanced),
        WorkloadKind::Mixed => Arc::new(Mixed),
        WorkloadKind::HotKey => Arc::new(HotKey),
    }
}
