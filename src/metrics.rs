//! Process-wide request counters exposed at `/api/metrics`.
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::Instant;

static REQUESTS: AtomicU64 = AtomicU64::new(0);
static REJECTIONS: AtomicU64 = AtomicU64::new(0);
static ENEMIES_DEFEATED: AtomicU64 = AtomicU64::new(0);
static SAVES: AtomicU64 = AtomicU64::new(0);
static LOADS: AtomicU64 = AtomicU64::new(0);
static LATENCY_SUM_MS: AtomicU64 = AtomicU64::new(0);
static LATENCY_COUNT: AtomicU64 = AtomicU64::new(0);

static COMMAND_COUNTERS: OnceLock<Mutex<BTreeMap<String, CommandCounter>>> = OnceLock::new();

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCounter {
    pub accepted: u64,
    pub rejected: u64,
}

fn command_counters() -> MutexGuard<'static, BTreeMap<String, CommandCounter>> {
    COMMAND_COUNTERS
        .get_or_init(|| Mutex::new(BTreeMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn observe_request(started: Instant) {
    let ms = started.elapsed().as_millis() as u64;
    REQUESTS.fetch_add(1, Ordering::Relaxed);
    LATENCY_SUM_MS.fetch_add(ms, Ordering::Relaxed);
    LATENCY_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// Count one executed command by verb, split by whether it was accepted.
pub fn record_command(verb: &str, success: bool) -> CommandCounter {
    if !success {
        REJECTIONS.fetch_add(1, Ordering::Relaxed);
    }
    let mut guard = command_counters();
    let counter = guard.entry(verb.to_string()).or_default();
    if success {
        counter.accepted = counter.accepted.saturating_add(1);
    } else {
        counter.rejected = counter.rejected.saturating_add(1);
    }
    *counter
}

pub fn inc_enemies_defeated() {
    ENEMIES_DEFEATED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_saves() {
    SAVES.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_loads() {
    LOADS.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub requests: u64,
    pub rejections: u64,
    pub enemies_defeated: u64,
    pub saves: u64,
    pub loads: u64,
    pub latency_avg_ms: Option<u64>,
    pub commands: BTreeMap<String, CommandCounter>,
}

pub fn snapshot() -> Snapshot {
    let sum = LATENCY_SUM_MS.load(Ordering::Relaxed);
    let count = LATENCY_COUNT.load(Ordering::Relaxed);
    Snapshot {
        requests: REQUESTS.load(Ordering::Relaxed),
        rejections: REJECTIONS.load(Ordering::Relaxed),
        enemies_defeated: ENEMIES_DEFEATED.load(Ordering::Relaxed),
        saves: SAVES.load(Ordering::Relaxed),
        loads: LOADS.load(Ordering::Relaxed),
        latency_avg_ms: if count > 0 { Some(sum / count) } else { None },
        commands: command_counters().clone(),
    }
}
