//! Cosmetic progress indicator shown while an upload is in flight.
//! It advances on a fixed cadence and does not track the real request.

use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior, interval_at};

pub const STEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStep {
    pub percent: u8,
    pub label: &'static str,
}

pub const STEPS: [ProgressStep; 4] = [
    ProgressStep {
        percent: 20,
        label: "Extraindo texto do PDF...",
    },
    ProgressStep {
        percent: 50,
        label: "Buscando tributos...",
    },
    ProgressStep {
        percent: 80,
        label: "Identificando empresas...",
    },
    ProgressStep {
        percent: 100,
        label: "Finalizando análise...",
    },
];

/// Yields each of [`STEPS`] once, one per [`STEP_INTERVAL`], starting one interval after creation.
pub struct Ticker {
    interval: Interval,
    next: usize,
}

impl Ticker {
    pub fn new() -> Self {
        let mut interval = interval_at(tokio::time::Instant::now() + STEP_INTERVAL, STEP_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, next: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.next >= STEPS.len()
    }

    /// Waits for the next step. Returns `None` once all steps were emitted.
    pub async fn tick(&mut self) -> Option<ProgressStep> {
        let step = *STEPS.get(self.next)?;
        self.interval.tick().await;
        self.next += 1;
        Some(step)
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}
