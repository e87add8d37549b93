//! Terminal aggregates of a run.

use std::fmt;

use blake3::Hasher;
use serde::Serialize;
use stochnet_core::elements::{Capacity, NetElement};
use stochnet_core::time::SimTime;
use stochnet_core::Network;

/// Smallest and largest gap between consecutive arrival timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GapStats {
    pub min: SimTime,
    pub max: SimTime,
}

impl GapStats {
    /// Gap extremes over the distinct arrival timestamps of all generators.
    /// `None` with fewer than two distinct timestamps.
    pub fn from_arrivals(arrivals: &[SimTime]) -> Option<Self> {
        let mut sorted = arrivals.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        sorted.windows(2).map(|w| w[1] - w[0]).fold(None, |acc, gap| {
            Some(match acc {
                None => GapStats { min: gap, max: gap },
                Some(GapStats { min, max }) => GapStats {
                    min: min.min(gap),
                    max: max.max(gap),
                },
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminatorSummary {
    pub id: String,
    pub absorbed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceSummary {
    pub id: String,
    pub capacity: Capacity,
    pub load: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionSummary {
    pub id: String,
    pub fired: u64,
    pub completed: u64,
    pub pending: u64,
}

/// Final state of a simulation, in element registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub seed: u64,
    pub horizon: SimTime,
    /// Last processed timestamp.
    pub final_time: SimTime,
    pub steps: u64,
    pub total_arrivals: u64,
    pub tokens_emitted: u64,
    pub total_absorbed: u64,
    pub total_load: u64,
    pub total_rejected: u64,
    pub pending_completions: u64,
    pub inter_arrival: Option<GapStats>,
    pub terminators: Vec<TerminatorSummary>,
    pub places: Vec<PlaceSummary>,
    pub transitions: Vec<TransitionSummary>,
}

impl Report {
    pub fn collect(
        network: &Network,
        seed: u64,
        horizon: SimTime,
        final_time: SimTime,
        steps: u64,
        inter_arrival: Option<GapStats>,
    ) -> Self {
        Self {
            seed,
            horizon,
            final_time,
            steps,
            total_arrivals: network.total_arrivals(),
            tokens_emitted: network.tokens_emitted(),
            total_absorbed: network.total_absorbed(),
            total_load: network.total_load(),
            total_rejected: network.total_rejected(),
            pending_completions: network.pending_completions(),
            inter_arrival,
            terminators: network
                .stocks()
                .iter()
                .map(|t| TerminatorSummary {
                    id: t.id().to_string(),
                    absorbed: t.load(),
                })
                .collect(),
            places: network
                .places()
                .iter()
                .map(|p| PlaceSummary {
                    id: p.id().to_string(),
                    capacity: p.capacity(),
                    load: p.load(),
                    rejected: p.rejected(),
                })
                .collect(),
            transitions: network
                .transitions()
                .iter()
                .map(|t| TransitionSummary {
                    id: t.id().to_string(),
                    fired: t.fired(),
                    completed: t.completed(),
                    pending: t.pending(),
                })
                .collect(),
        }
    }

    pub fn terminator(&self, id: &str) -> Option<&TerminatorSummary> {
        self.terminators.iter().find(|t| t.id == id)
    }

    pub fn place(&self, id: &str) -> Option<&PlaceSummary> {
        self.places.iter().find(|p| p.id == id)
    }

    /// BLAKE3 hex digest of every aggregate. Equal digests mean equal runs.
    pub fn digest(&self) -> String {
        let mut hasher = Hasher::new();
        for value in [
            self.seed,
            self.horizon,
            self.final_time,
            self.steps,
            self.total_arrivals,
            self.tokens_emitted,
            self.total_absorbed,
            self.total_load,
            self.total_rejected,
            self.pending_completions,
        ] {
            hasher.update(&value.to_le_bytes());
        }
        match self.inter_arrival {
            Some(gaps) => {
                hasher.update(&[1]);
                hasher.update(&gaps.min.to_le_bytes());
                hasher.update(&gaps.max.to_le_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }
        for t in &self.terminators {
            update_id(&mut hasher, &t.id);
            hasher.update(&t.absorbed.to_le_bytes());
        }
        for p in &self.places {
            update_id(&mut hasher, &p.id);
            hasher.update(&p.capacity.limit().unwrap_or(u64::MAX).to_le_bytes());
            hasher.update(&p.load.to_le_bytes());
            hasher.update(&p.rejected.to_le_bytes());
        }
        for t in &self.transitions {
            update_id(&mut hasher, &t.id);
            hasher.update(&t.fired.to_le_bytes());
            hasher.update(&t.completed.to_le_bytes());
            hasher.update(&t.pending.to_le_bytes());
        }
        hex::encode(hasher.finalize().as_bytes())
    }
}

/// Length-prefixed so adjacent identifiers cannot run together.
fn update_id(hasher: &mut Hasher, id: &str) {
    hasher.update(&(id.len() as u64).to_le_bytes());
    hasher.update(id.as_bytes());
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Simulation stopped at t={} (horizon {}) after {} steps",
            self.final_time, self.horizon, self.steps
        )?;
        writeln!(f, "Total arrivals: {}", self.total_arrivals)?;
        for t in &self.terminators {
            writeln!(f, "Terminator: {}, load={}", t.id, t.absorbed)?;
        }
        for p in &self.places {
            write!(
                f,
                "Place: {}, capacity={}, load={}",
                p.id, p.capacity, p.load
            )?;
            if p.rejected > 0 {
                write!(f, ", rejected={}", p.rejected)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Model total load: {}", self.total_load)?;
        writeln!(f, "Pending completions: {}", self.pending_completions)?;
        match self.inter_arrival {
            Some(gaps) => write!(
                f,
                "Inter-arrival gap: min={}, max={}",
                gaps.min, gaps.max
            ),
            None => write!(f, "Inter-arrival gap: n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_stats() {
        assert_eq!(GapStats::from_arrivals(&[]), None);
        assert_eq!(GapStats::from_arrivals(&[4]), None);
        assert_eq!(
            GapStats::from_arrivals(&[9, 1, 3, 4]),
            Some(GapStats { min: 1, max: 5 })
        );
    }

    #[test]
    fn test_gap_stats_ignore_shared_timestamps() {
        assert_eq!(
            GapStats::from_arrivals(&[2, 2, 4, 4]),
            Some(GapStats { min: 2, max: 2 })
        );
        assert_eq!(GapStats::from_arrivals(&[3, 3]), None);
    }

    fn sample_report() -> Report {
        Report {
            seed: 1,
            horizon: 10,
            final_time: 10,
            steps: 11,
            total_arrivals: 10,
            tokens_emitted: 10,
            total_absorbed: 0,
            total_load: 5,
            total_rejected: 5,
            pending_completions: 0,
            inter_arrival: Some(GapStats { min: 1, max: 1 }),
            terminators: vec![TerminatorSummary {
                id: "Terminator".into(),
                absorbed: 0,
            }],
            places: vec![PlaceSummary {
                id: "queue".into(),
                capacity: Capacity::Bounded(5),
                load: 5,
                rejected: 5,
            }],
            transitions: vec![],
        }
    }

    #[test]
    fn test_digest_tracks_every_field() {
        let report = sample_report();
        let digest = report.digest();
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, sample_report().digest());

        let mut changed = sample_report();
        changed.places[0].rejected = 4;
        assert_ne!(changed.digest(), digest);

        let mut changed = sample_report();
        changed.terminators[0].id = "Sink".into();
        assert_ne!(changed.digest(), digest);
    }

    #[test]
    fn test_display() {
        let text = sample_report().to_string();
        assert!(text.contains("Total arrivals: 10"));
        assert!(text.contains("Place: queue, capacity=5, load=5, rejected=5"));
        assert!(text.contains("Terminator: Terminator, load=0"));
        assert!(text.contains("Inter-arrival gap: min=1, max=1"));
    }
}
