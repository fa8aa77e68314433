use async_trait::async_trait;
use caravan_roster::{Assignment, BusId, IngestError, IngestionSource, Participant, ParticipantId};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FIRST_NAMES: &[&str] = &[
    "Mohammed", "Fatima", "Ahmed", "Aisha", "Omar", "Mariam", "Ali", "Layla", "Hassan", "Zainab",
    "Youssef", "Nour", "Ibrahim", "Sara", "Karim",
];
const LAST_NAMES: &[&str] = &[
    "Al-Farsi", "El-Masri", "Al-Rashid", "Bouazizi", "Khalil", "Bennani", "Al-Ahmed", "Hakimi",
    "Zidane", "Mansour", "Haddad", "Ibrahim", "Kaddour", "El-Amrani",
];
const ASSIGNERS: &[&str] = &["Ahmed", "Mohamed", "Sara", "Admin User"];

/// Fraction of fixture participants that come pre-assigned to a bus.
const ASSIGNED_RATIO: f64 = 0.7;
const WEEK_SECONDS: i64 = 604_800;

/// Ingestion source that fabricates a roster, for demos and offline
/// development. With a seed the output is deterministic, so tests can
/// assert on it.
pub struct FixtureSource {
    count: usize,
    buses: Vec<BusId>,
    seed: Option<u64>,
}

impl FixtureSource {
    pub fn new(count: usize, buses: Vec<BusId>) -> Self {
        Self {
            count,
            buses,
            seed: None,
        }
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn generate(&self) -> Vec<Participant> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let now = Utc::now();

        (0..self.count)
            .map(|index| {
                let first_name = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
                let last_name = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
                let ticket_id = format!("T{}", rng.gen_range(1000..10_000));

                let assignment = if !self.buses.is_empty() && rng.gen_bool(ASSIGNED_RATIO) {
                    Assignment::Assigned {
                        bus: self.buses[rng.gen_range(0..self.buses.len())],
                        at: now - Duration::seconds(rng.gen_range(0..WEEK_SECONDS)),
                        by: ASSIGNERS[rng.gen_range(0..ASSIGNERS.len())].to_owned(),
                    }
                } else {
                    Assignment::Unassigned
                };

                Participant {
                    id: ParticipantId::new(format!("p{}", 1000 + index + 1)),
                    first_name: first_name.to_owned(),
                    last_name: last_name.to_owned(),
                    ticket_id,
                    assignment,
                }
            })
            .collect()
    }
}

#[async_trait]
impl IngestionSource for FixtureSource {
    async fn fetch(&self) -> Result<Vec<Participant>, IngestError> {
        Ok(self.generate())
    }

    fn describe(&self) -> String {
        format!("fixture ({} participants)", self.count)
    }
}
