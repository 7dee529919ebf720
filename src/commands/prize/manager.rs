use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};

use crate::commands::prize::models::{
    AddPrizeReport, DrawOutcome, ParticipantListing, Prize, PrizePool,
};
use crate::commands::prize::parser::parse_prize_tokens;
use crate::commands::prize::record::{decode_lenient, decode_strict, encode_pretty, parse_text};
use crate::commands::prize::strategies::{DrawStrategy, UniformDrawStrategy};
use crate::error::{Error, Result};
use crate::persistence::RecordStore;

// Owns the prize pool. Every mutation takes the pool lock, applies the change
// and writes the record before the lock is released.
#[non_exhaustive]
pub struct PrizePoolManager {
    pool: Mutex<PrizePool>,
    store: Arc<dyn RecordStore>,
    strategy: Box<dyn DrawStrategy>,
}

impl PrizePoolManager {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        PrizePoolManager {
            pool: Mutex::new(PrizePool::new()),
            store,
            strategy: Box::new(UniformDrawStrategy::new()),
        }
    }

    // Creates the manager with the pool read from the store. Unreadable data
    // results in an empty pool, malformed entries are skipped.
    pub fn load(store: Arc<dyn RecordStore>) -> Self {
        let pool = match store.read() {
            Ok(Some(contents)) => match parse_text(&contents) {
                Ok(record) => {
                    let (pool, discarded) = decode_lenient(&record);
                    if !discarded.is_empty() {
                        warn!("Skipped {} malformed prize(s): {}", discarded.len(), discarded.join(", "));
                    }
                    pool
                }
                Err(err) => {
                    error!("Can't parse the stored prize data, starting from scratch: {}", err);
                    PrizePool::new()
                }
            },
            Ok(None) => {
                info!("No stored prize data found, starting from scratch");
                PrizePool::new()
            }
            Err(err) => {
                error!("Can't read the stored prize data, starting from scratch: {}", err);
                PrizePool::new()
            }
        };

        info!("Loaded {} prize(s)", pool.len());
        PrizePoolManager {
            pool: Mutex::new(pool),
            store,
            strategy: Box::new(UniformDrawStrategy::new()),
        }
    }

    // Overrides the algorithm used for picking winners.
    pub fn with_strategy(mut self, strategy: Box<dyn DrawStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    // Returns a copy of all prizes in display order.
    pub fn get_prizes(&self) -> Result<Vec<Prize>> {
        let guard_pool = self.pool.lock()?;
        Ok(guard_pool.prizes().to_vec())
    }

    pub fn prize_names(&self) -> Result<Vec<String>> {
        let guard_pool = self.pool.lock()?;
        Ok(guard_pool.names())
    }

    pub fn get_prize(&self, name: &str) -> Result<Prize> {
        let guard_pool = self.pool.lock()?;
        match guard_pool.get(name) {
            Some(prize) => Ok(prize.clone()),
            None => Err(Error::NotFound(name.to_string())),
        }
    }

    // Adds prizes from the `name[:count], ...` input. Existing prizes are
    // reported back and never modified.
    pub fn add_prizes(&self, input: &str) -> Result<AddPrizeReport> {
        let mut guard_pool = self.pool.lock()?;
        let mut report = AddPrizeReport::default();

        for token in parse_prize_tokens(input) {
            match guard_pool.insert(Prize::new(&token.name, token.winners)) {
                Ok(()) => report.added.push((token.name.clone(), token.winners)),
                Err(Error::AlreadyExists(name)) => report.already_existed.push(name),
                Err(err) => return Err(err),
            }
        }

        if !report.added.is_empty() {
            self.persist(&guard_pool);
        }

        Ok(report)
    }

    pub fn join(&self, prize_name: &str, participant_id: &str) -> Result<()> {
        let mut guard_pool = self.pool.lock()?;
        let prize = guard_pool
            .get_mut(prize_name)
            .ok_or_else(|| Error::NotFound(prize_name.to_string()))?;

        prize.add_participant(participant_id)?;
        debug!("{} joined \"{}\"", participant_id, prize_name);
        self.persist(&guard_pool);
        Ok(())
    }

    pub fn leave(&self, prize_name: &str, participant_id: &str) -> Result<()> {
        let mut guard_pool = self.pool.lock()?;
        let prize = guard_pool
            .get_mut(prize_name)
            .ok_or_else(|| Error::NotJoined(prize_name.to_string()))?;

        prize.remove_participant(participant_id)?;
        debug!("{} left \"{}\"", participant_id, prize_name);
        self.persist(&guard_pool);
        Ok(())
    }

    // Draws every prize in the pool. Each drawn prize is removed, including
    // the ones nobody joined, so the pool is empty afterwards.
    pub fn draw(&self) -> Result<Vec<DrawOutcome>> {
        let mut guard_pool = self.pool.lock()?;
        if guard_pool.is_empty() {
            return Ok(Vec::new());
        }

        let outcomes = guard_pool
            .drain()
            .into_iter()
            .map(|prize| self.draw_prize(prize))
            .collect::<Vec<DrawOutcome>>();

        self.persist(&guard_pool);
        Ok(outcomes)
    }

    fn draw_prize(&self, prize: Prize) -> DrawOutcome {
        if prize.participants().is_empty() {
            info!("Nobody joined \"{}\"", prize.name());
            return DrawOutcome::NoParticipants {
                name: prize.name().to_string(),
                quota: prize.winners(),
            };
        }

        let count = prize.effective_winners();
        let winners = self.strategy.pick(prize.participants(), count);
        info!("Drawn \"{}\": {:?}", prize.name(), winners);
        DrawOutcome::Winners {
            name: prize.name().to_string(),
            count,
            winners,
        }
    }

    // Returns participants of each requested prize, in the requested order.
    pub fn list_participants(&self, names: &[String]) -> Result<Vec<ParticipantListing>> {
        let guard_pool = self.pool.lock()?;
        let listings = names
            .iter()
            .map(|name| match guard_pool.get(name) {
                Some(prize) => ParticipantListing::Found {
                    name: name.clone(),
                    participants: prize.participants().to_vec(),
                },
                None => ParticipantListing::NotFound { name: name.clone() },
            })
            .collect();
        Ok(listings)
    }

    // Replaces the whole pool with the given record. Nothing changes unless
    // every entry of the record is valid.
    pub fn restore(&self, text: &str) -> Result<usize> {
        let record = parse_text(text)?;
        let restored = decode_strict(&record)?;
        let count = restored.len();

        let mut guard_pool = self.pool.lock()?;
        *guard_pool = restored;
        info!("Restored {} prize(s)", count);
        self.persist(&guard_pool);
        Ok(count)
    }

    // Returns the current durable record.
    pub fn snapshot(&self) -> Result<String> {
        let guard_pool = self.pool.lock()?;
        encode_pretty(&guard_pool)
    }

    // Failures are only logged: the in-memory pool stays authoritative.
    fn persist(&self, pool: &PrizePool) {
        let result = encode_pretty(pool).and_then(|contents| self.store.write(&contents));
        match result {
            Ok(()) => debug!("Saved {} prize(s)", pool.len()),
            Err(err) => error!("Can't save the prize data: {}", err),
        }
    }
}
