use crate::error::{Error, Result};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Prize {
    // Unique name of the prize inside of the pool.
    name: String,
    // How many winners will be picked during the draw.
    winners: u32,
    // Participant identifiers in joining order. Usually a Discord user id
    // encoded as a string, but older records may store display names.
    participants: Vec<String>,
}

impl Prize {
    pub fn new(name: &str, winners: u32) -> Self {
        Prize {
            name: name.to_string(),
            winners: winners.max(1),
            participants: Vec::new(),
        }
    }

    // Appends participants, skipping identifiers that are already present.
    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for participant in participants {
            let participant = participant.into();
            if !self.has_participant(&participant) {
                self.participants.push(participant);
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn winners(&self) -> u32 {
        self.winners
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn has_participant(&self, participant_id: &str) -> bool {
        self.participants.iter().any(|id| id == participant_id)
    }

    // Amount of winners the draw will actually produce.
    pub fn effective_winners(&self) -> usize {
        (self.winners as usize).min(self.participants.len())
    }

    pub fn add_participant(&mut self, participant_id: &str) -> Result<()> {
        if self.has_participant(participant_id) {
            return Err(Error::AlreadyJoined(self.name.clone()));
        }

        self.participants.push(participant_id.to_string());
        Ok(())
    }

    pub fn remove_participant(&mut self, participant_id: &str) -> Result<()> {
        match self.participants.iter().position(|id| id == participant_id) {
            Some(position) => {
                self.participants.remove(position);
                Ok(())
            }
            None => Err(Error::NotJoined(self.name.clone())),
        }
    }
}

// Ordered collection of prizes. The insertion order is the display order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PrizePool {
    prizes: Vec<Prize>,
}

impl PrizePool {
    pub fn new() -> Self {
        PrizePool { prizes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.prizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prizes.is_empty()
    }

    pub fn prizes(&self) -> &[Prize] {
        &self.prizes
    }

    pub fn names(&self) -> Vec<String> {
        self.prizes.iter().map(|prize| prize.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Prize> {
        self.prizes.iter().find(|prize| prize.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Prize> {
        self.prizes.iter_mut().find(|prize| prize.name == name)
    }

    // Adds a new prize. The existing prize with the same name is never replaced.
    pub fn insert(&mut self, prize: Prize) -> Result<()> {
        if self.contains(&prize.name) {
            return Err(Error::AlreadyExists(prize.name));
        }

        self.prizes.push(prize);
        Ok(())
    }

    // Removes all prizes, returning them in display order.
    pub fn drain(&mut self) -> Vec<Prize> {
        self.prizes.drain(..).collect()
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DrawOutcome {
    // Nobody joined the prize, so nothing was drawn.
    NoParticipants { name: String, quota: u32 },
    // Picked winners in the order they were drawn.
    Winners {
        name: String,
        count: usize,
        winners: Vec<String>,
    },
}

impl DrawOutcome {
    pub fn name(&self) -> &str {
        match self {
            DrawOutcome::NoParticipants { name, .. } => name,
            DrawOutcome::Winners { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct AddPrizeReport {
    // Newly created prizes with their winner quotas.
    pub added: Vec<(String, u32)>,
    // Names that were already in the pool and left untouched.
    pub already_existed: Vec<String>,
}

impl AddPrizeReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.already_existed.is_empty()
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParticipantListing {
    Found {
        name: String,
        participants: Vec<String>,
    },
    NotFound {
        name: String,
    },
}

// Display form of a stored participant identifier.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ResolvedParticipant {
    // A guild member found by the numeric id.
    Member { user_id: u64, display_name: String },
    // A numeric id that couldn't be resolved.
    Unknown(String),
    // A non-numeric identifier kept from older records.
    Legacy(String),
}
