// Conversion between the prize pool and its durable JSON record:
//
// {
//   "<prize name>": { "participants": ["<id>", ...], "winners": <integer> },
//   ...
// }
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::commands::prize::models::{Prize, PrizePool};
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct PrizeRecord<'a> {
    participants: &'a [String],
    winners: u32,
}

pub fn encode(pool: &PrizePool) -> Result<Value> {
    let mut record = Map::new();
    for prize in pool.prizes() {
        let entry = PrizeRecord {
            participants: prize.participants(),
            winners: prize.winners(),
        };
        record.insert(prize.name().to_string(), serde_json::to_value(&entry)?);
    }

    Ok(Value::Object(record))
}

pub fn encode_pretty(pool: &PrizePool) -> Result<String> {
    let record = encode(pool)?;
    Ok(serde_json::to_string_pretty(&record)?)
}

// Checks a single stored entry and turns it into a prize.
pub fn validate_entry(name: &str, entry: &Value) -> Result<Prize> {
    if name.trim().is_empty() {
        return Err(Error::InvalidShape("a prize name can't be empty".to_string()));
    }

    let fields = match entry.as_object() {
        Some(fields) => fields,
        None => {
            let message = format!("\"{}\" must be an object", name);
            return Err(Error::InvalidShape(message));
        }
    };

    let participants = match fields.get("participants") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(id) => Ok(id.clone()),
                _ => Err(Error::InvalidShape(format!(
                    "\"{}\" has a participant which isn't a string",
                    name
                ))),
            })
            .collect::<Result<Vec<String>>>()?,
        Some(_) => {
            let message = format!("\"{}\".participants must be a list", name);
            return Err(Error::InvalidShape(message));
        }
        None => {
            let message = format!("\"{}\" is missing participants", name);
            return Err(Error::InvalidShape(message));
        }
    };

    let winners = match fields.get("winners") {
        Some(Value::Number(number)) => match number.as_u64() {
            Some(value) if value >= 1 && value <= u32::MAX as u64 => value as u32,
            _ => {
                let message = format!("\"{}\".winners must be a positive integer", name);
                return Err(Error::InvalidShape(message));
            }
        },
        Some(_) => {
            let message = format!("\"{}\".winners must be an integer", name);
            return Err(Error::InvalidShape(message));
        }
        None => {
            let message = format!("\"{}\" is missing winners", name);
            return Err(Error::InvalidShape(message));
        }
    };

    let prize = Prize::new(name, winners).with_participants(participants.iter().cloned());
    if prize.participants().len() != participants.len() {
        debug!("Collapsed duplicate participants of \"{}\"", name);
    }

    Ok(prize)
}

// Loads whatever can be loaded. Malformed entries are dropped one by one and
// their names are returned for logging.
pub fn decode_lenient(record: &Value) -> (PrizePool, Vec<String>) {
    let mut pool = PrizePool::new();
    let mut discarded = Vec::new();

    let entries = match record.as_object() {
        Some(entries) => entries,
        None => {
            warn!("The stored prize data isn't an object, starting with an empty pool");
            return (pool, discarded);
        }
    };

    for (name, entry) in entries {
        match validate_entry(name, entry) {
            Ok(prize) => {
                if let Err(err) = pool.insert(prize) {
                    warn!("Dropped stored prize: {}", err);
                    discarded.push(name.clone());
                }
            }
            Err(err) => {
                warn!("Dropped stored prize \"{}\": {}", name, err);
                discarded.push(name.clone());
            }
        }
    }

    (pool, discarded)
}

// All-or-nothing variant used for restoring a backup.
pub fn decode_strict(record: &Value) -> Result<PrizePool> {
    let entries = match record.as_object() {
        Some(entries) => entries,
        None => {
            let message = "the top level must be an object keyed by prize name".to_string();
            return Err(Error::InvalidShape(message));
        }
    };

    let mut pool = PrizePool::new();
    for (name, entry) in entries {
        let prize = validate_entry(name, entry)?;
        pool.insert(prize)
            .map_err(|err| Error::InvalidShape(err.to_string()))?;
    }

    Ok(pool)
}

// Parses raw text (file contents or pasted message) into a JSON value.
// Markdown code fences around the JSON are tolerated.
pub fn parse_text(text: &str) -> Result<Value> {
    let mut content = text.trim();
    if content.starts_with("```") {
        content = content.trim_start_matches("```");
        content = content.strip_prefix("json").unwrap_or(content);
        content = content.trim_end_matches("```");
    }

    Ok(serde_json::from_str(content.trim())?)
}
