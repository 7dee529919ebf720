use std::sync::Arc;

use serenity::prelude::TypeMapKey;

use crate::backup::BackupHandle;
use crate::commands::prize::manager::PrizePoolManager;

// Shared state for the raw event handler, which has no access to the poise
// user data.
pub struct PrizePoolStorage;

impl TypeMapKey for PrizePoolStorage {
    type Value = Arc<PrizePoolManager>;
}

pub struct BackupStorage;

impl TypeMapKey for BackupStorage {
    type Value = BackupHandle;
}
