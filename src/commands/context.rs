use std::sync::Arc;

use poise::Context as PoiseContext;

use crate::backup::BackupHandle;
use crate::commands::prize::manager::PrizePoolManager;

// User data, which is stored and accessible in all command invocations
pub struct UserData {
    pub manager: Arc<PrizePoolManager>,
    pub backup: BackupHandle,
}

// Generic context available across Poise commands
pub type Context<'a> = PoiseContext<'a, UserData, crate::error::Error>;
