use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serenity::builder::{
    CreateActionRow, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage,
};
use serenity::client::Context;
use sha2::{Digest, Sha256};
use serenity::model::application::ComponentInteraction;
use tracing::{debug, info, warn};

use crate::backup::BackupHandle;
use crate::commands::prize::formatters::board::{build_board, leave_button};
use crate::commands::prize::formatters::messages::{
    self, MESSAGE_LIMIT, NO_PRIZES, prize_overview, split_message,
};
use crate::commands::prize::formatters::DefaultParticipantFormatter;
use crate::commands::prize::manager::PrizePoolManager;
use crate::commands::prize::models::Prize;
use crate::commands::prize::resolver::{GuildResolver, IdentityResolver, RawResolver};
use crate::error::{Error, Result};
use crate::storage::{BackupStorage, PrizePoolStorage};

// Discord rejects custom ids longer than this.
pub const CUSTOM_ID_LIMIT: usize = 100;
const DIGEST_LEN: usize = 4;
const DIGEST_SEPARATOR: char = '#';

lazy_static! {
    static ref CUSTOM_ID_REGEX: Regex =
        Regex::new(r"(?s)^(?P<action>join|leave|page_prev|page_next)(?P<separator>[:~])(?P<value>.*)$")
            .unwrap();
}

// Reference to a prize stored in a button. Long names don't fit into a
// custom id, so only their beginning is kept together with a digest of the
// whole name. Two names sharing the beginning still get different ids.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PrizeRef {
    Exact(String),
    Truncated { prefix: String, digest: String },
}

impl PrizeRef {
    fn new(prize_name: &str, budget: usize) -> Self {
        if prize_name.len() <= budget {
            return PrizeRef::Exact(prize_name.to_string());
        }

        let mut end = budget - DIGEST_SEPARATOR.len_utf8() - DIGEST_LEN * 2;
        while !prize_name.is_char_boundary(end) {
            end -= 1;
        }
        PrizeRef::Truncated {
            prefix: prize_name[..end].to_string(),
            digest: name_digest(prize_name),
        }
    }

    // Finds the referenced prize among the given names.
    pub fn resolve(&self, names: &[String]) -> Option<String> {
        match self {
            PrizeRef::Exact(name) => names.iter().find(|candidate| *candidate == name).cloned(),
            PrizeRef::Truncated { prefix, digest } => names
                .iter()
                .find(|candidate| candidate.starts_with(prefix) && name_digest(candidate) == *digest)
                .cloned(),
        }
    }

    // Name to show in replies.
    pub fn label(&self) -> &str {
        match self {
            PrizeRef::Exact(name) => name,
            PrizeRef::Truncated { prefix, .. } => prefix,
        }
    }

    fn encode(&self) -> String {
        match self {
            PrizeRef::Exact(name) => format!(":{}", name),
            PrizeRef::Truncated { prefix, digest } => {
                format!("~{}{}{}", prefix, DIGEST_SEPARATOR, digest)
            }
        }
    }
}

// First bytes of the SHA-256 of the name, hex encoded. Stable across restarts,
// so buttons of older messages keep working.
fn name_digest(prize_name: &str) -> String {
    Sha256::digest(prize_name.as_bytes())[..DIGEST_LEN]
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CustomId {
    Join(PrizeRef),
    Leave(PrizeRef),
    ListAll,
    PreviousPage(usize),
    NextPage(usize),
}

impl CustomId {
    pub fn join(prize_name: &str) -> Self {
        CustomId::Join(PrizeRef::new(prize_name, CUSTOM_ID_LIMIT - "join:".len()))
    }

    pub fn leave(prize_name: &str) -> Self {
        CustomId::Leave(PrizeRef::new(prize_name, CUSTOM_ID_LIMIT - "leave:".len()))
    }

    pub fn encode(&self) -> String {
        match self {
            CustomId::Join(prize) => format!("join{}", prize.encode()),
            CustomId::Leave(prize) => format!("leave{}", prize.encode()),
            CustomId::ListAll => "list_all".to_string(),
            CustomId::PreviousPage(page) => format!("page_prev:{}", page),
            CustomId::NextPage(page) => format!("page_next:{}", page),
        }
    }

    pub fn parse(custom_id: &str) -> Option<Self> {
        if custom_id == "list_all" {
            return Some(CustomId::ListAll);
        }

        let captures = CUSTOM_ID_REGEX.captures(custom_id)?;
        let value = captures.name("value")?.as_str();
        let prize = match captures.name("separator")?.as_str() {
            ":" => Some(PrizeRef::Exact(value.to_string())),
            _ => value
                .rsplit_once(DIGEST_SEPARATOR)
                .map(|(prefix, digest)| PrizeRef::Truncated {
                    prefix: prefix.to_string(),
                    digest: digest.to_string(),
                }),
        };

        match captures.name("action")?.as_str() {
            "join" => prize.map(CustomId::Join),
            "leave" => prize.map(CustomId::Leave),
            "page_prev" => value.parse::<usize>().ok().map(CustomId::PreviousPage),
            "page_next" => value.parse::<usize>().ok().map(CustomId::NextPage),
            _ => None,
        }
    }
}

// Handles a button press on one of the prize board messages.
pub async fn handle_component(ctx: &Context, component: &ComponentInteraction) -> Result<()> {
    let custom_id = match CustomId::parse(&component.data.custom_id) {
        Some(custom_id) => custom_id,
        None => {
            debug!("Ignored unknown component \"{}\"", component.data.custom_id);
            return Ok(());
        }
    };

    let (manager, backup) = {
        let data = ctx.data.read().await;
        let manager = data.get::<PrizePoolStorage>().cloned();
        let backup = data.get::<BackupStorage>().cloned();
        match (manager, backup) {
            (Some(manager), Some(backup)) => (manager, backup),
            _ => {
                let message = "The prize pool isn't ready yet.".to_string();
                return Err(Error::Lock(message));
            }
        }
    };

    match custom_id {
        CustomId::Join(prize) => join(ctx, component, &manager, &backup, &prize).await,
        CustomId::Leave(prize) => leave(ctx, component, &manager, &backup, &prize).await,
        CustomId::ListAll => list_all(ctx, component, &manager).await,
        CustomId::PreviousPage(page) | CustomId::NextPage(page) => {
            turn_page(ctx, component, &manager, page).await
        }
    }
}

async fn join(
    ctx: &Context,
    component: &ComponentInteraction,
    manager: &Arc<PrizePoolManager>,
    backup: &BackupHandle,
    prize: &PrizeRef,
) -> Result<()> {
    let participant_id = component.user.id.get().to_string();
    let prize_name = match prize.resolve(&manager.prize_names()?) {
        Some(prize_name) => prize_name,
        None => {
            let content = messages::prize_gone(prize.label());
            return reply(ctx, component, content, Vec::new()).await;
        }
    };

    match manager.join(&prize_name, &participant_id) {
        Ok(()) => {
            info!("User '{}' joined \"{}\"", component.user.name, prize_name);
            backup.request();
            reply(ctx, component, messages::joined(&prize_name), Vec::new()).await
        }
        Err(Error::AlreadyJoined(name)) => {
            // Offer a way out right away.
            let rows = vec![CreateActionRow::Buttons(vec![leave_button(&name)])];
            let content = Error::AlreadyJoined(name).to_string();
            reply(ctx, component, content, rows).await
        }
        Err(Error::NotFound(name)) => {
            reply(ctx, component, messages::prize_gone(&name), Vec::new()).await
        }
        Err(err) => Err(err),
    }
}

async fn leave(
    ctx: &Context,
    component: &ComponentInteraction,
    manager: &Arc<PrizePoolManager>,
    backup: &BackupHandle,
    prize: &PrizeRef,
) -> Result<()> {
    let participant_id = component.user.id.get().to_string();
    let names = manager.prize_names()?;
    let prize_name = prize
        .resolve(&names)
        .unwrap_or_else(|| prize.label().to_string());

    match manager.leave(&prize_name, &participant_id) {
        Ok(()) => {
            info!("User '{}' left \"{}\"", component.user.name, prize_name);
            backup.request();
            reply(ctx, component, messages::left(&prize_name), Vec::new()).await
        }
        Err(err @ Error::NotJoined(_)) => reply(ctx, component, err.to_string(), Vec::new()).await,
        Err(err) => Err(err),
    }
}

async fn list_all(
    ctx: &Context,
    component: &ComponentInteraction,
    manager: &Arc<PrizePoolManager>,
) -> Result<()> {
    let prizes = manager.get_prizes()?;
    if prizes.is_empty() {
        return reply(ctx, component, NO_PRIZES.to_string(), Vec::new()).await;
    }

    // Member lookups may take longer than Discord waits for the first response.
    let defer = CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new().ephemeral(true));
    component.create_response(&ctx.http, defer).await?;

    let resolver: Box<dyn IdentityResolver + '_> = match component.guild_id {
        Some(guild_id) => Box::new(GuildResolver::new(ctx, guild_id)),
        None => Box::new(RawResolver),
    };
    let text = describe_prizes(&prizes, resolver.as_ref()).await;

    for chunk in split_message(&text, MESSAGE_LIMIT) {
        if chunk.trim().is_empty() {
            continue;
        }
        let followup = CreateInteractionResponseFollowup::new()
            .content(chunk)
            .ephemeral(true);
        component.create_followup(&ctx.http, followup).await?;
    }
    Ok(())
}

// Every prize with its quota and the resolved participants.
pub async fn describe_prizes(prizes: &[Prize], resolver: &dyn IdentityResolver) -> String {
    let formatter = DefaultParticipantFormatter::new();

    let mut sections = vec!["All prizes and participants:".to_string()];
    for prize in prizes {
        let participants = resolver.resolve_all(prize.participants()).await;
        sections.push(prize_overview(prize, &participants, &formatter));
    }
    sections.join("\n\n")
}

async fn turn_page(
    ctx: &Context,
    component: &ComponentInteraction,
    manager: &Arc<PrizePoolManager>,
    page: usize,
) -> Result<()> {
    let prizes = manager.get_prizes()?;
    let (embed, rows) = build_board(&prizes, page);
    let update = CreateInteractionResponseMessage::new()
        .embed(embed)
        .components(rows);

    component
        .create_response(&ctx.http, CreateInteractionResponse::UpdateMessage(update))
        .await?;
    Ok(())
}

// Sends an ephemeral reply visible only to the user who pressed the button.
async fn reply(
    ctx: &Context,
    component: &ComponentInteraction,
    content: String,
    components: Vec<CreateActionRow>,
) -> Result<()> {
    let mut message = CreateInteractionResponseMessage::new()
        .content(content)
        .ephemeral(true);
    if !components.is_empty() {
        message = message.components(components);
    }

    if let Err(err) = component
        .create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await
    {
        warn!("Can't reply to the interaction: {}", err);
        return Err(Error::from(err));
    }
    Ok(())
}
