use poise::CreateReply;
use serenity::builder::CreateAttachment;
use serenity::model::channel::Attachment;
use tracing::{info, warn};

use crate::backup::BACKUP_FILE_NAME;
use crate::commands::context::Context;
use crate::commands::prize::formatters::board::build_board;
use crate::commands::prize::formatters::messages::{
    ADD_PRIZE_USAGE, LIST_USAGE, MESSAGE_LIMIT, NO_PRIZES, RESTORE_USAGE, added_report,
    draw_outcome, participant_listing, restored, split_message,
};
use crate::commands::prize::formatters::DefaultParticipantFormatter;
use crate::commands::prize::interactions::describe_prizes;
use crate::commands::prize::models::{DrawOutcome, ParticipantListing};
use crate::commands::prize::parser::parse_prize_names;
use crate::commands::prize::resolver::{GuildResolver, IdentityResolver, RawResolver};
use crate::error::{Error, Result};

/// Add one or more prizes, e.g. `Keyboard:2, Mouse`
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn add_prize(
    ctx: Context<'_>,
    #[rest]
    #[description = "Comma-separated prizes with an optional winners count, e.g. Keyboard:2, Mouse"]
    prizes: Option<String>,
) -> Result<()> {
    let input = prizes.unwrap_or_default();
    if input.trim().is_empty() {
        ctx.say(ADD_PRIZE_USAGE).await?;
        return Ok(());
    }

    let data = ctx.data();
    let report = data.manager.add_prizes(&input)?;
    if !report.added.is_empty() {
        data.backup.request();
    }

    send_chunks(ctx, &added_report(&report)).await
}

/// Show the prize board with the join buttons
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn show_prizes(ctx: Context<'_>) -> Result<()> {
    let prizes = ctx.data().manager.get_prizes()?;
    if prizes.is_empty() {
        ctx.say(NO_PRIZES).await?;
        return Ok(());
    }

    let (embed, rows) = build_board(&prizes, 0);
    ctx.send(CreateReply::default().embed(embed).components(rows))
        .await?;
    Ok(())
}

/// List all prizes with their participants
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn prizes_list(ctx: Context<'_>) -> Result<()> {
    let prizes = ctx.data().manager.get_prizes()?;
    if prizes.is_empty() {
        ctx.say(NO_PRIZES).await?;
        return Ok(());
    }

    // Member lookups can take a while.
    ctx.defer().await?;
    let resolver = resolver(ctx);
    let text = describe_prizes(&prizes, resolver.as_ref()).await;
    send_chunks(ctx, &text).await
}

/// Show participants of the given prizes, e.g. `Keyboard, Mouse`
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn list(
    ctx: Context<'_>,
    #[rest]
    #[description = "Comma-separated prize names"]
    prize_names: Option<String>,
) -> Result<()> {
    let names = parse_prize_names(&prize_names.unwrap_or_default());
    if names.is_empty() {
        ctx.say(LIST_USAGE).await?;
        return Ok(());
    }

    let listings = ctx.data().manager.list_participants(&names)?;
    ctx.defer().await?;
    let resolver = resolver(ctx);
    let formatter = DefaultParticipantFormatter::new();

    let mut sections = Vec::with_capacity(listings.len());
    for listing in &listings {
        let participants = match listing {
            ParticipantListing::Found { participants, .. } => {
                resolver.resolve_all(participants).await
            }
            ParticipantListing::NotFound { .. } => Vec::new(),
        };
        sections.push(participant_listing(listing, &participants, &formatter));
    }

    send_chunks(ctx, &sections.join("\n")).await
}

/// Draw winners for every prize. Drawn prizes are removed
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn draw(ctx: Context<'_>) -> Result<()> {
    let data = ctx.data();
    let outcomes = data.manager.draw()?;
    if outcomes.is_empty() {
        ctx.say(NO_PRIZES).await?;
        return Ok(());
    }
    data.backup.request();
    info!("User '{}' drew {} prize(s)", ctx.author().name, outcomes.len());

    ctx.defer().await?;
    let resolver = resolver(ctx);
    let formatter = DefaultParticipantFormatter::new();

    let mut lines = Vec::with_capacity(outcomes.len());
    for outcome in &outcomes {
        let winners = match outcome {
            DrawOutcome::Winners { winners, .. } => resolver.resolve_all(winners).await,
            DrawOutcome::NoParticipants { .. } => {
                warn!("\"{}\" had no participants and was removed", outcome.name());
                Vec::new()
            }
        };
        lines.push(draw_outcome(outcome, &winners, &formatter));
    }

    send_chunks(ctx, &lines.join("\n")).await
}

/// Send the current prize data
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn backup(ctx: Context<'_>) -> Result<()> {
    let contents = ctx.data().manager.snapshot()?;
    let inline = format!("```json\n{}\n```", contents);

    let reply = match inline.chars().count() <= MESSAGE_LIMIT {
        true => CreateReply::default().content(inline),
        false => CreateReply::default()
            .content("The prize data doesn't fit into a message, see the attached file.")
            .attachment(CreateAttachment::bytes(contents.into_bytes(), BACKUP_FILE_NAME)),
    };
    ctx.send(reply).await?;
    Ok(())
}

/// Replace all prizes with the data from a backup file or pasted JSON
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn restore(
    ctx: Context<'_>,
    #[description = "The backup file"] file: Option<Attachment>,
    #[rest]
    #[description = "The backup JSON, when there is no file"]
    content: Option<String>,
) -> Result<()> {
    let text = match (file, content) {
        (Some(file), _) => {
            let bytes = file.download().await?;
            String::from_utf8(bytes).map_err(|err| Error::InvalidShape(err.to_string()))?
        }
        (None, Some(content)) if !content.trim().is_empty() => content,
        _ => {
            ctx.say(RESTORE_USAGE).await?;
            return Ok(());
        }
    };

    let data = ctx.data();
    let count = data.manager.restore(&text)?;
    data.backup.request();
    info!("User '{}' restored {} prize(s)", ctx.author().name, count);

    ctx.say(restored(count)).await?;
    Ok(())
}

fn resolver<'a>(ctx: Context<'a>) -> Box<dyn IdentityResolver + 'a> {
    match ctx.guild_id() {
        Some(guild_id) => Box::new(GuildResolver::new(ctx.serenity_context(), guild_id)),
        None => Box::new(RawResolver),
    }
}

async fn send_chunks(ctx: Context<'_>, text: &str) -> Result<()> {
    for chunk in split_message(text, MESSAGE_LIMIT) {
        // Discord rejects empty messages.
        if chunk.trim().is_empty() {
            continue;
        }
        ctx.say(chunk).await?;
    }
    Ok(())
}
