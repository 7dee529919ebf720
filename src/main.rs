pub mod backup;
pub mod commands;
pub mod config;
pub mod error;
pub mod persistence;
pub mod storage;

use std::process;
use std::sync::Arc;

use poise::serenity_prelude::GatewayIntents;
use serenity::async_trait;
use serenity::client::{Client, Context, EventHandler};
use serenity::http::Http;
use serenity::model::application::Interaction;
use serenity::model::gateway::Ready;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::backup::{BackupHandle, BackupScheduler, DiscordBackupSink};
use crate::commands::prize::interactions::handle_component;
use crate::commands::prize::manager::PrizePoolManager;
use crate::commands::{UserData, commands_list};
use crate::config::Config;
use crate::error::Error;
use crate::persistence::JsonFileStore;
use crate::storage::{BackupStorage, PrizePoolStorage};

pub struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            if let Err(err) = handle_component(&ctx, &component).await {
                error!("Can't handle the \"{}\" button: {}", component.data.custom_id, err);
            }
        }
    }
}

async fn on_error(error: poise::FrameworkError<'_, UserData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            warn!("Command '{}' failed: {}", ctx.command().qualified_name, error);
            if let Err(err) = ctx.say(error.to_string()).await {
                error!("Can't send the error message: {}", err);
            }
        }
        poise::FrameworkError::MissingUserPermissions { ctx, .. } => {
            info!(
                "User '{}' isn't allowed to run '{}'",
                ctx.author().name,
                ctx.command().qualified_name
            );
            if let Err(err) = ctx.say("You don't have permission to use this command.").await {
                error!("Can't send the error message: {}", err);
            }
        }
        error => {
            if let Err(err) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", err);
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    let store = Arc::new(JsonFileStore::new(&config.data_path));
    info!("Prize data is stored at {}", store.path().display());
    let manager = Arc::new(PrizePoolManager::load(store));

    let backup = match config.backup_destination {
        Some(destination) => {
            info!("Backups go to {:?}, at most once per {:?}", destination, config.backup_cooldown);
            let http = Arc::new(Http::new(&config.token));
            let sink = Arc::new(DiscordBackupSink::new(http, destination));
            BackupScheduler::spawn(manager.clone(), sink, config.backup_cooldown)
        }
        None => {
            info!("No backup destination configured, backups are disabled");
            BackupHandle::disabled()
        }
    };

    let user_data = UserData {
        manager: manager.clone(),
        backup: backup.clone(),
    };
    let framework = poise::Framework::<UserData, Error>::builder()
        .options(poise::FrameworkOptions {
            commands: commands_list(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix.clone()),
                ..Default::default()
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Got command '{}' by user '{}'",
                        ctx.command().qualified_name,
                        ctx.author().name
                    );
                })
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(user_data)
            })
        })
        .build();

    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;
    let mut client = match Client::builder(&config.token, intents)
        .event_handler(Handler)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(err) => {
            error!("Cannot create a Discord client: {}", err);
            process::exit(1);
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<PrizePoolStorage>(manager);
        data.insert::<BackupStorage>(backup);
    }

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }
}
