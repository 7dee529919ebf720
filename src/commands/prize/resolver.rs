use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use dashmap::DashMap;
use serenity::async_trait;
use serenity::client::Context;
use serenity::http::HttpError;
use serenity::model::id::{GuildId, UserId};
use serenity::prelude::SerenityError;
use tracing::{debug, warn};

use crate::commands::prize::models::ResolvedParticipant;
use crate::error::Error;

pub const DEFAULT_LOOKUP_ATTEMPTS: u32 = 3;
pub const DEFAULT_LOOKUP_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RetryPolicy {
    attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        RetryPolicy {
            attempts: attempts.max(1),
            base_delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    // Delay before the next try, doubling after each failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(DEFAULT_LOOKUP_ATTEMPTS, DEFAULT_LOOKUP_DELAY)
    }
}

// Runs the operation until it succeeds, returns a non-retryable error or the
// attempts budget is spent.
pub async fn retry<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    label: &str,
    is_retryable: R,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.attempts() && is_retryable(&err) => {
                let delay = policy.delay_after(attempt);
                debug!("{} failed (attempt {}), retrying in {:?}: {}", label, attempt, delay, err);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    // Best-effort lookup. Never fails: unresolvable ids come back as is.
    async fn resolve(&self, participant_id: &str) -> ResolvedParticipant;

    async fn resolve_all(&self, participant_ids: &[String]) -> Vec<ResolvedParticipant> {
        let mut resolved = Vec::with_capacity(participant_ids.len());
        for participant_id in participant_ids {
            resolved.push(self.resolve(participant_id).await);
        }
        resolved
    }
}

// Resolves participants against members of a Discord guild. Results are
// cached for the lifetime of the resolver, which is a single response.
pub struct GuildResolver<'a> {
    ctx: &'a Context,
    guild_id: GuildId,
    policy: RetryPolicy,
    cache: DashMap<String, ResolvedParticipant>,
}

impl<'a> GuildResolver<'a> {
    pub fn new(ctx: &'a Context, guild_id: GuildId) -> Self {
        GuildResolver {
            ctx,
            guild_id,
            policy: RetryPolicy::default(),
            cache: DashMap::new(),
        }
    }

    async fn resolve_user_id(&self, participant_id: &str, user_id: u64) -> ResolvedParticipant {
        lookup_member(&self.policy, participant_id, user_id, move || async move {
            self.guild_id
                .member(self.ctx, UserId::new(user_id))
                .await
                .map(|member| member.display_name().to_string())
        })
        .await
    }

    // Older records stored display names instead of ids.
    fn resolve_legacy_name(&self, name: &str) -> ResolvedParticipant {
        let found = self.ctx.cache.guild(self.guild_id).and_then(|guild| {
            guild
                .members
                .values()
                .find(|member| member.display_name() == name || member.user.name == name)
                .map(|member| (member.user.id.get(), member.display_name().to_string()))
        });

        match found {
            Some((user_id, display_name)) => ResolvedParticipant::Member {
                user_id,
                display_name,
            },
            None => ResolvedParticipant::Legacy(name.to_string()),
        }
    }
}

#[async_trait]
impl<'a> IdentityResolver for GuildResolver<'a> {
    async fn resolve(&self, participant_id: &str) -> ResolvedParticipant {
        if let Some(cached) = self.cache.get(participant_id) {
            return cached.value().clone();
        }

        let resolved = match parse_user_id(participant_id) {
            Some(user_id) => self.resolve_user_id(participant_id, user_id).await,
            None => self.resolve_legacy_name(participant_id),
        };

        self.cache.insert(participant_id.to_string(), resolved.clone());
        resolved
    }
}

// Resolves nothing, ids are shown as they are stored.
pub struct RawResolver;

#[async_trait]
impl IdentityResolver for RawResolver {
    async fn resolve(&self, participant_id: &str) -> ResolvedParticipant {
        match parse_user_id(participant_id) {
            Some(_) => ResolvedParticipant::Unknown(participant_id.to_string()),
            None => ResolvedParticipant::Legacy(participant_id.to_string()),
        }
    }
}

// Looks the member up with retries. A failed lookup degrades to the raw id and
// never aborts the response.
async fn lookup_member<F, Fut>(
    policy: &RetryPolicy,
    participant_id: &str,
    user_id: u64,
    lookup: F,
) -> ResolvedParticipant
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, SerenityError>>,
{
    let label = format!("Member lookup for {}", participant_id);
    match retry(policy, &label, is_retryable, lookup).await {
        Ok(display_name) => ResolvedParticipant::Member {
            user_id,
            display_name,
        },
        Err(err) => {
            let err = Error::ExternalLookupFailure(format!("{} ({})", participant_id, err));
            warn!("{}", err);
            ResolvedParticipant::Unknown(participant_id.to_string())
        }
    }
}

pub fn parse_user_id(participant_id: &str) -> Option<u64> {
    match participant_id.trim().parse::<u64>() {
        Ok(user_id) if user_id > 0 => Some(user_id),
        _ => None,
    }
}

// Unknown members stay unknown, only transient failures are worth retrying.
fn is_retryable(err: &SerenityError) -> bool {
    match err {
        SerenityError::Http(HttpError::UnsuccessfulRequest(response)) => {
            let status = response.status_code.as_u16();
            status == 429 || status >= 500
        }
        SerenityError::Http(_) => true,
        _ => false,
    }
}
