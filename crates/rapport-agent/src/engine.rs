// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-message turn pipeline.
//!
//! One turn runs, under the user's lease:
//!
//! 1. moderation, which may answer with a fixed text and stop,
//! 2. entity and mood extraction,
//! 3. style classification,
//! 4. relationship scoring,
//! 5. an FAQ answer, or a cached or fresh completion,
//! 6. enrichment, history and persistence.
//!
//! Completion failures end the turn with a fallback reply. The user's
//! counters and score still move, but no history is written and
//! `first_interaction` is left as it was.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rapport_config::RapportConfig;
use rapport_core::{
    CompletionAdapter, CompletionRequest, InboundMessage, RapportError, StorageAdapter, StyleTag,
    Turn, UserId,
};
use rapport_persona::persona::sanitize_display_name;
use rapport_persona::{
    EnrichmentPipeline, EntityExtractor, Fallback, LevelShift, ModerationGate, ModerationVerdict,
    Persona, RelationshipScorer, StyleClassifier, lexicon,
};
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cache::{Fingerprint, ResponseCache};
use crate::commands::{self, Command};
use crate::prompt::PromptBuilder;
use crate::recording;
use crate::stats::RelationshipStats;
use crate::store::{ContextStore, UserLease};

/// How a turn was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A completion, fresh or from the cache, went through enrichment.
    Completed { style: StyleTag, cache_hit: bool },
    /// A canned persona answer went through enrichment.
    Faq { style: StyleTag },
    /// The moderation gate answered with a fixed text.
    Moderated(ModerationVerdict),
    /// The turn failed and a fallback text was sent instead.
    Fallback(Fallback),
}

impl TurnOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnOutcome::Completed { cache_hit: true, .. } => "cached",
            TurnOutcome::Completed { .. } => "completed",
            TurnOutcome::Faq { .. } => "faq",
            TurnOutcome::Moderated(_) => "moderated",
            TurnOutcome::Fallback(_) => "fallback",
        }
    }
}

/// Text to deliver and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub text: String,
    pub outcome: TurnOutcome,
}

impl TurnReply {
    fn fallback(fallback: Fallback) -> Self {
        Self {
            text: fallback.text().to_string(),
            outcome: TurnOutcome::Fallback(fallback),
        }
    }
}

/// Fallback reply for a failed turn.
pub fn fallback_for(err: &RapportError) -> Fallback {
    match err {
        RapportError::CompletionTimeout { .. } => Fallback::Timeout,
        RapportError::CompletionTransport { .. }
        | RapportError::CompletionMalformedResponse { .. } => Fallback::Unavailable,
        _ => Fallback::Internal,
    }
}

pub struct TurnEngine {
    store: Arc<ContextStore>,
    cache: ResponseCache,
    completion: Arc<dyn CompletionAdapter>,
    storage: Arc<dyn StorageAdapter>,
    persona: Persona,
    prompts: PromptBuilder,
    extractor: EntityExtractor,
    classifier: StyleClassifier,
    scorer: RelationshipScorer,
    gate: ModerationGate,
    enrichment: EnrichmentPipeline,
    permits: Semaphore,
    completion_timeout: Duration,
    history_limit: usize,
    prefix_chars: usize,
    /// Seeds one private RNG per turn.
    rng: Mutex<StdRng>,
}

impl TurnEngine {
    pub fn new(
        config: &RapportConfig,
        storage: Arc<dyn StorageAdapter>,
        completion: Arc<dyn CompletionAdapter>,
    ) -> Self {
        let persona = Persona::new(config.persona.clone());
        let rng = config
            .agent
            .rng_seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Self {
            store: Arc::new(ContextStore::new(storage.clone())),
            cache: ResponseCache::new(&config.cache),
            completion,
            storage,
            prompts: PromptBuilder::new(persona.clone(), &config.context, &config.completion),
            persona,
            extractor: EntityExtractor::new(&config.extraction),
            classifier: StyleClassifier::new(&config.classifier),
            scorer: RelationshipScorer::new(config.scoring.clone()),
            gate: ModerationGate::new(&config.moderation),
            enrichment: EnrichmentPipeline::new(config.enrichment.clone()),
            permits: Semaphore::new(config.completion.max_concurrent.max(1)),
            completion_timeout: Duration::from_secs(config.completion.timeout_secs),
            history_limit: config.context.history_limit,
            prefix_chars: config.cache.prefix_chars,
            rng: Mutex::new(rng),
        }
    }

    pub fn contexts(&self) -> &Arc<ContextStore> {
        &self.store
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Runs one turn. Never fails: errors become fallback replies.
    pub async fn handle_turn(&self, msg: &InboundMessage) -> TurnReply {
        match self.run_turn(msg).await {
            Ok(reply) => {
                recording::record_turn(reply_style(&reply), reply.outcome.as_str());
                reply
            }
            Err(e) => {
                error!(user_id = %msg.user_id, error = %e, "turn failed");
                recording::record_turn(StyleTag::Neutral, "fallback");
                TurnReply::fallback(Fallback::Internal)
            }
        }
    }

    async fn run_turn(&self, msg: &InboundMessage) -> Result<TurnReply, RapportError> {
        let now = msg.received_at;
        let mut rng = self.turn_rng();
        let mut ctx = self.store.acquire(msg.user_id, now).await?;

        if let Some(name) = sanitize_display_name(msg.display_name_hint.as_deref()) {
            ctx.display_name = Some(name);
        } else if ctx.display_name.is_none() {
            ctx.display_name = Some(self.persona.default_user_name().to_string());
        }
        ctx.last_interaction = now;

        let verdict = self.gate.inspect(&msg.text, &mut ctx, now);
        if verdict != ModerationVerdict::Clean {
            recording::record_moderation(verdict.as_str());
            warn!(
                user_id = %msg.user_id,
                verdict = verdict.as_str(),
                mat_count = ctx.mat_count,
                "profanity detected"
            );
        }
        if let Some(text) = verdict.bypass_text() {
            self.persist_or_log(&ctx).await;
            return Ok(TurnReply {
                text: text.to_string(),
                outcome: TurnOutcome::Moderated(verdict),
            });
        }

        self.extractor.extract(&msg.text, &mut ctx, &mut rng);
        let classification = self.classifier.classify(&msg.text, &ctx, &mut rng);
        let style = classification.style;
        let score = self.scorer.score(style, &msg.text, &mut ctx);
        debug!(
            user_id = %msg.user_id,
            %style,
            rule = ?classification.rule,
            delta = score.delta,
            "turn classified"
        );

        let normalized = lexicon::normalize_message(&msg.text);
        let (raw, outcome) = match self.persona.faq_answer(&normalized) {
            Some(answer) => (answer, TurnOutcome::Faq { style }),
            None => {
                let key = Fingerprint::new(msg.user_id, &normalized, self.prefix_chars, style);
                let compute = || self.complete(self.prompts.build(&msg.text, style, &ctx));
                match self.cache.get_or_compute(key, compute).await {
                    Ok(lookup) => {
                        recording::record_cache(lookup.hit);
                        let cache_hit = lookup.hit;
                        (lookup.text, TurnOutcome::Completed { style, cache_hit })
                    }
                    Err(e) => {
                        recording::record_cache(false);
                        let fallback = fallback_for(&e);
                        if e.is_completion_failure() {
                            recording::record_completion_failure(completion_failure_kind(&e));
                            warn!(user_id = %msg.user_id, error = %e, "completion failed");
                        } else {
                            error!(user_id = %msg.user_id, error = %e, "completion failed");
                        }
                        self.persist_or_log(&ctx).await;
                        return Ok(TurnReply::fallback(fallback));
                    }
                }
            }
        };

        let shift = LevelShift::between(score.previous_level, score.new_level);
        let text = self
            .enrichment
            .enrich(&raw, style, shift, &mut ctx, now, &mut rng);

        let turn = Turn {
            user_text: msg.text.clone(),
            bot_text: text.clone(),
            style,
            timestamp: now,
        };
        ctx.push_turn(turn.clone(), self.history_limit);
        ctx.conversation_depth += 1;
        ctx.first_interaction = false;
        self.persist_or_log(&ctx).await;

        if let Err(e) = self.storage.append_message_log(msg.user_id, &turn).await {
            warn!(user_id = %msg.user_id, error = %e, "failed to append message log");
        }

        info!(
            user_id = %msg.user_id,
            %style,
            outcome = outcome.as_str(),
            score = score.new_score,
            level = %score.new_level,
            "turn complete"
        );
        Ok(TurnReply { text, outcome })
    }

    /// One completion call, bounded by the semaphore and the timeout.
    async fn complete(&self, request: CompletionRequest) -> Result<String, RapportError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| RapportError::Internal("completion permits closed".into()))?;

        let started = Instant::now();
        let result = tokio::time::timeout(self.completion_timeout, self.completion.complete(request)).await;
        recording::record_completion_latency(started.elapsed().as_secs_f64());

        let response = result.map_err(|_| RapportError::CompletionTimeout {
            duration: self.completion_timeout,
        })??;
        let text = response.text.trim();
        if text.is_empty() {
            return Err(RapportError::CompletionMalformedResponse {
                message: "completion text is empty".into(),
            });
        }
        debug!(model = response.model.as_str(), chars = text.chars().count(), "completion received");
        Ok(text.to_string())
    }

    /// Answers a slash command.
    pub async fn handle_command(
        &self,
        command: Command,
        msg: &InboundMessage,
    ) -> Result<String, RapportError> {
        recording::record_command(command.as_str());
        let now = msg.received_at;
        let text = match command {
            Command::Stats => commands::render_stats(&self.stats(msg.user_id, now).await?),
            Command::Relationship => {
                commands::render_relationship(&self.stats(msg.user_id, now).await?)
            }
            Command::About => self.persona.about(),
            Command::ResetMat => {
                commands::reset_reply(self.reset_counters(msg.user_id, now).await?).to_string()
            }
        };
        Ok(text)
    }

    /// Current relationship stats. Does not change the user's state.
    pub async fn stats(
        &self,
        user_id: UserId,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<RelationshipStats, RapportError> {
        let lease = self.store.acquire(user_id, now).await?;
        Ok(RelationshipStats::from(&*lease))
    }

    /// Zeroes the moderation counters. Score and history are untouched.
    ///
    /// Returns whether there was anything to reset.
    pub async fn reset_counters(
        &self,
        user_id: UserId,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<bool, RapportError> {
        let mut lease = self.store.acquire(user_id, now).await?;
        let had_offenses = lease.reset_counters();
        if had_offenses {
            self.store.persist(&lease).await?;
            info!(%user_id, "moderation counters reset");
        }
        Ok(had_offenses)
    }

    async fn persist_or_log(&self, lease: &UserLease) {
        if let Err(e) = self.store.persist(lease).await {
            error!(user_id = %lease.user_id(), error = %e, "failed to persist context");
        }
    }

    fn turn_rng(&self) -> StdRng {
        let mut master = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        StdRng::seed_from_u64(master.next_u64())
    }
}

fn reply_style(reply: &TurnReply) -> StyleTag {
    match reply.outcome {
        TurnOutcome::Completed { style, .. } | TurnOutcome::Faq { style } => style,
        TurnOutcome::Moderated(_) => StyleTag::Angry,
        TurnOutcome::Fallback(_) => StyleTag::Neutral,
    }
}

fn completion_failure_kind(err: &RapportError) -> &'static str {
    match err {
        RapportError::CompletionTimeout { .. } => "timeout",
        RapportError::CompletionTransport { .. } => "transport",
        RapportError::CompletionMalformedResponse { .. } => "malformed",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallbacks_follow_error_kind() {
        let timeout = RapportError::CompletionTimeout {
            duration: Duration::from_secs(10),
        };
        let transport = RapportError::CompletionTransport {
            message: "503".into(),
            source: None,
        };
        let malformed = RapportError::CompletionMalformedResponse {
            message: "no alternatives".into(),
        };
        assert_eq!(fallback_for(&timeout), Fallback::Timeout);
        assert_eq!(fallback_for(&transport), Fallback::Unavailable);
        assert_eq!(fallback_for(&malformed), Fallback::Unavailable);
        assert_eq!(fallback_for(&RapportError::Internal("x".into())), Fallback::Internal);
    }

    #[test]
    fn outcome_labels() {
        let cached = TurnOutcome::Completed {
            style: StyleTag::Friendly,
            cache_hit: true,
        };
        assert_eq!(cached.as_str(), "cached");
        assert_eq!(TurnOutcome::Fallback(Fallback::Timeout).as_str(), "fallback");
        assert_eq!(
            TurnOutcome::Moderated(ModerationVerdict::Blocked).as_str(),
            "moderated"
        );
    }
}
