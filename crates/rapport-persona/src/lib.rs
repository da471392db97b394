// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persona and the per-turn analysis around it.
//!
//! Every component here is synchronous and takes an explicit RNG, so a
//! seeded `StdRng` makes any turn reproducible.

pub mod classifier;
pub mod enrichment;
pub mod extractor;
pub mod lexicon;
pub mod moderation;
pub mod persona;
pub mod scorer;

pub use classifier::{Classification, ClassificationRule, StyleClassifier};
pub use enrichment::EnrichmentPipeline;
pub use extractor::EntityExtractor;
pub use moderation::{ModerationGate, ModerationVerdict};
pub use persona::{Fallback, LevelShift, Persona, StyleProfile};
pub use scorer::{RelationshipScorer, ScoreOutcome};
