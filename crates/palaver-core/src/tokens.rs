// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pre-generation token estimation.
//!
//! Window assembly runs before any provider call, so no provider-native
//! usage data exists yet; every budget decision uses these estimates.
//! Counts are deterministic for identical input.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tiktoken_rs::CoreBPE;

use crate::types::ModelSpec;

/// Identifier of a token estimation method.
///
/// Ordered and string-keyed so it can serve as a serialized map key in
/// cached per-language count maps.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    /// Whitespace-split heuristic: per word, `len / 5 + 1` tokens
    /// (the +1 accounts for the separator).
    WordCount,
    /// BPE count against the cl100k_base vocabulary.
    Cl100kBase,
}

impl EstimationMethod {
    /// All methods the cache writer precomputes counts for.
    pub fn supported() -> impl Iterator<Item = EstimationMethod> {
        EstimationMethod::iter()
    }
}

impl Default for EstimationMethod {
    fn default() -> Self {
        EstimationMethod::WordCount
    }
}

fn cl100k() -> &'static CoreBPE {
    static CL100K: OnceLock<CoreBPE> = OnceLock::new();
    CL100K.get_or_init(|| {
        tiktoken_rs::cl100k_base().expect("cl100k_base vocabulary is embedded in the binary")
    })
}

/// Estimates the token cost of `text` under the given method.
///
/// Guarantees: deterministic given identical input, and for the word-count
/// heuristic the result never exceeds the character length of the input.
pub fn estimate_tokens(text: &str, method: EstimationMethod) -> u32 {
    match method {
        EstimationMethod::WordCount => text
            .split_whitespace()
            .map(|word| (word.chars().count() / 5 + 1) as u32)
            .sum(),
        EstimationMethod::Cl100kBase => cl100k().encode_ordinary(text).len() as u32,
    }
}

/// Estimates the token cost of `text` for a specific model, returning the
/// method that produced the count alongside it.
pub fn estimate_for_model(text: &str, model: &ModelSpec) -> (EstimationMethod, u32) {
    let method = model.estimation_method;
    (method, estimate_tokens(text, method))
}
