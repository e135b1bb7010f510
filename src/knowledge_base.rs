//! # Knowledge Base Module
//!
//! Empirical constants and reference tables behind every cost formula
//!
//! ## Key Components
//! - [`KnowledgeBase`] - Immutable lookup tables passed into the estimator
//! - [`ModelPricing`] - Per-million token pricing for a model
//! - [`PatternProfile`] - Base API call counts per architecture pattern
//! - [`MemoryProfile`] - Token multiplier and overhead calls per memory strategy
//! - [`Scenario`] - The low/mid/high projection axis
//!
//! Every number the estimator uses lives here. No other module hard-codes
//! pricing, multipliers, or rates.

use std::collections::HashMap;

use serde::Serialize;

use crate::system::CustomModelPrice;

// ── Token averages (measured across 10-turn conversations) ──

pub const AVG_USER_TOKENS: u64 = 30;
pub const AVG_ASSISTANT_TOKENS: u64 = 300;

// ── Tool overhead ──

/// Tokens added to every request that carries one tool definition.
pub const TOOL_DEF_OVERHEAD_TOKENS: u64 = 500;
/// One tool invocation costs two round trips: the call, then the result re-injected.
pub const API_CALLS_PER_TOOL_USE: u64 = 2;
pub const AVG_TOOL_RESULT_TOKENS: u64 = 200;

// ── Multi-agent context duplication ──

/// Each additional collaborating agent multiplies input tokens by this
/// factor, compounded per agent.
pub const CONTEXT_DUPLICATION_PER_AGENT: f64 = 1.2;

// ── Prompt caching ──

/// A cacheable block must reach this size before caching is possible.
pub const CACHE_MIN_TOKENS: u64 = 1024;
/// Cached reads cost 10% of the normal input price.
pub const CACHE_READ_DISCOUNT: f64 = 0.10;
/// System-prompt baseline counted toward the cacheable block.
pub const CACHEABLE_SYSTEM_PROMPT_TOKENS: u64 = 500;

// ── Tool failure economics ──

/// Fractional context growth caused by each failed tool call.
pub const CONTEXT_GROWTH_PER_FAILURE: f64 = 0.18;
/// Loop detection cuts the failure rate by 60%.
pub const LOOP_DETECTION_FAILURE_FACTOR: f64 = 0.4;
/// Failure overhead cap with loop detection: guardrails stop runaway loops.
pub const FAILURE_CAP_GUARDED: f64 = 1.0;
/// Without guardrails an unguarded tool spiral can triple context.
pub const FAILURE_CAP_UNGUARDED: f64 = 3.0;

// ── Optimization discounts ──

pub const BATCH_DISCOUNT: f64 = 0.5;

// ── Misc ──

/// Memory bookkeeping calls (summaries, entity extraction) run on a cheap
/// model at roughly this flat cost per call.
pub const MEMORY_OVERHEAD_COST_PER_CALL: f64 = 0.002;

/// Model assumed when no agent's model is found in the pricing table.
pub const FALLBACK_MODEL: &str = "claude-sonnet-4-5";

/// One of the three parallel cost projections computed for every estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    Low,
    Mid,
    High,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Low, Scenario::Mid, Scenario::High];

    pub fn label(self) -> &'static str {
        match self {
            Scenario::Low => "low",
            Scenario::Mid => "mid",
            Scenario::High => "high",
        }
    }

    /// Tool call failure probability under this scenario's assumptions.
    pub fn failure_rate(self) -> f64 {
        match self {
            Scenario::Low => 0.05,
            Scenario::Mid => 0.15,
            Scenario::High => 0.35,
        }
    }

    /// How many times each declared tool gets used per conversation.
    pub fn tool_use_multiplier(self) -> u64 {
        match self {
            Scenario::Low => 1,
            Scenario::Mid => 2,
            Scenario::High => 4,
        }
    }
}

/// Pricing for a single model, in dollars per million tokens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelPricing {
    pub input: f64,
    pub output: f64,
    pub label: String,
}

impl ModelPricing {
    fn new(input: f64, output: f64, label: &str) -> Self {
        Self {
            input,
            output,
            label: label.to_string(),
        }
    }
}

/// How a memory strategy scales resent history and adds bookkeeping calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryProfile {
    /// Token volume ratio relative to the full-history buffer baseline.
    pub token_multiplier: f64,
    /// Extra API calls per user turn (summaries, entity extraction).
    pub overhead_calls_per_turn: f64,
    pub description: String,
}

/// Base API call counts for an architecture pattern across scenarios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternProfile {
    pub label: String,
    pub base_calls_low: u32,
    pub base_calls_mid: u32,
    pub base_calls_high: u32,
    pub description: String,
}

impl PatternProfile {
    fn new(label: &str, low: u32, mid: u32, high: u32, description: &str) -> Self {
        Self {
            label: label.to_string(),
            base_calls_low: low,
            base_calls_mid: mid,
            base_calls_high: high,
            description: description.to_string(),
        }
    }

    pub fn base_calls(&self, scenario: Scenario) -> u32 {
        match scenario {
            Scenario::Low => self.base_calls_low,
            Scenario::Mid => self.base_calls_mid,
            Scenario::High => self.base_calls_high,
        }
    }
}

/// Price template for a non-LLM service (image generation, TTS, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicePreset {
    pub unit_price: f64,
    pub unit_label: String,
}

impl ServicePreset {
    fn new(unit_price: f64, unit_label: &str) -> Self {
        Self {
            unit_price,
            unit_label: unit_label.to_string(),
        }
    }
}

/// The full set of reference tables the estimator consults. Passed in
/// explicitly so tests can run the engine against synthetic tables.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    models: HashMap<String, ModelPricing>,
    patterns: HashMap<String, PatternProfile>,
    memory_strategies: HashMap<String, MemoryProfile>,
    service_presets: HashMap<String, ServicePreset>,
}

lazy_static::lazy_static! {
    static ref BUILTIN: KnowledgeBase = build_builtin();
}

impl KnowledgeBase {
    /// The builtin tables, constructed once per process.
    pub fn builtin() -> &'static KnowledgeBase {
        &BUILTIN
    }

    /// Returns a copy with caller-supplied model prices merged over the
    /// builtin table. Caller entries win on key collision.
    pub fn with_custom_models(&self, custom: &HashMap<String, CustomModelPrice>) -> KnowledgeBase {
        let mut merged = self.clone();
        for (key, price) in custom {
            merged.models.insert(
                key.clone(),
                ModelPricing::new(price.input, price.output, key),
            );
        }
        merged
    }

    pub fn model_pricing(&self, key: &str) -> Option<&ModelPricing> {
        self.models.get(key)
    }

    pub fn pattern_profile(&self, key: &str) -> Option<&PatternProfile> {
        self.patterns.get(key)
    }

    pub fn memory_profile(&self, key: &str) -> Option<&MemoryProfile> {
        self.memory_strategies.get(key)
    }

    pub fn service_preset(&self, name: &str) -> Option<&ServicePreset> {
        self.service_presets.get(name)
    }

    pub fn models(&self) -> &HashMap<String, ModelPricing> {
        &self.models
    }

    pub fn patterns(&self) -> &HashMap<String, PatternProfile> {
        &self.patterns
    }

    pub fn service_presets(&self) -> &HashMap<String, ServicePreset> {
        &self.service_presets
    }
}

fn build_builtin() -> KnowledgeBase {
    let mut models = HashMap::new();
    models.insert(
        "claude-haiku-4-5".to_string(),
        ModelPricing::new(1.00, 5.00, "Haiku 4.5"),
    );
    models.insert(
        "claude-sonnet-4-5".to_string(),
        ModelPricing::new(3.00, 15.00, "Sonnet 4.5"),
    );
    models.insert(
        "claude-opus-4-5".to_string(),
        ModelPricing::new(15.00, 75.00, "Opus 4.5"),
    );
    models.insert(
        "gpt-4o".to_string(),
        ModelPricing::new(2.50, 10.00, "GPT-4o"),
    );
    models.insert(
        "gpt-4o-mini".to_string(),
        ModelPricing::new(0.15, 0.60, "GPT-4o Mini"),
    );
    models.insert(
        "deepseek-v3".to_string(),
        ModelPricing::new(0.28, 0.42, "DeepSeek V3"),
    );

    let mut patterns = HashMap::new();
    patterns.insert(
        "single_call".to_string(),
        PatternProfile::new(
            "Single LLM Call",
            1,
            1,
            1,
            "One prompt in, one response out. No tools, no loops.",
        ),
    );
    patterns.insert(
        "prompt_chain".to_string(),
        PatternProfile::new(
            "Prompt Chaining",
            2,
            3,
            5,
            "Fixed sequential steps. Predictable cost.",
        ),
    );
    patterns.insert(
        "routing".to_string(),
        PatternProfile::new(
            "Routing (Classifier + Handler)",
            2,
            2,
            3,
            "Cheap classifier then specialized handler.",
        ),
    );
    patterns.insert(
        "parallel".to_string(),
        PatternProfile::new(
            "Parallelization",
            2,
            4,
            6,
            "Independent subtasks run simultaneously.",
        ),
    );
    patterns.insert(
        "react_agent".to_string(),
        PatternProfile::new(
            "ReAct Agent (Tool Loop)",
            2,
            4,
            10,
            "Agent decides tools and actions. Loops and failures compound.",
        ),
    );
    patterns.insert(
        "multi_agent".to_string(),
        PatternProfile::new(
            "Multi-Agent (Orchestrator-Workers)",
            4,
            8,
            15,
            "Supervisor + workers. Context duplication at every handoff.",
        ),
    );
    patterns.insert(
        "eval_optimizer".to_string(),
        PatternProfile::new(
            "Evaluator-Optimizer",
            2,
            4,
            8,
            "Generate, evaluate, revise loop. Double calls per iteration.",
        ),
    );
    patterns.insert(
        "reflexion".to_string(),
        PatternProfile::new(
            "Reflexion (ReAct + Self-Critique)",
            3,
            6,
            12,
            "Most expensive per task. Self-critique adds tokens per iteration.",
        ),
    );

    let mut memory_strategies = HashMap::new();
    memory_strategies.insert(
        "buffer".to_string(),
        MemoryProfile {
            token_multiplier: 1.0,
            overhead_calls_per_turn: 0.0,
            description: "Full history every turn. Linear token growth.".to_string(),
        },
    );
    memory_strategies.insert(
        "summary".to_string(),
        MemoryProfile {
            token_multiplier: 0.71,
            overhead_calls_per_turn: 0.3,
            description: "Periodic compression. Saves tokens but adds overhead calls.".to_string(),
        },
    );
    memory_strategies.insert(
        "entity".to_string(),
        MemoryProfile {
            token_multiplier: 0.45,
            overhead_calls_per_turn: 1.0,
            description: "Fact extraction. Best compression, highest API overhead.".to_string(),
        },
    );
    memory_strategies.insert(
        "none".to_string(),
        MemoryProfile {
            token_multiplier: 0.0,
            overhead_calls_per_turn: 0.0,
            description: "No memory. Each turn is independent.".to_string(),
        },
    );

    let mut service_presets = HashMap::new();
    service_presets.insert("dall-e-3".to_string(), ServicePreset::new(0.08, "per image"));
    service_presets.insert("dall-e-2".to_string(), ServicePreset::new(0.02, "per image"));
    service_presets.insert("whisper".to_string(), ServicePreset::new(0.006, "per minute"));
    service_presets.insert(
        "elevenlabs-tts".to_string(),
        ServicePreset::new(0.30, "per 1K chars"),
    );
    service_presets.insert(
        "ada-002".to_string(),
        ServicePreset::new(0.0001, "per 1K tokens"),
    );
    service_presets.insert(
        "runway-video".to_string(),
        ServicePreset::new(0.05, "per second"),
    );

    KnowledgeBase {
        models,
        patterns,
        memory_strategies,
        service_presets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookups() {
        let kb = KnowledgeBase::builtin();
        assert!(kb.model_pricing("claude-sonnet-4-5").is_some());
        assert!(kb.pattern_profile("react_agent").is_some());
        assert!(kb.memory_profile("buffer").is_some());
        assert!(kb.service_preset("whisper").is_some());

        assert!(kb.model_pricing("gpt-5-imaginary").is_none());
        assert!(kb.pattern_profile("swarm").is_none());
    }

    #[test]
    fn test_fallback_model_exists() {
        assert!(KnowledgeBase::builtin().model_pricing(FALLBACK_MODEL).is_some());
    }

    #[test]
    fn test_pattern_base_calls_are_monotonic() {
        for (key, profile) in KnowledgeBase::builtin().patterns() {
            assert!(
                profile.base_calls_low <= profile.base_calls_mid
                    && profile.base_calls_mid <= profile.base_calls_high,
                "pattern '{}' breaks low <= mid <= high ordering",
                key
            );
            assert!(profile.base_calls_low >= 1);
        }
    }

    #[test]
    fn test_memory_baseline_invariants() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.memory_profile("buffer").unwrap().token_multiplier, 1.0);
        assert_eq!(kb.memory_profile("none").unwrap().token_multiplier, 0.0);
        assert_eq!(kb.memory_profile("none").unwrap().overhead_calls_per_turn, 0.0);
    }

    #[test]
    fn test_custom_models_merge_over_builtin() {
        let mut custom = HashMap::new();
        custom.insert(
            "claude-sonnet-4-5".to_string(),
            CustomModelPrice { input: 1.0, output: 2.0 },
        );
        custom.insert(
            "my-finetune".to_string(),
            CustomModelPrice { input: 0.5, output: 0.9 },
        );

        let merged = KnowledgeBase::builtin().with_custom_models(&custom);

        // Caller-supplied price wins on collision
        assert_eq!(merged.model_pricing("claude-sonnet-4-5").unwrap().input, 1.0);
        assert_eq!(merged.model_pricing("my-finetune").unwrap().output, 0.9);
        // Untouched builtin entries survive
        assert_eq!(merged.model_pricing("gpt-4o").unwrap().input, 2.5);
        // Builtin table is not mutated
        assert_eq!(
            KnowledgeBase::builtin().model_pricing("claude-sonnet-4-5").unwrap().input,
            3.0
        );
    }

    #[test]
    fn test_scenario_axis() {
        assert_eq!(Scenario::ALL.len(), 3);
        assert!(Scenario::Low.failure_rate() < Scenario::Mid.failure_rate());
        assert!(Scenario::Mid.failure_rate() < Scenario::High.failure_rate());
        assert_eq!(Scenario::Low.tool_use_multiplier(), 1);
        assert_eq!(Scenario::Mid.tool_use_multiplier(), 2);
        assert_eq!(Scenario::High.tool_use_multiplier(), 4);
    }
}
