//! # System Description Module
//!
//! Input data model for the estimator
//!
//! ## Key Components
//! - [`ParsedSystem`] - Structured description of an AI agent system
//! - [`ParsedAgent`] - One agent in the roster
//! - [`OptimizationFlags`] - Which cost optimizations are already in place
//! - [`EstimateRequest`] - Full request envelope accepted by the engine
//!
//! These shapes are produced upstream (a form, or an LLM-backed parser) and
//! arrive as JSON. Field names are part of that contract.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAgent {
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub model: String,
    #[serde(default)]
    pub has_tools: bool,
    #[serde(default)]
    pub tool_count: u32,
    #[serde(default)]
    pub tools_described: Vec<String>,
}

/// A non-LLM service named in the system description, before pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalService {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub estimated_daily_volume: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSystem {
    #[serde(default)]
    pub system_name: String,
    pub agents: Vec<ParsedAgent>,
    pub pattern: String,
    pub memory_strategy: String,
    pub avg_turns_per_conversation: u32,
    pub daily_conversations: u32,
    #[serde(default)]
    pub has_rag: bool,
    #[serde(default)]
    pub rag_details: Option<String>,
    #[serde(default)]
    pub guardrails_mentioned: Vec<String>,
    #[serde(default)]
    pub additional_services: Vec<AdditionalService>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationFlags {
    #[serde(default)]
    pub caching_enabled: bool,
    #[serde(default)]
    pub batch_processing: bool,
    #[serde(default)]
    pub loop_detection: bool,
    #[serde(default)]
    pub tool_specific_routing: bool,
}

impl OptimizationFlags {
    /// Combines two flag sets; an optimization counts as enabled if either
    /// side enables it.
    pub fn merge(self, other: OptimizationFlags) -> OptimizationFlags {
        OptimizationFlags {
            caching_enabled: self.caching_enabled || other.caching_enabled,
            batch_processing: self.batch_processing || other.batch_processing,
            loop_detection: self.loop_detection || other.loop_detection,
            tool_specific_routing: self.tool_specific_routing || other.tool_specific_routing,
        }
    }
}

/// Caller-supplied price override for one model, $ per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomModelPrice {
    pub input: f64,
    pub output: f64,
}

/// A priced non-LLM line item, additive to the monthly total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonLlmService {
    pub name: String,
    pub unit_price: f64,
    #[serde(default)]
    pub unit_label: String,
    pub daily_volume: u32,
}

/// Everything one estimation call needs. Only `parsed` is required on the
/// wire; the other fields default to "no optimizations, no overrides".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub parsed: ParsedSystem,
    #[serde(default)]
    pub optimizations: OptimizationFlags,
    #[serde(default)]
    pub custom_models: HashMap<String, CustomModelPrice>,
    #[serde(default)]
    pub non_llm_services: Vec<NonLlmService>,
}

impl EstimateRequest {
    pub fn new(parsed: ParsedSystem) -> Self {
        Self {
            parsed,
            optimizations: OptimizationFlags::default(),
            custom_models: HashMap::new(),
            non_llm_services: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_request_deserializes_with_defaults() {
        let json = r#"{
            "parsed": {
                "agents": [{"name": "support-bot", "model": "claude-sonnet-4-5"}],
                "pattern": "single_call",
                "memory_strategy": "buffer",
                "avg_turns_per_conversation": 5,
                "daily_conversations": 100
            }
        }"#;

        let request: EstimateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.parsed.agents.len(), 1);
        assert_eq!(request.parsed.agents[0].tool_count, 0);
        assert!(!request.parsed.agents[0].has_tools);
        assert_eq!(request.optimizations, OptimizationFlags::default());
        assert!(request.custom_models.is_empty());
        assert!(request.non_llm_services.is_empty());
    }

    #[test]
    fn test_full_request_deserializes() {
        let json = r#"{
            "parsed": {
                "system_name": "Research Assistant",
                "agents": [
                    {"name": "planner", "role": "orchestrator", "model": "claude-opus-4-5",
                     "has_tools": true, "tool_count": 3, "tools_described": ["search", "fetch", "summarize"]},
                    {"name": "worker", "model": "claude-haiku-4-5"}
                ],
                "pattern": "multi_agent",
                "memory_strategy": "summary",
                "avg_turns_per_conversation": 8,
                "daily_conversations": 250,
                "has_rag": true,
                "rag_details": "pgvector over product docs",
                "guardrails_mentioned": ["loop detection"],
                "additional_services": [{"name": "whisper", "unit": "minute", "estimated_daily_volume": 40}]
            },
            "optimizations": {"caching_enabled": true},
            "custom_models": {"my-finetune": {"input": 0.5, "output": 1.5}},
            "non_llm_services": [{"name": "whisper", "unit_price": 0.006, "unit_label": "per minute", "daily_volume": 40}]
        }"#;

        let request: EstimateRequest = serde_json::from_str(json).unwrap();
        assert!(request.optimizations.caching_enabled);
        assert!(!request.optimizations.batch_processing);
        assert_eq!(request.custom_models["my-finetune"].output, 1.5);
        assert_eq!(request.non_llm_services[0].daily_volume, 40);
        assert_eq!(request.parsed.additional_services[0].estimated_daily_volume, 40);
    }

    #[test]
    fn test_flag_merge_is_or() {
        let from_body = OptimizationFlags {
            caching_enabled: true,
            ..Default::default()
        };
        let from_cli = OptimizationFlags {
            batch_processing: true,
            ..Default::default()
        };

        let merged = from_body.merge(from_cli);
        assert!(merged.caching_enabled);
        assert!(merged.batch_processing);
        assert!(!merged.loop_detection);
        assert!(!merged.tool_specific_routing);
    }
}
