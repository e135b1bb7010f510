//! # Estimator Module
//!
//! Deterministic cost calculation engine
//!
//! ## Key Components
//! - [`calculate_costs`] - Turn a system description into low/mid/high scenarios
//! - [`select_primary_model`] - Worst-case model selection for dollar conversion
//! - [`non_llm_monthly_cost`] - Linear adder for auxiliary services
//! - [`ScenarioResult`] / [`CostEstimate`] - Output records
//!
//! Pure math, no I/O, no shared state. Two calls with the same input produce
//! byte-identical output.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::EstimateError;
use crate::knowledge_base::{
    KnowledgeBase, MemoryProfile, ModelPricing, PatternProfile, Scenario, API_CALLS_PER_TOOL_USE,
    AVG_ASSISTANT_TOKENS, AVG_TOOL_RESULT_TOKENS, AVG_USER_TOKENS, BATCH_DISCOUNT,
    CACHEABLE_SYSTEM_PROMPT_TOKENS, CACHE_MIN_TOKENS, CACHE_READ_DISCOUNT,
    CONTEXT_DUPLICATION_PER_AGENT, CONTEXT_GROWTH_PER_FAILURE, FAILURE_CAP_GUARDED,
    FAILURE_CAP_UNGUARDED, FALLBACK_MODEL, LOOP_DETECTION_FAILURE_FACTOR,
    MEMORY_OVERHEAD_COST_PER_CALL, TOOL_DEF_OVERHEAD_TOKENS,
};
use crate::system::{EstimateRequest, NonLlmService, OptimizationFlags, ParsedAgent, ParsedSystem};

/// One fully computed cost projection. All numeric fields are rounded and
/// display-ready; consumers must not round again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub total_calls_per_convo: u64,
    pub input_tokens_per_convo: u64,
    pub output_tokens_per_convo: u64,
    pub cost_per_conversation: f64,
    pub daily_cost: f64,
    pub monthly_cost: f64,
    pub memory_overhead_calls: u64,
    pub tool_calls_per_convo: u64,
    pub failure_token_overhead: u64,
    pub caching_applicable: bool,
    pub caching_savings_monthly: f64,
    pub primary_model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub low: ScenarioResult,
    pub mid: ScenarioResult,
    pub high: ScenarioResult,
}

impl CostEstimate {
    pub fn scenario(&self, scenario: Scenario) -> &ScenarioResult {
        match scenario {
            Scenario::Low => &self.low,
            Scenario::Mid => &self.mid,
            Scenario::High => &self.high,
        }
    }
}

/// Run the full estimation: validate the request, merge custom pricing, and
/// compute the three scenarios independently.
pub fn calculate_costs(
    kb: &KnowledgeBase,
    request: &EstimateRequest,
) -> Result<CostEstimate, EstimateError> {
    let parsed = &request.parsed;

    if parsed.agents.is_empty() {
        return Err(EstimateError::InvalidInput(
            "at least one agent is required".to_string(),
        ));
    }
    if parsed.avg_turns_per_conversation == 0 {
        return Err(EstimateError::InvalidInput(
            "avg_turns_per_conversation must be at least 1".to_string(),
        ));
    }
    for service in &request.non_llm_services {
        if service.unit_price < 0.0 {
            return Err(EstimateError::InvalidInput(format!(
                "service '{}' has a negative unit price",
                service.name
            )));
        }
    }

    let kb = kb.with_custom_models(&request.custom_models);

    let profile = kb
        .pattern_profile(&parsed.pattern)
        .ok_or_else(|| EstimateError::UnknownPattern(parsed.pattern.clone()))?;
    let mem = kb
        .memory_profile(&parsed.memory_strategy)
        .ok_or_else(|| EstimateError::UnknownMemoryStrategy(parsed.memory_strategy.clone()))?;
    for agent in &parsed.agents {
        if kb.model_pricing(&agent.model).is_none() {
            return Err(EstimateError::UnknownModel(agent.model.clone()));
        }
    }

    // Conservative worst-case costing: bill everything at the priciest model.
    let primary_model = select_primary_model(&parsed.agents, &kb);
    let pricing = kb
        .model_pricing(&primary_model)
        .ok_or_else(|| EstimateError::UnknownModel(primary_model.clone()))?;

    let non_llm_monthly = non_llm_monthly_cost(&request.non_llm_services);
    debug!(
        "estimating '{}': {} agents, pattern={}, memory={}, non-LLM monthly=${:.2}",
        parsed.system_name,
        parsed.agents.len(),
        parsed.pattern,
        parsed.memory_strategy,
        non_llm_monthly
    );

    let estimate = |scenario| {
        estimate_scenario(
            scenario,
            parsed,
            profile,
            mem,
            pricing,
            &primary_model,
            request.optimizations,
            non_llm_monthly,
        )
    };

    Ok(CostEstimate {
        low: estimate(Scenario::Low),
        mid: estimate(Scenario::Mid),
        high: estimate(Scenario::High),
    })
}

#[allow(clippy::too_many_arguments)]
fn estimate_scenario(
    scenario: Scenario,
    parsed: &ParsedSystem,
    profile: &PatternProfile,
    mem: &MemoryProfile,
    pricing: &ModelPricing,
    primary_model: &str,
    opts: OptimizationFlags,
    non_llm_monthly: f64,
) -> ScenarioResult {
    let turns = parsed.avg_turns_per_conversation as u64;
    let daily_volume = parsed.daily_conversations as f64;

    // Step 1: base API calls from the pattern profile
    let base_calls = profile.base_calls(scenario) as u64;

    // Step 2: tool overhead. One tool use = two round trips, and every call
    // to a tool-carrying agent resends that agent's tool definitions (or a
    // single definition under tool-specific routing).
    let mut tool_calls_per_convo: u64 = 0;
    let mut tool_def_tokens_per_convo: u64 = 0;
    for agent in &parsed.agents {
        if !agent.has_tools {
            continue;
        }
        let uses = agent.tool_count as u64 * scenario.tool_use_multiplier();
        let agent_calls = uses * API_CALLS_PER_TOOL_USE;
        tool_calls_per_convo += agent_calls;

        let defs_per_call = if opts.tool_specific_routing {
            TOOL_DEF_OVERHEAD_TOKENS
        } else {
            agent.tool_count as u64 * TOOL_DEF_OVERHEAD_TOKENS
        };
        tool_def_tokens_per_convo += defs_per_call * agent_calls;
    }

    // Step 3: memory bookkeeping calls (summaries, entity extraction)
    let memory_overhead_calls = turns as f64 * mem.overhead_calls_per_turn;
    let total_calls = (base_calls + tool_calls_per_convo) as f64 + memory_overhead_calls;

    // Step 4: input tokens. Turn N resends all N prior turns, so the resent
    // volume grows as the triangular number, scaled by the memory strategy's
    // compression ratio. Stateless systems resend nothing.
    let mut total_input_tokens = if parsed.memory_strategy == "none" {
        (turns * AVG_USER_TOKENS) as f64
    } else {
        let triangle = (turns * (turns + 1)) as f64 / 2.0;
        let avg_turn_input = (AVG_USER_TOKENS + AVG_ASSISTANT_TOKENS) as f64;
        (triangle * avg_turn_input * mem.token_multiplier).round()
    };
    let total_output_tokens = turns * AVG_ASSISTANT_TOKENS;

    total_input_tokens += tool_def_tokens_per_convo as f64;
    total_input_tokens += (tool_calls_per_convo * AVG_TOOL_RESULT_TOKENS) as f64;

    // Step 5: multi-agent context duplication, compounded per extra agent
    if parsed.agents.len() > 1 {
        let duplication = CONTEXT_DUPLICATION_PER_AGENT.powi(parsed.agents.len() as i32 - 1);
        total_input_tokens = (total_input_tokens * duplication).round();
    }

    // Step 6: failure-driven context growth, capped by guardrail strength
    let mut failure_rate = scenario.failure_rate();
    if opts.loop_detection {
        failure_rate *= LOOP_DETECTION_FAILURE_FACTOR;
    }
    let expected_failures = tool_calls_per_convo as f64 * failure_rate;
    let raw_failure_multiplier = expected_failures * CONTEXT_GROWTH_PER_FAILURE;
    let failure_cap = if opts.loop_detection {
        FAILURE_CAP_GUARDED
    } else {
        FAILURE_CAP_UNGUARDED
    };
    if raw_failure_multiplier > failure_cap {
        warn!(
            "{} scenario: raw failure multiplier {:.2} exceeds the {:.1} cap; \
             tool volume is outside the calibrated range",
            scenario.label(),
            raw_failure_multiplier,
            failure_cap
        );
    }
    let failure_token_overhead =
        (total_input_tokens * raw_failure_multiplier.min(failure_cap)).round();
    total_input_tokens += failure_token_overhead;

    // Step 7: dollar conversion at the primary model's rates
    let mut input_cost = total_input_tokens / 1_000_000.0 * pricing.input;
    let output_cost = total_output_tokens as f64 / 1_000_000.0 * pricing.output;

    // Step 8: prompt caching. The cacheable block is the static prefix
    // (system prompt + all tool definitions); the first call populates the
    // cache, every later call reads it at a discount.
    let total_tool_def_tokens: u64 = parsed
        .agents
        .iter()
        .filter(|a| a.has_tools)
        .map(|a| a.tool_count as u64 * TOOL_DEF_OVERHEAD_TOKENS)
        .sum();
    let cacheable_tokens = CACHEABLE_SYSTEM_PROMPT_TOKENS + total_tool_def_tokens;
    let caching_applicable = cacheable_tokens >= CACHE_MIN_TOKENS;

    let mut caching_savings_per_convo = 0.0;
    if caching_applicable {
        caching_savings_per_convo = cacheable_tokens as f64 / 1_000_000.0
            * pricing.input
            * (1.0 - CACHE_READ_DISCOUNT)
            * (total_calls - 1.0);
        if opts.caching_enabled {
            input_cost -= caching_savings_per_convo;
        }
        // Otherwise the savings are reported as unrealized potential.
    }

    let mut cost_per_convo = input_cost + output_cost;
    cost_per_convo += memory_overhead_calls * MEMORY_OVERHEAD_COST_PER_CALL;

    // Step 9: batch processing discount, applied after everything else
    if opts.batch_processing {
        cost_per_convo *= BATCH_DISCOUNT;
    }

    // Step 10: scale to daily and monthly, folding in non-LLM services
    let daily_cost = cost_per_convo * daily_volume;
    let monthly_cost = daily_cost * 30.0;

    ScenarioResult {
        total_calls_per_convo: total_calls.round() as u64,
        input_tokens_per_convo: total_input_tokens as u64,
        output_tokens_per_convo: total_output_tokens,
        cost_per_conversation: round_to(cost_per_convo, 6),
        daily_cost: round_to(daily_cost + non_llm_monthly / 30.0, 2),
        monthly_cost: round_to(monthly_cost + non_llm_monthly, 2),
        memory_overhead_calls: memory_overhead_calls.round() as u64,
        tool_calls_per_convo,
        failure_token_overhead: failure_token_overhead as u64,
        caching_applicable,
        caching_savings_monthly: round_to(caching_savings_per_convo * daily_volume * 30.0, 2),
        primary_model: primary_model.to_string(),
    }
}

/// Find the most expensive model in the roster, by output price. Ties go to
/// the agent listed first; an empty or entirely unknown roster falls back to
/// [`FALLBACK_MODEL`].
pub fn select_primary_model(agents: &[ParsedAgent], kb: &KnowledgeBase) -> String {
    let mut max_cost = 0.0;
    let mut max_model: Option<&str> = None;

    for agent in agents {
        if let Some(pricing) = kb.model_pricing(&agent.model) {
            if pricing.output > max_cost {
                max_cost = pricing.output;
                max_model = Some(&agent.model);
            }
        }
    }

    max_model.unwrap_or(FALLBACK_MODEL).to_string()
}

/// Monthly dollar total for auxiliary non-LLM services.
pub fn non_llm_monthly_cost(services: &[NonLlmService]) -> f64 {
    services
        .iter()
        .map(|s| s.unit_price * s.daily_volume as f64)
        .sum::<f64>()
        * 30.0
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
