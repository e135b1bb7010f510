//! # Table Display Module
//!
//! Text table rendering for estimates and reference listings
//!
//! ## Key Components
//! - [`format_estimate`] - Scenario table plus caching/tooling summary
//! - [`format_models_table`] - Builtin model pricing listing
//! - [`format_patterns_table`] - Architecture pattern listing
//! - [`format_presets_table`] - Non-LLM service preset listing

use crate::estimator::CostEstimate;
use crate::knowledge_base::{KnowledgeBase, Scenario};
use crate::system::ParsedSystem;

/// Helper function to format numbers with thousands separators
fn format_number(n: u64) -> String {
    let mut result = String::new();
    let s = n.to_string();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

pub fn format_estimate(estimate: &CostEstimate, parsed: &ParsedSystem) -> String {
    let mut output = String::new();

    let title = if parsed.system_name.is_empty() {
        "Cost Estimate".to_string()
    } else {
        format!("Cost Estimate: {}", parsed.system_name)
    };
    output.push('\n');
    output.push_str(&format!("{}\n", title));
    output.push_str(&format!("{}\n\n", "=".repeat(title.len())));

    output.push_str("┌──────────┬─────────────┬──────────────┬───────────────┬──────────────┬──────────────┬──────────────┐\n");
    output.push_str("│ Scenario │ Calls/Convo │ Input Tokens │ Output Tokens │ Cost/Convo   │ Daily (USD)  │ Monthly (USD)│\n");
    output.push_str("├──────────┼─────────────┼──────────────┼───────────────┼──────────────┼──────────────┼──────────────┤\n");

    for scenario in Scenario::ALL {
        let r = estimate.scenario(scenario);
        output.push_str(&format!(
            "│ {:<8} │ {:>11} │ {:>12} │ {:>13} │ {:>12.6} │ {:>12.2} │ {:>12.2} │\n",
            scenario.label(),
            format_number(r.total_calls_per_convo),
            format_number(r.input_tokens_per_convo),
            format_number(r.output_tokens_per_convo),
            r.cost_per_conversation,
            r.daily_cost,
            r.monthly_cost
        ));
    }

    output.push_str("└──────────┴─────────────┴──────────────┴───────────────┴──────────────┴──────────────┴──────────────┘\n");

    let mid = &estimate.mid;
    output.push_str(&format!("\nPrimary model (billed rate): {}\n", mid.primary_model));
    output.push_str(&format!(
        "Mid scenario detail: {} tool calls, {} memory overhead calls, {} failure overhead tokens\n",
        format_number(mid.tool_calls_per_convo),
        format_number(mid.memory_overhead_calls),
        format_number(mid.failure_token_overhead)
    ));

    if mid.caching_applicable {
        output.push_str(&format!(
            "Prompt caching savings (mid): ${:.2}/month\n",
            mid.caching_savings_monthly
        ));
    } else {
        output.push_str("Prompt caching: not applicable (cacheable block below 1,024 tokens)\n");
    }

    output
}

pub fn format_models_table(kb: &KnowledgeBase) -> String {
    let mut output = String::new();

    output.push_str("┌─────────────────────┬──────────────┬─────────────┬─────────────┐\n");
    output.push_str("│ Model               │ Label        │ Input ($/M) │ Output($/M) │\n");
    output.push_str("├─────────────────────┼──────────────┼─────────────┼─────────────┤\n");

    let mut keys: Vec<&String> = kb.models().keys().collect();
    keys.sort();
    for key in keys {
        let pricing = &kb.models()[key];
        output.push_str(&format!(
            "│ {:<19} │ {:<12} │ {:>11.2} │ {:>11.2} │\n",
            key, pricing.label, pricing.input, pricing.output
        ));
    }

    output.push_str("└─────────────────────┴──────────────┴─────────────┴─────────────┘\n");
    output
}

pub fn format_patterns_table(kb: &KnowledgeBase) -> String {
    let mut output = String::new();

    output.push_str("┌────────────────┬─────────────────────────────────────┬───────┬───────┬───────┐\n");
    output.push_str("│ Pattern        │ Label                               │ Low   │ Mid   │ High  │\n");
    output.push_str("├────────────────┼─────────────────────────────────────┼───────┼───────┼───────┤\n");

    let mut keys: Vec<&String> = kb.patterns().keys().collect();
    keys.sort();
    for key in keys {
        let profile = &kb.patterns()[key];
        output.push_str(&format!(
            "│ {:<14} │ {:<35} │ {:>5} │ {:>5} │ {:>5} │\n",
            key, profile.label, profile.base_calls_low, profile.base_calls_mid, profile.base_calls_high
        ));
    }

    output.push_str("└────────────────┴─────────────────────────────────────┴───────┴───────┴───────┘\n");
    output.push_str("\nLow/Mid/High columns are base API calls per conversation before tool and memory overhead.\n");
    output
}

pub fn format_presets_table(kb: &KnowledgeBase) -> String {
    let mut output = String::new();

    output.push_str("┌────────────────┬────────────┬───────────────┐\n");
    output.push_str("│ Service        │ Unit Price │ Unit          │\n");
    output.push_str("├────────────────┼────────────┼───────────────┤\n");

    let mut keys: Vec<&String> = kb.service_presets().keys().collect();
    keys.sort();
    for key in keys {
        let preset = &kb.service_presets()[key];
        output.push_str(&format!(
            "│ {:<14} │ {:>10.4} │ {:<13} │\n",
            key, preset.unit_price, preset.unit_label
        ));
    }

    output.push_str("└────────────────┴────────────┴───────────────┘\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::calculate_costs;
    use crate::system::{EstimateRequest, ParsedAgent};

    fn sample_request() -> EstimateRequest {
        EstimateRequest::new(ParsedSystem {
            system_name: "Support Bot".to_string(),
            agents: vec![ParsedAgent {
                name: "responder".to_string(),
                role: "support".to_string(),
                model: "claude-sonnet-4-5".to_string(),
                has_tools: true,
                tool_count: 3,
                tools_described: vec!["kb lookup".to_string()],
            }],
            pattern: "react_agent".to_string(),
            memory_strategy: "buffer".to_string(),
            avg_turns_per_conversation: 5,
            daily_conversations: 100,
            has_rag: false,
            rag_details: None,
            guardrails_mentioned: Vec::new(),
            additional_services: Vec::new(),
        })
    }

    #[test]
    fn test_format_estimate_includes_all_scenarios() {
        let request = sample_request();
        let estimate = calculate_costs(KnowledgeBase::builtin(), &request).unwrap();
        let table = format_estimate(&estimate, &request.parsed);

        assert!(table.contains("Support Bot"));
        assert!(table.contains("│ low "));
        assert!(table.contains("│ mid "));
        assert!(table.contains("│ high "));
        assert!(table.contains("claude-sonnet-4-5"));
        // 3 tools x 500 + 500 = 2000 >= 1024, so savings should be shown
        assert!(table.contains("Prompt caching savings"));
    }

    #[test]
    fn test_reference_tables_list_builtin_entries() {
        let kb = KnowledgeBase::builtin();
        assert!(format_models_table(kb).contains("claude-opus-4-5"));
        assert!(format_patterns_table(kb).contains("multi_agent"));
        assert!(format_presets_table(kb).contains("elevenlabs-tts"));
    }

    #[test]
    fn test_format_number_separators() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }
}
