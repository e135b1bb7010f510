//! # Commands Module
//!
//! Command handlers for the estimate and reference-listing operations
//!
//! ## Key Components
//! - [`handle_estimate_command`] - Read a request, run the engine, print results
//! - [`handle_models_command`] - Builtin model pricing listing
//! - [`handle_patterns_command`] - Architecture pattern listing
//! - [`handle_presets_command`] - Non-LLM service preset listing

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::estimator::calculate_costs;
use crate::knowledge_base::KnowledgeBase;
use crate::system::{EstimateRequest, NonLlmService, OptimizationFlags, ParsedSystem};
use crate::table_display::{
    format_estimate, format_models_table, format_patterns_table, format_presets_table,
};

/// Default daily volume assumed when a described service carries none.
const DEFAULT_SERVICE_DAILY_VOLUME: u32 = 100;

/// Handle the estimate command: parse the request JSON, apply CLI optimization
/// flags, price any described services from the preset table, and print the
/// three scenarios.
pub fn handle_estimate_command(
    input: Option<&Path>,
    json: bool,
    cli_flags: OptimizationFlags,
) -> Result<()> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read request JSON from stdin")?;
            buffer
        }
    };

    let mut request: EstimateRequest =
        serde_json::from_str(&raw).context("Failed to parse estimate request JSON")?;
    request.optimizations = request.optimizations.merge(cli_flags);

    let kb = KnowledgeBase::builtin();
    if request.non_llm_services.is_empty() {
        request.non_llm_services = resolve_service_presets(&request.parsed, kb);
    }

    let estimate = calculate_costs(kb, &request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        println!("{}", format_estimate(&estimate, &request.parsed));
    }

    Ok(())
}

/// Price the services named in the system description from the preset table.
/// Services without a preset are skipped; the estimate simply won't include
/// them, which the caller can fix by supplying `non_llm_services` explicitly.
fn resolve_service_presets(parsed: &ParsedSystem, kb: &KnowledgeBase) -> Vec<NonLlmService> {
    let mut services = Vec::new();
    for described in &parsed.additional_services {
        match kb.service_preset(&described.name) {
            Some(preset) => {
                let daily_volume = if described.estimated_daily_volume > 0 {
                    described.estimated_daily_volume
                } else {
                    debug!(
                        "service '{}' has no volume estimate; assuming {}/day",
                        described.name, DEFAULT_SERVICE_DAILY_VOLUME
                    );
                    DEFAULT_SERVICE_DAILY_VOLUME
                };
                services.push(NonLlmService {
                    name: described.name.clone(),
                    unit_price: preset.unit_price,
                    unit_label: preset.unit_label.clone(),
                    daily_volume,
                });
            }
            None => warn!(
                "no price preset for service '{}'; it will not be included in the estimate",
                described.name
            ),
        }
    }
    services
}

/// Handle the models listing command
pub fn handle_models_command(json: bool) -> Result<()> {
    let kb = KnowledgeBase::builtin();
    if json {
        let sorted: BTreeMap<_, _> = kb.models().iter().collect();
        println!("{}", serde_json::to_string_pretty(&sorted)?);
    } else {
        println!("{}", format_models_table(kb));
    }
    Ok(())
}

/// Handle the patterns listing command
pub fn handle_patterns_command(json: bool) -> Result<()> {
    let kb = KnowledgeBase::builtin();
    if json {
        let sorted: BTreeMap<_, _> = kb.patterns().iter().collect();
        println!("{}", serde_json::to_string_pretty(&sorted)?);
    } else {
        println!("{}", format_patterns_table(kb));
    }
    Ok(())
}

/// Handle the service presets listing command
pub fn handle_presets_command(json: bool) -> Result<()> {
    let kb = KnowledgeBase::builtin();
    if json {
        let sorted: BTreeMap<_, _> = kb.service_presets().iter().collect();
        println!("{}", serde_json::to_string_pretty(&sorted)?);
    } else {
        println!("{}", format_presets_table(kb));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::AdditionalService;
    use crate::system::ParsedAgent;

    fn parsed_with_services(services: Vec<AdditionalService>) -> ParsedSystem {
        ParsedSystem {
            system_name: "svc test".to_string(),
            agents: vec![ParsedAgent {
                name: "a".to_string(),
                role: String::new(),
                model: "claude-sonnet-4-5".to_string(),
                has_tools: false,
                tool_count: 0,
                tools_described: Vec::new(),
            }],
            pattern: "single_call".to_string(),
            memory_strategy: "none".to_string(),
            avg_turns_per_conversation: 5,
            daily_conversations: 100,
            has_rag: false,
            rag_details: None,
            guardrails_mentioned: Vec::new(),
            additional_services: services,
        }
    }

    #[test]
    fn test_resolve_known_preset() {
        let parsed = parsed_with_services(vec![AdditionalService {
            name: "whisper".to_string(),
            unit: "minute".to_string(),
            estimated_daily_volume: 40,
        }]);
        let services = resolve_service_presets(&parsed, KnowledgeBase::builtin());
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].unit_price, 0.006);
        assert_eq!(services[0].daily_volume, 40);
    }

    #[test]
    fn test_resolve_defaults_missing_volume() {
        let parsed = parsed_with_services(vec![AdditionalService {
            name: "dall-e-3".to_string(),
            unit: "image".to_string(),
            estimated_daily_volume: 0,
        }]);
        let services = resolve_service_presets(&parsed, KnowledgeBase::builtin());
        assert_eq!(services[0].daily_volume, DEFAULT_SERVICE_DAILY_VOLUME);
    }

    #[test]
    fn test_resolve_skips_unknown_service() {
        let parsed = parsed_with_services(vec![AdditionalService {
            name: "quantum-renderer".to_string(),
            unit: "frame".to_string(),
            estimated_daily_volume: 10,
        }]);
        let services = resolve_service_presets(&parsed, KnowledgeBase::builtin());
        assert!(services.is_empty());
    }
}
