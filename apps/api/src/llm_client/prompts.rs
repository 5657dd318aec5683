// Shared prompt fragments.
// Each service that needs model calls defines its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps extracted or inferred values honest when the input is thin.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    Never invent details that are not supported by the input. \
    When the input is vague, stay near neutral values and lower your confidence.";
