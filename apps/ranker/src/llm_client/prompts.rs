// Cross-cutting prompt fragments. Each service that needs LLM calls keeps its
// own prompts.rs alongside it and pulls shared pieces from here.

/// Instruction appended to every prompt that expects raw JSON back.
pub const RAW_JSON_INSTRUCTION: &str = "Do not output markdown code blocks. \
    Do not wrap the output in ``` fences. \
    Do not add explanations before or after the JSON. \
    Just the raw JSON string.";
