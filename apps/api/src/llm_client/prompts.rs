// Shared prompt fragments used by more than one pipeline.
// Each pipeline keeps its own templates in a prompts.rs alongside it.

/// Persona line opening every evaluation prompt.
pub const RECRUITER_PERSONA: &str = "You are an Expert Hospital Recruiter at an academic \
    medical center, screening candidates for research and support positions.";

/// Instruction enforcing JSON-only output in structured mode.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Cross-language normalization rule shared by extraction and critique.
pub const NORMALIZATION_INSTRUCTION: &str = "\
    LANGUAGE NORMALIZATION: CVs may mix Chinese and English. Normalize institution names, \
    degrees, journals and skill names to their standard English form \
    (e.g. '浙江大学' and 'Zhejiang Daxue' both become 'Zhejiang University'). \
    A transliterated name and a translated name for the same entity are the SAME entity.";

/// Fills `{name}` placeholders in one pass. Substituted values are never
/// rescanned, so user or model text containing `{...}` is inserted as-is.
/// Braces that do not name a known placeholder (JSON examples) are kept.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
