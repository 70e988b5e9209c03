use crate::models::{GenerationRequest, UsageEstimate};

const PREAMBLE: &str = "You are a creative poet. Generate beautiful, meaningful poetry lines. \
Always respond with just the poetic line, no explanations or additional text.\n\n";

const CLOSING: &str = "Make it creative, poetic, and ensure it flows naturally. \
Respond with only the poetic line.";

// roughly 4 characters per token for english text
const CHARS_PER_TOKEN: usize = 4;

pub fn build_prompt(request: &GenerationRequest) -> String {

    let mut prompt = String::from(PREAMBLE);
    prompt.push_str(&format!("Generate a {} poem line", request.theme));

    match request.previous_lines.last() {
        Some(last_line) => {
            prompt.push_str(&format!(
                " that continues this poem:\n\"{}\"\n\n",
                request.previous_lines.join("\n")
            ));
            prompt.push_str(&format!("The previous line was: \"{}\"\n", last_line));
        }
        None => prompt.push_str(" as a starting line.\n")
    }

    prompt.push_str(&format!("Incorporate the word or theme: \"{}\".\n", request.user_input));
    prompt.push_str(CLOSING);

    prompt

}

/// Estimates usage from the prompt that was sent and the line that came back.
pub fn estimate_usage(prompt: &str, line: &str) -> UsageEstimate {

    let prompt_tokens = prompt.chars().count() / CHARS_PER_TOKEN;
    let completion_tokens = line.chars().count() / CHARS_PER_TOKEN;

    UsageEstimate {
        total_tokens: prompt_tokens + completion_tokens,
        prompt_tokens,
        completion_tokens
    }

}
