/// Build the summarization prompt for a dialogue.
///
/// Every model variant receives exactly this framing; scores are only
/// comparable when the prompt bytes are identical.
pub fn build_prompt(dialogue: &str) -> String {
    format!(
        "Summarize the following conversation.\n\
\n\
{dialogue}\n\
\n\
Summary: "
    )
}
