// Prompts and canned assistant lines
//
// The interview order (identify, select a bug, report work, confirm status)
// lives here as model instructions, not as engine state.

/// Opening line shown before the first utterance
pub const GREETING: &str =
    "Hi! I'm here to collect a quick progress update on one of your bugs. What's your name?";

/// Reply to an empty utterance; no turn is consumed
pub const CLARIFICATION: &str =
    "I didn't catch that. Could you tell me a bit more?";

/// Appended when the turn budget runs out before the model closed the dialogue
pub const CLOSING_REMARK: &str =
    "We've reached the end of this session. Thanks for the update, I'll record what we have.";

/// Used when the model closes the dialogue without any text of its own
pub const FAREWELL: &str = "Thanks for the update. Goodbye!";

/// Used when the model returns neither text nor tool calls
pub const FALLBACK_REPLY: &str = "Sorry, I lost my train of thought. Could you repeat that?";

/// System prompt for every conversation call
pub fn conversation_system_prompt() -> &'static str {
    r#"You are a bug reporting assistant for a software development team. You hold a short conversation with one developer to record progress on ONE of their assigned bugs.

Work through these steps in order, asking one question at a time:
1. Ask for the developer's name, then call verify_developer with it.
   - type="exact_match": the developer is identified.
   - type="partial_match_needs_confirmation": show the suggested name and wait for an explicit yes/no before going on.
   - success=false: tell them the name was not found, show the suggestions you were given, and ask again.
2. Call get_bugs_for_developer with the verified developer_id. Only use an id that verify_developer returned.
   List every bug with its ID, description, status and solved flag, then ask which ONE bug they want to report on.
   Never assume a bug. If they name a bug that is not in their list, remind them which bugs are assigned to them.
   If they have no assigned bugs, tell them so and close the conversation.
3. Ask what work they did on the selected bug. Be skeptical of vague answers ("idk", "stuff") and ask for specifics.
4. Ask whether the bug is now solved (yes/no) and confirm the answer.
5. When the developer has confirmed the status, or has nothing further to report, call end_conversation and then say a short goodbye.

Rules:
- Be concise and professional.
- Do not try to troubleshoot or fix the bug. You are only gathering a report.
- Never invent bug IDs, names, or progress the developer did not state."#
}

/// System prompt for the single extraction call at finalize
pub fn extraction_system_prompt() -> &'static str {
    "You analyze finished bug-report conversations and return a single JSON object. \
     You never add information that the developer did not say."
}

/// Extraction instruction over a rendered transcript
pub fn extraction_prompt(transcript: &str) -> String {
    format!(
        r#"Below is a conversation between a bug reporting assistant and a developer.

CONVERSATION:
{transcript}

Decide whether the conversation gathered ALL of:
- a verified developer identity,
- one specific bug the developer selected from their assigned bugs,
- a concrete description of the work the developer did, in their own words,
- an explicit answer on whether the bug is solved.

Return ONLY this JSON object, with no other text:
{{
  "success": <true if every item above was gathered, else false>,
  "developer_id": <verified developer id as an integer, or null>,
  "bug_id": <selected bug id as an integer, or null>,
  "progress_description": "<the developer's description of their work, or null>",
  "solved": <true or false as the developer stated, or null>,
  "reason": "<one short sentence explaining the decision>"
}}

Rules:
- progress_description must come from what the developer said. Do not embellish or guess.
- If the developer's answers were vague (for example "idk" or "stuff"), set success to false.
- solved is true only if the developer clearly said the bug is solved, fixed, or working."#
    )
}
