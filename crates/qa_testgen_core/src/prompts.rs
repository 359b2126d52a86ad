//! crates/qa_testgen_core/src/prompts.rs
//!
//! System instructions and turn-sequence assembly for the two endpoints.
//! No image understanding happens anywhere: an uploaded screenshot is only
//! mentioned in the prompt text.

use crate::domain::{ConversationLog, ConversationTurn, Role};

pub const GENERATION_SYSTEM_PROMPT: &str = r#"You are a QA testing expert. Your task is to analyze screenshots and text requirements to generate comprehensive test cases.
Generate test cases in JSON format with the following structure:
{
  "testCases": [
    {
      "id": "unique_id",
      "testCaseId": "TC001",
      "description": "Clear description of what to test",
      "steps": "Step-by-step instructions",
      "expectedResult": "What should happen",
      "priority": "High/Medium/Low",
      "status": "Not Executed"
    }
  ]
}
Generate at least 5-10 test cases covering positive, negative, and edge cases."#;

pub const REFINEMENT_SYSTEM_PROMPT: &str = r#"You are a QA testing expert helping to refine test cases. The user may ask you to:
- Modify existing test cases
- Add new test cases
- Remove test cases
- Change priorities or descriptions
- Clarify requirements

Always respond with updated test cases in JSON format:
{
  "testCases": [
    {
      "id": "unique_id",
      "testCaseId": "TC001",
      "description": "Clear description",
      "steps": "Step-by-step instructions",
      "expectedResult": "Expected outcome",
      "priority": "High/Medium/Low",
      "status": "Not Executed"
    }
  ]
}

Maintain context from previous conversations and the original screenshot/requirements."#;

/// The user turn that opens a generation request.
pub fn generation_user_message(image_supplied: bool, requirements: &str) -> String {
    let mut message = String::new();
    if image_supplied {
        message.push_str(
            "A screenshot has been uploaded. Please analyze the following requirements and generate test cases based on typical UI/UX patterns you would expect from a screenshot.\n\n",
        );
    }
    if !requirements.trim().is_empty() {
        message.push_str(&format!("Requirements:\n{}\n\n", requirements));
    }
    let source = if image_supplied { "the uploaded screenshot and " } else { "" };
    message.push_str(&format!(
        "Based on {}the requirements above, generate comprehensive test cases.",
        source
    ));
    message
}

/// Restates the original input at the top of a refinement prompt.
/// `None` when there is no original input to restate.
pub fn context_reminder(image_supplied: bool, requirements: &str) -> Option<String> {
    let has_text = !requirements.trim().is_empty();
    if !image_supplied && !has_text {
        return None;
    }
    let mut reminder = String::new();
    if image_supplied {
        reminder.push_str("Original screenshot was uploaded. ");
    }
    if has_text {
        reminder.push_str(&format!("Original requirements: {}", requirements));
    }
    Some(reminder)
}

/// system, replayed history, new user turn.
pub fn generation_messages(
    image_supplied: bool,
    requirements: &str,
    history: &ConversationLog,
) -> Vec<ConversationTurn> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ConversationTurn::system(GENERATION_SYSTEM_PROMPT));
    messages.extend(history.turns().iter().cloned());
    messages.push(ConversationTurn::user(generation_user_message(
        image_supplied,
        requirements,
    )));
    messages
}

/// system, context reminder (at most once), replayed history, instruction.
pub fn refinement_messages(
    image_supplied: bool,
    requirements: &str,
    history: &ConversationLog,
    instruction: &str,
) -> Vec<ConversationTurn> {
    let mut messages = Vec::with_capacity(history.len() + 3);
    messages.push(ConversationTurn::system(REFINEMENT_SYSTEM_PROMPT));

    if let Some(reminder) = context_reminder(image_supplied, requirements) {
        let already_replayed = history
            .turns()
            .first()
            .is_some_and(|turn| turn.role == Role::User && turn.content == reminder);
        if !already_replayed {
            messages.push(ConversationTurn::user(reminder));
        }
    }

    messages.extend(history.turns().iter().cloned());
    messages.push(ConversationTurn::user(instruction));
    messages
}
