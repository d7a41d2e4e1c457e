use crate::shape::{COACH_REPLY_COUNT, DATE_IDEA_COUNT, MESSAGE_COUNT};
use crate::text::is_blank;
use crate::types::{Budget, DateVibe, Vibe};

// User-provided values are inserted verbatim. Critiques quote them back, so
// nothing here may trim, escape or shorten them.

const JSON_ONLY: &str = "Strictly adhere to the JSON schema. \
Do not include any extra text, markdown, or conversational filler in your response.";

fn push_optional(out: &mut String, label: &str, value: &str) {
    if !is_blank(value) {
        out.push_str(&format!("{label}: {value}\n"));
    }
}

pub fn build_message_prompt(recipient: &str, vibe: Vibe, context: &str) -> String {
    let mut p = format!(
        "You are a witty and charming expert in writing flirty text messages.\n\
Generate {MESSAGE_COUNT} unique, short, and engaging flirty text messages.\n\n\
The message is for: {recipient}\n\
The desired vibe is: {vibe}\n"
    );
    push_optional(&mut p, "Optional context", context);
    p.push_str("\nThe messages should be creative and not cheesy unless the vibe is cheesy.\n");
    p.push_str(JSON_ONLY);
    p
}

pub fn build_inspiration_prompt(category: &str, existing_texts: &[String]) -> String {
    let mut p = format!(
        "You are an expert in writing creative, flirty text messages.\n\
Generate {MESSAGE_COUNT} new, unique text messages for the category: \"{category}\".\n"
    );
    if !existing_texts.is_empty() {
        p.push_str(
            "\nIMPORTANT: Do not repeat any of the following messages that the user has already seen:\n",
        );
        for t in existing_texts {
            p.push_str(&format!("- {t}\n"));
        }
    }
    p.push_str("\nThe messages should be creative, engaging, and fit the category well.\n");
    p.push_str(JSON_ONLY);
    p
}

pub fn build_coach_prompt(last_message: &str, history: &str) -> String {
    let mut p = format!(
        "You are an expert dating and conversation coach.\n\
A user needs a reply to a message they just received.\n\n\
This was the last message they received:\n\"{last_message}\"\n"
    );
    if !is_blank(history) {
        p.push_str(&format!(
            "\nHere is the recent conversation history for context:\n---\n{history}\n---\n"
        ));
    }
    p.push_str(&format!(
        "\nYour task is to generate {COACH_REPLY_COUNT} unique, clever, and context-aware replies for the user to send.\n\
For each reply, provide a short explanation for why it's a good response.\n\
The replies should be engaging, show personality, and be appropriately flirty.\n"
    ));
    p.push_str(JSON_ONLY);
    p
}

pub fn build_chat_review_prompt(user_identifier: &str) -> String {
    let mut p = format!(
        "You are an expert dating and conversation coach.\n\
Analyze the conversation in the provided screenshot. \
The user who submitted this screenshot has identified their messages as \"{user_identifier}\".\n\n"
    );
    p.push_str(
        "Your task is to:\n\
1. Identify the user's messages based on their description.\n\
2. For each of the user's messages, provide a constructive critique and a better, more charming alternative they could have sent. \
Quote the original message verbatim.\n\
3. Provide overall feedback on their performance in the conversation.\n\
4. Be encouraging but honest. The goal is to help them improve.\n\n",
    );
    p.push_str(JSON_ONLY);
    p
}

pub fn build_profile_prompt(photo_count: usize, bio: &str, goals: &str) -> String {
    let mut p = String::from(
        "You are an expert dating profile coach.\n\
Analyze the user's dating profile based on the provided screenshots, bio, and dating goals.\n\n",
    );
    p.push_str(&format!("The user's dating goals are: \"{goals}\"\n"));
    if !is_blank(bio) {
        p.push_str(&format!("The user's profile bio is: \"{bio}\"\n"));
    }
    p.push_str(&format!(
        "\nYour task is to:\n\
1. Analyze the {photo_count} provided images, in the order given. Give feedback on each one, exactly one critique per image. \
Good photos show personality, are high-quality, and show the person clearly. \
Bad photos are blurry, are all group shots, or don't show the person's face.\n\
2. Analyze the bio. A good bio is concise, shows personality, and gives a potential match something to talk about.\n\
3. Provide overall feedback on the profile.\n\
4. The tone should be encouraging, constructive, and helpful. The user wants to improve their dating life.\n\n"
    ));
    p.push_str(JSON_ONLY);
    p
}

pub fn build_date_idea_prompt(vibe: DateVibe, budget: Budget, interests: &str) -> String {
    let mut p = format!(
        "You are a creative and experienced date planner.\n\
Generate {DATE_IDEA_COUNT} unique and engaging date ideas based on the following criteria.\n\n\
The desired vibe is: {}\n\
The budget is: {}\n",
        vibe.as_str(),
        budget.as_str()
    );
    push_optional(&mut p, "Optional shared interests", interests);
    p.push_str("\nThe ideas should be creative and thoughtful. Give each idea a single emoji.\n");
    p.push_str(JSON_ONLY);
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prompt_includes_fields_verbatim() {
        let p = build_message_prompt("my  crush <3", Vibe::Witty, "we met at a \"book\" club");
        assert!(p.starts_with("You are a witty"));
        assert!(p.contains("The message is for: my  crush <3"));
        assert!(p.contains("The desired vibe is: witty"));
        assert!(p.contains("Optional context: we met at a \"book\" club"));
        assert!(p.contains("JSON schema"));
    }

    #[test]
    fn empty_optional_lines_are_omitted() {
        let p = build_message_prompt("Sam", Vibe::Sweet, "   ");
        assert!(!p.contains("Optional context"));
        assert!(!p.contains("undefined"));

        let c = build_coach_prompt("hey you", "");
        assert!(!c.contains("conversation history"));

        let pr = build_profile_prompt(2, "", "something casual");
        assert!(!pr.contains("profile bio is"));
        assert!(pr.contains("\"something casual\""));

        let d = build_date_idea_prompt(DateVibe::Casual, Budget::Free, "");
        assert!(!d.contains("Optional shared interests"));
    }

    #[test]
    fn inspiration_prompt_lists_every_existing_text() {
        let existing = vec!["Hello there, stranger.".to_string(), "Nice shoes!".to_string()];
        let p = build_inspiration_prompt("Ice Breakers & Openers", &existing);
        assert!(p.contains("\"Ice Breakers & Openers\""));
        assert!(p.contains("Do not repeat"));
        assert!(p.contains("- Hello there, stranger.\n"));
        assert!(p.contains("- Nice shoes!\n"));
    }

    #[test]
    fn date_prompt_uses_plain_option_names() {
        let p = build_date_idea_prompt(DateVibe::AtHome, Budget::Splurge, "board games");
        assert!(p.contains("The desired vibe is: At-home\n"));
        assert!(p.contains("The budget is: Splurge\n"));
        assert!(!p.contains('🏠'));
        assert!(p.contains("Optional shared interests: board games"));
    }

    #[test]
    fn review_prompt_quotes_identifier_as_is() {
        let p = build_chat_review_prompt("I'm the grey ones on the LEFT");
        assert!(p.contains("\"I'm the grey ones on the LEFT\""));
    }

    #[test]
    fn profile_prompt_states_photo_count() {
        let p = build_profile_prompt(4, "Dog dad. Taco fan.", "a serious relationship");
        assert!(p.contains("Analyze the 4 provided images"));
        assert!(p.contains("\"Dog dad. Taco fan.\""));
    }
}
