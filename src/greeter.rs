//! Demo greeter skill served by the binary

use funcy_skill::ssml::{emphasis, prosody, EmphasisLevel, ProsodyOptions, ProsodyRate};
use funcy_skill::transform::{
    transform_fn, Interaction, RepeatTransform, SkillState, Stimulus, TransformSkill,
    TransformTable,
};
use funcy_skill::SpeechBuilder;
use std::sync::Arc;

pub const HELLO_INTENT: &str = "HelloIntent";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const REPEAT_INTENT: &str = "AMAZON.RepeatIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";

fn reprompt() -> funcy_skill::OutputSpeech {
    SpeechBuilder::with()
        .text("Say hello, and tell me your name.")
        .output_speech()
}

fn welcome(stimulus: &Stimulus) -> SkillState {
    let output = SpeechBuilder::with()
        .ssml(emphasis("Welcome!", EmphasisLevel::Moderate))
        .pause(1.0)
        .text("You can say hello, or ask for help.")
        .output_speech();
    SkillState::new("welcome", Interaction::ask(stimulus.clone(), output, reprompt()))
}

fn hello(stimulus: &Stimulus, history: &[SkillState]) -> SkillState {
    let name = stimulus
        .intent
        .as_ref()
        .and_then(|intent| intent.slot_value("Name"))
        .unwrap_or("friend");
    let greetings = history
        .iter()
        .filter(|state| state.location == "greeted")
        .count();

    let mut speech = SpeechBuilder::with().text(format!("Hello, {name}."));
    if greetings > 0 {
        speech = speech.ssml(prosody(
            "Nice to hear from you again.",
            ProsodyOptions {
                rate: Some(ProsodyRate::Slow),
                ..ProsodyOptions::default()
            },
        ));
    }
    let output = speech.output_speech();
    let card = output.text.clone();
    SkillState::new(
        "greeted",
        Interaction::tell(stimulus.clone(), output).with_card("Greeting", card),
    )
}

fn help(stimulus: &Stimulus) -> SkillState {
    let output = SpeechBuilder::with()
        .text("I greet people.")
        .text("Say hello, and tell me your name.")
        .pause(1.0)
        .text("You can also say repeat.")
        .output_speech();
    SkillState::new("help", Interaction::ask(stimulus.clone(), output, reprompt()))
}

fn goodbye(stimulus: &Stimulus) -> SkillState {
    SkillState::new(
        "goodbye",
        Interaction::tell(
            stimulus.clone(),
            SpeechBuilder::with().text("Goodbye.").output_speech(),
        ),
    )
}

/// Transform table for the greeter
pub fn greeter_table() -> TransformTable {
    let mut table = TransformTable::new();
    table
        .register(
            funcy_skill::transform::DEFAULT_LAUNCH_NAME,
            transform_fn(|s, _| Ok(Some(welcome(s)))),
        )
        .register(HELLO_INTENT, transform_fn(|s, h| Ok(Some(hello(s, h)))))
        .register(HELP_INTENT, transform_fn(|s, _| Ok(Some(help(s)))))
        .register(REPEAT_INTENT, Arc::new(RepeatTransform))
        // Nothing to repeat yet: fall back to help
        .register(REPEAT_INTENT, transform_fn(|s, _| Ok(Some(help(s)))))
        .register(STOP_INTENT, transform_fn(|s, _| Ok(Some(goodbye(s)))))
        .register(CANCEL_INTENT, transform_fn(|s, _| Ok(Some(goodbye(s)))));
    table
}

pub fn greeter_skill() -> TransformSkill {
    TransformSkill::new(greeter_table())
}

#[cfg(test)]
mod tests {
    use super::*;
    use funcy_skill::envelope::{Application, Attributes, Session, User};
    use funcy_skill::Intent;

    fn session() -> Session {
        Session {
            session_id: "s-1".to_string(),
            application: Application {
                application_id: "app".to_string(),
            },
            user: User {
                user_id: "u-1".to_string(),
                access_token: None,
            },
            attributes: Some(Attributes::new()),
            is_new: true,
        }
    }

    #[test]
    fn test_hello_uses_slot_and_remembers() {
        let skill = greeter_skill();
        let mut session = session();
        let hello = Stimulus::from_intent(Intent::new(HELLO_INTENT).with_slot("Name", "Ada"));

        let first = skill.apply_stimulus(&hello, &mut session).unwrap();
        assert_eq!(first.interaction.output.text, "Hello, Ada.");
        assert_eq!(first.interaction.card_title.as_deref(), Some("Greeting"));

        let second = skill.apply_stimulus(&hello, &mut session).unwrap();
        assert!(second.interaction.output.ssml.contains("<prosody rate=\"slow\">"));
    }

    #[test]
    fn test_repeat_without_history_falls_back_to_help() {
        let skill = greeter_skill();
        let mut session = session();
        let state = skill
            .apply_stimulus(&Stimulus::from_intent(Intent::new(REPEAT_INTENT)), &mut session)
            .unwrap();
        assert_eq!(state.location, "help");
    }

    #[test]
    fn test_repeat_after_help_replays_help() {
        let skill = greeter_skill();
        let mut session = session();
        skill
            .apply_stimulus(&Stimulus::from_intent(Intent::new(HELP_INTENT)), &mut session)
            .unwrap();
        let state = skill
            .apply_stimulus(&Stimulus::from_intent(Intent::new(REPEAT_INTENT)), &mut session)
            .unwrap();
        assert_eq!(state.location, "help");
        assert!(state.interaction.stimulus.is_repeat());
    }

    #[test]
    fn test_repeat_twice_on_fresh_session() {
        let skill = greeter_skill();
        let mut session = session();
        let repeat = Stimulus::from_intent(Intent::new(REPEAT_INTENT));

        let first = skill.apply_stimulus(&repeat, &mut session).unwrap();
        let second = skill.apply_stimulus(&repeat, &mut session).unwrap();
        assert_eq!(first.location, "help");
        assert_eq!(second.location, "help");
        assert_eq!(second.interaction.output.text, first.interaction.output.text);

        // A real turn after the fallbacks is still what gets repeated
        skill
            .apply_stimulus(
                &Stimulus::from_intent(Intent::new(HELLO_INTENT).with_slot("Name", "Ada")),
                &mut session,
            )
            .unwrap();
        let replayed = skill.apply_stimulus(&repeat, &mut session).unwrap();
        assert_eq!(replayed.location, "greeted");
        assert!(replayed.interaction.stimulus.is_repeat());
    }
}
