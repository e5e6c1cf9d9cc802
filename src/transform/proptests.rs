//! Property-based tests for the transform layer
//!
//! History is append-only and the first claiming transform always wins.

use super::*;
use crate::envelope::{Application, Attributes, OutputSpeech, User};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn session() -> Session {
    Session {
        session_id: "prop-session".to_string(),
        application: Application {
            application_id: "app".to_string(),
        },
        user: User {
            user_id: "prop-user".to_string(),
            access_token: None,
        },
        attributes: Some(Attributes::new()),
        is_new: false,
    }
}

/// Table where stimulus `S{i}` claims only when `claims[i]` is set
fn table_for(claims: &[bool]) -> TransformTable {
    let mut table = TransformTable::new();
    for (i, &claim) in claims.iter().enumerate() {
        let name = format!("S{i}");
        table.register(
            name.clone(),
            transform_fn(move |s, history| {
                if !claim {
                    return Ok(None);
                }
                Ok(Some(SkillState::new(
                    format!("{name}-{}", history.len()),
                    Interaction::tell(s.clone(), OutputSpeech::from_text(&name)),
                )))
            }),
        );
    }
    table
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_history_is_append_only(
        claims in proptest::collection::vec(any::<bool>(), 1..6),
        picks in proptest::collection::vec(0usize..6, 1..20),
    ) {
        let skill = TransformSkill::new(table_for(&claims));
        let mut session = session();

        for pick in picks {
            let before = load_history(&session).unwrap();
            let stimulus = Stimulus::from_intent(Intent::new(format!("S{pick}")));
            let result = skill.apply_stimulus(&stimulus, &mut session);
            let after = load_history(&session).unwrap();

            match result {
                Ok(state) => {
                    prop_assert_eq!(after.len(), before.len() + 1);
                    prop_assert_eq!(&after[..before.len()], &before[..]);
                    prop_assert_eq!(after.last(), Some(&state));
                }
                Err(_) => prop_assert_eq!(after, before),
            }
        }
    }

    #[test]
    fn prop_first_claim_wins(chain in proptest::collection::vec(any::<bool>(), 1..8)) {
        let mut table = TransformTable::new();
        for (position, &claims) in chain.iter().enumerate() {
            table.register(
                "Chain",
                transform_fn(move |s, _| {
                    Ok(claims.then(|| {
                        SkillState::new(
                            position.to_string(),
                            Interaction::tell(s.clone(), OutputSpeech::from_text("x")),
                        )
                    }))
                }),
            );
        }

        let result = table.resolve(&Stimulus::from_intent(Intent::new("Chain")), &[]);
        match chain.iter().position(|&c| c) {
            Some(first) => prop_assert_eq!(result.unwrap().location, first.to_string()),
            None => {
                let no_transform = matches!(result, Err(SkillError::NoApplicableTransform { .. }));
                prop_assert!(no_transform);
            }
        }
    }

    #[test]
    fn prop_repeat_targets_latest_non_repeat(names in proptest::collection::vec(0usize..3, 1..8)) {
        let mut table = table_for(&[true, true, true]);
        table.register("AMAZON.RepeatIntent", Arc::new(RepeatTransform));
        let skill = TransformSkill::new(table);
        let mut session = session();

        for i in &names {
            skill
                .apply_stimulus(&Stimulus::from_intent(Intent::new(format!("S{i}"))), &mut session)
                .unwrap();
        }
        let repeat = Stimulus::from_intent(Intent::new("AMAZON.RepeatIntent"));
        let first = skill.apply_stimulus(&repeat, &mut session).unwrap();
        let second = skill.apply_stimulus(&repeat, &mut session).unwrap();

        let expected = format!("S{}", names[names.len() - 1]);
        prop_assert_eq!(&first.interaction.stimulus.name, &expected);
        prop_assert_eq!(&second.interaction.stimulus.name, &expected);
        prop_assert!(second.interaction.stimulus.is_repeat());
    }
}
