//! Built-in rule packs and trivia questions
//!
//! A new room starts from the starter pack matching its sport and mode, if
//! there is one. The sample quizzes form the default question pool for both
//! host-triggered quizzes and quiz-tap challenges.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    quiz::Quiz,
    room::{GameMode, Sport},
    rule::{Rule, RuleSet, Target},
};

/// A named, curated set of rules for one sport and mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RulePack {
    /// Catalog identifier, e.g. "bb-drink"
    #[garde(length(min = 1))]
    pub id: String,
    /// Display name
    #[garde(length(min = 1))]
    pub name: String,
    /// The sport being watched
    #[garde(skip)]
    pub sport: Sport,
    /// Drinking or kids forfeits
    #[garde(skip)]
    pub mode: GameMode,
    /// The rules a room receives when it adopts this pack
    #[garde(dive)]
    pub rules: RuleSet,
    /// Whether the pack was shared by a player rather than shipped
    #[garde(skip)]
    pub community: bool,
}

/// The packs shipped with the game
pub fn starter_packs() -> Vec<RulePack> {
    vec![
        RulePack {
            id: "bb-drink".to_string(),
            name: "Standard Tip-Off".to_string(),
            sport: Sport::Basketball,
            mode: GameMode::Drinking,
            rules: vec![
                Rule::new("Selected team scores", "Take", 1, "sip", Target::Everyone, Some(5)),
                Rule::new("3-Pointer made", "Take", 2, "sips", Target::Random, Some(8)),
                Rule::new("Slam Dunk!", "Take", 3, "sips", Target::Everyone, Some(5)),
                Rule::new(
                    "Timeout: Reaction Test",
                    "Reaction!",
                    2,
                    "sips",
                    Target::LastToReact,
                    Some(10),
                ),
                Rule::new(
                    "Airball",
                    "Pick someone to drink",
                    1,
                    "sip",
                    Target::Specific,
                    Some(5),
                ),
            ]
            .into(),
            community: false,
        },
        RulePack {
            id: "sc-drink".to_string(),
            name: "Pub Pitch".to_string(),
            sport: Sport::Soccer,
            mode: GameMode::Drinking,
            rules: vec![
                Rule::new("GOAL!", "Everyone drinks", 3, "sips", Target::Everyone, Some(10)),
                Rule::new("Yellow Card", "Take", 2, "sips", Target::Random, Some(5)),
                Rule::new(
                    "VAR Check",
                    "Freeze! Last to move drinks",
                    1,
                    "sip",
                    Target::LastToReact,
                    Some(12),
                ),
            ]
            .into(),
            community: false,
        },
    ]
}

/// The first starter pack for `sport` and `mode`
pub fn pack_for(sport: Sport, mode: GameMode) -> Option<RulePack> {
    starter_packs()
        .into_iter()
        .find(|p| p.sport == sport && p.mode == mode)
}

/// Rules a new room starts with; empty when no pack matches
pub fn starter_rules(sport: Sport, mode: GameMode) -> RuleSet {
    pack_for(sport, mode).map(|p| p.rules).unwrap_or_default()
}

fn quiz(id: &str, question: &str, options: [&str; 4], correct_index: usize, penalty: &str) -> Quiz {
    Quiz {
        id: id.to_string(),
        question: question.to_string(),
        options: options.iter().map(ToString::to_string).collect(),
        correct_index,
        penalty: penalty.to_string(),
    }
}

/// The default trivia pool
pub fn sample_quizzes() -> Vec<Quiz> {
    vec![
        quiz(
            "q1",
            "Who won the most NBA titles?",
            ["Lakers", "Celtics", "Warriors", "Bulls"],
            1,
            "Take 2 sips if wrong!",
        ),
        quiz(
            "q2",
            "What is the length of a soccer match?",
            ["60 min", "80 min", "90 min", "100 min"],
            2,
            "Take 1 sip if wrong!",
        ),
        quiz(
            "q3",
            "Which country has won the most World Cups?",
            ["Germany", "Italy", "Brazil", "Argentina"],
            2,
            "Waterfall for 5 seconds if wrong!",
        ),
    ]
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_starter_packs_are_valid() {
        for pack in starter_packs() {
            assert!(pack.validate().is_ok(), "{} should be valid", pack.id);
            assert!(pack.rules.iter().all(|r| r.enabled));
        }
    }

    #[test]
    fn test_pack_lookup() {
        let pack = pack_for(Sport::Basketball, GameMode::Drinking).unwrap();
        assert_eq!(pack.name, "Standard Tip-Off");
        assert_eq!(pack.rules.len(), 5);

        let pack = pack_for(Sport::Soccer, GameMode::Drinking).unwrap();
        assert_eq!(pack.name, "Pub Pitch");
        assert_eq!(pack.rules.len(), 3);

        assert!(pack_for(Sport::Golf, GameMode::Kids).is_none());
        assert!(starter_rules(Sport::Rugby, GameMode::Drinking).is_empty());
    }

    #[test]
    fn test_starter_rule_ids_are_unique() {
        let rules = starter_rules(Sport::Basketball, GameMode::Drinking);
        let mut ids = rules.iter().map(|r| r.id).collect::<Vec<_>>();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn test_sample_quizzes() {
        let quizzes = sample_quizzes();
        assert_eq!(quizzes.len(), 3);
        for quiz in &quizzes {
            assert!(quiz.validate().is_ok(), "{} should be valid", quiz.id);
        }
        assert_eq!(quizzes[0].correct_answer(), Some("Celtics"));
        assert_eq!(quizzes[1].correct_answer(), Some("90 min"));
        assert_eq!(quizzes[2].correct_answer(), Some("Brazil"));
    }
}
