//! Rule cards and rule-set editing
//!
//! A rule describes a real-world event the host watches for ("Yellow Card")
//! and the forfeit attached to it ("Take 2 sips"). The host triggers enabled
//! rules during play; each trigger starts an event.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{constants::rule as limits, id::Id};

/// Who a rule's forfeit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// A randomly chosen player
    Random,
    /// Every player
    Everyone,
    /// Whoever reacts last in the challenge
    LastToReact,
    /// A player picked by the host
    Specific,
    /// Nobody in particular
    None,
}

/// A single rule card
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Rule {
    /// Unique within the room
    #[garde(skip)]
    pub id: Id,
    /// The event to watch for
    #[garde(length(min = 1, max = limits::MAX_LABEL_LENGTH))]
    pub label: String,
    /// What happens, e.g. "Take"
    #[garde(length(max = limits::MAX_ACTION_LENGTH))]
    pub action: String,
    /// How much of it
    #[garde(range(max = limits::MAX_VALUE))]
    pub value: u32,
    /// Unit for the value, e.g. "sips"
    #[garde(length(max = limits::MAX_UNIT_LENGTH))]
    pub unit: String,
    /// Who the forfeit applies to
    #[garde(skip)]
    pub target: Target,
    /// Disabled rules stay in the set but cannot be triggered
    #[garde(skip)]
    pub enabled: bool,
    /// Countdown in seconds shown with the rule
    #[garde(range(min = 1, max = limits::MAX_COUNTDOWN))]
    pub countdown: Option<u32>,
}

impl Rule {
    /// Creates an enabled rule with a fresh id
    pub fn new(
        label: impl Into<String>,
        action: impl Into<String>,
        value: u32,
        unit: impl Into<String>,
        target: Target,
        countdown: Option<u32>,
    ) -> Self {
        Self {
            id: Id::new(),
            label: label.into(),
            action: action.into(),
            value,
            unit: unit.into(),
            target,
            enabled: true,
            countdown,
        }
    }

    /// The forfeit line shown on the results screen, e.g. "Take 2 sips"
    pub fn forfeit(&self) -> String {
        format!("{} {} {}", self.action, self.value, self.unit)
    }
}

impl Default for Rule {
    /// The blank rule a host starts from when adding one
    fn default() -> Self {
        Self::new("New Rule", "Drink", 2, "sips", Target::LastToReact, None)
    }
}

/// An ordered set of rules belonging to a room
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(transparent)]
pub struct RuleSet {
    #[garde(length(max = crate::constants::room::MAX_RULE_COUNT), dive)]
    rules: Vec<Rule>,
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl RuleSet {
    /// Looks up a rule by id
    pub fn get(&self, id: Id) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Iterates over every rule
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Iterates over the rules the host may trigger
    pub fn enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    /// Number of rules, enabled or not
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Flips the enabled flag of a rule
    ///
    /// Returns the new flag, or `None` if no rule has this id.
    pub fn toggle(&mut self, id: Id) -> Option<bool> {
        let rule = self.rules.iter_mut().find(|r| r.id == id)?;
        rule.enabled = !rule.enabled;
        Some(rule.enabled)
    }

    /// Appends a blank rule and returns its id
    pub fn add_default(&mut self) -> Id {
        let rule = Rule::default();
        let id = rule.id;
        self.rules.push(rule);
        id
    }

    /// Removes a rule, returning it if it existed
    pub fn remove(&mut self, id: Id) -> Option<Rule> {
        let index = self.rules.iter().position(|r| r.id == id)?;
        Some(self.rules.remove(index))
    }

    /// Replaces the rule with the same id as `rule`
    ///
    /// Returns `false` if there is no such rule.
    pub fn replace(&mut self, rule: Rule) -> bool {
        match self.rules.iter_mut().find(|r| r.id == rule.id) {
            Some(slot) => {
                *slot = rule;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn create_test_rule_set() -> RuleSet {
        vec![
            Rule::new("GOAL!", "Everyone drinks", 3, "sips", Target::Everyone, Some(10)),
            Rule::new("VAR Check", "Freeze!", 1, "sip", Target::LastToReact, None),
        ]
        .into()
    }

    #[test]
    fn test_default_rule() {
        let rule = Rule::default();
        assert_eq!(rule.label, "New Rule");
        assert_eq!(rule.forfeit(), "Drink 2 sips");
        assert_eq!(rule.target, Target::LastToReact);
        assert!(rule.enabled);
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_rule_validation() {
        let mut rule = Rule::default();
        rule.label = String::new();
        assert!(rule.validate().is_err());

        let mut rule = Rule::default();
        rule.label = "a".repeat(limits::MAX_LABEL_LENGTH + 1);
        assert!(rule.validate().is_err());

        let mut rule = Rule::default();
        rule.value = limits::MAX_VALUE + 1;
        assert!(rule.validate().is_err());

        let mut rule = Rule::default();
        rule.countdown = Some(0);
        assert!(rule.validate().is_err());
        rule.countdown = Some(5);
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_toggle() {
        let mut rules = create_test_rule_set();
        let id = rules.iter().next().unwrap().id;

        assert_eq!(rules.toggle(id), Some(false));
        assert_eq!(rules.enabled().count(), 1);
        assert_eq!(rules.toggle(id), Some(true));
        assert_eq!(rules.enabled().count(), 2);
        assert_eq!(rules.toggle(Id::new()), None);
    }

    #[test]
    fn test_add_and_remove() {
        let mut rules = create_test_rule_set();
        let id = rules.add_default();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.get(id).unwrap().label, "New Rule");

        let removed = rules.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(rules.len(), 2);
        assert!(rules.remove(id).is_none());
    }

    #[test]
    fn test_replace() {
        let mut rules = create_test_rule_set();
        let mut edited = rules.iter().next().unwrap().clone();
        edited.value = 5;
        assert!(rules.replace(edited.clone()));
        assert_eq!(rules.get(edited.id).unwrap().value, 5);

        assert!(!rules.replace(Rule::default()));
    }

    #[test]
    fn test_rule_set_validation() {
        let rules = create_test_rule_set();
        assert!(rules.validate().is_ok());

        let too_many: RuleSet = vec![Rule::default(); crate::constants::room::MAX_RULE_COUNT + 1].into();
        assert!(too_many.validate().is_err());

        let mut invalid = create_test_rule_set();
        invalid.add_default();
        let mut bad = Rule::default();
        bad.label = String::new();
        invalid.rules.push(bad);
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_rule_set_serializes_as_list() {
        let rules = create_test_rule_set();
        let json = serde_json::to_value(&rules).unwrap();
        assert!(json.is_array());
        let restored: RuleSet = serde_json::from_value(json).unwrap();
        assert_eq!(restored, rules);
    }
}
