//! Validation view
//!
//! Immutable, filtered view over a model's validators. Filters keep
//! declaration order and never duplicate or drop validators outside their
//! predicate.

use crate::model::{Conditions, Model, OptionKey, Validator, ValidatorKind};

use super::scope::{normalize, UniqueScope};

/// Options that restrict when a validator runs
const RUN_CONDITIONS: &[OptionKey] = &[OptionKey::On, OptionKey::If, OptionKey::Unless];

/// Options that let nil (or blank) values through
const ALLOW_NIL_CONDITIONS: &[OptionKey] = &[OptionKey::AllowNil, OptionKey::AllowBlank];

/// Options that let blank values through
const ALLOW_EMPTY_CONDITIONS: &[OptionKey] = &[OptionKey::AllowBlank];

#[derive(Debug, Clone)]
pub struct ValidationView<'a> {
    validators: Vec<&'a Validator>,
}

impl<'a> ValidationView<'a> {
    pub fn new(model: &'a dyn Model) -> Self {
        Self::from_validators(model.validators())
    }

    pub fn from_validators(validators: &'a [Validator]) -> Self {
        Self {
            validators: validators.iter().collect(),
        }
    }

    pub fn validators(&self) -> &[&'a Validator] {
        &self.validators
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Target attributes of every held validator, first-seen order, no repeats
    pub fn attributes(&self) -> Vec<String> {
        let mut attributes: Vec<String> = Vec::new();
        for attribute in self.validators.iter().flat_map(|v| v.attributes.iter()) {
            if !attributes.contains(attribute) {
                attributes.push(attribute.clone());
            }
        }
        attributes
    }

    pub fn presence(&self) -> Self {
        self.with_kind(&ValidatorKind::Presence)
    }

    pub fn absence(&self) -> Self {
        self.with_kind(&ValidatorKind::Absence)
    }

    pub fn uniqueness(&self) -> Self {
        self.with_kind(&ValidatorKind::Uniqueness)
    }

    /// Drops validators carrying `on`, `if` or `unless`
    pub fn unconditional(&self) -> Self {
        self.without_options(RUN_CONDITIONS)
    }

    /// Drops validators carrying `allow_nil` or `allow_blank`
    pub fn disallow_nil(&self) -> Self {
        self.without_options(ALLOW_NIL_CONDITIONS)
    }

    /// Drops validators carrying `allow_blank`
    pub fn disallow_empty(&self) -> Self {
        self.without_options(ALLOW_EMPTY_CONDITIONS)
    }

    /// `{on, if, unless}` of the first validator on `attribute` that has any
    /// of them.
    pub fn conditions_for_attribute(&self, attribute: &str) -> Option<Conditions> {
        self.first_conditions(attribute, RUN_CONDITIONS)
    }

    pub fn allow_nil_conditions_for_attribute(&self, attribute: &str) -> Option<Conditions> {
        self.first_conditions(attribute, ALLOW_NIL_CONDITIONS)
    }

    pub fn allow_empty_conditions_for_attribute(&self, attribute: &str) -> Option<Conditions> {
        self.first_conditions(attribute, ALLOW_EMPTY_CONDITIONS)
    }

    /// One scope per uniqueness validator and target attribute: the attribute
    /// plus the validator's `scope` option. Sorted, deduplicated.
    pub fn unique_scopes(&self) -> Vec<UniqueScope> {
        normalize(
            self.uniqueness()
                .validators
                .iter()
                .flat_map(|validator| validator_scopes(validator))
                .collect(),
        )
    }

    /// Uniqueness validators producing `scope` for at least one attribute
    pub fn for_unique_scope(&self, scope: &UniqueScope) -> Self {
        self.uniqueness()
            .filtered(|validator| validator_scopes(validator).iter().any(|s| s == scope))
    }

    fn with_kind(&self, kind: &ValidatorKind) -> Self {
        self.filtered(|validator| &validator.kind == kind)
    }

    fn without_options(&self, keys: &[OptionKey]) -> Self {
        self.filtered(|validator| !keys.iter().any(|key| validator.options.is_set(key)))
    }

    fn first_conditions(&self, attribute: &str, keys: &[OptionKey]) -> Option<Conditions> {
        self.validators
            .iter()
            .filter(|validator| validator.targets(attribute))
            .find(|validator| keys.iter().any(|key| validator.options.is_set(key)))
            .map(|validator| validator.options.slice(keys))
    }

    fn filtered<F>(&self, keep: F) -> Self
    where
        F: Fn(&Validator) -> bool,
    {
        Self {
            validators: self
                .validators
                .iter()
                .copied()
                .filter(|validator| keep(*validator))
                .collect(),
        }
    }
}

fn validator_scopes(validator: &Validator) -> Vec<UniqueScope> {
    let scope = validator.options.scope();
    validator
        .attributes
        .iter()
        .map(|attribute| {
            UniqueScope::new(std::iter::once(attribute.clone()).chain(scope.iter().cloned()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OptionValue, Validator};

    fn conditional_validators() -> Vec<Validator> {
        vec![
            Validator::presence(["present"]),
            Validator::new(ValidatorKind::Other("length".into()), ["not_present"])
                .with("minimum", OptionValue::Raw(1.into())),
            Validator::presence(["conditional_1"]).with("on", "create"),
            Validator::presence(["conditional_2"]).with("if", OptionValue::predicate("false")),
            Validator::presence(["conditional_3"]).with("unless", OptionValue::predicate("false")),
            Validator::presence(["conditional_4"]).with("allow_nil", true),
            Validator::presence(["conditional_5"]).with("allow_blank", true),
        ]
    }

    #[test]
    fn test_filtering_attributes() {
        let validators = conditional_validators();
        let view = ValidationView::from_validators(&validators);

        assert_eq!(
            view.attributes(),
            vec![
                "present",
                "not_present",
                "conditional_1",
                "conditional_2",
                "conditional_3",
                "conditional_4",
                "conditional_5"
            ]
        );
        assert_eq!(
            view.unconditional().attributes(),
            vec!["present", "not_present", "conditional_4", "conditional_5"]
        );
        assert_eq!(
            view.disallow_nil().attributes(),
            vec!["present", "not_present", "conditional_1", "conditional_2", "conditional_3"]
        );
        assert_eq!(
            view.disallow_empty().attributes(),
            vec![
                "present",
                "not_present",
                "conditional_1",
                "conditional_2",
                "conditional_3",
                "conditional_4"
            ]
        );
        assert_eq!(
            view.presence().attributes(),
            vec![
                "present",
                "conditional_1",
                "conditional_2",
                "conditional_3",
                "conditional_4",
                "conditional_5"
            ]
        );
        assert_eq!(
            view.unconditional().presence().disallow_nil().attributes(),
            vec!["present"]
        );
        assert_eq!(
            view.presence().unconditional().disallow_nil().attributes(),
            vec!["present"]
        );
    }

    #[test]
    fn test_absence() {
        let validators = vec![
            Validator::absence(["absent"]),
            Validator::new(ValidatorKind::Other("length".into()), ["not_absent"]),
        ];
        let view = ValidationView::from_validators(&validators);

        assert_eq!(view.attributes(), vec!["absent", "not_absent"]);
        assert_eq!(view.absence().attributes(), vec!["absent"]);
    }

    #[test]
    fn test_empty_option_values_do_not_restrict() {
        let validators = vec![
            Validator::presence(["a"]).with("on", OptionValue::Names(vec![])),
            Validator::presence(["b"]).with("allow_nil", false),
        ];
        let view = ValidationView::from_validators(&validators);

        assert_eq!(view.unconditional().disallow_nil().attributes(), vec!["a", "b"]);
        assert_eq!(view.conditions_for_attribute("a"), None);
    }

    #[test]
    fn test_for_unique_scope() {
        let validators = vec![
            Validator::uniqueness(["a"]),
            Validator::uniqueness(["a", "d"]).with("scope", vec!["b"]),
            Validator::uniqueness(["c"]).with("scope", vec!["a", "b"]),
        ];
        let view = ValidationView::from_validators(&validators);
        let attributes = |members: &[&str]| {
            view.for_unique_scope(&UniqueScope::new(members.iter().copied()))
                .attributes()
        };

        assert!(attributes(&["missing"]).is_empty());
        assert_eq!(attributes(&["a"]), vec!["a"]);
        assert_eq!(attributes(&["a", "b"]), vec!["a", "d"]);
        assert_eq!(attributes(&["b", "a"]), vec!["a", "d"]);
        assert_eq!(attributes(&["b", "d"]), vec!["a", "d"]);
        assert_eq!(attributes(&["a", "b", "c"]), vec!["c"]);
        assert_eq!(attributes(&["c", "b", "a"]), vec!["c"]);
    }

    #[test]
    fn test_unique_scopes() {
        let validators = vec![
            Validator::uniqueness(["a"]),
            Validator::uniqueness(["b"]).with("scope", vec!["a"]),
            Validator::uniqueness(["c"]).with("scope", vec!["a", "b"]),
            Validator::uniqueness(["d"]).with("scope", "b"),
            Validator::presence(["e"]),
        ];
        let view = ValidationView::from_validators(&validators);

        let scopes: Vec<_> = view.unique_scopes().iter().map(ToString::to_string).collect();
        assert_eq!(scopes, vec!["[a]", "[a, b]", "[a, b, c]", "[b, d]"]);
    }

    #[test]
    fn test_conditions_for_attribute() {
        let validators = conditional_validators();
        let view = ValidationView::from_validators(&validators);

        assert_eq!(view.conditions_for_attribute("missing"), None);
        assert_eq!(view.conditions_for_attribute("present"), None);
        assert_eq!(view.conditions_for_attribute("not_present"), None);
        assert_eq!(
            view.conditions_for_attribute("conditional_1")
                .map(|c| c.to_string()),
            Some("{on: create}".to_string())
        );
        let keys: Vec<_> = view
            .conditions_for_attribute("conditional_2")
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, vec![OptionKey::If]);
        let keys: Vec<_> = view
            .conditions_for_attribute("conditional_3")
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, vec![OptionKey::Unless]);
        assert_eq!(view.conditions_for_attribute("conditional_4"), None);
        assert_eq!(view.conditions_for_attribute("conditional_5"), None);
    }

    #[test]
    fn test_allow_nil_conditions_for_attribute() {
        let validators = conditional_validators();
        let view = ValidationView::from_validators(&validators);

        for attribute in [
            "missing",
            "present",
            "not_present",
            "conditional_1",
            "conditional_2",
            "conditional_3",
        ] {
            assert_eq!(view.allow_nil_conditions_for_attribute(attribute), None);
        }
        assert_eq!(
            view.allow_nil_conditions_for_attribute("conditional_4")
                .map(|c| c.to_string()),
            Some("{allow_nil: true}".to_string())
        );
        assert_eq!(
            view.allow_nil_conditions_for_attribute("conditional_5")
                .map(|c| c.to_string()),
            Some("{allow_blank: true}".to_string())
        );
    }

    #[test]
    fn test_allow_empty_conditions_for_attribute() {
        let validators = conditional_validators();
        let view = ValidationView::from_validators(&validators);

        for attribute in ["missing", "present", "not_present", "conditional_1", "conditional_4"] {
            assert_eq!(view.allow_empty_conditions_for_attribute(attribute), None);
        }
        assert_eq!(
            view.allow_empty_conditions_for_attribute("conditional_5")
                .map(|c| c.to_string()),
            Some("{allow_blank: true}".to_string())
        );
    }

    #[test]
    fn test_first_conditional_validator_wins() {
        let validators = vec![
            Validator::presence(["name"]),
            Validator::presence(["name"]).with("on", "update"),
            Validator::presence(["name"]).with("on", "create"),
        ];
        let view = ValidationView::from_validators(&validators);

        assert_eq!(
            view.conditions_for_attribute("name").map(|c| c.to_string()),
            Some("{on: update}".to_string())
        );
    }
}
