//! Class tags applied to a surface across transition phases, and selector
//! strings for authoring the styles that react to them.
//!
//! The projection is pure: every phase maps to a fixed set of tags, with a
//! separate transient "start" tag for the animated phases. Stylesheets key off
//! `active`/`inactive` for the two visual endpoints and `transitioning` (or the
//! specific `entering`/`exiting` tags) for the animated stretch in between.

use crate::transition::TransitionPhase;

/// Prefix prepended to every class token when the caller does not choose one.
pub const DEFAULT_CLASS_PREFIX: &str = "veil-";

/// Semantic class tags. The `active`/`inactive`/`transitioning` tags are
/// derived conveniences always co-applied with the specific phase tag:
/// exactly one of `active`/`inactive` is present while the element is
/// mounted, and `transitioning` is present only while entering or exiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionClass {
    /// Transient start state flushed just before `Entering` styles apply.
    EnterStart,
    Entering,
    Entered,
    /// Transient start state flushed just before `Exiting` styles apply.
    ExitStart,
    Exiting,
    Exited,
    Transitioning,
    Active,
    Inactive,
}

impl TransitionClass {
    pub const ALL: [TransitionClass; 9] = [
        TransitionClass::EnterStart,
        TransitionClass::Entering,
        TransitionClass::Entered,
        TransitionClass::ExitStart,
        TransitionClass::Exiting,
        TransitionClass::Exited,
        TransitionClass::Transitioning,
        TransitionClass::Active,
        TransitionClass::Inactive,
    ];

    /// Bare class token, before any prefix is applied.
    pub fn token(self) -> &'static str {
        match self {
            TransitionClass::EnterStart => "enter-start",
            TransitionClass::Entering => "entering",
            TransitionClass::Entered => "entered",
            TransitionClass::ExitStart => "exit-start",
            TransitionClass::Exiting => "exiting",
            TransitionClass::Exited => "exited",
            TransitionClass::Transitioning => "transitioning",
            TransitionClass::Active => "active",
            TransitionClass::Inactive => "inactive",
        }
    }
}

/// How transition class tokens are prefixed on the surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClassPrefix {
    /// Use [`DEFAULT_CLASS_PREFIX`].
    #[default]
    Default,
    /// Apply bare tokens with no prefix.
    None,
    /// Apply a caller-chosen prefix.
    Prefix(String),
}

impl ClassPrefix {
    pub fn as_str(&self) -> &str {
        match self {
            ClassPrefix::Default => DEFAULT_CLASS_PREFIX,
            ClassPrefix::None => "",
            ClassPrefix::Prefix(prefix) => prefix,
        }
    }

    /// Full class name for one tag.
    pub fn class(&self, tag: TransitionClass) -> String {
        format!("{}{}", self.as_str(), tag.token())
    }
}

/// Steady tags for a phase. Total over the enum; unmounted maps to the empty
/// set since there is nothing to tag.
pub fn classes_for(phase: TransitionPhase) -> &'static [TransitionClass] {
    match phase {
        TransitionPhase::Unmounted => &[],
        TransitionPhase::MountAsEntered | TransitionPhase::Entered => {
            &[TransitionClass::Active, TransitionClass::Entered]
        }
        TransitionPhase::Entering => &[
            TransitionClass::Active,
            TransitionClass::Entering,
            TransitionClass::Transitioning,
        ],
        TransitionPhase::Exiting => &[
            TransitionClass::Inactive,
            TransitionClass::Exiting,
            TransitionClass::Transitioning,
        ],
        TransitionPhase::Exited => &[TransitionClass::Inactive, TransitionClass::Exited],
    }
}

/// Transient tag applied (and flushed) on top of the previous steady state so
/// styles have a distinct position to animate from.
pub fn staging_class(phase: TransitionPhase) -> Option<TransitionClass> {
    match phase {
        TransitionPhase::Entering => Some(TransitionClass::EnterStart),
        TransitionPhase::Exiting => Some(TransitionClass::ExitStart),
        _ => None,
    }
}

/// Options for [`create_class_selectors`].
#[derive(Debug, Clone, Default)]
pub struct CreateClassSelectorsOptions {
    pub class_prefix: ClassPrefix,
    /// Emit `&.name` selectors for embedding inside nested style rules.
    pub use_combinator_prefix: bool,
}

/// Stylesheet selector strings, one per tag.
#[derive(Debug, Clone)]
pub struct ClassSelectors {
    pub enter_start: String,
    pub entering: String,
    pub entered: String,
    pub exit_start: String,
    pub exiting: String,
    pub exited: String,
    pub transitioning: String,
    pub active: String,
    pub inactive: String,
}

/// Selector string for one tag.
pub fn selector_for(tag: TransitionClass, prefix: &ClassPrefix, use_combinator_prefix: bool) -> String {
    let lead = if use_combinator_prefix { "&." } else { "." };
    format!("{lead}{}{}", prefix.as_str(), tag.token())
}

/// Build the full selector map for style authoring.
pub fn create_class_selectors(options: CreateClassSelectorsOptions) -> ClassSelectors {
    let sel = |tag| selector_for(tag, &options.class_prefix, options.use_combinator_prefix);
    ClassSelectors {
        enter_start: sel(TransitionClass::EnterStart),
        entering: sel(TransitionClass::Entering),
        entered: sel(TransitionClass::Entered),
        exit_start: sel(TransitionClass::ExitStart),
        exiting: sel(TransitionClass::Exiting),
        exited: sel(TransitionClass::Exited),
        transitioning: sel(TransitionClass::Transitioning),
        active: sel(TransitionClass::Active),
        inactive: sel(TransitionClass::Inactive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prefix_applies_to_class_names() {
        let prefix = ClassPrefix::default();
        assert_eq!(prefix.class(TransitionClass::EnterStart), "veil-enter-start");
        assert_eq!(ClassPrefix::None.class(TransitionClass::Active), "active");
        assert_eq!(
            ClassPrefix::Prefix("t-".into()).class(TransitionClass::Exited),
            "t-exited"
        );
    }

    #[test]
    fn mounted_phases_carry_exactly_one_visibility_tag() {
        for phase in [
            TransitionPhase::MountAsEntered,
            TransitionPhase::Entering,
            TransitionPhase::Entered,
            TransitionPhase::Exiting,
            TransitionPhase::Exited,
        ] {
            let classes = classes_for(phase);
            let active = classes.contains(&TransitionClass::Active);
            let inactive = classes.contains(&TransitionClass::Inactive);
            assert!(active ^ inactive, "phase {phase:?} must be active xor inactive");
        }
        assert!(classes_for(TransitionPhase::Unmounted).is_empty());
    }

    #[test]
    fn transitioning_tag_matches_animated_phases() {
        for phase in [TransitionPhase::Entering, TransitionPhase::Exiting] {
            assert!(classes_for(phase).contains(&TransitionClass::Transitioning));
            assert!(staging_class(phase).is_some());
        }
        for phase in [
            TransitionPhase::Entered,
            TransitionPhase::Exited,
            TransitionPhase::MountAsEntered,
            TransitionPhase::Unmounted,
        ] {
            assert!(!classes_for(phase).contains(&TransitionClass::Transitioning));
            assert!(staging_class(phase).is_none());
        }
    }

    #[test]
    fn selectors_support_combinator_form() {
        let plain = create_class_selectors(CreateClassSelectorsOptions::default());
        assert_eq!(plain.entering, ".veil-entering");

        let nested = create_class_selectors(CreateClassSelectorsOptions {
            class_prefix: ClassPrefix::Prefix("fade-".into()),
            use_combinator_prefix: true,
        });
        assert_eq!(nested.inactive, "&.fade-inactive");
        assert_eq!(nested.enter_start, "&.fade-enter-start");
    }
}
