//! Wizard step state machine.

use serde::{Deserialize, Serialize};

/// The steps of the onboarding wizard.
///
/// Forward: Welcome → BasicInfo → Address → Documents → Liveness → Review →
/// Completion. `Invalid` and `Completion` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// The application could not be loaded. Only "go back" is offered.
    #[default]
    Invalid,
    Welcome,
    BasicInfo,
    Address,
    Documents,
    Liveness,
    Review,
    Completion,
}

impl WizardStep {
    /// Titles of the numbered steps, in order, for the progress indicator.
    pub const NUMBERED_TITLES: [&'static str; 5] =
        ["Basic Info", "Addresses", "Documents", "Liveness", "Review"];

    /// Position in the flow: Welcome is 0, Completion is 6.
    pub fn index(&self) -> Option<u8> {
        match self {
            Self::Invalid => None,
            Self::Welcome => Some(0),
            Self::BasicInfo => Some(1),
            Self::Address => Some(2),
            Self::Documents => Some(3),
            Self::Liveness => Some(4),
            Self::Review => Some(5),
            Self::Completion => Some(6),
        }
    }

    /// Check if a transition from `self` to `target` is valid.
    ///
    /// Review → Completion is legal here but only taken by a successful
    /// submission.
    pub fn can_transition_to(&self, target: WizardStep) -> bool {
        use WizardStep::*;
        if self.next() == Some(target) {
            return true;
        }
        matches!(
            (self, target),
            (Address, BasicInfo) | (Documents, Address) | (Liveness, Documents) | (Review, Liveness)
        )
    }

    /// The next step in the forward progression, if any.
    pub fn next(&self) -> Option<WizardStep> {
        use WizardStep::*;
        match self {
            Welcome => Some(BasicInfo),
            BasicInfo => Some(Address),
            Address => Some(Documents),
            Documents => Some(Liveness),
            Liveness => Some(Review),
            Review => Some(Completion),
            Invalid | Completion => None,
        }
    }

    /// The step "Previous" leads to. None on the first numbered step and
    /// outside the numbered range.
    pub fn previous(&self) -> Option<WizardStep> {
        use WizardStep::*;
        match self {
            Address => Some(BasicInfo),
            Documents => Some(Address),
            Liveness => Some(Documents),
            Review => Some(Liveness),
            Invalid | Welcome | BasicInfo | Completion => None,
        }
    }

    /// Whether this step is terminal (nothing leaves it).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Invalid | Self::Completion)
    }

    /// Steps 1–4, whose slice is persisted on advance.
    pub fn persists_slice(&self) -> bool {
        matches!(
            self,
            Self::BasicInfo | Self::Address | Self::Documents | Self::Liveness
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Invalid => "Invalid KYC",
            Self::Welcome => "Welcome",
            Self::BasicInfo => "Basic Info",
            Self::Address => "Addresses",
            Self::Documents => "Documents",
            Self::Liveness => "Liveness",
            Self::Review => "Review",
            Self::Completion => "Completed",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Invalid => "invalid",
            Self::Welcome => "welcome",
            Self::BasicInfo => "basic_info",
            Self::Address => "address",
            Self::Documents => "documents",
            Self::Liveness => "liveness",
            Self::Review => "review",
            Self::Completion => "completion",
        };
        write!(f, "{s}")
    }
}

/// UI state owned by the controller and handed to each step view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WizardState {
    pub step: WizardStep,
    /// Set once an advance was blocked; from then on every edit revalidates.
    pub show_errors: bool,
    pub confirmation_open: bool,
    pub consent_given: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions() {
        use WizardStep::*;
        let transitions = [
            (Welcome, BasicInfo),
            (BasicInfo, Address),
            (Address, Documents),
            (Documents, Liveness),
            (Liveness, Review),
            (Review, Completion),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
            assert_eq!(from.next(), Some(to));
        }
    }

    #[test]
    fn backward_only_within_numbered_steps() {
        use WizardStep::*;
        assert!(Review.can_transition_to(Liveness));
        assert!(Address.can_transition_to(BasicInfo));
        assert!(!BasicInfo.can_transition_to(Welcome));
        assert!(!Completion.can_transition_to(Review));
        assert_eq!(BasicInfo.previous(), None);
        assert_eq!(Review.previous(), Some(Liveness));
    }

    #[test]
    fn no_skipping() {
        use WizardStep::*;
        assert!(!Welcome.can_transition_to(Completion));
        assert!(!BasicInfo.can_transition_to(Documents));
        assert!(!Documents.can_transition_to(Completion));
        assert!(!Invalid.can_transition_to(Welcome));
    }

    #[test]
    fn terminal_steps() {
        assert!(WizardStep::Invalid.is_terminal());
        assert!(WizardStep::Completion.is_terminal());
        assert!(!WizardStep::Review.is_terminal());
        assert_eq!(WizardStep::Invalid.next(), None);
        assert_eq!(WizardStep::Completion.next(), None);
    }

    #[test]
    fn display_matches_serde() {
        for step in [
            WizardStep::Invalid,
            WizardStep::Welcome,
            WizardStep::BasicInfo,
            WizardStep::Address,
            WizardStep::Documents,
            WizardStep::Liveness,
            WizardStep::Review,
            WizardStep::Completion,
        ] {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(json, format!("\"{step}\""));
        }
    }

    #[test]
    fn indices_and_titles() {
        assert_eq!(WizardStep::Welcome.index(), Some(0));
        assert_eq!(WizardStep::Completion.index(), Some(6));
        assert_eq!(WizardStep::Invalid.index(), None);
        assert_eq!(WizardStep::Address.title(), WizardStep::NUMBERED_TITLES[1]);
    }
}
