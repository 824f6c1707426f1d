use serde::{Deserialize, Serialize};

/// The closed set of counterpart personas. Ids outside this set resolve to
/// [`Persona::DEFAULT`] at construction time, silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Persona {
    FriendlyRecruiter,
    ToughHiringManager,
    HrBudgetHolder,
}

impl Persona {
    pub const DEFAULT: Persona = Persona::FriendlyRecruiter;

    pub const ALL: [Persona; 3] = [
        Persona::FriendlyRecruiter,
        Persona::ToughHiringManager,
        Persona::HrBudgetHolder,
    ];

    /// Map a persona id to its entry. Unknown, empty, and missing ids all
    /// fall back to the friendly recruiter; there is no error path.
    pub fn resolve(id: &str) -> Persona {
        match id {
            "friendly-recruiter" => Persona::FriendlyRecruiter,
            "tough-hiring-manager" => Persona::ToughHiringManager,
            "hr-budget-holder" => Persona::HrBudgetHolder,
            _ => Persona::DEFAULT,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Persona::FriendlyRecruiter => "friendly-recruiter",
            Persona::ToughHiringManager => "tough-hiring-manager",
            Persona::HrBudgetHolder => "hr-budget-holder",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Persona::FriendlyRecruiter => "Friendly Recruiter",
            Persona::ToughHiringManager => "Tough Hiring Manager",
            Persona::HrBudgetHolder => "HR Budget Holder",
        }
    }

    /// Short description shown next to the persona in the setup step.
    pub fn blurb(&self) -> &'static str {
        match self {
            Persona::FriendlyRecruiter => {
                "Warm and helpful, but still has a budget to stick to. A good starting point."
            }
            Persona::ToughHiringManager => {
                "Direct and firm. Will push back hard on your number and use internal equity arguments."
            }
            Persona::HrBudgetHolder => {
                "The classic \"that's outside our budget\" persona. Will test your ability to hold firm."
            }
        }
    }

    /// Role-play instructions injected into the counterpart system prompt.
    pub fn behavior(&self) -> &'static str {
        match self {
            Persona::FriendlyRecruiter => {
                "You are a friendly, warm recruiter. You genuinely like the candidate and want \
                 them on the team. However, you still have a budget to work within and company \
                 policies to follow. You'll push back gently — using phrases like \"I hear you, \
                 but...\" and \"I'd love to make that work, let me see what I can do.\" You \
                 occasionally give ground on small things to build goodwill, but you always try \
                 to anchor below the candidate's ask. You mention how great the benefits and \
                 culture are as a way to justify a lower base."
            }
            Persona::ToughHiringManager => {
                "You are a direct, no-nonsense hiring manager. You've hired many people and you \
                 don't get pushed around easily. You use internal equity arguments (\"we need to \
                 keep things fair across the team\"), you reference market data that supports a \
                 lower number, and you're comfortable with silence. You push back firmly: \
                 \"That's above what we've budgeted for this level.\" You respect candidates who \
                 hold firm and back up their number with data, but you don't give in easily. You \
                 sometimes use the \"take it or leave it\" approach toward the end."
            }
            Persona::HrBudgetHolder => {
                "You are an HR compensation specialist with a fixed budget. Your go-to phrase is \
                 \"that's outside our approved range for this role.\" You reference pay bands, \
                 internal equity, and company policy frequently. You're polite but firm, and you \
                 often deflect by talking about total compensation (equity, bonus, benefits) \
                 rather than base salary. You use phrases like \"I understand your expectations, \
                 but our hands are tied by the approved range.\" You might offer a signing bonus \
                 or earlier review as a compromise, but you rarely move more than 5-10% on base."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids_resolve() {
        assert_eq!(Persona::resolve("friendly-recruiter"), Persona::FriendlyRecruiter);
        assert_eq!(Persona::resolve("tough-hiring-manager"), Persona::ToughHiringManager);
        assert_eq!(Persona::resolve("hr-budget-holder"), Persona::HrBudgetHolder);
    }

    #[test]
    fn test_unknown_ids_fall_back() {
        assert_eq!(Persona::resolve(""), Persona::FriendlyRecruiter);
        assert_eq!(Persona::resolve("ceo"), Persona::FriendlyRecruiter);
        assert_eq!(Persona::resolve("Friendly-Recruiter"), Persona::FriendlyRecruiter);
    }

    #[test]
    fn test_ids_round_trip() {
        for persona in Persona::ALL {
            assert_eq!(Persona::resolve(persona.id()), persona);
        }
    }

    #[test]
    fn test_every_persona_has_copy() {
        for persona in Persona::ALL {
            assert!(!persona.label().is_empty());
            assert!(!persona.blurb().is_empty());
            assert!(!persona.behavior().is_empty());
        }
    }
}
