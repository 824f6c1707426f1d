use crate::domain::persona::Persona;
use crate::domain::scenario::Scenario;
use crate::domain::turn::{Speaker, Turn};

pub struct PromptBuilder;

impl PromptBuilder {
    /// System instructions for the counterpart role-play call. Pure: the same
    /// scenario always serializes to the same string.
    pub fn counterpart_system_prompt(scenario: &Scenario) -> String {
        let persona = Persona::resolve(&scenario.persona);

        format!(
            r#"You are playing the role of a counterpart in a salary negotiation simulation. This is a practice tool for the candidate — your job is to create a realistic, challenging negotiation experience.

SCENARIO:
- The candidate is interviewing for: {role}
- Industry: {industry}
- Company size: {company_size}
- Candidate experience level: {experience}
- Their target salary: ${target_salary}

YOUR PERSONA:
{behavior}

RULES:
1. Stay in character at all times. Never break the fourth wall or acknowledge this is a simulation.
2. Start by extending a verbal offer that is 10-20% below the candidate's target salary. Frame it positively ("We're excited to offer you...").
3. When the candidate counters, push back using realistic objections appropriate to your persona.
4. Use common real-world negotiation tactics: anchoring, silence, urgency ("We need an answer by Friday"), competing priorities ("We have other strong candidates").
5. Be responsive to good negotiation tactics from the candidate. If they provide market data, reference competing offers, or demonstrate their unique value — acknowledge it subtly and potentially move your position slightly.
6. Keep responses concise — 2-4 sentences typically. This should feel like a real conversation, not a monologue.
7. Never reveal the "range" or "budget" unless the candidate specifically asks and pushes for it, and even then, give a range that anchors low.
8. The conversation should feel natural and human. Use contractions, natural pauses, and realistic phrasing.
9. Do NOT use markdown formatting, bullet points, or lists. Speak naturally as a person would in a conversation."#,
            role = scenario.role,
            industry = scenario.industry,
            company_size = scenario.company_size,
            experience = scenario.experience,
            target_salary = scenario.target_salary,
            behavior = persona.behavior(),
        )
    }

    /// The synthesized candidate opener that seeds every transcript at
    /// index 0. Persona-agnostic; only the role is interpolated.
    pub fn opening_message(scenario: &Scenario) -> String {
        format!(
            "Hi, I'm excited about the {} opportunity. I'd love to discuss the compensation package.",
            scenario.role
        )
    }

    /// Coach instructions for the feedback call. Embeds the scenario and the
    /// flattened transcript and demands a single JSON object matching the
    /// feedback shape.
    pub fn feedback_prompt(scenario: &Scenario, transcript: &[Turn]) -> String {
        format!(
            r#"You are an expert salary negotiation coach analyzing a practice negotiation session.

SCENARIO:
- Role: {role}
- Target Salary: ${target_salary}
- Industry: {industry}
- Company Size: {company_size}
- Experience Level: {experience}
- Negotiation Persona: {persona}

CONVERSATION TRANSCRIPT:
{transcript}

Analyze this negotiation and provide detailed, actionable feedback. Be specific — reference exact moments in the conversation. Be encouraging but honest. The goal is to help this person negotiate better next time.

Key things to evaluate:
- Did they state their number confidently or hedge?
- Did they use data, competing offers, or unique value to justify their ask?
- Did they cave at the first pushback or hold firm?
- Did they apologize for asking or make excuses?
- Did they handle silence and pressure well?
- Did they negotiate beyond just base salary (equity, signing bonus, review timeline)?
- What was the gap between their target and the final number discussed?

Respond with ONLY a JSON object of this exact shape, no explanation:
{{
    "overallScore": <integer 1-10>,
    "finalOffer": "<the final salary number reached or last discussed>",
    "targetSalary": "{target_salary}",
    "summary": "<2-3 sentence plain-English summary>",
    "strengths": [{{"point": "...", "quote": "..."}}],
    "weaknesses": [{{"point": "...", "quote": "...", "suggestion": "..."}}],
    "tips": ["..."]
}}
Include 2-4 strengths, 2-4 weaknesses, and 3-5 tips."#,
            role = scenario.role,
            target_salary = scenario.target_salary,
            industry = scenario.industry,
            company_size = scenario.company_size,
            experience = scenario.experience,
            persona = scenario.persona,
            transcript = Self::flatten_transcript(transcript),
        )
    }

    /// Speaker-labeled lines in turn order, blank-line separated.
    pub fn flatten_transcript(transcript: &[Turn]) -> String {
        transcript
            .iter()
            .map(|turn| {
                let label = match turn.speaker {
                    Speaker::Candidate => "CANDIDATE",
                    Speaker::Counterpart => "COUNTERPART",
                };
                format!("{}: {}", label, turn.text)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_with_persona(persona: &str) -> Scenario {
        Scenario {
            role: "Senior Software Engineer".to_string(),
            target_salary: "150,000".to_string(),
            industry: "Technology".to_string(),
            company_size: "Startup (1-50)".to_string(),
            experience: "Senior (6-10 years)".to_string(),
            persona: persona.to_string(),
        }
    }

    #[test]
    fn test_system_prompt_embeds_scenario_verbatim() {
        let prompt =
            PromptBuilder::counterpart_system_prompt(&scenario_with_persona("tough-hiring-manager"));
        assert!(prompt.contains("Senior Software Engineer"));
        assert!(prompt.contains("$150,000"));
        assert!(prompt.contains("Startup (1-50)"));
        assert!(prompt.contains("Senior (6-10 years)"));
        assert!(prompt.contains("no-nonsense hiring manager"));
        assert!(prompt.contains("10-20% below"));
    }

    #[test]
    fn test_system_prompt_is_deterministic() {
        let scenario = scenario_with_persona("hr-budget-holder");
        let first = PromptBuilder::counterpart_system_prompt(&scenario);
        let second = PromptBuilder::counterpart_system_prompt(&scenario);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_persona_uses_default_behavior() {
        let prompt = PromptBuilder::counterpart_system_prompt(&scenario_with_persona("pirate"));
        assert!(prompt.contains("friendly, warm recruiter"));
    }

    #[test]
    fn test_opening_message_contains_role() {
        let opener = PromptBuilder::opening_message(&scenario_with_persona("friendly-recruiter"));
        assert!(opener.contains("Senior Software Engineer"));
        assert!(opener.contains("compensation package"));
    }

    #[test]
    fn test_flatten_labels_speakers_in_order() {
        let transcript = vec![
            Turn::candidate("Hi, about the offer"),
            Turn::counterpart("We're excited to offer you 125,000"),
            Turn::candidate("I was hoping for 150,000"),
        ];
        let flat = PromptBuilder::flatten_transcript(&transcript);
        assert_eq!(
            flat,
            "CANDIDATE: Hi, about the offer\n\nCOUNTERPART: We're excited to offer you 125,000\n\nCANDIDATE: I was hoping for 150,000"
        );
    }

    #[test]
    fn test_feedback_prompt_embeds_transcript_and_shape() {
        let transcript = vec![
            Turn::candidate("Hi"),
            Turn::counterpart("We're excited to offer you 125,000"),
        ];
        let prompt =
            PromptBuilder::feedback_prompt(&scenario_with_persona("friendly-recruiter"), &transcript);
        assert!(prompt.contains("COUNTERPART: We're excited to offer you 125,000"));
        assert!(prompt.contains("\"overallScore\""));
        assert!(prompt.contains("2-4 strengths"));
    }
}
