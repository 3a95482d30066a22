//! Contract and review-question templates.
//!
//! Pure text generation with no persisted state. Variation (the timer limit,
//! which question each category asks) is random per call so repeated
//! requests do not become rote.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

const NECESSITY: &[&str] = &[
    "What specific task requires opening the vault that cannot be done any other way?",
    "If the vault stayed locked all day, would your intended task still be possible? Explain how.",
    "Rate the urgency of this access from 1-10. For anything below 8, explain why it can't wait.",
    "List three people you could ask for help with this task instead of opening the vault.",
];

const SELF_CONTROL: &[&str] = &[
    "What is your time limit for this session, and how will you enforce it?",
    "Name five things you absolutely will NOT do once the vault is open.",
    "If you go over your time limit, what penalty will you impose on yourself?",
    "Describe your plan for immediately re-securing the vault after completing your task.",
];

const PRODUCTIVITY: &[&str] = &[
    "What productive tasks have you completed in the last hour that justify this access?",
    "If granted access, what will you accomplish in the next 15 minutes to prove you deserve it?",
    "How will opening the vault now make you MORE productive rather than less?",
    "Name three important tasks you've been avoiding by thinking about the vault.",
];

const WELLNESS: &[&str] = &[
    "How does today's request align with your usage goals for this week?",
    "Describe a moment this week when you resisted opening the vault. How did it feel?",
    "If a child asked you for access with your current reason, would you grant it? Why or why not?",
    "What would you do right now if the vault remained locked?",
];

/// Generate the usage contract a caller must agree to before access.
///
/// Dated with the supplied time; the timer limit varies between 5 and 15
/// minutes per generation.
pub fn usage_contract(now: DateTime<Utc>) -> String {
    let minutes = rand::thread_rng().gen_range(5..=15);
    format!(
        "VAULT ACCESS CONTRACT - {date}\n\
         \n\
         I, the undersigned, hereby acknowledge that:\n\
         \n\
         1. USAGE RULES:\n\
         \x20  - I will use the contents ONLY for the stated purpose\n\
         \x20  - I will set a timer for maximum {minutes} minutes\n\
         \x20  - I will keep the session free of distractions\n\
         \x20  - I will avoid anything unrelated to the stated purpose\n\
         \n\
         2. PENALTIES FOR VIOLATION:\n\
         \x20  - First offense: 24-hour vault lockdown\n\
         \x20  - Second offense: 48-hour vault lockdown\n\
         \x20  - Third offense: 72-hour vault lockdown\n\
         \x20  - Egregious violations: the guardian may impose custom penalties\n\
         \n\
         3. EMERGENCY EXCEPTIONS:\n\
         \x20  - True emergencies involving health, safety, or critical deadlines\n\
         \x20  - Must be pre-approved by answering additional review questions\n\
         \n\
         4. COMMITMENT:\n\
         \x20  I understand that the vault exists for my benefit. I respect its\n\
         \x20  purpose and the guardian's judgment in limiting my access.\n\
         \n\
         Signature: ________________\n\
         Time: {time}\n\
         Intended Use: ________________\n\
         Time Limit: _______ minutes\n\
         \n\
         The Guardian's Seal: APPROVED / DENIED\n",
        date = now.format("%Y-%m-%d"),
        minutes = minutes,
        time = now.format("%H:%M"),
    )
}

/// Generate review questions: one randomly chosen per category.
pub fn review_questions() -> String {
    let mut rng = rand::thread_rng();
    let categories: [(&str, &[&str]); 4] = [
        ("NECESSITY", NECESSITY),
        ("SELF_CONTROL", SELF_CONTROL),
        ("PRODUCTIVITY", PRODUCTIVITY),
        ("DIGITAL_WELLNESS", WELLNESS),
    ];

    categories
        .iter()
        .map(|(name, questions)| {
            let question = questions
                .choose(&mut rng)
                .copied()
                .unwrap_or("Why should the vault open?");
            format!("{name}:\n{question}")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn contract_is_dated_and_bounded() {
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 14, 30, 0).unwrap();
        let contract = usage_contract(now);
        assert!(contract.contains("VAULT ACCESS CONTRACT - 2026-08-27"));
        assert!(contract.contains("Time: 14:30"));
        assert!(contract.contains("PENALTIES FOR VIOLATION"));
    }

    #[test]
    fn contract_timer_stays_in_range() {
        let now = Utc::now();
        for _ in 0..50 {
            let contract = usage_contract(now);
            let minutes: u32 = contract
                .lines()
                .find(|l| l.contains("timer for maximum"))
                .and_then(|l| l.split_whitespace().rev().nth(1))
                .and_then(|m| m.parse().ok())
                .expect("timer line present");
            assert!((5..=15).contains(&minutes), "minutes {minutes} out of range");
        }
    }

    #[test]
    fn questions_cover_every_category() {
        let questions = review_questions();
        for header in ["NECESSITY:", "SELF_CONTROL:", "PRODUCTIVITY:", "DIGITAL_WELLNESS:"] {
            assert!(questions.contains(header), "missing {header}");
        }
        assert_eq!(questions.split("\n\n").count(), 4);
    }

    #[test]
    fn each_question_comes_from_its_category() {
        let questions = review_questions();
        let blocks: Vec<&str> = questions.split("\n\n").collect();
        let necessity = blocks[0].strip_prefix("NECESSITY:\n").unwrap();
        assert!(NECESSITY.contains(&necessity));
    }
}
