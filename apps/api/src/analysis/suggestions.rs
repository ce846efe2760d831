//! Suggestion Generator: fixed, ordered rules over the scores, career matches,
//! and skill matches. Each rule adds at most one suggestion.

use crate::analysis::career_matcher::CareerMatch;
use crate::analysis::scorer::ResumeScore;
use crate::analysis::skill_matcher::SkillMatch;
use crate::taxonomy::SkillCategory;

const FORMATTING_THRESHOLD: u32 = 60;
const ATS_THRESHOLD: u32 = 70;
const KEYWORDS_THRESHOLD: u32 = 50;
const CAREER_MATCH_THRESHOLD: u32 = 50;
const STRONG_OVERALL: u32 = 80;
/// Skills mentioned only once before the reinforcement rule fires.
const SINGLE_MENTION_MIN: usize = 3;
const LISTED_SKILLS: usize = 3;

pub const FORMATTING_SUGGESTION: &str = "Improve your formatting: use clear section headers \
(Experience, Education, Skills), keep lines short, and present achievements as bullet points.";

pub const ATS_SUGGESTION: &str = "Make your resume easier for applicant tracking systems to parse: \
avoid tables and multi-column layouts, use simple bullets (-, *, •), include an email address, \
and remove decorative symbols.";

pub const KEYWORDS_SUGGESTION: &str = "Add more keywords from your target field: name the \
specific tools, technologies, and methods you have used.";

pub const SOFT_SKILLS_SUGGESTION: &str = "Mention soft skills such as leadership, communication, \
or teamwork, ideally with an example of each.";

pub const STRONG_RESUME_SUGGESTION: &str = "Your resume is in great shape. Tailor the summary to \
each role you apply for to keep it focused.";

pub fn generate_suggestions(
    score: &ResumeScore,
    career_matches: &[CareerMatch],
    matches: &[SkillMatch],
) -> Vec<String> {
    let mut suggestions: Vec<String> = Vec::new();
    let mut push = |text: String| {
        if !suggestions.contains(&text) {
            suggestions.push(text);
        }
    };

    if score.formatting < FORMATTING_THRESHOLD {
        push(FORMATTING_SUGGESTION.to_string());
    }

    if score.ats_compatibility < ATS_THRESHOLD {
        push(ATS_SUGGESTION.to_string());
    }

    if score.keywords < KEYWORDS_THRESHOLD {
        push(KEYWORDS_SUGGESTION.to_string());
    }

    if let Some(top) = career_matches.first() {
        if top.match_percentage < CAREER_MATCH_THRESHOLD && !top.missing_skills.is_empty() {
            let skills: Vec<&str> = top
                .missing_skills
                .iter()
                .take(LISTED_SKILLS)
                .map(String::as_str)
                .collect();
            push(format!(
                "To strengthen your fit for {} ({}% match), highlight or build experience in: {}.",
                top.path.name,
                top.match_percentage,
                skills.join(", ")
            ));
        }
    }

    let has_soft_skill = matches
        .iter()
        .any(|m| m.matched && m.skill.category == SkillCategory::Soft);
    if !has_soft_skill {
        push(SOFT_SKILLS_SUGGESTION.to_string());
    }

    let single_mentions: Vec<&str> = matches
        .iter()
        .filter(|m| m.occurrences == 1)
        .map(|m| m.skill.name.as_str())
        .collect();
    if single_mentions.len() >= SINGLE_MENTION_MIN {
        let listed: Vec<&str> = single_mentions.iter().take(LISTED_SKILLS).copied().collect();
        push(format!(
            "Back up skills you list only once with concrete project or work examples, e.g. {}.",
            listed.join(", ")
        ));
    }

    if suggestions.is_empty() && score.overall >= STRONG_OVERALL {
        suggestions.push(STRONG_RESUME_SUGGESTION.to_string());
    }

    suggestions
}
