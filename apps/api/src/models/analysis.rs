use serde::{Deserialize, Serialize};

use crate::analysis::career_matcher::CareerMatch;
use crate::analysis::experience::ExperienceLevel;
use crate::analysis::scorer::ResumeScore;
use crate::analysis::skill_matcher::SkillMatch;
use crate::taxonomy::{CareerPath, CourseEntry};

/// Aggregate result of one analysis run. Field names serialize in camelCase
/// to match the web client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    pub score: ResumeScore,
    /// One entry per taxonomy skill, in taxonomy order.
    pub skill_matches: Vec<SkillMatch>,
    pub career_matches: Vec<CareerMatch>,
    pub suggestions: Vec<String>,
    pub recommended_courses: Vec<CourseEntry>,
    pub experience_level: ExperienceLevel,
    pub total_years_of_experience: f64,
}

impl ResumeAnalysis {
    pub fn matched_skill_count(&self) -> usize {
        self.skill_matches.iter().filter(|m| m.matched).count()
    }

    pub fn top_career(&self) -> Option<&CareerPath> {
        self.career_matches.first().map(|c| &c.path)
    }
}

/// Body of `POST /api/v1/analyze/text`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeTextRequest {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let analysis = ResumeAnalysis {
            score: ResumeScore {
                overall: 70,
                keywords: 60,
                formatting: 80,
                ats_compatibility: 75,
            },
            skill_matches: Vec::new(),
            career_matches: Vec::new(),
            suggestions: vec!["Add more keywords".to_string()],
            recommended_courses: Vec::new(),
            experience_level: ExperienceLevel::Mid,
            total_years_of_experience: 4.5,
        };

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["score"]["atsCompatibility"], 75);
        assert_eq!(json["experienceLevel"], "Mid");
        assert_eq!(json["totalYearsOfExperience"], 4.5);
        assert!(json["skillMatches"].as_array().unwrap().is_empty());
        assert!(json["recommendedCourses"].is_array());
    }

    #[test]
    fn test_empty_analysis_has_no_top_career() {
        let json = r#"{
            "score": {"overall": 0, "keywords": 0, "formatting": 0, "atsCompatibility": 0},
            "skillMatches": [],
            "careerMatches": [],
            "suggestions": [],
            "recommendedCourses": [],
            "experienceLevel": "Entry",
            "totalYearsOfExperience": 0.0
        }"#;
        let analysis: ResumeAnalysis = serde_json::from_str(json).unwrap();
        assert!(analysis.top_career().is_none());
        assert_eq!(analysis.matched_skill_count(), 0);
    }
}
