//! Course Recommender: catalog entries for the skills the top-ranked career
//! path(s) are missing.

use crate::analysis::career_matcher::CareerMatch;
use crate::taxonomy::{CourseEntry, Taxonomy};

/// Collects missing skills from every path tied for the top percentage
/// (deduplicated, keeping the highest weight), orders them by weight
/// descending then name, and returns at most `limit` catalog entries.
/// Skills without catalog entries are skipped.
pub fn recommend_courses(
    career_matches: &[CareerMatch],
    catalog: &Taxonomy,
    limit: usize,
) -> Vec<CourseEntry> {
    let Some(top) = career_matches.first() else {
        return Vec::new();
    };

    let mut weighted: Vec<(&str, f64)> = Vec::new();
    for career in career_matches
        .iter()
        .take_while(|c| c.match_percentage == top.match_percentage)
    {
        for skill in &career.missing_skills {
            let weight = career.path.weight_of(skill).unwrap_or(0.0);
            match weighted.iter_mut().find(|(s, _)| *s == skill.as_str()) {
                Some(entry) => entry.1 = entry.1.max(weight),
                None => weighted.push((skill.as_str(), weight)),
            }
        }
    }

    weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    weighted
        .iter()
        .flat_map(|(skill, _)| catalog.courses_for(skill))
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::career_matcher::match_careers;
    use crate::analysis::fixtures::sample_taxonomy;
    use crate::analysis::normalizer::normalize;
    use crate::analysis::skill_matcher::match_skills;

    fn courses_for(text: &str, limit: usize) -> Vec<CourseEntry> {
        let taxonomy = sample_taxonomy();
        let matches = match_skills(&normalize(text).unwrap(), &taxonomy);
        let careers = match_careers(&matches, &taxonomy.career_paths);
        recommend_courses(&careers, &taxonomy, limit)
    }

    #[test]
    fn test_courses_follow_missing_skill_weight() {
        // Top path is Data Analyst (sql + python matched, excel missing)
        let courses = courses_for("SQL, Python", 5);
        assert!(!courses.is_empty());
        assert!(courses.iter().all(|c| c.skill == "excel"));
    }

    #[test]
    fn test_tied_top_paths_are_combined() {
        // Nothing matched: every path ties at 0%, so missing skills from all
        // of them compete by weight.
        let courses = courses_for("nothing relevant", 20);
        let skills: Vec<_> = courses.iter().map(|c| c.skill.as_str()).collect();
        // weight 1.0 skills first, alphabetically: docker, java, kubernetes, leadership, sql
        assert_eq!(
            skills,
            vec!["docker", "kubernetes", "leadership", "sql", "sql", "excel", "python"]
        );
    }

    #[test]
    fn test_limit_is_respected() {
        let courses = courses_for("nothing relevant", 2);
        assert_eq!(courses.len(), 2);
    }

    #[test]
    fn test_full_match_has_no_courses() {
        let courses = courses_for("Docker and Kubernetes", 5);
        assert!(courses.is_empty());
    }

    #[test]
    fn test_no_careers_no_courses() {
        assert!(recommend_courses(&[], &sample_taxonomy(), 5).is_empty());
    }
}
