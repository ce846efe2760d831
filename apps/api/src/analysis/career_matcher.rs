//! Career Matcher: ranks career paths by weighted overlap between the matched
//! skills and each path's required skills.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::analysis::skill_matcher::SkillMatch;
use crate::taxonomy::CareerPath;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerMatch {
    pub path: CareerPath,
    pub match_percentage: u32,
    /// Unmatched required skills, heaviest first, then by name.
    pub missing_skills: Vec<String>,
}

/// Scores every path and sorts by `match_percentage` descending, then path
/// name ascending. Paths with no overlap stay in the list at 0%.
pub fn match_careers(matches: &[SkillMatch], paths: &[CareerPath]) -> Vec<CareerMatch> {
    let matched: HashSet<&str> = matches
        .iter()
        .filter(|m| m.matched)
        .map(|m| m.skill.name.as_str())
        .collect();

    let mut results: Vec<CareerMatch> = paths
        .iter()
        .map(|path| {
            let total = path.total_weight();
            let covered: f64 = path
                .required_skills
                .iter()
                .filter(|(skill, _)| matched.contains(skill.as_str()))
                .map(|(_, weight)| weight)
                .sum();

            let match_percentage = if total > 0.0 {
                ((100.0 * covered / total).round() as u32).min(100)
            } else {
                0
            };

            let mut missing: Vec<(&String, f64)> = path
                .required_skills
                .iter()
                .filter(|(skill, _)| !matched.contains(skill.as_str()))
                .map(|(skill, weight)| (skill, *weight))
                .collect();
            missing.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

            CareerMatch {
                path: path.clone(),
                match_percentage,
                missing_skills: missing.into_iter().map(|(s, _)| s.clone()).collect(),
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.match_percentage
            .cmp(&a.match_percentage)
            .then_with(|| a.path.name.cmp(&b.path.name))
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::sample_taxonomy;
    use crate::analysis::normalizer::normalize;
    use crate::analysis::skill_matcher::match_skills;

    fn careers_for(text: &str) -> Vec<CareerMatch> {
        let taxonomy = sample_taxonomy();
        let doc = normalize(text).unwrap();
        let matches = match_skills(&doc, &taxonomy);
        match_careers(&matches, &taxonomy.career_paths)
    }

    fn find<'a>(careers: &'a [CareerMatch], name: &str) -> &'a CareerMatch {
        careers.iter().find(|c| c.path.name == name).unwrap()
    }

    #[test]
    fn test_weighted_percentage() {
        // Data Analyst: sql 1.0, excel 0.9, python 0.5 → (1.0 + 0.5) / 2.4 = 62.5% → 63
        let careers = careers_for("SQL and Python");
        assert_eq!(find(&careers, "Data Analyst").match_percentage, 63);
    }

    #[test]
    fn test_missing_skills_ordered_by_weight_then_name() {
        let careers = careers_for("nothing relevant");
        let devops = find(&careers, "DevOps Engineer");
        // docker and kubernetes share weight 1.0 → alphabetical
        assert_eq!(devops.missing_skills, vec!["docker", "kubernetes"]);
        let analyst = find(&careers, "Data Analyst");
        assert_eq!(analyst.missing_skills, vec!["sql", "excel", "python"]);
    }

    #[test]
    fn test_sorted_by_percentage_then_name() {
        let careers = careers_for("Docker, Kubernetes, Java");
        for pair in careers.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.match_percentage >= b.match_percentage);
            if a.match_percentage == b.match_percentage {
                assert!(a.path.name < b.path.name);
            }
        }
        assert_eq!(careers[0].path.name, "DevOps Engineer");
        assert_eq!(careers[0].match_percentage, 100);
        assert!(careers[0].missing_skills.is_empty());
    }

    #[test]
    fn test_zero_percent_paths_are_kept() {
        let taxonomy = sample_taxonomy();
        let careers = careers_for("nothing relevant");
        assert_eq!(careers.len(), taxonomy.career_paths.len());
        assert!(careers.iter().all(|c| c.match_percentage == 0));
        // all tied at 0 → pure name order
        let names: Vec<_> = careers.iter().map(|c| c.path.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_shared_skills_count_toward_several_paths() {
        let careers = careers_for("SQL");
        assert!(find(&careers, "Data Analyst").match_percentage > 0);
        assert!(find(&careers, "Backend Developer").match_percentage > 0);
    }

    #[test]
    fn test_empty_paths() {
        assert!(match_careers(&[], &[]).is_empty());
    }
}
