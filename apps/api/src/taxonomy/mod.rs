//! Taxonomy Store: skill lexicon, career-path definitions, and course catalog.
//!
//! Reference data is plain JSON (see `default_taxonomy.json`) so it can be tuned
//! without touching matching logic. It is loaded and validated once at startup,
//! then shared read-only behind an `Arc`.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

const BUILTIN_TAXONOMY: &str = include_str!("default_taxonomy.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Technical,
    Soft,
    Domain,
    Tool,
}

/// A known skill. Identity is the lower-cased canonical `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub category: SkillCategory,
    #[serde(default)]
    pub aliases: BTreeSet<String>,
}

impl Skill {
    /// Canonical name followed by every alias.
    pub fn search_terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// A target role with weighted skill requirements. Weights are in (0, 1] and
/// need not sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerPath {
    pub name: String,
    pub required_skills: BTreeMap<String, f64>,
}

impl CareerPath {
    pub fn total_weight(&self) -> f64 {
        self.required_skills.values().sum()
    }

    pub fn weight_of(&self, skill: &str) -> Option<f64> {
        self.required_skills.get(skill).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub skill: String,
    pub title: String,
    pub provider: String,
    pub url: String,
}

/// The full reference data set. Iteration order of `skills` is the order the
/// matcher reports results in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    pub skills: Vec<Skill>,
    pub career_paths: Vec<CareerPath>,
    #[serde(default)]
    pub courses: Vec<CourseEntry>,
}

impl Taxonomy {
    /// The taxonomy compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_TAXONOMY).context("Built-in taxonomy is invalid")
    }

    /// Loads from `path` when given, otherwise falls back to the built-in data.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let taxonomy = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read taxonomy file {}", path.display()))?;
                Self::from_json_str(&raw)
                    .with_context(|| format!("Invalid taxonomy file {}", path.display()))?
            }
            None => Self::builtin()?,
        };

        info!(
            "Taxonomy loaded: {} skills, {} career paths, {} courses",
            taxonomy.skills.len(),
            taxonomy.career_paths.len(),
            taxonomy.courses.len()
        );
        Ok(taxonomy)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: Taxonomy = serde_json::from_str(raw).context("Malformed taxonomy JSON")?;
        let taxonomy = parsed.normalized()?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name == name)
    }

    /// Catalog entries for a skill, in catalog order.
    pub fn courses_for<'a>(&'a self, skill: &'a str) -> impl Iterator<Item = &'a CourseEntry> {
        self.courses.iter().filter(move |c| c.skill == skill)
    }

    /// Lower-cases and trims every skill reference so lookups are exact.
    fn normalized(mut self) -> Result<Self> {
        for skill in &mut self.skills {
            skill.name = canonical(&skill.name);
            let name = skill.name.clone();
            skill.aliases = skill
                .aliases
                .iter()
                .map(|a| canonical(a))
                .filter(|a| !a.is_empty() && *a != name)
                .collect();
        }

        for path in &mut self.career_paths {
            path.name = path.name.trim().to_string();
            let mut required = BTreeMap::new();
            for (skill, weight) in &path.required_skills {
                if required.insert(canonical(skill), *weight).is_some() {
                    bail!(
                        "Career path '{}' lists skill '{}' more than once",
                        path.name,
                        skill
                    );
                }
            }
            path.required_skills = required;
        }

        for course in &mut self.courses {
            course.skill = canonical(&course.skill);
        }

        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.skills.is_empty() {
            bail!("Taxonomy must define at least one skill");
        }

        let mut names = HashSet::new();
        for skill in &self.skills {
            if skill.name.is_empty() {
                bail!("Skill names must not be empty");
            }
            if !names.insert(skill.name.as_str()) {
                bail!("Duplicate skill '{}'", skill.name);
            }
        }

        let mut path_names = HashSet::new();
        for path in &self.career_paths {
            if path.name.is_empty() {
                bail!("Career path names must not be empty");
            }
            if !path_names.insert(path.name.as_str()) {
                bail!("Duplicate career path '{}'", path.name);
            }
            if path.required_skills.is_empty() {
                bail!("Career path '{}' has no required skills", path.name);
            }
            for (skill, weight) in &path.required_skills {
                if !names.contains(skill.as_str()) {
                    bail!(
                        "Career path '{}' requires unknown skill '{}'",
                        path.name,
                        skill
                    );
                }
                if !weight.is_finite() || *weight <= 0.0 || *weight > 1.0 {
                    bail!(
                        "Career path '{}' has weight {} for '{}' outside (0, 1]",
                        path.name,
                        weight,
                        skill
                    );
                }
            }
        }

        for course in &self.courses {
            if self.skill(&course.skill).is_none() {
                bail!(
                    "Course '{}' references unknown skill '{}'",
                    course.title,
                    course.skill
                );
            }
            if course.title.trim().is_empty() || course.url.trim().is_empty() {
                bail!("Courses for '{}' need a title and a url", course.skill);
            }
        }

        Ok(())
    }
}

/// Lower-cased with whitespace runs collapsed, matching normalized line text.
fn canonical(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"{
        "skills": [
            {"name": "Python", "category": "technical", "aliases": ["Python3", "python"]},
            {"name": "Leadership", "category": "soft"}
        ],
        "careerPaths": [
            {"name": " Data Engineer ", "requiredSkills": {"PYTHON": 1.0, "leadership": 0.3}}
        ],
        "courses": [
            {"skill": "Python", "title": "Intro to Python", "provider": "Acme", "url": "https://example.org/python"}
        ]
    }"#;

    #[test]
    fn test_builtin_taxonomy_loads() {
        let taxonomy = Taxonomy::builtin().unwrap();
        for name in ["python", "sql", "leadership", "javascript", "java"] {
            assert!(taxonomy.skill(name).is_some(), "missing builtin skill {name}");
        }
        assert!(!taxonomy.career_paths.is_empty());
        assert!(!taxonomy.courses.is_empty());
    }

    #[test]
    fn test_names_and_references_are_lowercased() {
        let taxonomy = Taxonomy::from_json_str(MINIMAL).unwrap();
        let python = taxonomy.skill("python").unwrap();
        assert_eq!(python.category, SkillCategory::Technical);
        // alias identical to the canonical name is dropped
        assert_eq!(python.aliases.iter().collect::<Vec<_>>(), vec!["python3"]);
        assert_eq!(taxonomy.career_paths[0].name, "Data Engineer");
        assert_eq!(taxonomy.career_paths[0].weight_of("python"), Some(1.0));
        assert_eq!(taxonomy.courses_for("python").count(), 1);
    }

    #[test]
    fn test_inner_whitespace_is_collapsed() {
        let raw = MINIMAL.replace("\"Python3\"", "\"Python  3\\t lang\"");
        let taxonomy = Taxonomy::from_json_str(&raw).unwrap();
        let python = taxonomy.skill("python").unwrap();
        assert!(python.aliases.contains("python 3 lang"));
    }

    #[test]
    fn test_search_terms_start_with_canonical_name() {
        let taxonomy = Taxonomy::from_json_str(MINIMAL).unwrap();
        let terms: Vec<_> = taxonomy.skill("python").unwrap().search_terms().collect();
        assert_eq!(terms, vec!["python", "python3"]);
    }

    #[test]
    fn test_rejects_weight_out_of_range() {
        for weight in ["0.0", "1.5", "-0.2"] {
            let raw = MINIMAL.replace("\"leadership\": 0.3", &format!("\"leadership\": {weight}"));
            assert!(Taxonomy::from_json_str(&raw).is_err(), "weight {weight} accepted");
        }
    }

    #[test]
    fn test_rejects_unknown_required_skill() {
        let raw = MINIMAL.replace("\"leadership\": 0.3", "\"kafka\": 0.3");
        let err = Taxonomy::from_json_str(&raw).unwrap_err();
        assert!(format!("{err:#}").contains("unknown skill 'kafka'"));
    }

    #[test]
    fn test_rejects_duplicate_skill() {
        let raw = MINIMAL.replace(
            "{\"name\": \"Leadership\", \"category\": \"soft\"}",
            "{\"name\": \"python\", \"category\": \"soft\"}",
        );
        assert!(Taxonomy::from_json_str(&raw).is_err());
    }

    #[test]
    fn test_rejects_course_for_unknown_skill() {
        let raw = MINIMAL.replace("\"skill\": \"Python\"", "\"skill\": \"Cobol\"");
        assert!(Taxonomy::from_json_str(&raw).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let taxonomy = Taxonomy::load(Some(file.path())).unwrap();
        assert_eq!(taxonomy.skills.len(), 2);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = Taxonomy::load(Some(Path::new("/nonexistent/taxonomy.json")));
        assert!(result.is_err());
    }
}
