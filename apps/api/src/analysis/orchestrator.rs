//! Runs one document through the pipeline:
//! extract → normalize → match skills → estimate experience → score →
//! match careers → suggest → recommend courses.
//!
//! Stages run strictly in order and the first error aborts the run. Each
//! request gets its own `analysis{id}` tracing span; stage transitions are
//! logged inside it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::career_matcher::match_careers;
use crate::analysis::courses::recommend_courses;
use crate::analysis::experience::estimate_experience;
use crate::analysis::normalizer::normalize;
use crate::analysis::scorer::{score_resume, ScoringWeights};
use crate::analysis::skill_matcher::match_skills;
use crate::analysis::suggestions::generate_suggestions;
use crate::config::Config;
use crate::errors::AppError;
use crate::extraction::{MediaType, TextExtractor};
use crate::models::analysis::ResumeAnalysis;
use crate::taxonomy::Taxonomy;

/// Pipeline progress, used as the `stage` field in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Extracting,
    Normalizing,
    Matching,
    Scoring,
    Recommending,
    Done,
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnalysisStage::Extracting => "extracting",
            AnalysisStage::Normalizing => "normalizing",
            AnalysisStage::Matching => "matching",
            AnalysisStage::Scoring => "scoring",
            AnalysisStage::Recommending => "recommending",
            AnalysisStage::Done => "done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub extraction_timeout: Duration,
    pub max_courses: usize,
    pub weights: ScoringWeights,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        AnalyzerSettings::from(&Config::default())
    }
}

impl From<&Config> for AnalyzerSettings {
    fn from(config: &Config) -> Self {
        Self {
            extraction_timeout: Duration::from_secs(config.extraction_timeout_secs),
            max_courses: config.max_course_recommendations,
            weights: config.scoring_weights.clone(),
        }
    }
}

/// Owns the shared read-only taxonomy and the extraction backend. Cheap to
/// clone; concurrent analyses share nothing mutable.
#[derive(Clone)]
pub struct Analyzer {
    taxonomy: Arc<Taxonomy>,
    extractor: Arc<dyn TextExtractor>,
    settings: AnalyzerSettings,
}

impl Analyzer {
    pub fn new(
        taxonomy: Arc<Taxonomy>,
        extractor: Arc<dyn TextExtractor>,
        settings: AnalyzerSettings,
    ) -> Self {
        Self {
            taxonomy,
            extractor,
            settings,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Full pipeline over an uploaded document. `media_type` is re-checked
    /// here even when the caller already validated it.
    pub async fn analyze(&self, data: Bytes, media_type: &str) -> Result<ResumeAnalysis, AppError> {
        let id = Uuid::new_v4();
        let span = info_span!("analysis", %id);

        async move {
            info!(stage = %AnalysisStage::Extracting, bytes = data.len(), "Analysis started");

            let media_type: MediaType = media_type
                .parse()
                .map_err(|e| failed(AnalysisStage::Extracting, e))?;

            let text = self
                .extract_with_timeout(data, media_type)
                .await
                .map_err(|e| failed(AnalysisStage::Extracting, e))?;

            self.analyze_text(&text, Utc::now().date_naive())
        }
        .instrument(span)
        .await
    }

    /// Everything after extraction. `as_of` is the date "present" resolves to,
    /// so identical inputs always produce identical output.
    pub fn analyze_text(&self, text: &str, as_of: NaiveDate) -> Result<ResumeAnalysis, AppError> {
        debug!(stage = %AnalysisStage::Normalizing, chars = text.len());
        let doc = normalize(text).map_err(|e| failed(AnalysisStage::Normalizing, e))?;

        debug!(
            stage = %AnalysisStage::Matching,
            lines = doc.lines.len(),
            tokens = doc.tokens.len()
        );
        let skill_matches = match_skills(&doc, &self.taxonomy);
        let experience = estimate_experience(&doc, as_of);

        debug!(stage = %AnalysisStage::Scoring);
        let score = score_resume(&doc, &skill_matches, &self.taxonomy, &self.settings.weights);
        let career_matches = match_careers(&skill_matches, &self.taxonomy.career_paths);

        debug!(stage = %AnalysisStage::Recommending);
        let suggestions = generate_suggestions(&score, &career_matches, &skill_matches);
        let recommended_courses =
            recommend_courses(&career_matches, &self.taxonomy, self.settings.max_courses);

        let analysis = ResumeAnalysis {
            score,
            skill_matches,
            career_matches,
            suggestions,
            recommended_courses,
            experience_level: experience.level,
            total_years_of_experience: experience.total_years,
        };

        info!(
            stage = %AnalysisStage::Done,
            overall = analysis.score.overall,
            matched_skills = analysis.matched_skill_count(),
            top_career = analysis.top_career().map(|p| p.name.as_str()).unwrap_or("-"),
            level = %analysis.experience_level,
            "Analysis complete"
        );
        Ok(analysis)
    }

    async fn extract_with_timeout(
        &self,
        data: Bytes,
        media_type: MediaType,
    ) -> Result<String, AppError> {
        let timeout = self.settings.extraction_timeout;
        // Dropping the future stops waiting, not a parse already on the blocking
        // pool; `DocumentTextExtractor` bounds those with its permits.
        match tokio::time::timeout(timeout, self.extractor.extract(data, media_type)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(timeout.as_secs())),
        }
    }
}

fn failed(stage: AnalysisStage, err: AppError) -> AppError {
    warn!(stage = %stage, code = err.code(), "Analysis failed: {err}");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::experience::ExperienceLevel;
    use crate::analysis::fixtures::{sample_taxonomy, SAMPLE_RESUME};
    use crate::extraction::DocumentTextExtractor;
    use async_trait::async_trait;

    /// Returns a fixed text regardless of input, after an optional delay.
    struct StubExtractor {
        text: &'static str,
        delay: Duration,
    }

    #[async_trait]
    impl TextExtractor for StubExtractor {
        async fn extract(&self, _data: Bytes, _media_type: MediaType) -> Result<String, AppError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.text.to_string())
        }
    }

    fn analyzer_with(extractor: Arc<dyn TextExtractor>) -> Analyzer {
        Analyzer::new(
            Arc::new(sample_taxonomy()),
            extractor,
            AnalyzerSettings::default(),
        )
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    #[test]
    fn test_sample_resume_end_to_end() {
        let analyzer = analyzer_with(Arc::new(DocumentTextExtractor::default()));
        let analysis = analyzer.analyze_text(SAMPLE_RESUME, as_of()).unwrap();

        // every taxonomy skill is reported, in taxonomy order
        let names: Vec<_> = analysis
            .skill_matches
            .iter()
            .map(|m| m.skill.name.as_str())
            .collect();
        let expected: Vec<_> = sample_taxonomy()
            .skills
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(names, expected);

        let top = &analysis.career_matches[0];
        assert_eq!(top.path.name, "Data Analyst");
        assert_eq!(top.match_percentage, 100);

        // Jan 2020 - Present and Jun 2017 - Dec 2019 outweigh the stated 6 years
        assert_eq!(analysis.total_years_of_experience, 7.1);
        assert_eq!(analysis.experience_level, ExperienceLevel::Senior);

        assert_eq!(analysis.score.formatting, 100);
        assert_eq!(analysis.score.ats_compatibility, 100);
        assert!(analysis.score.overall >= 80);
        assert!(analysis.recommended_courses.is_empty());
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let analyzer = analyzer_with(Arc::new(DocumentTextExtractor::default()));
        let first = analyzer.analyze_text(SAMPLE_RESUME, as_of()).unwrap();
        let second = analyzer.analyze_text(SAMPLE_RESUME, as_of()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_skills_line_with_open_range() {
        let analyzer = analyzer_with(Arc::new(DocumentTextExtractor::default()));
        let analysis = analyzer
            .analyze_text("Skills: Python, SQL, Leadership\n2019 - Present", as_of())
            .unwrap();

        for name in ["python", "sql", "leadership"] {
            let m = analysis
                .skill_matches
                .iter()
                .find(|m| m.skill.name == name)
                .unwrap();
            assert!(m.matched, "{name} not matched");
        }
        // 2019-01-01 .. 2024-07-01
        assert_eq!(analysis.total_years_of_experience, 5.5);
        assert_eq!(analysis.experience_level, ExperienceLevel::Mid);
    }

    #[test]
    fn test_short_unstructured_text_gets_formatting_suggestion() {
        let analyzer = analyzer_with(Arc::new(DocumentTextExtractor::default()));
        let text = "I am a hard working person who likes computers and wants a job \
                    in a nice company with good people";
        let analysis = analyzer.analyze_text(text, as_of()).unwrap();
        assert!(analysis.score.formatting < 40);
        assert!(analysis
            .suggestions
            .iter()
            .any(|s| s == crate::analysis::suggestions::FORMATTING_SUGGESTION));
    }

    #[test]
    fn test_weak_resume_gets_suggestions_and_courses() {
        let analyzer = analyzer_with(Arc::new(DocumentTextExtractor::default()));
        let analysis = analyzer
            .analyze_text("I know some java and have used docker", as_of())
            .unwrap();
        assert!(!analysis.suggestions.is_empty());
        assert!(!analysis.recommended_courses.is_empty());
        assert!(analysis.recommended_courses.len() <= AnalyzerSettings::default().max_courses);
        assert_eq!(analysis.experience_level, ExperienceLevel::Entry);
    }

    #[tokio::test]
    async fn test_analyze_plain_text_bytes() {
        let analyzer = analyzer_with(Arc::new(DocumentTextExtractor::default()));
        let analysis = analyzer
            .analyze(Bytes::from_static(SAMPLE_RESUME.as_bytes()), "text/plain")
            .await
            .unwrap();
        assert_eq!(analysis.career_matches[0].path.name, "Data Analyst");
    }

    #[tokio::test]
    async fn test_whitespace_only_document_is_empty() {
        let analyzer = analyzer_with(Arc::new(DocumentTextExtractor::default()));
        let result = analyzer
            .analyze(Bytes::from_static(b"  \n\t \n "), "text/plain")
            .await;
        assert!(matches!(result, Err(AppError::EmptyDocument)));
    }

    #[tokio::test]
    async fn test_unsupported_media_type_is_rejected() {
        let analyzer = analyzer_with(Arc::new(DocumentTextExtractor::default()));
        let result = analyzer
            .analyze(Bytes::from_static(b"GIF89a"), "image/gif")
            .await;
        assert!(matches!(result, Err(AppError::UnsupportedMediaType(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_extraction_times_out() {
        let analyzer = analyzer_with(Arc::new(StubExtractor {
            text: SAMPLE_RESUME,
            delay: Duration::from_secs(120),
        }));
        let result = analyzer
            .analyze(Bytes::from_static(b"%PDF-1.7"), "application/pdf")
            .await;
        assert!(matches!(result, Err(AppError::Timeout(30))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_extraction_within_timeout_succeeds() {
        let analyzer = analyzer_with(Arc::new(StubExtractor {
            text: "Skills\npython, sql, excel",
            delay: Duration::from_secs(5),
        }));
        let analysis = analyzer
            .analyze(Bytes::from_static(b"%PDF-1.7"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(analysis.matched_skill_count(), 3);
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(AnalysisStage::Extracting.to_string(), "extracting");
        assert_eq!(AnalysisStage::Done.to_string(), "done");
    }
}
