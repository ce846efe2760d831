// Resume analysis pipeline.
// Implements: normalization, skill matching, experience estimation, scoring,
// career matching, suggestions, course recommendation.
// Only the orchestrator sees raw bytes; every other stage is a pure function.

pub mod career_matcher;
pub mod courses;
pub mod experience;
pub mod handlers;
pub mod normalizer;
pub mod orchestrator;
pub mod scorer;
pub mod skill_matcher;
pub mod suggestions;
