//! Project classification from repository signals.
//!
//! Classification is keyword-driven over the repository description and
//! topics, with a few structural signals (readme, tests, visibility) as
//! tie-breakers. It is best-effort: every fetch degrades independently and a
//! repository that can't be read at all classifies as `Learning`.

use std::collections::BTreeMap;

use crate::github::GitHubApi;
use crate::types::{ProjectKind, RepoRef};

const LEARNING_KEYWORDS: &[&str] = &[
    "learning", "tutorial", "practice", "course", "study", "beginner", "exercise",
];

const BUSINESS_KEYWORDS: &[&str] = &[
    "startup", "business", "saas", "app", "product", "launch", "mvp",
];

const EXPERIMENT_KEYWORDS: &[&str] = &["experiment", "poc", "prototype", "try", "test"];

const PORTFOLIO_KEYWORDS: &[&str] = &["portfolio", "showcase", "demo", "project"];

/// The signals classification looks at.
#[derive(Debug, Clone, Default)]
pub struct RepoSignals {
    pub description: String,
    pub topics: Vec<String>,
    pub languages: Vec<String>,
    pub has_readme: bool,
    pub has_tests: bool,
    pub has_package_manifest: bool,
    pub private: bool,
}

impl RepoSignals {
    fn description_mentions(&self, keywords: &[&str]) -> bool {
        let desc = self.description.to_lowercase();
        keywords.iter().any(|k| desc.contains(k))
    }

    fn topics_mention(&self, keywords: &[&str]) -> bool {
        self.topics.iter().any(|t| keywords.contains(&t.as_str()))
    }

    fn mentions(&self, keywords: &[&str]) -> bool {
        self.description_mentions(keywords) || self.topics_mention(keywords)
    }
}

/// Classifies a repository from its signals. Pure; rules apply in priority
/// order and fall back to `Learning`.
pub fn classify(signals: &RepoSignals) -> ProjectKind {
    if signals.mentions(LEARNING_KEYWORDS) {
        return ProjectKind::Learning;
    }

    // A public repo with both a readme and tests reads like something being
    // built for others, even without business keywords.
    if signals.mentions(BUSINESS_KEYWORDS)
        || (signals.has_readme && signals.has_tests && !signals.private)
    {
        return ProjectKind::SideHustle;
    }

    if signals.mentions(EXPERIMENT_KEYWORDS) {
        return ProjectKind::Experiment;
    }

    if signals.mentions(PORTFOLIO_KEYWORDS) || (signals.has_readme && signals.has_tests) {
        return ProjectKind::Portfolio;
    }

    ProjectKind::Learning
}

/// Fetches signals and classifies a repository.
///
/// The overview fetch failing classifies the project as `Learning`; the
/// auxiliary fetches (languages, topics, contents) degrade individually to
/// empty.
pub async fn detect_kind<G: GitHubApi>(github: &G, repo: &RepoRef) -> ProjectKind {
    let overview = match github.repo_overview(repo).await {
        Ok(overview) => overview,
        Err(err) => {
            tracing::warn!(repo = %repo, error = %err, "classification fetch failed, defaulting");
            return ProjectKind::Learning;
        }
    };

    let languages = github
        .repo_languages(repo)
        .await
        .unwrap_or_else(|_| BTreeMap::new());
    let topics = github.repo_topics(repo).await.unwrap_or_default();
    let entries = github.root_entries(repo).await.unwrap_or_default();

    let lowered: Vec<String> = entries.iter().map(|e| e.to_lowercase()).collect();
    let signals = RepoSignals {
        description: overview.description.unwrap_or_default(),
        topics,
        languages: languages.into_keys().collect(),
        has_readme: lowered.iter().any(|e| e.contains("readme")),
        has_tests: lowered.iter().any(|e| e.contains("test")),
        has_package_manifest: lowered.iter().any(|e| e == "package.json"),
        private: overview.private,
    };

    classify(&signals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals() -> RepoSignals {
        RepoSignals::default()
    }

    #[test]
    fn learning_keywords_win_first() {
        let s = RepoSignals {
            description: "A tutorial on async Rust".to_string(),
            ..signals()
        };
        assert_eq!(classify(&s), ProjectKind::Learning);
    }

    #[test]
    fn learning_beats_business_when_both_match() {
        let s = RepoSignals {
            description: "practice project for my startup idea".to_string(),
            ..signals()
        };
        assert_eq!(classify(&s), ProjectKind::Learning);
    }

    #[test]
    fn business_keywords_classify_side_hustle() {
        let s = RepoSignals {
            description: "SaaS for dog walkers".to_string(),
            ..signals()
        };
        assert_eq!(classify(&s), ProjectKind::SideHustle);
    }

    #[test]
    fn public_readme_plus_tests_reads_as_side_hustle() {
        let s = RepoSignals {
            has_readme: true,
            has_tests: true,
            private: false,
            ..signals()
        };
        assert_eq!(classify(&s), ProjectKind::SideHustle);
    }

    #[test]
    fn private_readme_plus_tests_is_portfolio() {
        let s = RepoSignals {
            has_readme: true,
            has_tests: true,
            private: true,
            ..signals()
        };
        assert_eq!(classify(&s), ProjectKind::Portfolio);
    }

    #[test]
    fn experiment_keywords_match_topics_exactly() {
        let s = RepoSignals {
            topics: vec!["poc".to_string()],
            ..signals()
        };
        assert_eq!(classify(&s), ProjectKind::Experiment);
    }

    #[test]
    fn portfolio_keywords_classify_portfolio() {
        let s = RepoSignals {
            description: "My personal showcase site".to_string(),
            ..signals()
        };
        assert_eq!(classify(&s), ProjectKind::Portfolio);
    }

    #[test]
    fn bare_repo_defaults_to_learning() {
        assert_eq!(classify(&signals()), ProjectKind::Learning);
    }

    #[test]
    fn topic_match_is_exact_not_substring() {
        // "protoype-kit" as a topic should not match "prototype"... and
        // neither should "testing" match "test" via the topic path.
        let s = RepoSignals {
            topics: vec!["testing-tools".to_string()],
            ..signals()
        };
        assert_eq!(classify(&s), ProjectKind::Learning);
    }
}
