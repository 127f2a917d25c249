// Profile Generation Pipeline
// fetch -> compose -> complete, strictly in sequence

use crate::application::prompt::PromptComposer;
use crate::domain::ModSet;
use crate::error::Result;
use crate::port::{CompletionClient, GithubInfoFetcher};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The unit of work executed for every submitted job
pub struct ProfileGenerationJob {
    fetcher: Arc<dyn GithubInfoFetcher>,
    composer: PromptComposer,
    completion: Arc<dyn CompletionClient>,
}

impl ProfileGenerationJob {
    pub fn new(
        fetcher: Arc<dyn GithubInfoFetcher>,
        composer: PromptComposer,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            fetcher,
            composer,
            completion,
        }
    }

    /// Generate the profile text for `username`
    ///
    /// Exactly one fetch and one completion call per run; nothing is cached.
    #[instrument(skip(self), fields(mods = ?mods.names()))]
    pub async fn run(&self, username: &str, mods: &ModSet) -> Result<String> {
        let profile = self.fetcher.fetch(username).await?;
        info!(
            stars = profile.total_stars,
            language_bytes = profile.language_bytes.total(),
            has_readme = !profile.readme_text.is_empty(),
            "Fetched profile"
        );

        let prompt = self.composer.compose(&profile, mods);
        debug!(prompt_len = prompt.len(), "Composed prompt");

        let text = self.completion.complete(&prompt).await?;
        info!(text_len = text.len(), "Generated profile text");
        Ok(text)
    }
}
