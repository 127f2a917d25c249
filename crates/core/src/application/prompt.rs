// Prompt Composition

use crate::domain::{ModSet, ProfileQueryResult};

/// Tone requested from the generator
pub const DEFAULT_MOOD: &str = "professional";

/// Builds the completion prompt from a profile record.
///
/// Interpolated fields are inserted verbatim; nothing is escaped.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    mood: String,
}

impl PromptComposer {
    pub fn new(mood: impl Into<String>) -> Self {
        Self { mood: mood.into() }
    }

    pub fn mood(&self) -> &str {
        &self.mood
    }

    pub fn compose(&self, profile: &ProfileQueryResult, mods: &ModSet) -> String {
        let mut prompt = format!(
            "Based on my Github profile: \n  {readme}\n\
             - Write a more {mood} version of my GitHub Profile, I want also to use words from Never gonna give you up songs to show how good I am. Additional info:\n\
             - I Live in {location}\n\
             - I Have {stars} Github stars\n\
             - My bio: {bio}\n",
            readme = profile.readme_text,
            mood = self.mood,
            location = profile.location,
            stars = profile.total_stars,
            bio = profile.bio,
        );

        for m in mods.iter() {
            prompt.push_str(m.prompt_fragment());
            prompt.push('\n');
        }

        prompt
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(DEFAULT_MOOD)
    }
}
