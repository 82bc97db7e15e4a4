//! Rule-based assistant mode.
//!
//! No model behind it: user text is lowercased and matched against a static
//! pattern table. Story or poem requests switch a small context machine
//! into story mode, where "continue" serves the next canned installment and
//! anything else re-prompts.

mod rules;

pub use rules::{RuleEntry, FALLBACK, RULES, STORY_CONTINUATIONS, STORY_PROMPTS};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Conversation context carried between turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotContext {
    #[default]
    General,
    StoryMode,
}

/// A single assistant turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub text: String,
    pub context: BotContext,
}

/// Produce the reply to `input` given the current context.
pub fn respond<R: Rng>(input: &str, context: BotContext, rng: &mut R) -> BotReply {
    let lowered = input.to_lowercase();

    if context == BotContext::StoryMode {
        return if lowered.contains("continue") || lowered.contains("next part") {
            // Continuation served, context resets.
            BotReply {
                text: pick(STORY_CONTINUATIONS, rng),
                context: BotContext::General,
            }
        } else {
            BotReply {
                text: pick(STORY_PROMPTS, rng),
                context: BotContext::StoryMode,
            }
        };
    }

    for entry in RULES {
        for pattern in entry.patterns {
            if lowered.contains(pattern) {
                let context = if pattern.contains("story") || pattern.contains("poem") {
                    BotContext::StoryMode
                } else {
                    BotContext::General
                };
                return BotReply {
                    text: pick(entry.responses, rng),
                    context,
                };
            }
        }
    }

    BotReply {
        text: FALLBACK.to_string(),
        context: BotContext::General,
    }
}

/// Greeting shown when the assistant view opens.
pub fn greeting(name: Option<&str>) -> String {
    format!("Hello {}! How can I assist you today?", name.unwrap_or("Guest"))
}

fn pick<R: Rng>(options: &[&str], rng: &mut R) -> String {
    options.choose(rng).copied().unwrap_or(FALLBACK).to_string()
}

/// Stateful wrapper holding the context and its RNG.
pub struct BotSession {
    context: BotContext,
    rng: StdRng,
}

impl BotSession {
    pub fn new() -> Self {
        Self {
            context: BotContext::General,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic RNG for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            context: BotContext::General,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn context(&self) -> BotContext {
        self.context
    }

    pub fn reply(&mut self, input: &str) -> String {
        let reply = respond(input, self.context, &mut self.rng);
        self.context = reply.context;
        reply.text
    }
}

impl Default for BotSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greetings_match_case_insensitively() {
        let mut session = BotSession::with_seed(7);
        let reply = session.reply("HELLO over there");
        assert!(RULES[0].responses.contains(&reply.as_str()));
        assert_eq!(session.context(), BotContext::General);
    }

    #[test]
    fn story_requests_enter_story_mode_and_continue_resets_it() {
        let mut session = BotSession::with_seed(7);

        let opening = session.reply("please tell me a story");
        assert!(RULES[3].responses.contains(&opening.as_str()));
        assert_eq!(session.context(), BotContext::StoryMode);

        let next = session.reply("ok, next part please");
        assert!(STORY_CONTINUATIONS.contains(&next.as_str()));
        assert_eq!(session.context(), BotContext::General);
    }

    #[test]
    fn story_mode_re_prompts_on_unrelated_input() {
        let mut session = BotSession::with_seed(7);
        session.reply("write a poem for me");
        assert_eq!(session.context(), BotContext::StoryMode);

        let nudge = session.reply("what is the weather");
        assert!(STORY_PROMPTS.contains(&nudge.as_str()));
        assert_eq!(session.context(), BotContext::StoryMode);
    }

    #[test]
    fn unmatched_input_falls_back() {
        let mut session = BotSession::with_seed(7);
        assert_eq!(session.reply("qwertyuiop"), FALLBACK);
        assert_eq!(session.context(), BotContext::General);
    }

    #[test]
    fn greeting_personalises_or_defaults_to_guest() {
        assert_eq!(
            greeting(Some("Alice")),
            "Hello Alice! How can I assist you today?",
        );
        assert_eq!(greeting(None), "Hello Guest! How can I assist you today?");
    }
}
