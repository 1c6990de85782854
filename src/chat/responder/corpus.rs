//! Canned assistant replies used in place of a language-model backend.

use rand::seq::SliceRandom;
use rand::Rng;

/// Fixed reply corpus.
pub const REPLY_CORPUS: [&str; 5] = [
    "Of course! Building an assistant like this from scratch is a large undertaking, but you can get surprisingly far by composing existing models and tools. Here's how I would approach it, from the most practical option to the most ambitious:",
    "The quickest route is to call a hosted model through its API. That lets you focus on the product:\n\n• **Chat:** a support bot, a personal assistant or a character.\n• **Writing:** drafts, summaries and rewrites.\n• **Analysis:** extracting key points from long documents.",
    "I'd be happy to help you explore different approaches. Which part are you most interested in implementing first?",
    "That's a great question! Let me break down the main components you'd need to think about before writing any code.",
    "A good first step is to sketch the conversation flow on paper: what the user asks, what context the assistant needs, and what it should answer. Everything else follows from that.",
];

/// Pick a reply uniformly from [`REPLY_CORPUS`].
#[must_use]
pub fn pick_reply<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    REPLY_CORPUS.choose(rng).copied().unwrap_or(REPLY_CORPUS[0])
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_pick_reply_comes_from_corpus() {
        let mut rng = rand::thread_rng();
        let picked: HashSet<&str> = (0..500).map(|_| pick_reply(&mut rng)).collect();
        assert!(picked.iter().all(|reply| REPLY_CORPUS.contains(reply)));
        assert!(picked.len() > 1);
    }
}
