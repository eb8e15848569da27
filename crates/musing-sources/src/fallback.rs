//! Built-in quotes used when every provider fails.

use musing_core::Quote;
use rand::seq::SliceRandom;
use rand::Rng;

/// Source tag for built-in quotes.
pub const BUILT_IN: &str = "Built-in";

/// `(text, author)` pairs always available offline.
pub const FALLBACK_QUOTES: [(&str, &str); 5] = [
    (
        "The only way to do great work is to love what you do.",
        "Steve Jobs",
    ),
    (
        "Innovation distinguishes between a leader and a follower.",
        "Steve Jobs",
    ),
    (
        "The future belongs to those who believe in the beauty of their dreams.",
        "Eleanor Roosevelt",
    ),
    (
        "It is during our darkest moments that we must focus to see the light.",
        "Aristotle",
    ),
    (
        "Success is not final, failure is not fatal: it is the courage to continue that counts.",
        "Winston Churchill",
    ),
];

/// Every built-in quote, tagged with [`BUILT_IN`].
pub fn fallback_quotes() -> Vec<Quote> {
    FALLBACK_QUOTES
        .iter()
        .map(|(text, author)| Quote::new(*text, *author).with_source(BUILT_IN))
        .collect()
}

/// Pick a built-in quote uniformly at random.
pub fn random_fallback() -> Quote {
    random_fallback_with(&mut rand::thread_rng())
}

/// Pick a built-in quote uniformly at random using `rng`.
pub fn random_fallback_with<R: Rng + ?Sized>(rng: &mut R) -> Quote {
    let (text, author) = FALLBACK_QUOTES
        .choose(rng)
        .copied()
        .unwrap_or(FALLBACK_QUOTES[0]);
    Quote::new(text, author).with_source(BUILT_IN)
}

/// Whether `quote` is one of the built-in quotes.
pub fn is_fallback(quote: &Quote) -> bool {
    quote.source.as_deref() == Some(BUILT_IN)
        && FALLBACK_QUOTES
            .iter()
            .any(|(text, author)| quote.text == *text && quote.author == *author)
}
