//! Default display names for new players.
//!
//! Names are `adjective_colour_animal`, e.g. `brave_teal_otter`.

use rand::seq::IndexedRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "able", "bold", "brave", "bright", "calm", "clever", "cosy", "curious", "daring", "eager",
    "fancy", "gentle", "happy", "honest", "jolly", "keen", "kind", "lively", "lucky", "merry",
    "mighty", "nimble", "noble", "patient", "proud", "quick", "quiet", "rapid", "shy", "silly",
    "smooth", "steady", "swift", "tidy", "witty", "zany",
];

const COLOURS: &[&str] = &[
    "amber", "azure", "beige", "black", "blue", "bronze", "coral", "crimson", "cyan", "gold",
    "gray", "green", "indigo", "ivory", "jade", "lavender", "lime", "magenta", "maroon", "olive",
    "orange", "pink", "plum", "purple", "red", "rose", "ruby", "salmon", "silver", "tan", "teal",
    "violet", "white", "yellow",
];

const ANIMALS: &[&str] = &[
    "badger", "bat", "bear", "beaver", "bison", "camel", "cat", "crane", "crow", "deer", "dolphin",
    "donkey", "eagle", "falcon", "ferret", "fox", "frog", "gecko", "goose", "hare", "hawk",
    "heron", "koala", "lemur", "lion", "llama", "lynx", "moose", "newt", "otter", "owl", "panda",
    "parrot", "puffin", "raven", "seal", "sloth", "swan", "tiger", "toad", "walrus", "wolf",
    "yak", "zebra",
];

fn pick<R: Rng + ?Sized>(rng: &mut R, words: &[&'static str]) -> &'static str {
    words.choose(rng).copied().unwrap_or("player")
}

/// Generate a name with the given RNG.
pub fn generate_name_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{}_{}_{}",
        pick(rng, ADJECTIVES),
        pick(rng, COLOURS),
        pick(rng, ANIMALS)
    )
}

/// Generate a name from the thread-local RNG.
pub fn generate_name() -> String {
    generate_name_with(&mut rand::rng())
}
