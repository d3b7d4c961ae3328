//! Random identifiers: board seeds, game ids, player names and colors.

use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;

const ID_LEN: usize = 9;

const ADJECTIVES: &[&str] = &[
    "afraid", "bitter", "brave", "calm", "chilly", "clever", "cold", "cool", "curly", "dry",
    "eager", "empty", "fair", "fast", "fluffy", "fresh", "friendly", "funny", "gentle", "giant",
    "gold", "happy", "heavy", "honest", "huge", "jolly", "kind", "lazy", "little", "loud",
    "lucky", "mighty", "modern", "nice", "odd", "old", "polite", "proud", "quick", "quiet",
    "rare", "red", "rotten", "rude", "shaggy", "shy", "silly", "slimy", "slow", "smart",
    "smooth", "soft", "sour", "spicy", "stale", "strong", "sweet", "swift", "tall", "tame",
    "tasty", "tender", "thin", "tidy", "tough", "ugly", "warm", "weak", "wet", "wild", "wise",
    "young",
];

const ANIMALS: &[&str] = &[
    "ant", "ape", "badger", "bat", "bear", "bee", "bird", "bobcat", "bulldog", "bullfrog", "cat",
    "catfish", "cheetah", "chicken", "chipmunk", "cobra", "cow", "crab", "deer", "dingo", "dodo",
    "dog", "dolphin", "donkey", "dragon", "duck", "eagle", "eel", "elephant", "emu", "falcon",
    "fireant", "firefox", "fish", "fly", "fox", "frog", "gecko", "goat", "goose", "grasshopper",
    "horse", "hound", "husky", "impala", "insect", "jellyfish", "kangaroo", "ladybug", "liger",
    "lion", "lionfish", "lizard", "mayfly", "mole", "monkey", "moose", "moth", "mouse", "mule",
    "newt", "octopus", "otter", "owl", "panda", "panther", "parrot", "penguin", "pig", "puma",
    "quail", "rabbit", "rat", "rattlesnake", "robin", "seahorse", "sheep", "shrimp", "skunk",
    "sloth", "snail", "snake", "squid", "starfish", "stingray", "swan", "termite", "tiger",
    "treefrog", "turkey", "turtle", "vampirebat", "walrus", "warthog", "wasp", "wolverine",
    "wombat", "yak", "zebra",
];

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Fresh board seed.
pub fn random_seed() -> String {
    random_alphanumeric(ID_LEN)
}

/// Fresh game id.
pub fn random_game_id() -> String {
    random_alphanumeric(ID_LEN)
}

/// Human readable name like `brave-otter-42`.
pub fn random_username() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("nameless");
    let animal = ANIMALS.choose(&mut rng).copied().unwrap_or("player");
    format!("{adjective}-{animal}-{}", rng.gen_range(0..100))
}

/// Bright, saturated display color as `#rrggbb`.
pub fn random_color() -> String {
    let mut rng = rand::thread_rng();
    let hue = rng.gen_range(0.0..360.0);
    let saturation = rng.gen_range(0.55..0.95);
    let value = rng.gen_range(0.75..0.95);
    let (r, g, b) = hsv_to_rgb(hue, saturation, value);
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (u8, u8, u8) {
    let chroma = value * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u8 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    let channel = |c: f64| ((c + m) * 255.0).round() as u8;
    (channel(r), channel(g), channel(b))
}
