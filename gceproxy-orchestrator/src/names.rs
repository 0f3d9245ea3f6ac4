use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "amber", "bold", "brave", "breezy", "bright", "calm", "chilly", "clever", "cosmic", "crimson",
    "dizzy", "dusty", "eager", "fancy", "fluffy", "frosty", "gentle", "giddy", "golden", "happy",
    "hasty", "jolly", "lively", "lucky", "mellow", "misty", "nimble", "plucky", "quiet", "rusty",
    "shiny", "silly", "sleepy", "snappy", "spicy", "sunny", "swift", "tidy", "wild", "witty",
];

const NOUNS: &[&str] = &[
    "badger", "beetle", "bison", "cobra", "comet", "coyote", "crane", "falcon", "ferret", "finch",
    "gecko", "heron", "hornet", "jackal", "koala", "lemur", "lynx", "marmot", "moose", "narwhal",
    "otter", "panda", "parrot", "pelican", "puffin", "quokka", "raven", "salmon", "sparrow",
    "squid", "stork", "tapir", "thrush", "toucan", "turtle", "walrus", "weasel", "wombat", "yak",
    "zebra",
];

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 8;
const MAX_NAME_LEN: usize = 63;

/// Fresh instance name such as `jollyotter-k3x9q2ma`.
///
/// Collisions are possible but unlikely; a collision surfaces as a provider-side
/// creation error.
pub fn generate() -> String {
    generate_with(&mut rand::thread_rng())
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}{}-{}", adjective, noun, suffix)
}

/// Compute Engine resource name grammar: `[a-z]([-a-z0-9]{0,61}[a-z0-9])?`.
pub fn is_valid_instance_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    bytes.len() <= MAX_NAME_LEN
        && first.is_ascii_lowercase()
        && (last.is_ascii_lowercase() || last.is_ascii_digit())
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn generated_names_are_legal_and_distinct() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let name = generate();
            assert!(is_valid_instance_name(&name), "illegal name {}", name);
            assert!(seen.insert(name.clone()), "collision on {}", name);
        }
    }

    #[test]
    fn seeded_generator_is_reproducible() {
        let a = generate_with(&mut StdRng::seed_from_u64(7));
        let b = generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a, a.to_lowercase());
    }

    #[test]
    fn grammar_rejects_bad_names() {
        assert!(is_valid_instance_name("a"));
        assert!(is_valid_instance_name("web-01"));
        assert!(!is_valid_instance_name(""));
        assert!(!is_valid_instance_name("1abc"));
        assert!(!is_valid_instance_name("abc-"));
        assert!(!is_valid_instance_name("Upper"));
        assert!(!is_valid_instance_name("a/../b"));
        assert!(!is_valid_instance_name(&"a".repeat(64)));
    }
}
