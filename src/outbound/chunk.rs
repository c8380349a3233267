//! UTF-8-safe content splitting.
//!
//! The remote service caps a single message at a fixed byte budget. Long
//! content is sent as an ordered chunk sequence; a chunk boundary never falls
//! inside a multi-byte character, and the chunks concatenate back to the
//! original content.

/// Splits `content` into chunks of at most `limit` bytes, on character
/// boundaries.
///
/// Chunks are returned in order and concatenate back to `content`. If `limit`
/// is smaller than a single character's encoding, that character is emitted as
/// its own over-budget chunk so the split always makes progress.
pub fn split_utf8(content: &str, limit: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = content;

    while !rest.is_empty() {
        if rest.len() <= limit {
            chunks.push(rest);
            break;
        }
        let mut cut = limit;
        while cut > 0 && !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            // limit is below one character; take the character anyway
            cut = rest
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(rest.len());
        }
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn empty_content_yields_no_chunks() {
        assert!(split_utf8("", 600).is_empty());
    }

    #[test]
    fn short_content_is_a_single_chunk() {
        assert_eq!(split_utf8("hello", 600), vec!["hello"]);
    }

    #[test]
    fn ascii_splits_at_exact_limit() {
        let chunks = split_utf8("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn never_splits_a_multibyte_character() {
        // "é" is 2 bytes; a limit of 3 forces the boundary back to 2.
        let chunks = split_utf8("ééé", 3);
        assert_eq!(chunks, vec!["é", "é", "é"]);
    }

    #[test]
    fn limit_below_one_character_still_progresses() {
        let chunks = split_utf8("🌍🌍", 2);
        assert_eq!(chunks, vec!["🌍", "🌍"]);
    }

    #[test]
    fn random_multibyte_round_trip() {
        let palette: Vec<char> = "ab ,.0€éπ漢字мир🌍🚀".chars().collect();
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..50 {
            let len = rng.gen_range(0..2000);
            let content: String = (0..len)
                .map(|_| palette[rng.gen_range(0..palette.len())])
                .collect();
            let limit = rng.gen_range(4..=700);

            let chunks = split_utf8(&content, limit);
            assert_eq!(chunks.concat(), content);
            for chunk in &chunks {
                assert!(
                    chunk.len() <= limit,
                    "chunk of {} bytes exceeds limit {}",
                    chunk.len(),
                    limit
                );
            }
        }
    }
}
