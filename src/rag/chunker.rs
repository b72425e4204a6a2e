//! Word-bounded document chunking.
//!
//! Splits a document into non-overlapping windows of at most `chunk_size`
//! whitespace-delimited words, joined by single spaces. The iterator is
//! lazy; calling [`word_chunks`] again restarts the sequence.

use std::str::SplitWhitespace;

pub fn word_chunks(text: &str, chunk_size: usize) -> WordChunks<'_> {
    WordChunks {
        words: text.split_whitespace(),
        chunk_size: chunk_size.max(1),
    }
}

pub struct WordChunks<'a> {
    words: SplitWhitespace<'a>,
    chunk_size: usize,
}

impl<'a> Iterator for WordChunks<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut chunk = String::new();
        let mut taken = 0;

        while taken < self.chunk_size {
            match self.words.next() {
                Some(word) => {
                    if taken > 0 {
                        chunk.push(' ');
                    }
                    chunk.push_str(word);
                    taken += 1;
                }
                None => break,
            }
        }

        if taken == 0 {
            None
        } else {
            Some(chunk)
        }
    }
}
