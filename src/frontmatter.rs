//! Splits a post's raw text into its frontmatter block and its body. The
//! frontmatter block is a run of `key: value` lines fenced by `---` lines at
//! the very top of the file:
//!
//! ```md
//! ---
//! title: Hello, world!
//! date: 2024-01-05
//! ---
//! # Hello
//! ```
//!
//! Nothing here fails. Input without a well-formed block yields an empty
//! [`Frontmatter`] and the input unchanged as the body.

use std::collections::HashMap;

const FENCE: &str = "---\n";

/// The key/value pairs parsed from a frontmatter block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frontmatter {
    fields: HashMap<String, String>,
}

impl Frontmatter {
    /// Returns the (trimmed) value for `key`, if the block defined it.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    // Lines without a colon are ignored; the first colon separates key from
    // value and a repeated key overwrites the earlier one.
    fn parse(block: &str) -> Frontmatter {
        let fields = block
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once(':')?;
                Some((key.trim().to_owned(), value.trim().to_owned()))
            })
            .collect();
        Frontmatter { fields }
    }
}

/// Splits `input` into its [`Frontmatter`] and body. The body is returned
/// exactly as it appears after the closing fence, without trimming.
pub fn split(input: &str) -> (Frontmatter, &str) {
    fn frontmatter_indices(input: &str) -> Option<(usize, usize, usize)> {
        if !input.starts_with(FENCE) {
            return None;
        }
        let offset = input[FENCE.len()..].find(FENCE)?;
        Some((
            FENCE.len(),                        // block_start
            FENCE.len() + offset,               // block_stop
            FENCE.len() + offset + FENCE.len(), // body_start
        ))
    }

    match frontmatter_indices(input) {
        Some((block_start, block_stop, body_start)) => (
            Frontmatter::parse(&input[block_start..block_stop]),
            &input[body_start..],
        ),
        None => (Frontmatter::default(), input),
    }
}
