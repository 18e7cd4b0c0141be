//! Name truncation (AAMVA 2020, Annex A.7.7).
//!
//! Names longer than the field allows are shortened in three ordered phases,
//! each applied only while the name is still too long:
//!
//! 1. whitespace adjacent to a hyphen is removed, right to left;
//! 2. apostrophes are removed;
//! 3. the remaining characters are removed right to left, skipping hyphens,
//!    spaces and any character that directly follows a hyphen or a space.
//!
//! A name made only of protected characters can still be too long after
//! phase 3. It is then cut to the limit.
use serde::Serialize;

/// Maximum length of the family, first and middle name elements.
pub const NAME_LIMIT: usize = 40;

/// Outcome of [`truncate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Truncation {
    pub text: String,

    /// `'T'` if the name was shortened, `'N'` otherwise.
    pub truncated: char,
}

impl Truncation {
    pub fn is_truncated(&self) -> bool {
        self.truncated == 'T'
    }
}

pub fn truncate(value: &str, limit: usize) -> Truncation {
    let normalized = value.trim().to_uppercase();
    let mut chars: Vec<char> = normalized.chars().collect();

    if chars.len() <= limit {
        return Truncation {
            text: normalized,
            truncated: 'N',
        };
    }

    remove_hyphen_adjacent_whitespace(&mut chars);

    if chars.len() > limit {
        chars.retain(|&c| c != '\'');
    }

    if chars.len() > limit {
        remove_unprotected(&mut chars, limit);
    }

    if chars.len() > limit {
        chars.truncate(limit);
    }

    let text: String = chars.into_iter().collect();

    Truncation {
        text: text.trim().to_owned(),
        truncated: 'T',
    }
}

fn is_separator(c: char) -> bool {
    c == '-' || c.is_whitespace()
}

/// Phase 1.
fn remove_hyphen_adjacent_whitespace(chars: &mut Vec<char>) {
    loop {
        let found = (0..chars.len()).rev().find(|&i| {
            chars[i].is_whitespace()
                && ((i > 0 && chars[i - 1] == '-') || chars.get(i + 1) == Some(&'-'))
        });

        match found {
            Some(i) => {
                chars.remove(i);
            }
            None => break,
        }
    }
}

/// Phase 3.
///
/// Protection is decided on the string as it stands when the phase starts.
pub(crate) fn remove_unprotected(chars: &mut Vec<char>, limit: usize) {
    let protected: Vec<bool> = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| is_separator(c) || (i > 0 && is_separator(chars[i - 1])))
        .collect();

    let mut keep = vec![true; chars.len()];
    let mut len = chars.len();

    for i in (0..chars.len()).rev() {
        if len <= limit {
            break;
        }

        if !protected[i] {
            keep[i] = false;
            len -= 1;
        }
    }

    let mut i = 0;
    chars.retain(|_| {
        let k = keep[i];
        i += 1;
        k
    });
}
