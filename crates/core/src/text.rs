//! Text detection heuristic

/// Number of leading bytes sampled by [`looks_like_text`].
pub const TEXT_SAMPLE_LEN: usize = 1024;

/// Fraction of printable bytes above which content counts as text.
pub const TEXT_PRINTABLE_RATIO: f64 = 0.85;

/// Returns true when the sampled prefix of `content` is mostly printable.
///
/// Printable ASCII, tab, LF and CR count as printable, as does any byte at
/// or above 0x80 that starts a well-formed UTF-8 sequence. Empty content is
/// text.
pub fn looks_like_text(content: &[u8]) -> bool {
    if content.is_empty() {
        return true;
    }

    let sample = content.len().min(TEXT_SAMPLE_LEN);
    let mut printable = 0usize;
    let mut control = 0usize;

    for i in 0..sample {
        let b = content[i];
        match b {
            0x20..=0x7E | 0x09 | 0x0A | 0x0D => printable += 1,
            0x00..=0x1F | 0x7F => control += 1,
            _ => {
                if starts_utf8_sequence(content, i) {
                    printable += 1;
                } else {
                    control += 1;
                }
            }
        }
    }

    let total = printable + control;
    total == 0 || (printable as f64 / total as f64) > TEXT_PRINTABLE_RATIO
}

fn starts_utf8_sequence(content: &[u8], pos: usize) -> bool {
    let b = content[pos];
    let continuation = |n: usize| {
        pos + n < content.len() && (1..=n).all(|k| content[pos + k] & 0xC0 == 0x80)
    };

    if b & 0x80 == 0 {
        true
    } else if b & 0xE0 == 0xC0 {
        continuation(1)
    } else if b & 0xF0 == 0xE0 {
        continuation(2)
    } else if b & 0xF8 == 0xF0 {
        continuation(3)
    } else {
        // Continuation bytes of a sequence whose lead byte was already counted
        b & 0xC0 == 0x80
    }
}
