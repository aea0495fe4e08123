//! Completion sanitization
//!
//! Models wrap code in markdown fences and commentary no matter how
//! firmly the prompt forbids it. Sanitization strips that wrapping to
//! isolate a candidate source block. It never fails: worst case the
//! result later fails to compile, which is a normal admission outcome.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Optional language tag after the opening fence, e.g. ```python
    static ref FENCED_BLOCK: Regex =
        Regex::new(r"(?s)```[a-zA-Z0-9_+\-]*[ \t]*\r?\n?(.*?)```").expect("static regex");
}

/// Extract a best-effort source block from raw completion text
///
/// If fenced code blocks are present, only their contents survive,
/// concatenated in order; everything outside fences is discarded.
/// Otherwise the raw text is returned trimmed. Idempotent.
pub fn sanitize(raw: &str) -> String {
    let mut saw_fence = false;
    let mut blocks: Vec<&str> = Vec::new();
    for captures in FENCED_BLOCK.captures_iter(raw) {
        if let Some(m) = captures.get(1) {
            saw_fence = true;
            let content = m.as_str().trim();
            if !content.is_empty() {
                blocks.push(content);
            }
        }
    }
    if saw_fence {
        blocks.join("\n\n")
    } else {
        raw.trim().to_string()
    }
}
