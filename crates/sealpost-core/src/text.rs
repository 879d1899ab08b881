//! Text scanning helpers for classification and masking.
//!
//! Small, deterministic scanners over message bodies. These are the only
//! pattern primitives the rule table is allowed to use; both pipeline
//! sides classify through exactly this code.

/// True when the text contains a standalone digit run of length
/// `min..=max` (boundaries must be non-digits).
pub(crate) fn has_digit_run(text: &str, min: usize, max: usize) -> bool {
    first_digit_run(text, min, max).is_some()
}

/// First standalone digit run of length `min..=max`, if any.
pub(crate) fn first_digit_run(text: &str, min: usize, max: usize) -> Option<String> {
    let mut run = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            run.push(c);
            if chars.peek().is_some_and(char::is_ascii_digit) {
                continue;
            }
            if (min..=max).contains(&run.len()) {
                return Some(run);
            }
            run.clear();
        } else {
            run.clear();
        }
    }
    None
}

/// True when the lowercased text mentions a currency amount: a marker
/// (`rs`, `rs.`, `inr`, `₹`) adjacent to a number.
pub(crate) fn has_currency_amount(lower: &str) -> bool {
    let chars: Vec<char> = lower.chars().collect();
    !currency_number_spans(&chars).is_empty()
}

/// True when the lowercased text contains a masked account/card
/// reference (`xx` immediately followed by digits).
pub(crate) fn has_masked_account_ref(lower: &str) -> bool {
    let chars: Vec<char> = lower.chars().collect();
    !account_digit_spans(&chars).is_empty()
}

/// Summary truncation bound used by templates.
pub(crate) const SUMMARY_MAX_CHARS: usize = 200;

/// Truncate to [`SUMMARY_MAX_CHARS`] characters, appending `...` when cut.
pub(crate) fn truncate_summary(text: &str) -> String {
    if text.chars().count() <= SUMMARY_MAX_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(SUMMARY_MAX_CHARS - 3).collect();
    out.push_str("...");
    out
}

/// Mask sensitive values in a message body.
///
/// Masks currency amounts, digits of `XXnnnn` account/card references,
/// and any standalone run of four or more digits, then truncates to the
/// summary bound. The result is what leaves the system inside non-OTP
/// templates, so it must never contain a recoverable amount, balance, or
/// account number.
pub(crate) fn mask_sensitive(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let lower: Vec<char> = text.to_lowercase().chars().collect();

    // to_lowercase can change lengths for exotic scripts; fall back to
    // masking every digit run rather than producing misaligned spans.
    let mut spans = if lower.len() == chars.len() {
        let mut s = currency_number_spans(&lower);
        s.extend(account_digit_spans(&lower));
        s
    } else {
        Vec::new()
    };
    spans.extend(long_digit_run_spans(&chars));

    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    let mut next_span = merged.iter().copied().peekable();
    while i < chars.len() {
        if let Some(&(start, end)) = next_span.peek() {
            if i == start {
                out.push_str("****");
                i = end;
                next_span.next();
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    truncate_summary(&out)
}

/// Char spans of numbers adjacent to a currency marker.
fn currency_number_spans(lower: &[char]) -> Vec<(usize, usize)> {
    const MARKERS: [&[char]; 3] = [&['i', 'n', 'r'], &['r', 's'], &['₹']];

    let mut spans = Vec::new();
    for marker in MARKERS {
        let mut i = 0;
        while i + marker.len() <= lower.len() {
            if lower[i..i + marker.len()] != *marker {
                i += 1;
                continue;
            }
            let end = i + marker.len();
            // Word boundary before the marker ("hours" must not match "rs").
            if i > 0 && lower[i - 1].is_alphanumeric() {
                i = end;
                continue;
            }

            // Marker followed by a number: optional '.', optional spaces.
            let mut j = end;
            if j < lower.len() && lower[j] == '.' {
                j += 1;
            }
            while j < lower.len() && lower[j] == ' ' {
                j += 1;
            }
            if let Some(span) = number_span_at(lower, j) {
                spans.push(span);
                i = span.1;
                continue;
            }

            // Number followed by the marker ("500 INR").
            let mut k = i;
            while k > 0 && lower[k - 1] == ' ' {
                k -= 1;
            }
            if k > 0 && lower[k - 1].is_ascii_digit() {
                let start = number_span_start(lower, k - 1);
                spans.push((start, k));
            }
            i = end;
        }
    }
    spans
}

/// Number span `[at, end)` starting exactly at `at`: digits with embedded
/// separators (`,` / `.`) that are followed by further digits.
fn number_span_at(chars: &[char], at: usize) -> Option<(usize, usize)> {
    if at >= chars.len() || !chars[at].is_ascii_digit() {
        return None;
    }
    let mut end = at;
    while end < chars.len() {
        let c = chars[end];
        if c.is_ascii_digit() {
            end += 1;
        } else if (c == ',' || c == '.')
            && end + 1 < chars.len()
            && chars[end + 1].is_ascii_digit()
        {
            end += 1;
        } else {
            break;
        }
    }
    Some((at, end))
}

/// Walk back to the start of the number ending at `last` (inclusive).
fn number_span_start(chars: &[char], last: usize) -> usize {
    let mut start = last;
    while start > 0 {
        let c = chars[start - 1];
        if c.is_ascii_digit() || c == ',' || c == '.' {
            start -= 1;
        } else {
            break;
        }
    }
    start
}

/// Char spans of digits following an `xx` account/card mask.
fn account_digit_spans(lower: &[char]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut i = 0;
    while i + 2 < lower.len() {
        let boundary = i == 0 || !lower[i - 1].is_alphanumeric();
        if boundary && lower[i] == 'x' && lower[i + 1] == 'x' && lower[i + 2].is_ascii_digit() {
            let mut end = i + 2;
            while end < lower.len() && lower[end].is_ascii_digit() {
                end += 1;
            }
            spans.push((i + 2, end));
            i = end;
        } else {
            i += 1;
        }
    }
    spans
}

/// Char spans of standalone digit runs of length >= 4.
fn long_digit_run_spans(chars: &[char]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i - start >= 4 {
                spans.push((start, i));
            }
        } else {
            i += 1;
        }
    }
    spans
}
