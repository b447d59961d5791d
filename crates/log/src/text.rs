//! Text layout for the console banner: hanging-indent wrapping and the
//! three significant digit time format.

const SIGNIFICANT_DIGITS: i32 = 3;

/// Wraps `text` to `width` columns. The first line starts with `prefix`, the
/// following ones are indented by as many spaces as `prefix` has characters.
///
/// Words are packed greedily. A word longer than a whole line is split, at
/// its last fitting hyphen if it has one. Hyphenated words such as
/// `state-of-the-art` may break after their hyphens and `--` dashes between
/// words stand apart. Whitespace at a line break is dropped and every
/// whitespace character counts as one space. Empty text produces an empty
/// string.
pub fn fill(prefix: &str, text: &str, width: usize) -> String {
    let indent_len = prefix.chars().count();
    let indent = " ".repeat(indent_len);
    let line_width = width.saturating_sub(indent_len).max(1);

    let mut chunks = split_chunks(text);
    chunks.reverse();

    let mut lines: Vec<String> = vec![];
    while !chunks.is_empty() {
        let lead = if lines.is_empty() { prefix } else { &indent };

        if !lines.is_empty() && chunks.last().map_or(false, |c| is_space(c)) {
            chunks.pop();
        }

        let mut line: Vec<Vec<char>> = vec![];
        let mut line_len = 0;
        while let Some(chunk) = chunks.last() {
            if line_len + chunk.len() > line_width {
                break;
            }
            line_len += chunk.len();
            line.extend(chunks.pop());
        }

        if let Some(chunk) = chunks.last_mut() {
            if chunk.len() > line_width {
                let space_left = line_width - line_len;
                let end = match chunk[..space_left].iter().rposition(|&c| c == '-') {
                    Some(h) if h > 0 && chunk[..h].iter().any(|&c| c != '-') => h + 1,
                    _ => space_left,
                };
                line.push(chunk.drain(..end).collect());
            }
        }

        // an empty head from a full line is dropped in place of trailing space
        if line.last().map_or(false, |c| c.is_empty() || is_space(c)) {
            line.pop();
        }

        if !line.is_empty() {
            let body: String = line.into_iter().flatten().collect();
            lines.push(format!("{}{}", lead, body));
        }
    }

    lines.join("\n")
}

/// Alternating runs of non-whitespace and whitespace, every whitespace
/// character replaced by a plain space. Runs of non-whitespace are cut
/// further by [`split_word`].
fn split_chunks(text: &str) -> Vec<Vec<char>> {
    let mut runs: Vec<Vec<char>> = vec![];
    for c in text.chars() {
        let c = if c.is_whitespace() { ' ' } else { c };
        match runs.last_mut() {
            Some(run) if (run[0] == ' ') == (c == ' ') => run.push(c),
            _ => runs.push(vec![c]),
        }
    }
    runs.into_iter()
        .flat_map(|run| {
            if is_space(&run) {
                vec![run]
            } else {
                split_word(&run)
            }
        })
        .collect()
}

/// Cuts a word after each hyphen that joins two parts of letters and
/// around every `--` dash followed by a word character.
fn split_word(word: &[char]) -> Vec<Vec<char>> {
    let mut chunks = vec![];
    let mut pos = 0;
    while pos < word.len() {
        let dash = if pos > 0 && is_word_punct(word[pos - 1]) {
            dash_end(word, pos)
        } else {
            None
        };
        let end = dash.unwrap_or_else(|| {
            (pos + 1..word.len())
                .find_map(|j| {
                    if word[j] == '-' && breaks_after_hyphen(word, j) {
                        Some(j + 1)
                    } else if is_word_punct(word[j - 1]) && dash_end(word, j).is_some() {
                        Some(j)
                    } else {
                        None
                    }
                })
                .unwrap_or(word.len())
        });
        chunks.push(word[pos..end].to_vec());
        pos = end;
    }
    chunks
}

fn breaks_after_hyphen(word: &[char], j: usize) -> bool {
    let letter = |k: usize| word.get(k).map_or(false, |&c| is_letter(c));
    let hyphen = |k: usize| word.get(k) == Some(&'-');
    let before = (j >= 2 && letter(j - 1) && letter(j - 2))
        || (j >= 3 && letter(j - 1) && hyphen(j - 2) && letter(j - 3));
    let after = letter(j + 1) && (letter(j + 2) || (hyphen(j + 2) && letter(j + 3)));
    before && after
}

/// End of a run of two or more hyphens starting at `i`, if a word character
/// follows it.
fn dash_end(word: &[char], i: usize) -> Option<usize> {
    let len = word[i..].iter().take_while(|&&c| c == '-').count();
    let end = i + len;
    (len >= 2 && word.get(end).map_or(false, |&c| is_word(c))).then_some(end)
}

fn is_letter(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_word_punct(c: char) -> bool {
    is_word(c) || "!\"'&.,?".contains(c)
}

fn is_space(chunk: &[char]) -> bool {
    chunk.first() == Some(&' ')
}

/// Formats `secs` with three significant digits.
///
/// Fixed notation keeps at least one fractional digit (`1.0`, `12.3`,
/// `0.000123`); exponents below -4 or from 2 upwards switch to scientific
/// notation with a signed, two digit exponent (`1.5e-05`, `1.23e+02`).
pub fn format_seconds(secs: f64) -> String {
    if secs == 0.0 {
        return "0.0".to_string();
    }
    if !secs.is_finite() {
        return secs.to_string();
    }

    // Rounding to the target precision first settles the exponent, so 9.999
    // becomes 10.0 rather than 9.99.
    let sci = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, secs);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= SIGNIFICANT_DIGITS - 1 {
        let mantissa = strip_zeros(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exp) as usize;
        let fixed = format!("{:.*}", decimals, secs);
        let fixed = strip_zeros(&fixed);
        if fixed.contains('.') {
            fixed.to_string()
        } else {
            format!("{}.0", fixed)
        }
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
