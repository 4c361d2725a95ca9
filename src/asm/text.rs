//! Character level helpers shared by the matcher, the evaluator, and the directives.
//!
//! Lines are handled as `&[char]` so that indices can be carried between components.
//! Reading past the end yields NUL, which no grammar rule accepts.

use regex::Regex;
use std::sync::OnceLock;

static MULTI_SPACE: OnceLock<Regex> = OnceLock::new();

pub fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

/// character at `idx`, or NUL if out of range
pub fn at(s: &[char],idx: usize) -> char {
    match s.get(idx) {
        Some(c) => *c,
        None => '\0'
    }
}

/// Case-insensitive test for `t` at `idx`, only ASCII lower case is folded
pub fn q(s: &[char],idx: usize,t: &str) -> bool {
    let mut i = idx;
    for c in t.chars() {
        if at(s,i).to_ascii_uppercase() != c.to_ascii_uppercase() {
            return false;
        }
        i += 1;
    }
    true
}

/// Exact test for `t` at `idx`
pub fn exact(s: &[char],idx: usize,t: &str) -> bool {
    let mut i = idx;
    for c in t.chars() {
        if at(s,i) != c {
            return false;
        }
        i += 1;
    }
    true
}

pub fn skip_spaces(s: &[char],mut idx: usize) -> usize {
    while at(s,idx) == ' ' {
        idx += 1;
    }
    idx
}

pub fn collect(s: &[char],beg: usize,end: usize) -> String {
    let end = usize::min(end,s.len());
    if beg >= end {
        return String::new();
    }
    s[beg..end].iter().collect()
}

/// Runs of 2 or more whitespace characters become one space
pub fn reduce_spaces(text: &str) -> String {
    let re = MULTI_SPACE.get_or_init(|| Regex::new(r"\s{2,}").expect("regex parsing error"));
    re.replace_all(text," ").to_string()
}

/// Strip a `/* ... */` comment.  If the comment is not closed on the same line
/// everything from the opener on is dropped.
pub fn remove_block_comment(line: &str) -> String {
    let mut ans = line.to_string();
    while let Some(beg) = ans.find("/*") {
        match ans[beg+2..].find("*/") {
            Some(len) => ans.replace_range(beg..beg+2+len+2,""),
            None => ans.truncate(beg)
        }
    }
    ans
}

/// Strip a `;` comment and trailing space
pub fn remove_line_comment(line: &str) -> String {
    match line.find(';') {
        Some(i) => line[0..i].trim_end().to_string(),
        None => line.trim_end().to_string()
    }
}

/// Word up to the next space, leading spaces skipped
pub fn param_to_space(s: &[char],idx: usize) -> (String,usize) {
    let beg = skip_spaces(s,idx);
    let mut end = beg;
    while end < s.len() && s[end] != ' ' {
        end += 1;
    }
    (collect(s,beg,end),end)
}

/// Text up to the end of line or the next `!!` chain marker, leading spaces skipped
pub fn param_to_chain(s: &[char],idx: usize) -> (String,usize) {
    let beg = skip_spaces(s,idx);
    let mut end = beg;
    while end < s.len() && !exact(s,end,"!!") {
        end += 1;
    }
    (collect(s,beg,end),end)
}

/// Contents of a double quoted string, escapes are left alone.
/// Returns None if the text does not start with a quote.
pub fn quoted(text: &str) -> Option<String> {
    let s = chars(text);
    let mut idx = skip_spaces(&s,0);
    if at(&s,idx) != '"' {
        return None;
    }
    idx += 1;
    let mut ans = String::new();
    while idx < s.len() && s[idx] != '"' {
        ans.push(s[idx]);
        idx += 1;
    }
    Some(ans)
}

/// Read a label word starting at `idx`, a trailing colon is consumed if `colon` is set.
/// The first character must be `.` or a non-digit label character.
pub fn label_word(s: &[char],idx: usize,label_chars: &super::CharSets,colon: bool) -> (String,usize) {
    let c = at(s,idx);
    if c != '.' && (c.is_ascii_digit() || !label_chars.is_label(c)) {
        return (String::new(),idx);
    }
    let mut end = idx + 1;
    while label_chars.is_label(at(s,end)) {
        end += 1;
    }
    let ans = collect(s,idx,end);
    if colon && at(s,end) == ':' {
        end += 1;
    }
    (ans,end)
}

/// Read a symbol word starting at `idx`, the result is upper case
pub fn symbol_word(s: &[char],idx: usize,charsets: &super::CharSets) -> (String,usize) {
    let c = at(s,idx);
    if c.is_ascii_digit() || !charsets.is_symbol(c) {
        return (String::new(),idx);
    }
    let mut end = idx + 1;
    while charsets.is_symbol(at(s,end)) {
        end += 1;
    }
    (collect(s,idx,end).to_uppercase(),end)
}
