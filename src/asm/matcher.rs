//! # Template matcher
//!
//! Template language, scanned in lock-step with the source line:
//! * space: optional whitespace on both sides
//! * `\c`: the source must have exactly `c`
//! * upper case letter: the source letter in either case
//! * `!!v`: capture a factor into variable `v`
//! * `!v`: capture an expression into `v`, if ` \c` follows then `c` ends the expression
//! * lower case letter: a symbol word that must be defined, its value goes into the variable
//! * anything else: must be equal
//!
//! Optional parts are bracketed by `[[` and `]]`.  `match_optional` removes groups in every
//! combination, fewest removed first, until the remaining template matches.

use super::expr::{Evaluator,Mode};
use super::text::{at,exact,skip_spaces,chars,symbol_word};

/// A template with its optional group boundaries
#[derive(Clone,Debug)]
pub struct Template {
    text: Vec<char>,
    /// span of each group including the brackets, ordered by opening position
    groups: Vec<(usize,usize)>,
    /// positions occupied by bracket markers
    markers: Vec<bool>
}

impl Template {
    pub fn new(t: &str) -> Self {
        let text = chars(t);
        let mut markers = vec![false;text.len()];
        let mut groups: Vec<(usize,usize)> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();
        let mut idx = 0;
        while idx < text.len() {
            if exact(&text,idx,"[[") {
                stack.push(groups.len());
                groups.push((idx,text.len()));
                markers[idx] = true;
                markers[idx+1] = true;
                idx += 2;
            } else if exact(&text,idx,"]]") {
                if let Some(g) = stack.pop() {
                    groups[g].1 = idx + 2;
                }
                markers[idx] = true;
                markers[idx+1] = true;
                idx += 2;
            } else {
                idx += 1;
            }
        }
        if stack.len() > 0 {
            log::warn!("unclosed optional group in `{}`",t);
        }
        Self { text, groups, markers }
    }
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
    /// Template text with the listed groups removed and all remaining brackets dropped
    pub fn reduced(&self,removed: &[usize]) -> Vec<char> {
        let mut ans = Vec::with_capacity(self.text.len());
        for (idx,c) in self.text.iter().enumerate() {
            if self.markers[idx] {
                continue;
            }
            if removed.iter().any(|g| idx >= self.groups[*g].0 && idx < self.groups[*g].1) {
                continue;
            }
            ans.push(*c);
        }
        ans
    }
}

/// Lexicographic k-combinations of `0..n`
pub struct Combinations {
    n: usize,
    curr: Option<Vec<usize>>
}

impl Combinations {
    pub fn new(n: usize,k: usize) -> Self {
        let curr = match k <= n {
            true => Some((0..k).collect()),
            false => None
        };
        Self { n, curr }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;
    fn next(&mut self) -> Option<Vec<usize>> {
        let ans = self.curr.clone()?;
        let k = ans.len();
        let mut next = ans.clone();
        let mut i = k;
        self.curr = loop {
            if i == 0 {
                break None;
            }
            i -= 1;
            if next[i] < self.n - k + i {
                next[i] += 1;
                for j in i+1..k {
                    next[j] = next[j-1] + 1;
                }
                break Some(next);
            }
        };
        Some(ans)
    }
}

/// Match `s` against a template without optional groups.
/// Captures go into the bind variables of the evaluator's context.
pub fn match_line(ev: &mut Evaluator,s: &[char],t: &[char]) -> bool {
    let save_mode = ev.mode();
    ev.set_mode(Mode::Pattern);
    let ans = match_inner(ev,s,t);
    ev.set_mode(save_mode);
    ans
}

fn match_inner(ev: &mut Evaluator,s: &[char],t: &[char]) -> bool {
    let mut is = 0;
    let mut it = 0;
    loop {
        is = skip_spaces(s,is);
        it = skip_spaces(t,it);
        let b = at(s,is);
        let a = at(t,it);
        if a == '\0' && b == '\0' {
            return true;
        }
        if a == '\\' {
            if at(t,it+1) != b || b == '\0' {
                return false;
            }
            it += 2;
            is += 1;
        } else if a.is_ascii_uppercase() {
            if b.to_ascii_uppercase() != a {
                return false;
            }
            it += 1;
            is += 1;
        } else if a == '!' {
            let v = at(t,it+1);
            if v == '!' {
                let v = at(t,it+2);
                it += 3;
                let (x,i) = ev.factor(s,is);
                is = i;
                ev.ctx().vars.put(v,x);
            } else {
                it = skip_spaces(t,it+2);
                let stop = match at(t,it) {
                    '\\' => {
                        it = skip_spaces(t,it+1);
                        at(t,it)
                    },
                    _ => '\0'
                };
                let (x,i) = ev.expression_until(s,is,stop);
                is = i;
                ev.ctx().vars.put(v,x);
            }
        } else if a.is_ascii_lowercase() {
            let (word,i) = symbol_word(s,is,&ev.ctx().charsets);
            let val = match ev.ctx().symbols.get(&word) {
                Some(val) => val,
                None => return false
            };
            ev.ctx().vars.put(a,val);
            it += 1;
            is = i;
        } else if a == b {
            it += 1;
            is += 1;
        } else {
            return false;
        }
    }
}

/// Match with optional groups, the first subset of groups whose removal yields a match wins.
/// Bind variables, unresolved labels, and faults start afresh on every trial.
pub fn match_optional(ev: &mut Evaluator,s: &[char],template: &Template) -> bool {
    let n = template.group_count();
    for k in 0..=n {
        for removed in Combinations::new(n,k) {
            ev.clear_unresolved();
            ev.clear_faults();
            ev.ctx().vars.reset();
            let t = template.reduced(&removed);
            if match_line(ev,s,&t) {
                log::trace!("matched `{}` with groups {:?} removed",t.iter().collect::<String>(),removed);
                return true;
            }
        }
    }
    false
}
