use core::fmt::Write as _;

use crate::Key;

/// A path from the document root to the current token's slot.
pub type Path = Vec<Key>;

/// Builds a [`Path`] (or a pattern for
/// [`PullParser::path_match`](crate::PullParser::path_match)) from string
/// and integer literals.
///
/// ```
/// use jsonpull::{Key, path};
///
/// let p = path!["users", 0, "name"];
/// assert_eq!(p[1], Key::Index(0));
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::new()
    };
    ($($component:expr),+ $(,)?) => {
        vec![$($crate::Key::from($component)),+]
    };
}

/// Renders a path in dotted form: names joined with `.`, indices in
/// brackets. `["a", 0, "b"]` renders as `a[0].b`; the root path renders as
/// the empty string.
pub(crate) fn dotted(path: &[Key]) -> String {
    let mut out = String::new();
    for key in path {
        match key {
            Key::Name(name) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            Key::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
        }
    }
    out
}

/// True iff `pattern` occurs as a subsequence of `path`: a strictly
/// increasing sequence of positions whose keys equal the pattern in order.
/// Unmatched leading, trailing, and intervening keys are permitted.
pub(crate) fn matches(path: &[Key], pattern: &[Key]) -> bool {
    let mut wanted = pattern.iter();
    let mut next = wanted.next();
    for key in path {
        match next {
            None => break,
            Some(expected) if expected == key => next = wanted.next(),
            Some(_) => {}
        }
    }
    next.is_none()
}
