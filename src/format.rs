#![cfg_attr(not(feature = "colored"), allow(unused_variables))]

#[cfg(feature = "colored")]
use colored::Colorize;
use core::fmt::{self, Write};

/// Expands `{name}` placeholders in `template` with values from `lookup`.
///
/// `{{` and `}}` escape literal braces. A placeholder with no matching key is
/// left in the output verbatim.
pub(crate) fn expand(template: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for ch in chars.by_ref() {
                    if ch == '}' {
                        closed = true;
                        break;
                    }
                    name.push(ch);
                }
                match lookup(&name) {
                    Some(value) if closed => out.push_str(&value),
                    _ => {
                        out.push('{');
                        out.push_str(&name);
                        if closed {
                            out.push('}');
                        }
                    }
                }
            }
            ch => out.push(ch),
        }
    }
    out
}

/// Display formatting of the history list.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Format {
    #[cfg(feature = "colored")]
    pub colored: bool,
    pub head: bool,
    pub saved: bool,
}

impl Default for Format {
    fn default() -> Self {
        Format {
            #[cfg(feature = "colored")]
            colored: true,
            head: true,
            saved: true,
        }
    }
}

impl Format {
    pub fn position(self, f: &mut fmt::Formatter, at: usize) -> fmt::Result {
        #[cfg(feature = "colored")]
        if self.colored {
            return write!(f, "{}", at.to_string().yellow().bold());
        }
        write!(f, "{at}")
    }

    pub fn labels(self, f: &mut fmt::Formatter, head: bool, saved: bool) -> fmt::Result {
        match (self.head && head, self.saved && saved) {
            (true, true) => {
                #[cfg(feature = "colored")]
                if self.colored {
                    return write!(
                        f,
                        " {}{}{} {}{}",
                        "[".yellow(),
                        "HEAD".cyan().bold(),
                        ",".yellow(),
                        "SAVED".green().bold(),
                        "]".yellow()
                    );
                }
                f.write_str(" [HEAD, SAVED]")
            }
            (true, false) => {
                #[cfg(feature = "colored")]
                if self.colored {
                    return write!(f, " {}{}{}", "[".yellow(), "HEAD".cyan().bold(), "]".yellow());
                }
                f.write_str(" [HEAD]")
            }
            (false, true) => {
                #[cfg(feature = "colored")]
                if self.colored {
                    return write!(
                        f,
                        " {}{}{}",
                        "[".yellow(),
                        "SAVED".green().bold(),
                        "]".yellow()
                    );
                }
                f.write_str(" [SAVED]")
            }
            (false, false) => Ok(()),
        }
    }

    pub fn message(self, f: &mut fmt::Formatter, text: &str) -> fmt::Result {
        let text = text.trim();
        if !text.is_empty() {
            f.write_char(' ')?;
            f.write_str(text)?;
        }
        Ok(())
    }

    #[cfg(feature = "chrono")]
    pub fn timestamp(
        self,
        f: &mut fmt::Formatter,
        timestamp: &chrono::DateTime<chrono::Utc>,
    ) -> fmt::Result {
        let string = timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        #[cfg(feature = "colored")]
        if self.colored {
            return write!(f, " {}", string.yellow());
        }
        write!(f, " {string}")
    }
}

#[cfg(test)]
mod tests {
    use super::expand;

    fn lookup(key: &str) -> Option<String> {
        match key {
            "pos" => Some("4".into()),
            "item" => Some("5".into()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_named_placeholders() {
        assert_eq!(expand("Add pos {pos}", &lookup), "Add pos 4");
        assert_eq!(expand("Add {item} at {pos}", &lookup), "Add 5 at 4");
    }

    #[test]
    fn escaped_braces() {
        assert_eq!(expand("{{pos}}", &lookup), "{pos}");
        assert_eq!(expand("a {{ b }} c", &lookup), "a { b } c");
    }

    #[test]
    fn unknown_placeholder_is_kept() {
        assert_eq!(expand("Add {missing}", &lookup), "Add {missing}");
    }

    #[test]
    fn unclosed_placeholder_is_kept() {
        assert_eq!(expand("Add {pos", &lookup), "Add {pos");
    }

    #[test]
    fn empty_template() {
        assert_eq!(expand("", &lookup), "");
    }
}
