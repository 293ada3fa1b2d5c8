//! Call templates: `%1`..`%N`, `%*` and `%%`.

use crate::error::{CodegenError, CodegenResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// `%n`, 1-based.
    Arg(usize),
    /// `%*`: every argument from the given 1-based index to the last.
    Rest(usize),
}

/// A parsed call template, checked against the binding's arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<Segment>,
    pub arity: usize,
}

impl Template {
    /// Parse `text` for a binding taking `arity` arguments.
    ///
    /// `%*` expands to the arguments after the highest index used so far.
    pub fn parse(text: &str, arity: usize) -> CodegenResult<Template> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut highest = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            match chars.peek().copied() {
                None => return Err(CodegenError::IncompletePlaceholder { offset }),
                Some((_, '%')) => {
                    chars.next();
                    literal.push('%');
                }
                Some((_, '*')) => {
                    chars.next();
                    flush(&mut literal, &mut segments);
                    segments.push(Segment::Rest(highest + 1));
                    highest = arity.max(highest);
                }
                Some((_, d)) if d.is_ascii_digit() => {
                    let mut digits = String::new();
                    while let Some((_, d)) = chars.peek().copied().filter(|(_, d)| d.is_ascii_digit()) {
                        digits.push(d);
                        chars.next();
                    }
                    let index = digits.parse::<usize>().unwrap_or(usize::MAX);
                    if index == 0 || index > arity {
                        return Err(CodegenError::NoSuchArgument {
                            index,
                            arity,
                            offset,
                        });
                    }
                    flush(&mut literal, &mut segments);
                    segments.push(Segment::Arg(index));
                    highest = highest.max(index);
                }
                Some((_, other)) => {
                    return Err(CodegenError::BadPlaceholder {
                        text: other.to_string(),
                        offset,
                    })
                }
            }
        }
        flush(&mut literal, &mut segments);
        Ok(Template { segments, arity })
    }

    /// Substitute `args[i]` for `%(i + 1)`.
    pub fn render(&self, args: &[String]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Arg(index) => {
                    if let Some(arg) = args.get(index - 1) {
                        out.push_str(arg);
                    }
                }
                Segment::Rest(from) => {
                    let rest = args.get(from - 1..).unwrap_or_default();
                    if rest.is_empty() {
                        drop_trailing_separator(&mut out);
                    } else {
                        out.push_str(&rest.join(", "));
                    }
                }
            }
        }
        out
    }

    /// The 1-based argument indices the template uses, in first-use order.
    pub fn used_arguments(&self) -> Vec<usize> {
        let mut used = Vec::new();
        for segment in &self.segments {
            let range = match segment {
                Segment::Arg(index) => *index..*index + 1,
                Segment::Rest(from) => *from..self.arity + 1,
                Segment::Literal(_) => continue,
            };
            for index in range {
                if !used.contains(&index) {
                    used.push(index);
                }
            }
        }
        used
    }
}

/// Remove a `,` (and the whitespace around it) left before an empty `%*`.
fn drop_trailing_separator(out: &mut String) {
    let len = match out.trim_end().strip_suffix(',') {
        Some(before) => before.trim_end().len(),
        None => return,
    };
    out.truncate(len);
}

fn flush(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}
