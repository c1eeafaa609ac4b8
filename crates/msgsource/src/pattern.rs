//! Compiled message templates with positional placeholders

use crate::resolvable::MessageArg;

/// A single parsed template segment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Literal text emitted verbatim
    Literal(String),
    /// Positional placeholder written as `{N}`
    Placeholder(usize),
}

/// A message template parsed once and rendered many times
///
/// Compilation never fails: only `{N}` tokens with a decimal index become
/// placeholders, and every other brace sequence, including unclosed or
/// non-numeric ones, stays literal text. Instances are immutable after
/// construction and safe to render from multiple threads at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    segments: Vec<Segment>,
}

impl CompiledPattern {
    /// Parse a template into literal and placeholder segments
    pub fn compile(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let tail = &rest[open + 1..];
            let placeholder = tail
                .find('}')
                .and_then(|close| tail[..close].parse::<usize>().ok().map(|index| (index, close)));
            match placeholder {
                Some((index, close)) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(index));
                    rest = &tail[close + 1..];
                }
                None => {
                    literal.push('{');
                    rest = tail;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Self { segments }
    }

    /// Render the template against positional arguments
    ///
    /// A placeholder with no matching argument is emitted back in its `{N}`
    /// spelling instead of being dropped.
    pub fn render(&self, args: &[MessageArg]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(index) => match args.get(*index) {
                    Some(arg) => out.push_str(&arg.to_string()),
                    None => out.push_str(&format!("{{{index}}}")),
                },
            }
        }
        out
    }
}
