//! Row fragments: the structured text a host paints for each overlay row.

use input_core::find_ignore_case;

use crate::candidate::Candidate;

/// Types every topic carries; listing it adds nothing.
const GENERIC_TYPE: &str = "/common/topic";

pub const NO_MATCHES_TEXT: &str = "no matches";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineClass {
    Aliases,
    Name,
    Types,
    Domains,
    Properties,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    /// Part of the text that matched the query.
    pub emphasized: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub class: LineClass,
    pub spans: Vec<Span>,
}

impl Line {
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    pub lines: Vec<Line>,
}

impl Fragment {
    pub fn single(class: LineClass, text: impl Into<String>) -> Self {
        Self {
            lines: vec![Line {
                class,
                spans: vec![Span::plain(text)],
            }],
        }
    }

    pub fn line(&self, class: LineClass) -> Option<&Line> {
        self.lines.iter().find(|l| l.class == class)
    }

    /// Plain text of the first line of `class`.
    pub fn text(&self, class: LineClass) -> Option<String> {
        self.line(class).map(Line::text)
    }

    fn push(&mut self, class: LineClass, spans: Vec<Span>) {
        self.lines.push(Line { class, spans });
    }
}

/// Split `text` around the first case-insensitive occurrence of `query`.
///
/// An empty query, or one that doesn't occur, yields a single plain span.
pub fn emphasize(text: &str, query: &str) -> Vec<Span> {
    let Some((start, end)) = find_ignore_case(text, query) else {
        return vec![Span::plain(text)];
    };

    let mut spans = Vec::with_capacity(3);
    if start > 0 {
        spans.push(Span::plain(&text[..start]));
    }
    spans.push(Span {
        text: text[start..end].to_string(),
        emphasized: true,
    });
    if end < text.len() {
        spans.push(Span::plain(&text[end..]));
    }
    spans
}

/// Default search-row rendering: aliases, name, types, domains, properties.
///
/// Aliases and name are emphasized against `query`; empty sections are
/// omitted.
pub fn standard(candidate: &Candidate, query: &str) -> Fragment {
    let types = candidate
        .types
        .iter()
        .filter(|t| t.id.as_deref() != Some(GENERIC_TYPE))
        .map(|t| t.display_name())
        .collect::<Vec<_>>()
        .join(", ");
    let domains = candidate
        .domains
        .iter()
        .map(|d| d.display_name())
        .collect::<Vec<_>>()
        .join(", ");
    let aliases = candidate.aliases.join(", ");
    let props = candidate
        .properties
        .iter()
        .map(crate::options::param_text)
        .collect::<Vec<_>>()
        .join(", ");

    let mut frag = Fragment::default();
    if !aliases.is_empty() {
        frag.push(LineClass::Aliases, emphasize(&format!("({aliases})"), query));
    }
    frag.push(LineClass::Name, emphasize(candidate.display_name(), query));
    for (class, text) in [
        (LineClass::Types, types),
        (LineClass::Domains, domains),
        (LineClass::Properties, props),
    ] {
        if !text.is_empty() {
            frag.push(class, vec![Span::plain(text)]);
        }
    }
    frag
}

/// Enumeration rows show the name only, without emphasis.
pub fn name_only(candidate: &Candidate) -> Fragment {
    Fragment::single(LineClass::Name, candidate.display_name())
}

pub(crate) fn no_matches() -> Fragment {
    Fragment::single(LineClass::Name, NO_MATCHES_TEXT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::NamedRef;

    fn named(id: &str, name: &str) -> NamedRef {
        NamedRef {
            id: Some(id.into()),
            name: Some(name.into()),
            text: None,
        }
    }

    #[test]
    fn emphasize_marks_first_match_only() {
        let spans = emphasize("Film film", "fil");
        assert_eq!(
            spans,
            vec![
                Span {
                    text: "Fil".into(),
                    emphasized: true
                },
                Span::plain("m film"),
            ]
        );
        assert_eq!(emphasize("Film", ""), vec![Span::plain("Film")]);
        assert_eq!(emphasize("Film", "xyz"), vec![Span::plain("Film")]);
    }

    #[test]
    fn standard_row_skips_generic_type_and_empty_sections() {
        let mut c = Candidate::new("/en/alien", "Alien");
        c.types = vec![named("/common/topic", "Topic"), named("/film/film", "Film")];
        c.aliases = vec!["Alien 1979".into()];

        let frag = standard(&c, "ali");
        let classes: Vec<_> = frag.lines.iter().map(|l| l.class).collect();
        assert_eq!(
            classes,
            vec![LineClass::Aliases, LineClass::Name, LineClass::Types]
        );
        assert_eq!(frag.text(LineClass::Aliases).as_deref(), Some("(Alien 1979)"));
        assert_eq!(frag.text(LineClass::Types).as_deref(), Some("Film"));
        assert!(frag.line(LineClass::Name).unwrap().spans[0].emphasized);
    }

    #[test]
    fn name_line_without_query_is_plain() {
        let c = Candidate::new("/en/x", "Xanadu");
        let frag = standard(&c, "");
        assert_eq!(frag.lines.len(), 1);
        assert_eq!(frag.lines[0].spans, vec![Span::plain("Xanadu")]);
    }
}
