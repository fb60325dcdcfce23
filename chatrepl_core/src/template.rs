//! Chat prompt templates.
//!
//! A template is a list of `(role, text)` pairs where the text may contain
//! `{name}` placeholders. `{{` and `}}` produce literal braces.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::{Role, Turn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unclosed placeholder starting at byte {0}")]
    UnclosedPlaceholder(usize),

    #[error("Unmatched '}}' at byte {0}")]
    UnmatchedClosingBrace(usize),

    #[error("Empty placeholder at byte {0}")]
    EmptyPlaceholder(usize),

    #[error("Missing value for template variable: {0}")]
    MissingVariable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

#[derive(Debug, Clone)]
struct MessageTemplate {
    role: Role,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    messages: Vec<MessageTemplate>,
}

impl PromptTemplate {
    pub fn from_messages(messages: &[(Role, &str)]) -> Result<Self, TemplateError> {
        let messages = messages
            .iter()
            .map(|(role, text)| {
                Ok(MessageTemplate {
                    role: *role,
                    segments: parse(text)?,
                })
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        Ok(Self { messages })
    }

    /// Names of all placeholders, sorted and deduplicated.
    #[must_use]
    pub fn input_variables(&self) -> Vec<&str> {
        self.messages
            .iter()
            .flat_map(|m| m.segments.iter())
            .filter_map(|s| match s {
                Segment::Variable(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn format_messages(&self, values: &HashMap<&str, &str>) -> Result<Vec<Turn>, TemplateError> {
        self.messages
            .iter()
            .map(|message| {
                let mut content = String::new();
                for segment in &message.segments {
                    match segment {
                        Segment::Literal(text) => content.push_str(text),
                        Segment::Variable(name) => {
                            let value = values
                                .get(name.as_str())
                                .ok_or_else(|| TemplateError::MissingVariable(name.clone()))?;
                            content.push_str(value);
                        }
                    }
                }
                Ok(Turn::new(message.role, content))
            })
            .collect()
    }
}

fn parse(text: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = text.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, next)| next == '{').is_some() {
                    literal.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    name.push(inner);
                }
                if !closed {
                    return Err(TemplateError::UnclosedPlaceholder(pos));
                }

                let name = name.trim();
                if name.is_empty() {
                    return Err(TemplateError::EmptyPlaceholder(pos));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name.to_string()));
            }
            '}' => {
                if chars.next_if(|&(_, next)| next == '}').is_none() {
                    return Err(TemplateError::UnmatchedClosingBrace(pos));
                }
                literal.push('}');
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
