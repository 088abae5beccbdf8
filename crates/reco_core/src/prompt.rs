use crate::error::{RecoError, Result};

const CONTEXT_SLOT: &str = "{context}";
const QUESTION_SLOT: &str = "{question}";

pub const HR_ASSISTANT_TEMPLATE: &str = "\
Vous êtes un assistant RH qui aide à analyser les données d'évaluation des employés et leurs suggestions.
Utilisez les informations contextuelles suivantes pour répondre à la question de l'utilisateur.
Si vous ne connaissez pas la réponse, dites simplement que vous ne savez pas.

Contexte: {context}

Question: {question}

Réponse:
";

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: HR_ASSISTANT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for slot in [CONTEXT_SLOT, QUESTION_SLOT] {
            if !template.contains(slot) {
                return Err(RecoError::Configuration(format!(
                    "prompt template has no {slot} placeholder"
                )));
            }
        }
        Ok(Self { template })
    }

    /// Fills both placeholders in one pass, so braces inside the context or
    /// the question are never treated as placeholders themselves.
    pub fn render(&self, context: &str, question: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();

        loop {
            let next_context = rest.find(CONTEXT_SLOT).map(|i| (i, CONTEXT_SLOT, context));
            let next_question = rest.find(QUESTION_SLOT).map(|i| (i, QUESTION_SLOT, question));
            let next = match (next_context, next_question) {
                (Some(c), Some(q)) => Some(if c.0 < q.0 { c } else { q }),
                (c, q) => c.or(q),
            };

            match next {
                Some((idx, slot, value)) => {
                    out.push_str(&rest[..idx]);
                    out.push_str(value);
                    rest = &rest[idx + slot.len()..];
                }
                None => {
                    out.push_str(rest);
                    return out;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_tells_model_to_admit_ignorance() {
        let prompt = PromptTemplate::default().render("", "Qui est Jean ?");
        assert!(prompt.contains("dites simplement que vous ne savez pas"));
        assert!(prompt.contains("Question: Qui est Jean ?"));
    }

    #[test]
    fn placeholders_inside_values_are_left_alone() {
        let template = PromptTemplate::new("C={context} Q={question}").unwrap();
        let out = template.render("{question}", "{context}?");
        assert_eq!(out, "C={question} Q={context}?");
    }

    #[test]
    fn template_without_slots_is_rejected() {
        assert!(PromptTemplate::new("Contexte: {context}").is_err());
        assert!(PromptTemplate::new("Question: {question}").is_err());
    }
}
