//! Prompt templates and the grading tool.
//!
//! Templates use `{question}` and `{context}` placeholders, filled in a single pass so
//! placeholder-like text inside a value is left as is.

use serde_json::json;

use crate::tool_source::ToolSpec;

/// Name of the forced tool the grader answers through.
pub const GRADE_TOOL_NAME: &str = "give_relevance_score";

/// Asks for a binary relevance verdict on the retrieved documents.
pub const GRADE_PROMPT: &str = "You are a grader assessing relevance of retrieved docs to a user question.
Here are the retrieved docs:

 -------

{context}

 -------

Here is the user question: {question}

If the content of the docs are relevant to the users question, score them as relevant.
Give a binary score 'yes' or 'no' score to indicate whether the docs are relevant to the question.
Yes: The docs are relevant to the question.
No: The docs are not relevant to the question.";

/// Asks for a reformulated question.
pub const REWRITE_PROMPT: &str = "Look at the input and try to reason about the underlying semantic intent / meaning.

Here is the initial question:

 -------

{question}

 -------

Formulate an improved question:";

/// Asks for the final answer grounded in the retrieved context.
pub const GENERATE_PROMPT: &str = "You are an assistant for question-answering tasks. Use the following pieces of retrieved context to answer the question. If you don't know the answer, just say that you don't know. Use three sentences maximum and keep the answer concise.

Question: {question}

Context: {context}

Answer:";

/// Substitutes each `{name}` in `template`; values are inserted verbatim and never rescanned.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let hit = vars.iter().find_map(|(name, value)| {
            after
                .strip_prefix(name)
                .and_then(|r| r.strip_prefix('}'))
                .map(|r| (*value, r))
        });
        match hit {
            Some((value, remaining)) => {
                out.push_str(value);
                rest = remaining;
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn render_grade_prompt(question: &str, context: &str) -> String {
    render(GRADE_PROMPT, &[("question", question), ("context", context)])
}

pub fn render_rewrite_prompt(question: &str) -> String {
    render(REWRITE_PROMPT, &[("question", question)])
}

pub fn render_generate_prompt(question: &str, context: &str) -> String {
    render(GENERATE_PROMPT, &[("question", question), ("context", context)])
}

/// Tool whose only argument is `binary_score ∈ {"yes", "no"}`.
pub fn grade_tool_spec() -> ToolSpec {
    ToolSpec {
        name: GRADE_TOOL_NAME.to_string(),
        description: Some("Give a relevance score to the retrieved documents.".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "binary_score": {
                    "type": "string",
                    "enum": ["yes", "no"],
                    "description": "Relevance score 'yes' or 'no'"
                }
            },
            "required": ["binary_score"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Rendered prompts contain the question and context and no placeholders.
    #[test]
    fn render_fills_placeholders() {
        let g = render_grade_prompt("Q?", "DOCS");
        assert!(g.contains("Q?") && g.contains("DOCS"));
        assert!(!g.contains("{question}") && !g.contains("{context}"));
        let r = render_rewrite_prompt("Q?");
        assert!(r.contains("Q?") && !r.contains("{question}"));
        let a = render_generate_prompt("Q?", "DOCS");
        assert!(a.contains("Question: Q?") && a.contains("Context: DOCS"));
    }

    /// **Scenario**: Placeholder text inside retrieved docs or the question is not substituted.
    #[test]
    fn render_leaves_placeholders_inside_values() {
        let g = render_grade_prompt("QQQ", "doc text with {question} literal");
        assert!(g.contains("doc text with {question} literal"));
        assert!(g.contains("Here is the user question: QQQ"));
        let a = render_generate_prompt("about {context}?", "DOCS");
        assert!(a.contains("Question: about {context}?"));
        assert!(a.contains("Context: DOCS"));
        assert_eq!(render("{x} {y", &[("x", "1")]), "1 {y");
    }

    /// **Scenario**: Grade tool restricts binary_score to yes/no.
    #[test]
    fn grade_tool_enum() {
        let spec = grade_tool_spec();
        assert_eq!(spec.name, GRADE_TOOL_NAME);
        assert_eq!(
            spec.input_schema["properties"]["binary_score"]["enum"],
            json!(["yes", "no"])
        );
    }
}
