//! Prompt templates for each writing mode.
//!
//! Every mode has a persona-style system instruction and a wrapper that turns
//! raw user input into the single user turn sent to the model. All of them
//! forbid bold markup: the output is meant to be pasted into a paper as-is.

use shared::WritingMode;

/// Closing line every wrapped prompt carries.
pub const NO_BOLD_RULE: &str = "Do not use bold formatting (no double asterisks).";

/// System instruction plus user-turn wrapper for one mode
#[derive(Clone, Copy, Debug)]
pub struct PromptTemplate {
    pub system_instruction: &'static str,
    wrapper: fn(&str) -> String,
}

impl PromptTemplate {
    /// Embed `input` verbatim into this mode's instructions. No escaping is
    /// done; quotes inside `input` are passed through as they are.
    pub fn wrap(&self, input: &str) -> String {
        (self.wrapper)(input)
    }
}

/// Get the template for a mode
pub fn lookup(mode: WritingMode) -> &'static PromptTemplate {
    match mode {
        WritingMode::Draft => &DRAFT_TEMPLATE,
        WritingMode::Refine => &REFINE_TEMPLATE,
        WritingMode::Academic => &ACADEMIC_TEMPLATE,
        WritingMode::Critique => &CRITIQUE_TEMPLATE,
    }
}

/// Example input used to pre-fill an empty input area.
pub fn sample(mode: WritingMode) -> &'static str {
    match mode {
        WritingMode::Draft => "The impact of Artificial Intelligence on modern education systems...",
        WritingMode::Refine => "So basically, AI is super cool but kinda scary cause it learns fast. We should probly be careful.",
        WritingMode::Academic => "The computer thinks like a human and that's a big deal for how we do stuff.",
        WritingMode::Critique => "It is a known fact that 90% of students use AI for homework. This proves traditional schooling is obsolete.",
    }
}

// ============================================================================
// Templates
// ============================================================================

static DRAFT_TEMPLATE: PromptTemplate = PromptTemplate {
    system_instruction: "You are Augustus, an expert academic writing assistant.
Your goal is to help students produce structured, high-quality first drafts from a topic or an outline.
Organize the response with clear headings, a logical progression and an academic tone.
Do not simply list facts; weave them into coherent arguments.

STYLE GUIDELINE: Do NOT use bold markdown syntax (double asterisks) for emphasis or headings. Use plain text, or markdown headers (#) only where necessary.",
    wrapper: wrap_draft,
};

static REFINE_TEMPLATE: PromptTemplate = PromptTemplate {
    system_instruction: "You are Augustus, a meticulous editor.
Your goal is to improve clarity, coherence and flow without changing the original meaning.
Remove redundancy, fix grammatical errors and vary sentence structure.

STYLE GUIDELINE: Do NOT use bold markdown syntax (double asterisks) in the output. Produce clean plain text suitable for an academic paper.",
    wrapper: wrap_refine,
};

static ACADEMIC_TEMPLATE: PromptTemplate = PromptTemplate {
    system_instruction: "You are Augustus, a specialist in academic style transfer.
Your goal is to raise the register of the text to what a university-level paper expects.
Replace colloquialisms with precise terminology, keep the language objective, and use passive or active voice as the discipline demands.

STYLE GUIDELINE: Do NOT use bold markdown syntax (double asterisks) in the output. Produce clean plain text.",
    wrapper: wrap_academic,
};

static CRITIQUE_TEMPLATE: PromptTemplate = PromptTemplate {
    system_instruction: "You are Augustus, a research supervisor.
Your goal is to find weak arguments, unsupported claims and places that need citations.
Do not rewrite the text. Give a bulleted list of specific feedback and mark exactly where citations are needed with [CITATION NEEDED].

STYLE GUIDELINE: Avoid bold markdown syntax (double asterisks). Use plain text or standard bullets.",
    wrapper: wrap_critique,
};

fn wrap_draft(input: &str) -> String {
    format!(
        "Write a comprehensive academic draft based on the following topic or outline:

\"{input}\"

Structure it with an introduction, body paragraphs with supporting arguments, and a conclusion. {NO_BOLD_RULE}"
    )
}

fn wrap_refine(input: &str) -> String {
    format!(
        "Refine the following text for better clarity and flow. Keep the original arguments but make the prose more polished. {NO_BOLD_RULE}

\"{input}\""
    )
}

fn wrap_academic(input: &str) -> String {
    format!(
        "Rewrite the following text to be formal and academic. Elevate the vocabulary and tone. {NO_BOLD_RULE}

\"{input}\""
    )
}

fn wrap_critique(input: &str) -> String {
    format!(
        "Analyze the following text without rewriting it. Identify unsupported claims that require citations and suggest improvements for logical strength. {NO_BOLD_RULE}

\"{input}\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_wrapper_quotes_input_and_forbids_bold() {
        let input = "Rome was not built in a day";
        for mode in WritingMode::all() {
            let prompt = lookup(*mode).wrap(input);
            assert!(
                prompt.contains(&format!("\"{}\"", input)),
                "{mode} prompt lost the quoted input"
            );
            assert!(prompt.contains(NO_BOLD_RULE), "{mode} prompt allows bold");
        }
    }

    #[test]
    fn test_every_system_instruction_forbids_double_asterisks() {
        for mode in WritingMode::all() {
            let instruction = lookup(*mode).system_instruction;
            assert!(instruction.starts_with("You are Augustus"));
            assert!(instruction.contains("double asterisks"), "{mode}");
        }
    }

    #[test]
    fn test_mode_specific_framing() {
        let draft = lookup(WritingMode::Draft).wrap("x");
        assert!(draft.contains("introduction"));
        assert!(draft.contains("conclusion"));

        let critique = lookup(WritingMode::Critique);
        assert!(critique.wrap("x").contains("without rewriting"));
        assert!(critique.system_instruction.contains("[CITATION NEEDED]"));

        assert!(lookup(WritingMode::Academic).wrap("x").contains("formal and academic"));
        assert!(lookup(WritingMode::Refine).wrap("x").contains("clarity and flow"));
    }

    #[test]
    fn test_input_is_not_escaped() {
        let input = "He said \"no\" and left\n\twithout a word";
        let prompt = lookup(WritingMode::Refine).wrap(input);
        assert!(prompt.contains(input));
    }

    #[test]
    fn test_lookup_is_idempotent() {
        for mode in WritingMode::all() {
            let a = lookup(*mode);
            let b = lookup(*mode);
            assert_eq!(a.system_instruction, b.system_instruction);
            assert_eq!(a.wrap("same input"), b.wrap("same input"));
        }
    }

    #[test]
    fn test_templates_are_distinct() {
        let instructions: Vec<_> = WritingMode::all()
            .iter()
            .map(|m| lookup(*m).system_instruction)
            .collect();
        for (i, a) in instructions.iter().enumerate() {
            for b in &instructions[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_samples_are_never_empty() {
        for mode in WritingMode::all() {
            assert!(!sample(*mode).trim().is_empty());
        }
    }
}
