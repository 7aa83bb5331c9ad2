//! Prompt templates for style analysis, guide generation, and chat coaching.
//!
//! These builders are deterministic string assembly only; no provider calls
//! happen here, which keeps every template unit-testable.

use quill_common::model::{Analysis, Clip, Feedback};

/// "Focus especially on: …" line, or empty when no areas were requested.
pub fn focus_areas_line(focus_areas: &[String]) -> String {
    if focus_areas.is_empty() {
        String::new()
    } else {
        format!("Focus especially on: {}", focus_areas.join(", "))
    }
}

/// Combined analysis over good examples (clips) and mistakes (feedback).
pub fn combined_analysis_prompt(
    clips: &[Clip],
    feedback: &[Feedback],
    focus_areas: &[String],
) -> String {
    let clips_text = clips
        .iter()
        .enumerate()
        .map(|(i, clip)| {
            format!(
                "\n=== GOOD EXAMPLE {} (Writing to emulate) ===\nContent: {}\nWhat the user likes about it: {}\n",
                i + 1,
                clip.content,
                clip.user_notes
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let feedback_text = feedback
        .iter()
        .enumerate()
        .map(|(i, fb)| {
            let context_line = fb
                .context
                .as_deref()
                .map(|c| format!("Context: {c}"))
                .unwrap_or_default();
            format!(
                "\n=== MISTAKE {} (Writing to avoid) ===\nUser's original text: {}\nEditor's feedback/correction: {}\n{}\n",
                i + 1,
                fb.my_text,
                fb.editor_feedback,
                context_line
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let good_section = if clips.is_empty() {
        String::new()
    } else {
        format!(
            "## GOOD EXAMPLES (Writing the user admires - learn what TO DO)\n{clips_text}"
        )
    };
    let mistakes_section = if feedback.is_empty() {
        String::new()
    } else {
        format!(
            "## MISTAKES & CORRECTIONS (Editor feedback on user's writing - learn what NOT TO DO)\n{feedback_text}"
        )
    };

    format!(
        r#"You are a writing style analyst. Analyze the following to create a comprehensive style profile.

{good_section}

{mistakes_section}

{focus}

Please analyze and provide:

1. **Patterns to Emulate** (from good examples):
   - Sentence structures that work
   - Effective rhetorical devices
   - Tone and voice characteristics
   - Strong word choices

2. **Patterns to Avoid** (from editor feedback):
   - Common mistakes identified
   - Bad habits to break
   - Word choices to avoid
   - Structural issues to fix

3. **Synthesis**: What makes good writing in this context, and what pitfalls to watch for.

Be specific with examples from both the good samples and the mistakes."#,
        focus = focus_areas_line(focus_areas)
    )
}

/// Style-guide generation over prior analyses, clip excerpts, and feedback.
pub fn style_guide_prompt(clips: &[Clip], analyses: &[Analysis], feedback: &[Feedback]) -> String {
    let analyses_text = analyses
        .iter()
        .map(|a| format!("\n=== Analysis ===\n{}", a.claude_response))
        .collect::<Vec<_>>()
        .join("\n");

    let clips_context = clips
        .iter()
        .map(|c| {
            format!(
                "\n- \"{}...\" (User likes: {})",
                truncate_chars(&c.content, 200),
                c.user_notes
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let feedback_context = feedback
        .iter()
        .map(|fb| {
            format!(
                "\n- My text: \"{}...\"\n  Editor said: \"{}\"",
                truncate_chars(&fb.my_text, 150),
                fb.editor_feedback
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let analyses_section = if analyses.is_empty() {
        String::new()
    } else {
        format!("## Previous Analyses:\n{analyses_text}")
    };
    let clips_section = if clips.is_empty() {
        String::new()
    } else {
        format!("## Good Writing Samples (to emulate):\n{clips_context}")
    };
    let feedback_section = if feedback.is_empty() {
        String::new()
    } else {
        format!("## Editor Feedback on My Writing (mistakes to avoid):\n{feedback_context}")
    };

    format!(
        r#"Based on the following writing analyses, samples, and editor feedback, create a comprehensive personal style guide.

{analyses_section}

{clips_section}

{feedback_section}

Create a style guide in markdown format with these sections:

# My Writing Style Guide

## Do This (Patterns to Follow)
[Specific techniques and patterns from the good examples, with concrete examples]

## Don't Do This (Mistakes to Avoid)
[Common errors based on editor feedback, with examples of what NOT to write and why]

## Sentence Patterns
[Key sentence structures that work well]

## Tone & Voice
[Voice and tone characteristics to maintain]

## Word Choice Guidelines
[Preferred vocabulary, words to use and words to avoid]

## Rhetorical Devices
[Effective devices with examples]

## Quick Reference Checklist
[Bullet point summary for quick editing passes]

Make it actionable and specific. Include concrete examples of both good and bad writing. This should help the writer self-edit and maintain consistency."#
    )
}

/// System prompt for the chat coach; embeds the active style guide when
/// one exists.
pub fn chat_system_prompt(style_guide_content: Option<&str>) -> String {
    match style_guide_content {
        Some(content) => format!(
            r#"You are a writing coach helping the user refine their personal writing style guide.

Current Style Guide:
{content}

The user can ask you to:
- Explain sections in more detail
- Add more examples
- Remove or modify parts
- Expand on specific techniques
- Generate alternative versions of sections

When they ask for changes, provide the updated content clearly marked. Be specific and actionable."#
        ),
        None => "You are a helpful writing coach.".to_string(),
    }
}

/// Truncate on a char boundary; multi-byte text must never split a code
/// point.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
