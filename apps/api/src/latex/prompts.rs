// Template merge prompt templates.

pub const MERGE_SYSTEM: &str = r#"You are an expert LaTeX resume generator.

TASK:
You will receive:
1. A LaTeX TEMPLATE (.tex code)
2. A JSON resume object

Your job:
- Merge JSON content into the LaTeX template.
- Fill ONLY the sections that exist in the template.
- If JSON contains extra sections that template doesn't have, skip them.
- If template contains sections missing in JSON, delete or skip them gracefully.
- Do NOT hallucinate any content.
- Preserve the LaTeX formatting exactly as provided in the template.

STRICT OUTPUT RULE:
Return ONLY valid LaTeX code from \documentclass to \end{document}.
No explanations, no markdown, no comments.

MERGING RULES:
- Replace placeholders or section content with JSON fields even if formatting differs.
- Bullet points from JSON use the same LaTeX bullet style already inside the template.
- Multiple jobs, projects, skills: repeat the LaTeX item structures in the template.
- Maintain template style: fonts, spacing, commands, etc.
- Escape LaTeX-sensitive characters in inserted text: %, &, _, $, {, }, #, ^, ~.

Your output must be a SINGLE, fully formatted, compilable .tex file that uses
the template structure exactly and carries the JSON resume data."#;

/// User turn for a merge: the template between markers, then the record.
/// Both pieces are inserted verbatim, in a single pass.
pub fn merge_prompt(template: &str, resume_json: &str) -> String {
    format!(
        r#"Here is the LaTeX template:

===== TEMPLATE START =====
{template}
===== TEMPLATE END =====

Here is the JSON resume data:
{resume_json}

REMEMBER:
Output MUST begin with \documentclass and end with \end{{document}}.
Output MUST contain ONLY LaTeX: no markdown fencing, no commentary.

Generate the final LaTeX resume."#
    )
}
