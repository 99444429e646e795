//! Structural checks on generated LaTeX. These are heuristics, not a compiler.

pub const DOCUMENT_CLASS: &str = "\\documentclass";
pub const DOCUMENT_END: &str = "\\end{document}";

/// True when `latex` opens with `\documentclass` and closes with `\end{document}`.
pub fn has_document_boundaries(latex: &str) -> bool {
    let latex = latex.trim();
    latex.starts_with(DOCUMENT_CLASS) && latex.ends_with(DOCUMENT_END)
}

/// True when every unescaped `{` has a matching `}`.
///
/// `\{` and `\}` are literal braces; `%` starts a comment unless escaped.
pub fn braces_balanced(latex: &str) -> bool {
    let mut depth: i64 = 0;
    for line in latex.lines() {
        let mut chars = line.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '%' => break,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
    }
    depth == 0
}
