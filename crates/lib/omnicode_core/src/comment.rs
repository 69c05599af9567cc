//! Wrap generated documentation in the comment syntax of a language.

/// Comment framing used for a language family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `"""text"""`
    Docstring,
    /// `/*` … ` * line` … ` */`
    Block,
    /// `/**` … ` * line` … ` */`
    Javadoc,
    /// `<!--` … ` line` … `-->`
    Html,
    /// `// line` for every line.
    Line,
}

impl CommentStyle {
    /// Style for an editor language id. Unknown ids fall back to [`CommentStyle::Line`].
    pub fn for_language(language: &str) -> Self {
        match language {
            "python" => CommentStyle::Docstring,
            "javascript" | "typescript" | "cpp" | "c" => CommentStyle::Block,
            "java" | "csharp" => CommentStyle::Javadoc,
            "html" => CommentStyle::Html,
            _ => CommentStyle::Line,
        }
    }

    fn framing(&self) -> (&'static str, &'static str, &'static str) {
        // (opening line, per-line prefix, closing line)
        match self {
            CommentStyle::Block => ("/*", " * ", " */"),
            CommentStyle::Javadoc => ("/**", " * ", " */"),
            CommentStyle::Html => ("<!--", " ", "-->"),
            CommentStyle::Docstring | CommentStyle::Line => ("", "", ""),
        }
    }

    pub fn wrap(&self, text: &str) -> String {
        match self {
            CommentStyle::Docstring => format!("\"\"\"{text}\"\"\""),
            CommentStyle::Line => text
                .split('\n')
                .map(|line| format!("// {line}"))
                .collect::<Vec<_>>()
                .join("\n"),
            CommentStyle::Block | CommentStyle::Javadoc | CommentStyle::Html => {
                let (open, prefix, close) = self.framing();
                let body = text
                    .split('\n')
                    .map(|line| format!("{prefix}{line}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("{open}\n{body}\n{close}")
            }
        }
    }

    /// Strip framing produced by [`CommentStyle::wrap`]. Returns `None` if
    /// `wrapped` does not carry this style's framing.
    pub fn strip(&self, wrapped: &str) -> Option<String> {
        match self {
            CommentStyle::Docstring => wrapped
                .strip_prefix("\"\"\"")
                .and_then(|rest| rest.strip_suffix("\"\"\""))
                .map(str::to_string),
            CommentStyle::Line => wrapped
                .split('\n')
                .map(|line| line.strip_prefix("// "))
                .collect::<Option<Vec<_>>>()
                .map(|lines| lines.join("\n")),
            CommentStyle::Block | CommentStyle::Javadoc | CommentStyle::Html => {
                let (open, prefix, close) = self.framing();
                let inner = wrapped
                    .strip_prefix(open)?
                    .strip_prefix('\n')?
                    .strip_suffix(close)?
                    .strip_suffix('\n')?;
                inner
                    .split('\n')
                    .map(|line| line.strip_prefix(prefix))
                    .collect::<Option<Vec<_>>>()
                    .map(|lines| lines.join("\n"))
            }
        }
    }
}

/// Wrap `text` in the comment syntax for `language`.
pub fn wrap_in_comment(text: &str, language: &str) -> String {
    CommentStyle::for_language(language).wrap(text)
}

/// Inverse of [`wrap_in_comment`].
pub fn unwrap_comment(wrapped: &str, language: &str) -> Option<String> {
    CommentStyle::for_language(language).strip(wrapped)
}
