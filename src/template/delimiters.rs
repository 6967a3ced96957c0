//! Custom action delimiters.
//!
//! Templates mark actions with a configurable pair (`[[` and `]]` by default)
//! so that documents containing `{{ }}` syntax of their own render untouched.
//! [`Delimiters::translate`] rewrites a template into handlebars source: each
//! action becomes a `{{...}}` expression and literal text that handlebars would
//! misread is moved out into verbatim segments.
//!
//! Handlebars drops the indentation and newline around a block tag that sits
//! alone on its line. Text next to a block action is therefore always emitted
//! as a verbatim segment, which keeps the tag from ever being standalone.

use crate::error::GenerateError;

/// Name of the internal helper that emits verbatim segments
pub const VERBATIM_HELPER: &str = "__verbatim";

pub const DEFAULT_OPEN: &str = "[[";
pub const DEFAULT_CLOSE: &str = "]]";

/// Opening and closing markers around template actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    open: String,
    close: String,
}

/// Handlebars source plus the literal segments it refers to
#[derive(Debug, Clone, PartialEq)]
pub struct Translated {
    pub source: String,
    pub segments: Vec<String>,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN.to_string(),
            close: DEFAULT_CLOSE.to_string(),
        }
    }
}

impl Delimiters {
    pub fn new(open: &str, close: &str) -> Result<Self, GenerateError> {
        if open.is_empty() || close.is_empty() {
            return Err(GenerateError::InvalidDelimiters(
                "delimiters must not be empty".to_string(),
            ));
        }

        if open.chars().any(char::is_whitespace) || close.chars().any(char::is_whitespace) {
            return Err(GenerateError::InvalidDelimiters(format!(
                "delimiters must not contain whitespace: '{}' '{}'",
                open, close
            )));
        }

        Ok(Self {
            open: open.to_string(),
            close: close.to_string(),
        })
    }

    /// Rewrite `source` into handlebars syntax.
    ///
    /// A leading `~` inside an action trims whitespace before it, a trailing
    /// `~` trims whitespace after it.
    pub fn translate(&self, source: &str) -> Result<Translated, GenerateError> {
        let mut out = String::with_capacity(source.len());
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;
        let mut trim_next = false;
        let mut after_block = false;

        while let Some(start) = rest.find(&self.open) {
            let mut text = &rest[..start];
            if trim_next {
                text = text.trim_start();
            }

            let after_open = &rest[start + self.open.len()..];
            let Some(end) = after_open.find(&self.close) else {
                let line = source[..offset + start].matches('\n').count() + 1;
                return Err(GenerateError::TemplateParse(format!(
                    "unclosed action at line {}: missing '{}'",
                    line, self.close
                )));
            };

            let mut action = &after_open[..end];
            if let Some(stripped) = action.strip_prefix('~') {
                text = text.trim_end();
                action = stripped;
            }
            trim_next = false;
            if let Some(stripped) = action.strip_suffix('~') {
                trim_next = true;
                action = stripped;
            }

            let block = is_block_action(action);
            push_text(&mut out, &mut segments, text, block || after_block);
            after_block = block;

            out.push_str("{{");
            out.push_str(action);
            out.push_str("}}");

            let consumed = start + self.open.len() + end + self.close.len();
            offset += consumed;
            rest = &rest[consumed..];
        }

        let text = if trim_next { rest.trim_start() } else { rest };
        push_text(&mut out, &mut segments, text, after_block);

        Ok(Translated {
            source: out,
            segments,
        })
    }
}

fn push_text(out: &mut String, segments: &mut Vec<String>, text: &str, verbatim: bool) {
    if text.is_empty() {
        return;
    }

    if !verbatim && passes_through(text) {
        out.push_str(text);
    } else {
        out.push_str(&format!("{{{{{} {}}}}}", VERBATIM_HELPER, segments.len()));
        segments.push(text.to_string());
    }
}

/// Block openers and closers, `else`, comments, partials and decorators
fn is_block_action(action: &str) -> bool {
    let action = action.trim_start();
    action.starts_with(['#', '/', '^', '!', '>', '*'])
        || action.split_whitespace().next() == Some("else")
}

/// Whether handlebars reads `text` back unchanged when an action may follow it
fn passes_through(text: &str) -> bool {
    !text.contains("{{") && !text.ends_with('{') && !text.ends_with('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(source: &str) -> Translated {
        Delimiters::default().translate(source).unwrap()
    }

    #[test]
    fn test_plain_text_unchanged() {
        let t = translate("listener \"tcp\" {\n  address = \"0.0.0.0:8200\"\n}\n");
        assert_eq!(t.source, "listener \"tcp\" {\n  address = \"0.0.0.0:8200\"\n}\n");
        assert!(t.segments.is_empty());
    }

    #[test]
    fn test_actions_translated() {
        let t = translate("addr = \"[[Lookup \"ADDR\"]]\"\nname = [[name]]");
        assert_eq!(t.source, "addr = \"{{Lookup \"ADDR\"}}\"\nname = {{name}}");
    }

    #[test]
    fn test_foreign_braces_become_segments() {
        let t = translate("tpl = \"{{ .Data.value }}\" [[x]]");
        assert_eq!(t.source, "{{__verbatim 0}}{{x}}");
        assert_eq!(t.segments, vec!["tpl = \"{{ .Data.value }}\" ".to_string()]);
    }

    #[test]
    fn test_brace_or_backslash_before_action() {
        let t = translate("a{[[x]]} b\\[[y]]");
        assert_eq!(t.source, "{{__verbatim 0}}{{x}}{{__verbatim 1}}{{y}}");
        assert_eq!(t.segments, vec!["a{".to_string(), "} b\\".to_string()]);
    }

    #[test]
    fn test_text_around_block_actions_is_verbatim() {
        let t = translate("a\n  [[#if x]]\nb\n  [[else]]\nc [[y]] d\n[[/if]]\n");
        assert_eq!(
            t.source,
            "{{__verbatim 0}}{{#if x}}{{__verbatim 1}}{{else}}{{__verbatim 2}}{{y}}{{__verbatim 3}}{{/if}}{{__verbatim 4}}"
        );
        assert_eq!(
            t.segments,
            vec![
                "a\n  ".to_string(),
                "\nb\n  ".to_string(),
                "\nc ".to_string(),
                " d\n".to_string(),
                "\n".to_string(),
            ]
        );
    }

    #[test]
    fn test_block_action_detection() {
        assert!(is_block_action("#each nodes"));
        assert!(is_block_action(" /each"));
        assert!(is_block_action("else"));
        assert!(is_block_action("else if ready"));
        assert!(is_block_action("! note"));
        assert!(!is_block_action("Lookup \"X\""));
        assert!(!is_block_action("elsewhere"));
    }

    #[test]
    fn test_whitespace_control() {
        let t = translate("a   \n[[~ x ~]]\n   b");
        assert_eq!(t.source, "a{{ x }}b");
    }

    #[test]
    fn test_unclosed_action_reports_line() {
        let err = Delimiters::default()
            .translate("line one\nline two [[ Lookup \"X\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_custom_delimiters() {
        let delims = Delimiters::new("<%", "%>").unwrap();
        let t = delims.translate("x = <% value %> [[kept]]").unwrap();
        assert_eq!(t.source, "x = {{ value }} [[kept]]");
    }

    #[test]
    fn test_invalid_delimiters() {
        assert!(Delimiters::new("", "]]").is_err());
        assert!(Delimiters::new("[ [", "]]").is_err());
    }
}
