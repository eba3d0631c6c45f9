//! Detected serialization configuration.
//!
//! Captured once at parse time and carried on the core model envelope so a
//! document can be re-emitted the way it arrived: same format (YAML or
//! JSON), same indentation width and indent character.

/// On-disk format of the source document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DocFormat {
    /// YAML 1.2 (the default when the input does not open with `{` or `[`).
    #[default]
    Yaml,
    /// JSON, detected from the first non-whitespace byte.
    Json,
}

/// Serialization configuration preserved from the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeConfig {
    /// Input format; marshal emits the same format back.
    pub format: DocFormat,
    /// Number of indent characters per nesting level when emitting
    /// block-style collections.
    pub indent_step: usize,
    /// Indent character: space or tab (tab occurs in JSON input only).
    pub indent_char: char,
    /// Whether the source ended with a trailing newline.
    pub(crate) trailing_newline: bool,
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self {
            format: DocFormat::Yaml,
            indent_step: 2,
            indent_char: ' ',
            trailing_newline: true,
        }
    }
}

impl SerializeConfig {
    /// Detect format and indentation from raw input.
    ///
    /// The format comes from the first non-whitespace byte (`{` / `[` →
    /// JSON); the indent step from the first line that is indented deeper
    /// than its predecessor. Inputs with no nesting keep the defaults.
    pub(crate) fn detect(source: &str) -> Self {
        let format = match source.trim_start().as_bytes().first() {
            Some(b'{') | Some(b'[') => DocFormat::Json,
            _ => DocFormat::Yaml,
        };

        let mut indent_step = 2;
        let mut indent_char = ' ';
        let mut prev_indent = 0usize;
        for line in source.lines() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let this_indent = line.len() - trimmed.len();
            if this_indent > prev_indent {
                indent_step = this_indent - prev_indent;
                indent_char = if line.starts_with('\t') { '\t' } else { ' ' };
                break;
            }
            prev_indent = this_indent;
        }

        Self {
            format,
            indent_step,
            indent_char,
            trailing_newline: source.ends_with('\n'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_detected_by_default() {
        let cfg = SerializeConfig::detect("swagger: \"2.0\"\n");
        assert_eq!(cfg.format, DocFormat::Yaml);
        assert_eq!(cfg.indent_char, ' ');
    }

    #[test]
    fn json_detected_from_first_byte() {
        let cfg = SerializeConfig::detect("  {\"swagger\": \"2.0\"}");
        assert_eq!(cfg.format, DocFormat::Json);
        assert!(!cfg.trailing_newline);
    }

    #[test]
    fn four_space_indent_detected() {
        let cfg = SerializeConfig::detect("info:\n    title: T\n");
        assert_eq!(cfg.indent_step, 4);
    }

    #[test]
    fn tab_indent_detected() {
        let cfg = SerializeConfig::detect("{\n\t\"a\": 1\n}\n");
        assert_eq!(cfg.indent_char, '\t');
        assert_eq!(cfg.indent_step, 1);
    }
}
