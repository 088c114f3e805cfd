//! Embedded script metadata.
//!
//! The metadata is a YAML document living in the script's comment region,
//! fenced by `# ---` and `# ...`:
//!
//! ```text
//! #!/bin/bash
//! # ---
//! # RightScript Name: Install nginx
//! # Description: Installs and configures nginx
//! # Inputs: {}
//! # Attachments:
//! #   - nginx.conf
//! # ...
//! ```
//!
//! A file with no `# ---` marker at all parses to [`ScriptMetadata::default`]
//! (empty name) so callers can apply their own fallback policy.

use std::path::Path;

use serde::Deserialize;

use crate::error::MetadataError;
use crate::types::ScriptName;

const START_MARKER: &str = "---";
const END_MARKER: &str = "...";

/// Parsed identity and attachment declaration of one script.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptMetadata {
    pub name: ScriptName,
    pub description: String,
    /// `Inputs` section, carried opaquely.
    pub inputs: Option<serde_yaml::Value>,
    /// Declared attachment filenames, relative to the script's directory,
    /// in declaration order. Duplicates are kept.
    pub attachments: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(rename = "RightScript Name")]
    name: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Inputs")]
    inputs: Option<serde_yaml::Value>,
    #[serde(rename = "Attachments")]
    attachments: Option<Vec<String>>,
}

impl From<RawMetadata> for ScriptMetadata {
    fn from(raw: RawMetadata) -> Self {
        Self {
            name: ScriptName::from(raw.name.unwrap_or_default()),
            description: raw.description.unwrap_or_default(),
            inputs: raw.inputs,
            attachments: raw.attachments.unwrap_or_default(),
        }
    }
}

/// Location and comment-stripped body of a metadata block.
struct Block {
    start_line: usize,
    yaml: String,
}

/// Parse the metadata block out of script content.
pub fn parse(content: &str) -> Result<ScriptMetadata, MetadataError> {
    let Some(block) = locate_block(content)? else {
        return Ok(ScriptMetadata::default());
    };

    let raw: RawMetadata = if block.yaml.trim().is_empty() {
        RawMetadata::default()
    } else {
        serde_yaml::from_str(&block.yaml).map_err(|source| MetadataError::Yaml {
            line: block.start_line,
            source,
        })?
    };

    let metadata = ScriptMetadata::from(raw);
    for (index, attachment) in metadata.attachments.iter().enumerate() {
        if attachment.trim().is_empty() || Path::new(attachment).is_absolute() {
            return Err(MetadataError::InvalidAttachment {
                index: index + 1,
                value: attachment.clone(),
            });
        }
    }
    Ok(metadata)
}

/// [`parse`] over raw file bytes. Invalid UTF-8 is replaced, not rejected.
pub fn parse_bytes(bytes: &[u8]) -> Result<ScriptMetadata, MetadataError> {
    parse(&String::from_utf8_lossy(bytes))
}

/// Insert an empty metadata block named `name` after the shebang line.
///
/// Returns `Ok(None)` when the content already carries a block.
pub fn scaffold(content: &str, name: &str) -> Result<Option<String>, MetadataError> {
    if locate_block(content)?.is_some() {
        return Ok(None);
    }

    let block = format!(
        "# {START_MARKER}\n\
         # RightScript Name: {}\n\
         # Description:\n\
         # Inputs: {{}}\n\
         # Attachments: []\n\
         # {END_MARKER}\n",
        yaml_scalar(name)
    );

    if !content.starts_with("#!") {
        return Ok(Some(format!("{block}{content}")));
    }
    let scaffolded = match content.find('\n') {
        Some(end) => format!("{}{block}{}", &content[..=end], &content[end + 1..]),
        None => format!("{content}\n{block}"),
    };
    Ok(Some(scaffolded))
}

fn locate_block(content: &str) -> Result<Option<Block>, MetadataError> {
    let mut lines = content.lines().enumerate();
    let Some((start, _)) = lines
        .by_ref()
        .find(|(_, line)| is_marker(line, START_MARKER))
    else {
        return Ok(None);
    };

    let mut yaml = String::new();
    for (idx, line) in lines {
        let Some(body) = comment_body(line) else {
            let closed_later = content
                .lines()
                .skip(idx + 1)
                .any(|rest| is_marker(rest, END_MARKER));
            if !closed_later {
                return Err(MetadataError::Unterminated { line: start + 1 });
            }
            return Err(MetadataError::NotAComment {
                line: idx + 1,
                content: line.to_string(),
            });
        };
        if body.trim() == END_MARKER {
            return Ok(Some(Block {
                start_line: start + 1,
                yaml,
            }));
        }
        yaml.push_str(body);
        yaml.push('\n');
    }

    Err(MetadataError::Unterminated { line: start + 1 })
}

/// Text after `#` and at most one space; `None` for non-comment lines.
fn comment_body(line: &str) -> Option<&str> {
    let rest = line.trim_end_matches('\r').trim_start().strip_prefix('#')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

fn is_marker(line: &str, marker: &str) -> bool {
    comment_body(line).is_some_and(|body| body.trim() == marker)
}

/// Render `value` as a YAML string scalar, quoting when a plain scalar
/// would be read back as something else.
fn yaml_scalar(value: &str) -> String {
    let plain = value
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.'))
        && !value.ends_with(' ')
        && !matches!(
            value.to_ascii_lowercase().as_str(),
            "true" | "false" | "null"
        );
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_body_strips_one_space() {
        assert_eq!(comment_body("#   - a.sh"), Some("  - a.sh"));
        assert_eq!(comment_body("  # key: v\r"), Some("key: v"));
        assert_eq!(comment_body("echo hi"), None);
    }

    #[test]
    fn yaml_scalar_quotes_ambiguous_names() {
        assert_eq!(yaml_scalar("setup"), "setup");
        assert_eq!(yaml_scalar("Install nginx"), "Install nginx");
        assert_eq!(yaml_scalar("123"), "'123'");
        assert_eq!(yaml_scalar("null"), "'null'");
        assert_eq!(yaml_scalar("a: b"), "'a: b'");
        assert_eq!(yaml_scalar("it's"), "'it''s'");
    }

    #[test]
    fn scaffold_output_parses_back() {
        for name in ["setup", "123", "a: b", "it's"] {
            let out = scaffold("#!/bin/sh\necho hi\n", name).unwrap().unwrap();
            assert!(out.starts_with("#!/bin/sh\n# ---\n"));
            assert!(out.ends_with("# ...\necho hi\n"));
            let parsed = parse(&out).unwrap();
            assert_eq!(parsed.name.as_str(), name);
            assert!(parsed.attachments.is_empty());
        }
    }
}
