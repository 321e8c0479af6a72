use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::github::FileContent;

/// Shown in place of file content that is not valid base64
pub const DECODE_ERROR_PLACEHOLDER: &str = "Error decoding content";

/// Decode GitHub's newline-segmented base64 payload into raw bytes.
pub fn decode_base64(content: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let joined: String = content.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    STANDARD.decode(joined.as_bytes())
}

/// Decode base64 content to text, falling back to a placeholder on failure.
pub fn decode_base64_content(content: &str) -> String {
    match decode_base64(content) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::warn!("Error decoding content: {e}");
            DECODE_ERROR_PLACEHOLDER.to_string()
        }
    }
}

/// Heuristic: more than 10% control or high bytes means binary.
pub fn is_binary_content(bytes: &[u8]) -> bool {
    let non_printable = bytes
        .iter()
        .filter(|b| matches!(**b, 0x00..=0x08 | 0x0E..=0x1F | 0x7F..=0xFF))
        .count();
    non_printable > 0 && non_printable as f64 > bytes.len() as f64 * 0.1
}

/// Lowercased extension after the last dot ("" when there is none)
pub fn file_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Language id used to fence code sent to the assistant.
pub fn language_for(name: &str) -> &'static str {
    match file_extension(name).as_str() {
        "js" => "javascript",
        "jsx" => "jsx",
        "ts" => "typescript",
        "tsx" => "tsx",
        "py" => "python",
        "java" => "java",
        "html" => "html",
        "css" => "css",
        "json" => "json",
        "md" => "markdown",
        "yml" | "yaml" => "yaml",
        "sh" | "bash" => "bash",
        "c" | "h" => "c",
        "cpp" | "hpp" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "rs" => "rust",
        "go" => "go",
        "php" => "php",
        "sql" => "sql",
        "swift" => "swift",
        "kt" => "kotlin",
        "dart" => "dart",
        "toml" => "toml",
        "vue" => "markup",
        _ => "text",
    }
}

/// What the file viewer should show for an opened file
#[derive(Debug, Clone, PartialEq)]
pub enum FileBody {
    Text(String),
    Binary,
    Empty,
    Undecodable,
}

impl FileBody {
    pub fn from_file(file: &FileContent) -> Self {
        let raw = match file.content.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => return FileBody::Empty,
        };
        match decode_base64(raw) {
            Ok(bytes) if is_binary_content(&bytes) => FileBody::Binary,
            Ok(bytes) => FileBody::Text(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                tracing::warn!(path = %file.path, "undecodable file content: {e}");
                FileBody::Undecodable
            }
        }
    }

    /// Text handed to the assistant as code context
    pub fn as_context_text(&self) -> &str {
        match self {
            FileBody::Text(t) => t,
            FileBody::Undecodable => DECODE_ERROR_PLACEHOLDER,
            FileBody::Binary | FileBody::Empty => "",
        }
    }
}
