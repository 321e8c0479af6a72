use ratatui::style::{Color, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::config::ThemeMode;

const DARK_THEME: &str = "base16-ocean.dark";
const LIGHT_THEME: &str = "InspiredGitHub";

/// Cached syntax highlighting state, loaded once and reused for all files.
///
/// The last highlighted file is kept so redrawing the viewer does not
/// re-run the parser every frame. Same path with different text (another
/// repository) misses the cache.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    cached: Option<CachedFile>,
}

struct CachedFile {
    path: String,
    source: String,
    theme: ThemeMode,
    lines: Vec<Vec<Span<'static>>>,
}

impl Highlighter {
    pub fn new() -> Self {
        Highlighter {
            syntax_set: two_face::syntax::extra_newlines(),
            theme_set: ThemeSet::load_defaults(),
            cached: None,
        }
    }

    fn theme(&self, mode: ThemeMode) -> Option<&Theme> {
        let name = match mode {
            ThemeMode::Dark => DARK_THEME,
            ThemeMode::Light => LIGHT_THEME,
        };
        self.theme_set
            .themes
            .get(name)
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Highlight a whole file, one span list per line. `filename` picks the
    /// syntax (e.g. "main.rs" → Rust); the colors come from `base_style`
    /// where the theme has nothing to say.
    pub fn highlight_file(
        &mut self,
        path: &str,
        filename: &str,
        text: &str,
        mode: ThemeMode,
        base_style: Style,
    ) -> &[Vec<Span<'static>>] {
        let fresh = self
            .cached
            .as_ref()
            .is_some_and(|c| c.theme == mode && c.path == path && c.source == text);
        if !fresh {
            let lines = self.highlight_lines(filename, text, mode, base_style);
            self.cached = Some(CachedFile {
                path: path.to_string(),
                source: text.to_string(),
                theme: mode,
                lines,
            });
        }
        self.cached.as_ref().map(|c| c.lines.as_slice()).unwrap_or(&[])
    }

    fn highlight_lines(
        &self,
        filename: &str,
        text: &str,
        mode: ThemeMode,
        base_style: Style,
    ) -> Vec<Vec<Span<'static>>> {
        let plain = || -> Vec<Vec<Span<'static>>> {
            text.lines()
                .map(|l| vec![Span::styled(l.to_string(), base_style)])
                .collect()
        };
        let Some(theme) = self.theme(mode) else {
            return plain();
        };
        let syntax = self
            .syntax_set
            .find_syntax_for_file(filename)
            .ok()
            .flatten()
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut out = Vec::new();
        for line in text.lines() {
            // syntect needs a trailing newline
            let input = format!("{line}\n");
            match highlighter.highlight_line(&input, &self.syntax_set) {
                Ok(ranges) => out.push(
                    ranges
                        .into_iter()
                        .map(|(syn_style, piece)| {
                            let fg = Color::Rgb(
                                syn_style.foreground.r,
                                syn_style.foreground.g,
                                syn_style.foreground.b,
                            );
                            Span::styled(piece.trim_end_matches('\n').to_string(), base_style.fg(fg))
                        })
                        .collect(),
                ),
                Err(e) => {
                    tracing::debug!(filename, "highlighting failed: {e}");
                    return plain();
                }
            }
        }
        out
    }
}
