pub mod pdf;

pub use pdf::{ExportError, render_pdf};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The slice of a transcript segment the renderers consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    #[serde(default = "default_speaker")]
    pub speaker: String,
    #[serde(default)]
    pub text: String,
}

fn default_speaker() -> String {
    "Speaker".to_string()
}

/// Rotating per-speaker accent colors.
pub(crate) const SPEAKER_COLORS: [&str; 8] = [
    "#667eea", "#f5576c", "#4facfe", "#43e97b", "#fa709a", "#fee140", "#30cfd0", "#a8edea",
];

/// Assigns each distinct speaker a palette color, cycling in order of
/// first appearance.
pub(crate) fn speaker_colors(segments: &[TranscriptSegment]) -> HashMap<String, &'static str> {
    let mut colors = HashMap::new();
    let mut next = 0usize;
    for segment in segments {
        if !colors.contains_key(&segment.speaker) {
            colors.insert(
                segment.speaker.clone(),
                SPEAKER_COLORS[next % SPEAKER_COLORS.len()],
            );
            next += 1;
        }
    }
    colors
}

/// Plain text: one `Speaker:` block per segment.
pub fn render_text(segments: &[TranscriptSegment]) -> String {
    let mut lines = Vec::with_capacity(segments.len());
    for segment in segments {
        lines.push(format!("{}:\n{}\n", segment.speaker, segment.text));
    }
    lines.join("\n")
}

/// Markdown: bold speaker labels under an H1 title.
pub fn render_markdown(segments: &[TranscriptSegment], title: &str) -> String {
    let mut lines = vec![format!("# {title}\n")];
    for segment in segments {
        lines.push(format!("**{}:**\n\n{}\n", segment.speaker, segment.text));
    }
    lines.join("\n")
}

/// Standalone HTML document with color-coded speakers.
pub fn render_html(segments: &[TranscriptSegment], title: &str) -> String {
    let colors = speaker_colors(segments);
    let title = escape_html(title);

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 40px 20px;
            background: #f5f5f5;
            color: #333;
        }}
        h1 {{
            color: #667eea;
            border-bottom: 3px solid #667eea;
            padding-bottom: 10px;
            margin-bottom: 30px;
        }}
        .segment {{
            background: white;
            border-radius: 8px;
            padding: 15px 20px;
            margin-bottom: 15px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }}
        .speaker {{
            font-weight: bold;
            margin-bottom: 8px;
            font-size: 14px;
        }}
        .text {{
            line-height: 1.6;
            color: #444;
        }}
    </style>
</head>
<body>
    <h1>{title}</h1>
"#
    );

    for segment in segments {
        let color = colors.get(&segment.speaker).copied().unwrap_or("#667eea");
        html.push_str(&format!(
            r#"    <div class="segment">
        <div class="speaker" style="color: {color};">{speaker}</div>
        <div class="text">{text}</div>
    </div>
"#,
            speaker = escape_html(&segment.speaker),
            text = escape_html(&segment.text),
        ));
    }

    html.push_str("</body>\n</html>");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
