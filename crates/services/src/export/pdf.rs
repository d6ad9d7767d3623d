use genpdf::Element;
use genpdf::elements::{Break, Paragraph};
use genpdf::style::{Color, Style};
use thiserror::Error;

use scribe_config::ExportConfig;

use super::{TranscriptSegment, speaker_colors};

/// Accent color of the document title (`#667eea`).
const TITLE_COLOR: Color = Color::Rgb(0x66, 0x7e, 0xea);

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("font loading failed: {0}")]
    Font(String),

    #[error("pdf rendering failed: {0}")]
    Render(String),
}

/// Renders transcript segments as a PDF: a colored title, then one
/// bold speaker label and text block per segment, speakers color-coded
/// with the shared palette.
pub fn render_pdf(
    segments: &[TranscriptSegment],
    title: &str,
    config: &ExportConfig,
) -> Result<Vec<u8>, ExportError> {
    let font_family = genpdf::fonts::from_files(&config.font_dir, &config.font_family, None)
        .map_err(|e| ExportError::Font(e.to_string()))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(title);
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(15);
    doc.set_page_decorator(decorator);

    doc.push(
        Paragraph::new(title.to_string()).styled(
            Style::new()
                .bold()
                .with_font_size(20)
                .with_color(TITLE_COLOR),
        ),
    );
    doc.push(Break::new(1.5));

    let colors = speaker_colors(segments);
    for segment in segments {
        let hex = colors.get(&segment.speaker).copied().unwrap_or("#667eea");
        doc.push(
            Paragraph::new(segment.speaker.clone())
                .styled(Style::new().bold().with_color(hex_color(hex))),
        );
        doc.push(Paragraph::new(segment.text.clone()));
        doc.push(Break::new(0.8));
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| ExportError::Render(e.to_string()))?;
    Ok(buffer)
}

fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    let parse = |range| u8::from_str_radix(digits.get(range).unwrap_or("66"), 16).unwrap_or(0x66);
    Color::Rgb(parse(0..2), parse(2..4), parse(4..6))
}
