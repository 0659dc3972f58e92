use crate::models::Receipt;
use anyhow::{Context, Result};
use printpdf::{BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::io::{BufWriter, Cursor};

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const LEFT_MARGIN_MM: f64 = 18.0;
const VALUE_COLUMN_MM: f64 = 56.0;
const LINE_HEIGHT_MM: f64 = 5.0;
const FIELD_SPACING_MM: f64 = 6.0;
const FONT_SIZE: f64 = 11.0;
const TITLE_SIZE: f64 = 14.0;
// Approximate character budget for Helvetica at 11pt in the value column;
// builtin fonts expose no glyph metrics, so wrapping works in characters.
const VALUE_COLUMN_CHARS: usize = 58;
const QR_SIZE_MM: f64 = 63.0;
const QR_PLACEMENT_DPI: f64 = 300.0;

pub async fn fetch_qr_png(client: &reqwest::Client, qr_url: &str) -> Option<Vec<u8>> {
    match client.get(qr_url).send().await {
        Ok(response) if response.status().is_success() => match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(err) => {
                tracing::warn!(error = %err, "QR image body read failed; omitting QR");
                None
            }
        },
        Ok(response) => {
            tracing::warn!(status = %response.status(), "QR fetch failed; omitting QR");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "QR fetch failed; omitting QR");
            None
        }
    }
}

/// Single A4 certificate page: fixed label/value rows plus an optional QR
/// image. A missing or undecodable QR never fails the document.
pub fn render_receipt_pdf(
    receipt: &Receipt,
    explorer_url: &str,
    qr_png: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Smart Turjman - Verified Transaction Receipt",
        Mm(PAGE_WIDTH_MM as f32),
        Mm(PAGE_HEIGHT_MM as f32),
        "receipt",
    );
    let layer = doc.get_page(page).get_layer(layer);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("embed Helvetica")?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .context("embed Helvetica Bold")?;

    layer.use_text(
        "Smart Turjman - Verified Transaction Receipt",
        TITLE_SIZE as f32,
        Mm(LEFT_MARGIN_MM as f32),
        Mm(272.0),
        &bold,
    );

    let service_label = receipt
        .service_label
        .as_deref()
        .or(receipt.service.as_deref())
        .or(receipt.service_id.as_deref())
        .unwrap_or("N/A");
    let amount = format!("{} USDC", receipt.amount_usdc);
    let status = receipt.status.to_string();
    let fields = [
        ("Transaction Hash", receipt.tx.as_str()),
        ("Service", service_label),
        ("Partner", receipt.partner.as_deref().unwrap_or("N/A")),
        ("Amount", amount.as_str()),
        ("Network", receipt.network.as_str()),
        ("Status", status.as_str()),
    ];

    let mut cursor = 258.0_f64;
    for (label, value) in fields {
        cursor = draw_field(&layer, &bold, &font, label, value, cursor);
    }
    cursor -= FIELD_SPACING_MM;
    cursor = draw_field(&layer, &bold, &font, "View on ArcScan", explorer_url, cursor);
    cursor -= FIELD_SPACING_MM;

    if let Some(png) = qr_png {
        if let Err(err) = embed_qr(&layer, png, cursor) {
            tracing::warn!(error = %err, "QR embed failed; continuing without it");
        }
    }

    let mut bytes = Vec::new();
    doc.save(&mut BufWriter::new(&mut bytes))
        .context("serialize receipt PDF")?;
    Ok(bytes)
}

fn draw_field(
    layer: &PdfLayerReference,
    bold: &IndirectFontRef,
    font: &IndirectFontRef,
    label: &str,
    value: &str,
    cursor: f64,
) -> f64 {
    layer.use_text(
        format!("{}:", label),
        FONT_SIZE as f32,
        Mm(LEFT_MARGIN_MM as f32),
        Mm(cursor as f32),
        bold,
    );

    let lines = wrap_value(value, VALUE_COLUMN_CHARS);
    for (idx, line) in lines.iter().enumerate() {
        layer.use_text(
            line.as_str(),
            FONT_SIZE as f32,
            Mm((LEFT_MARGIN_MM + VALUE_COLUMN_MM) as f32),
            Mm((cursor - idx as f64 * LINE_HEIGHT_MM) as f32),
            font,
        );
    }

    cursor - (lines.len() - 1) as f64 * LINE_HEIGHT_MM - FIELD_SPACING_MM
}

fn embed_qr(layer: &PdfLayerReference, png: &[u8], top: f64) -> Result<()> {
    let decoder = printpdf::image_crate::codecs::png::PngDecoder::new(Cursor::new(png))
        .context("decode QR PNG")?;
    let image = Image::try_from(decoder).context("convert QR PNG")?;

    let width_px = image.image.width.0 as f64;
    let natural_mm = width_px * 25.4 / QR_PLACEMENT_DPI;
    let scale = QR_SIZE_MM / natural_mm;

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(LEFT_MARGIN_MM as f32)),
            translate_y: Some(Mm((top - QR_SIZE_MM) as f32)),
            scale_x: Some(scale as f32),
            scale_y: Some(scale as f32),
            ..Default::default()
        },
    );
    Ok(())
}

/// Word-wraps into the fixed value column, character-wrapping words longer
/// than a whole line (transaction hashes, explorer URLs).
fn wrap_value(text: &str, max_chars: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec!["N/A".to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in words {
        for (idx, segment) in split_long_word(word, max_chars).into_iter().enumerate() {
            let candidate = if current.is_empty() {
                segment.clone()
            } else if idx == 0 {
                format!("{} {}", current, segment)
            } else {
                format!("{}{}", current, segment)
            };
            if !current.is_empty() && candidate.chars().count() > max_chars {
                lines.push(std::mem::take(&mut current));
                current = segment;
            } else {
                current = candidate;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_long_word(word: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
