use crate::canvas::{Command, Document, Page};
use crate::font::FontFace;
use crate::metrics::{DocumentMetrics, PageMetrics};
use crate::types::{Color, Pt, Size};
use fixed::types::I32F32;
use std::io::{self, Write};

#[derive(Debug, Clone, Default)]
pub(crate) struct PdfOptions {
    pub document_title: Option<String>,
    /// Already in PDF date form, e.g. `D:20261019103000`.
    pub creation_date: Option<String>,
}

const PDF_CATALOG_ID: usize = 1;
const PDF_PAGES_ID: usize = 2;
const PDF_RESOURCES_ID: usize = 3;
const PDF_INFO_ID: usize = 4;
const PDF_FONT_IDS: [(FontFace, usize); 2] = [(FontFace::Helvetica, 5), (FontFace::HelveticaBold, 6)];
const PDF_FIRST_PAGE_ID: usize = 7;

/// Writes objects as they are produced and keeps the byte offsets needed
/// for the cross-reference table. Pages are appended in order; the page
/// tree, catalog and info objects are written by `finish`.
pub(crate) struct PdfStreamWriter<'a, W: Write> {
    writer: &'a mut W,
    offset: usize,
    offsets: Vec<usize>,
    next_id: usize,
    page_size: Size,
    options: PdfOptions,
    page_ids: Vec<usize>,
    page_metrics: Vec<PageMetrics>,
}

impl<'a, W: Write> PdfStreamWriter<'a, W> {
    pub(crate) fn new(writer: &'a mut W, page_size: Size, options: PdfOptions) -> io::Result<Self> {
        let mut offset: usize = 0;
        write_bytes(writer, b"%PDF-1.7\n", &mut offset)?;
        write_bytes(writer, b"%\xE2\xE3\xCF\xD3\n", &mut offset)?;
        Ok(Self {
            writer,
            offset,
            offsets: vec![0; PDF_FIRST_PAGE_ID],
            next_id: PDF_FIRST_PAGE_ID,
            page_size,
            options,
            page_ids: Vec::new(),
            page_metrics: Vec::new(),
        })
    }

    pub(crate) fn add_document(&mut self, document: &Document) -> io::Result<()> {
        if document.page_size != self.page_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "document page size does not match the writer",
            ));
        }
        for page in &document.pages {
            self.add_page(page)?;
        }
        Ok(())
    }

    fn add_page(&mut self, page: &Page) -> io::Result<()> {
        let start = self.alloc_ids(2);
        let content_id = start;
        let page_id = start + 1;

        let rendered = render_page(page, self.page_size.height);
        let mut metrics = PageMetrics::from_page(self.page_ids.len() + 1, page);
        metrics.content_bytes = rendered.content.len();
        metrics.unmapped_chars = rendered.unmapped_chars;
        self.page_metrics.push(metrics);

        self.write_object(content_id, &stream_object(&rendered.content))?;
        let page_obj = format!(
            "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources {} 0 R /Contents {} 0 R >>",
            PDF_PAGES_ID,
            fmt_pt(self.page_size.width),
            fmt_pt(self.page_size.height),
            PDF_RESOURCES_ID,
            content_id,
        );
        self.write_object(page_id, &page_obj)?;
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Writes the shared objects, xref and trailer. Returns the metrics with
    /// the total byte count filled in.
    pub(crate) fn finish(mut self) -> io::Result<DocumentMetrics> {
        for (face, id) in PDF_FONT_IDS {
            self.write_object(id, &font_object(face))?;
        }
        let font_entries = PDF_FONT_IDS
            .iter()
            .map(|(face, id)| format!("/{} {} 0 R", face.resource_name(), id))
            .collect::<Vec<_>>()
            .join(" ");
        self.write_object(
            PDF_RESOURCES_ID,
            &format!("<< /Font << {font_entries} >> /ProcSet [/PDF /Text] >>"),
        )?;

        let kids = self
            .page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        self.write_object(
            PDF_PAGES_ID,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids,
                self.page_ids.len()
            ),
        )?;
        self.write_object(
            PDF_CATALOG_ID,
            &format!("<< /Type /Catalog /Pages {} 0 R >>", PDF_PAGES_ID),
        )?;
        let info = info_object(&self.options);
        self.write_object(PDF_INFO_ID, &info)?;

        let total_objects = self.next_id.saturating_sub(1);
        let xref_start = self.offset;
        write_str(
            self.writer,
            &format!("xref\n0 {}\n", total_objects + 1),
            &mut self.offset,
        )?;
        write_bytes(self.writer, b"0000000000 65535 f \n", &mut self.offset)?;
        for id in 1..=total_objects {
            let obj_offset = self.offsets.get(id).copied().unwrap_or(0);
            write_str(
                self.writer,
                &format!("{:010} 00000 n \n", obj_offset),
                &mut self.offset,
            )?;
        }
        let trailer = format!(
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF",
            total_objects + 1,
            PDF_CATALOG_ID,
            PDF_INFO_ID,
            xref_start
        );
        write_str(self.writer, &trailer, &mut self.offset)?;
        self.writer.flush()?;

        Ok(DocumentMetrics {
            pages: self.page_metrics,
            total_bytes: self.offset,
        })
    }

    fn alloc_ids(&mut self, count: usize) -> usize {
        let start = self.next_id;
        self.next_id = self.next_id.saturating_add(count);
        if self.offsets.len() < self.next_id {
            self.offsets.resize(self.next_id, 0);
        }
        start
    }

    fn write_object(&mut self, obj_id: usize, body: &str) -> io::Result<()> {
        if let Some(slot) = self.offsets.get_mut(obj_id) {
            *slot = self.offset;
        }
        write_str(self.writer, &format!("{} 0 obj\n", obj_id), &mut self.offset)?;
        write_bytes(self.writer, body.as_bytes(), &mut self.offset)?;
        write_bytes(self.writer, b"\nendobj\n", &mut self.offset)?;
        Ok(())
    }
}

pub(crate) fn document_to_pdf_with_metrics(
    document: &Document,
    options: PdfOptions,
) -> io::Result<(Vec<u8>, DocumentMetrics)> {
    let mut out = Vec::new();
    let metrics = {
        let mut writer = PdfStreamWriter::new(&mut out, document.page_size, options)?;
        writer.add_document(document)?;
        writer.finish()?
    };
    Ok((out, metrics))
}

struct RenderedPage {
    content: String,
    unmapped_chars: usize,
}

// Page space has its origin top-left with y downward; PDF user space is
// bottom-left with y upward, so every y is flipped against the page height.
fn render_page(page: &Page, page_height: Pt) -> RenderedPage {
    let mut out = String::new();
    let mut unmapped_chars = 0usize;
    let mut current_font = FontFace::Helvetica;
    let mut current_font_size = Pt::from_i32(12);

    for cmd in &page.commands {
        match cmd {
            Command::SaveState => out.push_str("q\n"),
            Command::RestoreState => out.push_str("Q\n"),
            Command::Meta { .. } => {}
            Command::SetFillColor(color) => out.push_str(&color_to_pdf_fill(*color)),
            Command::SetStrokeColor(color) => out.push_str(&color_to_pdf_stroke(*color)),
            Command::SetLineWidth(width) => {
                out.push_str(&format!("{} w\n", fmt_pt(*width)));
            }
            Command::SetFont(face) => current_font = *face,
            Command::SetFontSize(size) => current_font_size = *size,
            Command::MoveTo { x, y } => {
                out.push_str(&format!("{} {} m\n", fmt_pt(*x), fmt_pt(page_height - *y)));
            }
            Command::LineTo { x, y } => {
                out.push_str(&format!("{} {} l\n", fmt_pt(*x), fmt_pt(page_height - *y)));
            }
            Command::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} {} {} c\n",
                    fmt_pt(*x1),
                    fmt_pt(page_height - *y1),
                    fmt_pt(*x2),
                    fmt_pt(page_height - *y2),
                    fmt_pt(*x),
                    fmt_pt(page_height - *y),
                ));
            }
            Command::ClosePath => out.push_str("h\n"),
            Command::Fill => out.push_str("f\n"),
            Command::Stroke => out.push_str("S\n"),
            Command::FillStroke => out.push_str("B\n"),
            Command::DrawString { x, y, text } => {
                let encoded = encode_winansi_pdf_string(text);
                unmapped_chars += encoded.replaced;
                out.push_str("BT\n");
                out.push_str(&format!(
                    "/{} {} Tf\n",
                    current_font.resource_name(),
                    fmt_pt(current_font_size)
                ));
                out.push_str(&format!(
                    "{} {} Td\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - current_font_size)
                ));
                out.push_str(&format!("({}) Tj\n", encoded.text));
                out.push_str("ET\n");
            }
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} re\nf\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - *height),
                    fmt_pt(*width),
                    fmt_pt(*height)
                ));
            }
        }
    }

    RenderedPage {
        content: out,
        unmapped_chars,
    }
}

fn stream_object(content: &str) -> String {
    format!(
        "<< /Length {} >>\nstream\n{}\nendstream",
        content.len(),
        content
    )
}

fn font_object(face: FontFace) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        face.base_font()
    )
}

fn info_object(options: &PdfOptions) -> String {
    let mut entries = vec!["/Producer (complyreport)".to_string()];
    if let Some(title) = options.document_title.as_deref() {
        entries.push(format!("/Title ({})", encode_winansi_pdf_string(title).text));
    }
    if let Some(date) = options.creation_date.as_deref() {
        entries.push(format!("/CreationDate ({})", encode_winansi_pdf_string(date).text));
    }
    format!("<< {} >>", entries.join(" "))
}

fn write_bytes<W: Write>(writer: &mut W, data: &[u8], offset: &mut usize) -> io::Result<()> {
    writer.write_all(data)?;
    *offset += data.len();
    Ok(())
}

fn write_str<W: Write>(writer: &mut W, data: &str, offset: &mut usize) -> io::Result<()> {
    write_bytes(writer, data.as_bytes(), offset)
}

struct WinAnsiEncoded {
    text: String,
    replaced: usize,
}

fn encode_winansi_pdf_string(input: &str) -> WinAnsiEncoded {
    let mut out = String::new();
    let mut replaced = 0usize;
    for ch in input.chars() {
        match ch {
            '\u{2265}' => {
                out.push_str(">=");
                continue;
            }
            '\u{2264}' => {
                out.push_str("<=");
                continue;
            }
            // Narrow no-break space has no WinAnsi code.
            '\u{202F}' => {
                out.push(' ');
                continue;
            }
            _ => {}
        }

        let byte = match ch {
            '\u{0000}'..='\u{007F}' => ch as u8,
            '\u{00A0}'..='\u{00FF}' => ch as u8,
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02C6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02DC}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            _ => {
                replaced += 1;
                b'?'
            }
        };

        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b if !(0x20..0x7f).contains(&b) => out.push_str(&format!("\\{:03o}", b)),
            b => out.push(b as char),
        }
    }

    WinAnsiEncoded { text: out, replaced }
}

fn fmt(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = I32F32::from_num(value);
    let scaled = (fixed * I32F32::from_num(1000)).round();
    let milli: i64 = scaled.to_num();
    format_milli(milli)
}

fn format_milli(milli: i64) -> String {
    if milli == 0 {
        return "0".to_string();
    }
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.abs();
    let int_part = abs / 1000;
    let frac_part = abs % 1000;
    if frac_part == 0 {
        format!("{}{}", sign, int_part)
    } else {
        let mut s = format!("{}{}.{:03}", sign, int_part, frac_part);
        while s.ends_with('0') {
            s.pop();
        }
        s
    }
}

fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn color_to_pdf_fill(color: Color) -> String {
    format!(
        "{} {} {} rg\n",
        fmt(clamp_unit(color.r)),
        fmt(clamp_unit(color.g)),
        fmt(clamp_unit(color.b))
    )
}

fn color_to_pdf_stroke(color: Color) -> String {
    format!(
        "{} {} {} RG\n",
        fmt(clamp_unit(color.r)),
        fmt(clamp_unit(color.g)),
        fmt(clamp_unit(color.b))
    )
}
