use crate::error::Result;
use crate::references::Reference;
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const FONT: &str = "Tahoma";
// Sizes are in half-points, spacing and indents in twentieths of a point.
const BODY_SIZE: u32 = 24;
const HEADER_SIZE: u32 = 28;
const HANGING_INDENT: u32 = 720;
const PAGE_MARGIN: u32 = 1440;

const HYPERLINK_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// Optional front matter of the reference list document.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct DocumentOptions {
    /// Centered, upper-cased title lines at the top; none means no header block
    pub header_lines: Vec<String>,
    /// Printed below the header lines when there are any
    pub agency_name: String,
}

impl DocumentOptions {
    /// Standard header block: project title, caption and proceeding code.
    ///
    /// A blank project title yields no header at all.
    pub fn for_project(project_title: &str, agency_name: &str, proceeding_code: &str) -> Self {
        let title = project_title.trim();
        let header_lines = if title.is_empty() {
            Vec::new()
        } else {
            vec![
                title.to_string(),
                "DOCKET REFERENCES LIST".to_string(),
                proceeding_code.to_string(),
            ]
        };
        DocumentOptions {
            header_lines,
            agency_name: agency_name.to_string(),
        }
    }
}

#[derive(Clone, Copy)]
struct Spacing {
    before: u32,
    after: u32,
}

struct DocxWriter {
    body: String,
    hyperlinks: Vec<String>,
}

impl DocxWriter {
    fn new() -> Self {
        DocxWriter {
            body: String::new(),
            hyperlinks: Vec::new(),
        }
    }

    // One relationship per distinct target, like Word itself does
    fn hyperlink_id(&mut self, url: &str) -> String {
        let index = match self.hyperlinks.iter().position(|u| u == url) {
            Some(i) => i,
            None => {
                self.hyperlinks.push(url.to_string());
                self.hyperlinks.len() - 1
            }
        };
        format!("rIdLink{}", index + 1)
    }

    fn header_paragraph(&mut self, text: &str) {
        self.body.push_str(&format!(
            "<w:p><w:pPr><w:spacing w:before=\"0\" w:after=\"0\" w:line=\"240\" w:lineRule=\"auto\"/><w:jc w:val=\"center\"/></w:pPr>{}</w:p>",
            run(&text.to_uppercase(), HEADER_SIZE, true)
        ));
    }

    fn bold_paragraph(&mut self, text: &str, spacing: Spacing) {
        self.body.push_str(&format!(
            "<w:p><w:pPr><w:spacing w:before=\"{}\" w:after=\"{}\" w:line=\"240\" w:lineRule=\"auto\"/></w:pPr>{}</w:p>",
            spacing.before,
            spacing.after,
            run(text, BODY_SIZE, true)
        ));
    }

    fn reference_paragraph(&mut self, reference: &Reference) {
        let rel_id = self.hyperlink_id(&reference.url);
        let text = format!("{} ", reference.citation_text);
        self.body.push_str(&format!(
            concat!(
                "<w:p><w:pPr><w:spacing w:before=\"120\" w:after=\"120\" w:line=\"240\" w:lineRule=\"auto\"/>",
                "<w:ind w:left=\"{indent}\" w:hanging=\"{indent}\"/></w:pPr>",
                "{run}",
                "<w:hyperlink r:id=\"{rel}\"><w:r><w:rPr>{font}<w:color w:val=\"000000\"/>",
                "<w:sz w:val=\"{size}\"/><w:u w:val=\"none\"/></w:rPr>",
                "<w:t xml:space=\"preserve\">{url}</w:t></w:r></w:hyperlink></w:p>"
            ),
            indent = HANGING_INDENT,
            run = run(&text, BODY_SIZE, false),
            rel = rel_id,
            font = font_xml(),
            size = BODY_SIZE,
            url = xml_text(&reference.url),
        ));
    }

    fn document_xml(&self) -> String {
        format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
                "<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\" ",
                "xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">",
                "<w:body>{body}<w:sectPr><w:pgSz w:w=\"12240\" w:h=\"15840\"/>",
                "<w:pgMar w:top=\"{m}\" w:right=\"{m}\" w:bottom=\"{m}\" w:left=\"{m}\" ",
                "w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/></w:sectPr></w:body></w:document>"
            ),
            body = self.body,
            m = PAGE_MARGIN,
        )
    }

    fn document_rels_xml(&self) -> String {
        let mut rels = String::from(concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
            "<Relationship Id=\"rIdStyles\" ",
            "Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" ",
            "Target=\"styles.xml\"/>"
        ));
        for (i, url) in self.hyperlinks.iter().enumerate() {
            rels.push_str(&format!(
                "<Relationship Id=\"rIdLink{}\" Type=\"{}\" Target=\"{}\" TargetMode=\"External\"/>",
                i + 1,
                HYPERLINK_REL_TYPE,
                xml_text(url)
            ));
        }
        rels.push_str("</Relationships>");
        rels
    }
}

fn font_xml() -> String {
    format!(
        "<w:rFonts w:ascii=\"{f}\" w:hAnsi=\"{f}\" w:cs=\"{f}\"/>",
        f = FONT
    )
}

fn run(text: &str, size: u32, bold: bool) -> String {
    format!(
        "<w:r><w:rPr>{}{}<w:sz w:val=\"{}\"/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r>",
        font_xml(),
        if bold { "<w:b/>" } else { "" },
        size,
        xml_text(text)
    )
}

// Escaped text with the control characters XML 1.0 forbids removed.
fn xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|&c| c >= ' ' || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    escape(cleaned.as_str()).into_owned()
}

const CONTENT_TYPES_XML: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
    "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
    "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
    "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    "<Override PartName=\"/word/document.xml\" ",
    "ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>",
    "<Override PartName=\"/word/styles.xml\" ",
    "ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml\"/>",
    "</Types>"
);

const PACKAGE_RELS_XML: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    "<Relationship Id=\"rId1\" ",
    "Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" ",
    "Target=\"word/document.xml\"/>",
    "</Relationships>"
);

fn styles_xml() -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
            "<w:styles xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">",
            "<w:docDefaults><w:rPrDefault><w:rPr>{font}<w:sz w:val=\"{size}\"/></w:rPr></w:rPrDefault>",
            "<w:pPrDefault><w:pPr><w:spacing w:before=\"120\" w:after=\"120\" w:line=\"240\" w:lineRule=\"auto\"/>",
            "</w:pPr></w:pPrDefault></w:docDefaults>",
            "<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\"><w:name w:val=\"Normal\"/>",
            "<w:rPr>{font}<w:sz w:val=\"{size}\"/></w:rPr></w:style>",
            "</w:styles>"
        ),
        font = font_xml(),
        size = BODY_SIZE,
    )
}

/// Render references as a Word (.docx) document
///
/// Each reference becomes a hanging-indent paragraph holding the citation
/// followed by a clickable link to its URL.
///
/// # Arguments
/// * `references` - Ordered references to render
/// * `options` - Optional header block
///
/// # Returns
/// * `Result<Vec<u8>>` - The .docx package bytes
pub fn to_docx(references: &[Reference], options: &DocumentOptions) -> Result<Vec<u8>> {
    let mut writer = DocxWriter::new();

    if !options.header_lines.is_empty() {
        for line in &options.header_lines {
            writer.header_paragraph(line);
        }
        writer.bold_paragraph(
            &options.agency_name,
            Spacing {
                before: 240,
                after: 120,
            },
        );
    }

    for reference in references {
        writer.reference_paragraph(reference);
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", PACKAGE_RELS_XML.to_string()),
        ("word/document.xml", writer.document_xml()),
        ("word/styles.xml", styles_xml()),
        ("word/_rels/document.xml.rels", writer.document_rels_xml()),
    ];
    for (name, content) in parts {
        zip.start_file(name, file_options)?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}
