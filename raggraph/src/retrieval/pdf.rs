//! PDF text extraction with `lopdf`.

use lopdf::content::Content;
use lopdf::{Document as PdfDocument, Object};

use super::RetrievalError;

/// Kerning below this (thousandths of an em) inside a `TJ` array reads as a space.
const TJ_SPACE_THRESHOLD: i64 = -200;

fn pdf_err(path: &str, e: impl std::fmt::Display) -> RetrievalError {
    RetrievalError::Pdf {
        path: path.to_string(),
        message: e.to_string(),
    }
}

fn push_string(out: &mut String, obj: &Object) {
    if let Object::String(bytes, _) = obj {
        out.push_str(&String::from_utf8_lossy(bytes));
    }
}

fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Text of every page in page order, pages separated by a blank line.
///
/// Reads the string operands of the text-showing operators (`Tj`, `TJ`, `'`, `"`);
/// the end of a text object or a line move ends a line. Pages without text are skipped.
pub(crate) fn extract_pdf_text(bytes: &[u8], path: &str) -> Result<String, RetrievalError> {
    let doc = PdfDocument::load_mem(bytes).map_err(|e| pdf_err(path, e))?;
    let mut pages: Vec<String> = Vec::new();
    for (page_no, page_id) in doc.get_pages() {
        let raw = doc.get_page_content(page_id).map_err(|e| pdf_err(path, e))?;
        let content = Content::decode(&raw).map_err(|e| pdf_err(path, e))?;
        let mut text = String::new();
        for op in &content.operations {
            match op.operator.as_str() {
                "Tj" | "'" | "\"" => op.operands.iter().for_each(|o| push_string(&mut text, o)),
                "TJ" => {
                    for operand in &op.operands {
                        if let Object::Array(items) = operand {
                            for item in items {
                                match item {
                                    Object::Integer(n) if *n < TJ_SPACE_THRESHOLD => text.push(' '),
                                    other => push_string(&mut text, other),
                                }
                            }
                        }
                    }
                }
                "ET" | "Td" | "TD" | "T*" => end_line(&mut text),
                _ => {}
            }
        }
        let text = text.trim_end();
        if text.is_empty() {
            tracing::debug!(path = path, page = page_no, "pdf page has no extractable text");
        } else {
            pages.push(text.to_string());
        }
    }
    Ok(pages.join("\n\n"))
}

/// Builds a small PDF with one page per entry, each page showing its lines via `Tj`.
#[cfg(test)]
pub(crate) fn minimal_pdf(pages: &[&[&str]]) -> Vec<u8> {
    use lopdf::content::Operation;
    use lopdf::{dictionary, Stream};

    let mut doc = PdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for line in lines.iter() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
        }
        operations.push(Operation::new("ET", vec![]));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}
