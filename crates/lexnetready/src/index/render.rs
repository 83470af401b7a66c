use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, StringFormat};

use crate::index::IndexEntry;

// A4 in points.
const PAGE_WIDTH: f64 = 595.0;
const PAGE_HEIGHT: f64 = 842.0;
const MARGIN: f64 = 72.0;

const TITLE_SIZE: f64 = 20.0;
const ENTRY_SIZE: f64 = 11.0;
const FOOTER_SIZE: f64 = 8.0;
const ENTRY_LEADING: f64 = 18.0;
const TITLE_GAP: f64 = 36.0;
const FOOTER_GAP: f64 = 36.0;

/// Lays out `entries` under `title` and returns the serialized PDF.
pub fn render_index(
    title: &str,
    entries: &[IndexEntry],
    footer: &str,
) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut pages = Vec::new();
    let mut page = PageBuilder::new();
    page.centered_text("F2", TITLE_SIZE, TITLE_SIZE * 0.55, title);
    page.cursor -= TITLE_GAP;

    for entry in entries {
        if page.cursor < MARGIN + ENTRY_LEADING {
            pages.push(page);
            page = PageBuilder::new();
        }
        page.link_entry(entry);
    }

    if page.cursor < MARGIN + FOOTER_GAP {
        pages.push(page);
        page = PageBuilder::new();
    }
    page.cursor -= FOOTER_GAP;
    page.footer(footer);
    pages.push(page);

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = page.write(&mut doc, pages_id, resources_id)?;
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_text(title), StringFormat::Literal),
        "Producer" => Object::string_literal("LexnetReady"),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

struct PageBuilder {
    operations: Vec<Operation>,
    annotations: Vec<lopdf::Dictionary>,
    cursor: f64,
}

impl PageBuilder {
    fn new() -> Self {
        Self {
            operations: Vec::new(),
            annotations: Vec::new(),
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    fn text(&mut self, font: &str, size: f64, x: f64, gray: f64, text: &str) {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("g", vec![gray.into()]),
            Operation::new("Tf", vec![font.into(), size.into()]),
            Operation::new("Td", vec![x.into(), self.cursor.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_text(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Helvetica has no metrics here; `avg_width` approximates a glyph.
    fn centered_text(&mut self, font: &str, size: f64, avg_width: f64, text: &str) {
        let width = text.chars().count() as f64 * avg_width;
        let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
        self.text(font, size, x, 0.0, text);
    }

    fn link_entry(&mut self, entry: &IndexEntry) {
        self.text("F1", ENTRY_SIZE, MARGIN, 0.0, &entry.display_name);

        let width = (entry.display_name.chars().count() as f64 * ENTRY_SIZE * 0.6)
            .min(PAGE_WIDTH - 2.0 * MARGIN);
        let rect: Vec<Object> = vec![
            MARGIN.into(),
            (self.cursor - 3.0).into(),
            (MARGIN + width).into(),
            (self.cursor + ENTRY_SIZE).into(),
        ];
        let target = Object::String(entry.file_name.as_bytes().to_vec(), StringFormat::Literal);
        self.annotations.push(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => rect,
            "Border" => vec![0.into(), 0.into(), 0.into()],
            "A" => dictionary! {
                "S" => "GoToR",
                "F" => target,
                "D" => vec![0.into(), "Fit".into()],
                "NewWindow" => true,
            },
        });

        self.cursor -= ENTRY_LEADING;
    }

    fn footer(&mut self, footer: &str) {
        let width = footer.chars().count() as f64 * FOOTER_SIZE * 0.5;
        let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
        self.text("F1", FOOTER_SIZE, x, 0.75, footer);
    }

    fn write(
        self,
        doc: &mut Document,
        pages_id: ObjectId,
        resources_id: ObjectId,
    ) -> Result<ObjectId, lopdf::Error> {
        let content = Content {
            operations: self.operations,
        };
        let content_id = doc.add_object(lopdf::Stream::new(dictionary! {}, content.encode()?));

        let annots: Vec<Object> = self
            .annotations
            .into_iter()
            .map(|annot| doc.add_object(annot).into())
            .collect();

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
            "Annots" => annots,
        });
        Ok(page_id)
    }
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// WinAnsi bytes for `text`. Latin-1 characters map to themselves, which
/// covers Spanish accents; anything else becomes `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            match code {
                0x20..=0x7E | 0xA0..=0xFF => code as u8,
                _ => b'?',
            }
        })
        .collect()
}
