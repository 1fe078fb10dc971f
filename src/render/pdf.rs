//! PDF output via lopdf.
//!
//! Each page gets its own MediaBox in points. Cards are embedded unchanged
//! as DCTDecode image XObjects and drawn with a `cm` transform; layout uses
//! a top-left origin, so y is flipped against the page height.

use std::fs;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tempfile::NamedTempFile;

use super::{PageRenderer, RenderError};
use crate::imaging::CardImage;
use crate::layout::{mm_to_pt, PageSize, Placement};

fn real(value: f64) -> Object {
    (value as f32).into()
}

struct OpenPage {
    size: PageSize,
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

/// Builds a multi-page PDF in memory and writes it atomically.
pub struct PdfRenderer {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    current: Option<OpenPage>,
    images: usize,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfRenderer {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            current: None,
            images: 0,
        }
    }

    /// Pages started so far, including the open one.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.current.is_some())
    }

    fn close_page(&mut self) -> Result<(), RenderError> {
        let Some(page) = self.current.take() else {
            return Ok(());
        };

        let content = Content {
            operations: page.operations,
        }
        .encode()
        .map_err(|e| RenderError::Document(e.to_string()))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(page.size.width_pt()),
                real(page.size.height_pt()),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => page.xobjects,
            },
        });
        self.page_ids.push(page_id);
        Ok(())
    }
}

impl PageRenderer for PdfRenderer {
    fn begin_page(&mut self, size: PageSize) -> Result<(), RenderError> {
        self.close_page()?;
        self.current = Some(OpenPage {
            size,
            operations: Vec::new(),
            xobjects: Dictionary::new(),
        });
        Ok(())
    }

    fn place_image(
        &mut self,
        image: &CardImage,
        placement: &Placement,
    ) -> Result<(), RenderError> {
        let page = self.current.as_mut().ok_or(RenderError::NoPage)?;

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.pixel_width),
                "Height" => i64::from(image.pixel_height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "DCTDecode",
            },
            image.jpeg.clone(),
        )
        .with_compression(false);
        let image_id = self.doc.add_object(stream);

        self.images += 1;
        let name = format!("Im{}", self.images);
        page.xobjects.set(name.as_bytes(), image_id);

        let width = mm_to_pt(placement.width_mm);
        let height = mm_to_pt(placement.height_mm);
        let x = mm_to_pt(placement.x_mm);
        let y = page.size.height_pt() - mm_to_pt(placement.y_mm + placement.height_mm);

        page.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(width),
                    real(0.0),
                    real(0.0),
                    real(height),
                    real(x),
                    real(y),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn finish(&mut self, output: &Path) -> Result<(), RenderError> {
        self.close_page()?;

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let write_error = |message: String| RenderError::Write {
            path: output.to_path_buf(),
            message,
        };
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| write_error(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_error(e.to_string()))?;
        self.doc
            .save_to(tmp.as_file_mut())
            .map_err(|e| write_error(e.to_string()))?;
        tmp.persist(output)
            .map_err(|e| write_error(e.error.to_string()))?;

        log::debug!(
            "Saved {} pages with {} images to {}",
            self.page_ids.len(),
            self.images,
            output.display()
        );
        Ok(())
    }
}
