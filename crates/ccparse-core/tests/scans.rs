use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ccparse_core::error::OcrError;
use ccparse_core::{
    EmbeddedImageRenderer, PageRecognizer, PageRenderer, PdftoppmRenderer, TextExtractor,
    TextSource,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::{dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;

/// An image XObject placed on a page, dictionary values taken as given.
struct Scan {
    width: i64,
    height: i64,
    color_space: &'static str,
    filter: Option<&'static str>,
    data: Vec<u8>,
}

impl Scan {
    fn gray(width: i64, height: i64, value: u8) -> Self {
        Self {
            width,
            height,
            color_space: "DeviceGray",
            filter: None,
            data: vec![value; (width * height) as usize],
        }
    }

    fn rgb(width: i64, height: i64, pixel: [u8; 3]) -> Self {
        Self {
            width,
            height,
            color_space: "DeviceRGB",
            filter: None,
            data: pixel.repeat((width * height) as usize),
        }
    }
}

/// Build a PDF with no text layer, one optional scan per page.
fn scanned_pdf(pages: Vec<Option<Scan>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for scan in pages {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };

        if let Some(scan) = scan {
            let mut dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => scan.width,
                "Height" => scan.height,
                "ColorSpace" => scan.color_space,
                "BitsPerComponent" => 8,
            };
            if let Some(filter) = scan.filter {
                dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
            }
            let image_id = doc.add_object(Stream::new(dict, scan.data));
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                b"q 595 0 0 842 0 0 cm /Im1 Do Q".to_vec(),
            ));
            page.set("Resources", dictionary! { "XObject" => dictionary! { "Im1" => image_id } });
            page.set("Contents", content_id);
        }

        kids.push(doc.add_object(page).into());
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
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Counts the pages it is asked to read.
struct CountingRecognizer(Arc<AtomicUsize>);

impl PageRecognizer for CountingRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok("HDFC Bank".to_string())
    }
}

#[test]
fn gray_and_rgb_scans_one_image_per_page() {
    let bytes = scanned_pdf(vec![
        Some(Scan::gray(4, 3, 200)),
        Some(Scan::rgb(2, 5, [255, 0, 0])),
    ]);

    let pages = EmbeddedImageRenderer::default().render_pages(&bytes).unwrap();
    assert_eq!(pages.len(), 2);

    let gray = pages[0].as_luma8().expect("grayscale page");
    assert_eq!(gray.dimensions(), (4, 3));
    assert_eq!(gray.get_pixel(3, 2).0, [200]);

    let rgb = pages[1].as_rgb8().expect("rgb page");
    assert_eq!(rgb.dimensions(), (2, 5));
    assert_eq!(rgb.get_pixel(1, 4).0, [255, 0, 0]);
}

#[test]
fn jpeg_scan_decoded() {
    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 8, image::Rgb([30, 60, 90])))
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .unwrap();

    let bytes = scanned_pdf(vec![Some(Scan {
        width: 16,
        height: 8,
        color_space: "DeviceRGB",
        filter: Some("DCTDecode"),
        data: jpeg,
    })]);

    let pages = EmbeddedImageRenderer::default().render_pages(&bytes).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!((pages[0].width(), pages[0].height()), (16, 8));
}

#[test]
fn absurd_dimensions_are_skipped() {
    let bytes = scanned_pdf(vec![
        Some(Scan {
            width: 4_294_967_295,
            height: 4_294_967_295,
            color_space: "DeviceRGB",
            filter: None,
            data: vec![0; 16],
        }),
        Some(Scan {
            width: -4,
            height: 4,
            color_space: "DeviceGray",
            filter: None,
            data: vec![0; 16],
        }),
        Some(Scan {
            width: 1000,
            height: 1000,
            color_space: "DeviceGray",
            filter: None,
            data: vec![0; 16],
        }),
    ]);

    let pages = EmbeddedImageRenderer::default().render_pages(&bytes).unwrap();
    assert!(pages.is_empty());
}

#[test]
fn absurd_dimensions_never_fail_extraction() {
    let bytes = scanned_pdf(vec![Some(Scan {
        width: 4_294_967_295,
        height: 4_294_967_295,
        color_space: "DeviceRGB",
        filter: None,
        data: vec![0; 16],
    })]);

    let calls = Arc::new(AtomicUsize::new(0));
    let extractor = TextExtractor::new(
        Box::new(EmbeddedImageRenderer::default()),
        Box::new(CountingRecognizer(Arc::clone(&calls))),
    );

    let extraction = extractor.extract_detailed(&bytes);
    assert_eq!(extraction.text, "");
    assert!(extraction.fallback.is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn scanned_pages_reach_recognizer() {
    let bytes = scanned_pdf(vec![Some(Scan::gray(8, 8, 255)), Some(Scan::gray(8, 8, 0))]);

    let calls = Arc::new(AtomicUsize::new(0));
    let extractor = TextExtractor::new(
        Box::new(EmbeddedImageRenderer::default()),
        Box::new(CountingRecognizer(Arc::clone(&calls))),
    );

    let extraction = extractor.extract_detailed(&bytes);
    assert_eq!(extraction.source, TextSource::Ocr);
    assert_eq!(extraction.text, "HDFC Bank HDFC Bank");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn rasterizer_failure_keeps_embedded_scans() {
    let bytes = scanned_pdf(vec![Some(Scan::gray(4, 3, 10)), None]);

    let renderer = EmbeddedImageRenderer::default()
        .with_fallback(PdftoppmRenderer::new("/nonexistent/pdftoppm", 72, None));
    let pages = renderer.render_pages(&bytes).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!((pages[0].width(), pages[0].height()), (4, 3));
}

/// A stand-in for pdftoppm that "renders" two pages by copying `png`.
#[cfg(unix)]
fn fake_pdftoppm(dir: &std::path::Path, png: &std::path::Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("pdftoppm");
    std::fs::write(
        &script,
        format!(
            "#!/bin/sh\nfor last; do :; done\ncp '{0}' \"$last-1.png\"\ncp '{0}' \"$last-2.png\"\n",
            png.display()
        ),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
#[test]
fn page_without_scan_rasterizes_document() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("render.png");
    image::GrayImage::from_pixel(9, 7, image::Luma([128])).save(&png).unwrap();
    let script = fake_pdftoppm(dir.path(), &png);

    let renderer =
        EmbeddedImageRenderer::default().with_fallback(PdftoppmRenderer::new(&script, 72, None));

    let partial = scanned_pdf(vec![Some(Scan::gray(4, 3, 10)), None]);
    let pages = renderer.render_pages(&partial).unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| (p.width(), p.height()) == (9, 7)));

    let complete = scanned_pdf(vec![Some(Scan::gray(4, 3, 10)), Some(Scan::gray(4, 3, 20))]);
    let pages = renderer.render_pages(&complete).unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| (p.width(), p.height()) == (4, 3)));
}
