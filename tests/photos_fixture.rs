// tests/photos_fixture.rs
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};

use peloton_import::config::options::PhotosOptions;
use peloton_import::core::net::PageSource;
use peloton_import::photo::DATA_URL_PREFIX;
use peloton_import::runner::photos;
use peloton_import::{Error, Result};

const WIKI: &str = "https://wiki.test/summary";

#[derive(Default)]
struct Fixtures {
    pages: HashMap<String, String>,
    images: HashMap<String, Vec<u8>>,
    requested: Vec<String>,
}

impl Fixtures {
    fn miss(url: &str) -> Error {
        Error::Http { url: url.to_string(), reason: "HTTP 404 Not Found".into() }
    }
}

impl PageSource for Fixtures {
    fn get(&mut self, url: &str) -> Result<String> {
        self.requested.push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| Self::miss(url))
    }

    fn get_bytes(&mut self, url: &str) -> Result<Vec<u8>> {
        self.requested.push(url.to_string());
        self.images.get(url).cloned().ok_or_else(|| Self::miss(url))
    }
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([10, 120, 60, 255])))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn summary(img: &str) -> String {
    format!(r#"{{"title":"x","thumbnail":{{"source":"{img}","width":320,"height":240}}}}"#)
}

#[test]
fn photos_found_resized_and_failures_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let roster = dir.path().join("riders.csv");
    fs::write(
        &roster,
        "id,first_name,last_name,photo_url\n\
         1,Jasper,Philipsen,\n\
         2,Remco,Evenepoel,\n\
         3,Tadej,Pogacar,\"data:image/jpeg;base64,AAAA\"\n\
         4,Nobody,Known,\n\
         5,Broken,Image,\n",
    )
    .unwrap();

    let mut source = Fixtures::default();
    // full-name page
    source.pages.insert(format!("{WIKI}/Jasper%20Philipsen"), summary("https://img.test/jp.png"));
    // full-name page without an image, last-name page with one
    source.pages.insert(format!("{WIKI}/Remco%20Evenepoel"), r#"{"title":"Remco Evenepoel"}"#.into());
    source.pages.insert(format!("{WIKI}/Evenepoel"), summary("https://img.test/re.png"));
    source.pages.insert(format!("{WIKI}/Broken%20Image"), summary("https://img.test/broken.png"));
    source.images.insert("https://img.test/jp.png".into(), png(320, 240));
    source.images.insert("https://img.test/re.png".into(), png(200, 300));
    source.images.insert("https://img.test/broken.png".into(), b"<html>not an image</html>".to_vec());

    let opts = PhotosOptions {
        roster,
        out: dir.path().join("photos.sql"),
        summary_url: WIKI.into(),
        pause_ms: 0,
        ..Default::default()
    };
    let mut report = Vec::new();
    let summary = photos(&opts, &mut source, None, &mut report).unwrap();
    let report = String::from_utf8(report).unwrap();
    let sql = fs::read_to_string(&summary.files_written[0]).unwrap();

    // riders with a photo are never looked up
    assert!(!source.requested.iter().any(|u| u.contains("Pogacar")));

    assert_eq!(sql.matches("UPDATE riders SET photo_url").count(), 2);
    assert!(sql.contains("-- Jasper Philipsen (id 1)\n"));
    assert!(sql.contains("-- Remco Evenepoel (id 2)\n"));
    assert!(sql.contains("WHERE id = 2 AND (photo_url IS NULL OR photo_url = '');"));
    assert!(!sql.contains("id = 4 AND"));
    assert!(!sql.contains("id = 5 AND"));

    // the stored image is a 40x40 JPEG
    let start = sql.find(DATA_URL_PREFIX).unwrap() + DATA_URL_PREFIX.len();
    let end = start + sql[start..].find('\'').unwrap();
    let jpeg = general_purpose::STANDARD.decode(&sql[start..end]).unwrap();
    assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
    assert_eq!(image::load_from_memory(&jpeg).unwrap().dimensions(), (40, 40));

    assert!(report.contains("Nobody Known (id 4): no image found"));
    assert!(report.contains("Broken Image (id 5): cannot use image from https://img.test/broken.png"));
    assert!(report.contains("photos found: 2 of 4 (50.0%)"));
    assert!(report.contains("1 riders already had a photo"));
}

#[test]
fn limit_stops_early() {
    let dir = tempfile::tempdir().unwrap();
    let roster = dir.path().join("riders.csv");
    fs::write(&roster, "id,first_name,last_name\n1,A,Aaa\n2,B,Bbb\n3,C,Ccc\n").unwrap();

    let opts = PhotosOptions {
        roster,
        out: dir.path().join("photos.sql"),
        summary_url: WIKI.into(),
        limit: Some(1),
        pause_ms: 0,
        ..Default::default()
    };
    let mut source = Fixtures::default();
    let mut report = Vec::new();
    let summary = photos(&opts, &mut source, None, &mut report).unwrap();

    // one rider, two lookups (full name, then last name)
    assert_eq!(source.requested, vec![format!("{WIKI}/A%20Aaa"), format!("{WIKI}/Aaa")]);
    let sql = fs::read_to_string(&summary.files_written[0]).unwrap();
    assert!(sql.contains("-- No photos found"));
}
