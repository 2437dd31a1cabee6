use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use platescan::{PlateError, TextRecognizer};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tempfile::NamedTempFile;

pub const SCENE_WIDTH: u32 = 320;
pub const SCENE_HEIGHT: u32 = 240;

/// Plate rectangle drawn by [`plate_scene`]: x, y, width, height
pub const PLATE: (i32, i32, u32, u32) = (80, 90, 160, 60);

const BACKGROUND: Rgb<u8> = Rgb([70, 75, 80]);
const PLATE_WHITE: Rgb<u8> = Rgb([235, 235, 235]);
const INK: Rgb<u8> = Rgb([15, 15, 15]);

/// Uniform background, no edges at all
pub fn blank_scene() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(SCENE_WIDTH, SCENE_HEIGHT, BACKGROUND))
}

/// A well-lit white plate with dark glyph strokes on a darker background
pub fn plate_scene() -> DynamicImage {
    let mut img = RgbImage::from_pixel(SCENE_WIDTH, SCENE_HEIGHT, BACKGROUND);
    let (x, y, w, h) = PLATE;
    draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(w, h), PLATE_WHITE);

    // Seven glyph-like vertical strokes
    for i in 0..7 {
        let gx = x + 14 + i * 20;
        draw_filled_rect_mut(&mut img, Rect::at(gx, y + 15).of_size(6, 30), INK);
    }
    DynamicImage::ImageRgb8(img)
}

/// The plate with its lower-right corner hidden: the visible outline has five corners
pub fn occluded_plate_scene() -> DynamicImage {
    let mut img = RgbImage::from_pixel(SCENE_WIDTH, SCENE_HEIGHT, BACKGROUND);
    let (x, y, w, h) = PLATE;
    let (r, b) = (x + w as i32, y + h as i32);
    let outline = [
        Point::new(x, y),
        Point::new(r, y),
        Point::new(r, y + 20),
        Point::new(r - 60, b),
        Point::new(x, b),
    ];
    draw_polygon_mut(&mut img, &outline, PLATE_WHITE);
    DynamicImage::ImageRgb8(img)
}

/// Save an image to a temporary PNG file
pub fn save_temp_png(img: &DynamicImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Recognizer returning a fixed raw string and counting its calls
pub struct StubRecognizer {
    pub raw: String,
    pub calls: AtomicUsize,
}

impl StubRecognizer {
    pub fn new(raw: &str) -> Arc<Self> {
        Arc::new(Self {
            raw: raw.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextRecognizer for StubRecognizer {
    fn recognize(&self, image: &image::GrayImage) -> Result<String, PlateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(
            image.pixels().all(|p| p[0] == 0 || p[0] == 255),
            "recognizer must receive a binarized image"
        );
        Ok(self.raw.clone())
    }
}

/// Recognizer whose engine is unusable
pub struct BrokenRecognizer;

impl TextRecognizer for BrokenRecognizer {
    fn recognize(&self, _image: &image::GrayImage) -> Result<String, PlateError> {
        Err(PlateError::engine("model data missing"))
    }
}

/// Accept one HTTP request, answer with `status`, and hand back the raw request
pub fn one_shot_server(status: u16) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        // Headers, then as much body as Content-Length announces
        let header_end = loop {
            let n = stream.read(&mut chunk).expect("read request");
            if n == 0 {
                break buf.len();
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).expect("read body");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {} Test\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            status
        );
        stream.write_all(response.as_bytes()).expect("write response");
        String::from_utf8_lossy(&buf).into_owned()
    });

    (base_url, handle)
}

/// A local URL nothing listens on
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
