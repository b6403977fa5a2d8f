#![allow(dead_code, clippy::unwrap_used)]

use async_trait::async_trait;
use deskpilot_tools::device::DeviceResult;
use deskpilot_tools::*;
use image::{ImageBuffer, ImageFormat, Rgba};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Backend stub that records every call and serves a fixed raw capture.
#[derive(Clone)]
pub struct RecordingBackend {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub raw_size: (u32, u32),
    pub fail_input: Arc<AtomicBool>,
}

impl RecordingBackend {
    pub fn new(raw_width: u32, raw_height: u32) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            raw_size: (raw_width, raw_height),
            fail_input: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than screen captures.
    pub fn input_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c != "capture")
            .collect()
    }

    fn record(&self, call: String) -> DeviceResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail_input.load(Ordering::SeqCst) {
            return Err(ToolError::DeviceCommand("injected failure".to_string()));
        }
        Ok(())
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

#[async_trait]
impl DeviceBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn capture_raw(&self) -> DeviceResult<Vec<u8>> {
        self.calls.lock().unwrap().push("capture".to_string());
        Ok(png(self.raw_size.0, self.raw_size.1))
    }

    async fn move_to(&self, at: Point) -> DeviceResult<()> {
        self.record(format!("move {},{}", at.x, at.y))
    }

    async fn click(&self, at: Point, button: MouseButton) -> DeviceResult<()> {
        self.record(format!("click {},{} {:?}", at.x, at.y, button))
    }

    async fn double_click(&self, at: Point) -> DeviceResult<()> {
        self.record(format!("double_click {},{}", at.x, at.y))
    }

    async fn drag(&self, from: Point, to: Point) -> DeviceResult<()> {
        self.record(format!("drag {},{} -> {},{}", from.x, from.y, to.x, to.y))
    }

    async fn type_text(&self, text: &str) -> DeviceResult<()> {
        self.record(format!("type {text}"))
    }

    async fn key(&self, code: &str) -> DeviceResult<()> {
        self.record(format!("key {code}"))
    }

    async fn scroll(&self, at: Point, direction: ScrollDirection, amount: u32) -> DeviceResult<()> {
        self.record(format!("scroll {},{} {:?} {}", at.x, at.y, direction, amount))
    }
}

pub fn dispatcher(backend: RecordingBackend) -> ActionDispatcher<RecordingBackend> {
    ActionDispatcher::new(Screen::new(backend, Display::new(1920, 1080)), 60_000)
}
