pub mod capture;
pub mod report;

pub use capture::{Capture, CaptureError, CapturedMessage, load_capture, load_config, parse_hex};
pub use report::{render_catalog, render_recommendation, render_summary};
