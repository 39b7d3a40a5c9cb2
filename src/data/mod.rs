//! Data models and value parsing.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "10s", "50ms")
//! - [`length`]: Physical image dimensions (e.g., "10cm", "4in") and pixel conversion
//! - [`sample`]: Core data models ([`Sample`], [`SamplingRun`], [`RunSummary`])
//!
//! ## Data Flow
//!
//! ```text
//! Sampler::run()
//!        │
//!        ▼
//! SamplingRun (ordered Samples)
//!        │
//!        ├──▶ plot::build_panels() ──▶ Renderer
//!        │
//!        └──▶ SamplingRun::summary() (logged)
//! ```

pub mod duration;
pub mod length;
pub mod sample;

pub use length::{parse_length, Length, DEFAULT_DPI};
pub use sample::{RunSummary, Sample, SamplingRun};
