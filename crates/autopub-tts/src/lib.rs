//! Speech synthesis for the AutoPub pipeline.
//!
//! Two engines behind one façade: a streaming neural engine tried
//! first, and an always-available fallback that trades voice fidelity
//! for reliability. One successful artifact comes back, or a single
//! terminal error after every engine failed.

pub mod engine;
pub mod error;
pub mod fallback;
pub mod neural;
pub mod text;

pub use engine::{SpeechRequest, SpeechSynthesizer, SynthesisEngine};
pub use error::{SynthesisError, SynthesisResult};
pub use fallback::TranslateEngine;
pub use neural::{NeuralConfig, NeuralEngine};
