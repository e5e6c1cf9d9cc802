//! Speech builder
//!
//! Accumulates ordered bits and flattens them into an [`OutputSpeech`] whose
//! `text` is suitable for cards and whose `ssml` is suitable for audio.

use crate::envelope::{OutputSpeech, OutputSpeechType};
use crate::ssml::{strip_ssml, unwrap_speak, wrap_paragraphs};
use serde::{Deserialize, Serialize};

/// One piece of speech waiting to be assembled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SpeechBit {
    /// Spoken and shown verbatim
    Text(String),
    /// Raw markup; shown with tags stripped
    Ssml(String),
    /// Pause in seconds, fractions allowed; markup only
    Break(f64),
    /// A previously built output spliced in
    #[serde(rename = "existingOutputSpeech")]
    Existing(OutputSpeech),
}

/// Fluent builder for [`OutputSpeech`]
#[derive(Debug, Clone, Default)]
pub struct SpeechBuilder {
    bits: Vec<SpeechBit>,
}

impl SpeechBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fluent entry point, reads as `SpeechBuilder::with().text(..)`
    pub fn with() -> Self {
        Self::new()
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.bits.push(SpeechBit::Text(text.into()));
        self
    }

    #[must_use]
    pub fn ssml(mut self, ssml: impl Into<String>) -> Self {
        self.bits.push(SpeechBit::Ssml(ssml.into()));
        self
    }

    #[must_use]
    pub fn pause(mut self, seconds: f64) -> Self {
        self.bits.push(SpeechBit::Break(seconds));
        self
    }

    #[must_use]
    pub fn existing(mut self, output: OutputSpeech) -> Self {
        self.bits.push(SpeechBit::Existing(output));
        self
    }

    pub fn bits(&self) -> &[SpeechBit] {
        &self.bits
    }

    /// Assemble the bits. The markup is wrapped in `<speak><p>..</p></speak>`
    /// exactly once.
    pub fn output_speech(self) -> OutputSpeech {
        let mut text = String::new();
        let mut ssml = String::new();

        for bit in self.bits {
            if !text.is_empty() || !ssml.is_empty() {
                // Pauses never touch the text stream, separator included
                if !matches!(bit, SpeechBit::Break(_)) {
                    text.push(' ');
                }
                ssml.push(' ');
            }

            match bit {
                SpeechBit::Text(value) => {
                    text.push_str(&value);
                    ssml.push_str(&value);
                }
                SpeechBit::Ssml(value) => {
                    text.push_str(&strip_ssml(&value));
                    ssml.push_str(&value);
                }
                SpeechBit::Break(seconds) => {
                    // Pause before any content: drop the lone separator
                    if ssml == " " {
                        ssml.clear();
                    }
                    ssml.push_str(&format!("<break time='{seconds}s'/>"));
                }
                SpeechBit::Existing(existing) => {
                    splice_existing(&mut text, &mut ssml, &existing);
                }
            }
        }

        tracing::debug!(text = %text, ssml = %ssml, "Speech assembled");

        OutputSpeech {
            speech_type: OutputSpeechType::Ssml,
            text,
            ssml: wrap_paragraphs(&[ssml]),
        }
    }
}

fn splice_existing(text: &mut String, ssml: &mut String, existing: &OutputSpeech) {
    match (existing.text.is_empty(), existing.ssml.is_empty()) {
        (false, false) => {
            text.push_str(&existing.text);
            ssml.push_str(&unwrap_speak(&existing.ssml));
        }
        (false, true) => {
            text.push_str(&existing.text);
            ssml.push_str(&existing.text);
        }
        _ => {
            let unwrapped = unwrap_speak(&existing.ssml);
            text.push_str(&strip_ssml(&unwrapped));
            ssml.push_str(&unwrapped);
        }
    }
}

impl OutputSpeech {
    /// Output from a single plain sentence
    pub fn from_text(text: impl Into<String>) -> Self {
        SpeechBuilder::with().text(text).output_speech()
    }
}
