//! SSML helpers
//!
//! Pure string functions over the speech markup subset the platform accepts:
//! the `<speak>` envelope, paragraph tags, and inline phoneme / emphasis /
//! prosody spans.

#[cfg(test)]
mod proptests;

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static PARA_JOIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</p>[ ]*<p>").expect("valid regex"));
static PARA_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[/]*p>").expect("valid regex"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"  +").expect("valid regex"));

const PITCH_MAX: f64 = 50.0;
const PITCH_MIN: f64 = -33.3;
const VOLUME_MAX: f64 = 4.08;
const VOLUME_MIN: f64 = -12.0;

/// Wrap paragraphs in `<speak>`, each in `<p>` when `add_para_tags` is set
pub fn wrap_speak<S: AsRef<str>>(paras: &[S], add_para_tags: bool) -> String {
    let mut out = String::from("<speak>");
    for para in paras {
        if add_para_tags {
            out.push_str("<p>");
            out.push_str(para.as_ref());
            out.push_str("</p>");
        } else {
            out.push_str(para.as_ref());
        }
    }
    out.push_str("</speak>");
    out
}

/// [`wrap_speak`] with paragraph tags
pub fn wrap_paragraphs<S: AsRef<str>>(paras: &[S]) -> String {
    wrap_speak(paras, true)
}

/// Remove every `<speak>` and `</speak>` tag, leaving the inner markup
pub fn unwrap_speak(ssml: &str) -> String {
    ssml.replace("<speak>", "").replace("</speak>", "")
}

/// Reduce markup to display text.
///
/// Pass order is significant: adjacent `</p> <p>` pairs merge first so they
/// yield a single paragraph break, remaining paragraph tags become `\n\n`,
/// then all other tags go, then space runs collapse.
pub fn strip_ssml(ssml: &str) -> String {
    let merged = PARA_JOIN.replace_all(ssml, "<p>");
    let paragraphs = PARA_TAG.replace_all(&merged, "\n\n");
    let untagged = ANY_TAG.replace_all(&paragraphs, "");
    let collapsed = MULTI_SPACE.replace_all(&untagged, " ");
    // Escaped newline triples (literal backslash-n text) become a real break
    let unescaped = collapsed.replace("\\n\\n\\n", "\n\n");
    unescaped
        .trim_start_matches('\n')
        .trim_end_matches('\n')
        .to_string()
}

/// Phonetic alphabet for `<phoneme>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhonemeAlphabet {
    #[default]
    Ipa,
    XSampa,
}

impl PhonemeAlphabet {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ipa => "ipa",
            Self::XSampa => "x-sampa",
        }
    }
}

/// `<phoneme alphabet=".." ph="..">text</phoneme>`
pub fn phoneme(text: &str, pronunciation: &str, alphabet: PhonemeAlphabet) -> String {
    format!(
        r#"<phoneme alphabet="{}" ph="{pronunciation}">{text}</phoneme>"#,
        alphabet.as_str()
    )
}

/// Emphasis strength for `<emphasis>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmphasisLevel {
    Strong,
    #[default]
    Moderate,
    Reduced,
}

impl EmphasisLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Reduced => "reduced",
        }
    }
}

/// `<emphasis level="..">text</emphasis>`
pub fn emphasis(text: &str, level: EmphasisLevel) -> String {
    format!(r#"<emphasis level="{}">{text}</emphasis>"#, level.as_str())
}

/// Speaking rate: a named step or a percentage of the default rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProsodyRate {
    XSlow,
    Slow,
    Medium,
    Fast,
    XFast,
    Percent(f64),
}

/// Pitch: a named step or a relative percentage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProsodyPitch {
    XLow,
    Low,
    Medium,
    High,
    XHigh,
    Percent(f64),
}

/// Volume: a named step or a relative gain
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProsodyVolume {
    Silent,
    XSoft,
    Soft,
    Medium,
    Loud,
    XLoud,
    Percent(f64),
}

impl fmt::Display for ProsodyRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XSlow => f.write_str("x-slow"),
            Self::Slow => f.write_str("slow"),
            Self::Medium => f.write_str("medium"),
            Self::Fast => f.write_str("fast"),
            Self::XFast => f.write_str("x-fast"),
            Self::Percent(n) => write!(f, "{n}%"),
        }
    }
}

impl fmt::Display for ProsodyPitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XLow => f.write_str("x-low"),
            Self::Low => f.write_str("low"),
            Self::Medium => f.write_str("medium"),
            Self::High => f.write_str("high"),
            Self::XHigh => f.write_str("x-high"),
            Self::Percent(n) if *n > 0.0 => write!(f, "+{n}%"),
            Self::Percent(n) => write!(f, "{n}%"),
        }
    }
}

impl fmt::Display for ProsodyVolume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => f.write_str("silent"),
            Self::XSoft => f.write_str("x-soft"),
            Self::Soft => f.write_str("soft"),
            Self::Medium => f.write_str("medium"),
            Self::Loud => f.write_str("loud"),
            Self::XLoud => f.write_str("x-loud"),
            Self::Percent(n) if *n >= 0.0 => write!(f, "+{n}%"),
            Self::Percent(n) => write!(f, "{n}%"),
        }
    }
}

/// Attributes for [`prosody`]; unset fields are omitted
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProsodyOptions {
    pub rate: Option<ProsodyRate>,
    pub pitch: Option<ProsodyPitch>,
    pub volume: Option<ProsodyVolume>,
}

/// `<prosody rate=".." pitch=".." volume="..">text</prosody>`
///
/// Numeric values outside the platform's documented range are logged and
/// emitted anyway. A numeric zero is treated as unset.
pub fn prosody(text: &str, options: ProsodyOptions) -> String {
    let mut attrs: Vec<String> = Vec::new();

    if let Some(rate) = options.rate.filter(|r| !is_zero_rate(*r)) {
        attrs.push(format!(r#"rate="{rate}""#));
    }

    if let Some(pitch) = options.pitch.filter(|p| !is_zero_pitch(*p)) {
        if let ProsodyPitch::Percent(n) = pitch {
            if n > PITCH_MAX {
                tracing::warn!(max = PITCH_MAX, actual = n, "Prosody pitch above maximum");
            } else if n < PITCH_MIN {
                tracing::warn!(min = PITCH_MIN, actual = n, "Prosody pitch below minimum");
            }
        }
        attrs.push(format!(r#"pitch="{pitch}""#));
    }

    if let Some(volume) = options.volume.filter(|v| !is_zero_volume(*v)) {
        if let ProsodyVolume::Percent(n) = volume {
            if n > VOLUME_MAX {
                tracing::warn!(max = VOLUME_MAX, actual = n, "Prosody volume above maximum");
            } else if n < VOLUME_MIN {
                tracing::warn!(min = VOLUME_MIN, actual = n, "Prosody volume below minimum");
            }
        }
        attrs.push(format!(r#"volume="{volume}""#));
    }

    format!("<prosody {}>{text}</prosody>", attrs.join(" "))
}

fn is_zero_rate(rate: ProsodyRate) -> bool {
    matches!(rate, ProsodyRate::Percent(n) if n == 0.0)
}

fn is_zero_pitch(pitch: ProsodyPitch) -> bool {
    matches!(pitch, ProsodyPitch::Percent(n) if n == 0.0)
}

fn is_zero_volume(volume: ProsodyVolume) -> bool {
    matches!(volume, ProsodyVolume::Percent(n) if n == 0.0)
}
