use std::fmt;

use ndarray::ArrayD;

use crate::ingest::Rescale;

/// A DICOM tag: group and element number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub u16, pub u16);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

/// Well-known tags used by the info panels and the ingestion pre-step.
pub mod tags {
    use super::Tag;

    pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
    pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
    pub const MODALITY: Tag = Tag(0x0008, 0x0060);
    pub const PHYSICIAN_NAME: Tag = Tag(0x0008, 0x0090);
    pub const PHYSICIAN_ID: Tag = Tag(0x0008, 0x1048);
    pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
    pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
    pub const PATIENT_BIRTH_DATE: Tag = Tag(0x0010, 0x0030);
    pub const PATIENT_SEX: Tag = Tag(0x0010, 0x0040);
    pub const STUDY_ID: Tag = Tag(0x0020, 0x0010);
    pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
    pub const ROWS: Tag = Tag(0x0028, 0x0010);
    pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
    pub const RESCALE_INTERCEPT: Tag = Tag(0x0028, 0x1052);
    pub const RESCALE_SLOPE: Tag = Tag(0x0028, 0x1053);
    pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);
}

/// A decoded element value. Binary payloads carry only their length; the
/// bytes themselves stay with the pixel decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Text(String),
    Number(f64),
    Binary(usize),
}

impl ElementValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ElementValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ElementValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementValue::Text(s) => f.write_str(s),
            ElementValue::Number(n) => write!(f, "{n}"),
            ElementValue::Binary(len) => write!(f, "Binary data: {len} bytes"),
        }
    }
}

/// A named element as shown in the metadata table.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub value: ElementValue,
}

/// An already-decoded DICOM dataset: named elements in file order plus the
/// decoded frame stack. Absent elements are represented as absent —
/// lookups return `Option`, and the "N/A" placeholder only appears at the
/// presentation boundary ([`DicomDataset::value_display`]).
#[derive(Debug, Default)]
pub struct DicomDataset {
    elements: Vec<(Tag, Element)>,
    frames: Vec<ArrayD<f32>>,
}

impl DicomDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an element.
    pub fn insert(&mut self, tag: Tag, name: impl Into<String>, value: ElementValue) {
        let element = Element {
            name: name.into(),
            value,
        };
        match self.elements.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, existing)) => *existing = element,
            None => self.elements.push((tag, element)),
        }
    }

    pub fn set_frames(&mut self, frames: Vec<ArrayD<f32>>) {
        self.frames = frames;
    }

    pub fn element(&self, tag: Tag) -> Option<&Element> {
        self.elements
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, e)| e)
    }

    /// All elements in insertion (file) order.
    pub fn elements(&self) -> impl Iterator<Item = (Tag, &Element)> {
        self.elements.iter().map(|(t, e)| (*t, e))
    }

    /// Case-insensitive substring search over element names.
    pub fn find_by_name(&self, query: &str) -> Vec<(Tag, &Element)> {
        let query = query.trim().to_lowercase();
        self.elements
            .iter()
            .filter(|(_, e)| e.name.to_lowercase().contains(&query))
            .map(|(t, e)| (*t, e))
            .collect()
    }

    pub fn text(&self, tag: Tag) -> Option<&str> {
        self.element(tag).and_then(|e| e.value.as_text())
    }

    pub fn number(&self, tag: Tag) -> Option<f64> {
        self.element(tag).and_then(|e| e.value.as_number())
    }

    /// Presentation form of an element value; absent elements render as
    /// "N/A".
    pub fn value_display(&self, tag: Tag) -> String {
        match self.element(tag) {
            Some(e) => e.value.to_string(),
            None => "N/A".to_string(),
        }
    }

    /// The rescale pair, present only when both halves are.
    pub fn rescale(&self) -> Option<Rescale> {
        let slope = self.number(tags::RESCALE_SLOPE)?;
        let intercept = self.number(tags::RESCALE_INTERCEPT)?;
        Some(Rescale {
            slope: slope as f32,
            intercept: intercept as f32,
        })
    }

    pub fn frames(&self) -> &[ArrayD<f32>] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// More than one frame means the dataset plays as a cine loop.
    pub fn is_multi_frame(&self) -> bool {
        self.frames.len() > 1
    }

    /// Overwrite the identifying fields with prefix-derived placeholders.
    /// Fields missing from the dataset are created so the output carries
    /// no gaps.
    pub fn anonymize(&mut self, prefix: &str) {
        self.insert(
            tags::PATIENT_NAME,
            "Patient's Name",
            ElementValue::Text(format!("{prefix}_Patient")),
        );
        self.insert(
            tags::PATIENT_ID,
            "Patient ID",
            ElementValue::Text(format!("{prefix}_ID")),
        );
        self.insert(
            tags::STUDY_ID,
            "Study ID",
            ElementValue::Text(format!("{prefix}_Study")),
        );
        self.insert(
            tags::PATIENT_BIRTH_DATE,
            "Patient's Birth Date",
            ElementValue::Text(format!("{prefix}_BirthDate")),
        );
        self.insert(
            tags::PATIENT_SEX,
            "Patient's Sex",
            ElementValue::Text("O".to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DicomDataset {
        let mut ds = DicomDataset::new();
        ds.insert(
            tags::PATIENT_NAME,
            "Patient's Name",
            ElementValue::Text("DOE^JANE".into()),
        );
        ds.insert(tags::MODALITY, "Modality", ElementValue::Text("CT".into()));
        ds.insert(tags::ROWS, "Rows", ElementValue::Number(512.0));
        ds.insert(tags::PIXEL_DATA, "Pixel Data", ElementValue::Binary(524288));
        ds
    }

    #[test]
    fn lookup_is_typed_and_absence_is_explicit() {
        let ds = sample();
        assert_eq!(ds.text(tags::MODALITY), Some("CT"));
        assert_eq!(ds.number(tags::ROWS), Some(512.0));
        assert_eq!(ds.element(tags::STUDY_DATE), None);
        // Sentinel only appears when formatting for display.
        assert_eq!(ds.value_display(tags::STUDY_DATE), "N/A");
        assert_eq!(ds.value_display(tags::PIXEL_DATA), "Binary data: 524288 bytes");
    }

    #[test]
    fn tag_formats_as_grouped_hex() {
        assert_eq!(tags::PATIENT_NAME.to_string(), "(0010,0010)");
        assert_eq!(tags::PIXEL_DATA.to_string(), "(7FE0,0010)");
    }

    #[test]
    fn name_search_is_case_insensitive_substring() {
        let ds = sample();
        let hits = ds.find_by_name("patient");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, tags::PATIENT_NAME);

        assert_eq!(ds.find_by_name("MODAL").len(), 1);
        assert_eq!(ds.find_by_name("  data").len(), 1);
        assert!(ds.find_by_name("physician").is_empty());
    }

    #[test]
    fn rescale_needs_both_halves() {
        let mut ds = sample();
        assert_eq!(ds.rescale(), None);
        ds.insert(
            tags::RESCALE_SLOPE,
            "Rescale Slope",
            ElementValue::Number(2.0),
        );
        assert_eq!(ds.rescale(), None);
        ds.insert(
            tags::RESCALE_INTERCEPT,
            "Rescale Intercept",
            ElementValue::Number(-1024.0),
        );
        assert_eq!(
            ds.rescale(),
            Some(Rescale {
                slope: 2.0,
                intercept: -1024.0
            })
        );
    }

    #[test]
    fn anonymize_overwrites_and_fills_gaps() {
        let mut ds = sample();
        ds.anonymize("anon");
        assert_eq!(ds.text(tags::PATIENT_NAME), Some("anon_Patient"));
        assert_eq!(ds.text(tags::PATIENT_ID), Some("anon_ID"));
        assert_eq!(ds.text(tags::STUDY_ID), Some("anon_Study"));
        assert_eq!(ds.text(tags::PATIENT_BIRTH_DATE), Some("anon_BirthDate"));
        assert_eq!(ds.text(tags::PATIENT_SEX), Some("O"));
        // Untouched elements survive.
        assert_eq!(ds.text(tags::MODALITY), Some("CT"));
    }
}
