use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Four `[x, y]` corners of a text region, clockwise from top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox(pub [[i32; 2]; 4]);

impl BoundingBox {
    /// Axis-aligned box from its left/top corner and size
    pub fn from_rect(left: i32, top: i32, width: i32, height: i32) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self([[left, top], [right, top], [right, bottom], [left, bottom]])
    }

    /// Build a box from OCR polygon points.
    ///
    /// Exactly four points are kept as given; any other count collapses to
    /// the enclosing axis-aligned rectangle. Returns `None` for no points.
    pub fn from_points(points: &[[f64; 2]]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let round = |p: &[f64; 2]| [p[0].round() as i32, p[1].round() as i32];

        if let [a, b, c, d] = points {
            return Some(Self([round(a), round(b), round(c), round(d)]));
        }

        let min_x = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
        let min_y = points.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);
        let max_y = points.iter().map(|p| p[1]).fold(f64::NEG_INFINITY, f64::max);

        Some(Self([
            round(&[min_x, min_y]),
            round(&[max_x, min_y]),
            round(&[max_x, max_y]),
            round(&[min_x, max_y]),
        ]))
    }

    pub fn corners(&self) -> Vec<[i32; 2]> {
        self.0.to_vec()
    }
}

/// One line of text found by OCR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    pub bounding_box: BoundingBox,
    pub text: String,
    /// Engine confidence in `[0, 1]`
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityLabel {
    Person,
    Organization,
    Location,
    Date,
    Other(String),
}

impl EntityLabel {
    /// Map spaCy/OntoNotes label names onto our labels
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "PERSON" | "PER" => Self::Person,
            "ORG" | "ORGANIZATION" => Self::Organization,
            "GPE" | "LOC" | "LOCATION" => Self::Location,
            "DATE" => Self::Date,
            other => Self::Other(other.to_string()),
        }
    }
}

/// An entity found in a single OCR region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEntity {
    pub text: String,
    pub label: EntityLabel,
    /// Index into the region list the entity was recognized in
    pub region_index: usize,
}

/// The name a caller claims is on the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedName {
    pub first_name: String,
    pub last_name: String,
}

impl ClaimedName {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Title-cased "First Last", the form candidates are scored against
    pub fn full_name(&self) -> String {
        crate::utils::text::title_case(&format!("{} {}", self.first_name.trim(), self.last_name.trim()))
    }
}

/// Outcome of matching a document against a claimed name.
///
/// An empty name with a score of 0 means nothing person-like was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub first_name: String,
    pub last_name: String,
    pub bounding_box: Option<BoundingBox>,
    pub similarity_score: u8,
}

impl MatchResult {
    pub fn no_match() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            bounding_box: None,
            similarity_score: 0,
        }
    }

    pub fn is_match_found(&self) -> bool {
        self.bounding_box.is_some()
    }
}

/// Multipart body accepted by `POST /upload`
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    pub first_name: String,
    pub last_name: String,
    /// Scanned document image (.jpg, .jpeg or .png)
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub first_name: String,
    pub last_name: String,
    /// Corners of the region the name was read from; empty when no name was found
    #[schema(value_type = Vec<Vec<i32>>)]
    pub bounding_box_cords: Vec<[i32; 2]>,
    /// 0-100
    pub similarity_score: u8,
}

impl From<MatchResult> for UploadResponse {
    fn from(result: MatchResult) -> Self {
        Self {
            first_name: result.first_name,
            last_name: result.last_name,
            bounding_box_cords: result.bounding_box.map(|b| b.corners()).unwrap_or_default(),
            similarity_score: result.similarity_score,
        }
    }
}
