//! Student and grade summary types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use indexmap::IndexMap;
use std::fmt;

/// Category label (`count`, `mean`, `25%`, ...) to grade.
///
/// Values are optional because the aggregation service reports undefined
/// statistics (e.g. the deviation of a single sample) as `null`. Labels keep
/// the order the service sent them in.
pub type GradeMap = IndexMap<String, Option<f64>>;

/// A grade as printed in reply text: plain decimal with at least one
/// fractional digit in `[1e-3, 1e7)`, `<mantissa>E<exponent>` outside it.
struct Grade(f64);

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.is_nan() {
            return write!(f, "NaN");
        }
        if value.is_infinite() {
            return write!(f, "{}Infinity", if value < 0.0 { "-" } else { "" });
        }
        if value == 0.0 || (1e-3..1e7).contains(&value.abs()) {
            return write!(f, "{:?}", value);
        }

        let scientific = format!("{:e}", value);
        let (mantissa, exponent) = scientific
            .split_once('e')
            .unwrap_or((scientific.as_str(), "0"));
        if mantissa.contains('.') {
            write!(f, "{}E{}", mantissa, exponent)
        } else {
            write!(f, "{}.0E{}", mantissa, exponent)
        }
    }
}

/// A student's name and four subject scores.
///
/// Scores are not range-checked and default to `0.0` when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Student {
    pub name: Option<String>,
    pub math_grade: f64,
    pub english_grade: f64,
    pub history_grade: f64,
    pub science_grade: f64,
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Student{{name='{}', mathGrade={}, englishGrade={}, historyGrade={}, scienceGrade={}}}",
            self.name.as_deref().unwrap_or("null"),
            Grade(self.math_grade),
            Grade(self.english_grade),
            Grade(self.history_grade),
            Grade(self.science_grade)
        )
    }
}

/// Per-subject grade summaries computed by the data aggregation service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GradesResult {
    pub math_grade: Option<GradeMap>,
    pub english_grade: Option<GradeMap>,
    pub history_grade: Option<GradeMap>,
    pub science_grade: Option<GradeMap>,
}

impl GradesResult {
    /// Decode a response body from the data aggregation service.
    ///
    /// The service serializes its frame to a JSON string and then wraps that
    /// string in JSON again, so a top-level string is unwrapped once before
    /// decoding. A plain JSON object is accepted as well.
    ///
    /// Both forms are decoded from text rather than through [`Value`], whose
    /// objects would reorder the labels.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        match serde_json::from_slice::<Value>(body)? {
            Value::String(inner) => serde_json::from_str(&inner),
            _ => serde_json::from_slice(body),
        }
    }
}

impl fmt::Display for GradesResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GradesResult{{mathGrade=")?;
        write_grade_map(f, self.math_grade.as_ref())?;
        write!(f, ", englishGrade=")?;
        write_grade_map(f, self.english_grade.as_ref())?;
        write!(f, ", historyGrade=")?;
        write_grade_map(f, self.history_grade.as_ref())?;
        write!(f, ", scienceGrade=")?;
        write_grade_map(f, self.science_grade.as_ref())?;
        write!(f, "}}")
    }
}

fn write_grade_map(f: &mut fmt::Formatter<'_>, map: Option<&GradeMap>) -> fmt::Result {
    let map = match map {
        Some(m) => m,
        None => return write!(f, "null"),
    };

    write!(f, "{{")?;
    for (i, (label, grade)) in map.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        match grade {
            Some(g) => write!(f, "{}={}", label, Grade(*g))?,
            None => write!(f, "{}=null", label)?,
        }
    }
    write!(f, "}}")
}
