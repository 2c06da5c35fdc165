//! Project record - the unit of extraction

use std::fmt;

/// Placeholder for a field the extractor could not find ("not filled in")
pub const SENTINEL: &str = "未記入";

/// Marker language models use for a field they could not determine
pub const UNKNOWN: &str = "不明";

/// The seven fields of a project record, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Project name
    Title,
    /// Work content
    WorkDescription,
    /// Required skills / recruiting requirements
    Requirements,
    /// Recruiting headcount
    Headcount,
    /// Work period
    Duration,
    /// Work location
    Location,
    /// Working hours, remarks and anything else
    OtherNotes,
}

impl Field {
    /// All fields in their fixed column order
    pub const ALL: [Field; 7] = [
        Field::Title,
        Field::WorkDescription,
        Field::Requirements,
        Field::Headcount,
        Field::Duration,
        Field::Location,
        Field::OtherNotes,
    ];

    /// English key used in configuration, logs and JSON
    pub fn key(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::WorkDescription => "work_description",
            Field::Requirements => "requirements",
            Field::Headcount => "headcount",
            Field::Duration => "duration",
            Field::Location => "location",
            Field::OtherNotes => "other_notes",
        }
    }

    /// Japanese label used as sheet header and language-model JSON key
    ///
    /// # Examples
    ///
    /// ```
    /// use mailsheet_domain::Field;
    ///
    /// assert_eq!(Field::Title.label(), "案件名");
    /// assert_eq!(Field::Location.label(), "勤務場所");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "案件名",
            Field::WorkDescription => "作業内容",
            Field::Requirements => "募集要件",
            Field::Headcount => "募集人数",
            Field::Duration => "期間",
            Field::Location => "勤務場所",
            Field::OtherNotes => "その他",
        }
    }

    /// Resolve a field from either its English key or Japanese label
    pub fn from_key(key: &str) -> Option<Field> {
        let key = key.trim();
        Field::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(key) || f.label() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A structured description of one project listing
///
/// Every field holds either real text or [`SENTINEL`]. A record is
/// *meaningful* when at least one field differs from the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    /// Project name
    pub title: String,
    /// Work content
    pub work_description: String,
    /// Required skills
    pub requirements: String,
    /// Recruiting headcount
    pub headcount: String,
    /// Work period
    pub duration: String,
    /// Work location
    pub location: String,
    /// Working hours, remarks, other
    pub other_notes: String,
}

impl ProjectRecord {
    /// Create a record with every field set to the sentinel
    ///
    /// # Examples
    ///
    /// ```
    /// use mailsheet_domain::ProjectRecord;
    ///
    /// let record = ProjectRecord::empty();
    /// assert!(!record.is_meaningful());
    /// ```
    pub fn empty() -> Self {
        Self {
            title: SENTINEL.to_string(),
            work_description: SENTINEL.to_string(),
            requirements: SENTINEL.to_string(),
            headcount: SENTINEL.to_string(),
            duration: SENTINEL.to_string(),
            location: SENTINEL.to_string(),
            other_notes: SENTINEL.to_string(),
        }
    }

    /// Get the value of a field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::WorkDescription => &self.work_description,
            Field::Requirements => &self.requirements,
            Field::Headcount => &self.headcount,
            Field::Duration => &self.duration,
            Field::Location => &self.location,
            Field::OtherNotes => &self.other_notes,
        }
    }

    /// Set a field; blank values are stored as the sentinel
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        let value = if value.trim().is_empty() {
            SENTINEL.to_string()
        } else {
            value
        };

        let slot = match field {
            Field::Title => &mut self.title,
            Field::WorkDescription => &mut self.work_description,
            Field::Requirements => &mut self.requirements,
            Field::Headcount => &mut self.headcount,
            Field::Duration => &mut self.duration,
            Field::Location => &mut self.location,
            Field::OtherNotes => &mut self.other_notes,
        };
        *slot = value;
    }

    /// Builder-style variant of [`ProjectRecord::set`]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Field values in column order
    pub fn values(&self) -> [&str; 7] {
        Field::ALL.map(|f| self.get(f))
    }

    /// Field values in column order with placeholders rendered blank
    pub fn display_values(&self) -> [&str; 7] {
        self.values()
            .map(|v| if is_placeholder(v) { "" } else { v })
    }

    /// True if at least one field differs from the sentinel
    pub fn is_meaningful(&self) -> bool {
        self.values().iter().any(|v| *v != SENTINEL)
    }
}

impl Default for ProjectRecord {
    fn default() -> Self {
        Self::empty()
    }
}

/// True if a value stands for "nothing found" and renders as a blank cell
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == SENTINEL || value == UNKNOWN
}
