//! Field label tables and label-line recognition
//!
//! Label order within a field is precedence order: when a block carries two
//! labels for the same field, the one listed first wins.

use mailsheet_domain::Field;
use regex::Regex;
use std::sync::LazyLock;

/// Label alternatives for one field
pub(crate) struct FieldLabels {
    pub field: Field,
    pub labels: &'static [&'static str],
    /// Keep every line of the value instead of only the first
    pub multiline: bool,
}

pub(crate) const FIELD_LABELS: [FieldLabels; 7] = [
    FieldLabels {
        field: Field::Title,
        labels: &[
            "案件名",
            "案件概要",
            "案件情報",
            "案件タイトル",
            "project name",
            "project overview",
            "project info",
            "project title",
        ],
        multiline: false,
    },
    FieldLabels {
        field: Field::WorkDescription,
        labels: &["作業内容", "業務内容", "工程", "work content", "job description"],
        multiline: true,
    },
    FieldLabels {
        field: Field::Requirements,
        labels: &[
            "必須スキル",
            "スキル",
            "募集要件",
            "required skills",
            "skills",
            "requirements",
        ],
        multiline: true,
    },
    FieldLabels {
        field: Field::Headcount,
        labels: &["募集人数", "人数", "募集枠", "headcount", "positions"],
        multiline: false,
    },
    FieldLabels {
        field: Field::Duration,
        labels: &["期間", "作業期間", "時期", "period", "duration"],
        multiline: false,
    },
    FieldLabels {
        field: Field::Location,
        labels: &["勤務地", "勤務場所", "場所", "work location", "location"],
        multiline: false,
    },
    FieldLabels {
        field: Field::OtherNotes,
        labels: &["勤務時間", "備考", "その他", "working hours", "remarks", "notes", "other"],
        multiline: true,
    },
];

/// Optional bullet glyph in front of a label
const BULLET: &str = r"(?:[■◆●▼・*\-]\s*)?";

/// Optional item numbering in front of a bracketed label, e.g. `①` or `(2)`
pub(crate) const NUMBERING: &str = r"(?:[①-⑳0-9０-９()（）.．、]+\s*)?";

static LABEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    let mut labels: Vec<&str> = FIELD_LABELS
        .iter()
        .flat_map(|f| f.labels.iter().copied())
        .collect();
    // Longest first so "作業期間" is not read as a shorter label
    labels.sort_by_key(|l| std::cmp::Reverse(l.chars().count()));
    let alternatives = labels
        .iter()
        .map(|l| regex::escape(l).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    let bullet = BULLET;
    let number = NUMBERING;

    Regex::new(&format!(
        r"(?i)^\s*{bullet}(?:{number}【\s*(?P<full>{alternatives})[^】]*】|{number}\[\s*(?P<square>{alternatives})[^\]]*\]|(?P<plain>{alternatives})\s*[:：])\s*[:：]?(?P<rest>.*)$"
    ))
    .expect("label line pattern is valid")
});

static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    let bullet = BULLET;
    let number = NUMBERING;
    Regex::new(&format!(r"^\s*{bullet}{number}【[^】]*】(?P<rest>.*)$"))
        .expect("heading pattern is valid")
});

/// A recognized label at the start of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LabelLine<'a> {
    /// One of the known field labels, canonicalized
    Known { label: String, rest: &'a str },
    /// Some other `【…】` heading; only ends the previous value
    Unknown,
}

/// Canonical form used to compare labels (case and spacing folded)
pub(crate) fn canonical(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Classify a line as a label line, if it is one
pub(crate) fn parse_label_line(line: &str) -> Option<LabelLine<'_>> {
    if let Some(caps) = LABEL_LINE.captures(line) {
        let label = caps
            .name("full")
            .or_else(|| caps.name("square"))
            .or_else(|| caps.name("plain"))?;
        let rest = caps.name("rest").map_or("", |m| m.as_str());
        return Some(LabelLine::Known {
            label: canonical(label.as_str()),
            rest,
        });
    }

    if HEADING_LINE.is_match(line) {
        return Some(LabelLine::Unknown);
    }

    None
}
