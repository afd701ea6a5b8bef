//! Controlled vocabularies and the capped multi-select used by every form
//! field that picks from one of them.

use serde::Serialize;

pub const LANGUAGES: &[&str] = &[
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Dutch",
    "Greek",
    "Turkish",
    "Arabic",
    "Russian",
    "Chinese",
    "Japanese",
    "Indonesian",
    "Thai",
    "Swedish",
    "Norwegian",
    "Danish",
    "Polish",
    "Croatian",
];

pub const SPORTS: &[&str] = &[
    "Kitesurfing",
    "Windsurfing",
    "Surfing",
    "Wing Foiling",
    "Stand Up Paddle",
    "Sailing",
    "Scuba Diving",
    "Freediving",
    "Snorkeling",
    "Wakeboarding",
    "Water Skiing",
    "Kayaking",
    "Canoeing",
    "Rafting",
    "Swimming",
    "Yachting",
    "Jet Ski",
    "Parasailing",
    "Fishing",
];

/// Job categories double as the CV "looking for work in" areas.
pub const OCCUPATIONAL_AREAS: &[&str] = &[
    "Instruction",
    "Guiding",
    "Boat Crew",
    "Skipper",
    "Hospitality",
    "Retail",
    "Equipment Repair",
    "Management",
    "Marketing",
    "Photography & Video",
    "Reception",
    "Lifeguarding",
    "Maintenance",
];

pub const QUALIFICATIONS: &[&str] = &[
    "IKO Instructor Level 1",
    "IKO Instructor Level 2",
    "VDWS Instructor",
    "BKSA Instructor",
    "ISA Surf Instructor",
    "RYA Dinghy Instructor",
    "RYA Yachtmaster",
    "PADI Open Water Scuba Instructor",
    "PADI Divemaster",
    "SSI Instructor",
    "First Aid",
    "Lifeguard",
    "Boat License",
    "VHF Radio License",
    "STCW",
];

pub const OFFERED_SERVICES: &[&str] = &[
    "Lessons",
    "Equipment Rental",
    "Equipment Sales",
    "Storage",
    "Accommodation",
    "Guided Tours",
    "Boat Trips",
    "Repairs",
    "Camps",
];

pub const MAX_JOB_LANGUAGES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("'{0}' is not a valid option")]
    UnknownOption(String),
    #[error("at most {0} selections are allowed")]
    LimitReached(usize),
}

/// A controlled multi-select over a fixed option list.
///
/// Input is matched case-insensitively and stored using the canonical
/// spelling from the option list. Duplicates are ignored, and an optional cap
/// bounds the selection size.
#[derive(Debug, Clone)]
pub struct MultiSelect<'o, O: AsRef<str>> {
    options: &'o [O],
    selected: Vec<String>,
    cap: Option<usize>,
}

impl<'o, O: AsRef<str>> MultiSelect<'o, O> {
    pub fn new(options: &'o [O]) -> Self {
        Self {
            options,
            selected: Vec::new(),
            cap: None,
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Builds a selection from user input, rejecting unknown options and
    /// anything beyond the cap.
    pub fn from_values<I, S>(options: &'o [O], cap: Option<usize>, values: I) -> Result<Self, SelectError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut select = Self {
            options,
            selected: Vec::new(),
            cap,
        };
        for value in values {
            select.add(value.as_ref())?;
        }
        Ok(select)
    }

    fn canonical(&self, value: &str) -> Option<&'o str> {
        let value = value.trim();
        self.options
            .iter()
            .map(|option| option.as_ref())
            .find(|option| option.eq_ignore_ascii_case(value))
    }

    pub fn add(&mut self, value: &str) -> Result<(), SelectError> {
        let option = self
            .canonical(value)
            .ok_or_else(|| SelectError::UnknownOption(value.trim().to_string()))?;
        if self.is_selected(option) {
            return Ok(());
        }
        if let Some(cap) = self.cap {
            if self.selected.len() >= cap {
                return Err(SelectError::LimitReached(cap));
            }
        }
        self.selected.push(option.to_string());
        Ok(())
    }

    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.selected.len();
        self.selected
            .retain(|selected| !selected.eq_ignore_ascii_case(value.trim()));
        before != self.selected.len()
    }

    pub fn toggle(&mut self, value: &str) -> Result<bool, SelectError> {
        if self.remove(value) {
            Ok(false)
        } else {
            self.add(value)?;
            Ok(true)
        }
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.iter().any(|s| s.eq_ignore_ascii_case(value))
    }

    pub fn is_full(&self) -> bool {
        self.cap.is_some_and(|cap| self.selected.len() >= cap)
    }

    /// Options that can still be picked.
    pub fn available(&self) -> Vec<&'o str> {
        if self.is_full() {
            return Vec::new();
        }
        self.options
            .iter()
            .map(|option| option.as_ref())
            .filter(|option| !self.is_selected(option))
            .collect()
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn into_selected(self) -> Vec<String> {
        self.selected
    }
}

/// Normalizes a payload field against a vocabulary.
pub fn select(options: &[&str], cap: Option<usize>, values: &[String]) -> Result<Vec<String>, SelectError> {
    Ok(MultiSelect::from_values(options, cap, values)?.into_selected())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyResponse {
    pub languages: &'static [&'static str],
    pub sports: &'static [&'static str],
    pub occupational_areas: &'static [&'static str],
    pub qualifications: &'static [&'static str],
    pub offered_services: &'static [&'static str],
    pub max_job_languages: usize,
}

pub fn all() -> VocabularyResponse {
    VocabularyResponse {
        languages: LANGUAGES,
        sports: SPORTS,
        occupational_areas: OCCUPATIONAL_AREAS,
        qualifications: QUALIFICATIONS,
        offered_services: OFFERED_SERVICES,
        max_job_languages: MAX_JOB_LANGUAGES,
    }
}
