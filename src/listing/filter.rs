use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::cv::Cv;
use crate::models::job::Job;

/// Trimmed, non-empty filter value. Blank values leave the filter inactive.
fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Exact membership after trimming, the same normalization the option sets
/// use. An empty list never matches.
fn has_value(list: &[String], value: &str) -> bool {
    let value = value.trim();
    list.iter().any(|item| item.trim() == value)
}

fn collect_sorted<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobFilter {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub sport: Option<String>,
    pub language: Option<String>,
}

impl JobFilter {
    pub fn is_empty(&self) -> bool {
        [
            &self.keyword,
            &self.location,
            &self.country,
            &self.category,
            &self.sport,
            &self.language,
        ]
        .into_iter()
        .all(|value| active(value).is_none())
    }

    pub fn matches(&self, job: &Job) -> bool {
        if let Some(keyword) = active(&self.keyword) {
            let hit = contains_ci(&job.title, keyword)
                || contains_ci(&job.description, keyword)
                || contains_ci(&job.company_name, keyword);
            if !hit {
                return false;
            }
        }
        if let Some(location) = active(&self.location) {
            if !contains_ci(&job.location, location) {
                return false;
            }
        }
        if let Some(country) = active(&self.country) {
            if !job.country.eq_ignore_ascii_case(country) {
                return false;
            }
        }
        if let Some(category) = active(&self.category) {
            if !has_value(&job.occupational_areas, category) {
                return false;
            }
        }
        if let Some(sport) = active(&self.sport) {
            if !has_value(&job.sports, sport) {
                return false;
            }
        }
        if let Some(language) = active(&self.language) {
            if !has_value(&job.languages, language) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, jobs: Vec<Job>) -> Vec<Job> {
        if self.is_empty() {
            return jobs;
        }
        jobs.into_iter().filter(|job| self.matches(job)).collect()
    }
}

/// Dropdown contents for the job board, scanned from the loaded list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilterOptions {
    pub countries: Vec<String>,
    pub categories: Vec<String>,
    pub sports: Vec<String>,
    pub languages: Vec<String>,
}

impl JobFilterOptions {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        Self {
            countries: jobs
                .iter()
                .map(|job| job.country.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            categories: collect_sorted(jobs.iter().flat_map(|j| j.occupational_areas.iter())),
            sports: collect_sorted(jobs.iter().flat_map(|j| j.sports.iter())),
            languages: collect_sorted(jobs.iter().flat_map(|j| j.languages.iter())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvFilter {
    pub keyword: Option<String>,
    pub language: Option<String>,
    pub work_area: Option<String>,
    pub sport: Option<String>,
    pub certification: Option<String>,
}

impl CvFilter {
    pub fn is_empty(&self) -> bool {
        [
            &self.keyword,
            &self.language,
            &self.work_area,
            &self.sport,
            &self.certification,
        ]
        .into_iter()
        .all(|value| active(value).is_none())
    }

    pub fn matches(&self, cv: &Cv) -> bool {
        if let Some(keyword) = active(&self.keyword) {
            let hit = contains_ci(&cv.full_name, keyword)
                || cv.summary.as_deref().is_some_and(|s| contains_ci(s, keyword))
                || cv.address.as_deref().is_some_and(|a| contains_ci(a, keyword));
            if !hit {
                return false;
            }
        }
        if let Some(language) = active(&self.language) {
            if !has_value(&cv.languages, language) {
                return false;
            }
        }
        if let Some(area) = active(&self.work_area) {
            if !has_value(&cv.looking_for_work_in_areas, area) {
                return false;
            }
        }
        if let Some(sport) = active(&self.sport) {
            if !has_value(&cv.experience_and_skill, sport) {
                return false;
            }
        }
        if let Some(certification) = active(&self.certification) {
            if !has_value(&cv.professional_certifications, certification) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, cvs: Vec<Cv>) -> Vec<Cv> {
        if self.is_empty() {
            return cvs;
        }
        cvs.into_iter().filter(|cv| self.matches(cv)).collect()
    }
}

/// Candidate dropdown contents, computed once on the server and shipped with
/// the list as `filters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFilterOptions {
    pub languages: Vec<String>,
    pub work_areas: Vec<String>,
    pub sports: Vec<String>,
    pub certifications: Vec<String>,
}

impl CandidateFilterOptions {
    pub fn from_cvs(cvs: &[Cv]) -> Self {
        Self {
            languages: collect_sorted(cvs.iter().flat_map(|c| c.languages.iter())),
            work_areas: collect_sorted(cvs.iter().flat_map(|c| c.looking_for_work_in_areas.iter())),
            sports: collect_sorted(cvs.iter().flat_map(|c| c.experience_and_skill.iter())),
            certifications: collect_sorted(
                cvs.iter().flat_map(|c| c.professional_certifications.iter()),
            ),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    use crate::models::cv::Cv;
    use crate::models::job::Job;

    pub fn job(title: &str, country: &str, sports: &[&str]) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            recruiter_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            company_name: "Blue Lagoon Watersports".into(),
            location: "Tarifa, Cadiz".into(),
            country: country.into(),
            salary: None,
            employment_type: "full-time".into(),
            languages: vec!["English".into()],
            qualifications: Vec::new(),
            sports: sports.iter().map(|s| s.to_string()).collect(),
            occupational_areas: vec!["Instruction".into()],
            pictures: Vec::new(),
            latitude: 36.01,
            longitude: -5.6,
            featured: false,
            published: true,
            spam: "no".into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn dated_job(title: &str, featured: bool, created_at: DateTime<Utc>) -> Job {
        let mut job = job(title, "ES", &["Kitesurfing"]);
        job.featured = featured;
        job.created_at = created_at;
        job
    }

    pub fn cv(name: &str, languages: &[&str]) -> Cv {
        let now = Utc::now();
        Cv {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            full_name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            address: None,
            summary: None,
            experience: Json(Vec::new()),
            education: Json(Vec::new()),
            skills: Vec::new(),
            certifications: Vec::new(),
            experience_and_skill: Vec::new(),
            professional_certifications: Vec::new(),
            languages: languages.iter().map(|s| s.to_string()).collect(),
            looking_for_work_in_areas: Vec::new(),
            pictures: Vec::new(),
            published: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{cv, job};
    use super::*;

    #[test]
    fn country_filter_selects_matching_jobs() {
        let jobs = vec![
            job("Kite instructor", "US", &["Kitesurfing"]),
            job("Dive guide", "ES", &["Scuba Diving"]),
        ];
        let filter = JobFilter {
            country: Some("US".into()),
            ..JobFilter::default()
        };
        let visible = filter.apply(jobs.clone());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, jobs[0].id);
    }

    #[test]
    fn filters_compose_with_and() {
        let mut spanish_kite = job("Kite coach", "ES", &["Kitesurfing"]);
        spanish_kite.languages = vec!["Spanish".into(), "English".into()];
        let jobs = vec![
            spanish_kite.clone(),
            job("Kite instructor", "ES", &["Kitesurfing"]),
            job("Dive guide", "ES", &["Scuba Diving"]),
        ];
        let filter = JobFilter {
            country: Some("ES".into()),
            sport: Some("Kitesurfing".into()),
            language: Some("Spanish".into()),
            ..JobFilter::default()
        };

        let visible = filter.apply(jobs.clone());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, spanish_kite.id);
        for item in &visible {
            assert!(jobs.iter().any(|j| j.id == item.id));
            assert!(filter.matches(item));
        }
    }

    #[test]
    fn keyword_matches_title_description_or_company() {
        let mut by_description = job("Instructor", "PT", &[]);
        by_description.description = "Teach WING foiling to beginners".into();
        let by_company = job("Reception", "PT", &[]);
        let jobs = vec![by_description, by_company, job("Skipper", "PT", &[])];

        let wing = JobFilter {
            keyword: Some("wing".into()),
            ..JobFilter::default()
        };
        assert_eq!(wing.apply(jobs.clone()).len(), 1);

        let lagoon = JobFilter {
            keyword: Some("LAGOON".into()),
            ..JobFilter::default()
        };
        assert_eq!(lagoon.apply(jobs).len(), 3);
    }

    #[test]
    fn missing_list_field_excludes_item() {
        let jobs = vec![job("Boat crew", "GR", &[])];
        let filter = JobFilter {
            sport: Some("Sailing".into()),
            ..JobFilter::default()
        };
        assert!(filter.apply(jobs).is_empty());
    }

    #[test]
    fn blank_values_are_inactive() {
        let jobs = vec![job("a", "US", &[]), job("b", "ES", &[])];
        let filter = JobFilter {
            keyword: Some("   ".into()),
            country: Some(String::new()),
            ..JobFilter::default()
        };
        assert!(filter.is_empty());
        assert_eq!(filter.apply(jobs).len(), 2);
    }

    #[test]
    fn cv_language_filter() {
        let cvs = vec![cv("Ana", &["English"]), cv("Luis", &["Spanish", "English"])];
        let filter = CvFilter {
            language: Some("Spanish".into()),
            ..CvFilter::default()
        };
        let visible = filter.apply(cvs);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].full_name, "Luis");
    }

    #[test]
    fn job_location_is_a_case_insensitive_substring() {
        let mut blank = job("Dock hand", "ES", &[]);
        blank.location = String::new();
        let jobs = vec![job("Kite instructor", "ES", &[]), blank];
        let filter = JobFilter {
            location: Some("  tarifa ".into()),
            ..JobFilter::default()
        };
        let visible = filter.apply(jobs.clone());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, jobs[0].id);

        let elsewhere = JobFilter {
            location: Some("Lisbon".into()),
            ..JobFilter::default()
        };
        assert!(elsewhere.apply(jobs).is_empty());
    }

    #[test]
    fn job_category_needs_occupational_area_membership() {
        let mut office = job("Booking agent", "ES", &[]);
        office.occupational_areas = vec!["Administration".into()];
        let mut unlisted = job("Helper", "ES", &[]);
        unlisted.occupational_areas = Vec::new();
        let teaching = job("Kite instructor", "ES", &["Kitesurfing"]);
        let filter = JobFilter {
            category: Some("Instruction".into()),
            ..JobFilter::default()
        };
        let visible = filter.apply(vec![office, unlisted, teaching.clone()]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, teaching.id);
    }

    #[test]
    fn cv_work_area_filter() {
        let mut instructor = cv("Ana", &["English"]);
        instructor.looking_for_work_in_areas = vec!["Instruction".into(), "Retail".into()];
        let mut skipper = cv("Luis", &["English"]);
        skipper.looking_for_work_in_areas = vec!["Boat Crew".into()];
        let undecided = cv("Tom", &["English"]);
        let filter = CvFilter {
            work_area: Some("Instruction".into()),
            ..CvFilter::default()
        };
        let visible = filter.apply(vec![instructor, skipper, undecided]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].full_name, "Ana");
    }

    #[test]
    fn cv_sport_filter_reads_experience_and_skill() {
        let mut surfer = cv("Ana", &["English"]);
        surfer.experience_and_skill = vec!["Surfing".into()];
        let mut diver = cv("Luis", &["English"]);
        diver.experience_and_skill = vec!["Scuba Diving".into()];
        let novice = cv("Tom", &["English"]);
        let filter = CvFilter {
            sport: Some("Scuba Diving".into()),
            ..CvFilter::default()
        };
        let visible = filter.apply(vec![surfer, diver, novice]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].full_name, "Luis");
    }

    #[test]
    fn cv_certification_filter() {
        let mut certified = cv("Ana", &["English"]);
        certified.professional_certifications = vec!["PADI Open Water".into()];
        let mut other = cv("Luis", &["English"]);
        other.professional_certifications = vec!["ISA Surf Instructor".into()];
        let uncertified = cv("Tom", &["English"]);
        let filter = CvFilter {
            certification: Some("PADI Open Water".into()),
            ..CvFilter::default()
        };
        let visible = filter.apply(vec![certified, other, uncertified]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].full_name, "Ana");
    }

    #[test]
    fn cv_keyword_matches_name_summary_or_address() {
        let by_name = cv("Marina", &["English"]);
        let mut by_summary = cv("Ana", &["English"]);
        by_summary.summary = Some("Former MARINA manager".into());
        let mut by_address = cv("Luis", &["English"]);
        by_address.address = Some("Puerto Marina, Benalmadena".into());
        let unrelated = cv("Tom", &["English"]);
        let filter = CvFilter {
            keyword: Some("marina".into()),
            ..CvFilter::default()
        };
        let visible = filter.apply(vec![by_name, by_summary, by_address, unrelated]);
        let names: Vec<_> = visible.iter().map(|c| c.full_name.as_str()).collect();
        assert_eq!(names, vec!["Marina", "Ana", "Luis"]);
    }

    #[test]
    fn stray_whitespace_matches_like_the_option_it_shows_as() {
        let mut padded = cv("Ana", &["English"]);
        padded.experience_and_skill = vec![" Surfing ".into()];
        let options = CandidateFilterOptions::from_cvs(std::slice::from_ref(&padded));
        assert_eq!(options.sports, vec!["Surfing"]);

        let filter = CvFilter {
            sport: Some(options.sports[0].clone()),
            ..CvFilter::default()
        };
        assert!(filter.matches(&padded));
    }

    #[test]
    fn job_options_are_sorted_and_unique() {
        let jobs = vec![
            job("a", "us", &["Surfing", "Kitesurfing"]),
            job("b", "ES", &["Kitesurfing"]),
            job("c", "US", &[]),
        ];
        let options = JobFilterOptions::from_jobs(&jobs);
        assert_eq!(options.countries, vec!["ES", "US"]);
        assert_eq!(options.sports, vec!["Kitesurfing", "Surfing"]);
        assert_eq!(options.languages, vec!["English"]);
    }

    #[test]
    fn candidate_options_cover_all_four_facets() {
        let mut first = cv("Ana", &["English", "Spanish"]);
        first.looking_for_work_in_areas = vec!["Instruction".into()];
        first.experience_and_skill = vec!["Surfing".into()];
        first.professional_certifications = vec!["ISA Surf Instructor".into()];
        let second = cv("Tom", &["English"]);

        let options = CandidateFilterOptions::from_cvs(&[first, second]);
        assert_eq!(options.languages, vec!["English", "Spanish"]);
        assert_eq!(options.work_areas, vec!["Instruction"]);
        assert_eq!(options.sports, vec!["Surfing"]);
        assert_eq!(options.certifications, vec!["ISA Surf Instructor"]);
    }
}
