use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location: String,
    pub country: String,
    pub salary: Option<String>,
    pub employment_type: String,
    pub languages: Vec<String>,
    pub qualifications: Vec<String>,
    pub sports: Vec<String>,
    pub occupational_areas: Vec<String>,
    pub pictures: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub featured: bool,
    pub published: bool,
    pub spam: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn is_spam(&self) -> bool {
        self.spam == "yes"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full-time",
            EmploymentType::PartTime => "part-time",
            EmploymentType::Contract => "contract",
            EmploymentType::Freelance => "freelance",
        }
    }
}

impl FromStr for EmploymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full-time" => Ok(EmploymentType::FullTime),
            "part-time" => Ok(EmploymentType::PartTime),
            "contract" => Ok(EmploymentType::Contract),
            "freelance" => Ok(EmploymentType::Freelance),
            other => Err(format!("unknown employment type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpamFlag {
    Yes,
    No,
}

impl SpamFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpamFlag::Yes => "yes",
            SpamFlag::No => "no",
        }
    }
}
