use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attachments::Attachment;
use super::steps::WizardStep;

/// Identifier of the account that owns a verification record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Review lifecycle of a freelancer application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    InProgress,
    UnderReview,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::InProgress => "in_progress",
            VerificationStatus::UnderReview => "under_review",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }

    /// The wizard may only touch records that have not been handed to reviewers.
    pub const fn is_editable(self) -> bool {
        matches!(
            self,
            VerificationStatus::Pending | VerificationStatus::InProgress
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Freelancer,
    Client,
}

/// Step 1: public handle and legal acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountData {
    pub full_name: String,
    pub username: String,
    pub account_type: AccountType,
    pub terms_accepted: bool,
    pub privacy_accepted: bool,
}

impl AccountData {
    pub fn for_display_name(full_name: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            username: suggested_username(full_name),
            account_type: AccountType::Freelancer,
            terms_accepted: false,
            privacy_accepted: false,
        }
    }
}

/// Derive a handle from a display name: whitespace runs collapse to `_`, everything lowercased.
pub fn suggested_username(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .map(|part| {
            part.chars()
                .filter(|c| is_username_char(*c))
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

pub fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    FullTime,
    PartTime,
    Weekends,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Basic,
    Intermediate,
    Advanced,
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSkill {
    pub language: String,
    pub proficiency: Proficiency,
}

pub const SPECIALIZATIONS: [&str; 10] = [
    "Programming, website and application development",
    "Graphic Design and Visual Identity",
    "Digital Marketing and Social Media",
    "Content Writing and Translation",
    "Video and Audio Editing",
    "Business Consulting",
    "Data Analysis and Research",
    "Photography and Videography",
    "UI/UX Design",
    "Mobile App Development",
];

pub const SUGGESTED_SKILLS: [&str; 15] = [
    "Python",
    "User Interface Design",
    "psychology",
    "Product label design",
    "Interior design",
    "jQuery",
    "e-marketing",
    "Troubleshooting",
    "Create a landing page",
    "Startup Consulting",
    "Facebook marketing",
    "video editing",
    "Flyer design",
    "Proofreading",
    "Content rewriting",
];

pub const DEFAULT_HOURLY_RATE: f64 = 50.0;
pub const DEFAULT_LANGUAGE: &str = "العربية";

/// Step 2: professional profile shown on the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileData {
    pub job_title: String,
    pub specialization: String,
    pub introduction: String,
    pub skills: Vec<String>,
    pub hourly_rate: f64,
    pub availability: Availability,
    pub languages: Vec<LanguageSkill>,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            job_title: String::new(),
            specialization: String::new(),
            introduction: String::new(),
            skills: Vec::new(),
            hourly_rate: DEFAULT_HOURLY_RATE,
            availability: Availability::FullTime,
            languages: vec![LanguageSkill {
                language: DEFAULT_LANGUAGE.to_string(),
                proficiency: Proficiency::Native,
            }],
        }
    }
}

impl ProfileData {
    /// Insert a trimmed skill, ignoring blanks and case-sensitive duplicates.
    pub fn add_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty() || self.skills.iter().any(|existing| existing == skill) {
            return false;
        }
        self.skills.push(skill.to_string());
        true
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.skills.len();
        self.skills.retain(|existing| existing != skill.trim());
        before != self.skills.len()
    }
}

pub const PORTFOLIO_SLOTS: usize = 3;

/// One of the fixed showcase slots in the business gallery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<Attachment>,
    pub images: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    pub skills: Vec<String>,
}

impl PortfolioItem {
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            thumbnail: None,
            images: Vec::new(),
            project_url: None,
            skills: Vec::new(),
        }
    }

    /// A slot counts toward the gallery once it has a title, a description and a thumbnail.
    pub fn is_showcase_ready(&self) -> bool {
        !self.title.is_empty() && !self.description.is_empty() && self.thumbnail.is_some()
    }

    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
            && self.description.trim().is_empty()
            && self.thumbnail.is_none()
            && self.images.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_company: Option<String>,
    pub rating: u8,
    pub comment: String,
    pub project_title: String,
}

pub const MIN_TESTIMONIAL_RATING: u8 = 1;
pub const MAX_TESTIMONIAL_RATING: u8 = 5;

/// Step 3: portfolio showcase plus optional certificates and testimonials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessGallery {
    pub portfolio_items: [PortfolioItem; PORTFOLIO_SLOTS],
    pub certificates: Vec<Attachment>,
    pub testimonials: Vec<Testimonial>,
}

impl Default for BusinessGallery {
    fn default() -> Self {
        Self {
            portfolio_items: [
                PortfolioItem::empty("1"),
                PortfolioItem::empty("2"),
                PortfolioItem::empty("3"),
            ],
            certificates: Vec::new(),
            testimonials: Vec::new(),
        }
    }
}

impl BusinessGallery {
    pub fn showcase_ready_count(&self) -> usize {
        self.portfolio_items
            .iter()
            .filter(|item| item.is_showcase_ready())
            .count()
    }

    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.portfolio_items
            .iter()
            .flat_map(|item| item.thumbnail.iter().chain(item.images.iter()))
            .chain(self.certificates.iter())
    }

    pub fn attachments_mut(&mut self) -> impl Iterator<Item = &mut Attachment> {
        self.portfolio_items
            .iter_mut()
            .flat_map(|item| {
                let PortfolioItem {
                    thumbnail, images, ..
                } = item;
                thumbnail.iter_mut().chain(images.iter_mut())
            })
            .chain(self.certificates.iter_mut())
    }
}

/// Submitted answer: one option for single-choice questions, a set for multi-choice ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multiple(BTreeSet<String>),
}

impl AnswerValue {
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Single(value) => value.is_empty(),
            AnswerValue::Multiple(values) => values.is_empty(),
        }
    }
}

/// Step 4: admission quiz answers and the locked-in score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdmissionTestData {
    pub completed: bool,
    pub score: Option<u8>,
    pub answers: BTreeMap<String, AnswerValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationSteps {
    pub account_data: AccountData,
    pub profile: ProfileData,
    pub business_gallery: BusinessGallery,
    pub admission_test: AdmissionTestData,
}

/// Aggregate root for one user's verification application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationRecord {
    pub user_id: UserId,
    pub current_step: WizardStep,
    pub status: VerificationStatus,
    pub steps: VerificationSteps,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub rejection_reason: Option<String>,
}

impl VerificationRecord {
    pub fn new(user_id: UserId, display_name: &str) -> Self {
        Self {
            user_id,
            current_step: WizardStep::FIRST,
            status: VerificationStatus::Pending,
            steps: VerificationSteps {
                account_data: AccountData::for_display_name(display_name),
                profile: ProfileData::default(),
                business_gallery: BusinessGallery::default(),
                admission_test: AdmissionTestData::default(),
            },
            submitted_at: None,
            reviewed_at: None,
            reviewed_by: None,
            rejection_reason: None,
        }
    }
}
