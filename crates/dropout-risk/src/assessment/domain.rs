use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::wizard::WizardStep;

/// Year of study reported on the academic step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AcademicYear {
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd")]
    Second,
    #[serde(rename = "3rd")]
    Third,
    #[serde(rename = "4th")]
    Fourth,
}

impl AcademicYear {
    pub const fn label(self) -> &'static str {
        match self {
            AcademicYear::First => "1st",
            AcademicYear::Second => "2nd",
            AcademicYear::Third => "3rd",
            AcademicYear::Fourth => "4th",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Always,
    Often,
    Sometimes,
    Rarely,
    Never,
}

impl Attendance {
    pub const fn label(self) -> &'static str {
        match self {
            Attendance::Always => "always",
            Attendance::Often => "often",
            Attendance::Sometimes => "sometimes",
            Attendance::Rarely => "rarely",
            Attendance::Never => "never",
        }
    }
}

/// How often the student feels overwhelmed by coursework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwhelmFrequency {
    Never,
    Rarely,
    Sometimes,
    Often,
    Always,
}

impl OverwhelmFrequency {
    pub const fn label(self) -> &'static str {
        match self {
            OverwhelmFrequency::Never => "never",
            OverwhelmFrequency::Rarely => "rarely",
            OverwhelmFrequency::Sometimes => "sometimes",
            OverwhelmFrequency::Often => "often",
            OverwhelmFrequency::Always => "always",
        }
    }
}

/// Weekly self-study band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StudyHours {
    #[serde(rename = "1-3")]
    OneToThree,
    #[serde(rename = "3-5")]
    ThreeToFive,
    #[serde(rename = "5-8")]
    FiveToEight,
    #[serde(rename = "8+")]
    EightPlus,
}

impl StudyHours {
    pub const fn label(self) -> &'static str {
        match self {
            StudyHours::OneToThree => "1-3",
            StudyHours::ThreeToFive => "3-5",
            StudyHours::FiveToEight => "5-8",
            StudyHours::EightPlus => "8+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AdvisorInteraction {
    #[serde(rename = "never")]
    Never,
    #[serde(rename = "once-semester")]
    OncePerSemester,
    #[serde(rename = "2-3-semester")]
    TwoToThreePerSemester,
    #[serde(rename = "monthly")]
    Monthly,
}

impl AdvisorInteraction {
    pub const fn label(self) -> &'static str {
        match self {
            AdvisorInteraction::Never => "never",
            AdvisorInteraction::OncePerSemester => "once-semester",
            AdvisorInteraction::TwoToThreePerSemester => "2-3-semester",
            AdvisorInteraction::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentStatus {
    NotEmployed,
    PartTime,
    FullTime,
}

impl EmploymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EmploymentStatus::NotEmployed => "not-employed",
            EmploymentStatus::PartTime => "part-time",
            EmploymentStatus::FullTime => "full-time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinancialStress {
    None,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl FinancialStress {
    pub const fn label(self) -> &'static str {
        match self {
            FinancialStress::None => "none",
            FinancialStress::Low => "low",
            FinancialStress::Moderate => "moderate",
            FinancialStress::High => "high",
            FinancialStress::VeryHigh => "very-high",
        }
    }
}

/// Campus services a student reports having used. `None` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportService {
    Academic,
    Career,
    Counseling,
    Health,
    Financial,
    None,
}

impl SupportService {
    pub const fn label(self) -> &'static str {
        match self {
            SupportService::Academic => "academic",
            SupportService::Career => "career",
            SupportService::Counseling => "counseling",
            SupportService::Health => "health",
            SupportService::Financial => "financial",
            SupportService::None => "none",
        }
    }
}

/// Slider value on a 1..=10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Result<Self, AnswerError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AnswerError::RatingOutOfRange { value })
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for Rating {
    type Error = AnswerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Weekly extracurricular hours, 0..=20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeeklyHours(u8);

impl WeeklyHours {
    pub const MAX: u8 = 20;

    pub fn new(value: u8) -> Result<Self, AnswerError> {
        if value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(AnswerError::HoursOutOfRange { value })
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for WeeklyHours {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for WeeklyHours {
    type Error = AnswerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WeeklyHours> for u8 {
    fn from(value: WeeklyHours) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsentAnswers {
    pub given: bool,
    pub data_processing: bool,
    pub anonymous_analytics: bool,
}

impl ConsentAnswers {
    /// Analytics consent is optional; the other two are mandatory.
    pub const fn is_granted(&self) -> bool {
        self.given && self.data_processing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AcademicAnswers {
    pub year: Option<AcademicYear>,
    pub attendance: Option<Attendance>,
    pub overwhelm_frequency: Option<OverwhelmFrequency>,
    pub study_hours: Option<StudyHours>,
    pub performance_satisfaction: Rating,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupportAnswers {
    pub advisor_interaction: Option<AdvisorInteraction>,
    pub support_network_strength: Rating,
    pub extracurricular_hours: WeeklyHours,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonalAnswers {
    pub employment_status: Option<EmploymentStatus>,
    pub financial_stress: Option<FinancialStress>,
    pub career_alignment: Rating,
}

/// Services and withdrawal answers. Fields stay private so the exclusivity of
/// `SupportService::None` and the withdrawal-reason rule cannot be bypassed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServicesAnswers {
    used: BTreeSet<SupportService>,
    withdrawal_considered: bool,
    withdrawal_reasons: BTreeSet<String>,
}

impl ServicesAnswers {
    pub fn used(&self) -> &BTreeSet<SupportService> {
        &self.used
    }

    pub fn withdrawal_considered(&self) -> bool {
        self.withdrawal_considered
    }

    pub fn withdrawal_reasons(&self) -> &BTreeSet<String> {
        &self.withdrawal_reasons
    }

    pub fn select(&mut self, service: SupportService) {
        if service == SupportService::None {
            self.used.clear();
        } else {
            self.used.remove(&SupportService::None);
        }
        self.used.insert(service);
    }

    pub fn deselect(&mut self, service: SupportService) {
        self.used.remove(&service);
    }

    pub fn set_withdrawal_considered(&mut self, considered: bool) {
        self.withdrawal_considered = considered;
        if !considered {
            self.withdrawal_reasons.clear();
        }
    }

    pub fn add_withdrawal_reason(&mut self, reason: &str) -> Result<(), AnswerError> {
        if !self.withdrawal_considered {
            return Err(AnswerError::WithdrawalNotConsidered);
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AnswerError::EmptyWithdrawalReason);
        }
        self.withdrawal_reasons.insert(reason.to_string());
        Ok(())
    }

    pub fn remove_withdrawal_reason(&mut self, reason: &str) {
        self.withdrawal_reasons.remove(reason.trim());
    }
}

/// The answer record accumulated by the wizard across all five steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssessmentAnswers {
    pub consent: ConsentAnswers,
    pub academic: AcademicAnswers,
    pub support: SupportAnswers,
    pub personal: PersonalAnswers,
    pub services: ServicesAnswers,
}

impl AssessmentAnswers {
    /// Merge a single field update into the record. No step gate is evaluated here.
    pub fn apply(&mut self, update: AnswerUpdate) -> Result<(), AnswerError> {
        match update {
            AnswerUpdate::ConsentGiven(value) => self.consent.given = value,
            AnswerUpdate::ConsentDataProcessing(value) => self.consent.data_processing = value,
            AnswerUpdate::ConsentAnonymousAnalytics(value) => {
                self.consent.anonymous_analytics = value
            }
            AnswerUpdate::AcademicYear(value) => self.academic.year = Some(value),
            AnswerUpdate::Attendance(value) => self.academic.attendance = Some(value),
            AnswerUpdate::OverwhelmFrequency(value) => {
                self.academic.overwhelm_frequency = Some(value)
            }
            AnswerUpdate::StudyHours(value) => self.academic.study_hours = Some(value),
            AnswerUpdate::PerformanceSatisfaction(value) => {
                self.academic.performance_satisfaction = value
            }
            AnswerUpdate::AdvisorInteraction(value) => {
                self.support.advisor_interaction = Some(value)
            }
            AnswerUpdate::SupportNetworkStrength(value) => {
                self.support.support_network_strength = value
            }
            AnswerUpdate::ExtracurricularHours(value) => self.support.extracurricular_hours = value,
            AnswerUpdate::EmploymentStatus(value) => self.personal.employment_status = Some(value),
            AnswerUpdate::FinancialStress(value) => self.personal.financial_stress = Some(value),
            AnswerUpdate::CareerAlignment(value) => self.personal.career_alignment = value,
            AnswerUpdate::SelectService(service) => self.services.select(service),
            AnswerUpdate::DeselectService(service) => self.services.deselect(service),
            AnswerUpdate::WithdrawalConsidered(value) => {
                self.services.set_withdrawal_considered(value)
            }
            AnswerUpdate::AddWithdrawalReason(reason) => {
                self.services.add_withdrawal_reason(&reason)?
            }
            AnswerUpdate::RemoveWithdrawalReason(reason) => {
                self.services.remove_withdrawal_reason(&reason)
            }
        }
        Ok(())
    }
}

/// One `(field, value)` change. Serialized as `{"field": "...", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "field",
    content = "value",
    rename_all = "snake_case",
    deny_unknown_fields
)]
pub enum AnswerUpdate {
    ConsentGiven(bool),
    ConsentDataProcessing(bool),
    ConsentAnonymousAnalytics(bool),
    AcademicYear(AcademicYear),
    Attendance(Attendance),
    OverwhelmFrequency(OverwhelmFrequency),
    StudyHours(StudyHours),
    PerformanceSatisfaction(Rating),
    AdvisorInteraction(AdvisorInteraction),
    SupportNetworkStrength(Rating),
    ExtracurricularHours(WeeklyHours),
    EmploymentStatus(EmploymentStatus),
    FinancialStress(FinancialStress),
    CareerAlignment(Rating),
    SelectService(SupportService),
    DeselectService(SupportService),
    WithdrawalConsidered(bool),
    AddWithdrawalReason(String),
    RemoveWithdrawalReason(String),
}

impl AnswerUpdate {
    /// Wizard step that owns the updated field.
    pub const fn step(&self) -> WizardStep {
        match self {
            AnswerUpdate::ConsentGiven(_)
            | AnswerUpdate::ConsentDataProcessing(_)
            | AnswerUpdate::ConsentAnonymousAnalytics(_) => WizardStep::Consent,
            AnswerUpdate::AcademicYear(_)
            | AnswerUpdate::Attendance(_)
            | AnswerUpdate::OverwhelmFrequency(_)
            | AnswerUpdate::StudyHours(_)
            | AnswerUpdate::PerformanceSatisfaction(_) => WizardStep::Academic,
            AnswerUpdate::AdvisorInteraction(_)
            | AnswerUpdate::SupportNetworkStrength(_)
            | AnswerUpdate::ExtracurricularHours(_) => WizardStep::Support,
            AnswerUpdate::EmploymentStatus(_)
            | AnswerUpdate::FinancialStress(_)
            | AnswerUpdate::CareerAlignment(_) => WizardStep::Personal,
            AnswerUpdate::SelectService(_)
            | AnswerUpdate::DeselectService(_)
            | AnswerUpdate::WithdrawalConsidered(_)
            | AnswerUpdate::AddWithdrawalReason(_)
            | AnswerUpdate::RemoveWithdrawalReason(_) => WizardStep::ServicesReview,
        }
    }
}

/// Rejected answer values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerError {
    #[error("rating {value} is outside 1..=10")]
    RatingOutOfRange { value: u8 },
    #[error("extracurricular hours {value} is outside 0..=20")]
    HoursOutOfRange { value: u8 },
    #[error("withdrawal reasons require withdrawal to be considered")]
    WithdrawalNotConsidered,
    #[error("withdrawal reason must not be empty")]
    EmptyWithdrawalReason,
    #[error("service `none` cannot be combined with other services")]
    ConflictingServices,
}
