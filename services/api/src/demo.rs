use crate::infra::{assessment_service, run_questionnaire, OfflinePredictionClient, SharedService};
use chrono::Utc;
use clap::Args;
use dropout_risk::assessment::analytics::{
    dashboard_stats, risk_distribution, top_risk_factors, weekly_trends,
};
use dropout_risk::assessment::{
    AcademicYear, AdvisorInteraction, AnswerError, AssessmentRequest, Attendance,
    EmploymentStatus, FinancialStress, HttpPredictionClient, OverwhelmFrequency,
    PredictionClient, Rating, StudyHours, SupportService, WeeklyHours,
};
use dropout_risk::config::AppConfig;
use dropout_risk::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Use the configured prediction service instead of local scoring only.
    #[arg(long)]
    pub(crate) remote: bool,
    /// Number of weeks shown in the trend summary.
    #[arg(long, default_value_t = 4)]
    pub(crate) weeks: u32,
}

struct DemoStudent {
    name: &'static str,
    request: AssessmentRequest,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let students = demo_students()?;

    println!("Dropout risk assessment demo");
    if args.remote {
        let client = HttpPredictionClient::new(&config.predictor)?;
        println!("- Prediction service: {}", client.base_url());
        let service = assessment_service(&config, client);
        run_sessions(&service, &students, args.weeks).await
    } else {
        println!("- Prediction service: disabled (local scoring)");
        let service = assessment_service(&config, OfflinePredictionClient);
        run_sessions(&service, &students, args.weeks).await
    }
}

async fn run_sessions<C>(
    service: &SharedService<C>,
    students: &[DemoStudent],
    weeks: u32,
) -> Result<(), AppError>
where
    C: PredictionClient + 'static,
{
    for student in students {
        let (id, result) = run_questionnaire(&**service, &student.request).await?;
        println!(
            "\n{} ({}) -> {} risk, score {} ({:?}, confidence {:.2})",
            student.name,
            id,
            result.risk_level.label(),
            result.risk_score,
            result.source,
            result.model_confidence
        );
        for recommendation in &result.recommendations {
            println!(
                "  - [{}] {}: {} ({})",
                recommendation.kind,
                recommendation.title,
                recommendation.description,
                recommendation.urgency
            );
        }
    }

    let records = service.records()?;
    let stats = dashboard_stats(&records);
    let distribution = risk_distribution(&records);
    println!("\nDashboard summary");
    println!(
        "- {} assessments | average score {:.1}",
        stats.total_assessments, stats.average_risk_score
    );
    println!(
        "- high {} ({:.2}%) | medium {} ({:.2}%) | low {} ({:.2}%)",
        distribution.high,
        stats.high_risk_percentage,
        distribution.medium,
        stats.medium_risk_percentage,
        distribution.low,
        stats.low_risk_percentage
    );

    let now = Utc::now();
    println!("Weekly trend:");
    for point in weekly_trends(&records, weeks, now) {
        println!(
            "  - {}: {} high / {} medium / {} low",
            point.week, point.high_risk, point.medium_risk, point.low_risk
        );
    }

    let factors = top_risk_factors(&records, 5, now);
    if factors.is_empty() {
        println!("Top risk factors: none reported (fallback results carry no factors)");
    } else {
        println!("Top risk factors:");
        for factor in factors {
            println!(
                "  - {}: {} ({:.1}%, {:?})",
                factor.name, factor.occurrences, factor.percentage, factor.trend
            );
        }
    }

    Ok(())
}

fn demo_students() -> Result<Vec<DemoStudent>, AnswerError> {
    Ok(vec![
        DemoStudent {
            name: "Student A",
            request: AssessmentRequest {
                consent_given: true,
                consent_data_processing: true,
                consent_anonymous_analytics: true,
                academic_year: AcademicYear::First,
                attendance: Attendance::Never,
                overwhelm_frequency: OverwhelmFrequency::Always,
                study_hours: StudyHours::OneToThree,
                performance_satisfaction: Rating::new(1)?,
                advisor_interaction: AdvisorInteraction::Never,
                support_network_strength: Rating::new(2)?,
                extracurricular_hours: WeeklyHours::new(0)?,
                employment_status: EmploymentStatus::FullTime,
                financial_stress: FinancialStress::VeryHigh,
                career_alignment: Rating::new(3)?,
                services_used: vec![SupportService::None],
                withdrawal_considered: true,
                withdrawal_reasons: vec![
                    "Financial challenges".to_string(),
                    "Academic difficulties".to_string(),
                ],
            },
        },
        DemoStudent {
            name: "Student B",
            request: AssessmentRequest {
                consent_given: true,
                consent_data_processing: true,
                consent_anonymous_analytics: false,
                academic_year: AcademicYear::Second,
                attendance: Attendance::Sometimes,
                overwhelm_frequency: OverwhelmFrequency::Sometimes,
                study_hours: StudyHours::ThreeToFive,
                performance_satisfaction: Rating::new(5)?,
                advisor_interaction: AdvisorInteraction::OncePerSemester,
                support_network_strength: Rating::new(5)?,
                extracurricular_hours: WeeklyHours::new(5)?,
                employment_status: EmploymentStatus::PartTime,
                financial_stress: FinancialStress::Moderate,
                career_alignment: Rating::new(6)?,
                services_used: vec![SupportService::Academic, SupportService::Counseling],
                withdrawal_considered: false,
                withdrawal_reasons: Vec::new(),
            },
        },
        DemoStudent {
            name: "Student C",
            request: AssessmentRequest {
                consent_given: true,
                consent_data_processing: true,
                consent_anonymous_analytics: true,
                academic_year: AcademicYear::Fourth,
                attendance: Attendance::Always,
                overwhelm_frequency: OverwhelmFrequency::Never,
                study_hours: StudyHours::EightPlus,
                performance_satisfaction: Rating::new(10)?,
                advisor_interaction: AdvisorInteraction::Monthly,
                support_network_strength: Rating::new(9)?,
                extracurricular_hours: WeeklyHours::new(8)?,
                employment_status: EmploymentStatus::NotEmployed,
                financial_stress: FinancialStress::None,
                career_alignment: Rating::new(9)?,
                services_used: vec![SupportService::Career],
                withdrawal_considered: false,
                withdrawal_reasons: Vec::new(),
            },
        },
    ])
}
