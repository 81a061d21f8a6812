use serde::Serialize;
use std::collections::HashMap;

/// Default number of entries returned by [`recent_assessments`].
pub const RECENT_LIMIT_DEFAULT: usize = 5;

/// Shown when an assessment's module reference cannot be resolved.
pub const UNKNOWN_MODULE: &str = "Unknown Module";

/// Shown for a recent assessment that has no grade yet.
pub const UNGRADED: &str = "Ungraded";

// Snapshot rows as loaded from the workspace. The engine never touches the
// database; callers hand it these and get view models back.

#[derive(Debug, Clone)]
pub struct YearRow {
    pub id: String,
    pub year_number: i64,
    pub year_credit: f64,
}

#[derive(Debug, Clone)]
pub struct ModuleRow {
    pub id: String,
    pub year_id: String,
    pub module_name: String,
    pub module_credit: f64,
}

#[derive(Debug, Clone)]
pub struct AssessmentRow {
    pub module_id: String,
    pub assessment_name: String,
    pub assessment_weight: f64,
    /// `None` means "not yet graded". Distinct from a scored 0.
    pub assessment_grade: Option<f64>,
    /// RFC 3339; lexicographic order is chronological order.
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleGradeView {
    pub subject: String,
    pub grade: f64,
    pub credits: f64,
    pub classification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearGradeView {
    pub term: String,
    pub grade: f64,
    pub classification: String,
    pub credits: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    pub name: String,
    pub count: usize,
    pub short_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub name: String,
    /// Raw grade; `None` stays `null` on the wire, never coerced to 0.
    pub score: Option<f64>,
    pub module: String,
    pub date: String,
    pub classification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub year: String,
    pub progress: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopModuleView {
    pub subject: String,
    pub grade: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicStatsView {
    pub overall_average: f64,
    pub current_classification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_module: Option<TopModuleView>,
    pub total_credits: f64,
    pub completion_rate: i64,
}

/// Everything the dashboard needs in one payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeOverview {
    pub by_module: Vec<ModuleGradeView>,
    pub by_year: Vec<YearGradeView>,
    pub grade_distribution: Vec<DistributionBucket>,
    pub assessment_scores: Vec<AssessmentSummary>,
    pub year_progress: Vec<ProgressView>,
    pub stats: AcademicStatsView,
}

/// 1-decimal rounding used throughout: `floor(10*x + 0.5) / 10`
/// (half-up at the tenths digit).
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

/// UK honours band for a percentage grade. Closed-open bands except the top:
/// 70.0 is a First, 69.9 is an Upper Second, 39.9 is a Fail.
pub fn classification(grade: f64) -> &'static str {
    if grade >= 70.0 {
        "First Class"
    } else if grade >= 60.0 {
        "Upper Second Class"
    } else if grade >= 50.0 {
        "Lower Second Class"
    } else if grade >= 40.0 {
        "Third Class"
    } else {
        "Fail"
    }
}

/// Distribution bands in display order: full name, short code, lower bound.
const DISTRIBUTION_BANDS: [(&str, &str, f64); 5] = [
    ("First", "1st", 70.0),
    ("Upper Second", "2:1", 60.0),
    ("Lower Second", "2:2", 50.0),
    ("Third", "3rd", 40.0),
    ("Fail", "Fail", f64::NEG_INFINITY),
];

/// Weight-normalized average of a module's graded assessments, unrounded.
/// Ungraded assessments contribute to neither numerator nor denominator;
/// zero total weight yields 0 rather than NaN.
fn weighted_assessment_average(assessments: &[&AssessmentRow]) -> f64 {
    let mut weighted_sum = 0.0_f64;
    let mut total_weight = 0.0_f64;
    for a in assessments {
        let Some(grade) = a.assessment_grade else {
            continue;
        };
        weighted_sum += grade * a.assessment_weight;
        total_weight += a.assessment_weight;
    }
    if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    }
}

fn assessments_by_module<'a>(
    assessments: &'a [AssessmentRow],
) -> HashMap<&'a str, Vec<&'a AssessmentRow>> {
    let mut by_module: HashMap<&str, Vec<&AssessmentRow>> = HashMap::new();
    for a in assessments {
        by_module.entry(a.module_id.as_str()).or_default().push(a);
    }
    by_module
}

/// One row per module, in source order: weighted-average grade rounded to one
/// decimal, plus the band that rounded grade falls in.
pub fn module_grades(modules: &[ModuleRow], assessments: &[AssessmentRow]) -> Vec<ModuleGradeView> {
    let by_module = assessments_by_module(assessments);
    modules
        .iter()
        .map(|m| {
            let own = by_module
                .get(m.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let grade = round_off_1_decimal(weighted_assessment_average(own));
            ModuleGradeView {
                subject: m.module_name.clone(),
                grade,
                credits: m.module_credit,
                classification: classification(grade).to_string(),
            }
        })
        .collect()
}

/// One row per year, in source order. A year's grade is the credit-weighted
/// average of its modules' (unrounded) grades; the credits reported are the
/// year's declared total, not the summed module credits.
pub fn year_grades(
    years: &[YearRow],
    modules: &[ModuleRow],
    assessments: &[AssessmentRow],
) -> Vec<YearGradeView> {
    let by_module = assessments_by_module(assessments);
    years
        .iter()
        .map(|y| {
            let mut weighted_sum = 0.0_f64;
            let mut total_credits = 0.0_f64;
            for m in modules.iter().filter(|m| m.year_id == y.id) {
                let own = by_module
                    .get(m.id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                weighted_sum += weighted_assessment_average(own) * m.module_credit;
                total_credits += m.module_credit;
            }
            let grade = if total_credits > 0.0 {
                round_off_1_decimal(weighted_sum / total_credits)
            } else {
                0.0
            };
            YearGradeView {
                term: format!("Year {}", y.year_number),
                grade,
                classification: classification(grade).to_string(),
                credits: y.year_credit,
            }
        })
        .collect()
}

/// Fixed five-bucket histogram over raw grades. Ungraded assessments are
/// excluded; empty buckets are still emitted so the counts always line up
/// with the band table.
pub fn grade_distribution(assessments: &[AssessmentRow]) -> Vec<DistributionBucket> {
    let mut counts = [0_usize; DISTRIBUTION_BANDS.len()];
    for a in assessments {
        let Some(grade) = a.assessment_grade else {
            continue;
        };
        for (i, (_, _, floor)) in DISTRIBUTION_BANDS.iter().enumerate() {
            if grade >= *floor {
                counts[i] += 1;
                break;
            }
        }
    }
    DISTRIBUTION_BANDS
        .iter()
        .zip(counts)
        .map(|((name, short, _), count)| DistributionBucket {
            name: (*name).to_string(),
            count,
            short_name: (*short).to_string(),
        })
        .collect()
}

/// The `limit` most recently created assessments, newest first. The sort is
/// stable, so same-timestamp entries keep their source order. Ungraded
/// entries keep a null score and classify as [`UNGRADED`].
pub fn recent_assessments(
    modules: &[ModuleRow],
    assessments: &[AssessmentRow],
    limit: usize,
) -> Vec<AssessmentSummary> {
    let module_names: HashMap<&str, &str> = modules
        .iter()
        .map(|m| (m.id.as_str(), m.module_name.as_str()))
        .collect();

    let mut sorted: Vec<&AssessmentRow> = assessments.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    sorted
        .into_iter()
        .take(limit)
        .map(|a| AssessmentSummary {
            name: a.assessment_name.clone(),
            score: a.assessment_grade,
            module: module_names
                .get(a.module_id.as_str())
                .copied()
                .unwrap_or(UNKNOWN_MODULE)
                .to_string(),
            date: a.created_at.clone(),
            classification: match a.assessment_grade {
                Some(g) => classification(g).to_string(),
                None => UNGRADED.to_string(),
            },
        })
        .collect()
}

/// Per-year completion: graded assessments over all assessments under the
/// year's modules, as an integer percentage. 0 when the year has nothing.
pub fn year_progress(
    years: &[YearRow],
    modules: &[ModuleRow],
    assessments: &[AssessmentRow],
) -> Vec<ProgressView> {
    let by_module = assessments_by_module(assessments);
    years
        .iter()
        .map(|y| {
            let mut total = 0_usize;
            let mut graded = 0_usize;
            for m in modules.iter().filter(|m| m.year_id == y.id) {
                let own = by_module
                    .get(m.id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                total += own.len();
                graded += own.iter().filter(|a| a.assessment_grade.is_some()).count();
            }
            let progress = if total > 0 {
                ((graded as f64 / total as f64) * 100.0).round() as i64
            } else {
                0
            };
            ProgressView {
                year: format!("Year {}", y.year_number),
                progress,
            }
        })
        .collect()
}

/// Headline numbers for the dashboard cards. `years`, `by_year` and
/// `progress` all derive from the same snapshot, in the same year order.
pub fn academic_stats(
    years: &[YearRow],
    by_module: &[ModuleGradeView],
    by_year: &[YearGradeView],
    progress: &[ProgressView],
) -> AcademicStatsView {
    let mut weighted_sum = 0.0_f64;
    let mut credit_sum = 0.0_f64;
    for m in by_module.iter().filter(|m| m.grade > 0.0) {
        weighted_sum += m.grade * m.credits;
        credit_sum += m.credits;
    }
    let overall_average = if credit_sum > 0.0 {
        round_off_1_decimal(weighted_sum / credit_sum)
    } else {
        0.0
    };

    let current_classification = years
        .iter()
        .zip(by_year)
        .max_by_key(|(y, _)| y.year_number)
        .map(|(_, v)| v.classification.clone())
        .unwrap_or_else(|| "N/A".to_string());

    let top_module = by_module
        .iter()
        .max_by(|a, b| a.grade.total_cmp(&b.grade))
        .map(|m| TopModuleView {
            subject: m.subject.clone(),
            grade: m.grade,
        });

    let total_credits: f64 = by_year.iter().map(|y| y.credits).sum();

    let completion_rate = if progress.is_empty() {
        0
    } else {
        let sum: i64 = progress.iter().map(|p| p.progress).sum();
        ((sum as f64) / (progress.len() as f64)).round() as i64
    };

    AcademicStatsView {
        overall_average,
        current_classification,
        top_module,
        total_credits,
        completion_rate,
    }
}

/// Run every aggregation over one snapshot.
pub fn overview(
    years: &[YearRow],
    modules: &[ModuleRow],
    assessments: &[AssessmentRow],
) -> GradeOverview {
    let by_module = module_grades(modules, assessments);
    let by_year = year_grades(years, modules, assessments);
    let progress = year_progress(years, modules, assessments);
    let stats = academic_stats(years, &by_module, &by_year, &progress);
    GradeOverview {
        by_module,
        by_year,
        grade_distribution: grade_distribution(assessments),
        assessment_scores: recent_assessments(modules, assessments, RECENT_LIMIT_DEFAULT),
        year_progress: progress,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(id: &str, number: i64, credit: f64) -> YearRow {
        YearRow {
            id: id.to_string(),
            year_number: number,
            year_credit: credit,
        }
    }

    fn module(id: &str, year_id: &str, name: &str, credit: f64) -> ModuleRow {
        ModuleRow {
            id: id.to_string(),
            year_id: year_id.to_string(),
            module_name: name.to_string(),
            module_credit: credit,
        }
    }

    fn assessment(
        id: &str,
        module_id: &str,
        weight: f64,
        grade: Option<f64>,
        created_at: &str,
    ) -> AssessmentRow {
        AssessmentRow {
            module_id: module_id.to_string(),
            assessment_name: format!("Assessment {id}"),
            assessment_weight: weight,
            assessment_grade: grade,
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn round_off_is_half_up_at_tenths() {
        assert_eq!(round_off_1_decimal(0.0), 0.0);
        assert_eq!(round_off_1_decimal(3.54), 3.5);
        assert_eq!(round_off_1_decimal(3.55), 3.6);
        assert_eq!(round_off_1_decimal(75.3333), 75.3);
        assert_eq!(round_off_1_decimal(68.0), 68.0);
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(classification(70.0), "First Class");
        assert_eq!(classification(69.9), "Upper Second Class");
        assert_eq!(classification(60.0), "Upper Second Class");
        assert_eq!(classification(59.9), "Lower Second Class");
        assert_eq!(classification(50.0), "Lower Second Class");
        assert_eq!(classification(49.9), "Third Class");
        assert_eq!(classification(40.0), "Third Class");
        assert_eq!(classification(39.9), "Fail");
        assert_eq!(classification(0.0), "Fail");
    }

    #[test]
    fn module_grade_weighted_average() {
        // (80*40 + 60*60) / 100 = 68.0
        let modules = vec![module("m1", "y1", "Databases", 20.0)];
        let assessments = vec![
            assessment("a1", "m1", 40.0, Some(80.0), "2026-01-01T00:00:00Z"),
            assessment("a2", "m1", 60.0, Some(60.0), "2026-01-02T00:00:00Z"),
        ];
        let views = module_grades(&modules, &assessments);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].grade, 68.0);
        assert_eq!(views[0].classification, "Upper Second Class");
        assert_eq!(views[0].credits, 20.0);
        assert_eq!(views[0].subject, "Databases");
    }

    #[test]
    fn module_grade_skips_ungraded_assessments() {
        let modules = vec![module("m1", "y1", "Networks", 20.0)];
        let assessments = vec![
            assessment("a1", "m1", 50.0, None, "2026-01-01T00:00:00Z"),
            assessment("a2", "m1", 50.0, Some(90.0), "2026-01-02T00:00:00Z"),
        ];
        let views = module_grades(&modules, &assessments);
        assert_eq!(views[0].grade, 90.0);
        assert_eq!(views[0].classification, "First Class");
    }

    #[test]
    fn module_with_no_assessments_is_zero_and_fail() {
        let modules = vec![module("m1", "y1", "Ethics", 10.0)];
        let views = module_grades(&modules, &[]);
        assert_eq!(views[0].grade, 0.0);
        assert_eq!(views[0].classification, "Fail");
    }

    #[test]
    fn module_with_only_ungraded_assessments_is_zero() {
        let modules = vec![module("m1", "y1", "Ethics", 10.0)];
        let assessments = vec![
            assessment("a1", "m1", 40.0, None, "2026-01-01T00:00:00Z"),
            assessment("a2", "m1", 60.0, None, "2026-01-02T00:00:00Z"),
        ];
        let views = module_grades(&modules, &assessments);
        assert_eq!(views[0].grade, 0.0);
    }

    #[test]
    fn module_order_follows_input_order() {
        let modules = vec![
            module("m2", "y1", "Second", 10.0),
            module("m1", "y1", "First", 10.0),
        ];
        let views = module_grades(&modules, &[]);
        assert_eq!(views[0].subject, "Second");
        assert_eq!(views[1].subject, "First");
    }

    #[test]
    fn year_grade_credit_weighted_from_module_grades() {
        // Modules at 68.0 (20cr) and 90.0 (10cr): (68*20 + 90*10)/30 = 75.33 -> 75.3
        let years = vec![year("y1", 1, 120.0)];
        let modules = vec![
            module("m1", "y1", "Databases", 20.0),
            module("m2", "y1", "Compilers", 10.0),
        ];
        let assessments = vec![
            assessment("a1", "m1", 100.0, Some(68.0), "2026-01-01T00:00:00Z"),
            assessment("a2", "m2", 100.0, Some(90.0), "2026-01-02T00:00:00Z"),
        ];
        let views = year_grades(&years, &modules, &assessments);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].term, "Year 1");
        assert_eq!(views[0].grade, 75.3);
        assert_eq!(views[0].classification, "First Class");
        // Declared year credit, not the 30 summed module credits.
        assert_eq!(views[0].credits, 120.0);
    }

    #[test]
    fn year_with_no_modules_is_zero() {
        let years = vec![year("y1", 2, 120.0)];
        let views = year_grades(&years, &[], &[]);
        assert_eq!(views[0].term, "Year 2");
        assert_eq!(views[0].grade, 0.0);
        assert_eq!(views[0].classification, "Fail");
    }

    #[test]
    fn orphaned_module_excluded_from_year_aggregate() {
        let years = vec![year("y1", 1, 120.0)];
        let modules = vec![
            module("m1", "y1", "Databases", 20.0),
            module("m2", "missing-year", "Orphan", 20.0),
        ];
        let assessments = vec![
            assessment("a1", "m1", 100.0, Some(60.0), "2026-01-01T00:00:00Z"),
            assessment("a2", "m2", 100.0, Some(10.0), "2026-01-02T00:00:00Z"),
        ];
        let views = year_grades(&years, &modules, &assessments);
        assert_eq!(views[0].grade, 60.0);
    }

    #[test]
    fn distribution_counts_and_fixed_order() {
        let grades = [72.0, 55.0, 61.0, 45.0, 38.0, 81.0, 50.0, 69.0, 40.0, 59.0];
        let assessments: Vec<AssessmentRow> = grades
            .iter()
            .enumerate()
            .map(|(i, g)| {
                assessment(
                    &format!("a{i}"),
                    "m1",
                    10.0,
                    Some(*g),
                    "2026-01-01T00:00:00Z",
                )
            })
            .collect();
        let buckets = grade_distribution(&assessments);
        let expected = [
            ("First", "1st", 2),
            ("Upper Second", "2:1", 3),
            ("Lower Second", "2:2", 2),
            ("Third", "3rd", 2),
            ("Fail", "Fail", 1),
        ];
        assert_eq!(buckets.len(), expected.len());
        for (bucket, (name, short, count)) in buckets.iter().zip(expected) {
            assert_eq!(bucket.name, name);
            assert_eq!(bucket.short_name, short);
            assert_eq!(bucket.count, count);
        }
    }

    #[test]
    fn distribution_excludes_ungraded_and_emits_empty_buckets() {
        let assessments = vec![
            assessment("a1", "m1", 50.0, Some(75.0), "2026-01-01T00:00:00Z"),
            assessment("a2", "m1", 50.0, None, "2026-01-02T00:00:00Z"),
        ];
        let buckets = grade_distribution(&assessments);
        let total: usize = buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, 1);
        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets[0].count, 1);
    }

    #[test]
    fn recent_assessments_newest_first_with_limit() {
        let modules = vec![module("m1", "y1", "Databases", 20.0)];
        let assessments: Vec<AssessmentRow> = (0..7)
            .map(|i| {
                assessment(
                    &format!("a{i}"),
                    "m1",
                    10.0,
                    Some(50.0),
                    &format!("2026-01-0{}T00:00:00Z", i + 1),
                )
            })
            .collect();
        let recent = recent_assessments(&modules, &assessments, 5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].date, "2026-01-07T00:00:00Z");
        assert_eq!(recent[4].date, "2026-01-03T00:00:00Z");
        assert_eq!(recent[0].module, "Databases");
    }

    #[test]
    fn recent_assessments_tie_keeps_source_order() {
        let modules = vec![module("m1", "y1", "Databases", 20.0)];
        let same = "2026-01-01T00:00:00Z";
        let assessments = vec![
            assessment("a1", "m1", 10.0, Some(50.0), same),
            assessment("a2", "m1", 10.0, Some(60.0), same),
            assessment("a3", "m1", 10.0, Some(70.0), same),
        ];
        let recent = recent_assessments(&modules, &assessments, 5);
        let names: Vec<&str> = recent.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Assessment a1", "Assessment a2", "Assessment a3"]);
    }

    #[test]
    fn recent_ungraded_assessment_is_ungraded_not_fail() {
        let modules = vec![module("m1", "y1", "Databases", 20.0)];
        let assessments = vec![assessment("a1", "m1", 10.0, None, "2026-01-01T00:00:00Z")];
        let recent = recent_assessments(&modules, &assessments, 5);
        assert_eq!(recent[0].score, None);
        assert_eq!(recent[0].classification, UNGRADED);
    }

    #[test]
    fn recent_orphaned_assessment_gets_sentinel_module() {
        let assessments = vec![assessment(
            "a1",
            "gone",
            10.0,
            Some(50.0),
            "2026-01-01T00:00:00Z",
        )];
        let recent = recent_assessments(&[], &assessments, 5);
        assert_eq!(recent[0].module, UNKNOWN_MODULE);
    }

    #[test]
    fn year_progress_counts_graded_over_total() {
        let years = vec![year("y1", 1, 120.0), year("y2", 2, 120.0)];
        let modules = vec![
            module("m1", "y1", "Databases", 20.0),
            module("m2", "y2", "Compilers", 20.0),
        ];
        let assessments = vec![
            assessment("a1", "m1", 50.0, Some(70.0), "2026-01-01T00:00:00Z"),
            assessment("a2", "m1", 50.0, None, "2026-01-02T00:00:00Z"),
            assessment("a3", "m1", 50.0, None, "2026-01-03T00:00:00Z"),
            assessment("a4", "m2", 50.0, Some(40.0), "2026-01-04T00:00:00Z"),
        ];
        let progress = year_progress(&years, &modules, &assessments);
        // 1 of 3 graded -> 33.33 -> 33
        assert_eq!(
            progress[0],
            ProgressView {
                year: "Year 1".to_string(),
                progress: 33
            }
        );
        assert_eq!(
            progress[1],
            ProgressView {
                year: "Year 2".to_string(),
                progress: 100
            }
        );
    }

    #[test]
    fn year_progress_empty_year_is_zero() {
        let years = vec![year("y1", 1, 120.0)];
        let progress = year_progress(&years, &[], &[]);
        assert_eq!(progress[0].progress, 0);
    }

    #[test]
    fn stats_overall_average_ignores_zero_grade_modules() {
        let years = vec![year("y1", 1, 120.0)];
        let modules = vec![
            module("m1", "y1", "Databases", 20.0),
            module("m2", "y1", "Empty", 40.0),
        ];
        let assessments = vec![assessment(
            "a1",
            "m1",
            100.0,
            Some(80.0),
            "2026-01-01T00:00:00Z",
        )];
        let view = overview(&years, &modules, &assessments);
        // The empty module computes to 0 and is left out of the overall average.
        assert_eq!(view.stats.overall_average, 80.0);
        let top = view.stats.top_module.expect("top module");
        assert_eq!(top.subject, "Databases");
        assert_eq!(top.grade, 80.0);
        assert_eq!(view.stats.total_credits, 120.0);
    }

    #[test]
    fn stats_current_classification_is_latest_year() {
        let years = vec![year("y2", 2, 120.0), year("y1", 1, 120.0)];
        let modules = vec![
            module("m1", "y1", "First Year Module", 20.0),
            module("m2", "y2", "Second Year Module", 20.0),
        ];
        let assessments = vec![
            assessment("a1", "m1", 100.0, Some(80.0), "2026-01-01T00:00:00Z"),
            assessment("a2", "m2", 100.0, Some(55.0), "2026-01-02T00:00:00Z"),
        ];
        let view = overview(&years, &modules, &assessments);
        assert_eq!(view.stats.current_classification, "Lower Second Class");
    }

    #[test]
    fn stats_empty_snapshot() {
        let view = overview(&[], &[], &[]);
        assert_eq!(view.stats.overall_average, 0.0);
        assert_eq!(view.stats.current_classification, "N/A");
        assert!(view.stats.top_module.is_none());
        assert_eq!(view.stats.completion_rate, 0);
        assert_eq!(view.by_module.len(), 0);
        assert_eq!(view.grade_distribution.len(), 5);
    }

    #[test]
    fn weight_sums_are_normalized_not_validated() {
        // Weights summing to 40 of a nominal 100 still normalize cleanly.
        let modules = vec![module("m1", "y1", "Partial", 20.0)];
        let assessments = vec![
            assessment("a1", "m1", 20.0, Some(80.0), "2026-01-01T00:00:00Z"),
            assessment("a2", "m1", 20.0, Some(60.0), "2026-01-02T00:00:00Z"),
        ];
        let views = module_grades(&modules, &assessments);
        assert_eq!(views[0].grade, 70.0);
        assert_eq!(views[0].classification, "First Class");
    }
}
