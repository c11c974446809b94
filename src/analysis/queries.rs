//! The eight analytical questions, each a fixed operator pipeline

use crate::dataset::{Dataset, Value};
use crate::error::Result;
use crate::filter::{BatchFilter, Expr, apply_filters, text_values};
use crate::format::column_listing;
use crate::ops::{
    Aggregate, COUNT_COLUMN, NumericExpr, RankSpec, SUM_COLUMN, rank_at_most, rank_between,
};
use crate::schema::columns::*;

use super::CrashAnalysis;

/// Body styles that say nothing about the vehicle
pub const EXCLUDED_BODY_STYLES: &[&str] = &[
    "NA",
    "UNKNOWN",
    "NOT REPORTED",
    "OTHER (EXPLAIN IN NARRATIVE)",
    "OTHER  (EXPLAIN IN NARRATIVE)",
];

pub const EXCLUDED_ETHNICITIES: &[&str] = &["NA", "UNKNOWN"];

/// Licence types that do not count as a licensed driver
pub const EXCLUDED_LICENSE_TYPES: &[&str] = &["UNLICENSED", "UNKNOWN", "NA"];

/// `DAMAGED_PROPERTY` values meaning nothing was damaged
pub const NO_PROPERTY_DAMAGE: &[&str] = &["NONE", "NONE1"];

/// Minimum damage scale level counted as severe
pub const DAMAGE_LEVEL_THRESHOLD: i64 = 4;

/// Rank cut-off for vehicle licence states in the speeding analysis
pub const TOP_STATES: i64 = 25;

/// Rank cut-off for vehicle colours in the speeding analysis
pub const TOP_COLORS: i64 = 10;

const TOTAL_INJURIES: &str = "TOTAL_INJURY_COUNT_INCLUDING_DEATH";

/// Present and not the literal `"NA"` placeholder
fn known(column: &str) -> Expr {
    Expr::And(vec![
        Expr::IsNotNull(column.to_string()),
        Expr::NotEq(column.to_string(), Value::from("NA")),
    ])
}

/// Integer in the first row of `column`, 0 when absent
fn first_integer(dataset: &Dataset, column: &str) -> Result<i64> {
    if dataset.is_empty() {
        return Ok(0);
    }
    Ok(dataset.value(0, column)?.to_number().unwrap_or(0))
}

/// Values of `column` ranked `k` or better by their row count in `dataset`
fn top_by_count(dataset: &Dataset, column: &str, k: i64) -> Result<Vec<Value>> {
    dataset
        .filter(&known(column))?
        .group_by(&[column], &Aggregate::Count)?
        .rank(&RankSpec::by(COUNT_COLUMN).tie_break(&[column]))?
        .filter(&rank_at_most(k))?
        .column_values(column)
}

impl CrashAnalysis {
    /// Total deaths of male persons whose injury severity is "KILLED"
    pub fn total_male_deaths(&self) -> Result<i64> {
        let killed_males = self.tables.primary_person.filter(&Expr::And(vec![
            Expr::EqIgnoreCase(PRSN_INJRY_SEV_ID.into(), "KILLED".into()),
            Expr::EqIgnoreCase(PRSN_GNDR_ID.into(), "MALE".into()),
        ]))?;

        let total = killed_males.group_by(&[], &Aggregate::Sum(DEATH_CNT.into()))?;
        first_integer(&total, SUM_COLUMN)
    }

    /// Number of units whose body style mentions a motorcycle, as text
    pub fn two_wheeler_crashes(&self) -> Result<String> {
        let motorcycles = self.tables.units.filter(&Expr::ContainsIgnoreCase(
            VEH_BODY_STYL_ID.into(),
            "MOTORCYCLE".into(),
        ))?;
        Ok(motorcycles.num_rows().to_string())
    }

    /// Driver licence state with the most female persons involved
    ///
    /// Equal counts go to the alphabetically first state. No female persons
    /// gives an empty string.
    pub fn state_with_most_female_accidents(&self) -> Result<String> {
        let by_state = self
            .tables
            .primary_person
            .filter(&Expr::EqIgnoreCase(PRSN_GNDR_ID.into(), "FEMALE".into()))?
            .group_by(&[DRVR_LIC_STATE_ID], &Aggregate::Count)?
            .rank(&RankSpec::by(COUNT_COLUMN).tie_break(&[DRVR_LIC_STATE_ID]))?;

        if by_state.is_empty() {
            return Ok(String::new());
        }
        Ok(by_state.value(0, DRVR_LIC_STATE_ID)?.to_string())
    }

    /// Vehicle makes ranked 5th to 15th by injuries plus deaths
    pub fn top_5_to_15_vehicle_makes_by_injuries(&self) -> Result<String> {
        let total = NumericExpr::column(TOT_INJRY_CNT).add(NumericExpr::column(DEATH_CNT));

        let ranked = self
            .tables
            .units
            .filter(&known(VEH_MAKE_ID))?
            .derive(TOTAL_INJURIES, &total)?
            .group_by(&[VEH_MAKE_ID], &Aggregate::Sum(TOTAL_INJURIES.into()))?
            .rank(&RankSpec::by(SUM_COLUMN).tie_break(&[VEH_MAKE_ID]))?
            .filter(&rank_between(5, 15))?;

        column_listing(&ranked, VEH_MAKE_ID)
    }

    /// Most frequent ethnicity for every body style, ties included
    ///
    /// # Returns
    /// A two-column dataset (`VEH_BODY_STYL_ID`, `PRSN_ETHNICITY_ID`) sorted
    /// by body style, then ethnicity
    pub fn top_ethnic_group_per_body_style(&self) -> Result<Dataset> {
        let excluded_styles = EXCLUDED_BODY_STYLES
            .iter()
            .map(ToString::to_string)
            .collect();

        self.tables
            .units
            .join(&self.tables.primary_person, CRASH_ID)?
            .filter(&Expr::InIgnoreCase(VEH_BODY_STYL_ID.into(), excluded_styles).negate())?
            .filter(&Expr::NotIn(
                PRSN_ETHNICITY_ID.into(),
                text_values(EXCLUDED_ETHNICITIES),
            ))?
            .group_by(&[VEH_BODY_STYL_ID, PRSN_ETHNICITY_ID], &Aggregate::Count)?
            .rank(
                &RankSpec::by(COUNT_COLUMN)
                    .partition_by(&[VEH_BODY_STYL_ID])
                    .tie_break(&[PRSN_ETHNICITY_ID]),
            )?
            .filter(&rank_at_most(1))?
            .select(&[VEH_BODY_STYL_ID, PRSN_ETHNICITY_ID])
    }

    /// Five driver zip codes with the most alcohol-related car crashes
    pub fn top_5_alcohol_zip_codes(&self) -> Result<String> {
        let alcohol = Expr::Or(vec![
            Expr::Contains(CONTRIB_FACTR_1_ID.into(), "ALCOHOL".into()),
            Expr::Contains(CONTRIB_FACTR_2_ID.into(), "ALCOHOL".into()),
        ]);

        let ranked = self
            .tables
            .units
            .join(&self.tables.primary_person, CRASH_ID)?
            .filter(&Expr::IsNotNull(DRVR_ZIP.into()))?
            .filter(&Expr::ContainsIgnoreCase(VEH_BODY_STYL_ID.into(), "CAR".into()))?
            .filter(&alcohol)?
            .group_by(&[DRVR_ZIP], &Aggregate::Count)?
            .rank(&RankSpec::by(COUNT_COLUMN).tie_break(&[DRVR_ZIP]))?
            .filter(&rank_at_most(5))?;

        column_listing(&ranked, DRVR_ZIP)
    }

    /// Distinct insured crashes with a severe damage level and no damaged property
    pub fn severe_damage_insured_crash_count(&self) -> Result<usize> {
        let severe = Expr::Or(vec![
            Expr::TokenAtLeast {
                column: VEH_DMAG_SCL_1_ID.into(),
                threshold: DAMAGE_LEVEL_THRESHOLD,
            },
            Expr::TokenAtLeast {
                column: VEH_DMAG_SCL_2_ID.into(),
                threshold: DAMAGE_LEVEL_THRESHOLD,
            },
        ]);
        let no_property_damage = Expr::Or(vec![
            Expr::IsBlank(DAMAGED_PROPERTY.into()),
            Expr::InIgnoreCase(
                DAMAGED_PROPERTY.into(),
                NO_PROPERTY_DAMAGE.iter().map(ToString::to_string).collect(),
            ),
        ]);
        let insured = Expr::EqIgnoreCase(
            FIN_RESP_TYPE_ID.into(),
            "PROOF OF LIABILITY INSURANCE".into(),
        );

        let joined = self.tables.damages.join(&self.tables.units, CRASH_ID)?;
        let filters: [&dyn BatchFilter; 3] = [&severe, &no_property_damage, &insured];
        let crashes = apply_filters(&joined, &filters)?.distinct(&[CRASH_ID])?;

        Ok(crashes.num_rows())
    }

    /// Five makes most charged with speeding among licensed drivers in
    /// top-colour vehicles licensed in the top states
    pub fn top_5_speeding_vehicle_makes(&self) -> Result<String> {
        let units = &self.tables.units;
        let top_states = top_by_count(units, VEH_LIC_STATE_ID, TOP_STATES)?;
        let top_colors = top_by_count(units, VEH_COLOR_ID, TOP_COLORS)?;
        log::debug!(
            "Speeding analysis restricted to {} states and {} colours",
            top_states.len(),
            top_colors.len()
        );

        let ranked = self
            .tables
            .charges
            .join(&self.tables.primary_person, CRASH_ID)?
            .join(units, CRASH_ID)?
            .filter(&Expr::Contains(CHARGE.into(), "SPEED".into()))?
            .filter(&Expr::NotIn(
                DRVR_LIC_TYPE_ID.into(),
                text_values(EXCLUDED_LICENSE_TYPES),
            ))?
            .filter(&Expr::And(vec![
                Expr::In(VEH_COLOR_ID.into(), top_colors),
                Expr::In(VEH_LIC_STATE_ID.into(), top_states),
                Expr::IsNotNull(VEH_MAKE_ID.into()),
            ]))?
            .group_by(&[VEH_MAKE_ID], &Aggregate::Count)?
            .rank(&RankSpec::by(COUNT_COLUMN).tie_break(&[VEH_MAKE_ID]))?
            .filter(&rank_at_most(5))?
            .distinct(&[VEH_MAKE_ID])?;

        column_listing(&ranked, VEH_MAKE_ID)
    }
}
