//! The crash analyses and the context that owns their input tables
//!
//! [`CrashAnalysis`] holds the six loaded tables. Each question is a method
//! built from the relational operators in [`crate::ops`]; [`CrashAnalysis::run`]
//! and [`CrashAnalysis::run_all`] wrap them into serializable outcomes.

mod queries;

pub use queries::{
    DAMAGE_LEVEL_THRESHOLD, EXCLUDED_BODY_STYLES, EXCLUDED_ETHNICITIES, EXCLUDED_LICENSE_TYPES,
    NO_PROPERTY_DAMAGE, TOP_COLORS, TOP_STATES,
};

use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::dataset::{Dataset, Value};
use crate::error::Result;
use crate::loader::load_tables;
use crate::schema::CrashTable;

/// The six source tables, fully loaded
#[derive(Debug, Clone)]
pub struct CrashTables {
    pub charges: Dataset,
    pub damages: Dataset,
    pub endorse: Dataset,
    pub primary_person: Dataset,
    pub restrict: Dataset,
    pub units: Dataset,
}

impl CrashTables {
    #[must_use]
    pub fn get(&self, table: CrashTable) -> &Dataset {
        match table {
            CrashTable::Charges => &self.charges,
            CrashTable::Damages => &self.damages,
            CrashTable::Endorse => &self.endorse,
            CrashTable::PrimaryPerson => &self.primary_person,
            CrashTable::Restrict => &self.restrict,
            CrashTable::Units => &self.units,
        }
    }
}

/// Identifies one of the eight questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnalysisId {
    MaleDeaths,
    TwoWheelerCrashes,
    FemaleAccidentState,
    InjuryRankedMakes,
    EthnicGroupPerBodyStyle,
    AlcoholZipCodes,
    SevereDamageInsuredCrashes,
    SpeedingMakes,
}

impl AnalysisId {
    /// All analyses in presentation order
    pub const ALL: [Self; 8] = [
        Self::MaleDeaths,
        Self::TwoWheelerCrashes,
        Self::FemaleAccidentState,
        Self::InjuryRankedMakes,
        Self::EthnicGroupPerBodyStyle,
        Self::AlcoholZipCodes,
        Self::SevereDamageInsuredCrashes,
        Self::SpeedingMakes,
    ];

    /// 1-based question number
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::MaleDeaths => 1,
            Self::TwoWheelerCrashes => 2,
            Self::FemaleAccidentState => 3,
            Self::InjuryRankedMakes => 4,
            Self::EthnicGroupPerBodyStyle => 5,
            Self::AlcoholZipCodes => 6,
            Self::SevereDamageInsuredCrashes => 7,
            Self::SpeedingMakes => 8,
        }
    }

    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.number() == number)
    }

    /// The question as printed above its answer
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::MaleDeaths => {
                "Number of crashes (accidents) in which number of persons killed are male"
            }
            Self::TwoWheelerCrashes => "Number of two wheelers are booked for crashes",
            Self::FemaleAccidentState => {
                "State highest number of accidents in which females are involved"
            }
            Self::InjuryRankedMakes => {
                "Top 5th to 15th VEH_MAKE_IDs that contribute to a largest number of injuries including death"
            }
            Self::EthnicGroupPerBodyStyle => {
                "For all the body styles involved in crashes, the top ethnic user group of each unique body style"
            }
            Self::AlcoholZipCodes => {
                "Among the crashed cars, Top 5 Zip Codes with highest number crashes with alcohols as the contributing factor to a crash"
            }
            Self::SevereDamageInsuredCrashes => {
                "Count of Distinct Crash IDs where No Damaged Property was observed and Damage Level is above 4 and car avails Insurance"
            }
            Self::SpeedingMakes => {
                "Top 5 Vehicle Makes where drivers are charged with speeding related offences, has licensed Drivers, used top 10 used vehicle colours and has car licensed with the Top 25 states with highest number of offences"
            }
        }
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}

/// Small result relation in serializable form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let columns = dataset.columns();
        let names: Vec<&str> = columns.iter().map(String::as_str).collect();
        let views = dataset.column_views(&names)?;
        let rows = dataset
            .rows()
            .map(|row| views.iter().map(|view| view.value(row)).collect())
            .collect();
        Ok(Self { columns, rows })
    }
}

/// The answer to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Integer(i64),
    Count(usize),
    Text(String),
    Table(ResultTable),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Count(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
            Self::Table(table) => f.write_str(&crate::utils::logging::console::format_table(
                &table.columns,
                &table.rows,
            )),
        }
    }
}

/// One evaluated question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisOutcome {
    pub id: AnalysisId,
    pub number: u8,
    pub title: &'static str,
    pub answer: Answer,
}

/// Answers to all questions, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub analyses: Vec<AnalysisOutcome>,
}

/// Owns the loaded tables and answers questions about them
#[derive(Debug, Clone)]
pub struct CrashAnalysis {
    tables: CrashTables,
}

impl CrashAnalysis {
    #[must_use]
    pub fn new(tables: CrashTables) -> Self {
        Self { tables }
    }

    /// Load every table named in `config` and build the context
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self::new(load_tables(config)?))
    }

    #[must_use]
    pub fn tables(&self) -> &CrashTables {
        &self.tables
    }

    /// Evaluate a single question
    pub fn run(&self, id: AnalysisId) -> Result<AnalysisOutcome> {
        let start = Instant::now();
        log::info!("Running analysis {}", id.number());

        let answer = match id {
            AnalysisId::MaleDeaths => Answer::Integer(self.total_male_deaths()?),
            AnalysisId::TwoWheelerCrashes => Answer::Text(self.two_wheeler_crashes()?),
            AnalysisId::FemaleAccidentState => {
                Answer::Text(self.state_with_most_female_accidents()?)
            }
            AnalysisId::InjuryRankedMakes => {
                Answer::Text(self.top_5_to_15_vehicle_makes_by_injuries()?)
            }
            AnalysisId::EthnicGroupPerBodyStyle => Answer::Table(ResultTable::from_dataset(
                &self.top_ethnic_group_per_body_style()?,
            )?),
            AnalysisId::AlcoholZipCodes => Answer::Text(self.top_5_alcohol_zip_codes()?),
            AnalysisId::SevereDamageInsuredCrashes => {
                Answer::Count(self.severe_damage_insured_crash_count()?)
            }
            AnalysisId::SpeedingMakes => Answer::Text(self.top_5_speeding_vehicle_makes()?),
        };

        log::debug!("Analysis {} finished in {:?}", id.number(), start.elapsed());

        Ok(AnalysisOutcome {
            id,
            number: id.number(),
            title: id.title(),
            answer,
        })
    }

    /// Evaluate every question in order
    pub fn run_all(&self) -> Result<AnalysisReport> {
        let analyses = AnalysisId::ALL
            .into_iter()
            .map(|id| self.run(id))
            .collect::<Result<Vec<_>>>()?;
        Ok(AnalysisReport { analyses })
    }
}
