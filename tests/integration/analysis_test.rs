use crash_analytics::analysis::ResultTable;
use crash_analytics::schema::columns::*;
use crash_analytics::{AnalysisId, Answer, CrashAnalysis, CrashAnalysisError, CrashTable, Value};

use crate::utils::{DAMAGE_ASSESSMENT, Row, empty_tables, strings, table, table_with_columns, text};

fn person(crash: &str, severity: &str, gender: &str, deaths: i64) -> Row<'static> {
    vec![
        (CRASH_ID, text(crash)),
        (PRSN_INJRY_SEV_ID, text(severity)),
        (PRSN_GNDR_ID, text(gender)),
        (DEATH_CNT, Value::from(deaths)),
    ]
}

#[test]
fn male_deaths_sum_killed_males_only() -> crash_analytics::Result<()> {
    let mut tables = empty_tables();
    tables.primary_person = table(
        CrashTable::PrimaryPerson,
        &[
            person("1", "Killed", "Male", 1),
            person("2", "Killed", "Female", 1),
            person("3", "Injured", "Male", 0),
        ],
    );
    let analysis = CrashAnalysis::new(tables);
    assert_eq!(analysis.total_male_deaths()?, 1);
    Ok(())
}

#[test]
fn male_deaths_without_matches_is_zero() -> crash_analytics::Result<()> {
    let mut tables = empty_tables();
    tables.primary_person = table(
        CrashTable::PrimaryPerson,
        &[person("1", "INJURED", "MALE", 3)],
    );
    assert_eq!(CrashAnalysis::new(tables).total_male_deaths()?, 0);
    Ok(())
}

#[test]
fn two_wheelers_match_case_insensitively() -> crash_analytics::Result<()> {
    let mut tables = empty_tables();
    tables.units = table(
        CrashTable::Units,
        &[
            vec![(VEH_BODY_STYL_ID, text("MOTORCYCLE"))],
            vec![(VEH_BODY_STYL_ID, text("PASSENGER CAR"))],
            vec![(VEH_BODY_STYL_ID, text("motorcycle (enduro)"))],
            vec![(VEH_BODY_STYL_ID, Value::Missing)],
        ],
    );
    assert_eq!(CrashAnalysis::new(tables).two_wheeler_crashes()?, "2");
    Ok(())
}

#[test]
fn female_accident_state_breaks_ties_alphabetically() -> crash_analytics::Result<()> {
    let rows: Vec<Row<'static>> = [
        ("FEMALE", "TX"),
        ("female", "TX"),
        ("FEMALE", "OK"),
        ("Female", "OK"),
        ("FEMALE", "CA"),
        ("MALE", "NY"),
        ("MALE", "NY"),
        ("MALE", "NY"),
    ]
    .into_iter()
    .map(|(gender, state)| vec![(PRSN_GNDR_ID, text(gender)), (DRVR_LIC_STATE_ID, text(state))])
    .collect();

    let mut tables = empty_tables();
    tables.primary_person = table(CrashTable::PrimaryPerson, &rows);
    let analysis = CrashAnalysis::new(tables);
    assert_eq!(analysis.state_with_most_female_accidents()?, "OK");

    let empty = CrashAnalysis::new(empty_tables());
    assert_eq!(empty.state_with_most_female_accidents()?, "");
    Ok(())
}

#[test]
fn makes_ranked_fifth_to_fifteenth_include_ties() -> crash_analytics::Result<()> {
    let unit = |make: Value, injuries: i64, deaths: Value| -> Row<'static> {
        vec![
            (VEH_MAKE_ID, make),
            (TOT_INJRY_CNT, Value::from(injuries)),
            (DEATH_CNT, deaths),
        ]
    };
    let mut tables = empty_tables();
    tables.units = table(
        CrashTable::Units,
        &[
            unit(text("A"), 100, Value::from(0)),
            unit(text("B"), 90, Value::from(0)),
            unit(text("C"), 80, Value::from(0)),
            unit(text("D"), 70, Value::from(0)),
            unit(text("E"), 50, Value::from(10)),
            unit(text("F"), 30, Value::from(0)),
            unit(text("F"), 30, Value::from(0)),
            unit(text("G"), 50, Value::from(0)),
            // A missing death count drops the row's total
            unit(text("G"), 20, Value::Missing),
            unit(text("NA"), 1000, Value::from(0)),
            unit(Value::Missing, 500, Value::from(0)),
        ],
    );

    let analysis = CrashAnalysis::new(tables);
    assert_eq!(analysis.top_5_to_15_vehicle_makes_by_injuries()?, "E, F, G");
    Ok(())
}

#[test]
fn top_ethnic_group_keeps_ties_per_body_style() -> crash_analytics::Result<()> {
    let units = [
        ("1", "SUV"),
        ("2", "SUV"),
        ("3", "PASSENGER CAR, 4-DOOR"),
        ("4", "NA"),
        ("5", "Unknown"),
        ("6", "VAN"),
        ("7", "OTHER  (EXPLAIN IN NARRATIVE)"),
    ];
    let persons = [
        ("1", "WHITE"),
        ("1", "WHITE"),
        ("1", "HISPANIC"),
        ("2", "HISPANIC"),
        ("3", "BLACK"),
        ("3", "WHITE"),
        ("4", "WHITE"),
        ("4", "WHITE"),
        ("4", "WHITE"),
        ("5", "ASIAN"),
        ("6", "UNKNOWN"),
        ("6", "NA"),
        ("6", "ASIAN"),
        ("7", "AMER. INDIAN"),
    ];

    let mut tables = empty_tables();
    tables.units = table(
        CrashTable::Units,
        &units
            .iter()
            .map(|(crash, style)| vec![(CRASH_ID, text(crash)), (VEH_BODY_STYL_ID, text(style))])
            .collect::<Vec<_>>(),
    );
    tables.primary_person = table(
        CrashTable::PrimaryPerson,
        &persons
            .iter()
            .map(|(crash, ethnicity)| {
                vec![(CRASH_ID, text(crash)), (PRSN_ETHNICITY_ID, text(ethnicity))]
            })
            .collect::<Vec<_>>(),
    );

    let result = CrashAnalysis::new(tables).top_ethnic_group_per_body_style()?;
    assert_eq!(result.columns(), vec![VEH_BODY_STYL_ID, PRSN_ETHNICITY_ID]);
    assert_eq!(
        strings(&result, VEH_BODY_STYL_ID),
        vec![
            "PASSENGER CAR, 4-DOOR",
            "PASSENGER CAR, 4-DOOR",
            "SUV",
            "SUV",
            "VAN"
        ]
    );
    assert_eq!(
        strings(&result, PRSN_ETHNICITY_ID),
        vec!["BLACK", "WHITE", "HISPANIC", "WHITE", "ASIAN"]
    );
    Ok(())
}

#[test]
fn alcohol_zip_codes_skip_missing_zips_and_non_cars() -> crash_analytics::Result<()> {
    let alcohol = "UNDER INFLUENCE - ALCOHOL";
    let units: Vec<Row<'static>> = vec![
        vec![
            (CRASH_ID, text("1")),
            (VEH_BODY_STYL_ID, text("PASSENGER CAR, 4-DOOR")),
            (CONTRIB_FACTR_1_ID, text(alcohol)),
        ],
        vec![
            (CRASH_ID, text("2")),
            (VEH_BODY_STYL_ID, text("SPORT UTILITY VEHICLE")),
            (CONTRIB_FACTR_1_ID, text(alcohol)),
        ],
        vec![
            (CRASH_ID, text("3")),
            (VEH_BODY_STYL_ID, text("PASSENGER CAR, 2-DOOR")),
            (CONTRIB_FACTR_1_ID, text("SPEEDING")),
            (CONTRIB_FACTR_2_ID, text("HAD BEEN DRINKING")),
        ],
        vec![
            (CRASH_ID, text("4")),
            (VEH_BODY_STYL_ID, text("POLICE CAR/TRUCK")),
            (CONTRIB_FACTR_2_ID, text(alcohol)),
        ],
        vec![
            (CRASH_ID, text("5")),
            (VEH_BODY_STYL_ID, text("passenger car, 4-door")),
            (CONTRIB_FACTR_1_ID, text(alcohol)),
        ],
        vec![
            (CRASH_ID, text("6")),
            (VEH_BODY_STYL_ID, text("PASSENGER CAR, 4-DOOR")),
            (CONTRIB_FACTR_2_ID, text(alcohol)),
        ],
        vec![
            (CRASH_ID, text("7")),
            (VEH_BODY_STYL_ID, text("PASSENGER CAR, 4-DOOR")),
            (CONTRIB_FACTR_1_ID, text(alcohol)),
        ],
        vec![
            (CRASH_ID, text("8")),
            (VEH_BODY_STYL_ID, text("PASSENGER CAR, 4-DOOR")),
            (CONTRIB_FACTR_1_ID, text(alcohol)),
        ],
    ];
    let persons: Vec<Row<'static>> = [
        ("1", Some("76010")),
        ("1", Some("76010")),
        ("2", Some("11111")),
        ("3", Some("22222")),
        ("4", Some("78521")),
        ("4", None),
        ("5", Some("75001")),
        ("6", Some("75002")),
        ("7", Some("75003")),
        ("8", Some("75004")),
    ]
    .into_iter()
    .map(|(crash, zip)| vec![(CRASH_ID, text(crash)), (DRVR_ZIP, Value::from(zip))])
    .collect();

    let mut tables = empty_tables();
    tables.units = table(CrashTable::Units, &units);
    tables.primary_person = table(CrashTable::PrimaryPerson, &persons);

    // Five zips tie for second place, so all six come back
    assert_eq!(
        CrashAnalysis::new(tables).top_5_alcohol_zip_codes()?,
        "76010, 75001, 75002, 75003, 75004, 78521"
    );
    Ok(())
}

#[test]
fn severe_damage_counts_distinct_insured_crashes() -> crash_analytics::Result<()> {
    let insured = "PROOF OF LIABILITY INSURANCE";
    let damage = |crash: &str, property: Value| -> Row<'static> {
        vec![(CRASH_ID, text(crash)), (DAMAGED_PROPERTY, property)]
    };
    let unit = |crash: &str, scale_1: Value, scale_2: Value, responsibility: &str| -> Row<'static> {
        vec![
            (CRASH_ID, text(crash)),
            (VEH_DMAG_SCL_1_ID, scale_1),
            (VEH_DMAG_SCL_2_ID, scale_2),
            (FIN_RESP_TYPE_ID, text(responsibility)),
        ]
    };

    let mut tables = empty_tables();
    tables.damages = table(
        CrashTable::Damages,
        &[
            damage("1", Value::Missing),
            damage("2", text("NONE")),
            damage("3", text("FENCE")),
            damage("4", text("none1")),
            damage("5", text("  ")),
            damage("6", Value::Missing),
        ],
    );
    tables.units = table(
        CrashTable::Units,
        &[
            unit("1", text("DAMAGE SCALE 5"), text("NA"), insured),
            unit("1", text("DAMAGE SCALE 5"), text("NA"), insured),
            unit("2", text("DAMAGED 2"), text("DAMAGED 4"), "Proof of Liability Insurance"),
            unit("3", text("DAMAGED 7 HIGHEST"), text("NA"), insured),
            unit("4", text("NO DAMAGE"), text("INVALID VALUE"), insured),
            unit("5", text("DAMAGED 6"), text("NA"), "NA"),
            unit("6", text("DAMAGED 7 HIGHEST"), Value::Missing, insured),
        ],
    );

    assert_eq!(
        CrashAnalysis::new(tables).severe_damage_insured_crash_count()?,
        3
    );
    Ok(())
}

#[test]
fn duplicate_units_do_not_inflate_the_crash_count() -> crash_analytics::Result<()> {
    let unit = vec![
        (CRASH_ID, text("1")),
        (VEH_DMAG_SCL_1_ID, text("DAMAGE SCALE 5")),
        (FIN_RESP_TYPE_ID, text("PROOF OF LIABILITY INSURANCE")),
    ];
    let mut tables = empty_tables();
    tables.damages = table(
        CrashTable::Damages,
        &[vec![(CRASH_ID, text("1")), (DAMAGED_PROPERTY, Value::Missing)]],
    );
    tables.units = table_with_columns(CrashTable::Units, &DAMAGE_ASSESSMENT, &[unit.clone()]);
    assert_eq!(
        CrashAnalysis::new(tables.clone()).severe_damage_insured_crash_count()?,
        1
    );

    tables.units = table_with_columns(CrashTable::Units, &DAMAGE_ASSESSMENT, &[unit.clone(), unit]);
    assert_eq!(
        CrashAnalysis::new(tables).severe_damage_insured_crash_count()?,
        1
    );
    Ok(())
}

#[test]
fn damage_columns_may_come_from_damages() -> crash_analytics::Result<()> {
    let damage = |crash: &str, scale: &str, property: Value, responsibility: &str| -> Row<'static> {
        vec![
            (CRASH_ID, text(crash)),
            (VEH_DMAG_SCL_1_ID, text(scale)),
            (VEH_DMAG_SCL_2_ID, text("NA")),
            (DAMAGED_PROPERTY, property),
            (FIN_RESP_TYPE_ID, text(responsibility)),
        ]
    };
    let insured = "PROOF OF LIABILITY INSURANCE";

    let mut tables = empty_tables();
    tables.damages = table(
        CrashTable::Damages,
        &[
            damage("1", "DAMAGE SCALE 5", text(""), insured),
            damage("2", "DAMAGED 3", Value::Missing, insured),
            damage("3", "DAMAGED 6", text("NONE"), "CERTIFICATE OF SELF-INSURANCE"),
        ],
    );
    // Units rows carry only the columns every Units file must have
    tables.units = table(
        CrashTable::Units,
        &[
            vec![(CRASH_ID, text("1"))],
            vec![(CRASH_ID, text("1"))],
            vec![(CRASH_ID, text("2"))],
            vec![(CRASH_ID, text("3"))],
        ],
    );
    assert!(!tables.units.has_column(VEH_DMAG_SCL_1_ID));

    assert_eq!(
        CrashAnalysis::new(tables).severe_damage_insured_crash_count()?,
        1
    );
    Ok(())
}

#[test]
fn damage_columns_on_neither_table_are_reported() {
    let mut tables = empty_tables();
    tables.damages = table(CrashTable::Damages, &[]);

    let err = CrashAnalysis::new(tables)
        .severe_damage_insured_crash_count()
        .unwrap_err();
    assert!(matches!(err, CrashAnalysisError::ColumnNotFound { .. }));
}

#[test]
fn speeding_makes_skip_vehicles_without_a_make() -> crash_analytics::Result<()> {
    let crashes = ["M1", "M2", "M3"];
    let mut tables = empty_tables();
    tables.charges = table(
        CrashTable::Charges,
        &crashes
            .iter()
            .map(|crash| vec![(CRASH_ID, text(crash)), (CHARGE, text("SPEEDING"))])
            .collect::<Vec<_>>(),
    );
    tables.primary_person = table(
        CrashTable::PrimaryPerson,
        &crashes
            .iter()
            .map(|crash| vec![(CRASH_ID, text(crash)), (DRVR_LIC_TYPE_ID, text("DRIVER LICENSE"))])
            .collect::<Vec<_>>(),
    );
    tables.units = table(
        CrashTable::Units,
        &crashes
            .iter()
            .zip([text("FORD"), text("FORD"), Value::Missing])
            .map(|(crash, make)| {
                vec![
                    (CRASH_ID, text(crash)),
                    (VEH_MAKE_ID, make),
                    (VEH_COLOR_ID, text("BLK")),
                    (VEH_LIC_STATE_ID, text("TX")),
                ]
            })
            .collect::<Vec<_>>(),
    );

    let listing = CrashAnalysis::new(tables).top_5_speeding_vehicle_makes()?;
    assert_eq!(listing, "FORD");
    assert!(!listing.ends_with(", "));
    Ok(())
}

#[test]
fn speeding_makes_respect_colour_state_and_licence_rules() -> crash_analytics::Result<()> {
    struct Speeding {
        crash: &'static str,
        charge: &'static str,
        licence: &'static str,
        make: &'static str,
        color: &'static str,
        state: &'static str,
    }
    let case = |crash, charge, licence, make, color, state| Speeding {
        crash,
        charge,
        licence,
        make,
        color,
        state,
    };
    let cases = [
        case("S1", "SPEEDING - UNSAFE", "DRIVER LICENSE", "FORD", "C01", "TX"),
        case("S2", "FAILED TO CONTROL SPEED", "COMMERCIAL DRIVER LIC.", "FORD", "C02", "TX"),
        case("S3", "SPEEDING", "UNLICENSED", "TOYOTA", "C01", "TX"),
        case("S4", "SPEEDING", "DRIVER LICENSE", "HONDA", "PINK", "TX"),
        case("S5", "SPEEDING", "DRIVER LICENSE", "NISSAN", "C03", "NA"),
        case("S6", "NO SEAT BELT", "DRIVER LICENSE", "KIA", "C01", "TX"),
        case("S7", "SPEEDING", "DRIVER LICENSE", "CHEVROLET", "C01", "OK"),
        case("S8", "SPEEDING", "DRIVER LICENSE", "CHEVROLET", "C01", "OK"),
        case("S9", "SPEEDING", "DRIVER LICENSE", "DODGE", "C04", "TX"),
        case("S10", "SPEEDING", "DRIVER LICENSE", "JEEP", "C05", "OK"),
        case("S11", "SPEEDING", "DRIVER LICENSE", "BMW", "C06", "TX"),
        case("S12", "SPEEDING", "DRIVER LICENSE", "AUDI", "C07", "TX"),
    ];

    let charges: Vec<Row<'static>> = cases
        .iter()
        .map(|c| vec![(CRASH_ID, text(c.crash)), (CHARGE, text(c.charge))])
        .collect();
    let persons: Vec<Row<'static>> = cases
        .iter()
        .map(|c| vec![(CRASH_ID, text(c.crash)), (DRVR_LIC_TYPE_ID, text(c.licence))])
        .collect();
    let mut units: Vec<Row<'static>> = cases
        .iter()
        .map(|c| {
            vec![
                (CRASH_ID, text(c.crash)),
                (VEH_MAKE_ID, text(c.make)),
                (VEH_COLOR_ID, text(c.color)),
                (VEH_LIC_STATE_ID, text(c.state)),
            ]
        })
        .collect();

    // Background traffic: ten common colours, so the single PINK vehicle
    // falls outside the top ten
    for n in 1..=10 {
        for copy in 0..3 {
            units.push(vec![
                (CRASH_ID, text(&format!("F{n}-{copy}"))),
                (VEH_MAKE_ID, text("FILLER")),
                (VEH_COLOR_ID, text(&format!("C{n:02}"))),
                (VEH_LIC_STATE_ID, text("TX")),
            ]);
        }
    }
    for copy in 0..5 {
        units.push(vec![
            (CRASH_ID, text(&format!("NA-{copy}"))),
            (VEH_COLOR_ID, text("NA")),
            (VEH_LIC_STATE_ID, text("TX")),
        ]);
    }

    let mut tables = empty_tables();
    tables.charges = table(CrashTable::Charges, &charges);
    tables.primary_person = table(CrashTable::PrimaryPerson, &persons);
    tables.units = table(CrashTable::Units, &units);

    assert_eq!(
        CrashAnalysis::new(tables).top_5_speeding_vehicle_makes()?,
        "CHEVROLET, FORD, AUDI, BMW, DODGE, JEEP"
    );
    Ok(())
}

#[test]
fn empty_tables_give_identity_answers() -> crash_analytics::Result<()> {
    let report = CrashAnalysis::new(empty_tables()).run_all()?;
    let answers: Vec<&Answer> = report.analyses.iter().map(|o| &o.answer).collect();

    assert_eq!(report.analyses.len(), 8);
    assert_eq!(answers[0], &Answer::Integer(0));
    assert_eq!(answers[1], &Answer::Text("0".into()));
    assert_eq!(answers[2], &Answer::Text(String::new()));
    assert_eq!(answers[3], &Answer::Text(String::new()));
    assert_eq!(
        answers[4],
        &Answer::Table(ResultTable {
            columns: vec![VEH_BODY_STYL_ID.into(), PRSN_ETHNICITY_ID.into()],
            rows: vec![],
        })
    );
    assert_eq!(answers[5], &Answer::Text(String::new()));
    assert_eq!(answers[6], &Answer::Count(0));
    assert_eq!(answers[7], &Answer::Text(String::new()));
    Ok(())
}

#[test]
fn single_analysis_carries_number_and_title() -> crash_analytics::Result<()> {
    let outcome = CrashAnalysis::new(empty_tables()).run(AnalysisId::TwoWheelerCrashes)?;
    assert_eq!(outcome.number, 2);
    assert_eq!(outcome.title, "Number of two wheelers are booked for crashes");

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["answer"], "0");
    assert_eq!(json["id"], "TwoWheelerCrashes");
    Ok(())
}

#[test]
fn missing_column_is_reported_not_panicked() {
    let mut tables = empty_tables();
    tables.charges = crash_analytics::Dataset::from_rows(
        "Charges",
        &[(CRASH_ID, crash_analytics::ColumnType::Text)],
        &[],
    )
    .unwrap();

    let err = CrashAnalysis::new(tables)
        .top_5_speeding_vehicle_makes()
        .unwrap_err();
    assert!(matches!(
        err,
        crash_analytics::CrashAnalysisError::ColumnNotFound { .. }
    ));
}
