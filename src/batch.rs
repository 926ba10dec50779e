//! Batch benefit runs for a file of members
//!
//! The reference tables are loaded once and shared read-only; members are
//! evaluated in parallel and results come back in input order. A member whose
//! calculation fails carries its error without stopping the rest of the run.

use std::io::{Read, Write};
use std::path::Path;

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::benefit::inputs::deserialize_flag;
use crate::benefit::{BenefitCalculator, BenefitInputs, BenefitResult, Gender};
use crate::error::{PensionError, Result};

/// One member row of a batch input file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemberRecord {
    pub member_id: String,
    pub age: u32,
    pub years_of_service: u32,
    pub salary: f64,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_teacher: bool,
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl MemberRecord {
    pub fn inputs(&self) -> BenefitInputs {
        BenefitInputs {
            age: self.age,
            years_of_service: self.years_of_service,
            salary: self.salary,
            is_teacher: self.is_teacher,
            gender: self.gender.unwrap_or_default(),
        }
    }
}

/// Outcome for one member
#[derive(Debug)]
pub struct MemberOutcome {
    pub member_id: String,
    pub result: Result<BenefitResult>,
}

/// Output row: member id, the seven benefit figures, and any error
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    member_id: &'a str,
    fas: Option<f64>,
    fas_next_year: Option<f64>,
    accrued_benefit: Option<f64>,
    pvab: Option<f64>,
    accrued_benefit_next_year: Option<f64>,
    pvab_next_year: Option<f64>,
    pvab_increase: Option<f64>,
    error: Option<String>,
}

impl<'a> From<&'a MemberOutcome> for OutputRow<'a> {
    fn from(outcome: &'a MemberOutcome) -> Self {
        match &outcome.result {
            Ok(r) => OutputRow {
                member_id: &outcome.member_id,
                fas: Some(r.fas),
                fas_next_year: Some(r.fas_next_year),
                accrued_benefit: Some(r.accrued_benefit),
                pvab: Some(r.pvab),
                accrued_benefit_next_year: Some(r.accrued_benefit_next_year),
                pvab_next_year: Some(r.pvab_next_year),
                pvab_increase: Some(r.pvab_increase),
                error: None,
            },
            Err(e) => OutputRow {
                member_id: &outcome.member_id,
                fas: None,
                fas_next_year: None,
                accrued_benefit: None,
                pvab: None,
                accrued_benefit_next_year: None,
                pvab_next_year: None,
                pvab_increase: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Runs one calculator over many members
#[derive(Debug, Clone)]
pub struct BatchRunner {
    calculator: BenefitCalculator,
}

impl BatchRunner {
    pub fn new(calculator: BenefitCalculator) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &BenefitCalculator {
        &self.calculator
    }

    /// Evaluate every member in parallel, preserving input order
    pub fn run(&self, members: &[MemberRecord]) -> Vec<MemberOutcome> {
        let outcomes: Vec<MemberOutcome> = members
            .par_iter()
            .map(|member| MemberOutcome {
                member_id: member.member_id.clone(),
                result: self.calculator.compute(&member.inputs()),
            })
            .collect();

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        if failed > 0 {
            warn!("{} of {} members failed", failed, outcomes.len());
        }
        info!("Computed benefits for {} members", outcomes.len() - failed);
        outcomes
    }
}

/// Load members from a CSV file
pub fn load_members<P: AsRef<Path>>(path: P) -> Result<Vec<MemberRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| PensionError::data_load(path, e))?;
    load_members_from_reader(file).map_err(|e| match e {
        PensionError::DataLoad { reason, .. } => PensionError::data_load(path, reason),
        other => other,
    })
}

/// Load members from any reader (e.g., string buffer, stdin)
pub fn load_members_from_reader<R: Read>(reader: R) -> Result<Vec<MemberRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut members = Vec::new();

    for result in csv_reader.deserialize() {
        let member: MemberRecord = result.map_err(|e| PensionError::data_load("<members>", e))?;
        members.push(member);
    }

    Ok(members)
}

/// Write outcomes as CSV to any writer
pub fn write_results<W: Write>(writer: W, outcomes: &[MemberOutcome]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for outcome in outcomes {
        csv_writer
            .serialize(OutputRow::from(outcome))
            .map_err(|e| PensionError::data_load("<results>", e))?;
    }
    csv_writer
        .flush()
        .map_err(|e| PensionError::data_load("<results>", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{Assumptions, DeferredFactorTable, SalaryIncreaseRates};

    const MEMBERS: &str = "\
member_id,age,years_of_service,salary,is_teacher,gender
A1,30,5,50000,Yes,Female
A2,45,12,80000,No,Male
A3,28,3,42000,,
";

    fn runner(rate_years: usize) -> BatchRunner {
        BatchRunner::new(BenefitCalculator::with_assumptions(Assumptions::new(
            DeferredFactorTable::from_pairs([(45, 0.3), (46, 0.32)]),
            SalaryIncreaseRates::flat(0.03, rate_years),
        )))
    }

    #[test]
    fn test_load_members() {
        let members = load_members_from_reader(MEMBERS.as_bytes()).unwrap();
        assert_eq!(members.len(), 3);
        assert!(members[0].is_teacher);
        assert_eq!(members[1].gender, Some(Gender::Male));
        assert!(!members[2].is_teacher);
        assert_eq!(members[2].gender, None);
        assert_eq!(members[2].inputs().gender, Gender::Female);
    }

    #[test]
    fn test_run_matches_single_calculation_in_order() {
        let members = load_members_from_reader(MEMBERS.as_bytes()).unwrap();
        let runner = runner(70);
        let outcomes = runner.run(&members);

        assert_eq!(outcomes.len(), members.len());
        for (member, outcome) in members.iter().zip(&outcomes) {
            assert_eq!(outcome.member_id, member.member_id);
            let expected = runner
                .calculator()
                .compute_benefit(member.years_of_service, member.age, member.salary)
                .unwrap();
            assert_eq!(outcome.result.as_ref().unwrap(), &expected);
        }
    }

    #[test]
    fn test_failed_member_does_not_stop_batch() {
        let members = load_members_from_reader(MEMBERS.as_bytes()).unwrap();
        // 12 years of service needs rate index 12 for the next-year projection
        let outcomes = runner(12).run(&members);

        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
        assert!(outcomes[2].result.is_ok());
    }

    #[test]
    fn test_write_results() {
        let members = load_members_from_reader(MEMBERS.as_bytes()).unwrap();
        let outcomes = runner(12).run(&members);

        let mut buffer = Vec::new();
        write_results(&mut buffer, &outcomes).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(
            lines[0],
            "member_id,fas,fas_next_year,accrued_benefit,pvab,accrued_benefit_next_year,pvab_next_year,pvab_increase,error"
        );
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("A1,"));
        assert!(lines[2].starts_with("A2,,,,,,,,"));
        assert!(lines[2].contains("out of range"));
    }

    #[test]
    fn test_malformed_member_row() {
        let err = load_members_from_reader("member_id,age,years_of_service,salary\nX,abc,1,1\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, PensionError::DataLoad { .. }));
    }
}
